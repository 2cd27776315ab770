//! Values accumulated along one parse path.
//!
//! While the dispatcher walks the tree it records every parsed argument,
//! flag hit, and matched literal into a [`StackBuilder`]. Trying an
//! alternative branch clones the builder, so siblings never see each other's
//! state. Once a command is chosen the builder is frozen into a
//! [`CommandStack`] and handed to the bound command.
//!
//! Values are keyed by [`ArgumentKey`], not by name: two distinct arguments
//! that share a name on one path keep separate values.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::argument::{Argument, ArgumentKey};
use crate::context::CommandContext;
use crate::cursor::{Cursor, StringRange};

type Value = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct ParsedArgument {
    range: StringRange,
    value: Value,
}

/// A flag matched on the parse path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagHit {
    /// Where the flag token sits in the input.
    pub range: StringRange,
    /// The flag character (`v` for `-v`).
    pub flag: char,
}

/// Mutable accumulator for one parse path.
///
/// `Clone` is the copy operation used to fork a path; clones are fully
/// independent.
#[derive(Clone)]
pub struct StackBuilder {
    context: CommandContext,
    arguments: HashMap<ArgumentKey, ParsedArgument>,
    flags: Vec<FlagHit>,
    literal_range: StringRange,
}

impl StackBuilder {
    /// Starts an empty stack at the cursor's position.
    pub fn new(cursor: &Cursor, context: &CommandContext) -> Self {
        Self {
            context: context.clone(),
            arguments: HashMap::new(),
            flags: Vec::new(),
            literal_range: StringRange::at(cursor.index()),
        }
    }

    /// Range spanning every literal matched so far. Empty if none matched.
    pub fn literal_range(&self) -> StringRange {
        self.literal_range
    }

    /// Records a matched literal.
    pub fn literal(&mut self, range: StringRange) -> &mut Self {
        self.literal_range = self.literal_range.expand(range);
        self
    }

    /// Records the parsed value of `argument`.
    pub fn argument<T: Send + Sync + 'static>(
        &mut self,
        argument: &Argument<T>,
        range: StringRange,
        value: T,
    ) -> &mut Self {
        self.arguments.insert(
            argument.key(),
            ParsedArgument {
                range,
                value: Arc::new(value),
            },
        );
        self
    }

    /// Records a flag hit.
    pub fn flag(&mut self, range: StringRange, flag: char) -> &mut Self {
        self.flags.push(FlagHit { range, flag });
        self
    }

    /// Returns `true` if a value for `argument` was recorded.
    pub fn has_argument<T>(&self, argument: &Argument<T>) -> bool {
        self.arguments.contains_key(&argument.key())
    }

    /// Freezes the builder.
    pub fn build(self) -> CommandStack {
        CommandStack {
            context: self.context,
            arguments: self.arguments,
            flags: self.flags,
        }
    }
}

impl fmt::Debug for StackBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackBuilder")
            .field("arguments", &sorted_names(&self.arguments))
            .field("flags", &self.flags)
            .field("literal_range", &self.literal_range)
            .finish()
    }
}

/// Finalized values handed to a bound command.
///
/// # Example
///
/// ```
/// use command_dispatch_core::{
///     CommandContext, Cursor, IntArgument, StackBuilder, StringRange, ArgumentType,
/// };
///
/// let amount = IntArgument::any().named("amount");
/// let mut builder = StackBuilder::new(&Cursor::new("give 5"), &CommandContext::empty());
/// builder.argument(&amount, StringRange::between(5, 6), 5);
/// let stack = builder.build();
/// assert_eq!(*stack.argument(&amount), 5);
/// ```
pub struct CommandStack {
    context: CommandContext,
    arguments: HashMap<ArgumentKey, ParsedArgument>,
    flags: Vec<FlagHit>,
}

impl CommandStack {
    /// The context the command was dispatched with.
    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Returns the parsed value of `argument`, or `None` if it is not on
    /// this path.
    pub fn find<T: 'static>(&self, argument: &Argument<T>) -> Option<&T> {
        self.arguments
            .get(&argument.key())
            .and_then(|parsed| parsed.value.downcast_ref::<T>())
    }

    /// Returns the parsed value of `argument`.
    ///
    /// # Panics
    ///
    /// Panics if the argument is not part of the executed command. Asking
    /// for an argument the command does not declare is a programming error.
    pub fn argument<T: 'static>(&self, argument: &Argument<T>) -> &T {
        match self.arguments.get(&argument.key()) {
            Some(parsed) => parsed.value.downcast_ref::<T>().unwrap_or_else(|| {
                panic!(
                    "argument '{}' was not parsed as {}",
                    argument.name(),
                    type_name::<T>()
                )
            }),
            None => panic!(
                "no such argument '{}' exists on this command",
                argument.name()
            ),
        }
    }

    /// Returns the parsed value of `argument`, or `default` if absent.
    pub fn get_or<'a, T: 'static>(&'a self, argument: &Argument<T>, default: &'a T) -> &'a T {
        self.find(argument).unwrap_or(default)
    }

    /// Where `argument` was read from in the input.
    pub fn range<T>(&self, argument: &Argument<T>) -> Option<StringRange> {
        self.arguments.get(&argument.key()).map(|parsed| parsed.range)
    }

    /// Returns `true` if `-flag` was given.
    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.iter().any(|hit| hit.flag == flag)
    }

    /// Flags given, in input order.
    pub fn flags(&self) -> &[FlagHit] {
        &self.flags
    }

    /// Names of all parsed arguments, sorted. A name repeats when distinct
    /// arguments share it.
    pub fn argument_names(&self) -> Vec<&str> {
        sorted_names(&self.arguments)
    }
}

fn sorted_names(arguments: &HashMap<ArgumentKey, ParsedArgument>) -> Vec<&str> {
    let mut names: Vec<&str> = arguments.keys().map(ArgumentKey::name).collect();
    names.sort_unstable();
    names
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("arguments", &self.argument_names())
            .field("flags", &self.flags)
            .finish()
    }
}
