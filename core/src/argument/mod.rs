//! Typed arguments and the built-in argument types.
//!
//! An [`ArgumentType`] turns the text at a [`Cursor`] into a value. An
//! [`Argument`] pairs a type with a name, and is what grammar nodes and bound
//! commands refer to.
//!
//! Built-in types:
//!
//! - [`NumberArgument`] (with the [`IntArgument`], [`DoubleArgument`], ...
//!   aliases): signed integers and floats with optional inclusive bounds.
//! - [`StringArgument`]: a single word, the rest of the line, or a quoted
//!   string with `\"` and `\\` escapes.
//! - [`BooleanArgument`]: exactly `true` or `false`.
//!
//! # Example
//!
//! ```
//! use command_dispatch_core::{ArgumentType, CommandContext, Cursor, IntArgument};
//!
//! let level = IntArgument::between(1, 10).named("level");
//! let mut cursor = Cursor::new("7 rest");
//! let value = level.kind().parse(&CommandContext::empty(), &mut cursor).unwrap();
//! assert_eq!(value, 7);
//! assert_eq!(cursor.index(), 1);
//! ```

mod boolean;
mod number;
mod string;

use std::fmt;
use std::sync::Arc;

pub use boolean::BooleanArgument;
pub use number::{
    ByteArgument, DoubleArgument, FloatArgument, IntArgument, LongArgument, Number,
    NumberArgument, NumberKind, NumberValue, ShortArgument,
};
pub use string::{StringArgument, StringMode};

use crate::context::CommandContext;
use crate::cursor::{Cursor, StringRange};
use crate::error::ParseError;
use crate::stack::StackBuilder;

/// Parses a value from the input at a cursor.
///
/// Implementations must leave the cursor on the first unconsumed character
/// when they succeed. When they fail, the cursor position is what the
/// resulting [`ParseError`] reports.
pub trait ArgumentType: Send + Sync + fmt::Debug {
    /// The parsed value.
    type Output;

    /// Reads a value at `cursor`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] positioned where the input stopped making
    /// sense for this type.
    fn parse(&self, context: &CommandContext, cursor: &mut Cursor)
    -> Result<Self::Output, ParseError>;

    /// Names this type, producing an [`Argument`].
    fn named(self, name: impl Into<String>) -> Argument<Self::Output>
    where
        Self: Sized + 'static,
        Self::Output: Send + Sync + 'static,
    {
        Argument::new(name, self)
    }
}

/// A named, typed argument.
///
/// Cloning shares the underlying type.
pub struct Argument<T> {
    name: Arc<str>,
    kind: Arc<dyn ArgumentType<Output = T>>,
}

impl<T: Send + Sync + 'static> Argument<T> {
    /// Creates an argument named `name` parsed by `kind`.
    pub fn new(name: impl Into<String>, kind: impl ArgumentType<Output = T> + 'static) -> Self {
        Self {
            name: Arc::from(name.into()),
            kind: Arc::new(kind),
        }
    }
}

impl<T> Argument<T> {
    /// Name shown in usage and error output.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The argument type.
    pub fn kind(&self) -> &dyn ArgumentType<Output = T> {
        self.kind.as_ref()
    }

    /// Identity of this argument. Clones share it; a separately built
    /// argument with the same name does not.
    pub fn key(&self) -> ArgumentKey {
        ArgumentKey {
            name: Arc::clone(&self.name),
            kind: Arc::as_ptr(&self.kind) as *const () as usize,
        }
    }
}

/// Identity of an [`Argument`]: its name plus the shared type instance.
///
/// Parsed values are stored under this key, so two arguments that happen to
/// share a name on one path never see each other's values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentKey {
    name: Arc<str>,
    kind: usize,
}

impl ArgumentKey {
    /// Name of the argument.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Argument<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            kind: Arc::clone(&self.kind),
        }
    }
}

impl<T> PartialEq for Argument<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> fmt::Debug for Argument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Type-erased view of an [`Argument`] as stored in the node tree.
pub trait ArgumentParser: Send + Sync + fmt::Debug {
    /// Name of the argument; also its sibling identity in the tree.
    fn name(&self) -> &str;

    /// Parses at `cursor` and records the value and its source range into
    /// `stack`.
    ///
    /// # Errors
    ///
    /// Propagates the argument type's failure.
    fn parse_into(
        &self,
        stack: &mut StackBuilder,
        context: &CommandContext,
        cursor: &mut Cursor,
    ) -> Result<(), ParseError>;
}

impl<T: Send + Sync + 'static> ArgumentParser for Argument<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse_into(
        &self,
        stack: &mut StackBuilder,
        context: &CommandContext,
        cursor: &mut Cursor,
    ) -> Result<(), ParseError> {
        let start = cursor.index();
        let value = self.kind.parse(context, cursor)?;
        stack.argument(self, StringRange::between(start, cursor.index()), value);
        Ok(())
    }
}
