//! Parsing and execution of command lines against a [`CommandTree`].
//!
//! Parsing is a recursive descent with backtracking: at every node the
//! dispatcher tries each relevant, usable child on its own copy of the
//! cursor and stack, recurses into the ones that match, and keeps the best
//! candidate. A candidate that consumed the whole line beats one that
//! stopped early; otherwise the first one found wins.
//!
//! A child whose argument type rejects the input aborts the whole parse with
//! that error. Sibling ambiguity is only resolved among children that parse.

use tracing::{debug, trace};

use crate::context::CommandContext;
use crate::cursor::{Cursor, SEPARATOR, StringRange};
use crate::error::{DispatchError, ParseError, Result};
use crate::node::{CommandBuilder, CommandTree, NodeId, NodeKind, NodeSpec};
use crate::stack::{CommandStack, StackBuilder};
use crate::usage::{UsageStyle, smart_usage};

/// Outcome of a successful parse: the furthest node reached, the values
/// collected on the way, and where the cursor stopped.
#[derive(Debug, Clone)]
pub struct ParseResult {
    cursor: Cursor,
    stack: StackBuilder,
    node: NodeId,
}

impl ParseResult {
    /// The cursor at the point parsing stopped.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Values collected along the chosen path.
    pub fn stack(&self) -> &StackBuilder {
        &self.stack
    }

    /// The terminal node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Returns `true` if the whole input was consumed.
    pub fn is_complete(&self) -> bool {
        !self.cursor.readable()
    }

    /// Freezes the collected values.
    pub fn into_stack(self) -> CommandStack {
        self.stack.build()
    }
}

/// Owns a grammar and runs input lines against it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use command_dispatch_core::{
///     ArgumentType, CommandContext, Dispatcher, IntArgument, argument, literal,
/// };
///
/// let total = Arc::new(AtomicI32::new(0));
/// let amount = IntArgument::between(1, 10).named("amount");
///
/// let mut dispatcher = Dispatcher::new();
/// let sink = Arc::clone(&total);
/// dispatcher.register(literal("add").then(argument(amount.clone()).executes(move |stack| {
///     sink.fetch_add(*stack.argument(&amount), Ordering::SeqCst);
///     Ok(())
/// })));
///
/// let context = CommandContext::empty();
/// dispatcher.execute("add 4", &context).unwrap();
/// dispatcher.execute("add 6", &context).unwrap();
/// assert_eq!(total.load(Ordering::SeqCst), 10);
/// assert!(dispatcher.execute("add 11", &context).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    tree: CommandTree,
    style: UsageStyle,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `style` when rendering usage.
    pub fn with_usage_style(mut self, style: UsageStyle) -> Self {
        self.style = style;
        self
    }

    /// The grammar.
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// The usage style.
    pub fn usage_style(&self) -> &UsageStyle {
        &self.style
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Adds a top-level command, merging with an existing one of the same
    /// name.
    ///
    /// # Panics
    ///
    /// See [`CommandTree::add`].
    pub fn register(&mut self, command: CommandBuilder) -> NodeId {
        let spec: NodeSpec = command.build();
        let name = spec.name();
        let id = self.tree.add(self.tree.root(), spec);
        debug!(command = %name, node = %id, "Registered command");
        id
    }

    /// Registers `command`, then hands the dispatcher and the new node to
    /// `then`. Useful for aliases that redirect to the node just added.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch_core::{CommandContext, Dispatcher, literal};
    ///
    /// let mut dispatcher = Dispatcher::new();
    /// dispatcher.register_with(literal("remove").executes(|_| Ok(())), |dispatcher, remove| {
    ///     dispatcher.register(literal("rm").redirect(remove));
    /// });
    /// assert!(dispatcher.execute("rm", &CommandContext::empty()).is_ok());
    /// ```
    pub fn register_with<F>(&mut self, command: CommandBuilder, then: F) -> NodeId
    where
        F: FnOnce(&mut Dispatcher, NodeId),
    {
        let id = self.register(command);
        then(self, id);
        id
    }

    /// Removes a top-level command by name.
    pub fn remove(&mut self, name: &str) -> Option<NodeId> {
        let removed = self.tree.remove(self.tree.root(), name);
        if removed.is_some() {
            debug!(command = %name, "Removed command");
        }
        removed
    }

    /// Parses `input` from the root.
    ///
    /// Returns `Ok(None)` when no top-level command is relevant at all.
    ///
    /// # Errors
    ///
    /// Returns the first argument-type failure on the chosen path, or
    /// [`DispatchError::IncompleteParse`] when a value runs into the next
    /// token without a separator.
    pub fn parse(
        &self,
        input: &str,
        context: &CommandContext,
    ) -> std::result::Result<Option<ParseResult>, ParseError> {
        self.parse_cursor(Cursor::new(input), context)
    }

    /// Parses from the cursor's current position.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::parse`].
    pub fn parse_cursor(
        &self,
        cursor: Cursor,
        context: &CommandContext,
    ) -> std::result::Result<Option<ParseResult>, ParseError> {
        let stack = StackBuilder::new(&cursor, context);
        let result = self.parse_node(self.tree.root(), None, cursor, context, stack)?;
        match &result {
            Some(result) => trace!(
                node = %result.node,
                index = result.cursor.index(),
                complete = result.is_complete(),
                "Parsed"
            ),
            None => trace!("No command matched"),
        }
        Ok(result)
    }

    fn parse_node(
        &self,
        node: NodeId,
        anchor: Option<NodeId>,
        cursor: Cursor,
        context: &CommandContext,
        stack: StackBuilder,
    ) -> std::result::Result<Option<ParseResult>, ParseError> {
        let mut candidates: Vec<ParseResult> = Vec::new();

        for child in self.tree.relevant_children(node, &cursor) {
            if !self.tree.can_use(child, context) {
                trace!(node = %child, "Skipping unusable node");
                continue;
            }

            let mut trial_cursor = cursor.clone();
            let mut trial_stack = stack.clone();
            if !self.parse_child(child, context, &mut trial_cursor, &mut trial_stack)? {
                continue;
            }

            if trial_cursor.readable() {
                if trial_cursor.peek() != Some(SEPARATOR) {
                    return Err(ParseError::new(
                        DispatchError::IncompleteParse,
                        &trial_cursor,
                    ));
                }
                trial_cursor.skip();
            }

            if let Some(target) = self.tree.node(child).redirect() {
                debug!(from = %child, to = %target, "Following redirect");
                return self.parse_node(target, Some(target), trial_cursor, context, trial_stack);
            }

            let child_anchor = if self.tree.node(child).is_flag() {
                anchor
            } else {
                Some(child)
            };

            if trial_cursor.readable() {
                if let Some(result) =
                    self.parse_node(child, child_anchor, trial_cursor, context, trial_stack)?
                {
                    candidates.push(result);
                }
            } else {
                candidates.push(ParseResult {
                    cursor: trial_cursor,
                    stack: trial_stack,
                    node: child_anchor.unwrap_or(child),
                });
            }
        }

        if candidates.len() > 1 {
            trace!(node = %node, candidates = candidates.len(), "Choosing between candidates");
        }
        let best = candidates
            .into_iter()
            .min_by_key(|candidate| candidate.cursor.readable());
        if best.is_some() {
            return Ok(best);
        }

        Ok(self.tree.node(node).is_child().then_some(ParseResult {
            cursor,
            stack,
            node,
        }))
    }

    /// Runs one child's own matching step. Returns `false` when the child
    /// simply does not apply (a flag that is not the next token).
    fn parse_child(
        &self,
        child: NodeId,
        context: &CommandContext,
        cursor: &mut Cursor,
        stack: &mut StackBuilder,
    ) -> std::result::Result<bool, ParseError> {
        match self.tree.node(child).kind() {
            NodeKind::Root => Ok(false),
            NodeKind::Literal(name) => {
                let start = cursor.index();
                cursor.skip_n(name.len());
                stack.literal(StringRange::between(start, cursor.index()));
                Ok(true)
            }
            NodeKind::Argument(argument) => {
                argument.parse_into(stack, context, cursor)?;
                Ok(true)
            }
            NodeKind::Flag(flag) => {
                let mut token = cursor.clone();
                let start = token.index();
                if token.read() != Some('-') || token.read() != Some(*flag) {
                    return Ok(false);
                }
                if token.peek().is_some_and(|next| next != SEPARATOR) {
                    return Ok(false);
                }
                stack.flag(StringRange::between(start, token.index()), *flag);
                *cursor = token;
                Ok(true)
            }
        }
    }

    /// Parses and executes `input`.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError::Parse`](crate::CommandError::Parse) for
    /// parse failures and input that matched nothing, or whatever the bound
    /// command returns.
    pub fn execute(&self, input: &str, context: &CommandContext) -> Result<()> {
        debug!(input = %input, "Dispatching");
        match self.parse(input, context)? {
            Some(result) => self.execute_result(result),
            None => Err(ParseError::new(DispatchError::UnknownCommand, &Cursor::new(input)).into()),
        }
    }

    /// Executes a previously parsed line.
    ///
    /// Leftover input is an [`DispatchError::UnknownCommand`] when no literal
    /// was matched and an [`DispatchError::UnknownArgument`] otherwise. A
    /// terminal node without a bound command succeeds without doing anything.
    ///
    /// # Errors
    ///
    /// See above; also propagates the bound command's error.
    pub fn execute_result(&self, result: ParseResult) -> Result<()> {
        let ParseResult {
            cursor,
            stack,
            node,
        } = result;

        if cursor.readable() {
            let error = if stack.literal_range().is_empty() {
                DispatchError::UnknownCommand
            } else {
                DispatchError::UnknownArgument
            };
            debug!(index = cursor.index(), error = %error, "Input left over");
            return Err(ParseError::new(error, &cursor).into());
        }

        let terminal = self.tree.node(node);
        if terminal.is_flag() {
            return Err(ParseError::new(DispatchError::UnknownArgument, &cursor).into());
        }

        match terminal.command() {
            Some(command) => {
                debug!(node = %node, command = %terminal.name(), "Executing");
                command(&stack.build())
            }
            None => {
                trace!(node = %node, "Terminal node has no command");
                Ok(())
            }
        }
    }

    /// Usage of every usable child of `node`, keyed by child.
    pub fn usage(&self, node: NodeId, context: &CommandContext) -> Vec<(NodeId, String)> {
        smart_usage(&self.tree, &self.style, node, context)
    }

    /// Full usage lines beneath the literal `path`, each prefixed with the
    /// path. Returns `None` if the path does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch_core::{CommandContext, Dispatcher, literal};
    ///
    /// let mut dispatcher = Dispatcher::new();
    /// dispatcher.register(literal("remote").then(literal("add").executes(|_| Ok(()))));
    /// let context = CommandContext::empty();
    /// assert_eq!(dispatcher.usage_lines(&[], &context).unwrap(), vec!["remote add"]);
    /// assert_eq!(dispatcher.usage_lines(&["remote"], &context).unwrap(), vec!["remote add"]);
    /// ```
    pub fn usage_lines(&self, path: &[&str], context: &CommandContext) -> Option<Vec<String>> {
        let node = self.tree.find_path(path)?;
        let separator = SEPARATOR.to_string();
        let prefix = path.join(separator.as_str());
        let lines = self
            .usage(node, context)
            .into_iter()
            .map(|(_, usage)| {
                if prefix.is_empty() {
                    usage
                } else {
                    format!("{prefix}{SEPARATOR}{usage}")
                }
            })
            .collect();
        Some(lines)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::argument::{ArgumentType, IntArgument, StringArgument};
    use crate::error::{CommandError, ParseErrorKind};
    use crate::node::{argument, flag, literal};

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&CommandStack) -> Result<()> + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        (count, move |_: &CommandStack| {
            sink.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn dispatch_error(error: CommandError) -> (DispatchError, usize) {
        let parse = error.as_parse().expect("parse error").clone();
        match parse.kind() {
            ParseErrorKind::Dispatch(kind) => (*kind, parse.index()),
            other => panic!("expected a dispatch error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_tree_is_none() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.parse("anything", &CommandContext::empty()).unwrap().is_none());
    }

    #[test]
    fn test_parse_literal_path_has_no_arguments() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(literal("foo").then(literal("bar")));
        let result = dispatcher
            .parse("foo bar", &CommandContext::empty())
            .unwrap()
            .unwrap();
        assert!(result.is_complete());
        assert_eq!(result.node(), dispatcher.tree().find_path(&["foo", "bar"]).unwrap());
        assert_eq!(result.stack().literal_range(), StringRange::between(0, 7));
        assert!(result.into_stack().argument_names().is_empty());
    }

    #[test]
    fn test_full_match_beats_partial_match() {
        let mut dispatcher = Dispatcher::new();
        let word = StringArgument::word().named("word");
        let number = IntArgument::any().named("number");
        dispatcher.register(
            literal("x")
                .then(argument(number.clone()))
                .then(argument(word.clone()).then(literal("tail"))),
        );

        let result = dispatcher.parse("x 5 tail", &CommandContext::empty()).unwrap().unwrap();
        assert!(result.is_complete());
        let stack = result.into_stack();
        assert_eq!(stack.find(&number), None);
        assert_eq!(stack.argument(&word), "5");
    }

    #[test]
    fn test_first_candidate_wins_ties() {
        let mut dispatcher = Dispatcher::new();
        let first = StringArgument::word().named("first");
        let second = StringArgument::word().named("second");
        dispatcher.register(literal("x").then(argument(first.clone())).then(argument(second)));
        let stack = dispatcher
            .parse("x value", &CommandContext::empty())
            .unwrap()
            .unwrap()
            .into_stack();
        assert_eq!(stack.argument(&first), "value");
    }

    #[test]
    fn test_argument_failure_aborts_parse() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            literal("x")
                .then(argument(IntArgument::any().named("number")))
                .then(argument(StringArgument::word().named("word"))),
        );
        let error = dispatcher.parse("x abc", &CommandContext::empty()).unwrap_err();
        assert!(matches!(error.kind(), ParseErrorKind::Number(_)));
        assert_eq!(error.index(), 2);
    }

    #[test]
    fn test_incomplete_parse_without_separator() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(literal("x").then(argument(IntArgument::any().named("n"))));
        let error = dispatcher.parse("x 12abc", &CommandContext::empty()).unwrap_err();
        assert!(error.is_dispatch(DispatchError::IncompleteParse));
        assert_eq!(error.index(), 4);
    }

    #[test]
    fn test_execute_reports_unknown_command_and_argument() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(literal("foo").then(literal("bar")));
        let context = CommandContext::empty();

        let (error, index) = dispatch_error(dispatcher.execute("", &context).unwrap_err());
        assert_eq!((error, index), (DispatchError::UnknownCommand, 0));

        let (error, index) = dispatch_error(dispatcher.execute("unknown", &context).unwrap_err());
        assert_eq!((error, index), (DispatchError::UnknownCommand, 0));

        let (error, index) = dispatch_error(dispatcher.execute("foo abc", &context).unwrap_err());
        assert_eq!((error, index), (DispatchError::UnknownArgument, 4));
    }

    #[test]
    fn test_execute_without_command_is_noop() {
        let mut dispatcher = Dispatcher::new();
        let (count, command) = counter();
        dispatcher.register(literal("foo").then(literal("bar").executes(command)));
        let context = CommandContext::empty();

        dispatcher.execute("foo", &context).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        dispatcher.execute("foo bar", &context).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_flag_terminates_at_anchor() {
        let mut dispatcher = Dispatcher::new();
        let (count, command) = counter();
        dispatcher.register(literal("list").executes(command).then(flag('v')));
        let context = CommandContext::empty();

        let result = dispatcher.parse("list -v", &context).unwrap().unwrap();
        assert_eq!(result.node(), dispatcher.tree().child(dispatcher.root(), "list").unwrap());
        assert!(result.stack().clone().build().has_flag('v'));
        dispatcher.execute_result(result).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_flag_requires_whole_token() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(literal("list").executes(|_| Ok(())).then(flag('v')));
        let (error, index) = dispatch_error(
            dispatcher
                .execute("list -vv", &CommandContext::empty())
                .unwrap_err(),
        );
        assert_eq!((error, index), (DispatchError::UnknownArgument, 5));
    }

    #[test]
    fn test_top_level_flag_alone_is_unknown_argument() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.tree.add(dispatcher.root(), flag('q').build());
        let (error, _) = dispatch_error(dispatcher.execute("-q", &CommandContext::empty()).unwrap_err());
        assert_eq!(error, DispatchError::UnknownArgument);
    }

    #[test]
    fn test_redirect_continues_at_target() {
        let mut dispatcher = Dispatcher::new();
        let value = IntArgument::any().named("value");
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        let reader = value.clone();
        let target = dispatcher.register(literal("set").then(argument(value).executes(move |stack| {
            sink.store(*stack.argument(&reader) as usize, Ordering::SeqCst);
            Ok(())
        })));
        dispatcher.register(literal("put").redirect(target));

        dispatcher.execute("put 7", &CommandContext::empty()).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);

        let result = dispatcher.parse("put", &CommandContext::empty()).unwrap().unwrap();
        assert_eq!(result.node(), target);
    }

    #[test]
    fn test_requirement_hides_command() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(literal("secret").requires(|_| false).executes(|_| Ok(())));
        let (error, _) = dispatch_error(
            dispatcher
                .execute("secret", &CommandContext::empty())
                .unwrap_err(),
        );
        assert_eq!(error, DispatchError::UnknownCommand);
    }

    #[test]
    fn test_remove_command() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(literal("foo").executes(|_| Ok(())));
        assert!(dispatcher.remove("foo").is_some());
        assert!(dispatcher.remove("foo").is_none());
        assert!(dispatcher.execute("foo", &CommandContext::empty()).is_err());
    }

    #[test]
    fn test_usage_lines_for_unknown_path() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.usage_lines(&["nope"], &CommandContext::empty()).is_none());
        assert!(dispatcher.usage_lines(&[], &CommandContext::empty()).unwrap().is_empty());
    }
}
