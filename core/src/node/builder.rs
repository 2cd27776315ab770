//! Value builders for grammar fragments.

use std::fmt;
use std::sync::Arc;

use super::{Command, Executable, NodeId, NodeKind, Requirement};
use crate::argument::Argument;
use crate::context::CommandContext;
use crate::error::CommandError;
use crate::stack::CommandStack;

/// A frozen grammar fragment, ready to be inserted with
/// [`CommandTree::add`](super::CommandTree::add).
#[derive(Clone)]
pub struct NodeSpec {
    pub(crate) kind: NodeKind,
    pub(crate) requirement: Option<Requirement>,
    pub(crate) executable: Option<Executable>,
    pub(crate) children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Name the fragment's root will have among its siblings.
    pub fn name(&self) -> String {
        self.kind.name()
    }

    /// What the fragment's root matches.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Child fragments, in the order they were added.
    pub fn children(&self) -> &[NodeSpec] {
        &self.children
    }
}

impl fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("kind", &self.kind)
            .field("requirement", &self.requirement.is_some())
            .field("executable", &self.executable)
            .field("children", &self.children)
            .finish()
    }
}

/// Builds a literal or argument node.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::{ArgumentType, IntArgument, literal, argument};
///
/// let amount = IntArgument::min(1).named("amount");
/// let give = literal("give")
///     .then(argument(amount.clone()).executes(move |stack| {
///         assert!(*stack.argument(&amount) >= 1);
///         Ok(())
///     }))
///     .build();
/// assert_eq!(give.name(), "give");
/// assert_eq!(give.children().len(), 1);
/// ```
#[derive(Clone)]
pub struct CommandBuilder {
    kind: NodeKind,
    requirement: Option<Requirement>,
    command: Option<Command>,
    redirect: Option<NodeId>,
    children: Vec<NodeSpec>,
}

/// Starts a literal node matching `name` exactly.
pub fn literal(name: impl Into<String>) -> CommandBuilder {
    CommandBuilder::new(NodeKind::Literal(name.into()))
}

/// Starts an argument node parsing `argument`.
pub fn argument<T: Send + Sync + 'static>(argument: Argument<T>) -> CommandBuilder {
    CommandBuilder::new(NodeKind::Argument(Arc::new(argument)))
}

/// Starts a flag node matching `-flag`.
pub fn flag(flag: char) -> FlagBuilder {
    FlagBuilder {
        flag,
        requirement: None,
        children: Vec::new(),
    }
}

impl CommandBuilder {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            requirement: None,
            command: None,
            redirect: None,
            children: Vec::new(),
        }
    }

    /// Restricts the node to contexts accepted by `predicate`.
    pub fn requires<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CommandContext) -> bool + Send + Sync + 'static,
    {
        self.requirement = Some(Arc::new(predicate));
        self
    }

    /// Appends a child fragment.
    ///
    /// # Panics
    ///
    /// Panics if the node is redirected.
    pub fn then(mut self, child: impl Into<NodeSpec>) -> Self {
        if self.redirect.is_some() {
            panic!("cannot add children to a redirected node");
        }
        self.children.push(child.into());
        self
    }

    /// Binds the command run when parsing ends at this node.
    ///
    /// # Panics
    ///
    /// Panics if a command is already bound.
    pub fn executes<F>(mut self, command: F) -> Self
    where
        F: Fn(&CommandStack) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        if self.command.is_some() {
            panic!("cannot replace the command bound to a node");
        }
        self.command = Some(Arc::new(command));
        self
    }

    /// Continues parsing at `target` once this node has matched.
    ///
    /// # Panics
    ///
    /// Panics if the node already has children.
    pub fn redirect(mut self, target: NodeId) -> Self {
        if !self.children.is_empty() {
            panic!("cannot redirect a node with children");
        }
        self.redirect = Some(target);
        self
    }

    /// Freezes the builder.
    pub fn build(self) -> NodeSpec {
        NodeSpec {
            kind: self.kind,
            requirement: self.requirement,
            executable: Some(Executable::new(self.command, self.redirect)),
            children: self.children,
        }
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("kind", &self.kind)
            .field("command", &self.command.is_some())
            .field("redirect", &self.redirect)
            .field("children", &self.children.len())
            .finish()
    }
}

impl From<CommandBuilder> for NodeSpec {
    fn from(builder: CommandBuilder) -> Self {
        builder.build()
    }
}

/// Builds a flag node. Flags carry no command of their own.
#[derive(Clone)]
pub struct FlagBuilder {
    flag: char,
    requirement: Option<Requirement>,
    children: Vec<NodeSpec>,
}

impl FlagBuilder {
    /// Restricts the flag to contexts accepted by `predicate`.
    pub fn requires<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CommandContext) -> bool + Send + Sync + 'static,
    {
        self.requirement = Some(Arc::new(predicate));
        self
    }

    /// Appends a child fragment.
    pub fn then(mut self, child: impl Into<NodeSpec>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Freezes the builder.
    pub fn build(self) -> NodeSpec {
        NodeSpec {
            kind: NodeKind::Flag(self.flag),
            requirement: self.requirement,
            executable: None,
            children: self.children,
        }
    }
}

impl fmt::Debug for FlagBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagBuilder")
            .field("flag", &self.flag)
            .field("children", &self.children.len())
            .finish()
    }
}

impl From<FlagBuilder> for NodeSpec {
    fn from(builder: FlagBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{ArgumentType, StringArgument};

    #[test]
    fn test_literal_builder_collects_children() {
        let spec = literal("foo")
            .then(literal("bar"))
            .then(flag('v').then(literal("baz")))
            .build();
        assert_eq!(spec.name(), "foo");
        let names: Vec<String> = spec.children().iter().map(NodeSpec::name).collect();
        assert_eq!(names, vec!["bar", "-v"]);
        assert_eq!(spec.children()[1].children()[0].name(), "baz");
    }

    #[test]
    fn test_argument_builder_takes_argument_name() {
        let spec = argument(StringArgument::word().named("target")).build();
        assert_eq!(spec.name(), "target");
        assert!(matches!(spec.kind(), NodeKind::Argument(_)));
    }

    #[test]
    fn test_flag_has_no_executable() {
        let spec = flag('q').build();
        assert!(spec.executable.is_none());
        assert_eq!(spec.name(), "-q");
    }

    #[test]
    #[should_panic(expected = "cannot add children to a redirected node")]
    fn test_then_after_redirect_panics() {
        let _ = literal("alias").redirect(NodeId(1)).then(literal("x"));
    }

    #[test]
    #[should_panic(expected = "cannot redirect a node with children")]
    fn test_redirect_after_then_panics() {
        let _ = literal("alias").then(literal("x")).redirect(NodeId(1));
    }

    #[test]
    #[should_panic(expected = "cannot replace the command")]
    fn test_executes_twice_panics() {
        let _ = literal("foo").executes(|_| Ok(())).executes(|_| Ok(()));
    }
}
