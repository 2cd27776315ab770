//! The command grammar: an arena of nodes with merge-on-insert semantics.
//!
//! A [`CommandTree`] owns every node; nodes refer to each other by
//! [`NodeId`]. There are four kinds ([`NodeKind`]):
//!
//! - the anonymous root, where parsing starts;
//! - literals, matched by exact token;
//! - arguments, parsed by an [`ArgumentParser`];
//! - flags (`-x`), which may appear wherever a flag is registered and are
//!   tried alongside arguments.
//!
//! Literals and arguments carry an [`Executable`] facet: an optional bound
//! [`Command`] and an optional redirect to another node. Flags never do.
//!
//! Inserting a node whose name matches an existing sibling does not replace
//! the sibling. The new node's children are merged into it instead, so
//! independent registrations can share a literal prefix:
//!
//! ```
//! use command_dispatch_core::{CommandTree, literal};
//!
//! let mut tree = CommandTree::new();
//! let root = tree.root();
//! tree.add(root, literal("foo").then(literal("bar")).build());
//! tree.add(root, literal("foo").then(literal("baz")).build());
//!
//! assert_eq!(tree.children(root).len(), 1);
//! let foo = tree.child(root, "foo").unwrap();
//! assert_eq!(tree.children(foo).len(), 2);
//! ```

mod builder;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

pub use builder::{CommandBuilder, FlagBuilder, NodeSpec, argument, flag, literal};

use crate::argument::ArgumentParser;
use crate::context::CommandContext;
use crate::cursor::{Cursor, SEPARATOR};
use crate::error::CommandError;
use crate::stack::CommandStack;
use crate::usage::UsageStyle;

/// Action bound to an executable node.
pub type Command = Arc<dyn Fn(&CommandStack) -> Result<(), CommandError> + Send + Sync>;

/// Predicate deciding whether a node is usable in a context.
pub type Requirement = Arc<dyn Fn(&CommandContext) -> bool + Send + Sync>;

/// Index of a node in a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The position of the node in its tree's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node matches.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The parse entry point.
    Root,
    /// A fixed token.
    Literal(String),
    /// A named, typed value.
    Argument(Arc<dyn ArgumentParser>),
    /// A `-x` marker.
    Flag(char),
}

impl NodeKind {
    /// Sibling-unique name: the literal text, the argument name, or `-x`.
    pub fn name(&self) -> String {
        match self {
            NodeKind::Root => String::new(),
            NodeKind::Literal(name) => name.clone(),
            NodeKind::Argument(argument) => argument.name().to_string(),
            NodeKind::Flag(flag) => format!("-{flag}"),
        }
    }
}

/// The executable facet of literal and argument nodes.
#[derive(Clone, Default)]
pub struct Executable {
    command: Option<Command>,
    redirect: Option<NodeId>,
}

impl Executable {
    /// The bound command, if any.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// Where parsing continues after this node, if redirected.
    pub fn redirect(&self) -> Option<NodeId> {
        self.redirect
    }

    pub(crate) fn new(command: Option<Command>, redirect: Option<NodeId>) -> Self {
        Self { command, redirect }
    }

    fn bind(&mut self, command: Command) {
        if self.command.is_some() {
            panic!("cannot replace the command bound to a node");
        }
        self.command = Some(command);
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("command", &self.command.is_some())
            .field("redirect", &self.redirect)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
struct Children {
    order: Vec<NodeId>,
    by_name: HashMap<String, NodeId>,
    literals: HashMap<String, NodeId>,
    arguments: Vec<NodeId>,
    flags: Vec<NodeId>,
}

/// One point in the grammar.
#[derive(Clone)]
pub struct Node {
    kind: NodeKind,
    requirement: Option<Requirement>,
    executable: Option<Executable>,
    children: Children,
}

impl Node {
    fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            requirement: None,
            executable: None,
            children: Children::default(),
        }
    }

    /// What the node matches.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns `true` for every node except the root.
    pub fn is_child(&self) -> bool {
        !matches!(self.kind, NodeKind::Root)
    }

    /// Returns `true` for flag nodes.
    pub fn is_flag(&self) -> bool {
        matches!(self.kind, NodeKind::Flag(_))
    }

    /// Name used to identify the node among its siblings: the literal text,
    /// the argument name, or `-x` for flags. Empty for the root.
    pub fn name(&self) -> String {
        self.kind.name()
    }

    /// The node's own usage fragment in the default style.
    pub fn usage(&self) -> String {
        self.usage_with(&UsageStyle::default())
    }

    /// The node's own usage fragment: literal text, `<name>` for arguments,
    /// `-x` for flags.
    pub fn usage_with(&self, style: &UsageStyle) -> String {
        match &self.kind {
            NodeKind::Argument(argument) => format!(
                "{}{}{}",
                style.argument_open,
                argument.name(),
                style.argument_close
            ),
            _ => self.name(),
        }
    }

    /// The executable facet, for literal and argument nodes.
    pub fn executable(&self) -> Option<&Executable> {
        self.executable.as_ref()
    }

    /// The bound command, if any.
    pub fn command(&self) -> Option<&Command> {
        self.executable.as_ref().and_then(Executable::command)
    }

    /// The redirect target, if any.
    pub fn redirect(&self) -> Option<NodeId> {
        self.executable.as_ref().and_then(Executable::redirect)
    }

    /// Returns `true` if the requirement predicate (if any) accepts `context`.
    pub fn can_use(&self, context: &CommandContext) -> bool {
        self.requirement
            .as_ref()
            .is_none_or(|requirement| requirement(context))
    }

    /// Direct children, in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children.order
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("requirement", &self.requirement.is_some())
            .field("executable", &self.executable)
            .field("children", &self.children.order)
            .finish()
    }
}

/// Arena owning every node of a grammar.
#[derive(Debug, Clone)]
pub struct CommandTree {
    nodes: Vec<Node>,
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTree {
    const ROOT: NodeId = NodeId(0);

    /// Creates a tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Returns the node for `id`, or `None` if it was not issued by this tree.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes ever inserted, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.node(Self::ROOT).children().is_empty()
    }

    /// Direct children of `parent`, in insertion order.
    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        self.node(parent).children()
    }

    /// The direct child of `parent` named `name`.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent).children.by_name.get(name).copied()
    }

    /// Follows `path` by child name from the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch_core::{CommandTree, literal};
    ///
    /// let mut tree = CommandTree::new();
    /// let root = tree.root();
    /// tree.add(root, literal("remote").then(literal("add")).build());
    /// assert!(tree.find_path(&["remote", "add"]).is_some());
    /// assert!(tree.find_path(&["remote", "rm"]).is_none());
    /// ```
    pub fn find_path(&self, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(Self::ROOT, |node, name| self.child(node, name))
    }

    /// Returns `true` if `id`'s requirement accepts `context`.
    pub fn can_use(&self, id: NodeId, context: &CommandContext) -> bool {
        self.node(id).can_use(context)
    }

    /// Inserts `spec` beneath `parent`, merging into an existing sibling of
    /// the same name. Returns the id of the inserted or merged-into node.
    ///
    /// # Panics
    ///
    /// Panics if the insertion would give a redirected node children, if a
    /// merge would replace an already bound command, or if `spec` redirects
    /// to a node that is not an executable node of this tree.
    pub fn add(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let name = spec.name();
        if let Some(existing) = self.child(parent, &name) {
            trace!(parent = %parent, node = %existing, name = %name, "Merging into existing node");
            self.merge(existing, spec);
            return existing;
        }

        if self.node(parent).redirect().is_some() {
            panic!("cannot add children to a redirected node");
        }
        if let Some(target) = spec.executable.as_ref().and_then(Executable::redirect) {
            let valid = self
                .get(target)
                .is_some_and(|node| node.executable().is_some());
            if !valid {
                panic!("redirect target {target} is not an executable node of this tree");
            }
        }

        let NodeSpec {
            kind,
            requirement,
            executable,
            children,
        } = spec;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            requirement,
            executable,
            children: Children::default(),
        });
        self.index_child(parent, id, name);

        for child in children {
            self.add(id, child);
        }
        id
    }

    fn index_child(&mut self, parent: NodeId, id: NodeId, name: String) {
        let index = match &self.nodes[id.0].kind {
            NodeKind::Root => unreachable!("the root is never a child"),
            NodeKind::Literal(_) => None,
            NodeKind::Argument(_) => Some(false),
            NodeKind::Flag(_) => Some(true),
        };
        let children = &mut self.nodes[parent.0].children;
        children.order.push(id);
        match index {
            None => {
                children.literals.insert(name.clone(), id);
            }
            Some(false) => children.arguments.push(id),
            Some(true) => children.flags.push(id),
        }
        children.by_name.insert(name, id);
    }

    fn merge(&mut self, target: NodeId, spec: NodeSpec) {
        let NodeSpec {
            executable,
            children,
            ..
        } = spec;
        let has_children = !self.children(target).is_empty();
        if let (Some(incoming), Some(existing)) =
            (executable, self.nodes[target.0].executable.as_mut())
        {
            if let Some(redirect) = incoming.redirect {
                if has_children {
                    panic!("cannot redirect a node with children");
                }
                match existing.redirect {
                    Some(current) if current != redirect => {
                        panic!("cannot replace the redirect of a node");
                    }
                    _ => existing.redirect = Some(redirect),
                }
            }
            if let Some(command) = incoming.command {
                existing.bind(command);
            }
        }
        for child in children {
            self.add(target, child);
        }
    }

    /// Removes the direct child of `parent` named `name` from every index.
    ///
    /// The node stays in the arena (ids are never reused) but is no longer
    /// reachable from `parent`.
    pub fn remove(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
        let children = &mut self.nodes[parent.0].children;
        let id = children.by_name.remove(name)?;
        children.order.retain(|child| *child != id);
        children.literals.remove(name);
        children.arguments.retain(|child| *child != id);
        children.flags.retain(|child| *child != id);
        Some(id)
    }

    /// Children of `node` worth trying at `cursor`.
    ///
    /// If the next token exactly names a literal child, that literal alone
    /// is returned. Otherwise every argument child followed by every flag
    /// child is returned. An exhausted cursor offers nothing. The cursor is
    /// never moved.
    pub fn relevant_children(&self, node: NodeId, cursor: &Cursor) -> Vec<NodeId> {
        if !cursor.readable() {
            return Vec::new();
        }
        let children = &self.node(node).children;
        if !children.literals.is_empty() {
            let token = cursor
                .remaining()
                .split(SEPARATOR)
                .next()
                .unwrap_or_default();
            if let Some(literal) = children.literals.get(token) {
                return vec![*literal];
            }
        }
        children
            .arguments
            .iter()
            .chain(children.flags.iter())
            .copied()
            .collect()
    }
}
