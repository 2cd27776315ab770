//! Typed command parsing and dispatch.
//!
//! A grammar is a tree of nodes registered once on a [`Dispatcher`] and then
//! used to parse and execute many input lines:
//!
//! - [`literal`] nodes match a fixed token.
//! - [`argument`] nodes read a typed value with an [`ArgumentType`]
//!   ([`IntArgument`], [`StringArgument`], [`BooleanArgument`], ...).
//! - [`flag`] nodes match a `-x` token.
//!
//! Registrations sharing a prefix are merged into one tree, aliases can
//! [`redirect`](CommandBuilder::redirect) into another subtree, and nodes can
//! be hidden behind a [`requires`](CommandBuilder::requires) predicate over
//! the caller's [`CommandContext`].
//!
//! Parsing produces a [`ParseResult`]; executing it hands the bound command
//! a [`CommandStack`] with every parsed value. Failures are [`ParseError`]s
//! that carry the input and the offending position.
//!
//! [`Dispatcher::usage`] renders a compact grammar summary for help output.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use command_dispatch_core::*;
//!
//! let name = StringArgument::word().named("name");
//! let greeted = Arc::new(Mutex::new(Vec::new()));
//!
//! let mut dispatcher = Dispatcher::new();
//! let sink = Arc::clone(&greeted);
//! let greet = dispatcher.register(
//!     literal("greet").then(argument(name.clone()).executes(move |stack| {
//!         sink.lock().unwrap().push(stack.argument(&name).clone());
//!         Ok(())
//!     })),
//! );
//! dispatcher.register(literal("hi").redirect(greet));
//!
//! let context = CommandContext::empty();
//! dispatcher.execute("greet alice", &context).unwrap();
//! dispatcher.execute("hi bob", &context).unwrap();
//! assert_eq!(*greeted.lock().unwrap(), vec!["alice", "bob"]);
//!
//! let error = dispatcher.execute("greet alice bob", &context).unwrap_err();
//! assert_eq!(
//!     error.to_string(),
//!     "unknown argument at position 12: 'greet alice '"
//! );
//!
//! let usage: Vec<String> = dispatcher
//!     .usage(dispatcher.root(), &context)
//!     .into_iter()
//!     .map(|(_, usage)| usage)
//!     .collect();
//! assert_eq!(usage, vec!["greet <name>", "hi -> greet"]);
//! ```

mod argument;
mod context;
mod cursor;
mod dispatcher;
mod error;
mod node;
mod stack;
mod usage;

pub use argument::{
    Argument, ArgumentKey, ArgumentParser, ArgumentType, BooleanArgument, ByteArgument,
    DoubleArgument, FloatArgument, IntArgument, LongArgument, Number, NumberArgument, NumberKind,
    NumberValue, ShortArgument, StringArgument, StringMode,
};
pub use context::{CommandContext, CommandContextBuilder, Key};
pub use cursor::{Cursor, SEPARATOR, StringRange};
pub use dispatcher::{Dispatcher, ParseResult};
pub use error::{
    BooleanError, CommandError, ContextError, DispatchError, NumberError, ParseError,
    ParseErrorKind, Result, StringError,
};
pub use node::{
    Command, CommandBuilder, CommandTree, Executable, FlagBuilder, Node, NodeId, NodeKind,
    NodeSpec, Requirement, argument, flag, literal,
};
pub use stack::{CommandStack, FlagHit, StackBuilder};
pub use usage::{UsageStyle, smart_usage};
