//! Error types for parsing and dispatching commands.
//!
//! Every failure found while reading a command line is a [`ParseError`]: a
//! [`ParseErrorKind`] plus the input and the byte offset where reading
//! stopped, so callers can point at the offending spot uniformly. Executing
//! a command adds two more failure modes (missing context values and failing
//! actions), collected in [`CommandError`].
//!
//! Build-time misuse of the node builders (redirecting a node that has
//! children, replacing a bound command, ...) is not represented here. Those
//! are programming errors and panic.

use thiserror::Error;

use crate::argument::{NumberKind, NumberValue};
use crate::cursor::Cursor;

/// Numeric argument failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    /// No numeric characters at the cursor.
    #[error("expected {kind}")]
    Expected {
        /// Type that was expected.
        kind: NumberKind,
    },
    /// Numeric characters were found but do not form a valid number.
    #[error("invalid {kind} '{text}'")]
    Invalid {
        /// Type that was expected.
        kind: NumberKind,
        /// Text that failed to parse.
        text: String,
    },
    /// Value is below the argument's lower bound.
    #[error("found {} with value of {value}, expected a value of {min} or greater", kind_of(.value))]
    TooLow {
        /// Inclusive lower bound.
        min: NumberValue,
        /// Parsed value.
        value: NumberValue,
    },
    /// Value is above the argument's upper bound.
    #[error("found {} with value of {value}, expected a value of {max} or less", kind_of(.value))]
    TooHigh {
        /// Inclusive upper bound.
        max: NumberValue,
        /// Parsed value.
        value: NumberValue,
    },
}

fn kind_of(value: &NumberValue) -> NumberKind {
    value.kind()
}

/// String argument failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringError {
    /// A quoted string did not start with `"`.
    #[error("expected quote to start a string")]
    ExpectedStartOfQuote,
    /// Input ended inside a quoted string.
    #[error("expected quote to end a string")]
    ExpectedEndOfQuote,
    /// A backslash was followed by something other than `"` or `\`.
    #[error("invalid escape sequence '{escape}'")]
    InvalidEscapeSequence {
        /// Character following the backslash.
        escape: char,
    },
}

/// Boolean argument failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BooleanError {
    /// Token is neither `true` nor `false`.
    #[error("invalid boolean '{token}', expected 'true' or 'false'")]
    Invalid {
        /// Token that was read.
        token: String,
    },
}

/// Failures found by the dispatcher itself rather than an argument type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Nothing in the input matched a registered command.
    #[error("unknown command")]
    UnknownCommand,
    /// A command matched but input remains that no child accepts.
    #[error("unknown argument")]
    UnknownArgument,
    /// A node parsed successfully but was not followed by a separator.
    #[error("expected argument separator (' '), but found a node that has not been completely parsed")]
    IncompleteParse,
}

/// What went wrong while reading a command line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// Numeric argument failure.
    #[error(transparent)]
    Number(#[from] NumberError),
    /// String argument failure.
    #[error(transparent)]
    String(#[from] StringError),
    /// Boolean argument failure.
    #[error(transparent)]
    Boolean(#[from] BooleanError),
    /// Dispatcher failure.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// Failure reported by a caller-defined argument type.
    #[error("{0}")]
    Custom(String),
}

/// A positional failure while reading a command line.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::{Cursor, DispatchError, ParseError};
///
/// let mut cursor = Cursor::new("foo bar");
/// cursor.skip_n(4);
/// let error = ParseError::new(DispatchError::UnknownArgument, &cursor);
/// assert_eq!(error.index(), 4);
/// assert_eq!(error.to_string(), "unknown argument at position 4: 'foo '");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at position {index}: '{}'", consumed(.input, .index))]
pub struct ParseError {
    kind: ParseErrorKind,
    input: String,
    index: usize,
}

fn consumed<'a>(input: &'a str, index: &usize) -> &'a str {
    input.get(..*index).unwrap_or(input)
}

impl ParseError {
    /// Creates an error positioned at the cursor's current index.
    pub fn new(kind: impl Into<ParseErrorKind>, cursor: &Cursor) -> Self {
        Self {
            kind: kind.into(),
            input: cursor.input().to_string(),
            index: cursor.index(),
        }
    }

    /// Creates a caller-defined failure positioned at the cursor.
    pub fn custom(message: impl Into<String>, cursor: &Cursor) -> Self {
        Self::new(ParseErrorKind::Custom(message.into()), cursor)
    }

    /// What went wrong.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// The full input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Byte offset where reading stopped.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if this is the given dispatcher failure.
    pub fn is_dispatch(&self, error: DispatchError) -> bool {
        matches!(self.kind, ParseErrorKind::Dispatch(kind) if kind == error)
    }
}

/// Failed lookups in a [`CommandContext`](crate::CommandContext).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// No value is stored under the key.
    #[error("no context value '{name}' of type {type_name}")]
    Missing {
        /// Key name.
        name: String,
        /// Requested value type.
        type_name: &'static str,
    },
}

/// Errors returned when dispatching a command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The command line could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A required context value was missing.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The bound command reported a failure.
    #[error("command failed: {0}")]
    Action(String),
}

impl CommandError {
    /// Convenience constructor for failures raised by bound commands.
    pub fn action(message: impl Into<String>) -> Self {
        CommandError::Action(message.into())
    }

    /// The parse failure, if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            CommandError::Parse(error) => Some(error),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`CommandError`].
pub type Result<T> = std::result::Result<T, CommandError>;
