//! String argument types.

use super::ArgumentType;
use crate::context::CommandContext;
use crate::cursor::Cursor;
use crate::error::{ParseError, StringError};

const QUOTE: char = '"';
const ESCAPE: char = '\\';

/// How much input a [`StringArgument`] consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMode {
    /// A maximal run of non-whitespace characters.
    Word,
    /// Everything up to the end of the input.
    Greedy,
    /// A `"`-delimited string where `\"` and `\\` are the only escapes.
    Quoted,
}

/// Reads a string in one of the [`StringMode`]s.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::{ArgumentType, CommandContext, Cursor, StringArgument};
///
/// let context = CommandContext::empty();
/// let mut cursor = Cursor::new(r#""a \"b\"" tail"#);
/// let value = StringArgument::quoted().parse(&context, &mut cursor).unwrap();
/// assert_eq!(value, r#"a "b""#);
/// assert_eq!(cursor.remaining(), " tail");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringArgument {
    mode: StringMode,
}

impl StringArgument {
    /// A single word.
    pub const fn word() -> Self {
        Self {
            mode: StringMode::Word,
        }
    }

    /// The remainder of the input.
    pub const fn greedy() -> Self {
        Self {
            mode: StringMode::Greedy,
        }
    }

    /// A quoted string.
    pub const fn quoted() -> Self {
        Self {
            mode: StringMode::Quoted,
        }
    }

    /// The consumption mode.
    pub fn mode(&self) -> StringMode {
        self.mode
    }
}

impl ArgumentType for StringArgument {
    type Output = String;

    fn parse(&self, _context: &CommandContext, cursor: &mut Cursor) -> Result<String, ParseError> {
        match self.mode {
            StringMode::Word => {
                let range = cursor.skip_while(|c| !c.is_whitespace());
                Ok(cursor.slice(range).to_string())
            }
            StringMode::Greedy => {
                let rest = cursor.remaining().to_string();
                cursor.skip_n(rest.len());
                Ok(rest)
            }
            StringMode::Quoted => parse_quoted(cursor),
        }
    }
}

fn parse_quoted(cursor: &mut Cursor) -> Result<String, ParseError> {
    if cursor.peek() != Some(QUOTE) {
        return Err(ParseError::new(StringError::ExpectedStartOfQuote, cursor));
    }
    cursor.skip();

    let mut result = String::new();
    let mut escaped = false;
    while let Some(c) = cursor.read() {
        if escaped {
            if c == ESCAPE || c == QUOTE {
                result.push(c);
                escaped = false;
            } else {
                cursor.set_index(cursor.index() - c.len_utf8());
                return Err(ParseError::new(
                    StringError::InvalidEscapeSequence { escape: c },
                    cursor,
                ));
            }
        } else if c == ESCAPE {
            escaped = true;
        } else if c == QUOTE {
            return Ok(result);
        } else {
            result.push(c);
        }
    }

    Err(ParseError::new(StringError::ExpectedEndOfQuote, cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn parse(kind: StringArgument, cursor: &mut Cursor) -> Result<String, ParseError> {
        kind.parse(&CommandContext::empty(), cursor)
    }

    fn escape(value: &str) -> String {
        let mut quoted = String::from("\"");
        for c in value.chars() {
            if c == QUOTE || c == ESCAPE {
                quoted.push(ESCAPE);
            }
            quoted.push(c);
        }
        quoted.push(QUOTE);
        quoted
    }

    #[test]
    fn test_greedy_from_start() {
        let mut cursor = Cursor::new("this is a test");
        assert_eq!(parse(StringArgument::greedy(), &mut cursor).unwrap(), "this is a test");
        assert!(!cursor.readable());
    }

    #[test]
    fn test_greedy_from_middle() {
        let mut cursor = Cursor::new("this is a test");
        cursor.set_index(8);
        assert_eq!(parse(StringArgument::greedy(), &mut cursor).unwrap(), "a test");
    }

    #[test]
    fn test_word_stops_at_whitespace() {
        let mut cursor = Cursor::new("hello\tworld");
        assert_eq!(parse(StringArgument::word(), &mut cursor).unwrap(), "hello");
        assert_eq!(cursor.peek(), Some('\t'));
    }

    #[test]
    fn test_quoted_round_trips_escaped_characters() {
        for original in ["", "\"", "\\", "\\\"", "a\"b\\c", "\"\"\\\\"] {
            let mut cursor = Cursor::new(escape(original));
            assert_eq!(parse(StringArgument::quoted(), &mut cursor).unwrap(), original);
            assert!(!cursor.readable());
        }
    }

    #[test]
    fn test_quoted_requires_opening_quote() {
        let mut cursor = Cursor::new("plain");
        let error = parse(StringArgument::quoted(), &mut cursor).unwrap_err();
        assert_eq!(
            error.kind(),
            &ParseErrorKind::String(StringError::ExpectedStartOfQuote)
        );
        assert_eq!(error.index(), 0);
    }

    #[test]
    fn test_quoted_requires_closing_quote() {
        let mut cursor = Cursor::new("\"unterminated");
        let error = parse(StringArgument::quoted(), &mut cursor).unwrap_err();
        assert_eq!(
            error.kind(),
            &ParseErrorKind::String(StringError::ExpectedEndOfQuote)
        );
        assert_eq!(error.index(), 13);
    }

    #[test]
    fn test_quoted_rejects_unknown_escape() {
        let mut cursor = Cursor::new(r#""a\nb""#);
        let error = parse(StringArgument::quoted(), &mut cursor).unwrap_err();
        assert_eq!(
            error.kind(),
            &ParseErrorKind::String(StringError::InvalidEscapeSequence { escape: 'n' })
        );
        assert_eq!(error.index(), 3);
    }
}
