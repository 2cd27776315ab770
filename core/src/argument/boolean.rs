//! Boolean argument type.

use super::ArgumentType;
use crate::context::CommandContext;
use crate::cursor::Cursor;
use crate::error::{BooleanError, ParseError};

/// Reads exactly `true` or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BooleanArgument;

impl BooleanArgument {
    /// The boolean argument type.
    pub const fn any() -> Self {
        BooleanArgument
    }
}

impl ArgumentType for BooleanArgument {
    type Output = bool;

    fn parse(&self, _context: &CommandContext, cursor: &mut Cursor) -> Result<bool, ParseError> {
        let start = cursor.index();
        let range = cursor.skip_while(|c| !c.is_whitespace());
        match cursor.slice(range) {
            "true" => Ok(true),
            "false" => Ok(false),
            token => {
                let error = BooleanError::Invalid {
                    token: token.to_string(),
                };
                cursor.set_index(start);
                Err(ParseError::new(error, cursor))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    #[test]
    fn test_parse_true_and_false() {
        let context = CommandContext::empty();
        assert!(BooleanArgument.parse(&context, &mut Cursor::new("true")).unwrap());
        assert!(!BooleanArgument.parse(&context, &mut Cursor::new("false rest")).unwrap());
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let mut cursor = Cursor::new("TRUE");
        let error = BooleanArgument
            .parse(&CommandContext::empty(), &mut cursor)
            .unwrap_err();
        assert_eq!(
            error.kind(),
            &ParseErrorKind::Boolean(BooleanError::Invalid {
                token: "TRUE".to_string()
            })
        );
        assert_eq!(cursor.index(), 0);
    }
}
