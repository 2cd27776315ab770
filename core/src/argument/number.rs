//! Numeric argument types with optional inclusive bounds.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::ArgumentType;
use crate::context::CommandContext;
use crate::cursor::Cursor;
use crate::error::{NumberError, ParseError};

/// The numeric types an argument can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
}

impl NumberKind {
    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            NumberKind::Byte => "byte",
            NumberKind::Short => "short",
            NumberKind::Int => "integer",
            NumberKind::Long => "long",
            NumberKind::Float => "float",
            NumberKind::Double => "double",
        }
    }

    /// Returns `true` for `Float` and `Double`.
    pub fn is_floating(self) -> bool {
        matches!(self, NumberKind::Float | NumberKind::Double)
    }

    /// Returns `true` if `c` may appear in a literal of this kind.
    ///
    /// Integers accept digits and a sign; floats additionally accept `.`,
    /// `e`, and `E`.
    pub fn allows(self, c: char) -> bool {
        c.is_ascii_digit()
            || c == '+'
            || c == '-'
            || (self.is_floating() && matches!(c, '.' | 'e' | 'E'))
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed value or bound, tagged with its type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum NumberValue {
    /// 8-bit signed integer.
    Byte(i8),
    /// 16-bit signed integer.
    Short(i16),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
}

impl NumberValue {
    /// The type of the value.
    pub fn kind(&self) -> NumberKind {
        match self {
            NumberValue::Byte(_) => NumberKind::Byte,
            NumberValue::Short(_) => NumberKind::Short,
            NumberValue::Int(_) => NumberKind::Int,
            NumberValue::Long(_) => NumberKind::Long,
            NumberValue::Float(_) => NumberKind::Float,
            NumberValue::Double(_) => NumberKind::Double,
        }
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberValue::Byte(v) => write!(f, "{v}"),
            NumberValue::Short(v) => write!(f, "{v}"),
            NumberValue::Int(v) => write!(f, "{v}"),
            NumberValue::Long(v) => write!(f, "{v}"),
            NumberValue::Float(v) => write!(f, "{v}"),
            NumberValue::Double(v) => write!(f, "{v}"),
        }
    }
}

/// A primitive numeric type readable by [`NumberArgument`].
pub trait Number:
    Copy + PartialOrd + FromStr + fmt::Debug + Send + Sync + 'static
{
    /// Which kind this is.
    const KIND: NumberKind;
    /// Smallest representable value.
    const MIN: Self;
    /// Largest representable value.
    const MAX: Self;

    /// Tags the value for error reporting.
    fn to_value(self) -> NumberValue;
}

macro_rules! number {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Number for $ty {
                const KIND: NumberKind = NumberKind::$kind;
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;

                fn to_value(self) -> NumberValue {
                    NumberValue::$kind(self)
                }
            }
        )*
    };
}

number! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

/// Reads a number of type `N`, optionally constrained to `min..=max`.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::{ArgumentType, CommandContext, Cursor, IntArgument};
///
/// let percent = IntArgument::between(0, 100);
/// let context = CommandContext::empty();
/// assert_eq!(percent.parse(&context, &mut Cursor::new("42")).unwrap(), 42);
/// assert!(percent.parse(&context, &mut Cursor::new("101")).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberArgument<N> {
    bounds: Option<(N, N)>,
}

/// 8-bit integer argument.
pub type ByteArgument = NumberArgument<i8>;
/// 16-bit integer argument.
pub type ShortArgument = NumberArgument<i16>;
/// 32-bit integer argument.
pub type IntArgument = NumberArgument<i32>;
/// 64-bit integer argument.
pub type LongArgument = NumberArgument<i64>;
/// 32-bit float argument.
pub type FloatArgument = NumberArgument<f32>;
/// 64-bit float argument.
pub type DoubleArgument = NumberArgument<f64>;

impl<N: Number> NumberArgument<N> {
    /// Accepts any value of the type.
    pub const fn any() -> Self {
        Self { bounds: None }
    }

    /// Accepts values in `min..=max`.
    pub const fn between(min: N, max: N) -> Self {
        Self {
            bounds: Some((min, max)),
        }
    }

    /// Accepts values of at least `min`.
    pub const fn min(min: N) -> Self {
        Self::between(min, N::MAX)
    }

    /// Accepts values of at most `max`.
    pub const fn max(max: N) -> Self {
        Self::between(N::MIN, max)
    }

    /// The inclusive bounds, if any.
    pub fn bounds(&self) -> Option<(N, N)> {
        self.bounds
    }
}

impl<N: Number> ArgumentType for NumberArgument<N> {
    type Output = N;

    fn parse(&self, _context: &CommandContext, cursor: &mut Cursor) -> Result<N, ParseError> {
        let start = cursor.index();
        let range = cursor.skip_while(|c| N::KIND.allows(c));
        if range.is_empty() {
            return Err(ParseError::new(NumberError::Expected { kind: N::KIND }, cursor));
        }

        let text = cursor.slice(range);
        let Ok(value) = text.parse::<N>() else {
            let error = NumberError::Invalid {
                kind: N::KIND,
                text: text.to_string(),
            };
            cursor.set_index(start);
            return Err(ParseError::new(error, cursor));
        };

        if let Some((min, max)) = self.bounds {
            let error = if value < min {
                Some(NumberError::TooLow {
                    min: min.to_value(),
                    value: value.to_value(),
                })
            } else if value > max {
                Some(NumberError::TooHigh {
                    max: max.to_value(),
                    value: value.to_value(),
                })
            } else {
                None
            };
            if let Some(error) = error {
                cursor.set_index(start);
                return Err(ParseError::new(error, cursor));
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn parse<N: Number>(kind: NumberArgument<N>, input: &str) -> Result<N, ParseError> {
        kind.parse(&CommandContext::empty(), &mut Cursor::new(input))
    }

    fn number_error(error: ParseError) -> NumberError {
        match error.kind() {
            ParseErrorKind::Number(error) => error.clone(),
            other => panic!("expected a number error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_expected() {
        let error = number_error(parse(IntArgument::any(), "potato").unwrap_err());
        assert_eq!(error, NumberError::Expected { kind: NumberKind::Int });
    }

    #[test]
    fn test_parse_any_int() {
        assert_eq!(parse(IntArgument::any(), &i32::MIN.to_string()).unwrap(), i32::MIN);
        assert_eq!(parse(IntArgument::any(), "-0").unwrap(), 0);
        assert_eq!(parse(IntArgument::any(), "+7").unwrap(), 7);
        assert_eq!(parse(IntArgument::any(), &i32::MAX.to_string()).unwrap(), i32::MAX);
    }

    #[test]
    fn test_parse_invalid_resets_cursor() {
        let mut cursor = Cursor::new("1-2");
        let error = IntArgument::any()
            .parse(&CommandContext::empty(), &mut cursor)
            .unwrap_err();
        assert_eq!(error.index(), 0);
        assert_eq!(
            number_error(error),
            NumberError::Invalid {
                kind: NumberKind::Int,
                text: "1-2".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_overflow_is_invalid() {
        let error = number_error(parse(ByteArgument::any(), "128").unwrap_err());
        assert!(matches!(error, NumberError::Invalid { kind: NumberKind::Byte, .. }));
        assert_eq!(parse(ByteArgument::any(), "-128").unwrap(), i8::MIN);
    }

    #[test]
    fn test_parse_min_and_max() {
        let min = IntArgument::min(100);
        assert_eq!(
            number_error(parse(min, "99").unwrap_err()),
            NumberError::TooLow {
                min: NumberValue::Int(100),
                value: NumberValue::Int(99),
            }
        );
        assert_eq!(parse(min, "100").unwrap(), 100);

        let max = IntArgument::max(100);
        assert_eq!(parse(max, "100").unwrap(), 100);
        assert_eq!(
            number_error(parse(max, "101").unwrap_err()),
            NumberError::TooHigh {
                max: NumberValue::Int(100),
                value: NumberValue::Int(101),
            }
        );
    }

    #[test]
    fn test_parse_between_bounds_are_inclusive() {
        let between = LongArgument::between(90, 100);
        assert!(parse(between, "89").is_err());
        assert_eq!(parse(between, "90").unwrap(), 90);
        assert_eq!(parse(between, "100").unwrap(), 100);
        assert!(parse(between, "101").is_err());
    }

    /// Checks both inclusive ends of `between(min, max)` and the exact
    /// error payloads one step outside each end.
    fn assert_bounds<N: Number + PartialEq>(
        min: N,
        max: N,
        [below, low, high, above]: [&str; 4],
        expected: [NumberValue; 4],
    ) {
        let between = NumberArgument::between(min, max);
        assert_eq!(parse(between, low).unwrap(), min);
        assert_eq!(parse(between, high).unwrap(), max);
        assert_eq!(
            number_error(parse(between, below).unwrap_err()),
            NumberError::TooLow {
                min: expected[0],
                value: expected[1],
            }
        );
        assert_eq!(
            number_error(parse(between, above).unwrap_err()),
            NumberError::TooHigh {
                max: expected[2],
                value: expected[3],
            }
        );
    }

    #[test]
    fn test_byte_bounds() {
        assert_bounds::<i8>(
            -10,
            10,
            ["-11", "-10", "10", "11"],
            [
                NumberValue::Byte(-10),
                NumberValue::Byte(-11),
                NumberValue::Byte(10),
                NumberValue::Byte(11),
            ],
        );
    }

    #[test]
    fn test_short_bounds() {
        assert_bounds::<i16>(
            -300,
            300,
            ["-301", "-300", "300", "301"],
            [
                NumberValue::Short(-300),
                NumberValue::Short(-301),
                NumberValue::Short(300),
                NumberValue::Short(301),
            ],
        );
    }

    #[test]
    fn test_int_bounds() {
        assert_bounds::<i32>(
            -70_000,
            70_000,
            ["-70001", "-70000", "70000", "70001"],
            [
                NumberValue::Int(-70_000),
                NumberValue::Int(-70_001),
                NumberValue::Int(70_000),
                NumberValue::Int(70_001),
            ],
        );
    }

    #[test]
    fn test_long_bounds() {
        assert_bounds::<i64>(
            -5_000_000_000,
            5_000_000_000,
            ["-5000000001", "-5000000000", "5000000000", "5000000001"],
            [
                NumberValue::Long(-5_000_000_000),
                NumberValue::Long(-5_000_000_001),
                NumberValue::Long(5_000_000_000),
                NumberValue::Long(5_000_000_001),
            ],
        );
    }

    #[test]
    fn test_float_bounds() {
        assert_bounds::<f32>(
            -1.5,
            2.5,
            ["-1.75", "-1.5", "2.5", "2.75"],
            [
                NumberValue::Float(-1.5),
                NumberValue::Float(-1.75),
                NumberValue::Float(2.5),
                NumberValue::Float(2.75),
            ],
        );
    }

    #[test]
    fn test_double_bounds() {
        assert_bounds::<f64>(
            -0.25,
            0.75,
            ["-0.5", "-0.25", "0.75", "1.0"],
            [
                NumberValue::Double(-0.25),
                NumberValue::Double(-0.5),
                NumberValue::Double(0.75),
                NumberValue::Double(1.0),
            ],
        );
    }

    #[test]
    fn test_parse_floating() {
        assert_eq!(parse(DoubleArgument::any(), "-5.7").unwrap(), -5.7);
        assert_eq!(parse(DoubleArgument::any(), "1e3").unwrap(), 1000.0);
        assert_eq!(parse(FloatArgument::any(), "0.5").unwrap(), 0.5);
        assert_eq!(parse(DoubleArgument::min(100.0), "100.0").unwrap(), 100.0);
        assert!(parse(DoubleArgument::min(100.0), "99.0").is_err());
        assert!(parse(FloatArgument::max(-1.0), "-0.5").is_err());
    }

    #[test]
    fn test_integer_stops_at_decimal_point() {
        let mut cursor = Cursor::new("12.5");
        let value = ShortArgument::any()
            .parse(&CommandContext::empty(), &mut cursor)
            .unwrap();
        assert_eq!(value, 12);
        assert_eq!(cursor.peek(), Some('.'));
    }

    #[test]
    fn test_value_display_and_kind() {
        assert_eq!(NumberValue::Int(11).to_string(), "11");
        assert_eq!(NumberValue::Double(2.5).kind(), NumberKind::Double);
        assert_eq!(NumberKind::Int.to_string(), "integer");
    }
}
