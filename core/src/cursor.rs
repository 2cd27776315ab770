//! Position-tracking view over a command line.
//!
//! A [`Cursor`] is the scanning primitive every parser in this crate works
//! against. Cloning a cursor is cheap (the input is shared), which is what
//! lets the dispatcher try several branches from the same position without
//! disturbing the caller's view.
//!
//! # Example
//!
//! ```
//! use command_dispatch_core::{Cursor, StringRange};
//!
//! let mut cursor = Cursor::new("give 64");
//! let start = cursor.index();
//! cursor.skip_while(|c| c != ' ');
//! assert_eq!(cursor.slice(StringRange::between(start, cursor.index())), "give");
//! assert_eq!(cursor.peek(), Some(' '));
//! ```

use std::fmt;
use std::sync::Arc;

/// Character separating tokens in a command line.
pub const SEPARATOR: char = ' ';

/// Half-open byte range `[start, end)` into a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringRange {
    /// First byte of the range.
    pub start: usize,
    /// One past the last byte of the range.
    pub end: usize,
}

impl StringRange {
    /// Creates a range covering `start..end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch_core::StringRange;
    ///
    /// let range = StringRange::between(2, 5);
    /// assert_eq!(range.len(), 3);
    /// ```
    pub fn between(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates an empty range positioned at `index`.
    pub fn at(index: usize) -> Self {
        Self::between(index, index)
    }

    /// Returns the smallest range spanning both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_dispatch_core::StringRange;
    ///
    /// let spanned = StringRange::at(0).expand(StringRange::between(4, 7));
    /// assert_eq!(spanned, StringRange::between(0, 7));
    /// ```
    pub fn expand(self, other: StringRange) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns `true` if the range covers no input.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

impl fmt::Display for StringRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Read position over an immutable command line.
///
/// Indexes are byte offsets and always sit on a character boundary.
#[derive(Debug, Clone)]
pub struct Cursor {
    input: Arc<str>,
    index: usize,
}

impl Cursor {
    /// Creates a cursor at the start of `input`.
    pub fn new(input: impl Into<Arc<str>>) -> Self {
        Self {
            input: input.into(),
            index: 0,
        }
    }

    /// The full input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current byte offset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the cursor to `index`, clamped to the input length.
    pub fn set_index(&mut self, index: usize) {
        let mut index = index.min(self.input.len());
        while !self.input.is_char_boundary(index) {
            index -= 1;
        }
        self.index = index;
    }

    /// Unconsumed part of the input.
    pub fn remaining(&self) -> &str {
        &self.input[self.index..]
    }

    /// Returns `true` while unconsumed input remains.
    pub fn readable(&self) -> bool {
        self.index < self.input.len()
    }

    /// Returns `true` if at least `len` more bytes can be read.
    pub fn readable_len(&self, len: usize) -> bool {
        self.index + len <= self.input.len()
    }

    /// Next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Consumes and returns the next character.
    pub fn read(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.index += next.len_utf8();
        Some(next)
    }

    /// Consumes one character, if any.
    pub fn skip(&mut self) {
        let _ = self.read();
    }

    /// Consumes `len` bytes (clamped to the input length).
    pub fn skip_n(&mut self, len: usize) {
        self.set_index(self.index + len);
    }

    /// Consumes characters while `predicate` holds and returns the range
    /// that was skipped.
    pub fn skip_while(&mut self, predicate: impl Fn(char) -> bool) -> StringRange {
        let start = self.index;
        while let Some(next) = self.peek() {
            if !predicate(next) {
                break;
            }
            self.index += next.len_utf8();
        }
        StringRange::between(start, self.index)
    }

    /// Input text covered by `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` does not lie on character boundaries of the input.
    pub fn slice(&self, range: StringRange) -> &str {
        &self.input[range.start..range.end]
    }

    /// Input consumed so far.
    pub fn consumed(&self) -> &str {
        &self.input[..self.index]
    }
}

impl From<&str> for Cursor {
    fn from(input: &str) -> Self {
        Self::new(input)
    }
}

impl From<String> for Cursor {
    fn from(input: String) -> Self {
        Self::new(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_peek_advance_by_character() {
        let mut cursor = Cursor::new("aé b");
        assert_eq!(cursor.read(), Some('a'));
        assert_eq!(cursor.peek(), Some('é'));
        cursor.skip();
        assert_eq!(cursor.index(), 3);
        assert_eq!(cursor.remaining(), " b");
    }

    #[test]
    fn test_skip_while_returns_skipped_range() {
        let mut cursor = Cursor::new("hello world");
        let range = cursor.skip_while(|c| c != SEPARATOR);
        assert_eq!(range, StringRange::between(0, 5));
        assert_eq!(cursor.slice(range), "hello");
        assert_eq!(cursor.peek(), Some(' '));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut cursor = Cursor::new("abc");
        let mut copy = cursor.clone();
        copy.skip_n(2);
        cursor.skip();
        assert_eq!(cursor.index(), 1);
        assert_eq!(copy.index(), 2);
    }

    #[test]
    fn test_readable_at_end() {
        let mut cursor = Cursor::new("ab");
        assert!(cursor.readable_len(2));
        assert!(!cursor.readable_len(3));
        cursor.skip_n(10);
        assert!(!cursor.readable());
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.read(), None);
    }

    #[test]
    fn test_range_expand_and_empty() {
        let range = StringRange::at(3);
        assert!(range.is_empty());
        let spanned = range.expand(StringRange::between(5, 9));
        assert_eq!(spanned, StringRange::between(3, 9));
        assert!(!spanned.is_empty());
        assert_eq!(spanned.to_string(), "3..9");
    }
}
