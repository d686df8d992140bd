//! Cursor over ESON source text.
//!
//! The [`Scanner`] owns the read position for one parse call. Every grammar
//! rule in [`crate::parser`] advances it through the small set of operations
//! below; none of them look further back than the current position.
//!
//! Consuming operations either succeed and advance, or fail with a positional
//! syntax error built by [`Scanner::error`]. The `test*` family never advances
//! and never fails. [`Scanner::consume_if`] and [`Scanner::star`] are the only
//! consuming operations that cannot fail.
//!
//! ## Examples
//!
//! ```rust
//! use serde_eson::class::{DIGIT, IDENTIFIER_START, IDENTIFIER_TAIL};
//! use serde_eson::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("abc123 rest");
//! scanner.one(IDENTIFIER_START).unwrap();
//! assert_eq!(scanner.star(IDENTIFIER_TAIL), "bc123");
//! assert!(scanner.plus(DIGIT).is_err());
//! assert_eq!(scanner.position(), 6);
//! ```

use crate::class::CharPattern;
use crate::{Error, Result};

/// A cursor over the input of a single parse call.
///
/// Positions are byte offsets into the UTF-8 input.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    at_start: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the logical start of `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input,
            pos: 0,
            at_start: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the unconsumed remainder of the input.
    #[inline]
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Returns the input between `start` and the current position.
    #[must_use]
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }

    /// Returns the current character without consuming it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the character `offset` characters past the current one.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    /// Tests the current character against `pattern`.
    #[inline]
    #[must_use]
    pub fn test<P: CharPattern>(&self, pattern: P) -> bool {
        self.peek().is_some_and(|c| pattern.matches(c))
    }

    /// Tests the character `offset` characters ahead against `pattern`.
    #[must_use]
    pub fn test_at<P: CharPattern>(&self, pattern: P, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|c| pattern.matches(c))
    }

    /// Tests consecutive characters against a sequence of patterns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::class::{DIGIT, HEX_PREFIX};
    /// use serde_eson::scanner::Scanner;
    ///
    /// let scanner = Scanner::new("0x1F");
    /// assert!(scanner.test_sequence(&['0'.into(), HEX_PREFIX]));
    /// assert!(!scanner.test_sequence(&[DIGIT, DIGIT]));
    /// ```
    #[must_use]
    pub fn test_sequence(&self, patterns: &[crate::class::CharClass]) -> bool {
        let mut chars = self.rest().chars();
        patterns
            .iter()
            .all(|pattern| chars.next().is_some_and(|c| pattern.matches(c)))
    }

    /// Tests whether the remaining input starts with `literal`.
    #[inline]
    #[must_use]
    pub fn test_str(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Consumes exactly `n` characters and returns them.
    ///
    /// Fails with [`Error::UnexpectedEnd`] when fewer than `n` remain.
    pub fn consume(&mut self, n: usize) -> Result<&'a str> {
        let start = self.pos;
        let mut end = start;
        let mut chars = self.rest().chars();
        for _ in 0..n {
            match chars.next() {
                Some(c) => end += c.len_utf8(),
                None => {
                    self.pos = end;
                    return Err(Error::UnexpectedEnd);
                }
            }
        }
        self.advance_to(end);
        Ok(&self.input[start..end])
    }

    /// Consumes the current character if it matches `pattern`.
    pub fn consume_if<P: CharPattern>(&mut self, pattern: P) -> Option<char> {
        match self.peek() {
            Some(c) if pattern.matches(c) => {
                self.advance_to(self.pos + c.len_utf8());
                Some(c)
            }
            _ => None,
        }
    }

    /// Consumes one character matching `pattern`.
    pub fn one<P: CharPattern>(&mut self, pattern: P) -> Result<char> {
        self.consume_if(pattern).ok_or_else(|| self.error())
    }

    /// Consumes zero or more characters matching `pattern`.
    pub fn star<P: CharPattern>(&mut self, pattern: P) -> &'a str {
        let start = self.pos;
        let len: usize = self
            .rest()
            .chars()
            .take_while(|c| pattern.matches(*c))
            .map(char::len_utf8)
            .sum();
        if len > 0 {
            self.advance_to(start + len);
        }
        &self.input[start..self.pos]
    }

    /// Consumes one or more characters matching `pattern`.
    pub fn plus<P: CharPattern>(&mut self, pattern: P) -> Result<&'a str> {
        let matched = self.star(pattern);
        if matched.is_empty() {
            Err(self.error())
        } else {
            Ok(matched)
        }
    }

    /// Consumes `literal` if the remaining input starts with it.
    pub fn consume_str(&mut self, literal: &str) -> bool {
        if !literal.is_empty() && self.test_str(literal) {
            self.advance_to(self.pos + literal.len());
            true
        } else {
            false
        }
    }

    /// Builds the syntax error for the current position.
    #[must_use]
    pub fn error(&self) -> Error {
        Error::unexpected(self.peek(), self.pos)
    }

    /// Returns `true` while nothing but space and comments has been consumed.
    #[inline]
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.at_start
    }

    /// Restores the logical-start flag, typically after skipping space.
    #[inline]
    pub fn restore_start(&mut self, at_start: bool) {
        self.at_start = at_start;
    }

    fn advance_to(&mut self, pos: usize) {
        self.pos = pos;
        self.at_start = false;
    }
}
