//! Error types for ESON parsing, construction and serde conversion.
//!
//! ## Error Categories
//!
//! - **Syntax errors**: malformed notation. Raised immediately at the point of
//!   detection and carry the byte index of the offending character.
//! - **Deferred errors**: unresolved identifiers, failed `new` constructions,
//!   invalid regular-expression flags and similar semantic problems. The parser
//!   records them and keeps going; the first one is returned only once the whole
//!   document has parsed structurally, so a later syntax error always wins.
//! - **Data errors**: raised by the serde bridge when a [`Value`](crate::Value)
//!   does not fit the requested Rust type.
//!
//! ## Examples
//!
//! ```rust
//! use serde_eson::{parse, Error, ErrorKind};
//!
//! let err = parse("new {}").unwrap_err();
//! assert_eq!(err.to_string(), "Unexpected character '{' at index 4");
//! assert_eq!(err.kind(), ErrorKind::Syntax);
//!
//! let err = parse("[new Foo(), 1]").unwrap_err();
//! assert_eq!(err.kind().name(), "ReferenceError");
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while parsing, constructing or
/// converting ESON values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A character that no grammar rule accepts at this position.
    #[error("Unexpected character {} at index {index}", quote_char(.character))]
    UnexpectedCharacter { character: char, index: usize },

    /// The input ended while a grammar rule still expected characters.
    #[error("Unexpected end of input")]
    UnexpectedEnd,

    /// A `\u{...}` escape above U+10FFFF.
    #[error("Undefined Unicode code-point")]
    InvalidCodePoint { index: usize },

    /// The input nests deeper than [`ParseOptions::max_depth`](crate::ParseOptions).
    #[error("Maximum nesting depth of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    /// An identifier that is neither a keyword, a bound variable nor a builtin.
    #[error("{name} is not defined")]
    Reference { name: String },

    /// A value was used in a way its kind does not support.
    #[error("{0}")]
    Type(String),

    /// A numeric argument outside the accepted range.
    #[error("{0}")]
    Range(String),

    /// Duplicate or unknown regular-expression flags.
    #[error("Invalid flags supplied to RegExp constructor '{flags}'")]
    InvalidFlags { flags: String },

    /// Custom error raised by the serde bridge.
    #[error("Error: {0}")]
    Custom(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),
}

/// The broad class of an [`Error`], mirroring the ECMAScript error
/// constructors the notation borrows its syntax from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Reference,
    Type,
    Range,
    /// Resource limit, such as the nesting depth guard.
    Limit,
    /// Serde conversion failure.
    Data,
    Io,
}

impl ErrorKind {
    /// Returns the conventional constructor name for this kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::Syntax.name(), "SyntaxError");
    /// assert_eq!(ErrorKind::Reference.name(), "ReferenceError");
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Limit => "LimitError",
            ErrorKind::Data => "DataError",
            ErrorKind::Io => "IoError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Error {
    /// Creates the positional syntax error for `character` found at `index`.
    ///
    /// Passing `None` produces [`Error::UnexpectedEnd`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::Error;
    ///
    /// let err = Error::unexpected(Some('}'), 7);
    /// assert_eq!(err.to_string(), "Unexpected character '}' at index 7");
    /// assert_eq!(Error::unexpected(None, 7), Error::UnexpectedEnd);
    /// ```
    pub fn unexpected(character: Option<char>, index: usize) -> Self {
        match character {
            Some(character) => Error::UnexpectedCharacter { character, index },
            None => Error::UnexpectedEnd,
        }
    }

    /// Creates a reference error for an unresolved identifier.
    pub fn reference(name: &str) -> Self {
        Error::Reference {
            name: name.to_string(),
        }
    }

    /// Creates a type error with a display message.
    pub fn type_error<T: fmt::Display>(msg: T) -> Self {
        Error::Type(msg.to_string())
    }

    /// Creates a range error with a display message.
    pub fn range_error<T: fmt::Display>(msg: T) -> Self {
        Error::Range(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedCharacter { .. }
            | Error::UnexpectedEnd
            | Error::InvalidCodePoint { .. }
            | Error::InvalidFlags { .. } => ErrorKind::Syntax,
            Error::DepthLimitExceeded { .. } => ErrorKind::Limit,
            Error::Reference { .. } => ErrorKind::Reference,
            Error::Type(_) => ErrorKind::Type,
            Error::Range(_) => ErrorKind::Range,
            Error::Custom(_) => ErrorKind::Data,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns `true` for grammar failures that abort parsing on the spot.
    ///
    /// Invalid regular-expression flags are reported as `SyntaxError` by
    /// [`Error::kind`] but are deferred like other semantic errors, so they are
    /// not counted here.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedCharacter { .. } | Error::UnexpectedEnd | Error::InvalidCodePoint { .. }
        )
    }

    /// Returns the byte index attached to positional errors.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Error::UnexpectedCharacter { index, .. } | Error::InvalidCodePoint { index } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

fn quote_char(character: &char) -> String {
    crate::stringify::quote_str(character.encode_utf8(&mut [0; 4]))
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
