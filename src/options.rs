//! Configuration options for ESON parsing and stringification.
//!
//! - [`ParseOptions`]: strict top-level mode, nesting limit, variable bindings
//! - [`StringifyOptions`]: indentation width for pretty output
//!
//! ## Examples
//!
//! ```rust
//! use serde_eson::{parse_with_options, stringify_with_options, ParseOptions, StringifyOptions};
//!
//! // Reject a bare object literal at the start of the document
//! let options = ParseOptions::new().with_strict(true);
//! assert!(parse_with_options("{}", &options).is_err());
//! assert!(parse_with_options("({})", &options).is_ok());
//!
//! // Four-space indentation
//! let value = serde_eson::parse("[1, 2]").unwrap();
//! let text = stringify_with_options(&value, &StringifyOptions::new().with_indent(4));
//! assert_eq!(text, "[\n    1,\n    2\n]");
//! ```

use crate::{Map, Value};

/// Default limit for nested arrays, objects, groups and constructor calls.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for parsing.
///
/// # Examples
///
/// ```rust
/// use serde_eson::{parse_with_options, ParseOptions, Value};
///
/// let options = ParseOptions::new()
///     .with_variable("answer", Value::from(42))
///     .with_assignment(true);
///
/// let value = parse_with_options("x = answer, [x, x]", &options).unwrap();
/// assert_eq!(value, serde_eson::parse("[42, 42]").unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Reject an unparenthesized object literal at the very start of input.
    pub strict: bool,
    pub max_depth: usize,
    /// Allow `name = expr` bindings scoped to one parse call.
    pub allow_assignment: bool,
    /// Variables visible to the document, looked up before the builtins.
    pub variables: Map,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            allow_assignment: false,
            variables: Map::new(),
        }
    }
}

impl ParseOptions {
    /// Creates default options (lenient top level, depth limit of 128, no bindings).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::ParseOptions;
    ///
    /// let options = ParseOptions::new();
    /// assert!(!options.strict);
    /// assert_eq!(options.max_depth, 128);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables strict top-level mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables `name = expr` variable bindings.
    #[must_use]
    pub fn with_assignment(mut self, allow: bool) -> Self {
        self.allow_assignment = allow;
        self
    }

    /// Pre-binds a variable for the document to reference.
    #[must_use]
    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }
}

/// Configuration options for stringification.
///
/// An `indent` of zero produces compact output with no extra whitespace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringifyOptions {
    pub indent: usize,
}

impl StringifyOptions {
    /// Creates compact options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::StringifyOptions;
    ///
    /// let options = StringifyOptions::new();
    /// assert_eq!(options.indent, 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output with two-space indentation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::StringifyOptions;
    ///
    /// assert_eq!(StringifyOptions::pretty().indent, 2);
    /// ```
    #[must_use]
    pub fn pretty() -> Self {
        StringifyOptions { indent: 2 }
    }

    /// Sets the indentation width (spaces per nesting level).
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[inline]
    pub(crate) fn is_pretty(&self) -> bool {
        self.indent > 0
    }
}
