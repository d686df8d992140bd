//! # serde_eson
//!
//! A parser and stringifier for ESON, the ECMAScript Object Notation: a strict
//! superset of JSON that reads like a JavaScript expression and round-trips
//! the values JSON drops on the floor.
//!
//! ## What ESON adds to JSON
//!
//! - **Comments and relaxed syntax**: `//` and `/* */` comments, bare
//!   identifier keys, single-quoted and template strings, trailing commas
//! - **More numbers**: `NaN`, `Infinity`, hex/binary/octal literals,
//!   `1_000` digit separators, big integers such as `37n`
//! - **Rich values**: `undefined`, array holes (`[1, , 3]`), and
//!   `new Date(...)`, `new Map(...)`, `new Set(...)`, `/regex/flags`,
//!   `new Error(...)` and other builtin constructions
//! - **Expressions**: spreads (`[...a]`, `{...o}`), member access
//!   (`[1, 2].length`), unary signs and template interpolation
//!
//! Parsing never evaluates code. Constructor calls go through a closed table
//! of builtins, and identifiers other than the keywords resolve only to
//! variables supplied through [`ParseOptions`].
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_eson::{parse, stringify};
//!
//! let value = parse("{when: new Date(0), tags: new Set(['a', 'b']), big: 37n}").unwrap();
//! assert_eq!(
//!     stringify(&value),
//!     "({when:new Date(0),tags:new Set(['a','b']),big:37n})"
//! );
//! assert_eq!(parse(&stringify(&value)).unwrap(), value);
//! ```
//!
//! ## Typed Data
//!
//! Any `Serialize`/`Deserialize` type goes through the notation via
//! [`to_string`] and [`from_str`]:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_eson::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "({id:123,name:'Alice',active:true})");
//!
//! let user_back: User = from_str(&text).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ## Dynamic Values with the eson! Macro
//!
//! ```rust
//! use serde_eson::{eson, Value};
//!
//! let data = eson!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde", undefined]
//! });
//!
//! if let Value::Object(obj) = data {
//!     assert_eq!(obj.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! }
//! ```
//!
//! ## Errors
//!
//! Grammar errors stop parsing immediately and carry the byte index of the
//! offending character. Semantic errors, such as an unknown identifier or a
//! failed construction, are collected and the first one is reported once the
//! whole document has parsed. See [`error`] for the full list.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Nesting is bounded by [`ParseOptions::max_depth`]
//! - No panics in the public API

pub mod builtins;
pub mod class;
pub mod coerce;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod ser;
pub mod stringify;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, ErrorKind, Result};
pub use map::Map;
pub use options::{ParseOptions, StringifyOptions, DEFAULT_MAX_DEPTH};
pub use ser::{to_value, ValueSerializer};
pub use value::{Boxed, Callable, ErrorName, ErrorValue, Pattern, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Parses ESON text into a [`Value`] with default options.
///
/// Empty input (or input holding only whitespace and comments) yields
/// [`Value::Undefined`].
///
/// # Examples
///
/// ```rust
/// use serde_eson::{parse, Value};
///
/// assert_eq!(parse("  // nothing\n").unwrap(), Value::Undefined);
/// assert_eq!(parse("0x1F").unwrap(), Value::from(31));
/// assert_eq!(parse("[,3]").unwrap().as_array().unwrap().len(), 2);
/// ```
///
/// # Errors
///
/// Returns the first syntax error, or the first deferred semantic error of a
/// structurally valid document.
pub fn parse(text: &str) -> Result<Value> {
    parse_with_options(text, &ParseOptions::default())
}

/// Parses ESON text into a [`Value`] with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_eson::{parse_with_options, ParseOptions};
///
/// let strict = ParseOptions::new().with_strict(true);
/// assert!(parse_with_options("{}", &strict).is_err());
/// assert!(parse_with_options("({})", &strict).unwrap().is_object());
/// ```
///
/// # Errors
///
/// See [`parse`]. Nesting beyond [`ParseOptions::max_depth`] fails with
/// [`Error::DepthLimitExceeded`].
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Value> {
    parser::Parser::new(text, options).parse()
}

/// Writes a [`Value`] as compact ESON text.
///
/// # Examples
///
/// ```rust
/// use serde_eson::{parse, stringify};
///
/// let value = parse("[1, , 'two', NaN]").unwrap();
/// assert_eq!(stringify(&value), "[1,,'two',NaN]");
/// ```
#[must_use]
pub fn stringify(value: &Value) -> String {
    stringify::stringify(value)
}

/// Writes a [`Value`] as ESON text indented by two spaces per level.
#[must_use]
pub fn stringify_pretty(value: &Value) -> String {
    stringify::stringify_with_options(value, &StringifyOptions::pretty())
}

/// Writes a [`Value`] as ESON text with custom options.
#[must_use]
pub fn stringify_with_options(value: &Value, options: &StringifyOptions) -> String {
    stringify::stringify_with_options(value, options)
}

/// Serialize any `T: Serialize` to a compact ESON string.
///
/// # Examples
///
/// ```rust
/// use serde_eson::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "({x:1,y:2})");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be converted, for instance a map
/// with non-scalar keys.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &StringifyOptions::default())
}

/// Serialize any `T: Serialize` to a pretty-printed ESON string.
///
/// # Errors
///
/// Returns an error if the value cannot be converted.
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &StringifyOptions::pretty())
}

/// Serialize any `T: Serialize` to an ESON string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_eson::{to_string_with_options, StringifyOptions};
///
/// let text = to_string_with_options(&vec![1, 2], &StringifyOptions::new().with_indent(4)).unwrap();
/// assert_eq!(text, "[\n    1,\n    2\n]");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be converted.
pub fn to_string_with_options<T>(value: &T, options: &StringifyOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(stringify::stringify_with_options(&to_value(value)?, options))
}

/// Serialize any `T: Serialize` to a writer as compact ESON.
///
/// # Examples
///
/// ```rust
/// use serde_eson::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &("a", 1)).unwrap();
/// assert_eq!(buffer, b"['a',1]");
/// ```
///
/// # Errors
///
/// Returns an error if conversion fails or writing to the writer fails.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &StringifyOptions::default())
}

/// Serialize any `T: Serialize` to a writer as ESON with custom options.
///
/// # Errors
///
/// Returns an error if conversion fails or writing to the writer fails.
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &StringifyOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Convert a [`Value`] into any `T: Deserialize`.
///
/// # Examples
///
/// ```rust
/// use serde_eson::{from_value, parse};
///
/// let pair: (String, f64) = from_value(parse("['pi', 3.14]").unwrap()).unwrap();
/// assert_eq!(pair, ("pi".to_string(), 3.14));
/// ```
///
/// # Errors
///
/// Returns an error if the value does not fit `T`.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(Deserializer::new(value))
}

/// Deserialize an instance of type `T` from ESON text.
///
/// # Examples
///
/// ```rust
/// use serde_eson::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{x: 1, /* y */ y: 2,}").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the text does not parse or the value does not fit `T`.
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_str_with_options(s, &ParseOptions::default())
}

/// Deserialize an instance of type `T` from ESON text with custom options.
///
/// # Errors
///
/// Returns an error if the text does not parse or the value does not fit `T`.
pub fn from_str_with_options<T>(s: &str, options: &ParseOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(parse_with_options(s, options)?)
}

/// Deserialize an instance of type `T` from an I/O stream of ESON.
///
/// # Examples
///
/// ```rust
/// use serde_eson::from_reader;
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(b"[1, 2, 3]");
/// let numbers: Vec<u8> = from_reader(cursor).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the text does not parse, or the value
/// does not fit `T`.
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of ESON text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, the text does not
/// parse, or the value does not fit `T`.
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
