//! Dynamic value representation for ESON data.
//!
//! This module provides the [`Value`] enum, the result of every parse and the
//! input of every stringify call, together with the payload types of the rich
//! kinds: [`Pattern`], [`Boxed`], [`ErrorValue`] and [`Callable`].
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use serde_eson::{eson, Value};
//!
//! let undefined = Value::Undefined;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! let obj = eson!({
//!     "name": "Alice",
//!     "tags": ["admin", "ops"]
//! });
//! assert!(obj.is_object());
//! ```
//!
//! ### Holes and Rich Kinds
//!
//! ```rust
//! use serde_eson::{parse, Value};
//!
//! let value = parse("[, 3]").unwrap();
//! let slots = value.as_array().unwrap();
//! assert_eq!(slots.len(), 2);
//! assert!(slots[0].is_none());
//! assert_eq!(value.elements().count(), 1);
//!
//! let date = parse("new Date(0)").unwrap();
//! assert_eq!(date, Value::Timestamp(0.0));
//! assert_eq!(date.kind_name(), "Date");
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use serde_eson::Value;
//! use std::convert::TryFrom;
//!
//! let value = Value::from(42);
//! let num: i64 = i64::try_from(value).unwrap();
//! assert_eq!(num, 42);
//! ```

use crate::coerce;
use crate::{Error, Map, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Largest integer magnitude a `Number` represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A dynamically-typed representation of any ESON value.
///
/// Arrays hold `Option<Value>` slots: `None` is a hole, which counts toward
/// the length but is skipped by [`Value::elements`].
///
/// Equality is structural. Floating-point payloads compare with
/// SameValueZero semantics, so `NaN == NaN` and `0.0 == -0.0`.
///
/// # Examples
///
/// ```rust
/// use serde_eson::Value;
///
/// let nan = Value::Number(f64::NAN);
/// assert_eq!(nan, Value::Number(f64::NAN));
/// assert!(Value::Undefined.is_undefined());
/// assert_ne!(Value::Undefined, Value::Null);
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(BigInt),
    String(String),
    Array(Vec<Option<Value>>),
    Object(Map),
    /// Milliseconds since the Unix epoch; `NaN` is an invalid date.
    Timestamp(f64),
    Pattern(Pattern),
    /// Entries in construction order, duplicates included.
    OrderedMap(Vec<(Value, Value)>),
    /// Members in construction order, duplicates included.
    OrderedSet(Vec<Value>),
    Boxed(Boxed),
    Error(ErrorValue),
    Callable(Callable),
}

/// A regular-expression value: source text plus validated flags.
///
/// Patterns are never compiled; the crate only carries them through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

/// The flag alphabet, in canonical order.
pub const PATTERN_FLAGS: &str = "gimsuy";

impl Pattern {
    /// Creates a pattern, validating and canonicalizing `flags`.
    ///
    /// An empty source becomes `(?:)`, the empty non-capturing group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFlags`] when `flags` repeats a flag or uses one
    /// outside `gimsuy`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::Pattern;
    ///
    /// let pattern = Pattern::new("^a+$", "ig").unwrap();
    /// assert_eq!(pattern.flags, "gi");
    /// assert_eq!(Pattern::new("", "").unwrap().source, "(?:)");
    /// assert!(Pattern::new("a", "gg").is_err());
    /// assert!(Pattern::new("a", "x").is_err());
    /// ```
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        let mut seen = [false; 6];
        for flag in flags.chars() {
            let slot = PATTERN_FLAGS
                .find(flag)
                .filter(|&i| !seen[i])
                .ok_or_else(|| Error::InvalidFlags {
                    flags: flags.to_string(),
                })?;
            seen[slot] = true;
        }
        let flags = PATTERN_FLAGS
            .chars()
            .zip(seen)
            .filter_map(|(flag, set)| set.then_some(flag))
            .collect();
        let source = if source.is_empty() {
            "(?:)".to_string()
        } else {
            source.to_string()
        };
        Ok(Pattern { source, flags })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// A primitive wrapped in an object, distinct from the bare primitive.
#[derive(Clone, Debug)]
pub enum Boxed {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Boxed {
    /// Returns the wrapped primitive as a plain value.
    #[must_use]
    pub fn to_primitive(&self) -> Value {
        match self {
            Boxed::Boolean(b) => Value::Bool(*b),
            Boxed::Number(n) => Value::Number(*n),
            Boxed::String(s) => Value::String(s.clone()),
        }
    }

    /// Returns the name of the constructor that builds this wrapper.
    #[must_use]
    pub const fn constructor_name(&self) -> &'static str {
        match self {
            Boxed::Boolean(_) => "Boolean",
            Boxed::Number(_) => "Number",
            Boxed::String(_) => "String",
        }
    }
}

impl PartialEq for Boxed {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Boxed::Boolean(a), Boxed::Boolean(b)) => a == b,
            (Boxed::Number(a), Boxed::Number(b)) => coerce::same_value_zero(*a, *b),
            (Boxed::String(a), Boxed::String(b)) => a == b,
            _ => false,
        }
    }
}

/// The closed set of error constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorName {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    URIError,
}

impl ErrorName {
    pub const ALL: [ErrorName; 7] = [
        ErrorName::Error,
        ErrorName::EvalError,
        ErrorName::RangeError,
        ErrorName::ReferenceError,
        ErrorName::SyntaxError,
        ErrorName::TypeError,
        ErrorName::URIError,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorName::Error => "Error",
            ErrorName::EvalError => "EvalError",
            ErrorName::RangeError => "RangeError",
            ErrorName::ReferenceError => "ReferenceError",
            ErrorName::SyntaxError => "SyntaxError",
            ErrorName::TypeError => "TypeError",
            ErrorName::URIError => "URIError",
        }
    }

    /// Looks up a constructor name.
    ///
    /// ```rust
    /// use serde_eson::ErrorName;
    ///
    /// assert_eq!(ErrorName::from_name("TypeError"), Some(ErrorName::TypeError));
    /// assert_eq!(ErrorName::from_name("Oops"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == name)
    }
}

impl fmt::Display for ErrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error object: constructor name plus message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorValue {
    pub name: ErrorName,
    pub message: String,
}

impl ErrorValue {
    #[must_use]
    pub fn new(name: ErrorName, message: impl Into<String>) -> Self {
        ErrorValue {
            name,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

/// An opaque function built by `new Function(...)`. It is never evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Callable {
    /// Comma-joined parameter list text.
    pub params: String,
    pub body: String,
}

impl Callable {
    #[must_use]
    pub fn new(params: impl Into<String>, body: impl Into<String>) -> Self {
        Callable {
            params: params.into(),
            body: body.into(),
        }
    }

    /// Number of declared parameters.
    ///
    /// ```rust
    /// use serde_eson::Callable;
    ///
    /// assert_eq!(Callable::new("a, b", "return a + b").param_count(), 2);
    /// assert_eq!(Callable::new("", "return 1").param_count(), 0);
    /// ```
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params
            .split(',')
            .filter(|param| !param.trim().is_empty())
            .count()
    }

    /// The source text a function built this way reports.
    #[must_use]
    pub fn source(&self) -> String {
        format!("function anonymous({}\n) {{\n{}\n}}", self.params, self.body)
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for `undefined` and `null`.
    #[inline]
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bigint(&self) -> bool {
        matches!(self, Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_timestamp(&self) -> bool {
        matches!(self, Value::Timestamp(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_pattern(&self) -> bool {
        matches!(self, Value::Pattern(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_ordered_map(&self) -> bool {
        matches!(self, Value::OrderedMap(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_ordered_set(&self) -> bool {
        matches!(self, Value::OrderedSet(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_boxed(&self) -> bool {
        matches!(self, Value::Boxed(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    /// Returns `true` for arrays, objects and every rich kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::Value;
    ///
    /// assert!(Value::Timestamp(0.0).is_container());
    /// assert!(Value::Array(vec![]).is_container());
    /// assert!(!Value::from("text").is_container());
    /// ```
    #[must_use]
    pub const fn is_container(&self) -> bool {
        !matches!(
            self,
            Value::Undefined
                | Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::BigInt(_)
                | Value::String(_)
        )
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is an integral number or a big integer that fits an
    /// `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::Value;
    ///
    /// assert_eq!(Value::from(42).as_i64(), Some(42));
    /// assert_eq!(Value::Number(42.5).as_i64(), None);
    /// assert_eq!(serde_eson::parse("37n").unwrap().as_i64(), Some(37));
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => integral_i64(*n),
            Value::BigInt(b) => b.to_i64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an array, returns its slots, holes included.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Option<Value>>> {
        match self {
            Value::Array(slots) => Some(slots),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is a timestamp, returns its milliseconds since the epoch.
    #[inline]
    #[must_use]
    pub fn as_timestamp(&self) -> Option<f64> {
        match self {
            Value::Timestamp(ms) => Some(*ms),
            _ => None,
        }
    }

    /// If the value is a valid timestamp, returns it as a UTC date-time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::Value;
    ///
    /// let date = Value::Timestamp(86_400_000.0).as_datetime().unwrap();
    /// assert_eq!(date.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    /// assert!(Value::Timestamp(f64::NAN).as_datetime().is_none());
    /// ```
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ms) => integral_i64(*ms).and_then(DateTime::from_timestamp_millis),
            _ => None,
        }
    }

    /// Iterates over the populated slots of an array, skipping holes.
    ///
    /// Non-array values yield nothing.
    pub fn elements(&self) -> std::iter::Flatten<std::slice::Iter<'_, Option<Value>>> {
        match self {
            Value::Array(slots) => slots.iter().flatten(),
            _ => [].iter().flatten(),
        }
    }

    /// Returns a short name for the kind of this value.
    ///
    /// Primitives use their `typeof` name; rich kinds use their constructor name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::Value;
    ///
    /// assert_eq!(Value::Null.kind_name(), "null");
    /// assert_eq!(Value::from(1.5).kind_name(), "number");
    /// assert_eq!(Value::OrderedSet(vec![]).kind_name(), "Set");
    /// ```
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Timestamp(_) => "Date",
            Value::Pattern(_) => "RegExp",
            Value::OrderedMap(_) => "Map",
            Value::OrderedSet(_) => "Set",
            Value::Boxed(boxed) => boxed.constructor_name(),
            Value::Error(err) => err.name.as_str(),
            Value::Callable(_) => "Function",
        }
    }

    /// Reads the member `key` of this value.
    ///
    /// This is the typed accessor behind `.name`, `[expr]` and their optional
    /// forms. Ordered maps look `key` up among their entry keys (`size` aside);
    /// every other kind converts `key` to a property key first. Missing
    /// members yield `Undefined`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_eson::{parse, Value};
    ///
    /// let list = parse("[10, 20]").unwrap();
    /// assert_eq!(list.get(&Value::from(1)), Value::from(20));
    /// assert_eq!(list.get(&Value::from("length")), Value::from(2));
    /// assert_eq!(list.get(&Value::from("missing")), Value::Undefined);
    ///
    /// let map = parse("new Map([[1, 'one']])").unwrap();
    /// assert_eq!(map.get(&Value::from(1)), Value::from("one"));
    /// ```
    #[must_use]
    pub fn get(&self, key: &Value) -> Value {
        if let Value::OrderedMap(entries) = self {
            if matches!(key, Value::String(name) if name == "size") {
                return Value::from(entries.len());
            }
            return entries
                .iter()
                .rev()
                .find(|(entry_key, _)| entry_key == key)
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
        }

        let name = coerce::to_property_key(key);
        match self {
            Value::Array(slots) => match name.as_str() {
                "length" => Value::from(slots.len()),
                _ => array_index(&name)
                    .and_then(|i| slots.get(i).cloned().flatten())
                    .unwrap_or_default(),
            },
            Value::String(s) | Value::Boxed(Boxed::String(s)) => string_member(s, &name),
            Value::Object(obj) => obj.get(&name).cloned().unwrap_or_default(),
            Value::OrderedSet(values) if name == "size" => Value::from(values.len()),
            Value::Pattern(pattern) => match name.as_str() {
                "source" => Value::from(pattern.source.as_str()),
                "flags" => Value::from(pattern.flags.as_str()),
                "global" => Value::Bool(pattern.flags.contains('g')),
                "ignoreCase" => Value::Bool(pattern.flags.contains('i')),
                "multiline" => Value::Bool(pattern.flags.contains('m')),
                _ => Value::Undefined,
            },
            Value::Error(err) => match name.as_str() {
                "name" => Value::from(err.name.as_str()),
                "message" => Value::from(err.message.as_str()),
                _ => Value::Undefined,
            },
            Value::Callable(callable) if name == "length" => Value::from(callable.param_count()),
            _ => Value::Undefined,
        }
    }

    /// Builds a number from an integer, switching to a big integer outside
    /// the exactly representable range.
    pub(crate) fn from_integer(n: i128) -> Value {
        if (n.unsigned_abs() as f64) <= MAX_SAFE_INTEGER {
            Value::Number(n as f64)
        } else {
            Value::BigInt(BigInt::from(n))
        }
    }
}

/// Parses a canonical array index: `0`, or digits without a leading zero
/// below 2^32 - 1.
pub(crate) fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>()
        .ok()
        .filter(|&i| i != u32::MAX)
        .map(|i| i as usize)
}

/// String members index UTF-16 code units, like `length` counts them.
fn string_member(s: &str, name: &str) -> Value {
    if name == "length" {
        return Value::from(s.encode_utf16().count());
    }
    match array_index(name).and_then(|i| s.encode_utf16().nth(i)) {
        Some(unit) => Value::String(String::from_utf16_lossy(&[unit])),
        None => Value::Undefined,
    }
}

fn integral_i64(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) | (Value::Timestamp(a), Value::Timestamp(b)) => {
                coerce::same_value_zero(*a, *b)
            }
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Pattern(a), Value::Pattern(b)) => a == b,
            (Value::OrderedMap(a), Value::OrderedMap(b)) => a == b,
            (Value::OrderedSet(a), Value::OrderedSet(b)) => a == b,
            (Value::Boxed(a), Value::Boxed(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::stringify::stringify(self))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serialize_number(*n, serializer),
            Value::BigInt(b) => {
                if let Some(i) = b.to_i64() {
                    serializer.serialize_i64(i)
                } else if let Some(u) = b.to_u64() {
                    serializer.serialize_u64(u)
                } else {
                    serializer.collect_str(b)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(slots) => {
                let mut seq = serializer.serialize_seq(Some(slots.len()))?;
                for slot in slots {
                    match slot {
                        Some(value) => seq.serialize_element(value)?,
                        None => seq.serialize_element(&())?,
                    }
                }
                seq.end()
            }
            Value::Object(obj) => {
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Timestamp(_) => match self.as_datetime() {
                Some(date) => {
                    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
                }
                None => serializer.serialize_f64(f64::NAN),
            },
            Value::Pattern(pattern) => serializer.collect_str(pattern),
            Value::OrderedMap(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for (k, v) in entries {
                    seq.serialize_element(&(k, v))?;
                }
                seq.end()
            }
            Value::OrderedSet(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Boxed(boxed) => boxed.to_primitive().serialize(serializer),
            Value::Error(err) => serializer.collect_str(err),
            Value::Callable(callable) => serializer.serialize_str(&callable.source()),
        }
    }
}

fn serialize_number<S: Serializer>(n: f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match integral_i64(n) {
        Some(i) if n.abs() <= MAX_SAFE_INTEGER && !(n == 0.0 && n.is_sign_negative()) => {
            serializer.serialize_i64(i)
        }
        _ => serializer.serialize_f64(n),
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{MapAccess, SeqAccess, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid ESON value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E> {
                Ok(Value::from_integer(i128::from(value)))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E> {
                Ok(Value::from_integer(i128::from(value)))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Self::Value, E> {
                Ok(Value::from_integer(value))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Self::Value, E> {
                Ok(match i128::try_from(value) {
                    Ok(value) => Value::from_integer(value),
                    Err(_) => Value::BigInt(BigInt::from(value)),
                })
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E> {
                Ok(Value::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut slots = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    slots.push(Some(elem));
                }
                Ok(Value::Array(slots))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut obj = Map::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    obj.insert(key, value);
                }
                Ok(Value::Object(obj))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::custom(format!("expected integer, found {}", value.kind_name())))
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Number(n) | Value::Boxed(Boxed::Number(n)) => Ok(n),
            _ => Err(Error::custom(format!(
                "expected number, found {}",
                value.kind_name()
            ))),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) | Value::Boxed(Boxed::Boolean(b)) => Ok(b),
            _ => Err(Error::custom(format!(
                "expected bool, found {}",
                value.kind_name()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) | Value::Boxed(Boxed::String(s)) => Ok(s),
            _ => Err(Error::custom(format!(
                "expected string, found {}",
                value.kind_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_small_integer {
    ($($ty:ty)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(f64::from(value))
                }
            }
        )*
    };
}

from_small_integer!(i8 i16 i32 u8 u16 u32);

macro_rules! from_wide_integer {
    ($($ty:ty)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::from_integer(value as i128)
                }
            }
        )*
    };
}

from_wide_integer!(i64 u64 isize usize);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value.into_iter().map(Some).collect())
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Object(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value.timestamp_millis() as f64)
    }
}

impl From<Pattern> for Value {
    fn from(value: Pattern) -> Self {
        Value::Pattern(value)
    }
}

impl From<Boxed> for Value {
    fn from(value: Boxed) -> Self {
        Value::Boxed(value)
    }
}

impl From<ErrorValue> for Value {
    fn from(value: ErrorValue) -> Self {
        Value::Error(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Callable(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_tryfrom_i64() {
        assert_eq!(i64::try_from(Value::Number(42.0)).unwrap(), 42);
        assert_eq!(i64::try_from(Value::BigInt(BigInt::from(-7))).unwrap(), -7);
        assert!(i64::try_from(Value::Number(42.5)).is_err());
        assert!(i64::try_from(Value::from("test")).is_err());
    }

    #[test]
    fn test_tryfrom_primitives() {
        assert_eq!(f64::try_from(Value::Number(3.5)).unwrap(), 3.5);
        assert_eq!(f64::try_from(Value::Boxed(Boxed::Number(2.0))).unwrap(), 2.0);
        assert!(bool::try_from(Value::Bool(true)).unwrap());
        assert!(bool::try_from(Value::Number(1.0)).is_err());
        assert_eq!(String::try_from(Value::from("hello")).unwrap(), "hello");
        assert!(String::try_from(Value::Null).is_err());
    }

    #[test]
    fn test_wide_integers_become_bigints() {
        assert_eq!(Value::from(42i64), Value::Number(42.0));
        assert_eq!(
            Value::from(u64::MAX),
            Value::BigInt(BigInt::from(u64::MAX))
        );
        assert_eq!(
            Value::from(9_007_199_254_740_993i64),
            Value::BigInt(BigInt::from(9_007_199_254_740_993i64))
        );
    }

    #[test]
    fn test_same_value_zero_equality() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
        assert_eq!(Value::Timestamp(f64::NAN), Value::Timestamp(f64::NAN));
        assert_ne!(Value::Number(1.0), Value::Timestamp(1.0));
        assert_ne!(
            Value::Boxed(Boxed::Number(1.0)),
            Value::Number(1.0)
        );
    }

    #[test]
    fn test_holes_are_not_undefined() {
        let with_hole = Value::Array(vec![None]);
        let with_undefined = Value::Array(vec![Some(Value::Undefined)]);
        assert_ne!(with_hole, with_undefined);
        assert_eq!(with_hole.elements().count(), 0);
        assert_eq!(with_undefined.elements().count(), 1);
    }

    #[test]
    fn test_member_access() {
        let text = Value::from("héllo");
        assert_eq!(text.get(&Value::from("length")), Value::from(5));
        assert_eq!(text.get(&Value::from(1)), Value::from("é"));

        let set = Value::OrderedSet(vec![Value::Null, Value::Null]);
        assert_eq!(set.get(&Value::from("size")), Value::from(2));

        let err = Value::Error(ErrorValue::new(ErrorName::TypeError, "boom"));
        assert_eq!(err.get(&Value::from("message")), Value::from("boom"));
        assert_eq!(err.get(&Value::from("name")), Value::from("TypeError"));

        let func = Value::Callable(Callable::new("a,b", "return a"));
        assert_eq!(func.get(&Value::from("length")), Value::from(2));
    }

    #[test]
    fn test_array_index_is_canonical() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("12"), Some(12));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("1.5"), None);
        assert_eq!(array_index("4294967295"), None);
    }

    #[test]
    fn test_serialize_to_json() {
        let value = Value::Array(vec![
            Some(Value::Number(1.0)),
            None,
            Some(Value::Number(1.5)),
            Some(Value::Timestamp(0.0)),
        ]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"[1,null,1.5,"1970-01-01T00:00:00.000Z"]"#
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let value: Value = serde_json::from_str(r#"{"a":[1,true,null]}"#).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(
            obj.get("a"),
            Some(&Value::from(vec![
                Value::from(1),
                Value::Bool(true),
                Value::Null
            ]))
        );
    }
}
