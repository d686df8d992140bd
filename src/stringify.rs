//! ESON stringification.
//!
//! Turns a [`Value`] tree back into notation text that [`crate::parse`]
//! reads back to an equal value. Plain arrays and objects use literal
//! syntax; every other rich kind is written as a `new Name(args)` call whose
//! arguments come from the builtin registry.
//!
//! ## Layout
//!
//! Compact output (the default) contains no whitespace at all. With a
//! non-zero [`StringifyOptions::indent`]:
//!
//! - element lists (array elements and constructor arguments) break onto
//!   separate lines when they hold two or more entries or when the first
//!   entry is itself a container
//! - non-empty objects always break, writing `key: value`
//!
//! ```rust
//! use serde_eson::{parse, stringify, stringify_pretty};
//!
//! let value = parse("{list: [1, , 3], when: new Date(0)}").unwrap();
//! assert_eq!(stringify(&value), "({list:[1,,3],when:new Date(0)})");
//!
//! let value = parse("{list: [1, 2], when: new Date(0)}").unwrap();
//! assert_eq!(
//!     stringify_pretty(&value),
//!     "({\n  list: [\n    1,\n    2\n  ],\n  when: new Date(0)\n})"
//! );
//! ```

use crate::builtins;
use crate::coerce::number_to_string;
use crate::{Map, StringifyOptions, Value};

/// Writes `value` as compact notation.
#[must_use]
pub fn stringify(value: &Value) -> String {
    stringify_with_options(value, &StringifyOptions::new())
}

/// Writes `value` with the layout described by `options`.
#[must_use]
pub fn stringify_with_options(value: &Value, options: &StringifyOptions) -> String {
    tracing::trace!(kind = value.kind_name(), indent = options.indent, "stringifying value");

    let mut stringifier = Stringifier::new(options);
    stringifier.write_value(value, 0);
    let output = stringifier.into_inner();

    // A leading `{` would read back as a block.
    if output.starts_with('{') {
        format!("({output})")
    } else {
        output
    }
}

/// Quotes `s` as a single-quoted string literal.
///
/// # Examples
///
/// ```rust
/// use serde_eson::stringify::quote_str;
///
/// assert_eq!(quote_str("it's"), r"'it\'s'");
/// assert_eq!(quote_str("a\nb"), r"'a\nb'");
/// ```
#[must_use]
pub fn quote_str(s: &str) -> String {
    let mut output = String::with_capacity(s.len() + 2);
    write_quoted(&mut output, s);
    output
}

fn write_quoted(output: &mut String, s: &str) {
    output.push('\'');
    for ch in s.chars() {
        match ch {
            '\0' => output.push_str("\\0"),
            '\'' => output.push_str("\\'"),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\u{000B}' => output.push_str("\\v"),
            '\t' => output.push_str("\\t"),
            '\u{0008}' => output.push_str("\\b"),
            '\u{000C}' => output.push_str("\\f"),
            _ => output.push(ch),
        }
    }
    output.push('\'');
}

/// Returns `true` when `key` can be written as a bare object key.
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

struct Stringifier {
    output: String,
    indent: usize,
}

impl Stringifier {
    fn new(options: &StringifyOptions) -> Self {
        Stringifier {
            output: String::with_capacity(64),
            indent: if options.is_pretty() { options.indent } else { 0 },
        }
    }

    fn into_inner(self) -> String {
        self.output
    }

    fn write_indent(&mut self, depth: usize) {
        self.output
            .extend(std::iter::repeat(' ').take(self.indent * depth));
    }

    fn write_value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Undefined => self.output.push_str("undefined"),
            Value::Null => self.output.push_str("null"),
            Value::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.output.push_str(&number_to_string(*n)),
            Value::BigInt(n) => {
                self.output.push_str(&n.to_string());
                self.output.push('n');
            }
            Value::String(s) => write_quoted(&mut self.output, s),
            Value::Array(slots) if slots.iter().any(Option::is_some) || slots.is_empty() => {
                self.output.push('[');
                self.write_elements(slots.iter().map(Option::as_ref), slots.len(), depth);
                self.output.push(']');
            }
            Value::Object(map) => self.write_object(map, depth),
            _ => self.write_construction(value, depth),
        }
    }

    fn write_construction(&mut self, value: &Value, depth: usize) {
        let Some((name, args)) = builtins::decompose(value) else {
            self.output.push_str("undefined");
            return;
        };
        self.output.push_str("new ");
        self.output.push_str(name);
        self.output.push('(');
        self.write_elements(args.iter().map(Some), args.len(), depth);
        self.output.push(')');
    }

    /// Writes a comma-separated element list, leaving holes empty.
    ///
    /// A trailing hole gets an extra comma, since a single trailing comma
    /// reads back as no element at all.
    fn write_elements<'v>(
        &mut self,
        elements: impl Iterator<Item = Option<&'v Value>> + Clone,
        len: usize,
        depth: usize,
    ) {
        let first_is_container = elements
            .clone()
            .next()
            .flatten()
            .is_some_and(Value::is_container);
        let multiline = self.indent > 0 && (len >= 2 || first_is_container);
        let mut last_is_hole = false;

        for (i, element) in elements.enumerate() {
            if i >= 1 {
                self.output.push(',');
            }
            if multiline {
                self.output.push('\n');
            }
            match element {
                Some(value) => {
                    if multiline {
                        self.write_indent(depth + 1);
                    }
                    self.write_value(value, depth + 1);
                    last_is_hole = false;
                }
                None => last_is_hole = true,
            }
        }
        if last_is_hole {
            self.output.push(',');
        }

        if multiline {
            self.output.push('\n');
            self.write_indent(depth);
        }
    }

    fn write_object(&mut self, map: &Map, depth: usize) {
        self.output.push('{');
        for (i, (key, value)) in map.iter().enumerate() {
            if i >= 1 {
                self.output.push(',');
            }
            if self.indent > 0 {
                self.output.push('\n');
                self.write_indent(depth + 1);
            }
            if is_identifier(key) {
                self.output.push_str(key);
            } else {
                write_quoted(&mut self.output, key);
            }
            self.output.push(':');
            if self.indent > 0 {
                self.output.push(' ');
            }
            self.write_value(value, depth + 1);
        }
        if self.indent > 0 && !map.is_empty() {
            self.output.push('\n');
            self.write_indent(depth);
        }
        self.output.push('}');
    }
}
