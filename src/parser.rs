//! Recursive-descent parser for ESON text.
//!
//! [`Parser`] walks the input once through a [`Scanner`], building a
//! [`Value`] tree. Grammar failures abort immediately with a positional
//! error. Semantic problems (unknown identifiers, failed constructions,
//! invalid pattern flags) are recorded instead, and the first one is returned
//! only after the whole document has parsed, so a later syntax error always
//! takes priority.
//!
//! ## Grammar
//!
//! ```text
//! document  := space (sequence space)? EOF
//! sequence  := member (',' space member)*
//! member    := group (('.' | '?.') identifier | '?.'? '[' sequence ']')*
//! group     := '(' space sequence space ')' | unary
//! unary     := ('+' | '-') space member | value
//! value     := string | array | object | pattern | number | identifier
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use serde_eson::parser::Parser;
//! use serde_eson::{ParseOptions, Value};
//!
//! let options = ParseOptions::new();
//! let value = Parser::new("[1, 2, ...'ab'].length", &options).parse().unwrap();
//! assert_eq!(value, Value::from(4));
//! ```

use crate::builtins;
use crate::class::{
    CharClass, CharPattern, BINARY_DIGIT, BINARY_PREFIX, DIGIT, DIGIT_OR_DOT, EXPONENT, HEX_DIGIT, HEX_PREFIX,
    IDENTIFIER_START, IDENTIFIER_TAIL, KEY_START, NEWLINE, NOT_NEWLINE, OCTAL_DIGIT, OCTAL_PREFIX,
    REGEXP_FLAG, SPACE, UNARY,
};
use crate::coerce::{self, parse_radix, to_number, to_property_key};
use crate::scanner::Scanner;
use crate::{Boxed, Error, Map, ParseOptions, Pattern, Result, Value};
use num_bigint::BigInt;

/// The sign operator currently applied to the expression being parsed.
///
/// Directly after a `+` only a `-` may follow, and vice versa, so `++1` and
/// `--1` never parse as repeated signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unary {
    None,
    Plus,
    Minus,
}

/// Parse state for one document.
pub struct Parser<'a, 'o> {
    scanner: Scanner<'a>,
    options: &'o ParseOptions,
    errors: Vec<Error>,
    variables: Map,
    depth: usize,
}

impl<'a, 'o> Parser<'a, 'o> {
    #[must_use]
    pub fn new(input: &'a str, options: &'o ParseOptions) -> Self {
        Parser {
            scanner: Scanner::new(input),
            options,
            errors: Vec::new(),
            variables: options.variables.clone(),
            depth: 0,
        }
    }

    /// Parses the whole input.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error, or, for a structurally valid
    /// document, the first deferred error.
    pub fn parse(mut self) -> Result<Value> {
        tracing::debug!(
            len = self.scanner.rest().len(),
            strict = self.options.strict,
            "parsing ESON document"
        );

        self.parse_space()?;
        if self.scanner.is_eof() {
            return Ok(Value::Undefined);
        }

        let value = self.parse_sequence(Unary::None)?;
        self.parse_space()?;
        if !self.scanner.is_eof() {
            return Err(self.scanner.error());
        }

        tracing::trace!(deferred = self.errors.len(), "parsed ESON document");
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }

    fn defer(&mut self, error: Error) {
        tracing::debug!(%error, index = self.scanner.position(), "deferred error");
        self.errors.push(error);
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Skips whitespace and comments, keeping the logical-start flag.
    fn parse_space(&mut self) -> Result<()> {
        let at_start = self.scanner.is_at_start();
        loop {
            if self.scanner.test(SPACE) {
                self.scanner.star(SPACE);
            } else if self.scanner.consume_str("//") {
                self.scanner.star(NOT_NEWLINE);
            } else if self.scanner.consume_str("/*") {
                while !self.scanner.consume_str("*/") {
                    self.scanner.consume(1)?;
                }
            } else {
                break;
            }
        }
        self.scanner.restore_start(at_start);
        Ok(())
    }

    fn parse_sequence(&mut self, unary: Unary) -> Result<Value> {
        let mut value = self.parse_member(unary)?;
        self.parse_space()?;
        while self.scanner.consume_if(',').is_some() {
            self.parse_space()?;
            value = self.parse_member(Unary::None)?;
            self.parse_space()?;
        }
        Ok(value)
    }

    fn parse_member(&mut self, unary: Unary) -> Result<Value> {
        let mut object = self.parse_group(unary)?;
        // Set once an optional access meets `undefined`/`null`; the rest of
        // the chain then evaluates to `undefined` without complaint.
        let mut short_circuited = false;

        self.parse_space()?;
        loop {
            let optional = self.scanner.consume_if('?').is_some();
            if optional {
                self.scanner.one('.')?;
            }
            let dot = optional || self.scanner.consume_if('.').is_some();

            if dot {
                self.parse_space()?;
                if !self.scanner.test('[') {
                    let name = self.consume_identifier()?;
                    object = self.access(object, Value::String(name), optional, &mut short_circuited);
                    self.parse_space()?;
                    continue;
                }
                if !optional {
                    return Err(self.scanner.error());
                }
            }

            if self.scanner.consume_if('[').is_none() {
                break;
            }
            let key = self.nested(|parser| {
                parser.parse_space()?;
                let key = parser.parse_sequence(Unary::None)?;
                parser.scanner.one(']')?;
                Ok(key)
            })?;
            object = self.access(object, key, optional, &mut short_circuited);
            self.parse_space()?;
        }

        Ok(object)
    }

    fn access(
        &mut self,
        object: Value,
        key: Value,
        optional: bool,
        short_circuited: &mut bool,
    ) -> Value {
        if *short_circuited {
            return Value::Undefined;
        }
        if object.is_nullish() {
            if optional {
                *short_circuited = true;
            } else {
                self.defer(Error::type_error(format!(
                    "Cannot read properties of {} (reading '{}')",
                    object.kind_name(),
                    to_property_key(&key)
                )));
            }
            return Value::Undefined;
        }
        object.get(&key)
    }

    fn parse_group(&mut self, unary: Unary) -> Result<Value> {
        if self.scanner.consume_if('(').is_none() {
            return self.parse_unary(unary);
        }
        self.nested(|parser| {
            parser.parse_space()?;
            let value = parser.parse_sequence(Unary::None)?;
            parser.parse_space()?;
            parser.scanner.one(')')?;
            Ok(value)
        })
    }

    fn parse_unary(&mut self, unary: Unary) -> Result<Value> {
        let operator = match unary {
            Unary::Plus => self.scanner.consume_if('-'),
            Unary::Minus => self.scanner.consume_if('+'),
            Unary::None => self.scanner.consume_if(UNARY),
        };

        let Some(operator) = operator else {
            return self.parse_value();
        };
        let context = if operator == '+' {
            Unary::Plus
        } else {
            Unary::Minus
        };
        let operand = self.nested(|parser| {
            parser.parse_space()?;
            parser.parse_member(context)
        })?;

        Ok(match (context, operand) {
            (Unary::Minus, Value::BigInt(n)) => Value::BigInt(-n),
            (Unary::Plus, Value::BigInt(_)) => {
                self.defer(Error::type_error("Cannot convert a BigInt value to a number"));
                Value::Undefined
            }
            (Unary::Minus, operand) => Value::Number(-to_number(&operand)),
            (_, operand) => Value::Number(to_number(&operand)),
        })
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.scanner.peek() {
            Some('`' | '"' | '\'') => self.parse_string().map(Value::String),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some('/') => self.parse_pattern(),
            Some(c) if IDENTIFIER_START.matches(c) => self.parse_identifier(),
            Some(c) if DIGIT_OR_DOT.matches(c) => self.parse_number(),
            _ => Err(self.scanner.error()),
        }
    }

    fn consume_identifier(&mut self) -> Result<String> {
        let start = self.scanner.position();
        self.scanner.one(IDENTIFIER_START)?;
        self.scanner.star(IDENTIFIER_TAIL);
        Ok(self.scanner.slice_from(start).to_string())
    }

    fn parse_identifier(&mut self) -> Result<Value> {
        let name = self.consume_identifier()?;
        Ok(match name.as_str() {
            "undefined" => Value::Undefined,
            "null" => Value::Null,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "Infinity" => Value::Number(f64::INFINITY),
            "NaN" => Value::Number(f64::NAN),
            "new" => return self.parse_new(),
            _ => return self.parse_variable(name),
        })
    }

    fn parse_variable(&mut self, name: String) -> Result<Value> {
        if self.options.allow_assignment {
            self.parse_space()?;
            if self.scanner.test('=') && !self.scanner.test_str("==") {
                self.scanner.consume(1)?;
                let value = self.nested(|parser| {
                    parser.parse_space()?;
                    parser.parse_member(Unary::None)
                })?;
                tracing::trace!(%name, "bound variable");
                self.variables.insert(name, value.clone());
                return Ok(value);
            }
        }
        Ok(self.lookup_variable(&name))
    }

    fn lookup_variable(&mut self, name: &str) -> Value {
        if let Some(value) = self.variables.get(name) {
            return value.clone();
        }
        if builtins::is_builtin(name) {
            self.defer(Error::type_error(format!(
                "{name} is a constructor and cannot be used as a value"
            )));
        } else {
            self.defer(Error::reference(name));
        }
        Value::Undefined
    }

    fn parse_new(&mut self) -> Result<Value> {
        self.parse_space()?;
        let name = self.consume_identifier()?;
        self.parse_space()?;

        // The callee is resolved before its arguments, so its error comes first.
        let builtin = builtins::lookup(&name);
        if builtin.is_none() {
            if self.variables.contains_key(&name) {
                self.defer(Error::type_error(format!("{name} is not a constructor")));
            } else {
                self.defer(Error::reference(&name));
            }
        }

        let args = if self.scanner.consume_if('(').is_some() {
            self.nested(|parser| parser.parse_elements(')'))?
        } else {
            Vec::new()
        };
        let args: Vec<Value> = args.into_iter().map(Option::unwrap_or_default).collect();

        let Some(builtin) = builtin else {
            return Ok(Value::Undefined);
        };
        match builtin.construct(&args) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.defer(error);
                Ok(Value::Undefined)
            }
        }
    }

    /// Parses a comma-separated element list up to and including `close`.
    ///
    /// A comma in element position adds a hole; a single trailing comma
    /// does not.
    fn parse_elements(&mut self, close: char) -> Result<Vec<Option<Value>>> {
        let mut elements = Vec::new();

        self.parse_space()?;
        while !self.scanner.test(close) {
            if self.scanner.consume_if(',').is_some() {
                elements.push(None);
                self.parse_space()?;
                continue;
            }

            if self.scanner.consume_str("...") {
                let spread = self.parse_member(Unary::None)?;
                match builtins::iterate(&spread) {
                    Ok(items) => elements.extend(items.into_iter().map(Some)),
                    Err(error) => self.defer(error),
                }
            } else {
                elements.push(Some(self.parse_member(Unary::None)?));
            }

            self.parse_space()?;
            if self.scanner.consume_if(',').is_some() {
                self.parse_space()?;
            } else {
                break;
            }
        }
        self.scanner.one(close)?;

        Ok(elements)
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.scanner.one('[')?;
        self.nested(|parser| parser.parse_elements(']'))
            .map(Value::Array)
    }

    fn parse_object(&mut self) -> Result<Value> {
        if self.options.strict && self.scanner.is_at_start() {
            return Err(self.scanner.error());
        }
        self.scanner.one('{')?;
        self.nested(Self::parse_members).map(Value::Object)
    }

    fn parse_members(&mut self) -> Result<Map> {
        let mut object = Map::new();

        self.parse_space()?;
        while !self.scanner.test('}') {
            if self.scanner.consume_str("...") {
                let spread = self.parse_member(Unary::None)?;
                spread_into(&mut object, spread);
            } else {
                let (key, is_identifier) = if self.scanner.consume_if('[').is_some() {
                    self.parse_space()?;
                    let key = self.parse_sequence(Unary::None)?;
                    self.scanner.one(']')?;
                    (to_property_key(&key), false)
                } else if self.scanner.test(KEY_START) {
                    (to_property_key(&self.parse_value()?), false)
                } else {
                    (self.consume_identifier()?, true)
                };

                self.parse_space()?;
                if self.scanner.consume_if(':').is_some() {
                    self.parse_space()?;
                    let value = self.parse_member(Unary::None)?;
                    object.insert(key, value);
                } else if is_identifier {
                    let value = self.lookup_variable(&key);
                    object.insert(key, value);
                } else {
                    return Err(self.scanner.error());
                }
            }

            self.parse_space()?;
            if self.scanner.consume_if(',').is_some() {
                self.parse_space()?;
            } else {
                break;
            }
        }
        self.parse_space()?;
        self.scanner.one('}')?;

        Ok(object)
    }

    fn consume_integer(&mut self, digit: CharClass) -> Result<String> {
        let mut integer = String::new();
        integer.push(self.scanner.one(digit)?);
        loop {
            if let Some(c) = self.scanner.consume_if(digit) {
                integer.push(c);
            } else if self.scanner.consume_if('_').is_some() {
                integer.push(self.scanner.one(digit)?);
            } else {
                return Ok(integer);
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let mut text = String::new();

        if !self.scanner.test('.') {
            if self.scanner.test('0') {
                let prefixed = [
                    (HEX_PREFIX, HEX_DIGIT, 16),
                    (BINARY_PREFIX, BINARY_DIGIT, 2),
                    (OCTAL_PREFIX, OCTAL_DIGIT, 8),
                ]
                .into_iter()
                .find(|(prefix, _, _)| {
                    self.scanner
                        .test_sequence(&[CharClass::Char('0'), *prefix])
                });

                if let Some((_, digit, radix)) = prefixed {
                    self.scanner.consume(2)?;
                    let digits = self.consume_integer(digit)?;
                    let n = parse_radix(&digits, radix).ok_or_else(|| self.scanner.error())?;
                    return Ok(Value::Number(n));
                }

                self.scanner.consume(1)?;
                text.push('0');
            } else {
                text = self.consume_integer(DIGIT)?;
            }

            if self.scanner.consume_if('n').is_some() {
                let n = BigInt::parse_bytes(text.as_bytes(), 10)
                    .ok_or_else(|| self.scanner.error())?;
                return Ok(Value::BigInt(n));
            }
        }

        if self.scanner.consume_if('.').is_some() {
            text.push('.');
            if self.scanner.test(DIGIT) {
                text.push_str(&self.consume_integer(DIGIT)?);
            }
            if text == "." {
                return Err(self.scanner.error());
            }
        }

        if self.scanner.consume_if(EXPONENT).is_some() {
            text.push('e');
            if let Some(sign) = self.scanner.consume_if(UNARY) {
                text.push(sign);
            }
            text.push_str(&self.consume_integer(DIGIT)?);
        }

        Ok(Value::Number(text.parse().unwrap_or(f64::NAN)))
    }

    /// Parses a quoted or template string.
    ///
    /// Text is collected as UTF-16 so `\uHHHH` surrogate pairs combine;
    /// unpaired surrogates decode to U+FFFD.
    fn parse_string(&mut self) -> Result<String> {
        let quote = self.scanner.peek().ok_or(Error::UnexpectedEnd)?;
        self.scanner.consume(1)?;
        let template = quote == '`';
        let mut units: Vec<u16> = Vec::new();
        let mut buf = [0u16; 2];

        loop {
            match self.scanner.peek() {
                None => return Err(Error::UnexpectedEnd),
                Some(c) if c == quote => break,
                Some(c) if !template && NEWLINE.matches(c) => {
                    return Err(self.scanner.error())
                }
                Some('\\') => self.parse_escape(&mut units)?,
                Some('$') if template && self.scanner.test_at('{', 1) => {
                    self.scanner.consume(2)?;
                    let value = self.nested(|parser| {
                        parser.parse_space()?;
                        let value = parser.parse_sequence(Unary::None)?;
                        parser.scanner.one('}')?;
                        Ok(value)
                    })?;
                    units.extend(coerce::to_string(&value).encode_utf16());
                }
                Some(c) => {
                    self.scanner.consume(1)?;
                    units.extend_from_slice(c.encode_utf16(&mut buf));
                }
            }
        }
        self.scanner.one(quote)?;

        Ok(String::from_utf16_lossy(&units))
    }

    fn parse_escape(&mut self, units: &mut Vec<u16>) -> Result<()> {
        let start = self.scanner.position();
        self.scanner.one('\\')?;

        let Some(c) = self.scanner.peek() else {
            return Err(Error::UnexpectedEnd);
        };
        let simple = match c {
            '0' => Some('\0'),
            '\'' => Some('\''),
            '\\' => Some('\\'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            'v' => Some('\u{000B}'),
            't' => Some('\t'),
            'b' => Some('\u{0008}'),
            'f' => Some('\u{000C}'),
            _ => None,
        };
        if let Some(decoded) = simple {
            self.scanner.consume(1)?;
            units.push(decoded as u16);
            return Ok(());
        }

        match c {
            '\r' => {
                self.scanner.consume(1)?;
                self.scanner.consume_if('\n');
            }
            '\n' => {
                self.scanner.consume(1)?;
            }
            'u' => {
                self.scanner.consume(1)?;
                if self.scanner.consume_if('{').is_some() {
                    let hex = self.scanner.plus(HEX_DIGIT)?;
                    self.scanner.one('}')?;
                    let code = u32::from_str_radix(hex, 16)
                        .ok()
                        .filter(|&code| code <= 0x10FFFF)
                        .ok_or(Error::InvalidCodePoint { index: start })?;
                    push_code_point(units, code);
                } else {
                    let code = self.consume_hex(4)?;
                    units.push(code as u16);
                }
            }
            'x' => {
                self.scanner.consume(1)?;
                let code = self.consume_hex(2)?;
                units.push(code as u16);
            }
            _ => {
                self.scanner.consume(1)?;
                let mut buf = [0u16; 2];
                units.extend_from_slice(c.encode_utf16(&mut buf));
            }
        }
        Ok(())
    }

    fn consume_hex(&mut self, count: usize) -> Result<u32> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self.scanner.one(HEX_DIGIT)?;
            code = code * 16 + digit.to_digit(16).unwrap_or(0);
        }
        Ok(code)
    }

    /// Parses `/body/flags`. Invalid flags are deferred.
    fn parse_pattern(&mut self) -> Result<Value> {
        self.scanner.one('/')?;
        let start = self.scanner.position();
        if self.scanner.test('/') {
            return Err(self.scanner.error());
        }

        loop {
            match self.scanner.peek() {
                None => return Err(Error::UnexpectedEnd),
                Some('/') => break,
                Some('\\') => self.consume_pattern_escape()?,
                Some('[') => {
                    self.scanner.consume(1)?;
                    while !self.scanner.test(']') {
                        match self.scanner.peek() {
                            Some('\\') => self.consume_pattern_escape()?,
                            Some(c) if !NEWLINE.matches(c) => {
                                self.scanner.consume(1)?;
                            }
                            _ => return Err(self.scanner.error()),
                        }
                    }
                    self.scanner.one(']')?;
                }
                Some(c) if NEWLINE.matches(c) => return Err(self.scanner.error()),
                Some(_) => {
                    self.scanner.consume(1)?;
                }
            }
        }

        let source = self.scanner.slice_from(start);
        self.scanner.one('/')?;
        let flags = self.scanner.star(REGEXP_FLAG);

        match Pattern::new(source, flags) {
            Ok(pattern) => Ok(Value::Pattern(pattern)),
            Err(error) => {
                self.defer(error);
                Ok(Value::Undefined)
            }
        }
    }

    fn consume_pattern_escape(&mut self) -> Result<()> {
        self.scanner.one('\\')?;
        if self.scanner.test(NEWLINE) {
            return Err(self.scanner.error());
        }
        self.scanner.consume(1)?;
        Ok(())
    }
}

/// Appends a code point, splitting it into a surrogate pair when needed.
fn push_code_point(units: &mut Vec<u16>, code: u32) {
    match char::from_u32(code) {
        Some(c) => {
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
        }
        // A lone surrogate code point; pairs with a neighbour if one follows.
        None => units.push(code as u16),
    }
}

/// Copies the enumerable entries of `source` into `target`.
fn spread_into(target: &mut Map, source: Value) {
    match source {
        Value::Object(map) => target.extend(map),
        Value::Array(slots) => {
            for (i, slot) in slots.into_iter().enumerate() {
                if let Some(value) = slot {
                    target.insert(i.to_string(), value);
                }
            }
        }
        Value::String(s) | Value::Boxed(Boxed::String(s)) => {
            for (i, unit) in s.encode_utf16().enumerate() {
                target.insert(i.to_string(), Value::String(String::from_utf16_lossy(&[unit])));
            }
        }
        Value::OrderedMap(entries) => {
            for (key, value) in entries {
                target.insert(to_property_key(&key), value);
            }
        }
        _ => {}
    }
}
