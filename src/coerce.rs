//! Abstract conversions between value kinds.
//!
//! The grammar needs a handful of ECMAScript conversions: numeric and
//! computed object keys go through [`to_property_key`], template
//! interpolation through [`to_string`], unary signs through [`to_number`],
//! and the boxed-primitive constructors through all of them. Numbers print
//! with [`number_to_string`], the shortest round-tripping decimal form, which
//! the stringifier shares.

use crate::Value;
use chrono::DateTime;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Compares two floats the way keyed collections do: `NaN` equals itself and
/// the two zeros are equal.
#[inline]
#[must_use]
pub fn same_value_zero(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

/// Formats a number as its shortest decimal text.
///
/// # Examples
///
/// ```rust
/// use serde_eson::coerce::number_to_string;
///
/// assert_eq!(number_to_string(0.1), "0.1");
/// assert_eq!(number_to_string(-0.0), "0");
/// assert_eq!(number_to_string(1e21), "1e+21");
/// assert_eq!(number_to_string(3.5e73), "3.5e+73");
/// assert_eq!(number_to_string(1e-7), "1e-7");
/// assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
/// ```
#[must_use]
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // `{:e}` yields the shortest round-tripping digits, e.g. `1.2345e3`.
    let scientific = format!("{n:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let k = digits.len() as i32;
    let n = exponent + 1;

    if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", e.abs())
        }
    }
}

/// Parses numeric text the way the `Number` constructor does.
///
/// Surrounding whitespace is ignored, empty text is `0`, and anything that
/// is not a complete decimal, `0x`/`0o`/`0b` literal or `Infinity` is `NaN`.
///
/// # Examples
///
/// ```rust
/// use serde_eson::coerce::string_to_number;
///
/// assert_eq!(string_to_number(" 42 "), 42.0);
/// assert_eq!(string_to_number(""), 0.0);
/// assert_eq!(string_to_number("0x1F"), 31.0);
/// assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
/// assert!(string_to_number("12px").is_nan());
/// assert!(string_to_number("inf").is_nan());
/// ```
#[must_use]
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    if trimmed.is_empty() {
        return 0.0;
    }

    for (prefixes, radix) in [(["0x", "0X"], 16), (["0o", "0O"], 8), (["0b", "0B"], 2)] {
        if let Some(digits) = prefixes.iter().find_map(|p| trimmed.strip_prefix(p)) {
            return parse_radix(digits, radix).unwrap_or(f64::NAN);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if is_decimal_literal(trimmed) => trimmed.parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Converts digits of the given radix exactly, then rounds once to `f64`.
pub(crate) fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    BigInt::parse_bytes(digits.as_bytes(), radix).and_then(|n| n.to_f64())
}

fn is_decimal_literal(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (significand, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let (int, frac) = significand.split_once('.').unwrap_or((significand, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int.is_empty() && frac.is_empty() || !all_digits(int) || !all_digits(frac) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}

/// Converts a value to a number.
///
/// Big integers convert to the nearest float; callers that must reject them
/// check for [`Value::BigInt`] first.
///
/// # Examples
///
/// ```rust
/// use serde_eson::coerce::to_number;
/// use serde_eson::Value;
///
/// assert_eq!(to_number(&Value::Null), 0.0);
/// assert_eq!(to_number(&Value::Bool(true)), 1.0);
/// assert_eq!(to_number(&Value::from(" 7 ")), 7.0);
/// assert!(to_number(&Value::Undefined).is_nan());
/// ```
#[must_use]
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) | Value::Timestamp(n) => *n,
        Value::BigInt(b) => b.to_f64().unwrap_or(f64::NAN),
        Value::String(s) => string_to_number(s),
        Value::Boxed(boxed) => to_number(&boxed.to_primitive()),
        Value::Array(_) => string_to_number(&to_string(value)),
        _ => f64::NAN,
    }
}

/// Converts a value to text.
///
/// # Examples
///
/// ```rust
/// use serde_eson::coerce::to_string;
/// use serde_eson::{parse, Value};
///
/// assert_eq!(to_string(&Value::Undefined), "undefined");
/// assert_eq!(to_string(&Value::from(1e21)), "1e+21");
/// assert_eq!(to_string(&parse("[1, , null, [2, 3]]").unwrap()), "1,,,2,3");
/// assert_eq!(to_string(&parse("{}").unwrap()), "[object Object]");
/// assert_eq!(to_string(&parse("/a/g").unwrap()), "/a/g");
/// ```
#[must_use]
pub fn to_string(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::BigInt(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(slots) => slots
            .iter()
            .map(|slot| match slot {
                Some(item) if !item.is_nullish() => to_string(item),
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Timestamp(ms) => date_to_string(*ms),
        Value::Pattern(pattern) => pattern.to_string(),
        Value::OrderedMap(_) => "[object Map]".to_string(),
        Value::OrderedSet(_) => "[object Set]".to_string(),
        Value::Boxed(boxed) => to_string(&boxed.to_primitive()),
        Value::Error(err) => err.to_string(),
        Value::Callable(callable) => callable.source(),
    }
}

/// Converts a value to an object key. Every kind in the model keys by its
/// text form.
#[inline]
#[must_use]
pub fn to_property_key(value: &Value) -> String {
    to_string(value)
}

/// Converts a value to a boolean.
///
/// ```rust
/// use serde_eson::coerce::to_boolean;
/// use serde_eson::Value;
///
/// assert!(!to_boolean(&Value::from("")));
/// assert!(!to_boolean(&Value::Number(f64::NAN)));
/// assert!(to_boolean(&Value::Object(Default::default())));
/// ```
#[must_use]
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !(n.is_nan() || *n == 0.0),
        Value::BigInt(b) => b.sign() != num_bigint::Sign::NoSign,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Formats a timestamp the way `Date.prototype.toString` does in UTC.
#[must_use]
pub fn date_to_string(ms: f64) -> String {
    let date = if ms.is_finite() && ms.fract() == 0.0 {
        DateTime::from_timestamp_millis(ms as i64)
    } else {
        None
    };
    match date {
        Some(date) => date
            .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
            .to_string(),
        None => "Invalid Date".to_string(),
    }
}
