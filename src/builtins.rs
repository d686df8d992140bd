//! The closed registry of constructible rich kinds.
//!
//! Each [`Builtin`] pairs a constructor, run by the parser for
//! `new Name(args)`, with a decomposer, run by the stringifier to recover the
//! arguments that rebuild a value. The table is built once per process and
//! never changes afterwards.
//!
//! ## Examples
//!
//! ```rust
//! use serde_eson::builtins;
//! use serde_eson::Value;
//!
//! let date = builtins::lookup("Date").unwrap();
//! let value = date.construct(&[Value::from(0)]).unwrap();
//! assert_eq!(value, Value::Timestamp(0.0));
//!
//! let (name, args) = builtins::decompose(&value).unwrap();
//! assert_eq!(name, "Date");
//! assert_eq!(args, vec![Value::from(0)]);
//! ```

use crate::coerce::{self, to_boolean, to_number, to_string};
use crate::{Boxed, Callable, Error, ErrorName, ErrorValue, Map, Pattern, Result, Value};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use num_traits::ToPrimitive;
use once_cell::sync::Lazy;

/// Builds a value from evaluated constructor arguments.
pub type Construct = fn(&[Value]) -> Result<Value>;

/// Recovers constructor arguments from a value, or `None` when the value is
/// written in literal form instead.
pub type Decompose = fn(&Value) -> Option<Vec<Value>>;

/// One registry entry.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    construct: Construct,
    decompose: Decompose,
}

impl Builtin {
    /// Runs the constructor on `args`.
    ///
    /// # Errors
    ///
    /// Returns the type, range or flag error the constructor raises.
    pub fn construct(&self, args: &[Value]) -> Result<Value> {
        (self.construct)(args)
    }

    #[must_use]
    pub fn decompose(&self, value: &Value) -> Option<Vec<Value>> {
        (self.decompose)(value)
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

/// Timestamps are limited to ±100,000,000 days around the epoch.
const MAX_TIME: f64 = 8.64e15;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Upper bound on `new Array(n)`; holes are stored densely.
pub const MAX_ARRAY_LENGTH: usize = 1 << 24;

static REGISTRY: Lazy<IndexMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut table = IndexMap::new();
    let mut register = |name: &'static str, construct: Construct, decompose: Decompose| {
        table.insert(
            name,
            Builtin {
                name,
                construct,
                decompose,
            },
        );
    };

    register("Array", construct_array, decompose_array);
    register("Object", construct_object, |_| None);
    register("Boolean", construct_boolean, decompose_boxed);
    register("Number", construct_number, decompose_boxed);
    register("String", construct_string, decompose_boxed);
    register("Date", construct_date, decompose_date);
    register("RegExp", construct_pattern, decompose_pattern);
    register("Map", construct_map, decompose_map);
    register("Set", construct_set, decompose_set);
    register("Function", construct_callable, decompose_callable);
    register("Error", |args| construct_error(ErrorName::Error, args), decompose_error);
    register("EvalError", |args| construct_error(ErrorName::EvalError, args), decompose_error);
    register("RangeError", |args| construct_error(ErrorName::RangeError, args), decompose_error);
    register(
        "ReferenceError",
        |args| construct_error(ErrorName::ReferenceError, args),
        decompose_error,
    );
    register(
        "SyntaxError",
        |args| construct_error(ErrorName::SyntaxError, args),
        decompose_error,
    );
    register("TypeError", |args| construct_error(ErrorName::TypeError, args), decompose_error);
    register("URIError", |args| construct_error(ErrorName::URIError, args), decompose_error);

    tracing::debug!(builtins = table.len(), "builtin registry initialized");
    table
});

/// Looks up a builtin by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    REGISTRY.get(name)
}

/// Returns `true` when `name` is a registered builtin.
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    REGISTRY.contains_key(name)
}

/// Registered names, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}

/// Finds the builtin that rebuilds `value` and the arguments to pass it.
///
/// Returns `None` for values written in literal form: primitives, objects and
/// arrays with at least one populated slot.
///
/// # Examples
///
/// ```rust
/// use serde_eson::builtins::decompose;
/// use serde_eson::{parse, Value};
///
/// let (name, args) = decompose(&parse("new Array(3)").unwrap()).unwrap();
/// assert_eq!((name, args), ("Array", vec![Value::from(3)]));
/// assert!(decompose(&parse("[1, , 2]").unwrap()).is_none());
/// ```
#[must_use]
pub fn decompose(value: &Value) -> Option<(&'static str, Vec<Value>)> {
    let name = match value {
        Value::Array(_) => "Array",
        Value::Timestamp(_) => "Date",
        Value::Pattern(_) => "RegExp",
        Value::OrderedMap(_) => "Map",
        Value::OrderedSet(_) => "Set",
        Value::Boxed(boxed) => boxed.constructor_name(),
        Value::Error(err) => err.name.as_str(),
        Value::Callable(_) => "Function",
        _ => return None,
    };
    let builtin = lookup(name)?;
    builtin.decompose(value).map(|args| (builtin.name, args))
}

fn arg(args: &[Value], index: usize) -> &Value {
    static UNDEFINED: Value = Value::Undefined;
    args.get(index).unwrap_or(&UNDEFINED)
}

fn describe(value: &Value) -> String {
    crate::stringify::stringify(value)
}

/// Expands an iterable value into its items.
///
/// Arrays yield `undefined` for holes, strings yield characters, ordered maps
/// yield `[key, value]` pairs.
///
/// # Errors
///
/// Returns a type error for values that are not iterable.
pub fn iterate(value: &Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(slots) => Ok(slots
            .iter()
            .map(|slot| slot.clone().unwrap_or_default())
            .collect()),
        Value::String(s) | Value::Boxed(Boxed::String(s)) => {
            Ok(s.chars().map(|c| Value::String(c.to_string())).collect())
        }
        Value::OrderedSet(values) => Ok(values.clone()),
        Value::OrderedMap(entries) => Ok(entries
            .iter()
            .map(|(k, v)| Value::from(vec![k.clone(), v.clone()]))
            .collect()),
        _ => Err(Error::type_error(format!(
            "{} is not iterable",
            describe(value)
        ))),
    }
}

fn construct_array(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Number(n)] => {
            let length = n
                .to_u32()
                .filter(|&len| f64::from(len) == *n && (len as usize) <= MAX_ARRAY_LENGTH)
                .ok_or_else(|| Error::range_error("Invalid array length"))?;
            Ok(Value::Array(vec![None; length as usize]))
        }
        _ => Ok(Value::Array(args.iter().cloned().map(Some).collect())),
    }
}

fn decompose_array(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(slots) if !slots.is_empty() && slots.iter().all(Option::is_none) => {
            Some(vec![Value::from(slots.len())])
        }
        _ => None,
    }
}

fn construct_object(args: &[Value]) -> Result<Value> {
    Ok(match arg(args, 0) {
        Value::Undefined | Value::Null => Value::Object(Map::new()),
        Value::Bool(b) => Value::Boxed(Boxed::Boolean(*b)),
        Value::Number(n) => Value::Boxed(Boxed::Number(*n)),
        Value::String(s) => Value::Boxed(Boxed::String(s.clone())),
        other => other.clone(),
    })
}

fn construct_boolean(args: &[Value]) -> Result<Value> {
    Ok(Value::Boxed(Boxed::Boolean(to_boolean(arg(args, 0)))))
}

fn construct_number(args: &[Value]) -> Result<Value> {
    let n = match args.first() {
        None => 0.0,
        Some(value) => to_number(value),
    };
    Ok(Value::Boxed(Boxed::Number(n)))
}

fn construct_string(args: &[Value]) -> Result<Value> {
    let s = match args.first() {
        None => String::new(),
        Some(value) => to_string(value),
    };
    Ok(Value::Boxed(Boxed::String(s)))
}

fn decompose_boxed(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Boxed(boxed) => Some(vec![boxed.to_primitive()]),
        _ => None,
    }
}

/// Truncates a time value toward zero, or `NaN` when out of range.
fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME {
        f64::NAN
    } else {
        time.trunc() + 0.0
    }
}

fn construct_date(args: &[Value]) -> Result<Value> {
    let time = match args {
        [] => Utc::now().timestamp_millis() as f64,
        [Value::Timestamp(ms)] => *ms,
        [Value::String(text)] | [Value::Boxed(Boxed::String(text))] => parse_date(text),
        [value] => time_clip(to_number(value)),
        _ => {
            let mut fields = [f64::NAN, f64::NAN, 1.0, 0.0, 0.0, 0.0, 0.0];
            for (field, value) in fields.iter_mut().zip(args) {
                *field = to_number(value);
            }
            make_date(fields)
        }
    };
    Ok(Value::Timestamp(time))
}

/// Parses date text as UTC; unrecognized text is an invalid date.
fn parse_date(text: &str) -> f64 {
    let text = text.trim();
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|date| date.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").map(|date| date.and_utc())
        })
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").map(|date| date.and_utc()))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::default()).and_utc())
        })
        .or_else(|_| DateTime::parse_from_rfc2822(text).map(|date| date.with_timezone(&Utc)));
    match parsed {
        Ok(date) => time_clip(date.timestamp_millis() as f64),
        Err(_) => f64::NAN,
    }
}

/// Builds a time value from UTC components `[year, month0, day, h, m, s, ms]`.
fn make_date(fields: [f64; 7]) -> f64 {
    if fields.iter().any(|field| !field.is_finite()) {
        return f64::NAN;
    }
    let [year, month, day, hours, minutes, seconds, millis] = fields.map(f64::trunc);
    let year = if (0.0..=99.0).contains(&year) {
        1900.0 + year
    } else {
        year
    };
    let year = year + (month / 12.0).floor();
    let month = month.rem_euclid(12.0);

    let first_of_month = year
        .to_i32()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month as u32 + 1, 1));
    let Some(first_of_month) = first_of_month else {
        return f64::NAN;
    };
    let days =
        (i64::from(first_of_month.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE) as f64 + day - 1.0;
    let time = hours * 3_600_000.0 + minutes * 60_000.0 + seconds * 1_000.0 + millis;
    time_clip(days * MS_PER_DAY + time)
}

fn decompose_date(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Timestamp(ms) => Some(vec![Value::Number(*ms)]),
        _ => None,
    }
}

fn construct_pattern(args: &[Value]) -> Result<Value> {
    let (source, default_flags) = match arg(args, 0) {
        Value::Undefined => (String::new(), String::new()),
        Value::Pattern(pattern) => (pattern.source.clone(), pattern.flags.clone()),
        other => (to_string(other), String::new()),
    };
    let flags = match arg(args, 1) {
        Value::Undefined => default_flags,
        other => to_string(other),
    };
    Ok(Value::Pattern(Pattern::new(&source, &flags)?))
}

fn decompose_pattern(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Pattern(pattern) => Some(vec![
            Value::from(pattern.source.as_str()),
            Value::from(pattern.flags.as_str()),
        ]),
        _ => None,
    }
}

fn construct_map(args: &[Value]) -> Result<Value> {
    let source = arg(args, 0);
    if source.is_nullish() {
        return Ok(Value::OrderedMap(Vec::new()));
    }
    let entries = iterate(source)?
        .into_iter()
        .map(|item| {
            if item.is_container() {
                Ok((item.get(&Value::from(0)), item.get(&Value::from(1))))
            } else {
                Err(Error::type_error(format!(
                    "Iterator value {} is not an entry object",
                    describe(&item)
                )))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::OrderedMap(entries))
}

fn decompose_map(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::OrderedMap(entries) => {
            let pairs: Vec<Value> = entries
                .iter()
                .map(|(k, v)| Value::from(vec![k.clone(), v.clone()]))
                .collect();
            Some(vec![Value::from(pairs)])
        }
        _ => None,
    }
}

fn construct_set(args: &[Value]) -> Result<Value> {
    let source = arg(args, 0);
    if source.is_nullish() {
        return Ok(Value::OrderedSet(Vec::new()));
    }
    Ok(Value::OrderedSet(iterate(source)?))
}

fn decompose_set(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::OrderedSet(values) => Some(vec![Value::from(values.clone())]),
        _ => None,
    }
}

fn construct_callable(args: &[Value]) -> Result<Value> {
    let mut texts: Vec<String> = args.iter().map(to_string).collect();
    let body = texts.pop().unwrap_or_default();
    Ok(Value::Callable(Callable::new(texts.join(","), body)))
}

fn decompose_callable(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Callable(callable) if callable.params.is_empty() => {
            Some(vec![Value::from(callable.body.as_str())])
        }
        Value::Callable(callable) => Some(vec![
            Value::from(callable.params.as_str()),
            Value::from(callable.body.as_str()),
        ]),
        _ => None,
    }
}

fn construct_error(name: ErrorName, args: &[Value]) -> Result<Value> {
    let message = match arg(args, 0) {
        Value::Undefined => String::new(),
        other => coerce::to_string(other),
    };
    Ok(Value::Error(ErrorValue::new(name, message)))
}

fn decompose_error(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Error(err) if err.message.is_empty() => Some(Vec::new()),
        Value::Error(err) => Some(vec![Value::from(err.message.as_str())]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn construct(name: &str, args: &[Value]) -> Result<Value> {
        lookup(name).unwrap().construct(args)
    }

    #[test]
    fn test_registry_contents() {
        let names: Vec<_> = names().collect();
        assert_eq!(names.len(), 17);
        assert!(is_builtin("URIError"));
        assert!(!is_builtin("Foo"));
        assert!(lookup("Promise").is_none());
    }

    #[test]
    fn test_map_decompose() {
        let map = construct(
            "Map",
            &[Value::from(vec![Value::from(vec![Value::from("k"), Value::from(1)])])],
        )
        .unwrap();
        let (name, args) = decompose(&map).unwrap();
        assert_eq!(name, "Map");
        assert_eq!(
            args,
            vec![Value::from(vec![Value::from(vec![Value::from("k"), Value::from(1)])])]
        );
    }

    #[test]
    fn test_array_constructor() {
        assert_eq!(construct("Array", &[]).unwrap(), Value::Array(vec![]));
        assert_eq!(
            construct("Array", &[Value::from(2)]).unwrap(),
            Value::Array(vec![None, None])
        );
        assert_eq!(
            construct("Array", &[Value::from("2")]).unwrap(),
            Value::from(vec![Value::from("2")])
        );
        let err = construct("Array", &[Value::from(1.5)]).unwrap_err();
        assert_eq!(err, Error::Range("Invalid array length".to_string()));
        assert!(construct("Array", &[Value::from(-1)]).is_err());
    }

    #[test]
    fn test_boxed_constructors() {
        assert_eq!(
            construct("Number", &[]).unwrap(),
            Value::Boxed(Boxed::Number(0.0))
        );
        assert_eq!(
            construct("Number", &[Value::from("0x10")]).unwrap(),
            Value::Boxed(Boxed::Number(16.0))
        );
        assert_eq!(
            construct("String", &[Value::from(1e21)]).unwrap(),
            Value::Boxed(Boxed::String("1e+21".to_string()))
        );
        assert_eq!(
            construct("Boolean", &[Value::from("")]).unwrap(),
            Value::Boxed(Boxed::Boolean(false))
        );
        assert_eq!(
            construct("Object", &[Value::from(true)]).unwrap(),
            Value::Boxed(Boxed::Boolean(true))
        );
        assert_eq!(
            construct("Object", &[]).unwrap(),
            Value::Object(Map::new())
        );
    }

    #[test]
    fn test_date_constructor() {
        assert_eq!(
            construct("Date", &[Value::from(2345235)]).unwrap(),
            Value::Timestamp(2345235.0)
        );
        assert_eq!(
            construct("Date", &[Value::from("1970-01-02")]).unwrap(),
            Value::Timestamp(MS_PER_DAY)
        );
        assert_eq!(
            construct("Date", &[Value::from("2020-01-01T00:00:00.500Z")]).unwrap(),
            Value::Timestamp(1_577_836_800_500.0)
        );
        assert_eq!(
            construct("Date", &[Value::from("not a date")]).unwrap(),
            Value::Timestamp(f64::NAN)
        );
        assert_eq!(
            construct("Date", &[Value::from(9e15)]).unwrap(),
            Value::Timestamp(f64::NAN)
        );
        assert!(construct("Date", &[]).unwrap().is_timestamp());
    }

    #[test]
    fn test_date_components() {
        assert_eq!(
            construct("Date", &[Value::from(1970), Value::from(0)]).unwrap(),
            Value::Timestamp(0.0)
        );
        // Month 12 rolls into the next year.
        assert_eq!(
            construct("Date", &[Value::from(2019), Value::from(12), Value::from(1)]).unwrap(),
            Value::Timestamp(1_577_836_800_000.0)
        );
        assert_eq!(
            construct(
                "Date",
                &[Value::from(70), Value::from(0), Value::from(1), Value::from(1)]
            )
            .unwrap(),
            Value::Timestamp(3_600_000.0)
        );
    }

    #[test]
    fn test_pattern_constructor() {
        assert_eq!(
            construct("RegExp", &[]).unwrap(),
            Value::Pattern(Pattern::new("(?:)", "").unwrap())
        );
        let existing = Value::Pattern(Pattern::new("a", "gi").unwrap());
        assert_eq!(
            construct("RegExp", &[existing.clone()]).unwrap(),
            existing
        );
        assert_eq!(
            construct("RegExp", &[existing, Value::from("m")]).unwrap(),
            Value::Pattern(Pattern::new("a", "m").unwrap())
        );
        assert_eq!(
            construct("RegExp", &[Value::from("a"), Value::from("gg")]).unwrap_err(),
            Error::InvalidFlags {
                flags: "gg".to_string()
            }
        );
    }

    #[test]
    fn test_map_and_set_constructors() {
        let entries = Value::from(vec![
            Value::from(vec![Value::from("a"), Value::from(1)]),
            Value::from(vec![Value::from("a"), Value::from(2)]),
        ]);
        let map = construct("Map", &[entries]).unwrap();
        assert_eq!(
            map,
            Value::OrderedMap(vec![
                (Value::from("a"), Value::from(1)),
                (Value::from("a"), Value::from(2)),
            ])
        );

        let err = construct("Map", &[Value::from(vec![Value::from(1)])]).unwrap_err();
        assert_eq!(err.to_string(), "Iterator value 1 is not an entry object");

        let set = construct("Set", &[Value::from("aba")]).unwrap();
        assert_eq!(
            set,
            Value::OrderedSet(vec![Value::from("a"), Value::from("b"), Value::from("a")])
        );
        let err = construct("Set", &[Value::from(5)]).unwrap_err();
        assert_eq!(err.to_string(), "5 is not iterable");
    }

    #[test]
    fn test_function_and_error_constructors() {
        assert_eq!(
            construct("Function", &[Value::from("a"), Value::from("b"), Value::from("return a")])
                .unwrap(),
            Value::Callable(Callable::new("a,b", "return a"))
        );
        assert_eq!(
            construct("Function", &[]).unwrap(),
            Value::Callable(Callable::new("", ""))
        );
        assert_eq!(
            construct("TypeError", &[Value::from("nope")]).unwrap(),
            Value::Error(ErrorValue::new(ErrorName::TypeError, "nope"))
        );
    }

    #[test]
    fn test_decompose_inverts_construct() {
        let samples = [
            ("Date", vec![Value::from(0)]),
            ("RegExp", vec![Value::from("^a"), Value::from("g")]),
            ("Set", vec![Value::from(vec![Value::from(1), Value::from(2)])]),
            ("Function", vec![Value::from("x"), Value::from("return x")]),
            ("Error", vec![Value::from("boom")]),
            ("Number", vec![Value::from(4)]),
            ("Array", vec![Value::from(3)]),
        ];
        for (name, args) in samples {
            let value = construct(name, &args).unwrap();
            let (decomposed_name, decomposed_args) = decompose(&value).unwrap();
            assert_eq!(decomposed_name, name);
            assert_eq!(construct(name, &decomposed_args).unwrap(), value);
        }
    }
}
