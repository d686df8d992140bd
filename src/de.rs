//! Deserialization of Rust data out of ESON values.
//!
//! [`Deserializer`] wraps an owned [`Value`] and drives any
//! `serde::Deserialize` implementation from it. Text input goes through
//! [`crate::parse`] first; [`crate::from_str`] does both steps.
//!
//! ## Mapping
//!
//! - `undefined`, `null` and array holes deserialize as unit or `None`
//! - integral numbers visit as integers, everything else as `f64`
//! - big integers visit as `i64`/`u64`/`i128`/`u128` when they fit, and as
//!   their decimal string otherwise
//! - rich kinds visit as their natural projection: dates as RFC 3339 strings,
//!   patterns as `/source/flags`, maps as maps with arbitrary keys, sets as
//!   sequences, boxed primitives as the primitive
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_eson::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32, label: Option<String> }
//!
//! let point: Point = from_str("{x: 0x10, y: -2, label: undefined}").unwrap();
//! assert_eq!(point, Point { x: 16, y: -2, label: None });
//! ```

use crate::value::MAX_SAFE_INTEGER;
use crate::{Error, Map, Result, Value};
use chrono::SecondsFormat;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::de::IntoDeserializer;
use serde::{de, forward_to_deserialize_any};

/// A deserializer over an owned [`Value`].
pub struct Deserializer {
    value: Value,
}

impl Deserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Deserializer { value }
    }
}

fn visit_number<'de, V>(n: f64, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    let integral = n.is_finite() && n.trunc() == n && !(n == 0.0 && n.is_sign_negative());
    if integral && n.abs() <= MAX_SAFE_INTEGER {
        visitor.visit_i64(n as i64)
    } else {
        visitor.visit_f64(n)
    }
}

fn visit_bigint<'de, V>(n: BigInt, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    if let Some(i) = n.to_i64() {
        visitor.visit_i64(i)
    } else if let Some(u) = n.to_u64() {
        visitor.visit_u64(u)
    } else if let Some(i) = n.to_i128() {
        visitor.visit_i128(i)
    } else if let Some(u) = n.to_u128() {
        visitor.visit_u128(u)
    } else {
        visitor.visit_string(n.to_string())
    }
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Undefined | Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => visit_number(n, visitor),
            Value::BigInt(n) => visit_bigint(n, visitor),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(slots) => visitor.visit_seq(SeqDeserializer::new(
                slots.into_iter().map(Option::unwrap_or_default).collect(),
            )),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::from_object(obj)),
            timestamp @ Value::Timestamp(_) => match timestamp.as_datetime() {
                Some(date) => {
                    visitor.visit_string(date.to_rfc3339_opts(SecondsFormat::Millis, true))
                }
                None => visitor.visit_f64(f64::NAN),
            },
            Value::Pattern(pattern) => visitor.visit_string(pattern.to_string()),
            Value::OrderedMap(entries) => visitor.visit_map(MapDeserializer::new(entries)),
            Value::OrderedSet(values) => visitor.visit_seq(SeqDeserializer::new(values)),
            Value::Boxed(boxed) => {
                de::Deserializer::deserialize_any(Deserializer::new(boxed.to_primitive()), visitor)
            }
            Value::Error(err) => visitor.visit_string(err.to_string()),
            Value::Callable(callable) => visitor.visit_string(callable.source()),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_nullish() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Object(obj) if obj.len() == 1 => match obj.into_iter().next() {
                Some((variant, value)) => visitor.visit_enum(EnumDeserializer::new(variant, value)),
                None => Err(Error::custom("Expected enum variant")),
            },
            Value::Object(_) => Err(Error::custom("Expected enum variant")),
            other => Err(Error::custom(format!(
                "Expected enum, found {}",
                other.kind_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Map access over key/value pairs; object keys arrive as string values.
struct MapDeserializer {
    iter: std::vec::IntoIter<(Value, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(entries: Vec<(Value, Value)>) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            value: None,
        }
    }

    fn from_object(obj: Map) -> Self {
        Self::new(
            obj.into_iter()
                .map(|(key, value)| (Value::String(key), value))
                .collect(),
        )
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(Deserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(Deserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(Deserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        if self.value.is_nullish() {
            Ok(())
        } else {
            Err(Error::custom("Expected unit variant"))
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(Deserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Array(slots) => visitor.visit_seq(SeqDeserializer::new(
                slots.into_iter().map(Option::unwrap_or_default).collect(),
            )),
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Object(obj) => visitor.visit_map(MapDeserializer::from_object(obj)),
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}
