//! Context values carried by trail entries.
//!
//! Every annotation may carry any number of free-form context values. They are
//! kept as a closed set of variants so that the textual encoding of a trail is
//! always well-defined:
//!
//! - [`Value::Null`] for absent values (`None`)
//! - [`Value::Bool`]
//! - [`Value::Int`], [`Value::UInt`] and [`Value::Float`] for numbers
//! - [`Value::Str`] for strings
//! - [`Value::List`] for nested sequences
//! - [`Value::Text`] for anything else, rendered to text up front with
//!   [`Value::display`] or [`Value::debug`]
//!
//! # Lossy edges
//!
//! Values travel through JSON, so decoding a trail does not always give back
//! the exact variant that was encoded:
//!
//! - [`Value::Text`] decodes as [`Value::Str`].
//! - [`Value::UInt`] decodes as [`Value::Int`] when it fits in an `i64`.
//! - Non-finite floats encode as `null` and decode as [`Value::Null`].
//! - Lists nested more than 64 levels deep keep their deeper levels as JSON
//!   text, which decodes as [`Value::Str`].
//!
//! # Examples
//!
//! ```
//! use errtrail::Value;
//!
//! assert_eq!(Value::from(42_u8), Value::Int(42));
//! assert_eq!(Value::from("id"), Value::Str("id".to_string()));
//! assert_eq!(Value::from(None::<i32>), Value::Null);
//! assert_eq!(Value::from(vec![1, 2]).to_string(), "[1,2]");
//! ```

use alloc::{
    borrow::{Cow, ToOwned},
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, SeqAccess, Visitor, value::MapAccessDeserializer},
    ser,
};

use crate::TrailError;

/// A single context value attached to a trail entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer, or an unsigned one that fits in an `i64`.
    Int(i64),
    /// An unsigned integer too large for an `i64`.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// A nested sequence of values.
    List(Vec<Value>),
    /// The text rendering of a value that has no native variant.
    Text(String),
}

impl Value {
    /// Renders `value` with its [`Display`](fmt::Display) implementation and
    /// keeps the result as opaque text.
    ///
    /// ```
    /// use errtrail::Value;
    ///
    /// let addr: std::net::Ipv4Addr = "10.0.0.1".parse().unwrap();
    /// assert_eq!(Value::display(&addr), Value::Text("10.0.0.1".to_string()));
    /// ```
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Value::Text(value.to_string())
    }

    /// Renders `value` with its [`Debug`](fmt::Debug) implementation and keeps
    /// the result as opaque text.
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Text(format!("{value:?}"))
    }

    /// Returns the string content of [`Value::Str`] and [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            Value::UInt(u) => i64::try_from(u).ok(),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => fmt::Debug::fmt(self, f),
        }
    }
}

macro_rules! from_lossless_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        // isize is at most 64 bits on every supported target
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(value),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(value: Cow<'_, str>) -> Self {
        Value::Str(value.into_owned())
    }
}

impl From<&TrailError> for Value {
    fn from(error: &TrailError) -> Self {
        Value::display(error)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(values: &[T]) -> Self {
        Value::List(values.iter().cloned().map(Into::into).collect())
    }
}

/// Lists nested deeper than this encode as their JSON text, keeping encoded
/// trails within the recursion limit of the decoder.
pub(crate) const MAX_LIST_DEPTH: usize = 64;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Nested {
            value: self,
            depth: 0,
        }
        .serialize(serializer)
    }
}

struct Nested<'a> {
    value: &'a Value,
    depth: usize,
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) | Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) if self.depth >= MAX_LIST_DEPTH => {
                let text = serde_json::to_string(items).map_err(ser::Error::custom)?;
                serializer.serialize_str(&text)
            }
            Value::List(items) => serializer.collect_seq(items.iter().map(|value| Nested {
                value,
                depth: self.depth + 1,
            })),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a context value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Value, A::Error> {
        // Objects have no native variant; keep their JSON text.
        let object = serde_json::Map::deserialize(MapAccessDeserializer::new(map))?;
        serde_json::to_string(&object)
            .map(Value::Text)
            .map_err(de::Error::custom)
    }
}
