//! native value representation
//!
//! Schema-less content (generic map decoding, JSON and YAML conversion, dynamically typed struct fields) is held as
//! a [Value]:
//! - boolean (true/false)
//! - numbers, narrowed to the smallest kind that represents them exactly: `i32`, `i64`, `f32`, `f64`
//! - string (utf-8)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! There is no `null`. Nulls read from any source are dropped from arrays and objects.
use indexmap::IndexMap;
use serde::{
    de::{MapAccess, SeqAccess, Visitor},
    ser::{SerializeMap, SerializeSeq},
    Deserializer, Serializer,
};

pub type Map = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Narrowest integral kind for `value`
    pub fn integer(value: i64) -> Value {
        match i32::try_from(value) {
            Ok(int) => Value::Int(int),
            Err(_) => Value::Long(value),
        }
    }

    /// Narrowest kind that represents `value` exactly
    ///
    /// Integral values within `i64` range become integers, values that survive a round trip through `f32` become
    /// [Value::Float].
    pub fn decimal(value: f64) -> Value {
        if value.is_finite() && value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            return Value::integer(value as i64);
        }

        let narrow = value as f32;
        if f64::from(narrow) == value {
            Value::Float(narrow)
        } else {
            Value::Double(value)
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(n) => Some(n.into()),
            Value::Long(n) => Some(n as f64),
            Value::Float(n) => Some(n.into()),
            Value::Double(n) => Some(n),
            _ => None,
        }
    }

    /// Arrays and objects
    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Name of the kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "bool",
            Value::Int(_) => "i32",
            Value::Long(_) => "i64",
            Value::Float(_) => "f32",
            Value::Double(_) => "f64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
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

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::decimal(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(value: IndexMap<K, V>) -> Self {
        Value::Object(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i32(*value),
            Value::Long(value) => serializer.serialize_i64(*value),
            // widened so the printed text parses back to the very same number
            Value::Float(value) => serializer.serialize_f64(f64::from(*value)),
            Value::Double(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

impl<'de> serde::de::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a boolean, number, string, array or map")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Boolean(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(match i64::try_from(v) {
            Ok(int) => Value::integer(int),
            Err(_) => Value::Double(v as f64),
        })
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::decimal(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut array = Vec::new();
        while let Some(element) = seq.next_element::<Option<Value>>()? {
            array.extend(element);
        }
        Ok(Value::Array(array))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some((key, value)) = map.next_entry::<String, Option<Value>>()? {
            if let Some(value) = value {
                object.insert(key, value);
            }
        }
        Ok(Value::Object(object))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decimal_narrows_to_smallest_exact_kind() {
        assert_eq!(Value::decimal(5.0), Value::Int(5));
        assert_eq!(Value::decimal(3_000_000_000.0), Value::Long(3_000_000_000));
        assert_eq!(Value::decimal(1.5), Value::Float(1.5));
        assert_eq!(Value::decimal(0.1), Value::Double(0.1));
        assert_eq!(Value::decimal(-2.5), Value::Float(-2.5));
    }

    #[test]
    fn json_nulls_are_dropped() {
        let value: Value = serde_json::from_str(r#"{"a": null, "b": [1, null, 2.5], "c": "x"}"#).unwrap();

        let mut expected = Map::new();
        expected.insert("b".into(), Value::Array(vec![Value::Int(1), Value::Float(2.5)]));
        expected.insert("c".into(), "x".into());
        assert_eq!(value, Value::Object(expected));
    }

    #[test]
    fn float_serializes_widened() {
        let narrow = Value::decimal(f64::from(0.1f32));
        assert_eq!(narrow, Value::Float(0.1));

        let json = serde_json::to_string(&narrow).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, narrow);
    }
}
