//! conversion between tagged values ([hcl::Value]) and native values
//!
//! - [value_to_native] narrows numbers and drops nulls
//! - [native_to_value] is its inverse
//! - [convert_to_field_type] converts into the exact type of a struct field and refuses to truncate
use crate::object::Element;
use crate::value::{Map, Value};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("failed to convert {value} to {target}: out of range")]
    OutOfRange { value: String, target: &'static str },

    #[error("failed to convert {found} value to {target}")]
    Mismatch {
        found: &'static str,
        target: &'static str,
    },

    #[error("map key must be string, got {0}")]
    NonStringKey(&'static str),

    #[error("map key {0:?} is not a valid identifier")]
    InvalidKey(String),

    #[error("data type {0} not supported")]
    Unsupported(String),
}

impl ConversionError {
    pub fn mismatch(found: &hcl::Value, target: &'static str) -> Self {
        ConversionError::Mismatch {
            found: tagged_kind(found),
            target,
        }
    }
}

/// Name of the kind of a tagged value, for error messages
pub fn tagged_kind(value: &hcl::Value) -> &'static str {
    match value {
        hcl::Value::Null => "null",
        hcl::Value::Bool(_) => "bool",
        hcl::Value::Number(_) => "number",
        hcl::Value::String(_) => "string",
        hcl::Value::Array(_) => "tuple",
        hcl::Value::Object(_) => "object",
    }
}

/// Tagged value to native value. `null` has no native counterpart.
pub fn value_to_native(value: &hcl::Value) -> Option<Value> {
    match value {
        hcl::Value::Null => None,
        hcl::Value::Bool(b) => Some(Value::Boolean(*b)),
        hcl::Value::Number(n) => Some(narrow_number(n)),
        hcl::Value::String(s) => Some(Value::String(s.clone())),
        hcl::Value::Array(items) => Some(Value::Array(
            items.iter().filter_map(value_to_native).collect(),
        )),
        hcl::Value::Object(object) => Some(Value::Object(
            object
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), value_to_native(value)?)))
                .collect::<Map>(),
        )),
    }
}

/// Smallest native numeric kind that holds `number` exactly
pub fn narrow_number(number: &hcl::Number) -> Value {
    if let Some(int) = number.as_i64() {
        return Value::integer(int);
    }
    if let Some(uint) = number.as_u64() {
        return Value::Double(uint as f64);
    }
    Value::decimal(number.as_f64().unwrap_or(f64::NAN))
}

/// Native value to tagged value
pub fn native_to_value(value: &Value) -> Result<hcl::Value, ConversionError> {
    Ok(match value {
        Value::Boolean(b) => hcl::Value::Bool(*b),
        Value::Int(n) => hcl::Value::Number(hcl::Number::from(i64::from(*n))),
        Value::Long(n) => hcl::Value::Number(hcl::Number::from(*n)),
        Value::Float(n) => float_to_value(f64::from(*n))?,
        Value::Double(n) => float_to_value(*n)?,
        Value::String(s) => hcl::Value::String(s.clone()),
        Value::Array(items) => hcl::Value::Array(
            items
                .iter()
                .map(native_to_value)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(object) => hcl::Value::Object(
            object
                .iter()
                .map(|(key, value)| Ok((key.clone(), native_to_value(value)?)))
                .collect::<Result<_, ConversionError>>()?,
        ),
    })
}

pub(crate) fn float_to_value(float: f64) -> Result<hcl::Value, ConversionError> {
    hcl::Number::from_f64(float)
        .map(hcl::Value::Number)
        .ok_or_else(|| ConversionError::Unsupported(format!("non-finite float {float}")))
}

/// Convert a tagged value into exactly `T`
///
/// `null` yields `T::default()`. Numbers convert to strings when `T` is a string. Objects and tuples convert element
/// by element into maps and lists. Numbers that do not fit `T` are an error.
pub fn convert_to_field_type<T: Element + Default>(value: &hcl::Value) -> Result<T, ConversionError> {
    match value {
        hcl::Value::Null => Ok(T::default()),
        other => T::from_tagged(other),
    }
}

/// Scalar types a field can hold
pub trait Scalar: Sized + Default + PartialEq + Send + Sync + 'static {
    const TARGET: &'static str;

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError>;
    fn to_tagged(&self) -> Result<hcl::Value, ConversionError>;
    fn to_native(&self) -> Value;
}

fn expect_number<'v>(value: &'v hcl::Value, target: &'static str) -> Result<&'v hcl::Number, ConversionError> {
    match value {
        hcl::Value::Number(number) => Ok(number),
        other => Err(ConversionError::mismatch(other, target)),
    }
}

fn out_of_range(number: &hcl::Number, target: &'static str) -> ConversionError {
    ConversionError::OutOfRange {
        value: number.to_string(),
        target,
    }
}

/// Integral value of `number`, whether it was written as an integer or as an integral float
fn integral(number: &hcl::Number, target: &'static str) -> Result<i128, ConversionError> {
    if let Some(int) = number.as_i64() {
        return Ok(i128::from(int));
    }
    if let Some(uint) = number.as_u64() {
        return Ok(i128::from(uint));
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1.8e19 => Ok(float as i128),
        _ => Err(out_of_range(number, target)),
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            const TARGET: &'static str = stringify!($ty);

            fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
                let number = expect_number(value, Self::TARGET)?;
                let int = integral(number, Self::TARGET)?;
                <$ty>::try_from(int).map_err(|_| out_of_range(number, Self::TARGET))
            }

            fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
                Ok(hcl::Value::Number(match i64::try_from(*self as i128) {
                    Ok(signed) => hcl::Number::from(signed),
                    Err(_) => hcl::Number::from(*self as u64),
                }))
            }

            fn to_native(&self) -> Value {
                match i64::try_from(*self as i128) {
                    Ok(signed) => Value::integer(signed),
                    Err(_) => Value::Double(*self as f64),
                }
            }
        }
    )*};
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Scalar for f64 {
    const TARGET: &'static str = "f64";

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        let number = expect_number(value, Self::TARGET)?;
        number
            .as_f64()
            .ok_or_else(|| out_of_range(number, Self::TARGET))
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        float_to_value(*self)
    }

    fn to_native(&self) -> Value {
        Value::decimal(*self)
    }
}

impl Scalar for f32 {
    const TARGET: &'static str = "f32";

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        let number = expect_number(value, Self::TARGET)?;
        match number.as_f64() {
            Some(float) if float.abs() <= f64::from(f32::MAX) => Ok(float as f32),
            _ => Err(out_of_range(number, Self::TARGET)),
        }
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        float_to_value(f64::from(*self))
    }

    fn to_native(&self) -> Value {
        Value::decimal(f64::from(*self))
    }
}

impl Scalar for bool {
    const TARGET: &'static str = "bool";

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        match value {
            hcl::Value::Bool(b) => Ok(*b),
            other => Err(ConversionError::mismatch(other, Self::TARGET)),
        }
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        Ok(hcl::Value::Bool(*self))
    }

    fn to_native(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl Scalar for String {
    const TARGET: &'static str = "string";

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        match value {
            hcl::Value::String(s) => Ok(s.clone()),
            hcl::Value::Number(n) => Ok(n.to_string()),
            other => Err(ConversionError::mismatch(other, Self::TARGET)),
        }
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        Ok(hcl::Value::String(self.clone()))
    }

    fn to_native(&self) -> Value {
        Value::String(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn integers_stay_integral_through_a_round_trip() {
        for int in [0i64, 1, -1, 255, 300, i64::from(i32::MAX) + 1, -(1 << 40), i64::MAX >> 1] {
            let tagged = native_to_value(&Value::from(int)).unwrap();
            let native = value_to_native(&tagged).unwrap();
            match native {
                Value::Int(n) => assert_eq!(i64::from(n), int),
                Value::Long(n) => assert_eq!(n, int),
                other => panic!("{int} became {other:?}"),
            }
        }
    }

    #[test]
    fn overflow_is_an_error_not_a_wraparound() {
        let tagged = hcl::Value::from(300);

        let error = convert_to_field_type::<u8>(&tagged).unwrap_err();
        assert_eq!(
            error,
            ConversionError::OutOfRange {
                value: "300".into(),
                target: "u8"
            }
        );
        assert!(error.to_string().contains("u8"));
        assert_eq!(convert_to_field_type::<u16>(&tagged), Ok(300));
        assert!(convert_to_field_type::<u32>(&hcl::Value::from(-1)).is_err());
    }

    #[test]
    fn null_yields_the_zero_value() {
        assert_eq!(convert_to_field_type::<i32>(&hcl::Value::Null), Ok(0));
        assert_eq!(convert_to_field_type::<String>(&hcl::Value::Null), Ok(String::new()));
        assert_eq!(convert_to_field_type::<Vec<String>>(&hcl::Value::Null), Ok(vec![]));
    }

    #[test]
    fn numbers_convert_to_strings() {
        assert_eq!(
            convert_to_field_type::<String>(&hcl::Value::from(42)),
            Ok("42".to_owned())
        );
        assert!(convert_to_field_type::<String>(&hcl::Value::Bool(true)).is_err());
    }

    #[test]
    fn collections_convert_element_wise() {
        let tagged: hcl::Value = hcl::from_str(
            r#"
            a = ["x", "y"]
            b = ["z"]
            "#,
        )
        .unwrap();

        let map = convert_to_field_type::<IndexMap<String, Vec<String>>>(&tagged).unwrap();
        assert_eq!(map["a"], vec!["x".to_owned(), "y".to_owned()]);
        assert_eq!(map["b"], vec!["z".to_owned()]);

        let tuple = hcl::Value::Array(vec![hcl::Value::from(1), hcl::Value::from(300)]);
        assert!(convert_to_field_type::<Vec<u8>>(&tuple).is_err());
        assert_eq!(convert_to_field_type::<Vec<u16>>(&tuple), Ok(vec![1, 300]));
    }

    #[test]
    fn objects_drop_null_entries() {
        let tagged: hcl::Value = hcl::from_str("a = 1\nb = null\nc = [true, null]").unwrap();
        let native = value_to_native(&tagged).unwrap();

        let mut expected = Map::new();
        expected.insert("a".into(), Value::Int(1));
        expected.insert("c".into(), Value::Array(vec![Value::Boolean(true)]));
        assert_eq!(native, Value::Object(expected));
    }

    #[test]
    fn non_finite_floats_are_unsupported() {
        assert!(matches!(
            native_to_value(&Value::Double(f64::NAN)),
            Err(ConversionError::Unsupported(_))
        ));
    }
}
