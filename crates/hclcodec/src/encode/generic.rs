//! schema-less encoding of [Value]s
//!
//! An object whose values are all non-empty objects is written as labeled blocks, everything else as attributes:
//!
//! | value                                | document                          |
//! |--------------------------------------|-----------------------------------|
//! | `a: 1`                               | `a = 1`                           |
//! | `b: { x = 1, y = [] }`               | `b { .. }`                        |
//! | `c: { x: { .. } }`                   | `c "x" { .. }`                    |
//! | `d: { x: { y: { .. } } }`            | `d "x" "y" { .. }`                |
//!
//! Blocks nest at most two levels deep. Below that, objects are written as object literals.
use super::{attribute_line, tagged, write_wrapped};
use crate::error::{Error, Result};
use crate::value::{Map, Value};
use hcl::Expression;

/// Deepest nesting level at which objects are still written as blocks
const MAX_BLOCK_LEVEL: usize = 2;

/// Encode a schema-less object as an HCL document
pub fn marshal_map(map: &Map) -> Result<String> {
    let mut out = String::new();
    write_body(&mut out, map, 0)?;
    Ok(out)
}

/// Encode any schema-less value: objects as documents, everything else as a single expression
pub fn marshal_value(value: &Value) -> Result<String> {
    match value {
        Value::Object(map) => marshal_map(map),
        other => {
            let expr = Expression::from(tagged(other)?);
            hcl::format::to_string(&expr).map_err(Error::Format)
        }
    }
}

pub(super) fn write_body(out: &mut String, map: &Map, level: usize) -> Result<()> {
    for (key, value) in map {
        write_entry(out, key, value, level).map_err(|e| e.in_field(key))?;
    }
    Ok(())
}

fn write_entry(out: &mut String, key: &str, value: &Value, level: usize) -> Result<()> {
    let object = match value {
        Value::Object(object) if !object.is_empty() && level < MAX_BLOCK_LEVEL => object,
        other => {
            out.push_str(&attribute_line(key, tagged(other)?, level)?);
            return Ok(());
        }
    };

    match label_count(object) {
        0 => write_section(out, key, &[], object, level),
        1 => {
            for (label, inner) in sections(object) {
                write_section(out, key, &[label], inner, level)?;
            }
            Ok(())
        }
        _ => {
            for (first, inner) in sections(object) {
                for (second, innermost) in sections(inner) {
                    write_section(out, key, &[first, second], innermost, level)?;
                }
            }
            Ok(())
        }
    }
}

fn write_section(out: &mut String, key: &str, labels: &[&String], object: &Map, level: usize) -> Result<()> {
    let mut body = String::new();
    write_body(&mut body, object, level + 1)?;
    let labels: Vec<String> = labels.iter().map(|label| label.to_string()).collect();
    write_wrapped(out, key, &labels, &body, level)
}

fn is_section(value: &Value) -> bool {
    matches!(value, Value::Object(object) if !object.is_empty())
}

fn all_sections(object: &Map) -> bool {
    !object.is_empty() && object.values().all(is_section)
}

/// Number of labels (0 to 2) that can address the entries of `object`
fn label_count(object: &Map) -> usize {
    if !all_sections(object) {
        0
    } else if sections(object).all(|(_, inner)| all_sections(inner)) {
        2
    } else {
        1
    }
}

fn sections(object: &Map) -> impl Iterator<Item = (&String, &Map)> {
    object
        .iter()
        .filter_map(|(key, value)| Some((key, value.as_object()?)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conversion::ConversionError;
    use pretty_assertions::assert_eq;

    fn map(entries: Vec<(&str, Value)>) -> Map {
        entries.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
    }

    #[test]
    fn nested_objects_become_labeled_blocks() {
        let document = map(vec![
            ("a", Value::Int(1)),
            (
                "c",
                Value::Object(map(vec![("x", Value::Object(map(vec![("v", Value::Boolean(true))])))])),
            ),
            (
                "d",
                Value::Object(map(vec![(
                    "x",
                    Value::Object(map(vec![("y", Value::Object(map(vec![("v", Value::from("s"))])))])),
                )])),
            ),
        ]);

        insta::assert_snapshot!(marshal_map(&document).unwrap(), @r###"
        a = 1
        c "x" {
          v = true
        }
        d "x" "y" {
          v = "s"
        }
        "###);
    }

    #[test]
    fn mixed_objects_become_unlabeled_blocks() {
        let document = map(vec![(
            "b",
            Value::Object(map(vec![("x", Value::Int(1)), ("y", Value::Double(0.25))])),
        )]);

        insta::assert_snapshot!(marshal_map(&document).unwrap(), @r###"
        b {
          x = 1
          y = 0.25
        }
        "###);
    }

    #[test]
    fn round_trips_through_the_generic_decoder() {
        let document = map(vec![
            ("name", Value::from("demo")),
            ("ratio", Value::Float(1.5)),
            ("whole", Value::Double(3.0)),
            ("list", Value::Array(vec![Value::Int(1), Value::from("two")])),
            (
                "server",
                Value::Object(map(vec![
                    (
                        "alpha",
                        Value::Object(map(vec![
                            ("port", Value::Int(80)),
                            (
                                "deep",
                                Value::Object(map(vec![(
                                    "deeper",
                                    Value::Object(map(vec![("x", Value::Int(1))])),
                                )])),
                            ),
                        ])),
                    ),
                    ("beta", Value::Object(map(vec![("port", Value::Int(81))]))),
                ])),
            ),
            ("empty", Value::Object(Map::new())),
        ]);

        let encoded = marshal_map(&document).unwrap();
        let decoded = crate::unmarshal_map(&encoded).unwrap();

        let mut expected = document.clone();
        expected.insert("whole".into(), Value::Int(3));
        assert_eq!(decoded, expected);
    }

    #[test]
    fn body_keys_must_be_identifiers() {
        let document = map(vec![("not valid", Value::Int(1))]);
        let error = marshal_map(&document).unwrap_err();

        assert_eq!(error.breadcrumbs(), vec!["not valid"]);
        assert!(matches!(
            error.root_cause(),
            Error::Conversion(ConversionError::InvalidKey(_))
        ));
    }

    #[test]
    fn non_finite_floats_are_unsupported() {
        let error = marshal_value(&Value::Double(f64::NAN)).unwrap_err();
        assert!(matches!(error, Error::Conversion(ConversionError::Unsupported(_))));
    }

    #[test]
    fn scalars_encode_as_expressions() {
        assert_eq!(marshal_value(&Value::from("x")).unwrap(), r#""x""#);
        assert_eq!(marshal_value(&Value::Double(4.0)).unwrap(), "4");
    }
}
