//! encoding objects as HCL
//!
//! Objects are written one nesting level at a time, straight into indented text:
//! - label fields become the labels of the enclosing block (a label equal to one the parent already wrote is
//!   skipped)
//! - simple and dynamic fields become attributes
//! - struct, pointer and interface fields become nested blocks, left out entirely when they encode to nothing
//! - lists of objects become one block per element, maps of objects one labeled block per key
//! - any other collection becomes a single attribute (`tag = []` and `tag = {}` when empty)
//!
//! The top level has no braces, every deeper level is wrapped in `{ .. }` and indented by two spaces.
mod generic;

pub use generic::{marshal_map, marshal_value};

use crate::classify::{classify, Class, Direction, FieldDescriptor};
use crate::conversion::{native_to_value, ConversionError};
use crate::error::{Error, Result};
use crate::object::{slot_at, Category, Kind, Object, Slot};
use crate::value::Value;
use hcl::{Attribute, Body, Expression, Identifier};

const INDENT: &str = "  ";

fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

/// Encode `object` as an HCL document
#[tracing::instrument(level = "debug", skip_all, fields(class = object.class_name()))]
pub fn marshal(object: &dyn Object) -> Result<String> {
    Ok(encode_object(object, 0, &[])?.body)
}

/// One object, ready to be wrapped in a block
struct Encoded {
    labels: Vec<String>,
    body: String,
}

fn encode_object(object: &dyn Object, level: usize, outer_labels: &[String]) -> Result<Encoded> {
    let fields = classify(object, None, Direction::Encode);

    let mut labels = Vec::new();
    for field in fields.iter().filter(|f| f.class == Class::Label) {
        let label = match slot(object, field)?.to_tagged() {
            Ok(hcl::Value::String(label)) => label,
            Ok(hcl::Value::Null) => continue,
            Ok(other) => {
                return Err(Error::mismatch(format!(
                    "label must be a string, got {}",
                    crate::conversion::tagged_kind(&other)
                ))
                .in_field(&field.tag))
            }
            Err(e) => return Err(Error::from(e).in_field(&field.tag)),
        };
        if label.is_empty() || outer_labels.contains(&label) {
            continue;
        }
        labels.push(label);
    }

    if let Some(marshaler) = object.as_marshaler() {
        tracing::trace!(class = object.class_name(), "custom marshaler");
        let text = marshaler.marshal_hcl()?;
        return Ok(Encoded {
            labels,
            body: reindent(&text, level),
        });
    }

    let mut body = String::new();
    for field in &fields {
        let slot = slot(object, field)?;
        match field.class {
            Class::Label => {}
            Class::Simple | Class::Dynamic => {
                write_attribute(&mut body, &field.tag, slot, level).map_err(|e| e.in_field(&field.tag))?
            }
            Class::Block => write_blocks(&mut body, field, slot, level)?,
        }
    }

    Ok(Encoded { labels, body })
}

fn slot<'a>(object: &'a dyn Object, field: &FieldDescriptor) -> Result<&'a dyn Slot> {
    slot_at(object, &field.path).ok_or_else(|| Error::mismatch(format!("field {} is not reachable", field.name)))
}

fn write_attribute(out: &mut String, tag: &str, slot: &dyn Slot, level: usize) -> Result<()> {
    let value = slot.to_tagged()?;
    if matches!(value, hcl::Value::Null) {
        return Ok(());
    }
    out.push_str(&attribute_line(tag, value, level)?);
    Ok(())
}

fn write_blocks(out: &mut String, field: &FieldDescriptor, slot: &dyn Slot, level: usize) -> Result<()> {
    let tag = field.tag.as_str();
    match field.kind {
        Kind::Struct | Kind::Pointer | Kind::Interface => {
            for (_, object) in slot.objects() {
                write_block(out, tag, vec![], object, level).map_err(|e| e.in_field(tag))?;
            }
        }
        Kind::List | Kind::Map | Kind::Map2 if slot.first_category().is_some_and(Category::needs_loop) => {
            for (key, object) in slot.objects() {
                write_block(out, tag, key.labels(), object, level).map_err(|e| e.in_field(format!("{tag}{key}")))?;
            }
        }
        Kind::Map if slot.element_category() == Category::Dynamic => {
            if let Some(Value::Object(map)) = slot.to_native() {
                let mut body = String::new();
                generic::write_body(&mut body, &map, level + 1).map_err(|e| e.in_field(tag))?;
                write_wrapped(out, tag, &[], &body, level)?;
            }
        }
        _ => write_attribute(out, tag, slot, level).map_err(|e| e.in_field(tag))?,
    }
    Ok(())
}

/// Write `object` as a block; nothing when it has neither labels nor content
fn write_block(out: &mut String, tag: &str, mut labels: Vec<String>, object: &dyn Object, level: usize) -> Result<()> {
    let encoded = encode_object(object, level + 1, &labels)?;
    labels.extend(encoded.labels);

    if labels.is_empty() && encoded.body.trim().is_empty() {
        tracing::trace!(tag, "blank block suppressed");
        return Ok(());
    }
    write_wrapped(out, tag, &labels, &encoded.body, level)
}

fn write_wrapped(out: &mut String, tag: &str, labels: &[String], body: &str, level: usize) -> Result<()> {
    let prefix = indent(level);
    out.push_str(&prefix);
    out.push_str(identifier(tag)?.as_str());
    for label in labels {
        out.push(' ');
        out.push_str(&quote(label));
    }
    out.push_str(" {\n");
    out.push_str(body);
    out.push_str(&prefix);
    out.push_str("}\n");
    Ok(())
}

/// `key = value` at `level`, formatted by hcl-rs
pub(crate) fn attribute_line(key: &str, value: hcl::Value, level: usize) -> Result<String> {
    let body = Body::builder()
        .add_attribute(Attribute::new(identifier(key)?, Expression::from(integral_floats(value))))
        .build();
    let text = hcl::format::to_string(&body).map_err(Error::Format)?;
    Ok(reindent(&text, level))
}

/// Tagged value for schema-less content
pub(crate) fn tagged(value: &Value) -> Result<hcl::Value> {
    Ok(integral_floats(native_to_value(value)?))
}

/// Floats without a fractional part are written as integers
fn integral_floats(value: hcl::Value) -> hcl::Value {
    match value {
        hcl::Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 9.0e15 => {
                hcl::Value::Number(hcl::Number::from(float as i64))
            }
            _ => hcl::Value::Number(number),
        },
        hcl::Value::Array(items) => hcl::Value::Array(items.into_iter().map(integral_floats).collect()),
        hcl::Value::Object(object) => hcl::Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (key, integral_floats(value)))
                .collect(),
        ),
        other => other,
    }
}

fn identifier(key: &str) -> Result<Identifier, ConversionError> {
    let mut chars = key.chars();
    let valid = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(Identifier::unchecked(key))
    } else {
        Err(ConversionError::InvalidKey(key.to_owned()))
    }
}

/// Quoted block label
fn quote(label: &str) -> String {
    let mut quoted = String::with_capacity(label.len() + 2);
    quoted.push('"');
    let mut chars = label.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                quoted.push(c);
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Prefix every non-empty line of `text` with the indentation of `level`
fn reindent(text: &str, level: usize) -> String {
    let prefix = indent(level);
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !line.trim().is_empty() {
            out.push_str(&prefix);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::object::Marshaler;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Toy {
        toy_name: String,
        price: f64,
    }
    crate::hcl_object!(Toy {
        toy_name: "toy_name",
        price: "price",
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Pet {
        name: String,
        legs: u8,
    }
    crate::hcl_object!(Pet {
        name: "name,label",
        legs: "legs",
    });

    #[derive(Debug, Clone, Default)]
    struct Child {
        age: u8,
        nickname: String,
        hobbies: Vec<String>,
        brand: IndexMap<String, Box<Toy>>,
        pets: Vec<Pet>,
        favourite: Option<Box<Toy>>,
    }
    crate::hcl_object!(Child {
        age: "age",
        nickname: "nickname",
        hobbies: "hobbies",
        brand: "brand",
        pets: "pet",
        favourite: "favourite",
    });

    #[test]
    fn scalars_and_blocks() {
        let child = Child {
            age: 5,
            brand: IndexMap::from([(
                "abc1".to_owned(),
                Box::new(Toy {
                    toy_name: "x".into(),
                    price: 1.5,
                }),
            )]),
            pets: vec![
                Pet {
                    name: "rex".into(),
                    legs: 4,
                },
                Pet::default(),
            ],
            ..Default::default()
        };

        insta::assert_snapshot!(marshal(&child).unwrap(), @r###"
        age = 5
        hobbies = []
        brand "abc1" {
          toy_name = "x"
          price = 1.5
        }
        pet "rex" {
          legs = 4
        }
        "###);
    }

    #[test]
    fn labels_equal_to_the_key_are_not_repeated() {
        #[derive(Debug, Clone, Default)]
        struct Owner {
            pets: IndexMap<String, Pet>,
        }
        crate::hcl_object!(Owner { pets: "pet" });

        let owner = Owner {
            pets: IndexMap::from([(
                "rex".to_owned(),
                Pet {
                    name: "rex".into(),
                    legs: 3,
                },
            )]),
        };

        insta::assert_snapshot!(marshal(&owner).unwrap(), @r###"
        pet "rex" {
          legs = 3
        }
        "###);
    }

    #[test]
    fn integral_floats_print_as_integers() {
        let toy = Toy {
            toy_name: "ball".into(),
            price: 2.0,
        };
        assert_eq!(marshal(&toy).unwrap(), "toy_name = \"ball\"\nprice = 2\n");
    }

    #[test]
    fn custom_marshaler_output_is_indented() {
        #[derive(Debug, Clone, Default)]
        struct Opaque {
            raw: String,
        }
        crate::hcl_object!(Opaque with custom { raw: "-" });

        impl Marshaler for Opaque {
            fn marshal_hcl(&self) -> Result<String> {
                Ok(format!("raw = \"{}\"\n", self.raw))
            }
        }

        impl crate::object::Unmarshaler for Opaque {
            fn unmarshal_hcl(&mut self, _input: &str, _labels: &[&str]) -> Result<()> {
                Ok(())
            }
        }

        #[derive(Debug, Clone, Default)]
        struct Holder {
            inner: Opaque,
        }
        crate::hcl_object!(Holder { inner: "inner" });

        let holder = Holder {
            inner: Opaque { raw: "abc".into() },
        };
        assert_eq!(marshal(&holder).unwrap(), "inner {\n  raw = \"abc\"\n}\n");
    }

    #[test]
    fn labels_are_quoted() {
        assert_eq!(quote("a\"b"), r#""a\"b""#);
        assert_eq!(quote("${x}"), r#""$${x}""#);
    }

    #[test]
    fn invalid_tags_are_rejected() {
        assert!(identifier("9lives").is_err());
        assert!(identifier("with space").is_err());
        assert!(identifier("kebab-case_ok").is_ok());
    }
}
