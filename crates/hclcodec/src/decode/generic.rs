//! schema-less decoding into [Value]s
//!
//! | document                                 | result                              |
//! |------------------------------------------|-------------------------------------|
//! | `a = 1`                                  | `a: 1`                              |
//! | one `b { .. }`                           | `b: { .. }`                         |
//! | repeated `b { .. }`                      | `b: [{ .. }, { .. }]`               |
//! | `c "x" { .. }`                           | `c: { x: { .. } }`                  |
//! | `d "x" "y" { .. }`                       | `d: { x: { y: { .. } } }`           |
use super::Session;
use crate::conversion::value_to_native;
use crate::error::{Error, Result};
use crate::tree::Tree;
use crate::value::{Map, Value};
use hcl::{Block, Body};
use indexmap::IndexMap;
use std::sync::Arc;

/// Blocks of one type, grouped by their number of labels
#[derive(Default)]
struct Group<'b> {
    unlabeled: Vec<&'b Body>,
    labeled: IndexMap<String, &'b Body>,
    labeled2: IndexMap<String, IndexMap<String, &'b Body>>,
}

#[tracing::instrument(level = "trace", skip_all, fields(node = node.name()))]
pub(super) fn decode_body(session: &Session, node: &Arc<Tree>, body: &Body) -> Result<Map> {
    let mut object = Map::new();

    for attr in body.attributes() {
        let name = attr.key.as_str();
        let value = session.evaluate(node, name, &attr.expr)?;
        node.add_item(name, value.clone());
        if let Some(native) = value_to_native(&value) {
            object.insert(name.to_owned(), native);
        }
    }

    let mut groups: IndexMap<&str, Group> = IndexMap::new();
    for block in body.blocks() {
        let group = groups.entry(block.identifier.as_str()).or_default();
        match block.labels.as_slice() {
            [] => group.unlabeled.push(&block.body),
            [first] => {
                group.labeled.insert(first.as_str().to_owned(), &block.body);
            }
            [first, second] => {
                group
                    .labeled2
                    .entry(first.as_str().to_owned())
                    .or_default()
                    .insert(second.as_str().to_owned(), &block.body);
            }
            labels => return Err(too_many_labels(block, labels.len())),
        }
    }

    for (kind, group) in groups {
        let kind_node = node.add_node(kind);

        match group.unlabeled.as_slice() {
            [] => {}
            [single] => {
                let decoded = decode_body(session, &kind_node, single)?;
                object.insert(kind.to_owned(), Value::Object(decoded));
            }
            bodies => {
                let mut items = Vec::with_capacity(bodies.len());
                for (index, body) in bodies.iter().enumerate() {
                    let index_node = kind_node.add_node(&index.to_string());
                    items.push(Value::Object(decode_body(session, &index_node, body)?));
                }
                object.insert(kind.to_owned(), Value::Array(items));
            }
        }

        if !group.labeled.is_empty() {
            let mut entries = Map::new();
            for (label, body) in group.labeled {
                let decoded = decode_body(session, &kind_node.add_node(&label), body)?;
                entries.insert(label, Value::Object(decoded));
            }
            object.insert(kind.to_owned(), Value::Object(entries));
        }

        if !group.labeled2.is_empty() {
            let mut outer = Map::new();
            for (first, bodies) in group.labeled2 {
                let first_node = kind_node.add_node(&first);
                let mut inner = Map::new();
                for (second, body) in bodies {
                    let decoded = decode_body(session, &first_node.add_node(&second), body)?;
                    inner.insert(second, Value::Object(decoded));
                }
                outer.insert(first, Value::Object(inner));
            }
            object.insert(kind.to_owned(), Value::Object(outer));
        }
    }

    Ok(object)
}

fn too_many_labels(block: &Block, count: usize) -> Error {
    Error::structural(format!(
        "unsupported number of labels ({count}) for block type {:?}: expected 0, 1, or 2",
        block.identifier.as_str()
    ))
}

#[cfg(test)]
mod test {
    use crate::value::{Map, Value};
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn object(entries: Vec<(&str, Value)>) -> Value {
        Value::Object(entries.into_iter().map(|(k, v)| (k.to_owned(), v)).collect::<Map>())
    }

    #[test]
    fn blocks_decode_by_label_count() {
        let decoded = crate::unmarshal_map(
            r#"
            a = 1
            single {
              x = "one"
            }
            many {
              x = 1
            }
            many {
              x = 2
            }
            named "n" {
              x = true
            }
            pair "p" "q" {
              x = 1.5
            }
            "#,
        )
        .unwrap();

        let expected = object(vec![
            ("a", Value::Int(1)),
            ("single", object(vec![("x", "one".into())])),
            (
                "many",
                Value::Array(vec![
                    object(vec![("x", Value::Int(1))]),
                    object(vec![("x", Value::Int(2))]),
                ]),
            ),
            ("named", object(vec![("n", object(vec![("x", Value::Boolean(true))]))])),
            (
                "pair",
                object(vec![("p", object(vec![("q", object(vec![("x", Value::Float(1.5))]))]))]),
            ),
        ]);
        assert_eq!(Value::Object(decoded), expected);
    }

    #[test]
    fn three_labels_are_rejected() {
        let error = crate::unmarshal_map(r#"x "a" "b" "c" {}"#).unwrap_err();

        assert!(matches!(error, Error::Structural(_)));
        assert_eq!(
            error.to_string(),
            r#"unsupported number of labels (3) for block type "x": expected 0, 1, or 2"#
        );
    }

    #[test]
    fn nulls_are_dropped() {
        let decoded = crate::unmarshal_map("a = null\nb = null()\nc = [1, null]").unwrap();

        assert_eq!(
            Value::Object(decoded),
            object(vec![("c", Value::Array(vec![Value::Int(1)]))])
        );
    }

    #[test]
    fn attributes_see_earlier_attributes_and_blocks_see_the_root() {
        let decoded = crate::unmarshal_map(
            r#"
            base = 10
            next = base + 1
            child {
              value = var.base * 2
            }
            "#,
        )
        .unwrap();

        assert_eq!(decoded["next"], Value::Int(11));
        assert_eq!(decoded["child"], object(vec![("value", Value::Int(20))]));
    }
}
