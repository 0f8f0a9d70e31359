//! shape specification
//!
//! A [Shape] tells the decoder which concrete type to build for a field whose type is not known statically (an
//! interface field, or a collection of them), and may carry nested shapes for the fields of that type.
//!
//! Each field of a shape is one of:
//! - [FieldShape::Single]: one object
//! - [FieldShape::List]: a list of objects; entry `i` is used for block `i` of a list field, the first entry
//!   otherwise
//! - [FieldShape::Map]: objects keyed by one block label
//! - [FieldShape::Map2]: objects keyed by two block labels
//!
//! Shapes are built from [ShapeInput]s:
//!
//! ```
//! # use hclcodec::{Shape, ShapeInput};
//! let shape = Shape::new(
//!     "Garage",
//!     [
//!         ("vehicle", ShapeInput::class("Car")),
//!         ("parked", ShapeInput::map([("north", ShapeInput::class("Car")), ("south", ShapeInput::class("Bike"))])),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(shape.class_name(), "Garage");
//! ```
use crate::object::Key;
use indexmap::IndexMap;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("class name must not be empty")]
    EmptyClassName,

    #[error("field name {} is not valid utf-8", String::from_utf8_lossy(.0))]
    InvalidFieldName(Vec<u8>),

    #[error("{0} shape needs at least one entry")]
    Empty(&'static str),

    #[error("a list or map shape must hold classes, not another list or map")]
    Nested,

    #[error("field {field}")]
    Field {
        field: String,
        #[source]
        source: Box<ShapeError>,
    },

    #[error("entry {index}")]
    Index {
        index: usize,
        #[source]
        source: Box<ShapeError>,
    },

    #[error("entry {key:?}")]
    Key {
        key: String,
        #[source]
        source: Box<ShapeError>,
    },
}

/// Unvalidated description of a field shape
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeInput {
    /// class name without nested field shapes
    Class(String),
    /// class name with nested field shapes
    Spec(String, Vec<(Vec<u8>, ShapeInput)>),
    List(Vec<ShapeInput>),
    Map(Vec<(String, ShapeInput)>),
    /// keyed by (first label, second label), grouped by the first label when built
    Map2(Vec<((String, String), ShapeInput)>),
}

impl ShapeInput {
    pub fn class(name: impl Into<String>) -> Self {
        ShapeInput::Class(name.into())
    }

    pub fn spec<K: Into<Vec<u8>>>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, ShapeInput)>,
    ) -> Self {
        ShapeInput::Spec(
            name.into(),
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )
    }

    pub fn list(entries: impl IntoIterator<Item = ShapeInput>) -> Self {
        ShapeInput::List(entries.into_iter().collect())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, ShapeInput)>) -> Self {
        ShapeInput::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn map2<K0: Into<String>, K1: Into<String>>(
        entries: impl IntoIterator<Item = ((K0, K1), ShapeInput)>,
    ) -> Self {
        ShapeInput::Map2(
            entries
                .into_iter()
                .map(|((k0, k1), v)| ((k0.into(), k1.into()), v))
                .collect(),
        )
    }

    fn into_shape(self) -> Result<Shape, ShapeError> {
        match self {
            ShapeInput::Class(name) => Shape::new(name, Vec::<(Vec<u8>, ShapeInput)>::new()),
            ShapeInput::Spec(name, fields) => Shape::new(name, fields),
            _ => Err(ShapeError::Nested),
        }
    }
}

impl From<&str> for ShapeInput {
    fn from(name: &str) -> Self {
        ShapeInput::class(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    class_name: String,
    fields: IndexMap<String, FieldShape>,
}

impl Shape {
    pub fn new<K: Into<Vec<u8>>>(
        class_name: impl Into<String>,
        fields: impl IntoIterator<Item = (K, ShapeInput)>,
    ) -> Result<Shape, ShapeError> {
        let class_name = class_name.into();
        if class_name.is_empty() {
            return Err(ShapeError::EmptyClassName);
        }

        let mut shapes = IndexMap::new();
        for (key, input) in fields {
            let name = String::from_utf8(key.into())
                .map_err(|e| ShapeError::InvalidFieldName(e.into_bytes()))?;
            let shape = FieldShape::new(input).map_err(|e| ShapeError::Field {
                field: name.clone(),
                source: Box::new(e),
            })?;
            shapes.insert(name, shape);
        }

        Ok(Shape {
            class_name,
            fields: shapes,
        })
    }

    /// Shape naming a class, trusted to be non-empty
    pub(crate) fn bare(class_name: impl Into<String>) -> Shape {
        Shape {
            class_name: class_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn fields(&self) -> &IndexMap<String, FieldShape> {
        &self.fields
    }

    /// Shape of the struct field called `name` (the Rust field name)
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    Single(Shape),
    List(Vec<Shape>),
    Map(IndexMap<String, Shape>),
    Map2(IndexMap<String, IndexMap<String, Shape>>),
}

impl FieldShape {
    pub fn new(input: ShapeInput) -> Result<FieldShape, ShapeError> {
        Ok(match input {
            input @ (ShapeInput::Class(_) | ShapeInput::Spec(..)) => {
                FieldShape::Single(input.into_shape()?)
            }
            ShapeInput::List(entries) => {
                if entries.is_empty() {
                    return Err(ShapeError::Empty("list"));
                }
                FieldShape::List(
                    entries
                        .into_iter()
                        .enumerate()
                        .map(|(index, entry)| {
                            entry.into_shape().map_err(|e| ShapeError::Index {
                                index,
                                source: Box::new(e),
                            })
                        })
                        .collect::<Result<_, _>>()?,
                )
            }
            ShapeInput::Map(entries) => {
                if entries.is_empty() {
                    return Err(ShapeError::Empty("map"));
                }
                let mut map = IndexMap::new();
                for (key, entry) in entries {
                    let shape = entry.into_shape().map_err(|e| ShapeError::Key {
                        key: key.clone(),
                        source: Box::new(e),
                    })?;
                    map.insert(key, shape);
                }
                FieldShape::Map(map)
            }
            ShapeInput::Map2(entries) => {
                if entries.is_empty() {
                    return Err(ShapeError::Empty("two-label map"));
                }
                let mut map: IndexMap<String, IndexMap<String, Shape>> = IndexMap::new();
                for ((first, second), entry) in entries {
                    let shape = entry.into_shape().map_err(|e| ShapeError::Key {
                        key: format!("{first}/{second}"),
                        source: Box::new(e),
                    })?;
                    map.entry(first).or_default().insert(second, shape);
                }
                FieldShape::Map2(map)
            }
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldShape::Single(_) => "single",
            FieldShape::List(_) => "list",
            FieldShape::Map(_) => "map",
            FieldShape::Map2(_) => "two-label map",
        }
    }

    /// Shape to use for the block at `key`
    ///
    /// - list: entry `i` for [Key::Index] when `per_index` is set and `i` is in range, the first entry otherwise
    /// - map: the entry for the label, the entry with the smallest key when the label is not listed
    /// - two-label map: the same rule, applied to the first and then the second label
    pub fn select(&self, key: &Key, per_index: bool) -> Option<&Shape> {
        match self {
            FieldShape::Single(shape) => Some(shape),
            FieldShape::List(entries) => match key {
                Key::Index(index) if per_index && *index < entries.len() => entries.get(*index),
                _ => entries.first(),
            },
            FieldShape::Map(entries) => {
                let label = match key {
                    Key::Label(label) | Key::Labels(label, _) => label.as_str(),
                    Key::Index(_) => "",
                };
                entries.get(label).or_else(|| smallest(entries))
            }
            FieldShape::Map2(groups) => {
                let (first, second) = match key {
                    Key::Labels(first, second) => (first.as_str(), second.as_str()),
                    Key::Label(first) => (first.as_str(), ""),
                    Key::Index(_) => ("", ""),
                };
                let group = groups.get(first).or_else(|| smallest(groups))?;
                group.get(second).or_else(|| smallest(group))
            }
        }
    }
}

fn smallest<V>(map: &IndexMap<String, V>) -> Option<&V> {
    map.iter()
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, value)| value)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_class_name_is_rejected() {
        assert_eq!(
            Shape::new("", Vec::<(&str, ShapeInput)>::new()),
            Err(ShapeError::EmptyClassName)
        );
        assert_eq!(
            FieldShape::new(ShapeInput::list([ShapeInput::class("")])),
            Err(ShapeError::Index {
                index: 0,
                source: Box::new(ShapeError::EmptyClassName)
            })
        );
    }

    #[test]
    fn invalid_field_name_is_an_error_not_a_panic() {
        let result = Shape::new("Toy", [(vec![0xffu8, 0xfe], ShapeInput::class("Part"))]);
        assert_eq!(result, Err(ShapeError::InvalidFieldName(vec![0xff, 0xfe])));
    }

    #[test]
    fn nested_collections_are_rejected() {
        let result = Shape::new(
            "Toy",
            [("parts", ShapeInput::list([ShapeInput::list([ShapeInput::class("Part")])]))],
        );
        assert!(matches!(result, Err(ShapeError::Field { .. })));
    }

    #[test]
    fn two_label_input_is_grouped_by_first_key() {
        let shape = FieldShape::new(ShapeInput::map2([
            (("us", "east"), ShapeInput::class("A")),
            (("eu", "west"), ShapeInput::class("B")),
            (("us", "west"), ShapeInput::class("C")),
        ]))
        .unwrap();

        let FieldShape::Map2(groups) = &shape else {
            panic!("expected two-label map, got {shape:?}");
        };
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["us", "eu"]);
        assert_eq!(groups["us"].keys().collect::<Vec<_>>(), vec!["east", "west"]);
    }

    #[test]
    fn list_selection_is_per_index_only_for_lists() {
        let shape = FieldShape::new(ShapeInput::list([ShapeInput::class("A"), ShapeInput::class("B")])).unwrap();
        let class = |key, per_index| shape.select(&key, per_index).map(Shape::class_name);

        assert_eq!(class(Key::Index(1), true), Some("B"));
        assert_eq!(class(Key::Index(5), true), Some("A"));
        assert_eq!(class(Key::Index(1), false), Some("A"));
    }

    #[test]
    fn unknown_labels_fall_back_to_smallest_key() {
        let shape = FieldShape::new(ShapeInput::map([
            ("zeta", ShapeInput::class("Z")),
            ("alpha", ShapeInput::class("A")),
        ]))
        .unwrap();
        let class = |label: &str| shape.select(&Key::Label(label.into()), false).map(Shape::class_name);

        assert_eq!(class("zeta"), Some("Z"));
        assert_eq!(class("other"), Some("A"));

        let shape = FieldShape::new(ShapeInput::map2([
            (("b", "y"), ShapeInput::class("BY")),
            (("a", "z"), ShapeInput::class("AZ")),
            (("a", "x"), ShapeInput::class("AX")),
        ]))
        .unwrap();
        let class = |first: &str, second: &str| {
            shape
                .select(&Key::Labels(first.into(), second.into()), false)
                .map(Shape::class_name)
        };

        assert_eq!(class("b", "y"), Some("BY"));
        assert_eq!(class("b", "q"), Some("BY"));
        assert_eq!(class("c", "z"), Some("AZ"));
        assert_eq!(class("c", "q"), Some("AX"));
    }
}
