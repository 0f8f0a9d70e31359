//! field classification
//!
//! One pass over the fields of an object decides how each field is written in a document:
//!
//! | class             | document form                                          |
//! |-------------------|--------------------------------------------------------|
//! | [Class::Label]    | a block label, or an attribute with the label's name   |
//! | [Class::Simple]   | an attribute                                           |
//! | [Class::Block]    | nested blocks                                          |
//! | [Class::Dynamic]  | an attribute or a block holding schema-less content    |
//!
//! Ignored fields are left out. Embedded structs (an empty tag on a struct field) are flattened: their own fields
//! take the place of the embedding field.
//!
//! Decoding classifies by static type, encoding by runtime value:
//! - decoding treats every field named in the [Shape] as a block
//! - encoding skips zero scalars and writes empty collections as `[]` or `{}`
//! - a collection is classified by its first element only, the elements are assumed to be uniform
use crate::object::{Category, Kind, Object, Slot};
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    None,
    Label,
    Block,
    Optional,
    Ignore,
}

/// Parsed field tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// document name; the lowercased field name when the tag has none
    pub name: String,
    pub modifier: Modifier,
    /// the tag did not name the field
    pub untagged: bool,
}

impl Tag {
    pub fn parse(raw: &str, field_name: &str) -> Tag {
        let (name, modifier) = match raw.split_once(',') {
            Some((name, modifier)) => (name.trim(), modifier.trim()),
            None => (raw.trim(), ""),
        };

        let modifier = match (name, modifier) {
            ("-", _) | (_, "-") => Modifier::Ignore,
            (_, "label") => Modifier::Label,
            (_, "block") => Modifier::Block,
            (_, "optional") => Modifier::Optional,
            _ => Modifier::None,
        };

        Tag {
            name: if name.is_empty() {
                field_name.to_lowercase()
            } else {
                name.to_owned()
            },
            modifier,
            untagged: name.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Label,
    Simple,
    Block,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decode,
    Encode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// field indices from the classified object down to this field, more than one for flattened fields
    pub path: Vec<usize>,
    /// Rust field name, the key into a [Shape]
    pub name: &'static str,
    /// document name
    pub tag: String,
    pub class: Class,
    pub kind: Kind,
}

/// Classify the fields of `object`, in field order
pub fn classify(object: &dyn Object, shape: Option<&Shape>, direction: Direction) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    walk(object, &[], shape, direction, &mut fields);
    fields
}

fn walk(
    object: &dyn Object,
    prefix: &[usize],
    shape: Option<&Shape>,
    direction: Direction,
    out: &mut Vec<FieldDescriptor>,
) {
    for (index, field) in object.fields().into_iter().enumerate() {
        let tag = Tag::parse(field.tag, field.name);
        let kind = field.slot.kind();
        let mut path = prefix.to_vec();
        path.push(index);

        let class = match tag.modifier {
            Modifier::Ignore => continue,
            Modifier::Label => Some(Class::Label),
            _ if tag.untagged && kind == Kind::Struct => {
                if let Some(embedded) = field.slot.as_object() {
                    walk(embedded, &path, shape, direction, out);
                }
                continue;
            }
            _ => match direction {
                Direction::Decode => {
                    let shaped = shape.is_some_and(|shape| shape.field(field.name).is_some());
                    Some(decode_class(field.slot, shaped))
                }
                Direction::Encode => encode_class(field.slot),
            },
        };

        if let Some(class) = class {
            out.push(FieldDescriptor {
                path,
                name: field.name,
                tag: tag.name,
                class,
                kind,
            });
        }
    }
}

fn decode_class(slot: &dyn Slot, shaped: bool) -> Class {
    if shaped {
        return Class::Block;
    }

    match slot.kind() {
        Kind::Struct | Kind::Pointer | Kind::Interface => Class::Block,
        Kind::Scalar if slot.element_category() == Category::Dynamic => Class::Dynamic,
        Kind::Scalar => Class::Simple,
        Kind::List | Kind::Map | Kind::Map2 => match slot.element_category() {
            Category::Struct | Category::Pointer | Category::Interface => Class::Block,
            Category::Dynamic => Class::Dynamic,
            Category::Scalar | Category::Collection => Class::Simple,
        },
    }
}

/// `None` for fields that are not written at all
fn encode_class(slot: &dyn Slot) -> Option<Class> {
    match slot.kind() {
        Kind::Scalar if slot.is_zero() => None,
        Kind::Scalar => Some(Class::Simple),
        Kind::Struct | Kind::Pointer | Kind::Interface => Some(Class::Block),
        Kind::List | Kind::Map | Kind::Map2 => match slot.first_category() {
            Some(category) if category.is_block_like() => Some(Class::Block),
            _ => Some(Class::Simple),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shape::ShapeInput;
    use crate::value::Value;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default)]
    struct Meta {
        owner: String,
        level: i32,
    }
    crate::hcl_object!(Meta {
        owner: "owner",
        level: "level",
    });

    #[derive(Debug, Clone, Default)]
    struct Part {
        id: String,
    }
    crate::hcl_object!(Part { id: "id" });

    #[derive(Debug, Clone, Default)]
    struct Machine {
        name: String,
        kind: String,
        port: u16,
        tags: Vec<String>,
        meta: Meta,
        parts: Vec<Part>,
        nested: Vec<Vec<String>>,
        extra: IndexMap<String, Value>,
        anything: Option<Value>,
        plugin: Option<Box<dyn Object>>,
        secret: String,
        common: Meta,
    }
    crate::hcl_object!(Machine {
        name: "name,label",
        kind: "kind,label",
        port: "port,optional",
        tags: "",
        meta: "meta,block",
        parts: "part",
        nested: "nested",
        extra: "extra",
        anything: "anything",
        plugin: "plugin",
        secret: "-",
        common: "",
    });

    fn summary(fields: &[FieldDescriptor]) -> Vec<(&str, Class)> {
        fields.iter().map(|f| (f.tag.as_str(), f.class)).collect()
    }

    #[test]
    fn tags_parse_names_and_modifiers() {
        assert_eq!(
            Tag::parse("name,label", "Name"),
            Tag {
                name: "name".into(),
                modifier: Modifier::Label,
                untagged: false
            }
        );
        assert_eq!(Tag::parse("-", "X").modifier, Modifier::Ignore);
        assert_eq!(Tag::parse("x,-", "X").modifier, Modifier::Ignore);
        assert_eq!(Tag::parse("", "ToyName").name, "toyname");
        assert!(Tag::parse("", "ToyName").untagged);
    }

    #[test]
    fn decode_classifies_by_static_type() {
        let machine = Machine::default();
        let fields = classify(&machine, None, Direction::Decode);

        assert_eq!(
            summary(&fields),
            vec![
                ("name", Class::Label),
                ("kind", Class::Label),
                ("port", Class::Simple),
                ("tags", Class::Simple),
                ("meta", Class::Block),
                ("part", Class::Block),
                ("nested", Class::Simple),
                ("extra", Class::Dynamic),
                ("anything", Class::Dynamic),
                ("plugin", Class::Block),
                ("owner", Class::Simple),
                ("level", Class::Simple),
            ]
        );
        assert_eq!(fields[10].path, vec![11, 0]);
    }

    #[test]
    fn shaped_fields_are_blocks() {
        let shape = Shape::new("Machine", [("tags", ShapeInput::class("Part"))]).unwrap();
        let fields = classify(&Machine::default(), Some(&shape), Direction::Decode);

        let tags = fields.iter().find(|f| f.name == "tags").unwrap();
        assert_eq!(tags.class, Class::Block);
    }

    #[test]
    fn encode_classifies_by_runtime_value() {
        let machine = Machine {
            port: 8080,
            nested: vec![vec!["a".into()]],
            common: Meta {
                owner: "me".into(),
                level: 0,
            },
            ..Default::default()
        };
        let fields = classify(&machine, None, Direction::Encode);

        assert_eq!(
            summary(&fields),
            vec![
                ("name", Class::Label),
                ("kind", Class::Label),
                ("port", Class::Simple),
                ("tags", Class::Simple),
                ("meta", Class::Block),
                ("part", Class::Simple),
                ("nested", Class::Block),
                ("extra", Class::Simple),
                ("plugin", Class::Block),
                ("owner", Class::Simple),
            ]
        );
    }
}
