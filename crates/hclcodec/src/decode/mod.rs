//! decoding HCL into objects
//!
//! Decoding a body into an object runs these steps:
//! 1. evaluate every attribute and store the result in the scope tree
//! 2. register every block (type name and labels) as a path in the scope tree
//! 3. classify the fields of a scratch copy of the target
//! 4. route every attribute and block to the field with the same name
//! 5. fill label fields
//! 6. fill simple fields
//! 7. fill dynamic fields with schema-less content
//! 8. fill block fields, materializing the types named by the [Shape]
//! 9. commit the scratch copy to the target
//!
//! Any error aborts the whole call and leaves the target untouched.
mod generic;

use crate::classify::{classify, Class, Direction, FieldDescriptor};
use crate::conversion::{tagged_kind, value_to_native};
use crate::error::{Error, Result};
use crate::eval;
use crate::object::{slot_at, slot_at_mut, Key, Kind, Object};
use crate::registry::Registry;
use crate::shape::{FieldShape, Shape};
use crate::tree::Tree;
use crate::value::{Map, Value};
use hcl::eval::FuncDef;
use hcl::{Block, Body, Expression};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::sync::Arc;

/// Name of the attribute wrapping a list literal for [Decoder::decode_slice]
const SLICE_ATTRIBUTE: &str = "_";

/// Decoding configuration: shape, type registry and user functions
#[derive(Default, Clone)]
pub struct Decoder {
    shape: Option<Shape>,
    registry: Registry,
    functions: IndexMap<String, FuncDef>,
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("shape", &self.shape)
            .field("registry", &self.registry)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Make `func` callable as `name(..)` in expressions
    pub fn with_function(mut self, name: impl Into<String>, func: FuncDef) -> Self {
        self.functions.insert(name.into(), func);
        self
    }

    /// Decode `input` into `target`
    ///
    /// `labels` are the labels of the block `input` was taken from. They fill label fields that are still empty.
    #[tracing::instrument(level = "debug", skip_all, fields(class = target.class_name()))]
    pub fn decode(&self, input: &str, target: &mut dyn Object, labels: &[&str]) -> Result<()> {
        if let Some(unmarshaler) = target.as_unmarshaler() {
            tracing::trace!("custom unmarshaler");
            return unmarshaler.unmarshal_hcl(input, labels);
        }

        let body = parse(input)?;
        let labels: Vec<String> = labels.iter().map(|label| label.to_string()).collect();
        let session = Session::new(self);
        session.decode_object(&session.root, &body, target, self.shape.as_ref(), &labels)
    }

    /// Decode `input` without a target type
    pub fn decode_map(&self, input: &str) -> Result<Map> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Map::new());
        }

        let session = Session::new(self);
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            return match session.decode_literal(trimmed)? {
                Some(Value::Object(object)) => Ok(object),
                other => Err(Error::mismatch(format!(
                    "expected an object literal, got {}",
                    other.as_ref().map_or("null", Value::kind)
                ))),
            };
        }

        let body = parse(input)?;
        generic::decode_body(&session, &session.root, &body)
    }

    /// Decode a list literal such as `[1, "two", { three = 3 }]`
    pub fn decode_slice(&self, input: &str) -> Result<Vec<Value>> {
        let session = Session::new(self);
        match session.decode_literal(input)? {
            Some(Value::Array(items)) => Ok(items),
            other => Err(Error::mismatch(format!(
                "expected a list literal, got {}",
                other.as_ref().map_or("null", Value::kind)
            ))),
        }
    }
}

fn parse(input: &str) -> Result<Body> {
    let mut body: Body = hcl::parse(input)?;
    eval::rewrite_null_calls(&mut body);
    Ok(body)
}

/// Where the content of a dynamic field comes from
enum Dynamic<'b> {
    Attribute(hcl::Value),
    Block(&'b Block),
}

/// Source of one object of a block field
enum Piece<'b> {
    Block(&'b Block),
    /// object value of an attribute, turned into a body
    Attribute(Body),
}

impl Piece<'_> {
    fn body(&self) -> &Body {
        match self {
            Piece::Block(block) => &block.body,
            Piece::Attribute(body) => body,
        }
    }

    fn labels(&self) -> Vec<String> {
        match self {
            Piece::Block(block) => block.labels.iter().map(|l| l.as_str().to_owned()).collect(),
            Piece::Attribute(_) => vec![],
        }
    }
}

/// State of one decode call
pub(crate) struct Session<'d> {
    decoder: &'d Decoder,
    root: Arc<Tree>,
}

impl<'d> Session<'d> {
    fn new(decoder: &'d Decoder) -> Self {
        Session {
            decoder,
            root: Tree::root(),
        }
    }

    fn evaluate(&self, node: &Tree, name: &str, expr: &Expression) -> Result<hcl::Value> {
        eval::evaluate(expr, &self.root, node, &self.decoder.functions).map_err(|source| Error::Evaluation {
            name: name.to_owned(),
            source,
        })
    }

    /// Evaluate a single expression given as text
    fn decode_literal(&self, input: &str) -> Result<Option<Value>> {
        let body = parse(&format!("{SLICE_ATTRIBUTE} = {input}"))?;
        let expr = body
            .attributes()
            .next()
            .map(|attr| &attr.expr)
            .ok_or_else(|| Error::structural("expected a single expression"))?;
        let value = self.evaluate(&self.root, SLICE_ATTRIBUTE, expr)?;
        Ok(value_to_native(&value))
    }

    #[tracing::instrument(level = "trace", skip_all, fields(node = node.name(), class = target.class_name()))]
    fn decode_object(
        &self,
        node: &Arc<Tree>,
        body: &Body,
        target: &mut dyn Object,
        shape: Option<&Shape>,
        labels: &[String],
    ) -> Result<()> {
        // evaluate attributes
        let mut values = IndexMap::new();
        for attr in body.attributes() {
            let name = attr.key.as_str();
            let value = self.evaluate(node, name, &attr.expr)?;
            node.add_item(name, value.clone());
            values.insert(name.to_owned(), value);
        }

        // register blocks
        for block in body.blocks() {
            let path: Vec<&str> = std::iter::once(block.identifier.as_str())
                .chain(block.labels.iter().map(|label| label.as_str()))
                .collect();
            node.add_nodes(&path);
        }

        let mut scratch = target.clone_object();
        let fields = classify(scratch.as_ref(), shape, Direction::Decode);
        let by_tag: IndexMap<&str, &FieldDescriptor> = fields.iter().map(|f| (f.tag.as_str(), f)).collect();

        // route attributes and blocks to fields
        let mut label_values: IndexMap<&str, String> = IndexMap::new();
        let mut simple: IndexMap<&str, hcl::Value> = IndexMap::new();
        let mut dynamic: IndexMap<&str, Dynamic> = IndexMap::new();
        let mut pieces: IndexMap<&str, Vec<Piece>> = IndexMap::new();

        for (name, value) in &values {
            let Some(field) = by_tag.get(name.as_str()) else {
                tracing::trace!(name, "attribute has no matching field");
                continue;
            };
            let tag = field.tag.as_str();
            if matches!(value, hcl::Value::Null) {
                tracing::trace!(name, "null attribute");
                continue;
            }

            match field.class {
                Class::Label => match value {
                    hcl::Value::String(label) => {
                        label_values.insert(tag, label.clone());
                    }
                    other => {
                        return Err(Error::mismatch(format!(
                            "label must be a string, got {}",
                            tagged_kind(other)
                        ))
                        .in_field(tag))
                    }
                },
                Class::Simple => {
                    simple.insert(tag, value.clone());
                }
                Class::Dynamic => {
                    dynamic.insert(tag, Dynamic::Attribute(value.clone()));
                }
                Class::Block => {
                    let bodies = attribute_bodies(value).map_err(|e| e.in_field(tag))?;
                    node.add_node(tag);
                    pieces
                        .entry(tag)
                        .or_default()
                        .extend(bodies.into_iter().map(Piece::Attribute));
                }
            }
        }

        for block in body.blocks() {
            let name = block.identifier.as_str();
            match by_tag.get(name).map(|field| field.class) {
                Some(Class::Dynamic) => {
                    dynamic.entry(name).or_insert(Dynamic::Block(block));
                }
                Some(Class::Block) => pieces.entry(name).or_default().push(Piece::Block(block)),
                _ => tracing::trace!(name, "block has no matching field"),
            }
        }

        // labels
        let label_fields: Vec<&FieldDescriptor> = fields.iter().filter(|f| f.class == Class::Label).collect();
        for field in &label_fields {
            if let Some(label) = label_values.get(field.tag.as_str()) {
                assign(scratch.as_mut(), field, &hcl::Value::String(label.clone()))?;
            }
        }
        if labels.len() <= label_fields.len() {
            for (field, label) in label_fields.iter().zip(labels) {
                let empty = slot_at(scratch.as_ref(), &field.path).map_or(false, |slot| slot.is_zero());
                if empty {
                    assign(scratch.as_mut(), field, &hcl::Value::String(label.clone()))?;
                }
            }
        }

        // simple fields
        for field in fields.iter().filter(|f| f.class == Class::Simple) {
            if let Some(value) = simple.get(field.tag.as_str()) {
                assign(scratch.as_mut(), field, value)?;
            }
        }

        // dynamic fields
        for field in fields.iter().filter(|f| f.class == Class::Dynamic) {
            let tag = field.tag.as_str();
            let content = match dynamic.get(tag) {
                None => continue,
                Some(Dynamic::Attribute(value)) => match value_to_native(value) {
                    Some(native) => native,
                    None => continue,
                },
                Some(Dynamic::Block(block)) => {
                    let block_node = node.add_node(tag);
                    Value::Object(generic::decode_body(self, &block_node, &block.body).map_err(|e| e.in_field(tag))?)
                }
            };
            slot_mut(scratch.as_mut(), field)?
                .assign_native(content)
                .map_err(|e| e.in_field(tag))?;
        }

        // block fields
        for field in fields.iter().filter(|f| f.class == Class::Block) {
            let Some(field_pieces) = pieces.get(field.tag.as_str()).filter(|p| !p.is_empty()) else {
                continue;
            };
            let declared = shape.and_then(|shape| shape.field(field.name));
            let entries = self.decode_blocks(node, scratch.as_ref(), field, declared, field_pieces)?;
            slot_mut(scratch.as_mut(), field)?
                .install(entries)
                .map_err(|e| e.in_field(&field.tag))?;
        }

        target.assign(scratch)
    }

    /// Decode the pieces of one block field into keyed objects
    fn decode_blocks(
        &self,
        node: &Arc<Tree>,
        scratch: &dyn Object,
        field: &FieldDescriptor,
        declared: Option<&FieldShape>,
        pieces: &[Piece],
    ) -> Result<Vec<(Key, Box<dyn Object>)>> {
        let tag = field.tag.as_str();
        let slot = slot_at(scratch, &field.path).ok_or_else(|| missing_field(field))?;
        let prototype = slot.prototype();

        let field_shape = match declared {
            Some(declared) => Cow::Borrowed(declared),
            None => {
                let class = prototype.as_ref().map(|p| p.class_name()).ok_or_else(|| {
                    Error::mismatch(format!("{} field needs a shape to pick its type", field.kind)).in_field(tag)
                })?;
                tracing::trace!(tag, class, "derived shape");
                Cow::Owned(derived_shape(field.kind, class))
            }
        };

        let allowed: &[Kind] = match field_shape.as_ref() {
            FieldShape::Single(_) => &[Kind::Struct, Kind::Pointer, Kind::Interface],
            FieldShape::List(_) => &[Kind::List, Kind::Map],
            FieldShape::Map(_) => &[Kind::Map],
            FieldShape::Map2(_) => &[Kind::Map2],
        };
        if !allowed.contains(&field.kind) {
            return Err(Error::mismatch(format!(
                "{} shape does not fit a {} field",
                field_shape.kind_name(),
                field.kind
            ))
            .in_field(tag));
        }

        let pieces = match field_shape.as_ref() {
            FieldShape::Single(_) => &pieces[..1],
            _ => pieces,
        };

        let mut entries = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.iter().enumerate() {
            let labels = piece.labels();
            let (max_labels, key) = match (field_shape.as_ref(), field.kind) {
                (FieldShape::Single(_), _) => (usize::MAX, Key::Index(0)),
                (FieldShape::List(_), Kind::List) => (usize::MAX, Key::Index(index)),
                (FieldShape::List(_) | FieldShape::Map(_), _) => (1, Key::Label(label_at(&labels, 0))),
                (FieldShape::Map2(_), _) => (2, Key::Labels(label_at(&labels, 0), label_at(&labels, 1))),
            };
            let breadcrumb = match &key {
                Key::Index(_) if matches!(field_shape.as_ref(), FieldShape::Single(_)) => tag.to_owned(),
                key => format!("{tag}{key}"),
            };
            if labels.len() > max_labels {
                return Err(Error::structural(format!(
                    "{} shape supports at most {max_labels} label(s), got {}",
                    field_shape.kind_name(),
                    labels.len()
                ))
                .in_field(breadcrumb));
            }

            let per_index = field.kind == Kind::List;
            let selected = field_shape
                .select(&key, per_index)
                .ok_or_else(|| Error::mismatch("shape has no entries").in_field(&breadcrumb))?;
            let mut object = self
                .materialize(selected, prototype.as_deref())
                .map_err(|e| e.in_field(&breadcrumb))?;

            let subnode = match piece {
                Piece::Block(block) => {
                    let mut path = vec![block.identifier.as_str().to_owned()];
                    path.extend(labels.iter().cloned());
                    node.add_nodes(&path)
                }
                Piece::Attribute(_) => node.add_node(tag),
            };

            let result = match object.as_unmarshaler() {
                Some(unmarshaler) => {
                    let text = hcl::format::to_string(piece.body()).map_err(Error::Format)?;
                    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                    unmarshaler.unmarshal_hcl(&text, &labels)
                }
                None => self.decode_object(&subnode, piece.body(), object.as_mut(), Some(selected), &labels),
            };
            result.map_err(|e| e.in_field(&breadcrumb))?;

            let key = complete_key(key, object.as_ref()).map_err(|e| e.in_field(&breadcrumb))?;
            entries.push((key, object));
        }

        Ok(entries)
    }

    /// Fresh zero value of the class named by `shape`
    fn materialize(&self, shape: &Shape, prototype: Option<&dyn Object>) -> Result<Box<dyn Object>> {
        let class = shape.class_name();
        if let Some(object) = self.decoder.registry.instantiate(class) {
            return Ok(object);
        }
        match prototype {
            Some(prototype) if prototype.class_name() == class || prototype.type_path() == class => {
                Ok(prototype.new_zero())
            }
            _ => Err(Error::mismatch(format!("struct type {class:?} not found in registry"))),
        }
    }
}

/// Shape for a block field without one, built from the field's static element type
fn derived_shape(kind: Kind, class: &str) -> FieldShape {
    let shape = Shape::bare(class);
    match kind {
        Kind::List => FieldShape::List(vec![shape]),
        Kind::Map => FieldShape::Map(IndexMap::from([(String::new(), shape)])),
        Kind::Map2 => FieldShape::Map2(IndexMap::from([(
            String::new(),
            IndexMap::from([(String::new(), shape)]),
        )])),
        _ => FieldShape::Single(shape),
    }
}

/// Bodies carried by an attribute: one per object
fn attribute_bodies(value: &hcl::Value) -> Result<Vec<Body>> {
    match value {
        hcl::Value::Object(object) => Ok(vec![object_body(object)]),
        hcl::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                hcl::Value::Object(object) => Ok(object_body(object)),
                other => Err(not_an_object(other)),
            })
            .collect(),
        other => Err(not_an_object(other)),
    }
}

fn not_an_object(value: &hcl::Value) -> Error {
    Error::mismatch(format!(
        "expected an object or a list of objects, got {}",
        tagged_kind(value)
    ))
}

fn object_body(object: &hcl::value::Map<String, hcl::Value>) -> Body {
    Body::builder()
        .add_attributes(object.iter().map(|(key, value)| {
            hcl::Attribute::new(hcl::Identifier::unchecked(key.as_str()), Expression::from(value.clone()))
        }))
        .build()
}

fn label_at(labels: &[String], index: usize) -> String {
    labels.get(index).cloned().unwrap_or_default()
}

/// Fill missing map keys from the decoded object's own label fields
fn complete_key(key: Key, object: &dyn Object) -> Result<Key> {
    let own = object_labels(object);
    let own_at = |index: usize| own.get(index).cloned().unwrap_or_default();

    match key {
        Key::Label(label) if label.is_empty() => {
            let label = own_at(0);
            if label.is_empty() {
                return Err(Error::structural("block needs a label to be stored in a map"));
            }
            Ok(Key::Label(label))
        }
        Key::Labels(first, _) if first.is_empty() => Ok(Key::Labels(own_at(0), own_at(1))),
        Key::Labels(first, second) if second.is_empty() => {
            let second = match own_at(1) {
                second if second.is_empty() => own_at(0),
                second => second,
            };
            Ok(Key::Labels(first, second))
        }
        key => Ok(key),
    }
}

/// Current values of the label fields of `object`
fn object_labels(object: &dyn Object) -> Vec<String> {
    classify(object, None, Direction::Decode)
        .iter()
        .filter(|field| field.class == Class::Label)
        .map(|field| match slot_at(object, &field.path).map(|slot| slot.to_tagged()) {
            Some(Ok(hcl::Value::String(label))) => label,
            _ => String::new(),
        })
        .collect()
}

fn missing_field(field: &FieldDescriptor) -> Error {
    Error::mismatch(format!("field {} is not reachable", field.name))
}

fn slot_mut<'a>(object: &'a mut dyn Object, field: &FieldDescriptor) -> Result<&'a mut dyn crate::object::Slot> {
    slot_at_mut(object, &field.path).ok_or_else(|| missing_field(field))
}

fn assign(object: &mut dyn Object, field: &FieldDescriptor, value: &hcl::Value) -> Result<()> {
    slot_mut(object, field)?
        .assign(value)
        .map_err(|e| Error::from(e).in_field(&field.tag))
}

/// Decode `input` into `target`
pub fn unmarshal(input: &str, target: &mut dyn Object, labels: &[&str]) -> Result<()> {
    Decoder::new().decode(input, target, labels)
}

/// Decode `input` into `target`, building dynamically typed fields as described by `shape`
pub fn unmarshal_with_shape(
    input: &str,
    target: &mut dyn Object,
    shape: Shape,
    registry: Registry,
    labels: &[&str],
) -> Result<()> {
    Decoder::new()
        .with_shape(shape)
        .with_registry(registry)
        .decode(input, target, labels)
}

/// Decode `input` without a target type
pub fn unmarshal_map(input: &str) -> Result<Map> {
    Decoder::new().decode_map(input)
}

/// Decode a list literal without a target type
pub fn unmarshal_slice(input: &str) -> Result<Vec<Value>> {
    Decoder::new().decode_slice(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shape::ShapeInput;
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

    #[derive(Debug, Clone, Default)]
    struct Child {
        age: u8,
        brand: IndexMap<String, Box<Toy>>,
    }
    crate::hcl_object!(Child {
        age: "age",
        brand: "brand",
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Pet {
        name: String,
        kind: String,
        legs: u8,
    }
    crate::hcl_object!(Pet {
        name: "name,label",
        kind: "kind,label",
        legs: "legs",
    });

    #[derive(Debug, Clone, Default)]
    struct Owner {
        pets: IndexMap<(String, String), Pet>,
        named: IndexMap<String, Pet>,
        all: Vec<Pet>,
        favourite: Option<Box<dyn Object>>,
    }
    crate::hcl_object!(Owner {
        pets: "pet",
        named: "named",
        all: "all",
        favourite: "favourite",
    });

    #[test]
    fn shaped_map_materializes_registered_type() {
        let shape = Shape::new(
            "child",
            [("brand", ShapeInput::map([("abc1", ShapeInput::class("toy"))]))],
        )
        .unwrap();
        let mut registry = Registry::new();
        registry.register_as("toy", Toy::default());

        let mut child = Child::default();
        unmarshal_with_shape(
            "age = 5\nbrand \"abc1\" {\n  toy_name = \"x\"\n  price = 1.5\n}",
            &mut child,
            shape,
            registry,
            &[],
        )
        .unwrap();

        assert_eq!(child.age, 5);
        assert_eq!(child.brand["abc1"].toy_name, "x");
        assert_eq!(child.brand["abc1"].price, 1.5);
    }

    #[test]
    fn failed_decode_leaves_target_untouched() {
        let mut child = Child {
            age: 7,
            ..Default::default()
        };

        let error = unmarshal("age = 300\nbrand \"a\" {\n  price = 1\n}", &mut child, &[]).unwrap_err();

        assert_eq!(error.breadcrumbs(), vec!["age"]);
        assert!(matches!(error.root_cause(), Error::Conversion(_)));
        assert_eq!(child.age, 7);
        assert!(child.brand.is_empty());
    }

    #[test]
    fn positional_labels_fill_only_empty_fields() {
        let mut pet = Pet::default();
        unmarshal("legs = 4", &mut pet, &["rex"]).unwrap();
        assert_eq!(
            pet,
            Pet {
                name: "rex".into(),
                kind: String::new(),
                legs: 4
            }
        );

        let mut pet = Pet {
            name: "kept".into(),
            kind: "cat".into(),
            legs: 0,
        };
        unmarshal("legs = 4", &mut pet, &["rex", "dog"]).unwrap();
        assert_eq!((pet.name.as_str(), pet.kind.as_str()), ("kept", "cat"));
    }

    #[test]
    fn label_attribute_wins_over_positional_label() {
        let mut pet = Pet::default();
        unmarshal("name = \"felix\"\nlegs = 4", &mut pet, &["rex"]).unwrap();
        assert_eq!(pet.name, "felix");
    }

    #[test]
    fn null_attribute_leaves_field_alone() {
        let mut pet = Pet {
            legs: 3,
            ..Default::default()
        };
        unmarshal("legs = null()", &mut pet, &[]).unwrap();
        assert_eq!(pet.legs, 3);
    }

    #[test]
    fn two_label_blocks_pass_their_labels_down() {
        let mut owner = Owner::default();
        unmarshal(
            "pet \"rex\" \"dog\" {\n  legs = 4\n}\npet \"tom\" \"cat\" {\n  legs = 4\n}",
            &mut owner,
            &[],
        )
        .unwrap();

        let rex = &owner.pets[&("rex".to_owned(), "dog".to_owned())];
        assert_eq!((rex.name.as_str(), rex.kind.as_str()), ("rex", "dog"));
        assert_eq!(owner.pets.len(), 2);
    }

    #[test]
    fn attributes_can_carry_blocks() {
        let mut owner = Owner::default();
        unmarshal(
            "all = [{ legs = 2 }, { legs = 4 }]\nnamed = [{ name = \"a\", legs = 1 }]",
            &mut owner,
            &[],
        )
        .unwrap();

        assert_eq!(owner.all.iter().map(|p| p.legs).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(owner.named["a"].legs, 1);
    }

    #[test]
    fn too_many_labels_for_a_map_is_structural() {
        let mut owner = Owner::default();
        let error = unmarshal("named \"a\" \"b\" {\n  legs = 1\n}", &mut owner, &[]).unwrap_err();

        assert_eq!(error.breadcrumbs(), vec!["named[a]"]);
        assert!(matches!(error.root_cause(), Error::Structural(_)));
    }

    #[test]
    fn interface_needs_a_shape() {
        let mut owner = Owner::default();
        let error = unmarshal("favourite {\n  legs = 1\n}", &mut owner, &[]).unwrap_err();
        assert!(matches!(error.root_cause(), Error::ShapeMismatch(_)));

        let shape = Shape::new("Owner", [("favourite", ShapeInput::class("Pet"))]).unwrap();
        let registry = Registry::new().with(Pet::default());
        unmarshal_with_shape("favourite {\n  legs = 1\n}", &mut owner, shape, registry, &[]).unwrap();

        let favourite = owner.favourite.expect("decoded");
        let pet = favourite.as_any().downcast_ref::<Pet>().expect("a pet");
        assert_eq!(pet.legs, 1);
    }

    #[test]
    fn unknown_class_is_a_mismatch() {
        let shape = Shape::new("Owner", [("favourite", ShapeInput::class("Dragon"))]).unwrap();
        let mut owner = Owner::default();

        let error =
            unmarshal_with_shape("favourite {}", &mut owner, shape, Registry::new(), &[]).unwrap_err();
        assert_eq!(error.breadcrumbs(), vec!["favourite"]);
        assert_eq!(
            error.root_cause().to_string(),
            r#"struct type "Dragon" not found in registry"#
        );
    }

    #[test]
    fn evaluation_errors_name_the_attribute() {
        let mut pet = Pet::default();
        let error = unmarshal("legs = nope()", &mut pet, &[]).unwrap_err();
        assert!(matches!(error, Error::Evaluation { ref name, .. } if name == "legs"));
    }

    #[test]
    fn syntax_errors_are_returned_immediately() {
        let mut pet = Pet::default();
        assert!(matches!(unmarshal("legs = ", &mut pet, &[]), Err(Error::Syntax(_))));
    }

    #[test]
    fn single_label_keys_a_two_label_map_twice() {
        let mut owner = Owner::default();
        unmarshal("pet \"rex\" {\n  legs = 4\n}", &mut owner, &[]).unwrap();

        assert_eq!(
            owner.pets[&("rex".to_owned(), "rex".to_owned())],
            Pet {
                name: "rex".into(),
                kind: String::new(),
                legs: 4
            }
        );
    }

    #[derive(Debug, Clone, Default)]
    struct Settings {
        extra: IndexMap<String, Value>,
    }
    crate::hcl_object!(Settings { extra: "extra" });

    #[test]
    fn first_dynamic_block_wins() {
        let mut settings = Settings::default();
        unmarshal("extra {\n  a = 1\n}\nextra {\n  b = 2\n}", &mut settings, &[]).unwrap();
        assert_eq!(settings.extra, IndexMap::from([("a".to_owned(), Value::Int(1))]));

        let mut settings = Settings::default();
        unmarshal("extra = { c = 3 }\nextra {\n  b = 2\n}", &mut settings, &[]).unwrap();
        assert_eq!(settings.extra, IndexMap::from([("c".to_owned(), Value::Int(3))]));
    }

    #[test]
    fn slices_and_object_literals_decode_generically() {
        assert_eq!(
            unmarshal_slice(r#"[1, "two", 3.5]"#).unwrap(),
            vec![Value::Int(1), Value::from("two"), Value::Float(3.5)]
        );

        let map = unmarshal_map("{ a = 1, b = [true] }").unwrap();
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(map["b"], Value::Array(vec![Value::Boolean(true)]));
        assert!(unmarshal_map("  ").unwrap().is_empty());
    }
}
