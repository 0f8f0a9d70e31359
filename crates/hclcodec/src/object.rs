//! object model
//!
//! Structs take part in decoding and encoding through [Object]. An object lists its fields as [FieldRef]s (or
//! [FieldMut]s), each carrying the Rust field name, the raw tag string and a type-erased [Slot] that knows how to
//! read and write the field.
//!
//! The [hcl_object!](crate::hcl_object) macro implements everything for a struct with `Default`, `Clone` and
//! `Debug`:
//!
//! ```
//! # use hclcodec::hcl_object;
//! #[derive(Debug, Clone, Default)]
//! struct Toy {
//!     name: String,
//!     price: f64,
//! }
//!
//! hcl_object!(Toy {
//!     name: "name,label",
//!     price: "price",
//! });
//! ```
//!
//! Field types and the [Kind] they map to:
//!
//! | field type                             | kind               |
//! |----------------------------------------|--------------------|
//! | `bool`, numbers, `String`              | [Kind::Scalar]     |
//! | `Option<scalar>`, `Option<Vec<..>>`    | [Kind::Scalar]     |
//! | a struct using `hcl_object!`           | [Kind::Struct]     |
//! | `Option<Box<T>>`, `Option<T>`          | [Kind::Pointer]    |
//! | `Option<Box<dyn Object>>`              | [Kind::Interface]  |
//! | `Vec<E>`                               | [Kind::List]       |
//! | `IndexMap<String, E>`                  | [Kind::Map]        |
//! | `IndexMap<(String, String), E>`        | [Kind::Map2]       |
//!
//! where the element `E` is any [Element]: scalars, [Value], nested `Vec`/`IndexMap`, structs, `Box<T>` and
//! `Box<dyn Object>`.
use crate::conversion::{ConversionError, Scalar};
use crate::error::{Error, Result};
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::any::Any;

/// A struct visible to the codec
pub trait Object: Any + Send + Sync + std::fmt::Debug {
    /// Short name, used as the key in a [Registry](crate::Registry)
    fn class_name(&self) -> &'static str;

    /// Fully qualified type name
    fn type_path(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn fields(&self) -> Vec<FieldRef<'_>>;

    fn fields_mut(&mut self) -> Vec<FieldMut<'_>>;

    /// Fresh zero value of the same concrete type
    fn new_zero(&self) -> Box<dyn Object>;

    fn clone_object(&self) -> Box<dyn Object>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Overwrite `self` with `other`, which must have the same concrete type
    fn assign(&mut self, other: Box<dyn Object>) -> Result<()>;

    fn as_marshaler(&self) -> Option<&dyn Marshaler> {
        None
    }

    fn as_unmarshaler(&mut self) -> Option<&mut dyn Unmarshaler> {
        None
    }
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

/// Custom encoding, bypassing the field walk
pub trait Marshaler {
    fn marshal_hcl(&self) -> Result<String>;
}

/// Custom decoding, bypassing the field walk
///
/// `input` is the body of the block (or the whole document at the top level), `labels` the block's labels.
pub trait Unmarshaler {
    fn unmarshal_hcl(&mut self, input: &str, labels: &[&str]) -> Result<()>;
}

#[derive(derive_new::new)]
pub struct FieldRef<'a> {
    pub name: &'static str,
    pub tag: &'static str,
    pub slot: &'a dyn Slot,
}

#[derive(derive_new::new)]
pub struct FieldMut<'a> {
    pub name: &'static str,
    pub tag: &'static str,
    pub slot: &'a mut dyn Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar,
    Struct,
    Pointer,
    Interface,
    List,
    Map,
    Map2,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Scalar => "scalar",
            Kind::Struct => "struct",
            Kind::Pointer => "pointer",
            Kind::Interface => "interface",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Map2 => "two-label map",
        })
    }
}

/// What an element (or a pointee) is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Scalar,
    /// schema-less [Value]
    Dynamic,
    /// nested list or map
    Collection,
    Struct,
    Pointer,
    Interface,
}

impl Category {
    /// Elements of this category are written as nested blocks
    pub fn is_block_like(self) -> bool {
        matches!(
            self,
            Category::Collection | Category::Struct | Category::Pointer | Category::Interface
        )
    }

    /// Elements of this category are encoded one block per element
    pub fn needs_loop(self) -> bool {
        matches!(self, Category::Struct | Category::Pointer | Category::Interface)
    }
}

/// Position of a decoded object inside its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Index(usize),
    Label(String),
    Labels(String, String),
}

impl Key {
    /// Block labels that address this entry, without empty ones
    pub fn labels(&self) -> Vec<String> {
        match self {
            Key::Index(_) => vec![],
            Key::Label(label) => vec![label.clone()],
            Key::Labels(first, second) => [first, second]
                .into_iter()
                .filter(|label| !label.is_empty())
                .cloned()
                .collect(),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Index(index) => write!(f, "[{index}]"),
            Key::Label(label) => write!(f, "[{label}]"),
            Key::Labels(first, second) => write!(f, "[{first}][{second}]"),
        }
    }
}

/// Type-erased access to one struct field
pub trait Slot: Send + Sync {
    fn kind(&self) -> Kind;

    /// Category of the elements of a collection or of the pointee
    fn element_category(&self) -> Category;

    fn is_zero(&self) -> bool;

    fn len(&self) -> usize {
        0
    }

    /// Runtime category of the first element, the representative of a collection
    fn first_category(&self) -> Option<Category> {
        None
    }

    /// Zero value of the struct type held by this field, if it holds a concrete struct type
    fn prototype(&self) -> Option<Box<dyn Object>> {
        None
    }

    /// Value for encoding as an attribute
    fn to_tagged(&self) -> Result<hcl::Value, ConversionError>;

    /// Value for generic encoding
    fn to_native(&self) -> Option<Value> {
        None
    }

    fn as_object(&self) -> Option<&dyn Object> {
        None
    }

    fn as_object_mut(&mut self) -> Option<&mut dyn Object> {
        None
    }

    /// Objects held by this field, keyed by their position
    fn objects(&self) -> Vec<(Key, &dyn Object)> {
        Vec::new()
    }

    /// Set from an attribute value
    fn assign(&mut self, value: &hcl::Value) -> Result<(), ConversionError>;

    /// Set from schema-less content
    fn assign_native(&mut self, value: Value) -> Result<()> {
        Err(Error::mismatch(format!(
            "{} field cannot hold schema-less {} content",
            self.kind(),
            value.kind()
        )))
    }

    /// Replace the content with decoded objects
    fn install(&mut self, _entries: Vec<(Key, Box<dyn Object>)>) -> Result<()> {
        Err(Error::mismatch(format!(
            "{} field cannot hold decoded blocks",
            self.kind()
        )))
    }
}

/// Element of a collection field, or target of a pointer field
pub trait Element: Sized + Send + Sync + 'static {
    const CATEGORY: Category;

    /// Runtime category of this element
    fn category(&self) -> Category {
        Self::CATEGORY
    }

    fn is_zero(&self) -> bool;

    fn prototype() -> Option<Box<dyn Object>> {
        None
    }

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        Err(ConversionError::mismatch(value, std::any::type_name::<Self>()))
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        Err(ConversionError::Unsupported(
            std::any::type_name::<Self>().to_owned(),
        ))
    }

    fn to_native(&self) -> Option<Value> {
        None
    }

    fn from_native(value: Value) -> Result<Self> {
        Err(Error::mismatch(format!(
            "cannot use {} content as {}",
            value.kind(),
            std::any::type_name::<Self>()
        )))
    }

    fn as_object(&self) -> Option<&dyn Object> {
        None
    }

    fn as_object_mut(&mut self) -> Option<&mut dyn Object> {
        None
    }

    fn from_object(object: Box<dyn Object>) -> Result<Self> {
        Err(Error::mismatch(format!(
            "cannot store {} in {}",
            object.class_name(),
            std::any::type_name::<Self>()
        )))
    }
}

/// Take the concrete `T` out of a boxed object
pub fn downcast<T: Object>(object: Box<dyn Object>) -> Result<T> {
    let class = object.class_name();
    object
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| {
            Error::mismatch(format!(
                "cannot use {class} as {}",
                std::any::type_name::<T>()
            ))
        })
}

/// Every field holds its zero value
pub fn all_zero(object: &dyn Object) -> bool {
    object.fields().iter().all(|field| field.slot.is_zero())
}

/// Field at `path` (indices into nested field lists)
pub fn slot_at<'a>(object: &'a dyn Object, path: &[usize]) -> Option<&'a dyn Slot> {
    let (first, rest) = path.split_first()?;
    let field = object.fields().into_iter().nth(*first)?;
    if rest.is_empty() {
        Some(field.slot)
    } else {
        slot_at(field.slot.as_object()?, rest)
    }
}

/// Mutable field at `path`
pub fn slot_at_mut<'a>(object: &'a mut dyn Object, path: &[usize]) -> Option<&'a mut dyn Slot> {
    let (first, rest) = path.split_first()?;
    let field = object.fields_mut().into_iter().nth(*first)?;
    if rest.is_empty() {
        Some(field.slot)
    } else {
        slot_at_mut(field.slot.as_object_mut()?, rest)
    }
}

macro_rules! scalar_slot {
    ($($ty:ty),*) => {$(
        impl Element for $ty {
            const CATEGORY: Category = Category::Scalar;

            fn is_zero(&self) -> bool {
                *self == <$ty>::default()
            }

            fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
                <$ty as Scalar>::from_tagged(value)
            }

            fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
                Scalar::to_tagged(self)
            }

            fn to_native(&self) -> Option<Value> {
                Some(Scalar::to_native(self))
            }

            fn from_native(value: Value) -> Result<Self> {
                let tagged = crate::conversion::native_to_value(&value)?;
                Ok(<$ty as Scalar>::from_tagged(&tagged)?)
            }
        }

        impl Slot for $ty {
            fn kind(&self) -> Kind {
                Kind::Scalar
            }

            fn element_category(&self) -> Category {
                Category::Scalar
            }

            fn is_zero(&self) -> bool {
                Element::is_zero(self)
            }

            fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
                Scalar::to_tagged(self)
            }

            fn to_native(&self) -> Option<Value> {
                Some(Scalar::to_native(self))
            }

            fn assign(&mut self, value: &hcl::Value) -> Result<(), ConversionError> {
                *self = crate::conversion::convert_to_field_type(value)?;
                Ok(())
            }
        }
    )*};
}

scalar_slot!(bool, String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Element for Value {
    const CATEGORY: Category = Category::Dynamic;

    fn category(&self) -> Category {
        if self.is_collection() {
            Category::Collection
        } else {
            Category::Scalar
        }
    }

    fn is_zero(&self) -> bool {
        false
    }

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        crate::conversion::value_to_native(value)
            .ok_or_else(|| ConversionError::mismatch(value, "value"))
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        crate::conversion::native_to_value(self)
    }

    fn to_native(&self) -> Option<Value> {
        Some(self.clone())
    }

    fn from_native(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: Object + Default> Element for Box<T> {
    const CATEGORY: Category = Category::Pointer;

    fn is_zero(&self) -> bool {
        false
    }

    fn prototype() -> Option<Box<dyn Object>> {
        Some(Box::<T>::default())
    }

    fn as_object(&self) -> Option<&dyn Object> {
        Some(self.as_ref())
    }

    fn as_object_mut(&mut self) -> Option<&mut dyn Object> {
        Some(self.as_mut())
    }

    fn from_object(object: Box<dyn Object>) -> Result<Self> {
        downcast::<T>(object).map(Box::new)
    }
}

impl Element for Box<dyn Object> {
    const CATEGORY: Category = Category::Interface;

    fn is_zero(&self) -> bool {
        false
    }

    fn as_object(&self) -> Option<&dyn Object> {
        Some(self.as_ref())
    }

    fn as_object_mut(&mut self) -> Option<&mut dyn Object> {
        Some(self.as_mut())
    }

    fn from_object(object: Box<dyn Object>) -> Result<Self> {
        Ok(object)
    }
}

fn tagged_items<T: Element>(value: &hcl::Value) -> Result<Vec<T>, ConversionError> {
    match value {
        hcl::Value::Array(items) => items
            .iter()
            .filter(|item| !matches!(item, hcl::Value::Null))
            .map(T::from_tagged)
            .collect(),
        other => Err(ConversionError::mismatch(other, std::any::type_name::<Vec<T>>())),
    }
}

fn tagged_entries<T: Element>(value: &hcl::Value) -> Result<IndexMap<String, T>, ConversionError> {
    match value {
        hcl::Value::Object(object) => object
            .iter()
            .filter(|(_, item)| !matches!(item, hcl::Value::Null))
            .map(|(key, item)| Ok((key.clone(), T::from_tagged(item)?)))
            .collect(),
        other => Err(ConversionError::mismatch(
            other,
            std::any::type_name::<IndexMap<String, T>>(),
        )),
    }
}

fn native_items<T: Element>(value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(items) => items.into_iter().map(T::from_native).collect(),
        other => Err(Error::mismatch(format!(
            "expected a list, got {}",
            other.kind()
        ))),
    }
}

fn native_entries<T: Element>(value: Value) -> Result<IndexMap<String, T>> {
    match value {
        Value::Object(object) => object
            .into_iter()
            .map(|(key, item)| Ok((key, T::from_native(item)?)))
            .collect(),
        other => Err(Error::mismatch(format!(
            "expected a map, got {}",
            other.kind()
        ))),
    }
}

impl<T: Element> Element for Vec<T> {
    const CATEGORY: Category = Category::Collection;

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        tagged_items(value)
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        Slot::to_tagged(self)
    }

    fn to_native(&self) -> Option<Value> {
        Slot::to_native(self)
    }

    fn from_native(value: Value) -> Result<Self> {
        native_items(value)
    }
}

impl<T: Element> Slot for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::List
    }

    fn element_category(&self) -> Category {
        T::CATEGORY
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn first_category(&self) -> Option<Category> {
        self.first().map(Element::category)
    }

    fn prototype(&self) -> Option<Box<dyn Object>> {
        T::prototype()
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        Ok(hcl::Value::Array(
            self.iter()
                .map(Element::to_tagged)
                .collect::<Result<_, _>>()?,
        ))
    }

    fn to_native(&self) -> Option<Value> {
        Some(Value::Array(self.iter().filter_map(Element::to_native).collect()))
    }

    fn objects(&self) -> Vec<(Key, &dyn Object)> {
        self.iter()
            .enumerate()
            .filter_map(|(index, item)| Some((Key::Index(index), item.as_object()?)))
            .collect()
    }

    fn assign(&mut self, value: &hcl::Value) -> Result<(), ConversionError> {
        *self = crate::conversion::convert_to_field_type(value)?;
        Ok(())
    }

    fn assign_native(&mut self, value: Value) -> Result<()> {
        *self = native_items(value)?;
        Ok(())
    }

    fn install(&mut self, entries: Vec<(Key, Box<dyn Object>)>) -> Result<()> {
        *self = entries
            .into_iter()
            .map(|(_, object)| T::from_object(object))
            .collect::<Result<_>>()?;
        Ok(())
    }
}

impl<T: Element> Element for IndexMap<String, T> {
    const CATEGORY: Category = Category::Collection;

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn from_tagged(value: &hcl::Value) -> Result<Self, ConversionError> {
        tagged_entries(value)
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        Slot::to_tagged(self)
    }

    fn to_native(&self) -> Option<Value> {
        Slot::to_native(self)
    }

    fn from_native(value: Value) -> Result<Self> {
        native_entries(value)
    }
}

impl<T: Element> Slot for IndexMap<String, T> {
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn element_category(&self) -> Category {
        T::CATEGORY
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn len(&self) -> usize {
        IndexMap::len(self)
    }

    fn first_category(&self) -> Option<Category> {
        self.values().next().map(Element::category)
    }

    fn prototype(&self) -> Option<Box<dyn Object>> {
        T::prototype()
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        Ok(hcl::Value::Object(
            self.iter()
                .map(|(key, item)| Ok((key.clone(), item.to_tagged()?)))
                .collect::<Result<_, ConversionError>>()?,
        ))
    }

    fn to_native(&self) -> Option<Value> {
        Some(Value::Object(
            self.iter()
                .filter_map(|(key, item)| Some((key.clone(), item.to_native()?)))
                .collect::<Map>(),
        ))
    }

    fn objects(&self) -> Vec<(Key, &dyn Object)> {
        self.iter()
            .filter_map(|(key, item)| Some((Key::Label(key.clone()), item.as_object()?)))
            .collect()
    }

    fn assign(&mut self, value: &hcl::Value) -> Result<(), ConversionError> {
        *self = crate::conversion::convert_to_field_type(value)?;
        Ok(())
    }

    fn assign_native(&mut self, value: Value) -> Result<()> {
        *self = native_entries(value)?;
        Ok(())
    }

    fn install(&mut self, entries: Vec<(Key, Box<dyn Object>)>) -> Result<()> {
        let mut map = IndexMap::new();
        for (key, object) in entries {
            let label = match key {
                Key::Label(label) | Key::Labels(label, _) => label,
                Key::Index(index) => {
                    return Err(Error::structural(format!(
                        "block {index} needs a label to be stored in a map"
                    )))
                }
            };
            map.insert(label, T::from_object(object)?);
        }
        *self = map;
        Ok(())
    }
}

impl<T: Element> Slot for IndexMap<(String, String), T> {
    fn kind(&self) -> Kind {
        Kind::Map2
    }

    fn element_category(&self) -> Category {
        T::CATEGORY
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn len(&self) -> usize {
        IndexMap::len(self)
    }

    fn first_category(&self) -> Option<Category> {
        self.values().next().map(Element::category)
    }

    fn prototype(&self) -> Option<Box<dyn Object>> {
        T::prototype()
    }

    /// Nested object, grouped by the first key
    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        let mut outer: IndexMap<String, hcl::value::Map<String, hcl::Value>> = IndexMap::new();
        for ((first, second), item) in self {
            outer
                .entry(first.clone())
                .or_default()
                .insert(second.clone(), item.to_tagged()?);
        }
        Ok(hcl::Value::Object(
            outer
                .into_iter()
                .map(|(key, inner)| (key, hcl::Value::Object(inner)))
                .collect(),
        ))
    }

    fn to_native(&self) -> Option<Value> {
        let mut outer = Map::new();
        for ((first, second), item) in self {
            let Some(native) = item.to_native() else {
                continue;
            };
            if let Value::Object(inner) = outer
                .entry(first.clone())
                .or_insert_with(|| Value::Object(Map::new()))
            {
                inner.insert(second.clone(), native);
            }
        }
        Some(Value::Object(outer))
    }

    fn objects(&self) -> Vec<(Key, &dyn Object)> {
        self.iter()
            .filter_map(|((first, second), item)| {
                Some((Key::Labels(first.clone(), second.clone()), item.as_object()?))
            })
            .collect()
    }

    fn assign(&mut self, value: &hcl::Value) -> Result<(), ConversionError> {
        let nested: IndexMap<String, IndexMap<String, T>> =
            crate::conversion::convert_to_field_type(value)?;
        *self = nested
            .into_iter()
            .flat_map(|(first, inner)| {
                inner
                    .into_iter()
                    .map(move |(second, item)| ((first.clone(), second), item))
            })
            .collect();
        Ok(())
    }

    fn assign_native(&mut self, value: Value) -> Result<()> {
        let nested: IndexMap<String, IndexMap<String, T>> = native_entries(value)?;
        *self = nested
            .into_iter()
            .flat_map(|(first, inner)| {
                inner
                    .into_iter()
                    .map(move |(second, item)| ((first.clone(), second), item))
            })
            .collect();
        Ok(())
    }

    fn install(&mut self, entries: Vec<(Key, Box<dyn Object>)>) -> Result<()> {
        let mut map = IndexMap::new();
        for (key, object) in entries {
            let key = match key {
                Key::Labels(first, second) => (first, second),
                Key::Label(first) => (first, String::new()),
                Key::Index(index) => {
                    return Err(Error::structural(format!(
                        "block {index} needs labels to be stored in a two-label map"
                    )))
                }
            };
            map.insert(key, T::from_object(object)?);
        }
        *self = map;
        Ok(())
    }
}

impl<T: Element> Slot for Option<T> {
    fn kind(&self) -> Kind {
        match T::CATEGORY {
            Category::Struct | Category::Pointer => Kind::Pointer,
            Category::Interface => Kind::Interface,
            _ => Kind::Scalar,
        }
    }

    fn element_category(&self) -> Category {
        T::CATEGORY
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn prototype(&self) -> Option<Box<dyn Object>> {
        T::prototype()
    }

    fn to_tagged(&self) -> Result<hcl::Value, ConversionError> {
        match self {
            Some(item) => item.to_tagged(),
            None => Ok(hcl::Value::Null),
        }
    }

    fn to_native(&self) -> Option<Value> {
        self.as_ref().and_then(Element::to_native)
    }

    fn as_object(&self) -> Option<&dyn Object> {
        self.as_ref().and_then(Element::as_object)
    }

    fn as_object_mut(&mut self) -> Option<&mut dyn Object> {
        self.as_mut().and_then(Element::as_object_mut)
    }

    fn objects(&self) -> Vec<(Key, &dyn Object)> {
        self.as_object()
            .map(|object| (Key::Index(0), object))
            .into_iter()
            .collect()
    }

    fn assign(&mut self, value: &hcl::Value) -> Result<(), ConversionError> {
        *self = match value {
            hcl::Value::Null => None,
            other => Some(T::from_tagged(other)?),
        };
        Ok(())
    }

    fn assign_native(&mut self, value: Value) -> Result<()> {
        *self = Some(T::from_native(value)?);
        Ok(())
    }

    fn install(&mut self, entries: Vec<(Key, Box<dyn Object>)>) -> Result<()> {
        if let Some((_, object)) = entries.into_iter().next() {
            *self = Some(T::from_object(object)?);
        }
        Ok(())
    }
}

/// Implement [Object], [Element] and [Slot] for a struct
///
/// Each listed field is `field_name: "tag"`. Unlisted fields are invisible to the codec.
///
/// Tag syntax:
/// - `"name"`: attribute or block called `name`
/// - `"name,label"`: filled from the block's labels
/// - `"name,block"`, `"name,optional"`: accepted for compatibility, same as `"name"`
/// - `"-"` or `"name,-"`: ignored
/// - `""`: a struct field is embedded (its fields are flattened into this struct), any other field uses its
///   lowercased name
///
/// `hcl_object!(Type with custom { .. })` routes encoding and decoding through the type's own
/// [Marshaler] and [Unmarshaler] implementations.
///
/// ```
/// # use hclcodec::hcl_object;
/// #[derive(Debug, Clone, Default)]
/// struct Circle {
///     radius: f64,
/// }
/// hcl_object!(Circle { radius: "radius" });
///
/// let mut circle = Circle::default();
/// hclcodec::unmarshal("radius = 2.5", &mut circle, &[]).unwrap();
/// assert_eq!(circle.radius, 2.5);
/// ```
#[macro_export]
macro_rules! hcl_object {
    (@object $ty:ident { $($field:ident : $tag:literal),* } { $($extra:tt)* }) => {
        impl $crate::object::Object for $ty {
            fn class_name(&self) -> &'static str {
                ::std::stringify!($ty)
            }

            fn fields(&self) -> ::std::vec::Vec<$crate::object::FieldRef<'_>> {
                ::std::vec![$($crate::object::FieldRef::new(::std::stringify!($field), $tag, &self.$field)),*]
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<$crate::object::FieldMut<'_>> {
                ::std::vec![$($crate::object::FieldMut::new(::std::stringify!($field), $tag, &mut self.$field)),*]
            }

            fn new_zero(&self) -> ::std::boxed::Box<dyn $crate::object::Object> {
                ::std::boxed::Box::new(<$ty as ::std::default::Default>::default())
            }

            fn clone_object(&self) -> ::std::boxed::Box<dyn $crate::object::Object> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }

            fn assign(&mut self, other: ::std::boxed::Box<dyn $crate::object::Object>) -> $crate::Result<()> {
                *self = $crate::object::downcast::<$ty>(other)?;
                ::std::result::Result::Ok(())
            }

            $($extra)*
        }

        impl $crate::object::Element for $ty {
            const CATEGORY: $crate::object::Category = $crate::object::Category::Struct;

            fn is_zero(&self) -> bool {
                $crate::object::all_zero(self)
            }

            fn prototype() -> ::std::option::Option<::std::boxed::Box<dyn $crate::object::Object>> {
                ::std::option::Option::Some(::std::boxed::Box::new(<$ty as ::std::default::Default>::default()))
            }

            fn as_object(&self) -> ::std::option::Option<&dyn $crate::object::Object> {
                ::std::option::Option::Some(self)
            }

            fn as_object_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::object::Object> {
                ::std::option::Option::Some(self)
            }

            fn from_object(object: ::std::boxed::Box<dyn $crate::object::Object>) -> $crate::Result<Self> {
                $crate::object::downcast::<$ty>(object)
            }
        }

        impl $crate::object::Slot for $ty {
            fn kind(&self) -> $crate::object::Kind {
                $crate::object::Kind::Struct
            }

            fn element_category(&self) -> $crate::object::Category {
                $crate::object::Category::Struct
            }

            fn is_zero(&self) -> bool {
                $crate::object::all_zero(self)
            }

            fn prototype(&self) -> ::std::option::Option<::std::boxed::Box<dyn $crate::object::Object>> {
                <$ty as $crate::object::Element>::prototype()
            }

            fn to_tagged(&self) -> ::std::result::Result<$crate::hcl::Value, $crate::conversion::ConversionError> {
                ::std::result::Result::Err($crate::conversion::ConversionError::Unsupported(
                    ::std::stringify!($ty).to_owned(),
                ))
            }

            fn as_object(&self) -> ::std::option::Option<&dyn $crate::object::Object> {
                ::std::option::Option::Some(self)
            }

            fn as_object_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::object::Object> {
                ::std::option::Option::Some(self)
            }

            fn objects(&self) -> ::std::vec::Vec<($crate::object::Key, &dyn $crate::object::Object)> {
                ::std::vec![($crate::object::Key::Index(0), self as &dyn $crate::object::Object)]
            }

            fn assign(&mut self, value: &$crate::hcl::Value) -> ::std::result::Result<(), $crate::conversion::ConversionError> {
                ::std::result::Result::Err($crate::conversion::ConversionError::mismatch(
                    value,
                    ::std::stringify!($ty),
                ))
            }

            fn install(
                &mut self,
                entries: ::std::vec::Vec<($crate::object::Key, ::std::boxed::Box<dyn $crate::object::Object>)>,
            ) -> $crate::Result<()> {
                if let ::std::option::Option::Some((_, object)) = entries.into_iter().next() {
                    *self = $crate::object::downcast::<$ty>(object)?;
                }
                ::std::result::Result::Ok(())
            }
        }
    };
    ($ty:ident with custom { $($field:ident : $tag:literal),* $(,)? }) => {
        $crate::hcl_object!(@object $ty { $($field : $tag),* } {
            fn as_marshaler(&self) -> ::std::option::Option<&dyn $crate::object::Marshaler> {
                ::std::option::Option::Some(self)
            }

            fn as_unmarshaler(&mut self) -> ::std::option::Option<&mut dyn $crate::object::Unmarshaler> {
                ::std::option::Option::Some(self)
            }
        });
    };
    ($ty:ident { $($field:ident : $tag:literal),* $(,)? }) => {
        $crate::hcl_object!(@object $ty { $($field : $tag),* } {});
    };
}
