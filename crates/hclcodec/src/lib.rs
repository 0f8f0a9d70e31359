//! # hclcodec - HCL for typed objects
//!
//! Decode HCL documents into Rust structs, encode structs back into HCL, and convert between HCL, JSON and YAML.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `hclcodec` works internally.
//!
//! ### HCL Terms
//!
//! In hcl terms...
//! - a file gets parsed as a `body`
//! - ...which is just a list of `structures`
//! - ...where there are two kinds:
//!   - `attribute`: a "key = value" pair
//!   - or `block`:
//!     - 1 `identifier`
//!     - followed by 0, 1 or 2 `labels` (more are rejected)
//!     - and a `body` enclosed in `{` and `}`
//!
//! ```hcl
//! age = 5
//!
//! brand "abc1" {
//!   toy_name = "x"
//!   price    = 1.5
//! }
//! ```
//!
//! ### Objects
//!
//! A struct takes part by implementing [Object], usually through [hcl_object!]. Each field carries a tag that names
//! its attribute or block and may mark it as a label (`"name,label"`) or ignored (`"-"`). See [object] for the
//! supported field types.
//!
//! ### Decoding
//!
//! see [Decoder::decode]
//!
//! 1. the document is parsed with [hcl::parse]; calls to `null()` are replaced with `null`
//! 2. attributes are evaluated with [hcl::eval]. Every value is stored in a [tree::Tree] that mirrors the nesting of
//!    blocks, so later expressions can refer to it (`var.x`, `x`, `server.alpha.port`)
//! 3. the fields of the target are classified ([classify]) and every attribute and block is routed to its field
//! 4. label, simple, dynamic and block fields are filled in that order, on a scratch copy of the target
//! 5. the scratch copy replaces the target. On error the target is left untouched and the error carries the path of
//!    fields that led to it ([Error::breadcrumbs])
//!
//! Fields holding `Option<Box<dyn Object>>` have no static type. A [Shape] names the class to use for them, a
//! [Registry] maps class names to types:
//!
//! ```
//! use hclcodec::{hcl_object, Registry, Shape, ShapeInput};
//! use indexmap::IndexMap;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Toy {
//!     toy_name: String,
//!     price: f64,
//! }
//! hcl_object!(Toy { toy_name: "toy_name", price: "price" });
//!
//! #[derive(Debug, Clone, Default)]
//! struct Child {
//!     age: u8,
//!     brand: IndexMap<String, Box<Toy>>,
//! }
//! hcl_object!(Child { age: "age", brand: "brand" });
//!
//! let shape = Shape::new("child", [("brand", ShapeInput::map([("abc1", ShapeInput::class("toy"))]))]).unwrap();
//! let mut registry = Registry::new();
//! registry.register_as("toy", Toy::default());
//!
//! let mut child = Child::default();
//! hclcodec::unmarshal_with_shape(
//!     "age = 5\nbrand \"abc1\" {\n  toy_name = \"x\"\n  price = 1.5\n}",
//!     &mut child,
//!     shape,
//!     registry,
//!     &[],
//! )
//! .unwrap();
//! assert_eq!(child.brand["abc1"].toy_name, "x");
//! ```
//!
//! ### Encoding
//!
//! see [marshal]
//!
//! Objects are written as indented text, one nesting level at a time. Schema-less [Value]s go through
//! [marshal_map] and [marshal_value].
//!
//! ### Format conversion
//!
//! see [transcode]
pub use hcl;

pub use decode::{unmarshal, unmarshal_map, unmarshal_slice, unmarshal_with_shape, Decoder};
pub use encode::{marshal, marshal_map, marshal_value};
pub use error::{BoxError, Error, Result};
pub use object::{Marshaler, Object, Unmarshaler};
pub use registry::Registry;
pub use shape::{FieldShape, Shape, ShapeError, ShapeInput};
pub use value::{Map, Value};

pub mod classify;
pub mod conversion;
pub mod decode;
pub mod encode;
mod error;
mod eval;
pub mod object;
pub mod registry;
pub mod shape;
pub mod transcode;
pub mod tree;
pub mod value;
mod visit;
