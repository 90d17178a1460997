//! # formspec-forms
//!
//! Declarative form decoding. A table of [`FieldSpec`]s describes the
//! fields of a form: key, type, whether it is required, a compact limit
//! expression, and a display name. [`decode_form`] runs the table over raw
//! form values and either fills a typed record or reports every failure at
//! once.
//!
//! ## Modules
//!
//! - [`spec`] - Field specs and their builder
//! - [`limits`] - The limit mini-language
//! - [`types`] - Field types, converters, and the type registry
//! - [`validators`] - Default validators for the built-in types
//! - [`value`] - Converted form values
//! - [`decode`] - The decode engine and record transfer

pub mod decode;
pub mod limits;
pub mod spec;
pub mod types;
pub mod validators;
pub mod value;

pub use decode::{decode_form, transfer, CleanedData, Decoder, FormValues};
pub use limits::Limit;
pub use spec::{FieldSpec, FieldSpecBuilder};
pub use types::{
    lookup_type, register_type, validator, with_registry, BuiltinType, Converter, FieldType,
    TypeRegistry, Validator,
};
pub use value::FormValue;
