//! # formspec
//!
//! Declarative form decoding for Rust.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `formspec` to get everything, or on the individual
//! crates for finer-grained control.
//!
//! ## Quick start
//!
//! ```
//! use std::collections::HashMap;
//!
//! use formspec::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Flubber {
//!     variant: String,
//!     size: i32,
//!     strength: f64,
//! }
//!
//! # fn main() -> FormspecResult<()> {
//! let specs = vec![
//!     FieldSpec::required("variant", "string").limit("4").name("The 4-letter variant").init()?,
//!     FieldSpec::required("size", "int").limit("1-4").name("The size (1-4)").init()?,
//!     FieldSpec::optional("strength", "float").name("Flubber strength").init()?,
//! ];
//!
//! let form = QueryDict::parse("variant=foop&size=2&strength=3.4");
//! let mut flubber = Flubber::default();
//! decode_form(&form, &specs, &mut flubber)?;
//! assert_eq!(flubber.size, 2);
//! # Ok(())
//! # }
//! ```

/// Errors, settings, logging, and form-data utilities.
pub use formspec_core as core;

/// Field specs, limits, the type registry, and the decode engine.
pub use formspec_forms as forms;

/// The types most programs need.
pub mod prelude {
    pub use formspec_core::utils::QueryDict;
    pub use formspec_core::{
        FormSettings, FormspecError, FormspecResult, MultiError, ValidationError, FORM_SETTINGS,
    };
    pub use formspec_forms::{
        decode_form, register_type, Decoder, FieldSpec, FormValue, FormValues, TypeRegistry,
    };
}
