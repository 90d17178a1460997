//! Utility types and functions for formspec.
//!
//! This module provides:
//! - [`QueryDict`]: raw form data parsed from query strings and urlencoded bodies.
//! - [`text`]: string helpers, notably [`text::glyph_length`].

mod query_dict;
pub mod text;

pub use query_dict::QueryDict;
