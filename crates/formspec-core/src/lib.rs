//! # formspec-core
//!
//! Core types for the formspec form-decoding engine. This crate knows
//! nothing about field specs; it provides the foundation the engine builds on.
//!
//! ## Modules
//!
//! - [`error`] - Validation and configuration error types
//! - [`settings`] - Decode settings and the global settings instance
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - `QueryDict` and text helpers

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{FormspecError, FormspecResult, MultiError, ValidationError};
pub use settings::{FormSettings, FORM_SETTINGS};
