//! Core error types for formspec.
//!
//! Two classes of failure are kept apart:
//!
//! - **Validation** failures are expected and come from user input: a missing
//!   required value, a value that does not convert, a value rejected by a
//!   validator. They are collected per decode pass into a [`MultiError`].
//! - **Configuration** failures indicate a programmer error: an unknown field
//!   type, a malformed limit, an empty key, or an output record whose field
//!   types disagree with the specs. They surface as the other
//!   [`FormspecError`] variants and should stop startup.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A single user-facing validation failure.
///
/// # Examples
///
/// ```
/// use formspec_core::error::ValidationError;
///
/// let err = ValidationError::new("Foo is required", "required").with_field("foo");
/// assert_eq!(err.to_string(), "Foo is required");
/// assert_eq!(err.field.as_deref(), Some("foo"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The message shown to the user.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "length").
    pub code: String,
    /// The key of the form field this error belongs to, if known.
    pub field: Option<String>,
    /// Additional parameters providing context for the message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            field: None,
            params: HashMap::new(),
        }
    }

    /// Sets the field key this error belongs to.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// An ordered collection of validation errors from one decode pass.
///
/// The errors keep the order of the field specs that produced them. The
/// `Display` form joins every message with a newline; the individual errors
/// stay available for per-field presentation.
///
/// # Examples
///
/// ```
/// use formspec_core::error::{MultiError, ValidationError};
///
/// let err = MultiError::from(vec![
///     ValidationError::new("first", "invalid"),
///     ValidationError::new("second", "invalid"),
/// ]);
/// assert_eq!(err.to_string(), "first\nsecond");
/// assert_eq!(err.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiError {
    errors: Vec<ValidationError>,
}

impl MultiError {
    /// Creates an empty `MultiError`.
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Appends an error.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns the errors in the order they were recorded.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns an iterator over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Returns the errors recorded for the given field key.
    pub fn for_field<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors
            .iter()
            .filter(move |e| e.field.as_deref() == Some(key))
    }

    /// Consumes the collection and returns the underlying errors.
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl From<Vec<ValidationError>> for MultiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for MultiError {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}

/// The primary error type for formspec.
///
/// Every variant except [`FormspecError::Validation`] is a configuration
/// error; see [`FormspecError::is_configuration`].
#[derive(Error, Debug)]
pub enum FormspecError {
    // ── Validation ───────────────────────────────────────────────────

    /// One or more form values failed validation.
    #[error("{0}")]
    Validation(MultiError),

    // ── Field specs ──────────────────────────────────────────────────

    /// The field type is not registered.
    #[error("Unsupported field type: {0}")]
    UnknownType(String),

    /// A field key was empty or whitespace-only.
    #[error("Empty field key")]
    EmptyKey,

    /// A limit expression could not be parsed.
    #[error("Invalid limit '{limit}': {reason}")]
    InvalidLimit {
        /// The raw limit expression.
        limit: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A limit expression does not apply to the field type.
    #[error("Limit '{limit}' does not apply to type {type_name}")]
    LimitTypeMismatch {
        /// The raw limit expression.
        limit: String,
        /// The declared field type.
        type_name: String,
    },

    // ── Decoding ─────────────────────────────────────────────────────

    /// Decoded values could not be transferred into the output record.
    #[error("Transfer error: {0}")]
    Transfer(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A settings value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormspecError {
    /// Returns `true` for programmer errors, `false` for validation failures.
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }

    /// Returns the validation errors if this is a validation failure.
    pub const fn validation_errors(&self) -> Option<&MultiError> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<MultiError> for FormspecError {
    fn from(errors: MultiError) -> Self {
        Self::Validation(errors)
    }
}

/// A convenience type alias for `Result<T, FormspecError>`.
pub type FormspecResult<T> = Result<T, FormspecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("Foo is required", "required");
        assert_eq!(err.to_string(), "Foo is required");
        assert!(err.field.is_none());
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too short.", "too_short").with_param("min", "8");
        assert_eq!(err.params.get("min").map(String::as_str), Some("8"));
    }

    #[test]
    fn test_multi_error_joins_with_newline() {
        let err = MultiError::from(vec![
            ValidationError::new("first", "invalid"),
            ValidationError::new("second", "invalid"),
        ]);
        assert_eq!(err.to_string(), "first\nsecond");
    }

    #[test]
    fn test_multi_error_empty_display() {
        assert_eq!(MultiError::new().to_string(), "");
        assert!(MultiError::new().is_empty());
    }

    #[test]
    fn test_multi_error_keeps_order() {
        let mut err = MultiError::new();
        err.push(ValidationError::new("b", "x").with_field("b"));
        err.push(ValidationError::new("a", "x").with_field("a"));
        let fields: Vec<_> = err.iter().filter_map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, vec!["b", "a"]);
    }

    #[test]
    fn test_multi_error_for_field() {
        let err = MultiError::from(vec![
            ValidationError::new("Foo is required", "required").with_field("foo"),
            ValidationError::new("Bar is too high", "too_high").with_field("bar"),
        ]);
        let bar: Vec<_> = err.for_field("bar").collect();
        assert_eq!(bar.len(), 1);
        assert_eq!(bar[0].code, "too_high");
        assert_eq!(err.for_field("baz").count(), 0);
    }

    #[test]
    fn test_formspec_error_classes() {
        assert!(!FormspecError::Validation(MultiError::new()).is_configuration());
        assert!(FormspecError::UnknownType("x".into()).is_configuration());
        assert!(FormspecError::EmptyKey.is_configuration());
        assert!(FormspecError::Transfer("x".into()).is_configuration());
    }

    #[test]
    fn test_formspec_error_display() {
        let err = FormspecError::UnknownType("NoSuchType".into());
        assert_eq!(err.to_string(), "Unsupported field type: NoSuchType");

        let err = FormspecError::InvalidLimit {
            limit: "10-1".into(),
            reason: "upper < lower".into(),
        };
        assert_eq!(err.to_string(), "Invalid limit '10-1': upper < lower");
    }

    #[test]
    fn test_validation_variant_displays_messages() {
        let err: FormspecError = MultiError::from(vec![
            ValidationError::new("one", "x"),
            ValidationError::new("two", "x"),
        ])
        .into();
        assert_eq!(err.to_string(), "one\ntwo");
        assert_eq!(err.validation_errors().map(MultiError::len), Some(2));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormspecError = io_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("file missing"));
    }
}
