//! Field specs: the declarative description of one form field.
//!
//! A [`FieldSpec`] names the form key, the field type, whether the field is
//! required, an optional limit expression and a human-readable name used in
//! error messages. Specs are immutable once built and cheap to clone, so a
//! table of them can be shared by every request.
//!
//! # Examples
//!
//! ```
//! use formspec_forms::spec::FieldSpec;
//!
//! let foo = FieldSpec::required("foo", "string").limit("6").name("Foo").init().unwrap();
//! let bar = FieldSpec::optional("bar", "int").limit("0-100").init().unwrap();
//!
//! assert_eq!(foo.name(), "Foo");
//! assert_eq!(bar.name(), "bar");
//! assert!(foo.is_required());
//! assert!(!bar.is_required());
//! ```

use std::fmt;
use std::sync::Arc;

use formspec_core::error::{FormspecError, FormspecResult, ValidationError};
use formspec_core::settings::{FormSettings, FORM_SETTINGS};

use crate::limits::Limit;
use crate::types::{self, FieldType, TypeRegistry, Validator};
use crate::value::FormValue;

/// A fully initialized field spec.
#[derive(Clone)]
pub struct FieldSpec {
    key: String,
    type_name: String,
    required: bool,
    limit_expr: String,
    name: String,
    limit: Option<Arc<Limit>>,
    validator: Option<Validator>,
    field_type: Arc<dyn FieldType>,
}

impl FieldSpec {
    /// Starts building a spec for a field that must be present and non-empty.
    pub fn required(key: impl Into<String>, type_name: impl Into<String>) -> FieldSpecBuilder {
        FieldSpecBuilder::new(true, key, type_name)
    }

    /// Starts building a spec for a field that may be absent.
    pub fn optional(key: impl Into<String>, type_name: impl Into<String>) -> FieldSpecBuilder {
        FieldSpecBuilder::new(false, key, type_name)
    }

    /// Builds a spec in one call against the process-wide registry.
    ///
    /// `limit` and `name` may be `None`; the name then defaults to the key.
    pub fn new(
        required: bool,
        key: &str,
        type_name: &str,
        limit: Option<&str>,
        name: Option<&str>,
    ) -> FormspecResult<Self> {
        let mut builder = FieldSpecBuilder::new(required, key, type_name);
        if let Some(limit) = limit {
            builder = builder.limit(limit);
        }
        if let Some(name) = name {
            builder = builder.name(name);
        }
        builder.init()
    }

    /// The form key this spec reads.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The registered type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether an empty value is a validation error.
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// The raw limit expression, possibly empty.
    pub fn limit_expr(&self) -> &str {
        &self.limit_expr
    }

    /// The human-readable field name used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed limit. Always `None` for custom types.
    pub fn limit(&self) -> Option<&Limit> {
        self.limit.as_deref()
    }

    /// The validator run after conversion, if any.
    pub const fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// The field type behind [`type_name`](Self::type_name).
    pub fn field_type(&self) -> &Arc<dyn FieldType> {
        &self.field_type
    }

    /// Builds a validation error for this field: `"{name} {suffix}"`.
    pub fn validation_error(&self, suffix: &str, code: &str) -> ValidationError {
        ValidationError::new(format!("{} {suffix}", self.name), code).with_field(&self.key)
    }

    /// Converts a raw string using the process-wide settings.
    pub fn convert(&self, raw: &str) -> Result<FormValue, ValidationError> {
        self.convert_with(raw, FORM_SETTINGS.get())
    }

    /// Converts a raw string using `settings` for date handling.
    pub fn convert_with(
        &self,
        raw: &str,
        settings: &FormSettings,
    ) -> Result<FormValue, ValidationError> {
        self.field_type.convert(raw, settings).ok_or_else(|| {
            self.validation_error(
                &format!("could not be converted to {}", self.type_name),
                "invalid",
            )
        })
    }

    /// Runs the spec's validator, if it has one.
    pub fn validate(&self, value: &FormValue) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator(self, value).map_err(|mut err| {
                if err.field.is_none() {
                    err.field = Some(self.key.clone());
                }
                err
            }),
            None => Ok(()),
        }
    }

    /// Returns a spec identical to this one but reading a different key.
    ///
    /// `name` defaults to the new key. The parsed limit, validator and type
    /// are shared with the original.
    ///
    /// # Errors
    ///
    /// Returns [`FormspecError::EmptyKey`] if `key` is blank.
    pub fn copy(&self, key: &str, name: Option<&str>) -> FormspecResult<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(FormspecError::EmptyKey);
        }
        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(key);
        Ok(Self {
            key: key.to_string(),
            name: name.to_string(),
            ..self.clone()
        })
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("required", &self.required)
            .field("limit_expr", &self.limit_expr)
            .field("name", &self.name)
            .field("has_validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FieldSpec`].
///
/// Nothing is checked until [`init`](Self::init) or
/// [`init_with`](Self::init_with), which resolve the type, parse the limit
/// and pick the validator.
#[must_use]
pub struct FieldSpecBuilder {
    required: bool,
    key: String,
    type_name: String,
    limit: String,
    name: Option<String>,
    validator: Option<Validator>,
}

impl FieldSpecBuilder {
    fn new(required: bool, key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            required,
            key: key.into(),
            type_name: type_name.into(),
            limit: String::new(),
            name: None,
            validator: None,
        }
    }

    /// Sets the limit expression.
    pub fn limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = limit.into();
        self
    }

    /// Sets the human-readable name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the type's default validator.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Replaces the type's default validator with a closure.
    pub fn validate_with<F>(self, f: F) -> Self
    where
        F: Fn(&FieldSpec, &FormValue) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator(types::validator(f))
    }

    /// Finishes the spec against the process-wide type registry.
    pub fn init(self) -> FormspecResult<FieldSpec> {
        types::with_registry(|registry| self.init_with(registry))
    }

    /// Finishes the spec against `registry`.
    ///
    /// # Errors
    ///
    /// Fails with [`FormspecError::EmptyKey`] for a blank key,
    /// [`FormspecError::UnknownType`] for an unregistered type, or a limit
    /// error if the expression does not parse for a built-in type.
    pub fn init_with(self, registry: &TypeRegistry) -> FormspecResult<FieldSpec> {
        let key = self.key.trim().to_string();
        if key.is_empty() {
            return Err(FormspecError::EmptyKey);
        }
        let field_type = registry
            .lookup(&self.type_name)
            .ok_or_else(|| FormspecError::UnknownType(self.type_name.clone()))?;

        let limit = if field_type.is_custom() {
            None
        } else {
            Limit::parse(&self.type_name, &self.limit)?.map(Arc::new)
        };
        tracing::trace!(key = %key, type_name = %self.type_name, limit = ?limit, "initialized field spec");

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| key.clone());
        let validator = self.validator.or_else(|| field_type.default_validator());

        Ok(FieldSpec {
            key,
            type_name: self.type_name,
            required: self.required,
            limit_expr: self.limit,
            name,
            limit,
            validator,
            field_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
    }

    #[test]
    fn test_name_defaults_to_key() {
        let spec = FieldSpec::optional("age", "int").init_with(&registry()).unwrap();
        assert_eq!(spec.name(), "age");
        assert_eq!(spec.limit_expr(), "");
        assert!(spec.limit().is_none());
        assert!(spec.validator().is_some());

        let flag = FieldSpec::optional("flag", "bool").init_with(&registry()).unwrap();
        assert!(flag.validator().is_none());
    }

    #[test]
    fn test_key_is_trimmed() {
        let spec = FieldSpec::required("  foo ", "string").init_with(&registry()).unwrap();
        assert_eq!(spec.key(), "foo");
        assert_eq!(spec.name(), "foo");
    }

    #[test]
    fn test_empty_key() {
        let err = FieldSpec::required("   ", "string").init_with(&registry()).unwrap_err();
        assert!(matches!(err, FormspecError::EmptyKey));
    }

    #[test]
    fn test_unknown_type() {
        let err = FieldSpec::required("x", "NoSuchType").init_with(&registry()).unwrap_err();
        assert!(matches!(err, FormspecError::UnknownType(ref t) if t == "NoSuchType"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_bad_limit_is_configuration_error() {
        let err = FieldSpec::required("x", "int")
            .limit("100-0")
            .init_with(&registry())
            .unwrap_err();
        assert!(matches!(err, FormspecError::InvalidLimit { .. }));

        let err = FieldSpec::required("x", "bool")
            .limit("5")
            .init_with(&registry())
            .unwrap_err();
        assert!(matches!(err, FormspecError::LimitTypeMismatch { .. }));
    }

    #[test]
    fn test_custom_type_limit_is_not_parsed() {
        let mut registry = registry();
        registry.register("tag", |raw| Some(FormValue::from(raw)), None);
        let spec = FieldSpec::required("t", "tag")
            .limit("anything,,goes")
            .init_with(&registry)
            .unwrap();
        assert!(spec.limit().is_none());
        assert_eq!(spec.limit_expr(), "anything,,goes");
    }

    #[test]
    fn test_convert_error_message() {
        let spec = FieldSpec::required("bar", "int")
            .name("Bar Percentage")
            .init_with(&registry())
            .unwrap();
        let err = spec.convert_with("abc", &FormSettings::default()).unwrap_err();
        assert_eq!(err.message, "Bar Percentage could not be converted to int");
        assert_eq!(err.code, "invalid");
        assert_eq!(err.field.as_deref(), Some("bar"));
        assert_eq!(
            spec.convert_with("23", &FormSettings::default()),
            Ok(FormValue::Int(23))
        );
    }

    #[test]
    fn test_explicit_validator_overrides_default() {
        let spec = FieldSpec::required("n", "int")
            .limit("0-10")
            .validate_with(|spec, value| match value.as_i64() {
                Some(i) if i % 2 == 0 => Ok(()),
                _ => Err(ValidationError::new(format!("{} must be even", spec.name()), "even")),
            })
            .init_with(&registry())
            .unwrap();
        // The range is parsed but only the explicit validator runs.
        assert!(spec.validate(&FormValue::Int(12)).is_ok());
        let err = spec.validate(&FormValue::Int(3)).unwrap_err();
        assert_eq!(err.message, "n must be even");
        assert_eq!(err.field.as_deref(), Some("n"));
    }

    #[test]
    fn test_copy() {
        let original = FieldSpec::required("foo", "string")
            .limit("6")
            .name("Foo")
            .init_with(&registry())
            .unwrap();
        let copy = original.copy(" baz ", None).unwrap();
        assert_eq!(copy.key(), "baz");
        assert_eq!(copy.name(), "baz");
        assert_eq!(copy.type_name(), "string");
        assert_eq!(copy.limit_expr(), "6");
        assert!(copy.is_required());
        assert!(matches!(copy.limit(), Some(Limit::Length(6))));

        let named = original.copy("qux", Some("Qux")).unwrap();
        assert_eq!(named.name(), "Qux");
        assert_eq!(original.key(), "foo");
        assert_eq!(original.name(), "Foo");
    }

    #[test]
    fn test_copy_shares_limit() {
        let original = FieldSpec::required("re", "string")
            .limit(r"re:^\d+$")
            .init_with(&registry())
            .unwrap();
        let copy = original.copy("other", None).unwrap();
        assert!(Arc::ptr_eq(
            original.limit.as_ref().unwrap(),
            copy.limit.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_copy_empty_key() {
        let original = FieldSpec::required("foo", "string").init_with(&registry()).unwrap();
        assert!(matches!(original.copy("  ", None), Err(FormspecError::EmptyKey)));
    }

    #[test]
    fn test_new_uses_global_registry() {
        let spec = FieldSpec::new(true, "foo", "string", Some("6"), Some("Foo")).unwrap();
        assert_eq!(spec.name(), "Foo");
        let spec = FieldSpec::new(false, "bar", "float", None, None).unwrap();
        assert_eq!(spec.name(), "bar");
        assert!(FieldSpec::new(true, "x", "NoSuchType", None, None).is_err());
    }

    #[test]
    fn test_debug_omits_closures() {
        let spec = FieldSpec::required("foo", "string").init_with(&registry()).unwrap();
        let debug = format!("{spec:?}");
        assert!(debug.contains("\"foo\""));
        assert!(debug.contains("has_validator: true"));
    }
}
