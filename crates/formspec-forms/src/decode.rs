//! The decode engine.
//!
//! Decoding runs every field spec over a source of raw form values in
//! order: trim, check presence, convert, validate. Failures are collected
//! rather than short-circuited, so one pass reports every problem. Only
//! when all fields pass are the values transferred into the caller's
//! record; on failure the record is left untouched.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//!
//! use formspec_forms::decode::decode_form;
//! use formspec_forms::spec::FieldSpec;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Simple {
//!     foo: String,
//!     bar: i32,
//! }
//!
//! let specs = vec![
//!     FieldSpec::required("foo", "string").limit("6").name("Foo").init().unwrap(),
//!     FieldSpec::required("bar", "int").limit("0-100").name("Bar Percentage").init().unwrap(),
//! ];
//!
//! let mut form = HashMap::new();
//! form.insert("foo".to_string(), "bar".to_string());
//!
//! let mut target = Simple::default();
//! let err = decode_form(&form, &specs, &mut target).unwrap_err();
//! assert_eq!(err.to_string(), "Foo has the wrong length\nBar Percentage is required");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use formspec_core::error::{FormspecError, FormspecResult, MultiError};
use formspec_core::logging::decode_span;
use formspec_core::settings::{FormSettings, FORM_SETTINGS};
use formspec_core::utils::QueryDict;

use crate::spec::FieldSpec;
use crate::value::FormValue;

/// A source of raw form values.
///
/// A missing key reads as the empty string, the same as a key submitted
/// without a value.
pub trait FormValues {
    /// Returns the raw value for `key`, or `""` if it is absent.
    fn form_value(&self, key: &str) -> String;
}

impl<S: BuildHasher> FormValues for HashMap<String, String, S> {
    fn form_value(&self, key: &str) -> String {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl FormValues for BTreeMap<String, String> {
    fn form_value(&self, key: &str) -> String {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl FormValues for QueryDict {
    fn form_value(&self, key: &str) -> String {
        self.get(key).map(ToString::to_string).unwrap_or_default()
    }
}

impl<T: FormValues + ?Sized> FormValues for &T {
    fn form_value(&self, key: &str) -> String {
        (**self).form_value(key)
    }
}

/// Converted, validated values keyed by form key, in key order.
pub type CleanedData = BTreeMap<String, FormValue>;

/// Runs field specs against form values with a fixed set of settings.
///
/// [`Decoder::default`] uses the process-wide
/// [`FORM_SETTINGS`](formspec_core::settings::FORM_SETTINGS).
#[derive(Debug, Clone)]
pub struct Decoder {
    settings: FormSettings,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            settings: FORM_SETTINGS.get().clone(),
        }
    }
}

impl Decoder {
    /// Creates a decoder with its own settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings do not validate.
    pub fn new(settings: FormSettings) -> FormspecResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// The settings this decoder uses.
    pub const fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Converts and validates every spec's value without touching a record.
    ///
    /// Errors are returned in spec order, at most one per spec.
    pub fn clean_fields<V>(&self, source: &V, specs: &[FieldSpec]) -> Result<CleanedData, MultiError>
    where
        V: FormValues + ?Sized,
    {
        let mut errors = MultiError::new();
        let mut cleaned = CleanedData::new();

        for spec in specs {
            let mut raw = source.form_value(spec.key());
            if self.settings.trim_whitespace {
                raw = raw.trim().to_string();
            }

            if raw.is_empty() && spec.is_required() {
                tracing::debug!(key = spec.key(), "missing required value");
                errors.push(spec.validation_error("is required", "required"));
                continue;
            }

            let value = match spec.convert_with(&raw, &self.settings) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(key = spec.key(), type_name = spec.type_name(), "conversion failed");
                    errors.push(err);
                    continue;
                }
            };

            if let Err(err) = spec.validate(&value) {
                tracing::debug!(key = spec.key(), code = %err.code, "validation failed");
                errors.push(err);
                continue;
            }

            tracing::trace!(key = spec.key(), value = %value, "field accepted");
            cleaned.insert(spec.key().to_string(), value);
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }

    /// Decodes `source` into `target`.
    ///
    /// On validation failure returns [`FormspecError::Validation`] and
    /// leaves `target` unchanged. Record members with no matching spec keep
    /// their current values.
    pub fn decode<V, T>(&self, source: &V, specs: &[FieldSpec], target: &mut T) -> FormspecResult<()>
    where
        V: FormValues + ?Sized,
        T: Serialize + DeserializeOwned,
    {
        let span = decode_span(specs.len());
        let _guard = span.enter();

        let cleaned = self.clean_fields(source, specs).map_err(|errors| {
            tracing::debug!(errors = errors.len(), "form rejected");
            FormspecError::Validation(errors)
        })?;
        transfer(cleaned, target)?;
        tracing::debug!("form decoded");
        Ok(())
    }
}

/// Writes cleaned values into the members of `target`.
///
/// Each key is matched to a serialized member name exactly, or failing that
/// case-insensitively. Keys with no matching member are ignored, and
/// members with no matching key keep their values. When several keys match
/// the same member, an exact match wins over case-insensitive ones, and
/// case-insensitive matches apply in key order.
///
/// # Errors
///
/// Returns [`FormspecError::Transfer`] if `target` does not serialize as a
/// record or a value does not fit its member's type. `target` is unchanged
/// in that case.
pub fn transfer<T>(values: CleanedData, target: &mut T) -> FormspecResult<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut record = serde_json::to_value(&*target)
        .map_err(|e| FormspecError::Transfer(format!("cannot serialize target: {e}")))?;
    let Value::Object(members) = &mut record else {
        return Err(FormspecError::Transfer("target is not a record".to_string()));
    };

    let mut exact = Vec::new();
    let mut folded = Vec::new();
    for (key, value) in values {
        if members.contains_key(&key) {
            exact.push((key, value));
            continue;
        }
        let lower = key.to_lowercase();
        match members.keys().find(|m| m.to_lowercase() == lower) {
            Some(member) => folded.push((member.clone(), value)),
            None => tracing::trace!(key = %key, "no record member for key"),
        }
    }

    // Exact matches go last so they overwrite case-insensitive ones.
    for (member, value) in folded.into_iter().chain(exact) {
        let json = serde_json::to_value(&value)
            .map_err(|e| FormspecError::Transfer(format!("cannot serialize '{member}': {e}")))?;
        members.insert(member, json);
    }

    *target = serde_json::from_value(record)
        .map_err(|e| FormspecError::Transfer(format!("cannot fill target: {e}")))?;
    Ok(())
}

/// Decodes `source` into `target` with the process-wide settings.
///
/// See [`Decoder::decode`].
pub fn decode_form<V, T>(source: &V, specs: &[FieldSpec], target: &mut T) -> FormspecResult<()>
where
    V: FormValues + ?Sized,
    T: Serialize + DeserializeOwned,
{
    Decoder::default().decode(source, specs, target)
}
