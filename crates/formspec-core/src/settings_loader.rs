//! Settings loading from configuration files.
//!
//! This module provides functions to load [`FormSettings`] from TOML and
//! JSON files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//! 4. Validate the result.
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMSPEC_TRIM_WHITESPACE` | `trim_whitespace` |
//! | `FORMSPEC_TIME_ZONE` | `time_zone` |
//! | `FORMSPEC_LOG_LEVEL` | `log_level` |
//! | `FORMSPEC_DEBUG` | `debug` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formspec_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/forms.toml").unwrap();
//! let settings = settings_loader::from_toml_file_with_env("config/forms.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::{FormspecError, FormspecResult};
use crate::settings::FormSettings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> FormspecResult<FormSettings> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormspecError::Configuration(format!("Failed to parse TOML: {e}")))?;
    from_overrides(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns [`FormspecError::Io`] if the file cannot be read.
pub fn from_toml_file(path: impl AsRef<Path>) -> FormspecResult<FormSettings> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> FormspecResult<FormSettings> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> FormspecResult<FormSettings> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormspecError::Configuration(format!("Failed to parse JSON: {e}")))?;
    from_overrides(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns [`FormspecError::Io`] if the file cannot be read.
pub fn from_json_file(path: impl AsRef<Path>) -> FormspecResult<FormSettings> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> FormspecResult<FormSettings> {
    let mut settings = FormSettings::default();
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true", "1" or "yes" (case-insensitive); any
/// other value means false.
pub fn apply_env_overrides(settings: &mut FormSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

fn apply_overrides(settings: &mut FormSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("FORMSPEC_TRIM_WHITESPACE") {
        settings.trim_whitespace = parse_bool(&val);
    }

    if let Some(val) = lookup("FORMSPEC_TIME_ZONE") {
        settings.time_zone = val;
    }

    if let Some(val) = lookup("FORMSPEC_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("FORMSPEC_DEBUG") {
        settings.debug = parse_bool(&val);
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_bool(val: &str) -> bool {
    matches!(val.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_file(path: &Path, kind: &str) -> FormspecResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        tracing::warn!(path = %path.display(), kind, error = %e, "failed to read settings file");
        FormspecError::Io(e)
    })
}

/// Merges parsed overrides onto the defaults, then deserializes and validates.
fn from_overrides(overrides: serde_json::Value, kind: &str) -> FormspecResult<FormSettings> {
    let default_json = serde_json::to_value(FormSettings::default()).map_err(|e| {
        FormspecError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, overrides);
    let settings: FormSettings = serde_json::from_value(merged).map_err(|e| {
        FormspecError::Configuration(format!("Failed to deserialize settings from {kind}: {e}"))
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
