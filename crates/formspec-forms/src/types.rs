//! Field types and the type registry.
//!
//! A field type turns a raw (already trimmed) form string into a
//! [`FormValue`] and may supply a default validator. The eight built-in
//! types are the closed [`BuiltinType`] enum; callers add their own with
//! [`TypeRegistry::register`] or the process-wide [`register_type`].
//!
//! | Name | Value | Empty input |
//! |---|---|---|
//! | `string` | `String` | `""` |
//! | `int` | `i32` | `0` |
//! | `int64` | `i64` | `0` |
//! | `float` | `f64` | `0.0` |
//! | `bool` | `"true"` / `"false"` | `false` |
//! | `date` | calendar date at midnight | `0001-01-01T00:00:00+00:00` |
//! | `datetime` | date and time, minute precision | same |
//! | `dateflex` | either of the above | same |

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;

use formspec_core::error::ValidationError;
use formspec_core::settings::FormSettings;

use crate::spec::FieldSpec;
use crate::validators;
use crate::value::FormValue;

/// A validator: inspects a converted value in the context of its spec.
pub type Validator = Arc<dyn Fn(&FieldSpec, &FormValue) -> Result<(), ValidationError> + Send + Sync>;

/// A converter for caller-registered types: `None` means the raw string
/// could not be converted.
pub type Converter = Arc<dyn Fn(&str) -> Option<FormValue> + Send + Sync>;

/// Wraps a closure as a [`Validator`].
///
/// # Examples
///
/// ```
/// use formspec_core::ValidationError;
/// use formspec_forms::types::validator;
///
/// let even = validator(|spec, value| match value.as_i64() {
///     Some(i) if i % 2 == 0 => Ok(()),
///     _ => Err(ValidationError::new(format!("{} must be even", spec.name()), "even")),
/// });
/// # let _ = even;
/// ```
pub fn validator<F>(f: F) -> Validator
where
    F: Fn(&FieldSpec, &FormValue) -> Result<(), ValidationError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The behavior behind a field type name.
pub trait FieldType: Send + Sync {
    /// Converts a raw string, returning `None` if it is not acceptable.
    fn convert(&self, raw: &str, settings: &FormSettings) -> Option<FormValue>;

    /// The validator used by specs that do not set their own.
    fn default_validator(&self) -> Option<Validator> {
        None
    }

    /// Custom types skip limit parsing; their validator owns the limit.
    fn is_custom(&self) -> bool {
        true
    }
}

/// The built-in field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// `bool`
    Bool,
    /// `date`
    Date,
    /// `dateflex`
    DateFlex,
    /// `datetime`
    DateTime,
    /// `float`
    Float,
    /// `int`
    Int,
    /// `int64`
    Int64,
    /// `string`
    String,
}

impl BuiltinType {
    /// All built-in types.
    pub const ALL: [Self; 8] = [
        Self::Bool,
        Self::Date,
        Self::DateFlex,
        Self::DateTime,
        Self::Float,
        Self::Int,
        Self::Int64,
        Self::String,
    ];

    /// The registry name of this type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Date => "date",
            Self::DateFlex => "dateflex",
            Self::DateTime => "datetime",
            Self::Float => "float",
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::String => "string",
        }
    }

    /// Looks up a built-in type by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FieldType for BuiltinType {
    fn convert(&self, raw: &str, settings: &FormSettings) -> Option<FormValue> {
        match self {
            Self::Bool => match raw {
                "true" => Some(FormValue::Bool(true)),
                "false" | "" => Some(FormValue::Bool(false)),
                _ => None,
            },
            Self::String => Some(FormValue::String(raw.to_string())),
            Self::Int => {
                if raw.is_empty() {
                    return Some(FormValue::Int(0));
                }
                raw.parse::<i32>().ok().map(FormValue::Int)
            }
            Self::Int64 => {
                if raw.is_empty() {
                    return Some(FormValue::Int64(0));
                }
                raw.parse::<i64>().ok().map(FormValue::Int64)
            }
            Self::Float => {
                if raw.is_empty() {
                    return Some(FormValue::Float(0.0));
                }
                raw.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(FormValue::Float)
            }
            Self::Date | Self::DateTime | Self::DateFlex => {
                if raw.is_empty() {
                    return Some(FormValue::DateTime(FormValue::zero_date_time()));
                }
                let offset = match settings.time_zone_offset() {
                    Ok(offset) => offset,
                    Err(err) => {
                        tracing::warn!(
                            time_zone = %settings.time_zone,
                            error = %err,
                            "cannot convert date input"
                        );
                        return None;
                    }
                };
                let parsed = match self {
                    Self::Date => parse_date(raw, &settings.date_formats, offset),
                    Self::DateTime => parse_date_time(raw, &settings.date_time_formats, offset),
                    _ => parse_date(raw, &settings.date_formats, offset)
                        .or_else(|| parse_date_time(raw, &settings.date_time_formats, offset)),
                };
                parsed.map(FormValue::DateTime)
            }
        }
    }

    fn default_validator(&self) -> Option<Validator> {
        match self {
            Self::String => Some(Arc::new(validators::validate_string)),
            Self::Int | Self::Int64 => Some(Arc::new(validators::validate_integer)),
            Self::Float => Some(Arc::new(validators::validate_float)),
            Self::Bool | Self::Date | Self::DateTime | Self::DateFlex => None,
        }
    }

    fn is_custom(&self) -> bool {
        false
    }
}

/// Parses a calendar date with the first matching layout, as midnight at `offset`.
fn parse_date(raw: &str, layouts: &[String], offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    layouts
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(raw, layout).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

/// Parses a date-time with the first matching layout, at `offset`.
fn parse_date_time(
    raw: &str,
    layouts: &[String],
    offset: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    layouts
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

/// A caller-registered type built from a converter and optional validator.
struct CustomType {
    converter: Converter,
    validator: Option<Validator>,
}

impl FieldType for CustomType {
    fn convert(&self, raw: &str, _settings: &FormSettings) -> Option<FormValue> {
        (self.converter)(raw)
    }

    fn default_validator(&self) -> Option<Validator> {
        self.validator.clone()
    }
}

/// Maps type names to field types.
///
/// # Examples
///
/// ```
/// use formspec_forms::types::TypeRegistry;
/// use formspec_forms::value::FormValue;
///
/// let mut registry = TypeRegistry::new();
/// registry.register("upper", |raw| Some(FormValue::from(raw.to_uppercase())), None);
///
/// assert!(registry.contains("string"));
/// assert!(registry.lookup("upper").unwrap().is_custom());
/// ```
#[derive(Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<dyn FieldType>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry holding the built-in types.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for builtin in BuiltinType::ALL {
            registry.register_type(builtin.name(), Arc::new(builtin));
        }
        registry
    }

    /// Creates a registry with no types at all.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Adds or replaces a custom type built from a converter and an optional
    /// default validator.
    ///
    /// Custom types never have their limit parsed; `validator` is responsible
    /// for enforcing whatever the spec's limit expression means.
    pub fn register<C>(&mut self, name: impl Into<String>, converter: C, validator: Option<Validator>)
    where
        C: Fn(&str) -> Option<FormValue> + Send + Sync + 'static,
    {
        self.register_type(
            name,
            Arc::new(CustomType {
                converter: Arc::new(converter),
                validator,
            }),
        );
    }

    /// Adds or replaces a type under `name`.
    pub fn register_type(&mut self, name: impl Into<String>, field_type: Arc<dyn FieldType>) {
        let name = name.into();
        tracing::debug!(type_name = %name, custom = field_type.is_custom(), "registered field type");
        self.types.insert(name, field_type);
    }

    /// Returns the type registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn FieldType>> {
        self.types.get(name).cloned()
    }

    /// Returns `true` if a type is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

static REGISTRY: Lazy<RwLock<TypeRegistry>> = Lazy::new(|| RwLock::new(TypeRegistry::new()));

/// Adds or replaces a custom type in the process-wide registry.
///
/// Call this during startup, before specs using the type are built and
/// before any decoding.
pub fn register_type<C>(name: impl Into<String>, converter: C, validator: Option<Validator>)
where
    C: Fn(&str) -> Option<FormValue> + Send + Sync + 'static,
{
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, converter, validator);
}

/// Looks up a type in the process-wide registry.
pub fn lookup_type(name: &str) -> Option<Arc<dyn FieldType>> {
    with_registry(|registry| registry.lookup(name))
}

/// Runs `f` with read access to the process-wide registry.
pub fn with_registry<R>(f: impl FnOnce(&TypeRegistry) -> R) -> R {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    f(&registry)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn convert(t: BuiltinType, raw: &str) -> Option<FormValue> {
        t.convert(raw, &FormSettings::default())
    }

    #[test]
    fn test_empty_input_is_zero_value() {
        assert_eq!(convert(BuiltinType::Bool, ""), Some(FormValue::Bool(false)));
        assert_eq!(convert(BuiltinType::Int, ""), Some(FormValue::Int(0)));
        assert_eq!(convert(BuiltinType::Int64, ""), Some(FormValue::Int64(0)));
        assert_eq!(convert(BuiltinType::Float, ""), Some(FormValue::Float(0.0)));
        assert_eq!(convert(BuiltinType::String, ""), Some(FormValue::from("")));
        for t in [BuiltinType::Date, BuiltinType::DateTime, BuiltinType::DateFlex] {
            assert_eq!(
                convert(t, ""),
                Some(FormValue::DateTime(FormValue::zero_date_time()))
            );
        }
    }

    #[test]
    fn test_bool_literals() {
        assert_eq!(convert(BuiltinType::Bool, "true"), Some(FormValue::Bool(true)));
        assert_eq!(convert(BuiltinType::Bool, "false"), Some(FormValue::Bool(false)));
        assert_eq!(convert(BuiltinType::Bool, "on"), None);
        assert_eq!(convert(BuiltinType::Bool, "TRUE"), None);
        assert_eq!(convert(BuiltinType::Bool, "1"), None);
    }

    #[test]
    fn test_int_bounds() {
        assert_eq!(convert(BuiltinType::Int, "23456"), Some(FormValue::Int(23456)));
        assert_eq!(convert(BuiltinType::Int, "-5"), Some(FormValue::Int(-5)));
        assert_eq!(convert(BuiltinType::Int, "2147483648"), None);
        assert_eq!(convert(BuiltinType::Int, "12abc"), None);
        assert_eq!(
            convert(BuiltinType::Int64, "20002147483647"),
            Some(FormValue::Int64(20_002_147_483_647))
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(convert(BuiltinType::Float, "2.2345"), Some(FormValue::Float(2.2345)));
        assert_eq!(convert(BuiltinType::Float, "1e3"), Some(FormValue::Float(1000.0)));
        assert_eq!(convert(BuiltinType::Float, "NaN"), None);
        assert_eq!(convert(BuiltinType::Float, "inf"), None);
        assert_eq!(convert(BuiltinType::Float, "abc"), None);
    }

    #[test]
    fn test_date_layouts() {
        for raw in [
            "2017.02.25",
            "2017.02.25.",
            "2017. 02. 25.",
            "2017.2.25",
            "2017-02-25",
            "2017 02 25",
            "20170225",
            "25.02.2017",
            "02/25/2017",
        ] {
            let value = convert(BuiltinType::Date, raw).unwrap_or_else(|| panic!("{raw}"));
            let dt = value.as_date_time().unwrap();
            assert_eq!((dt.year(), dt.month(), dt.day()), (2017, 2, 25), "{raw}");
            assert_eq!(dt.hour(), 0);
            assert_eq!(dt.offset().local_minus_utc(), 3600);
        }
    }

    #[test]
    fn test_date_rejects_time() {
        assert_eq!(convert(BuiltinType::Date, "2017.02.26 10:30"), None);
        assert_eq!(convert(BuiltinType::Date, "not a date"), None);
    }

    #[test]
    fn test_date_time_layouts() {
        let value = convert(BuiltinType::DateTime, "2017.02.26 10:30").unwrap();
        let dt = value.as_date_time().unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (26, 10, 30));
        assert_eq!(dt.to_rfc3339(), "2017-02-26T10:30:00+01:00");

        assert!(convert(BuiltinType::DateTime, "20170226103000").is_some());
        assert!(convert(BuiltinType::DateTime, "2017-02-26 10:30").is_some());
        assert_eq!(convert(BuiltinType::DateTime, "2017.02.26"), None);
    }

    #[test]
    fn test_date_flex_accepts_both() {
        let date = convert(BuiltinType::DateFlex, "2017.02.27").unwrap();
        assert_eq!(
            date.as_date_time().unwrap().to_rfc3339(),
            "2017-02-27T00:00:00+01:00"
        );
        let date_time = convert(BuiltinType::DateFlex, "2017.02.27 16:30").unwrap();
        assert_eq!(
            date_time.as_date_time().unwrap().to_rfc3339(),
            "2017-02-27T16:30:00+01:00"
        );
        assert_eq!(convert(BuiltinType::DateFlex, "yesterday"), None);
    }

    #[test]
    fn test_date_uses_configured_time_zone() {
        let settings = FormSettings {
            time_zone: "UTC".to_string(),
            ..FormSettings::default()
        };
        let value = BuiltinType::Date.convert("2017-02-25", &settings).unwrap();
        assert_eq!(
            value.as_date_time().unwrap().to_rfc3339(),
            "2017-02-25T00:00:00+00:00"
        );
    }

    #[test]
    fn test_date_with_invalid_time_zone_fails() {
        let settings = FormSettings {
            time_zone: "nowhere".to_string(),
            ..FormSettings::default()
        };
        assert_eq!(BuiltinType::Date.convert("2017-02-25", &settings), None);
        assert_eq!(
            BuiltinType::DateTime.convert("2017-02-25 16:30", &settings),
            None
        );
        // The zero date needs no offset.
        assert!(BuiltinType::Date.convert("", &settings).is_some());
    }

    #[test]
    fn test_date_uses_configured_layouts() {
        let settings = FormSettings {
            date_formats: vec!["%d/%m/%Y".to_string()],
            ..FormSettings::default()
        };
        assert!(BuiltinType::Date.convert("25/02/2017", &settings).is_some());
        assert!(BuiltinType::Date.convert("2017-02-25", &settings).is_none());
    }

    #[test]
    fn test_default_validators() {
        assert!(BuiltinType::String.default_validator().is_some());
        assert!(BuiltinType::Int.default_validator().is_some());
        assert!(BuiltinType::Int64.default_validator().is_some());
        assert!(BuiltinType::Float.default_validator().is_some());
        assert!(BuiltinType::Bool.default_validator().is_none());
        assert!(BuiltinType::Date.default_validator().is_none());
    }

    #[test]
    fn test_builtin_names() {
        for t in BuiltinType::ALL {
            assert_eq!(BuiltinType::from_name(t.name()), Some(t));
            assert!(!t.is_custom());
        }
        assert_eq!(BuiltinType::from_name("NoSuchType"), None);
    }

    #[test]
    fn test_registry_builtins() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.names(),
            vec!["bool", "date", "dateflex", "datetime", "float", "int", "int64", "string"]
        );
        assert!(registry.lookup("NoSuchType").is_none());
        assert!(TypeRegistry::empty().names().is_empty());
    }

    #[test]
    fn test_registry_register_custom() {
        let mut registry = TypeRegistry::new();
        registry.register(
            "csv",
            |raw| {
                Some(FormValue::Json(serde_json::Value::Array(
                    raw.split(',').map(|s| serde_json::json!(s)).collect(),
                )))
            },
            None,
        );
        let csv = registry.lookup("csv").unwrap();
        assert!(csv.is_custom());
        assert!(csv.default_validator().is_none());
        assert_eq!(
            csv.convert("a,b", &FormSettings::default()),
            Some(FormValue::Json(serde_json::json!(["a", "b"])))
        );
    }

    #[test]
    fn test_registry_replace_builtin_becomes_custom() {
        let mut registry = TypeRegistry::new();
        registry.register("string", |raw| Some(FormValue::from(raw.to_lowercase())), None);
        let string = registry.lookup("string").unwrap();
        assert!(string.is_custom());
        assert_eq!(
            string.convert("ABC", &FormSettings::default()),
            Some(FormValue::from("abc"))
        );
    }

    #[test]
    fn test_global_registry() {
        register_type(
            "types_test_yes_no",
            |raw| match raw {
                "yes" => Some(FormValue::Bool(true)),
                "no" | "" => Some(FormValue::Bool(false)),
                _ => None,
            },
            None,
        );
        let yes_no = lookup_type("types_test_yes_no").unwrap();
        assert_eq!(
            yes_no.convert("yes", &FormSettings::default()),
            Some(FormValue::Bool(true))
        );
        assert!(with_registry(|r| r.contains("string")));
    }
}
