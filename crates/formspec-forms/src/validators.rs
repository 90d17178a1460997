//! Default validators for the built-in types.
//!
//! Each validator enforces the spec's parsed [`Limit`], if any. Validators
//! for types without a limit-aware rule (bool and the date types) do not
//! exist; those types only convert.

use formspec_core::error::ValidationError;
use formspec_core::utils::text::glyph_length;

use crate::limits::Limit;
use crate::spec::FieldSpec;
use crate::value::FormValue;

/// Validates a string value against length, range, pattern or set limits.
///
/// Lengths are counted in glyphs, so `"Bärfuß"` has length 6 whether or
/// not its umlaut is precomposed.
pub fn validate_string(spec: &FieldSpec, value: &FormValue) -> Result<(), ValidationError> {
    let Some(s) = value.as_str() else {
        return Err(not_a(spec, value, "string"));
    };
    let Some(limit) = spec.limit() else {
        return Ok(());
    };

    match limit {
        Limit::Length(expected) => {
            if glyph_length(s) != *expected {
                return Err(spec
                    .validation_error("has the wrong length", "length")
                    .with_param("length", expected.to_string()));
            }
        }
        Limit::IntRange(min, max) => {
            let length = i64::try_from(glyph_length(s)).unwrap_or(i64::MAX);
            if length < *min {
                return Err(spec
                    .validation_error("is too short", "too_short")
                    .with_param("min", min.to_string()));
            }
            if length > *max {
                return Err(spec
                    .validation_error("is too long", "too_long")
                    .with_param("max", max.to_string()));
            }
        }
        Limit::Pattern(re) => {
            if !re.is_match(s) {
                return Err(spec
                    .validation_error("has the wrong format", "format")
                    .with_param("pattern", re.as_str()));
            }
        }
        Limit::Strings(accepted) => {
            if !accepted.iter().any(|a| a == s) {
                return Err(spec.validation_error("has the wrong value", "choice"));
            }
        }
        Limit::FloatRange(..) | Limit::Ints(_) => {}
    }
    Ok(())
}

/// Validates an `int` or `int64` value against length, range or set limits.
///
/// Length counts the characters of the decimal form, including a minus sign.
pub fn validate_integer(spec: &FieldSpec, value: &FormValue) -> Result<(), ValidationError> {
    let Some(i) = value.as_i64() else {
        return Err(not_a(spec, value, "integer"));
    };
    let Some(limit) = spec.limit() else {
        return Ok(());
    };

    match limit {
        Limit::Length(expected) => {
            if i.to_string().len() != *expected {
                return Err(spec
                    .validation_error("has the wrong length", "length")
                    .with_param("length", expected.to_string()));
            }
        }
        Limit::IntRange(min, max) => check_range(spec, i, *min, *max)?,
        Limit::Ints(accepted) => {
            if !accepted.contains(&i) {
                return Err(spec.validation_error("has the wrong value", "choice"));
            }
        }
        Limit::FloatRange(..) | Limit::Strings(_) | Limit::Pattern(_) => {}
    }
    Ok(())
}

/// Validates a float value against an integer or float range.
#[allow(clippy::cast_precision_loss)]
pub fn validate_float(spec: &FieldSpec, value: &FormValue) -> Result<(), ValidationError> {
    let Some(f) = value.as_f64() else {
        return Err(not_a(spec, value, "float"));
    };
    match spec.limit() {
        Some(Limit::IntRange(min, max)) => check_range(spec, f, *min as f64, *max as f64),
        Some(Limit::FloatRange(min, max)) => check_range(spec, f, *min, *max),
        _ => Ok(()),
    }
}

fn check_range<T>(spec: &FieldSpec, value: T, min: T, max: T) -> Result<(), ValidationError>
where
    T: PartialOrd + ToString,
{
    if value < min {
        return Err(spec
            .validation_error("is too low", "too_low")
            .with_param("min", min.to_string()));
    }
    if value > max {
        return Err(spec
            .validation_error("is too high", "too_high")
            .with_param("max", max.to_string()));
    }
    Ok(())
}

fn not_a(spec: &FieldSpec, value: &FormValue, expected: &str) -> ValidationError {
    spec.validation_error(&format!("is not a {expected}"), "invalid")
        .with_param("kind", value.kind())
}
