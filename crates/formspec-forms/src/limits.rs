//! The limit mini-language.
//!
//! A limit expression is a compact string attached to a field spec that
//! describes one validation constraint:
//!
//! | Expression | Meaning | Types |
//! |---|---|---|
//! | `"123"` | exact length | string, int, int64 |
//! | `"1-10"` | inclusive range of value (numbers) or length (strings) | string, int, int64, float |
//! | `"0.5-2.5"` | inclusive float range | float |
//! | `"a,b,c"` | set of accepted strings | string |
//! | `"1,3,5"` | set of accepted integers | int, int64 |
//! | `"re:^\w\d+$"` | regular expression | string |
//!
//! Parsing happens once, when the spec is initialized. A malformed
//! expression is a configuration error.

use std::sync::OnceLock;

use regex::Regex;

use formspec_core::error::{FormspecError, FormspecResult};

/// A parsed limit expression. A spec carries at most one.
#[derive(Debug, Clone)]
pub enum Limit {
    /// Exact length: glyphs for strings, decimal digits for integers.
    Length(usize),
    /// Inclusive integer range; a length range for strings.
    IntRange(i64, i64),
    /// Inclusive float range.
    FloatRange(f64, f64),
    /// Accepted string values.
    Strings(Vec<String>),
    /// Accepted integer values.
    Ints(Vec<i64>),
    /// A pattern the whole string value must match somewhere.
    Pattern(Regex),
}

impl Limit {
    /// Parses `expr` as a limit for a field of built-in type `type_name`.
    ///
    /// Returns `Ok(None)` for an empty expression. Rules are tried in a
    /// fixed order: pattern, exact length, integer range, float range,
    /// value list.
    ///
    /// # Examples
    ///
    /// ```
    /// use formspec_forms::limits::Limit;
    ///
    /// let limit = Limit::parse("int", "0-100").unwrap();
    /// assert!(matches!(limit, Some(Limit::IntRange(0, 100))));
    ///
    /// assert!(Limit::parse("int", "100-0").is_err());
    /// assert!(Limit::parse("string", "").unwrap().is_none());
    /// ```
    pub fn parse(type_name: &str, expr: &str) -> FormspecResult<Option<Self>> {
        if expr.is_empty() {
            return Ok(None);
        }

        if let Some(pattern) = expr.strip_prefix("re:") {
            let re = Regex::new(pattern).map_err(|e| invalid(expr, format!("bad pattern: {e}")))?;
            return Ok(Some(Self::Pattern(re)));
        }

        if length_re().is_match(expr) {
            if !matches!(type_name, "string" | "int" | "int64") {
                return Err(mismatch(expr, type_name));
            }
            let length = expr
                .parse::<i32>()
                .ok()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid(expr, "length out of range"))?;
            return Ok(Some(Self::Length(length)));
        }

        if let Some(caps) = int_range_re().captures(expr) {
            let wide = matches!(type_name, "int64" | "float");
            let lower = parse_bound(expr, &caps[1], wide)?;
            let upper = parse_bound(expr, &caps[2], wide)?;
            if upper < lower {
                return Err(invalid(expr, "upper < lower"));
            }
            return Ok(Some(Self::IntRange(lower, upper)));
        }

        if let Some(caps) = float_range_re().captures(expr) {
            if type_name != "float" {
                return Err(mismatch(expr, type_name));
            }
            let lower: f64 = caps[1]
                .parse()
                .map_err(|e| invalid(expr, format!("bad float: {e}")))?;
            let upper: f64 = caps[2]
                .parse()
                .map_err(|e| invalid(expr, format!("bad float: {e}")))?;
            if upper < lower {
                return Err(invalid(expr, "upper < lower"));
            }
            return Ok(Some(Self::FloatRange(lower, upper)));
        }

        let items: Vec<&str> = expr.split(',').collect();
        if items.iter().any(|item| item.is_empty()) {
            return Err(invalid(expr, "unknown limit"));
        }
        match type_name {
            "string" => Ok(Some(Self::Strings(
                items.into_iter().map(ToString::to_string).collect(),
            ))),
            "int" | "int64" => {
                let ints = items
                    .into_iter()
                    .map(|item| {
                        item.parse::<i64>()
                            .map_err(|e| invalid(expr, format!("bad integer in list: {e}")))
                    })
                    .collect::<FormspecResult<Vec<_>>>()?;
                Ok(Some(Self::Ints(ints)))
            }
            _ => Err(mismatch(expr, type_name)),
        }
    }
}

fn parse_bound(expr: &str, digits: &str, wide: bool) -> FormspecResult<i64> {
    let parsed = if wide {
        digits.parse::<i64>()
    } else {
        digits.parse::<i32>().map(i64::from)
    };
    parsed.map_err(|e| invalid(expr, format!("bad range bound: {e}")))
}

fn invalid(expr: &str, reason: impl Into<String>) -> FormspecError {
    FormspecError::InvalidLimit {
        limit: expr.to_string(),
        reason: reason.into(),
    }
}

fn mismatch(expr: &str, type_name: &str) -> FormspecError {
    FormspecError::LimitTypeMismatch {
        limit: expr.to_string(),
        type_name: type_name.to_string(),
    }
}

fn length_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[1-9][0-9]*$").expect("valid regex"))
}

fn int_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+)-([0-9]+)$").expect("valid regex"))
}

fn float_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]*\.[0-9]+)-([0-9]*\.[0-9]+)$").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(type_name: &str, expr: &str) -> Limit {
        Limit::parse(type_name, expr)
            .unwrap()
            .expect("limit should be present")
    }

    #[test]
    fn test_empty_is_unconstrained() {
        assert!(Limit::parse("string", "").unwrap().is_none());
        assert!(Limit::parse("bool", "").unwrap().is_none());
    }

    #[test]
    fn test_pattern() {
        let Limit::Pattern(re) = parse("string", r"re:^\w\d+$") else {
            panic!("expected pattern");
        };
        assert!(re.is_match("a12"));
        assert!(!re.is_match("12a"));
    }

    #[test]
    fn test_pattern_wins_over_other_shapes() {
        assert!(matches!(parse("string", "re:1,2"), Limit::Pattern(_)));
        assert!(matches!(parse("int", "re:5"), Limit::Pattern(_)));
    }

    #[test]
    fn test_bad_pattern() {
        let err = Limit::parse("string", "re:(unclosed").unwrap_err();
        assert!(matches!(err, FormspecError::InvalidLimit { .. }));
        assert!(err.to_string().contains("bad pattern"));
    }

    #[test]
    fn test_length() {
        assert!(matches!(parse("string", "6"), Limit::Length(6)));
        assert!(matches!(parse("int", "3"), Limit::Length(3)));
        assert!(matches!(parse("int64", "12"), Limit::Length(12)));
    }

    #[test]
    fn test_length_wrong_type() {
        for type_name in ["float", "bool", "date"] {
            let err = Limit::parse(type_name, "8").unwrap_err();
            assert!(matches!(err, FormspecError::LimitTypeMismatch { .. }));
        }
    }

    #[test]
    fn test_leading_zero_is_not_a_length() {
        // "06" fails the length rule and falls through to a one-item list.
        assert!(matches!(parse("int", "06"), Limit::Ints(ref v) if v == &[6]));
    }

    #[test]
    fn test_int_range() {
        assert!(matches!(parse("int", "0-100"), Limit::IntRange(0, 100)));
        assert!(matches!(parse("string", "1-10"), Limit::IntRange(1, 10)));
        assert!(matches!(parse("float", "1-10"), Limit::IntRange(1, 10)));
        assert!(matches!(parse("int", "5-5"), Limit::IntRange(5, 5)));
    }

    #[test]
    fn test_int_range_upper_below_lower() {
        let err = Limit::parse("int", "10-1").unwrap_err();
        assert!(err.to_string().contains("upper < lower"));
    }

    #[test]
    fn test_int_range_bit_width() {
        assert!(Limit::parse("int", "0-3000000000").is_err());
        assert!(Limit::parse("string", "0-3000000000").is_err());
        assert!(matches!(
            parse("int64", "0-3000000000"),
            Limit::IntRange(0, 3_000_000_000)
        ));
        assert!(matches!(
            parse("float", "0-3000000000"),
            Limit::IntRange(0, 3_000_000_000)
        ));
    }

    #[test]
    fn test_float_range() {
        let Limit::FloatRange(lo, hi) = parse("float", "0.5-2.25") else {
            panic!("expected float range");
        };
        assert!((lo - 0.5).abs() < f64::EPSILON);
        assert!((hi - 2.25).abs() < f64::EPSILON);
        assert!(matches!(parse("float", ".5-1.0"), Limit::FloatRange(..)));
    }

    #[test]
    fn test_float_range_errors() {
        assert!(matches!(
            Limit::parse("int", "0.5-2.5").unwrap_err(),
            FormspecError::LimitTypeMismatch { .. }
        ));
        assert!(Limit::parse("float", "2.5-0.5").is_err());
    }

    #[test]
    fn test_string_list() {
        let Limit::Strings(items) = parse("string", "a,b,c") else {
            panic!("expected string list");
        };
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_item_list() {
        assert!(matches!(parse("string", "x=20"), Limit::Strings(ref v) if v.len() == 1));
    }

    #[test]
    fn test_int_list() {
        assert!(matches!(parse("int", "1,3,5"), Limit::Ints(ref v) if v == &[1, 3, 5]));
        assert!(matches!(parse("int64", "-1,0"), Limit::Ints(ref v) if v == &[-1, 0]));
    }

    #[test]
    fn test_int_list_bad_entry() {
        let err = Limit::parse("int", "1,two,3").unwrap_err();
        assert!(err.to_string().contains("bad integer in list"));
    }

    #[test]
    fn test_list_wrong_type() {
        for type_name in ["float", "bool", "date", "datetime", "dateflex"] {
            assert!(Limit::parse(type_name, "a,b").is_err());
        }
    }

    #[test]
    fn test_unknown_limit() {
        let err = Limit::parse("string", "a,,b").unwrap_err();
        assert!(err.to_string().contains("unknown limit"));
        assert!(Limit::parse("string", "a,").is_err());
    }
}
