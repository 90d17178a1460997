//! Settings for form decoding.
//!
//! This module provides the [`FormSettings`] struct, which holds the values
//! every decode pass reads (whitespace trimming, the time zone for date
//! input, the accepted date layouts) plus logging options, and
//! [`LazySettings`], a globally-accessible, configure-once container.

use std::sync::OnceLock;

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{FormspecError, FormspecResult};

/// Calendar-date layouts accepted by default, in priority order.
///
/// These use chrono's strftime syntax. Numeric fields accept one or two
/// digits when parsing, so `%m` also matches an unpadded month.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y. %m. %d.",
    "%Y. %m. %d",
    "%Y.%m.%d.",
    "%Y.%m.%d",
    "%Y-%m-%d",
    "%Y %m %d",
    "%Y%m%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
];

/// Date-time layouts accepted by default, in priority order.
///
/// All require a time of day, to minute precision.
pub const DEFAULT_DATE_TIME_FORMATS: &[&str] = &[
    "%Y. %m. %d. %H:%M",
    "%Y. %m. %d %H:%M",
    "%Y.%m.%d. %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y-%m-%d %H:%M",
    "%Y %m %d %H:%M",
    "%Y%m%d%H%M%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Settings read by the decode engine and the logging setup.
///
/// # Examples
///
/// ```
/// use formspec_core::settings::FormSettings;
///
/// let settings = FormSettings::default();
/// assert!(settings.trim_whitespace);
/// assert_eq!(settings.time_zone, "+01:00");
/// assert_eq!(settings.time_zone_offset().unwrap().local_minus_utc(), 3600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    // ── Decoding ─────────────────────────────────────────────────────

    /// Whether raw form values are whitespace-trimmed before processing.
    pub trim_whitespace: bool,
    /// The fixed time zone for all date input: "UTC", "Z", "+HH:MM" or "+HHMM".
    pub time_zone: String,
    /// Accepted calendar-date layouts, tried in order.
    pub date_formats: Vec<String>,
    /// Accepted date-time layouts, tried in order.
    pub date_time_formats: Vec<String>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,
    /// Whether to use human-readable instead of JSON log output.
    pub debug: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            trim_whitespace: true,
            // CET, standard time.
            time_zone: "+01:00".to_string(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(ToString::to_string).collect(),
            date_time_formats: DEFAULT_DATE_TIME_FORMATS
                .iter()
                .map(ToString::to_string)
                .collect(),
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

impl FormSettings {
    /// Parses [`time_zone`](Self::time_zone) into a fixed offset.
    pub fn time_zone_offset(&self) -> FormspecResult<FixedOffset> {
        parse_offset(&self.time_zone).ok_or_else(|| {
            FormspecError::Configuration(format!("Invalid time zone: '{}'", self.time_zone))
        })
    }

    /// Checks that the settings are usable for decoding.
    pub fn validate(&self) -> FormspecResult<()> {
        self.time_zone_offset()?;
        if self.date_formats.is_empty() {
            return Err(FormspecError::Configuration(
                "date_formats must not be empty".to_string(),
            ));
        }
        if self.date_time_formats.is_empty() {
            return Err(FormspecError::Configuration(
                "date_time_formats must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accepts "UTC", "Z" or a whole `%z` offset (`+01:00`, `-0530`).
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("utc") || s == "Z" {
        return FixedOffset::east_opt(0);
    }
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, s, StrftimeItems::new("%z")).ok()?;
    parsed.to_fixed_offset().ok()
}

/// A globally-accessible settings container, configured at most once.
///
/// Unlike a plain static, reading before configuring is allowed and yields
/// the defaults; configuring after the first read is rejected so that every
/// decode pass in a process sees the same settings.
pub struct LazySettings {
    inner: OnceLock<FormSettings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Validates and installs the settings.
    ///
    /// Fails if the settings are invalid or if settings were already
    /// configured or read.
    pub fn configure(&self, settings: FormSettings) -> FormspecResult<()> {
        settings.validate()?;
        self.inner.set(settings).map_err(|_| {
            FormspecError::Configuration("Settings have already been configured".to_string())
        })?;
        tracing::debug!("form settings configured");
        Ok(())
    }

    /// Returns the configured settings, or the defaults if none were set.
    pub fn get(&self) -> &FormSettings {
        self.inner.get_or_init(FormSettings::default)
    }

    /// Returns `true` if settings have been configured or read.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `FORM_SETTINGS.configure(settings)` once at application startup,
/// before the first decode.
pub static FORM_SETTINGS: LazySettings = LazySettings::new();
