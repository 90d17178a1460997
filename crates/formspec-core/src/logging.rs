//! Logging integration for formspec.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`FormSettings`](crate::settings::FormSettings) and for creating
//! per-decode spans.

use crate::settings::FormSettings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info",
/// "warn", "error"). In debug mode a pretty, human-readable format is used;
/// otherwise a structured JSON format is used.
///
/// Installing a subscriber twice is a no-op.
pub fn setup_logging(settings: &FormSettings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one decode pass over `field_count` specs.
///
/// # Examples
///
/// ```
/// use formspec_core::logging::decode_span;
///
/// let span = decode_span(3);
/// let _guard = span.enter();
/// tracing::debug!("decoding");
/// ```
pub fn decode_span(field_count: usize) -> tracing::Span {
    tracing::debug_span!("decode_form", fields = field_count)
}
