//! The Flubber form: record, field specs, and HTTP handlers.

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use formspec_core::utils::QueryDict;
use formspec_core::{FormspecError, FormspecResult};
use formspec_forms::{Decoder, FieldSpec};

/// Usage text served on `GET /`.
pub const USAGE: &str = "POST to describe some Flubber.\n";

/// A described Flubber.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flubber {
    pub variant: String,
    pub size: i32,
    pub strength: f64,
}

/// Builds the field specs for [`Flubber`].
pub fn flubber_specs() -> FormspecResult<Vec<FieldSpec>> {
    Ok(vec![
        FieldSpec::required("variant", "string")
            .limit("4")
            .name("The 4-letter variant")
            .init()?,
        FieldSpec::required("size", "int")
            .limit("1-4")
            .name("The size (1-4)")
            .init()?,
        FieldSpec::optional("strength", "float")
            .name("Flubber strength")
            .init()?,
    ])
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    specs: Arc<Vec<FieldSpec>>,
    decoder: Arc<Decoder>,
}

impl AppState {
    /// Builds the specs and a decoder over the global settings.
    pub fn new() -> FormspecResult<Self> {
        Ok(Self {
            specs: Arc::new(flubber_specs()?),
            decoder: Arc::new(Decoder::default()),
        })
    }
}

/// Creates the demo router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(usage).post(describe))
        .with_state(state)
}

async fn usage() -> &'static str {
    USAGE
}

async fn describe(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: String,
) -> (StatusCode, String) {
    let form = form_values(&body, query.as_deref());

    let mut flubber = Flubber::default();
    match state.decoder.decode(&form, &state.specs, &mut flubber) {
        Ok(()) => {
            tracing::info!(variant = %flubber.variant, size = flubber.size, "described flubber");
            (
                StatusCode::OK,
                format!(
                    "Flubber {}: size {}, strength {:.2}\n",
                    flubber.variant, flubber.size, flubber.strength
                ),
            )
        }
        Err(FormspecError::Validation(errors)) => {
            tracing::info!(errors = errors.len(), "rejected flubber");
            (StatusCode::BAD_REQUEST, format!("{errors}\n"))
        }
        Err(err) => {
            tracing::error!(error = %err, "flubber decoding is misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error\n".to_string(),
            )
        }
    }
}

/// Merges the urlencoded body with the query string. Body values come
/// first, so they win for keys present in both.
fn form_values(body: &str, query: Option<&str>) -> QueryDict {
    let mut form = QueryDict::parse(body);
    if let Some(query) = query {
        let query = QueryDict::parse(query);
        for key in query.keys() {
            for value in query.get_list(key).unwrap_or_default() {
                form.append(key.clone(), value.clone());
            }
        }
    }
    form
}
