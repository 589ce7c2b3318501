use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use sitekeep_common::{API_KEY_HEADER, validate_payload};

use crate::AppState;
use crate::error::ApiError;

/// The configured key must be non-blank and match the header exactly.
pub(crate) fn credential_matches(configured: &str, supplied: Option<&HeaderValue>) -> bool {
    if configured.trim().is_empty() {
        return false;
    }
    supplied
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == configured)
}

/// `GET /api/site`: the stored bytes, untouched.
pub async fn get_site(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = state
        .repository
        .fetch()
        .await
        .map_err(ApiError::ReadFailed)?
        .ok_or(ApiError::NotFound)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}

/// `POST /api/site`: key check, body validation, then an atomic replace
/// with the exact bytes received.
pub async fn replace_site(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if !credential_matches(&state.api_key, headers.get(API_KEY_HEADER)) {
        tracing::warn!(
            key_present = headers.contains_key(API_KEY_HEADER),
            "rejected site write: credential mismatch"
        );
        return Err(ApiError::Unauthorized);
    }

    if let Err(e) = validate_payload(&body) {
        tracing::warn!(reason = %e, "rejected site write");
        return Err(e.into());
    }

    state
        .repository
        .replace(&body)
        .await
        .map_err(ApiError::WriteFailed)?;
    tracing::info!(bytes = body.len(), "site data replaced");

    Ok(Json(json!({ "ok": true })))
}
