use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitekeep_common::PayloadError;

/// Every way a request can fail. Each maps to one status and message.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Unauthorized,
    BadRequest(PayloadError),
    ReadFailed(anyhow::Error),
    WriteFailed(anyhow::Error),
}

impl From<PayloadError> for ApiError {
    fn from(e: PayloadError) -> Self {
        ApiError::BadRequest(e)
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => message(StatusCode::NOT_FOUND, "Site data not found."),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::BadRequest(e) => message(StatusCode::BAD_REQUEST, &e.to_string()),
            ApiError::ReadFailed(e) => {
                tracing::error!("reading site data failed: {e:#}");
                message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read site data.")
            }
            ApiError::WriteFailed(e) => {
                tracing::error!("persisting site data failed: {e:#}");
                message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to persist site data.",
                )
            }
        }
    }
}
