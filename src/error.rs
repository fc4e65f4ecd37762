use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::models::NormalizedSubmission;
use crate::submission::validator::FieldErrorSet;

/// Any failure of the persistence gateway. There is no differentiated
/// recovery, so only the diagnostic survives.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::new(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadBody(String),
    #[error("Incomplete data: missing {:?}", .missing.missing())]
    Incomplete {
        received: NormalizedSubmission,
        missing: FieldErrorSet,
    },
    #[error("Store Error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadBody(details) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({ "error": "invalid body", "details": details })),
            )
                .into_response(),
            AppError::Incomplete { received, missing } => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "incomplete data",
                    "received": received,
                    "missingFields": missing,
                })),
            )
                .into_response(),
            AppError::Store(err) => server_error(err.message),
        }
    }
}

/// The 500 body shared by store failures and caught panics.
pub fn server_error(details: impl Into<String>) -> Response {
    let body = json!({ "error": "server error", "details": details.into() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
