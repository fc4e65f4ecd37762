use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{parser, pipeline};

pub async fn receive(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    let raw_data = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body)
            .await
            .map_err(AppError::BadBody)?
    } else {
        parser::parse_body(content_type, &body, query.as_deref()).map_err(AppError::BadBody)?
    };

    let result = pipeline::run(&state.extractor, state.store.as_ref(), raw_data).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "saved",
            "data": result.submission,
        })),
    )
        .into_response())
}

pub async fn liveness() -> Json<serde_json::Value> {
    Json(json!({ "message": "ok" }))
}
