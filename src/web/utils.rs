//! Shared response helpers for the web layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::store::StoreError;

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, axum::Json(body)).into_response()
}

/// 500 response carrying the storage failure text.
pub fn internal_error(err: &StoreError) -> Response {
    tracing::error!("storage failure: {err}");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Internal Server Error: {err}"),
    )
}

/// 200 response with a JSON body.
pub fn ok_json(body: serde_json::Value) -> Response {
    (StatusCode::OK, axum::Json(body)).into_response()
}
