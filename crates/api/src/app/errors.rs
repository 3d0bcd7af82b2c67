//! Consistent error responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crudkit_core::StoreError;

use crate::app::response::HttpResponse;

/// Generic failure path for repository errors the controller did not
/// normalize. Not-found becomes an opaque 404; everything else is a
/// 500-class fault.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => HttpResponse::not_found().into_response(),
        StoreError::Decode(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", msg),
        StoreError::Backend(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "backend_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
