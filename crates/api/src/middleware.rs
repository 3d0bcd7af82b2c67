use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::json;

/// State for the auth gate: the compiled shared header schema.
///
/// Token verification itself is an external collaborator; this layer only
/// gates on credential presence.
#[derive(Clone)]
pub struct AuthState {
    pub header_schema: Arc<jsonschema::Validator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let headers_doc = headers_to_json(req.headers());
    if !state.header_schema.is_valid(&headers_doc) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = extract_bearer(req.headers())?;
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}

/// Project the header map into the JSON shape the shared schema checks.
fn headers_to_json(headers: &HeaderMap) -> serde_json::Value {
    let mut doc = serde_json::Map::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            doc.insert(name.as_str().to_string(), json!(value));
        }
    }
    serde_json::Value::Object(doc)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(header.trim())
}
