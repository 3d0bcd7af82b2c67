//! Response descriptor produced by the controller.

use axum::http::header::{HeaderName, HeaderValue, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// The controller's output: status code, optional JSON body, optional
/// headers. Constructed fresh per request and consumed exactly once by the
/// router's adaptation into a framework response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub headers: Vec<(HeaderName, String)>,
}

impl HttpResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    pub fn created(body: Value, location: String) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Some(body),
            headers: vec![(LOCATION, location)],
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Opaque not-found: status only, no detail.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: None,
            headers: Vec::new(),
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, axum::Json(body)).into_response(),
            None => self.status.into_response(),
        };

        for (name, value) in self.headers {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    response.headers_mut().insert(name, value);
                }
                Err(_) => {
                    tracing::warn!(header = %name, "dropping header with invalid value");
                }
            }
        }
        response
    }
}
