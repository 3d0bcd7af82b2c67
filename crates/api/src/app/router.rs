//! Route descriptors + conversion into the framework router.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crudkit_core::{Entity, StoreResult};

use crate::app::controller::CrudController;
use crate::app::response::HttpResponse;
use crate::app::validate::{self, CrudValidator};
use crate::app::errors;
use crate::middleware::{self, AuthState};

/// One CRUD route, built once at startup and immutable for the process
/// lifetime. The description/notes/responses catalog is purely descriptive,
/// consumed by an external API-documentation generator.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub method: Method,
    pub path: String,
    pub auth_required: bool,
    pub description: String,
    pub notes: String,
    pub responses: Vec<(StatusCode, &'static str)>,
}

impl RouteDescriptor {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "method": self.method.as_str(),
            "path": self.path,
            "auth_required": self.auth_required,
            "description": self.description,
            "notes": self.notes,
            "responses": self.responses
                .iter()
                .map(|(code, text)| serde_json::json!({ "code": code.as_u16(), "description": text }))
                .collect::<Vec<_>>(),
        })
    }
}

/// The five CRUD routes for one resource: descriptors plus the compiled
/// validation schemas, convertible into an axum router.
pub struct CrudRoutes<T: Entity> {
    controller: Arc<CrudController<T>>,
    auth_required: bool,
    descriptors: Vec<RouteDescriptor>,
    create_schema: jsonschema::Validator,
    update_schema: jsonschema::Validator,
    id_schema: jsonschema::Validator,
    auth_schema: Arc<jsonschema::Validator>,
}

impl<T: Entity> CrudRoutes<T> {
    /// Compile the resource's validation schemas and build the route
    /// descriptors. Fails fast at startup on a malformed schema.
    pub fn new(
        controller: Arc<CrudController<T>>,
        validator: &dyn CrudValidator,
        auth_required: bool,
    ) -> anyhow::Result<Self> {
        let resource = controller.resource().to_string();
        Ok(Self {
            controller,
            auth_required,
            descriptors: descriptors(&resource, auth_required),
            create_schema: validate::compile(&validator.payload_create_schema())?,
            update_schema: validate::compile(&validator.payload_update_schema())?,
            id_schema: validate::compile(&validator.params_id_schema())?,
            auth_schema: Arc::new(validate::compile(&validate::auth_header_schema())?),
        })
    }

    pub fn descriptors(&self) -> &[RouteDescriptor] {
        &self.descriptors
    }

    /// Adapt the descriptors into framework routes. Handlers extract the
    /// path parameter and/or body, run the schema checks, call the matching
    /// controller method, and translate its response descriptor.
    pub fn into_router(self) -> Router {
        let auth_required = self.auth_required;
        let auth_schema = self.auth_schema.clone();
        let shared = Arc::new(self);

        let list = {
            let s = shared.clone();
            move || {
                let s = s.clone();
                async move { s.list().await }
            }
        };
        let create = {
            let s = shared.clone();
            move |Json(body): Json<Value>| {
                let s = s.clone();
                async move { s.create(body).await }
            }
        };
        let get_id = {
            let s = shared.clone();
            move |Path(id): Path<String>| {
                let s = s.clone();
                async move { s.get_id(&id).await }
            }
        };
        let put_id = {
            let s = shared.clone();
            move |Path(id): Path<String>, Json(body): Json<Value>| {
                let s = s.clone();
                async move { s.replace(&id, body).await }
            }
        };
        let delete_id = {
            let s = shared.clone();
            move |Path(id): Path<String>| {
                let s = s.clone();
                async move { s.remove(&id).await }
            }
        };

        let router = Router::new()
            .route("/", get(list).post(create))
            .route("/:id", get(get_id).put(put_id).delete(delete_id));

        if auth_required {
            router.layer(axum::middleware::from_fn_with_state(
                AuthState {
                    header_schema: auth_schema,
                },
                middleware::auth_middleware,
            ))
        } else {
            router
        }
    }

    async fn list(&self) -> Response {
        respond(self.controller.handle_get().await)
    }

    async fn create(&self, body: Value) -> Response {
        if !self.create_schema.is_valid(&body) {
            return invalid("payload does not match the create schema");
        }
        respond(self.controller.handle_post(body).await)
    }

    async fn get_id(&self, id: &str) -> Response {
        if let Some(rejection) = self.check_id(id) {
            return rejection;
        }
        respond(self.controller.handle_get_id(id).await)
    }

    async fn replace(&self, id: &str, body: Value) -> Response {
        if let Some(rejection) = self.check_id(id) {
            return rejection;
        }
        if !self.update_schema.is_valid(&body) {
            return invalid("payload does not match the update schema");
        }
        respond(self.controller.handle_put(id, body).await)
    }

    async fn remove(&self, id: &str) -> Response {
        if let Some(rejection) = self.check_id(id) {
            return rejection;
        }
        respond(self.controller.handle_delete(id).await)
    }

    fn check_id(&self, id: &str) -> Option<Response> {
        if self.id_schema.is_valid(&Value::String(id.to_string())) {
            None
        } else {
            Some(invalid("id does not match the identifier schema"))
        }
    }
}

fn respond(result: StoreResult<HttpResponse>) -> Response {
    match result {
        Ok(response) => response.into_response(),
        Err(err) => errors::store_error_to_response(err),
    }
}

fn invalid(message: &'static str) -> Response {
    errors::json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Descriptor catalog for one resource, mirroring the response-code tables
/// the docs generator publishes.
fn descriptors(resource: &str, auth_required: bool) -> Vec<RouteDescriptor> {
    let one = singular(resource);
    vec![
        RouteDescriptor {
            method: Method::GET,
            path: format!("/{resource}"),
            auth_required,
            description: format!("GET {resource}"),
            notes: format!("Retrieve all {resource}"),
            responses: vec![
                (StatusCode::OK, "OK"),
                (StatusCode::BAD_REQUEST, "Bad Request"),
            ],
        },
        RouteDescriptor {
            method: Method::GET,
            path: format!("/{resource}/{{id}}"),
            auth_required,
            description: format!("GET {one}"),
            notes: format!("Retrieve {one} by id"),
            responses: vec![
                (StatusCode::OK, "OK"),
                (StatusCode::BAD_REQUEST, "Bad Request"),
                (StatusCode::NOT_FOUND, "Not Found"),
            ],
        },
        RouteDescriptor {
            method: Method::POST,
            path: format!("/{resource}"),
            auth_required,
            description: format!("POST {one}"),
            notes: format!("Create a new {one} with a valid payload"),
            responses: vec![
                (StatusCode::CREATED, "Created"),
                (StatusCode::BAD_REQUEST, "Bad Request"),
            ],
        },
        RouteDescriptor {
            method: Method::PUT,
            path: format!("/{resource}/{{id}}"),
            auth_required,
            description: format!("PUT {one}"),
            notes: format!("Update a {one} idempotently with a valid payload and id"),
            responses: vec![
                (StatusCode::NO_CONTENT, "No Content"),
                (StatusCode::BAD_REQUEST, "Bad Request"),
                (StatusCode::NOT_FOUND, "Not Found"),
            ],
        },
        RouteDescriptor {
            method: Method::DELETE,
            path: format!("/{resource}/{{id}}"),
            auth_required,
            description: format!("DELETE {one}"),
            notes: format!("Delete a {one} idempotently with a valid id"),
            responses: vec![
                (StatusCode::NO_CONTENT, "No Content"),
                (StatusCode::BAD_REQUEST, "Bad Request"),
                (StatusCode::NOT_FOUND, "Not Found"),
            ],
        },
    ]
}

fn singular(resource: &str) -> &str {
    resource.strip_suffix('s').unwrap_or(resource)
}
