//! HTTP application wiring (axum router + backend selection).
//!
//! Structure:
//! - `controller.rs`: the five CRUD flows + not-found normalization
//! - `router.rs`: route descriptors + adaptation into axum routes
//! - `validate.rs`: the validator contract and schema compilation
//! - `response.rs`: the controller's response descriptor
//! - `errors.rs`: consistent error responses
//! - `widgets.rs`: the demo resource

use std::str::FromStr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crudkit_core::CrudRepository;
use crudkit_store::{DocumentRepository, MemoryCollection, MemoryIndex, SearchRepository};

pub mod controller;
pub mod errors;
pub mod response;
pub mod router;
pub mod validate;
pub mod widgets;

use controller::CrudController;
use router::CrudRoutes;
use widgets::{Widget, WidgetFactory, WidgetValidator};

/// Which storage realization backs the resource. The HTTP surface is
/// identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Document,
    Search,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "search" => Ok(Self::Search),
            other => Err(format!("unknown backend '{other}' (expected document|search)")),
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(backend: StoreBackend, require_auth: bool) -> anyhow::Result<Router> {
    let repository: Arc<dyn CrudRepository<Widget>> = match backend {
        StoreBackend::Document => Arc::new(DocumentRepository::new(
            Arc::new(MemoryCollection::new()),
            WidgetFactory,
        )),
        StoreBackend::Search => Arc::new(SearchRepository::new(
            Arc::new(MemoryIndex::new("widgets")),
            WidgetFactory,
        )),
    };

    let controller = Arc::new(CrudController::new(
        repository,
        Arc::new(WidgetFactory),
        "widgets",
    ));
    let routes = CrudRoutes::new(controller, &WidgetValidator, require_auth)?;

    // Snapshot the descriptor catalog for the docs pass-through before the
    // routes are consumed by the framework adaptation.
    let docs = Value::Array(
        routes
            .descriptors()
            .iter()
            .map(router::RouteDescriptor::to_json)
            .collect(),
    );

    tracing::info!(?backend, require_auth, resource = "widgets", "app wired");

    Ok(Router::new()
        .route("/health", get(health))
        .route(
            "/docs",
            get(move || {
                let docs = docs.clone();
                async move { Json(docs) }
            }),
        )
        .nest("/widgets", routes.into_router()))
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
