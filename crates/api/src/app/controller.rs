//! Generic CRUD controller: one instance per resource, no shared mutable
//! state across requests.

use std::sync::Arc;

use serde_json::Value;

use crudkit_core::{CrudRepository, Entity, Factory, StoreError, StoreResult};

use crate::app::response::HttpResponse;

/// Orchestrates one logical resource: calls the repository, converts results
/// through the factory, normalizes not-found conditions, and builds a
/// response descriptor. Collaborators are injected at construction;
/// composition, no inheritance.
pub struct CrudController<T: Entity> {
    repository: Arc<dyn CrudRepository<T>>,
    factory: Arc<dyn Factory<T>>,
    resource: String,
}

impl<T: Entity> CrudController<T> {
    pub fn new(
        repository: Arc<dyn CrudRepository<T>>,
        factory: Arc<dyn Factory<T>>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            factory,
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// List: `200` with the full collection as transport objects.
    pub async fn handle_get(&self) -> StoreResult<HttpResponse> {
        let items = self.repository.read_all().await?;
        let body = items
            .iter()
            .map(|item| self.factory.make_object(item))
            .collect();
        Ok(HttpResponse::ok(Value::Array(body)))
    }

    /// Get-by-id: `200` with the transport object, or an opaque `404`.
    pub async fn handle_get_id(&self, id: &str) -> StoreResult<HttpResponse> {
        match self.repository.read_one(id).await {
            Ok(item) => Ok(HttpResponse::ok(self.factory.make_object(&item))),
            Err(e) if e.is_not_found() => Ok(HttpResponse::not_found()),
            Err(e) => Err(e),
        }
    }

    /// Create: `201` with the stored transport object and a `Location`
    /// header derived from the resource name and the assigned identifier —
    /// never from caller-supplied input.
    pub async fn handle_post(&self, payload: Value) -> StoreResult<HttpResponse> {
        let item = self.factory.make_entity(payload)?;
        let created = self.repository.create_one(item).await?;

        let location = match created.id() {
            Some(id) if !id.is_empty() => format!("/{}/{}", self.resource, id),
            _ => return Err(StoreError::backend("create returned a record without an identifier")),
        };

        Ok(HttpResponse::created(
            self.factory.make_object(&created),
            location,
        ))
    }

    /// Replace: existence check first, so an update against a nonexistent id
    /// is rejected before any write is attempted; then `204`, no body.
    pub async fn handle_put(&self, id: &str, payload: Value) -> StoreResult<HttpResponse> {
        match self.repository.read_one(id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => return Ok(HttpResponse::not_found()),
            Err(e) => return Err(e),
        }

        let item = self.factory.make_entity(payload)?;
        match self.repository.update(item, id).await {
            Ok(_) => Ok(HttpResponse::no_content()),
            Err(e) if e.is_not_found() => Ok(HttpResponse::not_found()),
            Err(e) => Err(e),
        }
    }

    /// Remove: `204`, or `404` when absent (including a repeated delete).
    pub async fn handle_delete(&self, id: &str) -> StoreResult<HttpResponse> {
        match self.repository.delete_one(id).await {
            Ok(()) => Ok(HttpResponse::no_content()),
            Err(e) if e.is_not_found() => Ok(HttpResponse::not_found()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    use crudkit_store::{DocumentRepository, MemoryCollection};

    use crate::app::widgets::{Widget, WidgetFactory};

    fn controller() -> (Arc<dyn CrudRepository<Widget>>, CrudController<Widget>) {
        let repo: Arc<dyn CrudRepository<Widget>> = Arc::new(DocumentRepository::new(
            Arc::new(MemoryCollection::new()),
            WidgetFactory,
        ));
        let controller =
            CrudController::new(repo.clone(), Arc::new(WidgetFactory), "widgets");
        (repo, controller)
    }

    #[tokio::test]
    async fn get_id_normalizes_not_found_to_404() {
        let (_, controller) = controller();
        let resp = controller.handle_get_id("missing").await.unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(resp.body, None);
    }

    #[tokio::test]
    async fn post_sets_location_from_assigned_id() {
        let (_, controller) = controller();
        let resp = controller.handle_post(json!({"name": "foo"})).await.unwrap();

        assert_eq!(resp.status, StatusCode::CREATED);
        let body = resp.body.unwrap();
        let id = body["id"].as_str().unwrap();
        assert!(!id.is_empty());
        assert_eq!(
            resp.headers[0].1,
            format!("/widgets/{id}"),
        );
    }

    #[tokio::test]
    async fn put_on_absent_id_never_writes() {
        let (repo, controller) = controller();
        let resp = controller
            .handle_put("missing", json!({"name": "bar"}))
            .await
            .unwrap();

        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert!(repo.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_twice_is_404_the_second_time() {
        let (_, controller) = controller();
        let created = controller.handle_post(json!({"name": "foo"})).await.unwrap();
        let id = created.body.unwrap()["id"].as_str().unwrap().to_string();

        let first = controller.handle_delete(&id).await.unwrap();
        assert_eq!(first.status, StatusCode::NO_CONTENT);

        let second = controller.handle_delete(&id).await.unwrap();
        assert_eq!(second.status, StatusCode::NOT_FOUND);
    }
}
