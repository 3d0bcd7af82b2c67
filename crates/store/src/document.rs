//! Document-store realization of the CRUD contract.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crudkit_core::{CrudRepository, Entity, Factory, Predicate, StoreError, StoreResult};

/// Driver seam for a document-store collection.
///
/// One shared handle per process, injected at repository construction and
/// used concurrently by many in-flight requests; internal concurrency safety
/// is the driver's responsibility. All operations act on the current
/// committed state — reads see prior writes without any extra step.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Insert a document, assigning an id if the document carries none.
    /// Returns the stored document, id included.
    async fn insert_one(&self, doc: Value) -> StoreResult<Value>;

    /// Insert a batch of documents. Returns the stored documents.
    async fn insert_many(&self, docs: Vec<Value>) -> StoreResult<Vec<Value>>;

    /// Fetch the document at `id`, or `None` when absent.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Value>>;

    /// Fetch documents matching a driver-specific filter.
    async fn find(&self, filter: Value) -> StoreResult<Vec<Value>>;

    /// Fetch the full collection.
    async fn find_all(&self) -> StoreResult<Vec<Value>>;

    /// Replace the document at `id`. Returns whether a document matched.
    async fn replace_one(&self, id: &str, doc: Value) -> StoreResult<bool>;

    /// Delete the document at `id`. Returns the removed document, or `None`
    /// when nothing was there.
    async fn delete_one(&self, id: &str) -> StoreResult<Option<Value>>;
}

/// CRUD repository over a document-store collection.
///
/// The mapping onto the driver is 1:1; the store's native atomicity gives
/// read-your-write for free, so no post-write confirmation is needed beyond
/// re-reading the replaced record in `update`.
pub struct DocumentRepository<T, F> {
    collection: Arc<dyn DocumentCollection>,
    factory: F,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, F: Factory<T>> DocumentRepository<T, F> {
    pub fn new(collection: Arc<dyn DocumentCollection>, factory: F) -> Self {
        Self {
            collection,
            factory,
            _entity: PhantomData,
        }
    }

    fn to_doc(&self, item: &T) -> StoreResult<Value> {
        serde_json::to_value(item).map_err(|e| StoreError::backend(e.to_string()))
    }
}

#[async_trait]
impl<T: Entity, F: Factory<T>> CrudRepository<T> for DocumentRepository<T, F> {
    async fn create_one(&self, item: T) -> StoreResult<T> {
        let doc = self.to_doc(&item)?;
        let stored = self.collection.insert_one(doc).await?;
        let entity = self.factory.make_entity(stored)?;
        ensure_identified(entity)
    }

    async fn create_many(&self, items: Vec<T>) -> StoreResult<Vec<T>> {
        let docs = items
            .iter()
            .map(|i| self.to_doc(i))
            .collect::<StoreResult<Vec<_>>>()?;
        let stored = self.collection.insert_many(docs).await?;
        stored
            .into_iter()
            .map(|doc| ensure_identified(self.factory.make_entity(doc)?))
            .collect()
    }

    async fn read_one(&self, id: &str) -> StoreResult<T> {
        match self.collection.find_by_id(id).await? {
            Some(doc) => self.factory.make_entity(doc),
            None => Err(StoreError::NotFound),
        }
    }

    async fn read(&self, predicate: Predicate) -> StoreResult<Vec<T>> {
        let docs = self.collection.find(predicate).await?;
        docs.into_iter()
            .map(|doc| self.factory.make_entity(doc))
            .collect()
    }

    async fn read_all(&self) -> StoreResult<Vec<T>> {
        let docs = self.collection.find_all().await?;
        docs.into_iter()
            .map(|doc| self.factory.make_entity(doc))
            .collect()
    }

    async fn update(&self, item: T, id: &str) -> StoreResult<T> {
        let doc = self.to_doc(&item)?;
        let matched = self.collection.replace_one(id, doc).await?;
        if !matched {
            return Err(StoreError::NotFound);
        }

        // Replace acks don't carry the stored record; re-read so the
        // contract returns the committed state.
        self.read_one(id).await
    }

    async fn delete_one(&self, id: &str) -> StoreResult<()> {
        match self.collection.delete_one(id).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

/// Every record a repository hands back must carry a non-empty id before it
/// reaches the factory's wire projection.
pub(crate) fn ensure_identified<T: Entity>(entity: T) -> StoreResult<T> {
    match entity.id() {
        Some(id) if !id.is_empty() => Ok(entity),
        _ => Err(StoreError::backend("stored record has no identifier")),
    }
}
