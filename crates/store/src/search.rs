//! Search-engine realization of the CRUD contract.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crudkit_core::{CrudRepository, Entity, Factory, Predicate, StoreError, StoreResult};

use crate::document::ensure_identified;

/// Fixed page size for unfiltered listings. The index engine caps result
/// windows, so `read_all` on a larger collection truncates; a full page is
/// logged as possible truncation.
pub const READ_ALL_PAGE_SIZE: usize = 1000;

/// Driver seam for a search index.
///
/// Writes are only guaranteed visible to `search` after a `refresh`; `get_doc`
/// and `delete_doc` act on the committed segment set directly. One shared
/// client per process, injected at construction; the index name is part of
/// the driver's own configuration.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Index a document, assigning an id when `id` is `None`. The returned
    /// value is the write acknowledgment's id only — the ack may omit
    /// fields, so it is never treated as the stored record.
    async fn index_doc(&self, id: Option<&str>, doc: Value) -> StoreResult<String>;

    /// Index a batch in a single bulk call. Any rejected item fails the
    /// whole batch with a `Backend` error; ids of the staged documents are
    /// returned on success.
    async fn bulk_index(&self, docs: Vec<Value>) -> StoreResult<Vec<String>>;

    /// Fetch the hit envelope (`{_id, _source}`) at `id`, or `None`.
    async fn get_doc(&self, id: &str) -> StoreResult<Option<Value>>;

    /// Run a query, returning up to `limit` hit envelopes.
    async fn search(&self, query: Value, limit: usize) -> StoreResult<Vec<Value>>;

    /// Make all prior writes visible to subsequent reads.
    async fn refresh(&self) -> StoreResult<()>;

    /// Delete the document at `id`. Immediate. Returns whether it existed.
    async fn delete_doc(&self, id: &str) -> StoreResult<bool>;
}

/// CRUD repository over a search index.
///
/// The index is eventually visible by default; this realization buys back
/// the contract's read-your-write guarantee with an explicit refresh before
/// every read and a re-fetch after every write, at the cost of an extra
/// round trip. Through `CrudRepository` it is indistinguishable from the
/// document-store realization.
pub struct SearchRepository<T, F> {
    index: Arc<dyn SearchIndex>,
    factory: F,
    page_size: usize,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, F: Factory<T>> SearchRepository<T, F> {
    pub fn new(index: Arc<dyn SearchIndex>, factory: F) -> Self {
        Self {
            index,
            factory,
            page_size: READ_ALL_PAGE_SIZE,
            _entity: PhantomData,
        }
    }

    fn to_doc(&self, item: &T) -> StoreResult<Value> {
        serde_json::to_value(item).map_err(|e| StoreError::backend(e.to_string()))
    }

    /// Index, refresh, then fetch the assigned id back: the write ack may
    /// omit fields, so the authoritative record is always re-read.
    async fn index_and_fetch(&self, id: Option<&str>, item: &T) -> StoreResult<T> {
        let doc = self.to_doc(item)?;
        let assigned = self.index.index_doc(id, doc).await?;
        self.index.refresh().await?;
        self.fetch(&assigned).await
    }

    /// Fetch by id without refreshing; callers refresh first.
    async fn fetch(&self, id: &str) -> StoreResult<T> {
        match self.index.get_doc(id).await? {
            Some(hit) => {
                let entity = self.factory.make_entity(unwrap_hit(hit)?)?;
                ensure_identified(entity)
            }
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl<T: Entity, F: Factory<T>> CrudRepository<T> for SearchRepository<T, F> {
    async fn create_one(&self, item: T) -> StoreResult<T> {
        self.index_and_fetch(None, &item).await
    }

    async fn create_many(&self, items: Vec<T>) -> StoreResult<Vec<T>> {
        let docs = items
            .iter()
            .map(|i| self.to_doc(i))
            .collect::<StoreResult<Vec<_>>>()?;

        // One batched call for throughput, then one refresh for the lot.
        let ids = self.index.bulk_index(docs).await?;
        self.index.refresh().await?;

        let mut entities = Vec::with_capacity(ids.len());
        for id in &ids {
            entities.push(self.fetch(id).await?);
        }
        Ok(entities)
    }

    async fn read_one(&self, id: &str) -> StoreResult<T> {
        self.index.refresh().await?;
        self.fetch(id).await
    }

    async fn read(&self, predicate: Predicate) -> StoreResult<Vec<T>> {
        self.index.refresh().await?;
        let hits = self.index.search(predicate, self.page_size).await?;
        hits.into_iter()
            .map(|hit| self.factory.make_entity(unwrap_hit(hit)?))
            .collect()
    }

    async fn read_all(&self) -> StoreResult<Vec<T>> {
        self.index.refresh().await?;
        let hits = self.index.search(Value::Null, self.page_size).await?;
        if hits.len() == self.page_size {
            tracing::warn!(
                page_size = self.page_size,
                "read_all returned a full page; collection may be truncated"
            );
        }
        hits.into_iter()
            .map(|hit| self.factory.make_entity(unwrap_hit(hit)?))
            .collect()
    }

    async fn update(&self, item: T, id: &str) -> StoreResult<T> {
        self.index_and_fetch(Some(id), &item).await
    }

    async fn delete_one(&self, id: &str) -> StoreResult<()> {
        if self.index.delete_doc(id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

/// Flatten a hit envelope (`{_id, _source}`) into a raw document carrying
/// its id, ready for the factory.
fn unwrap_hit(hit: Value) -> StoreResult<Value> {
    let Value::Object(mut envelope) = hit else {
        return Err(StoreError::decode("hit is not an object"));
    };

    let id = match envelope.get("_id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(StoreError::decode("hit has no _id")),
    };

    match envelope.remove("_source") {
        Some(Value::Object(mut source)) => {
            source.insert("id".into(), Value::String(id));
            Ok(Value::Object(source))
        }
        _ => Err(StoreError::decode("hit has no _source object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwrap_hit_merges_id_into_source() {
        let raw = unwrap_hit(json!({"_id": "w1", "_source": {"name": "foo"}})).unwrap();
        assert_eq!(raw, json!({"id": "w1", "name": "foo"}));
    }

    #[test]
    fn unwrap_hit_rejects_missing_source() {
        let err = unwrap_hit(json!({"_id": "w1"})).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn unwrap_hit_rejects_empty_id() {
        let err = unwrap_hit(json!({"_id": "", "_source": {}})).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
