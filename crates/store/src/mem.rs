//! In-memory drivers behind the two driver seams.
//!
//! These back the default build and the test suites; a production deployment
//! injects real driver handles behind the same traits.
//! `MemoryIndex` reproduces the search engine's staging
//! behavior: a write is invisible to `search` until `refresh` runs, which
//! is what the search repository's refresh discipline is tested against.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crudkit_core::{StoreError, StoreResult};

use crate::document::DocumentCollection;
use crate::search::SearchIndex;

/// Document-store collection held in process memory.
///
/// Atomic per-operation, immediately visible reads. `find` interprets the
/// opaque filter as field/value equality over top-level keys (empty filter
/// matches everything).
#[derive(Default)]
pub struct MemoryCollection {
    docs: Mutex<BTreeMap<String, Value>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert_one(&self, doc: Value) -> StoreResult<Value> {
        let (id, doc) = identify(doc)?;
        let mut docs = lock(&self.docs)?;
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn insert_many(&self, docs: Vec<Value>) -> StoreResult<Vec<Value>> {
        let mut stored = Vec::with_capacity(docs.len());
        let identified = docs
            .into_iter()
            .map(identify)
            .collect::<StoreResult<Vec<_>>>()?;

        let mut guard = lock(&self.docs)?;
        for (id, doc) in identified {
            guard.insert(id, doc.clone());
            stored.push(doc);
        }
        Ok(stored)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Value>> {
        Ok(lock(&self.docs)?.get(id).cloned())
    }

    async fn find(&self, filter: Value) -> StoreResult<Vec<Value>> {
        let docs = lock(&self.docs)?;
        Ok(docs
            .values()
            .filter(|doc| matches_filter(doc, &filter))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> StoreResult<Vec<Value>> {
        Ok(lock(&self.docs)?.values().cloned().collect())
    }

    async fn replace_one(&self, id: &str, doc: Value) -> StoreResult<bool> {
        let mut docs = lock(&self.docs)?;
        if !docs.contains_key(id) {
            return Ok(false);
        }
        docs.insert(id.to_string(), with_id(doc, id)?);
        Ok(true)
    }

    async fn delete_one(&self, id: &str) -> StoreResult<Option<Value>> {
        Ok(lock(&self.docs)?.remove(id))
    }
}

/// Search index held in process memory.
///
/// Writes land in a staging buffer and only become visible to `search` after
/// `refresh`. `get_doc` reads the refreshed segment set, and `delete_doc`
/// takes effect immediately in both, matching the engine this stands in for.
pub struct MemoryIndex {
    name: String,
    live: Mutex<BTreeMap<String, Value>>,
    staged: Mutex<Vec<(String, Value)>>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            live: Mutex::new(BTreeMap::new()),
            staged: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn index_doc(&self, id: Option<&str>, doc: Value) -> StoreResult<String> {
        if !doc.is_object() {
            return Err(StoreError::backend("only object documents are indexable"));
        }
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::now_v7().to_string(),
        };

        let mut staged = lock_vec(&self.staged)?;
        // Last write per id wins at refresh time; drop superseded entries.
        staged.retain(|(staged_id, _)| staged_id != &id);
        staged.push((id.clone(), doc));
        Ok(id)
    }

    async fn bulk_index(&self, docs: Vec<Value>) -> StoreResult<Vec<String>> {
        let rejected = docs.iter().filter(|d| !d.is_object()).count();
        if rejected > 0 {
            return Err(StoreError::backend(format!(
                "bulk rejected {rejected} of {} documents",
                docs.len()
            )));
        }

        let mut staged = lock_vec(&self.staged)?;
        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = Uuid::now_v7().to_string();
            staged.push((id.clone(), doc));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn get_doc(&self, id: &str) -> StoreResult<Option<Value>> {
        let live = lock(&self.live)?;
        Ok(live.get(id).map(|doc| hit_envelope(id, doc)))
    }

    async fn search(&self, query: Value, limit: usize) -> StoreResult<Vec<Value>> {
        let live = lock(&self.live)?;
        Ok(live
            .iter()
            .filter(|(_, doc)| matches_filter(doc, &query))
            .take(limit)
            .map(|(id, doc)| hit_envelope(id, doc))
            .collect())
    }

    async fn refresh(&self) -> StoreResult<()> {
        let mut staged = lock_vec(&self.staged)?;
        if staged.is_empty() {
            return Ok(());
        }

        tracing::debug!(index = %self.name, writes = staged.len(), "refreshing index");
        let mut live = lock(&self.live)?;
        for (id, doc) in staged.drain(..) {
            live.insert(id, doc);
        }
        Ok(())
    }

    async fn delete_doc(&self, id: &str) -> StoreResult<bool> {
        let in_live = lock(&self.live)?.remove(id).is_some();
        let mut staged = lock_vec(&self.staged)?;
        let before = staged.len();
        staged.retain(|(staged_id, _)| staged_id.as_str() != id);
        Ok(in_live || staged.len() != before)
    }
}

fn hit_envelope(id: &str, doc: &Value) -> Value {
    serde_json::json!({ "_id": id, "_source": doc })
}

/// Assign an id when the document carries none (or an empty one).
fn identify(doc: Value) -> StoreResult<(String, Value)> {
    let Value::Object(mut doc) = doc else {
        return Err(StoreError::backend("only object documents are storable"));
    };

    let id = match doc.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => {
            let id = Uuid::now_v7().to_string();
            doc.insert("id".into(), Value::String(id.clone()));
            id
        }
    };
    Ok((id, Value::Object(doc)))
}

fn with_id(doc: Value, id: &str) -> StoreResult<Value> {
    let Value::Object(mut doc) = doc else {
        return Err(StoreError::backend("only object documents are storable"));
    };
    doc.insert("id".into(), Value::String(id.to_string()));
    Ok(Value::Object(doc))
}

/// Top-level field/value equality; `null` or an empty object matches all.
fn matches_filter(doc: &Value, filter: &Value) -> bool {
    let conditions: &Map<String, Value> = match filter {
        Value::Null => return true,
        Value::Object(map) => map,
        _ => return false,
    };
    conditions
        .iter()
        .all(|(field, expected)| doc.get(field) == Some(expected))
}

fn lock<'a>(m: &'a Mutex<BTreeMap<String, Value>>) -> StoreResult<std::sync::MutexGuard<'a, BTreeMap<String, Value>>> {
    m.lock()
        .map_err(|_| StoreError::backend("driver state poisoned"))
}

fn lock_vec<'a>(m: &'a Mutex<Vec<(String, Value)>>) -> StoreResult<std::sync::MutexGuard<'a, Vec<(String, Value)>>> {
    m.lock()
        .map_err(|_| StoreError::backend("driver state poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn collection_assigns_missing_ids() {
        let coll = MemoryCollection::new();
        let stored = coll.insert_one(json!({"name": "foo"})).await.unwrap();
        let id = stored["id"].as_str().unwrap();
        assert!(!id.is_empty());
        assert_eq!(coll.find_by_id(id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn index_stages_writes_until_refresh() {
        let index = MemoryIndex::new("widgets");
        let id = index
            .index_doc(None, json!({"name": "foo"}))
            .await
            .unwrap();

        assert_eq!(index.get_doc(&id).await.unwrap(), None);
        assert!(index.search(Value::Null, 10).await.unwrap().is_empty());

        index.refresh().await.unwrap();

        let hit = index.get_doc(&id).await.unwrap().unwrap();
        assert_eq!(hit["_source"]["name"], "foo");
        assert_eq!(index.search(Value::Null, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn index_delete_is_immediate_even_when_staged() {
        let index = MemoryIndex::new("widgets");
        let id = index.index_doc(None, json!({"name": "foo"})).await.unwrap();

        assert!(index.delete_doc(&id).await.unwrap());
        index.refresh().await.unwrap();
        assert_eq!(index.get_doc(&id).await.unwrap(), None);
        assert!(!index.delete_doc(&id).await.unwrap());
    }

    #[tokio::test]
    async fn staged_rewrite_of_same_id_wins_once() {
        let index = MemoryIndex::new("widgets");
        let id = index.index_doc(None, json!({"name": "foo"})).await.unwrap();
        index
            .index_doc(Some(&id), json!({"name": "bar"}))
            .await
            .unwrap();
        index.refresh().await.unwrap();

        assert_eq!(index.search(Value::Null, 10).await.unwrap().len(), 1);
        let hit = index.get_doc(&id).await.unwrap().unwrap();
        assert_eq!(hit["_source"]["name"], "bar");
    }

    #[tokio::test]
    async fn bulk_index_rejects_mixed_batches_whole() {
        let index = MemoryIndex::new("widgets");
        let err = index
            .bulk_index(vec![json!({"name": "ok"}), json!("nope")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        index.refresh().await.unwrap();
        assert!(index.search(Value::Null, 10).await.unwrap().is_empty());
    }
}
