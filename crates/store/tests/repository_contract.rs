//! Contract tests run identically against both backend realizations:
//! through `CrudRepository` the two must be indistinguishable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crudkit_core::{CrudRepository, Entity, Factory, StoreError, StoreResult};
use crudkit_store::{DocumentRepository, MemoryCollection, MemoryIndex, SearchRepository};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    title: String,
}

impl Note {
    fn new(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
        }
    }
}

impl Entity for Note {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

struct NoteFactory;

impl Factory<Note> for NoteFactory {
    fn make_entity(&self, raw: Value) -> StoreResult<Note> {
        serde_json::from_value(raw).map_err(|e| StoreError::decode(e.to_string()))
    }

    fn make_object(&self, entity: &Note) -> Value {
        json!({ "id": entity.id, "title": entity.title })
    }
}

fn document_repo() -> Arc<dyn CrudRepository<Note>> {
    Arc::new(DocumentRepository::new(
        Arc::new(MemoryCollection::new()),
        NoteFactory,
    ))
}

fn search_repo() -> Arc<dyn CrudRepository<Note>> {
    Arc::new(SearchRepository::new(
        Arc::new(MemoryIndex::new("notes")),
        NoteFactory,
    ))
}

fn both() -> Vec<Arc<dyn CrudRepository<Note>>> {
    vec![document_repo(), search_repo()]
}

#[tokio::test]
async fn create_one_returns_identified_record() {
    for repo in both() {
        let created = repo.create_one(Note::new("foo")).await.unwrap();
        let id = created.id().expect("created record must carry an id");
        assert!(!id.is_empty());
        assert_eq!(created.title, "foo");
    }
}

#[tokio::test]
async fn read_one_of_unknown_id_is_not_found() {
    for repo in both() {
        let err = repo.read_one("no-such-id").await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}

#[tokio::test]
async fn created_record_is_immediately_readable() {
    for repo in both() {
        let created = repo.create_one(Note::new("foo")).await.unwrap();
        let id = created.id().unwrap().to_string();

        let read = repo.read_one(&id).await.unwrap();
        assert_eq!(read, created);
    }
}

#[tokio::test]
async fn read_all_sees_a_fresh_write() {
    // The search index stages writes until refresh; the repository's
    // refresh-before-read discipline must still make this hold there.
    for repo in both() {
        let created = repo.create_one(Note::new("fresh")).await.unwrap();
        let all = repo.read_all().await.unwrap();
        assert!(all.contains(&created));
    }
}

#[tokio::test]
async fn read_filters_by_predicate() {
    for repo in both() {
        repo.create_one(Note::new("alpha")).await.unwrap();
        repo.create_one(Note::new("beta")).await.unwrap();

        let matched = repo.read(json!({ "title": "beta" })).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "beta");
    }
}

#[tokio::test]
async fn create_many_uses_one_batch_and_returns_each_record() {
    for repo in both() {
        let created = repo
            .create_many(vec![Note::new("a"), Note::new("b"), Note::new("c")])
            .await
            .unwrap();

        assert_eq!(created.len(), 3);
        for note in &created {
            assert!(note.id().is_some_and(|id| !id.is_empty()));
        }

        let all = repo.read_all().await.unwrap();
        assert_eq!(all.len(), 3);
    }
}

#[tokio::test]
async fn update_replaces_and_returns_stored_state() {
    for repo in both() {
        let created = repo.create_one(Note::new("before")).await.unwrap();
        let id = created.id().unwrap().to_string();

        let updated = repo
            .update(
                Note {
                    id: Some(id.clone()),
                    title: "after".to_string(),
                },
                &id,
            )
            .await
            .unwrap();

        assert_eq!(updated.id(), Some(id.as_str()));
        assert_eq!(updated.title, "after");
        assert_eq!(repo.read_one(&id).await.unwrap().title, "after");
    }
}

#[tokio::test]
async fn update_is_idempotent() {
    for repo in both() {
        let created = repo.create_one(Note::new("v1")).await.unwrap();
        let id = created.id().unwrap().to_string();
        let replacement = Note {
            id: Some(id.clone()),
            title: "v2".to_string(),
        };

        let once = repo.update(replacement.clone(), &id).await.unwrap();
        let twice = repo.update(replacement, &id).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(repo.read_all().await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn delete_twice_reports_not_found_second_time() {
    for repo in both() {
        let created = repo.create_one(Note::new("doomed")).await.unwrap();
        let id = created.id().unwrap().to_string();

        repo.delete_one(&id).await.unwrap();
        let err = repo.delete_one(&id).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);

        let err = repo.read_one(&id).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}
