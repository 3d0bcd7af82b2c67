//! Repository contract implemented by every storage backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::entity::Entity;
use crate::error::StoreResult;

/// Backend-defined filter expression, passed through the contract verbatim.
///
/// The contract is agnostic to its shape; each backend interprets it in its
/// own query language.
pub type Predicate = Value;

/// The CRUD contract.
///
/// Return values must be indistinguishable between backends: every returned
/// entity carries a non-empty identifier and reflects the just-written state
/// (read-your-write), even when the underlying engine is only eventually
/// visible. Callers never special-case backend identity.
#[async_trait]
pub trait CrudRepository<T: Entity>: Send + Sync {
    /// Persist `item` and return the durably-stored, identifier-bearing
    /// record.
    async fn create_one(&self, item: T) -> StoreResult<T>;

    /// Bulk create. Partial failure is backend-defined but must be signaled,
    /// never silently dropped.
    async fn create_many(&self, items: Vec<T>) -> StoreResult<Vec<T>>;

    /// Fetch by identifier. `StoreError::NotFound` when no record matches.
    async fn read_one(&self, id: &str) -> StoreResult<T>;

    /// Fetch records matching a backend-specific filter expression.
    async fn read(&self, predicate: Predicate) -> StoreResult<Vec<T>>;

    /// Fetch the full collection, bounded by a backend-defined page size.
    async fn read_all(&self) -> StoreResult<Vec<T>>;

    /// Replace/merge the record at `id` and return the post-write record.
    ///
    /// Idempotent: applying the same update twice yields the same final
    /// state and no additional side effect.
    async fn update(&self, item: T, id: &str) -> StoreResult<T>;

    /// Remove the record at `id`. A second delete on an already-deleted id
    /// reports `NotFound`, never a crash.
    async fn delete_one(&self, id: &str) -> StoreResult<()>;
}
