//! `crudkit-store` — the two backend realizations of the CRUD contract.
//!
//! Structure:
//! - `document`: repository over a document store (atomic upsert/delete,
//!   read-your-write reads).
//! - `search`: repository over a search index (bulk-indexed, writes only
//!   visible after an explicit refresh).
//! - `mem`: in-memory drivers used by the default build and the test suites.
//!
//! Both repositories implement `crudkit_core::CrudRepository` and are
//! indistinguishable through it; the consistency reconciliation (refresh +
//! post-write re-fetch) lives entirely inside the search realization.

pub mod document;
pub mod mem;
pub mod search;

pub use document::{DocumentCollection, DocumentRepository};
pub use mem::{MemoryCollection, MemoryIndex};
pub use search::{SearchIndex, SearchRepository};
