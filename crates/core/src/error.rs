//! Store error model.

use thiserror::Error;

/// Result type used across the repository layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Repository-layer error.
///
/// `NotFound` is an explicit variant rather than a caught-and-reclassified
/// exception: the one condition the HTTP layer normalizes (to 404). Every
/// other variant propagates to the transport layer's generic failure path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The target record was absent for a read/update/delete-by-id operation.
    #[error("not found")]
    NotFound,

    /// Stored data could not be canonicalized into an entity.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Any other backend fault (connectivity, rejected write, bulk partial
    /// failure). Not recovered locally; no retries at this layer.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// True when this error means "the record is absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
