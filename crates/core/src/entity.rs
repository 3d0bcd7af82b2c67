//! Entity trait: identity + storage-visible shape.

use serde::Serialize;

/// A storage-native record of a generic resource type.
///
/// Entities are owned by whichever backend persists them; the HTTP layer
/// never holds one beyond the scope of a single request. An entity returned
/// by any repository operation must carry a non-empty identifier — create
/// payloads may arrive without one, and the backend assigns it.
pub trait Entity: Serialize + Send + Sync + 'static {
    /// Returns the assigned identifier, if any.
    fn id(&self) -> Option<&str>;
}
