//! Factory contract: storage shape <-> wire shape.

use serde_json::Value;

use crate::entity::Entity;
use crate::error::StoreResult;

/// Bidirectional mapping between a storage-native raw record and the
/// transport (wire) representation. Pure and stateless.
pub trait Factory<T: Entity>: Send + Sync {
    /// Canonicalize a raw record into an entity.
    ///
    /// The raw value has already been unwrapped by the backend (hit/document
    /// envelope removed). A failure here means the stored data is corrupt,
    /// which surfaces as a backend fault, not a not-found.
    fn make_entity(&self, raw: Value) -> StoreResult<T>;

    /// Project an entity into its wire representation.
    ///
    /// May drop or rename internal fields. Derived per response and
    /// discarded; there is no failure path.
    fn make_object(&self, entity: &T) -> Value;
}
