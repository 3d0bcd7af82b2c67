//! `crudkit-core` — storage-agnostic CRUD contracts.
//!
//! This crate contains **pure contracts** (no backend or HTTP concerns):
//! the entity and factory traits, the repository contract both backends
//! implement, and the error model shared across the stack.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;

pub use entity::Entity;
pub use error::{StoreError, StoreResult};
pub use factory::Factory;
pub use repository::{CrudRepository, Predicate};
