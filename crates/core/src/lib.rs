//! `partsledger-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the inventory,
//! auth and infrastructure crates (no IO, no storage, no HTTP).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{MovementId, PartId, UserId, WarehouseId};
pub use value_object::ValueObject;
