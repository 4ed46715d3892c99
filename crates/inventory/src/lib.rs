//! Inventory domain module: the multi-warehouse stock ledger.
//!
//! This crate contains the ledger's business rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Stores in
//! `partsledger-infra` call into [`StockMovement::settle`] so that every
//! backend enforces the same invariants.

pub mod catalog;
pub mod command;
pub mod error;
pub mod movement;
pub mod stock;

pub use catalog::{NewPart, NewWarehouse, Part, Warehouse};
pub use command::{Receipt, Transfer};
pub use error::{StockError, StockResult};
pub use movement::{AppliedMovement, MovementKind, StockMovement};
pub use stock::{Quantity, StockEntry, StockKey};
