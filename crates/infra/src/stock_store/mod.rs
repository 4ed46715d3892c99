//! Persistence boundary for stock entries and the movement journal.

use std::sync::Arc;

use async_trait::async_trait;

use partsledger_core::{PartId, WarehouseId};
use partsledger_inventory::{AppliedMovement, StockEntry, StockKey, StockMovement, StockResult};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStockStore;
pub use postgres::PostgresStockStore;

/// Stock entry + movement journal storage.
///
/// ## Atomicity
///
/// `apply` is the only write. Implementations must evaluate the sufficiency
/// check, update both entries and append the journal record as one
/// all-or-nothing step that serializes with every other `apply` touching the
/// same entries. A failed or cancelled `apply` leaves no trace.
///
/// Implementations should delegate the arithmetic to
/// [`StockMovement::settle`] (or mirror it exactly in SQL) so every backend
/// rejects the same movements.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Quantity on hand, 0 for a pair that has never been stocked.
    async fn quantity(&self, key: &StockKey) -> StockResult<i64>;

    /// Entries of one part, ordered by warehouse id.
    async fn entries_for_part(&self, part_id: &PartId) -> StockResult<Vec<StockEntry>>;

    /// Entries held at one warehouse, ordered by part id.
    async fn entries_for_warehouse(&self, warehouse_id: WarehouseId) -> StockResult<Vec<StockEntry>>;

    /// Atomically apply a receipt or transfer and journal it.
    async fn apply(&self, movement: StockMovement) -> StockResult<AppliedMovement>;

    /// Most recent movements of a part, newest first.
    async fn movements_for_part(&self, part_id: &PartId, limit: usize) -> StockResult<Vec<StockMovement>>;
}

#[async_trait]
impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    async fn quantity(&self, key: &StockKey) -> StockResult<i64> {
        (**self).quantity(key).await
    }

    async fn entries_for_part(&self, part_id: &PartId) -> StockResult<Vec<StockEntry>> {
        (**self).entries_for_part(part_id).await
    }

    async fn entries_for_warehouse(&self, warehouse_id: WarehouseId) -> StockResult<Vec<StockEntry>> {
        (**self).entries_for_warehouse(warehouse_id).await
    }

    async fn apply(&self, movement: StockMovement) -> StockResult<AppliedMovement> {
        (**self).apply(movement).await
    }

    async fn movements_for_part(&self, part_id: &PartId, limit: usize) -> StockResult<Vec<StockMovement>> {
        (**self).movements_for_part(part_id, limit).await
    }
}
