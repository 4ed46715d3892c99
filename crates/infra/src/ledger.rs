//! Stock ledger service: validation, catalog resolution, atomic movements.

use chrono::Utc;
use tracing::instrument;

use partsledger_core::{PartId, UserId, WarehouseId};
use partsledger_inventory::{
    AppliedMovement, Receipt, StockEntry, StockError, StockKey, StockMovement, StockResult,
    Transfer,
};

use crate::catalog::{Catalog, CatalogError};
use crate::stock_store::StockStore;

/// Per (part, warehouse) quantity-on-hand with receipts and transfers.
///
/// Commands are validated first (quantity, self-transfer), then every id is
/// resolved against the catalog, then the store applies the movement as one
/// atomic step. The ledger itself is stateless and never retries.
#[derive(Debug, Clone)]
pub struct StockLedger<S, C> {
    store: S,
    catalog: C,
}

/// Stock of one part across warehouses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartStock {
    /// Ordered by warehouse id.
    pub entries: Vec<StockEntry>,
    pub total: i64,
}

fn catalog_failure(err: CatalogError) -> StockError {
    StockError::persistence(format!("catalog lookup failed: {err}"))
}

impl<S, C> StockLedger<S, C>
where
    S: StockStore,
    C: Catalog,
{
    pub fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Quantity on hand; 0 for a pair that was never stocked.
    pub async fn get_quantity(&self, part_id: &PartId, warehouse_id: WarehouseId) -> StockResult<i64> {
        self.store
            .quantity(&StockKey::new(part_id.clone(), warehouse_id))
            .await
    }

    #[instrument(skip(self), fields(part_id = %part_id, warehouse_id = %warehouse_id), err)]
    pub async fn receive(
        &self,
        part_id: PartId,
        warehouse_id: WarehouseId,
        quantity: i64,
        actor: Option<UserId>,
    ) -> StockResult<AppliedMovement> {
        let cmd = Receipt::new(part_id, warehouse_id, quantity)?;
        self.ensure_part(&cmd.part_id).await?;
        self.ensure_warehouse(cmd.warehouse_id).await?;

        let applied = self
            .store
            .apply(StockMovement::receipt(&cmd, actor, Utc::now()))
            .await?;

        tracing::info!(
            movement_id = %applied.movement.id,
            on_hand = applied.destination.quantity(),
            "stock received"
        );
        Ok(applied)
    }

    #[instrument(skip(self), fields(part_id = %part_id, from = %from, to = %to), err)]
    pub async fn transfer(
        &self,
        part_id: PartId,
        from: WarehouseId,
        to: WarehouseId,
        quantity: i64,
        actor: Option<UserId>,
    ) -> StockResult<AppliedMovement> {
        let cmd = Transfer::new(part_id, from, to, quantity)?;
        self.ensure_part(&cmd.part_id).await?;
        self.ensure_warehouse(cmd.from).await?;
        self.ensure_warehouse(cmd.to).await?;

        let applied = self
            .store
            .apply(StockMovement::transfer(&cmd, actor, Utc::now()))
            .await?;

        tracing::info!(
            movement_id = %applied.movement.id,
            source_on_hand = applied.source.as_ref().map(StockEntry::quantity),
            destination_on_hand = applied.destination.quantity(),
            "stock transferred"
        );
        Ok(applied)
    }

    /// All entries of a part, ordered by warehouse id.
    pub async fn stock_for_part(&self, part_id: &PartId) -> StockResult<Vec<StockEntry>> {
        self.store.entries_for_part(part_id).await
    }

    /// All entries held at a warehouse, ordered by part id.
    pub async fn stock_for_warehouse(&self, warehouse_id: WarehouseId) -> StockResult<Vec<StockEntry>> {
        self.store.entries_for_warehouse(warehouse_id).await
    }

    /// Entries of a part and their total, both taken from one read.
    pub async fn part_summary(&self, part_id: &PartId) -> StockResult<PartStock> {
        let entries = self.store.entries_for_part(part_id).await?;
        let total = entries.iter().try_fold(0i64, |acc, e| {
            acc.checked_add(e.quantity())
                .ok_or_else(|| StockError::QuantityOverflow {
                    part_id: part_id.clone(),
                    warehouse_id: e.warehouse_id(),
                })
        })?;
        Ok(PartStock { entries, total })
    }

    pub async fn total_on_hand(&self, part_id: &PartId) -> StockResult<i64> {
        Ok(self.part_summary(part_id).await?.total)
    }

    pub async fn movements_for_part(&self, part_id: &PartId, limit: usize) -> StockResult<Vec<StockMovement>> {
        self.store.movements_for_part(part_id, limit).await
    }

    async fn ensure_part(&self, part_id: &PartId) -> StockResult<()> {
        match self.catalog.part(part_id).await.map_err(catalog_failure)? {
            Some(_) => Ok(()),
            None => Err(StockError::UnknownPart(part_id.clone())),
        }
    }

    async fn ensure_warehouse(&self, warehouse_id: WarehouseId) -> StockResult<()> {
        match self
            .catalog
            .warehouse(warehouse_id)
            .await
            .map_err(catalog_failure)?
        {
            Some(_) => Ok(()),
            None => Err(StockError::UnknownWarehouse(warehouse_id)),
        }
    }
}
