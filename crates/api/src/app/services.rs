//! Backend wiring: the ledger + catalog pair behind the routes.

use std::sync::Arc;

use anyhow::Context;

use partsledger_core::{PartId, UserId, WarehouseId};
use partsledger_infra::{
    Catalog, CatalogError, InMemoryCatalog, InMemoryStockStore, PartStock, PostgresCatalog,
    PostgresStockStore, StockLedger, StoreBackend, db,
};
use partsledger_inventory::{
    AppliedMovement, NewPart, NewWarehouse, Part, StockEntry, StockMovement, StockResult,
    Warehouse,
};

type InMemoryLedger = StockLedger<Arc<InMemoryStockStore>, Arc<InMemoryCatalog>>;
type PersistentLedger = StockLedger<Arc<PostgresStockStore>, Arc<PostgresCatalog>>;

/// Services shared by every handler (cheap to clone).
#[derive(Clone)]
pub enum AppServices {
    InMemory { ledger: Arc<InMemoryLedger> },
    Persistent { ledger: Arc<PersistentLedger> },
}

/// Run `$body` with `$ledger` bound to whichever backend is active.
macro_rules! with_ledger {
    ($services:expr, $ledger:ident => $body:expr) => {
        match $services {
            AppServices::InMemory { ledger: $ledger } => $body,
            AppServices::Persistent { ledger: $ledger } => $body,
        }
    };
}

impl AppServices {
    pub fn in_memory() -> Self {
        let ledger = StockLedger::new(
            Arc::new(InMemoryStockStore::new()),
            Arc::new(InMemoryCatalog::new()),
        );
        Self::InMemory {
            ledger: Arc::new(ledger),
        }
    }

    pub fn persistent(pool: db::PgPool) -> Self {
        let ledger = StockLedger::new(
            Arc::new(PostgresStockStore::new(pool.clone())),
            Arc::new(PostgresCatalog::new(pool)),
        );
        Self::Persistent {
            ledger: Arc::new(ledger),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AppServices::InMemory { .. } => "in_memory",
            AppServices::Persistent { .. } => "postgres",
        }
    }

    pub async fn get_quantity(&self, part_id: &PartId, warehouse_id: WarehouseId) -> StockResult<i64> {
        with_ledger!(self, l => l.get_quantity(part_id, warehouse_id).await)
    }

    pub async fn receive(
        &self,
        part_id: PartId,
        warehouse_id: WarehouseId,
        quantity: i64,
        actor: UserId,
    ) -> StockResult<AppliedMovement> {
        with_ledger!(self, l => l.receive(part_id, warehouse_id, quantity, Some(actor)).await)
    }

    pub async fn transfer(
        &self,
        part_id: PartId,
        from: WarehouseId,
        to: WarehouseId,
        quantity: i64,
        actor: UserId,
    ) -> StockResult<AppliedMovement> {
        with_ledger!(self, l => l.transfer(part_id, from, to, quantity, Some(actor)).await)
    }

    pub async fn part_summary(&self, part_id: &PartId) -> StockResult<PartStock> {
        with_ledger!(self, l => l.part_summary(part_id).await)
    }

    pub async fn stock_for_warehouse(&self, warehouse_id: WarehouseId) -> StockResult<Vec<StockEntry>> {
        with_ledger!(self, l => l.stock_for_warehouse(warehouse_id).await)
    }

    pub async fn movements_for_part(&self, part_id: &PartId, limit: usize) -> StockResult<Vec<StockMovement>> {
        with_ledger!(self, l => l.movements_for_part(part_id, limit).await)
    }

    pub async fn register_part(&self, new: NewPart) -> Result<Part, CatalogError> {
        with_ledger!(self, l => l.catalog().register_part(new).await)
    }

    pub async fn register_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, CatalogError> {
        with_ledger!(self, l => l.catalog().register_warehouse(new).await)
    }

    pub async fn list_parts(&self) -> Result<Vec<Part>, CatalogError> {
        with_ledger!(self, l => l.catalog().list_parts().await)
    }

    pub async fn list_warehouses(&self) -> Result<Vec<Warehouse>, CatalogError> {
        with_ledger!(self, l => l.catalog().list_warehouses().await)
    }
}

/// Build services for the configured backend.
///
/// The Postgres backend connects and applies the schema before returning, so
/// a bad `DATABASE_URL` fails startup rather than the first request.
pub async fn build_services(store: &StoreBackend) -> anyhow::Result<AppServices> {
    match store {
        StoreBackend::InMemory => {
            let services = AppServices::in_memory();
            tracing::info!(backend = services.backend_name(), "stores ready");
            Ok(services)
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = db::connect(database_url, *max_connections)
                .await
                .context("connecting to Postgres")?;
            db::apply_schema(&pool)
                .await
                .context("applying database schema")?;
            let services = AppServices::persistent(pool);
            tracing::info!(backend = services.backend_name(), max_connections, "stores ready");
            Ok(services)
        }
    }
}
