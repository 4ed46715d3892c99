//! Parts/warehouse catalog: the owning system that ledger ids resolve against.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use partsledger_core::{DomainError, PartId, WarehouseId};
use partsledger_inventory::{NewPart, NewWarehouse, Part, Warehouse};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Validation failure or duplicate id.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("catalog storage failure: {0}")]
    Persistence(String),
}

/// Catalog store.
///
/// Only the lookups are needed by the ledger; registration and listing back
/// the catalog routes of the API.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Register a part. Fails with `Conflict` if the id is taken.
    async fn register_part(&self, new: NewPart) -> Result<Part, CatalogError>;

    /// Register a warehouse and assign its id.
    async fn register_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, CatalogError>;

    async fn part(&self, id: &PartId) -> Result<Option<Part>, CatalogError>;

    async fn warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, CatalogError>;

    /// All parts, ordered by id.
    async fn list_parts(&self) -> Result<Vec<Part>, CatalogError>;

    /// All warehouses, ordered by id.
    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, CatalogError>;
}

#[async_trait]
impl<C> Catalog for Arc<C>
where
    C: Catalog + ?Sized,
{
    async fn register_part(&self, new: NewPart) -> Result<Part, CatalogError> {
        (**self).register_part(new).await
    }

    async fn register_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, CatalogError> {
        (**self).register_warehouse(new).await
    }

    async fn part(&self, id: &PartId) -> Result<Option<Part>, CatalogError> {
        (**self).part(id).await
    }

    async fn warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, CatalogError> {
        (**self).warehouse(id).await
    }

    async fn list_parts(&self) -> Result<Vec<Part>, CatalogError> {
        (**self).list_parts().await
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, CatalogError> {
        (**self).list_warehouses().await
    }
}
