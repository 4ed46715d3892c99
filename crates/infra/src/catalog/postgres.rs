//! Postgres-backed catalog (`parts` and `warehouses` tables).

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use partsledger_core::{DomainError, PartId, WarehouseId};
use partsledger_inventory::{NewPart, NewWarehouse, Part, Warehouse};

use super::{Catalog, CatalogError};

#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: Arc<PgPool>,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> CatalogError {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            CatalogError::Domain(DomainError::conflict(format!(
                "duplicate key in {operation}: {}",
                db_err.message()
            )))
        }
        sqlx::Error::Database(db_err) => CatalogError::Persistence(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            CatalogError::Persistence(format!("connection pool closed in {operation}"))
        }
        other => CatalogError::Persistence(format!("sqlx error in {operation}: {other}")),
    }
}

fn part_from_row(row: &sqlx::postgres::PgRow) -> Result<Part, CatalogError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("read_part_row", e))?;
    Ok(Part {
        id: PartId::new(id).map_err(|e| CatalogError::Persistence(format!("stored part id: {e}")))?,
        name: row.try_get("name").map_err(|e| map_sqlx_error("read_part_row", e))?,
        brand: row.try_get("brand").map_err(|e| map_sqlx_error("read_part_row", e))?,
    })
}

fn warehouse_from_row(row: &sqlx::postgres::PgRow) -> Result<Warehouse, CatalogError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("read_warehouse_row", e))?;
    Ok(Warehouse {
        id: WarehouseId::new(id),
        name: row.try_get("name").map_err(|e| map_sqlx_error("read_warehouse_row", e))?,
        location: row
            .try_get("location")
            .map_err(|e| map_sqlx_error("read_warehouse_row", e))?,
    })
}

#[async_trait]
impl Catalog for PostgresCatalog {
    #[instrument(skip(self, new), err)]
    async fn register_part(&self, new: NewPart) -> Result<Part, CatalogError> {
        let part = new.into_part()?;

        sqlx::query("INSERT INTO parts (id, name, brand) VALUES ($1, $2, $3)")
            .bind(part.id.as_str())
            .bind(&part.name)
            .bind(&part.brand)
            .execute(&*self.pool)
            .await
            .map_err(|e| match map_sqlx_error("register_part", e) {
                CatalogError::Domain(DomainError::Conflict(_)) => CatalogError::Domain(
                    DomainError::conflict(format!("part {} already exists", part.id)),
                ),
                other => other,
            })?;

        Ok(part)
    }

    #[instrument(skip(self, new), err)]
    async fn register_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, CatalogError> {
        let new = new.normalized()?;

        let row = sqlx::query("INSERT INTO warehouses (name, location) VALUES ($1, $2) RETURNING id")
            .bind(&new.name)
            .bind(&new.location)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("register_warehouse", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("register_warehouse", e))?;

        Ok(Warehouse {
            id: WarehouseId::new(id),
            name: new.name,
            location: new.location,
        })
    }

    #[instrument(skip(self), fields(part_id = %id), err)]
    async fn part(&self, id: &PartId) -> Result<Option<Part>, CatalogError> {
        let row = sqlx::query("SELECT id, name, brand FROM parts WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_part", e))?;

        row.as_ref().map(part_from_row).transpose()
    }

    #[instrument(skip(self), fields(warehouse_id = %id), err)]
    async fn warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, CatalogError> {
        let row = sqlx::query("SELECT id, name, location FROM warehouses WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_warehouse", e))?;

        row.as_ref().map(warehouse_from_row).transpose()
    }

    async fn list_parts(&self) -> Result<Vec<Part>, CatalogError> {
        let rows = sqlx::query("SELECT id, name, brand FROM parts ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_parts", e))?;

        rows.iter().map(part_from_row).collect()
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, CatalogError> {
        let rows = sqlx::query("SELECT id, name, location FROM warehouses ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_warehouses", e))?;

        rows.iter().map(warehouse_from_row).collect()
    }
}
