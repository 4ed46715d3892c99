//! Postgres-backed stock store (`stock_entries` + `stock_movements`).
//!
//! ## Movement transaction
//!
//! `apply` runs one transaction per movement:
//!
//! 1. `SELECT ... FOR UPDATE` the existing entries of the movement, ordered by
//!    warehouse id, so two opposite transfers lock in the same order and cannot
//!    deadlock.
//! 2. [`StockMovement::settle`] on the locked quantities decides acceptance.
//! 3. Source decrement guarded by `quantity >= $n`, destination upsert with a
//!    relative increment, journal insert.
//! 4. Commit. Any early return drops the transaction, which rolls it back.
//!
//! ## Error mapping
//!
//! | Postgres code | constraint | StockError |
//! |---|---|---|
//! | `23503` | `stock_entries_part_fk` / `stock_movements_part_fk` | `UnknownPart` |
//! | `23503` | `stock_entries_warehouse_fk` | `UnknownWarehouse` |
//! | `22003` | (bigint overflow) | `QuantityOverflow` |
//! | anything else | | `Persistence` |

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};
use uuid::Uuid;

use partsledger_core::{MovementId, PartId, UserId, WarehouseId};
use partsledger_inventory::{
    AppliedMovement, MovementKind, Quantity, StockEntry, StockError, StockKey, StockMovement,
    StockResult,
};

use super::StockStore;

#[derive(Debug, Clone)]
pub struct PostgresStockStore {
    pool: Arc<PgPool>,
}

impl PostgresStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

/// Map a sqlx error raised while applying `movement` (or reading, when `None`).
fn map_sqlx_error(operation: &str, err: sqlx::Error, movement: Option<&StockMovement>) -> StockError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            let (Some(code), Some(movement)) = (db_err.code(), movement) else {
                return StockError::Persistence(msg);
            };
            match (code.as_ref(), db_err.constraint()) {
                ("23503", Some("stock_entries_part_fk" | "stock_movements_part_fk")) => {
                    StockError::UnknownPart(movement.part_id.clone())
                }
                ("23503", Some("stock_entries_warehouse_fk")) => {
                    StockError::UnknownWarehouse(movement.destination().warehouse_id)
                }
                ("22003", _) => {
                    let key = movement.destination();
                    StockError::QuantityOverflow {
                        part_id: key.part_id,
                        warehouse_id: key.warehouse_id,
                    }
                }
                _ => StockError::Persistence(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StockError::Persistence(format!("connection pool closed in {operation}"))
        }
        other => StockError::Persistence(format!("sqlx error in {operation}: {other}")),
    }
}

struct EntryRow {
    part_id: String,
    warehouse_id: i64,
    quantity: i64,
}

impl<'r> FromRow<'r, PgRow> for EntryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            part_id: row.try_get("part_id")?,
            warehouse_id: row.try_get("warehouse_id")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl TryFrom<EntryRow> for StockEntry {
    type Error = StockError;

    fn try_from(row: EntryRow) -> StockResult<Self> {
        let part_id = PartId::new(row.part_id)
            .map_err(|e| StockError::persistence(format!("stored part id: {e}")))?;
        StockEntry::from_stored(
            StockKey::new(part_id, WarehouseId::new(row.warehouse_id)),
            row.quantity,
        )
    }
}

struct MovementRow {
    id: Uuid,
    part_id: String,
    kind: String,
    from_warehouse_id: Option<i64>,
    to_warehouse_id: i64,
    quantity: i64,
    actor: Option<Uuid>,
    occurred_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for MovementRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            part_id: row.try_get("part_id")?,
            kind: row.try_get("kind")?,
            from_warehouse_id: row.try_get("from_warehouse_id")?,
            to_warehouse_id: row.try_get("to_warehouse_id")?,
            quantity: row.try_get("quantity")?,
            actor: row.try_get("actor")?,
            occurred_at: row.try_get("occurred_at")?,
        })
    }
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = StockError;

    fn try_from(row: MovementRow) -> StockResult<Self> {
        let to = WarehouseId::new(row.to_warehouse_id);
        let kind = match (row.kind.as_str(), row.from_warehouse_id) {
            ("receipt", None) => MovementKind::Receipt { warehouse_id: to },
            ("transfer", Some(from)) => MovementKind::Transfer {
                from: WarehouseId::new(from),
                to,
            },
            (kind, from) => {
                return Err(StockError::persistence(format!(
                    "malformed movement {}: kind={kind} from={from:?}",
                    row.id
                )));
            }
        };
        Ok(StockMovement {
            id: MovementId::from_uuid(row.id),
            part_id: PartId::new(row.part_id)
                .map_err(|e| StockError::persistence(format!("stored part id: {e}")))?,
            kind,
            quantity: Quantity::new(row.quantity)
                .map_err(|e| StockError::persistence(format!("stored movement quantity: {e}")))?,
            actor: row.actor.map(UserId::from_uuid),
            occurred_at: row.occurred_at,
        })
    }
}

fn kind_column(kind: &MovementKind) -> (&'static str, Option<i64>, i64) {
    match *kind {
        MovementKind::Receipt { warehouse_id } => ("receipt", None, warehouse_id.get()),
        MovementKind::Transfer { from, to } => ("transfer", Some(from.get()), to.get()),
    }
}

/// Lock the movement's existing entries in warehouse order.
async fn lock_entries(
    tx: &mut Transaction<'_, Postgres>,
    movement: &StockMovement,
) -> StockResult<HashMap<WarehouseId, i64>> {
    let warehouses: Vec<i64> = movement.warehouses().into_iter().map(WarehouseId::get).collect();

    let rows = sqlx::query(
        r#"
        SELECT warehouse_id, quantity
        FROM stock_entries
        WHERE part_id = $1 AND warehouse_id = ANY($2)
        ORDER BY warehouse_id
        FOR UPDATE
        "#,
    )
    .bind(movement.part_id.as_str())
    .bind(warehouses)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_entries", e, Some(movement)))?;

    rows.iter()
        .map(|row| {
            let warehouse_id: i64 = row
                .try_get("warehouse_id")
                .map_err(|e| map_sqlx_error("lock_entries", e, Some(movement)))?;
            let quantity: i64 = row
                .try_get("quantity")
                .map_err(|e| map_sqlx_error("lock_entries", e, Some(movement)))?;
            Ok((WarehouseId::new(warehouse_id), quantity))
        })
        .collect()
}

#[async_trait]
impl StockStore for PostgresStockStore {
    #[instrument(skip(self), fields(key = %key), err)]
    async fn quantity(&self, key: &StockKey) -> StockResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock_entries WHERE part_id = $1 AND warehouse_id = $2",
        )
        .bind(key.part_id.as_str())
        .bind(key.warehouse_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("quantity", e, None))?;

        Ok(quantity.unwrap_or(0))
    }

    #[instrument(skip(self), fields(part_id = %part_id), err)]
    async fn entries_for_part(&self, part_id: &PartId) -> StockResult<Vec<StockEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT part_id, warehouse_id, quantity
            FROM stock_entries
            WHERE part_id = $1
            ORDER BY warehouse_id
            "#,
        )
        .bind(part_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("entries_for_part", e, None))?;

        rows.iter()
            .map(|row| {
                EntryRow::from_row(row)
                    .map_err(|e| map_sqlx_error("entries_for_part", e, None))
                    .and_then(StockEntry::try_from)
            })
            .collect()
    }

    #[instrument(skip(self), fields(warehouse_id = %warehouse_id), err)]
    async fn entries_for_warehouse(&self, warehouse_id: WarehouseId) -> StockResult<Vec<StockEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT part_id, warehouse_id, quantity
            FROM stock_entries
            WHERE warehouse_id = $1
            ORDER BY part_id
            "#,
        )
        .bind(warehouse_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("entries_for_warehouse", e, None))?;

        rows.iter()
            .map(|row| {
                EntryRow::from_row(row)
                    .map_err(|e| map_sqlx_error("entries_for_warehouse", e, None))
                    .and_then(StockEntry::try_from)
            })
            .collect()
    }

    #[instrument(
        skip(self, movement),
        fields(
            movement_id = %movement.id,
            movement_type = movement.movement_type(),
            part_id = %movement.part_id,
            quantity = movement.quantity.get(),
            on_hand = tracing::field::Empty
        ),
        err
    )]
    async fn apply(&self, movement: StockMovement) -> StockResult<AppliedMovement> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e, None))?;

        let locked = lock_entries(&mut tx, &movement).await?;

        // Rejections (insufficient stock, overflow) return here; dropping `tx`
        // releases the row locks without writing anything.
        let settled = movement.settle(|k| locked.get(&k.warehouse_id).copied().unwrap_or(0))?;
        let qty = movement.quantity.get();

        let source = match &settled.source {
            Some(entry) => {
                let remaining: Option<i64> = sqlx::query_scalar(
                    r#"
                    UPDATE stock_entries
                    SET quantity = quantity - $3, updated_at = NOW()
                    WHERE part_id = $1 AND warehouse_id = $2 AND quantity >= $3
                    RETURNING quantity
                    "#,
                )
                .bind(movement.part_id.as_str())
                .bind(entry.warehouse_id().get())
                .bind(qty)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("withdraw", e, Some(&movement)))?;

                let remaining = remaining.ok_or_else(|| StockError::InsufficientStock {
                    part_id: movement.part_id.clone(),
                    warehouse_id: entry.warehouse_id(),
                    available: locked.get(&entry.warehouse_id()).copied().unwrap_or(0),
                    requested: qty,
                })?;
                Some(StockEntry::from_stored(entry.key.clone(), remaining)?)
            }
            None => None,
        };

        let dest_key = settled.destination.key.clone();
        let on_hand: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO stock_entries (part_id, warehouse_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (part_id, warehouse_id)
            DO UPDATE SET
                quantity = stock_entries.quantity + EXCLUDED.quantity,
                updated_at = NOW()
            RETURNING quantity
            "#,
        )
        .bind(dest_key.part_id.as_str())
        .bind(dest_key.warehouse_id.get())
        .bind(qty)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("deposit", e, Some(&movement)))?;
        let destination = StockEntry::from_stored(dest_key, on_hand)?;

        let (kind, from, to) = kind_column(&movement.kind);
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, part_id, kind, from_warehouse_id, to_warehouse_id,
                quantity, actor, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.part_id.as_str())
        .bind(kind)
        .bind(from)
        .bind(to)
        .bind(qty)
        .bind(movement.actor.as_ref().map(|a| *a.as_uuid()))
        .bind(movement.occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_movement", e, Some(&movement)))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e, Some(&movement)))?;

        Span::current().record("on_hand", destination.quantity());
        Ok(AppliedMovement {
            movement,
            source,
            destination,
        })
    }

    #[instrument(skip(self), fields(part_id = %part_id), err)]
    async fn movements_for_part(&self, part_id: &PartId, limit: usize) -> StockResult<Vec<StockMovement>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT id, part_id, kind, from_warehouse_id, to_warehouse_id,
                   quantity, actor, occurred_at
            FROM stock_movements
            WHERE part_id = $1
            ORDER BY occurred_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(part_id.as_str())
        .bind(limit)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("movements_for_part", e, None))?;

        rows.iter()
            .map(|row| {
                MovementRow::from_row(row)
                    .map_err(|e| map_sqlx_error("movements_for_part", e, None))
                    .and_then(StockMovement::try_from)
            })
            .collect()
    }
}
