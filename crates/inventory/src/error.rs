use thiserror::Error;

use partsledger_core::{PartId, WarehouseId};

pub type StockResult<T> = Result<T, StockError>;

/// Stock ledger failure.
///
/// Every variant except `Persistence` is deterministic and safe to show to the
/// caller. None of them is retried by the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i64),

    #[error("source and destination warehouse are the same ({0})")]
    SameWarehouse(WarehouseId),

    #[error(
        "insufficient stock of part {part_id} in warehouse {warehouse_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientStock {
        part_id: PartId,
        warehouse_id: WarehouseId,
        available: i64,
        requested: i64,
    },

    #[error("unknown part: {0}")]
    UnknownPart(PartId),

    #[error("unknown warehouse: {0}")]
    UnknownWarehouse(WarehouseId),

    #[error("quantity overflow for part {part_id} in warehouse {warehouse_id}")]
    QuantityOverflow {
        part_id: PartId,
        warehouse_id: WarehouseId,
    },

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl StockError {
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
