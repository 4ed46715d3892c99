use serde::{Deserialize, Serialize};

use partsledger_core::{PartId, WarehouseId};

use crate::error::{StockError, StockResult};
use crate::stock::Quantity;

/// Command: receive new stock of a part into a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub part_id: PartId,
    pub warehouse_id: WarehouseId,
    pub quantity: Quantity,
}

impl Receipt {
    pub fn new(part_id: PartId, warehouse_id: WarehouseId, quantity: i64) -> StockResult<Self> {
        Ok(Self {
            part_id,
            warehouse_id,
            quantity: Quantity::new(quantity)?,
        })
    }
}

/// Command: move stock of a part from one warehouse to another.
///
/// A transfer to the same warehouse is rejected rather than treated as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub part_id: PartId,
    pub from: WarehouseId,
    pub to: WarehouseId,
    pub quantity: Quantity,
}

impl Transfer {
    pub fn new(
        part_id: PartId,
        from: WarehouseId,
        to: WarehouseId,
        quantity: i64,
    ) -> StockResult<Self> {
        let quantity = Quantity::new(quantity)?;
        if from == to {
            return Err(StockError::SameWarehouse(from));
        }
        Ok(Self {
            part_id,
            from,
            to,
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part() -> PartId {
        PartId::new("P1").unwrap()
    }

    #[test]
    fn transfer_validates_quantity_before_warehouses() {
        let w = WarehouseId::new(1);
        assert_eq!(
            Transfer::new(part(), w, w, 0),
            Err(StockError::InvalidQuantity(0))
        );
    }

    #[test]
    fn transfer_to_self_is_rejected() {
        let w = WarehouseId::new(4);
        assert_eq!(
            Transfer::new(part(), w, w, 2),
            Err(StockError::SameWarehouse(w))
        );
    }

    #[test]
    fn receipt_rejects_negative_quantity() {
        assert_eq!(
            Receipt::new(part(), WarehouseId::new(1), -1),
            Err(StockError::InvalidQuantity(-1))
        );
    }
}
