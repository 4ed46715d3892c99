use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use partsledger_core::{MovementId, PartId, UserId, WarehouseId};

use crate::command::{Receipt, Transfer};
use crate::error::StockResult;
use crate::stock::{Quantity, StockEntry, StockKey};

/// What a movement did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementKind {
    Receipt {
        warehouse_id: WarehouseId,
    },
    Transfer {
        from: WarehouseId,
        to: WarehouseId,
    },
}

/// Journal record of one receipt or transfer (immutable, append-only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub part_id: PartId,
    #[serde(flatten)]
    pub kind: MovementKind,
    pub quantity: Quantity,
    pub actor: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Result of applying a movement: the journal record plus post-movement balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMovement {
    pub movement: StockMovement,
    /// Source balance after a transfer; `None` for receipts.
    pub source: Option<StockEntry>,
    pub destination: StockEntry,
}

impl StockMovement {
    pub fn receipt(cmd: &Receipt, actor: Option<UserId>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: MovementId::new(),
            part_id: cmd.part_id.clone(),
            kind: MovementKind::Receipt {
                warehouse_id: cmd.warehouse_id,
            },
            quantity: cmd.quantity,
            actor,
            occurred_at,
        }
    }

    pub fn transfer(cmd: &Transfer, actor: Option<UserId>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: MovementId::new(),
            part_id: cmd.part_id.clone(),
            kind: MovementKind::Transfer {
                from: cmd.from,
                to: cmd.to,
            },
            quantity: cmd.quantity,
            actor,
            occurred_at,
        }
    }

    /// Stable movement name (e.g. "inventory.stock.transferred").
    pub fn movement_type(&self) -> &'static str {
        match self.kind {
            MovementKind::Receipt { .. } => "inventory.stock.received",
            MovementKind::Transfer { .. } => "inventory.stock.transferred",
        }
    }

    /// Entry decremented by this movement, if any.
    pub fn source(&self) -> Option<StockKey> {
        match self.kind {
            MovementKind::Receipt { .. } => None,
            MovementKind::Transfer { from, .. } => Some(StockKey::new(self.part_id.clone(), from)),
        }
    }

    /// Entry incremented (or created) by this movement.
    pub fn destination(&self) -> StockKey {
        match self.kind {
            MovementKind::Receipt { warehouse_id } => {
                StockKey::new(self.part_id.clone(), warehouse_id)
            }
            MovementKind::Transfer { to, .. } => StockKey::new(self.part_id.clone(), to),
        }
    }

    /// Warehouses touched by this movement, ascending (lock order for stores).
    pub fn warehouses(&self) -> Vec<WarehouseId> {
        match self.kind {
            MovementKind::Receipt { warehouse_id } => vec![warehouse_id],
            MovementKind::Transfer { from, to } => {
                let mut ids = vec![from, to];
                ids.sort();
                ids
            }
        }
    }

    /// Compute post-movement balances from current quantities.
    ///
    /// `current` returns the quantity on hand for a key (0 when absent). This is
    /// pure: callers must hold whatever lock or transaction makes the read and the
    /// subsequent write of the returned entries one atomic step.
    pub fn settle(&self, current: impl Fn(&StockKey) -> i64) -> StockResult<AppliedMovement> {
        let source = match self.source() {
            Some(key) => {
                let available = current(&key);
                Some(StockEntry::from_stored(key, available)?.withdraw(self.quantity)?)
            }
            None => None,
        };

        let dest_key = self.destination();
        let on_hand = current(&dest_key);
        let destination = StockEntry::from_stored(dest_key, on_hand)?.deposit(self.quantity)?;

        Ok(AppliedMovement {
            movement: self.clone(),
            source,
            destination,
        })
    }
}
