use serde::{Deserialize, Serialize};

use partsledger_core::{Entity, PartId, ValueObject, WarehouseId};

use crate::error::{StockError, StockResult};

/// Composite key of a stock entry: one part at one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub part_id: PartId,
    pub warehouse_id: WarehouseId,
}

impl StockKey {
    pub fn new(part_id: PartId, warehouse_id: WarehouseId) -> Self {
        Self {
            part_id,
            warehouse_id,
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.part_id, self.warehouse_id)
    }
}

/// A strictly positive number of units moved by a receipt or transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    pub fn new(units: i64) -> StockResult<Self> {
        if units <= 0 {
            return Err(StockError::InvalidQuantity(units));
        }
        Ok(Self(units))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl ValueObject for Quantity {}

impl TryFrom<i64> for Quantity {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Quantity on hand for one part at one warehouse.
///
/// Invariant: `quantity >= 0`. The only ways to change it are [`deposit`] and
/// [`withdraw`], both of which return a new entry and leave `self` untouched,
/// so a failed step never leaves a half-updated value behind.
///
/// [`deposit`]: StockEntry::deposit
/// [`withdraw`]: StockEntry::withdraw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub key: StockKey,
    quantity: i64,
}

impl StockEntry {
    /// Entry for a pair that has never been stocked.
    pub fn empty(key: StockKey) -> Self {
        Self { key, quantity: 0 }
    }

    /// Rebuild an entry from stored state.
    pub fn from_stored(key: StockKey, quantity: i64) -> StockResult<Self> {
        if quantity < 0 {
            return Err(StockError::persistence(format!(
                "stored quantity for {key} is negative ({quantity})"
            )));
        }
        Ok(Self { key, quantity })
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn part_id(&self) -> &PartId {
        &self.key.part_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.key.warehouse_id
    }

    pub fn deposit(&self, quantity: Quantity) -> StockResult<Self> {
        let quantity = self
            .quantity
            .checked_add(quantity.get())
            .ok_or_else(|| StockError::QuantityOverflow {
                part_id: self.key.part_id.clone(),
                warehouse_id: self.key.warehouse_id,
            })?;
        Ok(Self {
            key: self.key.clone(),
            quantity,
        })
    }

    pub fn withdraw(&self, quantity: Quantity) -> StockResult<Self> {
        if self.quantity < quantity.get() {
            return Err(StockError::InsufficientStock {
                part_id: self.key.part_id.clone(),
                warehouse_id: self.key.warehouse_id,
                available: self.quantity,
                requested: quantity.get(),
            });
        }
        Ok(Self {
            key: self.key.clone(),
            quantity: self.quantity - quantity.get(),
        })
    }
}

impl Entity for StockEntry {
    type Id = StockKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }
}
