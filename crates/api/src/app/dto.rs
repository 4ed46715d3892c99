use serde::Deserialize;

use partsledger_core::{PartId, WarehouseId};
use partsledger_inventory::{
    AppliedMovement, MovementKind, NewPart, NewWarehouse, Part, StockEntry, StockMovement,
    Warehouse,
};

use crate::app::errors;

/// Default and maximum page size of the movement journal.
pub const DEFAULT_MOVEMENT_LIMIT: usize = 50;
pub const MAX_MOVEMENT_LIMIT: usize = 500;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterPartRequest {
    pub id: Option<String>,
    pub name: String,
    pub brand: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterWarehouseRequest {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveStockRequest {
    pub part_id: String,
    pub warehouse_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct TransferStockRequest {
    pub part_id: String,
    pub from_warehouse_id: i64,
    pub to_warehouse_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    pub limit: Option<usize>,
}

impl MovementsQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_MOVEMENT_LIMIT)
            .clamp(1, MAX_MOVEMENT_LIMIT)
    }
}

impl RegisterPartRequest {
    pub fn into_new_part(self) -> Result<NewPart, axum::response::Response> {
        let id = self.id.map(|raw| parse_part_id(&raw)).transpose()?;
        Ok(NewPart {
            id,
            name: self.name,
            brand: self.brand,
        })
    }
}

impl From<RegisterWarehouseRequest> for NewWarehouse {
    fn from(body: RegisterWarehouseRequest) -> Self {
        NewWarehouse {
            name: body.name,
            location: body.location,
        }
    }
}

pub fn parse_part_id(raw: &str) -> Result<PartId, axum::response::Response> {
    PartId::new(raw).map_err(errors::domain_error_to_response)
}

pub fn parse_warehouse_id(raw: &str) -> Result<WarehouseId, axum::response::Response> {
    raw.parse::<WarehouseId>()
        .map_err(errors::domain_error_to_response)
}

// -------------------------
// Response mapping
// -------------------------

pub fn part_to_json(part: Part) -> serde_json::Value {
    serde_json::json!({
        "id": part.id.as_str(),
        "name": part.name,
        "brand": part.brand,
    })
}

pub fn warehouse_to_json(warehouse: Warehouse) -> serde_json::Value {
    serde_json::json!({
        "id": warehouse.id.get(),
        "name": warehouse.name,
        "location": warehouse.location,
    })
}

pub fn entry_to_json(entry: &StockEntry) -> serde_json::Value {
    serde_json::json!({
        "part_id": entry.part_id().as_str(),
        "warehouse_id": entry.warehouse_id().get(),
        "quantity": entry.quantity(),
    })
}

pub fn movement_to_json(movement: &StockMovement) -> serde_json::Value {
    let (from, to) = match movement.kind {
        MovementKind::Receipt { warehouse_id } => (None, warehouse_id.get()),
        MovementKind::Transfer { from, to } => (Some(from.get()), to.get()),
    };
    serde_json::json!({
        "id": movement.id.to_string(),
        "type": movement.movement_type(),
        "part_id": movement.part_id.as_str(),
        "from_warehouse_id": from,
        "to_warehouse_id": to,
        "quantity": movement.quantity.get(),
        "actor": movement.actor.map(|a| a.to_string()),
        "occurred_at": movement.occurred_at.to_rfc3339(),
    })
}

pub fn applied_to_json(applied: &AppliedMovement) -> serde_json::Value {
    serde_json::json!({
        "movement": movement_to_json(&applied.movement),
        "source": applied.source.as_ref().map(entry_to_json),
        "destination": entry_to_json(&applied.destination),
    })
}
