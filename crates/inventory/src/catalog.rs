//! Catalog records referenced by the ledger.
//!
//! The ledger only needs to know whether a part or warehouse id resolves; the
//! records themselves are owned by the catalog store.

use serde::{Deserialize, Serialize};

use partsledger_core::{DomainError, DomainResult, Entity, PartId, WarehouseId};

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub location: Option<String>,
}

impl Entity for Part {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Registration request for a part. Without an id, one is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPart {
    pub id: Option<PartId>,
    pub name: String,
    pub brand: Option<String>,
}

impl NewPart {
    /// Validate and normalize into a catalog record.
    pub fn into_part(self) -> DomainResult<Part> {
        Ok(Part {
            id: self.id.unwrap_or_else(PartId::generate),
            name: required_name(&self.name)?,
            brand: optional_text(self.brand),
        })
    }
}

/// Registration request for a warehouse. Ids are assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWarehouse {
    pub name: String,
    pub location: Option<String>,
}

impl NewWarehouse {
    /// Validate and normalize; the caller supplies the assigned id.
    pub fn into_warehouse(self, id: WarehouseId) -> DomainResult<Warehouse> {
        Ok(Warehouse {
            id,
            name: required_name(&self.name)?,
            location: optional_text(self.location),
        })
    }

    /// Validated and normalized copy, for stores that assign the id on insert.
    pub fn normalized(self) -> DomainResult<Self> {
        Ok(Self {
            name: required_name(&self.name)?,
            location: optional_text(self.location),
        })
    }
}

fn required_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name longer than {MAX_NAME_LEN} bytes"
        )));
    }
    Ok(name.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
