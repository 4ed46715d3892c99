use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use partsledger_core::{DomainError, PartId, WarehouseId};
use partsledger_inventory::{NewPart, NewWarehouse, Part, Warehouse};

use super::{Catalog, CatalogError};

#[derive(Debug, Default)]
struct Tables {
    parts: BTreeMap<PartId, Part>,
    warehouses: BTreeMap<WarehouseId, Warehouse>,
    last_warehouse_id: i64,
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<Tables>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> CatalogError {
    CatalogError::Persistence("lock poisoned".to_string())
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn register_part(&self, new: NewPart) -> Result<Part, CatalogError> {
        let part = new.into_part()?;
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        if tables.parts.contains_key(&part.id) {
            return Err(DomainError::conflict(format!("part {} already exists", part.id)).into());
        }
        tables.parts.insert(part.id.clone(), part.clone());
        Ok(part)
    }

    async fn register_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, CatalogError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let id = WarehouseId::new(tables.last_warehouse_id + 1);
        let warehouse = new.into_warehouse(id)?;
        tables.last_warehouse_id = id.get();
        tables.warehouses.insert(id, warehouse.clone());
        Ok(warehouse)
    }

    async fn part(&self, id: &PartId) -> Result<Option<Part>, CatalogError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.parts.get(id).cloned())
    }

    async fn warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, CatalogError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.warehouses.get(&id).cloned())
    }

    async fn list_parts(&self) -> Result<Vec<Part>, CatalogError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.parts.values().cloned().collect())
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, CatalogError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.warehouses.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_part(id: &str) -> NewPart {
        NewPart {
            id: Some(PartId::new(id).unwrap()),
            name: "Brake pad".to_string(),
            brand: None,
        }
    }

    #[tokio::test]
    async fn duplicate_part_id_conflicts() {
        let catalog = InMemoryCatalog::new();
        catalog.register_part(new_part("BRK-1")).await.unwrap();

        let err = catalog.register_part(new_part("BRK-1")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Conflict(_))));
        assert_eq!(catalog.list_parts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn warehouse_ids_are_sequential_and_skip_failed_registrations() {
        let catalog = InMemoryCatalog::new();
        let a = catalog
            .register_warehouse(NewWarehouse { name: "North".into(), location: None })
            .await
            .unwrap();
        assert!(catalog
            .register_warehouse(NewWarehouse { name: "".into(), location: None })
            .await
            .is_err());
        let b = catalog
            .register_warehouse(NewWarehouse { name: "South".into(), location: Some("Dock 4".into()) })
            .await
            .unwrap();

        assert_eq!(a.id, WarehouseId::new(1));
        assert_eq!(b.id, WarehouseId::new(2));
        assert_eq!(catalog.warehouse(b.id).await.unwrap(), Some(b));
        assert_eq!(catalog.warehouse(WarehouseId::new(3)).await.unwrap(), None);
    }
}
