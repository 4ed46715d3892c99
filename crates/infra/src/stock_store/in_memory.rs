use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use partsledger_core::{PartId, WarehouseId};
use partsledger_inventory::{
    AppliedMovement, StockEntry, StockError, StockKey, StockMovement, StockResult,
};

use super::StockStore;

#[derive(Debug, Default)]
struct Book {
    entries: HashMap<StockKey, i64>,
    journal: Vec<StockMovement>,
}

/// In-memory stock store.
///
/// Intended for tests/dev. A single write guard covers settle + write +
/// journal append, and nothing awaits while it is held, so each `apply` is
/// atomic and all applies serialize.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    inner: RwLock<Book>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StockError {
    StockError::persistence("lock poisoned")
}

fn collect_sorted(
    book: &Book,
    filter: impl Fn(&StockKey) -> bool,
) -> StockResult<Vec<StockEntry>> {
    let mut entries = book
        .entries
        .iter()
        .filter(|(k, _)| filter(k))
        .map(|(k, q)| StockEntry::from_stored(k.clone(), *q))
        .collect::<StockResult<Vec<_>>>()?;
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(entries)
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn quantity(&self, key: &StockKey) -> StockResult<i64> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        Ok(book.entries.get(key).copied().unwrap_or(0))
    }

    async fn entries_for_part(&self, part_id: &PartId) -> StockResult<Vec<StockEntry>> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        collect_sorted(&book, |k| &k.part_id == part_id)
    }

    async fn entries_for_warehouse(&self, warehouse_id: WarehouseId) -> StockResult<Vec<StockEntry>> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        collect_sorted(&book, |k| k.warehouse_id == warehouse_id)
    }

    async fn apply(&self, movement: StockMovement) -> StockResult<AppliedMovement> {
        let mut book = self.inner.write().map_err(|_| poisoned())?;

        let applied = movement.settle(|k| book.entries.get(k).copied().unwrap_or(0))?;

        if let Some(source) = &applied.source {
            book.entries.insert(source.key.clone(), source.quantity());
        }
        book.entries.insert(
            applied.destination.key.clone(),
            applied.destination.quantity(),
        );
        book.journal.push(applied.movement.clone());

        Ok(applied)
    }

    async fn movements_for_part(&self, part_id: &PartId, limit: usize) -> StockResult<Vec<StockMovement>> {
        let book = self.inner.read().map_err(|_| poisoned())?;
        Ok(book
            .journal
            .iter()
            .rev()
            .filter(|m| &m.part_id == part_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use partsledger_inventory::{Receipt, Transfer};

    use super::*;

    fn part() -> PartId {
        PartId::new("P1").unwrap()
    }

    fn key(w: i64) -> StockKey {
        StockKey::new(part(), WarehouseId::new(w))
    }

    async fn receive(store: &InMemoryStockStore, w: i64, qty: i64) {
        let cmd = Receipt::new(part(), WarehouseId::new(w), qty).unwrap();
        store
            .apply(StockMovement::receipt(&cmd, None, Utc::now()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_transfer_leaves_no_trace() {
        let store = InMemoryStockStore::new();
        receive(&store, 1, 3).await;

        let cmd = Transfer::new(part(), WarehouseId::new(1), WarehouseId::new(2), 5).unwrap();
        let err = store
            .apply(StockMovement::transfer(&cmd, None, Utc::now()))
            .await
            .unwrap_err();

        assert!(matches!(err, StockError::InsufficientStock { .. }));
        assert_eq!(store.quantity(&key(1)).await.unwrap(), 3);
        assert_eq!(store.quantity(&key(2)).await.unwrap(), 0);
        assert_eq!(store.entries_for_part(&part()).await.unwrap().len(), 1);
        assert_eq!(store.movements_for_part(&part(), 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn drained_entries_are_retained_at_zero() {
        let store = InMemoryStockStore::new();
        receive(&store, 1, 2).await;

        let cmd = Transfer::new(part(), WarehouseId::new(1), WarehouseId::new(2), 2).unwrap();
        store
            .apply(StockMovement::transfer(&cmd, None, Utc::now()))
            .await
            .unwrap();

        let entries = store.entries_for_part(&part()).await.unwrap();
        let quantities: Vec<(i64, i64)> = entries
            .iter()
            .map(|e| (e.warehouse_id().get(), e.quantity()))
            .collect();
        assert_eq!(quantities, vec![(1, 0), (2, 2)]);
    }

    #[tokio::test]
    async fn journal_is_newest_first_and_limited() {
        let store = InMemoryStockStore::new();
        for qty in 1..=5 {
            receive(&store, 1, qty).await;
        }

        let recent = store.movements_for_part(&part(), 2).await.unwrap();
        let quantities: Vec<i64> = recent.iter().map(|m| m.quantity.get()).collect();
        assert_eq!(quantities, vec![5, 4]);
    }
}
