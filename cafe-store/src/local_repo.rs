use std::collections::HashMap;
use std::sync::Mutex;
use async_trait::async_trait;
use tracing::{info, warn};
use cafe_core::{
    CoreError, CoreResult, OrderNumberSource, OrderReceipt, OrderRepository, PendingOrder, PersistedOrder,
};

use crate::sequence::OrderNumberAllocator;

pub const HISTORY_KEY: &str = "order_history";

/// Local-only fallback for a till with no order API.
///
/// Mirrors browser-style storage: the whole history is one JSON string
/// under [`HISTORY_KEY`], newest first.
pub struct LocalOrderStore {
    entries: Mutex<HashMap<String, String>>,
    numbers: OrderNumberAllocator,
}

impl LocalOrderStore {
    pub fn new(first_order_number: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            numbers: OrderNumberAllocator::new(first_order_number),
        }
    }

    fn read_history(entries: &HashMap<String, String>) -> Vec<PersistedOrder> {
        match entries.get(HISTORY_KEY) {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Local order history is unreadable ({}); starting fresh", e);
                Vec::new()
            }),
        }
    }

    fn write_history(entries: &mut HashMap<String, String>, history: &[PersistedOrder]) -> CoreResult<()> {
        let raw = serde_json::to_string(history).map_err(|e| CoreError::InternalError(e.to_string()))?;
        entries.insert(HISTORY_KEY.to_string(), raw);
        Ok(())
    }

    fn entries(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CoreError::StorageError("local order store lock poisoned".to_string()))
    }
}

impl Default for LocalOrderStore {
    fn default() -> Self {
        Self::new(1001)
    }
}

#[async_trait]
impl OrderRepository for LocalOrderStore {
    async fn submit_order(&self, order: &PendingOrder) -> CoreResult<OrderReceipt> {
        order.validate()?;

        let mut entries = self.entries()?;
        let mut history = Self::read_history(&entries);

        if let Some(existing) = history.iter().find(|o| o.snapshot_id == order.snapshot_id()) {
            return Ok(existing.receipt());
        }

        let persisted = PersistedOrder::from_pending(order, self.numbers.claim(order.order_number()));
        let receipt = persisted.receipt();
        history.insert(0, persisted);
        Self::write_history(&mut entries, &history)?;

        info!("Order {} saved locally", receipt.order_number);
        Ok(receipt)
    }

    async fn list_orders(&self) -> CoreResult<Vec<PersistedOrder>> {
        let entries = self.entries()?;
        Ok(Self::read_history(&entries))
    }

    async fn clear_orders(&self) -> CoreResult<()> {
        self.entries()?.remove(HISTORY_KEY);
        warn!("Local order history cleared");
        Ok(())
    }
}

#[async_trait]
impl OrderNumberSource for LocalOrderStore {
    async fn reserve_order_number(&self, requested: Option<u64>) -> CoreResult<u64> {
        Ok(self.numbers.reserve(requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::{OrderLine, PaymentMethod};

    fn pending(method: PaymentMethod) -> PendingOrder {
        PendingOrder::snapshot(&[OrderLine::new("samosa", "Samosa", 2000)], method, None)
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let store = LocalOrderStore::default();
        store.submit_order(&pending(PaymentMethod::Cash)).await.unwrap();
        store.submit_order(&pending(PaymentMethod::Upi)).await.unwrap();

        let history = store.list_orders().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].order_number, 1002);
        assert_eq!(history[0].payment_method, PaymentMethod::Upi);
    }

    #[tokio::test]
    async fn test_history_lives_under_one_key() {
        let store = LocalOrderStore::default();
        store.submit_order(&pending(PaymentMethod::Cash)).await.unwrap();

        let entries = store.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(HISTORY_KEY));
    }

    #[tokio::test]
    async fn test_clear_and_idempotent_submit() {
        let store = LocalOrderStore::default();
        let order = pending(PaymentMethod::Cash);
        let first = store.submit_order(&order).await.unwrap();
        assert_eq!(store.submit_order(&order).await.unwrap(), first);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);

        store.clear_orders().await.unwrap();
        assert!(store.list_orders().await.unwrap().is_empty());
    }
}
