use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};
use cafe_core::{
    CoreError, CoreResult, OrderNumberSource, OrderReceipt, OrderRepository, PendingOrder, PersistedOrder,
};

use crate::sequence::OrderNumberAllocator;

/// Order history kept as a JSON array in one file, oldest first.
///
/// Every operation reads the file and writes it back whole; the mutex
/// serializes those read-modify-write cycles.
pub struct JsonFileOrderStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    numbers: OrderNumberAllocator,
}

impl JsonFileOrderStore {
    /// Open (or create) the history file and continue its numbering
    pub async fn open(path: impl Into<PathBuf>, first_order_number: u64) -> CoreResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage_error)?;
        }

        // An existing file is kept as is, even if unreadable, until the next write.
        if !tokio::fs::try_exists(&path).await.map_err(storage_error)? {
            save_orders(&path, &[]).await?;
            info!("Created empty order history at {}", path.display());
        }

        let existing = load_orders(&path).await?;
        let numbers = OrderNumberAllocator::seeded(first_order_number, existing.iter().map(|o| o.order_number));
        info!(
            "Order history {} holds {} orders; next order number {}",
            path.display(),
            existing.len(),
            numbers.peek_next()
        );

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            numbers,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OrderRepository for JsonFileOrderStore {
    async fn submit_order(&self, order: &PendingOrder) -> CoreResult<OrderReceipt> {
        order.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut orders = load_orders(&self.path).await?;

        if let Some(existing) = orders.iter().find(|o| o.snapshot_id == order.snapshot_id()) {
            info!(
                "Snapshot {} already stored as order {}",
                order.snapshot_id(),
                existing.order_number
            );
            return Ok(existing.receipt());
        }

        let mut number = self.numbers.claim(order.order_number());
        while orders.iter().any(|o| o.order_number == number) {
            number = self.numbers.claim(None);
        }

        let persisted = PersistedOrder::from_pending(order, number);
        let receipt = persisted.receipt();
        orders.push(persisted);
        save_orders(&self.path, &orders).await?;

        info!(
            "Order {} saved: {} {} paise",
            number,
            order.payment_method(),
            order.total()
        );
        Ok(receipt)
    }

    async fn list_orders(&self) -> CoreResult<Vec<PersistedOrder>> {
        let mut orders = load_orders(&self.path).await?;
        orders.reverse();
        Ok(orders)
    }

    async fn clear_orders(&self) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        save_orders(&self.path, &[]).await?;
        warn!("Order history at {} cleared", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl OrderNumberSource for JsonFileOrderStore {
    async fn reserve_order_number(&self, requested: Option<u64>) -> CoreResult<u64> {
        Ok(self.numbers.reserve(requested))
    }
}

/// A missing or unparsable file reads as an empty history
async fn load_orders(path: &Path) -> CoreResult<Vec<PersistedOrder>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(storage_error(e)),
    };

    match serde_json::from_str(&raw) {
        Ok(orders) => Ok(orders),
        Err(e) => {
            warn!("Order history {} is unreadable ({}); treating it as empty", path.display(), e);
            Ok(Vec::new())
        }
    }
}

async fn save_orders(path: &Path, orders: &[PersistedOrder]) -> CoreResult<()> {
    let json = serde_json::to_vec_pretty(orders).map_err(|e| CoreError::InternalError(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await.map_err(storage_error)?;
    tokio::fs::rename(&tmp, path).await.map_err(storage_error)?;
    Ok(())
}

fn storage_error(e: std::io::Error) -> CoreError {
    CoreError::StorageError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::{OrderLine, PaymentMethod};

    fn scratch_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("cafe-store-{}", uuid::Uuid::new_v4()))
            .join("orders.json")
    }

    fn pending(method: PaymentMethod, number: Option<u64>) -> PendingOrder {
        let mut tea = OrderLine::new("tea", "Tea", 1000);
        tea.quantity = 2;
        PendingOrder::snapshot(&[OrderLine::new("coffee", "Coffee", 15000), tea], method, number)
    }

    #[tokio::test]
    async fn test_numbers_start_at_first_and_list_newest_first() {
        let path = scratch_file();
        let store = JsonFileOrderStore::open(&path, 1001).await.unwrap();

        let first = store.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();
        let second = store.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();
        assert_eq!(first.order_number, 1001);
        assert_eq!(second.order_number, 1002);

        let listed = store.list_orders().await.unwrap();
        assert_eq!(listed[0].order_number, 1002);
        assert_eq!(listed[1].order_number, 1001);
        assert_eq!(listed[0].total, 17000);
    }

    #[tokio::test]
    async fn test_resubmitting_snapshot_is_idempotent() {
        let store = JsonFileOrderStore::open(scratch_file(), 1001).await.unwrap();
        let order = pending(PaymentMethod::Cash, None);

        let first = store.submit_order(&order).await.unwrap();
        let again = store.submit_order(&order).await.unwrap();

        assert_eq!(first, again);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reserved_number_is_used_for_upi_order() {
        let store = JsonFileOrderStore::open(scratch_file(), 1001).await.unwrap();

        let reserved = store.reserve_order_number(None).await.unwrap();
        let cash = store.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();
        let upi = store.submit_order(&pending(PaymentMethod::Upi, Some(reserved))).await.unwrap();

        assert_eq!(reserved, 1001);
        assert_eq!(cash.order_number, 1002);
        assert_eq!(upi.order_number, 1001);
    }

    #[tokio::test]
    async fn test_reopen_continues_numbering() {
        let path = scratch_file();
        {
            let store = JsonFileOrderStore::open(&path, 1001).await.unwrap();
            store.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();
            store.submit_order(&pending(PaymentMethod::Upi, None)).await.unwrap();
        }

        let reopened = JsonFileOrderStore::open(&path, 1001).await.unwrap();
        let receipt = reopened.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();
        assert_eq!(receipt.order_number, 1003);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let path = scratch_file();
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = JsonFileOrderStore::open(&path, 1001).await.unwrap();
        assert!(store.list_orders().await.unwrap().is_empty());

        let receipt = store.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();
        assert_eq!(receipt.order_number, 1001);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_keeps_numbers_moving_forward() {
        let store = JsonFileOrderStore::open(scratch_file(), 1001).await.unwrap();
        store.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();

        store.clear_orders().await.unwrap();
        assert!(store.list_orders().await.unwrap().is_empty());

        let receipt = store.submit_order(&pending(PaymentMethod::Cash, None)).await.unwrap();
        assert_eq!(receipt.order_number, 1002);
    }

    #[tokio::test]
    async fn test_invalid_snapshot_rejected() {
        let store = JsonFileOrderStore::open(scratch_file(), 1001).await.unwrap();
        let empty = PendingOrder::snapshot(&[], PaymentMethod::Cash, None);

        let err = store.submit_order(&empty).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert!(store.list_orders().await.unwrap().is_empty());
    }
}
