use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use cafe_catalog::MenuCatalog;
use cafe_core::{
    CoreError, CoreResult, OrderReceipt, OrderRepository, PendingOrder, PersistedOrder, QrArtifact, QrGenerator,
    QrRequest,
};

use crate::cart::CartStore;

/// In-memory stand-in for the order API, with failure and latency switches
pub struct FakeBackend {
    orders: Mutex<Vec<PersistedOrder>>,
    next_number: AtomicU64,
    failing: AtomicBool,
    lost_responses: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    submit_calls: AtomicUsize,
    qr_calls: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            next_number: AtomicU64::new(1001),
            failing: AtomicBool::new(false),
            lost_responses: AtomicUsize::new(0),
            delay: Mutex::new(None),
            submit_calls: AtomicUsize::new(0),
            qr_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeBackend {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Next submit is stored but the caller sees a dropped connection
    pub fn lose_next_response(&self) {
        self.lost_responses.fetch_add(1, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn stored(&self) -> Vec<PersistedOrder> {
        self.orders.lock().unwrap().clone()
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn qr_calls(&self) -> usize {
        self.qr_calls.load(Ordering::SeqCst)
    }

    async fn latency(&self) -> CoreResult<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::NetworkError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for FakeBackend {
    async fn submit_order(&self, order: &PendingOrder) -> CoreResult<OrderReceipt> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.latency().await?;

        let mut orders = self.orders.lock().unwrap();
        if let Some(existing) = orders.iter().find(|o| o.snapshot_id == order.snapshot_id()) {
            return Ok(existing.receipt());
        }
        let number = order
            .order_number()
            .unwrap_or_else(|| self.next_number.fetch_add(1, Ordering::SeqCst));
        let persisted = PersistedOrder::from_pending(order, number);
        let receipt = persisted.receipt();
        orders.insert(0, persisted);

        let lost = self
            .lost_responses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lost {
            return Err(CoreError::NetworkError("connection reset".to_string()));
        }
        Ok(receipt)
    }

    async fn list_orders(&self) -> CoreResult<Vec<PersistedOrder>> {
        self.latency().await?;
        Ok(self.stored())
    }

    async fn clear_orders(&self) -> CoreResult<()> {
        self.latency().await?;
        self.orders.lock().unwrap().clear();
        Ok(())
    }
}

#[async_trait]
impl QrGenerator for FakeBackend {
    async fn generate_qr(&self, request: &QrRequest) -> CoreResult<QrArtifact> {
        self.qr_calls.fetch_add(1, Ordering::SeqCst);
        self.latency().await?;

        let order_number = request
            .order_number
            .unwrap_or_else(|| self.next_number.fetch_add(1, Ordering::SeqCst));
        Ok(QrArtifact {
            order_number,
            payload: format!("upi://pay?pa=test@upi&am={}", request.total),
            total: request.total,
            qr_image: String::new(),
            qr_url: String::new(),
        })
    }
}

pub fn cart_with(selections: &[(&str, Option<&str>)]) -> CartStore {
    let mut cart = CartStore::new(Arc::new(MenuCatalog::cafe_default()));
    for (item, variant) in selections {
        cart.add_item(item, *variant, None).unwrap();
    }
    cart
}
