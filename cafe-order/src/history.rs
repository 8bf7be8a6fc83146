use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use cafe_core::{OrderRepository, Paise, PaymentMethod, PersistedOrder};

use crate::errors::HistoryError;
use crate::orchestrator::DEFAULT_CALL_TIMEOUT;

/// The user's answer to "clear all order history?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearConfirmation {
    Confirmed,
    Declined,
}

/// Read-only projection of persisted orders, newest first
pub struct OrderHistoryView {
    orders: Arc<dyn OrderRepository>,
    call_timeout: Duration,
    snapshot: Vec<PersistedOrder>,
}

impl OrderHistoryView {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self {
            orders,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            snapshot: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Re-fetch history. On failure the previous snapshot is kept.
    pub async fn refresh(&mut self) -> Result<&[PersistedOrder], HistoryError> {
        let orders = tokio::time::timeout(self.call_timeout, self.orders.list_orders())
            .await
            .map_err(|_| HistoryError::Timeout(self.call_timeout))??;

        self.snapshot = orders;
        Ok(&self.snapshot)
    }

    /// Last fetched history
    pub fn orders(&self) -> &[PersistedOrder] {
        &self.snapshot
    }

    /// Total taken per payment method over the last fetched history
    pub fn takings(&self) -> Vec<(PaymentMethod, Paise)> {
        [PaymentMethod::Cash, PaymentMethod::Upi]
            .into_iter()
            .map(|method| {
                let sum = self
                    .snapshot
                    .iter()
                    .filter(|o| o.payment_method == method)
                    .fold(0, |sum: Paise, o| sum.saturating_add(o.total));
                (method, sum)
            })
            .collect()
    }

    /// Wipe the persisted history. Irreversible, so it needs an explicit yes.
    pub async fn clear(&mut self, confirmation: ClearConfirmation) -> Result<(), HistoryError> {
        if confirmation != ClearConfirmation::Confirmed {
            warn!("Clear history declined");
            return Err(HistoryError::NotConfirmed);
        }

        tokio::time::timeout(self.call_timeout, self.orders.clear_orders())
            .await
            .map_err(|_| HistoryError::Timeout(self.call_timeout))??;

        self.snapshot.clear();
        info!("Order history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::PendingOrder;
    use crate::test_support::{cart_with, FakeBackend};

    async fn seeded() -> Arc<FakeBackend> {
        let backend = Arc::new(FakeBackend::default());
        let first = cart_with(&[("coffee", None)]);
        let second = cart_with(&[("tea", None), ("tea", None)]);
        backend
            .submit_order(&PendingOrder::snapshot(first.lines(), PaymentMethod::Cash, None))
            .await
            .unwrap();
        backend
            .submit_order(&PendingOrder::snapshot(second.lines(), PaymentMethod::Upi, None))
            .await
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn test_refresh_lists_newest_first() {
        let backend = seeded().await;
        let mut history = OrderHistoryView::new(backend);

        let orders = history.refresh().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, 1002);
        assert_eq!(orders[1].order_number, 1001);
        assert_eq!(
            history.takings(),
            vec![(PaymentMethod::Cash, 15000), (PaymentMethod::Upi, 2000)]
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let backend = seeded().await;
        let mut history = OrderHistoryView::new(backend.clone());
        history.refresh().await.unwrap();

        backend.set_failing(true);
        assert!(history.refresh().await.is_err());
        assert_eq!(history.orders().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let backend = seeded().await;
        let mut history = OrderHistoryView::new(backend.clone());

        let err = history.clear(ClearConfirmation::Declined).await.unwrap_err();
        assert!(matches!(err, HistoryError::NotConfirmed));
        assert_eq!(backend.stored().len(), 2);

        history.clear(ClearConfirmation::Confirmed).await.unwrap();
        assert!(backend.stored().is_empty());
        assert!(history.orders().is_empty());
    }
}
