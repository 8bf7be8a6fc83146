use async_trait::async_trait;

use crate::order::{OrderReceipt, PendingOrder, PersistedOrder};
use crate::CoreResult;

/// Persistence collaborator for finalized orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a confirmed order. Resubmitting the same snapshot returns
    /// the receipt of the order already stored for it.
    async fn submit_order(&self, order: &PendingOrder) -> CoreResult<OrderReceipt>;

    /// All persisted orders, newest first
    async fn list_orders(&self) -> CoreResult<Vec<PersistedOrder>>;

    /// Drop the whole history. Irreversible.
    async fn clear_orders(&self) -> CoreResult<()>;
}

/// The one place order numbers come from
#[async_trait]
pub trait OrderNumberSource: Send + Sync {
    /// Reserve a number for an order not yet placed. `requested` is handed
    /// back unchanged if it is still reserved, otherwise a new number is issued.
    async fn reserve_order_number(&self, requested: Option<u64>) -> CoreResult<u64>;
}
