use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use cafe_core::{
    CoreResult, OrderReceipt, OrderRepository, PaymentMethod, PendingOrder, QrArtifact, QrGenerator, QrRequest,
};

use crate::cart::CartStore;
use crate::errors::PaymentError;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the current customer is in the payment flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentState {
    Idle,
    AwaitingUpiConfirmation {
        pending: PendingOrder,
        qr: QrArtifact,
    },
    Completed {
        receipt: OrderReceipt,
        payment_method: PaymentMethod,
    },
}

/// Result of choosing a payment method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Cash: persisted and the cart cleared
    Completed(OrderReceipt),
    /// UPI: QR is ready, waiting for the cashier to confirm receipt
    AwaitingConfirmation(QrArtifact),
}

/// Drives cash and UPI payments.
///
/// Idle → Completed for cash, Idle → AwaitingUpiConfirmation → Completed
/// (or back to Idle on cancel) for UPI. A failed collaborator call never
/// moves the state, so the same action can be retried.
///
/// A cash submit whose answer never arrived may still have been stored, so
/// its snapshot is kept and resubmitted while the cart is unchanged.
pub struct PaymentOrchestrator {
    orders: Arc<dyn OrderRepository>,
    qr: Arc<dyn QrGenerator>,
    call_timeout: Duration,
    state: PaymentState,
    unsettled_cash: Option<PendingOrder>,
}

impl PaymentOrchestrator {
    pub fn new(orders: Arc<dyn OrderRepository>, qr: Arc<dyn QrGenerator>) -> Self {
        Self {
            orders,
            qr,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            state: PaymentState::Idle,
            unsettled_cash: None,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    /// The snapshot held while a UPI payment awaits confirmation
    pub fn pending_order(&self) -> Option<&PendingOrder> {
        match &self.state {
            PaymentState::AwaitingUpiConfirmation { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        matches!(self.state, PaymentState::AwaitingUpiConfirmation { .. })
    }

    /// Start paying for the current cart
    pub async fn choose_payment(
        &mut self,
        cart: &mut CartStore,
        method: PaymentMethod,
    ) -> Result<PaymentOutcome, PaymentError> {
        if let Some(pending) = self.pending_order() {
            let number = pending.order_number().unwrap_or_default();
            warn!("Payment rejected: UPI order {} still awaiting confirmation", number);
            return Err(PaymentError::AwaitingConfirmation(number));
        }

        if cart.is_empty() {
            warn!("Payment rejected: empty order");
            return Err(PaymentError::EmptyOrder);
        }

        match method {
            PaymentMethod::Cash => {
                let pending = match self.unsettled_cash.take() {
                    Some(held) if held.lines() == cart.lines() => {
                        info!("Retrying cash snapshot {}", held.snapshot_id());
                        held
                    }
                    _ => PendingOrder::snapshot(cart.lines(), PaymentMethod::Cash, None),
                };

                let receipt = match self.bounded(self.orders.submit_order(&pending)).await {
                    Ok(receipt) => receipt,
                    Err(e) => {
                        self.unsettled_cash = Some(pending);
                        return Err(e);
                    }
                };

                cart.clear();
                self.state = PaymentState::Completed {
                    receipt,
                    payment_method: PaymentMethod::Cash,
                };
                info!("Cash order {} completed, total {}", receipt.order_number, pending.total());
                Ok(PaymentOutcome::Completed(receipt))
            }
            PaymentMethod::Upi => {
                let request = QrRequest {
                    total: cart.total(),
                    order_number: None,
                };
                let qr = self.bounded(self.qr.generate_qr(&request)).await?;

                let pending = PendingOrder::snapshot(cart.lines(), PaymentMethod::Upi, Some(qr.order_number));
                info!(
                    "UPI order {} awaiting confirmation, total {}",
                    qr.order_number,
                    pending.total()
                );
                self.state = PaymentState::AwaitingUpiConfirmation {
                    pending,
                    qr: qr.clone(),
                };
                Ok(PaymentOutcome::AwaitingConfirmation(qr))
            }
        }
    }

    /// Cashier saw the UPI payment arrive: persist the held snapshot
    pub async fn confirm_upi_payment(&mut self, cart: &mut CartStore) -> Result<OrderReceipt, PaymentError> {
        let Some(pending) = self.pending_order() else {
            warn!("Confirm ignored: no UPI payment pending");
            return Err(PaymentError::NoPendingOrder);
        };

        let receipt = self.bounded(self.orders.submit_order(pending)).await?;

        cart.clear();
        self.unsettled_cash = None;
        self.state = PaymentState::Completed {
            receipt,
            payment_method: PaymentMethod::Upi,
        };
        info!("UPI order {} confirmed", receipt.order_number);
        Ok(receipt)
    }

    /// Drop the held snapshot; the cart stays as it was
    pub fn cancel_upi_payment(&mut self) -> Result<PendingOrder, PaymentError> {
        match std::mem::replace(&mut self.state, PaymentState::Idle) {
            PaymentState::AwaitingUpiConfirmation { pending, .. } => {
                info!("UPI payment cancelled for order {:?}", pending.order_number());
                Ok(pending)
            }
            other => {
                self.state = other;
                warn!("Cancel ignored: no UPI payment pending");
                Err(PaymentError::NoPendingOrder)
            }
        }
    }

    /// The cart was edited: a held cash snapshot no longer describes this sale
    pub fn cart_changed(&mut self) {
        if let Some(held) = self.unsettled_cash.take() {
            info!("Dropping unsettled cash snapshot {}", held.snapshot_id());
        }
    }

    /// Start over: empty cart, nothing pending
    pub fn reset(&mut self, cart: &mut CartStore) {
        if let Some(pending) = self.pending_order() {
            info!("Reset discards pending UPI order {:?}", pending.order_number());
        }
        cart.clear();
        self.unsettled_cash = None;
        self.state = PaymentState::Idle;
    }

    async fn bounded<T>(&self, call: impl Future<Output = CoreResult<T>>) -> Result<T, PaymentError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Payment collaborator failed: {}", e);
                Err(PaymentError::Collaborator(e))
            }
            Err(_) => {
                warn!("Payment collaborator timed out after {:?}", self.call_timeout);
                Err(PaymentError::Timeout(self.call_timeout))
            }
        }
    }
}
