use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use cafe_catalog::{MenuCatalog, MenuItem};
use cafe_core::{OrderLine, OrderReceipt, OrderRepository, Paise, PaymentMethod, PersistedOrder, QrArtifact, QrGenerator};

use crate::cart::CartStore;
use crate::commands::SessionCommand;
use crate::errors::SessionError;
use crate::history::OrderHistoryView;
use crate::orchestrator::{PaymentOrchestrator, PaymentOutcome, PaymentState, DEFAULT_CALL_TIMEOUT};

/// What the till should show after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CartUpdated {
        lines: Vec<OrderLine>,
        total: Paise,
    },
    AwaitingUpiConfirmation(QrArtifact),
    OrderCompleted {
        receipt: OrderReceipt,
        payment_method: PaymentMethod,
        total: Paise,
    },
    PaymentCancelled {
        total: Paise,
    },
    SessionReset,
    Menu(Vec<MenuItem>),
    History(Vec<PersistedOrder>),
    HistoryCleared,
}

/// One customer-facing till: cart, payment flow and history view.
///
/// All mutation goes through [`TillSession::dispatch`], which takes
/// `&mut self`, so commands are applied one at a time.
pub struct TillSession {
    id: Uuid,
    cart: CartStore,
    payments: PaymentOrchestrator,
    history: OrderHistoryView,
}

impl TillSession {
    pub fn new(catalog: Arc<MenuCatalog>, orders: Arc<dyn OrderRepository>, qr: Arc<dyn QrGenerator>) -> Self {
        Self::with_timeout(catalog, orders, qr, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(
        catalog: Arc<MenuCatalog>,
        orders: Arc<dyn OrderRepository>,
        qr: Arc<dyn QrGenerator>,
        call_timeout: Duration,
    ) -> Self {
        let id = Uuid::new_v4();
        info!("Till session {} opened", id);
        Self {
            id,
            cart: CartStore::new(catalog),
            payments: PaymentOrchestrator::new(orders.clone(), qr).with_timeout(call_timeout),
            history: OrderHistoryView::new(orders).with_timeout(call_timeout),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn payment_state(&self) -> &PaymentState {
        self.payments.state()
    }

    pub fn history(&self) -> &OrderHistoryView {
        &self.history
    }

    pub async fn dispatch(&mut self, command: SessionCommand) -> Result<SessionEvent, SessionError> {
        let result = self.apply(command).await;
        if let Err(e) = &result {
            warn!("Session {}: {} ({:?})", self.id, e, e.kind());
        }
        result
    }

    async fn apply(&mut self, command: SessionCommand) -> Result<SessionEvent, SessionError> {
        match command {
            SessionCommand::AddItem {
                item_id,
                variant_name,
                variant_price,
            } => {
                self.ensure_cart_unlocked()?;
                self.cart.add_item(&item_id, variant_name.as_deref(), variant_price)?;
                self.payments.cart_changed();
                Ok(self.cart_event())
            }
            SessionCommand::RemoveOne { line_index } => {
                self.ensure_cart_unlocked()?;
                self.cart.remove_one(line_index)?;
                self.payments.cart_changed();
                Ok(self.cart_event())
            }
            SessionCommand::ClearCart => {
                self.ensure_cart_unlocked()?;
                self.cart.clear();
                self.payments.cart_changed();
                Ok(self.cart_event())
            }
            SessionCommand::ShowCart => Ok(self.cart_event()),
            SessionCommand::ChoosePayment(method) => {
                let total = self.cart.total();
                let outcome = self.payments.choose_payment(&mut self.cart, method).await?;
                match outcome {
                    PaymentOutcome::AwaitingConfirmation(qr) => Ok(SessionEvent::AwaitingUpiConfirmation(qr)),
                    PaymentOutcome::Completed(receipt) => Ok(self.completed(receipt, method, total).await),
                }
            }
            SessionCommand::ConfirmUpi => {
                let total = self.payments.pending_order().map(|p| p.total()).unwrap_or_default();
                let receipt = self.payments.confirm_upi_payment(&mut self.cart).await?;
                Ok(self.completed(receipt, PaymentMethod::Upi, total).await)
            }
            SessionCommand::CancelUpi => {
                let discarded = self.payments.cancel_upi_payment()?;
                Ok(SessionEvent::PaymentCancelled {
                    total: discarded.total(),
                })
            }
            SessionCommand::Reset => {
                self.payments.reset(&mut self.cart);
                Ok(SessionEvent::SessionReset)
            }
            SessionCommand::ShowMenu => Ok(SessionEvent::Menu(self.cart.catalog().items().to_vec())),
            SessionCommand::ShowHistory => {
                let orders = self.history.refresh().await?;
                Ok(SessionEvent::History(orders.to_vec()))
            }
            SessionCommand::ClearHistory(confirmation) => {
                self.history.clear(confirmation).await?;
                Ok(SessionEvent::HistoryCleared)
            }
        }
    }

    /// Snapshot and cart must agree when the payment is confirmed
    fn ensure_cart_unlocked(&self) -> Result<(), SessionError> {
        match self.payments.pending_order() {
            Some(pending) => Err(SessionError::CartLocked(pending.order_number().unwrap_or_default())),
            None => Ok(()),
        }
    }

    fn cart_event(&self) -> SessionEvent {
        SessionEvent::CartUpdated {
            lines: self.cart.lines().to_vec(),
            total: self.cart.total(),
        }
    }

    async fn completed(&mut self, receipt: OrderReceipt, payment_method: PaymentMethod, total: Paise) -> SessionEvent {
        if let Err(e) = self.history.refresh().await {
            warn!("Session {}: history refresh after order {} failed: {}", self.id, receipt.order_number, e);
        }
        SessionEvent::OrderCompleted {
            receipt,
            payment_method,
            total,
        }
    }
}
