use std::time::Duration;
use cafe_catalog::CatalogError;
use cafe_core::CoreError;

/// How the till should react to a failed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: no-op plus a transient notification
    Validation,
    /// Collaborator failed or timed out: state untouched, action retryable
    Network,
    /// Command not valid in the current payment state: no-op plus notification
    State,
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("No cart line at position {index} (cart has {len} lines)")]
    LineOutOfRange {
        index: usize,
        len: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Empty order: add items before choosing a payment method")]
    EmptyOrder,

    #[error("A UPI payment for order {0} is already awaiting confirmation")]
    AwaitingConfirmation(u64),

    #[error("No UPI payment is awaiting confirmation")]
    NoPendingOrder,

    #[error("Payment service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Payment service failed: {0}")]
    Collaborator(#[from] CoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Clearing order history must be confirmed")]
    NotConfirmed,

    #[error("Order history did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Order history unavailable: {0}")]
    Collaborator(#[from] CoreError),
}

/// Anything a till command can fail with
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Cart is locked while UPI payment for order {0} awaits confirmation")]
    CartLocked(u64),

    #[error("Unrecognised command: {0}")]
    InvalidCommand(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Cart(_) | SessionError::InvalidCommand(_) => ErrorKind::Validation,
            SessionError::CartLocked(_) => ErrorKind::State,
            SessionError::Payment(e) => match e {
                PaymentError::EmptyOrder => ErrorKind::Validation,
                PaymentError::AwaitingConfirmation(_) | PaymentError::NoPendingOrder => ErrorKind::State,
                PaymentError::Timeout(_) => ErrorKind::Network,
                PaymentError::Collaborator(inner) => collaborator_kind(inner),
            },
            SessionError::History(e) => match e {
                HistoryError::NotConfirmed => ErrorKind::Validation,
                HistoryError::Timeout(_) => ErrorKind::Network,
                HistoryError::Collaborator(inner) => collaborator_kind(inner),
            },
        }
    }

    /// Network failures leave state untouched, so the same command can be re-sent
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }
}

fn collaborator_kind(error: &CoreError) -> ErrorKind {
    match error {
        CoreError::ValidationError(_) => ErrorKind::Validation,
        _ => ErrorKind::Network,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let empty: SessionError = PaymentError::EmptyOrder.into();
        assert_eq!(empty.kind(), ErrorKind::Validation);
        assert!(!empty.is_retryable());

        let stale: SessionError = PaymentError::NoPendingOrder.into();
        assert_eq!(stale.kind(), ErrorKind::State);

        let down: SessionError = PaymentError::Collaborator(CoreError::NetworkError("refused".into())).into();
        assert_eq!(down.kind(), ErrorKind::Network);
        assert!(down.is_retryable());

        let slow: SessionError = HistoryError::Timeout(Duration::from_secs(5)).into();
        assert!(slow.is_retryable());

        let range: SessionError = CartError::LineOutOfRange { index: 3, len: 1 }.into();
        assert_eq!(range.kind(), ErrorKind::Validation);
    }
}
