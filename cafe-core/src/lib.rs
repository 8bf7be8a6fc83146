pub mod money;
pub mod order;
pub mod payment;
pub mod repository;
pub mod wire;

pub use money::{decimal_rupees, format_rupees, Paise};
pub use order::{checked_lines_total, lines_total, OrderLine, OrderReceipt, OrderStatus, PaymentMethod, PendingOrder, PersistedOrder};
pub use payment::{QrArtifact, QrGenerator, QrRequest};
pub use repository::{OrderNumberSource, OrderRepository};

use std::time::Duration;

/// Errors raised by collaborators (stores, QR generation, the HTTP gateway)
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Network request failed: {0}")]
    NetworkError(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Storage failure: {0}")]
    StorageError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Whether repeating the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::NetworkError(_) | CoreError::Timeout(_) | CoreError::StorageError(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
