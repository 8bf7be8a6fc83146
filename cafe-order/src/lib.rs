pub mod errors;
pub mod cart;
pub mod orchestrator;
pub mod history;
pub mod commands;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{CartError, ErrorKind, HistoryError, PaymentError, SessionError};
pub use cart::CartStore;
pub use orchestrator::{PaymentOrchestrator, PaymentOutcome, PaymentState};
pub use history::{ClearConfirmation, OrderHistoryView};
pub use commands::SessionCommand;
pub use session::{SessionEvent, TillSession};
