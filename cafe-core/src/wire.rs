use serde::{Deserialize, Serialize};

use crate::order::OrderStatus;

// ============================================================================
// HTTP request/response bodies shared by the order API and its client
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddOrderResponse {
    pub message: String,
    pub order_number: u64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
