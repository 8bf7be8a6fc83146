use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::money::Paise;
use crate::CoreResult;

/// Input for a UPI payment artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrRequest {
    pub total: Paise,
    /// Reuse a number already reserved for this customer (e.g. on retry)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<u64>,
}

/// Scannable payment artifact: the UPI link and the QR code encoding it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrArtifact {
    pub order_number: u64,
    pub payload: String,
    pub total: Paise,
    /// Base64 PNG of the QR code
    #[serde(default)]
    pub qr_image: String,
    /// `data:image/png;base64,...` form of `qr_image`, ready for an `<img>` tag
    #[serde(default)]
    pub qr_url: String,
}

#[async_trait]
pub trait QrGenerator: Send + Sync {
    /// Produce a payment artifact for the given total. No persistence side effect.
    async fn generate_qr(&self, request: &QrRequest) -> CoreResult<QrArtifact>;
}
