use std::io::Cursor;
use std::sync::Arc;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use tracing::info;
use cafe_core::money::decimal_rupees;
use cafe_core::{CoreError, CoreResult, OrderNumberSource, Paise, QrArtifact, QrGenerator, QrRequest};

use crate::app_config::UpiConfig;

/// Who receives UPI payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpiPayee {
    pub address: String,
    pub name: String,
    pub currency: String,
}

impl From<&UpiConfig> for UpiPayee {
    fn from(config: &UpiConfig) -> Self {
        Self {
            address: config.payee_address.clone(),
            name: config.payee_name.clone(),
            currency: config.currency.clone(),
        }
    }
}

impl UpiPayee {
    /// UPI deep link (`upi://pay?...`) for one order
    pub fn payment_link(&self, order_number: u64, total: Paise) -> String {
        let amount = decimal_rupees(total);
        let note = format!("Order {} for Rs {}", order_number, amount);
        format!(
            "upi://pay?pa={}&pn={}&am={}&cu={}&tn={}",
            encode_component(&self.address),
            encode_component(&self.name),
            amount,
            encode_component(&self.currency),
            encode_component(&note)
        )
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set (and `@` of UPI handles)
fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'@' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Side of the rendered QR code in pixels, quiet zone included
const QR_MIN_SIDE: u32 = 240;

fn render_png(payload: &str) -> CoreResult<Vec<u8>> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| CoreError::InternalError(format!("QR encoding failed: {}", e)))?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_SIDE, QR_MIN_SIDE)
        .build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CoreError::InternalError(format!("QR image encoding failed: {}", e)))?;
    Ok(png)
}

/// Builds UPI payment artifacts, taking order numbers from the order store
pub struct UpiQrGenerator {
    payee: UpiPayee,
    numbers: Arc<dyn OrderNumberSource>,
}

impl UpiQrGenerator {
    pub fn new(payee: UpiPayee, numbers: Arc<dyn OrderNumberSource>) -> Self {
        Self { payee, numbers }
    }
}

#[async_trait]
impl QrGenerator for UpiQrGenerator {
    async fn generate_qr(&self, request: &QrRequest) -> CoreResult<QrArtifact> {
        if request.total <= 0 {
            return Err(CoreError::ValidationError("Nothing to pay: total must be positive".to_string()));
        }

        let order_number = self.numbers.reserve_order_number(request.order_number).await?;

        let payload = self.payee.payment_link(order_number, request.total);
        let qr_image = STANDARD.encode(render_png(&payload)?);

        info!("UPI QR for order {} ({} paise)", order_number, request.total);
        Ok(QrArtifact {
            order_number,
            payload,
            total: request.total,
            qr_url: format!("data:image/png;base64,{}", qr_image),
            qr_image,
        })
    }
}
