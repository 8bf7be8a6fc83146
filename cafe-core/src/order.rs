use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::money::Paise;
use crate::{CoreError, CoreResult};

/// How the customer pays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Upi,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Upi => write!(f, "UPI"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "upi" => Ok(PaymentMethod::Upi),
            other => Err(CoreError::ValidationError(format!("Unknown payment method: {}", other))),
        }
    }
}

/// Status of an order once it reaches history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Paid,
}

/// One row of the cart, keyed by (item_id, display_name)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub item_id: String,
    pub display_name: String,
    pub unit_price: Paise,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(item_id: impl Into<String>, display_name: impl Into<String>, unit_price: Paise) -> Self {
        Self {
            item_id: item_id.into(),
            display_name: display_name.into(),
            unit_price,
            quantity: 1,
        }
    }

    /// Saturates at `Paise::MAX`; use [`OrderLine::checked_line_total`] on untrusted input
    pub fn line_total(&self) -> Paise {
        self.unit_price.saturating_mul(Paise::from(self.quantity))
    }

    pub fn checked_line_total(&self) -> Option<Paise> {
        self.unit_price.checked_mul(Paise::from(self.quantity))
    }

    pub fn matches(&self, item_id: &str, display_name: &str) -> bool {
        self.item_id == item_id && self.display_name == display_name
    }
}

/// Sum of unit price × quantity over a set of lines
pub fn lines_total(lines: &[OrderLine]) -> Paise {
    lines
        .iter()
        .map(OrderLine::line_total)
        .fold(0, |total: Paise, line| total.saturating_add(line))
}

/// `None` when any line or the sum overflows
pub fn checked_lines_total(lines: &[OrderLine]) -> Option<Paise> {
    lines
        .iter()
        .try_fold(0, |total: Paise, line| total.checked_add(line.checked_line_total()?))
}

/// Frozen copy of the cart taken when the customer picks a payment method.
///
/// Built once and never mutated; the live cart can change (or be cleared)
/// without affecting it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingOrder {
    snapshot_id: Uuid,
    order_number: Option<u64>,
    lines: Vec<OrderLine>,
    total: Paise,
    payment_method: PaymentMethod,
    placed_at: DateTime<Utc>,
}

impl PendingOrder {
    pub fn snapshot(lines: &[OrderLine], payment_method: PaymentMethod, order_number: Option<u64>) -> Self {
        let lines = lines.to_vec();
        let total = lines_total(&lines);
        let snapshot = Self {
            snapshot_id: Uuid::new_v4(),
            order_number,
            lines,
            total,
            payment_method,
            placed_at: Utc::now(),
        };
        tracing::debug!(
            "Snapshot {} taken: {} lines, total {}, method {}",
            snapshot.snapshot_id,
            snapshot.lines.len(),
            snapshot.total,
            snapshot.payment_method
        );
        snapshot
    }

    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    /// Number reserved by the order-number source, if any
    pub fn order_number(&self) -> Option<u64> {
        self.order_number
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total(&self) -> Paise {
        self.total
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Check a snapshot received over the wire before persisting it
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::ValidationError("Order has no items".to_string()));
        }

        if let Some(line) = self.lines.iter().find(|l| l.quantity == 0) {
            return Err(CoreError::ValidationError(format!(
                "Line '{}' has zero quantity",
                line.display_name
            )));
        }

        if let Some(line) = self.lines.iter().find(|l| l.unit_price < 0) {
            return Err(CoreError::ValidationError(format!(
                "Line '{}' has a negative price",
                line.display_name
            )));
        }

        let expected = checked_lines_total(&self.lines)
            .ok_or_else(|| CoreError::ValidationError("Order total is out of range".to_string()))?;
        if expected != self.total {
            return Err(CoreError::ValidationError(format!(
                "Order total {} does not match its lines ({})",
                self.total, expected
            )));
        }

        Ok(())
    }
}

/// Finalized order as kept in history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedOrder {
    pub order_number: u64,
    pub snapshot_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub total: Paise,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

impl PersistedOrder {
    pub fn from_pending(pending: &PendingOrder, order_number: u64) -> Self {
        Self {
            order_number,
            snapshot_id: pending.snapshot_id,
            lines: pending.lines.clone(),
            total: pending.total,
            payment_method: pending.payment_method,
            status: OrderStatus::Paid,
            placed_at: pending.placed_at,
            recorded_at: Utc::now(),
        }
    }

    pub fn receipt(&self) -> OrderReceipt {
        OrderReceipt {
            order_number: self.order_number,
            status: self.status,
        }
    }
}

/// What the persistence collaborator hands back for a submitted order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_number: u64,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coffee_and_tea() -> Vec<OrderLine> {
        let coffee = OrderLine::new("coffee", "Coffee", 15000);
        let mut tea = OrderLine::new("tea", "Tea", 1000);
        tea.quantity = 2;
        vec![coffee, tea]
    }

    #[test]
    fn test_snapshot_computes_total() {
        let pending = PendingOrder::snapshot(&coffee_and_tea(), PaymentMethod::Cash, None);
        assert_eq!(pending.total(), 17000);
        assert_eq!(pending.lines().len(), 2);
        assert!(pending.validate().is_ok());
    }

    #[test]
    fn test_snapshot_is_detached_from_source() {
        let mut lines = coffee_and_tea();
        let pending = PendingOrder::snapshot(&lines, PaymentMethod::Upi, Some(1001));
        lines[0].quantity = 9;
        lines.clear();

        assert_eq!(pending.lines()[0].quantity, 1);
        assert_eq!(pending.order_number(), Some(1001));
    }

    #[test]
    fn test_validate_rejects_tampered_total() {
        let pending = PendingOrder::snapshot(&coffee_and_tea(), PaymentMethod::Cash, None);
        let mut json = serde_json::to_value(&pending).unwrap();
        json["total"] = serde_json::json!(1);
        let tampered: PendingOrder = serde_json::from_value(json).unwrap();

        assert!(matches!(tampered.validate(), Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_overflowing_lines() {
        let json = serde_json::json!({
            "snapshot_id": uuid::Uuid::new_v4(),
            "order_number": null,
            "lines": [{ "item_id": "coffee", "display_name": "Coffee", "unit_price": i64::MAX, "quantity": 2 }],
            "total": -2,
            "payment_method": "CASH",
            "placed_at": "2026-01-01T10:00:00Z"
        });
        let forged: PendingOrder = serde_json::from_value(json).unwrap();

        assert!(matches!(forged.validate(), Err(CoreError::ValidationError(_))));
        assert_eq!(checked_lines_total(forged.lines()), None);
        assert_eq!(lines_total(forged.lines()), i64::MAX);
    }

    #[test]
    fn test_validate_rejects_empty_order() {
        let pending = PendingOrder::snapshot(&[], PaymentMethod::Cash, None);
        assert!(pending.validate().is_err());
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("UPI".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert_eq!(" cash ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("card".parse::<PaymentMethod>().is_err());
        assert_eq!(serde_json::to_string(&PaymentMethod::Upi).unwrap(), "\"UPI\"");
    }
}
