use std::str::FromStr;
use cafe_core::{Paise, PaymentMethod};

use crate::errors::SessionError;
use crate::history::ClearConfirmation;

// ============================================================================
// Till Commands - everything a cashier can ask the session to do
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    AddItem {
        item_id: String,
        variant_name: Option<String>,
        variant_price: Option<Paise>,
    },
    /// Zero-based cart line index
    RemoveOne {
        line_index: usize,
    },
    ClearCart,
    ChoosePayment(PaymentMethod),
    ConfirmUpi,
    CancelUpi,
    Reset,
    ShowMenu,
    ShowCart,
    ShowHistory,
    ClearHistory(ClearConfirmation),
}

impl SessionCommand {
    pub fn add(item_id: impl Into<String>) -> Self {
        SessionCommand::AddItem {
            item_id: item_id.into(),
            variant_name: None,
            variant_price: None,
        }
    }

    pub fn add_variant(item_id: impl Into<String>, variant_name: impl Into<String>) -> Self {
        SessionCommand::AddItem {
            item_id: item_id.into(),
            variant_name: Some(variant_name.into()),
            variant_price: None,
        }
    }
}

/// Parses till input:
///
/// ```text
/// add coffee                 add tea Lemon @18.50
/// add coffee cold coffee     remove 2        (1-based, as listed)
/// pay cash | pay upi         confirm | cancel | reset | clear
/// menu | cart | history      clear-history yes
/// ```
impl FromStr for SessionCommand {
    type Err = SessionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || SessionError::InvalidCommand(input.trim().to_string());
        let mut words = input.split_whitespace();
        let verb = words.next().ok_or_else(invalid)?.to_ascii_lowercase();
        let rest: Vec<&str> = words.collect();

        let command = match (verb.as_str(), rest.as_slice()) {
            ("add", [item_id, tail @ ..]) => {
                let (variant_words, variant_price) = match tail.split_last() {
                    Some((last, init)) if last.starts_with('@') => {
                        (init, Some(parse_rupees(&last[1..]).ok_or_else(invalid)?))
                    }
                    _ => (tail, None),
                };
                let variant_name = (!variant_words.is_empty()).then(|| variant_words.join(" "));
                SessionCommand::AddItem {
                    item_id: item_id.to_ascii_lowercase(),
                    variant_name,
                    variant_price,
                }
            }
            ("remove", [position]) => {
                let position: usize = position.parse().map_err(|_| invalid())?;
                let line_index = position.checked_sub(1).ok_or_else(invalid)?;
                SessionCommand::RemoveOne { line_index }
            }
            ("pay", [method]) => {
                SessionCommand::ChoosePayment(method.parse::<PaymentMethod>().map_err(|_| invalid())?)
            }
            ("clear", []) => SessionCommand::ClearCart,
            ("confirm", []) => SessionCommand::ConfirmUpi,
            ("cancel", []) => SessionCommand::CancelUpi,
            ("reset", []) => SessionCommand::Reset,
            ("menu", []) => SessionCommand::ShowMenu,
            ("cart", []) => SessionCommand::ShowCart,
            ("history", []) => SessionCommand::ShowHistory,
            ("clear-history", answer) => {
                let confirmed = matches!(answer, [yes] if yes.eq_ignore_ascii_case("yes"));
                SessionCommand::ClearHistory(if confirmed {
                    ClearConfirmation::Confirmed
                } else {
                    ClearConfirmation::Declined
                })
            }
            _ => return Err(invalid()),
        };

        Ok(command)
    }
}

/// `18`, `18.5` or `18.50` rupees → paise
fn parse_rupees(raw: &str) -> Option<Paise> {
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (raw, ""),
    };
    if whole.is_empty() || fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: Paise = whole.parse().ok().filter(|w: &Paise| *w >= 0)?;
    let fraction: Paise = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<Paise>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        assert_eq!("add coffee".parse::<SessionCommand>().unwrap(), SessionCommand::add("coffee"));
        assert_eq!(
            "add Coffee cold coffee".parse::<SessionCommand>().unwrap(),
            SessionCommand::add_variant("coffee", "cold coffee")
        );
        assert_eq!(
            "add tea Lemon @18.5".parse::<SessionCommand>().unwrap(),
            SessionCommand::AddItem {
                item_id: "tea".to_string(),
                variant_name: Some("Lemon".to_string()),
                variant_price: Some(1850),
            }
        );
    }

    #[test]
    fn test_parse_remove_is_one_based() {
        assert_eq!(
            "remove 1".parse::<SessionCommand>().unwrap(),
            SessionCommand::RemoveOne { line_index: 0 }
        );
        assert!("remove 0".parse::<SessionCommand>().is_err());
        assert!("remove x".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn test_parse_payment_flow() {
        assert_eq!(
            "pay UPI".parse::<SessionCommand>().unwrap(),
            SessionCommand::ChoosePayment(PaymentMethod::Upi)
        );
        assert_eq!("confirm".parse::<SessionCommand>().unwrap(), SessionCommand::ConfirmUpi);
        assert_eq!("cancel".parse::<SessionCommand>().unwrap(), SessionCommand::CancelUpi);
        assert!("pay card".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn test_parse_clear_history_needs_yes() {
        assert_eq!(
            "clear-history yes".parse::<SessionCommand>().unwrap(),
            SessionCommand::ClearHistory(ClearConfirmation::Confirmed)
        );
        assert_eq!(
            "clear-history".parse::<SessionCommand>().unwrap(),
            SessionCommand::ClearHistory(ClearConfirmation::Declined)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<SessionCommand>().is_err());
        assert!("dance".parse::<SessionCommand>().is_err());
        assert!("add tea Lemon @abc".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn test_parse_rupees() {
        assert_eq!(parse_rupees("18"), Some(1800));
        assert_eq!(parse_rupees("18.05"), Some(1805));
        assert_eq!(parse_rupees("18.123"), None);
        assert_eq!(parse_rupees("-1"), None);
    }
}
