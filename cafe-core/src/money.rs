/// Amounts are integer paise (1/100 of a rupee)
pub type Paise = i64;

/// Render an amount the way the till and receipts show it, e.g. `₹170.00`
pub fn format_rupees(amount: Paise) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}₹{}.{:02}", sign, abs / 100, abs % 100)
}

/// Plain decimal form used inside payment links, e.g. `170.00`
pub fn decimal_rupees(amount: Paise) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
