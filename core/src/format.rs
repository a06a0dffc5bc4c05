//! Compact display formatting for large currency quantities.
//! Display-only; nothing in the economy depends on it.

/// Format a quantity the way an idle game shows it: plain below a
/// thousand, then one-decimal K/M/B/T suffixes.
pub fn compact(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let abs = amount.abs();
    if abs < 1_000.0 {
        format!("{amount:.0}")
    } else if abs < 1_000_000.0 {
        format!("{:.1}K", amount / 1_000.0)
    } else if abs < 1_000_000_000.0 {
        format!("{:.1}M", amount / 1_000_000.0)
    } else if abs < 1_000_000_000_000.0 {
        format!("{:.1}B", amount / 1_000_000_000.0)
    } else {
        format!("{:.1}T", amount / 1_000_000_000_000.0)
    }
}
