//! # Shared Formatting
//!
//! The single formatting module used by BOTH the HTML renderer and the
//! CSV exporter.
//!
//! ## Why One Module
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A manager reconciles the page on screen against the file they         │
//! │  downloaded. If the HTML cell says "Rs 12,500.00" and the CSV field    │
//! │  says "12500", that is a reconciliation incident, not a styling        │
//! │  nit. Every number therefore flows through format_currency /           │
//! │  format_percent exactly once, at the presentation edge, and both       │
//! │  outputs agree byte for byte.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::money::Money;

/// Formats a monetary amount as `"{symbol} {thousands-separated, 2dp}"`.
///
/// ## Examples
/// ```rust
/// use till_core::format::format_currency;
/// use till_core::money::Money;
///
/// assert_eq!(format_currency(Money::from_cents(1234550), "$"), "$ 12,345.50");
/// assert_eq!(format_currency(Money::from_cents(-9900), "Rs"), "Rs -99.00");
/// assert_eq!(format_currency(Money::zero(), "$"), "$ 0.00");
/// ```
pub fn format_currency(amount: Money, symbol: &str) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "{} {}{}.{:02}",
        symbol,
        sign,
        group_thousands(amount.major().abs()),
        amount.minor()
    )
}

/// Formats a rate as a percentage with one decimal, e.g. `"66.7%"`.
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Formats a count with thousands separators, e.g. `"12,345"`.
pub fn format_count(count: i64) -> String {
    let sign = if count < 0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(count.abs()))
}

/// Formats a timestamp for table cells: `"2024-01-31 14:05"`.
pub fn format_datetime(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Formats a date for filter labels and CSV headers: `"2024-01-31"`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Groups a non-negative integer into comma-separated thousands.
fn group_thousands(mut value: i64) -> String {
    debug_assert!(value >= 0);
    if value == 0 {
        return "0".to_string();
    }
    let mut groups = Vec::new();
    while value > 0 {
        groups.push((value % 1000) as u16);
        value /= 1000;
    }
    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(g) = groups.pop() {
        out.push_str(&format!(",{:03}", g));
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_separators() {
        assert_eq!(format_currency(Money::from_cents(0), "$"), "$ 0.00");
        assert_eq!(format_currency(Money::from_cents(999), "$"), "$ 9.99");
        assert_eq!(format_currency(Money::from_cents(100000), "$"), "$ 1,000.00");
        assert_eq!(
            format_currency(Money::from_cents(123456789), "$"),
            "$ 1,234,567.89"
        );
        assert_eq!(
            format_currency(Money::from_cents(100000000000), "Rs"),
            "Rs 1,000,000,000.00"
        );
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(Money::from_cents(-50), "$"), "$ -0.50");
        assert_eq!(
            format_currency(Money::from_cents(-123450), "$"),
            "$ -1,234.50"
        );
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(66.666), "66.7%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(-1234), "-1,234");
    }
}
