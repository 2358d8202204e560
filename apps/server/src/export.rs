//! # CSV Export
//!
//! Shared CSV document layout for every report download:
//!
//! ```text
//! <Report title>
//! Generated: 2024-01-31 16:45
//! <summary label>,<summary value>
//! ...
//! <blank line>
//! <header row>
//! <data rows>
//! ```
//!
//! Money cells go through the same `format_currency` used by the HTML
//! tables, so a downloaded report matches the page byte for byte.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::error::AppError;
use till_core::format::{format_currency, format_datetime, format_percent};
use till_core::metrics::{CashDropSummary, CashierPerformance, TillClosingSummary};
use till_core::money::Money;
use till_core::types::{CashDropRow, ExpenseRow, LoyaltyRow, SalesDayRow, TillClosingRow};

/// Builder for the shared CSV document layout.
pub struct CsvDoc {
    writer: csv::Writer<Vec<u8>>,
}

impl CsvDoc {
    /// Starts a document with the title and generation timestamp lines.
    pub fn new(title: &str, generated_at: DateTime<Utc>) -> Result<Self, AppError> {
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        let mut doc = CsvDoc { writer };
        doc.row(&[title])?;
        doc.row(&[&format!("Generated: {}", format_datetime(generated_at))])?;
        Ok(doc)
    }

    /// One record; the csv crate handles RFC-4180 quoting.
    pub fn row(&mut self, fields: &[&str]) -> Result<(), AppError> {
        self.writer
            .write_record(fields)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// One summary line: label,value.
    pub fn summary(&mut self, label: &str, value: &str) -> Result<(), AppError> {
        self.row(&[label, value])
    }

    /// The blank separator line between summary block and data table.
    pub fn blank(&mut self) -> Result<(), AppError> {
        self.row(&[""])
    }

    /// Finishes the document and wraps it in a download response.
    pub fn into_response(self, filename: &str) -> Result<Response, AppError> {
        let bytes = self
            .writer
            .into_inner()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response())
    }
}

// =============================================================================
// Per-Report Documents
// =============================================================================

pub fn cash_drops_csv(
    rows: &[CashDropRow],
    summary: &CashDropSummary,
    symbol: &str,
    generated_at: DateTime<Utc>,
) -> Result<Response, AppError> {
    let mut doc = CsvDoc::new("Cash Drop Report", generated_at)?;
    doc.summary("Total drops", &summary.total_drops.to_string())?;
    doc.summary("Total amount", &format_currency(summary.total_amount, symbol))?;
    doc.summary("Pending", &summary.pending_drops.to_string())?;
    doc.summary("Confirmed", &summary.confirmed_drops.to_string())?;
    doc.summary("Cancelled", &summary.cancelled_drops.to_string())?;
    doc.summary("Emergency", &summary.emergency_drops.to_string())?;
    doc.summary("Confirmation rate", &format_percent(summary.confirmation_rate))?;
    doc.blank()?;

    doc.row(&["Date", "Amount", "Status", "Type", "Emergency", "Dropped by", "Notes"])?;
    for row in rows {
        doc.row(&[
            &format_datetime(row.drop_date),
            &format_currency(row.amount(), symbol),
            row.status.as_str(),
            row.drop_type.as_str(),
            if row.is_emergency { "yes" } else { "no" },
            &row.dropper_name,
            row.notes.as_deref().unwrap_or(""),
        ])?;
    }
    doc.into_response("cash_drops.csv")
}

pub fn till_closings_csv(
    rows: &[TillClosingRow],
    summary: &TillClosingSummary,
    symbol: &str,
    generated_at: DateTime<Utc>,
) -> Result<Response, AppError> {
    let mut doc = CsvDoc::new("Till Closing Report", generated_at)?;
    doc.summary("Total closings", &summary.total_closings.to_string())?;
    doc.summary("Shortages", &summary.shortages.to_string())?;
    doc.summary("Excesses", &summary.excesses.to_string())?;
    doc.summary("Exact", &summary.exacts.to_string())?;
    doc.summary("Net variance", &format_currency(summary.net_variance, symbol))?;
    doc.blank()?;

    doc.row(&[
        "Closed at", "Cashier", "Opening", "Sales", "Drops",
        "Expected", "Counted", "Difference", "Result",
    ])?;
    for row in rows {
        doc.row(&[
            &format_datetime(row.closed_at),
            &row.cashier_name,
            &format_currency(Money::from_cents(row.opening_amount_cents), symbol),
            &format_currency(Money::from_cents(row.total_sales_cents), symbol),
            &format_currency(Money::from_cents(row.total_drops_cents), symbol),
            &format_currency(row.expected_balance(), symbol),
            &format_currency(Money::from_cents(row.counted_amount_cents), symbol),
            &format_currency(row.difference(), symbol),
            row.shortage_type.as_str(),
        ])?;
    }
    doc.into_response("till_closings.csv")
}

pub fn sales_csv(
    rows: &[SalesDayRow],
    symbol: &str,
    generated_at: DateTime<Utc>,
) -> Result<Response, AppError> {
    let total_net: i64 = rows.iter().map(|r| r.net_cents).sum();
    let total_count: i64 = rows.iter().map(|r| r.sales_count).sum();

    let mut doc = CsvDoc::new("Sales Report", generated_at)?;
    doc.summary("Days", &rows.len().to_string())?;
    doc.summary("Sales", &total_count.to_string())?;
    doc.summary("Net total", &format_currency(Money::from_cents(total_net), symbol))?;
    doc.blank()?;

    doc.row(&["Day", "Sales", "Gross", "Tax", "Discount", "Net"])?;
    for row in rows {
        doc.row(&[
            &row.day,
            &row.sales_count.to_string(),
            &format_currency(Money::from_cents(row.gross_cents), symbol),
            &format_currency(Money::from_cents(row.tax_cents), symbol),
            &format_currency(Money::from_cents(row.discount_cents), symbol),
            &format_currency(Money::from_cents(row.net_cents), symbol),
        ])?;
    }
    doc.into_response("sales.csv")
}

pub fn cashiers_csv(
    rows: &[CashierPerformance],
    symbol: &str,
    generated_at: DateTime<Utc>,
) -> Result<Response, AppError> {
    let mut doc = CsvDoc::new("Cashier Accountability Report", generated_at)?;
    doc.summary("Cashiers", &rows.len().to_string())?;
    doc.blank()?;

    doc.row(&[
        "Cashier", "Sales", "Voided", "Total", "Average sale",
        "Void rate", "Rating", "Consistency", "Trend",
    ])?;
    for row in rows {
        doc.row(&[
            &row.username,
            &row.sales_count.to_string(),
            &row.voided_count.to_string(),
            &format_currency(row.total, symbol),
            &format_currency(row.average_sale, symbol),
            &format_percent(row.void_rate),
            row.rating.label(),
            &format!("{:.0}", row.consistency_score),
            row.daily_trend.as_str(),
        ])?;
    }
    doc.into_response("cashiers.csv")
}

pub fn loyalty_csv(
    rows: &[LoyaltyRow],
    generated_at: DateTime<Utc>,
) -> Result<Response, AppError> {
    let mut doc = CsvDoc::new("Loyalty Points Report", generated_at)?;
    doc.summary("Customers", &rows.len().to_string())?;
    doc.blank()?;

    doc.row(&["Customer", "Earned", "Redeemed", "Balance"])?;
    for row in rows {
        doc.row(&[
            &row.customer_name,
            &row.points_earned.to_string(),
            &row.points_redeemed.to_string(),
            &row.balance().to_string(),
        ])?;
    }
    doc.into_response("loyalty.csv")
}

pub fn finance_csv(
    rows: &[ExpenseRow],
    sales_net: Money,
    symbol: &str,
    generated_at: DateTime<Utc>,
) -> Result<Response, AppError> {
    let total: i64 = rows.iter().map(|r| r.total_cents).sum();

    let mut doc = CsvDoc::new("Finance Report", generated_at)?;
    doc.summary("Categories", &rows.len().to_string())?;
    doc.summary("Total expenses", &format_currency(Money::from_cents(total), symbol))?;
    doc.summary("Sales net", &format_currency(sales_net, symbol))?;
    doc.summary(
        "Net result",
        &format_currency(sales_net - Money::from_cents(total), symbol),
    )?;
    doc.blank()?;

    doc.row(&["Category", "Expenses", "Total"])?;
    for row in rows {
        doc.row(&[
            &row.category,
            &row.expense_count.to_string(),
            &format_currency(Money::from_cents(row.total_cents), symbol),
        ])?;
    }
    doc.into_response("finance.csv")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chrono::TimeZone;
    use till_core::types::{DropStatus, DropType};

    fn sample_drop(notes: Option<&str>) -> CashDropRow {
        CashDropRow {
            id: "d-1".into(),
            drop_date: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            amount_cents: 1_234_550,
            status: DropStatus::Pending,
            drop_type: DropType::Regular,
            is_emergency: false,
            dropped_by: "u-1".into(),
            dropper_name: "Asha".into(),
            confirmed_by: None,
            confirmed_at: None,
            notes: notes.map(str::to_string),
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_cash_drops_csv_layout() {
        let rows = vec![sample_drop(None)];
        let summary = CashDropSummary::from_rows(&rows);
        let generated = Utc.with_ymd_and_hms(2024, 1, 31, 16, 45, 0).unwrap();

        let response = cash_drops_csv(&rows, &summary, "$", generated).unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap(),
            "attachment; filename=\"cash_drops.csv\""
        );

        let body = body_string(response).await;
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "Cash Drop Report");
        assert_eq!(lines[1], "Generated: 2024-01-31 16:45");
        assert!(lines[2].starts_with("Total drops,1"));
        // Blank separator line between summary block and header row
        let blank = lines.iter().position(|l| l.trim_matches('"').is_empty()).unwrap();
        assert!(lines[blank + 1].starts_with("Date,Amount,Status"));
        // Same currency formatting as the HTML tables
        assert!(body.contains("$ 12,345.50"));
    }

    #[tokio::test]
    async fn test_fields_with_commas_and_quotes_are_quoted() {
        let rows = vec![sample_drop(Some("end of shift, \"large\" drop"))];
        let summary = CashDropSummary::from_rows(&rows);

        let response = cash_drops_csv(&rows, &summary, "$", Utc::now()).unwrap();
        let body = body_string(response).await;

        // RFC-4180: embedded quotes doubled, field quoted
        assert!(body.contains("\"end of shift, \"\"large\"\" drop\""));

        // Round-trip through a CSV reader recovers the exact value
        let data_start = body.find("Date,Amount").unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(body[data_start..].as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[6], "end of shift, \"large\" drop");
    }
}
