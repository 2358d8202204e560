//! # Domain Types
//!
//! Core domain types used throughout Till Reports.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CashDropRow   │   │ TillClosingRow  │   │  SalesDayRow    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  amount_cents   │   │  opening_cents  │   │  day            │       │
//! │  │  status         │   │  expected_cents │   │  sales_count    │       │
//! │  │  is_emergency   │   │  difference     │   │  net_cents      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   DropStatus    │   │  ShortageType   │   │ TrendDirection  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Pending        │   │  Shortage       │   │  Up             │       │
//! │  │  Confirmed      │   │  Excess         │   │  Down           │       │
//! │  │  Cancelled      │   │  Exact          │   │  Neutral        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## These Are Read-Only Projections
//! Nothing in this crate creates or mutates these rows. Cash drops and till
//! closings are written by the till workflows; reports only read their
//! final or intermediate state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Cash Drop Status
// =============================================================================

/// The lifecycle status of a cash drop.
///
/// Transitions (pending → confirmed, pending → cancelled) happen in the
/// till workflows; reports only read whatever state is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DropStatus {
    /// Cash removed from the till, awaiting a second-person confirmation.
    Pending,
    /// Confirmed by a second actor; counted into the safe.
    Confirmed,
    /// Cancelled before confirmation; cash returned to the till.
    Cancelled,
}

impl DropStatus {
    /// Parses a request parameter into a status, if it is on the allow-list.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(DropStatus::Pending),
            "confirmed" => Some(DropStatus::Confirmed),
            "cancelled" => Some(DropStatus::Cancelled),
            _ => None,
        }
    }

    /// Stable lowercase name used in SQL bindings and URLs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DropStatus::Pending => "pending",
            DropStatus::Confirmed => "confirmed",
            DropStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Cash Drop Type
// =============================================================================

/// Why cash was removed from the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DropType {
    /// Routine drop during a shift.
    Regular,
    /// Triggered because the drawer exceeded its cash ceiling.
    Excess,
    /// Final drop when closing the till.
    Closing,
}

impl DropType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "regular" => Some(DropType::Regular),
            "excess" => Some(DropType::Excess),
            "closing" => Some(DropType::Closing),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            DropType::Regular => "regular",
            DropType::Excess => "excess",
            DropType::Closing => "closing",
        }
    }
}

// =============================================================================
// Shortage Type
// =============================================================================

/// Classification of a till-closing variance, derived from the sign of
/// `difference = counted - expected`.
///
/// ## Invariant
/// `Shortage` iff difference < 0, `Excess` iff difference > 0,
/// `Exact` iff difference == 0. The schema enforces this at write time;
/// [`ShortageType::classify`] is the same pure function for recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ShortageType {
    /// Counted less than expected (difference < 0).
    Shortage,
    /// Counted more than expected (difference > 0).
    Excess,
    /// Counted exactly the expected balance.
    Exact,
}

impl ShortageType {
    /// Classifies a signed difference.
    pub const fn classify(difference: Money) -> Self {
        if difference.is_negative() {
            ShortageType::Shortage
        } else if difference.is_positive() {
            ShortageType::Excess
        } else {
            ShortageType::Exact
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "shortage" => Some(ShortageType::Shortage),
            "excess" => Some(ShortageType::Excess),
            "exact" => Some(ShortageType::Exact),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ShortageType::Shortage => "shortage",
            ShortageType::Excess => "excess",
            ShortageType::Exact => "exact",
        }
    }
}

// =============================================================================
// Sort Order
// =============================================================================

/// Sort direction for report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    /// The SQL keyword. Only ever interpolated from this fixed set.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// =============================================================================
// Trend Direction
// =============================================================================

/// Direction of a metric between two consecutive periods.
///
/// Classified with a 10% hysteresis band (see `metrics::trend`), not a
/// simple sign comparison, so day-to-day noise reads as Neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl TrendDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Neutral => "neutral",
        }
    }
}

// =============================================================================
// Void Rating
// =============================================================================

/// Cashier-accountability bucket derived from the void rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoidRating {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl VoidRating {
    /// Label shown in the HTML table and the CSV export.
    pub const fn label(&self) -> &'static str {
        match self {
            VoidRating::Excellent => "Excellent",
            VoidRating::Good => "Good",
            VoidRating::Fair => "Fair",
            VoidRating::NeedsImprovement => "Needs Improvement",
        }
    }
}

// =============================================================================
// Export Format / View Mode
// =============================================================================

/// Requested export format (`export=` query parameter).
///
/// Only CSV has an implementation; pdf/excel are recognised so the caller
/// gets a clear "not supported" message rather than a silent HTML page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
    Excel,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(ExportFormat::Csv),
            "pdf" => Some(ExportFormat::Pdf),
            "excel" => Some(ExportFormat::Excel),
            _ => None,
        }
    }
}

/// How a report page lays out its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Table,
    Chart,
}

impl ViewMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "table" => Some(ViewMode::Table),
            "chart" => Some(ViewMode::Chart),
            _ => None,
        }
    }
}

// =============================================================================
// Cash Drop Row
// =============================================================================

/// One cash-drop event as read from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashDropRow {
    pub id: String,
    pub drop_date: DateTime<Utc>,
    /// Amount removed from the till, in cents.
    pub amount_cents: i64,
    pub status: DropStatus,
    pub drop_type: DropType,
    pub is_emergency: bool,
    /// Actor who performed the drop.
    pub dropped_by: String,
    pub dropper_name: String,
    /// Second actor who confirmed it, once confirmed.
    pub confirmed_by: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl CashDropRow {
    /// Returns the drop amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Till Closing Row
// =============================================================================

/// One end-of-shift reconciliation record.
///
/// All derived fields (`expected_balance_cents`, `difference_cents`,
/// `shortage_type`) were evaluated once at closing time and persisted;
/// `metrics::verify_closing` recomputes them for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TillClosingRow {
    pub id: String,
    pub closed_at: DateTime<Utc>,
    pub cashier_id: String,
    pub cashier_name: String,
    pub opening_amount_cents: i64,
    pub total_sales_cents: i64,
    pub total_drops_cents: i64,
    /// opening + sales - drops, persisted at closing time.
    pub expected_balance_cents: i64,
    /// Physically counted cash.
    pub counted_amount_cents: i64,
    /// counted - expected (signed).
    pub difference_cents: i64,
    pub shortage_type: ShortageType,
}

impl TillClosingRow {
    #[inline]
    pub fn expected_balance(&self) -> Money {
        Money::from_cents(self.expected_balance_cents)
    }

    #[inline]
    pub fn difference(&self) -> Money {
        Money::from_cents(self.difference_cents)
    }
}

// =============================================================================
// Sales Rows
// =============================================================================

/// Sales aggregated per calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesDayRow {
    /// ISO day (`YYYY-MM-DD`) the sales were recorded on.
    pub day: String,
    pub sales_count: i64,
    pub gross_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub net_cents: i64,
}

/// Sales aggregated per payment method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentMethodRow {
    pub method: String,
    pub amount_cents: i64,
    pub sales_count: i64,
}

/// Best-selling products within the filter window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopProductRow {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Whole-period totals used by the comparison report (one row per period).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PeriodTotalsRow {
    pub sales_count: i64,
    pub gross_cents: i64,
    pub net_cents: i64,
    pub discount_cents: i64,
    pub voided_count: i64,
}

// =============================================================================
// Cashier Rows
// =============================================================================

/// Per-cashier accountability aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashierRow {
    pub cashier_id: String,
    pub username: String,
    pub sales_count: i64,
    pub voided_count: i64,
    pub total_cents: i64,
}

/// One cashier-day total, input to the consistency score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashierDayRow {
    pub cashier_id: String,
    pub day: String,
    pub total_cents: i64,
}

// =============================================================================
// Loyalty / Finance Rows
// =============================================================================

/// Loyalty points movement aggregated per customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoyaltyRow {
    pub customer_id: String,
    pub customer_name: String,
    pub points_earned: i64,
    pub points_redeemed: i64,
}

impl LoyaltyRow {
    /// Outstanding balance: what the store still owes this customer.
    #[inline]
    pub fn balance(&self) -> i64 {
        self.points_earned - self.points_redeemed
    }
}

/// Expenses aggregated per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExpenseRow {
    pub category: String,
    pub expense_count: i64,
    pub total_cents: i64,
}

// =============================================================================
// Audit Trail
// =============================================================================

/// One security-log event attached to a cash drop (drill-down endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEventRow {
    pub id: String,
    pub event_type: String,
    pub message: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
