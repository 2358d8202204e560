//! # Summary Reducers
//!
//! Derived metrics that are awkward or impossible to express as a single
//! SQL aggregate, computed in-memory from raw aggregate rows.
//!
//! ## Reducer Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Summary Reduction                                  │
//! │                                                                         │
//! │  raw aggregate rows (till-db)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pure reducer (this module)                                             │
//! │       │                                                                 │
//! │       ├── confirmation_rate  confirmed / (confirmed + cancelled)       │
//! │       ├── void_rate          voided / total, bucketed into a rating    │
//! │       ├── trend              ±10% hysteresis band, not sign compare    │
//! │       ├── consistency_score  100 - min(100, MAD/avg × 100)             │
//! │       └── percent_change     (v2-v1)/v1 × 100, total at v1 == 0        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  flat metrics record (rendered as cards / CSV summary block)           │
//! │                                                                         │
//! │  EVERY division is guarded: a zero denominator yields 0, never         │
//! │  NaN/Infinity, so no poisoned value can reach HTML or CSV.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    CashDropRow, CashierRow, DropStatus, PeriodTotalsRow, ShortageType, TillClosingRow,
    TrendDirection, VoidRating,
};

// =============================================================================
// Scalar Reducers
// =============================================================================

/// Percent change from `value1` to `value2`.
///
/// Defined as 0 when `value1 == 0` so an empty base period cannot push
/// NaN/Infinity into the UI.
pub fn percent_change(value1: f64, value2: f64) -> f64 {
    if value1 == 0.0 {
        0.0
    } else {
        (value2 - value1) / value1 * 100.0
    }
}

/// Confirmation rate as a percentage: confirmed / (confirmed + cancelled).
///
/// Pending drops are excluded from the denominator: the rate measures how
/// decided drops were decided. 0 when nothing has been decided yet.
pub fn confirmation_rate(confirmed: i64, cancelled: i64) -> f64 {
    let decided = confirmed + cancelled;
    if decided == 0 {
        0.0
    } else {
        confirmed as f64 / decided as f64 * 100.0
    }
}

/// Void rate as a percentage: voided / total sales count. 0 at 0/0.
pub fn void_rate(voided_count: i64, total_sales_count: i64) -> f64 {
    if total_sales_count == 0 {
        0.0
    } else {
        voided_count as f64 / total_sales_count as f64 * 100.0
    }
}

impl VoidRating {
    /// Buckets a void-rate percentage.
    ///
    /// ≤2% Excellent, ≤5% Good, ≤10% Fair, else Needs Improvement.
    pub fn from_rate(rate_percent: f64) -> Self {
        if rate_percent <= 2.0 {
            VoidRating::Excellent
        } else if rate_percent <= 5.0 {
            VoidRating::Good
        } else if rate_percent <= 10.0 {
            VoidRating::Fair
        } else {
            VoidRating::NeedsImprovement
        }
    }
}

/// Trend direction between two consecutive periods.
///
/// A 10% hysteresis band keeps day-to-day noise out of the arrows:
/// Up only if current > previous × 1.1, Down only if current <
/// previous × 0.9, Neutral inside the band.
pub fn trend(previous: f64, current: f64) -> TrendDirection {
    if current > previous * 1.1 {
        TrendDirection::Up
    } else if current < previous * 0.9 {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    }
}

/// Consistency score over a series of period totals.
///
/// `100 - min(100, (mean_absolute_deviation / average) × 100)`.
/// 100 means every period was identical; 0 means wildly uneven (or no
/// data / zero average, both guarded).
pub fn consistency_score(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let average = values.iter().sum::<f64>() / values.len() as f64;
    if average == 0.0 {
        return 0.0;
    }
    let mad = values.iter().map(|v| (v - average).abs()).sum::<f64>() / values.len() as f64;
    100.0 - (mad / average * 100.0).min(100.0)
}

// =============================================================================
// Cash Drop Summary
// =============================================================================

/// Flat metrics record for the cash-drop report header cards.
#[derive(Debug, Clone, Serialize)]
pub struct CashDropSummary {
    pub total_drops: usize,
    pub total_amount: Money,
    pub pending_drops: usize,
    pub confirmed_drops: usize,
    pub cancelled_drops: usize,
    pub emergency_drops: usize,
    /// Percentage of decided drops that were confirmed.
    pub confirmation_rate: f64,
}

impl CashDropSummary {
    /// Reduces the filtered rows to summary statistics.
    pub fn from_rows(rows: &[CashDropRow]) -> Self {
        let mut pending = 0;
        let mut confirmed = 0;
        let mut cancelled = 0;
        let mut emergency = 0;
        let mut total_amount = Money::zero();

        for row in rows {
            match row.status {
                DropStatus::Pending => pending += 1,
                DropStatus::Confirmed => confirmed += 1,
                DropStatus::Cancelled => cancelled += 1,
            }
            if row.is_emergency {
                emergency += 1;
            }
            total_amount += row.amount();
        }

        CashDropSummary {
            total_drops: rows.len(),
            total_amount,
            pending_drops: pending,
            confirmed_drops: confirmed,
            cancelled_drops: cancelled,
            emergency_drops: emergency,
            confirmation_rate: confirmation_rate(confirmed as i64, cancelled as i64),
        }
    }
}

// =============================================================================
// Sales Comparison
// =============================================================================

/// One compared metric between two periods.
#[derive(Debug, Clone, Serialize)]
pub struct MetricComparison {
    pub metric: &'static str,
    pub period1: f64,
    pub period2: f64,
    pub percent_change: f64,
    pub trend: TrendDirection,
}

impl MetricComparison {
    fn new(metric: &'static str, period1: f64, period2: f64) -> Self {
        MetricComparison {
            metric,
            period1,
            period2,
            percent_change: percent_change(period1, period2),
            trend: trend(period1, period2),
        }
    }
}

/// Period-over-period comparison for the sales comparison report.
#[derive(Debug, Clone, Serialize)]
pub struct SalesComparison {
    pub metrics: Vec<MetricComparison>,
}

impl SalesComparison {
    /// Compares whole-period totals: period 1 is the base, period 2 current.
    pub fn compute(period1: &PeriodTotalsRow, period2: &PeriodTotalsRow) -> Self {
        SalesComparison {
            metrics: vec![
                MetricComparison::new(
                    "sales_count",
                    period1.sales_count as f64,
                    period2.sales_count as f64,
                ),
                MetricComparison::new(
                    "gross",
                    Money::from_cents(period1.gross_cents).as_major_f64(),
                    Money::from_cents(period2.gross_cents).as_major_f64(),
                ),
                MetricComparison::new(
                    "net",
                    Money::from_cents(period1.net_cents).as_major_f64(),
                    Money::from_cents(period2.net_cents).as_major_f64(),
                ),
                MetricComparison::new(
                    "discount",
                    Money::from_cents(period1.discount_cents).as_major_f64(),
                    Money::from_cents(period2.discount_cents).as_major_f64(),
                ),
                MetricComparison::new(
                    "voided_count",
                    period1.voided_count as f64,
                    period2.voided_count as f64,
                ),
            ],
        }
    }
}

// =============================================================================
// Cashier Performance
// =============================================================================

/// Accountability metrics for one cashier over the filter window.
#[derive(Debug, Clone, Serialize)]
pub struct CashierPerformance {
    pub cashier_id: String,
    pub username: String,
    pub sales_count: i64,
    pub voided_count: i64,
    pub total: Money,
    pub average_sale: Money,
    /// Void rate percentage, 0 when the cashier has no sales.
    pub void_rate: f64,
    pub rating: VoidRating,
    /// How even the cashier's daily totals were (0-100).
    pub consistency_score: f64,
    /// First-day vs last-day movement across the window.
    pub daily_trend: TrendDirection,
}

impl CashierPerformance {
    /// Reduces one cashier's aggregate row plus their daily totals.
    pub fn compute(row: &CashierRow, daily_totals: &[f64]) -> Self {
        let rate = void_rate(row.voided_count, row.sales_count);
        let average_sale = if row.sales_count == 0 {
            Money::zero()
        } else {
            Money::from_cents(row.total_cents / row.sales_count)
        };

        CashierPerformance {
            cashier_id: row.cashier_id.clone(),
            username: row.username.clone(),
            sales_count: row.sales_count,
            voided_count: row.voided_count,
            total: Money::from_cents(row.total_cents),
            average_sale,
            void_rate: rate,
            rating: VoidRating::from_rate(rate),
            consistency_score: consistency_score(daily_totals),
            daily_trend: match (daily_totals.first(), daily_totals.last()) {
                (Some(&first), Some(&last)) => trend(first, last),
                _ => TrendDirection::Neutral,
            },
        }
    }
}

// =============================================================================
// Till Closing Summary
// =============================================================================

/// Flat metrics record for the till-closing report header cards.
#[derive(Debug, Clone, Serialize)]
pub struct TillClosingSummary {
    pub total_closings: usize,
    pub shortages: usize,
    pub excesses: usize,
    pub exacts: usize,
    /// Signed sum of all differences (negative = net shortage).
    pub net_variance: Money,
    /// Absolute cash missing across shortage closings.
    pub total_shortage: Money,
    /// Absolute surplus across excess closings.
    pub total_excess: Money,
    /// Rows whose stored derivation failed recomputation. Should be 0;
    /// anything else is surfaced as a banner, not hidden.
    pub inconsistent_rows: usize,
}

impl TillClosingSummary {
    pub fn from_rows(rows: &[TillClosingRow]) -> Self {
        let mut shortages = 0;
        let mut excesses = 0;
        let mut exacts = 0;
        let mut net_variance = Money::zero();
        let mut total_shortage = Money::zero();
        let mut total_excess = Money::zero();
        let mut inconsistent = 0;

        for row in rows {
            match row.shortage_type {
                ShortageType::Shortage => {
                    shortages += 1;
                    total_shortage += row.difference().abs();
                }
                ShortageType::Excess => {
                    excesses += 1;
                    total_excess += row.difference();
                }
                ShortageType::Exact => exacts += 1,
            }
            net_variance += row.difference();
            if verify_closing(row).is_err() {
                inconsistent += 1;
            }
        }

        TillClosingSummary {
            total_closings: rows.len(),
            shortages,
            excesses,
            exacts,
            net_variance,
            total_shortage,
            total_excess,
            inconsistent_rows: inconsistent,
        }
    }
}

/// Recomputes the till-closing derivation and checks it against the
/// stored values.
///
/// `expected_balance = opening + total_sales - total_drops`,
/// `difference = counted - expected`, and `shortage_type` must match the
/// sign of the difference. Exact in integer cents.
pub fn verify_closing(row: &TillClosingRow) -> CoreResult<()> {
    let expected = Money::from_cents(row.opening_amount_cents)
        + Money::from_cents(row.total_sales_cents)
        - Money::from_cents(row.total_drops_cents);

    if expected.cents() != row.expected_balance_cents {
        return Err(CoreError::InconsistentClosing {
            closing_id: row.id.clone(),
            detail: format!(
                "expected balance recomputes to {}, stored {}",
                expected,
                row.expected_balance()
            ),
        });
    }

    let difference = Money::from_cents(row.counted_amount_cents) - expected;
    if difference.cents() != row.difference_cents {
        return Err(CoreError::InconsistentClosing {
            closing_id: row.id.clone(),
            detail: format!(
                "difference recomputes to {}, stored {}",
                difference,
                row.difference()
            ),
        });
    }

    let classified = ShortageType::classify(difference);
    if classified != row.shortage_type {
        return Err(CoreError::InconsistentClosing {
            closing_id: row.id.clone(),
            detail: format!(
                "difference {} classifies as {}, stored {}",
                difference,
                classified.as_str(),
                row.shortage_type.as_str()
            ),
        });
    }

    Ok(())
}

// =============================================================================
// Loyalty Summary
// =============================================================================

/// Points movement totals for the loyalty report.
#[derive(Debug, Clone, Serialize)]
pub struct LoyaltySummary {
    pub total_earned: i64,
    pub total_redeemed: i64,
    /// Points the store still owes its customers.
    pub outstanding: i64,
    pub customers: usize,
}

impl LoyaltySummary {
    pub fn from_rows(rows: &[crate::types::LoyaltyRow]) -> Self {
        let total_earned: i64 = rows.iter().map(|r| r.points_earned).sum();
        let total_redeemed: i64 = rows.iter().map(|r| r.points_redeemed).sum();
        LoyaltySummary {
            total_earned,
            total_redeemed,
            outstanding: total_earned - total_redeemed,
            customers: rows.len(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_percent_change_zero_base() {
        assert_eq!(percent_change(0.0, 500.0), 0.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_percent_change_general() {
        assert!((percent_change(100.0, 150.0) - 50.0).abs() < 1e-9);
        assert!((percent_change(200.0, 100.0) + 50.0).abs() < 1e-9);
        assert!(percent_change(100.0, 150.0).is_finite());
    }

    #[test]
    fn test_confirmation_rate_guarded() {
        assert_eq!(confirmation_rate(0, 0), 0.0);
        assert!(!confirmation_rate(0, 0).is_nan());
        assert!((confirmation_rate(3, 1) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_void_rate_buckets() {
        assert_eq!(VoidRating::from_rate(void_rate(0, 0)), VoidRating::Excellent);
        assert_eq!(VoidRating::from_rate(2.0), VoidRating::Excellent);
        assert_eq!(VoidRating::from_rate(2.1), VoidRating::Good);
        assert_eq!(VoidRating::from_rate(5.0), VoidRating::Good);
        assert_eq!(VoidRating::from_rate(7.5), VoidRating::Fair);
        assert_eq!(VoidRating::from_rate(10.0), VoidRating::Fair);
        assert_eq!(VoidRating::from_rate(10.01), VoidRating::NeedsImprovement);
    }

    #[test]
    fn test_trend_hysteresis_band() {
        // The exact cases from the report contract
        assert_eq!(trend(100.0, 115.0), TrendDirection::Up);
        assert_eq!(trend(100.0, 95.0), TrendDirection::Down);
        assert_eq!(trend(100.0, 105.0), TrendDirection::Neutral);

        // Band edges are neutral (strict inequalities)
        assert_eq!(trend(100.0, 110.0), TrendDirection::Neutral);
        assert_eq!(trend(100.0, 90.0), TrendDirection::Neutral);
    }

    #[test]
    fn test_consistency_score() {
        // Identical days: perfectly consistent
        assert_eq!(consistency_score(&[50.0, 50.0, 50.0]), 100.0);

        // Empty / zero average: guarded to 0
        assert_eq!(consistency_score(&[]), 0.0);
        assert_eq!(consistency_score(&[0.0, 0.0]), 0.0);

        // [0, 100]: avg 50, MAD 50 → 100 - 100 = 0
        assert_eq!(consistency_score(&[0.0, 100.0]), 0.0);

        // Extreme spread clamps at 0, never negative
        assert_eq!(consistency_score(&[0.0, 0.0, 0.0, 400.0]), 0.0);
    }

    fn drop_row(status: DropStatus, amount_cents: i64, emergency: bool) -> CashDropRow {
        CashDropRow {
            id: "d".into(),
            drop_date: Utc::now(),
            amount_cents,
            status,
            drop_type: crate::types::DropType::Regular,
            is_emergency: emergency,
            dropped_by: "u1".into(),
            dropper_name: "Pat".into(),
            confirmed_by: None,
            confirmed_at: None,
            notes: None,
        }
    }

    #[test]
    fn test_cash_drop_summary() {
        let rows = vec![
            drop_row(DropStatus::Pending, 10000, false),
            drop_row(DropStatus::Confirmed, 20000, true),
            drop_row(DropStatus::Confirmed, 5000, false),
            drop_row(DropStatus::Cancelled, 2500, false),
        ];
        let summary = CashDropSummary::from_rows(&rows);
        assert_eq!(summary.total_drops, 4);
        assert_eq!(summary.pending_drops, 1);
        assert_eq!(summary.confirmed_drops, 2);
        assert_eq!(summary.cancelled_drops, 1);
        assert_eq!(summary.emergency_drops, 1);
        assert_eq!(summary.total_amount.cents(), 37500);
        // 2 confirmed of 3 decided
        assert!((summary.confirmation_rate - 66.666666).abs() < 1e-3);
    }

    #[test]
    fn test_cash_drop_summary_empty() {
        let summary = CashDropSummary::from_rows(&[]);
        assert_eq!(summary.confirmation_rate, 0.0);
        assert!(!summary.confirmation_rate.is_nan());
    }

    fn closing(
        opening: i64,
        sales: i64,
        drops: i64,
        counted: i64,
        shortage_type: ShortageType,
    ) -> TillClosingRow {
        let expected = opening + sales - drops;
        TillClosingRow {
            id: "tc".into(),
            closed_at: Utc::now(),
            cashier_id: "u1".into(),
            cashier_name: "Pat".into(),
            opening_amount_cents: opening,
            total_sales_cents: sales,
            total_drops_cents: drops,
            expected_balance_cents: expected,
            counted_amount_cents: counted,
            difference_cents: counted - expected,
            shortage_type,
        }
    }

    #[test]
    fn test_verify_closing_invariant() {
        // expected = 100.00 + 525.50 - 250.00 = 375.50
        let exact = closing(10000, 52550, 25000, 37550, ShortageType::Exact);
        assert!(verify_closing(&exact).is_ok());

        let short = closing(10000, 52550, 25000, 37000, ShortageType::Shortage);
        assert!(verify_closing(&short).is_ok());

        let over = closing(10000, 52550, 25000, 38000, ShortageType::Excess);
        assert!(verify_closing(&over).is_ok());

        // Misclassified row is caught
        let bad = closing(10000, 52550, 25000, 37000, ShortageType::Excess);
        assert!(matches!(
            verify_closing(&bad),
            Err(CoreError::InconsistentClosing { .. })
        ));

        // Corrupted stored expected balance is caught
        let mut corrupt = closing(10000, 52550, 25000, 37550, ShortageType::Exact);
        corrupt.expected_balance_cents += 1;
        assert!(verify_closing(&corrupt).is_err());
    }

    #[test]
    fn test_till_closing_summary() {
        let rows = vec![
            closing(10000, 50000, 20000, 40000, ShortageType::Exact),
            closing(10000, 50000, 20000, 39000, ShortageType::Shortage),
            closing(10000, 50000, 20000, 40500, ShortageType::Excess),
        ];
        let summary = TillClosingSummary::from_rows(&rows);
        assert_eq!(summary.total_closings, 3);
        assert_eq!(summary.shortages, 1);
        assert_eq!(summary.excesses, 1);
        assert_eq!(summary.exacts, 1);
        assert_eq!(summary.total_shortage.cents(), 1000);
        assert_eq!(summary.total_excess.cents(), 500);
        assert_eq!(summary.net_variance.cents(), -500);
        assert_eq!(summary.inconsistent_rows, 0);
    }

    #[test]
    fn test_sales_comparison() {
        let p1 = PeriodTotalsRow {
            sales_count: 100,
            gross_cents: 100000,
            net_cents: 90000,
            discount_cents: 5000,
            voided_count: 2,
        };
        let p2 = PeriodTotalsRow {
            sales_count: 115,
            gross_cents: 115000,
            net_cents: 85000,
            discount_cents: 5000,
            voided_count: 0,
        };
        let cmp = SalesComparison::compute(&p1, &p2);

        let count = &cmp.metrics[0];
        assert_eq!(count.metric, "sales_count");
        assert_eq!(count.trend, TrendDirection::Up);
        assert!((count.percent_change - 15.0).abs() < 1e-9);

        let net = &cmp.metrics[2];
        // 900 → 850: -5.6%, inside the neutral band
        assert_eq!(net.trend, TrendDirection::Neutral);
    }

    #[test]
    fn test_cashier_performance() {
        let row = CashierRow {
            cashier_id: "u1".into(),
            username: "pat".into(),
            sales_count: 200,
            voided_count: 3,
            total_cents: 500000,
        };
        let perf = CashierPerformance::compute(&row, &[1000.0, 1000.0, 1000.0]);
        assert!((perf.void_rate - 1.5).abs() < 1e-9);
        assert_eq!(perf.rating, VoidRating::Excellent);
        assert_eq!(perf.consistency_score, 100.0);
        assert_eq!(perf.average_sale.cents(), 2500);
        assert_eq!(perf.daily_trend, TrendDirection::Neutral);

        let idle = CashierRow {
            cashier_id: "u2".into(),
            username: "lee".into(),
            sales_count: 0,
            voided_count: 0,
            total_cents: 0,
        };
        let perf = CashierPerformance::compute(&idle, &[]);
        assert_eq!(perf.void_rate, 0.0);
        assert_eq!(perf.average_sale, Money::zero());
    }
}
