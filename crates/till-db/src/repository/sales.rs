//! # Sales Report Repository
//!
//! Aggregate queries behind the sales report and the period comparison.
//!
//! ## Sections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sales Report Sections                            │
//! │                                                                         │
//! │  GET /reports/sales                                                     │
//! │       │                                                                 │
//! │       ├── by_day()        daily totals        (main table + chart)      │
//! │       ├── by_method()     payment mix         (breakdown card)          │
//! │       └── top_products()  best sellers        (breakdown card)          │
//! │                                                                         │
//! │  GET /reports/sales/comparison                                          │
//! │       │                                                                 │
//! │       ├── period_totals(p1_from, p1_to)                                 │
//! │       └── period_totals(p2_from, p2_to)                                 │
//! │                                                                         │
//! │  Voided sales are excluded from every money aggregate and counted       │
//! │  separately; a voided sale contributes to voided_count only.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::query::{bind_rows, Predicate, QueryBuilder, ReportShape};
use till_core::filters::ReportFilters;
use till_core::types::{PaymentMethodRow, PeriodTotalsRow, SalesDayRow, TopProductRow};

/// How many best sellers the top-products section shows.
pub const TOP_PRODUCTS_LIMIT: i64 = 10;

/// Repository for sales report queries.
#[derive(Debug, Clone)]
pub struct SalesReportRepository {
    pool: SqlitePool,
}

impl SalesReportRepository {
    /// Creates a new SalesReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesReportRepository { pool }
    }

    /// Predicates shared by the completed-sales aggregates.
    fn completed_predicates(filters: &ReportFilters) -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        let (from, to) = filters.datetime_bounds();

        qb.push(&Predicate::DateRange {
            column: "s.created_at",
            from,
            to,
        });
        qb.push(&Predicate::EnumIn {
            column: "s.status",
            values: vec!["completed".to_string()],
        });
        if let Some(cashier_id) = &filters.cashier_id {
            qb.push(&Predicate::EqualsId {
                column: "s.cashier_id",
                id: cashier_id.clone(),
            });
        }
        qb
    }

    /// Completed sales aggregated per calendar day, most recent first.
    pub async fn by_day(&self, filters: &ReportFilters) -> DbResult<Vec<SalesDayRow>> {
        let qb = Self::completed_predicates(filters);

        let sql = format!(
            "SELECT date(s.created_at) AS day, \
                    COUNT(*) AS sales_count, \
                    COALESCE(SUM(s.gross_cents), 0) AS gross_cents, \
                    COALESCE(SUM(s.tax_cents), 0) AS tax_cents, \
                    COALESCE(SUM(s.discount_cents), 0) AS discount_cents, \
                    COALESCE(SUM(s.final_cents), 0) AS net_cents \
             FROM {from} {where_clause} {group_by} ORDER BY day DESC",
            from = ReportShape::SALES_BY_DAY.from,
            where_clause = qb.where_clause(),
            group_by = ReportShape::SALES_BY_DAY.group_by,
        );

        let rows = bind_rows(sqlx::query_as::<_, SalesDayRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Completed sales aggregated per payment method, largest first.
    pub async fn by_method(&self, filters: &ReportFilters) -> DbResult<Vec<PaymentMethodRow>> {
        let qb = Self::completed_predicates(filters);

        let sql = format!(
            "SELECT s.payment_method AS method, \
                    COALESCE(SUM(s.final_cents), 0) AS amount_cents, \
                    COUNT(*) AS sales_count \
             FROM {from} {where_clause} {group_by} ORDER BY amount_cents DESC",
            from = ReportShape::SALES_BY_METHOD.from,
            where_clause = qb.where_clause(),
            group_by = ReportShape::SALES_BY_METHOD.group_by,
        );

        let rows = bind_rows(sqlx::query_as::<_, PaymentMethodRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Best-selling products by revenue within the window.
    pub async fn top_products(&self, filters: &ReportFilters) -> DbResult<Vec<TopProductRow>> {
        let mut qb = Self::completed_predicates(filters);
        if let Some(category_id) = &filters.category_id {
            qb.push(&Predicate::EqualsId {
                column: "p.category_id",
                id: category_id.clone(),
            });
        }
        let p_limit = qb.bind(TOP_PRODUCTS_LIMIT);

        let sql = format!(
            "SELECT si.product_id, \
                    p.name AS product_name, \
                    COALESCE(SUM(si.quantity), 0) AS quantity, \
                    COALESCE(SUM(si.line_total_cents), 0) AS revenue_cents \
             FROM {from} {where_clause} {group_by} \
             ORDER BY revenue_cents DESC LIMIT {p_limit}",
            from = ReportShape::TOP_PRODUCTS.from,
            where_clause = qb.where_clause(),
            group_by = ReportShape::TOP_PRODUCTS.group_by,
        );

        let rows = bind_rows(sqlx::query_as::<_, TopProductRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Whole-period totals for one comparison period.
    ///
    /// Money aggregates cover completed sales only; `voided_count` counts
    /// the voided ones. Always returns exactly one row, zeros when empty.
    pub async fn period_totals(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> DbResult<PeriodTotalsRow> {
        let mut qb = QueryBuilder::new();
        qb.push(&Predicate::DateRange {
            column: "s.created_at",
            from: format!("{date_from} 00:00:00"),
            to: format!("{date_to} 23:59:59"),
        });

        let sql = format!(
            "SELECT COALESCE(SUM(s.status = 'completed'), 0) AS sales_count, \
                    COALESCE(SUM(CASE WHEN s.status = 'completed' THEN s.gross_cents END), 0) AS gross_cents, \
                    COALESCE(SUM(CASE WHEN s.status = 'completed' THEN s.final_cents END), 0) AS net_cents, \
                    COALESCE(SUM(CASE WHEN s.status = 'completed' THEN s.discount_cents END), 0) AS discount_cents, \
                    COALESCE(SUM(s.status = 'voided'), 0) AS voided_count \
             FROM sales s {where_clause}",
            where_clause = qb.where_clause(),
        );

        let totals = bind_rows(sqlx::query_as::<_, PeriodTotalsRow>(&sql), qb.args())
            .fetch_one(&self.pool)
            .await?;
        Ok(totals)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
