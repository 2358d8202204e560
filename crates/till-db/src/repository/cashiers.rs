//! # Cashier Accountability Repository
//!
//! Per-cashier aggregates for the accountability report.
//!
//! Two queries feed each page: `totals` produces the per-cashier table
//! (sales, voids, revenue), `daily_totals` produces the per-cashier-per-day
//! series that `till_core::metrics::consistency_score` reduces.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::query::{bind_rows, Predicate, QueryBuilder, ReportShape};
use till_core::filters::ReportFilters;
use till_core::types::{CashierDayRow, CashierRow};

/// Repository for cashier accountability queries.
#[derive(Debug, Clone)]
pub struct CashierRepository {
    pool: SqlitePool,
}

impl CashierRepository {
    /// Creates a new CashierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashierRepository { pool }
    }

    fn predicates(filters: &ReportFilters) -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        let (from, to) = filters.datetime_bounds();

        qb.push(&Predicate::DateRange {
            column: "s.created_at",
            from,
            to,
        });
        if let Some(cashier_id) = &filters.cashier_id {
            qb.push(&Predicate::EqualsId {
                column: "s.cashier_id",
                id: cashier_id.clone(),
            });
        }
        qb
    }

    /// Sort keys here are aggregate aliases, so ORDER BY uses the alias.
    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "sales_count" => "sales_count",
            "voided_count" => "voided_count",
            "username" => "username",
            _ => "total_cents",
        }
    }

    /// Per-cashier totals over the window. Money columns cover completed
    /// sales only; voids are counted, never summed.
    pub async fn totals(&self, filters: &ReportFilters) -> DbResult<Vec<CashierRow>> {
        let qb = Self::predicates(filters);

        let sql = format!(
            "SELECT s.cashier_id, \
                    u.username, \
                    COALESCE(SUM(s.status = 'completed'), 0) AS sales_count, \
                    COALESCE(SUM(s.status = 'voided'), 0) AS voided_count, \
                    COALESCE(SUM(CASE WHEN s.status = 'completed' THEN s.final_cents END), 0) AS total_cents \
             FROM {from} {where_clause} {group_by} ORDER BY {sort} {dir}",
            from = ReportShape::CASHIERS.from,
            where_clause = qb.where_clause(),
            group_by = ReportShape::CASHIERS.group_by,
            sort = Self::sort_column(filters.sort_by),
            dir = filters.sort_order.as_sql(),
        );

        let rows = bind_rows(sqlx::query_as::<_, CashierRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One row per cashier per day with completed sales, oldest first.
    /// Input to the consistency score.
    pub async fn daily_totals(&self, filters: &ReportFilters) -> DbResult<Vec<CashierDayRow>> {
        let mut qb = Self::predicates(filters);
        qb.push(&Predicate::EnumIn {
            column: "s.status",
            values: vec!["completed".to_string()],
        });

        let sql = format!(
            "SELECT s.cashier_id, \
                    date(s.created_at) AS day, \
                    COALESCE(SUM(s.final_cents), 0) AS total_cents \
             FROM sales s {where_clause} \
             GROUP BY s.cashier_id, date(s.created_at) \
             ORDER BY s.cashier_id, day",
            where_clause = qb.where_clause(),
        );

        let rows = bind_rows(sqlx::query_as::<_, CashierDayRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
