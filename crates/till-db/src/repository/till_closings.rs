//! # Till Closing Repository
//!
//! Read-only queries over end-of-shift reconciliation records.
//!
//! The derived fields (`expected_balance_cents`, `difference_cents`,
//! `shortage_type`) are persisted at closing time and guarded by CHECK
//! constraints; `till_core::metrics::verify_closing` recomputes them when
//! the summary is built, so a manually edited row surfaces as flagged
//! rather than silently wrong.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::query::{bind_rows, bind_scalar, Predicate, QueryBuilder, ReportShape};
use till_core::filters::ReportFilters;
use till_core::types::TillClosingRow;

const SELECT_COLUMNS: &str = "\
    tc.id, \
    tc.closed_at, \
    tc.cashier_id, \
    u.display_name AS cashier_name, \
    tc.opening_amount_cents, \
    tc.total_sales_cents, \
    tc.total_drops_cents, \
    tc.expected_balance_cents, \
    tc.counted_amount_cents, \
    tc.difference_cents, \
    tc.shortage_type";

/// Repository for till-closing report queries.
#[derive(Debug, Clone)]
pub struct TillClosingRepository {
    pool: SqlitePool,
}

impl TillClosingRepository {
    /// Creates a new TillClosingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TillClosingRepository { pool }
    }

    fn predicates(filters: &ReportFilters) -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        let (from, to) = filters.datetime_bounds();

        qb.push(&Predicate::DateRange {
            column: "tc.closed_at",
            from,
            to,
        });
        if let Some(shortage_type) = filters.shortage_type {
            qb.push(&Predicate::EnumIn {
                column: "tc.shortage_type",
                values: vec![shortage_type.as_str().to_string()],
            });
        }
        if let Some(cashier_id) = &filters.cashier_id {
            qb.push(&Predicate::EqualsId {
                column: "tc.cashier_id",
                id: cashier_id.clone(),
            });
        }
        qb
    }

    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "difference_cents" => "tc.difference_cents",
            "cashier_name" => "u.display_name",
            _ => "tc.closed_at",
        }
    }

    /// One page of matching closings, sorted per the filters.
    pub async fn filtered_page(&self, filters: &ReportFilters) -> DbResult<Vec<TillClosingRow>> {
        let mut qb = Self::predicates(filters);
        let p_limit = qb.bind(filters.per_page as i64);
        let p_offset = qb.bind(filters.offset());

        let sql = format!(
            "SELECT {cols} FROM {from} {where_clause} \
             ORDER BY {sort} {dir} LIMIT {p_limit} OFFSET {p_offset}",
            cols = SELECT_COLUMNS,
            from = ReportShape::TILL_CLOSINGS.from,
            where_clause = qb.where_clause(),
            sort = Self::sort_column(filters.sort_by),
            dir = filters.sort_order.as_sql(),
        );

        let rows = bind_rows(sqlx::query_as::<_, TillClosingRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Every matching closing: summary card and CSV export input.
    pub async fn filtered_all(&self, filters: &ReportFilters) -> DbResult<Vec<TillClosingRow>> {
        let qb = Self::predicates(filters);

        let sql = format!(
            "SELECT {cols} FROM {from} {where_clause} ORDER BY {sort} {dir}",
            cols = SELECT_COLUMNS,
            from = ReportShape::TILL_CLOSINGS.from,
            where_clause = qb.where_clause(),
            sort = Self::sort_column(filters.sort_by),
            dir = filters.sort_order.as_sql(),
        );

        let rows = bind_rows(sqlx::query_as::<_, TillClosingRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Total matching rows, for pagination.
    pub async fn count(&self, filters: &ReportFilters) -> DbResult<i64> {
        let qb = Self::predicates(filters);

        let sql = format!(
            "SELECT COUNT(*) FROM {from} {where_clause}",
            from = ReportShape::TILL_CLOSINGS.from,
            where_clause = qb.where_clause(),
        );

        let count = bind_scalar(sqlx::query_scalar::<_, i64>(&sql), qb.args())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::collections::HashMap;
    use till_core::filters::ReportDefaults;
    use till_core::metrics::TillClosingSummary;
    use till_core::types::ShortageType;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO users (id, username, display_name, role_id, role_name)
             VALUES ('u-1', 'asha', 'Asha', 1, 'cashier')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    /// Inserts a closing with the derived fields computed the way the till
    /// workflow computes them.
    async fn seed_closing(
        db: &Database,
        id: &str,
        closed_at: &str,
        opening: i64,
        sales: i64,
        drops: i64,
        counted: i64,
    ) {
        let expected = opening + sales - drops;
        let difference = counted - expected;
        let shortage_type = if difference < 0 {
            "shortage"
        } else if difference > 0 {
            "excess"
        } else {
            "exact"
        };

        sqlx::query(
            "INSERT INTO till_closings (id, closed_at, cashier_id, opening_amount_cents,
                                        total_sales_cents, total_drops_cents,
                                        expected_balance_cents, counted_amount_cents,
                                        difference_cents, shortage_type)
             VALUES (?1, ?2, 'u-1', ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(id)
        .bind(closed_at)
        .bind(opening)
        .bind(sales)
        .bind(drops)
        .bind(expected)
        .bind(counted)
        .bind(difference)
        .bind(shortage_type)
        .execute(db.pool())
        .await
        .unwrap();
    }

    fn filters(pairs: &[(&str, &str)]) -> ReportFilters {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let today = chrono::NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        ReportFilters::resolve(&params, &ReportDefaults::TILL_CLOSINGS, today)
    }

    #[tokio::test]
    async fn test_reconciliation_fields_round_trip() {
        let db = test_db().await;
        // opening 100.00 + sales 250.00 - drops 200.00 = expected 150.00;
        // counted 148.50 → shortage of 1.50
        seed_closing(&db, "tc-1", "2024-01-10 22:00:00", 10_000, 25_000, 20_000, 14_850).await;

        let f = filters(&[("date_from", "2024-01-01"), ("date_to", "2024-01-31")]);
        let rows = db.till_closings().filtered_all(&f).await.unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.expected_balance_cents, 15_000);
        assert_eq!(row.difference_cents, -150);
        assert_eq!(row.shortage_type, ShortageType::Shortage);
        assert_eq!(row.cashier_name, "Asha");

        let summary = TillClosingSummary::from_rows(&rows);
        assert_eq!(summary.shortages, 1);
        assert_eq!(summary.inconsistent_rows, 0);
    }

    #[tokio::test]
    async fn test_shortage_type_filter() {
        let db = test_db().await;
        seed_closing(&db, "tc-1", "2024-01-10 22:00:00", 10_000, 0, 0, 9_000).await;
        seed_closing(&db, "tc-2", "2024-01-11 22:00:00", 10_000, 0, 0, 10_000).await;
        seed_closing(&db, "tc-3", "2024-01-12 22:00:00", 10_000, 0, 0, 11_000).await;

        let f = filters(&[
            ("date_from", "2024-01-01"),
            ("date_to", "2024-01-31"),
            ("shortage_type", "excess"),
        ]);
        let rows = db.till_closings().filtered_all(&f).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "tc-3");
        assert_eq!(db.till_closings().count(&f).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_bad_derivation() {
        let db = test_db().await;
        // expected_balance deliberately wrong: 1 + 1 - 0 != 5
        let result = sqlx::query(
            "INSERT INTO till_closings (id, closed_at, cashier_id, opening_amount_cents,
                                        total_sales_cents, total_drops_cents,
                                        expected_balance_cents, counted_amount_cents,
                                        difference_cents, shortage_type)
             VALUES ('tc-x', '2024-01-10 22:00:00', 'u-1', 1, 1, 0, 5, 5, 0, 'exact')",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err());
    }
}
