//! # Finance Repository
//!
//! Expenses aggregated by category for the finance report.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::query::{bind_rows, Predicate, QueryBuilder, ReportShape};
use till_core::filters::ReportFilters;
use till_core::types::ExpenseRow;

/// Repository for finance report queries.
#[derive(Debug, Clone)]
pub struct FinanceRepository {
    pool: SqlitePool,
}

impl FinanceRepository {
    /// Creates a new FinanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FinanceRepository { pool }
    }

    fn predicates(filters: &ReportFilters) -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        let (from, to) = filters.datetime_bounds();

        qb.push(&Predicate::DateRange {
            column: "e.incurred_at",
            from,
            to,
        });
        if let Some(category_id) = &filters.category_id {
            qb.push(&Predicate::EqualsId {
                column: "e.category",
                id: category_id.clone(),
            });
        }
        if let Some(supplier_id) = &filters.supplier_id {
            qb.push(&Predicate::EqualsId {
                column: "e.supplier_id",
                id: supplier_id.clone(),
            });
        }
        qb
    }

    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "expense_count" => "expense_count",
            "category" => "category",
            _ => "total_cents",
        }
    }

    /// Expenses aggregated per category within the window.
    pub async fn by_category(&self, filters: &ReportFilters) -> DbResult<Vec<ExpenseRow>> {
        let qb = Self::predicates(filters);

        let sql = format!(
            "SELECT e.category, \
                    COUNT(*) AS expense_count, \
                    COALESCE(SUM(e.amount_cents), 0) AS total_cents \
             FROM {from} {where_clause} {group_by} ORDER BY {sort} {dir}",
            from = ReportShape::EXPENSES.from,
            where_clause = qb.where_clause(),
            group_by = ReportShape::EXPENSES.group_by,
            sort = Self::sort_column(filters.sort_by),
            dir = filters.sort_order.as_sql(),
        );

        let rows = bind_rows(sqlx::query_as::<_, ExpenseRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
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

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_expense(db: &Database, id: &str, category: &str, cents: i64, at: &str) {
        sqlx::query(
            "INSERT INTO expenses (id, category, amount_cents, incurred_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id)
        .bind(category)
        .bind(cents)
        .bind(at)
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
        ReportFilters::resolve(&params, &ReportDefaults::FINANCE, today)
    }

    #[tokio::test]
    async fn test_by_category_grouping() {
        let db = test_db().await;
        seed_expense(&db, "e-1", "rent", 50_000, "2024-01-01 09:00:00").await;
        seed_expense(&db, "e-2", "utilities", 8_000, "2024-01-05 09:00:00").await;
        seed_expense(&db, "e-3", "utilities", 4_000, "2024-01-20 09:00:00").await;
        // Outside the window
        seed_expense(&db, "e-4", "rent", 50_000, "2023-12-01 09:00:00").await;

        let f = filters(&[("date_from", "2024-01-01"), ("date_to", "2024-01-31")]);
        let rows = db.finance().by_category(&f).await.unwrap();

        // Default sort: total_cents desc
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "rent");
        assert_eq!(rows[0].total_cents, 50_000);
        assert_eq!(rows[1].category, "utilities");
        assert_eq!(rows[1].expense_count, 2);
        assert_eq!(rows[1].total_cents, 12_000);
    }

    #[tokio::test]
    async fn test_category_filter() {
        let db = test_db().await;
        seed_expense(&db, "e-1", "rent", 50_000, "2024-01-01 09:00:00").await;
        seed_expense(&db, "e-2", "utilities", 8_000, "2024-01-05 09:00:00").await;

        let f = filters(&[
            ("date_from", "2024-01-01"),
            ("date_to", "2024-01-31"),
            ("category_id", "utilities"),
        ]);
        let rows = db.finance().by_category(&f).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "utilities");
    }
}
