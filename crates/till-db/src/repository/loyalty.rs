//! # Loyalty Points Repository
//!
//! Per-customer points movement for the loyalty report.
//!
//! The `loyalty_points_transactions` table stores every movement as a
//! positive point count plus a direction; earned and redeemed are split
//! with conditional sums, balance is derived in `till_core`.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::query::{bind_rows, Predicate, QueryBuilder, ReportShape};
use till_core::filters::ReportFilters;
use till_core::types::LoyaltyRow;

/// Repository for loyalty report queries.
#[derive(Debug, Clone)]
pub struct LoyaltyRepository {
    pool: SqlitePool,
}

impl LoyaltyRepository {
    /// Creates a new LoyaltyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoyaltyRepository { pool }
    }

    fn predicates(filters: &ReportFilters) -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        let (from, to) = filters.datetime_bounds();

        qb.push(&Predicate::DateRange {
            column: "lt.created_at",
            from,
            to,
        });
        if let Some(customer_id) = &filters.customer_id {
            qb.push(&Predicate::EqualsId {
                column: "lt.customer_id",
                id: customer_id.clone(),
            });
        }
        qb
    }

    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "points_redeemed" => "points_redeemed",
            "customer_name" => "customer_name",
            _ => "points_earned",
        }
    }

    /// Points earned/redeemed aggregated per customer within the window.
    pub async fn per_customer(&self, filters: &ReportFilters) -> DbResult<Vec<LoyaltyRow>> {
        let qb = Self::predicates(filters);

        let sql = format!(
            "SELECT lt.customer_id, \
                    c.name AS customer_name, \
                    COALESCE(SUM(CASE WHEN lt.direction = 'earned' THEN lt.points END), 0) AS points_earned, \
                    COALESCE(SUM(CASE WHEN lt.direction = 'redeemed' THEN lt.points END), 0) AS points_redeemed \
             FROM {from} {where_clause} {group_by} ORDER BY {sort} {dir}",
            from = ReportShape::LOYALTY.from,
            where_clause = qb.where_clause(),
            group_by = ReportShape::LOYALTY.group_by,
            sort = Self::sort_column(filters.sort_by),
            dir = filters.sort_order.as_sql(),
        );

        let rows = bind_rows(sqlx::query_as::<_, LoyaltyRow>(&sql), qb.args())
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
    use till_core::metrics::LoyaltySummary;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (id, name) in [("c-1", "Ada"), ("c-2", "Grace")] {
            sqlx::query("INSERT INTO customers (id, name) VALUES (?1, ?2)")
                .bind(id)
                .bind(name)
                .execute(db.pool())
                .await
                .unwrap();
        }
        db
    }

    async fn seed_tx(db: &Database, id: &str, customer: &str, points: i64, dir: &str, at: &str) {
        sqlx::query(
            "INSERT INTO loyalty_points_transactions (id, customer_id, points, direction, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(id)
        .bind(customer)
        .bind(points)
        .bind(dir)
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
        ReportFilters::resolve(&params, &ReportDefaults::LOYALTY, today)
    }

    #[tokio::test]
    async fn test_per_customer_splits_directions() {
        let db = test_db().await;
        seed_tx(&db, "t-1", "c-1", 500, "earned", "2024-01-05 10:00:00").await;
        seed_tx(&db, "t-2", "c-1", 120, "redeemed", "2024-01-06 10:00:00").await;
        seed_tx(&db, "t-3", "c-2", 50, "earned", "2024-01-07 10:00:00").await;

        let f = filters(&[("date_from", "2024-01-01"), ("date_to", "2024-01-31")]);
        let rows = db.loyalty().per_customer(&f).await.unwrap();

        // Default sort: points_earned desc
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer_name, "Ada");
        assert_eq!(rows[0].points_earned, 500);
        assert_eq!(rows[0].points_redeemed, 120);
        assert_eq!(rows[0].balance(), 380);

        let summary = LoyaltySummary::from_rows(&rows);
        assert_eq!(summary.total_earned, 550);
        assert_eq!(summary.outstanding, 430);
        assert_eq!(summary.customers, 2);
    }

    #[tokio::test]
    async fn test_customer_filter_and_window() {
        let db = test_db().await;
        seed_tx(&db, "t-1", "c-1", 500, "earned", "2024-01-05 10:00:00").await;
        seed_tx(&db, "t-2", "c-2", 50, "earned", "2024-01-07 10:00:00").await;
        // Outside the window
        seed_tx(&db, "t-3", "c-1", 999, "earned", "2023-12-01 10:00:00").await;

        let f = filters(&[
            ("date_from", "2024-01-01"),
            ("date_to", "2024-01-31"),
            ("customer_id", "c-1"),
        ]);
        let rows = db.loyalty().per_customer(&f).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].points_earned, 500);
    }
}
