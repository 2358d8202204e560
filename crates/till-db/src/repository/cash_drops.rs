//! # Cash Drop Repository
//!
//! Read-only queries over the cash-drop history.
//!
//! ## Query Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cash Drop Report Queries                           │
//! │                                                                         │
//! │  ReportFilters                                                          │
//! │       │                                                                 │
//! │       ├── DateRange  cd.drop_date   (always present)                    │
//! │       ├── EnumIn     cd.status      (when status filter set)            │
//! │       ├── EnumIn     cd.drop_type   (when type filter set)              │
//! │       └── EqualsId   cd.dropped_by  (when cashier filter set)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  filtered_page()  → one page of rows, sorted       (HTML table)         │
//! │  filtered_all()   → every matching row, sorted     (summary + CSV)      │
//! │  count()          → total matching rows            (pagination)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::query::{bind_rows, bind_scalar, Predicate, QueryBuilder, ReportShape};
use till_core::filters::ReportFilters;
use till_core::types::CashDropRow;

const SELECT_COLUMNS: &str = "\
    cd.id, \
    cd.drop_date, \
    cd.amount_cents, \
    cd.status, \
    cd.drop_type, \
    cd.is_emergency, \
    cd.dropped_by, \
    u.display_name AS dropper_name, \
    cd.confirmed_by, \
    cd.confirmed_at, \
    cd.notes";

/// Repository for cash-drop report queries.
#[derive(Debug, Clone)]
pub struct CashDropRepository {
    pool: SqlitePool,
}

impl CashDropRepository {
    /// Creates a new CashDropRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashDropRepository { pool }
    }

    /// Builds the shared predicate set for the current filters.
    fn predicates(filters: &ReportFilters) -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        let (from, to) = filters.datetime_bounds();

        qb.push(&Predicate::DateRange {
            column: "cd.drop_date",
            from,
            to,
        });
        if let Some(status) = filters.status {
            qb.push(&Predicate::EnumIn {
                column: "cd.status",
                values: vec![status.as_str().to_string()],
            });
        }
        if let Some(drop_type) = filters.drop_type {
            qb.push(&Predicate::EnumIn {
                column: "cd.drop_type",
                values: vec![drop_type.as_str().to_string()],
            });
        }
        if let Some(cashier_id) = &filters.cashier_id {
            qb.push(&Predicate::EqualsId {
                column: "cd.dropped_by",
                id: cashier_id.clone(),
            });
        }
        qb
    }

    /// Maps the validated sort key onto its qualified column.
    ///
    /// `filters.sort_by` is already restricted to the report's allow-list,
    /// so the fallback arm only covers key-set drift between crates.
    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "amount_cents" => "cd.amount_cents",
            "status" => "cd.status",
            "dropper_name" => "u.display_name",
            _ => "cd.drop_date",
        }
    }

    /// One page of matching drops, sorted per the filters.
    pub async fn filtered_page(&self, filters: &ReportFilters) -> DbResult<Vec<CashDropRow>> {
        let mut qb = Self::predicates(filters);
        let p_limit = qb.bind(filters.per_page as i64);
        let p_offset = qb.bind(filters.offset());

        let sql = format!(
            "SELECT {cols} FROM {from} {where_clause} \
             ORDER BY {sort} {dir} LIMIT {p_limit} OFFSET {p_offset}",
            cols = SELECT_COLUMNS,
            from = ReportShape::CASH_DROPS.from,
            where_clause = qb.where_clause(),
            sort = Self::sort_column(filters.sort_by),
            dir = filters.sort_order.as_sql(),
        );
        debug!(sql = %sql, "Cash drop page query");

        let rows = bind_rows(sqlx::query_as::<_, CashDropRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Every matching drop, sorted. Feeds the summary card and the CSV
    /// export, both of which cover the whole filtered set.
    pub async fn filtered_all(&self, filters: &ReportFilters) -> DbResult<Vec<CashDropRow>> {
        let qb = Self::predicates(filters);

        let sql = format!(
            "SELECT {cols} FROM {from} {where_clause} ORDER BY {sort} {dir}",
            cols = SELECT_COLUMNS,
            from = ReportShape::CASH_DROPS.from,
            where_clause = qb.where_clause(),
            sort = Self::sort_column(filters.sort_by),
            dir = filters.sort_order.as_sql(),
        );

        let rows = bind_rows(sqlx::query_as::<_, CashDropRow>(&sql), qb.args())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Total matching rows, for pagination.
    pub async fn count(&self, filters: &ReportFilters) -> DbResult<i64> {
        let qb = Self::predicates(filters);

        let sql = format!(
            "SELECT COUNT(*) FROM {from} {where_clause}",
            from = ReportShape::CASH_DROPS.from,
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
    use till_core::metrics::CashDropSummary;
    use till_core::types::DropStatus;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_user(db: &Database, id: &str, name: &str) {
        sqlx::query(
            "INSERT INTO users (id, username, display_name, role_id, role_name)
             VALUES (?1, ?1, ?2, 1, 'cashier')",
        )
        .bind(id)
        .bind(name)
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_drop(
        db: &Database,
        id: &str,
        date: &str,
        amount_cents: i64,
        status: &str,
        dropped_by: &str,
    ) {
        sqlx::query(
            "INSERT INTO cash_drops (id, drop_date, amount_cents, status, drop_type,
                                     is_emergency, dropped_by)
             VALUES (?1, ?2, ?3, ?4, 'regular', 0, ?5)",
        )
        .bind(id)
        .bind(date)
        .bind(amount_cents)
        .bind(status)
        .bind(dropped_by)
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
        ReportFilters::resolve(&params, &ReportDefaults::CASH_DROPS, today)
    }

    /// End-to-end: January window + pending filter yields only pending
    /// January drops, and the summary's pending count equals the row count.
    #[tokio::test]
    async fn test_pending_drops_in_window() {
        let db = test_db().await;
        seed_user(&db, "u-1", "Asha").await;

        seed_drop(&db, "d-1", "2024-01-05 10:00:00", 5000, "pending", "u-1").await;
        seed_drop(&db, "d-2", "2024-01-20 14:30:00", 8000, "pending", "u-1").await;
        seed_drop(&db, "d-3", "2024-01-10 09:00:00", 3000, "confirmed", "u-1").await;
        // Outside the window
        seed_drop(&db, "d-4", "2024-02-02 11:00:00", 9000, "pending", "u-1").await;

        let f = filters(&[
            ("date_from", "2024-01-01"),
            ("date_to", "2024-01-31"),
            ("status", "pending"),
        ]);

        let repo = db.cash_drops();
        let rows = repo.filtered_all(&f).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == DropStatus::Pending));
        assert!(rows.iter().all(|r| r.id != "d-4"));

        let summary = CashDropSummary::from_rows(&rows);
        assert_eq!(summary.pending_drops, rows.len());
        assert_eq!(summary.total_amount.cents(), 13_000);

        assert_eq!(repo.count(&f).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_default_sort_newest_first() {
        let db = test_db().await;
        seed_user(&db, "u-1", "Asha").await;
        seed_drop(&db, "d-1", "2024-01-05 10:00:00", 5000, "pending", "u-1").await;
        seed_drop(&db, "d-2", "2024-01-20 14:30:00", 8000, "pending", "u-1").await;

        let f = filters(&[("date_from", "2024-01-01"), ("date_to", "2024-01-31")]);
        let rows = db.cash_drops().filtered_page(&f).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "d-2");
        assert_eq!(rows[1].id, "d-1");
        assert_eq!(rows[0].dropper_name, "Asha");
    }

    #[tokio::test]
    async fn test_pagination_slices_rows() {
        let db = test_db().await;
        seed_user(&db, "u-1", "Asha").await;
        for i in 0..15 {
            seed_drop(
                &db,
                &format!("d-{i}"),
                &format!("2024-01-{:02} 10:00:00", i + 1),
                1000 + i,
                "confirmed",
                "u-1",
            )
            .await;
        }

        let f = filters(&[
            ("date_from", "2024-01-01"),
            ("date_to", "2024-01-31"),
            ("page", "2"),
            ("per_page", "10"),
        ]);
        let rows = db.cash_drops().filtered_page(&f).await.unwrap();

        // 15 rows, page 2 of 10 → the 5 oldest
        assert_eq!(rows.len(), 5);
        assert_eq!(db.cash_drops().count(&f).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_cashier_filter() {
        let db = test_db().await;
        seed_user(&db, "u-1", "Asha").await;
        seed_user(&db, "u-2", "Bilal").await;
        seed_drop(&db, "d-1", "2024-01-05 10:00:00", 5000, "pending", "u-1").await;
        seed_drop(&db, "d-2", "2024-01-06 10:00:00", 5000, "pending", "u-2").await;

        let f = filters(&[
            ("date_from", "2024-01-01"),
            ("date_to", "2024-01-31"),
            ("cashier_id", "u-2"),
        ]);
        let rows = db.cash_drops().filtered_all(&f).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dropped_by, "u-2");
    }
}
