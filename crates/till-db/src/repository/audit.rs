//! # Audit Repository
//!
//! Drill-down for a single cash drop: the drop itself plus its audit trail
//! from `security_logs`. Backs the `/api/cash-drops/{id}` endpoint.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use till_core::types::{AuditEventRow, CashDropRow};

/// Repository for audit-trail queries.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Fetches one cash drop by id, or `NotFound`.
    pub async fn drop_by_id(&self, id: &str) -> DbResult<CashDropRow> {
        let row = sqlx::query_as::<_, CashDropRow>(
            "SELECT cd.id, cd.drop_date, cd.amount_cents, cd.status, cd.drop_type, \
                    cd.is_emergency, cd.dropped_by, u.display_name AS dropper_name, \
                    cd.confirmed_by, cd.confirmed_at, cd.notes \
             FROM cash_drops cd JOIN users u ON u.id = cd.dropped_by \
             WHERE cd.id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| DbError::not_found("Cash drop", id))
    }

    /// Every security-log event attached to a cash drop, oldest first.
    pub async fn trail_for_drop(&self, id: &str) -> DbResult<Vec<AuditEventRow>> {
        let rows = sqlx::query_as::<_, AuditEventRow>(
            "SELECT id, event_type, message, actor, created_at \
             FROM security_logs \
             WHERE entity_type = 'cash_drop' AND entity_id = ?1 \
             ORDER BY created_at ASC",
        )
        .bind(id)
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

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO users (id, username, display_name, role_id, role_name)
             VALUES ('u-1', 'asha', 'Asha', 1, 'cashier')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO cash_drops (id, drop_date, amount_cents, status, drop_type,
                                     is_emergency, dropped_by)
             VALUES ('d-1', '2024-01-05 10:00:00', 5000, 'confirmed', 'regular', 0, 'u-1')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    async fn seed_event(db: &Database, id: &str, event_type: &str, at: &str) {
        sqlx::query(
            "INSERT INTO security_logs (id, entity_type, entity_id, event_type, message,
                                        actor, created_at)
             VALUES (?1, 'cash_drop', 'd-1', ?2, ?2, 'u-1', ?3)",
        )
        .bind(id)
        .bind(event_type)
        .bind(at)
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_drop_with_trail() {
        let db = test_db().await;
        seed_event(&db, "l-2", "drop_confirmed", "2024-01-05 11:00:00").await;
        seed_event(&db, "l-1", "drop_created", "2024-01-05 10:00:00").await;

        let drop = db.audit().drop_by_id("d-1").await.unwrap();
        assert_eq!(drop.amount_cents, 5000);
        assert_eq!(drop.dropper_name, "Asha");

        let trail = db.audit().trail_for_drop("d-1").await.unwrap();
        assert_eq!(trail.len(), 2);
        // Oldest first
        assert_eq!(trail[0].event_type, "drop_created");
        assert_eq!(trail[1].event_type, "drop_confirmed");
    }

    #[tokio::test]
    async fn test_unknown_drop_is_not_found() {
        let db = test_db().await;
        let err = db.audit().drop_by_id("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
