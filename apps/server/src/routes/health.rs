//! Liveness endpoint. No authentication: it exposes only a boolean and
//! migration counters.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;
use till_db::migrations;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = state.db.health_check().await;
    let (total, applied) = migrations::migration_status(state.db.pool())
        .await
        .unwrap_or((0, 0));

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "migrations": { "total": total, "applied": applied },
    }))
}
