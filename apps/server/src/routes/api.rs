//! JSON drill-down endpoints.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{self, permissions};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/cash-drops/{id}
///
/// One cash drop plus its audit trail from the security log. Backs the
/// detail modal on the cash-drop report page.
pub async fn cash_drop_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers, permissions::CASH).await?;

    let repo = state.db.audit();
    let drop = repo.drop_by_id(&id).await?;
    let trail = repo.trail_for_drop(&id).await?;

    Ok(Json(json!({
        "success": true,
        "drop": drop,
        "audit_trail": trail,
    })))
}
