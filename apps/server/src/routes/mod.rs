//! # Report Routes
//!
//! Every report page follows the same pipeline:
//!
//! ```text
//! gate (session + permission)
//!   → resolve filters (till-core)
//!   → query sections (till-db, per-section timeout)
//!   → reduce metrics (till-core)
//!   → render HTML page, or stream the CSV export
//! ```
//!
//! ## Route Map
//! ```text
//! GET /health                        liveness + migration status (no auth)
//! GET /reports/sales                 daily sales, payment mix, top products
//! GET /reports/sales/comparison      period-over-period metric comparison
//! GET /reports/cash-drops            cash drop history + summary
//! GET /reports/till-closings        end-of-shift reconciliations
//! GET /reports/cashiers              per-cashier accountability
//! GET /reports/loyalty               loyalty points per customer
//! GET /reports/finance               expenses by category
//! GET /api/cash-drops/{id}           JSON drill-down: drop + audit trail
//! ```

pub mod api;
pub mod cash_drops;
pub mod cashiers;
pub mod finance;
pub mod health;
pub mod loyalty;
pub mod sales;
pub mod till_closings;

use axum::routing::get;
use axum::Router;
use chrono::{NaiveDate, Utc};

use crate::error::AppError;
use crate::state::AppState;
use till_core::filters::ReportFilters;
use till_core::types::ExportFormat;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/reports/sales", get(sales::sales_report))
        .route("/reports/sales/comparison", get(sales::sales_comparison))
        .route("/reports/cash-drops", get(cash_drops::cash_drop_report))
        .route("/reports/till-closings", get(till_closings::till_closing_report))
        .route("/reports/cashiers", get(cashiers::cashier_report))
        .route("/reports/loyalty", get(loyalty::loyalty_report))
        .route("/reports/finance", get(finance::finance_report))
        .route("/api/cash-drops/{id}", get(api::cash_drop_detail))
        .with_state(state)
}

/// Today's date, driving the trailing-window defaults.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Export gate: `csv` proceeds, recognised-but-unsupported formats get a
/// machine-readable 400 instead of a silent HTML page.
pub(crate) fn wants_csv(filters: &ReportFilters) -> Result<bool, AppError> {
    match filters.export {
        None => Ok(false),
        Some(ExportFormat::Csv) => Ok(true),
        Some(ExportFormat::Pdf) => Err(AppError::UnsupportedExport("pdf".to_string())),
        Some(ExportFormat::Excel) => Err(AppError::UnsupportedExport("excel".to_string())),
    }
}

// =============================================================================
// Route Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::extract::{Path, Query, State};
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use std::collections::HashMap;
    use std::time::Duration;
    use till_db::{Database, DbConfig};

    async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query(
            "INSERT INTO users (id, username, display_name, role_id, role_name, is_active)
             VALUES ('u-1', 'asha', 'Asha', 1, 'admin', 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at)
             VALUES ('tok-1', 'u-1', '2099-01-01 00:00:00')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        AppState::new(db, Duration::from_secs(10))
    }

    fn authed_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "session_token=tok-1".parse().unwrap());
        headers
    }

    fn params(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    async fn seed_drop(state: &AppState, id: &str, date: &str, status: &str) {
        sqlx::query(
            "INSERT INTO cash_drops (id, drop_date, amount_cents, status, drop_type,
                                     is_emergency, dropped_by)
             VALUES (?1, ?2, 5000, ?3, 'regular', 0, 'u-1')",
        )
        .bind(id)
        .bind(date)
        .bind(status)
        .execute(state.db.pool())
        .await
        .unwrap();
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_unauthenticated_page_redirects_to_login() {
        let state = test_state().await;
        let result = cash_drops::cash_drop_report(
            State(state),
            HeaderMap::new(),
            params(&[]),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[tokio::test]
    async fn test_pdf_export_is_rejected_with_json_400() {
        let state = test_state().await;
        let result = cash_drops::cash_drop_report(
            State(state),
            authed_headers(),
            params(&[("export", "pdf")]),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("\"success\":false"));
        assert!(body.contains("pdf"));
    }

    #[tokio::test]
    async fn test_cash_drop_page_renders_rows_and_summary() {
        let state = test_state().await;
        seed_drop(&state, "d-1", "2024-01-05 10:00:00", "pending").await;
        seed_drop(&state, "d-2", "2024-01-20 14:30:00", "confirmed").await;

        let response = cash_drops::cash_drop_report(
            State(state),
            authed_headers(),
            params(&[("date_from", "2024-01-01"), ("date_to", "2024-01-31")]),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Cash Drop Report"));
        assert!(body.contains("Asha"));
        // Default currency symbol and cents-accurate formatting
        assert!(body.contains("$ 50.00"));
        assert!(body.contains("Confirmation rate"));
    }

    #[tokio::test]
    async fn test_cash_drop_csv_export_covers_full_set() {
        let state = test_state().await;
        // 3 rows with per_page=10 would still fit one page; shrink the page
        for i in 0..3 {
            seed_drop(
                &state,
                &format!("d-{i}"),
                &format!("2024-01-{:02} 10:00:00", i + 5),
                "pending",
            )
            .await;
        }

        let response = cash_drops::cash_drop_report(
            State(state),
            authed_headers(),
            params(&[
                ("date_from", "2024-01-01"),
                ("date_to", "2024-01-31"),
                ("export", "csv"),
                ("per_page", "10"),
                ("page", "9"), // pagination must NOT clip the export
            ]),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert_eq!(body.lines().next().unwrap(), "Cash Drop Report");
        assert_eq!(body.matches("pending").count(), 3);
    }

    #[tokio::test]
    async fn test_drill_down_found_and_missing() {
        let state = test_state().await;
        seed_drop(&state, "d-1", "2024-01-05 10:00:00", "confirmed").await;

        let response = api::cash_drop_detail(
            State(state.clone()),
            authed_headers(),
            Path("d-1".to_string()),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("\"success\":true"));
        assert!(body.contains("\"amount_cents\":5000"));

        let missing = api::cash_drop_detail(
            State(state),
            authed_headers(),
            Path("nope".to_string()),
        )
        .await
        .unwrap_err()
        .into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_drill_down_requires_auth_as_json() {
        let state = test_state().await;
        let response = api::cash_drop_detail(
            State(state),
            HeaderMap::new(),
            Path("d-1".to_string()),
        )
        .await
        .unwrap_err()
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("\"success\":false"));
    }

    #[tokio::test]
    async fn test_health_needs_no_auth() {
        let state = test_state().await;
        let response = health::health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("\"status\":\"ok\""));
    }
}
