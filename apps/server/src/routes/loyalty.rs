//! Loyalty points page: per-customer earned/redeemed/balance.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::auth::{self, permissions};
use crate::error::PageError;
use crate::export;
use crate::render;
use crate::routes::{today, wants_csv};
use crate::state::AppState;
use till_core::filters::{ReportDefaults, ReportFilters, ReportParams};
use till_core::metrics::LoyaltySummary;
use till_db::section;

pub async fn loyalty_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Response, PageError> {
    auth::require(&state.db, &headers, permissions::LOYALTY).await?;

    let filters = ReportFilters::resolve(&params, &ReportDefaults::LOYALTY, today());
    let company = state.settings.company_name(&state.db).await?;
    let repo = state.db.loyalty();

    if wants_csv(&filters)? {
        let rows = repo.per_customer(&filters).await?;
        return Ok(export::loyalty_csv(&rows, Utc::now())?);
    }

    let rows = section::run(
        "loyalty points",
        state.query_timeout,
        repo.per_customer(&filters),
    )
    .await;

    let mut body = String::new();
    body.push_str(&render::section_or_banner(&rows, "loyalty points", |rows| {
        let summary = LoyaltySummary::from_rows(rows);
        let mut html = render::summary_cards(&[
            ("Customers", summary.customers.to_string()),
            ("Points earned", summary.total_earned.to_string()),
            ("Points redeemed", summary.total_redeemed.to_string()),
            ("Outstanding", summary.outstanding.to_string()),
        ]);
        html.push_str(&render::table(
            &["Customer", "Earned", "Redeemed", "Balance"],
            &rows
                .iter()
                .map(|r| {
                    vec![
                        r.customer_name.clone(),
                        r.points_earned.to_string(),
                        r.points_redeemed.to_string(),
                        r.balance().to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        ));
        html
    }));

    let html = render::page("Loyalty Points Report", &company, &body);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}
