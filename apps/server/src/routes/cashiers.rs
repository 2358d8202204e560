//! Cashier accountability page: per-cashier sales, voids, void rating,
//! and day-to-day consistency.

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
use till_core::format::{format_currency, format_percent};
use till_core::metrics::CashierPerformance;
use till_core::types::{CashierDayRow, CashierRow};
use till_db::section;

/// Joins the aggregate rows with each cashier's daily series.
fn performances(rows: &[CashierRow], days: &[CashierDayRow]) -> Vec<CashierPerformance> {
    rows.iter()
        .map(|row| {
            let daily: Vec<f64> = days
                .iter()
                .filter(|d| d.cashier_id == row.cashier_id)
                .map(|d| d.total_cents as f64)
                .collect();
            CashierPerformance::compute(row, &daily)
        })
        .collect()
}

pub async fn cashier_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Response, PageError> {
    auth::require(&state.db, &headers, permissions::CASHIERS).await?;

    let filters = ReportFilters::resolve(&params, &ReportDefaults::CASHIERS, today());
    let symbol = state.settings.currency_symbol(&state.db).await?;
    let company = state.settings.company_name(&state.db).await?;
    let repo = state.db.cashiers();

    if wants_csv(&filters)? {
        let rows = repo.totals(&filters).await?;
        let days = repo.daily_totals(&filters).await?;
        let perf = performances(&rows, &days);
        return Ok(export::cashiers_csv(&perf, &symbol, Utc::now())?);
    }

    let totals = section::run("cashier totals", state.query_timeout, repo.totals(&filters)).await;
    let days = section::run(
        "cashier daily totals",
        state.query_timeout,
        repo.daily_totals(&filters),
    )
    .await;

    let mut body = String::new();

    if totals.unavailable {
        body.push_str(&render::unavailable_banner("cashier accountability"));
    } else {
        // A missing daily series only zeroes the consistency column.
        let perf = performances(&totals.rows, &days.rows);
        body.push_str(&render::summary_cards(&[
            ("Cashiers", perf.len().to_string()),
        ]));
        body.push_str(&render::table(
            &[
                "Cashier", "Sales", "Voided", "Total", "Average sale",
                "Void rate", "Rating", "Consistency", "Trend",
            ],
            &perf
                .iter()
                .map(|p| {
                    vec![
                        p.username.clone(),
                        p.sales_count.to_string(),
                        p.voided_count.to_string(),
                        format_currency(p.total, &symbol),
                        format_currency(p.average_sale, &symbol),
                        format_percent(p.void_rate),
                        p.rating.label().to_string(),
                        format!("{:.0}", p.consistency_score),
                        p.daily_trend.as_str().to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        ));
    }

    let html = render::page("Cashier Accountability", &company, &body);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}
