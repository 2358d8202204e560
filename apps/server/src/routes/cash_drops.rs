//! Cash drop report page: history table, summary cards, CSV export.

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
use till_core::format::{format_currency, format_datetime, format_percent};
use till_core::metrics::CashDropSummary;
use till_core::types::CashDropRow;
use till_db::section;

pub async fn cash_drop_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Response, PageError> {
    auth::require(&state.db, &headers, permissions::CASH).await?;

    let filters = ReportFilters::resolve(&params, &ReportDefaults::CASH_DROPS, today());
    let symbol = state.settings.currency_symbol(&state.db).await?;
    let company = state.settings.company_name(&state.db).await?;
    let repo = state.db.cash_drops();

    // CSV covers the whole filtered set; a failed export query is a hard
    // error, not a degraded section.
    if wants_csv(&filters)? {
        let rows = repo.filtered_all(&filters).await?;
        let summary = CashDropSummary::from_rows(&rows);
        return Ok(export::cash_drops_csv(&rows, &summary, &symbol, Utc::now())?);
    }

    let page_rows = section::run(
        "cash drop table",
        state.query_timeout,
        repo.filtered_page(&filters),
    )
    .await;
    let all_rows = section::run(
        "cash drop summary",
        state.query_timeout,
        repo.filtered_all(&filters),
    )
    .await;
    let total = repo.count(&filters).await.unwrap_or(0);

    let mut body = String::new();

    body.push_str(&render::section_or_banner(&all_rows, "summary", |rows| {
        let summary = CashDropSummary::from_rows(rows);
        render::summary_cards(&[
            ("Total drops", summary.total_drops.to_string()),
            ("Total amount", format_currency(summary.total_amount, &symbol)),
            ("Pending", summary.pending_drops.to_string()),
            ("Confirmed", summary.confirmed_drops.to_string()),
            ("Cancelled", summary.cancelled_drops.to_string()),
            ("Emergency", summary.emergency_drops.to_string()),
            ("Confirmation rate", format_percent(summary.confirmation_rate)),
        ])
    }));

    body.push_str(&render::section_or_banner(&page_rows, "cash drops", |rows| {
        render::table(
            &["Date", "Amount", "Status", "Type", "Emergency", "Dropped by", "Notes"],
            &rows.iter().map(|r| row_cells(r, &symbol)).collect::<Vec<_>>(),
        )
    }));
    body.push_str(&render::pagination(filters.page, filters.per_page, total));

    let html = render::page("Cash Drop Report", &company, &body);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}

fn row_cells(row: &CashDropRow, symbol: &str) -> Vec<String> {
    vec![
        format_datetime(row.drop_date),
        format_currency(row.amount(), symbol),
        row.status.as_str().to_string(),
        row.drop_type.as_str().to_string(),
        if row.is_emergency { "yes" } else { "no" }.to_string(),
        row.dropper_name.clone(),
        row.notes.clone().unwrap_or_default(),
    ]
}
