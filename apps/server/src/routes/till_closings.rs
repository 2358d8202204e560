//! Till closing report page: reconciliation table, variance summary, CSV.

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
use till_core::format::{format_currency, format_datetime};
use till_core::metrics::TillClosingSummary;
use till_core::money::Money;
use till_core::types::TillClosingRow;
use till_db::section;

pub async fn till_closing_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Response, PageError> {
    auth::require(&state.db, &headers, permissions::CASH).await?;

    let filters = ReportFilters::resolve(&params, &ReportDefaults::TILL_CLOSINGS, today());
    let symbol = state.settings.currency_symbol(&state.db).await?;
    let company = state.settings.company_name(&state.db).await?;
    let repo = state.db.till_closings();

    if wants_csv(&filters)? {
        let rows = repo.filtered_all(&filters).await?;
        let summary = TillClosingSummary::from_rows(&rows);
        return Ok(export::till_closings_csv(&rows, &summary, &symbol, Utc::now())?);
    }

    let page_rows = section::run(
        "till closing table",
        state.query_timeout,
        repo.filtered_page(&filters),
    )
    .await;
    let all_rows = section::run(
        "till closing summary",
        state.query_timeout,
        repo.filtered_all(&filters),
    )
    .await;
    let total = repo.count(&filters).await.unwrap_or(0);

    let mut body = String::new();

    body.push_str(&render::section_or_banner(&all_rows, "summary", |rows| {
        let summary = TillClosingSummary::from_rows(rows);
        let mut html = render::summary_cards(&[
            ("Closings", summary.total_closings.to_string()),
            ("Shortages", summary.shortages.to_string()),
            ("Excesses", summary.excesses.to_string()),
            ("Exact", summary.exacts.to_string()),
            ("Net variance", format_currency(summary.net_variance, &symbol)),
            ("Cash short", format_currency(summary.total_shortage, &symbol)),
            ("Cash over", format_currency(summary.total_excess, &symbol)),
        ]);
        if summary.inconsistent_rows > 0 {
            html.push_str(&format!(
                "<div class=\"reconciliation-warning\">{} closing record(s) \
                 failed the reconciliation recheck.</div>\n",
                summary.inconsistent_rows
            ));
        }
        html
    }));

    body.push_str(&render::section_or_banner(&page_rows, "till closings", |rows| {
        render::table(
            &[
                "Closed at", "Cashier", "Opening", "Sales", "Drops",
                "Expected", "Counted", "Difference", "Result",
            ],
            &rows.iter().map(|r| row_cells(r, &symbol)).collect::<Vec<_>>(),
        )
    }));
    body.push_str(&render::pagination(filters.page, filters.per_page, total));

    let html = render::page("Till Closing Report", &company, &body);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}

fn row_cells(row: &TillClosingRow, symbol: &str) -> Vec<String> {
    vec![
        format_datetime(row.closed_at),
        row.cashier_name.clone(),
        format_currency(Money::from_cents(row.opening_amount_cents), symbol),
        format_currency(Money::from_cents(row.total_sales_cents), symbol),
        format_currency(Money::from_cents(row.total_drops_cents), symbol),
        format_currency(row.expected_balance(), symbol),
        format_currency(Money::from_cents(row.counted_amount_cents), symbol),
        format_currency(row.difference(), symbol),
        row.shortage_type.as_str().to_string(),
    ]
}
