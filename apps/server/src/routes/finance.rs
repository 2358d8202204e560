//! Finance page: expenses grouped by category, set against the same
//! window's completed-sales net so the header shows the net result.

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
use till_core::format::format_currency;
use till_core::money::Money;
use till_db::section;

pub async fn finance_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Response, PageError> {
    auth::require(&state.db, &headers, permissions::FINANCE).await?;

    let filters = ReportFilters::resolve(&params, &ReportDefaults::FINANCE, today());
    let symbol = state.settings.currency_symbol(&state.db).await?;
    let company = state.settings.company_name(&state.db).await?;
    let repo = state.db.finance();
    let sales = state.db.sales();

    if wants_csv(&filters)? {
        let rows = repo.by_category(&filters).await?;
        let totals = sales.period_totals(filters.date_from, filters.date_to).await?;
        let net = Money::from_cents(totals.net_cents);
        return Ok(export::finance_csv(&rows, net, &symbol, Utc::now())?);
    }

    let rows = section::run("expenses", state.query_timeout, repo.by_category(&filters)).await;
    let totals = section::run(
        "sales net",
        state.query_timeout,
        async { sales.period_totals(filters.date_from, filters.date_to).await.map(|t| vec![t]) },
    )
    .await;

    let mut body = String::new();
    body.push_str(&render::section_or_banner(&rows, "expenses", |rows| {
        let expenses: i64 = rows.iter().map(|r| r.total_cents).sum();
        let mut cards = vec![
            ("Categories", rows.len().to_string()),
            ("Total expenses", format_currency(Money::from_cents(expenses), &symbol)),
        ];
        // Sales net is an extra angle; its absence keeps the expense cards.
        if let Some(t) = totals.rows.first() {
            let net = Money::from_cents(t.net_cents);
            cards.push(("Sales net", format_currency(net, &symbol)));
            cards.push((
                "Net result",
                format_currency(net - Money::from_cents(expenses), &symbol),
            ));
        }
        let mut html = render::summary_cards(&cards);
        html.push_str(&render::table(
            &["Category", "Expenses", "Total"],
            &rows
                .iter()
                .map(|r| {
                    vec![
                        r.category.clone(),
                        r.expense_count.to_string(),
                        format_currency(Money::from_cents(r.total_cents), &symbol),
                    ]
                })
                .collect::<Vec<_>>(),
        ));
        html
    }));

    let html = render::page("Finance Report", &company, &body);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}
