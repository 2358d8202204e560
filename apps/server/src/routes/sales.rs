//! Sales report pages: daily totals with payment mix and top products,
//! plus the period-over-period comparison.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{Duration, NaiveDate, Utc};

use crate::auth::{self, permissions};
use crate::error::PageError;
use crate::export;
use crate::render;
use crate::routes::{today, wants_csv};
use crate::state::AppState;
use till_core::filters::{ReportDefaults, ReportFilters, ReportParams};
use till_core::format::{format_currency, format_percent};
use till_core::metrics::SalesComparison;
use till_core::money::Money;
use till_core::types::{SalesDayRow, ViewMode};
use till_db::section;

// =============================================================================
// Sales Report
// =============================================================================

pub async fn sales_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Response, PageError> {
    auth::require(&state.db, &headers, permissions::SALES).await?;

    let filters = ReportFilters::resolve(&params, &ReportDefaults::SALES, today());
    let symbol = state.settings.currency_symbol(&state.db).await?;
    let company = state.settings.company_name(&state.db).await?;
    let repo = state.db.sales();

    if wants_csv(&filters)? {
        let rows = repo.by_day(&filters).await?;
        return Ok(export::sales_csv(&rows, &symbol, Utc::now())?);
    }

    // Three independent sections; one failure degrades one card.
    let by_day = section::run("daily sales", state.query_timeout, repo.by_day(&filters)).await;
    let by_method =
        section::run("payment mix", state.query_timeout, repo.by_method(&filters)).await;
    let top_products = section::run(
        "top products",
        state.query_timeout,
        repo.top_products(&filters),
    )
    .await;

    let mut body = String::new();

    body.push_str(&render::section_or_banner(&by_day, "summary", |rows| {
        let total_count: i64 = rows.iter().map(|r| r.sales_count).sum();
        let net: i64 = rows.iter().map(|r| r.net_cents).sum();
        let discount: i64 = rows.iter().map(|r| r.discount_cents).sum();
        render::summary_cards(&[
            ("Days", rows.len().to_string()),
            ("Sales", total_count.to_string()),
            ("Net total", format_currency(Money::from_cents(net), &symbol)),
            ("Discounts", format_currency(Money::from_cents(discount), &symbol)),
        ])
    }));

    if filters.view_mode == ViewMode::Chart && !by_day.unavailable {
        body.push_str(&render::chart_embed("sales-by-day", &by_day.rows));
    }

    body.push_str(&render::section_or_banner(&by_day, "daily sales", |rows| {
        render::table(
            &["Day", "Sales", "Gross", "Tax", "Discount", "Net"],
            &rows.iter().map(|r| day_cells(r, &symbol)).collect::<Vec<_>>(),
        )
    }));

    body.push_str(&render::section_or_banner(&by_method, "payment mix", |rows| {
        render::table(
            &["Method", "Amount", "Sales"],
            &rows
                .iter()
                .map(|r| {
                    vec![
                        r.method.clone(),
                        format_currency(Money::from_cents(r.amount_cents), &symbol),
                        r.sales_count.to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }));

    body.push_str(&render::section_or_banner(&top_products, "top products", |rows| {
        render::table(
            &["Product", "Quantity", "Revenue"],
            &rows
                .iter()
                .map(|r| {
                    vec![
                        r.product_name.clone(),
                        r.quantity.to_string(),
                        format_currency(Money::from_cents(r.revenue_cents), &symbol),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }));

    let html = render::page("Sales Report", &company, &body);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}

fn day_cells(row: &SalesDayRow, symbol: &str) -> Vec<String> {
    vec![
        row.day.clone(),
        row.sales_count.to_string(),
        format_currency(Money::from_cents(row.gross_cents), symbol),
        format_currency(Money::from_cents(row.tax_cents), symbol),
        format_currency(Money::from_cents(row.discount_cents), symbol),
        format_currency(Money::from_cents(row.net_cents), symbol),
    ]
}

// =============================================================================
// Sales Comparison
// =============================================================================

/// Both comparison periods, resolved from request parameters.
///
/// Defaults: period 2 is the trailing 7 days, period 1 the 7 days before
/// that. An inverted range is swapped, like the single-range resolver.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ComparisonPeriods {
    pub p1_from: NaiveDate,
    pub p1_to: NaiveDate,
    pub p2_from: NaiveDate,
    pub p2_to: NaiveDate,
}

impl ComparisonPeriods {
    pub(crate) fn resolve(params: &ReportParams, today: NaiveDate) -> Self {
        let parse = |key: &str| -> Option<NaiveDate> {
            params
                .get(key)
                .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        };

        let mut p2_to = parse("p2_to").unwrap_or(today);
        let mut p2_from = parse("p2_from").unwrap_or(p2_to - Duration::days(6));
        if p2_from > p2_to {
            std::mem::swap(&mut p2_from, &mut p2_to);
        }

        let mut p1_to = parse("p1_to").unwrap_or(p2_from - Duration::days(1));
        let mut p1_from = parse("p1_from").unwrap_or(p1_to - Duration::days(6));
        if p1_from > p1_to {
            std::mem::swap(&mut p1_from, &mut p1_to);
        }

        ComparisonPeriods {
            p1_from,
            p1_to,
            p2_from,
            p2_to,
        }
    }
}

pub async fn sales_comparison(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Response, PageError> {
    auth::require(&state.db, &headers, permissions::SALES).await?;

    let periods = ComparisonPeriods::resolve(&params, today());
    let company = state.settings.company_name(&state.db).await?;
    let repo = state.db.sales();

    let period1 = repo.period_totals(periods.p1_from, periods.p1_to).await?;
    let period2 = repo.period_totals(periods.p2_from, periods.p2_to).await?;
    let comparison = SalesComparison::compute(&period1, &period2);

    let mut body = String::new();
    body.push_str(&format!(
        "<p class=\"periods\">Period 1: {} to {} — Period 2: {} to {}</p>\n",
        periods.p1_from, periods.p1_to, periods.p2_from, periods.p2_to,
    ));
    body.push_str(&render::table(
        &["Metric", "Period 1", "Period 2", "Change", "Trend"],
        &comparison
            .metrics
            .iter()
            .map(|m| {
                vec![
                    m.metric.to_string(),
                    format!("{:.2}", m.period1),
                    format!("{:.2}", m.period2),
                    format_percent(m.percent_change),
                    m.trend.as_str().to_string(),
                ]
            })
            .collect::<Vec<_>>(),
    ));
    body.push_str(&render::chart_embed("sales-comparison", &comparison.metrics));

    let html = render::page("Sales Comparison", &company, &body);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> ReportParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_periods_are_adjacent_weeks() {
        let p = ComparisonPeriods::resolve(&params(&[]), date(2024, 3, 15));
        assert_eq!(p.p2_to, date(2024, 3, 15));
        assert_eq!(p.p2_from, date(2024, 3, 9));
        assert_eq!(p.p1_to, date(2024, 3, 8));
        assert_eq!(p.p1_from, date(2024, 3, 2));
    }

    #[test]
    fn test_explicit_periods_and_swap() {
        let p = ComparisonPeriods::resolve(
            &params(&[
                ("p1_from", "2024-01-31"),
                ("p1_to", "2024-01-01"), // inverted on purpose
                ("p2_from", "2024-02-01"),
                ("p2_to", "2024-02-29"),
            ]),
            date(2024, 3, 15),
        );
        assert_eq!(p.p1_from, date(2024, 1, 1));
        assert_eq!(p.p1_to, date(2024, 1, 31));
        assert_eq!(p.p2_from, date(2024, 2, 1));
        assert_eq!(p.p2_to, date(2024, 2, 29));
    }
}
