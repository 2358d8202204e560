//! # Report Parameter Resolver
//!
//! Normalizes untrusted request input into a validated filter set before
//! any query executes.
//!
//! ## Resolution Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Filter Resolution                                  │
//! │                                                                         │
//! │  ?date_from=2024-01-01&status=pending&sort_by=<script>&page=-3         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportFilters::resolve(params, defaults, today)                       │
//! │       │                                                                 │
//! │       ├── dates: parse ISO, else trailing window (7/30/90 days)        │
//! │       ├── enums: allow-list, else default ("all")                      │
//! │       ├── sort_by: allow-list, else report default  ◄── "<script>"     │
//! │       └── page/per_page: clamped (page ≥ 1, per_page ∈ [10,100])       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Immutable ReportFilters, ready to drive query construction            │
//! │                                                                         │
//! │  RULE: invalid values fall back to defaults, they never error.         │
//! │  A manipulated query string degrades the page, it cannot break it.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! `resolve` takes "today" as an argument so the trailing-window default is
//! a pure function of its inputs and fully testable.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::types::{
    DropStatus, DropType, ExportFormat, ShortageType, SortOrder, ViewMode,
};
use crate::{DEFAULT_PER_PAGE, MAX_PER_PAGE, MIN_PER_PAGE};

/// Untrusted request parameters: string keys to string values.
pub type ReportParams = HashMap<String, String>;

// =============================================================================
// Report Defaults
// =============================================================================

/// Per-report resolution defaults.
///
/// Each report page declares its own trailing window and sort key; the
/// resolver itself is shared.
#[derive(Debug, Clone, Copy)]
pub struct ReportDefaults {
    /// Trailing window in days when no date range is given (7/30/90).
    pub window_days: i64,
    /// Default sort key; must be a member of `sort_keys`.
    pub sort_by: &'static str,
    /// Default sort direction.
    pub sort_order: SortOrder,
    /// Allow-list of sortable keys. These are the ONLY identifiers that
    /// ever reach a query structurally.
    pub sort_keys: &'static [&'static str],
}

impl ReportDefaults {
    /// Defaults for the cash-drop report: last 30 days, newest first.
    pub const CASH_DROPS: ReportDefaults = ReportDefaults {
        window_days: 30,
        sort_by: "drop_date",
        sort_order: SortOrder::Desc,
        sort_keys: &["drop_date", "amount_cents", "status", "dropper_name"],
    };

    /// Defaults for the till-closing report: last 30 days, newest first.
    pub const TILL_CLOSINGS: ReportDefaults = ReportDefaults {
        window_days: 30,
        sort_by: "closed_at",
        sort_order: SortOrder::Desc,
        sort_keys: &["closed_at", "difference_cents", "cashier_name"],
    };

    /// Defaults for the sales report: last 7 days.
    pub const SALES: ReportDefaults = ReportDefaults {
        window_days: 7,
        sort_by: "day",
        sort_order: SortOrder::Desc,
        sort_keys: &["day", "sales_count", "net_cents"],
    };

    /// Defaults for cashier accountability: last 30 days, largest first.
    pub const CASHIERS: ReportDefaults = ReportDefaults {
        window_days: 30,
        sort_by: "total_cents",
        sort_order: SortOrder::Desc,
        sort_keys: &["total_cents", "sales_count", "voided_count", "username"],
    };

    /// Defaults for the loyalty report: last 90 days.
    pub const LOYALTY: ReportDefaults = ReportDefaults {
        window_days: 90,
        sort_by: "points_earned",
        sort_order: SortOrder::Desc,
        sort_keys: &["points_earned", "points_redeemed", "customer_name"],
    };

    /// Defaults for the finance report: last 30 days, largest first.
    pub const FINANCE: ReportDefaults = ReportDefaults {
        window_days: 30,
        sort_by: "total_cents",
        sort_order: SortOrder::Desc,
        sort_keys: &["total_cents", "expense_count", "category"],
    };
}

// =============================================================================
// Report Filters
// =============================================================================

/// The validated, immutable filter set driving query construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilters {
    /// Inclusive start of the date range.
    pub date_from: NaiveDate,
    /// Inclusive end of the date range.
    pub date_to: NaiveDate,
    /// Cash-drop status filter; `None` means "all".
    pub status: Option<DropStatus>,
    /// Cash-drop type filter; `None` means "all".
    pub drop_type: Option<DropType>,
    /// Till-closing variance filter; `None` means "all".
    pub shortage_type: Option<ShortageType>,
    pub cashier_id: Option<String>,
    pub customer_id: Option<String>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    /// Sort key, guaranteed to be from the report's allow-list.
    pub sort_by: &'static str,
    pub sort_order: SortOrder,
    /// 1-based page number, >= 1.
    pub page: u32,
    /// Rows per page, within [10, 100].
    pub per_page: u32,
    /// Requested export, if any.
    pub export: Option<ExportFormat>,
    pub view_mode: ViewMode,
}

impl ReportFilters {
    /// Resolves untrusted request parameters into a filter set.
    ///
    /// Pure function of its inputs; no side effects.
    ///
    /// ## Fallback Rules
    /// - unparseable/missing dates → trailing `defaults.window_days` window
    ///   ending at `today` (inclusive)
    /// - `date_from` after `date_to` → the two are swapped
    /// - enum values off the allow-list → default ("all" / report default)
    /// - `page` < 1 → 1; `per_page` outside [10,100] → clamped
    pub fn resolve(params: &ReportParams, defaults: &ReportDefaults, today: NaiveDate) -> Self {
        let default_to = today;
        let default_from = today - Duration::days(defaults.window_days - 1);

        let mut date_from = parse_date(params.get("date_from")).unwrap_or(default_from);
        let mut date_to = parse_date(params.get("date_to")).unwrap_or(default_to);
        if date_from > date_to {
            std::mem::swap(&mut date_from, &mut date_to);
        }

        let sort_by = params
            .get("sort_by")
            .and_then(|v| defaults.sort_keys.iter().find(|k| *k == v))
            .copied()
            .unwrap_or(defaults.sort_by);

        let sort_order = params
            .get("sort_order")
            .and_then(|v| SortOrder::parse(v))
            .unwrap_or(defaults.sort_order);

        let page = params
            .get("page")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1);

        let per_page = params
            .get("per_page")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|p| p.clamp(MIN_PER_PAGE as i64, MAX_PER_PAGE as i64) as u32)
            .unwrap_or(DEFAULT_PER_PAGE);

        ReportFilters {
            date_from,
            date_to,
            status: params.get("status").and_then(|v| DropStatus::parse(v)),
            drop_type: params.get("drop_type").and_then(|v| DropType::parse(v)),
            shortage_type: params
                .get("shortage_type")
                .and_then(|v| ShortageType::parse(v)),
            cashier_id: non_empty(params.get("cashier_id")),
            customer_id: non_empty(params.get("customer_id")),
            category_id: non_empty(params.get("category_id")),
            supplier_id: non_empty(params.get("supplier_id")),
            sort_by,
            sort_order,
            page,
            per_page,
            export: params.get("export").and_then(|v| ExportFormat::parse(v)),
            view_mode: params
                .get("view_mode")
                .and_then(|v| ViewMode::parse(v))
                .unwrap_or(ViewMode::Table),
        }
    }

    /// Row offset for the current page.
    ///
    /// Computed in i64 so the largest clamped page times the largest
    /// per_page still fits.
    #[inline]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    /// Inclusive-range SQL bounds as ISO datetime strings.
    ///
    /// `date_to` is inclusive per report convention, so the upper bound is
    /// the end of that day.
    pub fn datetime_bounds(&self) -> (String, String) {
        (
            format!("{} 00:00:00", self.date_from),
            format!("{} 23:59:59", self.date_to),
        )
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_date(value: Option<&String>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
