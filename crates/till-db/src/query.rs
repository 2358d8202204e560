//! # Structured Query Builder
//!
//! Translates a validated filter set into a parameterized aggregate query
//! without ever string-concatenating untrusted values into SQL text.
//!
//! ## Why Structured Predicates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Predicate Building                                   │
//! │                                                                         │
//! │  ReportFilters                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Predicate::DateRange { column, from, to }   ─┐                         │
//! │  Predicate::EqualsId  { column, id }          ├─► QueryBuilder          │
//! │  Predicate::EnumIn    { column, values }     ─┘        │                │
//! │                                                        ▼                │
//! │                                       "WHERE datetime(cd.drop_date)     │
//! │                                        >= datetime(?1) AND ... = ?3"    │
//! │                                        + ordered argument list          │
//! │                                                                         │
//! │  RULES:                                                                 │
//! │  • values ALWAYS travel as bound parameters                             │
//! │  • only column/table identifiers from the fixed internal set vary       │
//! │    structurally (Predicate columns are &'static str by construction)    │
//! │  • identical argument values are bound ONCE and the placeholder is      │
//! │    reused — two subqueries over the same date range cannot drift        │
//! │    positionally (the classic fputcsv-era bug this replaces)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// SQL Arguments
// =============================================================================

/// A value bound into a query. Owned so a built query is self-contained.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Int(i64),
}

impl From<String> for SqlArg {
    fn from(v: String) -> Self {
        SqlArg::Text(v)
    }
}

impl From<&str> for SqlArg {
    fn from(v: &str) -> Self {
        SqlArg::Text(v.to_string())
    }
}

impl From<i64> for SqlArg {
    fn from(v: i64) -> Self {
        SqlArg::Int(v)
    }
}

impl From<u32> for SqlArg {
    fn from(v: u32) -> Self {
        SqlArg::Int(v as i64)
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// One optional filter, tagged by kind.
///
/// Columns are `&'static str` on purpose: they can only come from the fixed
/// internal set written in this crate, never from request input.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Inclusive datetime range. Rendered through `datetime()` so stored
    /// timestamp formats compare correctly.
    DateRange {
        column: &'static str,
        from: String,
        to: String,
    },
    /// Exact match on an entity id.
    EqualsId { column: &'static str, id: String },
    /// Enum membership; a single value renders as `=`, several as `IN`.
    EnumIn {
        column: &'static str,
        values: Vec<String>,
    },
}

// =============================================================================
// Query Builder
// =============================================================================

/// Accumulates predicates and bound arguments for one report query.
///
/// ## Bind Reuse
/// `bind` deduplicates identical argument values and returns the numbered
/// placeholder (`?N`) for the existing binding. A date range used by both a
/// `sales` subquery and a `security_logs` subquery therefore shares one
/// binding per bound value.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    conditions: Vec<String>,
    args: Vec<SqlArg>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    /// Binds a value and returns its placeholder, reusing an existing
    /// binding when the value is already present.
    pub fn bind(&mut self, arg: impl Into<SqlArg>) -> String {
        let arg = arg.into();
        let index = match self.args.iter().position(|a| *a == arg) {
            Some(i) => i,
            None => {
                self.args.push(arg);
                self.args.len() - 1
            }
        };
        format!("?{}", index + 1)
    }

    /// Appends one predicate: one condition, parameters bound.
    pub fn push(&mut self, predicate: &Predicate) {
        let condition = match predicate {
            Predicate::DateRange { column, from, to } => {
                let p_from = self.bind(from.clone());
                let p_to = self.bind(to.clone());
                format!(
                    "datetime({col}) >= datetime({p_from}) AND datetime({col}) <= datetime({p_to})",
                    col = column
                )
            }
            Predicate::EqualsId { column, id } => {
                let p = self.bind(id.clone());
                format!("{} = {}", column, p)
            }
            Predicate::EnumIn { column, values } => match values.as_slice() {
                [] => "1 = 1".to_string(),
                [single] => {
                    let p = self.bind(single.clone());
                    format!("{} = {}", column, p)
                }
                many => {
                    let placeholders: Vec<String> =
                        many.iter().map(|v| self.bind(v.clone())).collect();
                    format!("{} IN ({})", column, placeholders.join(", "))
                }
            },
        };
        self.conditions.push(condition);
    }

    /// Appends a raw condition built by the caller from `bind` placeholders
    /// and fixed identifiers (used for correlated subquery predicates).
    pub fn push_condition(&mut self, condition: String) {
        self.conditions.push(condition);
    }

    /// The `WHERE ...` clause, or an empty string when unfiltered.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Ordered argument list for execution.
    pub fn args(&self) -> &[SqlArg] {
        &self.args
    }
}

/// Binds the builder's arguments onto a runtime `query_as` query, in order.
pub fn bind_rows<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    args: &[SqlArg],
) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    args.iter().fold(query, |q, arg| match arg {
        SqlArg::Text(s) => q.bind(s.clone()),
        SqlArg::Int(i) => q.bind(*i),
    })
}

/// Binds the builder's arguments onto a runtime `query_scalar` query.
pub fn bind_scalar<'q, O>(
    query: sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    args: &[SqlArg],
) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    args.iter().fold(query, |q, arg| match arg {
        SqlArg::Text(s) => q.bind(s.clone()),
        SqlArg::Int(i) => q.bind(*i),
    })
}

// =============================================================================
// Report Shapes
// =============================================================================

/// Fixed structural description of one report family: which table, which
/// joins, which grouping. The ONLY place identifiers vary.
#[derive(Debug, Clone, Copy)]
pub struct ReportShape {
    pub name: &'static str,
    pub from: &'static str,
    pub group_by: &'static str,
}

impl ReportShape {
    pub const CASH_DROPS: ReportShape = ReportShape {
        name: "cash_drops",
        from: "cash_drops cd JOIN users u ON u.id = cd.dropped_by",
        group_by: "",
    };

    pub const TILL_CLOSINGS: ReportShape = ReportShape {
        name: "till_closings",
        from: "till_closings tc JOIN users u ON u.id = tc.cashier_id",
        group_by: "",
    };

    pub const SALES_BY_DAY: ReportShape = ReportShape {
        name: "sales_by_day",
        from: "sales s",
        group_by: "GROUP BY date(s.created_at)",
    };

    pub const SALES_BY_METHOD: ReportShape = ReportShape {
        name: "sales_by_method",
        from: "sales s",
        group_by: "GROUP BY s.payment_method",
    };

    pub const TOP_PRODUCTS: ReportShape = ReportShape {
        name: "top_products",
        from: "sale_items si \
               JOIN sales s ON s.id = si.sale_id \
               JOIN products p ON p.id = si.product_id",
        group_by: "GROUP BY si.product_id, p.name",
    };

    pub const CASHIERS: ReportShape = ReportShape {
        name: "cashiers",
        from: "sales s JOIN users u ON u.id = s.cashier_id",
        group_by: "GROUP BY s.cashier_id, u.username",
    };

    pub const LOYALTY: ReportShape = ReportShape {
        name: "loyalty",
        from: "loyalty_points_transactions lt JOIN customers c ON c.id = lt.customer_id",
        group_by: "GROUP BY lt.customer_id, c.name",
    };

    pub const EXPENSES: ReportShape = ReportShape {
        name: "expenses",
        from: "expenses e",
        group_by: "GROUP BY e.category",
    };
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_predicate() {
        let mut qb = QueryBuilder::new();
        qb.push(&Predicate::EqualsId {
            column: "cd.dropped_by",
            id: "u-7".into(),
        });
        assert_eq!(qb.where_clause(), "WHERE cd.dropped_by = ?1");
        assert_eq!(qb.args(), &[SqlArg::Text("u-7".into())]);
    }

    #[test]
    fn test_date_range_rendering() {
        let mut qb = QueryBuilder::new();
        qb.push(&Predicate::DateRange {
            column: "cd.drop_date",
            from: "2024-01-01 00:00:00".into(),
            to: "2024-01-31 23:59:59".into(),
        });
        assert_eq!(
            qb.where_clause(),
            "WHERE datetime(cd.drop_date) >= datetime(?1) \
             AND datetime(cd.drop_date) <= datetime(?2)"
        );
        assert_eq!(qb.args().len(), 2);
    }

    /// The single most error-prone step in the old report pages: the same
    /// date range feeding two different subqueries must share one binding
    /// per value, so the predicates cannot drift positionally.
    #[test]
    fn test_same_date_range_reuses_bindings() {
        let mut qb = QueryBuilder::new();
        let from = "2024-01-01 00:00:00".to_string();
        let to = "2024-01-31 23:59:59".to_string();

        qb.push(&Predicate::DateRange {
            column: "s.created_at",
            from: from.clone(),
            to: to.clone(),
        });
        qb.push(&Predicate::DateRange {
            column: "sl.created_at",
            from,
            to,
        });

        // Four placeholder references, but only TWO bound arguments
        assert_eq!(qb.args().len(), 2);
        let clause = qb.where_clause();
        assert_eq!(clause.matches("?1").count(), 2);
        assert_eq!(clause.matches("?2").count(), 2);
        assert!(!clause.contains("?3"));
    }

    #[test]
    fn test_enum_in_single_and_many() {
        let mut qb = QueryBuilder::new();
        qb.push(&Predicate::EnumIn {
            column: "cd.status",
            values: vec!["pending".into()],
        });
        assert_eq!(qb.where_clause(), "WHERE cd.status = ?1");

        let mut qb = QueryBuilder::new();
        qb.push(&Predicate::EnumIn {
            column: "cd.status",
            values: vec!["pending".into(), "confirmed".into()],
        });
        assert_eq!(qb.where_clause(), "WHERE cd.status IN (?1, ?2)");
        assert_eq!(qb.args().len(), 2);
    }

    #[test]
    fn test_mixed_predicates_and_reuse() {
        let mut qb = QueryBuilder::new();
        qb.push(&Predicate::EqualsId {
            column: "cd.dropped_by",
            id: "u-7".into(),
        });
        // Same id appears again (e.g. confirmer filter matching dropper)
        qb.push(&Predicate::EqualsId {
            column: "cd.confirmed_by",
            id: "u-7".into(),
        });
        assert_eq!(
            qb.where_clause(),
            "WHERE cd.dropped_by = ?1 AND cd.confirmed_by = ?1"
        );
        assert_eq!(qb.args().len(), 1);
    }

    #[test]
    fn test_empty_builder_has_no_where() {
        let qb = QueryBuilder::new();
        assert_eq!(qb.where_clause(), "");
        assert!(qb.args().is_empty());
    }

    #[test]
    fn test_empty_enum_in_is_inert() {
        let mut qb = QueryBuilder::new();
        qb.push(&Predicate::EnumIn {
            column: "cd.status",
            values: vec![],
        });
        assert_eq!(qb.where_clause(), "WHERE 1 = 1");
        assert!(qb.args().is_empty());
    }
}
