//! # Repository Module
//!
//! One repository per report family.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Report Repositories                               │
//! │                                                                         │
//! │  HTTP Handler                                                           │
//! │       │                                                                 │
//! │       │  db.cash_drops().filtered_page(&filters)                        │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CashDropRepository                                                     │
//! │  ├── filtered_page(&self, filters)   ← one page, for the table          │
//! │  ├── filtered_all(&self, filters)    ← full set, for summary + CSV      │
//! │  └── count(&self, filters)           ← pagination total                 │
//! │       │                                                                 │
//! │       │  QueryBuilder → parameterized SQL                               │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Every repository is read-only: reports never write to the store        │
//! │  except through the till workflows they observe.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`cash_drops::CashDropRepository`] - Cash-drop history and summary
//! - [`sales::SalesReportRepository`] - Daily sales, payment mix, top products
//! - [`till_closings::TillClosingRepository`] - End-of-shift reconciliations
//! - [`cashiers::CashierRepository`] - Per-cashier accountability aggregates
//! - [`loyalty::LoyaltyRepository`] - Loyalty points per customer
//! - [`finance::FinanceRepository`] - Expenses by category
//! - [`audit::AuditRepository`] - Cash-drop drill-down and audit trail

pub mod audit;
pub mod cash_drops;
pub mod cashiers;
pub mod finance;
pub mod loyalty;
pub mod sales;
pub mod till_closings;
