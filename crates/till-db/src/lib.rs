//! # till-db: Database Layer for Till Reports
//!
//! This crate provides database access for the reporting server.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Till Reports Data Flow                             │
//! │                                                                         │
//! │  HTTP Handler (GET /reports/cash-drops)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     till-db (THIS CRATE)                        │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │ (cash_drops,  │    │  (embedded)  │    │    │
//! │  │   │               │    │  sales, ...)  │    │              │    │    │
//! │  │   │ SqlitePool    │◄───│ QueryBuilder  │    │ 001_init.sql │    │    │
//! │  │   │ Management    │    │ + Predicates  │    │ ...          │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, read-heavy)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`query`] - Predicate/QueryBuilder for dynamic report filters
//! - [`section`] - Per-section failure isolation for multi-query reports
//! - [`repository`] - One repository per report family
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/till.db");
//! let db = Database::new(config).await?;
//!
//! let drops = db.cash_drops().filtered(&filters).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repository;
pub mod section;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use query::{Predicate, QueryBuilder, ReportShape, SqlArg};
pub use section::{ReportSection, DEFAULT_SECTION_TIMEOUT};

// Repository re-exports for convenience
pub use repository::audit::AuditRepository;
pub use repository::cash_drops::CashDropRepository;
pub use repository::cashiers::CashierRepository;
pub use repository::finance::FinanceRepository;
pub use repository::loyalty::LoyaltyRepository;
pub use repository::sales::SalesReportRepository;
pub use repository::till_closings::TillClosingRepository;
