//! # till-core: Pure Reporting Logic for Till Reports
//!
//! This crate is the **heart** of the reporting engine. Every derived
//! figure a report page displays is computed here as a pure function
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Till Reports Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  HTTP Server (axum)                             │   │
//! │  │   gate ──► resolve ──► query ──► reduce ──► render/export      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  filters  │  │  metrics  │  │   money   │  │  format   │  │   │
//! │  │   │ resolver  │  │ reducers  │  │   cents   │  │ currency  │  │   │
//! │  │   │ defaults  │  │  trends   │  │   math    │  │   dates   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  │         SQLite aggregation queries, migrations, sections        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Report domain types (enums, rows, summaries)
//! - [`filters`] - Request parameter resolution with defaults and allow-lists
//! - [`metrics`] - Summary reducers (rates, trends, consistency, variance)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`format`] - Shared currency/date formatting for HTML and CSV
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Resilient Input**: invalid filter values fall back to defaults, never panic
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::metrics::{percent_change, trend};
//! use till_core::types::TrendDirection;
//!
//! // Percent change is total: 0 when the base period is 0
//! assert_eq!(percent_change(0.0, 500.0), 0.0);
//! assert_eq!(percent_change(100.0, 150.0), 50.0);
//!
//! // Trend classification uses a 10% hysteresis band
//! assert_eq!(trend(100.0, 105.0), TrendDirection::Neutral);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filters;
pub mod format;
pub mod metrics;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use till_core::Money` instead of
// `use till_core::money::Money`

pub use error::{CoreError, CoreResult};
pub use filters::{ReportDefaults, ReportFilters};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest page size a report will serve.
///
/// ## Business Reason
/// Below 10 rows the pagination chrome costs more screen space than it
/// saves; clamping also keeps manipulated query strings harmless.
pub const MIN_PER_PAGE: u32 = 10;

/// Largest page size a report will serve.
///
/// ## Business Reason
/// Aggregate report rows join several dimensions; 100 rows keeps a single
/// page render within one query round-trip of acceptable latency.
pub const MAX_PER_PAGE: u32 = 100;

/// Default page size when the request does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 25;
