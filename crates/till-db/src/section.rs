//! # Report Section Isolation
//!
//! A report page is made of several independent sections (main table,
//! payment breakdown, top products, ...). Each one runs 1-2 queries.
//!
//! ## Failure Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Section Execution                                   │
//! │                                                                         │
//! │  run(name, timeout, query_future)                                       │
//! │       │                                                                 │
//! │       ├── Ok(rows) ────────────────► ReportSection { rows, ok }         │
//! │       │                                                                 │
//! │       ├── Err(DbError) ── warn!() ─► ReportSection::unavailable()       │
//! │       │                                                                 │
//! │       └── timeout ─────── warn!() ─► ReportSection::unavailable()       │
//! │                                                                         │
//! │  One slow or failing aggregate degrades ONE section to an               │
//! │  "unavailable" banner; it can never abort rendering of the rest of      │
//! │  the page, and it can never hang the request indefinitely.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::error::{DbError, DbResult};

/// Default per-section query timeout.
pub const DEFAULT_SECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// The outcome of one report section: its rows, or an explicit
/// "unavailable" flag with empty rows. Never both.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection<T> {
    pub rows: Vec<T>,
    pub unavailable: bool,
}

impl<T> ReportSection<T> {
    /// A section that loaded normally.
    pub fn ok(rows: Vec<T>) -> Self {
        ReportSection {
            rows,
            unavailable: false,
        }
    }

    /// A degraded section: empty rows plus the explicit flag.
    pub fn unavailable() -> Self {
        ReportSection {
            rows: Vec::new(),
            unavailable: true,
        }
    }

    /// First row, for single-row aggregate sections.
    pub fn first(&self) -> Option<&T> {
        self.rows.first()
    }
}

/// Runs one section query under a timeout, degrading any failure to an
/// unavailable section.
pub async fn run<T, F>(name: &str, timeout: Duration, query: F) -> ReportSection<T>
where
    F: Future<Output = DbResult<Vec<T>>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(rows)) => ReportSection::ok(rows),
        Ok(Err(err)) => {
            warn!(section = name, error = %err, "Report section query failed");
            ReportSection::unavailable()
        }
        Err(_elapsed) => {
            let err = DbError::Timeout(timeout.as_secs());
            warn!(section = name, error = %err, "Report section query timed out");
            ReportSection::unavailable()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
