//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                           │
//! │  └── CoreError    - General domain errors                               │
//! │                                                                         │
//! │  till-db errors (separate crate)                                        │
//! │  └── DbError      - Database operation failures                         │
//! │                                                                         │
//! │  HTTP errors (in server app)                                            │
//! │  └── AppError     - What the browser / AJAX caller sees                 │
//! │                                                                         │
//! │  Flow: CoreError → DbError → AppError → page/JSON                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value, etc.)
//! 3. Errors are enum variants, never String
//! 4. Most filter problems are NOT errors: the resolver falls back to
//!    defaults so a manipulated query string degrades, not crashes.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core reporting logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A reconciliation row violates the till-closing derivation.
    ///
    /// ## When This Occurs
    /// - `expected_balance != opening_amount + total_sales - total_drops`
    /// - `shortage_type` disagrees with the sign of `difference`
    ///
    /// The schema enforces this at write time; reports still recompute
    /// and surface a mismatch instead of silently trusting stored state.
    #[error("Till closing {closing_id} is inconsistent: {detail}")]
    InconsistentClosing { closing_id: String, detail: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
