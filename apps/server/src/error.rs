//! # HTTP Error Types
//!
//! One error vocabulary, two outward dialects.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Error Responses                                   │
//! │                                                                         │
//! │  AppError                                                               │
//! │       │                                                                 │
//! │       ├── page route (/reports/*) → PageError                           │
//! │       │     Unauthenticated  → 303 redirect /login                      │
//! │       │     Unauthorized     → 303 redirect /dashboard?error=...        │
//! │       │     UnsupportedExport→ 400 JSON (machine-readable on purpose)   │
//! │       │     anything else    → 500 generic HTML, detail stays in logs   │
//! │       │                                                                 │
//! │       └── API route (/api/*)  → ApiError                                │
//! │             Unauthenticated  → 401 {"success": false, ...}              │
//! │             Unauthorized     → 403 {"success": false, ...}              │
//! │             NotFound         → 404 {"success": false, ...}              │
//! │             anything else    → 500 {"success": false, ...}              │
//! │                                                                         │
//! │  Database/internal detail is logged server-side and never echoed        │
//! │  to the client.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use till_db::DbError;

/// Authentication / authorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No valid session.
    #[error("not authenticated")]
    Unauthenticated,
    /// Valid session, missing permission.
    #[error("permission denied")]
    Unauthorized,
}

/// Application-level errors raised by report handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// `export=pdf` / `export=excel`: recognised but not implemented.
    #[error("Export format '{0}' is not supported; use export=csv")]
    UnsupportedExport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

// =============================================================================
// Page Dialect
// =============================================================================

/// Error wrapper for HTML report pages.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl<E: Into<AppError>> From<E> for PageError {
    fn from(err: E) -> Self {
        PageError(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.0 {
            AppError::Auth(AuthError::Unauthenticated) => {
                Redirect::to("/login").into_response()
            }
            AppError::Auth(AuthError::Unauthorized) => {
                Redirect::to("/dashboard?error=access_denied").into_response()
            }
            AppError::UnsupportedExport(format) => json_error(
                StatusCode::BAD_REQUEST,
                &format!("Export format '{format}' is not supported; use export=csv"),
            ),
            AppError::Db(err) => {
                error!(error = %err, "Report page failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    "<h1>Report unavailable</h1><p>Please try again later.</p>",
                )
                    .into_response()
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "Report page failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    "<h1>Report unavailable</h1><p>Please try again later.</p>",
                )
                    .into_response()
            }
        }
    }
}

// =============================================================================
// API Dialect
// =============================================================================

/// Error wrapper for JSON endpoints.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E: Into<AppError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            AppError::Auth(AuthError::Unauthenticated) => {
                json_error(StatusCode::UNAUTHORIZED, "Authentication required")
            }
            AppError::Auth(AuthError::Unauthorized) => {
                json_error(StatusCode::FORBIDDEN, "Permission denied")
            }
            AppError::Db(DbError::NotFound { entity, id }) => json_error(
                StatusCode::NOT_FOUND,
                &format!("{entity} not found: {id}"),
            ),
            AppError::UnsupportedExport(format) => json_error(
                StatusCode::BAD_REQUEST,
                &format!("Export format '{format}' is not supported; use export=csv"),
            ),
            AppError::Db(err) => {
                error!(error = %err, "API request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "API request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        }
    }
}
