//! # Session Authentication & Report Permissions
//!
//! Every report route is gated the same way:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Request Gate                                   │
//! │                                                                         │
//! │  Cookie: session_token=...                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  authenticate()  ── no/expired session ──► AuthError::Unauthenticated   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CurrentUser { permissions }                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  require()  ── permission missing ──────► AuthError::Unauthorized       │
//! │       │        (admin role bypasses)                                    │
//! │       ▼                                                                 │
//! │  handler proceeds                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate runs BEFORE any filter resolution or query work; an
//! unauthenticated request never touches the report tables.

use std::collections::HashSet;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use sqlx::FromRow;
use tracing::{debug, error, warn};

use crate::error::AuthError;
use till_db::Database;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_token";

/// Permission required to view each report family.
pub mod permissions {
    pub const SALES: &str = "reports.sales";
    pub const CASH: &str = "reports.cash";
    pub const CASHIERS: &str = "reports.cashiers";
    pub const LOYALTY: &str = "reports.loyalty";
    pub const FINANCE: &str = "reports.finance";
}

/// The authenticated requester.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role_name: String,
    permissions: HashSet<String>,
}

impl CurrentUser {
    /// Admins hold every permission implicitly.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.role_name == "admin" || self.permissions.contains(permission)
    }
}

#[derive(Debug, FromRow)]
struct SessionUserRow {
    id: String,
    username: String,
    display_name: String,
    role_id: i64,
    role_name: String,
}

/// Extracts the session cookie value from request headers.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Resolves the session cookie to an active user with permissions loaded.
pub async fn authenticate(db: &Database, headers: &HeaderMap) -> Result<CurrentUser, AuthError> {
    let token = session_token(headers).ok_or(AuthError::Unauthenticated)?;

    let row = sqlx::query_as::<_, SessionUserRow>(
        "SELECT u.id, u.username, u.display_name, u.role_id, u.role_name \
         FROM sessions s JOIN users u ON u.id = s.user_id \
         WHERE s.token = ?1 \
           AND datetime(s.expires_at) > datetime('now') \
           AND u.is_active = 1",
    )
    .bind(&token)
    .fetch_optional(db.pool())
    .await
    .map_err(|e| {
        // Fail closed, but a broken lookup is a server fault, not the caller's.
        error!(error = %e, "Session lookup failed");
        AuthError::Unauthenticated
    })?
    .ok_or(AuthError::Unauthenticated)?;

    let permissions: Vec<String> = sqlx::query_scalar(
        "SELECT permission FROM role_permissions WHERE role_id = ?1",
    )
    .bind(row.role_id)
    .fetch_all(db.pool())
    .await
    .unwrap_or_else(|e| {
        warn!(error = %e, role = %row.role_name, "Permission load failed, treating as none granted");
        Vec::new()
    });

    debug!(user = %row.username, role = %row.role_name, "Authenticated");

    Ok(CurrentUser {
        id: row.id,
        username: row.username,
        display_name: row.display_name,
        role_name: row.role_name,
        permissions: permissions.into_iter().collect(),
    })
}

/// Authenticates and demands one permission in a single call.
pub async fn require(
    db: &Database,
    headers: &HeaderMap,
    permission: &str,
) -> Result<CurrentUser, AuthError> {
    let user = authenticate(db, headers).await?;
    if user.has_permission(permission) {
        Ok(user)
    } else {
        Err(AuthError::Unauthorized)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
