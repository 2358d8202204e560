//! # Settings Cache
//!
//! Process-wide key/value configuration (currency symbol, company name)
//! read from the `settings` table.
//!
//! The table is loaded ONCE and cached; report pages read the cached map on
//! every render. `invalidate()` forces a reload on the next read, which is
//! how an admin settings change becomes visible without a restart.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use till_db::{Database, DbResult};

/// Fallback currency symbol when the setting is absent.
const DEFAULT_CURRENCY_SYMBOL: &str = "$";
/// Fallback company name when the setting is absent.
const DEFAULT_COMPANY_NAME: &str = "Till Reports";

/// Cached view of the `settings` table.
#[derive(Debug, Clone)]
pub struct SettingsCache {
    inner: Arc<RwLock<Option<HashMap<String, String>>>>,
}

impl SettingsCache {
    /// Creates an empty (not yet loaded) cache.
    pub fn new() -> Self {
        SettingsCache {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the cached map, loading it from the store on first use.
    async fn map(&self, db: &Database) -> DbResult<HashMap<String, String>> {
        if let Some(map) = self.inner.read().await.as_ref() {
            return Ok(map.clone());
        }

        let mut guard = self.inner.write().await;
        // Another task may have loaded while we waited for the write lock
        if let Some(map) = guard.as_ref() {
            return Ok(map.clone());
        }

        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings")
                .fetch_all(db.pool())
                .await?;
        let map: HashMap<String, String> = rows.into_iter().collect();
        debug!(entries = map.len(), "Settings cache loaded");

        *guard = Some(map.clone());
        Ok(map)
    }

    /// One setting by key, with a fallback.
    pub async fn get_or(&self, db: &Database, key: &str, default: &str) -> DbResult<String> {
        let map = self.map(db).await?;
        Ok(map.get(key).cloned().unwrap_or_else(|| default.to_string()))
    }

    /// Currency symbol used by every money cell in HTML and CSV.
    pub async fn currency_symbol(&self, db: &Database) -> DbResult<String> {
        self.get_or(db, "currency_symbol", DEFAULT_CURRENCY_SYMBOL).await
    }

    /// Company name shown in page titles and CSV title lines.
    pub async fn company_name(&self, db: &Database) -> DbResult<String> {
        self.get_or(db, "company_name", DEFAULT_COMPANY_NAME).await
    }

    /// Drops the cached map; the next read reloads from the store.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
        debug!("Settings cache invalidated");
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
