//! Shared application state handed to every handler.

use std::time::Duration;

use crate::settings::SettingsCache;
use till_db::Database;

/// Shared state: database handle, settings cache, report tunables.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: SettingsCache,
    /// Per-section report query timeout.
    pub query_timeout: Duration,
}

impl AppState {
    pub fn new(db: Database, query_timeout: Duration) -> Self {
        AppState {
            db,
            settings: SettingsCache::new(),
            query_timeout,
        }
    }
}
