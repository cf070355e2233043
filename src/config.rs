//! Session options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ContactError, Result};

/// Options for a [`ContactSession`](crate::session::ContactSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long the live query is kept after the last snapshot subscriber
    /// goes away (default: 5000).
    pub stop_timeout_ms: u64,
    /// SQLite database file. `None` opens an in-memory database.
    pub database_path: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stop_timeout_ms: 5000,
            database_path: None,
        }
    }
}

impl SessionConfig {
    /// Parse options from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ContactError::Config(e.to_string()))
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    /// Open and initialize the configured SQLite backend.
    #[cfg(feature = "sqlite")]
    pub fn open_backend(&self) -> Result<crate::storage::sqlite::SqliteBackend> {
        use crate::storage::sqlite::SqliteBackend;

        let mut backend = match &self.database_path {
            Some(path) => SqliteBackend::open(path)?,
            None => SqliteBackend::open_in_memory()?,
        };
        backend.initialize()?;
        tracing::info!(path = ?self.database_path, "contacts database opened");
        Ok(backend)
    }
}
