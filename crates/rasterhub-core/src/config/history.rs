//! Snapshot/session store configuration.

use serde::{Deserialize, Serialize};

/// Snapshot and session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Store provider: `"postgres"` or `"memory"`.
    ///
    /// The memory provider keeps all snapshots in process memory and is
    /// intended for single-node development only.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Maximum snapshots retained per drawing before oldest-first eviction.
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: i64,
    /// Database connection settings (required for the postgres provider).
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl HistoryConfig {
    /// Reject retention caps that would evict the snapshot a commit just
    /// produced, leaving the session pointer unreachable.
    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.max_snapshots < 1 {
            return Err(crate::error::AppError::configuration(format!(
                "history.max_snapshots must be at least 1, got {}",
                self.max_snapshots
            )));
        }
        Ok(())
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_snapshots: default_max_snapshots(),
            database: DatabaseConfig::default(),
        }
    }
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

fn default_provider() -> String {
    "postgres".to_string()
}

fn default_max_snapshots() -> i64 {
    20
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
