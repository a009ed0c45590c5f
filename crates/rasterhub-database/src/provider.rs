//! Store provider selection.
//!
//! Dispatches to the PostgreSQL or in-memory store pair based on
//! configuration, the same way the cache layer of a larger deployment
//! would pick its backend at construction time.

use std::sync::Arc;

use tracing::info;

use rasterhub_core::config::history::HistoryConfig;
use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{MemorySessionStore, MemorySnapshotStore};
use crate::repositories::session::SessionRepository;
use crate::repositories::snapshot::SnapshotRepository;
use crate::store::{SessionStore, SnapshotStore};

/// The configured snapshot/session store pair.
#[derive(Debug, Clone)]
pub struct StoreProvider {
    /// Snapshot store implementation.
    pub snapshots: Arc<dyn SnapshotStore>,
    /// Session store implementation.
    pub sessions: Arc<dyn SessionStore>,
}

impl StoreProvider {
    /// Create the store pair from configuration.
    ///
    /// For the postgres provider this connects the pool and runs pending
    /// migrations before returning.
    pub async fn new(config: &HistoryConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL store provider");
                let db = DatabasePool::connect(&config.database).await?;
                crate::migration::run_migrations(db.pool()).await?;
                let pool = db.into_pool();
                Ok(Self {
                    snapshots: Arc::new(SnapshotRepository::new(pool.clone())),
                    sessions: Arc::new(SessionRepository::new(pool)),
                })
            }
            "memory" => {
                info!("Initializing in-memory store provider");
                let sessions = MemorySessionStore::new();
                let snapshots = MemorySnapshotStore::new(&sessions);
                Ok(Self {
                    snapshots: Arc::new(snapshots),
                    sessions: Arc::new(sessions),
                })
            }
            other => Err(AppError::configuration(format!(
                "Unknown history provider: '{other}'. Supported: postgres, memory"
            ))),
        }
    }

    /// Create a store provider from existing implementations (for testing).
    pub fn from_stores(
        snapshots: Arc<dyn SnapshotStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            snapshots,
            sessions,
        }
    }
}
