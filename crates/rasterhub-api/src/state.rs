//! Application state shared across all handlers.

use std::sync::Arc;

use rasterhub_core::config::AppConfig;
use rasterhub_database::store::{SessionStore, SnapshotStore};
use rasterhub_service::dispatch::service::EditDispatcher;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Snapshot store (postgres or in-memory)
    pub snapshots: Arc<dyn SnapshotStore>,
    /// Session store
    pub sessions: Arc<dyn SessionStore>,
    /// Edit dispatcher orchestrating one request end-to-end
    pub dispatcher: Arc<EditDispatcher>,
}
