//! # rasterhub-database
//!
//! Snapshot Store and Session Store abstractions with two providers:
//! PostgreSQL (production) and in-memory (single-node development and
//! tests). The provider is selected from configuration at startup.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use provider::StoreProvider;
pub use store::{SessionStore, SnapshotStore};
