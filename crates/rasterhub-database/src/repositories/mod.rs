//! PostgreSQL repository implementations.

pub mod session;
pub mod snapshot;
