//! # rasterhub-api
//!
//! HTTP API layer built on Axum.
//!
//! Provides the drawing endpoint, health checks, session-token
//! extraction, DTOs, and the mapping from domain errors to HTTP
//! responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
