//! HTTP request handlers.

pub mod drawing;
pub mod health;
