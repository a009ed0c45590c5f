//! Response bodies for the drawing and health endpoints.

use serde::{Deserialize, Serialize};

use rasterhub_service::dispatch::service::EditOutcome;

/// Successful drawing endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditResponse {
    /// `data:image/png;base64,...` encoding of the current canvas.
    pub image_data_url: String,
    /// Whether the session can undo from its new pointer.
    pub can_undo: bool,
    /// Whether the session can redo from its new pointer.
    pub can_redo: bool,
    /// Informational note about what happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<EditOutcome> for EditResponse {
    fn from(outcome: EditOutcome) -> Self {
        Self {
            image_data_url: outcome.image_data_url,
            can_undo: outcome.can_undo,
            can_redo: outcome.can_redo,
            message: Some(outcome.message),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Snapshot store reachability.
    pub store: String,
}
