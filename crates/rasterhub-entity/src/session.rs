//! Drawing session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-session cursor into a drawing's snapshot sequence.
///
/// The session token is issued by the transport layer; this record only
/// maps it to a drawing and a version pointer. The pointer must always
/// reference an existing snapshot — when that invariant is found broken
/// the session is discarded and recreated rather than served stale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DrawingSession {
    /// Opaque session token from the transport layer.
    pub token: String,
    /// The drawing this session is editing.
    pub drawing_id: Uuid,
    /// Version of the snapshot the session currently views.
    pub version_pointer: i64,
    /// When the session record was created.
    pub created_at: DateTime<Utc>,
    /// When the version pointer last moved.
    pub updated_at: DateTime<Utc>,
}

impl DrawingSession {
    /// Build a fresh session record pointing at version 0 of a new drawing.
    pub fn new(token: impl Into<String>, drawing_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            token: token.into(),
            drawing_id,
            version_pointer: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
