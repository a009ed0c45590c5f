//! Canvas snapshot entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable, versioned capture of a drawing at one point in its history.
///
/// Versions within a drawing form a contiguous range; version 0 is the
/// initial blank canvas. A snapshot is never mutated after creation —
/// undo and redo only move the session's version pointer. Snapshots are
/// destroyed only by branch truncation or retention-cap eviction, so
/// after eviction the minimum surviving version may be greater than 0.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CanvasSnapshot {
    /// The drawing this snapshot belongs to.
    pub drawing_id: Uuid,
    /// Sequential version number, unique within the drawing.
    pub version: i64,
    /// Encoded raster image (binary PPM).
    pub image_ppm: Vec<u8>,
    /// When this snapshot was persisted.
    pub created_at: DateTime<Utc>,
}

impl CanvasSnapshot {
    /// Build a snapshot record ready for insertion.
    pub fn new(drawing_id: Uuid, version: i64, image_ppm: Vec<u8>) -> Self {
        Self {
            drawing_id,
            version,
            image_ppm,
            created_at: Utc::now(),
        }
    }
}
