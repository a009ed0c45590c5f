//! History Manager — owns the undo/redo invariants.
//!
//! Commits append a new version on top of the session pointer,
//! truncating any redoable future first and evicting the oldest
//! snapshots beyond the retention cap (both inside the store's
//! transactional commit). Undo and redo are pointer-only operations and
//! never mutate the store.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;
use rasterhub_database::store::SnapshotStore;
use rasterhub_entity::snapshot::CanvasSnapshot;

/// Result of a pointer move attempt.
#[derive(Debug, Clone)]
pub struct HistoryStep {
    /// The pointer after the operation (unchanged when at a bound).
    pub pointer: i64,
    /// The snapshot the pointer now references.
    pub snapshot: CanvasSnapshot,
    /// Whether the pointer actually moved. A bound hit is a no-op, not
    /// an error.
    pub moved: bool,
}

/// Undo/redo availability, computed fresh from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryBounds {
    /// Whether the pointer can move backwards.
    pub can_undo: bool,
    /// Whether the pointer can move forwards.
    pub can_redo: bool,
}

/// Manages the versioned history of drawings.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: Arc<dyn SnapshotStore>,
    retention_cap: i64,
}

impl HistoryManager {
    /// Create a new history manager with the given retention cap.
    pub fn new(snapshots: Arc<dyn SnapshotStore>, retention_cap: i64) -> Self {
        Self {
            snapshots,
            retention_cap,
        }
    }

    /// Commit one successful edit on top of `current_pointer` and return
    /// the new version number.
    ///
    /// The session pointer for `token` is advanced to the new version
    /// within the store's serialization scope, so a racing commit on the
    /// same pointer fails with `Conflict` before history is touched.
    pub async fn commit(
        &self,
        token: &str,
        drawing_id: Uuid,
        current_pointer: i64,
        image_ppm: Vec<u8>,
    ) -> AppResult<i64> {
        let new_version = self
            .snapshots
            .commit_edit(token, drawing_id, current_pointer, image_ppm, self.retention_cap)
            .await?;
        info!(
            drawing_id = %drawing_id,
            version = new_version,
            "Edit committed"
        );
        Ok(new_version)
    }

    /// Move the pointer one version back, or report a no-op at the
    /// oldest surviving version.
    pub async fn undo(&self, drawing_id: Uuid, current_pointer: i64) -> AppResult<HistoryStep> {
        let min = self.min_version(drawing_id).await?;
        if current_pointer > min {
            self.step_to(drawing_id, current_pointer - 1, true).await
        } else {
            self.step_to(drawing_id, current_pointer, false).await
        }
    }

    /// Move the pointer one version forward, or report a no-op at the
    /// newest version.
    pub async fn redo(&self, drawing_id: Uuid, current_pointer: i64) -> AppResult<HistoryStep> {
        let max = self.max_version(drawing_id).await?;
        if current_pointer < max {
            self.step_to(drawing_id, current_pointer + 1, true).await
        } else {
            self.step_to(drawing_id, current_pointer, false).await
        }
    }

    /// Compute undo/redo availability for a pointer.
    ///
    /// Always queried fresh: truncation and eviction can change the
    /// bounds underneath a stale pointer, so these are never cached on
    /// the session.
    pub async fn bounds(&self, drawing_id: Uuid, pointer: i64) -> AppResult<HistoryBounds> {
        let min = self.min_version(drawing_id).await?;
        let max = self.max_version(drawing_id).await?;
        Ok(HistoryBounds {
            can_undo: pointer > min,
            can_redo: pointer < max,
        })
    }

    async fn step_to(
        &self,
        drawing_id: Uuid,
        pointer: i64,
        moved: bool,
    ) -> AppResult<HistoryStep> {
        let snapshot = self
            .snapshots
            .find(drawing_id, pointer)
            .await?
            .ok_or_else(|| {
                AppError::history_not_found(format!(
                    "Snapshot {drawing_id} v{pointer} no longer exists"
                ))
            })?;
        Ok(HistoryStep {
            pointer,
            snapshot,
            moved,
        })
    }

    async fn min_version(&self, drawing_id: Uuid) -> AppResult<i64> {
        self.snapshots
            .min_version(drawing_id)
            .await?
            .ok_or_else(|| {
                AppError::history_not_found(format!("Drawing {drawing_id} has no snapshots"))
            })
    }

    async fn max_version(&self, drawing_id: Uuid) -> AppResult<i64> {
        self.snapshots
            .max_version(drawing_id)
            .await?
            .ok_or_else(|| {
                AppError::history_not_found(format!("Drawing {drawing_id} has no snapshots"))
            })
    }
}
