//! Store traits for snapshots and drawing sessions.

use async_trait::async_trait;
use uuid::Uuid;

use rasterhub_core::result::AppResult;
use rasterhub_entity::session::DrawingSession;
use rasterhub_entity::snapshot::CanvasSnapshot;

/// Durable, ordered store of immutable canvas snapshots keyed by
/// `(drawing_id, version)`.
///
/// The multi-step operations `initialize_drawing` and `commit_edit` are
/// the only compound store interactions and every implementation must
/// execute them atomically, serialized per drawing, so that a failure
/// partway never leaves a version pointer unreachable.
#[async_trait]
pub trait SnapshotStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the snapshot at an exact version, if present.
    async fn find(&self, drawing_id: Uuid, version: i64) -> AppResult<Option<CanvasSnapshot>>;

    /// Whether a snapshot exists at an exact version.
    async fn exists(&self, drawing_id: Uuid, version: i64) -> AppResult<bool>;

    /// Lowest surviving version for the drawing, if any snapshots exist.
    ///
    /// Eviction never renumbers, so this may be greater than 0 for
    /// long-lived drawings.
    async fn min_version(&self, drawing_id: Uuid) -> AppResult<Option<i64>>;

    /// Highest version for the drawing, if any snapshots exist.
    async fn max_version(&self, drawing_id: Uuid) -> AppResult<Option<i64>>;

    /// Number of snapshots retained for the drawing.
    async fn count(&self, drawing_id: Uuid) -> AppResult<i64>;

    /// Delete every snapshot under the drawing. Returns the number removed.
    async fn delete_drawing(&self, drawing_id: Uuid) -> AppResult<u64>;

    /// Atomically delete any stale snapshots under the drawing and insert
    /// the given image as version 0.
    ///
    /// The delete-then-create shape makes drawing initialization
    /// idempotent against partial prior failures.
    async fn initialize_drawing(&self, drawing_id: Uuid, image_ppm: Vec<u8>) -> AppResult<()>;

    /// Atomically commit one successful edit on top of `current_pointer`:
    /// advance the session pointer for `token` from `current_pointer` to
    /// the new version, truncate any future versions beyond the pointer,
    /// insert the new image at `current_pointer + 1`, and evict oldest
    /// snapshots beyond `retention_cap`. Returns the new version number.
    ///
    /// The pointer advance happens inside the same serialization scope as
    /// the snapshot writes, so two commits racing on the same pointer can
    /// never both mutate history: the loser fails with `Conflict` before
    /// touching any snapshot.
    ///
    /// Fails with `HistoryNotFound` if the pointer's snapshot no longer
    /// exists.
    async fn commit_edit(
        &self,
        token: &str,
        drawing_id: Uuid,
        current_pointer: i64,
        image_ppm: Vec<u8>,
        retention_cap: i64,
    ) -> AppResult<i64>;

    /// Check store connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Mutable per-session pointer state keyed by the transport session token.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Look up the session for a token.
    async fn find(&self, token: &str) -> AppResult<Option<DrawingSession>>;

    /// Insert or replace the session for its token.
    async fn upsert(&self, session: &DrawingSession) -> AppResult<()>;

    /// Move the version pointer from `expected` to `new`.
    ///
    /// The update is optimistic: if the stored pointer no longer equals
    /// `expected` (a concurrent request moved it), the call fails with
    /// `Conflict` and nothing is written.
    async fn move_pointer(&self, token: &str, expected: i64, new: i64) -> AppResult<()>;

    /// Discard the session record. Returns `true` if one existed.
    async fn delete(&self, token: &str) -> AppResult<bool>;
}
