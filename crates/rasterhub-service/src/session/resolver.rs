//! Session Resolver — maps a session token to a drawing and version
//! pointer, creating a fresh drawing when none exists or the pointer is
//! found broken.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use rasterhub_core::config::canvas::CanvasConfig;
use rasterhub_core::error::{AppError, ErrorKind};
use rasterhub_core::result::AppResult;
use rasterhub_database::store::{SessionStore, SnapshotStore};
use rasterhub_entity::color::Color;
use rasterhub_entity::session::DrawingSession;
use rasterhub_entity::snapshot::CanvasSnapshot;

use crate::codec::{self, PixelBuffer};

/// The drawing state a session currently views.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// The drawing this session edits.
    pub drawing_id: Uuid,
    /// Version of the snapshot the session points at.
    pub pointer: i64,
    /// The snapshot itself, loaded unchanged.
    pub snapshot: CanvasSnapshot,
}

/// Resolves session tokens to drawing state, creating fresh drawings on
/// first contact or when the stored pointer is broken.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    snapshots: Arc<dyn SnapshotStore>,
    sessions: Arc<dyn SessionStore>,
    canvas: CanvasConfig,
}

impl SessionResolver {
    /// Create a new session resolver.
    pub fn new(
        snapshots: Arc<dyn SnapshotStore>,
        sessions: Arc<dyn SessionStore>,
        canvas: CanvasConfig,
    ) -> Self {
        Self {
            snapshots,
            sessions,
            canvas,
        }
    }

    /// Resolve a session token to its current drawing state.
    ///
    /// A session whose pointer no longer references an existing snapshot
    /// is discarded and recreated. The retry is bounded to one reset: a
    /// second failure is fatal for the request rather than recursing on
    /// persistently broken state.
    pub async fn resolve(
        &self,
        token: &str,
        width: Option<u32>,
        height: Option<u32>,
        fill_color: Option<Color>,
    ) -> AppResult<ResolvedSession> {
        for attempt in 0..2 {
            match self.try_resolve(token, width, height, fill_color).await {
                Ok(resolved) => return Ok(resolved),
                Err(e) if e.kind == ErrorKind::HistoryNotFound && attempt == 0 => {
                    warn!(
                        token = %token,
                        error = %e,
                        "Session pointer references a missing snapshot; resetting session"
                    );
                    self.sessions.delete(token).await?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::session_init(
            "Session could not be recovered after reset",
        ))
    }

    /// Discard the session's drawing entirely: all snapshots and the
    /// session record itself. Used by the new-canvas operation.
    pub async fn discard(&self, token: &str) -> AppResult<()> {
        if let Some(session) = self.sessions.find(token).await? {
            let removed = self.snapshots.delete_drawing(session.drawing_id).await?;
            info!(
                token = %token,
                drawing_id = %session.drawing_id,
                snapshots_removed = removed,
                "Drawing discarded"
            );
        }
        self.sessions.delete(token).await?;
        Ok(())
    }

    async fn try_resolve(
        &self,
        token: &str,
        width: Option<u32>,
        height: Option<u32>,
        fill_color: Option<Color>,
    ) -> AppResult<ResolvedSession> {
        match self.sessions.find(token).await? {
            Some(session) => {
                let snapshot = self
                    .snapshots
                    .find(session.drawing_id, session.version_pointer)
                    .await?
                    .ok_or_else(|| {
                        AppError::history_not_found(format!(
                            "Snapshot {} v{} referenced by session no longer exists",
                            session.drawing_id, session.version_pointer
                        ))
                    })?;
                Ok(ResolvedSession {
                    drawing_id: session.drawing_id,
                    pointer: session.version_pointer,
                    snapshot,
                })
            }
            None => self.create_fresh(token, width, height, fill_color).await,
        }
    }

    /// Create a fresh drawing with a version-0 solid-fill snapshot and
    /// bind the session to it.
    ///
    /// The snapshot is persisted before the session record, so a failure
    /// never leaves a session pointing at nothing.
    async fn create_fresh(
        &self,
        token: &str,
        width: Option<u32>,
        height: Option<u32>,
        fill_color: Option<Color>,
    ) -> AppResult<ResolvedSession> {
        let width = width.unwrap_or(self.canvas.default_width);
        let height = height.unwrap_or(self.canvas.default_height);
        let fill = match fill_color {
            Some(c) => c,
            None => self.canvas.default_fill_color.parse()?,
        };

        let drawing_id = Uuid::new_v4();
        let buffer = PixelBuffer::solid_fill(width, height, fill);
        let image_ppm = codec::encode_ppm(&buffer).map_err(|e| {
            AppError::new(
                ErrorKind::SessionInit,
                format!("Failed to encode initial canvas: {e}"),
            )
        })?;

        self.snapshots
            .initialize_drawing(drawing_id, image_ppm.clone())
            .await
            .map_err(|e| {
                AppError::new(
                    ErrorKind::SessionInit,
                    format!("Failed to persist initial snapshot: {e}"),
                )
            })?;

        self.sessions
            .upsert(&DrawingSession::new(token, drawing_id))
            .await
            .map_err(|e| {
                AppError::new(
                    ErrorKind::SessionInit,
                    format!("Failed to record session: {e}"),
                )
            })?;

        info!(
            token = %token,
            drawing_id = %drawing_id,
            width,
            height,
            fill = %fill,
            "Fresh drawing created at version 0"
        );

        Ok(ResolvedSession {
            drawing_id,
            pointer: 0,
            snapshot: CanvasSnapshot::new(drawing_id, 0, image_ppm),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterhub_database::memory::{MemorySessionStore, MemorySnapshotStore};
    use rasterhub_database::store::SnapshotStore as _;

    fn resolver() -> (SessionResolver, Arc<MemorySnapshotStore>, Arc<MemorySessionStore>) {
        let sessions = Arc::new(MemorySessionStore::new());
        let snapshots = Arc::new(MemorySnapshotStore::new(&sessions));
        let resolver = SessionResolver::new(
            snapshots.clone(),
            sessions.clone(),
            CanvasConfig::default(),
        );
        (resolver, snapshots, sessions)
    }

    #[tokio::test]
    async fn test_first_contact_creates_version_zero() {
        let (resolver, snapshots, _) = resolver();
        let resolved = resolver.resolve("tok", None, None, None).await.unwrap();

        assert_eq!(resolved.pointer, 0);
        assert!(snapshots.exists(resolved.drawing_id, 0).await.unwrap());

        let decoded = codec::decode_ppm(&resolved.snapshot.image_ppm).unwrap();
        assert_eq!(decoded.width, 800);
        assert_eq!(decoded.height, 600);
        assert_eq!(&decoded.data[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[tokio::test]
    async fn test_resolve_is_stable_across_calls() {
        let (resolver, _, _) = resolver();
        let first = resolver.resolve("tok", None, None, None).await.unwrap();
        let second = resolver.resolve("tok", None, None, None).await.unwrap();
        assert_eq!(first.drawing_id, second.drawing_id);
        assert_eq!(second.pointer, 0);
    }

    #[tokio::test]
    async fn test_caller_supplied_dimensions_and_fill() {
        let (resolver, _, _) = resolver();
        let fill: Color = "00FF00".parse().unwrap();
        let resolved = resolver
            .resolve("tok", Some(10), Some(8), Some(fill))
            .await
            .unwrap();
        let decoded = codec::decode_ppm(&resolved.snapshot.image_ppm).unwrap();
        assert_eq!((decoded.width, decoded.height), (10, 8));
        assert_eq!(&decoded.data[0..4], &[0x00, 0xFF, 0x00, 0xFF]);
    }

    #[tokio::test]
    async fn test_broken_pointer_resets_session_once() {
        let (resolver, _, sessions) = resolver();
        // Session points at a drawing with no snapshots at all.
        let stale = DrawingSession::new("tok", Uuid::new_v4());
        sessions.upsert(&stale).await.unwrap();

        let resolved = resolver.resolve("tok", None, None, None).await.unwrap();
        assert_ne!(resolved.drawing_id, stale.drawing_id);
        assert_eq!(resolved.pointer, 0);
    }

    #[tokio::test]
    async fn test_discard_removes_drawing_and_session() {
        let (resolver, snapshots, sessions) = resolver();
        let resolved = resolver.resolve("tok", None, None, None).await.unwrap();

        resolver.discard("tok").await.unwrap();
        assert_eq!(snapshots.count(resolved.drawing_id).await.unwrap(), 0);
        assert!(sessions.find("tok").await.unwrap().is_none());
    }
}
