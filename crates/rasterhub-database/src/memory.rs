//! In-memory store providers.
//!
//! Suitable for single-node development and tests only. A single Tokio
//! mutex over the snapshot table serializes the compound commit and
//! initialization sequences, giving the same per-drawing atomicity the
//! PostgreSQL provider gets from transactions and advisory locks. The
//! snapshot store holds a handle to the session map so that the pointer
//! advance in `commit_edit` happens under the same serialization.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;
use rasterhub_entity::session::DrawingSession;
use rasterhub_entity::snapshot::CanvasSnapshot;

use crate::store::{SessionStore, SnapshotStore};

/// In-memory snapshot store keyed by drawing id, versions ordered.
#[derive(Debug, Clone)]
pub struct MemorySnapshotStore {
    /// drawing_id -> version -> snapshot.
    drawings: Arc<Mutex<HashMap<Uuid, BTreeMap<i64, CanvasSnapshot>>>>,
    /// Shared with the paired [`MemorySessionStore`] so commits can move
    /// the version pointer atomically with the snapshot writes.
    sessions: Arc<DashMap<String, DrawingSession>>,
}

impl MemorySnapshotStore {
    /// Create an empty snapshot store sharing the given session store's
    /// session map.
    pub fn new(sessions: &MemorySessionStore) -> Self {
        Self {
            drawings: Arc::new(Mutex::new(HashMap::new())),
            sessions: sessions.sessions.clone(),
        }
    }

    /// Compare-and-swap the session pointer for a token. Fails with
    /// `Conflict` when the session is gone, points at another drawing,
    /// or was moved concurrently.
    fn advance_pointer(
        &self,
        token: &str,
        drawing_id: Uuid,
        expected: i64,
        new: i64,
    ) -> AppResult<()> {
        let mut entry = self.sessions.get_mut(token).ok_or_else(|| {
            AppError::conflict("Version pointer was moved by a concurrent request")
        })?;
        if entry.drawing_id != drawing_id || entry.version_pointer != expected {
            return Err(AppError::conflict(
                "Version pointer was moved by a concurrent request",
            ));
        }
        entry.version_pointer = new;
        entry.updated_at = chrono::Utc::now();
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn find(&self, drawing_id: Uuid, version: i64) -> AppResult<Option<CanvasSnapshot>> {
        let drawings = self.drawings.lock().await;
        Ok(drawings
            .get(&drawing_id)
            .and_then(|versions| versions.get(&version))
            .cloned())
    }

    async fn exists(&self, drawing_id: Uuid, version: i64) -> AppResult<bool> {
        let drawings = self.drawings.lock().await;
        Ok(drawings
            .get(&drawing_id)
            .is_some_and(|versions| versions.contains_key(&version)))
    }

    async fn min_version(&self, drawing_id: Uuid) -> AppResult<Option<i64>> {
        let drawings = self.drawings.lock().await;
        Ok(drawings
            .get(&drawing_id)
            .and_then(|versions| versions.keys().next().copied()))
    }

    async fn max_version(&self, drawing_id: Uuid) -> AppResult<Option<i64>> {
        let drawings = self.drawings.lock().await;
        Ok(drawings
            .get(&drawing_id)
            .and_then(|versions| versions.keys().next_back().copied()))
    }

    async fn count(&self, drawing_id: Uuid) -> AppResult<i64> {
        let drawings = self.drawings.lock().await;
        Ok(drawings
            .get(&drawing_id)
            .map_or(0, |versions| versions.len() as i64))
    }

    async fn delete_drawing(&self, drawing_id: Uuid) -> AppResult<u64> {
        let mut drawings = self.drawings.lock().await;
        Ok(drawings
            .remove(&drawing_id)
            .map_or(0, |versions| versions.len() as u64))
    }

    async fn initialize_drawing(&self, drawing_id: Uuid, image_ppm: Vec<u8>) -> AppResult<()> {
        let mut drawings = self.drawings.lock().await;
        let mut versions = BTreeMap::new();
        versions.insert(0, CanvasSnapshot::new(drawing_id, 0, image_ppm));
        drawings.insert(drawing_id, versions);
        Ok(())
    }

    async fn commit_edit(
        &self,
        token: &str,
        drawing_id: Uuid,
        current_pointer: i64,
        image_ppm: Vec<u8>,
        retention_cap: i64,
    ) -> AppResult<i64> {
        let mut drawings = self.drawings.lock().await;
        let versions = drawings.get_mut(&drawing_id).ok_or_else(|| {
            AppError::history_not_found(format!("Drawing {drawing_id} has no snapshots"))
        })?;

        if !versions.contains_key(&current_pointer) {
            return Err(AppError::history_not_found(format!(
                "Snapshot {drawing_id} v{current_pointer} no longer exists"
            )));
        }

        // Pointer advance comes before any snapshot mutation: a request
        // that loses the race is rejected with nothing written.
        let new_version = current_pointer + 1;
        self.advance_pointer(token, drawing_id, current_pointer, new_version)?;

        // Branch truncation.
        versions.retain(|&v, _| v <= current_pointer);

        versions.insert(
            new_version,
            CanvasSnapshot::new(drawing_id, new_version, image_ppm),
        );

        // Oldest-first eviction, never renumbering.
        while versions.len() as i64 > retention_cap {
            let oldest = *versions
                .keys()
                .next()
                .unwrap_or(&new_version);
            versions.remove(&oldest);
        }

        Ok(new_version)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// In-memory session store backed by a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, DrawingSession>>,
}

impl MemorySessionStore {
    /// Create an empty in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find(&self, token: &str) -> AppResult<Option<DrawingSession>> {
        Ok(self.sessions.get(token).map(|entry| entry.clone()))
    }

    async fn upsert(&self, session: &DrawingSession) -> AppResult<()> {
        self.sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn move_pointer(&self, token: &str, expected: i64, new: i64) -> AppResult<()> {
        let mut entry = self.sessions.get_mut(token).ok_or_else(|| {
            AppError::conflict("Version pointer was moved by a concurrent request")
        })?;
        if entry.version_pointer != expected {
            return Err(AppError::conflict(
                "Version pointer was moved by a concurrent request",
            ));
        }
        entry.version_pointer = new;
        entry.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn delete(&self, token: &str) -> AppResult<bool> {
        Ok(self.sessions.remove(token).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterhub_core::error::ErrorKind;

    fn image(tag: u8) -> Vec<u8> {
        vec![tag; 8]
    }

    fn stores() -> (MemorySnapshotStore, MemorySessionStore) {
        let sessions = MemorySessionStore::new();
        let snapshots = MemorySnapshotStore::new(&sessions);
        (snapshots, sessions)
    }

    /// Drawing initialized at version 0 with a session "tok" bound to it.
    async fn seeded() -> (MemorySnapshotStore, MemorySessionStore, Uuid) {
        let (snapshots, sessions) = stores();
        let id = Uuid::new_v4();
        snapshots.initialize_drawing(id, image(0)).await.unwrap();
        sessions
            .upsert(&DrawingSession::new("tok", id))
            .await
            .unwrap();
        (snapshots, sessions, id)
    }

    #[tokio::test]
    async fn test_initialize_creates_version_zero() {
        let (store, _) = stores();
        let id = Uuid::new_v4();
        store.initialize_drawing(id, image(0)).await.unwrap();

        assert!(store.exists(id, 0).await.unwrap());
        assert_eq!(store.min_version(id).await.unwrap(), Some(0));
        assert_eq!(store.max_version(id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_initialize_discards_stale_snapshots() {
        let (store, _, id) = seeded().await;
        store.commit_edit("tok", id, 0, image(1), 20).await.unwrap();

        store.initialize_drawing(id, image(9)).await.unwrap();
        assert_eq!(store.count(id).await.unwrap(), 1);
        assert_eq!(store.max_version(id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_commit_appends_sequential_versions() {
        let (store, sessions, id) = seeded().await;

        assert_eq!(store.commit_edit("tok", id, 0, image(1), 20).await.unwrap(), 1);
        assert_eq!(store.commit_edit("tok", id, 1, image(2), 20).await.unwrap(), 2);
        assert_eq!(store.count(id).await.unwrap(), 3);

        let session = sessions.find("tok").await.unwrap().unwrap();
        assert_eq!(session.version_pointer, 2);
    }

    #[tokio::test]
    async fn test_commit_truncates_future_history() {
        let (store, sessions, id) = seeded().await;
        store.commit_edit("tok", id, 0, image(1), 20).await.unwrap();
        store.commit_edit("tok", id, 1, image(2), 20).await.unwrap();
        store.commit_edit("tok", id, 2, image(3), 20).await.unwrap();
        // Undo twice, then edit on top of version 1: versions 2 and 3 go.
        sessions.move_pointer("tok", 3, 1).await.unwrap();

        let new_version = store.commit_edit("tok", id, 1, image(4), 20).await.unwrap();
        assert_eq!(new_version, 2);
        assert_eq!(store.max_version(id).await.unwrap(), Some(2));
        let snapshot = store.find(id, 2).await.unwrap().unwrap();
        assert_eq!(snapshot.image_ppm, image(4));
        assert!(!store.exists(id, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_evicts_oldest_beyond_cap() {
        let (store, _, id) = seeded().await;

        let mut pointer = 0;
        for i in 0..25 {
            pointer = store
                .commit_edit("tok", id, pointer, image(i as u8 + 1), 20)
                .await
                .unwrap();
        }

        assert_eq!(store.count(id).await.unwrap(), 20);
        assert_eq!(store.min_version(id).await.unwrap(), Some(6));
        assert_eq!(store.max_version(id).await.unwrap(), Some(25));
        assert_eq!(pointer, 25);
    }

    #[tokio::test]
    async fn test_versions_stay_contiguous() {
        let (store, _, id) = seeded().await;
        let mut pointer = 0;
        for i in 0..30 {
            pointer = store
                .commit_edit("tok", id, pointer, image(i as u8), 10)
                .await
                .unwrap();
        }

        let min = store.min_version(id).await.unwrap().unwrap();
        let max = store.max_version(id).await.unwrap().unwrap();
        for v in min..=max {
            assert!(store.exists(id, v).await.unwrap(), "gap at version {v}");
        }
        assert_eq!(max - min + 1, store.count(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_on_missing_pointer_is_history_not_found() {
        let (store, _, id) = seeded().await;

        let err = store
            .commit_edit("tok", id, 7, image(1), 20)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::HistoryNotFound);
    }

    #[tokio::test]
    async fn test_racing_commit_cannot_overwrite_winner() {
        let (store, sessions, id) = seeded().await;

        // Two tabs resolved the same session at pointer 0. The first
        // commit wins; the second must fail before touching history.
        store
            .commit_edit("tok", id, 0, image(0xAA), 20)
            .await
            .unwrap();
        let err = store
            .commit_edit("tok", id, 0, image(0xBB), 20)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let winner = store.find(id, 1).await.unwrap().unwrap();
        assert_eq!(winner.image_ppm, image(0xAA));
        assert_eq!(store.count(id).await.unwrap(), 2);

        let session = sessions.find("tok").await.unwrap().unwrap();
        assert_eq!(session.version_pointer, 1);
    }

    #[tokio::test]
    async fn test_commit_for_rebound_session_is_conflict() {
        let (store, sessions, id) = seeded().await;
        // The session was rebound to another drawing since this request
        // resolved it.
        sessions
            .upsert(&DrawingSession::new("tok", Uuid::new_v4()))
            .await
            .unwrap();

        let err = store
            .commit_edit("tok", id, 0, image(1), 20)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(store.count(id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_session_move_pointer_detects_races() {
        let store = MemorySessionStore::new();
        let session = DrawingSession::new("tok", Uuid::new_v4());
        store.upsert(&session).await.unwrap();

        store.move_pointer("tok", 0, 1).await.unwrap();
        let err = store.move_pointer("tok", 0, 1).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let stored = store.find("tok").await.unwrap().unwrap();
        assert_eq!(stored.version_pointer, 1);
    }
}
