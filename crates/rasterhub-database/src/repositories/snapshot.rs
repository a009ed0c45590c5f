//! PostgreSQL snapshot repository.
//!
//! The compound operations take a per-drawing transaction-scoped advisory
//! lock so that concurrent commits against the same drawing are fully
//! serialized, never interleaved.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use rasterhub_core::error::{AppError, ErrorKind};
use rasterhub_core::result::AppResult;
use rasterhub_entity::snapshot::CanvasSnapshot;

use crate::store::SnapshotStore;

/// Repository for canvas snapshot persistence and history queries.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    /// Create a new snapshot repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Serialize all compound operations for one drawing within the
    /// current transaction. Released automatically at commit/rollback.
    async fn lock_drawing(
        tx: &mut Transaction<'_, Postgres>,
        drawing_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(drawing_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock drawing", e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SnapshotRepository {
    async fn find(&self, drawing_id: Uuid, version: i64) -> AppResult<Option<CanvasSnapshot>> {
        sqlx::query_as::<_, CanvasSnapshot>(
            "SELECT * FROM canvas_snapshots WHERE drawing_id = $1 AND version = $2",
        )
        .bind(drawing_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find snapshot", e))
    }

    async fn exists(&self, drawing_id: Uuid, version: i64) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM canvas_snapshots WHERE drawing_id = $1 AND version = $2)",
        )
        .bind(drawing_id)
        .bind(version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check snapshot existence", e)
        })
    }

    async fn min_version(&self, drawing_id: Uuid) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MIN(version) FROM canvas_snapshots WHERE drawing_id = $1",
        )
        .bind(drawing_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find min version", e))
    }

    async fn max_version(&self, drawing_id: Uuid) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(version) FROM canvas_snapshots WHERE drawing_id = $1",
        )
        .bind(drawing_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find max version", e))
    }

    async fn count(&self, drawing_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM canvas_snapshots WHERE drawing_id = $1",
        )
        .bind(drawing_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count snapshots", e))
    }

    async fn delete_drawing(&self, drawing_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM canvas_snapshots WHERE drawing_id = $1")
            .bind(drawing_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete drawing", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn initialize_drawing(&self, drawing_id: Uuid, image_ppm: Vec<u8>) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        Self::lock_drawing(&mut tx, drawing_id).await?;

        // Delete-then-create keeps initialization idempotent against
        // partial prior failures with the same drawing id.
        sqlx::query("DELETE FROM canvas_snapshots WHERE drawing_id = $1")
            .bind(drawing_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear stale snapshots", e)
            })?;

        sqlx::query(
            "INSERT INTO canvas_snapshots (drawing_id, version, image_ppm, created_at) \
             VALUES ($1, 0, $2, NOW())",
        )
        .bind(drawing_id)
        .bind(&image_ppm)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert initial snapshot", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit initialization", e)
        })?;

        info!(drawing_id = %drawing_id, "Drawing initialized at version 0");
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
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        Self::lock_drawing(&mut tx, drawing_id).await?;

        let pointer_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM canvas_snapshots WHERE drawing_id = $1 AND version = $2)",
        )
        .bind(drawing_id)
        .bind(current_pointer)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check pointer snapshot", e)
        })?;

        if !pointer_exists {
            return Err(AppError::history_not_found(format!(
                "Snapshot {drawing_id} v{current_pointer} no longer exists"
            )));
        }

        // Advance the session pointer before mutating any snapshots. The
        // conditional update serializes racing commits on the same
        // pointer: the loser matches zero rows and the transaction rolls
        // back with history untouched.
        let new_version = current_pointer + 1;
        let moved = sqlx::query(
            "UPDATE drawing_sessions SET version_pointer = $4, updated_at = NOW() \
             WHERE token = $1 AND drawing_id = $2 AND version_pointer = $3",
        )
        .bind(token)
        .bind(drawing_id)
        .bind(current_pointer)
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to advance version pointer", e)
        })?;

        if moved.rows_affected() == 0 {
            return Err(AppError::conflict(
                "Version pointer was moved by a concurrent request",
            ));
        }

        let max_version = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(version) FROM canvas_snapshots WHERE drawing_id = $1",
        )
        .bind(drawing_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find max version", e))?
        .unwrap_or(current_pointer);

        // Branch truncation: an edit made after undoing discards the
        // previously redoable future.
        if current_pointer < max_version {
            let truncated = sqlx::query(
                "DELETE FROM canvas_snapshots WHERE drawing_id = $1 AND version > $2",
            )
            .bind(drawing_id)
            .bind(current_pointer)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to truncate future history", e)
            })?;
            debug!(
                drawing_id = %drawing_id,
                pointer = current_pointer,
                truncated = truncated.rows_affected(),
                "Future history truncated"
            );
        }

        let inserted = sqlx::query(
            "INSERT INTO canvas_snapshots (drawing_id, version, image_ppm, created_at) \
             VALUES ($1, $2, $3, NOW()) ON CONFLICT (drawing_id, version) DO NOTHING",
        )
        .bind(drawing_id)
        .bind(new_version)
        .bind(&image_ppm)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert snapshot", e)
        })?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Version {new_version} of drawing {drawing_id} was committed concurrently"
            )));
        }

        // Oldest-first eviction beyond the retention cap. Versions are
        // never renumbered, so the minimum surviving version can exceed 0.
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM canvas_snapshots WHERE drawing_id = $1",
        )
        .bind(drawing_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count snapshots", e))?;

        if count > retention_cap {
            let evicted = sqlx::query(
                "DELETE FROM canvas_snapshots WHERE drawing_id = $1 AND version IN \
                 (SELECT version FROM canvas_snapshots WHERE drawing_id = $1 \
                  ORDER BY version ASC LIMIT $2)",
            )
            .bind(drawing_id)
            .bind(count - retention_cap)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to evict old snapshots", e)
            })?;
            debug!(
                drawing_id = %drawing_id,
                evicted = evicted.rows_affected(),
                "Oldest snapshots evicted"
            );
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit edit", e)
        })?;

        Ok(new_version)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
