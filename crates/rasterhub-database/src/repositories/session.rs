//! PostgreSQL drawing session repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use rasterhub_core::error::{AppError, ErrorKind};
use rasterhub_core::result::AppResult;
use rasterhub_entity::session::DrawingSession;

use crate::store::SessionStore;

/// Repository for per-session version pointer state.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn find(&self, token: &str) -> AppResult<Option<DrawingSession>> {
        sqlx::query_as::<_, DrawingSession>("SELECT * FROM drawing_sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn upsert(&self, session: &DrawingSession) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO drawing_sessions (token, drawing_id, version_pointer, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) \
             ON CONFLICT (token) DO UPDATE \
             SET drawing_id = $2, version_pointer = $3, updated_at = NOW()",
        )
        .bind(&session.token)
        .bind::<Uuid>(session.drawing_id)
        .bind(session.version_pointer)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert session", e))?;
        Ok(())
    }

    async fn move_pointer(&self, token: &str, expected: i64, new: i64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE drawing_sessions SET version_pointer = $3, updated_at = NOW() \
             WHERE token = $1 AND version_pointer = $2",
        )
        .bind(token)
        .bind(expected)
        .bind(new)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to move version pointer", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(
                "Version pointer was moved by a concurrent request",
            ));
        }
        Ok(())
    }

    async fn delete(&self, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM drawing_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete session", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
