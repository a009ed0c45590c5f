//! The edit dispatcher.
//!
//! Orchestrates one command end-to-end: resolve the session to a
//! concrete snapshot, run the command against it, advance the session
//! pointer, and produce the response payload. Every branch returns the
//! canvas that is now current plus fresh undo/redo availability.

use std::sync::Arc;

use tracing::{info, warn};

use plugin_rasterizer::engine::RenderEngine;
use rasterhub_core::error::{AppError, ErrorKind};
use rasterhub_core::result::AppResult;
use rasterhub_database::store::SessionStore;
use rasterhub_entity::op::OperationDescriptor;
use uuid::Uuid;

use crate::codec::{self, PixelBuffer};
use crate::dispatch::command::EditCommand;
use crate::history::manager::HistoryManager;
use crate::session::resolver::{ResolvedSession, SessionResolver};

/// What a handled command yields.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// Browser-ready `data:image/png;base64,...` encoding of the canvas
    /// the session now points at.
    pub image_data_url: String,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Human-readable note about what happened.
    pub message: String,
}

/// Runs edit commands against the versioned canvas history.
#[derive(Debug, Clone)]
pub struct EditDispatcher {
    resolver: SessionResolver,
    history: HistoryManager,
    sessions: Arc<dyn SessionStore>,
    engine: Arc<dyn RenderEngine>,
}

impl EditDispatcher {
    pub fn new(
        resolver: SessionResolver,
        history: HistoryManager,
        sessions: Arc<dyn SessionStore>,
        engine: Arc<dyn RenderEngine>,
    ) -> Self {
        Self {
            resolver,
            history,
            sessions,
            engine,
        }
    }

    /// Handle one command for the given session token.
    ///
    /// History that disappears mid-command (evicted or truncated
    /// underneath the session by a concurrent request) resets the
    /// session and reruns the command once against the fresh drawing
    /// instead of surfacing a missing-snapshot error to the caller.
    pub async fn dispatch(&self, token: &str, command: EditCommand) -> AppResult<EditOutcome> {
        info!(token = %token, tool = command.tool_name(), "Dispatching edit");
        for attempt in 0..2 {
            match self.execute(token, command.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.kind == ErrorKind::HistoryNotFound && attempt == 0 => {
                    warn!(
                        token = %token,
                        error = %e,
                        "History disappeared mid-command; resetting session"
                    );
                    self.resolver.discard(token).await?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::session_init(
            "Session could not be recovered after reset",
        ))
    }

    async fn execute(&self, token: &str, command: EditCommand) -> AppResult<EditOutcome> {
        match command {
            EditCommand::InitialCanvas {
                width,
                height,
                fill_color,
            } => {
                let resolved = self.resolver.resolve(token, width, height, fill_color).await?;
                self.outcome(&resolved, "Initial canvas loaded.").await
            }
            EditCommand::NewCanvas {
                width,
                height,
                fill_color,
            } => {
                self.resolver.discard(token).await?;
                let resolved = self.resolver.resolve(token, width, height, fill_color).await?;
                self.outcome(&resolved, "New canvas created and history reset.")
                    .await
            }
            EditCommand::Undo => {
                let resolved = self.resolver.resolve(token, None, None, None).await?;
                let step = self
                    .history
                    .undo(resolved.drawing_id, resolved.pointer)
                    .await?;
                if step.moved {
                    self.sessions
                        .move_pointer(token, resolved.pointer, step.pointer)
                        .await?;
                }
                let message = if step.moved {
                    "Undo applied."
                } else {
                    "No further actions to undo."
                };
                self.outcome_at(resolved.drawing_id, step.pointer, &step.snapshot.image_ppm, message)
                    .await
            }
            EditCommand::Redo => {
                let resolved = self.resolver.resolve(token, None, None, None).await?;
                let step = self
                    .history
                    .redo(resolved.drawing_id, resolved.pointer)
                    .await?;
                if step.moved {
                    self.sessions
                        .move_pointer(token, resolved.pointer, step.pointer)
                        .await?;
                }
                let message = if step.moved {
                    "Redo applied."
                } else {
                    "No further actions to redo."
                };
                self.outcome_at(resolved.drawing_id, step.pointer, &step.snapshot.image_ppm, message)
                    .await
            }
            EditCommand::Draw(op) => self.apply_operation(token, op).await,
        }
    }

    /// Apply one drawing operation: decode, render, commit.
    ///
    /// A render failure aborts before anything is written, so the
    /// history and session pointer stay exactly as they were. The commit
    /// itself advances the session pointer atomically with the snapshot
    /// write, so a racing request on the same pointer fails cleanly.
    async fn apply_operation(
        &self,
        token: &str,
        op: OperationDescriptor,
    ) -> AppResult<EditOutcome> {
        let resolved = self.resolver.resolve(token, None, None, None).await?;
        let mut buffer = codec::decode_ppm(&resolved.snapshot.image_ppm)?;

        self.render(&mut buffer, &op).map_err(|err| {
            warn!(
                token = %token,
                tool = op.tool_name(),
                status = ?err.engine_status,
                "Render failed, discarding edit"
            );
            err
        })?;

        let image_ppm = codec::encode_ppm(&buffer)?;
        let new_version = self
            .history
            .commit(token, resolved.drawing_id, resolved.pointer, image_ppm.clone())
            .await?;

        self.outcome_at(
            resolved.drawing_id,
            new_version,
            &image_ppm,
            &format!("Operation '{}' applied.", op.tool_name()),
        )
        .await
    }

    fn render(&self, buffer: &mut PixelBuffer, op: &OperationDescriptor) -> AppResult<()> {
        let (width, height) = (buffer.width, buffer.height);
        self.engine.render(&mut buffer.data, width, height, op)
    }

    async fn outcome(&self, resolved: &ResolvedSession, message: &str) -> AppResult<EditOutcome> {
        self.outcome_at(
            resolved.drawing_id,
            resolved.pointer,
            &resolved.snapshot.image_ppm,
            message,
        )
        .await
    }

    async fn outcome_at(
        &self,
        drawing_id: Uuid,
        pointer: i64,
        image_ppm: &[u8],
        message: &str,
    ) -> AppResult<EditOutcome> {
        let bounds = self.history.bounds(drawing_id, pointer).await?;
        Ok(EditOutcome {
            image_data_url: codec::png_data_url(image_ppm)?,
            can_undo: bounds.can_undo,
            can_redo: bounds.can_redo,
            message: message.to_owned(),
        })
    }
}
