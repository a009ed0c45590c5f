//! The validated command forms the dispatcher accepts.

use rasterhub_entity::color::Color;
use rasterhub_entity::op::OperationDescriptor;

/// One decoded edit request.
///
/// Construction happens at the API boundary; by the time a command
/// reaches the dispatcher the tool name has been recognized and every
/// parameter parsed, so dispatch never fails on malformed input.
#[derive(Debug, Clone)]
pub enum EditCommand {
    /// Load the canvas for the session, creating a fresh one on first
    /// contact. Dimensions apply only when a new canvas is created.
    InitialCanvas {
        width: Option<u32>,
        height: Option<u32>,
        fill_color: Option<Color>,
    },
    /// Discard the session's drawing and all its history, then start over.
    NewCanvas {
        width: Option<u32>,
        height: Option<u32>,
        fill_color: Option<Color>,
    },
    /// Move the version pointer one step back.
    Undo,
    /// Move the version pointer one step forward.
    Redo,
    /// Apply a drawing operation and commit the result as a new version.
    Draw(OperationDescriptor),
}

impl EditCommand {
    /// Name used in log lines and operation messages.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::InitialCanvas { .. } => "get_initial_canvas",
            Self::NewCanvas { .. } => "new_canvas",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Draw(op) => op.tool_name(),
        }
    }
}
