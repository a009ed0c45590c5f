//! # rasterhub-service
//!
//! The versioned-canvas core: pixel codec, session resolution, undo/redo
//! history management, and the edit dispatcher that orchestrates one edit
//! request end-to-end.

pub mod codec;
pub mod dispatch;
pub mod history;
pub mod session;

pub use dispatch::command::EditCommand;
pub use dispatch::service::{EditDispatcher, EditOutcome};
pub use history::manager::HistoryManager;
pub use session::resolver::SessionResolver;
