//! Undo/redo history management.

pub mod manager;

pub use manager::{HistoryBounds, HistoryManager, HistoryStep};
