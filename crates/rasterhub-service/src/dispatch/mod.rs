//! Edit dispatch: one request in, one canvas state out.

pub mod command;
pub mod service;

pub use command::EditCommand;
pub use service::{EditDispatcher, EditOutcome};
