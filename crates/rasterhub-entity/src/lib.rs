//! # rasterhub-entity
//!
//! Domain entity models for RasterHub: canvas snapshots, drawing session
//! pointers, edit operation descriptors, and supporting value types.

pub mod color;
pub mod op;
pub mod session;
pub mod snapshot;

pub use color::Color;
pub use op::{OperationDescriptor, PathPoint};
pub use session::DrawingSession;
pub use snapshot::CanvasSnapshot;
