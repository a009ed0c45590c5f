//! # plugin-rasterizer
//!
//! The rasterization engine capability. The production implementation
//! dynamically loads a native shared library and dispatches one exported
//! C function per drawing tool; the mock implementation simulates the
//! engine in-memory for development and tests.
//!
//! The engine is a stateless pure function over `(pixel buffer, operation
//! parameters)`: it mutates the RGBA buffer in place and reports a status
//! code, `0` meaning success.

pub mod engine;
pub mod ffi;
pub mod mock;

pub use engine::{RenderEngine, build_engine};
pub use mock::MockRasterizer;
