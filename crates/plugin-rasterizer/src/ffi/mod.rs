//! FFI layer over the native rasterizer shared library.

pub mod bindings;
pub mod wrapper;
