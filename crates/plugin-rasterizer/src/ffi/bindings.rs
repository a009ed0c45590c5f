//! FFI function declarations for the native rasterizer library.
//!
//! Loads the shared library at runtime using `libloading` and exposes
//! one exported drawing function per tool. Every function takes the RGBA
//! pixel buffer plus its dimensions, mutates the buffer in place, and
//! returns a status code (`0` = success). Stroke paths cross the boundary
//! as a `"x1,y1,x2,y2;..."` segment list; colors as `RRGGBB` hex strings.

use std::ffi::{c_char, c_int};
use std::mem;
use std::sync::Arc;

/// Status code returned by every rasterizer entry point.
#[allow(non_camel_case_types)]
pub type RH_Status = c_int;

/// Success return code.
pub const RH_SUCCESS: RH_Status = 0;

/// Loaded rasterizer API with all function pointers.
///
/// Each field is a dynamically loaded symbol from the shared library.
/// The `_lib` field keeps the library alive for the lifetime of this struct.
#[derive(Clone, Debug)]
pub struct RasterizerApi {
    /// `rh_draw_brush_stroke(buffer, width, height, path, color, size) -> RH_Status`
    pub draw_brush_stroke: libloading::Symbol<
        'static,
        unsafe extern "C" fn(
            buffer: *mut u8,
            width: c_int,
            height: c_int,
            path: *const c_char,
            color: *const c_char,
            size: c_int,
        ) -> RH_Status,
    >,

    /// `rh_draw_eraser_stroke(buffer, width, height, path, size) -> RH_Status`
    pub draw_eraser_stroke: libloading::Symbol<
        'static,
        unsafe extern "C" fn(
            buffer: *mut u8,
            width: c_int,
            height: c_int,
            path: *const c_char,
            size: c_int,
        ) -> RH_Status,
    >,

    /// `rh_flood_fill(buffer, width, height, x, y, color) -> RH_Status`
    pub flood_fill: libloading::Symbol<
        'static,
        unsafe extern "C" fn(
            buffer: *mut u8,
            width: c_int,
            height: c_int,
            x: c_int,
            y: c_int,
            color: *const c_char,
        ) -> RH_Status,
    >,

    /// `rh_draw_line(buffer, width, height, x1, y1, x2, y2, color, size) -> RH_Status`
    pub draw_line: libloading::Symbol<
        'static,
        unsafe extern "C" fn(
            buffer: *mut u8,
            width: c_int,
            height: c_int,
            x1: c_int,
            y1: c_int,
            x2: c_int,
            y2: c_int,
            color: *const c_char,
            size: c_int,
        ) -> RH_Status,
    >,

    /// `rh_draw_rectangle(buffer, width, height, x1, y1, x2, y2, border_color, size, filled, fill_color) -> RH_Status`
    pub draw_rectangle: libloading::Symbol<
        'static,
        unsafe extern "C" fn(
            buffer: *mut u8,
            width: c_int,
            height: c_int,
            x1: c_int,
            y1: c_int,
            x2: c_int,
            y2: c_int,
            border_color: *const c_char,
            size: c_int,
            filled: bool,
            fill_color: *const c_char,
        ) -> RH_Status,
    >,

    /// Keep the loaded library alive.
    _lib: Arc<libloading::Library>,
}

impl RasterizerApi {
    /// Load the rasterizer shared library from the given path.
    ///
    /// # Safety
    ///
    /// This function loads a native shared library and resolves function
    /// symbols. The library must export the expected symbols with the
    /// correct calling convention and signatures.
    pub fn load(path: &str) -> Result<Self, libloading::Error> {
        let lib = Arc::new(unsafe { libloading::Library::new(path)? });

        /// Helper to load a symbol and transmute to 'static lifetime.
        ///
        /// # Safety
        ///
        /// The returned symbol is valid as long as the `Arc<Library>` is alive.
        /// We ensure this by storing `_lib` in the returned struct.
        unsafe fn load_sym<T>(
            lib: &libloading::Library,
            name: &[u8],
        ) -> Result<libloading::Symbol<'static, T>, libloading::Error> {
            let s = unsafe { lib.get::<T>(name) }?;
            Ok(unsafe { mem::transmute(s) })
        }

        unsafe {
            Ok(Self {
                draw_brush_stroke: load_sym(&lib, b"rh_draw_brush_stroke")?,
                draw_eraser_stroke: load_sym(&lib, b"rh_draw_eraser_stroke")?,
                flood_fill: load_sym(&lib, b"rh_flood_fill")?,
                draw_line: load_sym(&lib, b"rh_draw_line")?,
                draw_rectangle: load_sym(&lib, b"rh_draw_rectangle")?,
                _lib: lib,
            })
        }
    }
}
