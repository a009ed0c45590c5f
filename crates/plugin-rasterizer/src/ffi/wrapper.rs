//! Safe wrapper translating operation descriptors into native calls.

use std::ffi::{CString, c_int};

use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;
use rasterhub_entity::op::{OperationDescriptor, PathPoint};

use crate::engine::RenderEngine;
use crate::ffi::bindings::{RH_SUCCESS, RasterizerApi};

/// Rasterizer backed by the native shared library.
#[derive(Debug, Clone)]
pub struct NativeRasterizer {
    api: RasterizerApi,
}

impl NativeRasterizer {
    /// Load the native rasterizer from a shared library path.
    pub fn load(path: &str) -> AppResult<Self> {
        let api = RasterizerApi::load(path).map_err(|e| {
            AppError::with_source(
                rasterhub_core::error::ErrorKind::Configuration,
                format!("Failed to load rasterizer library '{path}': {e}"),
                e,
            )
        })?;
        Ok(Self { api })
    }
}

/// Serialize an ordered point path into the `"x1,y1,x2,y2;..."` segment
/// list the native library expects. Consecutive point pairs define the
/// stroke segments, so point order must be preserved exactly.
fn path_segments(path: &[PathPoint]) -> String {
    path.windows(2)
        .map(|pair| format!("{},{},{},{}", pair[0].x, pair[0].y, pair[1].x, pair[1].y))
        .collect::<Vec<_>>()
        .join(";")
}

fn c_string(value: &str) -> AppResult<CString> {
    CString::new(value)
        .map_err(|e| AppError::internal(format!("Interior NUL in engine argument: {e}")))
}

impl RenderEngine for NativeRasterizer {
    fn render(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        op: &OperationDescriptor,
    ) -> AppResult<()> {
        let buf = buffer.as_mut_ptr();
        let w = width as c_int;
        let h = height as c_int;

        // SAFETY: the buffer is exclusively borrowed for this call and is
        // exactly width * height * 4 bytes; the library contract is that
        // every entry point only writes within those bounds.
        let status = unsafe {
            match op {
                OperationDescriptor::BrushStroke { path, color, size } => {
                    let path = c_string(&path_segments(path))?;
                    let color = c_string(&color.to_hex())?;
                    (self.api.draw_brush_stroke)(buf, w, h, path.as_ptr(), color.as_ptr(), *size)
                }
                OperationDescriptor::EraserStroke { path, size } => {
                    let path = c_string(&path_segments(path))?;
                    (self.api.draw_eraser_stroke)(buf, w, h, path.as_ptr(), *size)
                }
                OperationDescriptor::FloodFill { x, y, color } => {
                    let color = c_string(&color.to_hex())?;
                    (self.api.flood_fill)(buf, w, h, *x, *y, color.as_ptr())
                }
                OperationDescriptor::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                    size,
                } => {
                    let color = c_string(&color.to_hex())?;
                    (self.api.draw_line)(buf, w, h, *x1, *y1, *x2, *y2, color.as_ptr(), *size)
                }
                OperationDescriptor::Rectangle {
                    x1,
                    y1,
                    x2,
                    y2,
                    border_color,
                    size,
                    fill_color,
                } => {
                    let border = c_string(&border_color.to_hex())?;
                    let fill = c_string(&fill_color.map(|c| c.to_hex()).unwrap_or_default())?;
                    (self.api.draw_rectangle)(
                        buf,
                        w,
                        h,
                        *x1,
                        *y1,
                        *x2,
                        *y2,
                        border.as_ptr(),
                        *size,
                        fill_color.is_some(),
                        fill.as_ptr(),
                    )
                }
            }
        };

        if status != RH_SUCCESS {
            return Err(AppError::render_engine(status, op.tool_name()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments_pairs_consecutive_points() {
        let path = vec![
            PathPoint::new(0, 0),
            PathPoint::new(5, 5),
            PathPoint::new(9, 2),
        ];
        assert_eq!(path_segments(&path), "0,0,5,5;5,5,9,2");
    }

    #[test]
    fn test_path_segments_single_point_is_empty() {
        assert_eq!(path_segments(&[PathPoint::new(3, 4)]), "");
    }
}
