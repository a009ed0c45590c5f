//! Mock rasterizer for development and testing.
//!
//! Simulates the native engine without loading a shared library: each
//! operation stamps its anchor pixels into the buffer so edits have a
//! visible, deterministic effect, and every applied operation is recorded
//! for assertion in tests. A forced failure status can be configured to
//! exercise error paths.

use std::sync::Mutex;

use tracing::debug;

use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;
use rasterhub_entity::color::Color;
use rasterhub_entity::op::OperationDescriptor;

use crate::engine::RenderEngine;

/// In-memory mock of the native rasterizer.
#[derive(Debug, Default)]
pub struct MockRasterizer {
    /// Operations applied so far, in order.
    applied: Mutex<Vec<OperationDescriptor>>,
    /// When set, every render call fails with this status code.
    forced_status: Mutex<Option<i32>>,
}

impl MockRasterizer {
    /// Create a new mock rasterizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every subsequent render call to fail with the given status.
    pub fn fail_with(&self, status: i32) {
        let mut forced = self
            .forced_status
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *forced = Some(status);
    }

    /// Clear a previously forced failure status.
    pub fn clear_failure(&self) {
        let mut forced = self
            .forced_status
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *forced = None;
    }

    /// Operations applied so far, in application order.
    pub fn applied(&self) -> Vec<OperationDescriptor> {
        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn stamp(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
            return;
        }
        let idx = (y as usize * width as usize + x as usize) * 4;
        if idx + 3 < buffer.len() {
            buffer[idx..idx + 4].copy_from_slice(&color.to_rgba());
        }
    }
}

impl RenderEngine for MockRasterizer {
    fn render(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        op: &OperationDescriptor,
    ) -> AppResult<()> {
        let forced = *self
            .forced_status
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(status) = forced {
            debug!(status, tool = op.tool_name(), "Mock rasterizer forced failure");
            return Err(AppError::render_engine(status, op.tool_name()));
        }

        let white = Color::new(0xFF, 0xFF, 0xFF);
        match op {
            OperationDescriptor::BrushStroke { path, color, .. } => {
                for p in path {
                    Self::stamp(buffer, width, height, p.x, p.y, *color);
                }
            }
            OperationDescriptor::EraserStroke { path, .. } => {
                for p in path {
                    Self::stamp(buffer, width, height, p.x, p.y, white);
                }
            }
            OperationDescriptor::FloodFill { x, y, color } => {
                Self::stamp(buffer, width, height, *x, *y, *color);
            }
            OperationDescriptor::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                ..
            } => {
                Self::stamp(buffer, width, height, *x1, *y1, *color);
                Self::stamp(buffer, width, height, *x2, *y2, *color);
            }
            OperationDescriptor::Rectangle {
                x1,
                y1,
                x2,
                y2,
                border_color,
                fill_color,
                ..
            } => {
                Self::stamp(buffer, width, height, *x1, *y1, *border_color);
                Self::stamp(buffer, width, height, *x2, *y2, *border_color);
                if let Some(fill) = fill_color {
                    let cx = (x1 + x2) / 2;
                    let cy = (y1 + y2) / 2;
                    Self::stamp(buffer, width, height, cx, cy, *fill);
                }
            }
        }

        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(op.clone());
        Ok(())
    }
}
