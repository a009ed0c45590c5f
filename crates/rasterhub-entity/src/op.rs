//! Edit operation descriptors.
//!
//! An [`OperationDescriptor`] captures the parameters of one edit command.
//! It is request-scoped, never persisted, and opaque to the history
//! engine: only the rasterization engine interprets it.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A single point on a stroke path, in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl PathPoint {
    /// Create a new path point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed enumeration of drawing operations.
///
/// Each variant carries exactly the parameters its rasterizer entry point
/// requires. Point order in stroke paths is significant: consecutive
/// points define the segments of the stroke and must never be reordered
/// or deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationDescriptor {
    /// Freehand brush stroke along an ordered point path.
    BrushStroke {
        /// Ordered stroke path.
        path: Vec<PathPoint>,
        /// Stroke color.
        color: Color,
        /// Stroke width in pixels.
        size: i32,
    },
    /// Eraser stroke along an ordered point path.
    EraserStroke {
        /// Ordered stroke path.
        path: Vec<PathPoint>,
        /// Eraser width in pixels.
        size: i32,
    },
    /// Flood fill starting from a seed point.
    FloodFill {
        /// Seed point x coordinate.
        x: i32,
        /// Seed point y coordinate.
        y: i32,
        /// Fill color.
        color: Color,
    },
    /// Straight line between two endpoints.
    Line {
        /// First endpoint x.
        x1: i32,
        /// First endpoint y.
        y1: i32,
        /// Second endpoint x.
        x2: i32,
        /// Second endpoint y.
        y2: i32,
        /// Line color.
        color: Color,
        /// Line width in pixels.
        size: i32,
    },
    /// Axis-aligned rectangle between two corners.
    Rectangle {
        /// First corner x.
        x1: i32,
        /// First corner y.
        y1: i32,
        /// Opposite corner x.
        x2: i32,
        /// Opposite corner y.
        y2: i32,
        /// Border color.
        border_color: Color,
        /// Border width in pixels.
        size: i32,
        /// Interior fill color, if the rectangle is filled.
        fill_color: Option<Color>,
    },
}

impl OperationDescriptor {
    /// The wire-level tool name for this operation.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::BrushStroke { .. } => "brush_stroke",
            Self::EraserStroke { .. } => "eraser_stroke",
            Self::FloodFill { .. } => "flood_fill",
            Self::Line { .. } => "line",
            Self::Rectangle { .. } => "rectangle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        let op = OperationDescriptor::FloodFill {
            x: 1,
            y: 2,
            color: Color::new(0, 0, 0),
        };
        assert_eq!(op.tool_name(), "flood_fill");

        let op = OperationDescriptor::EraserStroke {
            path: vec![PathPoint::new(0, 0)],
            size: 5,
        };
        assert_eq!(op.tool_name(), "eraser_stroke");
    }

    #[test]
    fn test_path_order_is_preserved() {
        let path = vec![
            PathPoint::new(3, 3),
            PathPoint::new(1, 1),
            PathPoint::new(2, 2),
        ];
        let op = OperationDescriptor::BrushStroke {
            path: path.clone(),
            color: Color::new(0, 0, 0),
            size: 5,
        };
        if let OperationDescriptor::BrushStroke { path: stored, .. } = op {
            assert_eq!(stored, path);
        } else {
            unreachable!();
        }
    }
}
