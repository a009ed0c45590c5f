//! The drawing endpoint's request body.
//!
//! The wire shape is a flat bag of optional fields; which ones are
//! required depends on the tool. `into_command` validates exactly the
//! fields the named tool needs and rejects everything else up front,
//! before any store interaction.

use serde::Deserialize;

use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;
use rasterhub_entity::color::Color;
use rasterhub_entity::op::{OperationDescriptor, PathPoint};
use rasterhub_service::dispatch::command::EditCommand;

const DEFAULT_STROKE_SIZE: i32 = 5;
const DEFAULT_SHAPE_SIZE: i32 = 1;
const DEFAULT_DRAW_COLOR: &str = "000000";
const DEFAULT_FILL_COLOR: &str = "FFFFFF";

/// One edit request as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct EditRequest {
    /// Tool name selecting the operation.
    pub tool: String,
    /// Canvas width, used only when a fresh canvas is created.
    pub width: Option<u32>,
    /// Canvas height, used only when a fresh canvas is created.
    pub height: Option<u32>,
    /// Hex color. Stroke/fill color for drawing tools, background fill
    /// for canvas creation.
    pub color: Option<String>,
    /// Stroke or border width in pixels.
    pub size: Option<i32>,
    /// Ordered stroke path as `[x, y]` pairs. Canvas coordinates arrive
    /// as floats and are truncated to whole pixels.
    #[serde(default)]
    pub path: Vec<[f64; 2]>,
    /// Flood-fill seed x.
    pub x: Option<i32>,
    /// Flood-fill seed y.
    pub y: Option<i32>,
    /// First endpoint/corner x.
    pub x1: Option<i32>,
    /// First endpoint/corner y.
    pub y1: Option<i32>,
    /// Second endpoint/corner x.
    pub x2: Option<i32>,
    /// Second endpoint/corner y.
    pub y2: Option<i32>,
    /// Whether the rectangle is filled.
    #[serde(rename = "conRelleno", default)]
    pub con_relleno: bool,
    /// Rectangle interior color, consulted only when `conRelleno` is set.
    #[serde(rename = "colorRelleno")]
    pub color_relleno: Option<String>,
}

impl EditRequest {
    /// Validate the request and build the command for its tool.
    pub fn into_command(self) -> AppResult<EditCommand> {
        match self.tool.as_str() {
            "get_initial_canvas" => Ok(EditCommand::InitialCanvas {
                width: self.width,
                height: self.height,
                fill_color: self.optional_color()?,
            }),
            "new_canvas" => Ok(EditCommand::NewCanvas {
                width: self.width,
                height: self.height,
                fill_color: self.optional_color()?,
            }),
            "undo" => Ok(EditCommand::Undo),
            "redo" => Ok(EditCommand::Redo),
            "brush_stroke" => {
                let op = OperationDescriptor::BrushStroke {
                    path: self.stroke_path()?,
                    color: self.color_or(DEFAULT_DRAW_COLOR)?,
                    size: self.size.unwrap_or(DEFAULT_STROKE_SIZE),
                };
                Ok(EditCommand::Draw(op))
            }
            "eraser_stroke" => {
                let op = OperationDescriptor::EraserStroke {
                    path: self.stroke_path()?,
                    size: self.size.unwrap_or(DEFAULT_STROKE_SIZE),
                };
                Ok(EditCommand::Draw(op))
            }
            "flood_fill" => {
                let op = OperationDescriptor::FloodFill {
                    x: required(self.x, "x")?,
                    y: required(self.y, "y")?,
                    color: self.color_or(DEFAULT_DRAW_COLOR)?,
                };
                Ok(EditCommand::Draw(op))
            }
            "line" => {
                let op = OperationDescriptor::Line {
                    x1: required(self.x1, "x1")?,
                    y1: required(self.y1, "y1")?,
                    x2: required(self.x2, "x2")?,
                    y2: required(self.y2, "y2")?,
                    color: self.color_or(DEFAULT_DRAW_COLOR)?,
                    size: self.size.unwrap_or(DEFAULT_SHAPE_SIZE),
                };
                Ok(EditCommand::Draw(op))
            }
            "rectangle" => {
                let fill_color = if self.con_relleno {
                    Some(parse_color(
                        self.color_relleno.as_deref().unwrap_or(DEFAULT_FILL_COLOR),
                    )?)
                } else {
                    None
                };
                let op = OperationDescriptor::Rectangle {
                    x1: required(self.x1, "x1")?,
                    y1: required(self.y1, "y1")?,
                    x2: required(self.x2, "x2")?,
                    y2: required(self.y2, "y2")?,
                    border_color: self.color_or(DEFAULT_DRAW_COLOR)?,
                    size: self.size.unwrap_or(DEFAULT_SHAPE_SIZE),
                    fill_color,
                };
                Ok(EditCommand::Draw(op))
            }
            other => Err(AppError::unknown_tool(other)),
        }
    }

    fn stroke_path(&self) -> AppResult<Vec<PathPoint>> {
        if self.path.len() < 2 {
            return Err(AppError::validation(
                "A stroke path needs at least two points",
            ));
        }
        Ok(self
            .path
            .iter()
            .map(|[x, y]| PathPoint::new(*x as i32, *y as i32))
            .collect())
    }

    fn color_or(&self, fallback: &str) -> AppResult<Color> {
        parse_color(self.color.as_deref().unwrap_or(fallback))
    }

    fn optional_color(&self) -> AppResult<Option<Color>> {
        self.color.as_deref().map(parse_color).transpose()
    }
}

fn parse_color(hex: &str) -> AppResult<Color> {
    hex.parse()
}

fn required(value: Option<i32>, field: &str) -> AppResult<i32> {
    value.ok_or_else(|| AppError::validation(format!("Missing required field: '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(json: &str) -> EditRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_brush_defaults() {
        let request = from_json(r#"{"tool": "brush_stroke", "path": [[0.9, 1.2], [5.7, 5.0]]}"#);
        match request.into_command().unwrap() {
            EditCommand::Draw(OperationDescriptor::BrushStroke { path, color, size }) => {
                assert_eq!(path, vec![PathPoint::new(0, 1), PathPoint::new(5, 5)]);
                assert_eq!(color, Color::new(0, 0, 0));
                assert_eq!(size, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_filled_rectangle_fill_color_default() {
        let request = from_json(
            r#"{"tool": "rectangle", "x1": 0, "y1": 0, "x2": 9, "y2": 9, "conRelleno": true}"#,
        );
        match request.into_command().unwrap() {
            EditCommand::Draw(OperationDescriptor::Rectangle {
                fill_color, size, ..
            }) => {
                assert_eq!(fill_color, Some(Color::new(0xFF, 0xFF, 0xFF)));
                assert_eq!(size, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unfilled_rectangle_ignores_fill_color() {
        let request = from_json(
            r#"{"tool": "rectangle", "x1": 0, "y1": 0, "x2": 9, "y2": 9, "colorRelleno": "FF0000"}"#,
        );
        match request.into_command().unwrap() {
            EditCommand::Draw(OperationDescriptor::Rectangle { fill_color, .. }) => {
                assert_eq!(fill_color, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tool_rejected() {
        let request = from_json(r#"{"tool": "spray_can"}"#);
        let err = request.into_command().unwrap_err();
        assert_eq!(err.kind, rasterhub_core::error::ErrorKind::UnknownTool);
    }

    #[test]
    fn test_flood_fill_requires_seed() {
        let request = from_json(r#"{"tool": "flood_fill", "x": 10}"#);
        let err = request.into_command().unwrap_err();
        assert_eq!(err.kind, rasterhub_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_short_path_rejected() {
        let request = from_json(r#"{"tool": "eraser_stroke", "path": [[1, 1]]}"#);
        let err = request.into_command().unwrap_err();
        assert_eq!(err.kind, rasterhub_core::error::ErrorKind::Validation);
    }
}
