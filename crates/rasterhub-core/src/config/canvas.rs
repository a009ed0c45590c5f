//! Canvas defaults for freshly created drawings.

use serde::{Deserialize, Serialize};

/// Default dimensions and fill color used when a drawing is created
/// without caller-supplied values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Default canvas width in pixels.
    #[serde(default = "default_width")]
    pub default_width: u32,
    /// Default canvas height in pixels.
    #[serde(default = "default_height")]
    pub default_height: u32,
    /// Default fill color as a `RRGGBB` hex string.
    #[serde(default = "default_fill_color")]
    pub default_fill_color: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_width: default_width(),
            default_height: default_height(),
            default_fill_color: default_fill_color(),
        }
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_fill_color() -> String {
    "FFFFFF".to_string()
}
