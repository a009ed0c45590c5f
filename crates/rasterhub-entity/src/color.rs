//! RGB color value parsed from `RRGGBB` hex strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rasterhub_core::error::AppError;

/// An opaque RGB color.
///
/// Colors arrive on the wire as six-digit hex strings (no leading `#`)
/// and are handed to the rasterization engine in the same form. Parsing
/// up front rejects malformed input before any store interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Create a color from raw channel values.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Return the `RRGGBB` hex form consumed by the rasterizer.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Return the color as an opaque RGBA quadruple.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }
}

impl FromStr for Color {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::validation(format!(
                "Invalid color '{s}': expected a six-digit RRGGBB hex string"
            )));
        }
        // Length and digit checks above make these infallible.
        let r = u8::from_str_radix(&s[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&s[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&s[4..6], 16).unwrap_or(0);
        Ok(Self { r, g, b })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = AppError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c: Color = "1A2B3C".parse().expect("should parse");
        assert_eq!(c, Color::new(0x1A, 0x2B, 0x3C));
    }

    #[test]
    fn test_parse_with_hash_prefix() {
        let c: Color = "#FFFFFF".parse().expect("should parse");
        assert_eq!(c, Color::new(0xFF, 0xFF, 0xFF));
    }

    #[test]
    fn test_parse_rejects_short_strings() {
        assert!("FFF".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!("GGGGGG".parse::<Color>().is_err());
    }

    #[test]
    fn test_hex_roundtrip() {
        let c = Color::new(0, 128, 255);
        let parsed: Color = c.to_hex().parse().expect("should parse");
        assert_eq!(parsed, c);
    }

    #[test]
    fn test_rgba_is_opaque() {
        assert_eq!(Color::new(1, 2, 3).to_rgba(), [1, 2, 3, 255]);
    }
}
