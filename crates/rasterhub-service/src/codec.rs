//! Pixel codec: conversions between persisted snapshot bytes and raw
//! RGBA pixel buffers.
//!
//! Snapshots are stored as binary PPM (P6), a lossless 8-bit RGB
//! encoding. PPM has no alpha channel, so encoding drops alpha and
//! decoding synthesizes full opacity; the rasterization engine only ever
//! produces opaque buffers, so the round trip is lossless in practice.
//! The client-facing encoding is a PNG data URL.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};

use rasterhub_core::error::AppError;
use rasterhub_core::result::AppResult;
use rasterhub_entity::color::Color;

/// A decoded raster: raw RGBA bytes plus dimensions.
///
/// The buffer is exclusively owned by one edit dispatch for the duration
/// of a request; it is handed mutably to the rasterization engine and
/// re-encoded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA bytes, row-major, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Build a solid-fill canvas of the given size and color.
    pub fn solid_fill(width: u32, height: u32, color: Color) -> Self {
        let pixel = color.to_rgba();
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&pixel);
        }
        Self {
            width,
            height,
            data,
        }
    }
}

/// Decode persisted PPM bytes into a raw RGBA buffer.
///
/// Alpha is synthesized as fully opaque. Malformed input is a terminal
/// codec error — never a silently blank canvas.
pub fn decode_ppm(bytes: &[u8]) -> AppResult<PixelBuffer> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Pnm)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelBuffer {
        width,
        height,
        data: rgba.into_raw(),
    })
}

/// Encode a raw RGBA buffer as binary PPM, dropping the alpha channel.
pub fn encode_ppm(buffer: &PixelBuffer) -> AppResult<Vec<u8>> {
    let rgba = RgbaImage::from_raw(buffer.width, buffer.height, buffer.data.clone())
        .ok_or_else(|| {
            AppError::codec(format!(
                "Pixel buffer length {} does not match {}x{} RGBA dimensions",
                buffer.data.len(),
                buffer.width,
                buffer.height
            ))
        })?;
    let rgb: RgbImage = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb).write_to(&mut out, ImageFormat::Pnm)?;
    Ok(out.into_inner())
}

/// Convert persisted PPM bytes into the browser-displayable
/// `data:image/png;base64,...` URL form.
pub fn png_data_url(ppm_bytes: &[u8]) -> AppResult<String> {
    let img = image::load_from_memory_with_format(ppm_bytes, ImageFormat::Pnm)?;
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        BASE64.encode(png.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterhub_core::error::ErrorKind;

    #[test]
    fn test_solid_fill_dimensions_and_color() {
        let buffer = PixelBuffer::solid_fill(3, 2, Color::new(0x10, 0x20, 0x30));
        assert_eq!(buffer.data.len(), 3 * 2 * 4);
        for pixel in buffer.data.chunks(4) {
            assert_eq!(pixel, &[0x10, 0x20, 0x30, 0xFF]);
        }
    }

    #[test]
    fn test_encode_decode_roundtrip_solid() {
        let original = PixelBuffer::solid_fill(5, 4, Color::new(0xAA, 0xBB, 0xCC));
        let ppm = encode_ppm(&original).unwrap();
        let decoded = decode_ppm(&ppm).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encode_decode_roundtrip_random_opaque() {
        // Opaque alpha everywhere: the engine only produces opaque
        // buffers, and PPM discards alpha on encode.
        let width = 16u32;
        let height = 9u32;
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.push(rand::random::<u8>());
            data.push(rand::random::<u8>());
            data.push(rand::random::<u8>());
            data.push(0xFF);
        }
        let original = PixelBuffer {
            width,
            height,
            data,
        };
        let ppm = encode_ppm(&original).unwrap();
        let decoded = decode_ppm(&ppm).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_synthesizes_full_opacity() {
        let ppm = encode_ppm(&PixelBuffer::solid_fill(2, 2, Color::new(1, 2, 3))).unwrap();
        let decoded = decode_ppm(&ppm).unwrap();
        for pixel in decoded.data.chunks(4) {
            assert_eq!(pixel[3], 0xFF);
        }
    }

    #[test]
    fn test_decode_malformed_is_codec_error() {
        let err = decode_ppm(b"definitely not a ppm").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codec);
    }

    #[test]
    fn test_encode_rejects_mismatched_dimensions() {
        let buffer = PixelBuffer {
            width: 10,
            height: 10,
            data: vec![0; 16],
        };
        let err = encode_ppm(&buffer).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Codec);
    }

    #[test]
    fn test_png_data_url_prefix() {
        let ppm = encode_ppm(&PixelBuffer::solid_fill(2, 2, Color::new(0, 0, 0))).unwrap();
        let url = png_data_url(&ppm).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
