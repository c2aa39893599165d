//! # QR Code Encoding
//!
//! The layout engine never touches pixels. It asks a [`CodeEncoder`] for a
//! square [`CodeImage`] and places whatever comes back. [`QrEncoder`] is the
//! default implementation: high error correction, a four-module quiet zone,
//! dark modules on white, rasterized to exactly the requested size.

use image::{GrayImage, ImageEncoder, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::EncodingError;

/// Quiet zone around the symbol, in modules.
const QUIET_ZONE: usize = 4;

const DARK: u8 = 0;
const LIGHT: u8 = 255;

/// An 8-bit grayscale image ready for PDF embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeImage {
    pub width_px: u32,
    pub height_px: u32,
    /// `width_px * height_px` bytes, row-major, top row first.
    pub pixels: Vec<u8>,
}

impl CodeImage {
    /// Encode as PNG, for previews outside the PDF.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder.write_image(
            &self.pixels,
            self.width_px,
            self.height_px,
            image::ColorType::L8,
        )?;
        Ok(buf)
    }
}

impl From<GrayImage> for CodeImage {
    fn from(img: GrayImage) -> Self {
        CodeImage {
            width_px: img.width(),
            height_px: img.height(),
            pixels: img.into_raw(),
        }
    }
}

/// Turns a string into a scannable square image.
///
/// Implementations must be deterministic: equal `text` and `size` give
/// equal images.
pub trait CodeEncoder {
    fn encode(&self, text: &str, size: u32) -> Result<CodeImage, EncodingError>;
}

impl<F> CodeEncoder for F
where
    F: Fn(&str, u32) -> Result<CodeImage, EncodingError>,
{
    fn encode(&self, text: &str, size: u32) -> Result<CodeImage, EncodingError> {
        self(text, size)
    }
}

/// QR encoder backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    pub ec_level: EcLevel,
}

impl Default for QrEncoder {
    fn default() -> Self {
        QrEncoder {
            ec_level: EcLevel::H,
        }
    }
}

impl QrEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeEncoder for QrEncoder {
    fn encode(&self, text: &str, size: u32) -> Result<CodeImage, EncodingError> {
        if text.is_empty() {
            return Err(EncodingError::EmptyValue);
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ec_level)
            .map_err(EncodingError::Qr)?;
        let symbol_width = code.width();
        let colors = code.to_colors();
        let modules = symbol_width + 2 * QUIET_ZONE;

        if (size as usize) < modules {
            return Err(EncodingError::TooSmall {
                size,
                modules: modules as u32,
            });
        }

        // Nearest-module sampling keeps the output exactly size x size.
        let module_at = |px: u32| (px as usize * modules) / size as usize;
        let img = GrayImage::from_fn(size, size, |x, y| {
            let (mx, my) = (module_at(x), module_at(y));
            let inside = (QUIET_ZONE..QUIET_ZONE + symbol_width).contains(&mx)
                && (QUIET_ZONE..QUIET_ZONE + symbol_width).contains(&my);
            if inside {
                match colors[(my - QUIET_ZONE) * symbol_width + (mx - QUIET_ZONE)] {
                    Color::Dark => Luma([DARK]),
                    Color::Light => Luma([LIGHT]),
                }
            } else {
                Luma([LIGHT])
            }
        });

        Ok(img.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_square_image_of_requested_size() {
        let img = QrEncoder::new().encode("HH-000123", 100).unwrap();
        assert_eq!(img.width_px, 100);
        assert_eq!(img.height_px, 100);
        assert_eq!(img.pixels.len(), 100 * 100);
    }

    #[test]
    fn test_has_dark_modules_and_light_border() {
        let img = QrEncoder::new().encode("HH-000123", 100).unwrap();
        assert!(img.pixels.contains(&DARK));
        // The quiet zone keeps the corner pixel light.
        assert_eq!(img.pixels[0], LIGHT);
        assert_eq!(img.pixels[99], LIGHT);
    }

    #[test]
    fn test_deterministic() {
        let enc = QrEncoder::new();
        assert_eq!(enc.encode("abc", 100), enc.encode("abc", 100));
        assert_ne!(enc.encode("abc", 100), enc.encode("abd", 100));
    }

    #[test]
    fn test_empty_value_fails() {
        assert_eq!(
            QrEncoder::new().encode("", 100),
            Err(EncodingError::EmptyValue)
        );
    }

    #[test]
    fn test_too_small_fails() {
        let result = QrEncoder::new().encode("HH-000123", 10);
        assert!(matches!(result, Err(EncodingError::TooSmall { size: 10, .. })));
    }

    #[test]
    fn test_data_too_long_fails() {
        let long = "x".repeat(5000);
        let result = QrEncoder::new().encode(&long, 100);
        assert!(matches!(result, Err(EncodingError::Qr(_))));
    }

    #[test]
    fn test_closure_encoder() {
        let enc = |text: &str, size: u32| -> Result<CodeImage, EncodingError> {
            Ok(CodeImage {
                width_px: size,
                height_px: size,
                pixels: vec![text.len() as u8; (size * size) as usize],
            })
        };
        let img = enc.encode("abcd", 2).unwrap();
        assert_eq!(img.pixels, vec![4, 4, 4, 4]);
    }

    #[test]
    fn test_png_preview() {
        let png = QrEncoder::new().encode("HH-1", 100).unwrap().to_png().unwrap();
        assert!(png.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }
}
