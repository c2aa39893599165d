//! # Card Rendering
//!
//! Turns one slot's bounding box, its projected lines and its code value
//! into draw commands, in a fixed order: border, text block, code image.
//!
//! The text column takes the left part of the card and is vertically
//! centered using the same wrapped line count that is actually drawn. The
//! code image sits on the right, vertically centered. When the encoder
//! cannot produce an image, the card is still drawn without one.

use crate::encoder::CodeEncoder;
use crate::error::EncodingError;
use crate::text::wrap;

use super::grid::BoundingBox;
use super::{BorderStyle, DrawCommand};

pub const FONT_SIZE: f64 = 11.0;
pub const LINE_HEIGHT: f64 = 15.0;
/// Left inset of the text block, also subtracted from the text column.
pub const TEXT_PADDING: f64 = 10.0;
/// Share of the card width given to the text column.
pub const TEXT_COLUMN_FRACTION: f64 = 0.55;
/// Printed size of the code, in points.
pub const CODE_SIZE: f64 = 85.0;
/// Raster size requested from the encoder, in pixels.
pub const CODE_RESOLUTION: u32 = 100;
pub const CODE_RIGHT_PADDING: f64 = 5.0;
pub const BORDER_WIDTH: f64 = 1.0;

/// Draw commands for one card, plus the encoder failure if there was one.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub commands: Vec<DrawCommand>,
    pub code_error: Option<EncodingError>,
}

/// Width available to wrapped text inside `bbox`.
pub fn text_column_width(bbox: &BoundingBox) -> f64 {
    bbox.width * TEXT_COLUMN_FRACTION - TEXT_PADDING
}

/// Render one card into `bbox`.
pub fn render_card(
    bbox: &BoundingBox,
    lines: &[String],
    code_value: &str,
    encoder: &dyn CodeEncoder,
) -> RenderedCard {
    let mut commands = vec![DrawCommand::Rect {
        x: bbox.x,
        y: bbox.y,
        width: bbox.width,
        height: bbox.height,
        border: BorderStyle::Dashed,
        line_width: BORDER_WIDTH,
    }];

    let max_width = text_column_width(bbox);
    let wrapped: Vec<Vec<String>> = lines
        .iter()
        .map(|line| wrap(line, max_width, FONT_SIZE))
        .collect();
    let total_lines: usize = wrapped.iter().map(Vec::len).sum();

    let mut y = bbox.center_y() + (total_lines as f64 * LINE_HEIGHT) / 2.0 - LINE_HEIGHT;
    for sub_line in wrapped.into_iter().flatten() {
        commands.push(DrawCommand::Text {
            x: bbox.x + TEXT_PADDING,
            y,
            text: sub_line,
            font_size: FONT_SIZE,
        });
        y -= LINE_HEIGHT;
    }

    let code_error = match encoder.encode(code_value, CODE_RESOLUTION) {
        Ok(image) => {
            commands.push(DrawCommand::Image {
                x: bbox.right() - CODE_SIZE - CODE_RIGHT_PADDING,
                y: bbox.y + (bbox.height - CODE_SIZE) / 2.0,
                width: CODE_SIZE,
                height: CODE_SIZE,
                image,
            });
            None
        }
        Err(e) => Some(e),
    };

    RenderedCard {
        commands,
        code_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{CodeImage, QrEncoder};

    fn bbox() -> BoundingBox {
        BoundingBox {
            x: 20.0,
            y: 500.0,
            width: 267.5,
            height: 148.4,
        }
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn blank_encoder(_: &str, size: u32) -> Result<CodeImage, EncodingError> {
        Ok(CodeImage {
            width_px: size,
            height_px: size,
            pixels: vec![255; (size * size) as usize],
        })
    }

    fn failing_encoder(_: &str, _: u32) -> Result<CodeImage, EncodingError> {
        Err(EncodingError::EmptyValue)
    }

    fn text_ys(commands: &[DrawCommand]) -> Vec<f64> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { y, .. } => Some(*y),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_emission_order_border_text_image() {
        let card = render_card(&bbox(), &lines(&["A: 1", "B: 2"]), "1", &blank_encoder);
        assert!(matches!(
            card.commands.first(),
            Some(DrawCommand::Rect { border: BorderStyle::Dashed, .. })
        ));
        assert!(matches!(card.commands.last(), Some(DrawCommand::Image { .. })));
        assert_eq!(card.commands.len(), 4);
        assert!(card.code_error.is_none());
    }

    #[test]
    fn test_border_matches_box() {
        let b = bbox();
        let card = render_card(&b, &lines(&["A: 1"]), "1", &blank_encoder);
        match &card.commands[0] {
            DrawCommand::Rect { x, y, width, height, .. } => {
                assert_eq!((*x, *y, *width, *height), (b.x, b.y, b.width, b.height));
            }
            other => panic!("expected border, got {:?}", other),
        }
    }

    #[test]
    fn test_text_block_is_vertically_centered() {
        let b = bbox();
        let card = render_card(&b, &lines(&["A: 1", "B: 2", "C: 3"]), "1", &blank_encoder);
        let ys = text_ys(&card.commands);
        assert_eq!(ys.len(), 3);
        // Start at center + 3*15/2 - 15, then step down one line height.
        let start = b.center_y() + 22.5 - 15.0;
        assert!((ys[0] - start).abs() < 1e-9);
        assert!((ys[1] - (start - 15.0)).abs() < 1e-9);
        assert!((ys[2] - (start - 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_centering_counts_wrapped_sub_lines() {
        let b = bbox();
        let long = "Union: Northwestmostdistrictofthecountry and then some more words";
        let card = render_card(&b, &lines(&["A: 1", long]), "1", &blank_encoder);
        let ys = text_ys(&card.commands);
        let total = ys.len() as f64;
        assert!(total > 2.0);
        let start = b.center_y() + total * LINE_HEIGHT / 2.0 - LINE_HEIGHT;
        assert!((ys[0] - start).abs() < 1e-9);
    }

    #[test]
    fn test_text_is_left_aligned_with_padding() {
        let b = bbox();
        let card = render_card(&b, &lines(&["A: 1", "B: 2"]), "1", &blank_encoder);
        for c in &card.commands {
            if let DrawCommand::Text { x, font_size, .. } = c {
                assert_eq!(*x, b.x + TEXT_PADDING);
                assert_eq!(*font_size, FONT_SIZE);
            }
        }
    }

    #[test]
    fn test_code_is_right_aligned_and_centered() {
        let b = bbox();
        let card = render_card(&b, &lines(&["A: 1"]), "1", &blank_encoder);
        match card.commands.last() {
            Some(DrawCommand::Image { x, y, width, height, image }) => {
                assert!((x - (b.x + b.width - 85.0 - 5.0)).abs() < 1e-9);
                assert!((y + height / 2.0 - b.center_y()).abs() < 1e-9);
                assert_eq!(*width, CODE_SIZE);
                assert_eq!(image.width_px, CODE_RESOLUTION);
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_text_and_code_do_not_overlap() {
        let b = bbox();
        assert!(b.x + TEXT_PADDING + text_column_width(&b) < b.right() - CODE_SIZE - CODE_RIGHT_PADDING);
    }

    #[test]
    fn test_encoder_failure_keeps_border_and_text() {
        let card = render_card(&bbox(), &lines(&["A: 1", "B: 2"]), "", &failing_encoder);
        assert_eq!(card.code_error, Some(EncodingError::EmptyValue));
        assert_eq!(card.commands.len(), 3);
        assert!(!card
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Image { .. })));
    }

    #[test]
    fn test_real_qr_encoder_on_empty_value() {
        let card = render_card(&bbox(), &lines(&["HH ID: "]), "", &QrEncoder::new());
        assert_eq!(card.code_error, Some(EncodingError::EmptyValue));
    }
}
