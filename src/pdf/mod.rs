//! # PDF Serializer
//!
//! Takes laid-out card pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Card sheets need very little of
//! the format: one built-in font, stroked rectangles, text lines, and
//! grayscale images. Writing the bytes ourselves keeps the engine
//! self-contained and the output byte-for-byte reproducible.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, font
//! 4 0 obj ... endobj  <- per page: image XObjects, content stream, page
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Draw commands arrive in PDF user space already (bottom-left origin), so
//! no coordinate flipping happens here.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use crate::encoder::CodeImage;
use crate::error::SinkError;
use crate::layout::{BorderStyle, DrawCommand};
use crate::model::Metadata;
use miniz_oxide::deflate::compress_to_vec_zlib;

/// Object id of the single Helvetica font resource.
const FONT_OBJ_ID: usize = 3;

const DEFAULT_TITLE: &str = "QR ID Cards";

/// Windows-1252 bytes in 0x80..=0x9F and the codepoints they stand for.
/// Everything else WinAnsi can show is Latin-1 and maps to itself.
const WINANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80), ('\u{201A}', 0x82), ('\u{0192}', 0x83), ('\u{201E}', 0x84),
    ('\u{2026}', 0x85), ('\u{2020}', 0x86), ('\u{2021}', 0x87), ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89), ('\u{0160}', 0x8A), ('\u{2039}', 0x8B), ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E), ('\u{2018}', 0x91), ('\u{2019}', 0x92), ('\u{201C}', 0x93),
    ('\u{201D}', 0x94), ('\u{2022}', 0x95), ('\u{2013}', 0x96), ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98), ('\u{2122}', 0x99), ('\u{0161}', 0x9A), ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C), ('\u{017E}', 0x9E), ('\u{0178}', 0x9F),
];

/// Receives laid-out pages and produces the final document bytes.
pub trait DocumentSink {
    /// Declare a page of the given size and draw `commands` on it, in order.
    fn add_page(&mut self, width: f64, height: f64, commands: &[DrawCommand]) -> Result<(), SinkError>;

    /// Produce the finished document.
    fn serialize(&mut self) -> Result<Vec<u8>, SinkError>;
}

/// Writes card pages into a PDF byte vector.
pub struct PdfWriter {
    builder: PdfBuilder,
    metadata: Metadata,
    page_obj_ids: Vec<usize>,
    /// Images written so far; names run /Im0, /Im1, ... across the document.
    image_count: usize,
    finished: bool,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(Metadata::default())
    }
}

impl PdfWriter {
    pub fn new(metadata: Metadata) -> Self {
        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3 = Helvetica
        // 4+ = per page: images, content stream, page dict
        let mut builder = PdfBuilder {
            objects: Vec::new(),
        };
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
              /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );

        PdfWriter {
            builder,
            metadata,
            page_obj_ids: Vec::new(),
            image_count: 0,
            finished: false,
        }
    }

    /// Number of pages accepted so far.
    pub fn page_count(&self) -> usize {
        self.page_obj_ids.len()
    }

    /// Write a single draw command as PDF operators.
    fn write_command(stream: &mut String, command: &DrawCommand, image_name: Option<usize>) {
        match command {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                border,
                line_width,
            } => {
                let _ = write!(stream, "q\n0 0 0 RG\n{:.2} w\n", line_width);
                if *border == BorderStyle::Dashed {
                    let _ = write!(stream, "[2 2] 0 d\n");
                }
                let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n", x, y, width, height);
            }

            DrawCommand::Text {
                x,
                y,
                text,
                font_size,
            } => {
                let _ = write!(
                    stream,
                    "BT\n0 0 0 rg\n/F0 {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    font_size,
                    x,
                    y,
                    Self::encode_text(text)
                );
            }

            DrawCommand::Image {
                x,
                y,
                width,
                height,
                ..
            } => {
                if let Some(idx) = image_name {
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        width, height, x, y, idx
                    );
                }
            }
        }
    }

    fn check_geometry(command: &DrawCommand) -> Result<(), SinkError> {
        let finite = match command {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                line_width,
                ..
            } => [*x, *y, *width, *height, *line_width].iter().all(|v| v.is_finite()),
            DrawCommand::Text { x, y, font_size, .. } => {
                [*x, *y, *font_size].iter().all(|v| v.is_finite())
            }
            DrawCommand::Image {
                x, y, width, height, ..
            } => [*x, *y, *width, *height].iter().all(|v| v.is_finite()),
        };
        if finite {
            Ok(())
        } else {
            Err(SinkError::InvalidGeometry {
                command: command.kind(),
            })
        }
    }

    fn check_image(image: &CodeImage) -> Result<(), SinkError> {
        let expected = image.width_px as usize * image.height_px as usize;
        if expected == 0 || image.pixels.len() != expected {
            return Err(SinkError::ImageData {
                width: image.width_px,
                height: image.height_px,
                expected,
                actual: image.pixels.len(),
            });
        }
        Ok(())
    }

    /// Write an 8-bit grayscale image as a FlateDecode XObject.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &CodeImage) -> usize {
        let dict = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceGray /BitsPerComponent 8",
            image.width_px, image.height_px
        );
        builder.push(flate_stream(&dict, &image.pixels))
    }

    /// Escape and encode text for a `( ) Tj` string in WinAnsiEncoding.
    ///
    /// Characters outside WinAnsi become `?`.
    fn encode_text(text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            let b = Self::winansi_byte(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    // Octal escape for bytes outside ASCII printable range
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// WinAnsi byte for `ch`, if the font can show it.
    fn winansi_byte(ch: char) -> Option<u8> {
        match ch as u32 {
            cp @ (0x20..=0x7E | 0xA0..=0xFF) => Some(cp as u8),
            _ => WINANSI_HIGH
                .iter()
                .find(|(c, _)| *c == ch)
                .map(|&(_, b)| b),
        }
    }

    fn write_info(&mut self) -> usize {
        let title = self.metadata.title.as_deref().unwrap_or(DEFAULT_TITLE);
        let mut info = String::from("<< ");
        let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
        if let Some(ref author) = self.metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
        }
        if let Some(ref subject) = self.metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::escape_pdf_string(subject));
        }
        let _ = write!(info, "/Producer (cardsheet) /Creator (cardsheet) >>");
        self.builder.push(info.into_bytes())
    }

    /// Serialize all objects into the final PDF byte stream.
    fn write_bytes(&self, info_obj_id: usize) -> Vec<u8> {
        let objects = &self.builder.objects;
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

/// A complete FlateDecode stream object body. `dict` holds any entries
/// besides `/Length` and `/Filter`.
fn flate_stream(dict: &str, raw: &[u8]) -> Vec<u8> {
    let compressed = compress_to_vec_zlib(raw, 6);
    let mut data = Vec::with_capacity(compressed.len() + dict.len() + 64);
    let sep = if dict.is_empty() { "" } else { " " };
    let _ = write!(
        data,
        "<< {}{}/Length {} /Filter /FlateDecode >>\nstream\n",
        dict,
        sep,
        compressed.len()
    );
    data.extend_from_slice(&compressed);
    data.extend_from_slice(b"\nendstream");
    data
}

impl DocumentSink for PdfWriter {
    fn add_page(&mut self, width: f64, height: f64, commands: &[DrawCommand]) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Finished);
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SinkError::InvalidPageSize { width, height });
        }

        // Validate everything before touching the object table, so a
        // rejected page leaves no orphan objects behind.
        for command in commands {
            Self::check_geometry(command)?;
            if let DrawCommand::Image { image, .. } = command {
                Self::check_image(image)?;
            }
        }

        let mut stream = String::new();
        let mut xobjects: Vec<(usize, usize)> = Vec::new();
        for command in commands {
            let image_name = match command {
                DrawCommand::Image { image, .. } => {
                    let obj_id = Self::write_image_xobject(&mut self.builder, image);
                    let name = self.image_count;
                    self.image_count += 1;
                    xobjects.push((name, obj_id));
                    Some(name)
                }
                _ => None,
            };
            Self::write_command(&mut stream, command, image_name);
        }

        let content_obj_id = self.builder.push(flate_stream("", stream.as_bytes()));

        let mut resources = format!("/Font << /F0 {} 0 R >>", FONT_OBJ_ID);
        if !xobjects.is_empty() {
            let entries = xobjects
                .iter()
                .map(|(name, obj_id)| format!("/Im{} {} 0 R", name, obj_id))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(resources, " /XObject << {} >>", entries);
        }

        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << {} >> >>",
            width, height, content_obj_id, resources
        );
        let page_obj_id = self.builder.push(page_dict.into_bytes());
        self.page_obj_ids.push(page_obj_id);
        Ok(())
    }

    fn serialize(&mut self) -> Result<Vec<u8>, SinkError> {
        if self.finished {
            return Err(SinkError::Finished);
        }
        self.finished = true;

        // Write Catalog (object 1)
        self.builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        // Write Pages tree (object 2)
        let kids: String = self
            .page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        self.builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            self.page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = self.write_info();
        Ok(self.write_bytes(info_obj_id))
    }
}
