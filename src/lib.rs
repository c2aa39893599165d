//! # cardsheet
//!
//! Printable QR ID card sheets.
//!
//! Records come in as loose field maps, a template picks which fields go on
//! a card and which one becomes the QR code, and the engine lays them out
//! ten to a page on a fixed 2×5 grid. Every page knows what it holds: its
//! header names the primary-key range of the cards on it.
//!
//! The layout is deterministic. The same records and template always give
//! the same draw commands, and the same bytes out of the PDF writer.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]     — Records, metadata
//!   [template]  — Field list, primary key, projection into card lines
//!       ↓
//!   [layout]    — Pages → slots → wrapped text + code image
//!       ↓          ([text] wrapping, [encoder] QR images)
//!   [pdf]       — Serialize to PDF bytes
//! ```

pub mod encoder;
pub mod error;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod progress;
pub mod run;
pub mod template;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::CardError;
pub use run::GenerationRun;

use encoder::QrEncoder;
use model::CardDocument;
use pdf::PdfWriter;
use progress::{NoProgress, ProgressReporter};

/// Render a card document to PDF bytes.
///
/// This is the primary entry point. Uses the built-in QR encoder and PDF
/// writer and discards progress.
pub fn render(document: &CardDocument) -> Result<Vec<u8>, CardError> {
    render_with_progress(document, &mut NoProgress)
}

/// Like [`render`], streaming progress to `progress`.
pub fn render_with_progress(
    document: &CardDocument,
    progress: &mut dyn ProgressReporter,
) -> Result<Vec<u8>, CardError> {
    let run = GenerationRun::new(&document.records, &document.template)?;
    let mut writer = PdfWriter::new(document.metadata.clone());
    run.generate(&QrEncoder::new(), &mut writer, progress)
}

/// Render a card document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, CardError> {
    let document: CardDocument = serde_json::from_str(json)?;
    render(&document)
}
