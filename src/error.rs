//! Structured error types for the card sheet engine.
//!
//! Only the boundaries can fail: template validation, the code encoder, and
//! the document sink. Geometry and wrapping are total. Of these, template
//! and sink failures abort the run; encoder failures degrade a single card.

use thiserror::Error;

/// Why a template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template has no columns")]
    EmptyColumns,
    #[error("template has {count} columns, at most {max} are allowed")]
    TooManyColumns { count: usize, max: usize },
    #[error("column '{name}' appears more than once")]
    DuplicateColumn { name: String },
    #[error("primary key '{primary_key}' is not one of the template columns")]
    PrimaryKeyNotInColumns { primary_key: String },
}

/// The code encoder could not produce an image. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("nothing to encode: the value is empty")]
    EmptyValue,
    #[error("{size}px cannot hold {modules} modules")]
    TooSmall { size: u32, modules: u32 },
    #[error("QR encoding failed: {0}")]
    Qr(qrcode::types::QrError),
}

/// The document sink rejected a page or could not serialize.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    #[error("non-finite coordinate in {command} command")]
    InvalidGeometry { command: &'static str },
    #[error("image buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    ImageData {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("page size {width}x{height} is not a valid media box")]
    InvalidPageSize { width: f64, height: f64 },
    #[error("sink already serialized")]
    Finished,
}

/// The unified error type returned by all public cardsheet API functions.
#[derive(Debug, Error)]
pub enum CardError {
    /// JSON input failed to parse as a valid card document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// The template failed validation; nothing was rendered.
    #[error("Invalid template: {0}")]
    TemplateInvalid(#[from] TemplateError),
    /// Page capacity outside the slot grid.
    #[error("page capacity {capacity} is outside 1..={max}")]
    InvalidCapacity { capacity: usize, max: usize },
    /// The document sink failed; the whole output is discarded.
    #[error("Render error: {0}")]
    SinkFailure(#[from] SinkError),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for CardError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the card document schema. Expected { \"records\": [...] } with an optional \"template\".".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        CardError::ParseError { source: e, hint }
    }
}
