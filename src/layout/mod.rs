//! # Card Sheet Layout
//!
//! This is the heart of cardsheet.
//!
//! Layout never works on a free-flowing canvas. The page is fixed, the grid
//! is fixed, and every record gets exactly one slot:
//!
//! 1. Split the records into pages of `capacity` in input order
//! 2. For each slot on a page: compute its box, project the record onto the
//!    template, wrap the lines, draw the card
//! 3. Close the page with a header naming its primary-key range
//!
//! All geometry is in PDF user space (points, bottom-left origin), so the
//! draw commands go to the document sink unchanged.

pub mod card;
pub mod grid;
pub mod page_break;

use std::ops::Range;

use serde::Serialize;

use crate::encoder::{CodeEncoder, CodeImage};
use crate::progress::ProgressReporter;
use crate::run::GenerationRun;
use crate::template::MISSING_KEY;
use crate::text::estimate_width;

use card::render_card;
use grid::SlotGrid;
use page_break::page_ranges;

/// A4 in whole points, as the sheets have always been printed.
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;

pub const HEADER_FONT_SIZE: f64 = 10.0;
/// Header baseline distance from the top edge.
pub const HEADER_OFFSET: f64 = 20.0;

/// How a rectangle's outline is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BorderStyle {
    Solid,
    /// Two on, two off. Marks the cutting line.
    Dashed,
}

/// A single drawing primitive, in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DrawCommand {
    /// Stroke a rectangle outline.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        border: BorderStyle,
        line_width: f64,
    },
    /// Draw one line of text with its baseline at `y`.
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
    },
    /// Place an image scaled into the given box.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(skip_serializing)]
        image: CodeImage,
    },
}

impl DrawCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Rect { .. } => "Rect",
            DrawCommand::Text { .. } => "Text",
            DrawCommand::Image { .. } => "Image",
        }
    }
}

/// A fully laid-out page ready for the document sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPage {
    /// Zero-based page index.
    pub index: usize,
    pub width: f64,
    pub height: f64,
    /// Indices of the records placed on this page, in slot order.
    pub records: Range<usize>,
    pub header: String,
    pub commands: Vec<DrawCommand>,
    /// Cards on this page drawn without a code image.
    pub code_failures: usize,
}

/// `"Page <n> of <total> | <key> Range: <first> - <last>"`.
///
/// The range is first and last in input order, not sorted.
pub fn page_header(page_number: usize, total_pages: usize, primary_key: &str, first: &str, last: &str) -> String {
    format!(
        "Page {} of {} | {} Range: {} - {}",
        page_number, total_pages, primary_key, first, last
    )
}

/// Header text command, centered horizontally near the top edge.
pub fn header_command(header: &str, page_width: f64, page_height: f64) -> DrawCommand {
    DrawCommand::Text {
        x: (page_width - estimate_width(header, HEADER_FONT_SIZE)) / 2.0,
        y: page_height - HEADER_OFFSET,
        text: header.to_string(),
        font_size: HEADER_FONT_SIZE,
    }
}

/// The pagination driver.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    grid: SlotGrid,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main entry point: lay out every record of `run` into pages.
    ///
    /// Reports 0% before the first card and `placed / total * 100` after
    /// each card's code is placed. Never fails: encoder failures are
    /// counted on the page and the card is drawn without a code.
    pub fn paginate(
        &self,
        run: &GenerationRun<'_>,
        encoder: &dyn CodeEncoder,
        progress: &mut dyn ProgressReporter,
    ) -> Vec<LayoutPage> {
        let records = run.records();
        let template = run.template();
        let total = records.len();
        let ranges = page_ranges(total, run.capacity());
        let total_pages = ranges.len();

        progress.report(0.0, Some("Preparing PDF..."));

        let mut pages = Vec::with_capacity(total_pages);
        let mut placed = 0usize;

        for (index, range) in ranges.into_iter().enumerate() {
            let mut commands = Vec::new();
            let mut code_failures = 0;
            let mut first_key: Option<String> = None;
            let mut last_key = String::new();

            for (slot, record_index) in range.clone().enumerate() {
                let bbox = self.grid.layout(PAGE_WIDTH, PAGE_HEIGHT, slot);
                let projection = template.project(&records[record_index]);
                let card = render_card(&bbox, &projection.lines, &projection.code_value, encoder);

                if let Some(err) = card.code_error {
                    code_failures += 1;
                    log::warn!(
                        "record {} ({} = {}): card drawn without code: {}",
                        record_index,
                        template.primary_key,
                        projection.key_value,
                        err
                    );
                }
                commands.extend(card.commands);

                if first_key.is_none() {
                    first_key = Some(projection.key_value.clone());
                }
                last_key = projection.key_value;

                placed += 1;
                let percent = placed as f64 / total as f64 * 100.0;
                progress.report(
                    percent,
                    Some(&format!("Generating PDF... {}%", percent.round())),
                );
            }

            let header = page_header(
                index + 1,
                total_pages,
                &template.primary_key,
                first_key.as_deref().unwrap_or(MISSING_KEY),
                &last_key,
            );
            commands.push(header_command(&header, PAGE_WIDTH, PAGE_HEIGHT));

            log::debug!(
                "page {}/{}: records {}..{}, {} commands",
                index + 1,
                total_pages,
                range.start,
                range.end,
                commands.len()
            );

            pages.push(LayoutPage {
                index,
                width: PAGE_WIDTH,
                height: PAGE_HEIGHT,
                records: range,
                header,
                commands,
                code_failures,
            });
        }

        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::QrEncoder;
    use crate::model::Record;
    use crate::progress::NoProgress;
    use crate::template::Template;

    fn households(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::new()
                    .with("HH ID", format!("HH{:04}", i))
                    .with("Name", format!("Member {}", i))
            })
            .collect()
    }

    #[test]
    fn page_header_format() {
        assert_eq!(
            page_header(3, 3, "HH ID", "HH0020", "HH0022"),
            "Page 3 of 3 | HH ID Range: HH0020 - HH0022"
        );
    }

    #[test]
    fn header_is_centered_with_shared_width_heuristic() {
        let text = "Page 1 of 1 | HH ID Range: A - B";
        match header_command(text, PAGE_WIDTH, PAGE_HEIGHT) {
            DrawCommand::Text { x, y, font_size, .. } => {
                let w = text.chars().count() as f64 * 10.0 * crate::text::CHAR_WIDTH_FACTOR;
                assert!((x - (PAGE_WIDTH - w) / 2.0).abs() < 1e-9);
                assert_eq!(y, PAGE_HEIGHT - 20.0);
                assert_eq!(font_size, 10.0);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn header_is_last_command_on_each_page() {
        let records = households(12);
        let template = Template::default();
        let run = GenerationRun::new(&records, &template).unwrap();
        let pages = LayoutEngine::new().paginate(&run, &QrEncoder::new(), &mut NoProgress);
        assert_eq!(pages.len(), 2);
        for page in &pages {
            match page.commands.last() {
                Some(DrawCommand::Text { text, .. }) => assert_eq!(text, &page.header),
                other => panic!("expected header, got {:?}", other),
            }
        }
        assert_eq!(pages[1].header, "Page 2 of 2 | HH ID Range: HH0010 - HH0011");
    }

    #[test]
    fn every_card_gets_border_and_code() {
        let records = households(10);
        let template = Template::default();
        let run = GenerationRun::new(&records, &template).unwrap();
        let pages = LayoutEngine::new().paginate(&run, &QrEncoder::new(), &mut NoProgress);
        let page = &pages[0];
        let count = |kind: &str| page.commands.iter().filter(|c| c.kind() == kind).count();
        assert_eq!(count("Rect"), 10);
        assert_eq!(count("Image"), 10);
        assert_eq!(page.code_failures, 0);
    }

    #[test]
    fn missing_keys_count_as_code_failures() {
        let records = vec![Record::new().with("Name", "Jane Doe"), households(1).remove(0)];
        let template = Template::default();
        let run = GenerationRun::new(&records, &template).unwrap();
        let pages = LayoutEngine::new().paginate(&run, &QrEncoder::new(), &mut NoProgress);
        assert_eq!(pages[0].code_failures, 1);
        assert_eq!(pages[0].header, "Page 1 of 1 | HH ID Range: N/A - HH0000");
    }
}
