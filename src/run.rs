//! # Generation Runs
//!
//! A [`GenerationRun`] is everything one batch needs: the records in print
//! order, the template, and the page capacity. It is validated once on
//! construction and borrowed, never mutated, for the rest of the run. There
//! is no process-wide state, so runs are independent and re-entrant.

use crate::encoder::CodeEncoder;
use crate::error::CardError;
use crate::layout::grid::SlotGrid;
use crate::layout::{LayoutEngine, LayoutPage};
use crate::model::Record;
use crate::pdf::DocumentSink;
use crate::progress::ProgressReporter;
use crate::template::Template;

/// Cards per page on the standard sheet.
pub const DEFAULT_CAPACITY: usize = 10;

/// One validated batch of records and the template they are printed with.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRun<'a> {
    records: &'a [Record],
    template: &'a Template,
    capacity: usize,
}

impl<'a> GenerationRun<'a> {
    /// Validate `template` and bind it to `records` at the default capacity.
    pub fn new(records: &'a [Record], template: &'a Template) -> Result<Self, CardError> {
        Self::with_capacity(records, template, DEFAULT_CAPACITY)
    }

    /// Like [`GenerationRun::new`] with an explicit cards-per-page count.
    ///
    /// The capacity must fit the slot grid.
    pub fn with_capacity(
        records: &'a [Record],
        template: &'a Template,
        capacity: usize,
    ) -> Result<Self, CardError> {
        template.validate()?;
        let max = SlotGrid::default().slots();
        if capacity == 0 || capacity > max {
            return Err(CardError::InvalidCapacity { capacity, max });
        }
        Ok(GenerationRun {
            records,
            template,
            capacity,
        })
    }

    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    pub fn template(&self) -> &'a Template {
        self.template
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lay out the run, hand every page to `sink`, and serialize.
    ///
    /// Nothing is returned unless every page was accepted and serialization
    /// succeeded; a failing sink fails the whole run.
    pub fn generate(
        &self,
        encoder: &dyn CodeEncoder,
        sink: &mut dyn DocumentSink,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Vec<u8>, CardError> {
        let pages = LayoutEngine::new().paginate(self, encoder, progress);
        let bytes = emit(&pages, sink)?;

        let cards: usize = pages.iter().map(|p| p.records.len()).sum();
        let missing: usize = pages.iter().map(|p| p.code_failures).sum();
        log::info!(
            "rendered {} cards on {} pages ({} without code), {} bytes",
            cards,
            pages.len(),
            missing,
            bytes.len()
        );

        progress.report(100.0, Some("Done"));
        Ok(bytes)
    }
}

/// Send laid-out pages to a sink, in order, then serialize.
pub fn emit(pages: &[LayoutPage], sink: &mut dyn DocumentSink) -> Result<Vec<u8>, CardError> {
    for page in pages {
        sink.add_page(page.width, page.height, &page.commands)?;
    }
    Ok(sink.serialize()?)
}
