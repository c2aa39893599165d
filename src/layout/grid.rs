//! # Slot Grid
//!
//! Fixed card grid geometry. Every page is divided into the same
//! `columns × rows` cells below a header band. Coordinates use the PDF
//! convention: origin at the bottom-left of the page, y grows upward, so
//! row 0 is the topmost row and has the largest y.

/// An axis-aligned rectangle in page coordinates (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

/// Grid shape and margins. All distances in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGrid {
    pub columns: usize,
    pub rows: usize,
    /// Left, right and bottom page margin.
    pub outer_margin: f64,
    /// Band reserved at the top of the page for the header.
    pub header_margin: f64,
    /// Space left between neighbouring cards.
    pub gutter: f64,
}

impl Default for SlotGrid {
    fn default() -> Self {
        SlotGrid {
            columns: 2,
            rows: 5,
            outer_margin: 20.0,
            header_margin: 30.0,
            gutter: 10.0,
        }
    }
}

impl SlotGrid {
    /// Number of slots on one page.
    pub fn slots(&self) -> usize {
        self.columns * self.rows
    }

    /// Full cell size before the gutter inset.
    pub fn cell_size(&self, page_width: f64, page_height: f64) -> (f64, f64) {
        let w = (page_width - 2.0 * self.outer_margin) / self.columns as f64;
        let h = (page_height - self.outer_margin - self.header_margin) / self.rows as f64;
        (w, h)
    }

    /// Bounding box for the card at `slot_index`, inset by the gutter.
    ///
    /// Slots fill left to right, then top to bottom.
    pub fn layout(&self, page_width: f64, page_height: f64, slot_index: usize) -> BoundingBox {
        let (cell_w, cell_h) = self.cell_size(page_width, page_height);
        let row = slot_index / self.columns;
        let col = slot_index % self.columns;

        BoundingBox {
            x: self.outer_margin + col as f64 * cell_w,
            y: page_height - self.header_margin - (row + 1) as f64 * cell_h,
            width: cell_w - self.gutter,
            height: cell_h - self.gutter,
        }
    }
}

/// [`SlotGrid::layout`] on the default 2×5 grid.
pub fn layout_slot(page_width: f64, page_height: f64, slot_index: usize) -> BoundingBox {
    SlotGrid::default().layout(page_width, page_height, slot_index)
}
