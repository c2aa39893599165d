//! # Page Break Decisions
//!
//! Cards never split, and every page holds the same number of slots, so
//! breaking is pure arithmetic: full pages in input order, with whatever is
//! left over on the last page.

use std::ops::Range;

/// Number of pages needed for `total` records at `capacity` per page.
///
/// `capacity` must be non-zero.
pub fn page_count(total: usize, capacity: usize) -> usize {
    total.div_ceil(capacity)
}

/// Record index ranges for each page, in order.
///
/// Every range but the last has exactly `capacity` records; the last has
/// `1..=capacity`. Zero records give zero pages.
pub fn page_ranges(total: usize, capacity: usize) -> Vec<Range<usize>> {
    (0..page_count(total, capacity))
        .map(|page| {
            let start = page * capacity;
            start..(start + capacity).min(total)
        })
        .collect()
}
