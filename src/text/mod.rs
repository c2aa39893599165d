//! # Text Layout
//!
//! Greedy word wrapping against an estimated text width.
//!
//! Cards use a single built-in font and no real metrics, so width is a
//! per-character heuristic. [`CHAR_WIDTH_FACTOR`] is the only place that
//! heuristic lives: wrapping, vertical centering on a card, and header
//! centering all measure through [`estimate_width`], so they can never
//! disagree about how wide a line is.

/// Average glyph advance as a fraction of the font size.
pub const CHAR_WIDTH_FACTOR: f64 = 0.55;

/// Estimated rendered width of `text` at `font_size` points.
pub fn estimate_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * CHAR_WIDTH_FACTOR
}

/// Break `line` into sub-lines that fit `max_width`.
///
/// Words are whitespace-delimited and never split. A candidate line is
/// accepted while its estimated width is strictly below `max_width`;
/// otherwise the current line is closed and the word starts the next one.
/// A single word wider than `max_width` becomes its own overflowing line.
///
/// Blank input produces no lines.
pub fn wrap(line: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if estimate_width(&candidate, font_size) < max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
