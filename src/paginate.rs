//! Page and measure grouping.
//!
//! Pages are fixed 32-note windows over the validated note sequence. Each
//! page is drawn as two rows of four 4/4 measures, four notes per measure.
//! Everything here is a pure view over a note slice; nothing is stored.

use serde::Serialize;

use crate::note::Note;

pub const NOTES_PER_PAGE: usize = 32;
pub const NOTES_PER_MEASURE: usize = 4;
pub const MEASURES_PER_ROW: usize = 4;
pub const ROWS_PER_PAGE: usize = 2;
pub const MEASURES_PER_PAGE: usize = MEASURES_PER_ROW * ROWS_PER_PAGE;

/// Number of pages needed for `note_count` notes.
pub fn page_count(note_count: usize) -> usize {
    note_count.div_ceil(NOTES_PER_PAGE)
}

/// The notes on page `index`. Pages past the end are empty.
pub fn page(notes: &[Note], index: usize) -> &[Note] {
    let start = index.saturating_mul(NOTES_PER_PAGE).min(notes.len());
    let end = start.saturating_add(NOTES_PER_PAGE).min(notes.len());
    &notes[start..end]
}

/// Group a page into measures of four notes, at most eight measures.
///
/// Notes past the eighth measure get no measure. They are still part of the
/// page, so they still play.
pub fn measures(page_notes: &[Note]) -> Vec<&[Note]> {
    page_notes
        .chunks(NOTES_PER_MEASURE)
        .take(MEASURES_PER_PAGE)
        .collect()
}

/// Header information shown above a rendered page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-indexed page number
    pub page_number: usize,
    pub total_pages: usize,
    pub total_notes: usize,
    /// 1-indexed position of the first note shown (0 when the page is empty)
    pub first_note: usize,
    /// 1-indexed position of the last note shown
    pub last_note: usize,
}

impl PageInfo {
    pub fn new(notes: &[Note], index: usize) -> Self {
        let shown = page(notes, index).len();
        let start = index.saturating_mul(NOTES_PER_PAGE).min(notes.len());
        Self {
            page_number: index.saturating_add(1),
            total_pages: page_count(notes.len()),
            total_notes: notes.len(),
            first_note: if shown == 0 { 0 } else { start + 1 },
            last_note: start + shown,
        }
    }
}
