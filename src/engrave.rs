//! # Notation Adapter
//!
//! Turns grouped measures into the tick sequence an external engraver
//! draws.
//!
//! ## Purpose
//! The engraver wants one complete 4/4 voice per measure: exactly four
//! quarter-note tickables. Transcribed notes carry their own durations and
//! may be unspellable, so the adapter simplifies:
//! 1. Every note with a known staff key becomes a quarter note
//! 2. Unknown pitches are skipped and do not take a slot
//! 3. Short measures are padded with quarter rests
//! 4. Long measures keep their first four notes
//!
//! Notes lost here are only lost from the staff. Playback works from the
//! page slice, not from measures.
//!
//! ## Failure Handling
//! Nothing in this module reports an error to its caller. A measure that
//! cannot be converted, or that the [`StaffRenderer`] refuses, is drawn as
//! four rests and the rest of the page carries on.
//!
//! ## Layout
//! Measures are placed on a 4-column, 2-row grid. The first measure of each
//! row carries the treble clef and the 4/4 time signature.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::error::SheetError;
use crate::note::{Accidental, Note, Pitch};
use crate::paginate::{measures, MEASURES_PER_ROW, ROWS_PER_PAGE};

/// Engraver ticks per quarter note
pub const RESOLUTION: u32 = 16384;

/// Quarter-note slots per measure
pub const BEATS_PER_MEASURE: usize = 4;

const MEASURE_TICKS: u32 = RESOLUTION * BEATS_PER_MEASURE as u32;

/// Staff position rests are drawn at
const REST_KEY: &str = "b/4";

pub const STAVE_WIDTH: u32 = 180;
pub const STAVE_HEIGHT: u32 = 120;
const STAVE_LEFT: u32 = 10;
const STAVE_TOP: u32 = 40;

/// An all-rest measure
pub const REST_MEASURE: [Tickable; BEATS_PER_MEASURE] = [Tickable::Rest; BEATS_PER_MEASURE];

/// One quarter-note slot on the staff
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tickable {
    Note {
        /// Engraver key spelling, e.g. `"c#/4"`
        key: &'static str,
        pitch: Pitch,
        /// Explicit accidental marker (`"#"` for sharps)
        accidental: Option<&'static str>,
    },
    Rest,
}

impl Tickable {
    pub fn ticks(&self) -> u32 {
        RESOLUTION
    }

    pub fn duration_class(&self) -> &'static str {
        "quarter"
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Tickable::Rest)
    }
}

impl Serialize for Tickable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Tickable", 3)?;
        match self {
            Tickable::Note {
                key, accidental, ..
            } => {
                state.serialize_field("keys", &[key])?;
                state.serialize_field("duration", "q")?;
                match accidental {
                    Some(accidental) => state.serialize_field("accidental", accidental)?,
                    None => state.skip_field("accidental")?,
                }
            }
            Tickable::Rest => {
                state.serialize_field("keys", &[REST_KEY])?;
                state.serialize_field("duration", "qr")?;
                state.skip_field("accidental")?;
            }
        }
        state.end()
    }
}

/// Convert one measure's notes into exactly four tickables.
///
/// # Example
/// ```rust
/// use sheetscribe::{to_engraveable, Note, NoteDuration, Tickable};
///
/// let notes = vec![
///     Note::new("C#4", NoteDuration::Half, 0.0),
///     Note::new("H9", NoteDuration::Quarter, 0.5),
/// ];
/// let ticks = to_engraveable(&notes);
///
/// assert_eq!(ticks.len(), 4);
/// assert!(matches!(ticks[0], Tickable::Note { key: "c#/4", accidental: Some("#"), .. }));
/// assert!(ticks[1..].iter().all(|t| t.is_rest()));
/// ```
pub fn to_engraveable(notes: &[Note]) -> [Tickable; BEATS_PER_MEASURE] {
    match try_engrave(notes) {
        Ok(ticks) => ticks,
        Err(message) => {
            tracing::warn!(%message, "could not convert measure, using rests");
            REST_MEASURE
        }
    }
}

fn try_engrave(notes: &[Note]) -> Result<[Tickable; BEATS_PER_MEASURE], String> {
    let mut ticks = Vec::with_capacity(BEATS_PER_MEASURE);
    let mut total_ticks = 0;

    for note in notes {
        if total_ticks >= MEASURE_TICKS {
            break;
        }

        let Some((pitch, key)) = note
            .parsed_pitch()
            .and_then(|p| p.render_key().map(|key| (p, key)))
        else {
            tracing::debug!(pitch = %note.pitch, "no staff spelling, skipping note");
            continue;
        };

        let accidental = (pitch.accidental == Accidental::Sharp).then_some("#");
        let tick = Tickable::Note {
            key,
            pitch,
            accidental,
        };
        total_ticks += tick.ticks();
        ticks.push(tick);
    }

    while total_ticks < MEASURE_TICKS {
        total_ticks += Tickable::Rest.ticks();
        ticks.push(Tickable::Rest);
    }

    let count = ticks.len();
    ticks
        .try_into()
        .map_err(|_| format!("measure filled with {} tickables", count))
}

/// Convert every visible measure of a page.
pub fn engrave_page(page_notes: &[Note]) -> Vec<[Tickable; BEATS_PER_MEASURE]> {
    measures(page_notes)
        .into_iter()
        .map(to_engraveable)
        .collect()
}

/// Where a measure sits on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaveLayout {
    /// 0-indexed measure position on the page
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    /// Clef and time signature are only drawn at the start of a row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clef: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<&'static str>,
}

impl StaveLayout {
    pub fn for_measure(index: usize) -> Self {
        let row = index / MEASURES_PER_ROW;
        let column = index % MEASURES_PER_ROW;
        let starts_row = column == 0;
        Self {
            index,
            row,
            column,
            x: STAVE_LEFT + column as u32 * STAVE_WIDTH,
            y: STAVE_TOP + row as u32 * STAVE_HEIGHT,
            width: STAVE_WIDTH - 10,
            clef: starts_row.then_some("treble"),
            time_signature: starts_row.then_some("4/4"),
        }
    }
}

/// A measure ready to draw: its tickables and where they go
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngravedMeasure {
    pub layout: StaveLayout,
    pub ticks: [Tickable; BEATS_PER_MEASURE],
}

/// Engrave every visible measure of a page and place it on the grid.
pub fn layout_page(page_notes: &[Note]) -> Vec<EngravedMeasure> {
    engrave_page(page_notes)
        .into_iter()
        .enumerate()
        .map(|(i, ticks)| EngravedMeasure {
            layout: StaveLayout::for_measure(i),
            ticks,
        })
        .collect()
}

/// Width and height of a rendered page
pub fn page_dimensions() -> (u32, u32) {
    (
        MEASURES_PER_ROW as u32 * STAVE_WIDTH + 50,
        ROWS_PER_PAGE as u32 * STAVE_HEIGHT + 100,
    )
}

/// The external engraver.
///
/// Implementations draw a single measure. Returning an error makes the page
/// renderer redraw that measure as rests.
pub trait StaffRenderer {
    fn draw_measure(
        &mut self,
        layout: &StaveLayout,
        ticks: &[Tickable; BEATS_PER_MEASURE],
    ) -> Result<(), SheetError>;
}

/// Draw every visible measure of a page. Returns the number of measures drawn.
pub fn render_page<R: StaffRenderer + ?Sized>(renderer: &mut R, page_notes: &[Note]) -> usize {
    let page = layout_page(page_notes);

    for EngravedMeasure { layout, ticks } in &page {
        let measure = layout.index + 1;
        if let Err(e) = renderer.draw_measure(layout, ticks) {
            tracing::warn!(measure, error = %e, "measure failed to render, drawing rests");
            if let Err(e) = renderer.draw_measure(layout, &REST_MEASURE) {
                tracing::warn!(measure, error = %e, "rest measure failed to render");
            }
        }
    }

    page.len()
}
