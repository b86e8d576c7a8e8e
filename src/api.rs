//! # Public API
//!
//! Entry points that chain the pipeline stages together.
//!
//! ## Functions
//!
//! - [`transcribe()`] - raw service response text to validated sheet music
//! - [`render_page_wav()`] - one page to WAV bytes
//! - [`page_musicxml()`] - one page to MusicXML for an external engraver
//! - [`export_json()`] - the whole validated document as pretty JSON
//!
//! ## Typical Usage
//!
//! ```rust
//! use sheetscribe::{page_musicxml, render_page_wav, transcribe, RenderConfig};
//!
//! let response = r#"```json
//! {
//!   "title": "Arpeggio",
//!   "tempo": 100,
//!   "notes": [
//!     {"pitch": "C4", "duration": "q", "time": 0.0, "confidence": 0.95},
//!     {"pitch": "E4", "duration": "q", "time": 0.6, "confidence": 0.91},
//!     {"pitch": "G4", "duration": "h", "time": 1.2, "confidence": 0.88}
//!   ]
//! }
//! ```"#;
//!
//! let sheet = transcribe(response);
//! let wav = render_page_wav(&sheet, 0, &RenderConfig::default())?;
//! let xml = page_musicxml(&sheet, 0);
//!
//! assert_eq!(sheet.notes.len(), 3);
//! assert_eq!(&wav[0..4], b"RIFF");
//! assert!(xml.contains("<work-title>Arpeggio</work-title>"));
//! # Ok::<(), sheetscribe::SheetError>(())
//! ```

use crate::config::RenderConfig;
use crate::error::SheetError;
use crate::musicxml::page_to_musicxml;
use crate::playback::prepare_page;
use crate::sheet::SheetMusic;
use crate::validate::parse_response;

/// Validate a raw transcription response.
///
/// Never fails. Text without a JSON object yields an empty sheet titled
/// "Analysis Failed - Parse Error".
pub fn transcribe(response: &str) -> SheetMusic {
    let sheet = parse_response(response);
    tracing::info!(
        title = %sheet.title,
        notes = sheet.notes.len(),
        pages = sheet.page_count(),
        "transcription validated"
    );
    sheet
}

/// Render one page to a WAV file in memory.
///
/// # Errors
/// Returns [`SheetError::NoNotesOnPage`] for an empty page.
pub fn render_page_wav(
    sheet: &SheetMusic,
    page_index: usize,
    config: &RenderConfig,
) -> Result<Vec<u8>, SheetError> {
    Ok(prepare_page(sheet, page_index, config)?.wav)
}

/// Render one page to MusicXML. Empty pages give a document with no measures.
pub fn page_musicxml(sheet: &SheetMusic, page_index: usize) -> String {
    page_to_musicxml(sheet, page_index)
}

/// The complete validated document as pretty-printed JSON.
pub fn export_json(sheet: &SheetMusic) -> Result<String, SheetError> {
    Ok(serde_json::to_string_pretty(sheet)?)
}

/// File name for a page's engraved export
pub fn musicxml_file_name(sheet: &SheetMusic, page_index: usize) -> String {
    format!("{}-page-{}-sheet-music.musicxml", sheet.title, page_index + 1)
}

/// File name for a page's audio export
pub fn wav_file_name(sheet: &SheetMusic, page_index: usize) -> String {
    format!("{}-page-{}.wav", sheet.title, page_index + 1)
}

/// File name for the full JSON export
pub fn json_file_name(sheet: &SheetMusic) -> String {
    format!("{}-all-notes.json", sheet.title)
}
