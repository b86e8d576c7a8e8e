//! # SheetMusic Aggregate
//!
//! The validated transcription and the session state that owns it.
//!
//! A `SheetMusic` is only ever built by the validator and is never mutated
//! afterwards: a new transcription replaces it as a unit. Pages and measures
//! are derived from its notes on demand (see `paginate`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::note::Note;
use crate::paginate::page_count;

/// Descriptive analysis returned alongside the notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub instrument: String,
    pub complexity: String,
    pub quality: String,
    pub key_detected: String,
    pub tempo_detected: f64,
    pub time_signature_detected: String,
    pub musical_style: String,
    pub dynamic_range: String,
    pub recommendations: String,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            instrument: "unknown".to_string(),
            complexity: "unknown".to_string(),
            quality: "unknown".to_string(),
            key_detected: "unknown".to_string(),
            tempo_detected: 120.0,
            time_signature_detected: "unknown".to_string(),
            musical_style: "unknown".to_string(),
            dynamic_range: "unknown".to_string(),
            recommendations: "unknown".to_string(),
        }
    }
}

/// Bookkeeping from the last validation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingInfo {
    pub original_notes_count: usize,
    pub filtered_notes_count: usize,
    pub confidence_threshold: f64,
}

/// A validated transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMusic {
    pub title: String,
    pub time_signature: String,
    pub key_signature: String,
    pub tempo: f64,
    pub duration: f64,
    pub sample_rate: u32,
    pub notes: Vec<Note>,
    pub analysis: Analysis,
    pub processing_info: ProcessingInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

impl SheetMusic {
    pub fn page_count(&self) -> usize {
        page_count(self.notes.len())
    }
}

/// Session-scoped view state.
///
/// Single writer, last write wins. Readers take a [`snapshot`](Session::snapshot),
/// which stays valid even if the sheet is replaced afterwards.
#[derive(Debug, Default)]
pub struct Session {
    sheet: Option<Arc<SheetMusic>>,
    loading: bool,
    current_page: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current sheet music. Clears the loading flag and returns to page one.
    pub fn set_sheet_music(&mut self, sheet: SheetMusic) {
        tracing::debug!(
            title = %sheet.title,
            notes = sheet.notes.len(),
            "replacing sheet music"
        );
        self.sheet = Some(Arc::new(sheet));
        self.loading = false;
        self.current_page = 0;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn clear(&mut self) {
        self.sheet = None;
        self.loading = false;
        self.current_page = 0;
    }

    pub fn snapshot(&self) -> Option<Arc<SheetMusic>> {
        self.sheet.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.sheet.as_ref().map_or(0, |s| s.page_count())
    }

    /// Jump to `page`, clamped into `[0, page_count - 1]`.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        let last = self.page_count().saturating_sub(1);
        self.current_page = page.min(last);
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to_page(self.current_page.saturating_sub(1))
    }
}
