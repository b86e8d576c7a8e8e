use serde::Serialize;
use sheetscribe::{RenderConfig, SheetError, SheetMusic};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaybackError {
    message: String,
    page: Option<usize>,
}

fn error_to_playback_error(e: SheetError) -> PlaybackError {
    match e {
        SheetError::NoNotesOnPage { page } | SheetError::RenderTooLong { page, .. } => {
            PlaybackError {
                message: e.to_string(),
                page: Some(page + 1),
            }
        }
        other => PlaybackError {
            message: other.to_string(),
            page: None,
        },
    }
}

fn to_js_error(e: SheetError) -> JsValue {
    let error = error_to_playback_error(e);
    match serde_json::to_string(&error) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&error.message),
    }
}

// Validation is idempotent, so callers may pass either the raw service
// response or JSON previously returned by `transcribe`.
fn load(source: &str) -> SheetMusic {
    sheetscribe::transcribe(source)
}

/// Validate a transcription response and return the sheet music as JSON
#[wasm_bindgen]
pub fn transcribe(response: &str) -> Result<String, JsValue> {
    sheetscribe::export_json(&load(response)).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn page_count(sheet: &str) -> usize {
    load(sheet).page_count()
}

/// Page header: page number, total pages and the note range shown
#[wasm_bindgen]
pub fn page_info(sheet: &str, page: usize) -> Result<JsValue, JsValue> {
    let sheet = load(sheet);
    let info = sheetscribe::PageInfo::new(&sheet.notes, page);
    serde_wasm_bindgen::to_value(&info).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Engrave a page into placed measures: each carries its stave layout and
/// four tickables, ready for a staff renderer on the JavaScript side
#[wasm_bindgen]
pub fn engrave_page(sheet: &str, page: usize) -> Result<JsValue, JsValue> {
    let sheet = load(sheet);
    let measures = sheetscribe::layout_page(sheetscribe::page(&sheet.notes, page));
    serde_wasm_bindgen::to_value(&measures).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Canvas size for one page as `[width, height]`
#[wasm_bindgen]
pub fn page_dimensions() -> Vec<u32> {
    let (width, height) = sheetscribe::page_dimensions();
    vec![width, height]
}

/// Render one page to WAV bytes
#[wasm_bindgen]
pub fn render_page_wav(
    sheet: &str,
    page: usize,
    sample_rate: Option<u32>,
    tempo: Option<f64>,
) -> Result<Vec<u8>, JsValue> {
    let config = RenderConfig::new(
        sample_rate.unwrap_or(RenderConfig::default().sample_rate),
        tempo,
    )
    .map_err(to_js_error)?;
    sheetscribe::render_page_wav(&load(sheet), page, &config).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn page_musicxml(sheet: &str, page: usize) -> String {
    sheetscribe::page_musicxml(&load(sheet), page)
}
