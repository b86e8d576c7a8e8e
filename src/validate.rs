//! # Transcription Validator
//!
//! Decodes the untrusted JSON document returned by the transcription service
//! into a well-formed [`SheetMusic`].
//!
//! ## Purpose
//! The service is a generative model. Its output usually follows the
//! requested schema, but any field may be missing, mistyped or out of range.
//! Validation never fails: every field has a default, and notes that cannot
//! be trusted are dropped.
//!
//! ## Rules
//!
//! ### Numbers
//! Numeric fields accept numbers and numeric strings. Zero, `null`, `NaN`,
//! infinities and anything non-numeric fall back to the field default.
//! Fields that only make sense as positive values (tempo, durations, sample
//! rate) also fall back when negative.
//!
//! ### Notes
//! - A note needs a non-empty `pitch` and a `time` key (a `null` time counts
//!   as present and becomes 0)
//! - `confidence`, when present, must be at least 0.7
//! - Pitch is uppercased, velocity is clamped to 1..=127, negative times
//!   become 0, unknown durations become quarter notes
//! - Notes are sorted by onset and capped at 150
//!
//! ## Entry Points
//! - [`validate()`] for an already-parsed JSON value
//! - [`parse_response()`] for raw response text that may wrap the JSON in
//!   markdown fences or prose

use serde_json::{json, Map, Value};

use crate::error::SheetError;
use crate::note::{Note, NoteDuration};
use crate::sheet::{Analysis, ProcessingInfo, SheetMusic};

/// Notes reported below this confidence are discarded
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Upper bound on the number of notes kept from one transcription
pub const MAX_NOTES: usize = 150;

pub const DEFAULT_TEMPO: f64 = 120.0;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
const DEFAULT_PIECE_DURATION: f64 = 30.0;
const DEFAULT_CONFIDENCE: f64 = 0.8;
const DEFAULT_VELOCITY: f64 = 80.0;
const UNKNOWN: &str = "unknown";

/// Validate a transcription document.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use sheetscribe::validate;
///
/// let sheet = validate(&json!({
///     "tempo": "96",
///     "notes": [
///         {"pitch": "e4", "duration": "q", "time": 0.5},
///         {"pitch": "c4", "duration": "h", "time": 0.0, "confidence": 0.95},
///         {"pitch": "G4", "duration": "q", "time": 1.0, "confidence": 0.2}
///     ]
/// }));
///
/// assert_eq!(sheet.tempo, 96.0);
/// assert_eq!(sheet.notes.len(), 2);
/// assert_eq!(sheet.notes[0].pitch, "C4");
/// assert_eq!(sheet.notes[1].pitch, "E4");
/// ```
pub fn validate(value: &Value) -> SheetMusic {
    let empty = Map::new();
    let doc = value.as_object().unwrap_or(&empty);

    let raw_notes = doc.get("notes").and_then(Value::as_array);
    let original_notes_count = raw_notes.map_or(0, |n| n.len());

    let mut notes: Vec<Note> = raw_notes
        .map(|raw| raw.iter().filter_map(normalize_note).collect())
        .unwrap_or_default();
    notes.sort_by(|a, b| a.time.total_cmp(&b.time));
    notes.truncate(MAX_NOTES);

    if notes.len() < original_notes_count {
        tracing::debug!(
            original = original_notes_count,
            kept = notes.len(),
            "dropped low-confidence or malformed notes"
        );
    }

    let processing_info = ProcessingInfo {
        original_notes_count,
        filtered_notes_count: notes.len(),
        confidence_threshold: CONFIDENCE_THRESHOLD,
    };

    SheetMusic {
        title: text_or(doc.get("title"), "Audio Analysis"),
        time_signature: text_or(doc.get("timeSignature"), "4/4"),
        key_signature: text_or(doc.get("keySignature"), "C"),
        tempo: positive_or(doc.get("tempo"), DEFAULT_TEMPO),
        duration: positive_or(doc.get("duration"), DEFAULT_PIECE_DURATION),
        sample_rate: sample_rate_or_default(doc.get("sampleRate")),
        notes,
        analysis: validate_analysis(doc.get("analysis")),
        processing_info,
        model_used: doc
            .get("modelUsed")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

fn validate_analysis(value: Option<&Value>) -> Analysis {
    let Some(analysis) = value.and_then(Value::as_object) else {
        return Analysis::default();
    };

    Analysis {
        instrument: text_or(analysis.get("instrument"), UNKNOWN),
        complexity: text_or(analysis.get("complexity"), UNKNOWN),
        quality: text_or(analysis.get("quality"), UNKNOWN),
        key_detected: text_or(analysis.get("keyDetected"), UNKNOWN),
        tempo_detected: positive_or(analysis.get("tempoDetected"), DEFAULT_TEMPO),
        time_signature_detected: text_or(analysis.get("timeSignatureDetected"), UNKNOWN),
        musical_style: text_or(analysis.get("musicalStyle"), UNKNOWN),
        dynamic_range: text_or(analysis.get("dynamicRange"), UNKNOWN),
        recommendations: text_or(analysis.get("recommendations"), UNKNOWN),
    }
}

/// Filter and normalize one raw note. `None` means the note is dropped.
fn normalize_note(raw: &Value) -> Option<Note> {
    let note = raw.as_object()?;

    let pitch = match note.get("pitch")? {
        Value::String(s) if !s.is_empty() => s.to_uppercase(),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => n.to_string(),
        _ => return None,
    };

    let time = note.get("time")?;

    if let Some(confidence) = note.get("confidence") {
        match to_number(confidence) {
            Some(c) if c >= CONFIDENCE_THRESHOLD => {}
            _ => return None,
        }
    }

    let time = number_or(Some(time), 0.0);
    let time = if time > 0.0 { time } else { 0.0 };

    let duration = note
        .get("duration")
        .and_then(Value::as_str)
        .map(NoteDuration::from_code)
        .unwrap_or_default();

    let confidence = number_or(note.get("confidence"), DEFAULT_CONFIDENCE).min(1.0);
    let velocity = number_or(note.get("velocity"), DEFAULT_VELOCITY)
        .round()
        .clamp(1.0, 127.0) as u8;

    Some(Note {
        pitch,
        duration,
        time,
        confidence,
        velocity,
    })
}

/// Numeric coercion. `None` when the value has no numeric reading.
fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => return None,
    };
    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

/// Coerced number, or `default` when missing, unreadable, or zero.
fn number_or(value: Option<&Value>, default: f64) -> f64 {
    match value.and_then(to_number) {
        Some(n) if n != 0.0 => n,
        _ => default,
    }
}

fn positive_or(value: Option<&Value>, default: f64) -> f64 {
    let n = number_or(value, default);
    if n > 0.0 {
        n
    } else {
        default
    }
}

fn sample_rate_or_default(value: Option<&Value>) -> u32 {
    let rate = positive_or(value, DEFAULT_SAMPLE_RATE as f64).round();
    if rate >= 1.0 && rate <= u32::MAX as f64 {
        rate as u32
    } else {
        DEFAULT_SAMPLE_RATE
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// Pull the JSON object out of raw response text.
///
/// Strips markdown code fences and takes everything from the first `{` to
/// the last `}`.
pub fn extract_json(text: &str) -> Result<Value, SheetError> {
    let clean = text.trim().replace("```json", "").replace("```", "");

    let start = clean
        .find('{')
        .ok_or_else(|| SheetError::ResponseError("no JSON object found".to_string()))?;
    let end = clean
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| SheetError::ResponseError("unterminated JSON object".to_string()))?;

    Ok(serde_json::from_str(&clean[start..=end])?)
}

/// Validate raw response text, substituting an empty "parse error" sheet
/// when no JSON can be recovered.
pub fn parse_response(text: &str) -> SheetMusic {
    match extract_json(text) {
        Ok(value) => validate(&value),
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse transcription response");
            validate(&parse_failure_document(text))
        }
    }
}

fn parse_failure_document(text: &str) -> Value {
    let preview: String = text.chars().take(200).collect();
    json!({
        "title": "Analysis Failed - Parse Error",
        "timeSignature": "4/4",
        "keySignature": "C",
        "tempo": DEFAULT_TEMPO,
        "duration": DEFAULT_PIECE_DURATION,
        "notes": [],
        "analysis": {
            "quality": "parsing_failed",
            "timeSignatureDetected": "4/4",
            "recommendations": format!("Could not parse AI response. Raw response: {}...", preview),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_note(pitch: &str, time: f64) -> Value {
        json!({ "pitch": pitch, "duration": "q", "time": time, "confidence": 0.9, "velocity": 80 })
    }

    #[test]
    fn test_empty_document_gets_defaults() {
        let sheet = validate(&json!({}));
        assert_eq!(sheet.title, "Audio Analysis");
        assert_eq!(sheet.time_signature, "4/4");
        assert_eq!(sheet.key_signature, "C");
        assert_eq!(sheet.tempo, 120.0);
        assert_eq!(sheet.duration, 30.0);
        assert_eq!(sheet.sample_rate, 44100);
        assert!(sheet.notes.is_empty());
        assert_eq!(sheet.analysis, Analysis::default());
        assert_eq!(sheet.processing_info.original_notes_count, 0);
    }

    #[test]
    fn test_non_object_input() {
        for value in [json!(null), json!([1, 2, 3]), json!("notes"), json!(42)] {
            let sheet = validate(&value);
            assert!(sheet.notes.is_empty());
            assert_eq!(sheet.tempo, 120.0);
        }
    }

    #[test]
    fn test_non_array_notes() {
        let sheet = validate(&json!({ "notes": { "pitch": "C4", "time": 0 } }));
        assert!(sheet.notes.is_empty());
    }

    #[test]
    fn test_numeric_coercion() {
        let sheet = validate(&json!({
            "tempo": "90",
            "duration": "not a number",
            "analysis": { "tempoDetected": "", "recommendations": 7 }
        }));
        assert_eq!(sheet.tempo, 90.0);
        assert_eq!(sheet.duration, 30.0);
        assert_eq!(sheet.analysis.tempo_detected, 120.0);
        assert_eq!(sheet.analysis.recommendations, "7");
        assert_eq!(sheet.analysis.instrument, "unknown");
    }

    #[test]
    fn test_non_positive_tempo_falls_back() {
        assert_eq!(validate(&json!({ "tempo": 0 })).tempo, 120.0);
        assert_eq!(validate(&json!({ "tempo": -60 })).tempo, 120.0);
    }

    #[test]
    fn test_note_filtering() {
        let sheet = validate(&json!({
            "notes": [
                { "pitch": "C4", "time": 0 },
                { "pitch": "", "time": 0.5 },
                { "time": 1.0 },
                { "pitch": "D4" },
                { "pitch": "E4", "time": 1.5, "confidence": 0.69 },
                { "pitch": "F4", "time": 2.0, "confidence": "0.75" },
                { "pitch": "G4", "time": 2.5, "confidence": null },
                { "pitch": "A4", "time": 3.0, "confidence": "high" },
                "B4"
            ]
        }));
        let pitches: Vec<&str> = sheet.notes.iter().map(|n| n.pitch.as_str()).collect();
        assert_eq!(pitches, vec!["C4", "F4"]);
        assert_eq!(sheet.processing_info.original_notes_count, 9);
        assert_eq!(sheet.processing_info.filtered_notes_count, 2);
    }

    #[test]
    fn test_note_normalization() {
        let sheet = validate(&json!({
            "notes": [
                { "pitch": "c#4", "time": "0.25", "velocity": 300, "duration": "x" },
                { "pitch": "db4", "time": null, "velocity": "soft", "confidence": 1.4 },
                { "pitch": "e4", "time": -3, "velocity": 0.2, "duration": "h" }
            ]
        }));
        assert_eq!(sheet.notes.len(), 3);

        let first = &sheet.notes[0];
        assert_eq!(first.pitch, "DB4");
        assert_eq!(first.time, 0.0);
        assert_eq!(first.velocity, 80);
        assert_eq!(first.confidence, 1.0);
        assert_eq!(first.duration, NoteDuration::Quarter);

        let second = &sheet.notes[1];
        assert_eq!(second.pitch, "E4");
        assert_eq!(second.time, 0.0);
        assert_eq!(second.velocity, 1);
        assert_eq!(second.duration, NoteDuration::Half);

        let third = &sheet.notes[2];
        assert_eq!(third.pitch, "C#4");
        assert_eq!(third.time, 0.25);
        assert_eq!(third.velocity, 127);
        assert_eq!(third.confidence, 0.8);
        assert_eq!(third.duration, NoteDuration::Quarter);
    }

    #[test]
    fn test_sorted_and_capped() {
        let notes: Vec<Value> = (0..200).rev().map(|i| raw_note("C4", i as f64 * 0.1)).collect();
        let sheet = validate(&json!({ "notes": notes }));

        assert_eq!(sheet.notes.len(), MAX_NOTES);
        assert!(sheet.notes.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(sheet.notes[0].time, 0.0);
        assert_eq!(sheet.processing_info.original_notes_count, 200);
    }

    #[test]
    fn test_sort_is_stable_for_chords() {
        let sheet = validate(&json!({
            "notes": [raw_note("G4", 1.0), raw_note("C4", 0.0), raw_note("E4", 0.0)]
        }));
        let pitches: Vec<&str> = sheet.notes.iter().map(|n| n.pitch.as_str()).collect();
        assert_eq!(pitches, vec!["C4", "E4", "G4"]);
    }

    #[test]
    fn test_no_low_confidence_survives() {
        let notes: Vec<Value> = (0..50)
            .map(|i| json!({ "pitch": "A4", "time": i, "confidence": i as f64 / 50.0 }))
            .collect();
        let sheet = validate(&json!({ "notes": notes }));
        assert!(!sheet.notes.is_empty());
        assert!(sheet.notes.iter().all(|n| n.confidence >= CONFIDENCE_THRESHOLD));
    }

    #[test]
    fn test_validate_is_idempotent() {
        let first = validate(&json!({
            "title": "Etude",
            "tempo": 100,
            "modelUsed": "transcriber-large",
            "notes": [raw_note("C4", 0.0), raw_note("E4", 0.5), raw_note("H9", 0.75)],
            "analysis": { "instrument": "piano" }
        }));
        let reencoded = serde_json::to_value(&first).unwrap();
        let second = validate(&reencoded);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_json_from_fenced_response() {
        let text = "Here is the transcription:\n```json\n{\"title\": \"Fenced\", \"notes\": []}\n```\nEnjoy!";
        let value = extract_json(text).unwrap();
        assert_eq!(value["title"], "Fenced");
    }

    #[test]
    fn test_extract_json_without_object() {
        assert!(matches!(
            extract_json("I could not hear any notes."),
            Err(SheetError::ResponseError(_))
        ));
        assert!(matches!(extract_json("{ not json }"), Err(SheetError::Json(_))));
    }

    #[test]
    fn test_parse_response_fallback() {
        let sheet = parse_response("The model refused to answer");
        assert_eq!(sheet.title, "Analysis Failed - Parse Error");
        assert!(sheet.notes.is_empty());
        assert_eq!(sheet.analysis.quality, "parsing_failed");
        assert!(sheet
            .analysis
            .recommendations
            .starts_with("Could not parse AI response. Raw response: The model refused"));
    }
}
