//! Playback type definitions

use serde::Serialize;

/// A page rendered to a playable WAV file
///
/// # Fields
/// - `page`: 0-indexed page the audio was rendered from
/// - `note_count`: notes synthesized (the full page slice)
/// - `tempo`: tempo the durations were scaled to, in BPM
/// - `sample_rate`: samples per second of the PCM inside `wav`
/// - `sample_count`: number of mono samples
/// - `wav`: complete RIFF/WAVE bytes
#[derive(Debug, Clone)]
pub struct PreparedAudio {
    pub page: usize,
    pub note_count: usize,
    pub tempo: f64,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub wav: Vec<u8>,
}

impl PreparedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sample_rate as f64
    }
}

/// What the user is told once a sink accepts the audio
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackReport {
    /// 1-indexed page number
    pub page_number: usize,
    pub note_count: usize,
    pub tempo: f64,
    pub duration_secs: f64,
}

impl PlaybackReport {
    pub fn message(&self) -> String {
        format!(
            "Playing {} notes from page {} at {} BPM",
            self.note_count, self.page_number, self.tempo
        )
    }
}
