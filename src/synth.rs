//! # Audio Synthesizer
//!
//! Renders a page of notes into a mono PCM buffer.
//!
//! Each note is a single sine partial with a fixed exponential decay
//! envelope. Notes are mixed additively into one buffer, so notes sharing an
//! onset sound as a chord. There is no limiter: loud overlapping notes can
//! exceed [-1, 1] and are clamped later by the WAV encoder.
//!
//! ## Timing
//! Note lengths are defined at a 120 BPM reference (quarter = 0.4 s) and
//! scaled linearly by `120 / tempo`. Onsets come straight from the
//! transcription and are not tempo-scaled.

use std::f64::consts::PI;

use crate::note::{frequency_or_fallback, Note};
use crate::validate::DEFAULT_TEMPO;

/// Tempo at which the duration table is defined
const REFERENCE_TEMPO: f64 = 120.0;

/// Decay rate of the amplitude envelope, per second
const DECAY_RATE: f64 = 2.0;

/// Fixed output gain applied to every note
const MASTER_GAIN: f64 = 0.3;

/// Longest audio one page may render: the 30 second clip plus room for
/// note tails at slow tempos.
pub const MAX_RENDER_SECONDS: f64 = 60.0;

/// Length of a note in seconds at `tempo_bpm`.
pub fn scaled_duration(note: &Note, tempo_bpm: f64) -> f64 {
    note.duration.reference_seconds() * (REFERENCE_TEMPO / tempo_bpm)
}

fn effective_tempo(tempo_bpm: f64) -> f64 {
    if tempo_bpm.is_finite() && tempo_bpm > 0.0 {
        tempo_bpm
    } else {
        tracing::warn!(tempo_bpm, "invalid tempo, rendering at {} BPM", DEFAULT_TEMPO);
        DEFAULT_TEMPO
    }
}

/// Seconds from time zero to the end of the last note.
pub fn render_seconds(notes: &[Note], tempo_bpm: f64) -> f64 {
    let tempo = effective_tempo(tempo_bpm);
    notes
        .iter()
        .map(|n| n.time + scaled_duration(n, tempo))
        .fold(0.0, f64::max)
}

/// Number of samples needed to hold every note of `notes`, never more than
/// [`MAX_RENDER_SECONDS`] worth.
pub fn buffer_length(notes: &[Note], tempo_bpm: f64, sample_rate: u32) -> usize {
    let end = render_seconds(notes, tempo_bpm).min(MAX_RENDER_SECONDS);
    (end * sample_rate as f64).ceil() as usize
}

/// Synthesize `notes` into mono PCM at `sample_rate`.
///
/// Same notes, tempo and sample rate always give the same samples. Audio
/// past [`MAX_RENDER_SECONDS`] is cut off.
///
/// # Example
/// ```rust
/// use sheetscribe::{synthesize, Note, NoteDuration};
///
/// let notes = vec![
///     Note::new("C4", NoteDuration::Quarter, 0.0),
///     Note::new("E4", NoteDuration::Quarter, 0.5),
/// ];
/// let pcm = synthesize(&notes, 120.0, 44100);
///
/// assert_eq!(pcm.len(), 39690);
/// assert!(pcm[1] != 0.0);
/// ```
pub fn synthesize(notes: &[Note], tempo_bpm: f64, sample_rate: u32) -> Vec<f32> {
    let tempo = effective_tempo(tempo_bpm);
    let rate = sample_rate as f64;
    let total_samples = buffer_length(notes, tempo, sample_rate);
    if render_seconds(notes, tempo) > MAX_RENDER_SECONDS {
        tracing::warn!(
            limit = MAX_RENDER_SECONDS,
            "notes run past the render limit, truncating"
        );
    }
    let mut buffer = vec![0.0f32; total_samples];

    for note in notes {
        let frequency = frequency_or_fallback(&note.pitch);
        let duration = scaled_duration(note, tempo);
        let gain = note.velocity as f64 / 127.0;

        let start_sample = (note.time * rate).floor() as usize;
        let end_sample = ((note.time + duration) * rate).floor() as usize;
        let end_sample = end_sample.min(total_samples);

        for (offset, sample) in buffer
            .iter_mut()
            .take(end_sample)
            .skip(start_sample)
            .enumerate()
        {
            let t = offset as f64 / rate;
            let amplitude = gain * (-t * DECAY_RATE).exp();
            let value = (2.0 * PI * frequency * t).sin() * amplitude * MASTER_GAIN;
            *sample = (*sample as f64 + value) as f32;
        }
    }

    tracing::debug!(
        notes = notes.len(),
        samples = total_samples,
        tempo,
        "synthesized page"
    );

    buffer
}

/// Two seconds of A4 at half amplitude, for checking the audio path works.
pub fn test_tone(sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f64;
    (0..sample_rate as usize * 2)
        .map(|i| ((2.0 * PI * 440.0 * i as f64 / rate).sin() * 0.5) as f32)
        .collect()
}
