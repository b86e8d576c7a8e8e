//! Page audio preparation and delivery

use std::fs;
use std::path::PathBuf;

use crate::config::RenderConfig;
use crate::error::SheetError;
use crate::paginate::page;
use crate::sheet::SheetMusic;
use crate::synth::{render_seconds, synthesize, MAX_RENDER_SECONDS};
use crate::wav::encode_wav;

use super::types::{PlaybackReport, PreparedAudio};

/// The platform's audio output.
///
/// `play` returns once the audio has been accepted (or rejected); the sink
/// owns whatever happens afterwards. `stop` halts anything still sounding.
pub trait AudioSink {
    fn play(&mut self, audio: &PreparedAudio) -> Result<(), SheetError>;

    fn stop(&mut self) {}
}

/// Writes each played page to a WAV file
#[derive(Debug, Clone)]
pub struct WavFileSink {
    path: PathBuf,
}

impl WavFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl AudioSink for WavFileSink {
    fn play(&mut self, audio: &PreparedAudio) -> Result<(), SheetError> {
        fs::write(&self.path, &audio.wav)?;
        tracing::info!(path = %self.path.display(), bytes = audio.wav.len(), "wrote page audio");
        Ok(())
    }
}

/// Synthesize and encode one page.
///
/// # Errors
/// - [`SheetError::NoNotesOnPage`] when the page is empty or past the end
/// - [`SheetError::RenderTooLong`] when a note ends after [`MAX_RENDER_SECONDS`]
pub fn prepare_page(
    sheet: &SheetMusic,
    page_index: usize,
    config: &RenderConfig,
) -> Result<PreparedAudio, SheetError> {
    let notes = page(&sheet.notes, page_index);
    if notes.is_empty() {
        return Err(SheetError::NoNotesOnPage { page: page_index });
    }

    let tempo = config.tempo_for(sheet.tempo);
    let seconds = render_seconds(notes, tempo);
    if seconds > MAX_RENDER_SECONDS {
        return Err(SheetError::RenderTooLong {
            page: page_index,
            seconds,
            limit: MAX_RENDER_SECONDS,
        });
    }

    let pcm = synthesize(notes, tempo, config.sample_rate);
    let wav = encode_wav(&pcm, config.sample_rate)?;

    tracing::debug!(
        page = page_index + 1,
        notes = notes.len(),
        samples = pcm.len(),
        "prepared page audio"
    );

    Ok(PreparedAudio {
        page: page_index,
        note_count: notes.len(),
        tempo,
        sample_rate: config.sample_rate,
        sample_count: pcm.len(),
        wav,
    })
}

/// Prepare a page and hand it to `sink`.
///
/// Sink failures come back as [`SheetError::Playback`] with the sink's
/// message; nothing about the sheet changes.
pub fn play_page<S: AudioSink + ?Sized>(
    sink: &mut S,
    sheet: &SheetMusic,
    page_index: usize,
    config: &RenderConfig,
) -> Result<PlaybackReport, SheetError> {
    let audio = prepare_page(sheet, page_index, config)?;

    sink.play(&audio).map_err(|e| {
        tracing::error!(error = %e, "playback failed");
        match e {
            SheetError::Playback(_) => e,
            other => SheetError::Playback(other.to_string()),
        }
    })?;

    let report = PlaybackReport {
        page_number: page_index + 1,
        note_count: audio.note_count,
        tempo: audio.tempo,
        duration_secs: audio.duration_secs(),
    };
    tracing::info!("{}", report.message());
    Ok(report)
}
