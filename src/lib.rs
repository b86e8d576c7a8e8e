//! # Sheetscribe
//!
//! Turns a music transcription response into paged sheet music, MusicXML
//! and audio.
//!
//! ## Pipeline
//! ```text
//! response text → transcribe → SheetMusic → page → engrave / synthesize → WAV
//! ```
//!
//! See [`api`] for the entry points.

pub mod api;
pub mod config;
pub mod engrave;
pub mod error;
pub mod musicxml;
pub mod note;
pub mod paginate;
pub mod playback;
pub mod sheet;
pub mod synth;
pub mod validate;
pub mod wav;

pub use api::{
    export_json, json_file_name, musicxml_file_name, page_musicxml, render_page_wav, transcribe,
    wav_file_name,
};
pub use config::RenderConfig;
pub use engrave::{
    engrave_page, layout_page, page_dimensions, render_page, to_engraveable, EngravedMeasure,
    StaffRenderer, StaveLayout, Tickable,
};
pub use error::SheetError;
pub use musicxml::{page_to_musicxml, MusicXmlRenderer};
pub use note::{Accidental, Note, NoteDuration, NoteName, Pitch};
pub use paginate::{measures, page, page_count, PageInfo};
pub use playback::{
    play_page, prepare_page, AudioSink, PlaybackReport, PreparedAudio, WavFileSink,
};
pub use sheet::{Analysis, ProcessingInfo, Session, SheetMusic};
pub use synth::{render_seconds, synthesize, test_tone, MAX_RENDER_SECONDS};
pub use validate::{extract_json, parse_response, validate};
pub use wav::encode_wav;
