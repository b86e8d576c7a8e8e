//! # Playback Module
//!
//! Render a page of sheet music to audio and hand it to an audio sink.
//!
//! ## Purpose
//! Playback is the one place where the core meets the platform. The core
//! side is synchronous and pure: slice the page, synthesize, encode. The
//! platform side (an audio element, a file, a speaker) sits behind the
//! [`AudioSink`] trait and reports completion or failure as a `Result`.
//!
//! ## Sub-modules
//! - `types` - PreparedAudio, PlaybackReport type definitions
//! - `engine` - page preparation, the sink trait and a file sink
//!
//! ## Entry Points
//! - [`prepare_page()`] - page → WAV bytes, without playing
//! - [`play_page()`] - prepare and hand to a sink
//!
//! ## Example
//! ```rust
//! use sheetscribe::{prepare_page, transcribe, RenderConfig};
//!
//! let sheet = transcribe(r#"{
//!     "tempo": 120,
//!     "notes": [
//!         {"pitch": "C4", "duration": "q", "time": 0.0, "velocity": 80},
//!         {"pitch": "E4", "duration": "q", "time": 0.5, "velocity": 75}
//!     ]
//! }"#);
//!
//! let audio = prepare_page(&sheet, 0, &RenderConfig::default()).unwrap();
//! assert_eq!(audio.note_count, 2);
//! assert_eq!(audio.sample_count, 39690);
//! assert_eq!(audio.wav.len(), 44 + 39690 * 2);
//! ```
//!
//! ## What Plays
//! The whole page slice plays, including notes past the eighth measure that
//! the staff does not show.

mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{play_page, prepare_page, AudioSink, WavFileSink};
pub use types::{PlaybackReport, PreparedAudio};
