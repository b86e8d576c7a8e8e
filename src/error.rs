//! # Error Types
//!
//! This module defines the error type for sheetscribe.
//!
//! The core stages (validation, pagination, engraving, synthesis) never fail:
//! malformed input degrades to defaults, unknown pitches fall back, and
//! renderer failures turn into rests. `SheetError` is only produced at the
//! boundaries: configuration loading, the renderer seam, playback, and I/O.
//!
//! ## Usage
//! ```rust
//! use sheetscribe::{prepare_page, transcribe, RenderConfig, SheetError};
//!
//! let sheet = transcribe(r#"{"notes": []}"#);
//! match prepare_page(&sheet, 0, &RenderConfig::default()) {
//!     Ok(audio) => println!("{} bytes of audio", audio.wav.len()),
//!     Err(SheetError::NoNotesOnPage { page }) => eprintln!("page {} is empty", page + 1),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    /// The requested page has nothing to play.
    ///
    /// # Example
    /// ```
    /// # use sheetscribe::SheetError;
    /// let err = SheetError::NoNotesOnPage { page: 2 };
    /// assert_eq!(err.to_string(), "Page 3 doesn't contain any notes to play");
    /// ```
    #[error("Page {} doesn't contain any notes to play", .page + 1)]
    NoNotesOnPage { page: usize },

    /// Invalid render configuration.
    ///
    /// # Example
    /// ```
    /// # use sheetscribe::SheetError;
    /// let err = SheetError::ConfigError("sample-rate must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: sample-rate must be positive");
    /// ```
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The staff renderer rejected a measure.
    ///
    /// Only ever seen by [`StaffRenderer`](crate::StaffRenderer) callers;
    /// page rendering recovers from it by drawing rests.
    ///
    /// # Example
    /// ```
    /// # use sheetscribe::SheetError;
    /// let err = SheetError::RenderError {
    ///     measure: 3,
    ///     message: "voice has too many ticks".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Render error at measure 3: voice has too many ticks");
    /// ```
    #[error("Render error at measure {measure}: {message}")]
    RenderError { measure: usize, message: String },

    /// The page's notes reach further than a page of audio may last.
    ///
    /// # Example
    /// ```
    /// # use sheetscribe::SheetError;
    /// let err = SheetError::RenderTooLong {
    ///     page: 0,
    ///     seconds: 75.3,
    ///     limit: 60.0,
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Page 1 audio would last 75.3 seconds, over the 60 second limit"
    /// );
    /// ```
    #[error(
        "Page {} audio would last {:.1} seconds, over the {} second limit",
        .page + 1,
        .seconds,
        .limit
    )]
    RenderTooLong { page: usize, seconds: f64, limit: f64 },

    /// PCM that cannot be described by a 16-bit WAV header.
    ///
    /// # Example
    /// ```
    /// # use sheetscribe::SheetError;
    /// let err = SheetError::Encode("sample rate 3000000000 is too high".to_string());
    /// assert_eq!(err.to_string(), "WAV encoding failed: sample rate 3000000000 is too high");
    /// ```
    #[error("WAV encoding failed: {0}")]
    Encode(String),

    /// The platform audio facility failed to play a rendered page.
    #[error("Playback failed: {0}")]
    Playback(String),

    /// The AI response did not contain a usable JSON document.
    #[error("Unreadable transcription response: {0}")]
    ResponseError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
