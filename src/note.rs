//! # Note Model
//!
//! Types for a single transcribed musical event and the static pitch tables
//! used downstream by the synthesizer and the notation adapter.
//!
//! ## Type Hierarchy
//! ```text
//! Note
//!   ├── pitch: String        (scientific pitch notation, e.g. "C#4")
//!   ├── duration: NoteDuration (w, h, q, e, s)
//!   ├── time: f64            (onset in seconds)
//!   ├── confidence: f64      (0.0 - 1.0)
//!   └── velocity: u8         (MIDI 1 - 127)
//!
//! Pitch (parsed view of Note::pitch)
//!   ├── name: NoteName (A-G)
//!   ├── accidental: Accidental (#, b, natural)
//!   └── octave: u8
//! ```
//!
//! The raw pitch spelling is kept as a string because the transcription
//! service may send spellings nothing downstream understands (`"H9"`).
//! Those notes still play (at the 440 Hz fallback) and are skipped by the
//! notation adapter.

use serde::{Deserialize, Serialize};

/// Frequency used for any pitch missing from [`FREQUENCIES`].
pub const FALLBACK_FREQUENCY: f64 = 440.0;

/// Lowest and highest octaves covered by the static tables.
const FIRST_OCTAVE: u8 = 3;
const LAST_OCTAVE: u8 = 5;

/// Fundamental frequencies in Hz, indexed by `[octave - 3][semitone]`.
const FREQUENCIES: [[f64; 12]; 3] = [
    [
        130.81, 138.59, 146.83, 155.56, 164.81, 174.61, 185.0, 196.0, 207.65, 220.0, 233.08,
        246.94,
    ],
    [
        261.63, 277.18, 293.66, 311.13, 329.63, 349.23, 369.99, 392.0, 415.3, 440.0, 466.16,
        493.88,
    ],
    [
        523.25, 554.37, 587.33, 622.25, 659.25, 698.46, 739.99, 783.99, 830.61, 880.0, 932.33,
        987.77,
    ],
];

/// Engraver key spellings (naturals and sharps), indexed like [`FREQUENCIES`].
const RENDER_KEYS: [[&str; 12]; 3] = [
    [
        "c/3", "c#/3", "d/3", "d#/3", "e/3", "f/3", "f#/3", "g/3", "g#/3", "a/3", "a#/3", "b/3",
    ],
    [
        "c/4", "c#/4", "d/4", "d#/4", "e/4", "f/4", "f#/4", "g/4", "g#/4", "a/4", "a#/4", "b/4",
    ],
    [
        "c/5", "c#/5", "d/5", "d#/5", "e/5", "f/5", "f#/5", "g/5", "g#/5", "a/5", "a#/5", "b/5",
    ],
];

/// Note duration class as sent by the transcription service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoteDuration {
    #[serde(rename = "w")]
    Whole,
    #[serde(rename = "h")]
    Half,
    #[default]
    #[serde(rename = "q")]
    Quarter,
    #[serde(rename = "e")]
    Eighth,
    #[serde(rename = "s")]
    Sixteenth,
}

impl NoteDuration {
    /// Parse a duration code. Unrecognized codes are quarter notes.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "w" => NoteDuration::Whole,
            "h" => NoteDuration::Half,
            "e" => NoteDuration::Eighth,
            "s" => NoteDuration::Sixteenth,
            _ => NoteDuration::Quarter,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            NoteDuration::Whole => "w",
            NoteDuration::Half => "h",
            NoteDuration::Quarter => "q",
            NoteDuration::Eighth => "e",
            NoteDuration::Sixteenth => "s",
        }
    }

    /// Length in seconds at the 120 BPM reference tempo
    pub fn reference_seconds(&self) -> f64 {
        match self {
            NoteDuration::Whole => 1.6,
            NoteDuration::Half => 0.8,
            NoteDuration::Quarter => 0.4,
            NoteDuration::Eighth => 0.2,
            NoteDuration::Sixteenth => 0.1,
        }
    }
}

/// One transcribed musical event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub pitch: String,
    pub duration: NoteDuration,
    pub time: f64,
    pub confidence: f64,
    pub velocity: u8,
}

impl Note {
    /// Convenience constructor with the validator's default confidence and velocity.
    pub fn new(pitch: &str, duration: NoteDuration, time: f64) -> Self {
        Self {
            pitch: pitch.to_uppercase(),
            duration,
            time,
            confidence: 0.8,
            velocity: 80,
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn parsed_pitch(&self) -> Option<Pitch> {
        Pitch::parse(&self.pitch)
    }

    /// Fundamental frequency, or `None` if the pitch is outside the table.
    pub fn frequency(&self) -> Option<f64> {
        self.parsed_pitch().and_then(|p| p.frequency())
    }
}

/// Note names A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    pub fn step(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
            NoteName::A => "A",
            NoteName::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// Parsed scientific pitch notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    pub name: NoteName,
    pub accidental: Accidental,
    pub octave: u8,
}

impl Pitch {
    /// Parse spellings like `C4`, `C#4`, `Db4` or `DB4`.
    ///
    /// The octave is a single digit. Anything else is not a pitch.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        let name = NoteName::from_char(chars.next()?)?;
        let rest = chars.as_str();

        let (accidental, octave) = match rest.chars().next()? {
            '#' => (Accidental::Sharp, &rest[1..]),
            'b' | 'B' => (Accidental::Flat, &rest[1..]),
            _ => (Accidental::Natural, rest),
        };

        let mut digits = octave.chars();
        let octave = digits.next()?.to_digit(10)? as u8;
        if digits.next().is_some() {
            return None;
        }

        Some(Self {
            name,
            accidental,
            octave,
        })
    }

    /// Semitone above C within the octave. Spellings that would cross an
    /// octave boundary or land on a natural (`Cb`, `B#`, `E#`, `Fb`) are not
    /// in the tables.
    fn semitone(&self) -> Option<usize> {
        let semitone = match (self.name, self.accidental) {
            (NoteName::C, Accidental::Natural) => 0,
            (NoteName::C, Accidental::Sharp) | (NoteName::D, Accidental::Flat) => 1,
            (NoteName::D, Accidental::Natural) => 2,
            (NoteName::D, Accidental::Sharp) | (NoteName::E, Accidental::Flat) => 3,
            (NoteName::E, Accidental::Natural) => 4,
            (NoteName::F, Accidental::Natural) => 5,
            (NoteName::F, Accidental::Sharp) | (NoteName::G, Accidental::Flat) => 6,
            (NoteName::G, Accidental::Natural) => 7,
            (NoteName::G, Accidental::Sharp) | (NoteName::A, Accidental::Flat) => 8,
            (NoteName::A, Accidental::Natural) => 9,
            (NoteName::A, Accidental::Sharp) | (NoteName::B, Accidental::Flat) => 10,
            (NoteName::B, Accidental::Natural) => 11,
            _ => return None,
        };
        Some(semitone)
    }

    fn octave_index(&self) -> Option<usize> {
        if (FIRST_OCTAVE..=LAST_OCTAVE).contains(&self.octave) {
            Some((self.octave - FIRST_OCTAVE) as usize)
        } else {
            None
        }
    }

    /// Frequency in Hz from the static C3-B5 table. Flats share the value of
    /// their sharp spelling.
    pub fn frequency(&self) -> Option<f64> {
        Some(FREQUENCIES[self.octave_index()?][self.semitone()?])
    }

    /// Engraver key (`"c#/4"`). Only naturals and sharps are spelled.
    pub fn render_key(&self) -> Option<&'static str> {
        if self.accidental == Accidental::Flat {
            return None;
        }
        Some(RENDER_KEYS[self.octave_index()?][self.semitone()?])
    }

    /// MusicXML `<alter>` value
    pub fn alter(&self) -> i8 {
        match self.accidental {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }
}

/// Frequency for a raw pitch spelling, falling back to 440 Hz.
pub fn frequency_or_fallback(pitch: &str) -> f64 {
    match Pitch::parse(pitch).and_then(|p| p.frequency()) {
        Some(hz) => hz,
        None => {
            tracing::warn!(pitch, "unknown pitch, using {} Hz", FALLBACK_FREQUENCY);
            FALLBACK_FREQUENCY
        }
    }
}
