//! Render configuration.
//!
//! Loaded from a small YAML file:
//!
//! ```yaml
//! sample-rate: 48000
//! tempo: 90
//! ```
//!
//! Every key is optional. `tempo` overrides the tempo reported by the
//! transcription for playback only.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SheetError;
use crate::validate::DEFAULT_SAMPLE_RATE;

/// Rates outside this range are almost certainly typos
const MIN_SAMPLE_RATE: u32 = 8000;
const MAX_SAMPLE_RATE: u32 = 192_000;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub sample_rate: u32,
    pub tempo: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            tempo: None,
        }
    }
}

/// Raw config for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawRenderConfig {
    sample_rate: Option<u32>,
    tempo: Option<f64>,
}

impl RenderConfig {
    /// Build a config, checking the sample rate range and that any tempo
    /// override is a positive number of BPM.
    pub fn new(sample_rate: u32, tempo: Option<f64>) -> Result<Self, SheetError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(SheetError::ConfigError(format!(
                "sample-rate must be between {} and {}, got {}",
                MIN_SAMPLE_RATE, MAX_SAMPLE_RATE, sample_rate
            )));
        }

        if let Some(tempo) = tempo {
            if !tempo.is_finite() || tempo <= 0.0 {
                return Err(SheetError::ConfigError(format!(
                    "tempo must be a positive number of BPM, got {}",
                    tempo
                )));
            }
        }

        Ok(Self { sample_rate, tempo })
    }

    pub fn from_yaml(content: &str) -> Result<Self, SheetError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawRenderConfig = serde_yaml::from_str(content)
            .map_err(|e| SheetError::ConfigError(e.to_string()))?;

        Self::new(raw.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE), raw.tempo)
    }

    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Playback tempo: the override if set, otherwise the transcription's.
    pub fn tempo_for(&self, sheet_tempo: f64) -> f64 {
        self.tempo.unwrap_or(sheet_tempo)
    }
}
