//! Engine constants and the serde-loadable session configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};
use crate::instrument::Instrument;

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// Output channel count (interleaved stereo).
pub const CHANNELS: u16 = 2;

/// Reference pitch for semitone offset 0 at octave shift 0 (C4).
pub const BASE_FREQ: f64 = 261.625565;

/// Lowest allowed octave shift.
pub const MIN_OCTAVE_SHIFT: i8 = -2;

/// Highest allowed octave shift.
pub const MAX_OCTAVE_SHIFT: i8 = 2;

/// Quietest allowed master volume.
pub const MIN_VOLUME: f64 = 0.05;

/// Loudest allowed master volume.
pub const MAX_VOLUME: f64 = 1.0;

/// Increment applied by a single volume up/down step.
pub const VOLUME_STEP: f64 = 0.05;

/// Volume a fresh session starts with.
pub const DEFAULT_VOLUME: f64 = 0.45;

/// Length of every rendered note in seconds.
///
/// Notes are held until an explicit note-off, so this is the upper bound on
/// how long a held key can sound.
pub const NOTE_DURATION_SECONDS: f64 = 6.0;

/// Fade applied to a sounding note on key release, in milliseconds.
pub const RELEASE_FADE_MS: u32 = 80;

/// Initial parameters for a playing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Display name of the starting instrument.
    pub instrument: String,
    /// Starting octave shift.
    pub octave_shift: i8,
    /// Starting master volume.
    pub volume: f64,
    /// Rendered note length in seconds.
    pub note_duration_seconds: f64,
    /// Fixed seed for percussive noise; `None` draws a fresh seed per render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_seed: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instrument: Instrument::default().name().to_string(),
            octave_shift: 0,
            volume: DEFAULT_VOLUME,
            note_duration_seconds: NOTE_DURATION_SECONDS,
            noise_seed: None,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from JSON text and validates it.
    pub fn from_json(json: &str) -> SynthResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SynthError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file from disk.
    pub fn load(path: &Path) -> SynthResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json_pretty(&self) -> SynthResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SynthError::InvalidConfig(e.to_string()))
    }

    /// Checks that every field names a value the engine accepts.
    pub fn validate(&self) -> SynthResult<()> {
        self.instrument.parse::<Instrument>()?;

        if !(MIN_OCTAVE_SHIFT..=MAX_OCTAVE_SHIFT).contains(&self.octave_shift) {
            return Err(SynthError::invalid_param(
                "octave_shift",
                format!(
                    "{} is outside {}..={}",
                    self.octave_shift, MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT
                ),
            ));
        }

        if !(MIN_VOLUME..=MAX_VOLUME).contains(&self.volume) {
            return Err(SynthError::invalid_param(
                "volume",
                format!("{} is outside {}..={}", self.volume, MIN_VOLUME, MAX_VOLUME),
            ));
        }

        if !self.note_duration_seconds.is_finite() || self.note_duration_seconds <= 0.0 {
            return Err(SynthError::invalid_param(
                "note_duration_seconds",
                "must be a positive number of seconds",
            ));
        }

        Ok(())
    }
}
