//! Immutable synthesis parameters shared by every render.

use crate::cache::RenderKey;
use crate::config::{
    SessionConfig, DEFAULT_VOLUME, MAX_OCTAVE_SHIFT, MAX_VOLUME, MIN_OCTAVE_SHIFT, MIN_VOLUME,
    VOLUME_STEP,
};
use crate::error::{SynthError, SynthResult};
use crate::instrument::Instrument;
use crate::pitch::clamp_octave_shift;

/// The user-adjustable parameters that select which buffer a key plays.
///
/// Adjustments return a new state; the values are always inside their
/// allowed ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthState {
    instrument: Instrument,
    octave_shift: i8,
    volume: f64,
}

impl Default for SynthState {
    fn default() -> Self {
        Self {
            instrument: Instrument::default(),
            octave_shift: 0,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SynthState {
    /// Creates a state, clamping octave shift and volume into range.
    pub fn new(instrument: Instrument, octave_shift: i8, volume: f64) -> Self {
        Self {
            instrument,
            octave_shift: clamp_octave_shift(octave_shift),
            volume: clamp_volume(volume),
        }
    }

    /// Creates a state, rejecting out-of-range values instead of clamping.
    pub fn validate(instrument: Instrument, octave_shift: i8, volume: f64) -> SynthResult<Self> {
        if !(MIN_OCTAVE_SHIFT..=MAX_OCTAVE_SHIFT).contains(&octave_shift) {
            return Err(SynthError::invalid_param(
                "octave_shift",
                format!(
                    "{} is outside {}..={}",
                    octave_shift, MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT
                ),
            ));
        }
        if !(MIN_VOLUME..=MAX_VOLUME).contains(&volume) {
            return Err(SynthError::invalid_param(
                "volume",
                format!("{} is outside {}..={}", volume, MIN_VOLUME, MAX_VOLUME),
            ));
        }
        Ok(Self {
            instrument,
            octave_shift,
            volume,
        })
    }

    /// Builds the starting state described by a configuration.
    pub fn from_config(config: &SessionConfig) -> SynthResult<Self> {
        let instrument = config.instrument.parse::<Instrument>()?;
        Self::validate(instrument, config.octave_shift, config.volume)
    }

    /// Selected instrument.
    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Current octave shift.
    pub fn octave_shift(&self) -> i8 {
        self.octave_shift
    }

    /// Current master volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// One octave higher, up to the limit.
    pub fn octave_up(self) -> Self {
        Self {
            octave_shift: clamp_octave_shift(self.octave_shift.saturating_add(1)),
            ..self
        }
    }

    /// One octave lower, down to the limit.
    pub fn octave_down(self) -> Self {
        Self {
            octave_shift: clamp_octave_shift(self.octave_shift.saturating_sub(1)),
            ..self
        }
    }

    /// One volume step louder, up to the limit.
    pub fn volume_up(self) -> Self {
        Self {
            volume: clamp_volume(self.volume + VOLUME_STEP),
            ..self
        }
    }

    /// One volume step quieter, down to the limit.
    pub fn volume_down(self) -> Self {
        Self {
            volume: clamp_volume(self.volume - VOLUME_STEP),
            ..self
        }
    }

    /// Same parameters with another instrument.
    pub fn with_instrument(self, instrument: Instrument) -> Self {
        Self { instrument, ..self }
    }

    /// Cache key of the note at `semitone_offset` under this state.
    pub fn render_key(&self, semitone_offset: u8) -> RenderKey {
        RenderKey::new(
            self.instrument.name(),
            self.octave_shift,
            semitone_offset,
            self.volume,
        )
    }

    /// Whether notes rendered under `other` could differ from notes rendered
    /// under this state.
    pub fn affects_render(&self, other: &SynthState) -> bool {
        self.render_key(0) != other.render_key(0)
    }
}

/// Clamps a volume into the allowed range.
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return MIN_VOLUME;
    }
    volume.clamp(MIN_VOLUME, MAX_VOLUME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_state() {
        let state = SynthState::default();
        assert_eq!(state.instrument(), Instrument::PianoIsh);
        assert_eq!(state.octave_shift(), 0);
        assert_eq!(state.volume(), 0.45);
    }

    #[test]
    fn test_octave_clamped() {
        let mut state = SynthState::default();
        for _ in 0..5 {
            state = state.octave_up();
        }
        assert_eq!(state.octave_shift(), MAX_OCTAVE_SHIFT);

        for _ in 0..10 {
            state = state.octave_down();
        }
        assert_eq!(state.octave_shift(), MIN_OCTAVE_SHIFT);
    }

    #[test]
    fn test_volume_clamped() {
        let mut state = SynthState::default();
        for _ in 0..30 {
            state = state.volume_up();
        }
        assert_eq!(state.volume(), MAX_VOLUME);

        for _ in 0..30 {
            state = state.volume_down();
        }
        assert_eq!(state.volume(), MIN_VOLUME);
    }

    #[test]
    fn test_new_clamps_and_validate_rejects() {
        let state = SynthState::new(Instrument::Bell, 7, 3.0);
        assert_eq!(state.octave_shift(), MAX_OCTAVE_SHIFT);
        assert_eq!(state.volume(), MAX_VOLUME);

        assert!(SynthState::validate(Instrument::Bell, 7, 0.5).is_err());
        assert!(SynthState::validate(Instrument::Bell, 0, 0.01).is_err());
        assert!(SynthState::validate(Instrument::Bell, -2, 0.05).is_ok());
    }

    #[test]
    fn test_clamp_volume_nan() {
        assert_eq!(clamp_volume(f64::NAN), MIN_VOLUME);
    }

    #[test]
    fn test_render_key_reflects_state() {
        let state = SynthState::new(Instrument::Organ, -1, 0.5);
        let key = state.render_key(4);
        assert_eq!(key.instrument(), "Organ");
        assert_eq!(key.octave_shift(), -1);
        assert_eq!(key.semitone_offset(), 4);
        assert_eq!(key.volume(), 0.5);
    }

    #[test]
    fn test_affects_render() {
        let state = SynthState::default();
        assert!(!state.affects_render(&state));
        assert!(state.affects_render(&state.octave_up()));
        assert!(state.affects_render(&state.volume_down()));
        assert!(state.affects_render(&state.with_instrument(Instrument::Saw)));

        let top = SynthState::new(Instrument::Sine, MAX_OCTAVE_SHIFT, 0.5);
        assert!(!top.affects_render(&top.octave_up()));
    }

    #[test]
    fn test_from_config() {
        let config = SessionConfig {
            instrument: "bell".to_string(),
            octave_shift: 1,
            volume: 0.8,
            ..SessionConfig::default()
        };
        let state = SynthState::from_config(&config).unwrap();
        assert_eq!(state, SynthState::new(Instrument::Bell, 1, 0.8));
    }
}
