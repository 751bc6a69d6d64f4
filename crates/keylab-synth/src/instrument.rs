//! Instrument timbres as additive synthesis recipes.
//!
//! Each instrument is a fixed recipe: a list of partials evaluated against the
//! carrier phase, one ADSR envelope, and optionally a percussive noise click
//! or a carrier vibrato. The set of instruments is closed.

use std::fmt;
use std::str::FromStr;

use crate::envelope::AdsrParams;
use crate::error::SynthError;
use crate::oscillator::Waveform;

/// One additive component of a timbre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    /// Oscillator shape.
    pub waveform: Waveform,
    /// Frequency multiple of the carrier (> 0).
    pub multiplier: f64,
    /// Amplitude weight.
    pub weight: f64,
}

impl Partial {
    /// Creates a partial.
    pub const fn new(waveform: Waveform, multiplier: f64, weight: f64) -> Self {
        Self {
            waveform,
            multiplier,
            weight,
        }
    }

    /// Creates a sine partial.
    pub const fn sine(multiplier: f64, weight: f64) -> Self {
        Self::new(Waveform::Sine, multiplier, weight)
    }
}

/// Short burst of uniform noise added at the start of a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseBurst {
    /// Burst length in seconds.
    pub duration: f64,
    /// Noise is drawn uniformly from `[-amplitude, amplitude)`.
    pub amplitude: f64,
}

/// Periodic modulation of the carrier frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibrato {
    /// Modulation rate in Hz.
    pub rate: f64,
    /// Relative frequency deviation (0.003 = ±0.3%).
    pub depth: f64,
}

/// A synthesis recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentDef {
    /// Partials summed to form the raw signal.
    pub partials: &'static [Partial],
    /// Amplitude envelope.
    pub envelope: AdsrParams,
    /// Optional percussive click.
    pub noise: Option<NoiseBurst>,
    /// Optional carrier vibrato.
    pub vibrato: Option<Vibrato>,
}

impl InstrumentDef {
    /// Pure sine with the default envelope, used for names that are not
    /// instruments.
    pub const FALLBACK: InstrumentDef = InstrumentDef {
        partials: &[Partial::sine(1.0, 1.0)],
        envelope: AdsrParams::new(0.01, 0.08, 0.6, 0.15),
        noise: None,
        vibrato: None,
    };

    /// Resolves an exact display name to its recipe, falling back to a pure
    /// sine for anything else.
    pub fn for_name(name: &str) -> &'static InstrumentDef {
        match Instrument::from_name(name) {
            Some(instrument) => instrument.def(),
            None => &Self::FALLBACK,
        }
    }

    /// Whether rendering this recipe draws random numbers.
    pub fn is_random(&self) -> bool {
        self.noise.is_some()
    }
}

const PIANO: InstrumentDef = InstrumentDef {
    partials: &[
        Partial::sine(1.0, 0.55),
        Partial::sine(2.0, 0.28),
        Partial::sine(3.0, 0.12),
        Partial::sine(4.0, 0.05),
    ],
    envelope: AdsrParams::new(0.003, 0.22, 0.15, 0.35),
    noise: Some(NoiseBurst {
        duration: 0.008,
        amplitude: 0.15,
    }),
    vibrato: None,
};

const ORGAN: InstrumentDef = InstrumentDef {
    partials: &[
        Partial::sine(1.0, 0.70),
        Partial::sine(2.0, 0.20),
        Partial::sine(3.0, 0.10),
    ],
    envelope: AdsrParams::new(0.02, 0.06, 0.95, 0.22),
    noise: None,
    vibrato: None,
};

// Inharmonic partials
const BELL: InstrumentDef = InstrumentDef {
    partials: &[
        Partial::sine(1.0, 0.70),
        Partial::sine(2.71, 0.35),
        Partial::sine(5.18, 0.20),
    ],
    envelope: AdsrParams::new(0.002, 0.20, 0.12, 0.35),
    noise: None,
    vibrato: None,
};

const SINE: InstrumentDef = InstrumentDef {
    partials: &[Partial::sine(1.0, 1.0)],
    envelope: AdsrParams::new(0.01, 0.06, 0.75, 0.18),
    noise: None,
    vibrato: None,
};

const TRIANGLE: InstrumentDef = InstrumentDef {
    partials: &[Partial::new(Waveform::Triangle, 1.0, 1.0)],
    envelope: AdsrParams::new(0.01, 0.08, 0.65, 0.15),
    noise: None,
    vibrato: None,
};

const SAW: InstrumentDef = InstrumentDef {
    partials: &[Partial::new(Waveform::Saw, 1.0, 1.0)],
    envelope: AdsrParams::new(0.01, 0.10, 0.5, 0.18),
    noise: None,
    vibrato: None,
};

const SQUARE: InstrumentDef = InstrumentDef {
    partials: &[Partial::new(Waveform::Square, 1.0, 1.0)],
    envelope: AdsrParams::new(0.005, 0.05, 0.55, 0.12),
    noise: None,
    vibrato: None,
};

const CHIPTUNE: InstrumentDef = InstrumentDef {
    partials: &[Partial::new(Waveform::Square, 1.0, 1.0)],
    envelope: AdsrParams::new(0.002, 0.04, 0.6, 0.08),
    noise: None,
    vibrato: Some(Vibrato {
        rate: 6.0,
        depth: 0.003,
    }),
};

/// The selectable instruments, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Instrument {
    /// Decaying harmonic stack with a hammer click.
    #[default]
    PianoIsh,
    /// Sustained drawbar-style harmonics.
    Organ,
    /// Inharmonic partials with a long tail.
    Bell,
    /// Pure sine.
    Sine,
    /// Triangle wave.
    Triangle,
    /// Sawtooth wave.
    Saw,
    /// Square wave.
    Square,
    /// Square wave with a slight vibrato.
    Chiptune,
}

impl Instrument {
    /// All instruments in display order.
    pub const ALL: [Instrument; 8] = [
        Instrument::PianoIsh,
        Instrument::Organ,
        Instrument::Bell,
        Instrument::Sine,
        Instrument::Triangle,
        Instrument::Saw,
        Instrument::Square,
        Instrument::Chiptune,
    ];

    /// Display name, also used as the render cache key.
    pub fn name(self) -> &'static str {
        match self {
            Instrument::PianoIsh => "Piano-ish",
            Instrument::Organ => "Organ",
            Instrument::Bell => "Bell",
            Instrument::Sine => "Sine",
            Instrument::Triangle => "Triangle",
            Instrument::Saw => "Saw",
            Instrument::Square => "Square",
            Instrument::Chiptune => "Chiptune",
        }
    }

    /// Synthesis recipe for this instrument.
    pub fn def(self) -> &'static InstrumentDef {
        match self {
            Instrument::PianoIsh => &PIANO,
            Instrument::Organ => &ORGAN,
            Instrument::Bell => &BELL,
            Instrument::Sine => &SINE,
            Instrument::Triangle => &TRIANGLE,
            Instrument::Saw => &SAW,
            Instrument::Square => &SQUARE,
            Instrument::Chiptune => &CHIPTUNE,
        }
    }

    /// Looks up an instrument by its exact display name.
    pub fn from_name(name: &str) -> Option<Instrument> {
        Self::ALL.iter().copied().find(|i| i.name() == name)
    }

    /// Looks up user input: exact matches win, otherwise ASCII case is
    /// ignored.
    pub fn from_input(name: &str) -> Option<Instrument> {
        Self::from_name(name).or_else(|| {
            Self::ALL
                .iter()
                .copied()
                .find(|i| i.name().eq_ignore_ascii_case(name))
        })
    }

    /// The instrument after this one, wrapping around.
    pub fn next(self) -> Instrument {
        let index = Self::ALL.iter().position(|&i| i == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::from_input(s).ok_or_else(|| SynthError::UnknownInstrument {
            name: s.to_string(),
            expected: Instrument::ALL
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}
