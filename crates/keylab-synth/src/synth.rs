//! Instrument synthesizer: frequency + recipe -> stereo PCM.
//!
//! A render is a straight pipeline over a fixed number of samples: sum the
//! recipe's partials on the carrier phase, add the percussive click if the
//! recipe has one, apply the ADSR envelope, hard clip, scale by volume and
//! quantize to 16 bits. Apart from the click's noise, every step is a pure
//! function of its inputs.

use log::trace;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::buffer::RenderedBuffer;
use crate::config::SAMPLE_RATE;
use crate::envelope::{adsr_envelope, linear_fade};
use crate::instrument::InstrumentDef;
use crate::oscillator::TWO_PI;
use crate::rng::{create_rng, derive_component_seed, fresh_seed};

/// Largest positive 16-bit sample, used as the quantization scale.
const PCM_SCALE: f64 = 32767.0;

/// Something that turns note parameters into a rendered buffer.
///
/// The render cache is generic over this so the synthesizer can be swapped or
/// instrumented.
pub trait NoteRenderer {
    /// Renders one note.
    ///
    /// # Arguments
    /// * `frequency` - Carrier frequency in Hz
    /// * `duration` - Note length in seconds
    /// * `instrument` - Instrument display name
    /// * `volume` - Master volume (0.05 to 1.0)
    fn render(&self, frequency: f64, duration: f64, instrument: &str, volume: f64)
        -> RenderedBuffer;
}

/// The standard synthesizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteSynth {
    noise_seed: Option<u32>,
}

impl NoteSynth {
    /// Synthesizer whose percussive noise differs on every render.
    pub fn new() -> Self {
        Self { noise_seed: None }
    }

    /// Synthesizer whose percussive noise is derived from `seed`.
    ///
    /// Every render of the same instrument then draws the same noise.
    pub fn with_noise_seed(seed: u32) -> Self {
        Self {
            noise_seed: Some(seed),
        }
    }

    /// The fixed noise seed, if any.
    pub fn noise_seed(&self) -> Option<u32> {
        self.noise_seed
    }
}

impl NoteRenderer for NoteSynth {
    fn render(
        &self,
        frequency: f64,
        duration: f64,
        instrument: &str,
        volume: f64,
    ) -> RenderedBuffer {
        match self.noise_seed {
            Some(base) => render_seeded(
                frequency,
                duration,
                instrument,
                volume,
                derive_component_seed(base, instrument),
            ),
            None => render(frequency, duration, instrument, volume),
        }
    }
}

/// Number of samples for a note of `duration` seconds.
pub fn sample_count(duration: f64) -> usize {
    // `as` saturates: negative and NaN durations become 0
    (duration * SAMPLE_RATE as f64).round() as usize
}

/// Renders a note by instrument display name.
///
/// Unknown names render with the fallback sine recipe. The percussive noise of
/// the piano timbre is drawn from a fresh seed on every call.
pub fn render(frequency: f64, duration: f64, instrument: &str, volume: f64) -> RenderedBuffer {
    let def = InstrumentDef::for_name(instrument);
    let seed = if def.is_random() { fresh_seed() } else { 0 };
    render_def(def, frequency, duration, volume, &mut create_rng(seed))
}

/// Renders a note with a fixed noise seed. Fully deterministic.
pub fn render_seeded(
    frequency: f64,
    duration: f64,
    instrument: &str,
    volume: f64,
    seed: u32,
) -> RenderedBuffer {
    let def = InstrumentDef::for_name(instrument);
    render_def(def, frequency, duration, volume, &mut create_rng(seed))
}

/// Renders a note from a recipe.
pub fn render_def(
    def: &InstrumentDef,
    frequency: f64,
    duration: f64,
    volume: f64,
    rng: &mut Pcg32,
) -> RenderedBuffer {
    let num_samples = sample_count(duration);
    trace!(
        "rendering {} samples at {:.3} Hz, volume {:.3}",
        num_samples,
        frequency,
        volume
    );

    let mut signal = raw_signal(def, frequency, num_samples);

    if let Some(burst) = def.noise {
        let len = ((burst.duration * SAMPLE_RATE as f64) as usize).min(num_samples);
        for (sample, gain) in signal.iter_mut().zip(linear_fade(len)) {
            *sample += rng.gen_range(-burst.amplitude..burst.amplitude) * gain;
        }
    }

    let envelope = adsr_envelope(num_samples, &def.envelope, SAMPLE_RATE as f64);
    for (sample, env) in signal.iter_mut().zip(envelope.iter()) {
        *sample *= env;
    }

    let mono = quantize(&signal, volume);
    RenderedBuffer::from_mono(&mono)
}

/// Sum of the recipe's partials before noise, envelope or volume.
pub fn raw_signal(def: &InstrumentDef, frequency: f64, num_samples: usize) -> Vec<f64> {
    let sample_rate = SAMPLE_RATE as f64;

    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let freq = match def.vibrato {
                Some(vibrato) => {
                    frequency * (1.0 + vibrato.depth * (TWO_PI * vibrato.rate * t).sin())
                }
                None => frequency,
            };
            let phase = TWO_PI * freq * t;

            def.partials
                .iter()
                .map(|p| p.weight * p.waveform.sample(p.multiplier * phase))
                .sum::<f64>()
        })
        .collect()
}

/// Hard clips to [-1, 1], scales by volume and truncates to 16-bit PCM.
pub fn quantize(signal: &[f64], volume: f64) -> Vec<i16> {
    signal
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * volume * PCM_SCALE) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::Instrument;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(1.0), 44_100);
        assert_eq!(sample_count(6.0), 264_600);
        assert_eq!(sample_count(0.0), 0);
        assert_eq!(sample_count(-1.0), 0);
        assert_eq!(sample_count(f64::NAN), 0);
    }

    #[test]
    fn test_quantize_clips_and_truncates() {
        assert_eq!(
            quantize(&[2.0, -2.0, 0.5, -0.5, 0.0], 1.0),
            vec![32767, -32767, 16383, -16383, 0]
        );
        assert_eq!(quantize(&[1.0], 0.5), vec![16383]);
    }

    #[test]
    fn test_square_raw_signal_is_sign_valued() {
        let def = Instrument::Square.def();
        for s in raw_signal(def, 440.0, 44_100) {
            assert!(s == -1.0 || s == 0.0 || s == 1.0, "unexpected value {s}");
        }
    }

    #[test]
    fn test_square_render_follows_sign_times_envelope() {
        let def = Instrument::Square.def();
        let buffer = render(440.0, 1.0, "Square", 0.5);
        let raw = raw_signal(def, 440.0, 44_100);
        let envelope = adsr_envelope(44_100, &def.envelope, SAMPLE_RATE as f64);

        assert_eq!(buffer.frames(), 44_100);
        for (i, sample) in buffer.channel(0).enumerate() {
            let expected = (raw[i] * envelope[i] * 0.5 * PCM_SCALE) as i16;
            assert_eq!(sample, expected, "frame {i}");
        }
    }

    #[test]
    fn test_fallback_matches_explicit_fallback_def() {
        let by_name = render(330.0, 0.1, "Didgeridoo", 0.7);
        let by_def = render_def(
            &InstrumentDef::FALLBACK,
            330.0,
            0.1,
            0.7,
            &mut create_rng(0),
        );
        assert_eq!(by_name, by_def);
    }

    #[test]
    fn test_vibrato_changes_chiptune_only_slightly() {
        let chip = raw_signal(Instrument::Chiptune.def(), 261.625565, 2205);
        let square = raw_signal(Instrument::Square.def(), 261.625565, 2205);
        let differing = chip.iter().zip(&square).filter(|(a, b)| a != b).count();
        assert!(differing > 0);
        assert!(differing < chip.len() / 10);
    }

    #[test]
    fn test_seeded_piano_is_reproducible() {
        let a = render_seeded(261.625565, 0.5, "Piano-ish", 0.45, 9);
        let b = render_seeded(261.625565, 0.5, "Piano-ish", 0.45, 9);
        let c = render_seeded(261.625565, 0.5, "Piano-ish", 0.45, 10);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_noise_only_touches_the_click_window() {
        let a = render_seeded(261.625565, 0.5, "Piano-ish", 0.45, 1);
        let b = render_seeded(261.625565, 0.5, "Piano-ish", 0.45, 2);
        // 0.008 s click = 352 frames, interleaved stereo
        assert_eq!(&a.samples()[352 * 2..], &b.samples()[352 * 2..]);
    }

    #[test]
    fn test_note_synth_with_seed_is_deterministic() {
        let synth = NoteSynth::with_noise_seed(5);
        let a = synth.render(440.0, 0.2, "Piano-ish", 0.8);
        let b = synth.render(440.0, 0.2, "Piano-ish", 0.8);
        assert_eq!(a, b);
        assert_eq!(synth.noise_seed(), Some(5));
    }

    #[test]
    fn test_zero_duration_renders_empty_buffer() {
        let buffer = render(440.0, 0.0, "Bell", 1.0);
        assert_eq!(buffer.frames(), 0);
        assert!(buffer.samples().is_empty());
    }
}
