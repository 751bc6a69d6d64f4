//! Basic waveform generators (sine, square, saw, triangle).
//!
//! Every generator is a pure function of an unwrapped phase in radians, so a
//! partial at `k` times the carrier frequency is evaluated at `k * phase`.

use std::f64::consts::PI;

/// Two times pi.
pub const TWO_PI: f64 = 2.0 * PI;

/// Periodic waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Pure sine.
    Sine,
    /// Sign of a sine: -1, 0 or 1.
    Square,
    /// Rising sawtooth in [-1, 1).
    Saw,
    /// Triangle folded from the sawtooth.
    Triangle,
}

impl Waveform {
    /// Evaluates the waveform at `phase` radians.
    #[inline]
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => sine(phase),
            Waveform::Square => square(phase),
            Waveform::Saw => sawtooth(phase),
            Waveform::Triangle => triangle(phase),
        }
    }
}

/// Sine oscillator.
#[inline]
pub fn sine(phase: f64) -> f64 {
    phase.sin()
}

/// Square oscillator as the sign of a sine.
///
/// Returns exactly 0.0 where the sine is zero.
#[inline]
pub fn square(phase: f64) -> f64 {
    let s = phase.sin();
    if s > 0.0 {
        1.0
    } else if s < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Sawtooth oscillator with period 2π.
///
/// `2 * (phase / 2π - floor(0.5 + phase / 2π))`
#[inline]
pub fn sawtooth(phase: f64) -> f64 {
    let cycles = phase / TWO_PI;
    2.0 * (cycles - (0.5 + cycles).floor())
}

/// Triangle oscillator, `2 * |saw(phase)| - 1`.
#[inline]
pub fn triangle(phase: f64) -> f64 {
    2.0 * sawtooth(phase).abs() - 1.0
}
