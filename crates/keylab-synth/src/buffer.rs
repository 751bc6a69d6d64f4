//! Rendered note buffers.

use crate::config::{CHANNELS, SAMPLE_RATE};
use crate::wav::{self, i16_to_pcm};

/// Interleaved stereo 16-bit PCM produced by one render.
///
/// Buffers are immutable once rendered and are shared with playback through
/// an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl RenderedBuffer {
    /// Duplicates a mono signal into interleaved left/right pairs.
    pub fn from_mono(mono: &[i16]) -> Self {
        let mut samples = Vec::with_capacity(mono.len() * 2);
        for &s in mono {
            samples.push(s);
            samples.push(s);
        }
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
        }
    }

    /// Wraps already interleaved stereo samples.
    ///
    /// A trailing half frame is dropped.
    pub fn from_stereo(mut samples: Vec<i16>) -> Self {
        samples.truncate(samples.len() - samples.len() % CHANNELS as usize);
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
        }
    }

    /// Interleaved samples (`L R L R ...`).
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Playback length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> impl Iterator<Item = i16> + '_ {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels as usize)
            .copied()
    }

    /// Little-endian PCM bytes.
    pub fn pcm_bytes(&self) -> Vec<u8> {
        i16_to_pcm(&self.samples)
    }

    /// BLAKE3 hash of the PCM data, as lowercase hex.
    pub fn pcm_hash(&self) -> String {
        blake3::hash(&self.pcm_bytes()).to_hex().to_string()
    }

    /// Encodes the buffer as a complete WAV file.
    pub fn to_wav(&self) -> Vec<u8> {
        wav::encode(self)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> i16 {
        self.samples
            .iter()
            .map(|s| s.saturating_abs())
            .max()
            .unwrap_or(0)
    }
}
