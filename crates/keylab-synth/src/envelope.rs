//! ADSR envelope generator.
//!
//! Notes are rendered up front, so the envelope is built as a whole curve of a
//! known length rather than stepped sample by sample. The four segments are
//! laid out back to back; when they do not fit, the sustain segment shrinks to
//! nothing and later segments are cut short.

/// ADSR envelope parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level (0.0 to 1.0).
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.08,
            sustain: 0.6,
            release: 0.15,
        }
    }
}

impl AdsrParams {
    /// Creates new ADSR parameters.
    pub const fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Segment lengths in samples, truncated toward zero.
    pub fn segment_samples(&self, sample_rate: f64) -> SegmentLengths {
        SegmentLengths {
            attack: seconds_to_samples(self.attack, sample_rate),
            decay: seconds_to_samples(self.decay, sample_rate),
            release: seconds_to_samples(self.release, sample_rate),
        }
    }
}

/// Sample counts of the timed envelope segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLengths {
    /// Attack length in samples.
    pub attack: usize,
    /// Decay length in samples.
    pub decay: usize,
    /// Release length in samples.
    pub release: usize,
}

impl SegmentLengths {
    /// Sustain length left over for a note of `total` samples.
    pub fn sustain_for(&self, total: usize) -> usize {
        total.saturating_sub(self.attack + self.decay + self.release)
    }
}

fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    // `as` saturates: negative and NaN become 0
    (seconds * sample_rate) as usize
}

/// Builds an ADSR amplitude curve of exactly `total_samples` values.
///
/// # Arguments
/// * `total_samples` - Length of the note in samples
/// * `params` - ADSR parameters
/// * `sample_rate` - Audio sample rate
///
/// # Returns
/// Vector of envelope values (0.0 to 1.0)
pub fn adsr_envelope(total_samples: usize, params: &AdsrParams, sample_rate: f64) -> Vec<f64> {
    let lengths = params.segment_samples(sample_rate);
    let sustain_samples = lengths.sustain_for(total_samples);
    let sustain = params.sustain.clamp(0.0, 1.0);

    let mut envelope = Vec::with_capacity(total_samples);

    // Attack: 0 -> 1, endpoint excluded
    let attack = lengths.attack;
    push_segment(&mut envelope, total_samples, attack, |i| {
        i as f64 / attack as f64
    });

    // Decay: 1 -> sustain, endpoint excluded
    let decay = lengths.decay;
    push_segment(&mut envelope, total_samples, decay, |i| {
        1.0 + (sustain - 1.0) * (i as f64 / decay as f64)
    });

    push_segment(&mut envelope, total_samples, sustain_samples, |_| sustain);

    // Release: last level -> 0, endpoint included
    let release = lengths.release;
    let start = envelope.last().copied().unwrap_or(sustain);
    push_segment(&mut envelope, total_samples, release, |i| {
        if release > 1 {
            start * (1.0 - i as f64 / (release - 1) as f64)
        } else {
            start
        }
    });

    envelope.resize(total_samples, 0.0);
    envelope
}

/// Appends up to `len` values of a ramp, stopping at `total` values.
fn push_segment(envelope: &mut Vec<f64>, total: usize, len: usize, value: impl Fn(usize) -> f64) {
    let room = total.saturating_sub(envelope.len());
    envelope.extend((0..len.min(room)).map(value));
}

/// Generates a linear fade from 1.0 down to 0.0 (both endpoints included).
///
/// # Arguments
/// * `len` - Number of samples in the fade
pub fn linear_fade(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let last = (len - 1) as f64;
            (0..len).map(|i| 1.0 - i as f64 / last).collect()
        }
    }
}
