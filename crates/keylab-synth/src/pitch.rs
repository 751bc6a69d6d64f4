//! Pitch mapping from keyboard offsets to equal-tempered frequencies.

use crate::config::{BASE_FREQ, MAX_OCTAVE_SHIFT, MIN_OCTAVE_SHIFT};

/// Note names within one octave, starting at C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave number of the reference pitch.
const BASE_OCTAVE: i32 = 4;

/// A logical pitch as produced by the key layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchRequest {
    /// Semitones above the reference pitch (0..=12).
    pub semitone_offset: u8,
    /// Whole-octave shift, already clamped to the allowed range.
    pub octave_shift: i8,
}

impl PitchRequest {
    /// Creates a request, clamping the octave shift.
    pub fn new(semitone_offset: u8, octave_shift: i8) -> Self {
        Self {
            semitone_offset,
            octave_shift: clamp_octave_shift(octave_shift),
        }
    }

    /// Total semitones above the reference pitch.
    pub fn total_semitones(&self) -> i32 {
        self.semitone_offset as i32 + self.octave_shift as i32 * 12
    }

    /// Frequency of this pitch in Hz.
    pub fn frequency(&self) -> f64 {
        frequency(self.semitone_offset, self.octave_shift)
    }

    /// Scientific pitch label such as `C4` or `F#5`.
    pub fn note_name(&self) -> String {
        note_name(self.semitone_offset, self.octave_shift)
    }
}

/// Clamps an octave shift to the supported range.
pub fn clamp_octave_shift(octave_shift: i8) -> i8 {
    octave_shift.clamp(MIN_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT)
}

/// Converts a semitone offset and octave shift into a frequency in Hz.
///
/// `freq = 261.625565 * 2^((offset + 12 * octave_shift) / 12)`
pub fn frequency(semitone_offset: u8, octave_shift: i8) -> f64 {
    let total = semitone_offset as i32 + octave_shift as i32 * 12;
    BASE_FREQ * 2.0_f64.powf(total as f64 / 12.0)
}

/// Returns the scientific pitch label for a semitone offset and octave shift.
pub fn note_name(semitone_offset: u8, octave_shift: i8) -> String {
    let total = semitone_offset as i32 + octave_shift as i32 * 12;
    let name = NOTE_NAMES[total.rem_euclid(12) as usize];
    let octave = BASE_OCTAVE + total.div_euclid(12);
    format!("{}{}", name, octave)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_pitch() {
        assert_eq!(frequency(0, 0), 261.625565);
    }

    #[test]
    fn test_octave_equals_twelve_semitones() {
        assert!((frequency(12, 0) - 523.25113).abs() < 1e-6);
        assert!((frequency(0, 1) - 523.25113).abs() < 1e-6);
        assert_eq!(frequency(12, 0), frequency(0, 1));
    }

    #[test]
    fn test_a4_is_440() {
        assert!((frequency(9, 0) - 440.0).abs() < 0.001);
    }

    #[test]
    fn test_monotonic_over_full_range() {
        let mut pitches: Vec<(i32, f64)> = Vec::new();
        for octave in MIN_OCTAVE_SHIFT..=MAX_OCTAVE_SHIFT {
            for offset in 0..=12u8 {
                let total = offset as i32 + octave as i32 * 12;
                let freq = frequency(offset, octave);
                assert!(freq > 0.0);
                let expected = BASE_FREQ * 2.0_f64.powf(total as f64 / 12.0);
                assert!((freq - expected).abs() < 1e-9);
                pitches.push((total, freq));
            }
        }

        pitches.sort_by_key(|&(total, _)| total);
        for pair in pitches.windows(2) {
            if pair[0].0 < pair[1].0 {
                assert!(pair[0].1 < pair[1].1);
            }
        }
    }

    #[test]
    fn test_note_names() {
        assert_eq!(note_name(0, 0), "C4");
        assert_eq!(note_name(6, 1), "F#5");
        assert_eq!(note_name(12, 0), "C5");
        assert_eq!(note_name(10, -2), "A#2");
        assert_eq!(note_name(11, -1), "B3");
    }

    #[test]
    fn test_request_clamps_octave() {
        let request = PitchRequest::new(3, 9);
        assert_eq!(request.octave_shift, MAX_OCTAVE_SHIFT);
        assert_eq!(request.total_semitones(), 27);
        assert_eq!(PitchRequest::new(0, -5).octave_shift, MIN_OCTAVE_SHIFT);
    }
}
