//! Computer-keyboard layout for one octave of keys plus the control keys.
//!
//! The home row plays the white keys and the row above it plays the black
//! keys:
//!
//! ```text
//!  W E   T Y U
//! A S D F G H J K
//! ```

use crate::pitch::PitchRequest;

/// One playable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    /// Character that triggers the key (lowercase).
    pub key: char,
    /// Semitones above the reference pitch.
    pub semitone_offset: u8,
    /// Whether this is a black (sharp) key.
    pub is_black: bool,
    /// Label shown on the key.
    pub label: &'static str,
}

const fn binding(key: char, semitone_offset: u8, is_black: bool, label: &'static str) -> KeyBinding {
    KeyBinding {
        key,
        semitone_offset,
        is_black,
        label,
    }
}

const DEFAULT_BINDINGS: [KeyBinding; 13] = [
    binding('a', 0, false, "A"),
    binding('w', 1, true, "W"),
    binding('s', 2, false, "S"),
    binding('e', 3, true, "E"),
    binding('d', 4, false, "D"),
    binding('f', 5, false, "F"),
    binding('t', 6, true, "T"),
    binding('g', 7, false, "G"),
    binding('y', 8, true, "Y"),
    binding('h', 9, false, "H"),
    binding('u', 10, true, "U"),
    binding('j', 11, false, "J"),
    binding('k', 12, false, "K"),
];

/// Non-note actions bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// `[` - one octave down.
    OctaveDown,
    /// `]` - one octave up.
    OctaveUp,
    /// `-` - quieter.
    VolumeDown,
    /// `=` - louder.
    VolumeUp,
}

impl Control {
    /// Control bound to `key`, if any.
    pub fn from_key(key: char) -> Option<Control> {
        match key {
            '[' => Some(Control::OctaveDown),
            ']' => Some(Control::OctaveUp),
            '-' => Some(Control::VolumeDown),
            '=' => Some(Control::VolumeUp),
            _ => None,
        }
    }
}

/// A fixed mapping from input keys to pitches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            bindings: DEFAULT_BINDINGS.to_vec(),
        }
    }
}

impl KeyMap {
    /// The binding for `key`, ignoring case.
    pub fn lookup(&self, key: char) -> Option<&KeyBinding> {
        let key = key.to_ascii_lowercase();
        self.bindings.iter().find(|b| b.key == key)
    }

    /// The pitch `key` plays at `octave_shift`, ignoring case.
    pub fn pitch(&self, key: char, octave_shift: i8) -> Option<PitchRequest> {
        self.lookup(key)
            .map(|b| PitchRequest::new(b.semitone_offset, octave_shift))
    }

    /// All bindings in pitch order.
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// White keys in pitch order.
    pub fn white_keys(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter().filter(|b| !b.is_black)
    }

    /// Black keys in pitch order.
    pub fn black_keys(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter().filter(|b| b.is_black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_layout_covers_one_octave() {
        let map = KeyMap::default();
        let offsets: Vec<u8> = map.bindings().iter().map(|b| b.semitone_offset).collect();
        assert_eq!(offsets, (0..=12).collect::<Vec<u8>>());
        assert_eq!(map.white_keys().count(), 8);
        assert_eq!(map.black_keys().count(), 5);
    }

    #[test]
    fn test_black_keys_are_sharps() {
        let map = KeyMap::default();
        let sharps: Vec<u8> = map.black_keys().map(|b| b.semitone_offset).collect();
        assert_eq!(sharps, vec![1, 3, 6, 8, 10]);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let map = KeyMap::default();
        assert_eq!(map.lookup('H').unwrap().semitone_offset, 9);
        assert_eq!(map.lookup('h').unwrap().label, "H");
        assert!(map.lookup('z').is_none());
    }

    #[test]
    fn test_pitch_applies_octave() {
        let map = KeyMap::default();
        let pitch = map.pitch('k', -1).unwrap();
        assert_eq!(pitch.total_semitones(), 0);
        assert_eq!(pitch.note_name(), "C4");
    }

    #[test]
    fn test_controls() {
        assert_eq!(Control::from_key('['), Some(Control::OctaveDown));
        assert_eq!(Control::from_key(']'), Some(Control::OctaveUp));
        assert_eq!(Control::from_key('-'), Some(Control::VolumeDown));
        assert_eq!(Control::from_key('='), Some(Control::VolumeUp));
        assert_eq!(Control::from_key('a'), None);
    }
}
