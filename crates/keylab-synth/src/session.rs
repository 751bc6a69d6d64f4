//! Note-on/note-off control over a playback collaborator.
//!
//! A [`Session`] ties together the current [`SynthState`], the
//! [`RenderCache`] and the set of notes currently sounding. Audio output is
//! not part of this crate: callers supply a [`Playback`] that starts buffers
//! and hands back a [`PlaybackHandle`] for each one.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use log::debug;

use crate::buffer::RenderedBuffer;
use crate::cache::RenderCache;
use crate::config::{SessionConfig, RELEASE_FADE_MS};
use crate::error::SynthResult;
use crate::instrument::Instrument;
use crate::keymap::{Control, KeyMap};
use crate::state::SynthState;
use crate::synth::{NoteRenderer, NoteSynth};

/// A sounding buffer that can be faded out.
pub trait PlaybackHandle {
    /// Fades the sound to silence over `duration_ms` and stops it.
    fn fade_out(&mut self, duration_ms: u32);
}

/// Something that can start playing rendered buffers.
pub trait Playback {
    /// Handle to one started buffer.
    type Handle: PlaybackHandle;

    /// Starts `buffer`. Returns `None` if nothing could be started.
    fn play(&mut self, buffer: Arc<RenderedBuffer>) -> Option<Self::Handle>;
}

/// Notes currently sounding, keyed by the input that triggered them.
///
/// Holds at most one handle per key.
#[derive(Debug)]
pub struct ActiveNoteSet<K, H> {
    notes: HashMap<K, H>,
}

impl<K, H> Default for ActiveNoteSet<K, H> {
    fn default() -> Self {
        Self {
            notes: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, H> ActiveNoteSet<K, H> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handle` under `key` unless the key is already sounding.
    ///
    /// Returns the handle back if the key was taken.
    pub fn insert(&mut self, key: K, handle: H) -> Result<(), H> {
        if self.notes.contains_key(&key) {
            return Err(handle);
        }
        self.notes.insert(key, handle);
        Ok(())
    }

    /// Removes and returns the handle for `key`.
    pub fn remove(&mut self, key: &K) -> Option<H> {
        self.notes.remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.notes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Keys of the sounding notes, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.notes.keys()
    }

    /// Removes every handle.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, H)> + '_ {
        self.notes.drain()
    }
}

/// An interactive playing session.
///
/// `K` identifies the input that triggers a note (a key character, a MIDI
/// note number, ...).
pub struct Session<P: Playback, K, R = NoteSynth> {
    playback: P,
    state: SynthState,
    cache: RenderCache<R>,
    active: ActiveNoteSet<K, P::Handle>,
}

impl<P: Playback, K: Eq + Hash> Session<P, K, NoteSynth> {
    /// Starts a session with default parameters.
    pub fn new(playback: P) -> Self {
        Self::with_cache(playback, SynthState::default(), RenderCache::default())
    }

    /// Starts a session from a validated configuration.
    pub fn from_config(playback: P, config: &SessionConfig) -> SynthResult<Self> {
        config.validate()?;
        let state = SynthState::from_config(config)?;
        let synth = match config.noise_seed {
            Some(seed) => NoteSynth::with_noise_seed(seed),
            None => NoteSynth::new(),
        };
        let cache = RenderCache::with_note_duration(synth, config.note_duration_seconds);
        Ok(Self::with_cache(playback, state, cache))
    }
}

impl<P: Playback, K: Eq + Hash, R: NoteRenderer> Session<P, K, R> {
    /// Starts a session over an existing cache.
    pub fn with_cache(playback: P, state: SynthState, cache: RenderCache<R>) -> Self {
        Self {
            playback,
            state,
            cache,
            active: ActiveNoteSet::new(),
        }
    }

    /// Starts the note at `semitone_offset` for input `id`.
    ///
    /// Does nothing while `id` is still sounding. Returns true if a new note
    /// started.
    pub fn note_on(&mut self, id: K, semitone_offset: u8) -> bool {
        if self.active.contains(&id) {
            return false;
        }

        let key = self.state.render_key(semitone_offset);
        let buffer = self.cache.get_or_render(&key);
        match self.playback.play(buffer) {
            Some(handle) => {
                debug!("note on: {:?}", key);
                self.active.insert(id, handle).is_ok()
            }
            None => {
                debug!("playback refused {:?}", key);
                false
            }
        }
    }

    /// Fades out the note started by `id`. Returns false if it was not
    /// sounding.
    pub fn note_off(&mut self, id: &K) -> bool {
        match self.active.remove(id) {
            Some(mut handle) => {
                handle.fade_out(RELEASE_FADE_MS);
                true
            }
            None => false,
        }
    }

    /// Fades out every sounding note.
    pub fn release_all(&mut self) {
        for (_, mut handle) in self.active.drain() {
            handle.fade_out(RELEASE_FADE_MS);
        }
    }

    /// Replaces the synthesis parameters, clearing cached buffers if notes
    /// would render differently. Sounding notes keep playing.
    pub fn set_state(&mut self, state: SynthState) {
        if self.state.affects_render(&state) {
            debug!(
                "parameters changed: {} octave {} volume {:.2}",
                state.instrument(),
                state.octave_shift(),
                state.volume()
            );
            self.cache.clear();
        }
        self.state = state;
    }

    pub fn octave_up(&mut self) {
        self.set_state(self.state.octave_up());
    }

    pub fn octave_down(&mut self) {
        self.set_state(self.state.octave_down());
    }

    pub fn volume_up(&mut self) {
        self.set_state(self.state.volume_up());
    }

    pub fn volume_down(&mut self) {
        self.set_state(self.state.volume_down());
    }

    pub fn select_instrument(&mut self, instrument: Instrument) {
        self.set_state(self.state.with_instrument(instrument));
    }

    /// Advances to the next instrument in display order.
    pub fn cycle_instrument(&mut self) {
        self.select_instrument(self.state.instrument().next());
    }

    /// Applies a control key action.
    pub fn apply_control(&mut self, control: Control) {
        match control {
            Control::OctaveDown => self.octave_down(),
            Control::OctaveUp => self.octave_up(),
            Control::VolumeDown => self.volume_down(),
            Control::VolumeUp => self.volume_up(),
        }
    }

    pub fn state(&self) -> SynthState {
        self.state
    }

    pub fn cache(&self) -> &RenderCache<R> {
        &self.cache
    }

    pub fn active_notes(&self) -> &ActiveNoteSet<K, P::Handle> {
        &self.active
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }
}

/// What a key event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// A note started.
    NoteOn(u8),
    /// A note was released.
    NoteOff(u8),
    /// A control key was applied.
    Control(Control),
    /// The key is unbound, or its note was already in the requested state.
    Ignored,
}

impl<P: Playback, R: NoteRenderer> Session<P, char, R> {
    /// Handles a key press through `keymap`.
    pub fn key_down(&mut self, keymap: &KeyMap, key: char) -> KeyAction {
        if let Some(control) = Control::from_key(key) {
            self.apply_control(control);
            return KeyAction::Control(control);
        }
        match keymap.lookup(key) {
            Some(binding) => {
                let binding = *binding;
                if self.note_on(binding.key, binding.semitone_offset) {
                    KeyAction::NoteOn(binding.semitone_offset)
                } else {
                    KeyAction::Ignored
                }
            }
            None => KeyAction::Ignored,
        }
    }

    /// Handles a key release through `keymap`.
    pub fn key_up(&mut self, keymap: &KeyMap, key: char) -> KeyAction {
        match keymap.lookup(key) {
            Some(binding) if self.note_off(&binding.key) => {
                KeyAction::NoteOff(binding.semitone_offset)
            }
            _ => KeyAction::Ignored,
        }
    }
}
