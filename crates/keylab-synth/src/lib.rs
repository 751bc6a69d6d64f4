//! Keylab Synthesis Engine
//!
//! This crate turns key presses into short stereo PCM notes for a small
//! keyboard instrument.
//!
//! # Overview
//!
//! A note is rendered from a pitch (semitone offset plus octave shift), an
//! instrument recipe and a master volume:
//!
//! - **Pitch mapping** - equal-tempered frequencies relative to C4
//! - **Oscillators** - sine, square, sawtooth and triangle waveforms
//! - **ADSR envelope** - per-instrument attack, decay, sustain and release
//! - **Instruments** - additive recipes with optional noise click and vibrato
//!
//! Rendered buffers are cached per (instrument, octave, semitone, volume) and
//! shared with playback through `Arc`. Changing any of those parameters
//! clears the cache.
//!
//! # Determinism
//!
//! Every instrument except Piano-ish is a pure function of its inputs.
//! Piano-ish adds a short burst of noise drawn from a PCG32 stream; pass a
//! seed through [`render_seeded`] or [`NoteSynth::with_noise_seed`] to make
//! it reproducible.
//!
//! # Example
//!
//! ```
//! use keylab_synth::{frequency, render};
//!
//! let buffer = render(frequency(9, 0), 0.5, "Organ", 0.45);
//! assert_eq!(buffer.frames(), 22_050);
//! assert_eq!(buffer.channels(), 2);
//! ```
//!
//! # Crate Structure
//!
//! - [`pitch`] - Semitone to frequency mapping and note names
//! - [`oscillator`] - Basic waveform generators
//! - [`envelope`] - ADSR envelope generator
//! - [`instrument`] - Instrument recipes
//! - [`synth`] - Note renderer
//! - [`cache`] - Render caches
//! - [`session`] - Note-on/note-off over a playback collaborator
//! - [`wav`] - Deterministic WAV file writer

pub mod buffer;
pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod instrument;
pub mod keymap;
pub mod oscillator;
pub mod pitch;
pub mod rng;
pub mod session;
pub mod state;
pub mod synth;
pub mod wav;

// Re-export main types at crate root
pub use buffer::RenderedBuffer;
pub use cache::{CacheStats, RenderCache, RenderKey, SharedRenderCache};
pub use config::SessionConfig;
pub use error::{SynthError, SynthResult};
pub use instrument::Instrument;
pub use keymap::{Control, KeyBinding, KeyMap};
pub use pitch::{frequency, note_name, PitchRequest};
pub use session::{ActiveNoteSet, KeyAction, Playback, PlaybackHandle, Session};
pub use state::SynthState;
pub use synth::{render, render_seeded, NoteRenderer, NoteSynth};
