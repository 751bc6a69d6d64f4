//! Memoized note rendering.
//!
//! Buffers are keyed by every parameter that changes their content:
//! - Instrument display name
//! - Octave shift
//! - Semitone offset
//! - Volume rounded to three decimals
//!
//! The cache has no eviction. Callers clear it wholesale whenever one of the
//! keyed session parameters changes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use log::debug;
use parking_lot::Mutex;

use crate::buffer::RenderedBuffer;
use crate::config::NOTE_DURATION_SECONDS;
use crate::pitch::frequency;
use crate::synth::{NoteRenderer, NoteSynth};

/// Cache key components for deterministic buffer lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    instrument: String,
    octave_shift: i8,
    semitone_offset: u8,
    /// Volume in thousandths.
    volume_millis: u32,
}

impl RenderKey {
    /// Creates a key, rounding the volume to three decimals.
    pub fn new(
        instrument: impl Into<String>,
        octave_shift: i8,
        semitone_offset: u8,
        volume: f64,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            octave_shift,
            semitone_offset,
            volume_millis: (volume * 1000.0).round() as u32,
        }
    }

    /// Instrument display name.
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Octave shift.
    pub fn octave_shift(&self) -> i8 {
        self.octave_shift
    }

    /// Semitone offset.
    pub fn semitone_offset(&self) -> u8 {
        self.semitone_offset
    }

    /// Rounded volume.
    pub fn volume(&self) -> f64 {
        self.volume_millis as f64 / 1000.0
    }

    /// Frequency of the keyed note in Hz.
    pub fn frequency(&self) -> f64 {
        frequency(self.semitone_offset, self.octave_shift)
    }

    fn render_with<R: NoteRenderer + ?Sized>(&self, renderer: &R, duration: f64) -> RenderedBuffer {
        renderer.render(self.frequency(), duration, &self.instrument, self.volume())
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to render.
    pub misses: u64,
}

/// Single-threaded render cache.
#[derive(Debug)]
pub struct RenderCache<R = NoteSynth> {
    renderer: R,
    note_duration: f64,
    entries: HashMap<RenderKey, Arc<RenderedBuffer>>,
    stats: CacheStats,
}

impl Default for RenderCache<NoteSynth> {
    fn default() -> Self {
        Self::new(NoteSynth::new())
    }
}

impl<R: NoteRenderer> RenderCache<R> {
    /// Creates an empty cache rendering notes of the default length.
    pub fn new(renderer: R) -> Self {
        Self::with_note_duration(renderer, NOTE_DURATION_SECONDS)
    }

    /// Creates an empty cache rendering notes of `note_duration` seconds.
    pub fn with_note_duration(renderer: R, note_duration: f64) -> Self {
        Self {
            renderer,
            note_duration,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Returns the buffer for `key`, rendering it on first use.
    pub fn get_or_render(&mut self, key: &RenderKey) -> Arc<RenderedBuffer> {
        if let Some(buffer) = self.entries.get(key) {
            self.stats.hits += 1;
            debug!("render cache hit: {:?}", key);
            return Arc::clone(buffer);
        }

        self.stats.misses += 1;
        debug!("render cache miss: {:?}", key);
        let buffer = Arc::new(key.render_with(&self.renderer, self.note_duration));
        self.entries.insert(key.clone(), Arc::clone(&buffer));
        buffer
    }

    /// Whether `key` is already rendered.
    pub fn contains(&self, key: &RenderKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drops every stored buffer.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!("clearing {} cached buffers", self.entries.len());
        }
        self.entries.clear();
    }

    /// Number of stored buffers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit and miss counters since creation.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Length of rendered notes in seconds.
    pub fn note_duration(&self) -> f64 {
        self.note_duration
    }

    /// The underlying renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

type Slot = Arc<OnceLock<Arc<RenderedBuffer>>>;

/// Render cache that can be shared between threads.
///
/// At most one render runs per key: a request arriving while the same key is
/// being rendered blocks until that render finishes and reuses its buffer.
#[derive(Debug)]
pub struct SharedRenderCache<R = NoteSynth> {
    renderer: R,
    note_duration: f64,
    entries: Mutex<HashMap<RenderKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<R: NoteRenderer + Send + Sync> SharedRenderCache<R> {
    /// Creates an empty cache rendering notes of the default length.
    pub fn new(renderer: R) -> Self {
        Self::with_note_duration(renderer, NOTE_DURATION_SECONDS)
    }

    /// Creates an empty cache rendering notes of `note_duration` seconds.
    pub fn with_note_duration(renderer: R, note_duration: f64) -> Self {
        Self {
            renderer,
            note_duration,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the buffer for `key`, rendering it on first use.
    pub fn get_or_render(&self, key: &RenderKey) -> Arc<RenderedBuffer> {
        // The map lock is held only to find the slot, never while rendering
        let slot = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(key.clone()).or_default())
        };

        let mut rendered_here = false;
        let buffer = slot.get_or_init(|| {
            rendered_here = true;
            debug!("shared render cache miss: {:?}", key);
            Arc::new(key.render_with(&self.renderer, self.note_duration))
        });

        if rendered_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Arc::clone(buffer)
    }

    /// Drops every stored buffer.
    ///
    /// Keys still being rendered keep their slot, so a request arriving after
    /// the clear waits for that render instead of starting a second one.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, slot| slot.get().is_none());
        debug!(
            "cleared {} shared buffers, {} renders in flight",
            before - entries.len(),
            entries.len()
        );
    }

    /// Number of keys stored or being rendered.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Hit and miss counters since creation.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
