//! Offline playback: started buffers are placed on a timeline and mixed down.
//!
//! [`TimelinePlayback`] stands in for a sound device. The caller moves the
//! cursor forward as the performance advances; buffers start at the cursor
//! and a fade-out requested through a [`TimelineHandle`] begins at the
//! cursor position current when it is requested.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use keylab_synth::config::{CHANNELS, SAMPLE_RATE};
use keylab_synth::{Playback, PlaybackHandle, RenderedBuffer};

/// Converts milliseconds to sample frames.
///
/// Saturates instead of overflowing for absurdly long times.
pub fn ms_to_frames(ms: u64) -> usize {
    let frames = ms.saturating_mul(SAMPLE_RATE as u64) / 1000;
    usize::try_from(frames).unwrap_or(usize::MAX)
}

#[derive(Debug)]
struct Voice {
    start: usize,
    buffer: Arc<RenderedBuffer>,
    /// Frame the fade starts at and its length in frames.
    release: Option<(usize, usize)>,
}

impl Voice {
    fn end(&self) -> usize {
        let natural = self.start.saturating_add(self.buffer.frames());
        match self.release {
            Some((at, fade)) => natural.min(at.saturating_add(fade)),
            None => natural,
        }
    }

    fn gain_at(&self, frame: usize) -> f64 {
        match self.release {
            Some((at, fade)) if frame >= at => {
                if fade == 0 {
                    0.0
                } else {
                    1.0 - (frame - at) as f64 / fade as f64
                }
            }
            _ => 1.0,
        }
    }
}

#[derive(Debug, Default)]
struct TimelineState {
    cursor: usize,
    voices: Vec<Voice>,
}

/// Playback target that records started buffers on a timeline.
#[derive(Debug, Clone, Default)]
pub struct TimelinePlayback {
    state: Rc<RefCell<TimelineState>>,
    max_voices: Option<usize>,
}

impl TimelinePlayback {
    /// Creates an empty timeline with unlimited polyphony.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty timeline that refuses to start a buffer while
    /// `max_voices` are already sounding.
    pub fn with_max_voices(max_voices: usize) -> Self {
        Self {
            max_voices: Some(max_voices),
            ..Self::default()
        }
    }

    /// Moves the cursor to `ms` milliseconds from the start.
    pub fn seek_ms(&self, ms: u64) {
        self.state.borrow_mut().cursor = ms_to_frames(ms);
    }

    /// Cursor position in frames.
    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }

    /// Number of buffers started so far.
    pub fn voice_count(&self) -> usize {
        self.state.borrow().voices.len()
    }

    /// Number of buffers audible at the cursor.
    pub fn sounding(&self) -> usize {
        let state = self.state.borrow();
        state
            .voices
            .iter()
            .filter(|v| v.start <= state.cursor && state.cursor < v.end())
            .count()
    }

    /// Length of the mix in frames.
    pub fn frames(&self) -> usize {
        self.state
            .borrow()
            .voices
            .iter()
            .map(Voice::end)
            .max()
            .unwrap_or(0)
    }

    /// Sums every voice into one stereo buffer, saturating at 16 bits.
    pub fn mixdown(&self) -> RenderedBuffer {
        let channels = CHANNELS as usize;
        let mut mix = vec![0.0f64; self.frames() * channels];

        let state = self.state.borrow();
        for voice in &state.voices {
            let frames = voice.end() - voice.start;
            let source = voice.buffer.samples().chunks_exact(channels).take(frames);
            for (i, frame) in source.enumerate() {
                let position = voice.start + i;
                let gain = voice.gain_at(position);
                for (c, &sample) in frame.iter().enumerate() {
                    mix[position * channels + c] += sample as f64 * gain;
                }
            }
        }

        let samples = mix
            .into_iter()
            .map(|s| s.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16)
            .collect();
        RenderedBuffer::from_stereo(samples)
    }
}

/// Handle to one buffer on a [`TimelinePlayback`].
#[derive(Debug)]
pub struct TimelineHandle {
    state: Rc<RefCell<TimelineState>>,
    voice: usize,
}

impl PlaybackHandle for TimelineHandle {
    fn fade_out(&mut self, duration_ms: u32) {
        let mut state = self.state.borrow_mut();
        let cursor = state.cursor;
        if let Some(voice) = state.voices.get_mut(self.voice) {
            // only the first release counts
            if voice.release.is_none() {
                voice.release = Some((cursor.max(voice.start), ms_to_frames(duration_ms as u64)));
            }
        }
    }
}

impl Playback for TimelinePlayback {
    type Handle = TimelineHandle;

    fn play(&mut self, buffer: Arc<RenderedBuffer>) -> Option<TimelineHandle> {
        if let Some(max) = self.max_voices {
            if self.sounding() >= max {
                return None;
            }
        }

        let mut state = self.state.borrow_mut();
        let start = state.cursor;
        state.voices.push(Voice {
            start,
            buffer,
            release: None,
        });
        Some(TimelineHandle {
            state: Rc::clone(&self.state),
            voice: state.voices.len() - 1,
        })
    }
}
