//! Render cache and state integration tests.

use std::sync::Arc;

use keylab_synth::instrument::Instrument;
use keylab_synth::{
    frequency, render_seeded, NoteSynth, RenderCache, RenderKey, SharedRenderCache, SynthState,
};
use pretty_assertions::assert_eq;

const SHORT_NOTE: f64 = 0.05;

fn short_cache() -> RenderCache {
    RenderCache::with_note_duration(NoteSynth::new(), SHORT_NOTE)
}

// ============================================================================
// Cache Behavior Tests
// ============================================================================

#[test]
fn test_cached_piano_reuses_first_noise_draw() {
    let mut cache = short_cache();
    let key = SynthState::default().render_key(0);

    let first = cache.get_or_render(&key);
    let second = cache.get_or_render(&key);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.pcm_hash(), second.pcm_hash());
}

#[test]
fn test_cached_buffer_matches_direct_render() {
    let mut cache = RenderCache::with_note_duration(NoteSynth::with_noise_seed(3), SHORT_NOTE);
    let state = SynthState::new(Instrument::Bell, -1, 0.7);
    let buffer = cache.get_or_render(&state.render_key(5));

    let direct = render_seeded(frequency(5, -1), SHORT_NOTE, "Bell", 0.7, 0);
    assert_eq!(*buffer, direct);
}

#[test]
fn test_each_key_field_separates_entries() {
    let mut cache = short_cache();
    let base = SynthState::new(Instrument::Organ, 0, 0.5);

    cache.get_or_render(&base.render_key(0));
    cache.get_or_render(&base.render_key(1));
    cache.get_or_render(&base.octave_up().render_key(0));
    cache.get_or_render(&base.volume_up().render_key(0));
    cache.get_or_render(&base.with_instrument(Instrument::Saw).render_key(0));

    assert_eq!(cache.len(), 5);
    assert_eq!(cache.stats().misses, 5);
    assert_eq!(cache.stats().hits, 0);
}

#[test]
fn test_clear_then_request_recomputes() {
    let mut cache = short_cache();
    let key = RenderKey::new("Triangle", 0, 7, 0.45);

    let before = cache.get_or_render(&key);
    cache.clear();
    let after = cache.get_or_render(&key);

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before, after);
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn test_handed_out_buffer_survives_clear() {
    let mut cache = short_cache();
    let buffer = cache.get_or_render(&RenderKey::new("Sine", 0, 0, 0.45));
    cache.clear();
    assert_eq!(buffer.frames(), 2205);
}

// ============================================================================
// Shared Cache Tests
// ============================================================================

#[test]
fn test_shared_cache_across_threads() {
    let cache = SharedRenderCache::with_note_duration(NoteSynth::new(), SHORT_NOTE);
    let keys: Vec<RenderKey> = (0..=12)
        .map(|offset| RenderKey::new("Square", 0, offset, 0.45))
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for key in &keys {
                    cache.get_or_render(key);
                }
            });
        }
    });

    assert_eq!(cache.len(), 13);
    let stats = cache.stats();
    assert_eq!(stats.misses, 13);
    assert_eq!(stats.hits, 13 * 3);
}
