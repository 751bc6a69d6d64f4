//! Perform command implementation
//!
//! Plays a key script through a session and writes the result as one WAV
//! file.
//!
//! A script is a whitespace-separated list of steps:
//! - a group of note keys (`a`, `adg`) presses those keys together
//! - `.` rests for one step
//! - `[` `]` `-` `=` shift octave or volume before the next step
//! - `@name` switches instrument (`@organ`, `@Piano-ish`)
//!
//! Every note is held for the hold time, then released with the standard
//! fade.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use keylab_synth::instrument::Instrument;
use keylab_synth::wav::write_wav_file;
use keylab_synth::{Control, KeyAction, KeyMap, RenderedBuffer, Session, SessionConfig};
use log::debug;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::settings::load_session_config;
use crate::timeline::TimelinePlayback;

/// One parsed script step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Keys pressed together.
    Chord(Vec<char>),
    /// Silence for one step.
    Rest,
    /// Control key.
    Control(Control),
    /// Instrument switch.
    Instrument(Instrument),
}

/// Options for a performance.
#[derive(Debug, Clone)]
pub struct PerformOptions {
    pub script: String,
    /// Time between steps in milliseconds.
    pub step_ms: u64,
    /// How long each note is held; defaults to the step time.
    pub hold_ms: Option<u64>,
    pub config: Option<PathBuf>,
    pub instrument: Option<String>,
    pub octave: Option<i8>,
    pub volume: Option<f64>,
    pub seed: Option<u32>,
    /// Polyphony limit of the playback target.
    pub max_voices: Option<usize>,
    pub out: PathBuf,
}

/// Machine-readable description of a performance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformSummary {
    pub notes_played: usize,
    pub presses_ignored: usize,
    pub frames: usize,
    pub duration_seconds: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub pcm_hash: String,
    pub output: String,
}

/// Parses a key script.
pub fn parse_script(script: &str, keymap: &KeyMap) -> Result<Vec<Step>> {
    let mut steps = Vec::new();

    for token in script.split_whitespace() {
        if token == "." {
            steps.push(Step::Rest);
            continue;
        }
        if let Some(name) = token.strip_prefix('@') {
            steps.push(Step::Instrument(name.parse()?));
            continue;
        }

        let mut chord = Vec::new();
        for key in token.chars() {
            if let Some(control) = Control::from_key(key) {
                steps.push(Step::Control(control));
            } else if keymap.lookup(key).is_some() {
                chord.push(key);
            } else {
                bail!("unknown key '{}' in step '{}'", key, token);
            }
        }
        if !chord.is_empty() {
            steps.push(Step::Chord(chord));
        }
    }

    Ok(steps)
}

/// Builds the session configuration from the config file and overrides.
pub fn session_config(options: &PerformOptions) -> Result<SessionConfig> {
    let mut config = load_session_config(options.config.as_deref())?;
    if let Some(instrument) = &options.instrument {
        config.instrument = instrument.clone();
    }
    if let Some(octave) = options.octave {
        config.octave_shift = octave;
    }
    if let Some(volume) = options.volume {
        config.volume = volume;
    }
    if options.seed.is_some() {
        config.noise_seed = options.seed;
    }
    Ok(config)
}

/// Performs the steps offline and returns the mixed result.
pub fn perform(
    steps: &[Step],
    config: &SessionConfig,
    options: &PerformOptions,
) -> Result<(RenderedBuffer, PerformSummary)> {
    let playback = match options.max_voices {
        Some(max) => TimelinePlayback::with_max_voices(max),
        None => TimelinePlayback::new(),
    };
    let keymap = KeyMap::default();
    let mut session: Session<TimelinePlayback, char> = Session::from_config(playback, config)?;

    let hold_ms = options.hold_ms.unwrap_or(options.step_ms);
    let mut now = 0u64;
    let mut pending: Vec<(u64, char)> = Vec::new();
    let mut notes_played = 0;
    let mut presses_ignored = 0;

    for step in steps {
        match step {
            Step::Control(control) => session.apply_control(*control),
            Step::Instrument(instrument) => session.select_instrument(*instrument),
            Step::Rest => now = now.saturating_add(options.step_ms),
            Step::Chord(keys) => {
                release_due(&mut session, &keymap, &mut pending, now);
                session.playback().seek_ms(now);
                for &key in keys {
                    match session.key_down(&keymap, key) {
                        KeyAction::NoteOn(_) => {
                            notes_played += 1;
                            pending.push((now.saturating_add(hold_ms), key));
                        }
                        _ => presses_ignored += 1,
                    }
                }
                now = now.saturating_add(options.step_ms);
            }
        }
    }
    release_due(&mut session, &keymap, &mut pending, u64::MAX);

    let mix = session.playback().mixdown();
    let stats = session.cache().stats();
    debug!(
        "performed {} notes, cache hits {} misses {}",
        notes_played, stats.hits, stats.misses
    );

    let summary = PerformSummary {
        notes_played,
        presses_ignored,
        frames: mix.frames(),
        duration_seconds: mix.duration_seconds(),
        cache_hits: stats.hits,
        cache_misses: stats.misses,
        pcm_hash: mix.pcm_hash(),
        output: options.out.display().to_string(),
    };
    Ok((mix, summary))
}

/// Releases every pending key due at or before `until`, in time order.
fn release_due(
    session: &mut Session<TimelinePlayback, char>,
    keymap: &KeyMap,
    pending: &mut Vec<(u64, char)>,
    until: u64,
) {
    pending.sort_by_key(|&(at, _)| at);
    let due = pending.iter().take_while(|&&(at, _)| at <= until).count();
    for (at, key) in pending.drain(..due) {
        session.playback().seek_ms(at);
        session.key_up(keymap, key);
    }
}

/// Run the perform command
///
/// # Returns
/// Exit code: 0 on success
pub fn run(options: &PerformOptions, json: bool) -> Result<ExitCode> {
    if options.step_ms == 0 {
        bail!("step time must be at least 1 ms");
    }
    let steps = parse_script(&options.script, &KeyMap::default())?;
    let config = session_config(options)?;
    let (mix, summary) = perform(&steps, &config, options)?;

    write_wav_file(&options.out, &mix)
        .with_context(|| format!("Failed to write WAV file: {}", options.out.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Performance".cyan().bold());
    println!("  {}: {}", "Notes".dimmed(), summary.notes_played);
    if summary.presses_ignored > 0 {
        println!(
            "  {}: {}",
            "Ignored presses".yellow(),
            summary.presses_ignored
        );
    }
    println!(
        "  {}: {} frames ({:.3} s)",
        "Length".dimmed(),
        summary.frames,
        summary.duration_seconds
    );
    println!(
        "  {}: {} hits, {} misses",
        "Render cache".dimmed(),
        summary.cache_hits,
        summary.cache_misses
    );
    println!("  {}: {}", "PCM hash".dimmed(), summary.pcm_hash);
    println!("  {} wrote {}", "SUCCESS".green().bold(), summary.output);

    Ok(ExitCode::SUCCESS)
}
