//! Render command implementation
//!
//! Renders a single note to a WAV file and reports its fingerprint.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use keylab_synth::instrument::Instrument;
use keylab_synth::wav::write_wav_file;
use keylab_synth::{render, render_seeded, PitchRequest, RenderedBuffer, SynthState};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Options for a single-note render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub instrument: String,
    pub semitone: u8,
    pub octave: i8,
    pub volume: f64,
    pub duration: f64,
    /// Fixed noise seed; `None` draws fresh noise.
    pub seed: Option<u32>,
    pub out: Option<PathBuf>,
}

/// Machine-readable description of a rendered note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSummary {
    pub instrument: String,
    pub note: String,
    pub frequency_hz: f64,
    pub frames: usize,
    pub duration_seconds: f64,
    pub peak: i16,
    pub pcm_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Renders the requested note without writing anything.
pub fn render_note(options: &RenderOptions) -> Result<(RenderedBuffer, RenderSummary)> {
    let instrument: Instrument = options.instrument.parse()?;
    let state = SynthState::validate(instrument, options.octave, options.volume)?;
    if !options.duration.is_finite() || options.duration <= 0.0 {
        bail!("duration must be a positive number of seconds");
    }

    let pitch = PitchRequest::new(options.semitone, state.octave_shift());
    let frequency = pitch.frequency();
    let buffer = match options.seed {
        Some(seed) => render_seeded(
            frequency,
            options.duration,
            instrument.name(),
            state.volume(),
            seed,
        ),
        None => render(frequency, options.duration, instrument.name(), state.volume()),
    };

    let summary = RenderSummary {
        instrument: instrument.name().to_string(),
        note: pitch.note_name(),
        frequency_hz: frequency,
        frames: buffer.frames(),
        duration_seconds: buffer.duration_seconds(),
        peak: buffer.peak(),
        pcm_hash: buffer.pcm_hash(),
        output: options.out.as_ref().map(|p| p.display().to_string()),
    };
    Ok((buffer, summary))
}

/// Run the render command
///
/// # Returns
/// Exit code: 0 on success
pub fn run(options: &RenderOptions, json: bool) -> Result<ExitCode> {
    let (buffer, summary) = render_note(options)?;

    if let Some(path) = &options.out {
        write_wav_file(path, &buffer)
            .with_context(|| format!("Failed to write WAV file: {}", path.display()))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} {} {}",
        "Rendered".cyan().bold(),
        summary.instrument.bold(),
        summary.note
    );
    println!("  {}: {:.3} Hz", "Frequency".dimmed(), summary.frequency_hz);
    println!(
        "  {}: {} frames ({:.3} s)",
        "Length".dimmed(),
        summary.frames,
        summary.duration_seconds
    );
    println!("  {}: {}", "Peak".dimmed(), summary.peak);
    println!("  {}: {}", "PCM hash".dimmed(), summary.pcm_hash);
    match &summary.output {
        Some(path) => println!("  {} wrote {}", "SUCCESS".green().bold(), path),
        None => println!("  {}", "No output file requested".dimmed()),
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options() -> RenderOptions {
        RenderOptions {
            instrument: "Organ".to_string(),
            semitone: 9,
            octave: 0,
            volume: 0.45,
            duration: 0.25,
            seed: None,
            out: None,
        }
    }

    #[test]
    fn test_render_note_summary() {
        let (buffer, summary) = render_note(&options()).unwrap();
        assert_eq!(summary.instrument, "Organ");
        assert_eq!(summary.note, "A4");
        assert!((summary.frequency_hz - 440.0).abs() < 1e-5);
        assert_eq!(summary.frames, 11_025);
        assert_eq!(summary.pcm_hash, buffer.pcm_hash());
    }

    #[test]
    fn test_instrument_name_is_case_insensitive() {
        let opts = RenderOptions {
            instrument: "piano-ish".to_string(),
            seed: Some(4),
            ..options()
        };
        let (_, summary) = render_note(&opts).unwrap();
        assert_eq!(summary.instrument, "Piano-ish");
    }

    #[test]
    fn test_unknown_instrument_is_rejected() {
        let opts = RenderOptions {
            instrument: "Kazoo".to_string(),
            ..options()
        };
        let err = render_note(&opts).unwrap_err();
        assert!(err.to_string().contains("Kazoo"));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let loud = RenderOptions {
            volume: 1.5,
            ..options()
        };
        assert!(render_note(&loud).is_err());

        let empty = RenderOptions {
            duration: 0.0,
            ..options()
        };
        assert!(render_note(&empty).is_err());
    }

    #[test]
    fn test_run_writes_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.wav");
        let opts = RenderOptions {
            out: Some(path.clone()),
            ..options()
        };
        assert_eq!(run(&opts, true).unwrap(), ExitCode::SUCCESS);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(bytes.len(), 44 + 11_025 * 4);
    }
}
