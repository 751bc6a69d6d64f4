//! Keylab CLI - render and perform notes from the keyboard synthesizer
//!
//! This binary renders single notes to WAV, lists the instruments, and plays
//! key scripts offline through a full session.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use keylab_cli::commands;
use keylab_cli::commands::perform::PerformOptions;
use keylab_cli::commands::render::RenderOptions;

/// Keylab - Keyboard Note Synthesizer
#[derive(Parser)]
#[command(name = "keylab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log cache and render activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one note to a WAV file
    Render {
        /// Instrument name (case-insensitive)
        #[arg(short, long, default_value = "Piano-ish")]
        instrument: String,

        /// Semitones above C4 (0-12)
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=12))]
        semitone: u8,

        /// Octave shift (-2 to 2)
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        octave: i8,

        /// Master volume (0.05 to 1.0)
        #[arg(long, default_value_t = 0.45)]
        volume: f64,

        /// Note length in seconds
        #[arg(short, long, default_value_t = 6.0)]
        duration: f64,

        /// Fixed seed for the percussive noise
        #[arg(long)]
        seed: Option<u32>,

        /// Output WAV path
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List available instruments
    Instruments {
        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Play a key script offline and write the result
    Perform {
        /// Key script, e.g. "a s d . [ adg @organ k"
        script: String,

        /// Output WAV path
        #[arg(long)]
        out: PathBuf,

        /// Time between steps in milliseconds
        #[arg(long, default_value_t = 250)]
        step_ms: u64,

        /// How long each note is held (default: the step time)
        #[arg(long)]
        hold_ms: Option<u64>,

        /// Session config file (default: user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Starting instrument
        #[arg(short, long)]
        instrument: Option<String>,

        /// Starting octave shift
        #[arg(short, long, allow_hyphen_values = true)]
        octave: Option<i8>,

        /// Starting volume
        #[arg(long)]
        volume: Option<f64>,

        /// Fixed seed for the percussive noise
        #[arg(long)]
        seed: Option<u32>,

        /// Maximum simultaneous notes
        #[arg(long)]
        max_voices: Option<usize>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            instrument,
            semitone,
            octave,
            volume,
            duration,
            seed,
            out,
            json,
        } => commands::render::run(
            &RenderOptions {
                instrument,
                semitone,
                octave,
                volume,
                duration,
                seed,
                out,
            },
            json,
        ),
        Commands::Instruments { json } => commands::instruments::run(json),
        Commands::Perform {
            script,
            out,
            step_ms,
            hold_ms,
            config,
            instrument,
            octave,
            volume,
            seed,
            max_voices,
            json,
        } => commands::perform::run(
            &PerformOptions {
                script,
                step_ms,
                hold_ms,
                config,
                instrument,
                octave,
                volume,
                seed,
                max_voices,
                out,
            },
            json,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
