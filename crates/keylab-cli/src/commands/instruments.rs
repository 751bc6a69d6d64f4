//! Instruments command implementation
//!
//! Lists the available instruments with their recipes.

use anyhow::Result;
use colored::Colorize;
use keylab_synth::instrument::Instrument;
use serde::Serialize;
use std::process::ExitCode;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentInfo {
    pub name: &'static str,
    pub partials: Vec<String>,
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    pub noise_click: bool,
    pub vibrato: bool,
}

impl InstrumentInfo {
    pub fn describe(instrument: Instrument) -> Self {
        let def = instrument.def();
        Self {
            name: instrument.name(),
            partials: def
                .partials
                .iter()
                .map(|p| format!("{:?} x{} @{}", p.waveform, p.multiplier, p.weight).to_lowercase())
                .collect(),
            attack: def.envelope.attack,
            decay: def.envelope.decay,
            sustain: def.envelope.sustain,
            release: def.envelope.release,
            noise_click: def.noise.is_some(),
            vibrato: def.vibrato.is_some(),
        }
    }
}

/// Run the instruments command
pub fn run(json: bool) -> Result<ExitCode> {
    let infos: Vec<InstrumentInfo> = Instrument::ALL
        .iter()
        .map(|&i| InstrumentInfo::describe(i))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Instruments".cyan().bold());
    for info in &infos {
        let mut extras = Vec::new();
        if info.noise_click {
            extras.push("noise click");
        }
        if info.vibrato {
            extras.push("vibrato");
        }

        println!("  {} {}", "->".green(), info.name.bold());
        println!("     {}: {}", "partials".dimmed(), info.partials.join(", "));
        println!(
            "     {}: A {:.3}  D {:.3}  S {:.2}  R {:.3}",
            "envelope".dimmed(),
            info.attack,
            info.decay,
            info.sustain,
            info.release
        );
        if !extras.is_empty() {
            println!("     {}: {}", "extras".dimmed(), extras.join(", "));
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_piano() {
        let info = InstrumentInfo::describe(Instrument::PianoIsh);
        assert_eq!(info.name, "Piano-ish");
        assert_eq!(info.partials.len(), 4);
        assert_eq!(info.partials[0], "sine x1 @0.55");
        assert!(info.noise_click);
        assert!(!info.vibrato);
    }

    #[test]
    fn test_describe_chiptune() {
        let info = InstrumentInfo::describe(Instrument::Chiptune);
        assert_eq!(info.partials, vec!["square x1 @1".to_string()]);
        assert!(info.vibrato);
        assert_eq!(info.release, 0.08);
    }
}
