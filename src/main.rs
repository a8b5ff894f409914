use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tabwright::config::AppConfig;
use tabwright::hand::{BarrePolicy, preferred_shape, strain};
use tabwright::music::{Chord, NoteValue, Pitch, TuningName};
use tabwright::planner::{Diagnostic, Transcription};
use tabwright::resolver::Fretboard;
use tabwright::tab::TabEntry;

#[derive(Parser)]
#[command(name = "tabwright", version, about = "Guitar tablature from note sequences")]
struct Cli {
    /// Config file (defaults to ~/.config/tabwright/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe a song file into tablature
    Tab {
        /// Song file, one chord per line ("-" reads stdin)
        file: PathBuf,

        /// Characters per bar
        #[arg(short, long)]
        width: Option<usize>,

        /// Widest fret spread allowed in one shape
        #[arg(long)]
        max_span: Option<u8>,

        #[arg(long, value_enum)]
        tuning: Option<TuningName>,

        /// Print barre-completed strings as well as the written notes
        #[arg(long, value_enum)]
        barre: Option<BarrePolicy>,

        /// Emit a JSON report instead of plain tablature
        #[arg(long)]
        json: bool,
    },

    /// List every playable shape for a chord
    Chord {
        /// Note names, e.g. E3 B3 E4
        #[arg(required = true)]
        notes: Vec<String>,

        #[arg(long)]
        max_span: Option<u8>,

        #[arg(long, value_enum)]
        tuning: Option<TuningName>,
    },

    /// Show where a single note can be played
    Positions {
        /// Note name, e.g. A3
        note: String,

        /// Lowest fret to consider for the default position
        #[arg(long, default_value = "0")]
        capo: u8,

        #[arg(long, value_enum)]
        tuning: Option<TuningName>,
    },
}

#[derive(Serialize)]
struct TabReport<'a> {
    steps: &'a [TabEntry],
    diagnostics: &'a [Diagnostic],
    tab: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Explicit --config must load; the default location is optional
    let mut config = match &cli.config {
        Some(path) => AppConfig::read(path).context("Failed to load config")?,
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Tab {
            file,
            width,
            max_span,
            tuning,
            barre,
            json,
        } => {
            // CLI > config > default
            apply_overrides(&mut config, max_span, tuning);
            if let Some(width) = width {
                config.bar_width = width;
            }
            if let Some(barre) = barre {
                config.barre = barre;
            }

            let song = read_song(&file)?;
            let transcription = tabwright::transcribe(&song, &config);
            let tab = tabwright::render(&transcription, &config);

            if json {
                let report = TabReport {
                    steps: &transcription.steps,
                    diagnostics: &transcription.diagnostics,
                    tab,
                };
                let out = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize report")?;
                println!("{out}");
            } else {
                print!("{tab}");
                print_diagnostics(&transcription);
            }
        }

        Commands::Chord {
            notes,
            max_span,
            tuning,
        } => {
            apply_overrides(&mut config, max_span, tuning);
            let chord = Chord::from_names(&notes, NoteValue::Quarter).context("Invalid chord")?;
            let fretboard = config.fretboard();

            let shapes = match fretboard.voicings(&chord) {
                Ok(shapes) => shapes,
                Err(reason) => {
                    println!("{chord} is unplayable: {reason}");
                    return Ok(());
                }
            };
            let preferred = preferred_shape(&shapes, BarrePolicy::AsWritten);

            println!("{} shapes for {chord}:", shapes.len());
            println!();
            println!("  {:<20} {:>6}", "Shape", "Strain");
            println!("  {}", "-".repeat(27));
            for shape in &shapes {
                let marker = if Some(*shape) == preferred { "*" } else { " " };
                println!("{marker} {:<20} {:>6}", shape.to_string(), strain(shape));
            }
        }

        Commands::Positions { note, capo, tuning } => {
            apply_overrides(&mut config, None, tuning);
            let pitch: Pitch = note.parse().context("Invalid note")?;
            let fretboard: Fretboard = config.fretboard();

            let shapes = fretboard.realizations(pitch);
            if shapes.is_empty() {
                println!("{pitch} is out of range for this tuning.");
                return Ok(());
            }

            println!("{pitch}:");
            for (string, fret) in shapes.iter().filter_map(|s| s.positions().next()) {
                println!("  string {string}  fret {fret:>2}");
            }
            match fretboard.lowest_at_or_above(pitch, capo) {
                Some((string, fret)) => {
                    println!("Lowest at or above fret {capo}: string {string}, fret {fret}")
                }
                None => println!("No position at or above fret {capo}."),
            }
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, max_span: Option<u8>, tuning: Option<TuningName>) {
    if let Some(max_span) = max_span {
        config.max_span = max_span;
    }
    if let Some(tuning) = tuning {
        config.tuning = tuning;
        config.tuning_offsets = None;
    }
}

fn read_song(path: &Path) -> Result<tabwright::music::Song> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return tabwright::songfile::parse_song(&text).context("Failed to parse song");
    }
    tabwright::songfile::read_song(path)
        .with_context(|| format!("Failed to read song from {}", path.display()))
}

fn print_diagnostics(transcription: &Transcription) {
    if transcription.is_complete() {
        return;
    }
    println!(
        "{} chord(s) replaced by rests:",
        transcription.diagnostics.len()
    );
    for d in &transcription.diagnostics {
        println!("  chord {} {}: {}", d.chord_index, d.chord, d.reason);
    }
}
