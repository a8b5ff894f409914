// Plain-text song files.
//
// One chord per line: whitespace-separated note names, optionally followed by
// a duration token (`w h q e s t` or `1/N`). Lines without a duration are
// quarter notes. A token starting with `#` comments out the rest of the line.
//
//     E3 B3 E4 h     # power chord, half note
//     G3 D4 G4 1/8
//     A3

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

use crate::music::{Chord, ChordError, Note, NoteValue, PitchError, Song};

#[derive(Error, Debug)]
pub enum SongFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Note { line: usize, source: PitchError },
    #[error("line {line}: unsupported duration '{token}'")]
    Duration { line: usize, token: String },
    #[error("line {line}: {source}")]
    Chord { line: usize, source: ChordError },
}

/// `q`, `e`, ... or a fraction of a whole note such as `1/8`.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?P<symbol>[whqest])|1/(?P<denom>\d+))$").unwrap());

pub fn read_song(path: &Path) -> Result<Song, SongFileError> {
    let text = std::fs::read_to_string(path)?;
    let song = parse_song(&text)?;
    log::info!("Read {} chords from {}", song.len(), path.display());
    Ok(song)
}

pub fn parse_song(text: &str) -> Result<Song, SongFileError> {
    let mut song = Song::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(chord) = parse_line(line, i + 1)? {
            song.push_chord(chord);
        }
    }
    Ok(song)
}

/// Parse one line. Blank and comment-only lines give `None`.
fn parse_line(line: &str, number: usize) -> Result<Option<Chord>, SongFileError> {
    let mut tokens: Vec<&str> = line
        .split_whitespace()
        .take_while(|t| !t.starts_with('#'))
        .collect();
    if tokens.is_empty() {
        return Ok(None);
    }

    let value = match tokens.last().and_then(|t| DURATION_RE.captures(*t)) {
        Some(caps) => {
            let value = if let Some(symbol) = caps.name("symbol") {
                symbol.as_str().chars().next().and_then(NoteValue::from_symbol)
            } else {
                caps.name("denom")
                    .and_then(|d| d.as_str().parse().ok())
                    .and_then(NoteValue::from_denominator)
            };
            let token = tokens.pop().unwrap_or_default();
            value.ok_or_else(|| SongFileError::Duration {
                line: number,
                token: token.to_string(),
            })?
        }
        None => NoteValue::default(),
    };

    let notes = tokens
        .iter()
        .map(|name| Note::from_name(name, value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| SongFileError::Note {
            line: number,
            source,
        })?;

    let chord = Chord::new(notes).map_err(|source| SongFileError::Chord {
        line: number,
        source,
    })?;
    Ok(Some(chord))
}
