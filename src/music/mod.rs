pub mod pitch;
pub mod tuning;

pub use pitch::{Duration, NoteValue, Pitch, PitchError};
pub use tuning::{Tuning, TuningName};

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordError {
    #[error("A chord needs at least one note")]
    Empty,
    #[error(transparent)]
    Pitch(#[from] PitchError),
}

/// A pitch held for a written note value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Note {
    pub pitch: Pitch,
    pub value: NoteValue,
}

impl Note {
    pub fn new(pitch: Pitch, value: NoteValue) -> Self {
        Self { pitch, value }
    }

    pub fn from_name(name: &str, value: NoteValue) -> Result<Self, PitchError> {
        Ok(Self::new(Pitch::from_name(name)?, value))
    }

    pub fn duration(&self) -> Duration {
        self.value.duration()
    }
}

/// Notes struck together.
///
/// Notes are deduplicated by pitch and kept in ascending pitch order; that
/// order drives voicing enumeration and therefore tie-breaking downstream.
/// The chord lasts as long as its shortest note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chord {
    notes: Vec<Note>,
    duration: Duration,
}

impl Chord {
    pub fn new(notes: impl IntoIterator<Item = Note>) -> Result<Self, ChordError> {
        let mut notes: Vec<Note> = notes.into_iter().collect();
        let duration = notes
            .iter()
            .map(Note::duration)
            .min()
            .ok_or(ChordError::Empty)?;

        // Stable sort keeps the first-listed note when a pitch repeats.
        notes.sort_by_key(|n| n.pitch);
        notes.dedup_by_key(|n| n.pitch);

        Ok(Self { notes, duration })
    }

    /// Every pitch held for the same note value.
    pub fn from_pitches(
        pitches: impl IntoIterator<Item = Pitch>,
        value: NoteValue,
    ) -> Result<Self, ChordError> {
        Self::new(pitches.into_iter().map(|p| Note::new(p, value)))
    }

    pub fn from_names<S: AsRef<str>>(names: &[S], value: NoteValue) -> Result<Self, ChordError> {
        let notes = names
            .iter()
            .map(|n| Note::from_name(n.as_ref(), value))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(notes)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.notes.iter().map(|n| n.pitch)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Number of distinct pitches.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.notes.iter().map(|n| n.pitch.name()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Chords in performance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Song {
    chords: Vec<Chord>,
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chord(&mut self, chord: Chord) {
        self.chords.push(chord);
    }

    /// A lone note becomes a one-note chord.
    pub fn push_note(&mut self, note: Note) {
        self.chords.push(Chord {
            notes: vec![note],
            duration: note.duration(),
        });
    }

    /// Add a quarter note by name.
    pub fn push_name(&mut self, name: &str) -> Result<(), PitchError> {
        self.push_note(Note::from_name(name, NoteValue::Quarter)?);
        Ok(())
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}

impl FromIterator<Chord> for Song {
    fn from_iter<I: IntoIterator<Item = Chord>>(iter: I) -> Self {
        Self {
            chords: iter.into_iter().collect(),
        }
    }
}
