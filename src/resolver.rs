// Chord resolution: from pitches to candidate fretboard shapes.
//
// Each pitch has a short list of (string, fret) realizations. A chord's
// candidates are the Cartesian product of its notes' realizations, unioned
// into one Shape each, keeping only those that give every note its own string
// and fit inside the fret span a hand can cover.
//
// Enumeration order is part of the contract: notes ascend by pitch, each
// note's realizations ascend by string, and the product advances the last
// note fastest. Later stages break cost ties by taking the first candidate,
// so changing this order changes the chosen fingerings.

use serde::Serialize;
use thiserror::Error;

use crate::music::{Chord, Pitch, Tuning};
use crate::shape::{STRINGS, Shape};

/// Highest fret on the neck.
pub const MAX_FRET: u8 = 18;
/// Widest stopped-fret spread allowed within one shape.
pub const MAX_SPAN: u8 = 5;

/// Why a chord produced no candidate shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unplayable {
    #[error("{count} distinct pitches but only six strings")]
    TooManyNotes { count: usize },
    #[error("{pitch} has no fret within range on any string")]
    FretOutOfRange { pitch: Pitch },
    #[error("no shape fits every note within the fret span")]
    NoVoicing,
}

/// The instrument as the resolver sees it: a tuning plus reach limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fretboard {
    pub tuning: Tuning,
    pub max_fret: u8,
    pub max_span: u8,
}

impl Default for Fretboard {
    fn default() -> Self {
        Self {
            tuning: Tuning::STANDARD,
            max_fret: MAX_FRET,
            max_span: MAX_SPAN,
        }
    }
}

impl Fretboard {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    pub fn with_max_span(mut self, max_span: u8) -> Self {
        self.max_span = max_span;
        self
    }

    /// Every single-string shape that sounds `pitch`, lowest string first.
    pub fn realizations(&self, pitch: Pitch) -> Vec<Shape> {
        (0..STRINGS)
            .filter_map(|string| {
                self.tuning
                    .fret_for(pitch, string)
                    .filter(|&fret| fret <= self.max_fret)
                    .map(|fret| Shape::single(string, fret))
            })
            .collect()
    }

    /// The realization with the lowest fret that is still at or above `capo`.
    pub fn lowest_at_or_above(&self, pitch: Pitch, capo: u8) -> Option<(usize, u8)> {
        // Higher strings give lower frets, so scan from the top string down.
        self.realizations(pitch)
            .iter()
            .rev()
            .filter_map(|shape| shape.positions().next())
            .find(|&(_, fret)| fret >= capo)
    }

    /// All candidate shapes for a chord, in enumeration order.
    pub fn voicings(&self, chord: &Chord) -> Result<Vec<Shape>, Unplayable> {
        if chord.len() > STRINGS {
            return Err(Unplayable::TooManyNotes { count: chord.len() });
        }

        let per_note = chord
            .pitches()
            .map(|pitch| {
                let shapes = self.realizations(pitch);
                if shapes.is_empty() {
                    Err(Unplayable::FretOutOfRange { pitch })
                } else {
                    Ok(shapes)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let voicings: Vec<Shape> = Product::new(&per_note)
            .map(|combo| combo.into_iter().fold(Shape::silent(), |acc, s| acc | *s))
            .filter(|shape| shape.played_count() == chord.len() && shape.span() <= self.max_span)
            .collect();

        log::trace!("{chord}: {} voicings", voicings.len());

        if voicings.is_empty() {
            Err(Unplayable::NoVoicing)
        } else {
            Ok(voicings)
        }
    }
}

/// Cartesian product over a list of choice lists, last list varying fastest.
///
/// Yields nothing if any list is empty, and a single empty combination when
/// there are no lists at all.
pub struct Product<'a, T> {
    lists: &'a [Vec<T>],
    cursor: Vec<usize>,
    done: bool,
}

impl<'a, T> Product<'a, T> {
    pub fn new(lists: &'a [Vec<T>]) -> Self {
        Self {
            lists,
            cursor: vec![0; lists.len()],
            done: lists.iter().any(Vec::is_empty),
        }
    }
}

impl<'a, T> Iterator for Product<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let lists = self.lists;
        let item = self
            .cursor
            .iter()
            .zip(lists.iter())
            .map(|(&i, list)| &list[i])
            .collect();

        // Advance like an odometer.
        self.done = true;
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < lists[pos].len() {
                self.done = false;
                break;
            }
            self.cursor[pos] = 0;
        }
        Some(item)
    }
}
