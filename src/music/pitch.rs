use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Semitone offset of each natural letter within an octave.
const LETTER_VALUES: [(char, i32); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

/// Letter spelled for each pitch class; `None` classes are spelled as the
/// letter below plus a sharp.
const CLASS_LETTERS: [Option<char>; 12] = [
    Some('C'),
    None,
    Some('D'),
    None,
    Some('E'),
    Some('F'),
    None,
    Some('G'),
    None,
    Some('A'),
    None,
    Some('B'),
];

/// Octave number that holds middle C.
const MIDDLE_OCTAVE: i32 = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PitchError {
    #[error("Invalid note name '{name}': {reason}")]
    InvalidNoteName { name: String, reason: &'static str },
}

impl PitchError {
    fn invalid(name: &str, reason: &'static str) -> Self {
        Self::InvalidNoteName {
            name: name.to_string(),
            reason,
        }
    }
}

/// A musical tone as a semitone offset from middle C (C4 = 0).
///
/// Serializes as its sharp-spelled name (`"F#3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch(i32);

impl Pitch {
    pub const MIDDLE_C: Pitch = Pitch(0);
    /// Open low E string in standard tuning (E3).
    pub const LOW_E: Pitch = Pitch(-8);

    pub const fn from_value(value: i32) -> Self {
        Pitch(value)
    }

    /// Parse `<letter A-G><optional # or b><integer octave>`, e.g. `C4`, `E#2`, `Ab4`.
    /// Letter and flat are case-insensitive.
    pub fn from_name(name: &str) -> Result<Self, PitchError> {
        let mut chars = name.chars();
        let letter = chars
            .next()
            .ok_or_else(|| PitchError::invalid(name, "empty name"))?
            .to_ascii_uppercase();
        let mut value = LETTER_VALUES
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|(_, v)| *v)
            .ok_or_else(|| PitchError::invalid(name, "letter must be A-G"))?;

        let rest = chars.as_str();
        let octave_part = match rest.chars().next() {
            Some('#') => {
                value += 1;
                &rest[1..]
            }
            // Either case reads as a flat; the letter has already been taken.
            Some('b' | 'B') => {
                value -= 1;
                &rest[1..]
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => rest,
            Some(_) => return Err(PitchError::invalid(name, "accidental must be '#' or 'b'")),
            None => return Err(PitchError::invalid(name, "missing octave")),
        };

        let octave: i64 = octave_part
            .parse()
            .map_err(|_| PitchError::invalid(name, "octave must be an integer"))?;

        (octave - i64::from(MIDDLE_OCTAVE))
            .checked_mul(12)
            .and_then(|v| v.checked_add(i64::from(value)))
            .and_then(|v| i32::try_from(v).ok())
            .map(Pitch)
            .ok_or_else(|| PitchError::invalid(name, "octave out of range"))
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    /// Name of this pitch. Accidentals are always spelled sharp.
    pub fn name(self) -> String {
        let class = self.0.rem_euclid(12);
        let octave = self.0.div_euclid(12) + MIDDLE_OCTAVE;
        match CLASS_LETTERS[class as usize] {
            Some(letter) => format!("{letter}{octave}"),
            None => {
                // Every gap in the table sits one semitone above a natural.
                let below = CLASS_LETTERS[(class - 1) as usize].unwrap_or('C');
                format!("{below}#{octave}")
            }
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Pitch {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pitch::from_name(s)
    }
}

impl TryFrom<String> for Pitch {
    type Error = PitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pitch::from_name(&value)
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.name()
    }
}

/// Transpose up by a number of semitones.
impl Add<i32> for Pitch {
    type Output = Pitch;

    fn add(self, semitones: i32) -> Pitch {
        Pitch(self.0 + semitones)
    }
}

/// Transpose down by a number of semitones.
impl Sub<i32> for Pitch {
    type Output = Pitch;

    fn sub(self, semitones: i32) -> Pitch {
        Pitch(self.0 - semitones)
    }
}

/// The interval between two pitches, in semitones.
impl Sub<Pitch> for Pitch {
    type Output = i32;

    fn sub(self, other: Pitch) -> i32 {
        self.0 - other.0
    }
}

/// Number of duration ticks in one bar (one whole note).
pub const TICKS_PER_BAR: u32 = 32;

/// A length of time measured in thirty-second notes.
///
/// Written note values are always powers of two, but splitting a note at a
/// barline can leave any tick count, so arithmetic happens on ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(u32);

impl Duration {
    pub const ZERO: Duration = Duration(0);
    pub const BAR: Duration = Duration(TICKS_PER_BAR);

    pub const fn from_ticks(ticks: u32) -> Self {
        Duration(ticks)
    }

    pub const fn ticks(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Fraction of a whole note.
    pub fn saturating_sub(self, other: Duration) -> Duration {
        Duration(self.0.saturating_sub(other.0))
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, other: Duration) -> Duration {
        Duration(self.0 + other.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, TICKS_PER_BAR)
    }
}

/// Written note values, whole through thirty-second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteValue {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl NoteValue {
    pub const ALL: [NoteValue; 6] = [
        NoteValue::Whole,
        NoteValue::Half,
        NoteValue::Quarter,
        NoteValue::Eighth,
        NoteValue::Sixteenth,
        NoteValue::ThirtySecond,
    ];

    pub fn duration(self) -> Duration {
        Duration(match self {
            NoteValue::Whole => 32,
            NoteValue::Half => 16,
            NoteValue::Quarter => 8,
            NoteValue::Eighth => 4,
            NoteValue::Sixteenth => 2,
            NoteValue::ThirtySecond => 1,
        })
    }

    /// Single-letter symbol: w h q e s t.
    pub fn symbol(self) -> char {
        match self {
            NoteValue::Whole => 'w',
            NoteValue::Half => 'h',
            NoteValue::Quarter => 'q',
            NoteValue::Eighth => 'e',
            NoteValue::Sixteenth => 's',
            NoteValue::ThirtySecond => 't',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        let symbol = symbol.to_ascii_lowercase();
        Self::ALL.into_iter().find(|v| v.symbol() == symbol)
    }

    /// Note value from the denominator of its fraction (1, 2, 4, ... 32).
    pub fn from_denominator(denominator: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.duration().ticks().checked_mul(denominator) == Some(TICKS_PER_BAR))
    }
}
