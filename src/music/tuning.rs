use serde::{Deserialize, Serialize};

use super::pitch::Pitch;
use crate::shape::STRINGS;

/// Open-string offsets, in semitones above the standard low E, lowest string first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    offsets: [i32; STRINGS],
}

/// Named tunings selectable from the config file or command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TuningName {
    #[default]
    Standard,
    DropD,
}

impl Tuning {
    /// EADGBE.
    pub const STANDARD: Tuning = Tuning {
        offsets: [0, 5, 10, 15, 19, 24],
    };
    /// DADGBE.
    pub const DROP_D: Tuning = Tuning {
        offsets: [-2, 5, 10, 15, 19, 24],
    };

    pub const fn from_offsets(offsets: [i32; STRINGS]) -> Self {
        Tuning { offsets }
    }

    pub fn named(name: TuningName) -> Self {
        match name {
            TuningName::Standard => Self::STANDARD,
            TuningName::DropD => Self::DROP_D,
        }
    }

    pub fn offsets(&self) -> &[i32; STRINGS] {
        &self.offsets
    }

    /// Pitch of a string played open.
    pub fn open_pitch(&self, string: usize) -> Pitch {
        Pitch::LOW_E + self.offsets[string]
    }

    /// Fret that sounds `pitch` on `string`, or `None` below the open string.
    pub fn fret_for(&self, pitch: Pitch, string: usize) -> Option<u8> {
        let fret = pitch - self.open_pitch(string);
        u8::try_from(fret).ok()
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_open_strings() {
        let names: Vec<String> = (0..STRINGS)
            .map(|s| Tuning::STANDARD.open_pitch(s).name())
            .collect();
        assert_eq!(names, vec!["E3", "A3", "D4", "G4", "B4", "E5"]);
    }

    #[test]
    fn test_drop_d_low_string() {
        assert_eq!(Tuning::DROP_D.open_pitch(0).name(), "D3");
        assert_eq!(Tuning::named(TuningName::DropD), Tuning::DROP_D);
    }

    #[test]
    fn test_fret_for() {
        let a3 = Pitch::from_name("A3").unwrap();
        assert_eq!(Tuning::STANDARD.fret_for(a3, 0), Some(5));
        assert_eq!(Tuning::STANDARD.fret_for(a3, 1), Some(0));
        assert_eq!(Tuning::STANDARD.fret_for(a3, 2), None);
    }
}
