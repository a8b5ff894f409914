// Fretboard shapes: one optional fret per string.
//
// A Shape is the unit every later stage works in. The resolver builds them by
// unioning single-string realizations, the hand model prices them, and the
// tab renderer prints them. String 0 is the lowest-pitched string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Strings on the instrument.
pub const STRINGS: usize = 6;

/// A (string, fret) pair. Fret 0 is the open string.
pub type Position = (usize, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Shape {
    frets: [Option<u8>; STRINGS],
}

impl Shape {
    /// Nothing played. Rendered as a rest.
    pub const fn silent() -> Self {
        Shape {
            frets: [None; STRINGS],
        }
    }

    pub const fn from_frets(frets: [Option<u8>; STRINGS]) -> Self {
        Shape { frets }
    }

    /// One string at one fret.
    pub fn single(string: usize, fret: u8) -> Self {
        let mut frets = [None; STRINGS];
        frets[string] = Some(fret);
        Shape { frets }
    }

    /// Build from positions; a string listed twice keeps the higher fret.
    pub fn from_positions(positions: &[Position]) -> Self {
        positions.iter().copied().collect()
    }

    pub fn fret(&self, string: usize) -> Option<u8> {
        self.frets[string]
    }

    pub fn frets(&self) -> &[Option<u8>; STRINGS] {
        &self.frets
    }

    pub fn is_played(&self, string: usize) -> bool {
        self.frets[string].is_some()
    }

    /// Played positions, lowest string first.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.frets
            .iter()
            .enumerate()
            .filter_map(|(s, f)| f.map(|f| (s, f)))
    }

    /// Positions that need a finger (fret above 0).
    pub fn stopped(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|&(_, f)| f > 0)
    }

    /// Number of strings sounded.
    pub fn played_count(&self) -> usize {
        self.frets.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_silent(&self) -> bool {
        self.frets.iter().all(Option::is_none)
    }

    /// Spread between the highest and lowest stopped frets; open strings don't count.
    pub fn span(&self) -> u8 {
        let mut stopped = self.stopped().map(|(_, f)| f);
        let Some(first) = stopped.next() else {
            return 0;
        };
        let (lo, hi) = stopped.fold((first, first), |(lo, hi), f| (lo.min(f), hi.max(f)));
        hi - lo
    }

    /// Per-string union. Where both shapes play a string the higher fret wins.
    pub fn union(&self, other: &Shape) -> Shape {
        let mut frets = self.frets;
        for (mine, theirs) in frets.iter_mut().zip(other.frets.iter()) {
            *mine = match (*mine, *theirs) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
        }
        Shape { frets }
    }

    pub fn with_position(&self, (string, fret): Position) -> Shape {
        self.union(&Shape::single(string, fret))
    }
}

impl BitOr for Shape {
    type Output = Shape;

    fn bitor(self, other: Shape) -> Shape {
        self.union(&other)
    }
}

impl FromIterator<Position> for Shape {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Shape::silent(), |shape, pos| shape.with_position(pos))
    }
}

/// Chord-chart style, low string first: `0 2 2 1 0 0`, `x` for unplayed.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self
            .frets
            .iter()
            .map(|fret| match fret {
                Some(n) => n.to_string(),
                None => "x".to_string(),
            })
            .collect();
        f.write_str(&cells.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_shape() {
        let s = Shape::silent();
        assert!(s.is_silent());
        assert_eq!(s.played_count(), 0);
        assert_eq!(s.span(), 0);
        assert_eq!(s.to_string(), "x x x x x x");
    }

    #[test]
    fn test_union_keeps_higher_fret() {
        let a = Shape::from_positions(&[(0, 3), (2, 0)]);
        let b = Shape::from_positions(&[(0, 5), (3, 2)]);
        let u = a | b;
        assert_eq!(u.frets(), &[Some(5), None, Some(0), Some(2), None, None]);
        assert_eq!(u.played_count(), 3);
        // Union with silence changes nothing.
        assert_eq!(u | Shape::silent(), u);
    }

    #[test]
    fn test_from_positions_duplicate_string() {
        let s = Shape::from_positions(&[(1, 7), (1, 2)]);
        assert_eq!(s.fret(1), Some(7));
        assert_eq!(s.played_count(), 1);
    }

    #[test]
    fn test_span_ignores_open_strings() {
        let open_e = Shape::from_positions(&[(0, 0), (1, 2), (2, 2), (3, 1), (4, 0), (5, 0)]);
        assert_eq!(open_e.span(), 1);
        let wide = Shape::from_positions(&[(0, 1), (5, 6)]);
        assert_eq!(wide.span(), 5);
        assert_eq!(Shape::single(3, 9).span(), 0);
        assert_eq!(Shape::from_positions(&[(0, 0), (4, 12)]).span(), 0);
    }

    #[test]
    fn test_positions_and_stopped() {
        let open_c = Shape::from_positions(&[(0, 0), (1, 3), (2, 2), (3, 0), (4, 1), (5, 0)]);
        let stopped: Vec<Position> = open_c.stopped().collect();
        assert_eq!(stopped, vec![(1, 3), (2, 2), (4, 1)]);
        assert_eq!(open_c.positions().count(), 6);
        assert_eq!(open_c.to_string(), "0 3 2 0 1 0");
    }
}
