// Fretting-hand simulation: strain of a shape and cost of moving between shapes.
//
// A Hand has four fingers (index to pinky), a barre flag, and the set of
// strings currently ringing open. Placement follows a few rules:
// - Open strings are always free.
// - The index finger takes the lowest stopped fret, lowest string first, and
//   the rest of the hand slides along with it at no cost.
// - The index may barre the other notes at its fret unless an open string
//   above it would be choked.
// - Remaining fingers take the remaining notes in ascending fret order; a
//   finger with nothing left to play stays where it was.
//
// Strain scores a single shape from a fresh hand. Movement cost prices the
// transition from wherever the hand currently is. The planner threads one
// Hand through a whole song, so both are needed.

use serde::{Deserialize, Serialize};

use crate::shape::{Position, STRINGS, Shape};

pub const FINGERS: usize = 4;

/// Frets above this add strain per fret.
const HIGH_FRET: u8 = 12;

/// What `preferred_shape` hands back when the lowest-strain hand would barre
/// across strings the chord never asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BarrePolicy {
    /// The candidate shape exactly as resolved.
    #[default]
    AsWritten,
    /// Everything the hand sounds, barre-completed strings included.
    SoundBarre,
}

/// A finger is either lifted or pressing one string at a fret above 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Finger {
    position: Option<Position>,
}

impl Finger {
    pub const fn lifted() -> Self {
        Finger { position: None }
    }

    /// Fret 0 is the open string, which needs no finger.
    pub fn at(string: usize, fret: u8) -> Self {
        let position = (string < STRINGS && fret > 0).then_some((string, fret));
        Finger { position }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn string(&self) -> Option<usize> {
        self.position.map(|(s, _)| s)
    }

    pub fn fret(&self) -> Option<u8> {
        self.position.map(|(_, f)| f)
    }

    pub fn is_down(&self) -> bool {
        self.position.is_some()
    }

    pub fn lift(&mut self) {
        self.position = None;
    }

    /// Move to `target` and return the effort.
    ///
    /// Lifting and placing a lifted finger are free; relocating a pressed
    /// finger costs the string distance plus the fret distance.
    pub fn move_to(&mut self, target: Position) -> u32 {
        let (string, fret) = target;
        if fret == 0 {
            self.lift();
            return 0;
        }
        let cost = match self.position {
            None => 0,
            Some((s, f)) => (s.abs_diff(string) + usize::from(f.abs_diff(fret))) as u32,
        };
        self.position = Some(target);
        cost
    }

    /// Shift along the string with the hand. Sliding to fret 0 or below lifts.
    fn slide(&mut self, by: i32) {
        if let Some((string, fret)) = self.position {
            let fret = i32::from(fret) + by;
            self.position = u8::try_from(fret).ok().filter(|&f| f > 0).map(|f| (string, f));
        }
    }
}

/// Saved hand state for trial moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandSnapshot(Hand);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hand {
    fingers: [Finger; FINGERS],
    barre: bool,
    open: [bool; STRINGS],
}

impl Hand {
    /// All fingers lifted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh hand already holding `shape`.
    pub fn holding(shape: &Shape) -> Self {
        let mut hand = Self::new();
        hand.move_to(shape);
        hand
    }

    pub fn fingers(&self) -> &[Finger; FINGERS] {
        &self.fingers
    }

    pub fn is_barred(&self) -> bool {
        self.barre
    }

    pub fn open_strings(&self) -> impl Iterator<Item = usize> + '_ {
        self.open
            .iter()
            .enumerate()
            .filter_map(|(s, &open)| open.then_some(s))
    }

    fn index(&self) -> Option<Position> {
        self.fingers[0].position()
    }

    pub fn snapshot(&self) -> HandSnapshot {
        HandSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: &HandSnapshot) {
        self.clone_from(&snapshot.0);
    }

    /// Place the hand on `target` and return the movement cost.
    pub fn move_to(&mut self, target: &Shape) -> u32 {
        self.barre = false;
        self.open = [false; STRINGS];
        for (string, _) in target.positions().filter(|&(_, f)| f == 0) {
            self.open[string] = true;
        }

        let mut pending: Vec<Position> = target.stopped().collect();
        // Lowest fret first, then lowest string.
        pending.sort_by_key(|&(s, f)| (f, s));
        if pending.is_empty() {
            return 0;
        }

        let mut cost = 0;

        let index_pos = pending.remove(0);
        let (index_string, index_fret) = index_pos;
        let slide = self
            .index()
            .map_or(0, |(_, f)| i32::from(index_fret) - i32::from(f));
        cost += self.fingers[0].move_to(index_pos);
        for finger in &mut self.fingers[1..] {
            finger.slide(slide);
        }

        // An open string above the index would be choked by a barre.
        let blocked = self.open_strings().any(|s| s > index_string);
        if !blocked && pending.iter().any(|&(_, f)| f == index_fret) {
            self.barre = true;
            pending.retain(|&(_, f)| f != index_fret);
        }

        let mut floor = index_fret;
        for finger in &mut self.fingers[1..] {
            // `pending` is sorted, so the first eligible entry is the lowest
            // fret at or above the previous finger, on the lowest string.
            let Some(at) = pending.iter().position(|&(_, f)| f >= floor) else {
                continue;
            };
            let pos = pending.remove(at);
            cost += finger.move_to(pos);
            floor = pos.1;
        }

        cost
    }

    /// Everything the hand currently sounds, including strings the barre
    /// covers above the index finger.
    pub fn shape(&self) -> Shape {
        let mut shape: Shape = self.open_strings().map(|s| (s, 0)).collect();
        for pos in self.fingers.iter().filter_map(Finger::position) {
            shape = shape.with_position(pos);
        }
        if let Some((index_string, index_fret)) = self.index().filter(|_| self.barre) {
            for string in index_string + 1..STRINGS {
                if !shape.is_played(string) {
                    shape = shape.with_position((string, index_fret));
                }
            }
        }
        shape
    }

    /// Inherent difficulty of the current finger placement.
    ///
    /// Each finger's home is one fret above the previous finger on an
    /// adjacent string; every fret or skipped string away from home costs 1.
    /// A barre costs 1 per extra string it holds down, and every pressed fret
    /// above the 12th costs 1 per fret.
    pub fn strain(&self) -> u32 {
        let mut strain = 0;

        for pair in self.fingers.windows(2) {
            if let (Some((sa, fa)), Some((sb, fb))) = (pair[0].position(), pair[1].position()) {
                strain += (i32::from(fb) - (i32::from(fa) + 1)).unsigned_abs();
                strain += (sa.abs_diff(sb).saturating_sub(1)) as u32;
            }
        }

        if let Some((_, index_fret)) = self.index().filter(|_| self.barre) {
            let held = self
                .shape()
                .positions()
                .filter(|&(_, f)| f == index_fret)
                .count() as u32;
            strain += held.saturating_sub(1);
        }

        for fret in self.fingers.iter().filter_map(Finger::fret) {
            strain += u32::from(fret.saturating_sub(HIGH_FRET));
        }

        strain
    }
}

/// Strain of a shape held by a fresh hand.
pub fn strain(shape: &Shape) -> u32 {
    Hand::holding(shape).strain()
}

/// The easiest candidate: lowest strain, first one wins a tie.
pub fn preferred_shape(candidates: &[Shape], policy: BarrePolicy) -> Option<Shape> {
    let mut best: Option<(u32, Hand, Shape)> = None;
    for candidate in candidates {
        let hand = Hand::holding(candidate);
        let score = hand.strain();
        if best.as_ref().is_none_or(|(s, _, _)| score < *s) {
            best = Some((score, hand, *candidate));
        }
    }
    best.map(|(_, hand, candidate)| match policy {
        BarrePolicy::AsWritten => candidate,
        BarrePolicy::SoundBarre => hand.shape(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{Chord, NoteValue, Pitch};
    use crate::resolver::Fretboard;

    fn shape(positions: &[(usize, u8)]) -> Shape {
        Shape::from_positions(positions)
    }

    fn all_open() -> Shape {
        shape(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)])
    }
    fn open_c() -> Shape {
        shape(&[(0, 0), (1, 3), (2, 2), (3, 0), (4, 1), (5, 0)])
    }
    fn open_a() -> Shape {
        shape(&[(0, 0), (1, 0), (2, 2), (3, 2), (4, 2), (5, 0)])
    }
    fn open_g() -> Shape {
        shape(&[(0, 3), (1, 2), (2, 0), (3, 0), (4, 0), (5, 3)])
    }
    fn open_e() -> Shape {
        shape(&[(0, 0), (1, 2), (2, 2), (3, 1), (4, 0), (5, 0)])
    }
    fn open_d() -> Shape {
        shape(&[(1, 0), (2, 0), (3, 2), (4, 3), (5, 2)])
    }
    fn barre_b() -> Shape {
        shape(&[(0, 2), (1, 2), (2, 4), (3, 4), (4, 4), (5, 2)])
    }
    fn barre_f() -> Shape {
        shape(&[(0, 1), (1, 3), (2, 3), (3, 2), (4, 1), (5, 1)])
    }
    fn barre_a() -> Shape {
        shape(&[(0, 5), (1, 7), (2, 7), (3, 6), (4, 5), (5, 5)])
    }

    #[test]
    fn test_lifted_finger() {
        let f = Finger::lifted();
        assert_eq!(f.position(), None);
        assert_eq!(f.string(), None);
        assert_eq!(f.fret(), None);
        assert!(!f.is_down());
    }

    #[test]
    fn test_finger_at_open_is_lifted() {
        for string in 0..STRINGS {
            for fret in 0..12u8 {
                let f = Finger::at(string, fret);
                if fret == 0 {
                    assert!(!f.is_down());
                } else {
                    assert_eq!(f.position(), Some((string, fret)));
                }
            }
        }
    }

    #[test]
    fn test_finger_move_costs() {
        for string in 0..STRINGS {
            for fret in 0..12u8 {
                let mut f = Finger::at(0, 1);
                let cost = f.move_to((string, fret));
                if fret == 0 {
                    assert_eq!(cost, 0);
                    assert!(!f.is_down());
                } else {
                    assert_eq!(cost, string as u32 + u32::from(fret) - 1);
                    assert_eq!(f.position(), Some((string, fret)));
                }
            }
        }
        let mut lifted = Finger::lifted();
        assert_eq!(lifted.move_to((5, 9)), 0);
    }

    #[test]
    fn test_hand_reproduces_shapes() {
        for s in [
            all_open(),
            open_c(),
            open_a(),
            open_g(),
            open_e(),
            open_d(),
            barre_a(),
            barre_b(),
            barre_f(),
        ] {
            assert_eq!(Hand::holding(&s).shape(), s, "{s}");
        }
    }

    #[test]
    fn test_single_notes() {
        for string in 0..5 {
            for fret in 0..=18u8 {
                let s = Shape::single(string, fret);
                let hand = Hand::holding(&s);
                assert_eq!(hand.shape(), s);
                assert_eq!(hand.strain(), u32::from(fret.saturating_sub(12)));
            }
        }
    }

    #[test]
    fn test_strain_fixtures() {
        assert_eq!(strain(&all_open()), 0);
        assert_eq!(strain(&open_c()), 1);
        assert_eq!(strain(&open_a()), 2);
        assert_eq!(strain(&open_g()), 5);
        assert_eq!(strain(&open_e()), 2);
        // The D shape gets barred, which scores lower than fingering it.
        assert_eq!(strain(&open_d()), 1);
        assert_eq!(strain(&barre_b()), 6);
        assert_eq!(strain(&barre_f()), 6);
        assert_eq!(strain(&barre_a()), 6);
    }

    #[test]
    fn test_barre_detection() {
        assert!(Hand::holding(&barre_f()).is_barred());
        assert!(Hand::holding(&open_d()).is_barred());
        // Open high E above the index blocks the barre.
        assert!(!Hand::holding(&open_a()).is_barred());
        assert!(!Hand::holding(&open_c()).is_barred());
    }

    #[test]
    fn test_movement_fixtures() {
        let mut h = Hand::holding(&barre_f());
        assert_eq!(h.move_to(&barre_a()), 4);

        let mut h = Hand::holding(&barre_a());
        assert_eq!(h.move_to(&barre_f()), 4);

        let mut h = Hand::holding(&open_c());
        assert_eq!(h.move_to(&open_g()), 11);

        let mut h = Hand::holding(&open_e());
        assert_eq!(h.move_to(&open_a()), 8);
    }

    #[test]
    fn test_null_move() {
        let mut h = Hand::holding(&all_open());
        assert_eq!(h.move_to(&all_open()), 0);
        assert_eq!(h.move_to(&Shape::silent()), 0);
    }

    #[test]
    fn test_slide_carries_other_fingers() {
        let mut h = Hand::holding(&barre_f());
        h.move_to(&barre_a());
        let positions: Vec<Option<Position>> = h.fingers().iter().map(Finger::position).collect();
        assert_eq!(
            positions,
            vec![Some((0, 5)), Some((3, 6)), Some((1, 7)), Some((2, 7))]
        );
    }

    #[test]
    fn test_unused_fingers_stay_put() {
        let mut h = Hand::holding(&open_c());
        h.move_to(&Shape::single(0, 1));
        // Index relocated without sliding; the others keep their frets.
        assert_eq!(h.fingers()[0].position(), Some((0, 1)));
        assert_eq!(h.fingers()[1].position(), Some((2, 2)));
        assert_eq!(h.fingers()[2].position(), Some((1, 3)));
    }

    #[test]
    fn test_slide_below_nut_lifts() {
        let mut f = Finger::at(1, 2);
        f.slide(3);
        assert_eq!(f.position(), Some((1, 5)));
        f.slide(-5);
        assert!(!f.is_down());
        // Lifted fingers stay lifted.
        f.slide(4);
        assert!(!f.is_down());
    }

    #[test]
    fn test_index_slide_moves_whole_hand() {
        let mut h = Hand::holding(&shape(&[(0, 3), (1, 4)]));
        h.move_to(&Shape::single(2, 1));
        assert_eq!(h.fingers()[0].position(), Some((2, 1)));
        assert_eq!(h.fingers()[1].position(), Some((1, 2)));
    }

    #[test]
    fn test_barre_resets_each_move() {
        let mut h = Hand::holding(&barre_f());
        assert!(h.is_barred());
        h.move_to(&open_c());
        assert!(!h.is_barred());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut h = Hand::holding(&open_c());
        let snap = h.snapshot();
        let first = h.move_to(&open_g());
        h.restore(&snap);
        assert_eq!(h, Hand::holding(&open_c()));
        assert_eq!(h.move_to(&open_g()), first);
    }

    #[test]
    fn test_preferred_shape_picks_lowest_strain() {
        let candidates = [open_g(), open_c(), open_e()];
        assert_eq!(preferred_shape(&candidates, BarrePolicy::AsWritten), Some(open_c()));
        // Ties go to the first candidate.
        let tied = [open_a(), open_e()];
        assert_eq!(preferred_shape(&tied, BarrePolicy::AsWritten), Some(open_a()));
        assert_eq!(preferred_shape(&[], BarrePolicy::AsWritten), None);
    }

    fn preferred_for(names: &[&str]) -> Option<Shape> {
        let chord = Chord::from_names(names, NoteValue::Quarter).unwrap();
        let candidates = Fretboard::default().voicings(&chord).unwrap();
        preferred_shape(&candidates, BarrePolicy::AsWritten)
    }

    #[test]
    fn test_preferred_open_and_barre_chords() {
        let fixtures = [
            (vec![-8, -1, 4, 8, 11, 16], open_e()),
            (vec![-8, -3, 4, 9, 13, 16], open_a()),
            (vec![-3, 2, 9, 14, 18], open_d()),
            (vec![-5, -1, 2, 7, 11, 19], open_g()),
            (vec![-8, 0, 4, 7, 12, 16], open_c()),
            (vec![-6, -1, 6, 11, 15, 18], barre_b()),
            (vec![-7, 0, 5, 9, 12, 17], barre_f()),
        ];
        let board = Fretboard::default();
        for (values, expected) in fixtures {
            let chord =
                Chord::from_pitches(values.iter().map(|&v| Pitch::from_value(v)), NoteValue::Quarter)
                    .unwrap();
            let candidates = board.voicings(&chord).unwrap();
            assert_eq!(preferred_shape(&candidates, BarrePolicy::AsWritten), Some(expected));
        }
    }

    #[test]
    fn test_preferred_four_note_chords() {
        let fixtures: [(&[&str], &[(usize, u8)]); 6] = [
            (&["C4", "E4", "A#4", "C5"], &[(1, 3), (2, 2), (3, 3), (4, 1)]),
            (&["B3", "F4", "G#4", "D5"], &[(1, 2), (2, 3), (3, 1), (4, 3)]),
            (&["D4", "A4", "C#5", "F#5"], &[(2, 0), (3, 2), (4, 2), (5, 2)]),
            (&["B4", "E5", "G#5", "D6"], &[(2, 9), (3, 9), (4, 9), (5, 10)]),
            (&["A4", "E5", "A5", "C#6"], &[(2, 7), (3, 9), (4, 10), (5, 9)]),
            (&["G4", "B4", "D5", "G5"], &[(1, 10), (2, 9), (3, 7), (4, 8)]),
        ];
        for (names, expected) in fixtures {
            assert_eq!(preferred_for(names), Some(shape(expected)), "{names:?}");
        }
    }

    #[test]
    fn test_barre_policy() {
        // Index on string 3 at fret 2 barres string 5; string 4 was never asked for.
        let partial = shape(&[(3, 2), (5, 2)]);
        assert_eq!(preferred_shape(&[partial], BarrePolicy::AsWritten), Some(partial));
        assert_eq!(
            preferred_shape(&[partial], BarrePolicy::SoundBarre),
            Some(shape(&[(3, 2), (4, 2), (5, 2)]))
        );
    }
}
