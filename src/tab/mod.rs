// ASCII tablature layout.
//
// Entries go into bars, bars into staffs, staffs into the arrangement. A
// duration that runs past the end of a bar is cut at the bar line and the
// remainder continues in the next bar as a sustain.

pub mod bar;
pub mod staff;

pub use bar::Bar;
pub use staff::Staff;

use serde::Serialize;
use std::fmt;

use crate::music::Duration;
use crate::shape::Shape;

/// Characters per whole-note bar unless the notes need more.
pub const DEFAULT_BAR_WIDTH: usize = 32;
/// Narrowest bar printed, even when empty.
pub const MIN_BAR_WIDTH: usize = 8;
/// Widest staff line before wrapping: two default bars and three bar lines.
pub const MAX_WIDTH: usize = 67;
/// Characters given to the shortest note in a bar.
pub const MIN_NOTE_WIDTH: usize = 4;

/// A shape held for a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabEntry {
    pub shape: Shape,
    pub duration: Duration,
}

impl TabEntry {
    pub fn new(shape: Shape, duration: Duration) -> Self {
        Self { shape, duration }
    }

    pub fn rest(duration: Duration) -> Self {
        Self::new(Shape::silent(), duration)
    }
}

/// The full tablature for a passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    bar_width: usize,
    max_width: usize,
    bars: Vec<Bar>,
    current: Bar,
}

impl Default for Arrangement {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_WIDTH, MAX_WIDTH)
    }
}

impl Arrangement {
    pub fn new(bar_width: usize, max_width: usize) -> Self {
        Self {
            bar_width,
            max_width,
            bars: Vec::new(),
            current: Bar::new(bar_width),
        }
    }

    pub fn push(&mut self, entry: TabEntry) {
        let mut entry = entry;
        while let Some(leftover) = self.current.push(entry) {
            self.close_bar();
            entry = TabEntry::rest(leftover);
        }
        if self.current.is_full() {
            self.close_bar();
        }
    }

    fn close_bar(&mut self) {
        let bar = std::mem::replace(&mut self.current, Bar::new(self.bar_width));
        self.bars.push(bar);
    }

    /// Every bar so far, including the one still being filled.
    pub fn bars(&self) -> Vec<&Bar> {
        let open = (!self.current.is_empty() || self.bars.is_empty()).then_some(&self.current);
        self.bars.iter().chain(open).collect()
    }

    /// Pack bars into staffs no wider than `max_width`.
    pub fn staffs(&self) -> Vec<Staff> {
        let mut staffs: Vec<Staff> = Vec::new();
        let mut staff = Staff::new();
        for bar in self.bars() {
            if !staff.fits(bar, self.max_width) {
                staffs.push(std::mem::take(&mut staff));
            }
            staff.push(bar.clone());
        }
        staffs.push(staff);
        staffs
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Extend<TabEntry> for Arrangement {
    fn extend<I: IntoIterator<Item = TabEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for staff in self.staffs() {
            write!(f, "{staff}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::NoteValue;

    fn single(string: usize, fret: u8, value: NoteValue) -> TabEntry {
        TabEntry::new(Shape::single(string, fret), value.duration())
    }

    fn blank_staff(width: usize) -> String {
        let line = format!("|{}|\n", "-".repeat(width));
        format!("{}\n", line.repeat(6))
    }

    #[test]
    fn test_empty_arrangement() {
        let a = Arrangement::default();
        assert_eq!(a.staffs().len(), 1);
        assert_eq!(a.render(), blank_staff(32));
    }

    #[test]
    fn test_e_major_scale() {
        let mut a = Arrangement::default();
        let scale = [(0, 0), (0, 2), (0, 4), (1, 0), (1, 2), (1, 4), (2, 1), (2, 2)];
        for (string, fret) in scale {
            a.push(single(string, fret, NoteValue::Eighth));
        }
        let expected = [
            "|--------------------------------|",
            "|--------------------------------|",
            "|--------------------------------|",
            "|------------------------1---2---|",
            "|------------0---2---4-----------|",
            "|0---2---4-----------------------|",
        ];
        let rendered = a.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(&lines[..6], &expected);
        assert_eq!(lines[6], "");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_carry_over_prints_sustain() {
        let mut a = Arrangement::default();
        a.push(single(0, 0, NoteValue::Half));
        a.push(single(0, 3, NoteValue::Whole));
        // The whole note starts on beat three: half of it spills into bar two.
        let bars = a.bars();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].is_full());
        assert_eq!(bars[1].entries(), &[TabEntry::rest(NoteValue::Half.duration())]);

        let rendered = a.render();
        let low_e: Vec<&str> = rendered.lines().skip(5).take(1).collect();
        assert_eq!(
            low_e,
            vec![format!("|0{}3{}|{}|", "-".repeat(15), "-".repeat(15), "-".repeat(32))]
        );
    }

    #[test]
    fn test_long_rest_spans_bars() {
        let mut a = Arrangement::default();
        a.push(single(0, 0, NoteValue::Whole));
        a.push(TabEntry::rest(Duration::from_ticks(80)));
        // 80 ticks is two and a half bars.
        assert_eq!(a.bars().len(), 4);
    }

    #[test]
    fn test_staff_wrapping() {
        for count in 1..=8usize {
            let mut a = Arrangement::default();
            for _ in 0..count {
                a.push(single(0, 0, NoteValue::Whole));
            }
            let staffs = a.staffs();
            assert_eq!(staffs.len(), count.div_ceil(2), "{count} bars");
            for staff in &staffs {
                assert!(staff.width() <= MAX_WIDTH);
            }
            let rendered = a.render();
            assert_eq!(rendered.lines().count(), staffs.len() * 7);
        }
    }

    #[test]
    fn test_wide_bar_gets_own_staff() {
        let mut a = Arrangement::default();
        a.push(single(0, 0, NoteValue::Whole));
        for _ in 0..16 {
            a.push(single(0, 1, NoteValue::Sixteenth));
        }
        a.push(single(0, 2, NoteValue::Whole));
        // The sixteenth bar is 64 wide and can't share a line.
        assert_eq!(a.staffs().len(), 3);
    }

    #[test]
    fn test_configured_width() {
        let mut a = Arrangement::new(16, 200);
        a.push(single(0, 7, NoteValue::Whole));
        let rendered = a.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[5], format!("|7{}|", "-".repeat(15)));
        let narrow = Arrangement::new(3, MAX_WIDTH);
        assert_eq!(narrow.render(), blank_staff(MIN_BAR_WIDTH));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut a = Arrangement::default();
        a.extend([
            single(0, 0, NoteValue::Quarter),
            single(1, 2, NoteValue::Eighth),
            TabEntry::new(Shape::from_positions(&[(0, 3), (2, 0), (3, 0)]), NoteValue::Half.duration()),
            single(4, 1, NoteValue::Whole),
        ]);
        assert_eq!(a.render(), a.render());
        assert_eq!(a.clone().render(), a.render());
    }
}
