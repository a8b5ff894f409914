use std::fmt;

use super::{MIN_BAR_WIDTH, MIN_NOTE_WIDTH, TabEntry};
use crate::music::pitch::{Duration, TICKS_PER_BAR};
use crate::shape::STRINGS;

/// One measure of tablature.
///
/// Each entry gets a field proportional to its duration; the fret number sits
/// at the start of the field and the rest is filled with `-`. Whatever the
/// entries leave unused at the end of the bar prints as spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    target_width: usize,
    entries: Vec<TabEntry>,
    filled: Duration,
}

impl Bar {
    pub fn new(width: usize) -> Self {
        Self {
            target_width: width.max(MIN_BAR_WIDTH),
            entries: Vec::new(),
            filled: Duration::ZERO,
        }
    }

    pub fn entries(&self) -> &[TabEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.filled >= Duration::BAR
    }

    pub fn remaining(&self) -> Duration {
        Duration::BAR.saturating_sub(self.filled)
    }

    /// Add an entry, truncated to what still fits. Returns the part that
    /// didn't fit, if any.
    pub fn push(&mut self, entry: TabEntry) -> Option<Duration> {
        let room = self.remaining();
        if room.is_zero() {
            return Some(entry.duration);
        }
        let kept = entry.duration.min(room);
        self.entries.push(TabEntry::new(entry.shape, kept));
        self.filled = self.filled + kept;

        let leftover = entry.duration.saturating_sub(kept);
        (!leftover.is_zero()).then_some(leftover)
    }

    /// Printed width between the bar lines. Widens so the shortest entry gets
    /// at least MIN_NOTE_WIDTH characters.
    pub fn width(&self) -> usize {
        let shortest = self
            .entries
            .iter()
            .map(|e| e.duration.ticks())
            .filter(|&t| t > 0)
            .min();
        match shortest {
            Some(ticks) => {
                let needed = (MIN_NOTE_WIDTH * TICKS_PER_BAR as usize).div_ceil(ticks as usize);
                self.target_width.max(needed)
            }
            None => self.target_width,
        }
    }

    /// The content of one string's row, without bar lines.
    pub fn row(&self, string: usize) -> String {
        let width = self.width();
        let mut row = String::with_capacity(width);
        for entry in &self.entries {
            let field = width * entry.duration.ticks() as usize / TICKS_PER_BAR as usize;
            let text = entry
                .shape
                .fret(string)
                .map(|f| f.to_string())
                .unwrap_or_default();
            row.push_str(&format!("{text:-<field$}"));
        }
        let used = row.chars().count();
        row.push_str(&" ".repeat(width.saturating_sub(used)));
        row
    }

    /// Six framed lines, highest string first.
    pub fn lines(&self) -> Vec<String> {
        (0..STRINGS)
            .rev()
            .map(|string| format!("|{}|", self.row(string)))
            .collect()
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
