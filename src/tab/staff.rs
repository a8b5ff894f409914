use std::fmt;

use super::bar::Bar;
use crate::shape::STRINGS;

/// Bars printed side by side, sharing the bar line between neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Staff {
    bars: Vec<Bar>,
}

impl Staff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Printed line length, bar lines included.
    pub fn width(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.bars.iter().map(Bar::width).sum::<usize>() + self.bars.len() + 1
    }

    /// Whether `bar` can be appended without the line exceeding `max_width`.
    /// An empty staff takes any bar.
    pub fn fits(&self, bar: &Bar, max_width: usize) -> bool {
        self.is_empty() || self.width() + bar.width() + 1 <= max_width
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    /// Six lines, highest string first. Padding prints as `-`.
    pub fn lines(&self) -> Vec<String> {
        (0..STRINGS)
            .rev()
            .map(|string| {
                let rows: Vec<String> = self.bars.iter().map(|bar| bar.row(string)).collect();
                format!("|{}|", rows.join("|")).replace(' ', "-")
            })
            .collect()
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        writeln!(f)
    }
}
