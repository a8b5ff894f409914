// Fingering path search across a whole song.
//
// A global search over every chord's candidates is exponential, so the planner
// looks WINDOW chords ahead, brute-forces that window from the current hand,
// commits only the first shape, moves the persisted hand onto it, and slides
// forward one chord. Once fewer than WINDOW chords remain the tail is solved
// in one go.

use serde::Serialize;

use crate::hand::{BarrePolicy, Hand, preferred_shape, strain};
use crate::music::Song;
use crate::resolver::{Fretboard, Product, Unplayable};
use crate::shape::Shape;
use crate::tab::{Arrangement, TabEntry};

/// Chords considered jointly before committing the next fingering.
pub const WINDOW: usize = 3;

/// A chord that was replaced by a rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub chord_index: usize,
    pub chord: String,
    pub reason: Unplayable,
}

/// One chosen shape per chord, plus whatever could not be played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcription {
    pub steps: Vec<TabEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Transcription {
    pub fn shapes(&self) -> impl Iterator<Item = Shape> + '_ {
        self.steps.iter().map(|entry| entry.shape)
    }

    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Lay the steps out as tablature.
    pub fn arrange(&self, bar_width: usize, max_width: usize) -> Arrangement {
        let mut arrangement = Arrangement::new(bar_width, max_width);
        for entry in &self.steps {
            arrangement.push(*entry);
        }
        arrangement
    }
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    fretboard: Fretboard,
    barre_policy: BarrePolicy,
}

impl Planner {
    pub fn new(fretboard: Fretboard) -> Self {
        Self {
            fretboard,
            barre_policy: BarrePolicy::default(),
        }
    }

    pub fn with_barre_policy(mut self, barre_policy: BarrePolicy) -> Self {
        self.barre_policy = barre_policy;
        self
    }

    pub fn fretboard(&self) -> &Fretboard {
        &self.fretboard
    }

    /// Candidate shapes for every chord. Unplayable chords get a single
    /// silent candidate and a diagnostic.
    pub fn candidates(&self, song: &Song) -> (Vec<Vec<Shape>>, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let candidates = song
            .chords()
            .iter()
            .enumerate()
            .map(|(chord_index, chord)| match self.fretboard.voicings(chord) {
                Ok(shapes) => shapes,
                Err(reason) => {
                    log::warn!("Chord {chord_index} {chord} is unplayable: {reason}");
                    diagnostics.push(Diagnostic {
                        chord_index,
                        chord: chord.to_string(),
                        reason,
                    });
                    vec![Shape::silent()]
                }
            })
            .collect();
        (candidates, diagnostics)
    }

    pub fn plan(&self, song: &Song) -> Transcription {
        let (candidates, diagnostics) = self.candidates(song);
        let shapes = self.choose(&candidates);

        let steps = shapes
            .into_iter()
            .zip(song.chords())
            .map(|(shape, chord)| TabEntry::new(shape, chord.duration()))
            .collect();

        Transcription { steps, diagnostics }
    }

    /// Pick one shape per candidate list.
    pub fn choose(&self, candidates: &[Vec<Shape>]) -> Vec<Shape> {
        let mut hand = Hand::new();
        let mut path = Vec::with_capacity(candidates.len());
        let mut i = 0;

        while candidates.len() - i >= WINDOW {
            let best = best_combination(&hand, &candidates[i..i + WINDOW]);
            let Some(&first) = best.first() else {
                break;
            };
            let cost = hand.move_to(&first);
            log::debug!("Chord {i}: committed {first} (move {cost})");
            path.push(self.sounded(first));
            i += 1;
        }

        match &candidates[i..] {
            [] => {}
            [last] => {
                if let Some(shape) = preferred_shape(last, self.barre_policy) {
                    path.push(shape);
                }
            }
            tail => {
                path.extend(best_combination(&hand, tail).into_iter().map(|s| self.sounded(s)));
            }
        }

        path
    }

    /// What gets printed for a chosen shape. Only the shape's own barre is
    /// added; fingers still down from earlier chords don't sound.
    fn sounded(&self, written: Shape) -> Shape {
        match self.barre_policy {
            BarrePolicy::AsWritten => written,
            BarrePolicy::SoundBarre => Hand::holding(&written).shape(),
        }
    }
}

/// Brute-force the cheapest run through `window`, starting from `hand`.
///
/// Each step costs its movement plus the strain of the shape on its own. The
/// first combination with the lowest total wins.
fn best_combination(hand: &Hand, window: &[Vec<Shape>]) -> Vec<Shape> {
    let mut trial = hand.clone();
    let start = trial.snapshot();
    let mut best: Option<(u32, Vec<Shape>)> = None;

    for combo in Product::new(window) {
        trial.restore(&start);
        let cost: u32 = combo
            .iter()
            .map(|shape| trial.move_to(shape) + strain(shape))
            .sum();
        if best.as_ref().is_none_or(|(c, _)| cost < *c) {
            best = Some((cost, combo.into_iter().copied().collect()));
        }
    }

    best.map(|(_, shapes)| shapes).unwrap_or_default()
}
