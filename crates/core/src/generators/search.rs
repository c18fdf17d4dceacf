use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{AnswerError, GeneratorError, Judgement, StepOutcome};
use crate::model::ExerciseKind;

/// Visually confusable `(target, distractor)` glyphs.
pub const GLYPH_PAIRS: [(&str, &str); 8] = [
    ("土", "士"),
    ("人", "入"),
    ("日", "曰"),
    ("未", "末"),
    ("大", "太"),
    ("甲", "由"),
    ("贝", "见"),
    ("右", "石"),
];

const MIN_GRID: usize = 6;
const MIN_TARGETS: usize = 3;
const MAX_TARGETS: usize = 5;

/// A board of lookalike glyphs with a handful of targets hidden in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTrial {
    target: String,
    distractor: String,
    cells: Vec<String>,
    found: BTreeSet<usize>,
    target_count: usize,
}

impl SearchTrial {
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    #[must_use]
    pub fn is_found(&self, index: usize) -> bool {
        self.found.contains(&index)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.target_count - self.found.len()
    }

    pub(super) fn tap(&mut self, index: usize) -> Result<StepOutcome, AnswerError> {
        let cell = self.cells.get(index).ok_or(AnswerError::OutOfRange {
            index,
            len: self.cells.len(),
        })?;
        if self.remaining() == 0 {
            return Err(AnswerError::TrialComplete);
        }
        if self.found.contains(&index) {
            return Ok(StepOutcome {
                judgement: Judgement::Ignored,
                trial_complete: false,
            });
        }
        let judgement = if *cell == self.target {
            self.found.insert(index);
            Judgement::Correct
        } else {
            Judgement::Incorrect
        };
        Ok(StepOutcome {
            judgement,
            trial_complete: self.remaining() == 0,
        })
    }

    pub(super) fn check(&self) -> Option<String> {
        let targets = self.cells.iter().filter(|c| **c == self.target).count();
        if targets != self.target_count {
            return Some(format!(
                "{targets} targets on board, expected {}",
                self.target_count
            ));
        }
        if !(MIN_TARGETS..=MAX_TARGETS).contains(&targets) {
            return Some(format!("{targets} targets is outside 3..=5"));
        }
        if self
            .cells
            .iter()
            .any(|c| *c != self.target && *c != self.distractor)
        {
            return Some("board contains a foreign glyph".to_string());
        }
        None
    }
}

pub(super) fn generate<R: Rng + ?Sized>(
    grid_size: usize,
    rng: &mut R,
) -> Result<SearchTrial, GeneratorError> {
    if grid_size < MIN_GRID {
        return Err(GeneratorError::params(
            ExerciseKind::Search,
            format!("grid of {grid_size} cells is smaller than {MIN_GRID}"),
        ));
    }
    let (target, distractor) = GLYPH_PAIRS[rng.random_range(0..GLYPH_PAIRS.len())];
    let target_count = rng.random_range(MIN_TARGETS..=MAX_TARGETS);

    let mut cells: Vec<String> = std::iter::repeat_n(target, target_count)
        .chain(std::iter::repeat_n(distractor, grid_size - target_count))
        .map(str::to_string)
        .collect();
    cells.shuffle(rng);

    Ok(SearchTrial {
        target: target.to_string(),
        distractor: distractor.to_string(),
        cells,
        found: BTreeSet::new(),
        target_count,
    })
}
