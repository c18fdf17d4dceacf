use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{AnswerError, StepOutcome};
use crate::model::Difficulty;

pub const MARKET_ITEMS: [&str; 24] = [
    "apple",
    "banana",
    "grapes",
    "watermelon",
    "orange",
    "strawberry",
    "cabbage",
    "carrot",
    "potato",
    "tomato",
    "corn",
    "broccoli",
    "fish",
    "chicken leg",
    "egg",
    "milk",
    "bread",
    "noodles",
    "rice",
    "cake",
    "cookie",
    "candy",
    "soy sauce",
    "ice cream",
];

const DISTRACTOR_COUNT: usize = 8;

/// Shopping list to memorise, then pick out of a shelf of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallTrial {
    targets: Vec<String>,
    distractors: Vec<String>,
    shelf: Vec<String>,
    tally: Option<(usize, usize)>,
}

impl RecallTrial {
    /// Items on the shopping list.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    #[must_use]
    pub fn distractors(&self) -> &[String] {
        &self.distractors
    }

    /// Targets and distractors together, in display order.
    #[must_use]
    pub fn shelf(&self) -> &[String] {
        &self.shelf
    }

    /// `(correct, wrong)` once a basket has been submitted.
    #[must_use]
    pub fn tally(&self) -> Option<(usize, usize)> {
        self.tally
    }

    pub(super) fn submit(&mut self, basket: &[String]) -> Result<StepOutcome, AnswerError> {
        if self.tally.is_some() {
            return Err(AnswerError::TrialComplete);
        }
        let picked: BTreeSet<&str> = basket.iter().map(String::as_str).collect();
        if let Some(unknown) = picked.iter().find(|p| !self.shelf.iter().any(|s| s == *p)) {
            return Err(AnswerError::UnknownOption((*unknown).to_string()));
        }
        let correct = picked
            .iter()
            .filter(|p| self.targets.iter().any(|t| t == *p))
            .count();
        let wrong = picked.len() - correct;
        self.tally = Some((correct, wrong));
        Ok(StepOutcome::finished(
            wrong == 0 && correct == self.targets.len(),
        ))
    }

    pub(super) fn check(&self) -> Option<String> {
        if self.targets.is_empty() {
            return Some("empty shopping list".to_string());
        }
        if let Some(clash) = self.distractors.iter().find(|d| self.targets.contains(d)) {
            return Some(format!("{clash} is both a target and a distractor"));
        }
        if self.shelf.len() != self.targets.len() + self.distractors.len() {
            return Some("shelf does not hold every item".to_string());
        }
        None
    }
}

/// List length grows with difficulty.
fn target_count(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 3,
        Difficulty::Medium => 5,
        Difficulty::Hard => 7,
    }
}

pub(super) fn generate<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> RecallTrial {
    let count = target_count(difficulty);
    let mut pool = super::shuffled(&MARKET_ITEMS, rng);
    pool.truncate(count + DISTRACTOR_COUNT);
    let distractors = pool.split_off(count);
    let targets = pool;

    let mut shelf: Vec<String> = targets.iter().chain(&distractors).cloned().collect();
    shelf.shuffle(rng);

    RecallTrial {
        targets,
        distractors,
        shelf,
        tally: None,
    }
}
