use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::{AnswerError, StepOutcome};

const ALTERNATING_SETS: [[&str; 2]; 5] = [
    ["🔴", "🔵"],
    ["🐶", "🐱"],
    ["☀️", "🌙"],
    ["⬆️", "⬇️"],
    ["🅰️", "🅱️"],
];

const GROUPED_SETS: [[&str; 2]; 3] = [["🍎", "🍐"], ["🚗", "🚕"], ["◼️", "◻️"]];

const CLOCK_FACES: [&str; 12] = [
    "🕐", "🕑", "🕒", "🕓", "🕔", "🕕", "🕖", "🕗", "🕘", "🕙", "🕚", "🕛",
];

const ARITHMETIC_STEPS: [i64; 4] = [1, 2, 5, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFamily {
    /// `A B A B A`, next is `B`.
    Alternating,
    /// `A A B B A`, next is `A`.
    Grouped,
    /// Four terms of an arithmetic progression.
    Arithmetic,
    /// Three consecutive clock faces, answer three hours after the first.
    Clock,
}

/// "What comes next?" question with three options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTrial {
    family: PatternFamily,
    sequence: Vec<String>,
    options: Vec<String>,
    answer: String,
}

impl PatternTrial {
    /// Hand-written question. Not checked here; run [`Trial::validate`]
    /// before putting it in front of a player.
    ///
    /// [`Trial::validate`]: super::Trial::validate
    #[must_use]
    pub fn authored(
        family: PatternFamily,
        sequence: Vec<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            family,
            sequence,
            options,
            answer: answer.into(),
        }
    }

    #[must_use]
    pub fn family(&self) -> PatternFamily {
        self.family
    }

    #[must_use]
    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer_key(&self) -> &str {
        &self.answer
    }

    pub(super) fn answer(&self, choice: &str) -> Result<StepOutcome, AnswerError> {
        if !self.options.iter().any(|o| o == choice) {
            return Err(AnswerError::UnknownOption(choice.to_string()));
        }
        Ok(StepOutcome::finished(choice == self.answer))
    }

    pub(super) fn check(&self) -> Option<String> {
        if !(3..=5).contains(&self.sequence.len()) {
            return Some(format!("sequence has {} symbols", self.sequence.len()));
        }
        if self.options.len() != 3 {
            return Some(format!("{} options instead of 3", self.options.len()));
        }
        let correct = self.options.iter().filter(|o| **o == self.answer).count();
        if correct != 1 {
            return Some(format!("{correct} options match the answer"));
        }
        let mut distinct = self.options.clone();
        distinct.sort();
        distinct.dedup();
        if distinct.len() != self.options.len() {
            return Some("duplicate options".to_string());
        }
        None
    }
}

pub(super) fn generate<R: Rng + ?Sized>(rng: &mut R) -> PatternTrial {
    match rng.random_range(0..4) {
        0 => pair_pattern(PatternFamily::Alternating, &ALTERNATING_SETS, rng),
        1 => pair_pattern(PatternFamily::Grouped, &GROUPED_SETS, rng),
        2 => arithmetic_pattern(rng),
        _ => clock_pattern(rng),
    }
}

fn pair_pattern<R: Rng + ?Sized>(
    family: PatternFamily,
    sets: &[[&str; 2]],
    rng: &mut R,
) -> PatternTrial {
    let pick = rng.random_range(0..sets.len());
    let [a, b] = sets[pick];
    let (shape, answer, other) = match family {
        PatternFamily::Grouped => ([a, a, b, b, a], a, b),
        _ => ([a, b, a, b, a], b, a),
    };

    // Third option comes from another set of the same family.
    let foreign: Vec<&str> = sets
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pick)
        .flat_map(|(_, set)| set.iter().copied())
        .collect();
    let decoy = foreign.choose(rng).copied().unwrap_or(other);

    let mut options = vec![answer.to_string(), other.to_string(), decoy.to_string()];
    options.shuffle(rng);

    PatternTrial {
        family,
        sequence: shape.iter().map(|s| (*s).to_string()).collect(),
        options,
        answer: answer.to_string(),
    }
}

fn arithmetic_pattern<R: Rng + ?Sized>(rng: &mut R) -> PatternTrial {
    let start: i64 = rng.random_range(1..=10);
    let step = ARITHMETIC_STEPS[rng.random_range(0..ARITHMETIC_STEPS.len())];
    let sequence = (0..4).map(|i| (start + i * step).to_string()).collect();
    let answer = start + 4 * step;

    let mut options = vec![
        answer.to_string(),
        (answer + step).to_string(),
        (answer - step).to_string(),
    ];
    options.shuffle(rng);

    PatternTrial {
        family: PatternFamily::Arithmetic,
        sequence,
        options,
        answer: answer.to_string(),
    }
}

fn clock_pattern<R: Rng + ?Sized>(rng: &mut R) -> PatternTrial {
    let start = rng.random_range(0..CLOCK_FACES.len());
    let face = |offset: usize| CLOCK_FACES[(start + offset) % CLOCK_FACES.len()].to_string();

    let sequence = (0..3).map(&face).collect();
    let answer = face(3);
    let mut options = vec![answer.clone(), face(4), face(CLOCK_FACES.len() - 1)];
    options.shuffle(rng);

    PatternTrial {
        family: PatternFamily::Clock,
        sequence,
        options,
        answer,
    }
}
