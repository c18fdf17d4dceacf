use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::{AnswerError, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
}

impl InkColor {
    pub const ALL: [InkColor; 5] = [
        InkColor::Red,
        InkColor::Blue,
        InkColor::Green,
        InkColor::Yellow,
        InkColor::Black,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            InkColor::Red => "red",
            InkColor::Blue => "blue",
            InkColor::Green => "green",
            InkColor::Yellow => "yellow",
            InkColor::Black => "black",
        }
    }

    fn others(self) -> Vec<InkColor> {
        Self::ALL.into_iter().filter(|c| *c != self).collect()
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Chance that the ink differs from the word above level 1.
const MISMATCH_PROBABILITY: f64 = 0.7;

/// A colour word printed in some ink.
///
/// Level 1 asks for the word's meaning; higher levels ask for the ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InhibitionTrial {
    word: InkColor,
    ink: InkColor,
    target: InkColor,
    options: [InkColor; 2],
}

impl InhibitionTrial {
    #[must_use]
    pub fn word(&self) -> InkColor {
        self.word
    }

    #[must_use]
    pub fn ink(&self) -> InkColor {
        self.ink
    }

    #[must_use]
    pub fn options(&self) -> [InkColor; 2] {
        self.options
    }

    #[must_use]
    pub fn answer_key(&self) -> InkColor {
        self.target
    }

    pub(super) fn answer(&self, color: InkColor) -> Result<StepOutcome, AnswerError> {
        if !self.options.contains(&color) {
            return Err(AnswerError::UnknownOption(color.name().to_string()));
        }
        Ok(StepOutcome::finished(color == self.target))
    }

    pub(super) fn check(&self) -> Option<String> {
        if self.options[0] == self.options[1] {
            return Some("both options are the same colour".to_string());
        }
        if !self.options.contains(&self.target) {
            return Some("target colour is not offered".to_string());
        }
        if self.target != self.word && self.target != self.ink {
            return Some("target is neither the word nor the ink".to_string());
        }
        None
    }
}

pub(super) fn generate<R: Rng + ?Sized>(level: u8, rng: &mut R) -> InhibitionTrial {
    let word = InkColor::ALL[rng.random_range(0..InkColor::ALL.len())];
    let ink = if level > 1 && rng.random_bool(MISMATCH_PROBABILITY) {
        word.others().choose(rng).copied().unwrap_or(word)
    } else {
        word
    };
    let target = if level == 1 { word } else { ink };
    let distractor = target.others().choose(rng).copied().unwrap_or(target);

    let options = if rng.random_bool(0.5) {
        [target, distractor]
    } else {
        [distractor, target]
    };

    InhibitionTrial {
        word,
        ink,
        target,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn level_one_never_mismatches() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let trial = generate(1, &mut rng);
            assert_eq!(trial.word(), trial.ink());
            assert_eq!(trial.answer_key(), trial.word());
        }
    }

    #[test]
    fn higher_levels_target_the_ink() {
        let mut rng = StdRng::seed_from_u64(2);
        let trials: Vec<_> = (0..200).map(|_| generate(2, &mut rng)).collect();
        assert!(trials.iter().all(|t| t.answer_key() == t.ink()));
        let mismatched = trials.iter().filter(|t| t.word() != t.ink()).count();
        // Roughly 70% of 200; wide margin keeps the seed from mattering.
        assert!((100..=180).contains(&mismatched), "{mismatched}");
    }

    #[test]
    fn two_distinct_options_include_target() {
        let mut rng = StdRng::seed_from_u64(3);
        for level in 1..=3 {
            for _ in 0..50 {
                let trial = generate(level, &mut rng);
                assert_eq!(trial.check(), None);
            }
        }
    }

    #[test]
    fn only_offered_colours_are_accepted() {
        let trial = generate(1, &mut StdRng::seed_from_u64(4));
        let missing = InkColor::ALL
            .into_iter()
            .find(|c| !trial.options().contains(c))
            .unwrap();
        assert!(trial.answer(missing).is_err());
        assert_eq!(
            trial.answer(trial.answer_key()).unwrap(),
            StepOutcome::finished(true)
        );
    }
}
