use rand::Rng;
use rand::seq::SliceRandom;

use super::{AnswerError, GeneratorError, Judgement, StepOutcome};
use crate::model::ExerciseKind;

/// Card faces a memory deck is drawn from.
pub const MEMORY_SYMBOLS: [&str; 12] = [
    "🀄", "🃏", "🀐", "🀙", "🀘", "🀅", "🀇", "🀆", "🀀", "🀁", "🀂", "🀃",
];

/// Shuffled deck of face-down pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTrial {
    cards: Vec<String>,
    matched: Vec<bool>,
    moves: u32,
}

impl MemoryTrial {
    #[must_use]
    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    #[must_use]
    pub fn is_matched(&self, index: usize) -> bool {
        self.matched.get(index).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    /// Number of two-card reveals so far.
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.matched.iter().all(|m| *m)
    }

    pub(super) fn reveal(&mut self, first: usize, second: usize) -> Result<StepOutcome, AnswerError> {
        let len = self.cards.len();
        for index in [first, second] {
            if index >= len {
                return Err(AnswerError::OutOfRange { index, len });
            }
            if self.matched[index] {
                return Err(AnswerError::AlreadyMatched(index));
            }
        }
        if first == second {
            return Err(AnswerError::SameCard);
        }

        self.moves += 1;
        let hit = self.cards[first] == self.cards[second];
        if hit {
            self.matched[first] = true;
            self.matched[second] = true;
        }
        Ok(StepOutcome {
            judgement: if hit {
                Judgement::Correct
            } else {
                Judgement::Incorrect
            },
            trial_complete: self.is_complete(),
        })
    }

    pub(super) fn check(&self) -> Option<String> {
        if self.cards.is_empty() || self.cards.len() % 2 != 0 {
            return Some(format!("deck of {} cards", self.cards.len()));
        }
        for card in &self.cards {
            let copies = self.cards.iter().filter(|c| *c == card).count();
            if copies != 2 {
                return Some(format!("{card} appears {copies} times"));
            }
        }
        None
    }
}

pub(super) fn generate<R: Rng + ?Sized>(
    pair_count: usize,
    rng: &mut R,
) -> Result<MemoryTrial, GeneratorError> {
    if !(1..=MEMORY_SYMBOLS.len()).contains(&pair_count) {
        return Err(GeneratorError::params(
            ExerciseKind::Memory,
            format!(
                "pair count {pair_count} must be between 1 and {}",
                MEMORY_SYMBOLS.len()
            ),
        ));
    }
    let mut faces = super::shuffled(&MEMORY_SYMBOLS, rng);
    faces.truncate(pair_count);

    let mut cards: Vec<String> = faces.iter().chain(faces.iter()).cloned().collect();
    cards.shuffle(rng);

    Ok(MemoryTrial {
        matched: vec![false; cards.len()],
        cards,
        moves: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn partner(trial: &MemoryTrial, index: usize) -> usize {
        (0..trial.cards().len())
            .find(|i| *i != index && trial.cards()[*i] == trial.cards()[index])
            .unwrap()
    }

    fn solve_perfectly(trial: &mut MemoryTrial) {
        for i in 0..trial.cards().len() {
            if !trial.is_matched(i) {
                let j = partner(trial, i);
                trial.reveal(i, j).unwrap();
            }
        }
    }

    #[test]
    fn deck_holds_each_face_twice() {
        let trial = generate(6, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(trial.cards().len(), 12);
        assert_eq!(trial.check(), None);
    }

    #[test]
    fn perfect_play_uses_one_move_per_pair() {
        let mut trial = generate(4, &mut StdRng::seed_from_u64(2)).unwrap();
        solve_perfectly(&mut trial);
        assert!(trial.is_complete());
        assert_eq!(trial.moves(), 4);
    }

    #[test]
    fn mismatch_counts_as_a_move() {
        let mut trial = generate(4, &mut StdRng::seed_from_u64(3)).unwrap();
        let other = (1..8).find(|i| *i != partner(&trial, 0)).unwrap();
        let outcome = trial.reveal(0, other).unwrap();
        assert_eq!(outcome.judgement, Judgement::Incorrect);
        assert!(!trial.is_matched(0));
        assert_eq!(trial.moves(), 1);
    }

    #[test]
    fn invalid_reveals_do_not_count() {
        let mut trial = generate(4, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(trial.reveal(0, 0), Err(AnswerError::SameCard));
        assert!(matches!(
            trial.reveal(0, 8),
            Err(AnswerError::OutOfRange { index: 8, len: 8 })
        ));
        let j = partner(&trial, 0);
        trial.reveal(0, j).unwrap();
        let k = (1..8).find(|i| *i != j).unwrap();
        assert_eq!(trial.reveal(0, k), Err(AnswerError::AlreadyMatched(0)));
        assert_eq!(trial.moves(), 1);
    }

    #[test]
    fn pair_count_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate(0, &mut rng).is_err());
        assert!(generate(13, &mut rng).is_err());
        assert!(generate(12, &mut rng).is_ok());
    }
}
