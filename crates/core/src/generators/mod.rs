//! Procedural content for the turn-based exercises.
//!
//! Every generator is a pure function of the level and a caller-supplied
//! random source. Trials carry their own answer key and per-trial progress
//! (found tiles, matched cards, sort position) and are judged through
//! [`Trial::apply`].

mod arithmetic;
mod inhibition;
mod memory;
mod pattern;
mod recall;
mod search;
mod sorting;

use rand::{Rng, RngCore};
use thiserror::Error;

use crate::model::{ExerciseKind, ExerciseLevel, Score};
use crate::scoring::{memory_score, recall_score};

pub use arithmetic::{ArithmeticTemplate, ArithmeticTrial};
pub use inhibition::{InhibitionTrial, InkColor};
pub use memory::{MEMORY_SYMBOLS, MemoryTrial};
pub use pattern::{PatternFamily, PatternTrial};
pub use recall::{MARKET_ITEMS, RecallTrial};
pub use search::{GLYPH_PAIRS, SearchTrial};
pub use sorting::{SortBin, SortItem, SortingTrial};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A generator could not produce a usable trial.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("{kind} is driven by the reaction simulation, not by trials")]
    NotTurnBased { kind: ExerciseKind },

    #[error("invalid level params for {kind}: {reason}")]
    InvalidParams {
        kind: ExerciseKind,
        reason: String,
    },

    #[error("generated {kind} trial is malformed: {reason}")]
    Malformed {
        kind: ExerciseKind,
        reason: String,
    },
}

impl GeneratorError {
    fn params(kind: ExerciseKind, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            kind,
            reason: reason.into(),
        }
    }

    fn malformed(kind: ExerciseKind, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            reason: reason.into(),
        }
    }
}

/// An answer the active trial cannot accept. The trial is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("{expected} trial cannot accept this kind of answer")]
    WrongShape { expected: ExerciseKind },

    #[error("index {index} is outside a board of {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("option {0:?} is not offered by this trial")]
    UnknownOption(String),

    #[error("a move must reveal two different cards")]
    SameCard,

    #[error("card {0} is already matched")]
    AlreadyMatched(usize),

    #[error("trial is already complete")]
    TrialComplete,
}

//
// ─── ANSWERS & OUTCOMES ────────────────────────────────────────────────────────
//

/// Caller input for one step of a trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick one of the offered pattern options.
    Choice(String),
    /// Integer result of an arithmetic problem.
    Number(i64),
    /// Tap a cell on the search board.
    Tile(usize),
    /// Turn over two memory cards.
    Reveal(usize, usize),
    /// Submit the remembered shopping list.
    Basket(Vec<String>),
    /// Drop the current sorting item into a bin.
    Sort(SortBin),
    /// Name a colour in the inhibition task.
    Color(InkColor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Correct,
    Incorrect,
    /// Accepted but without effect, e.g. tapping an already found tile.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub judgement: Judgement,
    /// The trial has nothing left to answer.
    pub trial_complete: bool,
}

impl StepOutcome {
    fn finished(correct: bool) -> Self {
        Self {
            judgement: if correct {
                Judgement::Correct
            } else {
                Judgement::Incorrect
            },
            trial_complete: true,
        }
    }
}

//
// ─── TRIAL ─────────────────────────────────────────────────────────────────────
//

/// One generated round of a turn-based exercise.
#[derive(Debug, Clone, PartialEq)]
pub enum Trial {
    Pattern(PatternTrial),
    Arithmetic(ArithmeticTrial),
    Search(SearchTrial),
    Memory(MemoryTrial),
    Recall(RecallTrial),
    Sorting(SortingTrial),
    Inhibition(InhibitionTrial),
}

impl Trial {
    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        match self {
            Trial::Pattern(_) => ExerciseKind::Pattern,
            Trial::Arithmetic(_) => ExerciseKind::Arithmetic,
            Trial::Search(_) => ExerciseKind::Search,
            Trial::Memory(_) => ExerciseKind::Memory,
            Trial::Recall(_) => ExerciseKind::Recall,
            Trial::Sorting(_) => ExerciseKind::Sorting,
            Trial::Inhibition(_) => ExerciseKind::Inhibition,
        }
    }

    /// Judge one answer and advance the trial's own progress.
    ///
    /// # Errors
    ///
    /// Returns an `AnswerError` when the answer has the wrong shape for this
    /// trial or refers to something the trial does not contain. The trial is
    /// not modified in that case.
    pub fn apply(&mut self, answer: &Answer) -> Result<StepOutcome, AnswerError> {
        let expected = self.kind();
        match (self, answer) {
            (Trial::Pattern(t), Answer::Choice(choice)) => t.answer(choice),
            (Trial::Arithmetic(t), Answer::Number(n)) => Ok(t.answer(*n)),
            (Trial::Search(t), Answer::Tile(index)) => t.tap(*index),
            (Trial::Memory(t), Answer::Reveal(a, b)) => t.reveal(*a, *b),
            (Trial::Recall(t), Answer::Basket(items)) => t.submit(items),
            (Trial::Sorting(t), Answer::Sort(bin)) => t.place(*bin),
            (Trial::Inhibition(t), Answer::Color(color)) => t.answer(*color),
            _ => Err(AnswerError::WrongShape { expected }),
        }
    }

    /// Score for exercises that are judged once the whole set is done.
    ///
    /// `None` until the trial is complete, and always `None` for exercises
    /// scored per action.
    #[must_use]
    pub fn completion_score(&self) -> Option<Score> {
        match self {
            Trial::Memory(t) if t.is_complete() => Some(memory_score(t.moves(), t.pair_count())),
            Trial::Recall(t) => t
                .tally()
                .map(|(correct, wrong)| recall_score(correct, wrong, t.targets().len())),
            _ => None,
        }
    }

    /// Check the structural invariants of a freshly generated trial.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::Malformed` describing the first violation.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        let kind = self.kind();
        let problem = match self {
            Trial::Pattern(t) => t.check(),
            Trial::Arithmetic(t) => t.check(),
            Trial::Search(t) => t.check(),
            Trial::Memory(t) => t.check(),
            Trial::Recall(t) => t.check(),
            Trial::Sorting(t) => t.check(),
            Trial::Inhibition(t) => t.check(),
        };
        match problem {
            Some(reason) => Err(GeneratorError::malformed(kind, reason)),
            None => Ok(()),
        }
    }
}

/// Produce a fresh trial for `kind` at `level`.
///
/// # Errors
///
/// Returns `GeneratorError::NotTurnBased` for the reaction exercise and
/// `GeneratorError::InvalidParams` when the level params cannot be satisfied.
pub fn generate<R: Rng + ?Sized>(
    kind: ExerciseKind,
    level: &ExerciseLevel,
    rng: &mut R,
) -> Result<Trial, GeneratorError> {
    match kind {
        ExerciseKind::Pattern => Ok(Trial::Pattern(pattern::generate(rng))),
        ExerciseKind::Arithmetic => Ok(Trial::Arithmetic(arithmetic::generate(
            level.difficulty(),
            rng,
        ))),
        ExerciseKind::Search => search::generate(level.params().grid_size(), rng).map(Trial::Search),
        ExerciseKind::Memory => memory::generate(level.params().pair_count(), rng).map(Trial::Memory),
        ExerciseKind::Recall => Ok(Trial::Recall(recall::generate(level.difficulty(), rng))),
        ExerciseKind::Sorting => Ok(Trial::Sorting(sorting::generate(level.level(), rng))),
        ExerciseKind::Inhibition => Ok(Trial::Inhibition(inhibition::generate(level.level(), rng))),
        ExerciseKind::Reaction => Err(GeneratorError::NotTurnBased { kind }),
    }
}

//
// ─── TRIAL SOURCES ─────────────────────────────────────────────────────────────
//

/// Where a session pulls its trials from.
///
/// The standard implementation wraps [`generate`]; tests substitute sources
/// that fail or misbehave on purpose.
pub trait TrialSource: Send {
    /// # Errors
    ///
    /// Returns a `GeneratorError` if no trial could be produced.
    fn next_trial(
        &mut self,
        level: &ExerciseLevel,
        rng: &mut dyn RngCore,
    ) -> Result<Trial, GeneratorError>;
}

/// Built-in generator for one exercise kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardSource {
    kind: ExerciseKind,
}

impl StandardSource {
    #[must_use]
    pub fn new(kind: ExerciseKind) -> Self {
        Self { kind }
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }
}

impl TrialSource for StandardSource {
    fn next_trial(
        &mut self,
        level: &ExerciseLevel,
        rng: &mut dyn RngCore,
    ) -> Result<Trial, GeneratorError> {
        generate(self.kind, level, rng)
    }
}

//
// ─── TERMINATION ───────────────────────────────────────────────────────────────
//

/// Fallback countdown for timed exercises whose level does not set one.
pub const DEFAULT_DURATION_SECS: u32 = 45;
pub const PATTERN_DURATION_SECS: u32 = 60;
pub const SEARCH_DURATION_SECS: u32 = 30;

/// When a playing session moves to feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Wall-clock countdown; trials keep coming until it expires.
    Countdown { secs: u32 },
    /// Fixed number of trials.
    TrialBudget { trials: u32 },
    /// A single trial that ends the session once complete.
    TrialCompletion,
}

impl Termination {
    #[must_use]
    pub fn for_exercise(kind: ExerciseKind, level: &ExerciseLevel) -> Self {
        let params = level.params();
        match kind {
            ExerciseKind::Pattern => Termination::Countdown {
                secs: params.duration_secs_or(PATTERN_DURATION_SECS),
            },
            ExerciseKind::Search => Termination::Countdown {
                secs: params.duration_secs_or(SEARCH_DURATION_SECS),
            },
            ExerciseKind::Inhibition | ExerciseKind::Reaction => Termination::Countdown {
                secs: params.duration_secs_or(DEFAULT_DURATION_SECS),
            },
            ExerciseKind::Arithmetic => Termination::TrialBudget {
                trials: params.question_count(),
            },
            ExerciseKind::Memory | ExerciseKind::Recall | ExerciseKind::Sorting => {
                Termination::TrialCompletion
            }
        }
    }
}

/// Fisher-Yates shuffle of owned strings built from static tables.
fn shuffled<R: Rng + ?Sized>(items: &[&str], rng: &mut R) -> Vec<String> {
    use rand::seq::SliceRandom;
    let mut out: Vec<String> = items.iter().map(|s| (*s).to_string()).collect();
    out.shuffle(rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Catalog, LevelParams};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_turn_based_kind_generates_valid_trials() {
        let catalog = Catalog::standard().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for entry in catalog.entries() {
            if entry.kind().is_real_time() {
                continue;
            }
            for level in entry.levels() {
                for _ in 0..25 {
                    let trial = generate(entry.kind(), level, &mut rng).unwrap();
                    assert_eq!(trial.kind(), entry.kind());
                    trial.validate().unwrap();
                }
            }
        }
    }

    #[test]
    fn reaction_is_not_turn_based() {
        let level = ExerciseLevel::standard(1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            generate(ExerciseKind::Reaction, &level, &mut rng),
            Err(GeneratorError::NotTurnBased { .. })
        ));
    }

    #[test]
    fn wrong_answer_shape_leaves_trial_untouched() {
        let level = ExerciseLevel::standard(1).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut trial = generate(ExerciseKind::Search, &level, &mut rng).unwrap();
        let before = trial.clone();
        let err = trial.apply(&Answer::Number(4)).unwrap_err();
        assert_eq!(
            err,
            AnswerError::WrongShape {
                expected: ExerciseKind::Search
            }
        );
        assert_eq!(trial, before);
    }

    #[test]
    fn repeated_generation_is_independent() {
        let level = ExerciseLevel::standard(2).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let trials: Vec<Trial> = (0..10)
            .map(|_| generate(ExerciseKind::Memory, &level, &mut rng).unwrap())
            .collect();
        assert!(trials.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn standard_source_delegates_to_generator() {
        let level = ExerciseLevel::standard(1).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut source = StandardSource::new(ExerciseKind::Arithmetic);
        let trial = source.next_trial(&level, &mut rng).unwrap();
        assert_eq!(trial.kind(), ExerciseKind::Arithmetic);
    }

    #[test]
    fn termination_follows_exercise_rules() {
        let level = ExerciseLevel::standard(1).unwrap();
        assert_eq!(
            Termination::for_exercise(ExerciseKind::Arithmetic, &level),
            Termination::TrialBudget { trials: 10 }
        );
        assert_eq!(
            Termination::for_exercise(ExerciseKind::Pattern, &level),
            Termination::Countdown { secs: 60 }
        );
        assert_eq!(
            Termination::for_exercise(ExerciseKind::Memory, &level),
            Termination::TrialCompletion
        );

        let timed = level.with_params(LevelParams {
            duration_secs: Some(30),
            ..LevelParams::default()
        });
        assert_eq!(
            Termination::for_exercise(ExerciseKind::Reaction, &timed),
            Termination::Countdown { secs: 30 }
        );
    }
}
