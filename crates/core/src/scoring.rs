//! Score accumulation and star conversion.
//!
//! Two shapes coexist:
//! - per-trial accumulation (pattern, arithmetic, search, inhibition, reaction),
//!   where each judged action moves a running total;
//! - set-completion accuracy (recall, sorting, memory), computed from the
//!   finished trial.
//!
//! Either way the final value is clamped into `0..=100` before it becomes a
//! [`Score`], and a [`StarThresholds`] table maps it onto 1-3 stars.

use serde::{Deserialize, Serialize};

use crate::model::{ExerciseKind, ExerciseLevel, ModelError, Score, Stars};

/// Points for a correct pattern, arithmetic, inhibition or search action.
pub const TRIAL_REWARD: i64 = 10;
/// Points lost for tapping a distractor tile in visual search.
pub const SEARCH_MISS_PENALTY: i64 = 2;
/// Points lost per memory move beyond the optimum.
pub const EXTRA_MOVE_PENALTY: i64 = 10;
/// Points for catching a reward object.
pub const CATCH_REWARD: i64 = 10;
/// Points lost for catching a hazard object.
pub const HAZARD_PENALTY: i64 = 10;

//
// ─── STAR THRESHOLDS ───────────────────────────────────────────────────────────
//

/// Minimum scores for two and three stars. Anything below `two` earns one star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    two: u8,
    three: u8,
}

impl StarThresholds {
    /// # Errors
    ///
    /// Returns `ModelError::InvalidThresholds` unless `two <= three <= 100`.
    pub fn new(two: u8, three: u8) -> Result<Self, ModelError> {
        if two > three || three > 100 {
            return Err(ModelError::InvalidThresholds { two, three });
        }
        Ok(Self { two, three })
    }

    /// Thresholds anchored on a three-star target, with two stars at 60% of it.
    #[must_use]
    pub fn from_target(target: u8) -> Self {
        let three = if target == 0 { 100 } else { target.min(100) };
        // ceil(0.6 * three), computed in integers.
        let two = ((u16::from(three) * 3 + 4) / 5) as u8;
        Self { two, three }
    }

    /// Star table for an exercise at a given level.
    #[must_use]
    pub fn for_exercise(kind: ExerciseKind, level: &ExerciseLevel) -> Self {
        match kind {
            ExerciseKind::Reaction => Self::from_target(level.target_score()),
            ExerciseKind::Search => Self { two: 40, three: 80 },
            ExerciseKind::Pattern | ExerciseKind::Inhibition | ExerciseKind::Memory => {
                Self { two: 50, three: 80 }
            }
            ExerciseKind::Arithmetic | ExerciseKind::Recall | ExerciseKind::Sorting => {
                Self { two: 60, three: 80 }
            }
        }
    }

    #[must_use]
    pub fn two(&self) -> u8 {
        self.two
    }

    #[must_use]
    pub fn three(&self) -> u8 {
        self.three
    }

    /// Convert a score to 1-3 stars. Never returns zero.
    #[must_use]
    pub fn stars_for(&self, score: Score) -> Stars {
        let value = score.value();
        if value >= self.three {
            Stars::THREE
        } else if value >= self.two {
            Stars::TWO
        } else {
            Stars::ONE
        }
    }
}

//
// ─── SCORING RULES ─────────────────────────────────────────────────────────────
//

/// How an exercise turns judged actions into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringRule {
    /// Add `reward` per correct action, subtract `penalty` (floored at zero) per mistake.
    PerAction { reward: i64, penalty: i64 },
    /// Add an even share of 100 per correct placement.
    ShareOfItems,
    /// Computed once from the finished trial.
    OnCompletion,
}

impl ScoringRule {
    #[must_use]
    pub fn for_exercise(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Pattern | ExerciseKind::Arithmetic | ExerciseKind::Inhibition => {
                ScoringRule::PerAction {
                    reward: TRIAL_REWARD,
                    penalty: 0,
                }
            }
            ExerciseKind::Search => ScoringRule::PerAction {
                reward: TRIAL_REWARD,
                penalty: SEARCH_MISS_PENALTY,
            },
            ExerciseKind::Reaction => ScoringRule::PerAction {
                reward: CATCH_REWARD,
                penalty: HAZARD_PENALTY,
            },
            ExerciseKind::Sorting => ScoringRule::ShareOfItems,
            ExerciseKind::Recall | ExerciseKind::Memory => ScoringRule::OnCompletion,
        }
    }
}

//
// ─── RUNNING TALLY ─────────────────────────────────────────────────────────────
//

/// Running total for per-action scoring.
///
/// Penalties never drive the total below zero. The total may exceed 100
/// mid-session; it is clamped when converted to a [`Score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTally {
    total: i64,
}

impl RunningTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reward(&mut self, points: i64) {
        self.total = self.total.saturating_add(points.max(0));
    }

    pub fn penalize(&mut self, points: i64) {
        self.total = (self.total - points.max(0)).max(0);
    }

    /// Add `ceil(100 / total_items)`, capped at 100.
    pub fn add_share(&mut self, total_items: usize) {
        if total_items == 0 {
            return;
        }
        let items = i64::try_from(total_items).unwrap_or(i64::MAX);
        let share = (100 + items - 1) / items;
        self.total = (self.total + share).min(100);
    }

    /// Replace the total with a computed completion score.
    pub fn set(&mut self, score: Score) {
        self.total = i64::from(score.value());
    }

    #[must_use]
    pub fn score(&self) -> Score {
        Score::clamped(self.total)
    }
}

//
// ─── SET-COMPLETION SCORES ─────────────────────────────────────────────────────
//

/// `100 - penalty * (moves - pairs)`, floored at zero.
///
/// The optimum for a deck of `pair_count` pairs is one move per pair.
#[must_use]
pub fn memory_score(moves: u32, pair_count: usize) -> Score {
    let optimal = i64::try_from(pair_count).unwrap_or(i64::MAX);
    let extra = (i64::from(moves) - optimal).max(0);
    Score::clamped(100 - EXTRA_MOVE_PENALTY * extra)
}

/// Accuracy of a recall basket.
///
/// Each correct item is worth `100 / target_count`; each wrong inclusion
/// costs half of that. The result is rounded and clamped.
#[must_use]
pub fn recall_score(correct: usize, wrong: usize, target_count: usize) -> Score {
    if target_count == 0 {
        return Score::MIN;
    }
    let per_target = 100.0 / target_count as f64;
    let raw = correct as f64 * per_target - wrong as f64 * (per_target / 2.0);
    Score::clamped(raw.round() as i64)
}
