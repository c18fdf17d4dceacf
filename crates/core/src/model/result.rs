use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{ExerciseKind, MAX_LEVEL, ModelError};

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Normalised session score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(0);
    pub const MAX: Score = Score(100);

    /// Validate a raw score.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidScore` above 100.
    pub fn new(value: u8) -> Result<Self, ModelError> {
        if value > 100 {
            return Err(ModelError::InvalidScore(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Clamp any running total into `0..=100`.
    #[must_use]
    pub fn clamped(raw: i64) -> Self {
        // The clamp keeps the value in u8 range.
        Self(raw.clamp(0, 100) as u8)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── STARS ─────────────────────────────────────────────────────────────────────
//

/// Mastery rating in `0..=3`.
///
/// The engine only ever awards 1-3; zero is accepted for history imported
/// from elsewhere and never unlocks a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const ONE: Stars = Stars(1);
    pub const TWO: Stars = Stars(2);
    pub const THREE: Stars = Stars(3);

    /// # Errors
    ///
    /// Returns `ModelError::InvalidStars` above 3.
    pub fn new(value: u8) -> Result<Self, ModelError> {
        if value > 3 {
            return Err(ModelError::InvalidStars(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_pass(self) -> bool {
        self.0 >= 1
    }
}

impl TryFrom<u8> for Stars {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

//
// ─── SESSION RESULT ────────────────────────────────────────────────────────────
//

/// Outcome of one completed session.
///
/// Created once when a session reaches feedback and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    exercise: ExerciseKind,
    level: u8,
    score: Score,
    stars: Stars,
    completed_at: DateTime<Utc>,
}

impl SessionResult {
    /// # Errors
    ///
    /// Returns `ModelError::InvalidLevel` if `level` is outside `1..=3`.
    pub fn new(
        exercise: ExerciseKind,
        level: u8,
        score: Score,
        stars: Stars,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(ModelError::InvalidLevel(level));
        }
        Ok(Self {
            exercise,
            level,
            score,
            stars,
            completed_at,
        })
    }

    #[must_use]
    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    /// Composite key, e.g. `"MEMORY-2"`.
    #[must_use]
    pub fn exercise_id(&self) -> String {
        self.exercise.exercise_id(self.level)
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn stars(&self) -> Stars {
        self.stars
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
