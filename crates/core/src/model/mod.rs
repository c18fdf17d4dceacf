mod catalog;
mod exercise;
mod ids;
mod level;
mod result;

use thiserror::Error;

pub use catalog::{Catalog, CatalogEntry};
pub use exercise::{CognitiveDomain, ExerciseKind};
pub use ids::{ObjectId, ParseIdError, ResultId, SessionId};
pub use level::{Difficulty, ExerciseLevel, LevelParams, MAX_LEVEL};
pub use result::{Score, SessionResult, Stars};

/// Validation errors for the core data model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("level must be between 1 and 3, got {0}")]
    InvalidLevel(u8),

    #[error("score must be between 0 and 100, got {0}")]
    InvalidScore(i64),

    #[error("stars must be between 0 and 3, got {0}")]
    InvalidStars(u8),

    #[error("star thresholds must satisfy two <= three <= 100, got two={two} three={three}")]
    InvalidThresholds { two: u8, three: u8 },

    #[error("unknown exercise code: {0}")]
    UnknownExercise(String),
}
