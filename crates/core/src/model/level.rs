use serde::{Deserialize, Serialize};

use crate::model::ModelError;

/// Highest level on every exercise ladder.
pub const MAX_LEVEL: u8 = 3;

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Default difficulty for a ladder rung.
    #[must_use]
    pub fn for_level(level: u8) -> Self {
        match level {
            0 | 1 => Difficulty::Easy,
            2 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

//
// ─── LEVEL PARAMS ──────────────────────────────────────────────────────────────
//

/// Per-level tuning knobs.
///
/// Every field is optional; accessors fall back to the defaults each exercise
/// was designed around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelParams {
    /// Base fall speed of reaction objects, in field percent per frame.
    pub base_speed: Option<f64>,
    /// Milliseconds between reaction spawns.
    pub spawn_rate_ms: Option<f64>,
    /// Countdown length for timed exercises.
    pub duration_secs: Option<u32>,
    /// Number of cells in a visual-search board.
    pub grid_size: Option<usize>,
    /// Number of pairs in a memory deck.
    pub pair_count: Option<usize>,
    /// Trial budget for arithmetic sessions.
    pub question_count: Option<u32>,
}

impl LevelParams {
    pub const DEFAULT_BASE_SPEED: f64 = 0.3;
    pub const DEFAULT_SPAWN_RATE_MS: f64 = 1500.0;
    pub const DEFAULT_GRID_SIZE: usize = 12;
    pub const DEFAULT_PAIR_COUNT: usize = 4;
    pub const DEFAULT_QUESTION_COUNT: u32 = 10;

    #[must_use]
    pub fn base_speed(&self) -> f64 {
        self.base_speed.unwrap_or(Self::DEFAULT_BASE_SPEED)
    }

    #[must_use]
    pub fn spawn_rate_ms(&self) -> f64 {
        self.spawn_rate_ms.unwrap_or(Self::DEFAULT_SPAWN_RATE_MS)
    }

    /// Countdown length, or `fallback` when the level does not set one.
    #[must_use]
    pub fn duration_secs_or(&self, fallback: u32) -> u32 {
        self.duration_secs.unwrap_or(fallback)
    }

    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.grid_size.unwrap_or(Self::DEFAULT_GRID_SIZE)
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pair_count.unwrap_or(Self::DEFAULT_PAIR_COUNT)
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count.unwrap_or(Self::DEFAULT_QUESTION_COUNT)
    }
}

//
// ─── EXERCISE LEVEL ────────────────────────────────────────────────────────────
//

/// Immutable configuration of one rung on an exercise ladder.
///
/// Deserialisation goes through [`ExerciseLevel::new`], so a level loaded from
/// data is held to the same bounds as one built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LevelConfig")]
pub struct ExerciseLevel {
    level: u8,
    difficulty: Difficulty,
    #[serde(default)]
    params: LevelParams,
    target_score: u8,
}

impl ExerciseLevel {
    /// Build a level, validating the rung number and target score.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidLevel` for levels outside `1..=3` and
    /// `ModelError::InvalidScore` for a target above 100.
    pub fn new(
        level: u8,
        difficulty: Difficulty,
        params: LevelParams,
        target_score: u8,
    ) -> Result<Self, ModelError> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(ModelError::InvalidLevel(level));
        }
        if target_score > 100 {
            return Err(ModelError::InvalidScore(i64::from(target_score)));
        }
        Ok(Self {
            level,
            difficulty,
            params,
            target_score,
        })
    }

    /// Level with default params, difficulty derived from the rung and an 80-point target.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidLevel` for levels outside `1..=3`.
    pub fn standard(level: u8) -> Result<Self, ModelError> {
        Self::new(level, Difficulty::for_level(level), LevelParams::default(), 80)
    }

    #[must_use]
    pub fn with_params(mut self, params: LevelParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn params(&self) -> &LevelParams {
        &self.params
    }

    /// Score needed for three stars. Zero means "use the exercise default".
    #[must_use]
    pub fn target_score(&self) -> u8 {
        self.target_score
    }
}

/// Unchecked wire shape of [`ExerciseLevel`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelConfig {
    level: u8,
    difficulty: Difficulty,
    #[serde(default)]
    params: LevelParams,
    target_score: u8,
}

impl TryFrom<LevelConfig> for ExerciseLevel {
    type Error = ModelError;

    fn try_from(raw: LevelConfig) -> Result<Self, Self::Error> {
        Self::new(raw.level, raw.difficulty, raw.params, raw.target_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(matches!(
            ExerciseLevel::standard(0),
            Err(ModelError::InvalidLevel(0))
        ));
        assert!(matches!(
            ExerciseLevel::standard(4),
            Err(ModelError::InvalidLevel(4))
        ));
    }

    #[test]
    fn params_fall_back_to_defaults() {
        let params = LevelParams::default();
        assert_eq!(params.grid_size(), 12);
        assert_eq!(params.pair_count(), 4);
        assert_eq!(params.question_count(), 10);
        assert_eq!(params.duration_secs_or(45), 45);
        assert!((params.base_speed() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn explicit_params_override_defaults() {
        let level = ExerciseLevel::standard(2).unwrap().with_params(LevelParams {
            grid_size: Some(20),
            ..LevelParams::default()
        });
        assert_eq!(level.params().grid_size(), 20);
        assert_eq!(level.difficulty(), Difficulty::Medium);
    }

    #[test]
    fn difficulty_follows_rung() {
        assert_eq!(Difficulty::for_level(1), Difficulty::Easy);
        assert_eq!(Difficulty::for_level(2), Difficulty::Medium);
        assert_eq!(Difficulty::for_level(3), Difficulty::Hard);
    }

    #[test]
    fn deserialised_levels_are_validated() {
        let ok: ExerciseLevel = serde_json::from_str(
            r#"{"level":2,"difficulty":"medium","params":{"gridSize":16},"targetScore":90}"#,
        )
        .unwrap();
        assert_eq!(ok.level(), 2);
        assert_eq!(ok.target_score(), 90);

        let bad_level = serde_json::from_str::<ExerciseLevel>(
            r#"{"level":7,"difficulty":"hard","targetScore":80}"#,
        );
        assert!(bad_level.is_err());

        let bad_target = serde_json::from_str::<ExerciseLevel>(
            r#"{"level":1,"difficulty":"easy","targetScore":150}"#,
        );
        assert!(bad_target.is_err());
    }
}
