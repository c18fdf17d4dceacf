//! Read-only queries over session history.
//!
//! Nothing here is cached: history is the single source of truth and every
//! query walks it again.

use chrono::{DateTime, Utc};

use crate::model::{ExerciseKind, MAX_LEVEL, Score, SessionResult, Stars};

/// Highest level the player may select for `kind`.
///
/// One above the highest level passed with at least one star, or 1 when
/// nothing has been passed yet. Not capped at the ladder height.
#[must_use]
pub fn compute_unlocked_level(history: &[SessionResult], kind: ExerciseKind) -> u8 {
    history
        .iter()
        .filter(|r| r.exercise() == kind && r.stars().is_pass())
        .map(SessionResult::level)
        .max()
        .map_or(1, |level| level.saturating_add(1))
}

#[must_use]
pub fn is_unlocked(history: &[SessionResult], kind: ExerciseKind, level: u8) -> bool {
    level >= 1 && level <= compute_unlocked_level(history, kind)
}

fn results_for(
    history: &[SessionResult],
    kind: ExerciseKind,
    level: u8,
) -> impl Iterator<Item = &SessionResult> {
    history
        .iter()
        .filter(move |r| r.exercise() == kind && r.level() == level)
}

#[must_use]
pub fn best_score(history: &[SessionResult], kind: ExerciseKind, level: u8) -> Option<Score> {
    results_for(history, kind, level).map(SessionResult::score).max()
}

#[must_use]
pub fn best_stars(history: &[SessionResult], kind: ExerciseKind, level: u8) -> Option<Stars> {
    results_for(history, kind, level).map(SessionResult::stars).max()
}

//
// ─── LEVEL OVERVIEW ────────────────────────────────────────────────────────────
//

/// One row of the level-select screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStatus {
    pub level: u8,
    pub unlocked: bool,
    pub best_score: Option<Score>,
    pub best_stars: Option<Stars>,
    pub plays: usize,
}

#[must_use]
pub fn level_overview(history: &[SessionResult], kind: ExerciseKind) -> Vec<LevelStatus> {
    let unlocked = compute_unlocked_level(history, kind);
    (1..=MAX_LEVEL)
        .map(|level| LevelStatus {
            level,
            unlocked: level <= unlocked,
            best_score: best_score(history, kind, level),
            best_stars: best_stars(history, kind, level),
            plays: results_for(history, kind, level).count(),
        })
        .collect()
}

//
// ─── HISTORY STATS ─────────────────────────────────────────────────────────────
//

/// Dashboard totals across every exercise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub sessions: usize,
    pub total_score: u64,
    pub last_played: Option<DateTime<Utc>>,
}

impl HistoryStats {
    #[must_use]
    pub fn from_history(history: &[SessionResult]) -> Self {
        Self {
            sessions: history.len(),
            total_score: history
                .iter()
                .map(|r| u64::from(r.score().value()))
                .sum(),
            last_played: history.iter().map(SessionResult::completed_at).max(),
        }
    }

    /// Mean score rounded down, or `None` for an empty history.
    #[must_use]
    pub fn average_score(&self) -> Option<u64> {
        (self.sessions > 0).then(|| self.total_score / self.sessions as u64)
    }
}

/// Up to `limit` results, newest first.
///
/// Results completed at the same instant keep reverse insertion order.
#[must_use]
pub fn recent(history: &[SessionResult], limit: usize) -> Vec<&SessionResult> {
    let mut ordered: Vec<&SessionResult> = history.iter().rev().collect();
    ordered.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
    ordered.truncate(limit);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn result(kind: ExerciseKind, level: u8, score: u8, stars: u8, minutes: i64) -> SessionResult {
        SessionResult::new(
            kind,
            level,
            Score::new(score).unwrap(),
            Stars::new(stars).unwrap(),
            fixed_now() + Duration::minutes(minutes),
        )
        .unwrap()
    }

    #[test]
    fn empty_history_unlocks_level_one() {
        assert_eq!(compute_unlocked_level(&[], ExerciseKind::Memory), 1);
        assert!(is_unlocked(&[], ExerciseKind::Memory, 1));
        assert!(!is_unlocked(&[], ExerciseKind::Memory, 2));
    }

    #[test]
    fn level_two_pass_unlocks_three() {
        let history = vec![
            result(ExerciseKind::Memory, 1, 90, 3, 0),
            result(ExerciseKind::Memory, 2, 40, 1, 1),
        ];
        assert_eq!(compute_unlocked_level(&history, ExerciseKind::Memory), 3);
    }

    #[test]
    fn other_exercises_and_zero_stars_do_not_count() {
        let history = vec![
            result(ExerciseKind::Search, 3, 100, 3, 0),
            result(ExerciseKind::Memory, 2, 0, 0, 1),
        ];
        assert_eq!(compute_unlocked_level(&history, ExerciseKind::Memory), 1);
    }

    #[test]
    fn unlocked_level_is_not_capped() {
        let history = vec![result(ExerciseKind::Pattern, 3, 85, 3, 0)];
        assert_eq!(compute_unlocked_level(&history, ExerciseKind::Pattern), 4);
    }

    #[test]
    fn best_score_is_max_for_exact_level() {
        let history = vec![
            result(ExerciseKind::Arithmetic, 1, 60, 2, 0),
            result(ExerciseKind::Arithmetic, 1, 90, 3, 1),
            result(ExerciseKind::Arithmetic, 2, 100, 3, 2),
        ];
        assert_eq!(
            best_score(&history, ExerciseKind::Arithmetic, 1),
            Some(Score::new(90).unwrap())
        );
        assert_eq!(best_score(&history, ExerciseKind::Arithmetic, 3), None);
        assert_eq!(
            best_stars(&history, ExerciseKind::Arithmetic, 2),
            Some(Stars::THREE)
        );
    }

    #[test]
    fn overview_marks_locked_levels() {
        let history = vec![result(ExerciseKind::Sorting, 1, 70, 2, 0)];
        let rows = level_overview(&history, ExerciseKind::Sorting);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].unlocked && rows[1].unlocked && !rows[2].unlocked);
        assert_eq!(rows[0].plays, 1);
        assert_eq!(rows[1].best_score, None);
    }

    #[test]
    fn stats_and_recent_results() {
        let history = vec![
            result(ExerciseKind::Memory, 1, 80, 3, 0),
            result(ExerciseKind::Search, 1, 40, 2, 10),
            result(ExerciseKind::Pattern, 1, 60, 2, 5),
        ];
        let stats = HistoryStats::from_history(&history);
        assert_eq!(stats.sessions, 3);
        assert_eq!(stats.total_score, 180);
        assert_eq!(stats.average_score(), Some(60));
        assert_eq!(stats.last_played, Some(fixed_now() + Duration::minutes(10)));

        let newest: Vec<ExerciseKind> = recent(&history, 2)
            .into_iter()
            .map(SessionResult::exercise)
            .collect();
        assert_eq!(newest, vec![ExerciseKind::Search, ExerciseKind::Pattern]);
        assert_eq!(HistoryStats::from_history(&[]).average_score(), None);
    }
}
