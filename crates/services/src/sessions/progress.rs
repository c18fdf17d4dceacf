use train_core::model::Score;

use super::service::SessionState;

/// Snapshot of a session for status lines and the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub state: SessionState,
    pub score: Score,
    /// Seconds left on the countdown, for timed exercises.
    pub remaining_secs: Option<u32>,
    pub trials_completed: u32,
    /// Total trials, for exercises with a fixed budget.
    pub trial_budget: Option<u32>,
    pub live_objects: usize,
}

impl SessionProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Trials still to play, when the exercise has a budget.
    #[must_use]
    pub fn remaining_trials(&self) -> Option<u32> {
        self.trial_budget
            .map(|budget| budget.saturating_sub(self.trials_completed))
    }
}
