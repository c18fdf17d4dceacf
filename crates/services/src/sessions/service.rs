use std::fmt;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};
use train_core::Clock;
use train_core::generators::{Answer, Judgement, StandardSource, Termination, Trial, TrialSource};
use train_core::model::{ExerciseKind, ExerciseLevel, Score, SessionId, SessionResult, Stars};
use train_core::reaction::{ObjectKind, ReactionField, TickOutcome};
use train_core::scoring::{RunningTally, ScoringRule, StarThresholds};
use train_core::time::Countdown;

use super::progress::SessionProgress;
use crate::error::{InvalidAnswer, SessionError};
use crate::feedback::{Cue, Feedback};

/// Generator calls per trial before the exercise is declared unavailable.
pub const MAX_GENERATOR_ATTEMPTS: u32 = 3;

/// Called once with the finished result.
pub type FinishHandler = Box<dyn FnOnce(&SessionResult) + Send>;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Intro,
    Playing,
    /// Terminal: score and stars are final.
    Feedback,
    /// Terminal: left early or the exercise became unavailable. No result.
    Aborted,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Feedback | SessionState::Aborted)
    }
}

/// What one submitted answer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub judgement: Judgement,
    pub trial_complete: bool,
    pub score: Score,
    pub state: SessionState,
}

/// What one animation frame did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutcome {
    pub tick: TickOutcome,
    pub score: Score,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of a single exercise at a single level.
///
/// Moves `Intro -> Playing -> Feedback` exactly once; a new session is
/// needed to play again. Turn-based exercises are driven with [`submit`],
/// the reaction exercise with [`tick`] and [`pointer_move`]. Countdowns
/// advance through [`tick_second`].
///
/// [`submit`]: Session::submit
/// [`tick`]: Session::tick
/// [`pointer_move`]: Session::pointer_move
/// [`tick_second`]: Session::tick_second
pub struct Session {
    id: SessionId,
    kind: ExerciseKind,
    level: ExerciseLevel,
    thresholds: StarThresholds,
    rule: ScoringRule,
    termination: Termination,
    clock: Clock,
    feedback: Feedback,
    source: Box<dyn TrialSource>,
    rng: Box<dyn RngCore + Send>,
    on_finish: Option<FinishHandler>,
    state: SessionState,
    tally: RunningTally,
    countdown: Option<Countdown>,
    trials_completed: u32,
    trial: Option<Trial>,
    field: Option<ReactionField>,
    result: Option<SessionResult>,
}

impl Session {
    /// Create a session in `Intro` and announce it.
    #[must_use]
    pub fn new(kind: ExerciseKind, level: ExerciseLevel, clock: Clock, feedback: Feedback) -> Self {
        let session = Self {
            id: SessionId::random(),
            kind,
            thresholds: StarThresholds::for_exercise(kind, &level),
            rule: ScoringRule::for_exercise(kind),
            termination: Termination::for_exercise(kind, &level),
            level,
            clock,
            feedback,
            source: Box::new(StandardSource::new(kind)),
            rng: Box::new(StdRng::from_os_rng()),
            on_finish: None,
            state: SessionState::Intro,
            tally: RunningTally::new(),
            countdown: None,
            trials_completed: 0,
            trial: None,
            field: None,
            result: None,
        };
        info!(
            session_id = %session.id,
            exercise = session.kind.code(),
            level = session.level.level(),
            "session created"
        );
        session.feedback.announce(&intro_text(kind, &session.level));
        session
    }

    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_source(mut self, source: Box<dyn TrialSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_on_finish(mut self, handler: impl FnOnce(&SessionResult) + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    #[must_use]
    pub fn level(&self) -> &ExerciseLevel {
        &self.level
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    #[must_use]
    pub fn thresholds(&self) -> StarThresholds {
        self.thresholds
    }

    /// Running score, clamped to the 0..=100 range.
    #[must_use]
    pub fn score(&self) -> Score {
        self.tally.score()
    }

    #[must_use]
    pub fn current_trial(&self) -> Option<&Trial> {
        self.trial.as_ref()
    }

    #[must_use]
    pub fn field(&self) -> Option<&ReactionField> {
        self.field.as_ref()
    }

    /// The finished result, present only in `Feedback`.
    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn has_countdown(&self) -> bool {
        matches!(self.termination, Termination::Countdown { .. })
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let trial_budget = match self.termination {
            Termination::TrialBudget { trials } => Some(trials),
            _ => None,
        };
        SessionProgress {
            state: self.state,
            score: self.score(),
            remaining_secs: self.countdown.as_ref().map(Countdown::remaining),
            trials_completed: self.trials_completed,
            trial_budget,
            live_objects: self.field.as_ref().map_or(0, |f| f.objects().len()),
        }
    }

    /// Leave `Intro`: reset the tally, arm the countdown and fetch the first
    /// trial (or set up the falling-object field).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` outside `Intro`,
    /// `SessionError::Simulation` for unusable reaction params, and
    /// `SessionError::ExerciseUnavailable` when no valid trial could be
    /// generated. Both failures abort the session.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Intro {
            return Err(SessionError::AlreadyStarted);
        }

        self.tally = RunningTally::new();
        self.trials_completed = 0;
        self.countdown = match self.termination {
            Termination::Countdown { secs } => Some(Countdown::new(secs)),
            Termination::TrialBudget { .. } | Termination::TrialCompletion => None,
        };

        if self.kind.is_real_time() {
            match ReactionField::new(self.level.params()) {
                Ok(field) => self.field = Some(field),
                Err(e) => {
                    self.abort_with("invalid simulation params");
                    return Err(e.into());
                }
            }
        } else {
            let trial = self.next_trial()?;
            self.trial = Some(trial);
        }

        self.state = SessionState::Playing;
        self.feedback.cue(Cue::Tap);
        info!(
            session_id = %self.id,
            exercise = self.kind.code(),
            level = self.level.level(),
            "session started"
        );
        Ok(())
    }

    /// Judge an answer against the active trial.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongMode` for the reaction exercise,
    /// `SessionError::InvalidAnswer` when nothing is being played or the trial
    /// rejects the answer (no state changes in either case), and
    /// `SessionError::ExerciseUnavailable` if the follow-up trial cannot be
    /// generated.
    pub fn submit(&mut self, answer: &Answer) -> Result<SubmitOutcome, SessionError> {
        if self.kind.is_real_time() {
            return Err(SessionError::WrongMode { kind: self.kind });
        }
        if self.state != SessionState::Playing {
            return Err(InvalidAnswer::NotPlaying.into());
        }
        let trial = self.trial.as_mut().ok_or(InvalidAnswer::NoActiveTrial)?;
        let step = trial.apply(answer).map_err(InvalidAnswer::from)?;

        match (self.rule, step.judgement) {
            (ScoringRule::PerAction { reward, .. }, Judgement::Correct) => self.tally.reward(reward),
            (ScoringRule::PerAction { penalty, .. }, Judgement::Incorrect) => {
                self.tally.penalize(penalty);
            }
            (ScoringRule::ShareOfItems, Judgement::Correct) => {
                if let Trial::Sorting(t) = trial {
                    self.tally.add_share(t.total_items());
                }
            }
            _ => {}
        }
        if step.trial_complete && self.rule == ScoringRule::OnCompletion {
            if let Some(score) = trial.completion_score() {
                self.tally.set(score);
            }
        }

        match step.judgement {
            Judgement::Correct => self.feedback.cue(Cue::Success),
            Judgement::Incorrect => self.feedback.cue(Cue::Failure),
            Judgement::Ignored => {}
        }

        if step.trial_complete {
            self.trials_completed += 1;
            let done = match self.termination {
                Termination::TrialBudget { trials } => self.trials_completed >= trials,
                Termination::TrialCompletion => true,
                Termination::Countdown { .. } => false,
            };
            if done {
                self.finish()?;
            } else {
                let next = self.next_trial()?;
                self.trial = Some(next);
            }
        }

        Ok(SubmitOutcome {
            judgement: step.judgement,
            trial_complete: step.trial_complete,
            score: self.score(),
            state: self.state,
        })
    }

    /// Advance the falling-object field by one frame.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongMode` for turn-based exercises and
    /// `SessionError::NotPlaying` outside `Playing`.
    pub fn tick(&mut self, delta_ms: f64) -> Result<FrameOutcome, SessionError> {
        self.ensure_field_playing()?;
        let Some(field) = self.field.as_mut() else {
            return Err(SessionError::NotPlaying { state: self.state });
        };
        let tick = field.tick(delta_ms, &mut *self.rng);

        if let ScoringRule::PerAction { reward, penalty } = self.rule {
            for capture in &tick.caught {
                match capture.kind {
                    ObjectKind::Reward => {
                        self.tally.reward(reward);
                        self.feedback.cue(Cue::Success);
                    }
                    ObjectKind::Hazard => {
                        self.tally.penalize(penalty);
                        self.feedback.cue(Cue::Failure);
                    }
                }
            }
        }

        Ok(FrameOutcome {
            tick,
            score: self.score(),
        })
    }

    /// Move the catcher to a lateral position; it is clamped to the track.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Session::tick`].
    pub fn pointer_move(&mut self, x: f64) -> Result<(), SessionError> {
        self.ensure_field_playing()?;
        if let Some(field) = self.field.as_mut() {
            field.pointer_move(x);
        }
        Ok(())
    }

    /// One wall-clock second elapsed.
    ///
    /// Returns the seconds left, or `None` when this exercise has no
    /// countdown. Reaching zero finishes the session whatever is in flight.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotPlaying` outside `Playing`.
    pub fn tick_second(&mut self) -> Result<Option<u32>, SessionError> {
        if self.state != SessionState::Playing {
            return Err(SessionError::NotPlaying { state: self.state });
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return Ok(None);
        };
        let expired = countdown.tick();
        let remaining = countdown.remaining();
        if expired {
            self.finish()?;
        }
        Ok(Some(remaining))
    }

    /// Leave without a result. Terminal sessions are left as they are.
    pub fn abort(&mut self) {
        if !self.state.is_terminal() {
            self.abort_with("left early");
        }
    }

    fn ensure_field_playing(&self) -> Result<(), SessionError> {
        if !self.kind.is_real_time() {
            return Err(SessionError::WrongMode { kind: self.kind });
        }
        if self.state != SessionState::Playing {
            return Err(SessionError::NotPlaying { state: self.state });
        }
        Ok(())
    }

    /// Pull a valid trial, discarding failures, up to the retry limit.
    fn next_trial(&mut self) -> Result<Trial, SessionError> {
        for attempt in 1..=MAX_GENERATOR_ATTEMPTS {
            let candidate = self
                .source
                .next_trial(&self.level, &mut *self.rng)
                .and_then(|trial| trial.validate().map(|()| trial));
            match candidate {
                Ok(trial) if trial.kind() == self.kind => return Ok(trial),
                Ok(trial) => warn!(
                    session_id = %self.id,
                    attempt,
                    got = trial.kind().code(),
                    "discarding trial for another exercise"
                ),
                Err(e) => warn!(session_id = %self.id, attempt, error = %e, "discarding trial"),
            }
        }
        warn!(
            session_id = %self.id,
            exercise = self.kind.code(),
            attempts = MAX_GENERATOR_ATTEMPTS,
            "exercise unavailable"
        );
        self.abort_with("exercise unavailable");
        Err(SessionError::ExerciseUnavailable {
            attempts: MAX_GENERATOR_ATTEMPTS,
        })
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        let score = self.tally.score();
        let stars = self.thresholds.stars_for(score);
        let result = SessionResult::new(
            self.kind,
            self.level.level(),
            score,
            stars,
            self.clock.now(),
        )?;

        self.state = SessionState::Feedback;
        self.trial = None;
        self.field = None;
        info!(
            session_id = %self.id,
            exercise = self.kind.code(),
            level = result.level(),
            score = score.value(),
            stars = stars.value(),
            "session finished"
        );
        self.feedback.announce(&feedback_text(score, stars));
        if let Some(handler) = self.on_finish.take() {
            handler(&result);
        }
        self.result = Some(result);
        Ok(())
    }

    fn abort_with(&mut self, reason: &str) {
        self.state = SessionState::Aborted;
        self.trial = None;
        self.field = None;
        self.on_finish = None;
        info!(
            session_id = %self.id,
            exercise = self.kind.code(),
            level = self.level.level(),
            reason,
            "session aborted"
        );
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("level", &self.level.level())
            .field("state", &self.state)
            .field("score", &self.tally.score())
            .field("countdown", &self.countdown)
            .field("trials_completed", &self.trials_completed)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

fn intro_text(kind: ExerciseKind, level: &ExerciseLevel) -> String {
    format!(
        "{}, level {}. Press start when you are ready.",
        kind.title(),
        level.level()
    )
}

fn feedback_text(score: Score, stars: Stars) -> String {
    let plural = if stars.value() == 1 { "star" } else { "stars" };
    format!(
        "Well done! You scored {} points and earned {} {plural}.",
        score.value(),
        stars.value()
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use train_core::generators::{
        GeneratorError, PatternFamily, PatternTrial, SortBin, generate,
    };
    use train_core::model::{Difficulty, LevelParams};
    use train_core::time::fixed_clock;

    use super::*;
    use crate::feedback::RecordingFeedback;

    fn recorder() -> (Arc<RecordingFeedback>, Feedback) {
        let recorder = Arc::new(RecordingFeedback::new());
        (Arc::clone(&recorder), Feedback::shared(recorder))
    }

    fn session(kind: ExerciseKind, level: ExerciseLevel) -> Session {
        Session::new(kind, level, fixed_clock(), Feedback::default()).with_seed(7)
    }

    fn arithmetic_key(session: &Session) -> i64 {
        match session.current_trial() {
            Some(Trial::Arithmetic(t)) => t.answer_key(),
            other => panic!("expected arithmetic trial, got {other:?}"),
        }
    }

    struct Broken;

    impl TrialSource for Broken {
        fn next_trial(
            &mut self,
            _level: &ExerciseLevel,
            _rng: &mut dyn RngCore,
        ) -> Result<Trial, GeneratorError> {
            Err(GeneratorError::NotTurnBased {
                kind: ExerciseKind::Reaction,
            })
        }
    }

    /// Serves queued outcomes first, then falls back to the real generator.
    struct Scripted {
        queue: VecDeque<Result<Trial, GeneratorError>>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(queue: Vec<Result<Trial, GeneratorError>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                queue: queue.into(),
                calls: Arc::clone(&calls),
            };
            (source, calls)
        }
    }

    impl TrialSource for Scripted {
        fn next_trial(
            &mut self,
            level: &ExerciseLevel,
            rng: &mut dyn RngCore,
        ) -> Result<Trial, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queue
                .pop_front()
                .unwrap_or_else(|| generate(ExerciseKind::Pattern, level, rng))
        }
    }

    fn owned(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| (*s).to_string()).collect()
    }

    /// No option matches the answer.
    fn malformed_pattern() -> Trial {
        Trial::Pattern(PatternTrial::authored(
            PatternFamily::Alternating,
            owned(&["🔴", "🔵", "🔴", "🔵", "🔴"]),
            owned(&["🐶", "🐱", "☀️"]),
            "🔵",
        ))
    }

    fn offline() -> GeneratorError {
        GeneratorError::NotTurnBased {
            kind: ExerciseKind::Reaction,
        }
    }

    #[test]
    fn malformed_trial_is_discarded_and_replaced() {
        assert!(malformed_pattern().validate().is_err());
        let (source, calls) = Scripted::new(vec![Ok(malformed_pattern())]);
        let mut session = session(ExerciseKind::Pattern, ExerciseLevel::standard(1).unwrap())
            .with_source(Box::new(source));

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let trial = session.current_trial().unwrap();
        assert!(trial.validate().is_ok());
        assert_ne!(trial, &malformed_pattern());
    }

    #[test]
    fn trial_for_another_exercise_is_discarded() {
        let level = ExerciseLevel::standard(1).unwrap();
        let arithmetic =
            generate(ExerciseKind::Arithmetic, &level, &mut StdRng::seed_from_u64(4)).unwrap();
        let (source, calls) = Scripted::new(vec![Ok(arithmetic)]);
        let mut session = session(ExerciseKind::Pattern, level).with_source(Box::new(source));

        session.start().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            session.current_trial().map(Trial::kind),
            Some(ExerciseKind::Pattern)
        );
    }

    #[test]
    fn generator_recovering_on_last_attempt_still_starts() {
        let (source, calls) = Scripted::new(vec![Err(offline()), Err(offline())]);
        let mut session = session(ExerciseKind::Pattern, ExerciseLevel::standard(1).unwrap())
            .with_source(Box::new(source));

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(session.current_trial().is_some());
    }

    #[test]
    fn mixed_failures_exhaust_the_retry_limit() {
        let level = ExerciseLevel::standard(1).unwrap();
        let arithmetic =
            generate(ExerciseKind::Arithmetic, &level, &mut StdRng::seed_from_u64(4)).unwrap();
        let (source, calls) = Scripted::new(vec![
            Err(offline()),
            Ok(malformed_pattern()),
            Ok(arithmetic),
        ]);
        let mut session = session(ExerciseKind::Pattern, level).with_source(Box::new(source));

        assert!(matches!(
            session.start(),
            Err(SessionError::ExerciseUnavailable { attempts: 3 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.state(), SessionState::Aborted);
    }

    #[test]
    fn narration_once_on_intro_and_once_on_feedback() {
        let (recorder, feedback) = recorder();
        let level = ExerciseLevel::standard(1)
            .unwrap()
            .with_params(LevelParams {
                question_count: Some(1),
                ..LevelParams::default()
            });
        let mut session =
            Session::new(ExerciseKind::Arithmetic, level, fixed_clock(), feedback).with_seed(1);
        assert_eq!(recorder.announcements().len(), 1);
        assert!(recorder.announcements()[0].contains("level 1"));

        session.start().unwrap();
        let key = arithmetic_key(&session);
        session.submit(&Answer::Number(key)).unwrap();

        let announcements = recorder.announcements();
        assert_eq!(announcements.len(), 2);
        assert!(announcements[1].contains("1 star"));
        assert_eq!(recorder.cues(), vec![Cue::Tap, Cue::Success]);
    }

    #[test]
    fn finish_handler_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let level = ExerciseLevel::standard(1).unwrap();
        let mut session = session(ExerciseKind::Pattern, level).with_on_finish(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        session.start().unwrap();
        while session.tick_second().unwrap().is_some_and(|left| left > 0) {}

        assert_eq!(session.state(), SessionState::Feedback);
        assert!(session.tick_second().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn answers_outside_playing_are_rejected_without_change() {
        let level = ExerciseLevel::standard(1).unwrap();
        let mut session = session(ExerciseKind::Inhibition, level);
        assert!(matches!(
            session.submit(&Answer::Number(1)),
            Err(SessionError::InvalidAnswer(InvalidAnswer::NotPlaying))
        ));

        session.start().unwrap();
        let before = session.current_trial().cloned();
        assert!(matches!(
            session.submit(&Answer::Number(1)),
            Err(SessionError::InvalidAnswer(InvalidAnswer::Rejected(_)))
        ));
        assert_eq!(session.current_trial().cloned(), before);
        assert_eq!(session.score(), Score::MIN);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut session = session(ExerciseKind::Memory, ExerciseLevel::standard(1).unwrap());
        session.start().unwrap();
        assert!(matches!(session.start(), Err(SessionError::AlreadyStarted)));
    }

    #[test]
    fn failing_generator_surfaces_unavailable() {
        let level = ExerciseLevel::standard(1).unwrap();
        let mut session = session(ExerciseKind::Pattern, level).with_source(Box::new(Broken));
        let err = session.start().unwrap_err();
        assert!(matches!(
            err,
            SessionError::ExerciseUnavailable {
                attempts: MAX_GENERATOR_ATTEMPTS
            }
        ));
        assert_eq!(session.state(), SessionState::Aborted);
        assert!(session.result().is_none());
    }

    #[test]
    fn modes_are_enforced() {
        let level = ExerciseLevel::standard(1).unwrap();
        let mut reaction = session(ExerciseKind::Reaction, level.clone());
        reaction.start().unwrap();
        assert!(matches!(
            reaction.submit(&Answer::Number(3)),
            Err(SessionError::WrongMode { .. })
        ));

        let mut pattern = session(ExerciseKind::Pattern, level);
        pattern.start().unwrap();
        assert!(matches!(pattern.tick(16.0), Err(SessionError::WrongMode { .. })));
        assert!(matches!(
            pattern.pointer_move(40.0),
            Err(SessionError::WrongMode { .. })
        ));
    }

    #[test]
    fn memory_session_scores_on_completion() {
        let level = ExerciseLevel::new(
            1,
            Difficulty::Easy,
            LevelParams {
                pair_count: Some(4),
                ..LevelParams::default()
            },
            80,
        )
        .unwrap();
        let mut session = session(ExerciseKind::Memory, level);
        session.start().unwrap();

        let cards = match session.current_trial() {
            Some(Trial::Memory(t)) => t.cards().to_vec(),
            other => panic!("expected memory trial, got {other:?}"),
        };
        let mut pairs = Vec::new();
        for (i, face) in cards.iter().enumerate() {
            if let Some(j) = cards.iter().skip(i + 1).position(|c| c == face) {
                pairs.push((i, i + 1 + j));
            }
        }
        for (a, b) in pairs {
            session.submit(&Answer::Reveal(a, b)).unwrap();
        }

        let result = session.result().unwrap();
        assert_eq!(result.score().value(), 100);
        assert_eq!(result.stars(), Stars::THREE);
    }

    #[test]
    fn sorting_mistake_costs_a_share() {
        let mut perfect = session(ExerciseKind::Sorting, ExerciseLevel::standard(1).unwrap());
        let mut sloppy = session(ExerciseKind::Sorting, ExerciseLevel::standard(1).unwrap());
        for s in [&mut perfect, &mut sloppy] {
            s.start().unwrap();
        }

        let mut first = true;
        while let Some(Trial::Sorting(t)) = sloppy.current_trial() {
            let bin = t.current().map(|item| item.bin).unwrap();
            let bin = if first {
                first = false;
                match bin {
                    SortBin::Left => SortBin::Right,
                    SortBin::Right => SortBin::Left,
                }
            } else {
                bin
            };
            sloppy.submit(&Answer::Sort(bin)).unwrap();
        }
        while let Some(Trial::Sorting(t)) = perfect.current_trial() {
            let bin = t.current().map(|item| item.bin).unwrap();
            perfect.submit(&Answer::Sort(bin)).unwrap();
        }

        let perfect = perfect.result().unwrap().score();
        let sloppy = sloppy.result().unwrap().score();
        assert_eq!(perfect.value(), 100);
        assert!(sloppy < perfect);
    }

    #[test]
    fn aborting_drops_the_trial_and_result() {
        let mut session = session(ExerciseKind::Search, ExerciseLevel::standard(1).unwrap());
        session.start().unwrap();
        session.abort();
        assert_eq!(session.state(), SessionState::Aborted);
        assert!(session.current_trial().is_none());
        assert!(matches!(
            session.tick_second(),
            Err(SessionError::NotPlaying {
                state: SessionState::Aborted
            })
        ));
    }

    #[test]
    fn search_board_refreshes_when_all_targets_found() {
        let mut session = session(ExerciseKind::Search, ExerciseLevel::standard(1).unwrap());
        session.start().unwrap();
        let targets: Vec<usize> = match session.current_trial() {
            Some(Trial::Search(t)) => t
                .cells()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.as_str() == t.target())
                .map(|(i, _)| i)
                .collect(),
            other => panic!("expected search trial, got {other:?}"),
        };
        let count = targets.len();
        let mut last = None;
        for index in targets {
            last = Some(session.submit(&Answer::Tile(index)).unwrap());
        }

        let last = last.unwrap();
        assert!(last.trial_complete);
        assert_eq!(last.state, SessionState::Playing);
        assert_eq!(session.score().value(), u8::try_from(count * 10).unwrap());
        match session.current_trial() {
            Some(Trial::Search(t)) => assert_eq!(t.remaining(), t.target_count()),
            other => panic!("expected a fresh board, got {other:?}"),
        }
    }
}
