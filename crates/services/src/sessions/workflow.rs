use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use storage::repository::{SessionResultRepository, SessionResultRow, StorageError};
use tracing::{info, warn};
use train_core::model::{Catalog, ExerciseKind, ResultId, Score, SessionResult};
use train_core::progression::{self, HistoryStats, LevelStatus};

use super::service::Session;
use crate::Clock;
use crate::error::SessionError;
use crate::feedback::Feedback;

/// Outcome of recording a finished session.
///
/// The in-memory history already contains the result; `persisted` only says
/// whether the durable store accepted it too.
#[derive(Debug)]
pub struct CompletionReceipt {
    pub result: SessionResult,
    pub unlocked_level: u8,
    pub persisted: Result<ResultId, StorageError>,
}

/// Orchestrates level selection, session start and result recording.
///
/// Owns the append-only history; progression is recomputed from it on every
/// query.
#[derive(Clone)]
pub struct TrainingLoopService {
    clock: Clock,
    catalog: Arc<Catalog>,
    results: Arc<dyn SessionResultRepository>,
    history: Arc<RwLock<Vec<SessionResult>>>,
    feedback: Feedback,
    seed: Option<u64>,
    started: Arc<AtomicU64>,
}

impl TrainingLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        results: Arc<dyn SessionResultRepository>,
        feedback: Feedback,
    ) -> Self {
        Self {
            clock,
            catalog,
            results,
            history: Arc::new(RwLock::new(Vec::new())),
            feedback,
            seed: None,
            started: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Seed every session's random source; the n-th session uses `seed + n`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replace the in-memory history with what the store holds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read.
    pub async fn load_history(&self) -> Result<usize, StorageError> {
        let loaded = self.results.load_history().await?;
        let count = loaded.len();
        *self.history.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        info!(results = count, "history loaded");
        Ok(count)
    }

    /// Snapshot of every recorded result, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<SessionResult> {
        self.read_history(<[SessionResult]>::to_vec)
    }

    #[must_use]
    pub fn unlocked_level(&self, kind: ExerciseKind) -> u8 {
        self.read_history(|h| progression::compute_unlocked_level(h, kind))
    }

    #[must_use]
    pub fn best_score(&self, kind: ExerciseKind, level: u8) -> Option<Score> {
        self.read_history(|h| progression::best_score(h, kind, level))
    }

    #[must_use]
    pub fn level_overview(&self, kind: ExerciseKind) -> Vec<LevelStatus> {
        self.read_history(|h| progression::level_overview(h, kind))
    }

    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        self.read_history(HistoryStats::from_history)
    }

    /// Rows as the durable store holds them, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn stored_results(
        &self,
        exercise: Option<ExerciseKind>,
        limit: u32,
    ) -> Result<Vec<SessionResultRow>, StorageError> {
        self.results.list_result_rows(exercise, limit).await
    }

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown id.
    pub async fn stored_result(&self, id: ResultId) -> Result<SessionResult, StorageError> {
        self.results.get_result(id).await
    }

    /// Create a session for an unlocked level. The session is in `Intro`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownLevel` if the catalog has no such level
    /// and `SessionError::LevelLocked` if history has not unlocked it yet.
    pub fn start_session(&self, kind: ExerciseKind, level: u8) -> Result<Session, SessionError> {
        let config = self
            .catalog
            .level(kind, level)
            .ok_or(SessionError::UnknownLevel { kind, level })?;
        if !self.read_history(|h| progression::is_unlocked(h, kind, level)) {
            return Err(SessionError::LevelLocked {
                kind,
                level,
                unlocked: self.unlocked_level(kind),
            });
        }

        let session = Session::new(kind, config.clone(), self.clock, self.feedback.clone());
        let ordinal = self.started.fetch_add(1, Ordering::Relaxed);
        Ok(match self.seed {
            Some(seed) => session.with_seed(seed.wrapping_add(ordinal)),
            None => session,
        })
    }

    /// Record the result of a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` if the session has no result.
    pub async fn record_session(&self, session: &Session) -> Result<CompletionReceipt, SessionError> {
        let result = session.result().ok_or(SessionError::NotFinished)?;
        Ok(self.record_completion(result.clone()).await)
    }

    /// Append to history, then ask the store to keep it.
    ///
    /// A store failure is logged and reported in the receipt; the history
    /// entry stays and is not re-queued.
    pub async fn record_completion(&self, result: SessionResult) -> CompletionReceipt {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        let unlocked_level = self.unlocked_level(result.exercise());

        let persisted = self.results.append_result(&result).await;
        match &persisted {
            Ok(id) => info!(
                result_id = %id,
                exercise = result.exercise().code(),
                level = result.level(),
                score = result.score().value(),
                stars = result.stars().value(),
                "session result recorded"
            ),
            Err(e) => warn!(
                error = %e,
                exercise = result.exercise().code(),
                level = result.level(),
                "failed to persist session result"
            ),
        }

        CompletionReceipt {
            result,
            unlocked_level,
            persisted,
        }
    }

    fn read_history<T>(&self, query: impl FnOnce(&[SessionResult]) -> T) -> T {
        let guard = self.history.read().unwrap_or_else(PoisonError::into_inner);
        query(&guard)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use storage::repository::InMemoryRepository;
    use train_core::model::Stars;
    use train_core::time::{fixed_clock, fixed_now};

    use super::*;

    struct FailingStore;

    #[async_trait]
    impl SessionResultRepository for FailingStore {
        async fn append_result(&self, _result: &SessionResult) -> Result<ResultId, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn get_result(&self, _id: ResultId) -> Result<SessionResult, StorageError> {
            Err(StorageError::NotFound)
        }

        async fn list_result_rows(
            &self,
            _exercise: Option<ExerciseKind>,
            _limit: u32,
        ) -> Result<Vec<SessionResultRow>, StorageError> {
            Ok(Vec::new())
        }

        async fn load_history(&self) -> Result<Vec<SessionResult>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn service(results: Arc<dyn SessionResultRepository>) -> TrainingLoopService {
        TrainingLoopService::new(
            fixed_clock(),
            Arc::new(Catalog::standard().unwrap()),
            results,
            Feedback::default(),
        )
        .with_seed(42)
    }

    fn pass(kind: ExerciseKind, level: u8) -> SessionResult {
        SessionResult::new(kind, level, Score::new(85).unwrap(), Stars::THREE, fixed_now()).unwrap()
    }

    #[tokio::test]
    async fn locked_and_unknown_levels_are_refused() {
        let svc = service(Arc::new(InMemoryRepository::new()));
        assert!(matches!(
            svc.start_session(ExerciseKind::Memory, 2),
            Err(SessionError::LevelLocked { unlocked: 1, .. })
        ));
        assert!(matches!(
            svc.start_session(ExerciseKind::Memory, 4),
            Err(SessionError::UnknownLevel { .. })
        ));

        let receipt = svc.record_completion(pass(ExerciseKind::Memory, 1)).await;
        assert_eq!(receipt.unlocked_level, 2);
        assert!(svc.start_session(ExerciseKind::Memory, 2).is_ok());
        assert!(svc.start_session(ExerciseKind::Search, 2).is_err());
    }

    #[tokio::test]
    async fn persistence_failure_keeps_history() {
        let svc = service(Arc::new(FailingStore));
        let receipt = svc.record_completion(pass(ExerciseKind::Pattern, 1)).await;

        assert!(matches!(receipt.persisted, Err(StorageError::Connection(_))));
        assert_eq!(svc.history().len(), 1);
        assert_eq!(svc.unlocked_level(ExerciseKind::Pattern), 2);
        assert_eq!(svc.stats().sessions, 1);
    }

    #[tokio::test]
    async fn history_reloads_from_store() {
        let repo = Arc::new(InMemoryRepository::new());
        let first = service(repo.clone());
        first.record_completion(pass(ExerciseKind::Sorting, 1)).await;
        first.record_completion(pass(ExerciseKind::Sorting, 2)).await;

        let second = service(repo);
        assert_eq!(second.load_history().await.unwrap(), 2);
        assert_eq!(second.unlocked_level(ExerciseKind::Sorting), 3);
        assert_eq!(
            second.best_score(ExerciseKind::Sorting, 2).map(Score::value),
            Some(85)
        );
        let overview = second.level_overview(ExerciseKind::Sorting);
        assert!(overview.iter().all(|row| row.unlocked));
        let rows = second
            .stored_results(Some(ExerciseKind::Sorting), 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].result.level(), 2);
        let fetched = second.stored_result(rows[1].id).await.unwrap();
        assert_eq!(fetched.level(), 1);
        assert!(second.stored_results(Some(ExerciseKind::Memory), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unfinished_session_cannot_be_recorded() {
        let svc = service(Arc::new(InMemoryRepository::new()));
        let session = svc.start_session(ExerciseKind::Arithmetic, 1).unwrap();
        assert!(matches!(
            svc.record_session(&session).await,
            Err(SessionError::NotFinished)
        ));
    }
}
