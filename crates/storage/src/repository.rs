use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use train_core::model::{ExerciseKind, ResultId, SessionResult};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted session result together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResultRow {
    pub id: ResultId,
    pub result: SessionResult,
}

impl SessionResultRow {
    #[must_use]
    pub fn new(id: ResultId, result: SessionResult) -> Self {
        Self { id, result }
    }
}

/// Append-only record store for completed sessions.
///
/// Results are never updated or deleted once written.
#[async_trait]
pub trait SessionResultRepository: Send + Sync {
    /// Append a finished session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &SessionResult) -> Result<ResultId, StorageError>;

    /// Fetch one result by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_result(&self, id: ResultId) -> Result<SessionResult, StorageError>;

    /// Most recent results first, optionally for a single exercise.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or decoding failures.
    async fn list_result_rows(
        &self,
        exercise: Option<ExerciseKind>,
        limit: u32,
    ) -> Result<Vec<SessionResultRow>, StorageError>;

    /// Full history in insertion order, used to rebuild in-memory state at start-up.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or decoding failures.
    async fn load_history(&self) -> Result<Vec<SessionResult>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    rows: Arc<Mutex<Vec<SessionResultRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &SessionResult) -> Result<ResultId, StorageError> {
        let mut guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let next = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("result id overflow".into()))?
            + 1;
        let id = ResultId::new(next);
        guard.push(SessionResultRow::new(id, result.clone()));
        Ok(id)
    }

    async fn get_result(&self, id: ResultId) -> Result<SessionResult, StorageError> {
        let guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.result.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_result_rows(
        &self,
        exercise: Option<ExerciseKind>,
        limit: u32,
    ) -> Result<Vec<SessionResultRow>, StorageError> {
        let guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<SessionResultRow> = guard
            .iter()
            .filter(|row| exercise.is_none_or(|kind| row.result.exercise() == kind))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.result
                .completed_at()
                .cmp(&a.result.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn load_history(&self) -> Result<Vec<SessionResult>, StorageError> {
        let guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().map(|row| row.result.clone()).collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn SessionResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let results: Arc<dyn SessionResultRepository> = Arc::new(InMemoryRepository::new());
        Self { results }
    }
}
