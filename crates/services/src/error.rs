//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use train_core::generators::AnswerError;
use train_core::model::{ExerciseKind, ModelError};
use train_core::reaction::ReactionError;

use crate::sessions::SessionState;

/// Why an answer was turned away. The session is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidAnswer {
    #[error("session is not playing")]
    NotPlaying,
    #[error("no trial is active")]
    NoActiveTrial,
    #[error(transparent)]
    Rejected(#[from] AnswerError),
}

/// Errors emitted by sessions and the training loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid answer: {0}")]
    InvalidAnswer(#[from] InvalidAnswer),
    #[error("{kind} sessions do not support this operation")]
    WrongMode { kind: ExerciseKind },
    #[error("session is {state:?}, not playing")]
    NotPlaying { state: SessionState },
    #[error("exercise unavailable after {attempts} generator attempts")]
    ExerciseUnavailable { attempts: u32 },
    #[error("session already started")]
    AlreadyStarted,
    #[error("session has not finished")]
    NotFinished,
    #[error("{kind} level {level} is locked (unlocked up to {unlocked})")]
    LevelLocked {
        kind: ExerciseKind,
        level: u8,
        unlocked: u8,
    },
    #[error("{kind} has no level {level}")]
    UnknownLevel { kind: ExerciseKind, level: u8 },
    #[error("session runner has stopped")]
    RunnerClosed,
    #[error(transparent)]
    Simulation(#[from] ReactionError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors emitted by `ReportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("report generation is not configured")]
    Disabled,
    #[error("report service returned an empty response")]
    EmptyResponse,
    #[error("report request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("report request timed out")]
    Timeout,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
