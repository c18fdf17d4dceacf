#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod feedback;
pub mod report_service;
pub mod sessions;

pub use train_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, InvalidAnswer, ReportError, SessionError};
pub use feedback::{Cue, CuePlayer, Feedback, Narrator, RecordingFeedback, TracingFeedback};
pub use report_service::{ChatSummarizer, ReportConfig, ReportService, Summarizer};

pub use sessions::{
    CompletionReceipt, Session, SessionHandle, SessionProgress, SessionState, SubmitOutcome,
    TrainingLoopService,
};
