mod progress;
mod runner;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{InvalidAnswer, SessionError};
pub use progress::SessionProgress;
pub use runner::{FRAME, SECOND, SessionHandle};
pub use service::{
    FinishHandler, FrameOutcome, MAX_GENERATOR_ATTEMPTS, Session, SessionState, SubmitOutcome,
};
pub use workflow::{CompletionReceipt, TrainingLoopService};
