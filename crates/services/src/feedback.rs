//! Narration and audio-cue ports.
//!
//! Sessions call these fire-and-forget: implementations must return quickly
//! and swallow their own failures.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Short audio feedback kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Success,
    Failure,
    Tap,
}

/// Best-effort speech output. A newer announcement may cut off an older one.
pub trait Narrator: Send + Sync {
    fn announce(&self, text: &str);
}

pub trait CuePlayer: Send + Sync {
    fn cue(&self, cue: Cue);
}

/// The pair of ports a session talks to.
#[derive(Clone)]
pub struct Feedback {
    narrator: Arc<dyn Narrator>,
    cues: Arc<dyn CuePlayer>,
}

impl Feedback {
    #[must_use]
    pub fn new(narrator: Arc<dyn Narrator>, cues: Arc<dyn CuePlayer>) -> Self {
        Self { narrator, cues }
    }

    /// Route both narration and cues through one implementation.
    #[must_use]
    pub fn shared<T>(port: Arc<T>) -> Self
    where
        T: Narrator + CuePlayer + 'static,
    {
        let narrator: Arc<dyn Narrator> = port.clone();
        let cues: Arc<dyn CuePlayer> = port;
        Self { narrator, cues }
    }

    #[must_use]
    pub fn tracing() -> Self {
        Self::shared(Arc::new(TracingFeedback))
    }

    pub fn announce(&self, text: &str) {
        self.narrator.announce(text);
    }

    pub fn cue(&self, cue: Cue) {
        self.cues.cue(cue);
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feedback").finish_non_exhaustive()
    }
}

/// Logs announcements and cues instead of playing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFeedback;

impl Narrator for TracingFeedback {
    fn announce(&self, text: &str) {
        debug!(text, "announce");
    }
}

impl CuePlayer for TracingFeedback {
    fn cue(&self, cue: Cue) {
        debug!(?cue, "cue");
    }
}

//
// ─── RECORDING ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    Announced(String),
    Cued(Cue),
}

/// Keeps every call in order, for assertions and replay.
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    events: Arc<Mutex<Vec<FeedbackEvent>>>,
}

impl RecordingFeedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn announcements(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FeedbackEvent::Announced(text) => Some(text),
                FeedbackEvent::Cued(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn cues(&self) -> Vec<Cue> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FeedbackEvent::Cued(cue) => Some(cue),
                FeedbackEvent::Announced(_) => None,
            })
            .collect()
    }

    fn push(&self, event: FeedbackEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Narrator for RecordingFeedback {
    fn announce(&self, text: &str) {
        self.push(FeedbackEvent::Announced(text.to_owned()));
    }
}

impl CuePlayer for RecordingFeedback {
    fn cue(&self, cue: Cue) {
        self.push(FeedbackEvent::Cued(cue));
    }
}
