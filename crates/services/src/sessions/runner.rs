//! Drives one session on a tokio task.
//!
//! The task is the single owner of the session: countdown seconds, animation
//! frames and caller commands are interleaved on it, never run in parallel.
//! Cancelling the token (or dropping the handle) aborts the session before
//! any further tick can touch it.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use train_core::generators::Answer;

use super::progress::SessionProgress;
use super::service::{Session, SessionState, SubmitOutcome};
use crate::error::SessionError;

pub const SECOND: Duration = Duration::from_secs(1);
/// Roughly 60 frames per second.
pub const FRAME: Duration = Duration::from_millis(16);

const COMMAND_BUFFER: usize = 32;

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;
type Inspector = Box<dyn FnOnce(&Session) + Send>;

enum Command {
    Start(Reply<()>),
    Submit(Answer, Reply<SubmitOutcome>),
    PointerMove(f64, Reply<()>),
    Progress(oneshot::Sender<SessionProgress>),
    Inspect(Inspector),
}

/// Caller side of a running session.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    cancel: CancellationToken,
    task: Option<JoinHandle<Session>>,
}

impl SessionHandle {
    /// Move `session` onto its own task.
    #[must_use]
    pub fn spawn(session: Session) -> Self {
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(session, inbox, cancel.clone()));
        Self {
            commands,
            cancel,
            task: Some(task),
        }
    }

    /// # Errors
    ///
    /// Propagates `Session::start` errors, or `SessionError::RunnerClosed`
    /// once the task has stopped.
    pub async fn start(&self) -> Result<(), SessionError> {
        self.request(Command::Start).await?
    }

    /// # Errors
    ///
    /// Propagates `Session::submit` errors, or `SessionError::RunnerClosed`.
    pub async fn submit(&self, answer: Answer) -> Result<SubmitOutcome, SessionError> {
        self.request(|reply| Command::Submit(answer, reply)).await?
    }

    /// # Errors
    ///
    /// Propagates `Session::pointer_move` errors, or `SessionError::RunnerClosed`.
    pub async fn pointer_move(&self, x: f64) -> Result<(), SessionError> {
        self.request(|reply| Command::PointerMove(x, reply)).await?
    }

    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` once the session has ended.
    pub async fn progress(&self) -> Result<SessionProgress, SessionError> {
        self.request(Command::Progress).await
    }

    /// Run a read-only query against the session on its own task.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` once the session has ended.
    pub async fn inspect<T, F>(&self, query: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&Session) -> T + Send + 'static,
    {
        self.request(|reply| {
            Command::Inspect(Box::new(move |session| {
                let _ = reply.send(query(session));
            }))
        })
        .await
    }

    /// Abort the session now. Further requests fail with `RunnerClosed`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the task to stop and take the session back.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RunnerClosed` if the task panicked or was
    /// already awaited.
    pub async fn finished(mut self) -> Result<Session, SessionError> {
        let task = self.task.take().ok_or(SessionError::RunnerClosed)?;
        task.await.map_err(|e| {
            warn!(error = %e, "session task failed");
            SessionError::RunnerClosed
        })
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| SessionError::RunnerClosed)?;
        response.await.map_err(|_| SessionError::RunnerClosed)
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    mut session: Session,
    mut inbox: mpsc::Receiver<Command>,
    cancel: CancellationToken,
) -> Session {
    let mut seconds = interval_at(Instant::now() + SECOND, SECOND);
    let mut frames = interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        if session.state().is_terminal() {
            break;
        }
        let playing = session.state() == SessionState::Playing;
        let countdown = playing && session.has_countdown();
        let animated = playing && session.kind().is_real_time();

        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                session.abort();
                break;
            }
            command = inbox.recv() => {
                let Some(command) = command else {
                    session.abort();
                    break;
                };
                handle(&mut session, command);
                if !playing && session.state() == SessionState::Playing {
                    seconds.reset();
                    frames.reset();
                    last_frame = Instant::now();
                }
            }
            _ = seconds.tick(), if countdown => {
                if let Err(e) = session.tick_second() {
                    debug!(error = %e, "countdown tick ignored");
                }
            }
            now = frames.tick(), if animated => {
                let delta = now.duration_since(last_frame);
                last_frame = now;
                if let Err(e) = session.tick(delta.as_secs_f64() * 1000.0) {
                    debug!(error = %e, "frame tick ignored");
                }
            }
        }
    }

    debug!(session_id = %session.id(), state = ?session.state(), "session runner stopped");
    session
}

fn handle(session: &mut Session, command: Command) {
    // A dropped reply only means the caller stopped waiting.
    match command {
        Command::Start(reply) => {
            let _ = reply.send(session.start());
        }
        Command::Submit(answer, reply) => {
            let _ = reply.send(session.submit(&answer));
        }
        Command::PointerMove(x, reply) => {
            let _ = reply.send(session.pointer_move(x));
        }
        Command::Progress(reply) => {
            let _ = reply.send(session.progress());
        }
        Command::Inspect(query) => query(session),
    }
}
