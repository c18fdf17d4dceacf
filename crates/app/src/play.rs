use std::io;
use std::time::Duration;

use services::sessions::{SessionHandle, TrainingLoopService};
use services::{SessionError, SessionState};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::warn;
use train_core::generators::{Judgement, Trial};
use train_core::model::ExerciseKind;

use crate::prompt::{LANES, describe, field_view, parse_answer, parse_steer, reveal_line};

type Input = Lines<BufReader<Stdin>>;

const POLL: Duration = Duration::from_millis(250);
const REFRESH: Duration = Duration::from_millis(500);
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Play one level interactively and record the result.
///
/// # Errors
///
/// Returns an error if the level cannot be started or the session task fails.
pub async fn play(
    training: &TrainingLoopService,
    kind: ExerciseKind,
    level: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = training.start_session(kind, level)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{} - level {level}", kind.title());
    if kind.is_real_time() {
        println!("Catch the ★ and dodge the ✖. Type a lane 1-{LANES} or a/d to step, then Enter.");
    }
    println!("Press Enter to start.");
    if input.next_line().await?.is_none() {
        return Ok(());
    }

    let handle = SessionHandle::spawn(session);
    handle.start().await?;

    if kind.is_real_time() {
        steer(&handle, &mut input).await?;
    } else {
        turns(&handle, &mut input, level).await?;
    }

    let session = handle.finished().await?;
    if session.state() != SessionState::Feedback {
        println!("Session ended early; nothing was recorded.");
        return Ok(());
    }

    let receipt = training.record_session(&session).await?;
    let result = &receipt.result;
    println!(
        "Score {} - {} star(s). Unlocked level for {}: {}",
        result.score(),
        result.stars().value(),
        kind.title(),
        receipt.unlocked_level
    );
    if let Err(e) = &receipt.persisted {
        warn!(error = %e, "result kept for this run only");
        println!("Note: the result could not be saved ({e}).");
    }
    Ok(())
}

/// Move the catcher from typed commands while the field falls, printing
/// the board every refresh until time runs out.
async fn steer(handle: &SessionHandle, input: &mut Input) -> io::Result<()> {
    let mut refresh = interval(REFRESH);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else {
                    handle.cancel();
                    return Ok(());
                };
                let Ok(Some(current)) = handle.inspect(|s| s.field().map(|f| f.catcher().x())).await else {
                    return Ok(());
                };
                match parse_steer(&line, current) {
                    Ok(x) => {
                        if handle.pointer_move(x).await.is_err() {
                            return Ok(());
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            _ = refresh.tick() => {
                let view = handle.inspect(|s| s.field().map(field_view)).await;
                let progress = handle.progress().await;
                let (Ok(Some(view)), Ok(progress)) = (view, progress) else {
                    println!("\nTime is up!");
                    return Ok(());
                };
                if progress.state != SessionState::Playing {
                    println!("\nTime is up!");
                    return Ok(());
                }
                let secs = progress.remaining_secs.unwrap_or_default();
                println!("{CLEAR_SCREEN}[{secs}s left, score {}]\n{view}", progress.score);
            }
        }
    }
}

async fn turns(handle: &SessionHandle, input: &mut Input, level: u8) -> io::Result<()> {
    let mut memorised: Option<Vec<String>> = None;

    loop {
        let Ok(Some(trial)) = handle.inspect(|s| s.current_trial().cloned()).await else {
            return Ok(());
        };

        if let Trial::Recall(recall) = &trial {
            if memorised.as_deref() != Some(recall.targets()) {
                println!("Memorise this shopping list:");
                for item in recall.targets() {
                    println!("  - {item}");
                }
                println!("Press Enter when you are ready.");
                if input.next_line().await?.is_none() {
                    handle.cancel();
                    return Ok(());
                }
                print!("{CLEAR_SCREEN}");
                memorised = Some(recall.targets().to_vec());
            }
        }

        let header = match handle.progress().await {
            Ok(progress) => match (progress.remaining_secs, progress.remaining_trials()) {
                (Some(secs), _) => format!("[{secs}s left, score {}]", progress.score),
                (None, Some(left)) => format!("[{left} to go, score {}]", progress.score),
                (None, None) => format!("[score {}]", progress.score),
            },
            Err(_) => return Ok(()),
        };
        println!("\n{header}\n{}", describe(&trial, level));

        let Some(line) = next_answer(handle, input).await? else {
            return Ok(());
        };
        let answer = match parse_answer(&trial, &line) {
            Ok(answer) => answer,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let revealed = reveal_line(&trial, &answer);
        match handle.submit(answer).await {
            Ok(outcome) => {
                if let Some(faces) = &revealed {
                    println!("{faces}");
                }
                match outcome.judgement {
                    Judgement::Correct => println!("Correct!"),
                    Judgement::Incorrect => println!("Not quite."),
                    Judgement::Ignored => println!("Already done."),
                }
            }
            Err(SessionError::RunnerClosed) => return Ok(()),
            Err(e) => println!("{e}"),
        }
    }
}

/// Wait for a typed line while watching for the countdown to end the
/// session. `None` means stop playing.
async fn next_answer(handle: &SessionHandle, input: &mut Input) -> io::Result<Option<String>> {
    loop {
        tokio::select! {
            line = input.next_line() => {
                let line = line?;
                if line.is_none() {
                    handle.cancel();
                }
                return Ok(line);
            }
            () = sleep(POLL) => {
                let running = handle
                    .progress()
                    .await
                    .is_ok_and(|p| p.state == SessionState::Playing);
                if !running {
                    println!("\nTime is up!");
                    return Ok(None);
                }
            }
        }
    }
}
