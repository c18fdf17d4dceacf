mod play;
mod prompt;

use std::fmt;

use services::{AppServices, Clock};
use train_core::model::{ExerciseKind, MAX_LEVEL, ResultId, SessionResult};

const DEFAULT_DB_URL: &str = "sqlite:trainer.db?mode=rwc";
const HISTORY_LIMIT: u32 = 10;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg { name: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidLevel { raw: String },
    InvalidResultId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidLevel { raw } => {
                write!(f, "invalid level: {raw} (expected 1..={MAX_LEVEL})")
            }
            ArgsError::InvalidResultId { raw } => write!(f, "invalid result id: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  trainer [--db <sqlite_url>] [--seed <u64>] levels");
    eprintln!("  trainer [--db <sqlite_url>] [--seed <u64>] play <exercise> <level>");
    eprintln!("  trainer [--db <sqlite_url>] history [--exercise <code>]");
    eprintln!("  trainer [--db <sqlite_url>] result <id>");
    eprintln!("  trainer [--db <sqlite_url>] report");
    eprintln!();
    eprintln!("Exercises:");
    for kind in ExerciseKind::ALL {
        eprintln!("  {:<12} {}", kind.code(), kind.title());
    }
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRAINER_DB_URL, TRAINER_SEED, RUST_LOG");
    eprintln!("  TRAINER_AI_API_KEY, TRAINER_AI_BASE_URL, TRAINER_AI_MODEL, TRAINER_AI_TIMEOUT_SECS");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Levels,
    Play { kind: ExerciseKind, level: u8 },
    History { exercise: Option<ExerciseKind> },
    Result { id: ResultId },
    Report,
}

#[derive(Debug)]
struct Args {
    db_url: String,
    seed: Option<u64>,
    command: Command,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("TRAINER_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url(DEFAULT_DB_URL.into()), normalize_sqlite_url);
        let mut seed = std::env::var("TRAINER_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());
        let mut exercise = None;
        let mut positional = Vec::new();

        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    let parsed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--exercise" => {
                    let value = require_value(&mut args, "--exercise")?;
                    let kind = value
                        .parse::<ExerciseKind>()
                        .map_err(|_| ArgsError::UnknownArg(value.clone()))?;
                    exercise = Some(kind);
                }
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            None | Some("levels") => Command::Levels,
            Some("history") => Command::History { exercise },
            Some("result") => {
                let raw = positional.next().ok_or(ArgsError::MissingArg { name: "id" })?;
                let id = raw
                    .parse::<ResultId>()
                    .map_err(|_| ArgsError::InvalidResultId { raw: raw.clone() })?;
                Command::Result { id }
            }
            Some("report") => Command::Report,
            Some("play") => {
                let raw_kind = positional
                    .next()
                    .ok_or(ArgsError::MissingArg { name: "exercise" })?;
                let kind = raw_kind
                    .parse::<ExerciseKind>()
                    .map_err(|_| ArgsError::UnknownArg(raw_kind.clone()))?;
                let raw_level = positional
                    .next()
                    .ok_or(ArgsError::MissingArg { name: "level" })?;
                let level = raw_level
                    .parse::<u8>()
                    .ok()
                    .filter(|level| (1..=MAX_LEVEL).contains(level))
                    .ok_or(ArgsError::InvalidLevel { raw: raw_level })?;
                Command::Play { kind, level }
            }
            Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
        };
        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            db_url,
            seed,
            command,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let (path_str, query) = match path_str.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (path_str, None),
    };
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(args) = parsed else {
        print_usage();
        return Ok(());
    };

    init_logging()?;

    prepare_sqlite_file(&args.db_url)?;
    let app = AppServices::new_sqlite(&args.db_url, Clock::system(), args.seed).await?;
    let training = app.training();

    match args.command {
        Command::Levels => {
            for entry in app.catalog().entries() {
                let kind = entry.kind();
                println!("{} ({}, {})", kind.title(), kind.code(), kind.domain().label());
                for status in training.level_overview(kind) {
                    let best = match (status.best_score, status.best_stars) {
                        (Some(score), Some(stars)) => {
                            format!("best {score} ({} star(s))", stars.value())
                        }
                        _ => "not played".to_string(),
                    };
                    let lock = if status.unlocked { "open  " } else { "locked" };
                    println!("  level {} {lock} {best}, {} play(s)", status.level, status.plays);
                }
            }
            Ok(())
        }
        Command::Play { kind, level } => play::play(&training, kind, level).await,
        Command::History { exercise } => {
            let stats = training.stats();
            println!("Sessions played: {}", stats.sessions);
            println!("Total score: {}", stats.total_score);
            if let Some(last) = stats.last_played {
                println!("Last played: {}", last.format("%Y-%m-%d %H:%M"));
            }
            for row in training.stored_results(exercise, HISTORY_LIMIT).await? {
                println!("  #{:<5} {}", row.id.value(), summary_line(&row.result));
            }
            Ok(())
        }
        Command::Result { id } => {
            let result = training.stored_result(id).await?;
            println!("#{id} {}", summary_line(&result));
            Ok(())
        }
        Command::Report => {
            match app.reports().report(&training.history()).await {
                Ok(text) => println!("{text}"),
                Err(e) => println!("report unavailable: {e}"),
            }
            Ok(())
        }
    }
}

fn summary_line(result: &SessionResult) -> String {
    format!(
        "{}  {:<28} level {}  score {:>3}  {} star(s)",
        result.completed_at().format("%Y-%m-%d"),
        result.exercise().title(),
        result.level(),
        result.score(),
        result.stars().value()
    )
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
