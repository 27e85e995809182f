use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use services::{BankService, Clock, QuizFlowService, RandomSampler, SampleOrder, Utf8TextExtractor};
use storage::repository::Storage;

mod console;

use console::Console;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
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

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: Option<String>,
    seed: Option<u64>,
    order: SampleOrder,
    file: Option<PathBuf>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--seed <u64>] [--bank-order] [FILE]");
    eprintln!();
    eprintln!("FILE is a text document with numbered questions and A)-D) options.");
    eprintln!("Each uploaded bank is discarded when its quiz ends.");
    eprintln!("Without --db, storage lives in memory for this run only.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED, RUST_LOG");
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env_db_url: Option<String>,
        env_seed: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env_db_url
            .filter(|value| !value.trim().is_empty())
            .map(normalize_sqlite_url);
        let mut seed = env_seed.and_then(|value| value.trim().parse::<u64>().ok());
        let mut order = SampleOrder::default();
        let mut file = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--bank-order" => order = SampleOrder::BankOrder,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with('-') || file.is_some() => {
                    return Err(ArgsError::UnknownArg(arg));
                }
                _ => file = Some(PathBuf::from(arg)),
            }
        }

        Ok(Self {
            db_url,
            seed,
            order,
            file,
        })
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
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
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

async fn open_storage(db_url: Option<&str>) -> Result<Storage, Box<dyn std::error::Error>> {
    match db_url {
        Some(url) => {
            prepare_sqlite_file(url)?;
            log::info!("using sqlite storage at {url}");
            Ok(Storage::sqlite(url).await?)
        }
        None => {
            log::info!("using in-memory storage");
            Ok(Storage::in_memory())
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(
        &mut argv,
        std::env::var("QUIZ_DB_URL").ok(),
        std::env::var("QUIZ_SEED").ok(),
    )
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = open_storage(parsed.db_url.as_deref()).await?;

    let mut sampler = RandomSampler::new().with_order(parsed.order);
    if let Some(seed) = parsed.seed {
        sampler = sampler.with_seed(seed);
    }

    let banks = BankService::new(
        Clock::default(),
        Arc::new(Utf8TextExtractor),
        Arc::clone(&storage.banks),
    )?;
    let flow = QuizFlowService::new(Arc::clone(&storage.banks), Arc::new(sampler));

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), banks, flow);
    console.run(parsed.file).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
