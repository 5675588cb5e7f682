use std::fmt;
use std::path::PathBuf;

use storage::repository::Storage;
use storage::sqlite::{DEFAULT_DATABASE_URL, sqlite_url};
use vocab_core::model::{Level, VocabularyDataset};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    dataset: PathBuf,
    level: Option<Level>,
    replace: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingDataset,
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLevel { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingDataset => write!(f, "a dataset path is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("VOCAB_DB_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let mut dataset: Option<PathBuf> = std::env::var("VOCAB_DATASET").ok().map(Into::into);
        let mut level: Option<Level> = None;
        let mut replace = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--level" => {
                    let value = require_value(&mut args, "--level")?;
                    let parsed = value
                        .parse::<Level>()
                        .map_err(|_| ArgsError::InvalidLevel { raw: value.clone() })?;
                    level = Some(parsed);
                }
                "--replace" => replace = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if !other.starts_with("--") && dataset.is_none() => {
                    dataset = Some(PathBuf::from(other));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            dataset: dataset.ok_or(ArgsError::MissingDataset)?,
            level,
            replace,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin import -- <dataset.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://vocab.sqlite3)");
    eprintln!("  --level <A1|A2|B1|B2>     Only import one level");
    eprintln!("  --replace                 Clear existing vocabulary first");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  VOCAB_DB_URL, VOCAB_DATASET");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let raw = tokio::fs::read_to_string(&args.dataset).await?;
    let dataset: VocabularyDataset = serde_json::from_str(&raw)?;
    let words = match args.level {
        Some(level) => dataset.words_for(level).to_vec(),
        None => dataset.into_words(),
    };

    let db_url = sqlite_url(&args.db_url)?;
    let storage = Storage::sqlite(&db_url).await?;
    if args.replace {
        storage.words.clear_words().await?;
    }
    let inserted = storage.words.insert_words(&words).await?;

    println!(
        "Imported {inserted} of {} words from {} into {}",
        words.len(),
        args.dataset.display(),
        db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
