use std::fmt;
use std::path::PathBuf;

use vocab_core::model::{Level, WordId};

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingCommand,
    UnknownCommand(String),
    MissingOperand { command: &'static str, operand: &'static str },
    UnexpectedOperand(String),
    InvalidValue { what: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingCommand => write!(f, "a command is required"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingOperand { command, operand } => {
                write!(f, "{command} requires <{operand}>")
            }
            ArgsError::UnexpectedOperand(arg) => write!(f, "unexpected argument: {arg}"),
            ArgsError::InvalidValue { what, raw } => write!(f, "invalid {what}: {raw}"),
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

fn require_operand(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
    operand: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingOperand { command, operand })
}

fn parse_value<T: std::str::FromStr>(what: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidValue { what, raw })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Stats,
    Badges,
    Master(WordId),
    Quiz { correct: u32, total: u32 },
    Streak,
    /// `None` moves to the next level.
    LevelUp(Option<Level>),
    AddPoints(u32),
    Reset,
    Import(PathBuf),
    Words {
        level: Option<Level>,
        category: Option<String>,
    },
    Search(String),
    Sync,
}

/// Parsed command line. Flags override the matching environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: Option<String>,
    pub progress_path: Option<PathBuf>,
}

/// What the binary should do after parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Run(Args),
    Help,
}

impl Args {
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags, commands or malformed operands.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Parsed, ArgsError> {
        let mut db_url = None;
        let mut progress_path = None;
        let mut level = None;
        let mut category = None;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = Some(require_value(&mut args, "--db")?),
                "--progress" => {
                    progress_path = Some(PathBuf::from(require_value(&mut args, "--progress")?));
                }
                "--level" => {
                    let value = require_value(&mut args, "--level")?;
                    level = Some(parse_value::<Level>("level", value)?);
                }
                "--category" => category = Some(require_value(&mut args, "--category")?),
                "--help" | "-h" => return Ok(Parsed::Help),
                other if other.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut rest = positional.into_iter();
        let name = rest.next().ok_or(ArgsError::MissingCommand)?;

        let command = match name.as_str() {
            "show" => Command::Show,
            "stats" => Command::Stats,
            "badges" => Command::Badges,
            "master" => {
                let raw = require_operand(&mut rest, "master", "word-id")?;
                Command::Master(parse_value("word id", raw)?)
            }
            "quiz" => {
                let correct = require_operand(&mut rest, "quiz", "correct")?;
                let total = require_operand(&mut rest, "quiz", "total")?;
                Command::Quiz {
                    correct: parse_value("correct count", correct)?,
                    total: parse_value("total count", total)?,
                }
            }
            "streak" => Command::Streak,
            "level-up" => match rest.next() {
                Some(raw) => Command::LevelUp(Some(parse_value("level", raw)?)),
                None => Command::LevelUp(None),
            },
            "add-points" => {
                let raw = require_operand(&mut rest, "add-points", "points")?;
                Command::AddPoints(parse_value("points", raw)?)
            }
            "reset" => Command::Reset,
            "import" => {
                Command::Import(require_operand(&mut rest, "import", "dataset.json")?.into())
            }
            "words" => Command::Words { level, category },
            "search" => Command::Search(require_operand(&mut rest, "search", "query")?),
            "sync" => Command::Sync,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = rest.next() {
            return Err(ArgsError::UnexpectedOperand(extra));
        }

        Ok(Parsed::Run(Self {
            command,
            db_url,
            progress_path,
        }))
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  vocab [--db <sqlite_url>] [--progress <file>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  show                      Current progress");
    eprintln!("  stats                     Study statistics and accuracy");
    eprintln!("  badges                    Badge catalog with earned markers");
    eprintln!("  master <word-id>          Mark a word as mastered (+10)");
    eprintln!("  quiz <correct> <total>    Record a finished quiz");
    eprintln!("  streak                    Count today towards the study streak");
    eprintln!("  level-up [A1|A2|B1|B2]    Move to a new level, default next (+100)");
    eprintln!("  add-points <n>            Award points");
    eprintln!("  reset                     Forget all progress");
    eprintln!("  import <dataset.json>     Load vocabulary into the database");
    eprintln!("  words [--level <L>] [--category <C>]");
    eprintln!("                            List vocabulary");
    eprintln!("  search <query>            Search word, definition and meaning");
    eprintln!("  sync                      Merge progress with the remote store");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_DB_URL, VOCAB_PROGRESS_FILE, VOCAB_LOG,");
    eprintln!("  VOCAB_REMOTE_URL, VOCAB_REMOTE_KEY, VOCAB_REMOTE_TIMEOUT_SECS,");
    eprintln!("  VOCAB_USER_ID, VOCAB_ACCESS_TOKEN");
}
