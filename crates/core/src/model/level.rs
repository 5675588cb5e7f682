use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown level: {raw} (expected one of A1, A2, B1, B2)")]
pub struct LevelParseError {
    pub raw: String,
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// CEFR difficulty tier of the vocabulary being studied.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Level {
    #[default]
    A1,
    A2,
    B1,
    B2,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::A1, Level::A2, Level::B1, Level::B2];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Level::A1 => "Beginner (A1)",
            Level::A2 => "Elementary (A2)",
            Level::B1 => "Intermediate (B1)",
            Level::B2 => "Upper intermediate (B2)",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Level::A1 => "Everyday basics for learners just getting started",
            Level::A2 => "Broader everyday vocabulary for simple conversations",
            Level::B1 => "Handles the common situations of work and study",
            Level::B2 => "Fluent discussion of complex and specialised topics",
        }
    }

    /// The tier after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Level> {
        match self {
            Level::A1 => Some(Level::A2),
            Level::A2 => Some(Level::B1),
            Level::B1 => Some(Level::B2),
            Level::B2 => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            "B2" => Ok(Level::B2),
            _ => Err(LevelParseError { raw: s.to_string() }),
        }
    }
}
