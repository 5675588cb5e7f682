use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{BadgeId, Level, ProgressRecord, ProgressStats, UserId, WordId, lenient};

/// One row of the remote `user_progress` table, keyed by `user_id`.
///
/// Every column other than the key may come back null; nulls read as zero,
/// empty or absent. Values of an unexpected type are treated like nulls, and
/// list entries that do not parse are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProgressRow {
    pub user_id: UserId,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_points: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub streak_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient::calendar_date")]
    pub last_study_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::known_level")]
    pub current_level: Option<Level>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub words_learned: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quizzes_taken: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub correct_answers: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_answers: Option<u32>,
    #[serde(default, deserialize_with = "lenient::word_id_list")]
    pub mastered_words: Option<Vec<WordId>>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub badges: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::instant")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteProgressRow {
    #[must_use]
    pub fn from_record(user_id: UserId, record: &ProgressRecord, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            total_points: Some(record.total_points),
            streak_days: Some(record.streak),
            last_study_date: record.last_study_date,
            current_level: Some(record.level),
            words_learned: Some(record.stats.words_learned),
            quizzes_taken: Some(record.stats.quizzes_taken),
            correct_answers: Some(record.stats.correct_answers),
            total_answers: Some(record.stats.total_answers),
            mastered_words: Some(record.mastered_words.iter().copied().collect()),
            badges: Some(
                record
                    .badges
                    .iter()
                    .map(|id| id.as_str().to_string())
                    .collect(),
            ),
            updated_at: Some(updated_at),
        }
    }

    /// Badge ids from the row that exist in the catalog.
    #[must_use]
    pub fn known_badges(&self) -> BTreeSet<BadgeId> {
        self.badges
            .iter()
            .flatten()
            .filter_map(|raw| raw.parse().ok())
            .collect()
    }

    /// Badge strings the catalog does not know about.
    #[must_use]
    pub fn unknown_badges(&self) -> Vec<&str> {
        self.badges
            .iter()
            .flatten()
            .filter(|raw| raw.parse::<BadgeId>().is_err())
            .map(String::as_str)
            .collect()
    }

    /// Interpret the row on its own, applying the null defaults.
    #[must_use]
    pub fn to_record(&self) -> ProgressRecord {
        ProgressRecord {
            level: self.current_level.unwrap_or_default(),
            total_points: self.total_points.unwrap_or(0),
            streak: self.streak_days.unwrap_or(0),
            last_study_date: self.last_study_date,
            mastered_words: self.mastered_words.iter().flatten().copied().collect(),
            badges: self.known_badges(),
            stats: ProgressStats {
                words_learned: self.words_learned.unwrap_or(0),
                quizzes_taken: self.quizzes_taken.unwrap_or(0),
                correct_answers: self.correct_answers.unwrap_or(0),
                total_answers: self.total_answers.unwrap_or(0),
            },
        }
    }
}

/// Row of the remote `user_mastered_words` table (conflict key `user_id,word_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteredWordRow {
    pub user_id: UserId,
    pub word_id: WordId,
    pub mastered_at: DateTime<Utc>,
}

/// Row appended to the remote `quiz_results` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResultRow {
    pub user_id: UserId,
    pub level: Level,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: u32,
    pub points_earned: u32,
    pub completed_at: DateTime<Utc>,
}
