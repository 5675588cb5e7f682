use std::collections::BTreeSet;

use sqlx::Row;
use vocab_core::model::{BadgeId, Level, ProgressRecord, ProgressStats, Word, WordId};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn word_id_from_i64(v: i64) -> Result<WordId, StorageError> {
    Ok(WordId::new(i64_to_u64("word_id", v)?))
}

pub(crate) fn word_id_to_i64(id: WordId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("word_id overflow".into()))
}

pub(crate) fn parse_level(s: &str) -> Result<Level, StorageError> {
    s.parse::<Level>().map_err(ser)
}

pub(crate) fn map_word_row(row: &sqlx::sqlite::SqliteRow) -> Result<Word, StorageError> {
    let level: String = row.try_get("level").map_err(ser)?;
    Ok(Word {
        id: word_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        word: row.try_get("word").map_err(ser)?,
        pronunciation: row.try_get("pronunciation").map_err(ser)?,
        part_of_speech: row.try_get("part_of_speech").map_err(ser)?,
        definition: row.try_get("definition").map_err(ser)?,
        example: row.try_get("example").map_err(ser)?,
        meaning: row.try_get("meaning").map_err(ser)?,
        example_translation: row.try_get("example_translation").map_err(ser)?,
        level: parse_level(&level)?,
        category: row.try_get("category").map_err(ser)?,
    })
}

/// Sets are stored as JSON arrays in TEXT columns.
pub(crate) fn encode_word_ids(ids: &BTreeSet<WordId>) -> Result<String, StorageError> {
    serde_json::to_string(ids).map_err(ser)
}

pub(crate) fn encode_badges(badges: &BTreeSet<BadgeId>) -> Result<String, StorageError> {
    serde_json::to_string(badges).map_err(ser)
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressRecord, StorageError> {
    let level: String = row.try_get("level").map_err(ser)?;
    let mastered_raw: String = row.try_get("mastered_words").map_err(ser)?;
    let badges_raw: String = row.try_get("badges").map_err(ser)?;

    Ok(ProgressRecord {
        level: parse_level(&level)?,
        total_points: i64_to_u32(
            "total_points",
            row.try_get::<i64, _>("total_points").map_err(ser)?,
        )?,
        streak: i64_to_u32("streak", row.try_get::<i64, _>("streak").map_err(ser)?)?,
        last_study_date: row.try_get("last_study_date").map_err(ser)?,
        mastered_words: serde_json::from_str(&mastered_raw).map_err(ser)?,
        badges: serde_json::from_str(&badges_raw).map_err(ser)?,
        stats: ProgressStats {
            words_learned: i64_to_u32(
                "words_learned",
                row.try_get::<i64, _>("words_learned").map_err(ser)?,
            )?,
            quizzes_taken: i64_to_u32(
                "quizzes_taken",
                row.try_get::<i64, _>("quizzes_taken").map_err(ser)?,
            )?,
            correct_answers: i64_to_u32(
                "correct_answers",
                row.try_get::<i64, _>("correct_answers").map_err(ser)?,
            )?,
            total_answers: i64_to_u32(
                "total_answers",
                row.try_get::<i64, _>("total_answers").map_err(ser)?,
            )?,
        },
    })
}
