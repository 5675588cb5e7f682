use async_trait::async_trait;
use chrono::Utc;
use vocab_core::model::ProgressRecord;

use super::SqliteRepository;
use super::mapping::{encode_badges, encode_word_ids, map_progress_row};
use crate::repository::{ProgressMirrorRepository, StorageError};

/// Key of the single mirrored row.
const MAIN_ROW: &str = "main";

#[async_trait]
impl ProgressMirrorRepository for SqliteRepository {
    async fn save_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError> {
        let stats = &progress.stats;
        sqlx::query(
            r"
            INSERT INTO user_progress (
                id, level, total_points, streak, last_study_date,
                words_learned, quizzes_taken, correct_answers, total_answers,
                mastered_words, badges, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                level = excluded.level,
                total_points = excluded.total_points,
                streak = excluded.streak,
                last_study_date = excluded.last_study_date,
                words_learned = excluded.words_learned,
                quizzes_taken = excluded.quizzes_taken,
                correct_answers = excluded.correct_answers,
                total_answers = excluded.total_answers,
                mastered_words = excluded.mastered_words,
                badges = excluded.badges,
                updated_at = excluded.updated_at
            ",
        )
        .bind(MAIN_ROW)
        .bind(progress.level.as_str())
        .bind(i64::from(progress.total_points))
        .bind(i64::from(progress.streak))
        .bind(progress.last_study_date)
        .bind(i64::from(stats.words_learned))
        .bind(i64::from(stats.quizzes_taken))
        .bind(i64::from(stats.correct_answers))
        .bind(i64::from(stats.total_answers))
        .bind(encode_word_ids(&progress.mastered_words)?)
        .bind(encode_badges(&progress.badges)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT level, total_points, streak, last_study_date,
                   words_learned, quizzes_taken, correct_answers, total_answers,
                   mastered_words, badges
            FROM user_progress
            WHERE id = ?1
            ",
        )
        .bind(MAIN_ROW)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_progress_row).transpose()
    }
}
