use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vocab_core::model::WordId;

use super::SqliteRepository;
use super::mapping::{ser, word_id_from_i64, word_id_to_i64};
use crate::repository::{MasteredWordRepository, StorageError};

#[async_trait]
impl MasteredWordRepository for SqliteRepository {
    async fn mark_mastered(
        &self,
        word_id: WordId,
        mastered_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO mastered_words (word_id, mastered_at)
            VALUES (?1, ?2)
            ON CONFLICT(word_id) DO NOTHING
            ",
        )
        .bind(word_id_to_i64(word_id)?)
        .bind(mastered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected() > 0)
    }

    async fn is_mastered(&self, word_id: WordId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM mastered_words WHERE word_id = ?1")
            .bind(word_id_to_i64(word_id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn mastered_word_ids(&self) -> Result<Vec<WordId>, StorageError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT word_id FROM mastered_words ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        ids.into_iter().map(word_id_from_i64).collect()
    }

    async fn count_mastered(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mastered_words")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        u64::try_from(count).map_err(ser)
    }
}
