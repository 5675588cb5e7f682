use async_trait::async_trait;
use vocab_core::model::{Level, Word, WordId};

use super::SqliteRepository;
use super::mapping::{map_word_row, ser, word_id_to_i64};
use crate::repository::{StorageError, WordRepository};

const WORD_COLUMNS: &str = "id, word, pronunciation, part_of_speech, definition, example, \
     meaning, example_translation, level, category";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl WordRepository for SqliteRepository {
    async fn insert_words(&self, words: &[Word]) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let mut inserted = 0_usize;

        for word in words {
            // OR IGNORE covers both the primary key and the unique headword index.
            let res = sqlx::query(
                r"
                INSERT OR IGNORE INTO words (
                    id, word, pronunciation, part_of_speech, definition,
                    example, meaning, example_translation, level, category
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ",
            )
            .bind(word_id_to_i64(word.id)?)
            .bind(&word.word)
            .bind(&word.pronunciation)
            .bind(&word.part_of_speech)
            .bind(&word.definition)
            .bind(&word.example)
            .bind(&word.meaning)
            .bind(&word.example_translation)
            .bind(word.level.as_str())
            .bind(&word.category)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            if res.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(inserted)
    }

    async fn get_word(&self, id: WordId) -> Result<Option<Word>, StorageError> {
        let row = sqlx::query(&format!("SELECT {WORD_COLUMNS} FROM words WHERE id = ?1"))
            .bind(word_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_word_row).transpose()
    }

    async fn words_by_level(&self, level: Level) -> Result<Vec<Word>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE level = ?1 ORDER BY id ASC"
        ))
        .bind(level.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }

    async fn words_by_category(&self, category: &str) -> Result<Vec<Word>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE category = ?1 ORDER BY id ASC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }

    async fn all_words(&self) -> Result<Vec<Word>, StorageError> {
        let rows = sqlx::query(&format!("SELECT {WORD_COLUMNS} FROM words ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }

    async fn count_words(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u64::try_from(count).map_err(ser)
    }

    async fn clear_words(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM words")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
