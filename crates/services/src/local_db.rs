use std::sync::Arc;

use tracing::{debug, warn};

use storage::repository::{MasteredWordRepository, ProgressMirrorRepository, Storage, WordRepository};
use vocab_core::model::{Level, ProgressRecord, Word, WordId};
use vocab_core::time::Clock;

/// Counts reported by [`LocalDatabase::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseStats {
    pub total_words: u64,
    pub mastered_words: u64,
    pub progress: Option<ProgressRecord>,
}

/// Vocabulary, mastered-word log and progress mirror.
///
/// Nothing here surfaces storage errors: failures are logged and read as
/// empty results, so the app keeps working without the database.
#[derive(Clone)]
pub struct LocalDatabase {
    clock: Clock,
    words: Arc<dyn WordRepository>,
    mastered: Arc<dyn MasteredWordRepository>,
    progress: Arc<dyn ProgressMirrorRepository>,
}

impl LocalDatabase {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage) -> Self {
        Self {
            clock,
            words: Arc::clone(&storage.words),
            mastered: Arc::clone(&storage.mastered),
            progress: Arc::clone(&storage.progress),
        }
    }

    // ─── Vocabulary ────────────────────────────────────────────────────────

    /// Bulk import; rows whose headword or id already exists are skipped.
    /// Returns the number of rows inserted.
    pub async fn import_words(&self, words: &[Word]) -> usize {
        match self.words.insert_words(words).await {
            Ok(inserted) => {
                debug!(inserted, offered = words.len(), "imported vocabulary");
                inserted
            }
            Err(err) => {
                warn!(error = %err, "failed to import vocabulary");
                0
            }
        }
    }

    pub async fn words_by_level(&self, level: Level) -> Vec<Word> {
        self.words.words_by_level(level).await.unwrap_or_else(|err| {
            warn!(error = %err, %level, "failed to read words by level");
            Vec::new()
        })
    }

    pub async fn words_by_category(&self, category: &str) -> Vec<Word> {
        self.words
            .words_by_category(category)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, category, "failed to read words by category");
                Vec::new()
            })
    }

    pub async fn all_words(&self) -> Vec<Word> {
        self.words.all_words().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read vocabulary");
            Vec::new()
        })
    }

    pub async fn word_by_id(&self, id: WordId) -> Option<Word> {
        self.words.get_word(id).await.unwrap_or_else(|err| {
            warn!(error = %err, %id, "failed to read word");
            None
        })
    }

    /// Case-insensitive substring search over headword, definition and meaning.
    pub async fn search_words(&self, query: &str) -> Vec<Word> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.all_words()
            .await
            .into_iter()
            .filter(|word| word.matches_lowercase(&needle))
            .collect()
    }

    pub async fn clear_words(&self) {
        if let Err(err) = self.words.clear_words().await {
            warn!(error = %err, "failed to clear vocabulary");
        }
    }

    pub async fn has_vocabulary(&self) -> bool {
        self.count_words().await > 0
    }

    async fn count_words(&self) -> u64 {
        self.words.count_words().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to count vocabulary");
            0
        })
    }

    // ─── Progress mirror ───────────────────────────────────────────────────

    pub async fn save_progress(&self, progress: &ProgressRecord) {
        if let Err(err) = self.progress.save_progress(progress).await {
            warn!(error = %err, "failed to mirror progress");
        }
    }

    pub async fn load_progress(&self) -> Option<ProgressRecord> {
        self.progress.load_progress().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read mirrored progress");
            None
        })
    }

    // ─── Mastered words ────────────────────────────────────────────────────

    /// Log a mastered word; repeats keep the first timestamp.
    pub async fn mark_mastered(&self, word_id: WordId) {
        match self.mastered.mark_mastered(word_id, self.clock.now()).await {
            Ok(true) => debug!(%word_id, "mastered word logged"),
            Ok(false) => {}
            Err(err) => warn!(error = %err, %word_id, "failed to log mastered word"),
        }
    }

    pub async fn mastered_word_ids(&self) -> Vec<WordId> {
        self.mastered.mastered_word_ids().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read mastered words");
            Vec::new()
        })
    }

    pub async fn is_word_mastered(&self, word_id: WordId) -> bool {
        self.mastered.is_mastered(word_id).await.unwrap_or_else(|err| {
            warn!(error = %err, %word_id, "failed to check mastered word");
            false
        })
    }

    pub async fn stats(&self) -> DatabaseStats {
        let mastered_words = self.mastered.count_mastered().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to count mastered words");
            0
        });
        DatabaseStats {
            total_words: self.count_words().await,
            mastered_words,
            progress: self.load_progress().await,
        }
    }
}
