use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use vocab_core::model::{Level, ProgressRecord, Word, WordId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository contract for the imported vocabulary.
#[async_trait]
pub trait WordRepository: Send + Sync {
    /// Insert words, skipping any whose id or headword already exists.
    ///
    /// Returns how many rows were actually inserted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be written.
    async fn insert_words(&self, words: &[Word]) -> Result<usize, StorageError>;

    /// Fetch a word by id. Returns `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_word(&self, id: WordId) -> Result<Option<Word>, StorageError>;

    /// Words of one level, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn words_by_level(&self, level: Level) -> Result<Vec<Word>, StorageError>;

    /// Words of one category, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn words_by_category(&self, category: &str) -> Result<Vec<Word>, StorageError>;

    /// Every stored word, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn all_words(&self) -> Result<Vec<Word>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_words(&self) -> Result<u64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn clear_words(&self) -> Result<(), StorageError>;
}

/// Repository contract for "mastered word" rows, unique by word id.
#[async_trait]
pub trait MasteredWordRepository: Send + Sync {
    /// Record a word as mastered. Returns `false` when it already was.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written.
    async fn mark_mastered(
        &self,
        word_id: WordId,
        mastered_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn is_mastered(&self, word_id: WordId) -> Result<bool, StorageError>;

    /// Mastered ids in the order they were recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn mastered_word_ids(&self) -> Result<Vec<WordId>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_mastered(&self) -> Result<u64, StorageError>;
}

/// Repository contract for the single mirrored progress row.
#[async_trait]
pub trait ProgressMirrorRepository: Send + Sync {
    /// Overwrite the mirrored progress row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written.
    async fn save_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError>;

    /// Returns `Ok(None)` when nothing was mirrored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures or an unreadable row.
    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    words: BTreeMap<WordId, Word>,
    mastered: Vec<(WordId, DateTime<Utc>)>,
    progress: Option<ProgressRecord>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut InMemoryState) -> T,
    ) -> Result<T, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl WordRepository for InMemoryRepository {
    async fn insert_words(&self, words: &[Word]) -> Result<usize, StorageError> {
        self.with_state(|state| {
            let mut texts: HashSet<String> =
                state.words.values().map(|w| w.word.clone()).collect();
            let mut inserted = 0;
            for word in words {
                if state.words.contains_key(&word.id) || texts.contains(&word.word) {
                    continue;
                }
                texts.insert(word.word.clone());
                state.words.insert(word.id, word.clone());
                inserted += 1;
            }
            inserted
        })
    }

    async fn get_word(&self, id: WordId) -> Result<Option<Word>, StorageError> {
        self.with_state(|state| state.words.get(&id).cloned())
    }

    async fn words_by_level(&self, level: Level) -> Result<Vec<Word>, StorageError> {
        self.with_state(|state| {
            state
                .words
                .values()
                .filter(|w| w.level == level)
                .cloned()
                .collect()
        })
    }

    async fn words_by_category(&self, category: &str) -> Result<Vec<Word>, StorageError> {
        self.with_state(|state| {
            state
                .words
                .values()
                .filter(|w| w.category == category)
                .cloned()
                .collect()
        })
    }

    async fn all_words(&self) -> Result<Vec<Word>, StorageError> {
        self.with_state(|state| state.words.values().cloned().collect())
    }

    async fn count_words(&self) -> Result<u64, StorageError> {
        self.with_state(|state| state.words.len() as u64)
    }

    async fn clear_words(&self) -> Result<(), StorageError> {
        self.with_state(|state| state.words.clear())
    }
}

#[async_trait]
impl MasteredWordRepository for InMemoryRepository {
    async fn mark_mastered(
        &self,
        word_id: WordId,
        mastered_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.with_state(|state| {
            if state.mastered.iter().any(|(id, _)| *id == word_id) {
                return false;
            }
            state.mastered.push((word_id, mastered_at));
            true
        })
    }

    async fn is_mastered(&self, word_id: WordId) -> Result<bool, StorageError> {
        self.with_state(|state| state.mastered.iter().any(|(id, _)| *id == word_id))
    }

    async fn mastered_word_ids(&self) -> Result<Vec<WordId>, StorageError> {
        self.with_state(|state| state.mastered.iter().map(|(id, _)| *id).collect())
    }

    async fn count_mastered(&self) -> Result<u64, StorageError> {
        self.with_state(|state| state.mastered.len() as u64)
    }
}

#[async_trait]
impl ProgressMirrorRepository for InMemoryRepository {
    async fn save_progress(&self, progress: &ProgressRecord) -> Result<(), StorageError> {
        self.with_state(|state| state.progress = Some(progress.clone()))
    }

    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError> {
        self.with_state(|state| state.progress.clone())
    }
}

/// Aggregates the structured local database repositories behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub words: Arc<dyn WordRepository>,
    pub mastered: Arc<dyn MasteredWordRepository>,
    pub progress: Arc<dyn ProgressMirrorRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let words: Arc<dyn WordRepository> = Arc::new(repo.clone());
        let mastered: Arc<dyn MasteredWordRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressMirrorRepository> = Arc::new(repo);
        Self {
            words,
            mastered,
            progress,
        }
    }
}
