use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Level, WordId};

/// A vocabulary entry as shipped in the dataset and stored locally.
///
/// The progress subsystem only ever references words by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: WordId,
    pub word: String,
    #[serde(default)]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    /// Translation of the headword into the learner's language.
    #[serde(default, alias = "meaning_cn")]
    pub meaning: Option<String>,
    #[serde(default)]
    pub example_translation: Option<String>,
    pub level: Level,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

impl Word {
    /// Case-insensitive substring match across headword, definition and meaning.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.word.to_lowercase().contains(needle)
            || self.definition.to_lowercase().contains(needle)
            || self
                .meaning
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains(needle))
    }
}

/// One level's section of the vocabulary dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub words: Vec<Word>,
}

/// Static vocabulary dataset keyed by level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyDataset {
    pub levels: BTreeMap<Level, LevelSection>,
}

impl VocabularyDataset {
    #[must_use]
    pub fn words_for(&self, level: Level) -> &[Word] {
        self.levels
            .get(&level)
            .map_or(&[], |section| section.words.as_slice())
    }

    /// All words in level order.
    #[must_use]
    pub fn into_words(self) -> Vec<Word> {
        self.levels
            .into_values()
            .flat_map(|section| section.words)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.values().map(|s| s.words.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
