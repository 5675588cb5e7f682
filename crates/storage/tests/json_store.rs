use std::fs;

use storage::{JsonFileProgressStore, ProgressStore, StorageError};
use vocab_core::model::{Level, ProgressRecord, WordId};

#[test]
fn missing_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileProgressStore::new(dir.path().join("progress.json"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_creates_parent_dirs_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileProgressStore::new(dir.path().join("nested/state/progress.json"));

    let mut record = ProgressRecord {
        level: Level::B2,
        total_points: 75,
        ..ProgressRecord::default()
    };
    record.mastered_words.insert(WordId::new(11));
    store.save(&record).unwrap();

    assert_eq!(store.load().unwrap(), Some(record));
    assert!(!dir.path().join("nested/state/progress.json.tmp").exists());

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"totalPoints\": 75"));
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonFileProgressStore::new(&path);
    assert!(matches!(store.load(), Err(StorageError::Serialization(_))));
}

#[test]
fn clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileProgressStore::new(dir.path().join("progress.json"));
    store.save(&ProgressRecord::default()).unwrap();

    store.clear().unwrap();
    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
}
