use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use storage::repository::{MasteredWordRepository, ProgressMirrorRepository, WordRepository};
use storage::repository::Storage;
use storage::sqlite::{SqliteRepository, sqlite_url};
use vocab_core::model::{BadgeId, Level, ProgressRecord, ProgressStats, Word, WordId};
use vocab_core::time::fixed_now;

fn build_word(id: u64, text: &str, level: Level, category: &str) -> Word {
    Word {
        id: WordId::new(id),
        word: text.to_string(),
        pronunciation: Some(format!("/{text}/")),
        part_of_speech: Some("noun".into()),
        definition: format!("The meaning of {text}"),
        example: None,
        meaning: None,
        example_translation: None,
        level,
        category: category.to_string(),
    }
}

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_storage_creates_missing_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh/vocab.sqlite3");
    assert!(!path.exists());

    let url = sqlite_url(path.to_str().unwrap()).unwrap();
    let storage = Storage::sqlite(&url).await.expect("open fresh database");

    assert!(path.is_file());
    assert!(storage.words.all_words().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_import_skips_duplicate_headwords() {
    let repo = connect("memdb_import").await;

    let inserted = repo
        .insert_words(&[
            build_word(1, "apple", Level::A1, "food"),
            build_word(2, "issue", Level::B1, "general"),
        ])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let inserted = repo
        .insert_words(&[
            build_word(3, "apple", Level::A2, "food"),
            build_word(4, "bread", Level::A1, "food"),
        ])
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(repo.count_words().await.unwrap(), 3);

    let a1 = repo.words_by_level(Level::A1).await.unwrap();
    let texts: Vec<_> = a1.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(texts, vec!["apple", "bread"]);

    let food = repo.words_by_category("food").await.unwrap();
    assert_eq!(food.len(), 2);

    let fetched = repo.get_word(WordId::new(2)).await.unwrap().expect("word");
    assert_eq!(fetched.level, Level::B1);
    assert_eq!(fetched.pronunciation.as_deref(), Some("/issue/"));
    assert!(repo.get_word(WordId::new(99)).await.unwrap().is_none());

    repo.clear_words().await.unwrap();
    assert_eq!(repo.count_words().await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_mastered_words_are_unique() {
    let repo = connect("memdb_mastered").await;
    let now = fixed_now();

    assert!(repo.mark_mastered(WordId::new(7), now).await.unwrap());
    assert!(repo.mark_mastered(WordId::new(3), now + Duration::minutes(1)).await.unwrap());
    assert!(!repo.mark_mastered(WordId::new(7), now + Duration::minutes(2)).await.unwrap());

    assert_eq!(
        repo.mastered_word_ids().await.unwrap(),
        vec![WordId::new(7), WordId::new(3)]
    );
    assert_eq!(repo.count_mastered().await.unwrap(), 2);
    assert!(repo.is_mastered(WordId::new(3)).await.unwrap());
    assert!(!repo.is_mastered(WordId::new(4)).await.unwrap());
}

#[tokio::test]
async fn sqlite_progress_mirror_overwrites_single_row() {
    let repo = connect("memdb_progress").await;
    assert!(repo.load_progress().await.unwrap().is_none());

    let first = ProgressRecord {
        level: Level::A2,
        total_points: 120,
        streak: 3,
        last_study_date: NaiveDate::from_ymd_opt(2024, 2, 29),
        mastered_words: BTreeSet::from([WordId::new(1), WordId::new(5)]),
        badges: BTreeSet::from([BadgeId::FirstWord]),
        stats: ProgressStats {
            words_learned: 2,
            quizzes_taken: 1,
            correct_answers: 4,
            total_answers: 5,
        },
    };
    repo.save_progress(&first).await.unwrap();
    assert_eq!(repo.load_progress().await.unwrap(), Some(first.clone()));

    let second = ProgressRecord {
        total_points: 500,
        badges: BTreeSet::from([BadgeId::FirstWord, BadgeId::Points500]),
        ..first
    };
    repo.save_progress(&second).await.unwrap();
    assert_eq!(repo.load_progress().await.unwrap(), Some(second));
}
