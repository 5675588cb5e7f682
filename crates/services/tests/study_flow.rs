use std::sync::Arc;

use services::{
    AppServices, AuthEvent, AuthUser, Clock, InMemoryRemoteStore, RemoteBackend, SkipReason, StaticSession,
    SyncOutcome,
};
use storage::repository::Storage;
use storage::InMemoryProgressStore;
use vocab_core::model::{BadgeId, Level, ProgressRecord, UserId, WordId};
use vocab_core::time::fixed_now;

#[tokio::test]
async fn sqlite_backed_flows_persist_and_mirror() {
    let dir = tempfile::tempdir().expect("tempdir");
    let progress_path = dir.path().join("progress.json");
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_study_flow?mode=memory&cache=shared",
        &progress_path,
        Clock::fixed(fixed_now()),
        None,
        Arc::new(StaticSession::signed_out()),
    )
    .await
    .expect("services");

    services.master_word(WordId::new(3)).await.expect("master");
    services.master_word(WordId::new(3)).await.expect("master again");
    let outcome = services.finish_quiz(4, 5).await.expect("quiz");
    services.study_today().await.expect("streak");
    let progress = services.level_up(Level::A2).await.expect("level up");

    assert_eq!(outcome.points, 36);
    assert_eq!(progress.stats.words_learned, 1);
    assert_eq!(progress.streak, 1);
    assert_eq!(progress.total_points, 10 + 36 + 100);
    assert!(progress.has_badge(BadgeId::FirstWord));
    assert!(progress_path.exists());

    let db = services.local_db();
    assert_eq!(db.mastered_word_ids().await, vec![WordId::new(3)]);
    assert_eq!(db.load_progress().await, Some(progress.clone()));
    assert_eq!(services.progress().get_progress(), progress);

    assert_eq!(
        services.sync_now().await,
        SyncOutcome::Skipped(SkipReason::RemoteDisabled)
    );

    let reset = services.reset_progress().await.expect("reset");
    assert_eq!(reset, ProgressRecord::default());
    assert_eq!(services.progress().get_progress(), ProgressRecord::default());
    assert!(!progress_path.exists());
}

#[tokio::test]
async fn signed_in_flows_push_logs_to_remote() {
    let user = AuthUser::new(UserId::random(), "token");
    let remote = InMemoryRemoteStore::new();
    let services = AppServices::from_parts(
        Clock::fixed(fixed_now()),
        Arc::new(InMemoryProgressStore::new()),
        &Storage::in_memory(),
        RemoteBackend::enabled(remote.clone()),
        Arc::new(StaticSession::new(Some(user.clone()))),
    );

    services.master_word(WordId::new(8)).await.expect("master");
    services.master_word(WordId::new(8)).await.expect("master again");
    services.finish_quiz(3, 4).await.expect("quiz");

    let mastered = remote.mastered_rows();
    assert_eq!(mastered.len(), 1);
    assert_eq!(mastered[0].word_id, WordId::new(8));
    assert_eq!(mastered[0].user_id, user.id);

    let quizzes = remote.quiz_results();
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].correct_answers, 3);
    assert_eq!(quizzes[0].total_questions, 4);
    assert_eq!(quizzes[0].accuracy, 75);
    assert_eq!(quizzes[0].points_earned, 26);

    let SyncOutcome::Uploaded(uploaded) = services.sync_now().await else {
        panic!("expected first sync to upload");
    };
    assert_eq!(uploaded.total_points, 10 + 26);
    assert_eq!(
        remote.progress_for(user.id).and_then(|row| row.total_points),
        Some(36)
    );
}

#[tokio::test]
async fn restored_session_syncs_once_at_startup() {
    let user = AuthUser::new(UserId::random(), "token");
    let session = StaticSession::new(Some(user.clone()));
    let remote = InMemoryRemoteStore::new();
    let services = AppServices::from_parts(
        Clock::fixed(fixed_now()),
        Arc::new(InMemoryProgressStore::new()),
        &Storage::in_memory(),
        RemoteBackend::enabled(remote.clone()),
        Arc::new(session.clone()),
    );
    services.add_points(15).await.expect("points");

    let outcome = services.handle_auth_event(&session.initial_event()).await;
    assert!(matches!(outcome, Some(SyncOutcome::Uploaded(_))));
    assert_eq!(
        remote.progress_for(user.id).and_then(|row| row.total_points),
        Some(15)
    );

    assert_eq!(services.handle_auth_event(&AuthEvent::SignedOut).await, None);
    assert_eq!(
        services
            .handle_auth_event(&StaticSession::signed_out().initial_event())
            .await,
        None
    );
}

#[tokio::test]
async fn rejected_quiz_is_not_reported() {
    let remote = InMemoryRemoteStore::new();
    let services = AppServices::from_parts(
        Clock::fixed(fixed_now()),
        Arc::new(InMemoryProgressStore::new()),
        &Storage::in_memory(),
        RemoteBackend::enabled(remote.clone()),
        Arc::new(StaticSession::new(Some(AuthUser::new(UserId::random(), "t")))),
    );

    assert!(services.finish_quiz(0, 0).await.is_err());
    assert!(remote.quiz_results().is_empty());
    assert_eq!(services.local_db().load_progress().await, None);
}
