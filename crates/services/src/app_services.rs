use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;
use storage::{JsonFileProgressStore, ProgressStore};
use vocab_core::model::{Level, ProgressRecord, SyncSettings, WordId};

use crate::auth::{AuthEvent, AuthProvider, AuthUser};
use crate::error::{AppServicesError, ProgressError};
use crate::local_db::LocalDatabase;
use crate::progress_service::{ProgressService, QuizOutcome};
use crate::remote::RemoteBackend;
use crate::sync_service::{QuizSubmission, SyncOutcome, SyncService};
use crate::Clock;

/// Assembles the app-facing services and runs the study flows that touch
/// more than one of them.
///
/// Every progress mutation lands in the progress store first, then in the
/// database mirror, then (when signed in) in the remote logs.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressService>,
    local_db: Arc<LocalDatabase>,
    sync: Arc<SyncService>,
    auth: Arc<dyn AuthProvider>,
}

impl AppServices {
    /// Build services backed by `SQLite` and a JSON progress file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the HTTP
    /// client for the remote store cannot be built.
    pub async fn new_sqlite(
        db_url: &str,
        progress_path: &Path,
        clock: Clock,
        sync_settings: Option<SyncSettings>,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let store: Arc<dyn ProgressStore> = Arc::new(JsonFileProgressStore::new(progress_path));
        let remote = RemoteBackend::from_settings(sync_settings)?;
        Ok(Self::from_parts(clock, store, &storage, remote, auth))
    }

    #[must_use]
    pub fn from_parts(
        clock: Clock,
        store: Arc<dyn ProgressStore>,
        storage: &Storage,
        remote: RemoteBackend,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let progress = Arc::new(ProgressService::new(clock, store));
        let local_db = Arc::new(LocalDatabase::new(clock, storage));
        let sync = Arc::new(SyncService::new(
            clock,
            Arc::clone(&progress),
            Arc::clone(&local_db),
            remote,
        ));
        Self {
            progress,
            local_db,
            sync,
            auth,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn local_db(&self) -> Arc<LocalDatabase> {
        Arc::clone(&self.local_db)
    }

    #[must_use]
    pub fn sync(&self) -> Arc<SyncService> {
        Arc::clone(&self.sync)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user()
    }

    //
    // ─── STUDY FLOWS ───────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the progress record cannot be persisted.
    pub async fn master_word(&self, word_id: WordId) -> Result<ProgressRecord, ProgressError> {
        let already = self.progress.get_progress().has_mastered(word_id);
        let progress = self.progress.mark_word_as_mastered(word_id)?;
        self.local_db.mark_mastered(word_id).await;
        self.local_db.save_progress(&progress).await;
        if !already {
            let user = self.current_user();
            self.sync.sync_mastered_words(user.as_ref(), &[word_id]).await;
        }
        Ok(progress)
    }

    /// # Errors
    ///
    /// Returns the `ProgressError` from
    /// [`ProgressService::record_quiz_result`].
    pub async fn finish_quiz(&self, correct: u32, total: u32) -> Result<QuizOutcome, ProgressError> {
        let outcome = self.progress.record_quiz_result(correct, total)?;
        self.local_db.save_progress(&outcome.progress).await;

        let submission = QuizSubmission {
            level: outcome.progress.level,
            total_questions: total,
            correct_answers: correct,
            points_earned: outcome.points,
        };
        let user = self.current_user();
        self.sync.sync_quiz_result(user.as_ref(), &submission).await;
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the progress record cannot be persisted.
    pub async fn study_today(&self) -> Result<ProgressRecord, ProgressError> {
        let progress = self.progress.update_streak()?;
        self.local_db.save_progress(&progress).await;
        Ok(progress)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the progress record cannot be persisted.
    pub async fn level_up(&self, level: Level) -> Result<ProgressRecord, ProgressError> {
        let progress = self.progress.level_up(level)?;
        self.local_db.save_progress(&progress).await;
        Ok(progress)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the progress record cannot be persisted.
    pub async fn add_points(&self, points: u32) -> Result<ProgressRecord, ProgressError> {
        let progress = self.progress.add_points(points)?;
        self.local_db.save_progress(&progress).await;
        Ok(progress)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the stored record cannot be removed.
    pub async fn reset_progress(&self) -> Result<ProgressRecord, ProgressError> {
        let progress = self.progress.reset_progress()?;
        self.local_db.save_progress(&progress).await;
        Ok(progress)
    }

    /// Sync with the remote store for the current session, if any.
    pub async fn sync_now(&self) -> SyncOutcome {
        let user = self.current_user();
        self.sync.sync_user_progress(user.as_ref()).await
    }

    pub async fn handle_auth_event(&self, event: &AuthEvent) -> Option<SyncOutcome> {
        let user = event.user()?;
        Some(self.sync.sync_user_progress(Some(user)).await)
    }
}
