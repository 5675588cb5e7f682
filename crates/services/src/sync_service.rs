use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vocab_core::merge_progress;
use vocab_core::model::{Level, MasteredWordRow, ProgressRecord, QuizResultRow, RemoteProgressRow, WordId};
use vocab_core::time::Clock;

use crate::auth::{AuthEvent, AuthUser};
use crate::error::SyncError;
use crate::local_db::LocalDatabase;
use crate::progress_service::ProgressService;
use crate::remote::{RemoteBackend, RemoteProgressStore};

/// Why a sync round did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    RemoteDisabled,
    SignedOut,
}

/// What one sync round did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    /// No remote row existed; the local record was uploaded as-is.
    Uploaded(ProgressRecord),
    /// Local and remote were merged and both sides now hold the result.
    Merged(ProgressRecord),
    /// A remote or local write failed; local progress is unchanged.
    Failed,
}

/// A finished quiz as reported to the remote `quiz_results` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSubmission {
    pub level: Level,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub points_earned: u32,
}

impl QuizSubmission {
    /// Rounded percentage of correct answers; 0 for an empty quiz.
    #[must_use]
    pub fn accuracy(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let total = u64::from(self.total_questions);
        let rounded = (u64::from(self.correct_answers) * 200 + total) / (2 * total);
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }
}

/// Reconciles the local record with the remote store around sign-in.
#[derive(Clone)]
pub struct SyncService {
    clock: Clock,
    progress: Arc<ProgressService>,
    local_db: Arc<LocalDatabase>,
    remote: RemoteBackend,
}

impl SyncService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<ProgressService>,
        local_db: Arc<LocalDatabase>,
        remote: RemoteBackend,
    ) -> Self {
        Self {
            clock,
            progress,
            local_db,
            remote,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.remote.is_enabled()
    }

    fn remote_for<'a>(
        &'a self,
        user: Option<&'a AuthUser>,
    ) -> Result<(&'a dyn RemoteProgressStore, &'a AuthUser), SkipReason> {
        let store = self.remote.store().ok_or(SkipReason::RemoteDisabled)?;
        let user = user.ok_or(SkipReason::SignedOut)?;
        Ok((store, user))
    }

    /// Merge local progress with the user's remote row.
    ///
    /// Never fails: remote or storage errors are logged and reported as
    /// `SyncOutcome::Failed` with local progress left as it was.
    pub async fn sync_user_progress(&self, user: Option<&AuthUser>) -> SyncOutcome {
        let (store, user) = match self.remote_for(user) {
            Ok(found) => found,
            Err(reason) => {
                debug!(?reason, "progress sync skipped");
                return SyncOutcome::Skipped(reason);
            }
        };

        match self.try_sync(store, user).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, user_id = %user.id, "progress sync failed");
                SyncOutcome::Failed
            }
        }
    }

    async fn try_sync(
        &self,
        store: &dyn RemoteProgressStore,
        user: &AuthUser,
    ) -> Result<SyncOutcome, SyncError> {
        let local = self.progress.load_for_update()?;

        let Some(remote) = store.fetch_progress(user).await? else {
            let row = RemoteProgressRow::from_record(user.id, &local, self.clock.now());
            store.upsert_progress(user, &row).await?;
            info!(user_id = %user.id, "uploaded local progress for new remote user");
            return Ok(SyncOutcome::Uploaded(local));
        };

        let unknown = remote.unknown_badges();
        if !unknown.is_empty() {
            warn!(?unknown, "ignoring remote badges missing from the catalog");
        }

        let merged = merge_progress(&local, &remote);
        let row = RemoteProgressRow::from_record(user.id, &merged, self.clock.now());
        store.upsert_progress(user, &row).await?;

        self.progress.save_progress(&merged)?;
        self.local_db.save_progress(&merged).await;

        info!(
            user_id = %user.id,
            total_points = merged.total_points,
            mastered = merged.mastered_words.len(),
            "merged progress with remote"
        );
        Ok(SyncOutcome::Merged(merged))
    }

    /// The user's remote progress on its own, without touching local state.
    pub async fn download_progress(&self, user: Option<&AuthUser>) -> Option<ProgressRecord> {
        let (store, user) = self.remote_for(user).ok()?;
        match store.fetch_progress(user).await {
            Ok(row) => row.map(|row| row.to_record()),
            Err(err) => {
                warn!(error = %err, user_id = %user.id, "failed to download progress");
                None
            }
        }
    }

    /// Push mastered words to the remote log. Returns whether the write landed.
    pub async fn sync_mastered_words(&self, user: Option<&AuthUser>, word_ids: &[WordId]) -> bool {
        let Ok((store, user)) = self.remote_for(user) else {
            return false;
        };
        let mastered_at = self.clock.now();
        let rows: Vec<MasteredWordRow> = word_ids
            .iter()
            .map(|&word_id| MasteredWordRow {
                user_id: user.id,
                word_id,
                mastered_at,
            })
            .collect();

        match store.upsert_mastered_words(user, &rows).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, user_id = %user.id, "failed to sync mastered words");
                false
            }
        }
    }

    /// Append a quiz result to the remote log. Returns whether the write landed.
    pub async fn sync_quiz_result(
        &self,
        user: Option<&AuthUser>,
        submission: &QuizSubmission,
    ) -> bool {
        let Ok((store, user)) = self.remote_for(user) else {
            return false;
        };
        let row = QuizResultRow {
            user_id: user.id,
            level: submission.level,
            total_questions: submission.total_questions,
            correct_answers: submission.correct_answers,
            accuracy: submission.accuracy(),
            points_earned: submission.points_earned,
            completed_at: self.clock.now(),
        };

        match store.insert_quiz_result(user, &row).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, user_id = %user.id, "failed to sync quiz result");
                false
            }
        }
    }

    /// Sync on every sign-in or restored session until the sender is dropped.
    ///
    /// Returns the outcome of each sync attempt, in order.
    pub async fn run_auth_listener(
        &self,
        mut events: mpsc::Receiver<AuthEvent>,
    ) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        while let Some(event) = events.recv().await {
            match event.user() {
                Some(user) => outcomes.push(self.sync_user_progress(Some(user)).await),
                None => debug!("signed out, nothing to sync"),
            }
        }
        outcomes
    }
}
