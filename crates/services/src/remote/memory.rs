use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vocab_core::model::{MasteredWordRow, QuizResultRow, RemoteProgressRow, UserId, WordId};

use super::RemoteProgressStore;
use crate::auth::AuthUser;
use crate::error::RemoteError;

#[derive(Default)]
struct RemoteState {
    progress: HashMap<UserId, RemoteProgressRow>,
    mastered: BTreeMap<(UserId, WordId), MasteredWordRow>,
    quiz_results: Vec<QuizResultRow>,
    offline: bool,
    writes_failing: bool,
}

/// Remote store kept in process memory, with switches to simulate outages.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryRemoteStore {
    state: Arc<Mutex<RemoteState>>,
}

impl InMemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `RemoteError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }

    /// Keep reads working but fail every write with `RemoteError::Unavailable`.
    pub fn set_writes_failing(&self, failing: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.writes_failing = failing;
        }
    }

    pub fn insert_progress(&self, row: RemoteProgressRow) {
        if let Ok(mut state) = self.state.lock() {
            state.progress.insert(row.user_id, row);
        }
    }

    #[must_use]
    pub fn progress_for(&self, user_id: UserId) -> Option<RemoteProgressRow> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.progress.get(&user_id).cloned())
    }

    #[must_use]
    pub fn mastered_rows(&self) -> Vec<MasteredWordRow> {
        self.state
            .lock()
            .map(|state| state.mastered.values().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn quiz_results(&self) -> Vec<QuizResultRow> {
        self.state
            .lock()
            .map(|state| state.quiz_results.clone())
            .unwrap_or_default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut RemoteState) -> T,
    ) -> Result<T, RemoteError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RemoteError::Unavailable("remote state lock poisoned".into()))?;
        if state.offline {
            return Err(RemoteError::Unavailable("remote store is offline".into()));
        }
        Ok(f(&mut state))
    }

    fn write_state(&self, f: impl FnOnce(&mut RemoteState)) -> Result<(), RemoteError> {
        self.with_state(|state| {
            if state.writes_failing {
                return Err(RemoteError::Unavailable("remote store rejected the write".into()));
            }
            f(state);
            Ok(())
        })?
    }
}

#[async_trait]
impl RemoteProgressStore for InMemoryRemoteStore {
    async fn fetch_progress(
        &self,
        user: &AuthUser,
    ) -> Result<Option<RemoteProgressRow>, RemoteError> {
        self.with_state(|state| state.progress.get(&user.id).cloned())
    }

    async fn upsert_progress(
        &self,
        _user: &AuthUser,
        row: &RemoteProgressRow,
    ) -> Result<(), RemoteError> {
        self.write_state(|state| {
            state.progress.insert(row.user_id, row.clone());
        })
    }

    async fn upsert_mastered_words(
        &self,
        _user: &AuthUser,
        rows: &[MasteredWordRow],
    ) -> Result<(), RemoteError> {
        self.write_state(|state| {
            for row in rows {
                state
                    .mastered
                    .entry((row.user_id, row.word_id))
                    .or_insert_with(|| row.clone());
            }
        })
    }

    async fn insert_quiz_result(
        &self,
        _user: &AuthUser,
        row: &QuizResultRow,
    ) -> Result<(), RemoteError> {
        self.write_state(|state| state.quiz_results.push(row.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::time::fixed_now;

    #[tokio::test]
    async fn mastered_rows_ignore_duplicates() {
        let store = InMemoryRemoteStore::new();
        let user = AuthUser::new(UserId::random(), "token");
        let row = |word: u64, minutes: i64| MasteredWordRow {
            user_id: user.id,
            word_id: WordId::new(word),
            mastered_at: fixed_now() + chrono::Duration::minutes(minutes),
        };

        store
            .upsert_mastered_words(&user, &[row(1, 0), row(2, 0)])
            .await
            .unwrap();
        store.upsert_mastered_words(&user, &[row(1, 5)]).await.unwrap();

        let rows = store.mastered_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mastered_at, fixed_now());
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = InMemoryRemoteStore::new();
        let user = AuthUser::new(UserId::random(), "token");
        store.set_offline(true);

        assert!(matches!(
            store.fetch_progress(&user).await,
            Err(RemoteError::Unavailable(_))
        ));

        store.set_offline(false);
        assert!(store.fetch_progress(&user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_writes_keep_reads_working() {
        let store = InMemoryRemoteStore::new();
        let user = AuthUser::new(UserId::random(), "token");
        let row = RemoteProgressRow::from_record(user.id, &Default::default(), fixed_now());
        store.insert_progress(row.clone());
        store.set_writes_failing(true);

        assert_eq!(store.fetch_progress(&user).await.unwrap(), Some(row));
        let mut changed = store.progress_for(user.id).unwrap();
        changed.total_points = Some(99);
        assert!(matches!(
            store.upsert_progress(&user, &changed).await,
            Err(RemoteError::Unavailable(_))
        ));
        assert_eq!(store.progress_for(user.id).unwrap().total_points, Some(0));
    }
}
