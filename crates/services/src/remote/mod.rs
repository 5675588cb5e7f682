//! Remote progress store used by sync.

use std::sync::Arc;

use async_trait::async_trait;

use vocab_core::model::{MasteredWordRow, QuizResultRow, RemoteProgressRow, SyncSettings};

use crate::auth::AuthUser;
use crate::error::RemoteError;

mod memory;
mod rest;

pub use memory::InMemoryRemoteStore;
pub use rest::RestRemoteStore;

/// Per-user tables of the hosted backend.
#[async_trait]
pub trait RemoteProgressStore: Send + Sync {
    /// Fetch the user's progress row.
    ///
    /// A user without a row yet is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the request fails or the response cannot be decoded.
    async fn fetch_progress(&self, user: &AuthUser)
    -> Result<Option<RemoteProgressRow>, RemoteError>;

    /// Insert or replace the row keyed by `row.user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the request fails.
    async fn upsert_progress(
        &self,
        user: &AuthUser,
        row: &RemoteProgressRow,
    ) -> Result<(), RemoteError>;

    /// Insert mastered-word rows, ignoring `(user_id, word_id)` pairs that exist.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the request fails.
    async fn upsert_mastered_words(
        &self,
        user: &AuthUser,
        rows: &[MasteredWordRow],
    ) -> Result<(), RemoteError>;

    /// Append one quiz result.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the request fails.
    async fn insert_quiz_result(
        &self,
        user: &AuthUser,
        row: &QuizResultRow,
    ) -> Result<(), RemoteError>;
}

/// Whether this process talks to a remote store at all.
///
/// Decided once at startup; a disabled backend turns every sync into a no-op.
#[derive(Clone, Default)]
pub enum RemoteBackend {
    #[default]
    Disabled,
    Enabled(Arc<dyn RemoteProgressStore>),
}

impl RemoteBackend {
    /// Build the REST backend when settings are present.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Http` if the HTTP client cannot be built.
    pub fn from_settings(settings: Option<SyncSettings>) -> Result<Self, RemoteError> {
        match settings {
            Some(settings) => Ok(Self::enabled(RestRemoteStore::new(settings)?)),
            None => Ok(Self::Disabled),
        }
    }

    #[must_use]
    pub fn enabled(store: impl RemoteProgressStore + 'static) -> Self {
        Self::Enabled(Arc::new(store))
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    #[must_use]
    pub fn store(&self) -> Option<&dyn RemoteProgressStore> {
        match self {
            Self::Enabled(store) => Some(store.as_ref()),
            Self::Disabled => None,
        }
    }
}
