use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;

use vocab_core::model::{MasteredWordRow, QuizResultRow, RemoteProgressRow, SyncSettings};

use super::RemoteProgressStore;
use crate::auth::AuthUser;
use crate::error::RemoteError;

const PROGRESS_TABLE: &str = "user_progress";
const MASTERED_TABLE: &str = "user_mastered_words";
const QUIZ_TABLE: &str = "quiz_results";

/// Talks to a PostgREST-style endpoint (`{base}/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestRemoteStore {
    client: Client,
    settings: SyncSettings,
}

impl RestRemoteStore {
    /// # Errors
    ///
    /// Returns `RemoteError::Http` if the HTTP client cannot be built.
    pub fn new(settings: SyncSettings) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self { client, settings })
    }

    fn get(&self, table: &str, user: &AuthUser) -> RequestBuilder {
        self.authorize(self.client.get(self.settings.table_url(table)), user)
    }

    fn post(&self, table: &str, user: &AuthUser) -> RequestBuilder {
        self.authorize(self.client.post(self.settings.table_url(table)), user)
    }

    fn authorize(&self, request: RequestBuilder, user: &AuthUser) -> RequestBuilder {
        request
            .header("apikey", self.settings.api_key())
            .bearer_auth(user.access_token())
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        request: RequestBuilder,
        prefer: &str,
        body: &T,
    ) -> Result<(), RemoteError> {
        let response = request.header("Prefer", prefer).json(body).send().await?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, RemoteError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(RemoteError::HttpStatus(response.status()))
    }
}

#[async_trait]
impl RemoteProgressStore for RestRemoteStore {
    async fn fetch_progress(
        &self,
        user: &AuthUser,
    ) -> Result<Option<RemoteProgressRow>, RemoteError> {
        let user_filter = format!("eq.{}", user.id);
        let response = self
            .get(PROGRESS_TABLE, user)
            .query(&[("select", "*"), ("user_id", user_filter.as_str())])
            .send()
            .await?;

        // A filtered select returns an array; an empty one means a new user.
        let rows: Vec<RemoteProgressRow> = check_status(response)?.json().await?;
        debug!(user_id = %user.id, found = !rows.is_empty(), "fetched remote progress");
        Ok(rows.into_iter().next())
    }

    async fn upsert_progress(
        &self,
        user: &AuthUser,
        row: &RemoteProgressRow,
    ) -> Result<(), RemoteError> {
        let request = self
            .post(PROGRESS_TABLE, user)
            .query(&[("on_conflict", "user_id")]);
        self.write(request, "resolution=merge-duplicates,return=minimal", row)
            .await
    }

    async fn upsert_mastered_words(
        &self,
        user: &AuthUser,
        rows: &[MasteredWordRow],
    ) -> Result<(), RemoteError> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .post(MASTERED_TABLE, user)
            .query(&[("on_conflict", "user_id,word_id")]);
        self.write(request, "resolution=ignore-duplicates,return=minimal", rows)
            .await
    }

    async fn insert_quiz_result(
        &self,
        user: &AuthUser,
        row: &QuizResultRow,
    ) -> Result<(), RemoteError> {
        self.write(self.post(QUIZ_TABLE, user), "return=minimal", row)
            .await
    }
}
