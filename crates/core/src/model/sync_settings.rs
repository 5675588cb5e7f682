use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Validated connection settings for the remote progress store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncSettings {
    base_url: Url,
    api_key: String,
    request_timeout: Duration,
}

/// Raw, possibly-empty settings as read from the environment or flags.
#[derive(Clone, Debug, Default)]
pub struct SyncSettingsDraft {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncSettingsError {
    #[error("invalid remote base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("remote base URL is set but no API key was provided")]
    MissingApiKey,
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

impl SyncSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft.
    ///
    /// Returns `Ok(None)` when no base URL is configured, which means remote
    /// sync is disabled for this process.
    ///
    /// # Errors
    ///
    /// Returns `SyncSettingsError` if the URL does not parse, the key is
    /// missing, or the timeout is zero.
    pub fn validate(self) -> Result<Option<SyncSettings>, SyncSettingsError> {
        let Some(raw_url) = normalize_optional(self.base_url) else {
            return Ok(None);
        };
        let base_url =
            Url::parse(&raw_url).map_err(|_| SyncSettingsError::InvalidBaseUrl(raw_url.clone()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SyncSettingsError::InvalidBaseUrl(raw_url));
        }
        let api_key = normalize_optional(self.api_key).ok_or(SyncSettingsError::MissingApiKey)?;
        let timeout_secs = self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(SyncSettingsError::ZeroTimeout);
        }

        Ok(Some(SyncSettings {
            base_url,
            api_key,
            request_timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

impl SyncSettings {
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Endpoint for a table under the REST prefix, e.g. `rest/v1/user_progress`.
    #[must_use]
    pub fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_disables_sync() {
        let draft = SyncSettingsDraft {
            base_url: Some("   ".into()),
            api_key: Some("key".into()),
            request_timeout_secs: None,
        };
        assert_eq!(draft.validate().unwrap(), None);
    }

    #[test]
    fn url_without_key_is_rejected() {
        let draft = SyncSettingsDraft {
            base_url: Some("https://example.supabase.co".into()),
            ..SyncSettingsDraft::default()
        };
        assert_eq!(draft.validate(), Err(SyncSettingsError::MissingApiKey));
    }

    #[test]
    fn rejects_non_http_url() {
        let draft = SyncSettingsDraft {
            base_url: Some("ftp://example.com".into()),
            api_key: Some("key".into()),
            request_timeout_secs: None,
        };
        assert!(matches!(
            draft.validate(),
            Err(SyncSettingsError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn builds_table_urls() {
        let settings = SyncSettingsDraft {
            base_url: Some("https://example.supabase.co/".into()),
            api_key: Some(" key ".into()),
            request_timeout_secs: Some(3),
        }
        .validate()
        .unwrap()
        .unwrap();
        assert_eq!(settings.api_key(), "key");
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(
            settings.table_url("user_progress"),
            "https://example.supabase.co/rest/v1/user_progress"
        );
    }
}
