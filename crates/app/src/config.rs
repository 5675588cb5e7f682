use std::env;
use std::fmt;
use std::path::PathBuf;

use services::{AuthUser, StaticSession};
use storage::sqlite::DEFAULT_DATABASE_URL;
use vocab_core::model::{SyncSettings, SyncSettingsDraft, UserId};

pub const DEFAULT_PROGRESS_FILE: &str = "progress.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug)]
pub enum ConfigError {
    Invalid {
        var: &'static str,
        source: vocab_core::Error,
    },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { var, source } => write!(f, "invalid {var}: {source}"),
            ConfigError::InvalidTimeout { raw } => {
                write!(f, "invalid VOCAB_REMOTE_TIMEOUT_SECS value: {raw}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the binary reads from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_url: String,
    pub progress_path: PathBuf,
    pub sync: Option<SyncSettings>,
    pub user: Option<AuthUser>,
    pub log_filter: String,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` when a set variable holds an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let request_timeout_secs = match lookup("VOCAB_REMOTE_TIMEOUT_SECS") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout { raw })?,
            ),
            None => None,
        };
        let api_key = lookup("VOCAB_REMOTE_KEY");
        let sync = SyncSettingsDraft {
            base_url: lookup("VOCAB_REMOTE_URL"),
            api_key: api_key.clone(),
            request_timeout_secs,
        }
        .validate()
        .map_err(|err| ConfigError::Invalid {
            var: "VOCAB_REMOTE_URL",
            source: err.into(),
        })?;

        let user = match lookup("VOCAB_USER_ID").filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => {
                let id = raw
                    .trim()
                    .parse::<UserId>()
                    .map_err(|err| ConfigError::Invalid {
                        var: "VOCAB_USER_ID",
                        source: err.into(),
                    })?;
                let token = lookup("VOCAB_ACCESS_TOKEN")
                    .or(api_key)
                    .unwrap_or_default();
                Some(AuthUser::new(id, token))
            }
            None => None,
        };

        Ok(Self {
            db_url: lookup("VOCAB_DB_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            progress_path: lookup("VOCAB_PROGRESS_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_PROGRESS_FILE), PathBuf::from),
            sync,
            user,
            log_filter: lookup("VOCAB_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }

    #[must_use]
    pub fn session(&self) -> StaticSession {
        StaticSession::new(self.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use vocab_core::model::SyncSettingsError;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_disable_sync() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.progress_path, PathBuf::from(DEFAULT_PROGRESS_FILE));
        assert!(config.sync.is_none());
        assert!(config.user.is_none());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn access_token_falls_back_to_api_key() {
        let config = config(&[
            ("VOCAB_REMOTE_URL", "https://example.supabase.co"),
            ("VOCAB_REMOTE_KEY", "anon"),
            ("VOCAB_USER_ID", "0b7e6f53-8f5c-4d3f-9a41-5a0f0f6c2b11"),
        ])
        .unwrap();

        let sync = config.sync.expect("sync enabled");
        assert_eq!(
            sync.table_url("user_progress"),
            "https://example.supabase.co/rest/v1/user_progress"
        );
        assert_eq!(config.user.expect("user").access_token(), "anon");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("VOCAB_USER_ID", "not-a-uuid")]),
            Err(ConfigError::Invalid {
                var: "VOCAB_USER_ID",
                ..
            })
        ));
        assert!(matches!(
            config(&[("VOCAB_REMOTE_URL", "https://example.com")]),
            Err(ConfigError::Invalid {
                source: vocab_core::Error::SyncSettings(SyncSettingsError::MissingApiKey),
                ..
            })
        ));
        assert!(matches!(
            config(&[("VOCAB_REMOTE_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidTimeout { .. })
        ));
    }
}
