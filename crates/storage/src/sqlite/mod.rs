use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{
    MasteredWordRepository, ProgressMirrorRepository, Storage, WordRepository,
};

mod mapping;
mod mastered_repo;
mod migrate;
mod progress_repo;
mod word_repo;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://vocab.sqlite3";

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid database URL: {raw}")]
    InvalidUrl { raw: String },

    #[error("cannot prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Turn a user-supplied database location into a `SQLite` URL that creates
/// the file on first use.
///
/// Accepts bare paths as well as `sqlite:` URLs; in-memory URLs pass through.
/// An explicit query string is kept as given.
///
/// # Errors
///
/// Returns `SqliteInitError` for an empty path or when the parent directory
/// cannot be created.
pub fn sqlite_url(raw: &str) -> Result<String, SqliteInitError> {
    let raw = raw.trim();
    if raw.starts_with("sqlite::memory:") || raw.contains("mode=memory") {
        return Ok(raw.to_string());
    }

    let rest = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    if path.is_empty() {
        return Err(SqliteInitError::InvalidUrl {
            raw: raw.to_string(),
        });
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    Ok(match query {
        Some(query) => format!("sqlite://{path}?{query}"),
        None => format!("sqlite://{path}?mode=rwc"),
    })
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or if
    /// the connection pragmas fail during setup.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let words: Arc<dyn WordRepository> = Arc::new(repo.clone());
        let mastered: Arc<dyn MasteredWordRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressMirrorRepository> = Arc::new(repo);
        Ok(Self {
            words,
            mastered,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[test]
    fn sqlite_url_creates_parent_and_file_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/vocab.sqlite3");
        let url = sqlite_url(path.to_str().unwrap()).unwrap();

        assert_eq!(url, format!("sqlite://{}?mode=rwc", path.display()));
        assert!(dir.path().join("data").is_dir());
        assert_eq!(sqlite_url("sqlite::memory:").unwrap(), "sqlite::memory:");
        let with_query = format!("sqlite://{}?mode=ro", path.display());
        assert_eq!(sqlite_url(&with_query).unwrap(), with_query);
        assert!(matches!(
            sqlite_url("sqlite://"),
            Err(SqliteInitError::InvalidUrl { .. })
        ));
    }
}
