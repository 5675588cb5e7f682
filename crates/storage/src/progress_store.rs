//! The local progress store: one JSON record under one key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use vocab_core::model::ProgressRecord;

use crate::repository::StorageError;

/// Synchronous key-value slot holding the serialized progress record.
///
/// Reads and writes complete before returning, so a mutation is durable by
/// the time the caller sees the updated record.
pub trait ProgressStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for an unreadable record and
    /// `StorageError::Io` when the slot cannot be read.
    fn load(&self) -> Result<Option<ProgressRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    fn save(&self, progress: &ProgressRecord) -> Result<(), StorageError>;

    /// Remove the stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot exists but cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Stores the record as pretty-printed JSON in a single file.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileProgressStore {
    path: PathBuf,
}

impl JsonFileProgressStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn load(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn save(&self, progress: &ProgressRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(progress)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressStore {
    slot: Arc<Mutex<Option<ProgressRecord>>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(progress: ProgressRecord) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(progress))),
        }
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, progress: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(progress.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}
