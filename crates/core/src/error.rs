use thiserror::Error;

use crate::model::{LevelParseError, ParseIdError, SyncSettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Level(#[from] LevelParseError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    SyncSettings(#[from] SyncSettingsError),
}
