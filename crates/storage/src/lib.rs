#![forbid(unsafe_code)]

pub mod progress_store;
pub mod repository;
pub mod sqlite;

pub use progress_store::{InMemoryProgressStore, JsonFileProgressStore, ProgressStore};
pub use repository::{
    InMemoryRepository, MasteredWordRepository, ProgressMirrorRepository, Storage, StorageError,
    WordRepository,
};
