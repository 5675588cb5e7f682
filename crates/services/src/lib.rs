#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod error;
pub mod local_db;
pub mod progress_service;
pub mod remote;
pub mod sync_service;

pub use vocab_core::Clock;

pub use app_services::AppServices;
pub use auth::{AuthEvent, AuthProvider, AuthUser, StaticSession};
pub use error::{AppServicesError, ProgressError, RemoteError, SyncError};
pub use local_db::{DatabaseStats, LocalDatabase};
pub use progress_service::{ProgressService, QuizOutcome, check_badges, quiz_points};
pub use remote::{InMemoryRemoteStore, RemoteBackend, RemoteProgressStore, RestRemoteStore};
pub use sync_service::{QuizSubmission, SkipReason, SyncOutcome, SyncService};
