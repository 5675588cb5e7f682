mod badge;
mod ids;
mod lenient;
mod level;
mod progress;
mod remote;
mod sync_settings;
mod word;

pub use ids::{ParseIdError, UserId, WordId};

pub use badge::{BADGES, Badge, BadgeId, BadgeRule, BadgeStatus, UnknownBadge, satisfied_badges};
pub use level::{Level, LevelParseError};
pub use progress::{ProgressRecord, ProgressStats, ProgressSummary};
pub use remote::{MasteredWordRow, QuizResultRow, RemoteProgressRow};
pub use sync_settings::{SyncSettings, SyncSettingsDraft, SyncSettingsError};
pub use word::{LevelSection, VocabularyDataset, Word};
