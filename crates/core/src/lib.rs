#![forbid(unsafe_code)]

pub mod error;
pub mod merge;
pub mod model;
pub mod time;

pub use error::Error;
pub use merge::merge_progress;
pub use time::Clock;
