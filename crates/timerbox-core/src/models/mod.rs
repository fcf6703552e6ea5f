pub mod config;
pub mod timer;

pub use config::{Config, NotificationConfig, StorageConfig, TickConfig};
pub use timer::{
    format_hms, NewTimer, Timer, TimerStatus, TimerUpdate, MAX_DURATION_SECONDS, MAX_TITLE_LENGTH,
};
