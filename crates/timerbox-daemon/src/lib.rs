//! Timerbox runtime library
//!
//! Timer store, tick driver and notification plumbing, exposed as a library
//! for the `timerbox` binary and for testing.

pub mod config;
pub mod event_manager;
pub mod notifier;
pub mod store;
pub mod timer;

pub use config::ConfigManager;
pub use event_manager::EventManager;
pub use notifier::{BellNotifier, DesktopNotifier, LogNotifier, MultiNotifier, StderrNotifier};
pub use store::{EventObserver, PersistObserver, StoreChange, StoreObserver, TimerStore};
pub use timer::{TickDriver, TickHandle, TimerEvent, TimerEventType};
