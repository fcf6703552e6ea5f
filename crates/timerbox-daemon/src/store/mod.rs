pub mod manager;
pub mod observer;

pub use manager::TimerStore;
pub use observer::{EventObserver, PersistObserver, StoreChange, StoreObserver};
