pub mod driver;
pub mod events;

pub use driver::{PulseOutcome, TickDriver, TickDriverError, TickHandle};
pub use events::{TimerEvent, TimerEventType};
