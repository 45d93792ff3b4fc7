pub mod countdown;
pub mod engine;
pub mod registry;
pub mod scheduler;
pub mod stopwatch;

pub use crate::domain::model::{AlarmChoice, ClockEvent, Command, CommandOutcome};
pub use crate::domain::ports::{Clock, Notifier};
pub use crate::domain::time_of_day::TimeOfDay;
pub use crate::utils::error::Result;
