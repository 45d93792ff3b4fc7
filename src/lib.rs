pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::clock::{ManualClock, SystemClock};
pub use crate::adapters::terminal::{TerminalNotifier, TerminalPresenter};
pub use crate::config::AppConfig;
pub use crate::core::engine::{ClockEngine, EngineHandle, EngineSettings};
pub use crate::domain::model::{AlarmChoice, ClockEvent, Command, CommandOutcome, MissedAlarmPolicy};
pub use crate::domain::time_of_day::TimeOfDay;
pub use crate::utils::error::{ClockError, Result};
