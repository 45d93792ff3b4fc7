#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::terminal::HourFormat;
use crate::core::engine::EngineSettings;
use crate::domain::model::MissedAlarmPolicy;
use crate::domain::time_of_day::TimeOfDay;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};
use std::time::Duration;
use self::toml_config::{
    TomlConfig, MAX_SNOOZE_MINUTES, MAX_TICK_PERIOD_MS, MIN_SNOOZE_MINUTES, MIN_TICK_PERIOD_MS,
};

/// Settings after merging the optional TOML file with command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub tick_period_ms: u64,
    pub snooze_minutes: u32,
    pub missed_alarms: MissedAlarmPolicy,
    pub hour_format: HourFormat,
    pub show_clock: bool,
    pub json_events: bool,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub verbose: bool,
    pub initial_alarms: Vec<TimeOfDay>,
}

impl AppConfig {
    pub fn from_toml(file: TomlConfig) -> Self {
        Self {
            tick_period_ms: file.scheduler.tick_period_ms,
            snooze_minutes: file.scheduler.snooze_minutes,
            missed_alarms: file.scheduler.missed_alarms,
            hour_format: file.display.hour_format,
            show_clock: file.display.show_clock,
            json_events: file.display.json_events,
            log_level: file.logging.level,
            log_json: file.logging.json,
            verbose: false,
            initial_alarms: Vec::new(),
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            tick_period: Duration::from_millis(self.tick_period_ms),
            snooze_seconds: self.snooze_minutes * 60,
            missed_alarms: self.missed_alarms,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_range(
            "tick_period_ms",
            self.tick_period_ms,
            MIN_TICK_PERIOD_MS,
            MAX_TICK_PERIOD_MS,
        )?;
        validate_range(
            "snooze_minutes",
            self.snooze_minutes,
            MIN_SNOOZE_MINUTES,
            MAX_SNOOZE_MINUTES,
        )?;
        Ok(())
    }
}
