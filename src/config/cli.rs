use crate::config::toml_config::TomlConfig;
use crate::config::AppConfig;
use crate::domain::model::MissedAlarmPolicy;
use crate::domain::time_of_day::TimeOfDay;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tick-clock")]
#[command(about = "Alarms, a live clock, a countdown timer and a stopwatch in the terminal")]
pub struct CliConfig {
    /// Path to an optional TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Print events and command results as JSON lines
    #[arg(long)]
    pub json_events: bool,

    /// How often the clock is sampled for alarms, in milliseconds (10-1000)
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Minutes added by a snooze
    #[arg(long)]
    pub snooze_minutes: Option<u32>,

    /// Fire alarms whose second was skipped (e.g. after a suspend)
    #[arg(long)]
    pub catch_up: bool,

    /// Print the live clock every tick
    #[arg(long)]
    pub show_clock: bool,

    /// Alarm to set at startup (repeatable), e.g. --alarm "07:30:00 AM"
    #[arg(long = "alarm")]
    pub alarms: Vec<TimeOfDay>,
}

impl CliConfig {
    /// 載入設定檔後套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<AppConfig> {
        let file = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                file
            }
            None => TomlConfig::default(),
        };

        let mut config = AppConfig::from_toml(file);
        if let Some(tick_ms) = self.tick_ms {
            config.tick_period_ms = tick_ms;
        }
        if let Some(snooze_minutes) = self.snooze_minutes {
            config.snooze_minutes = snooze_minutes;
        }
        if self.catch_up {
            config.missed_alarms = MissedAlarmPolicy::CatchUp;
        }
        config.show_clock |= self.show_clock;
        config.json_events |= self.json_events;
        config.log_json |= self.log_json;
        config.verbose = self.verbose;
        config.initial_alarms = self.alarms.clone();

        config.validate()?;
        Ok(config)
    }
}
