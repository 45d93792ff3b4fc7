use crate::adapters::terminal::HourFormat;
use crate::domain::model::MissedAlarmPolicy;
use crate::utils::error::{ClockError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_one_of, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_TICK_PERIOD_MS: u64 = 10;
pub const MAX_TICK_PERIOD_MS: u64 = 1000;
pub const MIN_SNOOZE_MINUTES: u32 = 1;
pub const MAX_SNOOZE_MINUTES: u32 = 1440;
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub scheduler: SchedulerConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_period_ms: u64,
    pub snooze_minutes: u32,
    pub missed_alarms: MissedAlarmPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 1000,
            snooze_minutes: 5,
            missed_alarms: MissedAlarmPolicy::Drop,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub hour_format: HourFormat,
    pub show_clock: bool,
    pub json_events: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ClockError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ClockError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TICK_MS})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ClockError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_range(
            "scheduler.tick_period_ms",
            self.scheduler.tick_period_ms,
            MIN_TICK_PERIOD_MS,
            MAX_TICK_PERIOD_MS,
        )?;
        validate_range(
            "scheduler.snooze_minutes",
            self.scheduler.snooze_minutes,
            MIN_SNOOZE_MINUTES,
            MAX_SNOOZE_MINUTES,
        )?;
        if let Some(level) = &self.logging.level {
            validate_non_empty_string("logging.level", level)?;
            validate_one_of("logging.level", level, &LOG_LEVELS)?;
        }
        Ok(())
    }
}
