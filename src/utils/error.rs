use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid time of day '{input}': {reason}")]
    InvalidTimeOfDay { input: String, reason: String },

    #[error("Invalid command '{input}': {reason}")]
    InvalidCommand { input: String, reason: String },

    #[error("Engine channel closed: {message}")]
    ChannelClosed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClockError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClockError::ConfigError { .. }
            | ClockError::ConfigValidationError { .. }
            | ClockError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ClockError::InvalidTimeOfDay { .. } | ClockError::InvalidCommand { .. } => {
                ErrorCategory::Input
            }
            ClockError::IoError(_) | ClockError::ChannelClosed { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 使用者輸入錯誤只需重新輸入
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => match self {
                ClockError::ChannelClosed { .. } => ErrorSeverity::Medium,
                _ => ErrorSeverity::Critical,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ClockError::IoError(_) => "Check that the file exists and is readable",
            ClockError::ConfigError { .. } | ClockError::ConfigValidationError { .. } => {
                "Fix the configuration file (see --help for the expected layout)"
            }
            ClockError::InvalidConfigValueError { .. } => {
                "Adjust the value to lie within the documented range"
            }
            ClockError::InvalidTimeOfDay { .. } => {
                "Use HH:MM:SS (24-hour) or hh:mm:ss AM/PM, e.g. 07:30:00 or 07:30:00 PM"
            }
            ClockError::InvalidCommand { .. } => "Type 'help' to list the available commands",
            ClockError::ChannelClosed { .. } => "Restart tick-clock",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClockError::IoError(e) => format!("Could not read a file: {}", e),
            ClockError::InvalidTimeOfDay { input, .. } => {
                format!("'{}' is not a valid time of day", input)
            }
            ClockError::InvalidCommand { input, reason } => {
                format!("Could not understand '{}': {}", input, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_low_severity() {
        let err = ClockError::InvalidTimeOfDay {
            input: "25:00:00".to_string(),
            reason: "hour out of range".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.user_friendly_message().contains("25:00:00"));
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = ClockError::InvalidConfigValueError {
            field: "scheduler.tick_period_ms".to_string(),
            value: "0".to_string(),
            reason: "Value must be between 10 and 1000".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
