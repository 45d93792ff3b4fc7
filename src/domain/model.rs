use crate::domain::time_of_day::TimeOfDay;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// How the user resolved a fired alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmChoice {
    Snooze,
    Delete,
}

/// Whether alarms whose second was skipped (host suspended, delayed tick)
/// still fire on the next observed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissedAlarmPolicy {
    #[default]
    Drop,
    CatchUp,
}

/// Events the core emits towards the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClockEvent {
    ClockTick {
        now: NaiveDateTime,
    },
    AlarmFired {
        time: TimeOfDay,
    },
    AlarmResolved {
        time: TimeOfDay,
        choice: AlarmChoice,
        snoozed_to: Option<TimeOfDay>,
    },
    AlarmListChanged {
        alarms: Vec<TimeOfDay>,
    },
    CountdownTick {
        remaining_seconds: u64,
    },
    CountdownExpired,
    StopwatchTick {
        elapsed_seconds: u64,
    },
}

/// Commands issued by the presentation layer. Each carries all of its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetAlarm(TimeOfDay),
    EditAlarm { old: TimeOfDay, new: TimeOfDay },
    DeleteAlarm(TimeOfDay),
    ListAlarms,
    ResolveAlarm(AlarmChoice),
    LoadCountdown(String),
    StartCountdown(String),
    StopCountdown,
    ClearCountdown,
    StopCountdownSound,
    StartStopwatch,
    StopStopwatch,
    ResetStopwatch,
    Shutdown,
}

/// Structured result of a command. Precondition violations (duplicate,
/// missing entry, malformed duration) are reported here, never as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    AlarmSet { added: bool },
    AlarmEdited { replaced: bool },
    AlarmDeleted { removed: bool },
    Alarms { alarms: Vec<TimeOfDay> },
    AlarmResolved { resolved: bool, snoozed_to: Option<TimeOfDay> },
    CountdownLoaded { seconds: u64 },
    CountdownStarted { seconds: u64 },
    CountdownStopped { remaining_seconds: u64 },
    CountdownCleared,
    CountdownSoundStopped { was_ringing: bool },
    StopwatchStarted,
    StopwatchStopped { elapsed_seconds: u64 },
    StopwatchReset,
    ShuttingDown,
}

/// Formats a second count as `HH:MM:SS`; hours are not wrapped.
pub fn format_hms(total_seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(90_000), "25:00:00");
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = ClockEvent::AlarmFired {
            time: TimeOfDay::from_hms(7, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "alarm_fired");
        assert_eq!(json["time"], 25_200);
    }
}
