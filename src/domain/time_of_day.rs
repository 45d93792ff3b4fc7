use crate::utils::error::{ClockError, Result};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SECONDS_PER_DAY: u32 = 86_400;

/// A wall-clock time with second resolution and no date, stored as
/// seconds since midnight (`0..=86399`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self(hour * 3600 + minute * 60 + second))
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        (seconds < SECONDS_PER_DAY).then_some(Self(seconds))
    }

    /// Drops sub-second precision, including chrono's leap-second representation.
    pub fn from_naive_time(time: &NaiveTime) -> Self {
        Self(time.num_seconds_from_midnight() % SECONDS_PER_DAY)
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    pub fn minute(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    pub fn second(&self) -> u32 {
        self.0 % 60
    }

    /// Adds `seconds`, wrapping past midnight.
    pub fn add_seconds(&self, seconds: u32) -> Self {
        let wrapped = (u64::from(self.0) + u64::from(seconds)) % u64::from(SECONDS_PER_DAY);
        Self(wrapped as u32)
    }

    /// Seconds to move forward from `self` to reach `later`, across midnight if needed.
    pub fn seconds_until(&self, later: TimeOfDay) -> u32 {
        (later.0 + SECONDS_PER_DAY - self.0) % SECONDS_PER_DAY
    }

    /// `hh:mm:ss AM`, the format shown to users.
    pub fn to_12h_string(&self) -> String {
        let hour = match self.hour() % 12 {
            0 => 12,
            h => h,
        };
        let suffix = if self.hour() < 12 { "AM" } else { "PM" };
        format!(
            "{:02}:{:02}:{:02} {}",
            hour,
            self.minute(),
            self.second(),
            suffix
        )
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl FromStr for TimeOfDay {
    type Err = ClockError;

    /// Accepts `HH:MM:SS` (24-hour) or `hh:mm:ss AM|PM`.
    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let parsed = NaiveTime::parse_from_str(input, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(input, "%I:%M:%S %p"))
            .map_err(|e| ClockError::InvalidTimeOfDay {
                input: s.to_string(),
                reason: e.to_string(),
            })?;

        if parsed.nanosecond() >= 1_000_000_000 {
            return Err(ClockError::InvalidTimeOfDay {
                input: s.to_string(),
                reason: "leap seconds are not supported".to_string(),
            });
        }

        Ok(Self::from_naive_time(&parsed))
    }
}

impl TryFrom<u32> for TimeOfDay {
    type Error = ClockError;

    fn try_from(seconds: u32) -> Result<Self> {
        Self::from_seconds(seconds).ok_or_else(|| ClockError::InvalidTimeOfDay {
            input: seconds.to_string(),
            reason: format!("must be below {}", SECONDS_PER_DAY),
        })
    }
}

impl From<TimeOfDay> for u32 {
    fn from(time: TimeOfDay) -> Self {
        time.0
    }
}
