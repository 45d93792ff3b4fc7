use crate::domain::ports::Clock;
use crate::domain::time_of_day::TimeOfDay;
use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use std::sync::{Arc, Mutex};

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Clones share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.lock() = now;
    }

    /// Moves to `time` on the current date.
    pub fn set_time_of_day(&self, time: TimeOfDay) {
        if let Some(target) = NaiveTime::from_num_seconds_from_midnight_opt(time.seconds(), 0) {
            let mut now = self.lock();
            *now = now.date().and_time(target);
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.lock();
        *now += by;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.advance(TimeDelta::seconds(seconds));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap()
    }

    #[test]
    fn test_manual_clock_advances_across_midnight() {
        let clock = ManualClock::new(start());
        clock.advance_seconds(3);
        assert_eq!(clock.time_of_day(), TimeOfDay::from_hms(0, 0, 1).unwrap());
        assert_eq!(clock.now().date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_clones_share_the_reading() {
        let clock = ManualClock::new(start());
        let shared = clock.clone();
        shared.set_time_of_day(TimeOfDay::from_hms(7, 0, 0).unwrap());
        assert_eq!(clock.time_of_day(), TimeOfDay::from_hms(7, 0, 0).unwrap());
        assert_eq!(clock.now().date(), start().date());
    }

    #[test]
    fn test_system_clock_is_within_a_day() {
        assert!(SystemClock.time_of_day().seconds() < crate::domain::time_of_day::SECONDS_PER_DAY);
    }
}
