use crate::domain::model::AlarmChoice;
use crate::domain::time_of_day::TimeOfDay;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Source of the current wall-clock time, read once per tick.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_naive_time(&self.now().time())
    }
}

/// Receives the signals that need user attention.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// `Some` answers immediately. `None` defers the answer, which then
    /// arrives as a `Command::ResolveAlarm`.
    async fn alarm_fired(&self, time: TimeOfDay) -> Option<AlarmChoice>;

    /// Every deferred alarm has been answered; stop the alarm notification.
    async fn alarm_stop(&self);

    /// Start the continuous countdown-expired notification.
    async fn timer_expired(&self);

    async fn timer_expired_stop(&self);
}
