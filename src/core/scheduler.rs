use crate::core::registry::AlarmRegistry;
use crate::domain::model::MissedAlarmPolicy;
use crate::domain::time_of_day::TimeOfDay;

pub const DEFAULT_SNOOZE_SECONDS: u32 = 300;

/// Gaps longer than this are treated as the wall clock being set back
/// rather than as skipped ticks, and are never caught up.
const CATCH_UP_LIMIT_SECONDS: u32 = 12 * 3600;

/// Matches registry entries against the clock and removes the ones that fire.
#[derive(Debug, Clone)]
pub struct AlarmScheduler {
    policy: MissedAlarmPolicy,
    snooze_seconds: u32,
    last_checked: Option<TimeOfDay>,
}

impl AlarmScheduler {
    pub fn new(policy: MissedAlarmPolicy, snooze_seconds: u32) -> Self {
        Self {
            policy,
            snooze_seconds,
            last_checked: None,
        }
    }

    /// Takes every entry due at `now` out of the registry and returns them in
    /// registry order. Removal happens here, so a fired entry can never be
    /// matched by a later tick.
    ///
    /// With [`MissedAlarmPolicy::Drop`] only exact matches fire. With
    /// [`MissedAlarmPolicy::CatchUp`] entries in `(last_checked, now]` fire too.
    pub fn check(&mut self, registry: &mut AlarmRegistry, now: TimeOfDay) -> Vec<TimeOfDay> {
        let gap = self
            .last_checked
            .map(|previous| (previous, previous.seconds_until(now)))
            .filter(|(_, gap)| *gap > 1 && *gap <= CATCH_UP_LIMIT_SECONDS);

        let fired = match (self.policy, gap) {
            (MissedAlarmPolicy::CatchUp, Some((previous, gap))) => {
                tracing::debug!("Catching up {} skipped seconds after {}", gap - 1, previous);
                registry.take_matching(|entry| {
                    let offset = previous.seconds_until(entry);
                    offset > 0 && offset <= gap
                })
            }
            (MissedAlarmPolicy::Drop, Some((previous, gap))) => {
                tracing::warn!(
                    "Clock skipped {} seconds after {}; alarms in that window will not fire",
                    gap - 1,
                    previous
                );
                registry.take_matching(|entry| entry == now)
            }
            (_, None) => registry.take_matching(|entry| entry == now),
        };

        self.last_checked = Some(now);
        fired
    }

    /// Schedules a fresh entry `snooze_seconds` after `now`. Returns the new
    /// time even when an entry for it already existed.
    pub fn snooze(&self, registry: &mut AlarmRegistry, now: TimeOfDay) -> TimeOfDay {
        let target = now.add_seconds(self.snooze_seconds);
        if !registry.add(target) {
            tracing::info!("Snooze target {} was already scheduled", target);
        }
        target
    }
}

impl Default for AlarmScheduler {
    fn default() -> Self {
        Self::new(MissedAlarmPolicy::Drop, DEFAULT_SNOOZE_SECONDS)
    }
}
