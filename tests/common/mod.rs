#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};
use tick_clock::domain::ports::Notifier;
use tick_clock::{AlarmChoice, ClockEvent, TimeOfDay};

pub fn t(h: u32, m: u32, s: u32) -> TimeOfDay {
    TimeOfDay::from_hms(h, m, s).unwrap()
}

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[derive(Debug, Default)]
struct Recorded {
    fired: Vec<TimeOfDay>,
    alarm_stop: usize,
    expired: usize,
    expired_stop: usize,
}

/// Notifier that records every call and answers alarms with a fixed choice.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    answer: Option<AlarmChoice>,
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingNotifier {
    /// Defers every alarm answer to a `ResolveAlarm` command.
    pub fn deferring() -> Self {
        Self::default()
    }

    pub fn answering(choice: AlarmChoice) -> Self {
        Self {
            answer: Some(choice),
            ..Self::default()
        }
    }

    pub fn fired(&self) -> Vec<TimeOfDay> {
        self.recorded.lock().unwrap().fired.clone()
    }

    pub fn alarm_stop_count(&self) -> usize {
        self.recorded.lock().unwrap().alarm_stop
    }

    pub fn expired_count(&self) -> usize {
        self.recorded.lock().unwrap().expired
    }

    pub fn expired_stop_count(&self) -> usize {
        self.recorded.lock().unwrap().expired_stop
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn alarm_fired(&self, time: TimeOfDay) -> Option<AlarmChoice> {
        self.recorded.lock().unwrap().fired.push(time);
        self.answer
    }

    async fn alarm_stop(&self) {
        self.recorded.lock().unwrap().alarm_stop += 1;
    }

    async fn timer_expired(&self) {
        self.recorded.lock().unwrap().expired += 1;
    }

    async fn timer_expired_stop(&self) {
        self.recorded.lock().unwrap().expired_stop += 1;
    }
}

pub fn fired_alarms(events: &[ClockEvent]) -> Vec<TimeOfDay> {
    events
        .iter()
        .filter_map(|event| match event {
            ClockEvent::AlarmFired { time } => Some(*time),
            _ => None,
        })
        .collect()
}

pub fn countdown_ticks(events: &[ClockEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match event {
            ClockEvent::CountdownTick { remaining_seconds } => Some(*remaining_seconds),
            _ => None,
        })
        .collect()
}

pub fn stopwatch_ticks(events: &[ClockEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match event {
            ClockEvent::StopwatchTick { elapsed_seconds } => Some(*elapsed_seconds),
            _ => None,
        })
        .collect()
}

pub fn has_expired(events: &[ClockEvent]) -> bool {
    events.contains(&ClockEvent::CountdownExpired)
}
