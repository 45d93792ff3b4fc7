use crate::domain::model::{format_hms, AlarmChoice, ClockEvent, Command, CommandOutcome};
use crate::domain::ports::Notifier;
use crate::domain::time_of_day::TimeOfDay;
use crate::utils::error::{ClockError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const HELP: &str = "\
Commands:
  set <time>                 set an alarm (07:30:00 or 07:30:00 PM)
  edit <old> -> <new>        change an alarm's time
  delete <time>              delete an alarm
  list                       list alarms
  snooze | dismiss           answer the ringing alarm
  timer load <HH:MM:SS>      put a duration on the timer display
  timer start [HH:MM:SS]     start the countdown (default: the display)
  timer stop | clear | mute  pause, reset, or silence the countdown
  sw start | stop | reset    stopwatch
  quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HourFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl HourFormat {
    pub fn format(&self, time: TimeOfDay) -> String {
        match self {
            HourFormat::TwelveHour => time.to_12h_string(),
            HourFormat::TwentyFourHour => time.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalInput {
    Command(Command),
    Help,
}

/// Line-oriented presentation: parses typed commands and renders events.
/// Holds the only presentation state, the countdown display text, which
/// `timer start` with no argument reads back.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    hour_format: HourFormat,
    show_clock: bool,
    json: bool,
    countdown_display: String,
}

impl TerminalPresenter {
    pub fn new(hour_format: HourFormat, show_clock: bool, json: bool) -> Self {
        Self {
            hour_format,
            show_clock,
            json,
            countdown_display: format_hms(0),
        }
    }

    pub fn countdown_display(&self) -> &str {
        &self.countdown_display
    }

    pub fn parse_line(&self, line: &str) -> Result<Option<TerminalInput>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let command = match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => return Ok(Some(TerminalInput::Help)),
            "set" => Command::SetAlarm(parse_time(line, rest)?),
            "edit" => {
                let (old, new) = split_pair(line, rest)?;
                Command::EditAlarm {
                    old: parse_time(line, old)?,
                    new: parse_time(line, new)?,
                }
            }
            "delete" | "rm" => Command::DeleteAlarm(parse_time(line, rest)?),
            "list" | "ls" => Command::ListAlarms,
            "snooze" => Command::ResolveAlarm(AlarmChoice::Snooze),
            "dismiss" => Command::ResolveAlarm(AlarmChoice::Delete),
            "timer" => self.parse_timer(line, rest)?,
            "sw" | "stopwatch" => match rest.to_ascii_lowercase().as_str() {
                "start" => Command::StartStopwatch,
                "stop" => Command::StopStopwatch,
                "reset" => Command::ResetStopwatch,
                _ => return Err(invalid(line, "expected 'sw start', 'sw stop' or 'sw reset'")),
            },
            "quit" | "exit" => Command::Shutdown,
            _ => return Err(invalid(line, "unknown command")),
        };

        Ok(Some(TerminalInput::Command(command)))
    }

    fn parse_timer(&self, line: &str, rest: &str) -> Result<Command> {
        let (action, argument) = split_word(rest);
        let command = match action.to_ascii_lowercase().as_str() {
            "load" if !argument.is_empty() => Command::LoadCountdown(argument.to_string()),
            "load" => return Err(invalid(line, "missing duration")),
            "start" if argument.is_empty() => {
                Command::StartCountdown(self.countdown_display.clone())
            }
            "start" => Command::StartCountdown(argument.to_string()),
            "stop" => Command::StopCountdown,
            "clear" => Command::ClearCountdown,
            "mute" => Command::StopCountdownSound,
            _ => {
                return Err(invalid(
                    line,
                    "expected 'timer load|start|stop|clear|mute'",
                ))
            }
        };
        Ok(command)
    }

    /// Returns the line to print for `event`, if any.
    pub fn render_event(&mut self, event: &ClockEvent) -> Option<String> {
        let text = match event {
            ClockEvent::ClockTick { now } => {
                if !self.show_clock {
                    return None;
                }
                format!(
                    "🕒 {} | {}",
                    self.hour_format.format(TimeOfDay::from_naive_time(&now.time())),
                    now.format("%A, %B %-d, %Y")
                )
            }
            ClockEvent::AlarmFired { time } => format!(
                "⏰ Alarm ringing ({})! Type 'snooze' or 'dismiss'.",
                self.hour_format.format(*time)
            ),
            ClockEvent::AlarmResolved {
                time, snoozed_to, ..
            } => match snoozed_to {
                Some(target) => format!("💤 Alarm snoozed to: {}", self.hour_format.format(*target)),
                None => format!("Alarm {} dismissed", self.hour_format.format(*time)),
            },
            ClockEvent::AlarmListChanged { alarms } => self.format_alarms(alarms),
            ClockEvent::CountdownTick { remaining_seconds } => {
                self.countdown_display = format_hms(*remaining_seconds);
                format!("⏳ {}", self.countdown_display)
            }
            ClockEvent::CountdownExpired => {
                self.countdown_display = "Time's up!".to_string();
                "⌛ Time's up! Type 'timer mute' to stop the alarm.".to_string()
            }
            ClockEvent::StopwatchTick { elapsed_seconds } => {
                format!("⏱ {}", format_hms(*elapsed_seconds))
            }
        };

        if self.json {
            return serde_json::to_string(event).ok();
        }
        Some(text)
    }

    pub fn render_outcome(&mut self, command: &Command, outcome: &CommandOutcome) -> Option<String> {
        let text = match (command, outcome) {
            (Command::SetAlarm(time), CommandOutcome::AlarmSet { added: true }) => {
                format!("✅ Alarm set for: {}", self.hour_format.format(*time))
            }
            (Command::SetAlarm(time), CommandOutcome::AlarmSet { added: false }) => {
                format!("Alarm {} is already set", self.hour_format.format(*time))
            }
            (Command::EditAlarm { new, .. }, CommandOutcome::AlarmEdited { replaced: true }) => {
                format!("✅ Alarm edited to: {}", self.hour_format.format(*new))
            }
            (Command::EditAlarm { old, .. }, CommandOutcome::AlarmEdited { replaced: false })
            | (Command::DeleteAlarm(old), CommandOutcome::AlarmDeleted { removed: false }) => {
                format!("Alarm time {} not found in list", self.hour_format.format(*old))
            }
            (Command::DeleteAlarm(time), CommandOutcome::AlarmDeleted { removed: true }) => {
                format!("Alarm deleted: {}", self.hour_format.format(*time))
            }
            (_, CommandOutcome::Alarms { alarms }) => self.format_alarms(alarms),
            (_, CommandOutcome::AlarmResolved { resolved: false, .. }) => {
                "No alarm is ringing".to_string()
            }
            // The resolution itself is reported through its event.
            (_, CommandOutcome::AlarmResolved { resolved: true, .. }) => return None,
            (_, CommandOutcome::CountdownLoaded { seconds }) => {
                self.countdown_display = format_hms(*seconds);
                format!("Timer set to {}", self.countdown_display)
            }
            (_, CommandOutcome::CountdownStarted { seconds }) => {
                self.countdown_display = format_hms(*seconds);
                format!("▶ Timer started: {}", self.countdown_display)
            }
            (_, CommandOutcome::CountdownStopped { remaining_seconds }) => {
                format!("⏸ Timer stopped at {}", format_hms(*remaining_seconds))
            }
            (_, CommandOutcome::CountdownCleared) => {
                self.countdown_display = format_hms(0);
                "Timer cleared".to_string()
            }
            (_, CommandOutcome::CountdownSoundStopped { was_ringing }) => {
                if *was_ringing {
                    self.countdown_display = format_hms(0);
                    "🔕 Timer alarm stopped".to_string()
                } else {
                    "Timer alarm is not ringing".to_string()
                }
            }
            (_, CommandOutcome::StopwatchStarted) => "▶ Stopwatch started".to_string(),
            (_, CommandOutcome::StopwatchStopped { elapsed_seconds }) => {
                format!("⏸ Stopwatch stopped at {}", format_hms(*elapsed_seconds))
            }
            (_, CommandOutcome::StopwatchReset) => format!("Stopwatch reset to {}", format_hms(0)),
            (_, CommandOutcome::ShuttingDown) => "Bye".to_string(),
            (_, other) => format!("{:?}", other),
        };

        if self.json {
            return serde_json::to_string(outcome).ok();
        }
        Some(text)
    }

    fn format_alarms(&self, alarms: &[TimeOfDay]) -> String {
        if alarms.is_empty() {
            return "No alarms set".to_string();
        }
        let listed: Vec<String> = alarms
            .iter()
            .map(|time| self.hour_format.format(*time))
            .collect();
        format!("Alarms: {}", listed.join(", "))
    }
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn split_pair<'a>(line: &str, rest: &'a str) -> Result<(&'a str, &'a str)> {
    if let Some((old, new)) = rest.split_once("->") {
        return Ok((old.trim(), new.trim()));
    }
    let parts: Vec<&str> = rest.split_whitespace().collect();
    match parts.as_slice() {
        [old, new] => Ok((*old, *new)),
        _ => Err(invalid(line, "expected 'edit <old> -> <new>'")),
    }
}

fn parse_time(line: &str, text: &str) -> Result<TimeOfDay> {
    if text.is_empty() {
        return Err(invalid(line, "missing time"));
    }
    text.parse()
}

fn invalid(line: &str, reason: &str) -> ClockError {
    ClockError::InvalidCommand {
        input: line.to_string(),
        reason: reason.to_string(),
    }
}

/// A bell repeated on a fixed period until stopped.
struct BellLoop {
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BellLoop {
    fn new(period: Duration) -> Self {
        Self {
            period,
            task: Mutex::new(None),
        }
    }

    /// Starts ringing unless already ringing. Needs a tokio runtime.
    fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|p| p.into_inner());
        if task.is_some() {
            return;
        }
        let period = self.period;
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                bell();
            }
        }));
    }

    fn stop(&self) {
        let task = self.task.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(task) = task {
            task.abort();
        }
    }

    fn is_ringing(&self) -> bool {
        self.task.lock().unwrap_or_else(|p| p.into_inner()).is_some()
    }
}

impl Drop for BellLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// stderr，避免污染 stdout 的 JSON lines
fn bell() {
    let _ = ring(&mut std::io::stderr().lock());
}

fn ring<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.write_all(b"\x07")?;
    out.flush()
}

/// Rings the terminal bell. Alarm choices are deferred to typed commands,
/// and the alarm keeps ringing until every fired alarm has been answered.
pub struct TerminalNotifier {
    alarm_bell: BellLoop,
    timer_bell: BellLoop,
}

impl TerminalNotifier {
    pub fn new(bell_period: Duration) -> Self {
        Self {
            alarm_bell: BellLoop::new(bell_period),
            timer_bell: BellLoop::new(bell_period),
        }
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn alarm_fired(&self, _time: TimeOfDay) -> Option<AlarmChoice> {
        self.alarm_bell.start();
        None
    }

    async fn alarm_stop(&self) {
        self.alarm_bell.stop();
    }

    async fn timer_expired(&self) {
        self.timer_bell.start();
    }

    async fn timer_expired_stop(&self) {
        self.timer_bell.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32, s: u32) -> TimeOfDay {
        TimeOfDay::from_hms(h, m, s).unwrap()
    }

    fn presenter() -> TerminalPresenter {
        TerminalPresenter::new(HourFormat::TwelveHour, false, false)
    }

    fn command(presenter: &TerminalPresenter, line: &str) -> Command {
        match presenter.parse_line(line).unwrap() {
            Some(TerminalInput::Command(command)) => command,
            other => panic!("expected a command for '{}', got {:?}", line, other),
        }
    }

    #[test]
    fn test_parse_alarm_commands() {
        let p = presenter();
        assert_eq!(command(&p, "set 07:30:00 PM"), Command::SetAlarm(t(19, 30, 0)));
        assert_eq!(command(&p, "SET 06:00:00"), Command::SetAlarm(t(6, 0, 0)));
        assert_eq!(
            command(&p, "edit 07:00:00 AM -> 08:15:00 AM"),
            Command::EditAlarm {
                old: t(7, 0, 0),
                new: t(8, 15, 0)
            }
        );
        assert_eq!(
            command(&p, "edit 07:00:00 08:15:00"),
            Command::EditAlarm {
                old: t(7, 0, 0),
                new: t(8, 15, 0)
            }
        );
        assert_eq!(command(&p, "delete 06:00:00"), Command::DeleteAlarm(t(6, 0, 0)));
        assert_eq!(command(&p, "snooze"), Command::ResolveAlarm(AlarmChoice::Snooze));
        assert_eq!(command(&p, "dismiss"), Command::ResolveAlarm(AlarmChoice::Delete));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let p = presenter();
        assert!(p.parse_line("set").is_err());
        assert!(p.parse_line("set 25:00:00").is_err());
        assert!(p.parse_line("edit 07:00:00").is_err());
        assert!(p.parse_line("dance").is_err());
        assert!(p.parse_line("timer rewind").is_err());
        assert_eq!(p.parse_line("   ").unwrap(), None);
        assert_eq!(p.parse_line("help").unwrap(), Some(TerminalInput::Help));
    }

    #[test]
    fn test_timer_start_reads_the_display() {
        let mut p = presenter();
        assert_eq!(
            command(&p, "timer start"),
            Command::StartCountdown("00:00:00".to_string())
        );

        p.render_outcome(
            &Command::LoadCountdown("00:02:00".to_string()),
            &CommandOutcome::CountdownLoaded { seconds: 120 },
        );
        assert_eq!(
            command(&p, "timer start"),
            Command::StartCountdown("00:02:00".to_string())
        );

        p.render_event(&ClockEvent::CountdownExpired);
        assert_eq!(p.countdown_display(), "Time's up!");
    }

    #[test]
    fn test_render_events() {
        let mut p = presenter();
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap();
        assert_eq!(p.render_event(&ClockEvent::ClockTick { now }), None);

        let mut with_clock = TerminalPresenter::new(HourFormat::TwelveHour, true, false);
        assert_eq!(
            with_clock.render_event(&ClockEvent::ClockTick { now }).unwrap(),
            "🕒 01:05:00 PM | Friday, March 1, 2024"
        );

        assert_eq!(
            p.render_event(&ClockEvent::AlarmListChanged {
                alarms: vec![t(7, 0, 0), t(19, 0, 0)]
            })
            .unwrap(),
            "Alarms: 07:00:00 AM, 07:00:00 PM"
        );
        assert_eq!(
            p.render_event(&ClockEvent::CountdownTick {
                remaining_seconds: 61
            })
            .unwrap(),
            "⏳ 00:01:01"
        );
    }

    #[test]
    fn test_json_rendering() {
        let mut p = TerminalPresenter::new(HourFormat::TwentyFourHour, false, true);
        let line = p
            .render_event(&ClockEvent::StopwatchTick { elapsed_seconds: 3 })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "stopwatch_tick");
        assert_eq!(value["elapsed_seconds"], 3);
    }

    #[test]
    fn test_bell_is_a_lone_bel_byte() {
        let mut out = Vec::new();
        ring(&mut out).unwrap();
        assert_eq!(out, b"\x07");

        // JSON event lines never carry it.
        let mut p = TerminalPresenter::new(HourFormat::TwentyFourHour, false, true);
        let line = p.render_event(&ClockEvent::AlarmFired { time: t(7, 0, 0) }).unwrap();
        assert!(!line.contains('\x07'));
    }

    #[tokio::test]
    async fn test_notifier_defers_alarm_choice_and_rings_until_answered() {
        let notifier = TerminalNotifier::new(Duration::from_millis(10));
        assert_eq!(notifier.alarm_fired(t(7, 0, 0)).await, None);
        assert!(notifier.alarm_bell.is_ringing());
        assert!(!notifier.timer_bell.is_ringing());

        notifier.alarm_stop().await;
        assert!(!notifier.alarm_bell.is_ringing());
    }

    #[tokio::test]
    async fn test_notifier_rings_until_stopped() {
        let notifier = TerminalNotifier::new(Duration::from_millis(10));
        notifier.timer_expired().await;
        assert!(notifier.timer_bell.is_ringing());
        // A second expiry while ringing keeps the same bell task.
        notifier.timer_expired().await;
        assert!(notifier.timer_bell.is_ringing());

        // Answering an alarm leaves the countdown bell alone.
        notifier.alarm_stop().await;
        assert!(notifier.timer_bell.is_ringing());

        notifier.timer_expired_stop().await;
        assert!(!notifier.timer_bell.is_ringing());
    }
}
