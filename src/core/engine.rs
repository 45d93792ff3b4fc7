use crate::core::countdown::{parse_duration, CountdownTimer};
use crate::core::registry::AlarmRegistry;
use crate::core::scheduler::{AlarmScheduler, DEFAULT_SNOOZE_SECONDS};
use crate::core::stopwatch::Stopwatch;
use crate::core::{Clock, Notifier};
use crate::domain::model::{AlarmChoice, ClockEvent, Command, CommandOutcome, MissedAlarmPolicy};
use crate::domain::time_of_day::TimeOfDay;
use crate::utils::error::{ClockError, Result};
use chrono::{NaiveDateTime, SubsecRound};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

/// The countdown and the stopwatch always move one second per step.
pub const TIMER_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// How often the wall clock is read for the live clock and alarm checks.
    /// Each new second is checked once, so anything up to 1s is safe.
    pub tick_period: Duration,
    pub snooze_seconds: u32,
    pub missed_alarms: MissedAlarmPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            snooze_seconds: DEFAULT_SNOOZE_SECONDS,
            missed_alarms: MissedAlarmPolicy::Drop,
        }
    }
}

/// Result of dispatching one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub outcome: CommandOutcome,
    pub events: Vec<ClockEvent>,
}

impl Dispatch {
    fn quiet(outcome: CommandOutcome) -> Self {
        Self {
            outcome,
            events: Vec::new(),
        }
    }
}

/// A command travelling through the engine's queue, with an optional reply slot.
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub reply: Option<oneshot::Sender<CommandOutcome>>,
}

/// Cloneable sender side of the engine's command queue.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<Request>,
}

impl EngineHandle {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Request>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues `command` and waits for its outcome.
    pub async fn send(&self, command: Command) -> Result<CommandOutcome> {
        let (reply, outcome) = oneshot::channel();
        self.sender
            .send(Request {
                command,
                reply: Some(reply),
            })
            .await
            .map_err(|_| ClockError::ChannelClosed {
                message: "engine stopped before accepting the command".to_string(),
            })?;
        outcome.await.map_err(|_| ClockError::ChannelClosed {
            message: "engine dropped the reply".to_string(),
        })
    }

    /// Queues `command` without waiting for its outcome.
    pub async fn post(&self, command: Command) -> Result<()> {
        self.sender
            .send(Request {
                command,
                reply: None,
            })
            .await
            .map_err(|_| ClockError::ChannelClosed {
                message: "engine stopped before accepting the command".to_string(),
            })
    }
}

/// Owns every piece of alarm and timer state. All mutation goes through
/// [`ClockEngine::tick`] and [`ClockEngine::dispatch`], which take `&mut self`,
/// so a tick and a command can never interleave.
pub struct ClockEngine<C: Clock, N: Notifier> {
    clock: C,
    notifier: N,
    settings: EngineSettings,
    registry: AlarmRegistry,
    scheduler: AlarmScheduler,
    countdown: CountdownTimer,
    stopwatch: Stopwatch,
    pending: VecDeque<TimeOfDay>,
}

impl<C: Clock, N: Notifier> ClockEngine<C, N> {
    pub fn new(clock: C, notifier: N) -> Self {
        Self::with_settings(clock, notifier, EngineSettings::default())
    }

    pub fn with_settings(clock: C, notifier: N, settings: EngineSettings) -> Self {
        let scheduler = AlarmScheduler::new(settings.missed_alarms, settings.snooze_seconds);
        Self {
            clock,
            notifier,
            settings,
            registry: AlarmRegistry::new(),
            scheduler,
            countdown: CountdownTimer::new(),
            stopwatch: Stopwatch::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn alarms(&self) -> Vec<TimeOfDay> {
        self.registry.list_all()
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    /// Fired alarms still waiting for a snooze/delete answer, oldest first.
    pub fn pending_alarms(&self) -> Vec<TimeOfDay> {
        self.pending.iter().copied().collect()
    }

    /// One scheduling step: clock refresh, alarm check, countdown, stopwatch.
    pub async fn tick(&mut self) -> Vec<ClockEvent> {
        let now = self.clock.now();
        let mut events = self.sample_clock(now).await;
        events.extend(self.advance_timers().await);
        events
    }

    /// Clock refresh and alarm check for the reading `now`.
    async fn sample_clock(&mut self, now: NaiveDateTime) -> Vec<ClockEvent> {
        let time = TimeOfDay::from_naive_time(&now.time());
        let mut events = vec![ClockEvent::ClockTick { now }];

        let fired = self.scheduler.check(&mut self.registry, time);
        if !fired.is_empty() {
            for alarm in fired {
                tracing::info!("⏰ Alarm fired: {}", alarm);
                events.push(ClockEvent::AlarmFired { time: alarm });
                match self.notifier.alarm_fired(alarm).await {
                    Some(choice) => events.push(self.resolve(alarm, choice).0),
                    None => self.pending.push_back(alarm),
                }
            }
            events.push(self.alarm_list_changed());
        }

        events
    }

    /// Moves the countdown and the stopwatch on by one second.
    async fn advance_timers(&mut self) -> Vec<ClockEvent> {
        let mut events = Vec::new();

        let step = self.countdown.tick();
        if let Some(remaining_seconds) = step.tick {
            events.push(ClockEvent::CountdownTick { remaining_seconds });
        }
        if step.expired {
            tracing::info!("⌛ Countdown expired");
            events.push(ClockEvent::CountdownExpired);
            self.notifier.timer_expired().await;
        }

        if let Some(elapsed_seconds) = self.stopwatch.tick() {
            events.push(ClockEvent::StopwatchTick { elapsed_seconds });
        }

        events
    }

    pub async fn dispatch(&mut self, command: Command) -> Dispatch {
        tracing::debug!("Dispatching {:?}", command);
        match command {
            Command::SetAlarm(time) => {
                let added = self.registry.add(time);
                if added {
                    tracing::info!("Alarm set for: {}", time);
                }
                self.with_list_change(added, CommandOutcome::AlarmSet { added })
            }
            Command::EditAlarm { old, new } => {
                let replaced = self.registry.replace(old, new);
                if replaced {
                    tracing::info!("Alarm edited: {} -> {}", old, new);
                    if self.registry.count_of(new) > 1 {
                        tracing::warn!("Edited alarm now duplicates an existing alarm at {}", new);
                    }
                } else {
                    tracing::info!("Alarm time {} not found in list", old);
                }
                self.with_list_change(replaced, CommandOutcome::AlarmEdited { replaced })
            }
            Command::DeleteAlarm(time) => {
                let removed = self.registry.remove(time);
                if removed {
                    tracing::info!("Alarm deleted: {}", time);
                } else {
                    tracing::info!("Alarm time {} not found in list", time);
                }
                self.with_list_change(removed, CommandOutcome::AlarmDeleted { removed })
            }
            Command::ListAlarms => Dispatch::quiet(CommandOutcome::Alarms {
                alarms: self.registry.list_all(),
            }),
            Command::ResolveAlarm(choice) => match self.pending.pop_front() {
                Some(alarm) => {
                    let (resolved, snoozed_to) = self.resolve(alarm, choice);
                    if self.pending.is_empty() {
                        self.notifier.alarm_stop().await;
                    }
                    let mut events = vec![resolved];
                    if snoozed_to.is_some() {
                        events.push(self.alarm_list_changed());
                    }
                    Dispatch {
                        outcome: CommandOutcome::AlarmResolved {
                            resolved: true,
                            snoozed_to,
                        },
                        events,
                    }
                }
                None => {
                    tracing::debug!("No fired alarm is waiting for an answer");
                    Dispatch::quiet(CommandOutcome::AlarmResolved {
                        resolved: false,
                        snoozed_to: None,
                    })
                }
            },
            Command::LoadCountdown(text) => {
                let seconds = parse_duration(&text);
                self.countdown.load(seconds);
                Dispatch::quiet(CommandOutcome::CountdownLoaded { seconds })
            }
            Command::StartCountdown(text) => {
                let seconds = parse_duration(&text);
                self.countdown.start(seconds);
                tracing::info!("Countdown started: {} seconds", seconds);
                Dispatch::quiet(CommandOutcome::CountdownStarted { seconds })
            }
            Command::StopCountdown => {
                self.countdown.stop();
                Dispatch::quiet(CommandOutcome::CountdownStopped {
                    remaining_seconds: self.countdown.remaining_seconds(),
                })
            }
            Command::ClearCountdown => {
                if self.countdown.clear() {
                    self.notifier.timer_expired_stop().await;
                }
                Dispatch::quiet(CommandOutcome::CountdownCleared)
            }
            Command::StopCountdownSound => {
                let was_ringing = self.countdown.stop_sound();
                if was_ringing {
                    self.notifier.timer_expired_stop().await;
                }
                Dispatch::quiet(CommandOutcome::CountdownSoundStopped { was_ringing })
            }
            Command::StartStopwatch => {
                self.stopwatch.start();
                Dispatch::quiet(CommandOutcome::StopwatchStarted)
            }
            Command::StopStopwatch => {
                self.stopwatch.stop();
                Dispatch::quiet(CommandOutcome::StopwatchStopped {
                    elapsed_seconds: self.stopwatch.elapsed_seconds(),
                })
            }
            Command::ResetStopwatch => {
                self.stopwatch.reset();
                Dispatch::quiet(CommandOutcome::StopwatchReset)
            }
            Command::Shutdown => Dispatch::quiet(CommandOutcome::ShuttingDown),
        }
    }

    /// Serves ticks and queued commands until the queue closes or a
    /// `Shutdown` command arrives. Events go to `events`; a dropped event
    /// receiver does not stop the engine.
    pub async fn run(
        &mut self,
        mut requests: mpsc::Receiver<Request>,
        events: mpsc::UnboundedSender<ClockEvent>,
    ) -> Result<()> {
        let mut sampling = tokio::time::interval(self.settings.tick_period);
        sampling.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut seconds = tokio::time::interval_at(Instant::now() + TIMER_STEP, TIMER_STEP);
        seconds.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_sampled: Option<NaiveDateTime> = None;

        tracing::info!(
            "Engine running (clock sampled every {:?}, snooze {}s, missed alarms: {:?})",
            self.settings.tick_period,
            self.settings.snooze_seconds,
            self.settings.missed_alarms
        );

        loop {
            tokio::select! {
                _ = sampling.tick() => {
                    let now = self.clock.now().trunc_subsecs(0);
                    if last_sampled != Some(now) {
                        last_sampled = Some(now);
                        for event in self.sample_clock(now).await {
                            let _ = events.send(event);
                        }
                    }
                }
                _ = seconds.tick() => {
                    for event in self.advance_timers().await {
                        let _ = events.send(event);
                    }
                }
                request = requests.recv() => {
                    let Some(Request { command, reply }) = request else {
                        tracing::info!("Command queue closed, stopping engine");
                        break;
                    };
                    let shutdown = command == Command::Shutdown;
                    let dispatch = self.dispatch(command).await;
                    for event in dispatch.events {
                        let _ = events.send(event);
                    }
                    if let Some(reply) = reply {
                        let _ = reply.send(dispatch.outcome);
                    }
                    if shutdown {
                        tracing::info!("Shutdown requested, stopping engine");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Applies the answer to a fired alarm. The fired entry is already gone
    /// from the registry; snoozing adds a fresh one.
    fn resolve(&mut self, alarm: TimeOfDay, choice: AlarmChoice) -> (ClockEvent, Option<TimeOfDay>) {
        let snoozed_to = match choice {
            AlarmChoice::Snooze => {
                let target = self
                    .scheduler
                    .snooze(&mut self.registry, self.clock.time_of_day());
                tracing::info!("Alarm snoozed to: {}", target);
                Some(target)
            }
            AlarmChoice::Delete => {
                tracing::info!("Alarm dismissed: {}", alarm);
                None
            }
        };

        let event = ClockEvent::AlarmResolved {
            time: alarm,
            choice,
            snoozed_to,
        };
        (event, snoozed_to)
    }

    fn alarm_list_changed(&self) -> ClockEvent {
        ClockEvent::AlarmListChanged {
            alarms: self.registry.list_all(),
        }
    }

    fn with_list_change(&self, changed: bool, outcome: CommandOutcome) -> Dispatch {
        let events = if changed {
            vec![self.alarm_list_changed()]
        } else {
            Vec::new()
        };
        Dispatch { outcome, events }
    }
}
