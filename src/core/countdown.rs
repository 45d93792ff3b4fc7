use regex::Regex;
use std::sync::OnceLock;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2}):(\d{2}):(\d{2})$").expect("duration pattern is a valid regex")
    })
}

/// Parses a fixed `HH:MM:SS` duration into seconds. The value must also be a
/// valid time of day; anything else yields 0.
pub fn parse_duration(text: &str) -> u64 {
    let Some(caps) = duration_pattern().captures(text.trim()) else {
        tracing::debug!("Malformed countdown duration '{}', using 0", text);
        return 0;
    };

    // 三組皆為兩位數字，parse 不會失敗
    let field = |index: usize| caps[index].parse::<u64>().unwrap_or(0);
    let (hours, minutes, seconds) = (field(1), field(2), field(3));

    if hours > 23 || minutes > 59 || seconds > 59 {
        tracing::debug!("Countdown duration '{}' out of range, using 0", text);
        return 0;
    }

    hours * 3600 + minutes * 60 + seconds
}

/// What a single countdown tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStep {
    /// Remaining seconds after a decrement, if one happened.
    pub tick: Option<u64>,
    pub expired: bool,
}

impl CountdownStep {
    const IDLE: CountdownStep = CountdownStep {
        tick: None,
        expired: false,
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownTimer {
    remaining_seconds: u64,
    running: bool,
    ringing: bool,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True between expiry and `stop_sound`/`clear`.
    pub fn is_ringing(&self) -> bool {
        self.ringing
    }

    /// Sets the remaining time from an edited display without starting.
    pub fn load(&mut self, seconds: u64) {
        self.remaining_seconds = seconds;
    }

    pub fn start(&mut self, seconds: u64) {
        self.remaining_seconds = seconds;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stops and zeroes. Returns whether an expiry notification was active
    /// and has to be silenced.
    pub fn clear(&mut self) -> bool {
        self.running = false;
        self.remaining_seconds = 0;
        std::mem::take(&mut self.ringing)
    }

    /// Ends the expiry notification. Returns whether one was active.
    pub fn stop_sound(&mut self) -> bool {
        if self.ringing {
            self.remaining_seconds = 0;
        }
        std::mem::take(&mut self.ringing)
    }

    /// Advances one second. The tick that reaches zero also expires the
    /// timer; a tick that finds it already at zero expires it without
    /// decrementing.
    pub fn tick(&mut self) -> CountdownStep {
        if !self.running {
            return CountdownStep::IDLE;
        }

        let tick = if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            Some(self.remaining_seconds)
        } else {
            None
        };

        let expired = self.remaining_seconds == 0;
        if expired {
            self.running = false;
            self.ringing = true;
        }

        CountdownStep { tick, expired }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("00:00:05"), 5);
        assert_eq!(parse_duration("01:02:03"), 3723);
        assert_eq!(parse_duration(" 00:10:00 "), 600);
    }

    #[test]
    fn test_parse_duration_malformed_is_zero() {
        assert_eq!(parse_duration("bad"), 0);
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("0:00:05"), 0);
        assert_eq!(parse_duration("00:60:00"), 0);
        assert_eq!(parse_duration("24:00:00"), 0);
        assert_eq!(parse_duration("00:00:05 PM"), 0);
    }

    #[test]
    fn test_countdown_sequence_and_expiry() {
        let mut timer = CountdownTimer::new();
        timer.start(parse_duration("00:00:05"));

        let steps: Vec<CountdownStep> = (0..5).map(|_| timer.tick()).collect();
        let ticks: Vec<u64> = steps.iter().filter_map(|step| step.tick).collect();
        assert_eq!(ticks, vec![4, 3, 2, 1, 0]);
        assert!(steps[..4].iter().all(|step| !step.expired));
        assert!(steps[4].expired);
        assert!(!timer.is_running());
        assert!(timer.is_ringing());

        assert_eq!(timer.tick(), CountdownStep::IDLE);
        assert_eq!(timer.remaining_seconds(), 0);
    }

    #[test]
    fn test_start_zero_expires_on_first_tick() {
        let mut timer = CountdownTimer::new();
        timer.start(parse_duration("bad"));

        let step = timer.tick();
        assert_eq!(step.tick, None);
        assert!(step.expired);
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_stop_preserves_remaining() {
        let mut timer = CountdownTimer::new();
        timer.start(10);
        timer.tick();
        timer.stop();
        assert_eq!(timer.tick(), CountdownStep::IDLE);
        assert_eq!(timer.remaining_seconds(), 9);
    }

    #[test]
    fn test_clear_resets_and_silences() {
        let mut timer = CountdownTimer::new();
        timer.start(1);
        timer.tick();
        assert!(timer.is_ringing());

        assert!(timer.clear());
        assert_eq!(timer, CountdownTimer::new());
        assert!(!timer.clear());
    }

    #[test]
    fn test_stop_sound_only_when_ringing() {
        let mut timer = CountdownTimer::new();
        timer.start(30);
        assert!(!timer.stop_sound());
        assert_eq!(timer.remaining_seconds(), 30);

        timer.start(0);
        timer.tick();
        assert!(timer.stop_sound());
        assert!(!timer.is_ringing());
    }

    #[test]
    fn test_load_does_not_start() {
        let mut timer = CountdownTimer::new();
        timer.load(parse_duration("00:01:00"));
        assert_eq!(timer.remaining_seconds(), 60);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), CountdownStep::IDLE);
    }
}
