/// Free-running elapsed-seconds counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed_seconds: u64,
    running: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Zeroes and stops, whatever the previous state.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_seconds = 0;
    }

    /// Returns the new elapsed count, or `None` while stopped.
    pub fn tick(&mut self) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        Some(self.elapsed_seconds)
    }
}
