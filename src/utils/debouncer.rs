use std::time::{Duration, Instant};

/// Fires once after a period of inactivity following the last event
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_event: None,
        }
    }

    /// Register an event, restarting the quiet period
    pub fn trigger(&mut self) {
        self.last_event = Some(Instant::now());
    }

    /// True once the quiet period has elapsed; clears the pending event
    pub fn should_execute(&mut self) -> bool {
        match self.last_event {
            Some(last) if last.elapsed() >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before a pending event fires
    pub fn time_remaining(&self) -> Option<Duration> {
        self.last_event
            .map(|last| self.delay.saturating_sub(last.elapsed()))
    }

    pub fn reset(&mut self) {
        self.last_event = None;
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }
}
