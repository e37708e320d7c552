//! Fixed request pacing.
//!
//! Holds the calling thread so that `interval` of idle time separates the end
//! of one provider response from the start of the next request. The interval
//! never adapts and there is no backoff.

use std::cell::Cell;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Cell<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Cell::new(None),
        }
    }

    /// No pacing; for tests and local mirrors.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until `interval` has passed since the last `done`. Blocks
    /// nothing before the first `done`.
    pub fn wait(&self) {
        if let Some(last) = self.last.get() {
            let remaining = self.interval.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                std::thread::sleep(remaining);
            }
        }
    }

    /// Mark the end of a request, successful or not.
    pub fn done(&self) {
        self.last.set(Some(Instant::now()));
    }
}
