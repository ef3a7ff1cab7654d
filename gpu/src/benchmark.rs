//! Wall-clock timing for run phases.
//!
//! Timings go to the log at `info` level, never to stdout.

use std::time::{Duration, Instant};

use log::info;

/// Named stopwatch that reports on `lap`, `stop`, or drop.
pub struct Benchmark {
    title: String,
    start: Instant,
    stopped: bool,
}

impl Benchmark {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Report the time since the last lap and restart the clock.
    pub fn lap(&mut self) -> Duration {
        let elapsed = self.report();
        self.start = Instant::now();
        elapsed
    }

    /// Report once and suppress the report on drop.
    pub fn stop(&mut self) -> Option<Duration> {
        if self.stopped {
            return None;
        }
        self.stopped = true;
        Some(self.report())
    }

    fn report(&self) -> Duration {
        let elapsed = self.start.elapsed();
        info!("[{}] elapsed time: {:.6} s", self.title, elapsed.as_secs_f64());
        elapsed
    }
}

impl Drop for Benchmark {
    fn drop(&mut self) {
        if !self.stopped {
            self.report();
        }
    }
}
