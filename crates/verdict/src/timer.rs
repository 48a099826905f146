//! Wall-clock timer around a single invocation.

use std::time::{Duration, Instant};

/// Measures how long the function under test ran.
///
/// The handler starts it immediately before the call and stops it immediately
/// after, so argument parsing and comparison are never included. Once stopped,
/// [`elapsed`](TestTimer::elapsed) is fixed until the timer is started again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestTimer {
    started: Option<Instant>,
    elapsed: Duration,
}

impl TestTimer {
    /// Create a stopped timer with zero elapsed time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) measuring. Any previous measurement is discarded.
    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.started = Some(Instant::now());
    }

    /// Stop measuring. Stopping a stopped timer has no effect.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }

    /// Whether the timer is currently measuring.
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Measured duration; the running total if the timer has not been stopped.
    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(started) => started.elapsed(),
            None => self.elapsed,
        }
    }
}

/// Render a duration the way run reports print it: `<1 us`, `N us`, `N ms`
/// or `N.NN s`.
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros < 1 {
        "<1 us".to_string()
    } else if micros < 1_000 {
        format!("{micros} us")
    } else if micros < 1_000_000 {
        format!("{} ms", duration.as_millis())
    } else {
        format!("{:.2} s", duration.as_secs_f64())
    }
}
