//! Monotonic time sources.
//!
//! The scheduler consumes time exclusively through the [`TimeSource`]
//! trait: a monotonic millisecond counter plus the ability to wait for a
//! deadline. [`SimClock`] realizes waiting by advancing the counter, which
//! makes whole runs reproducible; [`SystemClock`] sleeps on the real clock.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic millisecond clock.
///
/// `now` never decreases. `wait_until` returns once `now() >= deadline`;
/// how the time passes is the implementation's business.
pub trait TimeSource: Send + Sync {
    /// Current time in milliseconds.
    fn now(&self) -> u64;

    /// Blocks (or advances) until `now() >= deadline`.
    fn wait_until(&self, deadline: u64);
}

/// A simulated clock advanced manually or by the run loop.
///
/// Handles are cheap clones sharing one counter, so a test harness can keep
/// a handle while the scheduler owns another.
///
/// # Examples
///
/// ```
/// use task_scheduler::{SimClock, TimeSource};
///
/// let clock = SimClock::new();
/// assert_eq!(clock.now(), 0);
/// clock.advance(250);
/// assert_eq!(clock.now(), 250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    millis: Arc<Mutex<u64>>,
}

impl SimClock {
    /// Creates a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        let mut millis = self.millis.lock();
        *millis = millis.saturating_add(ms);
    }

    /// Advances the clock to an absolute time.
    ///
    /// Targets at or before the current time are ignored; the clock is
    /// monotonic.
    pub fn advance_to(&self, target: u64) {
        let mut millis = self.millis.lock();
        if target > *millis {
            *millis = target;
        }
    }
}

impl TimeSource for SimClock {
    fn now(&self) -> u64 {
        *self.millis.lock()
    }

    fn wait_until(&self, deadline: u64) {
        self.advance_to(deadline);
    }
}

/// A real-time clock measuring milliseconds since its creation.
///
/// `wait_until` sleeps the current thread, so a scheduler driven by a
/// `SystemClock` runs timers against wall-clock time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose zero is the moment of creation.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wait_until(&self, deadline: u64) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(Duration::from_millis(deadline - now));
        }
    }
}
