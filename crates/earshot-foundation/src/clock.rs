//! # Clock Abstraction for Test Determinism
//!
//! All watchdog and restart timers in this codebase are plain `Instant`
//! deadlines compared against a `Clock` on each evaluation tick. Tests
//! inject a `TestClock` and advance it explicitly, so timer behavior is
//! deterministic without real sleeps.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Clock trait for time abstraction
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> Instant;
}

/// Real-time clock implementation
#[derive(Default)]
pub struct RealClock;

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock for deterministic testing
pub struct TestClock {
    current: Mutex<Instant>,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Instant::now()),
        }
    }

    /// Advance the virtual clock by the specified duration
    pub fn advance(&self, duration: Duration) {
        let mut now = self.current.lock().unwrap();
        *now += duration;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap()
    }
}

/// Thread-safe clock that can be shared across tasks
pub type SharedClock = std::sync::Arc<dyn Clock + Send + Sync>;

/// Create a real-time clock
pub fn real_clock() -> SharedClock {
    std::sync::Arc::new(RealClock::new())
}

/// Create a test clock
pub fn test_clock() -> std::sync::Arc<TestClock> {
    std::sync::Arc::new(TestClock::new())
}
