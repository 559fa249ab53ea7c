use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::Duration;

use chrono::Utc;

/// Source of wall-clock seconds for time-derived identifiers. Injectable so
/// tests can pin identifier generation.
pub trait Clock: Send + Sync {
    fn unix_seconds(&self) -> i64;
}

/// Real wall clock.
#[derive(Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn unix_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Test clock that starts at a fixed instant and advances by one second per
/// reading, so consecutive identifiers never collide.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn starting_at(seconds: i64) -> Self {
        Self {
            now: AtomicI64::new(seconds),
        }
    }
}

impl Clock for ManualClock {
    fn unix_seconds(&self) -> i64 {
        self.now.fetch_add(1, Ordering::SeqCst)
    }
}

/// Presentation-only delays between stages and iterations. The original
/// pipeline slept to mimic processing latency; nothing downstream depends on
/// the timing, so the default is no delay at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub stage_delay: Duration,
    pub iteration_delay: Duration,
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            stage_delay: Duration::ZERO,
            iteration_delay: Duration::ZERO,
        }
    }

    pub fn new(stage_delay: Duration, iteration_delay: Duration) -> Self {
        Self {
            stage_delay,
            iteration_delay,
        }
    }

    pub fn from_millis(stage_ms: u64, iteration_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(stage_ms),
            Duration::from_millis(iteration_ms),
        )
    }

    pub fn after_stage(&self) {
        if !self.stage_delay.is_zero() {
            thread::sleep(self.stage_delay);
        }
    }

    pub fn between_iterations(&self) {
        if !self.iteration_delay.is_zero() {
            thread::sleep(self.iteration_delay);
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::none()
    }
}
