//! # Timing Source
//!
//! Wall-clock provider shared by the state machine (pause accounting) and the
//! aggregator (time bucketing). Times are Unix seconds as `f64`, the same unit
//! location samples carry, so durations are plain subtractions.
//!
//! Swap [`SystemClock`] for [`ManualClock`] to drive a session deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// Source of the current wall-clock time in Unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Real wall clock backed by `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Hand-driven clock.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// while the engine owns another.
///
/// ```
/// use workout_tracker::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(100.0);
/// let handle = clock.clone();
/// handle.advance(5.0);
/// assert_eq!(clock.now(), 105.0);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    /// Jump to an absolute time. Going backwards is allowed (clock skew).
    pub fn set(&self, now: f64) {
        self.bits.store(now.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
