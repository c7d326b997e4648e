//! Frame clock
//!
//! Monotonic microsecond timestamps relative to the start of a run, plus a
//! running frames-per-second estimate.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Microseconds since the owning `FrameClock` started
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Microseconds since `earlier`, 0 if `earlier` is later
    #[inline]
    pub fn micros_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Monotonic clock anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp(self.start.elapsed().as_micros() as u64)
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Exponentially averaged frame rate
#[derive(Debug, Clone)]
pub struct FrameRate {
    /// Weight of the newest interval
    weight: f64,
    last: Option<Timestamp>,
    fps: Option<f64>,
}

impl FrameRate {
    pub fn new(weight: f64) -> Self {
        Self {
            weight: weight.clamp(f64::EPSILON, 1.0),
            last: None,
            fps: None,
        }
    }

    /// Register a frame captured at `at`; returns the current estimate.
    pub fn tick(&mut self, at: Timestamp) -> Option<f64> {
        if let Some(last) = self.last {
            let dt = at.micros_since(last);
            if dt > 0 {
                let instant = 1_000_000.0 / dt as f64;
                self.fps = Some(match self.fps {
                    Some(prev) => prev + self.weight * (instant - prev),
                    None => instant,
                });
            }
        }
        self.last = Some(at);
        self.fps
    }

    pub fn fps(&self) -> Option<f64> {
        self.fps
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(0.1)
    }
}
