//! Exponential cursor smoothing
//!
//! `s' = s + α·(raw − s)` per axis. One parameter trades jitter against lag:
//! a static target is approached geometrically, the remaining error after
//! `n` frames being `(1 − α)^n` of the initial error.

use super::mapper::ScreenPoint;
use serde::{Deserialize, Serialize};

/// Where the smoothed cursor starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingSeed {
    /// Start at the screen center and glide to the first sample
    #[default]
    ScreenCenter,
    /// Jump to the first sample
    FirstSample,
}

/// Exponential smoothing filter over screen positions
#[derive(Debug, Clone)]
pub struct MotionSmoother {
    alpha: f64,
    position: Option<ScreenPoint>,
}

impl MotionSmoother {
    /// `alpha` must lie strictly between 0 and 1.
    pub fn new(alpha: f64) -> crate::Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(crate::Error::Config(format!(
                "smoothing factor must be in (0, 1), got {}",
                alpha
            )));
        }
        Ok(Self {
            alpha,
            position: None,
        })
    }

    /// Seed according to policy; `center` is used for `ScreenCenter`.
    pub fn seeded(mut self, seed: SmoothingSeed, center: ScreenPoint) -> Self {
        self.position = match seed {
            SmoothingSeed::ScreenCenter => Some(center),
            SmoothingSeed::FirstSample => None,
        };
        self
    }

    /// Start from an explicit position
    pub fn starting_at(mut self, position: ScreenPoint) -> Self {
        self.position = Some(position);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Current smoothed position; `None` until seeded
    pub fn position(&self) -> Option<ScreenPoint> {
        self.position
    }

    /// Feed one raw sample and return the new smoothed position
    pub fn update(&mut self, raw: ScreenPoint) -> ScreenPoint {
        let next = match self.position {
            None => raw,
            Some(prev) => ScreenPoint::new(
                prev.x + self.alpha * (raw.x - prev.x),
                prev.y + self.alpha * (raw.y - prev.y),
            ),
        };
        self.position = Some(next);
        next
    }

    /// Frames needed for a static target to come within `tolerance` of it,
    /// starting `initial_error` away.
    pub fn frames_to_converge(&self, initial_error: f64, tolerance: f64) -> u32 {
        if initial_error <= tolerance {
            return 0;
        }
        let n = (tolerance / initial_error).ln() / (1.0 - self.alpha).ln();
        n.ceil() as u32
    }
}
