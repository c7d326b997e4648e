//! Gesture Classifier
//!
//! A three-state machine (`Idle`, `Moving`, `Clicking`) over per-frame finger
//! signals. Entering `Clicking` and leaving it are each reported exactly once
//! (`ClickDown` / `ClickUp`), so downstream press/release calls always pair up
//! no matter how long a pinch is held. The pinch uses two thresholds: it
//! closes below `trigger` and only opens again above `release`, which keeps a
//! distance hovering near one boundary from toggling the button.

use super::finger_state::{FingerState, HandSignals};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Classifier state carried between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    Moving,
    Clicking,
}

/// Classifier output, exactly one per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureIntent {
    Idle,
    Move,
    ClickDown,
    ClickHeld,
    ClickUp,
}

/// Thresholds and pose options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    /// Pinch closes when the tip distance drops strictly below this (pixels)
    pub trigger: f64,
    /// Pinch opens when the tip distance rises strictly above this (pixels)
    pub release: f64,
    /// Point pose also requires the thumb folded
    pub require_thumb_retracted: bool,
}

impl GestureThresholds {
    pub fn new(trigger: f64, release: f64) -> crate::Result<Self> {
        if !(trigger > 0.0 && trigger.is_finite()) {
            return Err(crate::Error::Config(format!(
                "click trigger distance must be positive, got {}",
                trigger
            )));
        }
        if !(release > trigger && release.is_finite()) {
            return Err(crate::Error::Config(format!(
                "click release distance ({}) must exceed trigger distance ({})",
                release, trigger
            )));
        }
        Ok(Self {
            trigger,
            release,
            require_thumb_retracted: true,
        })
    }

    pub fn with_thumb_retracted(mut self, require: bool) -> Self {
        self.require_thumb_retracted = require;
        self
    }
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            trigger: 25.0,
            release: 35.0,
            require_thumb_retracted: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pose {
    /// Index up, middle/ring/pinky down (thumb too unless opted out)
    Point,
    /// Index and middle up
    Pinch,
    Other,
}

/// Hand-gesture state machine
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
    state: GestureState,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Replace thresholds, e.g. after the source resolution changed.
    /// The current state is kept.
    pub fn set_thresholds(&mut self, thresholds: GestureThresholds) {
        self.thresholds = thresholds;
    }

    /// Back to `Idle` without emitting anything
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Advance one frame. `None` means no hand this frame.
    pub fn update(&mut self, signals: Option<&HandSignals>) -> GestureIntent {
        let (next, intent) = self.transition(signals);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?intent, "Gesture transition");
        }
        self.state = next;
        intent
    }

    /// End of stream: a held pinch is released, anything else goes idle.
    pub fn release(&mut self) -> GestureIntent {
        self.update(None)
    }

    fn transition(&self, signals: Option<&HandSignals>) -> (GestureState, GestureIntent) {
        use GestureIntent as I;
        use GestureState as S;

        let Some(signals) = signals else {
            return match self.state {
                S::Clicking => (S::Idle, I::ClickUp),
                S::Idle | S::Moving => (S::Idle, I::Idle),
            };
        };

        let d = signals.pinch_distance;
        let pinch_closed = d < self.thresholds.trigger;
        let pinch_open = d > self.thresholds.release;

        match (self.state, self.pose(&signals.fingers)) {
            (S::Idle | S::Moving, Pose::Pinch) if pinch_closed => (S::Clicking, I::ClickDown),
            (S::Idle, Pose::Point) => (S::Moving, I::Move),
            (S::Idle, _) => (S::Idle, I::Idle),

            (S::Moving, Pose::Point | Pose::Pinch) => (S::Moving, I::Move),
            (S::Moving, Pose::Other) => (S::Idle, I::Idle),

            (S::Clicking, Pose::Pinch) if pinch_open => (S::Moving, I::ClickUp),
            (S::Clicking, Pose::Pinch) => (S::Clicking, I::ClickHeld),
            (S::Clicking, Pose::Point) => (S::Moving, I::ClickUp),
            (S::Clicking, Pose::Other) => (S::Idle, I::ClickUp),
        }
    }

    fn pose(&self, fingers: &FingerState) -> Pose {
        if fingers.index && fingers.middle {
            Pose::Pinch
        } else if fingers.index
            && !fingers.ring
            && !fingers.pinky
            && !(self.thresholds.require_thumb_retracted && fingers.thumb)
        {
            // middle is known retracted here
            Pose::Point
        } else {
            Pose::Other
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}
