//! Finger State Extraction
//!
//! Per-frame "finger extended" flags and landmark distances. The rules are
//! plain axis comparisons in image coordinates (y grows downward), so they
//! assume a roughly upright hand facing the camera. No smoothing happens
//! here; hysteresis belongs to the gesture classifier.

use crate::capture::types::{landmarks, Handedness, LandmarkFrame};
use serde::{Deserialize, Serialize};

/// Finger identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Landmark id of the fingertip
    pub fn tip(&self) -> usize {
        match self {
            Finger::Thumb => landmarks::THUMB_TIP,
            Finger::Index => landmarks::INDEX_TIP,
            Finger::Middle => landmarks::MIDDLE_TIP,
            Finger::Ring => landmarks::RING_TIP,
            Finger::Pinky => landmarks::PINKY_TIP,
        }
    }

    /// Landmark id of the joint the tip is compared against
    pub fn reference_joint(&self) -> usize {
        match self {
            Finger::Thumb => landmarks::THUMB_IP,
            Finger::Index => landmarks::INDEX_PIP,
            Finger::Middle => landmarks::MIDDLE_PIP,
            Finger::Ring => landmarks::RING_PIP,
            Finger::Pinky => landmarks::PINKY_PIP,
        }
    }
}

/// Extended/retracted flag per finger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn is_extended(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    /// Number of extended fingers
    pub fn count(&self) -> usize {
        Finger::ALL.iter().filter(|f| self.is_extended(**f)).count()
    }

    /// Flags in thumb-to-pinky order, 1 = up
    pub fn as_bits(&self) -> [u8; 5] {
        Finger::ALL.map(|f| self.is_extended(f) as u8)
    }
}

/// Everything the gesture classifier needs from one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSignals {
    pub fingers: FingerState,
    /// Distance between index and middle fingertips, source-frame pixels
    pub pinch_distance: f64,
}

/// Derive finger flags from a landmark frame.
pub fn finger_state(frame: &LandmarkFrame) -> FingerState {
    FingerState {
        thumb: thumb_extended(frame),
        index: vertical_extended(frame, Finger::Index),
        middle: vertical_extended(frame, Finger::Middle),
        ring: vertical_extended(frame, Finger::Ring),
        pinky: vertical_extended(frame, Finger::Pinky),
    }
}

// Tip above its PIP joint
fn vertical_extended(frame: &LandmarkFrame, finger: Finger) -> bool {
    frame.point(finger.tip()).y < frame.point(finger.reference_joint()).y
}

// The thumb folds sideways, so compare x. Mirrored for a left hand.
fn thumb_extended(frame: &LandmarkFrame) -> bool {
    let tip = frame.point(Finger::Thumb.tip()).x;
    let ip = frame.point(Finger::Thumb.reference_joint()).x;
    match frame.handedness() {
        Handedness::Left => tip < ip,
        Handedness::Right | Handedness::Unknown => tip > ip,
    }
}

/// Pixel distance between two landmarks
pub fn distance(frame: &LandmarkFrame, a: usize, b: usize) -> f64 {
    frame.point(a).distance_to(&frame.point(b))
}

/// Index-to-middle fingertip distance
pub fn pinch_distance(frame: &LandmarkFrame) -> f64 {
    distance(frame, landmarks::INDEX_TIP, landmarks::MIDDLE_TIP)
}

/// Finger flags plus pinch distance in one pass
pub fn extract(frame: &LandmarkFrame) -> HandSignals {
    HandSignals {
        fingers: finger_state(frame),
        pinch_distance: pinch_distance(frame),
    }
}
