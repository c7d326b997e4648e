//! Core types for landmark capture
//!
//! Defines the per-frame data structures handed from the tracking collaborator
//! to the gesture pipeline.

use serde::{Deserialize, Serialize};

/// Number of landmarks in a hand skeleton
pub const LANDMARK_COUNT: usize = 21;

/// Landmark ids (MediaPipe hand topology)
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A 2D point in source-frame pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &LandmarkPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Which hand the tracker believes it saw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

/// Coordinate space of the landmarks reported by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Source-frame pixels
    #[default]
    Pixels,
    /// Normalized to [0, 1] of frame width/height
    Normalized,
}

/// One candidate hand as reported by the tracking collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateHand {
    /// Landmark coordinates in tracker order (21 expected)
    pub landmarks: Vec<LandmarkPoint>,
    /// Detection confidence (0.0 to 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub handedness: Handedness,
}

fn default_confidence() -> f64 {
    1.0
}

impl CandidateHand {
    pub fn new(landmarks: Vec<LandmarkPoint>, confidence: f64) -> Self {
        Self {
            landmarks,
            confidence,
            handedness: Handedness::Unknown,
        }
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }
}

/// Result of running the hand detector on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Width of the analysed frame in pixels
    pub frame_width: u32,
    /// Height of the analysed frame in pixels
    pub frame_height: u32,
    #[serde(default)]
    pub space: CoordinateSpace,
    /// Candidate hands, in tracker order
    #[serde(default)]
    pub hands: Vec<CandidateHand>,
}

impl Detection {
    /// A detection with no hands
    pub fn empty(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            space: CoordinateSpace::Pixels,
            hands: Vec::new(),
        }
    }

    /// A pixel-space detection with the given hands
    pub fn with_hands(frame_width: u32, frame_height: u32, hands: Vec<CandidateHand>) -> Self {
        Self {
            frame_width,
            frame_height,
            space: CoordinateSpace::Pixels,
            hands,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// A detection stamped with its position in the stream.
///
/// This is the on-the-wire format of the tracker process (one JSON object per
/// line) and the element type of saved recordings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Frame sequence number
    #[serde(default)]
    pub frame: u64,
    /// Capture time in microseconds since stream start
    #[serde(default)]
    pub timestamp_us: u64,
    #[serde(flatten)]
    pub detection: Detection,
    /// Tracker-side failure for this frame, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionRecord {
    pub fn new(frame: u64, timestamp_us: u64, detection: Detection) -> Self {
        Self {
            frame,
            timestamp_us,
            detection,
            error: None,
        }
    }
}

/// Exactly 21 landmarks of the primary hand for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkFrame {
    points: [LandmarkPoint; LANDMARK_COUNT],
    handedness: Handedness,
}

impl LandmarkFrame {
    pub fn new(points: [LandmarkPoint; LANDMARK_COUNT], handedness: Handedness) -> Self {
        Self { points, handedness }
    }

    /// Landmark by id. Ids outside `0..21` are a programming error.
    pub fn point(&self, id: usize) -> LandmarkPoint {
        self.points[id]
    }

    pub fn points(&self) -> &[LandmarkPoint; LANDMARK_COUNT] {
        &self.points
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn index_tip(&self) -> LandmarkPoint {
        self.points[landmarks::INDEX_TIP]
    }
}

/// Per-frame outcome of the landmark adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandObservation {
    Present(LandmarkFrame),
    Absent,
}

impl HandObservation {
    pub fn is_present(&self) -> bool {
        matches!(self, HandObservation::Present(_))
    }

    pub fn frame(&self) -> Option<&LandmarkFrame> {
        match self {
            HandObservation::Present(frame) => Some(frame),
            HandObservation::Absent => None,
        }
    }
}
