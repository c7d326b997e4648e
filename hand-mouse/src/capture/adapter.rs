//! Landmark Frame Adapter
//!
//! Normalizes a raw detection into at most one fixed-size landmark frame.
//! Absence and malformed input are ordinary per-frame outcomes, never errors.

use super::types::{
    CandidateHand, CoordinateSpace, Detection, HandObservation, LandmarkFrame, LandmarkPoint,
    LANDMARK_COUNT,
};
use tracing::{debug, trace};

/// Selects the primary hand of a detection and converts it to a `LandmarkFrame`
#[derive(Debug, Clone)]
pub struct LandmarkAdapter {
    /// Candidates below this confidence are ignored
    pub min_confidence: f64,
}

impl LandmarkAdapter {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Adapt one detection.
    ///
    /// The highest-confidence candidate at or above `min_confidence` wins;
    /// ties go to the earliest candidate in tracker order.
    pub fn adapt(&self, detection: &Detection) -> HandObservation {
        let Some(hand) = self.select_primary(&detection.hands) else {
            trace!(candidates = detection.hands.len(), "No usable hand in frame");
            return HandObservation::Absent;
        };

        if hand.landmarks.len() != LANDMARK_COUNT {
            debug!(
                count = hand.landmarks.len(),
                "Rejecting hand with wrong landmark count"
            );
            return HandObservation::Absent;
        }

        let mut points = [LandmarkPoint::default(); LANDMARK_COUNT];
        for (slot, raw) in points.iter_mut().zip(&hand.landmarks) {
            let p = to_pixels(*raw, detection);
            if !p.is_finite() {
                debug!("Rejecting hand with non-finite landmark");
                return HandObservation::Absent;
            }
            *slot = p;
        }

        HandObservation::Present(LandmarkFrame::new(points, hand.handedness))
    }

    fn select_primary<'a>(&self, hands: &'a [CandidateHand]) -> Option<&'a CandidateHand> {
        let mut best: Option<&CandidateHand> = None;
        for hand in hands {
            if hand.confidence.is_nan() || hand.confidence < self.min_confidence {
                continue;
            }
            // Strict comparison keeps the earliest of equally confident hands
            if best.map_or(true, |b| hand.confidence > b.confidence) {
                best = Some(hand);
            }
        }
        best
    }
}

impl Default for LandmarkAdapter {
    fn default() -> Self {
        Self::new(0.5)
    }
}

fn to_pixels(p: LandmarkPoint, detection: &Detection) -> LandmarkPoint {
    match detection.space {
        CoordinateSpace::Pixels => p,
        CoordinateSpace::Normalized => LandmarkPoint::new(
            p.x * detection.frame_width as f64,
            p.y * detection.frame_height as f64,
        ),
    }
}
