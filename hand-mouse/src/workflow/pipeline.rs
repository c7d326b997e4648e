//! Frame Pipeline
//!
//! Runs one tracker detection through adapt → extract → classify → map →
//! smooth. Everything that must survive between frames lives in
//! `PipelineState`, so a session can be replayed from a recording and give
//! the same intents and cursor path.

use crate::analysis::finger_state;
use crate::analysis::gesture::{GestureClassifier, GestureIntent, GestureState, GestureThresholds};
use crate::app::config::Config;
use crate::capture::adapter::LandmarkAdapter;
use crate::capture::types::{Detection, HandObservation};
use crate::motion::mapper::{CoordinateMapper, ScreenPoint};
use crate::motion::smoothing::MotionSmoother;
use tracing::{trace, warn};

/// What one frame produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Classifier output for this frame
    pub intent: GestureIntent,
    /// Smoothed cursor, if it was updated this frame
    pub cursor: Option<ScreenPoint>,
    /// A usable hand was found
    pub hand_present: bool,
    /// Hand present but the index fingertip was outside the active area
    pub out_of_range: bool,
}

/// Cross-frame state: gesture state and cursor position
#[derive(Debug, Clone)]
pub struct PipelineState {
    classifier: GestureClassifier,
    smoother: MotionSmoother,
}

impl PipelineState {
    pub fn gesture_state(&self) -> GestureState {
        self.classifier.state()
    }

    /// Last smoothed cursor position
    pub fn cursor(&self) -> Option<ScreenPoint> {
        self.smoother.position()
    }
}

/// Stateless per-frame stages built from a `Config`
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Configuration as loaded; recalibration always scales from this
    base: Config,
    /// Configuration for the frame size currently seen
    active: Config,
    adapter: LandmarkAdapter,
    mapper: CoordinateMapper,
    thresholds: GestureThresholds,
}

impl Pipeline {
    pub fn new(config: Config) -> crate::Result<Self> {
        config.validate()?;
        let (mapper, thresholds) = Self::stages(&config)?;
        Ok(Self {
            adapter: LandmarkAdapter::new(config.gesture.min_detection_confidence),
            mapper,
            thresholds,
            active: config.clone(),
            base: config,
        })
    }

    fn stages(config: &Config) -> crate::Result<(CoordinateMapper, GestureThresholds)> {
        let mapper = CoordinateMapper::new(
            config.frame.source_frame_width,
            config.frame.source_frame_height,
            config.frame.frame_margin,
            config.screen.screen_width,
            config.screen.screen_height,
        )?
        .with_mirror_x(config.frame.mirror_x);

        let thresholds = GestureThresholds::new(
            config.gesture.click_trigger_distance,
            config.gesture.click_release_distance,
        )?
        .with_thumb_retracted(config.gesture.require_thumb_retracted);

        Ok((mapper, thresholds))
    }

    /// Config in effect, after any recalibration
    pub fn config(&self) -> &Config {
        &self.active
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Fresh state: classifier idle, smoother seeded per config
    pub fn initial_state(&self) -> crate::Result<PipelineState> {
        let smoother = MotionSmoother::new(self.active.smoothing.smoothing_factor)?
            .seeded(self.active.smoothing.seed, self.mapper.screen_center());
        Ok(PipelineState {
            classifier: GestureClassifier::new(self.thresholds),
            smoother,
        })
    }

    /// Process one detection
    pub fn step(&mut self, state: &mut PipelineState, detection: &Detection) -> crate::Result<FrameOutcome> {
        self.recalibrate_for(state, detection)?;

        let observation = self.adapter.adapt(detection);
        let HandObservation::Present(frame) = observation else {
            let intent = state.classifier.update(None);
            return Ok(FrameOutcome {
                intent,
                cursor: None,
                hand_present: false,
                out_of_range: false,
            });
        };

        let signals = finger_state::extract(&frame);
        let intent = state.classifier.update(Some(&signals));

        let cursor = self.mapper.map(frame.index_tip()).map(|raw| state.smoother.update(raw));
        trace!(?intent, fingers = ?signals.fingers.as_bits(), pinch = signals.pinch_distance, ?cursor, "Frame");

        Ok(FrameOutcome {
            intent,
            cursor,
            hand_present: true,
            out_of_range: cursor.is_none(),
        })
    }

    /// End of stream: force a held click to be released
    pub fn finish(&self, state: &mut PipelineState) -> GestureIntent {
        state.classifier.release()
    }

    /// Rescale pixel-space settings when the tracker reports a frame size
    /// other than the one currently configured. Zero sizes are ignored.
    fn recalibrate_for(&mut self, state: &mut PipelineState, detection: &Detection) -> crate::Result<()> {
        let (w, h) = (detection.frame_width, detection.frame_height);
        if w == 0 || h == 0
            || (w == self.active.frame.source_frame_width && h == self.active.frame.source_frame_height)
        {
            return Ok(());
        }

        let rescaled = self.base.rescaled_for_frame(w, h);
        rescaled.validate()?;
        let (mapper, thresholds) = Self::stages(&rescaled)?;
        warn!(
            from = %format!("{}x{}", self.active.frame.source_frame_width, self.active.frame.source_frame_height),
            to = %format!("{}x{}", w, h),
            margin = rescaled.frame.frame_margin,
            trigger = rescaled.gesture.click_trigger_distance,
            release = rescaled.gesture.click_release_distance,
            "Source frame size changed; recalibrating"
        );

        self.mapper = mapper;
        self.thresholds = thresholds;
        self.active = rescaled;
        state.classifier.set_thresholds(thresholds);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::types::{landmarks, CandidateHand, LandmarkPoint, LANDMARK_COUNT};

    /// Hand with only the index finger up, tip at `(x, y)`
    fn pointing_hand(x: f64, y: f64) -> CandidateHand {
        let mut points = vec![LandmarkPoint::new(x, y + 100.0); LANDMARK_COUNT];
        // Folded fingers: tip below PIP
        for (tip, pip) in [(12, 10), (16, 14), (20, 18)] {
            points[pip] = LandmarkPoint::new(x + 20.0, y + 60.0);
            points[tip] = LandmarkPoint::new(x + 20.0, y + 80.0);
        }
        points[landmarks::INDEX_PIP] = LandmarkPoint::new(x, y + 40.0);
        points[landmarks::INDEX_TIP] = LandmarkPoint::new(x, y);
        // Thumb folded: tip left of IP
        points[landmarks::THUMB_IP] = LandmarkPoint::new(x - 10.0, y + 70.0);
        points[landmarks::THUMB_TIP] = LandmarkPoint::new(x - 20.0, y + 70.0);
        CandidateHand::new(points, 0.9)
    }

    /// Index and middle up with tips `gap` apart
    fn pinching_hand(x: f64, y: f64, gap: f64) -> CandidateHand {
        let mut hand = pointing_hand(x, y);
        hand.landmarks[landmarks::MIDDLE_PIP] = LandmarkPoint::new(x + gap, y + 40.0);
        hand.landmarks[landmarks::MIDDLE_TIP] = LandmarkPoint::new(x + gap, y);
        hand
    }

    fn detect(hand: CandidateHand) -> Detection {
        Detection::with_hands(640, 480, vec![hand])
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(Config::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.gesture.click_release_distance = 10.0;
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn test_initial_state_seeds_screen_center() {
        let state = pipeline().initial_state().unwrap();
        assert_eq!(state.gesture_state(), GestureState::Idle);
        assert_eq!(state.cursor(), Some(ScreenPoint::new(960.0, 540.0)));
    }

    #[test]
    fn test_pointing_moves_toward_fingertip() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();

        let out = p.step(&mut state, &detect(pointing_hand(320.0, 240.0))).unwrap();
        assert_eq!(out.intent, GestureIntent::Move);
        assert!(out.hand_present);
        assert!(!out.out_of_range);
        // Frame center maps to screen center, mirrored or not
        let c = out.cursor.unwrap();
        assert!(c.distance_to(&ScreenPoint::new(960.0, 540.0)) < 1e-9);
        assert_eq!(state.gesture_state(), GestureState::Moving);
    }

    #[test]
    fn test_empty_detection_is_absent() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();
        let out = p.step(&mut state, &Detection::empty(640, 480)).unwrap();
        assert_eq!(out.intent, GestureIntent::Idle);
        assert!(!out.hand_present);
        assert!(out.cursor.is_none());
    }

    #[test]
    fn test_out_of_range_keeps_cursor() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();
        let before = state.cursor();

        let out = p.step(&mut state, &detect(pointing_hand(50.0, 240.0))).unwrap();
        assert_eq!(out.intent, GestureIntent::Move);
        assert!(out.out_of_range);
        assert!(out.cursor.is_none());
        assert_eq!(state.cursor(), before);
    }

    #[test]
    fn test_pinch_clicks_then_releases() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();

        let intents: Vec<_> = [10.0, 10.0, 30.0, 50.0]
            .iter()
            .map(|&gap| p.step(&mut state, &detect(pinching_hand(320.0, 240.0, gap))).unwrap().intent)
            .collect();
        assert_eq!(
            intents,
            vec![
                GestureIntent::ClickDown,
                GestureIntent::ClickHeld,
                GestureIntent::ClickHeld,
                GestureIntent::ClickUp
            ]
        );
    }

    #[test]
    fn test_finish_releases_held_click() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();
        p.step(&mut state, &detect(pinching_hand(320.0, 240.0, 5.0))).unwrap();
        assert_eq!(state.gesture_state(), GestureState::Clicking);
        assert_eq!(p.finish(&mut state), GestureIntent::ClickUp);
        assert_eq!(p.finish(&mut state), GestureIntent::Idle);
    }

    #[test]
    fn test_recalibrates_on_frame_size_change() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();

        // Twice the resolution: a 40px gap is a 20px gap at 640x480
        let hand = pinching_hand(640.0, 480.0, 40.0);
        let out = p.step(&mut state, &Detection::with_hands(1280, 960, vec![hand])).unwrap();

        assert_eq!(p.config().frame.source_frame_width, 1280);
        assert_eq!(p.config().gesture.click_trigger_distance, 50.0);
        assert_eq!(out.intent, GestureIntent::ClickDown);
        assert!(out.cursor.unwrap().distance_to(&ScreenPoint::new(960.0, 540.0)) < 1e-9);
    }

    #[test]
    fn test_recalibration_scales_from_loaded_config() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();
        p.step(&mut state, &Detection::empty(1280, 960)).unwrap();
        p.step(&mut state, &Detection::empty(640, 480)).unwrap();
        assert_eq!(p.config(), &Config::default());
    }

    #[test]
    fn test_zero_frame_size_does_not_recalibrate() {
        let mut p = pipeline();
        let mut state = p.initial_state().unwrap();
        p.step(&mut state, &Detection::empty(0, 0)).unwrap();
        assert_eq!(p.config(), &Config::default());
    }
}
