//! Frame Loop
//!
//! Single-threaded driver: fetch frame → detect → pipeline → emit, one frame
//! at a time until the stream ends, a frame limit is hit, or the stop flag
//! is raised. Whatever ends the run, a held button is released before
//! returning.

use super::pipeline::{Pipeline, PipelineState};
use super::recording::{Recording, CHECKPOINT_INTERVAL};
use crate::analysis::gesture::GestureState;
use crate::app::config::Config;
use crate::capture::source::{FrameSource, HandDetector, RecordedDetector};
use crate::capture::types::Detection;
use crate::output::driver::PointerDriver;
use crate::output::emitter::{ActionEmitter, EmitterStats};
use crate::time::clock::{FrameClock, FrameRate};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Log the frame rate every N frames
const FPS_LOG_INTERVAL: u64 = 150;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    EndOfStream,
    StopRequested,
    FrameLimit,
}

/// Per-run statistics
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Frames processed
    pub frames: u64,
    /// Frames with a usable hand
    pub frames_with_hand: u64,
    /// Frames where the fingertip left the active area
    pub frames_out_of_range: u64,
    /// Tracker output that could not be parsed and was treated as no hand
    pub malformed_frames: u64,
    /// Pointer calls issued
    pub emitter: EmitterStats,
    pub elapsed_ms: u64,
    /// Smoothed frames per second at the end of the run
    pub fps: Option<f64>,
    pub final_state: GestureState,
    pub stop_reason: StopReason,
    /// Where the session recording was written
    pub recording: Option<PathBuf>,
}

struct Recorder {
    recording: Recording,
    path: PathBuf,
}

/// Drives a frame source through the pipeline into a pointer driver
pub struct FrameLoop {
    pipeline: Pipeline,
    stop: Arc<AtomicBool>,
    max_frames: Option<u64>,
    recorder: Option<Recorder>,
}

impl FrameLoop {
    pub fn new(config: Config) -> crate::Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(config)?,
            stop: Arc::new(AtomicBool::new(false)),
            max_frames: None,
            recorder: None,
        })
    }

    /// Share an externally owned stop flag (e.g. set by a Ctrl+C handler)
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Stop after `max_frames` frames; `None` runs until the stream ends
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Record every detection into `recording`, saved to `path` when the run ends
    pub fn recording_to(mut self, recording: Recording, path: PathBuf) -> Self {
        self.recorder = Some(Recorder { recording, path });
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run a source that already yields detections
    pub fn run<S, D>(&mut self, source: S, driver: &mut D) -> crate::Result<SessionSummary>
    where
        S: FrameSource<Frame = Detection>,
        D: PointerDriver + ?Sized,
    {
        self.run_with(source, &mut RecordedDetector, driver)
    }

    /// Run a source through `detector`. The source is dropped before this
    /// returns, which releases whatever capture device it holds.
    pub fn run_with<S, H, D>(
        &mut self,
        mut source: S,
        detector: &mut H,
        driver: &mut D,
    ) -> crate::Result<SessionSummary>
    where
        S: FrameSource,
        H: HandDetector<S::Frame>,
        D: PointerDriver + ?Sized,
    {
        let mut state = self.pipeline.initial_state()?;
        let mut emitter = ActionEmitter::default();
        let mut progress = Progress::new();

        info!(
            frame = %format!("{}x{}", self.pipeline.config().frame.source_frame_width, self.pipeline.config().frame.source_frame_height),
            screen = %format!("{}x{}", self.pipeline.config().screen.screen_width, self.pipeline.config().screen.screen_height),
            "Frame loop started"
        );

        let result = self.drive(&mut source, detector, driver, &mut state, &mut emitter, &mut progress);
        let malformed_frames = source.malformed_frames();
        drop(source);

        // End of stream, stop or failure: never leave the button down
        let intent = self.pipeline.finish(&mut state);
        let released = emitter
            .emit(driver, intent, None)
            .and_then(|_| emitter.release_if_held(driver));

        let recording = self.save_recording(progress.clock.elapsed_millis());

        let stop_reason = match result {
            Ok(reason) => reason,
            Err(e) => {
                error!("Frame loop failed after {} frames: {}", progress.frames, e);
                if let Err(release_err) = released {
                    warn!("Button release after failure also failed: {}", release_err);
                }
                if let Err(save_err) = recording {
                    warn!("Saving the recording after failure also failed: {}", save_err);
                }
                return Err(e);
            }
        };
        released?;
        let recording = recording?;

        let summary = SessionSummary {
            frames: progress.frames,
            frames_with_hand: progress.with_hand,
            frames_out_of_range: progress.out_of_range,
            malformed_frames,
            emitter: emitter.stats(),
            elapsed_ms: progress.clock.elapsed_millis(),
            fps: progress.rate.fps(),
            final_state: state.gesture_state(),
            stop_reason,
            recording,
        };
        info!(
            frames = summary.frames,
            clicks = summary.emitter.presses,
            reason = ?summary.stop_reason,
            "Frame loop stopped"
        );
        Ok(summary)
    }

    fn drive<S, H, D>(
        &mut self,
        source: &mut S,
        detector: &mut H,
        driver: &mut D,
        state: &mut PipelineState,
        emitter: &mut ActionEmitter,
        progress: &mut Progress,
    ) -> crate::Result<StopReason>
    where
        S: FrameSource,
        H: HandDetector<S::Frame>,
        D: PointerDriver + ?Sized,
    {
        loop {
            if self.stop.load(Ordering::SeqCst) {
                info!("Stop requested");
                return Ok(StopReason::StopRequested);
            }
            if self.max_frames.is_some_and(|max| progress.frames >= max) {
                return Ok(StopReason::FrameLimit);
            }

            let Some(frame) = source.next_frame()? else {
                debug!("End of frame stream");
                return Ok(StopReason::EndOfStream);
            };
            let now = progress.clock.now();
            let detection = detector.detect(&frame)?;

            let outcome = self.pipeline.step(state, &detection)?;
            emitter.emit(driver, outcome.intent, outcome.cursor)?;

            progress.frames += 1;
            progress.with_hand += outcome.hand_present as u64;
            progress.out_of_range += outcome.out_of_range as u64;
            if let Some(fps) = progress.rate.tick(now) {
                if progress.frames % FPS_LOG_INTERVAL == 0 {
                    info!(frames = progress.frames, fps = %format!("{:.1}", fps), "Tracking");
                }
            }

            if let Some(recorder) = self.recorder.as_mut() {
                recorder.recording.add_detection(detection, now.as_micros());
                if recorder.recording.len() % CHECKPOINT_INTERVAL == 0 {
                    if let Err(e) = recorder.recording.save_checkpoint(&recorder.path) {
                        warn!("Failed to save checkpoint: {}", e);
                    }
                }
            }
        }
    }

    fn save_recording(&mut self, elapsed_ms: u64) -> crate::Result<Option<PathBuf>> {
        let Some(mut recorder) = self.recorder.take() else {
            return Ok(None);
        };
        recorder.recording.finalize(elapsed_ms);
        if let Some(parent) = recorder.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        recorder.recording.save(&recorder.path)?;
        Recording::remove_checkpoint(&recorder.path);
        info!(
            "Saved {} frames to {}",
            recorder.recording.len(),
            recorder.path.display()
        );
        Ok(Some(recorder.path))
    }
}

struct Progress {
    clock: FrameClock,
    rate: FrameRate,
    frames: u64,
    with_hand: u64,
    out_of_range: u64,
}

impl Progress {
    fn new() -> Self {
        Self {
            clock: FrameClock::start(),
            rate: FrameRate::default(),
            frames: 0,
            with_hand: 0,
            out_of_range: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::source::VecSource;
    use crate::output::driver::{PointerAction, RecordingDriver};
    use tempfile::TempDir;

    struct FailingSource {
        frames: Vec<Detection>,
    }

    impl FrameSource for FailingSource {
        type Frame = Detection;

        fn next_frame(&mut self) -> crate::Result<Option<Detection>> {
            if self.frames.is_empty() {
                Err(crate::Error::Capture("camera unplugged".to_string()))
            } else {
                Ok(Some(self.frames.remove(0)))
            }
        }
    }

    fn empty_frames(n: usize) -> Vec<Detection> {
        vec![Detection::empty(640, 480); n]
    }

    #[test]
    fn test_runs_to_end_of_stream() {
        let mut frame_loop = FrameLoop::new(Config::default()).unwrap();
        let mut driver = RecordingDriver::new();
        let summary = frame_loop.run(VecSource::new(empty_frames(5)), &mut driver).unwrap();

        assert_eq!(summary.frames, 5);
        assert_eq!(summary.frames_with_hand, 0);
        assert_eq!(summary.stop_reason, StopReason::EndOfStream);
        assert_eq!(summary.final_state, GestureState::Idle);
        assert!(driver.actions.is_empty());
    }

    #[test]
    fn test_frame_limit() {
        let mut frame_loop = FrameLoop::new(Config::default()).unwrap().with_max_frames(Some(3));
        let mut driver = RecordingDriver::new();
        let summary = frame_loop.run(VecSource::new(empty_frames(10)), &mut driver).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.stop_reason, StopReason::FrameLimit);
    }

    #[test]
    fn test_stop_flag_checked_before_first_frame() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut frame_loop = FrameLoop::new(Config::default()).unwrap().with_stop_flag(stop);
        let mut driver = RecordingDriver::new();
        let summary = frame_loop.run(VecSource::new(empty_frames(10)), &mut driver).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.stop_reason, StopReason::StopRequested);
    }

    #[test]
    fn test_capture_failure_is_returned() {
        let mut frame_loop = FrameLoop::new(Config::default()).unwrap();
        let mut driver = RecordingDriver::new();
        let source = FailingSource { frames: empty_frames(2) };
        let result = frame_loop.run(source, &mut driver);
        assert!(matches!(result, Err(crate::Error::Capture(_))));
        assert!(!driver.actions.contains(&PointerAction::Press(crate::output::MouseButton::Left)));
    }

    /// Frames are plain ids; detection fails on id 3
    struct FlakyModel;

    impl HandDetector<u32> for FlakyModel {
        fn detect(&mut self, frame: &u32) -> crate::Result<Detection> {
            if *frame == 3 {
                Err(crate::Error::Detection("model returned garbage".to_string()))
            } else {
                Ok(Detection::empty(640, 480))
            }
        }
    }

    #[test]
    fn test_custom_detector() {
        let mut frame_loop = FrameLoop::new(Config::default()).unwrap();
        let mut driver = RecordingDriver::new();
        let summary = frame_loop
            .run_with(VecSource::new(vec![0u32, 1, 2]), &mut FlakyModel, &mut driver)
            .unwrap();
        assert_eq!(summary.frames, 3);
    }

    #[test]
    fn test_detector_failure_ends_run() {
        let mut frame_loop = FrameLoop::new(Config::default()).unwrap();
        let mut driver = RecordingDriver::new();
        let result = frame_loop.run_with(VecSource::new(vec![0u32, 3, 4]), &mut FlakyModel, &mut driver);
        assert!(matches!(result, Err(crate::Error::Detection(_))));
    }

    #[test]
    fn test_records_session() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("recordings").join("session.json");

        let mut frame_loop = FrameLoop::new(Config::default())
            .unwrap()
            .recording_to(Recording::new("session".to_string(), None), path.clone());
        let mut driver = RecordingDriver::new();
        let summary = frame_loop.run(VecSource::new(empty_frames(4)), &mut driver).unwrap();

        assert_eq!(summary.recording.as_deref(), Some(path.as_path()));
        let loaded = Recording::load(&path).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.metadata.frame_count, 4);
        assert_eq!(loaded.metadata.frame_width, 640);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_capture_failure_wins_over_failed_recording_save() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // A file where the recordings directory should be
        let blocker = temp_dir.path().join("recordings");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("session.json");

        let mut frame_loop = FrameLoop::new(Config::default())
            .unwrap()
            .recording_to(Recording::new("session".to_string(), None), path.clone());
        let mut driver = RecordingDriver::new();
        let source = FailingSource { frames: empty_frames(2) };
        let result = frame_loop.run(source, &mut driver);

        assert!(matches!(result, Err(crate::Error::Capture(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_recording_save_is_returned() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("recordings");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut frame_loop = FrameLoop::new(Config::default())
            .unwrap()
            .recording_to(Recording::new("session".to_string(), None), blocker.join("session.json"));
        let mut driver = RecordingDriver::new();
        let result = frame_loop.run(VecSource::new(empty_frames(2)), &mut driver);

        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_summary_counts_malformed_frames() {
        let lines = "garbage\n{\"frame\": \n";
        let tracker = crate::capture::LineTracker::new(std::io::Cursor::new(lines), 640, 480);

        let mut frame_loop = FrameLoop::new(Config::default()).unwrap();
        let mut driver = RecordingDriver::new();
        let summary = frame_loop.run(tracker, &mut driver).unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.malformed_frames, 2);

        let mut frame_loop = FrameLoop::new(Config::default()).unwrap();
        let summary = frame_loop
            .run(VecSource::new(empty_frames(3)), &mut driver)
            .unwrap();
        assert_eq!(summary.malformed_frames, 0);
    }
}
