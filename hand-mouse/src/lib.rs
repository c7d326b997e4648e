//! # Hand Mouse
//!
//! Drive the system pointer with one hand in front of a camera.
//!
//! ## Overview
//!
//! An external hand tracker reports 21 landmarks per detected hand for every
//! camera frame. This library turns that stream into cursor moves and left
//! button presses: pointing with the index finger moves the cursor, and
//! pinching the index and middle fingertips together holds the button down.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hand_mouse::{Config, FrameLoop, Recording, ReplaySource, RecordingDriver};
//!
//! let recording = Recording::load(std::path::Path::new("session.json"))
//!     .expect("Failed to load recording");
//! let source = ReplaySource::new(recording);
//! let mut driver = RecordingDriver::new();
//!
//! let mut frame_loop = FrameLoop::new(Config::default()).expect("Invalid config");
//! let summary = frame_loop.run(source, &mut driver).expect("Run failed");
//! println!("{} frames, {} clicks", summary.frames, summary.emitter.presses);
//! ```
//!
//! ## Architecture
//!
//! - [`capture`]: Tracker output, frame sources and the landmark adapter
//! - [`analysis`]: Finger states and the gesture state machine
//! - [`motion`]: Frame-to-screen mapping and cursor smoothing
//! - [`output`]: Pointer drivers and the action emitter
//! - [`time`]: Frame timestamps and frame-rate measurement
//! - [`workflow`]: Per-frame pipeline, frame loop and recordings
//! - [`app`]: CLI and configuration management
//!
//! ## Frame Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Tracker   │───▶│  Landmark   │───▶│   Finger    │───▶│   Gesture   │
//! │  (source)   │    │   Adapter   │    │   States    │    │ Classifier  │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Pointer   │◀───│   Action    │◀───│   Motion    │◀───│ Coordinate  │
//! │   Driver    │    │   Emitter   │    │  Smoother   │    │   Mapper    │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//! ```

pub mod time;
pub mod capture;
pub mod analysis;
pub mod motion;
pub mod output;
pub mod workflow;
pub mod app;

// Re-export commonly used types
pub use app::config::Config;
pub use capture::types::{CandidateHand, Detection, HandObservation, LandmarkFrame, LandmarkPoint};
pub use capture::{LandmarkAdapter, ReplaySource, TrackerProcess};
pub use analysis::{GestureClassifier, GestureIntent, GestureState};
pub use motion::{CoordinateMapper, MotionSmoother, ScreenPoint};
pub use output::{ActionEmitter, LogDriver, MouseButton, PointerDriver, RecordingDriver};
pub use workflow::{FrameLoop, Pipeline, Recording, SessionSummary};

/// Result type alias for hand mouse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for hand mouse operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Frame capture error: {0}")]
    Capture(String),

    #[error("Hand detection error: {0}")]
    Detection(String),

    #[error("Pointer error: {0}")]
    Pointer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
