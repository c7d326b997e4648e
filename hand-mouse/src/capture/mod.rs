//! Landmark capture module
//!
//! This module turns per-frame output of the external hand tracker into
//! validated landmark frames. Capture and detection are collaborator traits;
//! recordings and tracker processes are the two shipped back ends.

pub mod types;
pub mod source;
pub mod adapter;
pub mod replay;
pub mod subprocess;

pub use types::*;
pub use source::{FrameSource, HandDetector, RecordedDetector, VecSource};
pub use adapter::LandmarkAdapter;
pub use replay::ReplaySource;
pub use subprocess::{LineTracker, TrackerProcess};
