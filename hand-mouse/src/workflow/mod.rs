//! Workflow Module
//!
//! Ties the stages together: the per-frame pipeline, the frame loop that
//! drives it, and session recordings.

pub mod pipeline;
pub mod recording;
pub mod runner;

pub use pipeline::{FrameOutcome, Pipeline, PipelineState};
pub use recording::{Recording, RecordingMetadata};
pub use runner::{FrameLoop, SessionSummary, StopReason};
