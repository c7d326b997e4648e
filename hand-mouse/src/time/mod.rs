//! Frame timing
//!
//! Monotonic per-run timestamps and frame-rate measurement for the frame loop
//! and for stamping recorded detections.

pub mod clock;

pub use clock::{FrameClock, FrameRate, Timestamp};
