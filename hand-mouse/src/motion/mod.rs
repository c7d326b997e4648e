//! Cursor motion
//!
//! Maps the tracked fingertip from camera space onto the screen and smooths
//! the result.

pub mod mapper;
pub mod smoothing;

pub use mapper::{CoordinateMapper, ScreenPoint};
pub use smoothing::{MotionSmoother, SmoothingSeed};
