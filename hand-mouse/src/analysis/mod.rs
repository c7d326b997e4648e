//! Hand pose analysis
//!
//! Turns a landmark frame into per-finger flags and the pinch distance, then
//! classifies the result into pointer intents.

pub mod finger_state;
pub mod gesture;

pub use finger_state::{Finger, FingerState, HandSignals};
pub use gesture::{GestureClassifier, GestureIntent, GestureState, GestureThresholds};
