//! Pointer output
//!
//! Converts gesture intents into cursor moves and button presses through the
//! `PointerDriver` collaborator.

pub mod driver;
pub mod emitter;
#[cfg(feature = "enigo")]
pub mod enigo_driver;

pub use driver::{LogDriver, MouseButton, PointerAction, PointerDriver, RecordingDriver};
pub use emitter::{ActionEmitter, EmitterStats};
#[cfg(feature = "enigo")]
pub use enigo_driver::EnigoDriver;
