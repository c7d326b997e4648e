//! Recording playback as a frame source

use super::source::FrameSource;
use super::types::{Detection, DetectionRecord};
use crate::workflow::recording::Recording;
use std::time::{Duration, Instant};

/// Plays back the detections of a `Recording` in frame order.
///
/// With pacing enabled, frames are released at their recorded timestamps
/// instead of as fast as the consumer pulls them.
#[derive(Debug)]
pub struct ReplaySource {
    frames: std::vec::IntoIter<DetectionRecord>,
    paced: bool,
    started: Option<(Instant, u64)>,
}

impl ReplaySource {
    pub fn new(recording: Recording) -> Self {
        Self {
            frames: recording.frames.into_iter(),
            paced: false,
            started: None,
        }
    }

    /// Release frames at recorded speed
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    fn wait_for(&mut self, timestamp_us: u64) {
        let (start, first_us) = *self
            .started
            .get_or_insert_with(|| (Instant::now(), timestamp_us));
        let due = Duration::from_micros(timestamp_us.saturating_sub(first_us));
        let elapsed = start.elapsed();
        if due > elapsed {
            std::thread::sleep(due - elapsed);
        }
    }
}

impl FrameSource for ReplaySource {
    type Frame = Detection;

    fn next_frame(&mut self) -> crate::Result<Option<Detection>> {
        let Some(record) = self.frames.next() else {
            return Ok(None);
        };
        if self.paced {
            self.wait_for(record.timestamp_us);
        }
        Ok(Some(record.detection))
    }
}
