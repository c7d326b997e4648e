//! Collaborator seams for frame capture and hand tracking
//!
//! The pipeline only ever talks to these traits, so camera back ends and
//! landmark models can be swapped without touching the gesture logic.

use super::types::Detection;

/// Supplies frames on demand, one per processing cycle
pub trait FrameSource {
    /// Whatever the detector consumes: a pixel buffer, a recorded detection, ...
    type Frame;

    /// Fetch the next frame.
    ///
    /// `Ok(None)` signals end of stream. `Err` is a capture failure and ends
    /// the run.
    fn next_frame(&mut self) -> crate::Result<Option<Self::Frame>>;

    /// Frames so far that arrived garbled and were passed on as empty
    fn malformed_frames(&self) -> u64 {
        0
    }
}

/// Black-box landmark model: `detect(frame) -> candidate hands`
pub trait HandDetector<F> {
    fn detect(&mut self, frame: &F) -> crate::Result<Detection>;
}

/// Detector for sources whose frames already carry a detection
/// (recordings, external tracker processes).
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedDetector;

impl HandDetector<Detection> for RecordedDetector {
    fn detect(&mut self, frame: &Detection) -> crate::Result<Detection> {
        Ok(frame.clone())
    }
}

/// In-memory frame source, mostly for tests and benchmarks
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    frames: std::vec::IntoIter<T>,
}

impl<T> VecSource<T> {
    pub fn new(frames: Vec<T>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl<T> FrameSource for VecSource<T> {
    type Frame = T;

    fn next_frame(&mut self) -> crate::Result<Option<T>> {
        Ok(self.frames.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_yields_then_ends() {
        let mut source = VecSource::new(vec![1, 2]);
        assert_eq!(source.next_frame().unwrap(), Some(1));
        assert_eq!(source.next_frame().unwrap(), Some(2));
        assert_eq!(source.next_frame().unwrap(), None);
        assert_eq!(source.next_frame().unwrap(), None);
    }

    #[test]
    fn test_recorded_detector_passes_through() {
        let detection = Detection::empty(640, 480);
        let mut detector = RecordedDetector;
        assert_eq!(detector.detect(&detection).unwrap(), detection);
    }
}
