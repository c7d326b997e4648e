//! Landmark Recordings
//!
//! Serialization format for captured detection streams. A recording can be
//! replayed through the pipeline to reproduce a session frame for frame.

use crate::capture::types::{Detection, DetectionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Current recording format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Checkpoint interval: save every N frames
pub const CHECKPOINT_INTERVAL: usize = 300;

/// Get the checkpoint (temporary) path for a recording file
fn checkpoint_path(final_path: &Path) -> PathBuf {
    final_path.with_extension("json.tmp")
}

/// Recording metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingMetadata {
    /// Unique recording ID
    pub id: Uuid,
    /// Recording name
    pub name: String,
    /// Tracker command that produced the stream
    pub tracker: Option<String>,
    /// Recording start time
    pub started_at: DateTime<Utc>,
    /// Recording end time
    pub ended_at: Option<DateTime<Utc>>,
    /// Total frame count
    pub frame_count: usize,
    /// Recording duration in milliseconds
    pub duration_ms: u64,
    /// Source frame size the tracker reported first
    pub frame_width: u32,
    pub frame_height: u32,
    /// Version of the recording format
    pub format_version: String,
}

impl RecordingMetadata {
    /// Create new metadata for a recording
    pub fn new(name: String, tracker: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            tracker,
            started_at: Utc::now(),
            ended_at: None,
            frame_count: 0,
            duration_ms: 0,
            frame_width: 0,
            frame_height: 0,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }

    /// Finalize the recording with end time and frame count
    pub fn finalize(&mut self, frame_count: usize, duration_ms: u64) {
        self.ended_at = Some(Utc::now());
        self.frame_count = frame_count;
        self.duration_ms = duration_ms;
    }
}

impl Default for RecordingMetadata {
    fn default() -> Self {
        Self::new(String::new(), None)
    }
}

/// A complete recording of per-frame detections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Recording metadata
    pub metadata: RecordingMetadata,
    /// Detections in frame order
    pub frames: Vec<DetectionRecord>,
}

impl Recording {
    /// Create a new empty recording
    pub fn new(name: String, tracker: Option<String>) -> Self {
        Self {
            metadata: RecordingMetadata::new(name, tracker),
            frames: Vec::new(),
        }
    }

    /// Append a detection; the first one fixes the recorded frame size
    pub fn add_detection(&mut self, detection: Detection, timestamp_us: u64) {
        if self.frames.is_empty() {
            self.metadata.frame_width = detection.frame_width;
            self.metadata.frame_height = detection.frame_height;
        }
        let frame = self.frames.len() as u64;
        self.frames.push(DetectionRecord::new(frame, timestamp_us, detection));
    }

    /// Finalize the recording
    pub fn finalize(&mut self, duration_ms: u64) {
        self.metadata.finalize(self.frames.len(), duration_ms);
    }

    /// Save recording to a file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Save a checkpoint to `<path>.tmp` so a crashed session can be recovered.
    pub fn save_checkpoint(&self, final_path: &Path) -> crate::Result<()> {
        let tmp_path = checkpoint_path(final_path);
        let json = serde_json::to_string(self)?;
        std::fs::write(&tmp_path, json)?;
        Ok(())
    }

    /// Remove a checkpoint file if it exists (e.g., after successful save).
    pub fn remove_checkpoint(final_path: &Path) {
        let _ = std::fs::remove_file(checkpoint_path(final_path));
    }

    /// Load recording from a file.
    ///
    /// Unknown format versions are loaded anyway with a warning.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let recording: Recording = serde_json::from_str(&content).map_err(|e| {
            crate::Error::Recording(format!("{}: {}", path.display(), e))
        })?;
        if recording.metadata.format_version != CURRENT_FORMAT_VERSION {
            tracing::warn!(
                name = %recording.metadata.name,
                found = %recording.metadata.format_version,
                expected = CURRENT_FORMAT_VERSION,
                "Recording has different format version; some fields may use default values"
            );
        }
        Ok(recording)
    }

    /// Get the number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if recording is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in which the tracker saw at least one hand
    pub fn frames_with_hands(&self) -> usize {
        self.frames.iter().filter(|f| !f.detection.is_empty()).count()
    }
}

impl Default for Recording {
    fn default() -> Self {
        Self::new("untitled".to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::types::{CandidateHand, LandmarkPoint, LANDMARK_COUNT};
    use tempfile::TempDir;

    fn detection_with_hand() -> Detection {
        let hand = CandidateHand::new(vec![LandmarkPoint::new(1.0, 2.0); LANDMARK_COUNT], 0.9);
        Detection::with_hands(640, 480, vec![hand])
    }

    #[test]
    fn test_recording_creation() {
        let recording = Recording::new("test".to_string(), Some("tracker.py".to_string()));
        assert_eq!(recording.metadata.name, "test");
        assert_eq!(recording.metadata.tracker.as_deref(), Some("tracker.py"));
        assert!(recording.is_empty());
    }

    #[test]
    fn test_add_detection_numbers_frames() {
        let mut recording = Recording::new("test".to_string(), None);
        recording.add_detection(Detection::empty(640, 480), 0);
        recording.add_detection(detection_with_hand(), 33_000);

        assert_eq!(recording.len(), 2);
        assert_eq!(recording.frames[1].frame, 1);
        assert_eq!(recording.frames[1].timestamp_us, 33_000);
        assert_eq!(recording.frames_with_hands(), 1);
        assert_eq!(recording.metadata.frame_width, 640);
        assert_eq!(recording.metadata.frame_height, 480);
    }

    #[test]
    fn test_finalize() {
        let mut recording = Recording::new("test".to_string(), None);
        recording.add_detection(Detection::empty(640, 480), 0);
        recording.finalize(1000);

        assert!(recording.metadata.ended_at.is_some());
        assert_eq!(recording.metadata.duration_ms, 1000);
        assert_eq!(recording.metadata.frame_count, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.json");

        let mut recording = Recording::new("session".to_string(), None);
        recording.add_detection(detection_with_hand(), 0);
        recording.finalize(10);
        recording.save(&path).expect("save");

        let loaded = Recording::load(&path).expect("load");
        assert_eq!(loaded.metadata.id, recording.metadata.id);
        assert_eq!(loaded.frames, recording.frames);
    }

    #[test]
    fn test_load_garbage_is_recording_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Recording::load(&path), Err(crate::Error::Recording(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Recording::load(Path::new("/tmp/nonexistent_recording_12345.json"));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_checkpoint_roundtrip_and_cleanup() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("live.json");

        let mut recording = Recording::new("live".to_string(), None);
        recording.add_detection(Detection::empty(640, 480), 0);
        recording.save_checkpoint(&path).expect("checkpoint");

        let tmp = checkpoint_path(&path);
        assert!(tmp.exists());
        Recording::remove_checkpoint(&path);
        assert!(!tmp.exists());
    }

    #[test]
    fn test_metadata_defaults_tolerate_missing_fields() {
        let json = r#"{"metadata":{"name":"old"},"frames":[]}"#;
        let recording: Recording = serde_json::from_str(json).unwrap();
        assert_eq!(recording.metadata.name, "old");
        assert_eq!(recording.metadata.format_version, CURRENT_FORMAT_VERSION);
    }
}
