//! External tracker process
//!
//! Runs a hand-tracking program (camera capture plus landmark model, e.g. a
//! MediaPipe script) as a child process and reads one JSON `DetectionRecord`
//! per stdout line. The child owns the camera; dropping the tracker kills it,
//! which releases the capture device.

use super::source::FrameSource;
use super::types::{Detection, DetectionRecord};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};

/// Parses detection lines from any buffered reader
#[derive(Debug)]
pub struct LineTracker<R> {
    reader: R,
    line: String,
    /// Frame size reported by the last good line, used for frames that fail to parse
    last_size: (u32, u32),
    malformed_lines: u64,
}

impl<R: BufRead> LineTracker<R> {
    pub fn new(reader: R, frame_width: u32, frame_height: u32) -> Self {
        Self {
            reader,
            line: String::new(),
            last_size: (frame_width, frame_height),
            malformed_lines: 0,
        }
    }

    fn read_record(&mut self) -> crate::Result<Option<Detection>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| crate::Error::Capture(format!("tracker output unreadable: {}", e)))?;
            if read == 0 {
                return Ok(None);
            }

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (w, h) = self.last_size;
            return match serde_json::from_str::<DetectionRecord>(trimmed) {
                Ok(record) => {
                    if let Some(err) = record.error {
                        warn!(frame = record.frame, error = %err, "Tracker reported an error");
                        return Ok(Some(Detection::empty(w, h)));
                    }
                    self.last_size = (record.detection.frame_width, record.detection.frame_height);
                    Ok(Some(record.detection))
                }
                Err(e) => {
                    // Garbled lines become empty frames
                    self.malformed_lines += 1;
                    debug!(error = %e, "Malformed tracker line");
                    Ok(Some(Detection::empty(w, h)))
                }
            };
        }
    }
}

impl<R: BufRead> FrameSource for LineTracker<R> {
    type Frame = Detection;

    fn next_frame(&mut self) -> crate::Result<Option<Detection>> {
        self.read_record()
    }

    fn malformed_frames(&self) -> u64 {
        self.malformed_lines
    }
}

/// Tracker running as a child process
pub struct TrackerProcess {
    child: Child,
    lines: LineTracker<BufReader<ChildStdout>>,
}

impl TrackerProcess {
    /// Spawn `command args...` with stdout piped.
    pub fn spawn(
        command: &str,
        args: &[String],
        frame_width: u32,
        frame_height: u32,
    ) -> crate::Result<Self> {
        if command.trim().is_empty() {
            return Err(crate::Error::Config(
                "tracker.command is empty; set it to your hand-tracking program".to_string(),
            ));
        }

        info!(command = %command, ?args, "Starting tracker process");
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| crate::Error::Capture(format!("failed to start '{}': {}", command, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| crate::Error::Capture("tracker stdout not captured".to_string()))?;

        Ok(Self {
            child,
            lines: LineTracker::new(BufReader::new(stdout), frame_width, frame_height),
        })
    }
}

impl FrameSource for TrackerProcess {
    type Frame = Detection;

    fn next_frame(&mut self) -> crate::Result<Option<Detection>> {
        self.lines.next_frame()
    }

    fn malformed_frames(&self) -> u64 {
        self.lines.malformed_frames()
    }
}

impl Drop for TrackerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        debug!("Tracker process stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tracker(input: &str) -> LineTracker<Cursor<Vec<u8>>> {
        LineTracker::new(Cursor::new(input.as_bytes().to_vec()), 640, 480)
    }

    #[test]
    fn test_reads_records_until_eof() {
        let input = "{\"frame\":0,\"frame_width\":640,\"frame_height\":480,\"hands\":[]}\n\
                     {\"frame\":1,\"frame_width\":640,\"frame_height\":480,\"hands\":[]}\n";
        let mut t = tracker(input);
        assert!(t.next_frame().unwrap().is_some());
        assert!(t.next_frame().unwrap().is_some());
        assert!(t.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut t = tracker("\n\n{\"frame_width\":320,\"frame_height\":240}\n");
        let d = t.next_frame().unwrap().unwrap();
        assert_eq!(d.frame_width, 320);
        assert!(t.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_becomes_empty_frame() {
        let mut t = tracker("{\"frame_width\":320,\"frame_height\":240}\nnot json\n");
        t.next_frame().unwrap();
        let d = t.next_frame().unwrap().unwrap();
        assert!(d.is_empty());
        assert_eq!((d.frame_width, d.frame_height), (320, 240));
        assert_eq!(t.malformed_frames(), 1);
    }

    #[test]
    fn test_tracker_error_line_becomes_empty_frame() {
        let mut t = tracker(
            "{\"frame_width\":640,\"frame_height\":480,\"hands\":[],\"error\":\"model failed\"}\n",
        );
        let d = t.next_frame().unwrap().unwrap();
        assert!(d.is_empty());
        assert_eq!(t.malformed_frames(), 0);
    }

    #[test]
    fn test_empty_command_rejected() {
        let result = TrackerProcess::spawn("  ", &[], 640, 480);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_missing_program_is_capture_error() {
        let result = TrackerProcess::spawn("/nonexistent/hand-tracker-12345", &[], 640, 480);
        assert!(matches!(result, Err(crate::Error::Capture(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawned_process_stream() {
        let args = vec![
            "-c".to_string(),
            "echo '{\"frame\":0,\"frame_width\":640,\"frame_height\":480,\"hands\":[]}'".to_string(),
        ];
        let mut process = TrackerProcess::spawn("sh", &args, 640, 480).expect("spawn sh");
        assert!(process.next_frame().unwrap().is_some());
        assert!(process.next_frame().unwrap().is_none());
    }
}
