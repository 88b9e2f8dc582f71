//! Recorded landmark sessions.
//!
//! A session is a JSON-lines file with one [`RecordedFrame`] per line, as
//! captured from a pose detector. Replaying it drives the engine exactly like
//! a decoded video, which makes runs reproducible without a camera or model.

use super::{FrameSource, FrameToken, SourceFrame, SourceKind, SourcePoll};
use crate::{landmarks::LandmarkSet, Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

/// One recorded detector output together with its frame geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Presentation time of the frame
    pub timestamp_ms: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Detected subjects, first one is used
    #[serde(default)]
    pub poses: Vec<LandmarkSet>,
    /// Detector failure recorded for this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Replays a recorded session frame by frame
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: VecDeque<RecordedFrame>,
}

impl ReplaySource {
    #[must_use]
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames: frames.into() }
    }

    /// Load a session file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Opening recorded session: {}", path.display());
        let file = File::open(path)
            .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", path.display())))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a session from any buffered reader; blank lines are skipped
    ///
    /// # Errors
    ///
    /// Returns `ReplayFormat` with the offending line number
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame = serde_json::from_str(&line).map_err(|e| Error::ReplayFormat {
                line: idx + 1,
                message: e.to_string(),
            })?;
            frames.push(frame);
        }
        log::debug!("Loaded {} recorded frames", frames.len());
        Ok(Self::new(frames))
    }

    /// Frames left to replay
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    type Frame = RecordedFrame;

    fn kind(&self) -> SourceKind {
        SourceKind::Video
    }

    fn poll(&mut self) -> Result<SourcePoll<RecordedFrame>> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(SourcePoll::Ended);
        };
        Ok(SourcePoll::Frame(SourceFrame {
            token: FrameToken::from_millis(frame.timestamp_ms),
            width: frame.width,
            height: frame.height,
            frame,
        }))
    }
}

/// Write frames as a JSON-lines session
///
/// # Errors
///
/// Returns an error if serialization or writing fails
pub fn write_session<W: Write>(mut writer: W, frames: &[RecordedFrame]) -> Result<()> {
    for frame in frames {
        let line = serde_json::to_string(frame).map_err(|e| Error::IoError(e.to_string()))?;
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    fn frame(ts: f64) -> RecordedFrame {
        RecordedFrame {
            timestamp_ms: ts,
            width: 640,
            height: 480,
            poses: vec![LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 1.0); 33]).unwrap()],
            error: None,
        }
    }

    #[test]
    fn test_session_roundtrip_through_reader() {
        let mut buf = Vec::new();
        write_session(&mut buf, &[frame(0.0), frame(33.3)]).unwrap();
        buf.extend_from_slice(b"\n   \n");

        let mut source = ReplaySource::from_reader(buf.as_slice()).unwrap();
        assert_eq!(source.remaining(), 2);

        match source.poll().unwrap() {
            SourcePoll::Frame(f) => {
                assert_eq!(f.width, 640);
                assert_eq!(f.frame.poses.len(), 1);
            }
            other => panic!("Expected frame, got {other:?}"),
        }
        match source.poll().unwrap() {
            SourcePoll::Frame(f) => assert_eq!(f.token, FrameToken::from_millis(33.3)),
            other => panic!("Expected frame, got {other:?}"),
        }
        assert!(matches!(source.poll().unwrap(), SourcePoll::Ended));
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let data = b"{\"timestamp_ms\":0,\"width\":10,\"height\":10}\nnot json\n";
        match ReplaySource::from_reader(&data[..]) {
            Err(Error::ReplayFormat { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected ReplayFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_poses_defaults_to_empty() {
        let data = b"{\"timestamp_ms\":5,\"width\":10,\"height\":10,\"error\":\"boom\"}\n";
        let mut source = ReplaySource::from_reader(&data[..]).unwrap();
        let SourcePoll::Frame(f) = source.poll().unwrap() else {
            panic!("Expected frame");
        };
        assert!(f.frame.poses.is_empty());
        assert_eq!(f.frame.error.as_deref(), Some("boom"));
    }
}
