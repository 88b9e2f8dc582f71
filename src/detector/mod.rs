//! Pose detector contract.
//!
//! The detector is external to the metric engine: given a frame it returns
//! zero or more landmark sets, or fails for that frame.

/// BlazePose-style landmark model on ONNX Runtime
#[cfg(feature = "capture")]
pub mod onnx;

use crate::{landmarks::LandmarkSet, sources::replay::RecordedFrame, Error, Result};

/// Detector contract consumed by the engine
pub trait PoseDetector {
    /// Frame representation the detector understands
    type Frame;

    /// Whether the model is loaded and able to run
    fn is_ready(&self) -> bool {
        true
    }

    /// Detect subjects in one frame; an empty vector is a valid result
    ///
    /// # Errors
    ///
    /// Returns an error if inference failed for this frame
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<LandmarkSet>>;
}

/// Replays the detector output stored in a recorded session
#[derive(Debug, Clone)]
pub struct RecordedPoseDetector {
    ready: bool,
    calls: usize,
}

impl RecordedPoseDetector {
    #[must_use]
    pub fn new() -> Self {
        Self { ready: true, calls: 0 }
    }

    /// Detector that reports itself as not yet initialized
    #[must_use]
    pub fn unready() -> Self {
        Self { ready: false, calls: 0 }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Number of frames the detector was invoked on
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Default for RecordedPoseDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseDetector for RecordedPoseDetector {
    type Frame = RecordedFrame;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn detect(&mut self, frame: &RecordedFrame) -> Result<Vec<LandmarkSet>> {
        self.calls += 1;
        match &frame.error {
            Some(message) => Err(Error::DetectionFailure(message.clone())),
            None => Ok(frame.poses.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_error_becomes_failure() {
        let mut detector = RecordedPoseDetector::new();
        let frame = RecordedFrame {
            timestamp_ms: 0.0,
            width: 1,
            height: 1,
            poses: Vec::new(),
            error: Some("model crashed".to_string()),
        };
        match detector.detect(&frame) {
            Err(Error::DetectionFailure(msg)) => assert_eq!(msg, "model crashed"),
            other => panic!("Expected DetectionFailure, got {other:?}"),
        }
        assert_eq!(detector.calls(), 1);
    }

    #[test]
    fn test_readiness() {
        let mut detector = RecordedPoseDetector::unready();
        assert!(!detector.is_ready());
        detector.set_ready(true);
        assert!(detector.is_ready());
    }
}
