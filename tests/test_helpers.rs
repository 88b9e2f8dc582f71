//! Helper functions and utilities for tests

#![allow(dead_code)]

use gait_metrics::{
    landmarks::{Landmark, LandmarkSet, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE},
    report::{AggregateSnapshot, Presenter},
    sources::replay::RecordedFrame,
};

/// Square frame size that keeps normalized coordinates easy to reason about
pub const FRAME_SIZE: u32 = 1000;

/// Subject standing upright: straight legs, level pelvis, ankles under the hips
pub fn standing_pose() -> LandmarkSet {
    pose_with(&[])
}

/// Standing pose with some landmarks moved to `(x, y)`
pub fn pose_with(overrides: &[(usize, f64, f64)]) -> LandmarkSet {
    let mut points = vec![Landmark::new(0.5, 0.5, 1.0); 33];
    points[LEFT_HIP] = Landmark::new(0.4, 0.5, 1.0);
    points[RIGHT_HIP] = Landmark::new(0.6, 0.5, 1.0);
    points[LEFT_KNEE] = Landmark::new(0.4, 0.7, 1.0);
    points[RIGHT_KNEE] = Landmark::new(0.6, 0.7, 1.0);
    points[LEFT_ANKLE] = Landmark::new(0.4, 0.9, 1.0);
    points[RIGHT_ANKLE] = Landmark::new(0.6, 0.9, 1.0);
    for &(index, x, y) in overrides {
        points[index].x = x;
        points[index].y = y;
    }
    LandmarkSet::new(points).expect("33 landmarks")
}

/// Standing pose with both hips at the given visibility
pub fn pose_with_hip_visibility(visibility: f64) -> LandmarkSet {
    let mut points = standing_pose().points().to_vec();
    points[LEFT_HIP].visibility = visibility;
    points[RIGHT_HIP].visibility = visibility;
    LandmarkSet::new(points).expect("33 landmarks")
}

/// Recorded frame carrying the given subjects
pub fn recorded(timestamp_ms: f64, poses: Vec<LandmarkSet>) -> RecordedFrame {
    RecordedFrame {
        timestamp_ms,
        width: FRAME_SIZE,
        height: FRAME_SIZE,
        poses,
        error: None,
    }
}

/// Recorded frame on which the detector failed
pub fn failed(timestamp_ms: f64, message: &str) -> RecordedFrame {
    RecordedFrame {
        error: Some(message.to_string()),
        ..recorded(timestamp_ms, Vec::new())
    }
}

/// Assert two floats agree to within `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

/// Presenter that remembers everything it was shown
#[derive(Default)]
pub struct RecordingPresenter {
    pub snapshots: Vec<AggregateSnapshot>,
    pub no_subject: usize,
    pub statuses: Vec<String>,
}

impl Presenter for RecordingPresenter {
    fn snapshot_updated(&mut self, snapshot: &AggregateSnapshot) {
        self.snapshots.push(*snapshot);
    }

    fn no_subject(&mut self) {
        self.no_subject += 1;
    }

    fn status(&mut self, message: &str) {
        self.statuses.push(message.to_string());
    }
}
