//! Per-frame gait metric extraction.
//!
//! Turns one landmark set into one sample per [`Metric`]. A sample is `None`
//! when its inputs are degenerate or gated out by the visibility floor; the
//! aggregator simply does not advance that metric for the frame.

use crate::{
    constants::{DEFAULT_VISIBILITY_FLOOR, MIN_HIP_WIDTH},
    geometry::{angle, distance, sagittal_tilt, to_frame_space},
    landmarks::{LandmarkSet, PixelPoint, Side, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of tracked metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Hip-knee-ankle angle of the left leg (degrees)
    ValgusLeft,
    /// Hip-knee-ankle angle of the right leg (degrees)
    ValgusRight,
    /// Tilt of the hip line from horizontal (degrees)
    PelvicDrop,
    /// Lateral ankle separation over hip width (ratio)
    StepWidth,
    /// Shank lean from vertical on the lower-ankle leg (degrees)
    TibialTilt,
}

impl Metric {
    /// All metrics, in presentation order
    pub const ALL: [Self; 5] = [
        Self::ValgusLeft,
        Self::ValgusRight,
        Self::PelvicDrop,
        Self::StepWidth,
        Self::TibialTilt,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Stable machine name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ValgusLeft => "valgus_left",
            Self::ValgusRight => "valgus_right",
            Self::PelvicDrop => "pelvic_drop",
            Self::StepWidth => "step_width",
            Self::TibialTilt => "tibial_tilt",
        }
    }

    /// Human readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ValgusLeft => "Knee valgus (L)",
            Self::ValgusRight => "Knee valgus (R)",
            Self::PelvicDrop => "Pelvic drop",
            Self::StepWidth => "Step width",
            Self::TibialTilt => "Tibial tilt",
        }
    }

    /// Unit suffix for display
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::StepWidth => "",
            _ => "°",
        }
    }

    /// Decimal places used for display
    #[must_use]
    pub const fn precision(self) -> usize {
        match self {
            Self::StepWidth => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One frame's worth of metric samples
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricFrame {
    samples: [Option<f64>; Metric::ALL.len()],
}

impl MetricFrame {
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.samples[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        self.samples[metric.index()] = value.filter(|v| v.is_finite());
    }

    /// Defined samples, in [`Metric::ALL`] order
    pub fn defined(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL
            .iter()
            .filter_map(move |&m| self.get(m).map(|v| (m, v)))
    }
}

/// Maps landmark sets to metric samples
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    visibility_floor: Option<f64>,
}

impl MetricExtractor {
    /// Create an extractor gating hip-based metrics on `visibility_floor`
    ///
    /// `None` disables the gate and always computes pelvic drop and step width.
    #[must_use]
    pub fn new(visibility_floor: Option<f64>) -> Self {
        Self { visibility_floor }
    }

    #[must_use]
    pub fn visibility_floor(&self) -> Option<f64> {
        self.visibility_floor
    }

    /// Whether both hips clear the visibility floor
    #[must_use]
    pub fn hips_visible(&self, landmarks: &LandmarkSet) -> bool {
        match self.visibility_floor {
            None => true,
            Some(floor) => {
                landmarks[LEFT_HIP].visibility > floor && landmarks[RIGHT_HIP].visibility > floor
            }
        }
    }

    /// Extract every metric from one landmark set on a `width` × `height` frame
    #[must_use]
    pub fn extract(&self, landmarks: &LandmarkSet, width: f64, height: f64) -> MetricFrame {
        let px = |i: usize| to_frame_space(&landmarks[i], width, height);
        let (l_hip, r_hip) = (px(LEFT_HIP), px(RIGHT_HIP));
        let (l_knee, r_knee) = (px(LEFT_KNEE), px(RIGHT_KNEE));
        let (l_ankle, r_ankle) = (px(LEFT_ANKLE), px(RIGHT_ANKLE));

        let mut frame = MetricFrame::default();
        frame.set(Metric::ValgusLeft, angle(l_hip, l_knee, l_ankle));
        frame.set(Metric::ValgusRight, angle(r_hip, r_knee, r_ankle));

        if self.hips_visible(landmarks) {
            // A non-finite hip leaves both hip metrics undefined
            let raw_width = distance(l_hip, r_hip);
            if raw_width.is_finite() {
                let hip_width = raw_width.max(MIN_HIP_WIDTH);
                let drop = (l_hip.y - r_hip.y).abs().atan2(hip_width).to_degrees();
                frame.set(Metric::PelvicDrop, Some(drop));
                frame.set(Metric::StepWidth, Some((l_ankle.x - r_ankle.x).abs() / hip_width));
            }
        }

        let (_, knee, ankle) = stance_side(l_ankle, r_ankle).leg();
        frame.set(Metric::TibialTilt, Some(sagittal_tilt(px(ankle), px(knee)).abs()));

        frame
    }
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new(Some(DEFAULT_VISIBILITY_FLOOR))
    }
}

/// The leg whose ankle is lower in the frame, a proxy for the stance leg
fn stance_side(l_ankle: PixelPoint, r_ankle: PixelPoint) -> Side {
    if l_ankle.y > r_ankle.y {
        Side::Left
    } else {
        Side::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    fn standing() -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.5, 1.0); 33];
        points[LEFT_HIP] = Landmark::new(0.4, 0.5, 1.0);
        points[RIGHT_HIP] = Landmark::new(0.6, 0.5, 1.0);
        points[LEFT_KNEE] = Landmark::new(0.4, 0.7, 1.0);
        points[RIGHT_KNEE] = Landmark::new(0.6, 0.7, 1.0);
        points[LEFT_ANKLE] = Landmark::new(0.4, 0.9, 1.0);
        points[RIGHT_ANKLE] = Landmark::new(0.6, 0.9, 1.0);
        points
    }

    #[test]
    fn test_standing_subject() {
        let set = LandmarkSet::new(standing()).unwrap();
        let frame = MetricExtractor::default().extract(&set, 1000.0, 1000.0);

        assert!((frame.get(Metric::ValgusLeft).unwrap() - 180.0).abs() < 1e-9);
        assert!((frame.get(Metric::ValgusRight).unwrap() - 180.0).abs() < 1e-9);
        assert_eq!(frame.get(Metric::PelvicDrop), Some(0.0));
        assert!((frame.get(Metric::StepWidth).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(frame.get(Metric::TibialTilt), Some(0.0));
    }

    #[test]
    fn test_visibility_gate() {
        let mut points = standing();
        points[LEFT_HIP].visibility = 0.3;
        let set = LandmarkSet::new(points).unwrap();

        let gated = MetricExtractor::new(Some(0.3)).extract(&set, 640.0, 480.0);
        assert_eq!(gated.get(Metric::PelvicDrop), None);
        assert_eq!(gated.get(Metric::StepWidth), None);
        assert!(gated.get(Metric::ValgusLeft).is_some());
        assert!(gated.get(Metric::TibialTilt).is_some());

        let ungated = MetricExtractor::new(None).extract(&set, 640.0, 480.0);
        assert!(ungated.get(Metric::PelvicDrop).is_some());
        assert!(ungated.get(Metric::StepWidth).is_some());
    }

    #[test]
    fn test_degenerate_knee() {
        let mut points = standing();
        points[LEFT_KNEE] = points[LEFT_HIP];
        let set = LandmarkSet::new(points).unwrap();
        let frame = MetricExtractor::default().extract(&set, 640.0, 480.0);
        assert_eq!(frame.get(Metric::ValgusLeft), None);
        assert!(frame.get(Metric::ValgusRight).is_some());
        assert_eq!(frame.defined().count(), 4);
    }

    #[test]
    fn test_hip_width_floor() {
        let mut points = standing();
        points[RIGHT_HIP] = points[LEFT_HIP];
        points[LEFT_ANKLE] = Landmark::new(0.0, 0.9, 1.0);
        points[RIGHT_ANKLE] = Landmark::new(0.5, 0.9, 1.0);
        let set = LandmarkSet::new(points).unwrap();
        // 100 px frame: coincident hips fall back to a width of 1
        let frame = MetricExtractor::default().extract(&set, 100.0, 100.0);
        assert_eq!(frame.get(Metric::StepWidth), Some(50.0));
        assert_eq!(frame.get(Metric::PelvicDrop), Some(0.0));
    }

    #[test]
    fn test_tibial_tilt_uses_lower_ankle() {
        let mut points = standing();
        // Left ankle lower and leaning out 45°, right shank vertical
        points[LEFT_KNEE] = Landmark::new(0.4, 0.6, 1.0);
        points[LEFT_ANKLE] = Landmark::new(0.3, 0.7, 1.0);
        points[RIGHT_ANKLE] = Landmark::new(0.6, 0.65, 1.0);
        let set = LandmarkSet::new(points).unwrap();
        let frame = MetricExtractor::default().extract(&set, 1000.0, 1000.0);
        assert!((frame.get(Metric::TibialTilt).unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_hip_leaves_hip_metrics_undefined() {
        let mut points = standing();
        points[LEFT_HIP].x = f64::NAN;
        points[LEFT_ANKLE] = Landmark::new(0.3, 0.9, 1.0);
        points[RIGHT_ANKLE] = Landmark::new(0.7, 0.9, 1.0);
        let set = LandmarkSet::new(points).unwrap();
        let frame = MetricExtractor::default().extract(&set, 1000.0, 1000.0);

        assert_eq!(frame.get(Metric::PelvicDrop), None);
        assert_eq!(frame.get(Metric::StepWidth), None);
        assert_eq!(frame.get(Metric::ValgusLeft), None);
        assert!(frame.get(Metric::ValgusRight).is_some());
    }

    #[test]
    fn test_metric_frame_rejects_non_finite() {
        let mut frame = MetricFrame::default();
        frame.set(Metric::StepWidth, Some(f64::NAN));
        frame.set(Metric::PelvicDrop, Some(f64::INFINITY));
        assert_eq!(frame.defined().count(), 0);
    }
}
