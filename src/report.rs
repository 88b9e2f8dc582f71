//! Aggregate snapshots and the presentation contract.

use crate::{
    constants::{KNEE_VALGUS_MIN_DEG, PELVIC_DROP_MAX_DEG, STEP_WIDTH_MIN_RATIO, TIBIAL_TILT_MAX_DEG},
    metrics::Metric,
    Error,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Per-metric running means at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateSnapshot {
    means: [Option<f64>; Metric::ALL.len()],
    counts: [usize; Metric::ALL.len()],
}

impl AggregateSnapshot {
    pub(crate) fn set(&mut self, metric: Metric, mean: Option<f64>, count: usize) {
        self.means[metric.index()] = mean;
        self.counts[metric.index()] = count;
    }

    /// Mean of the metric's window, `None` for "no data"
    #[must_use]
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means[metric.index()]
    }

    /// Number of samples behind the mean
    #[must_use]
    pub fn count(&self, metric: Metric) -> usize {
        self.counts[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        Metric::ALL.iter().map(move |&m| (m, self.mean(m)))
    }
}

/// Acquisition viewpoint; decides which metrics are surfaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Camera facing the subject
    #[default]
    Front,
    /// Camera beside the subject
    Side,
}

impl ViewMode {
    /// Whether `metric` is meaningful from this viewpoint
    #[must_use]
    pub const fn shows(self, metric: Metric) -> bool {
        match metric {
            Metric::TibialTilt => matches!(self, Self::Side),
            _ => true,
        }
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "side" => Ok(Self::Side),
            _ => Err(Error::InvalidInput(format!("Unknown view mode: {s}"))),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Side => f.write_str("side"),
        }
    }
}

/// Fixed reference limits for the "within normal range" hints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceThresholds {
    /// Knee valgus angle at or above this is normal (degrees)
    pub knee_valgus_min: f64,
    /// Pelvic drop at or below this is normal (degrees)
    pub pelvic_drop_max: f64,
    /// Step width ratio at or above this is normal
    pub step_width_min: f64,
    /// Tibial tilt at or below this is normal (degrees)
    pub tibial_tilt_max: f64,
}

impl Default for ReferenceThresholds {
    fn default() -> Self {
        Self {
            knee_valgus_min: KNEE_VALGUS_MIN_DEG,
            pelvic_drop_max: PELVIC_DROP_MAX_DEG,
            step_width_min: STEP_WIDTH_MIN_RATIO,
            tibial_tilt_max: TIBIAL_TILT_MAX_DEG,
        }
    }
}

impl ReferenceThresholds {
    #[must_use]
    pub fn within_normal(&self, metric: Metric, value: f64) -> bool {
        match metric {
            Metric::ValgusLeft | Metric::ValgusRight => value >= self.knee_valgus_min,
            Metric::PelvicDrop => value <= self.pelvic_drop_max,
            Metric::StepWidth => value >= self.step_width_min,
            Metric::TibialTilt => value <= self.tibial_tilt_max,
        }
    }
}

/// One presented metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    pub metric: Metric,
    /// Current mean, `None` for "no data"
    pub mean: Option<f64>,
    /// Range hint, `None` when there is no data
    pub within_normal: Option<bool>,
}

impl fmt::Display for MetricReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = match self.within_normal {
            Some(true) => " ok",
            Some(false) => " !",
            None => "",
        };
        write!(
            f,
            "{}: {}{}",
            self.metric.label(),
            format_value(self.metric, self.mean),
            flag
        )
    }
}

/// Snapshot filtered by view mode and checked against thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub view: ViewMode,
    pub readings: Vec<MetricReading>,
}

impl Assessment {
    #[must_use]
    pub fn new(snapshot: &AggregateSnapshot, view: ViewMode, thresholds: &ReferenceThresholds) -> Self {
        let readings = snapshot
            .iter()
            .filter(|(metric, _)| view.shows(*metric))
            .map(|(metric, mean)| MetricReading {
                metric,
                mean,
                within_normal: mean.map(|v| thresholds.within_normal(metric, v)),
            })
            .collect();
        Self { view, readings }
    }

    #[must_use]
    pub fn reading(&self, metric: Metric) -> Option<&MetricReading> {
        self.readings.iter().find(|r| r.metric == metric)
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.readings.iter().map(ToString::to_string).collect();
        write!(f, "[{}] {}", self.view, parts.join(" | "))
    }
}

/// Display a mean with the metric's precision, "-" for no data
#[must_use]
pub fn format_value(metric: Metric, value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.prec$}{}", metric.unit(), prec = metric.precision()),
        _ => "-".to_string(),
    }
}

/// Presentation collaborator fed by the engine
pub trait Presenter {
    /// A frame was processed and the aggregate changed
    fn snapshot_updated(&mut self, snapshot: &AggregateSnapshot);

    /// The detector found nobody in the frame
    fn no_subject(&mut self) {}

    /// Status line (failures, lifecycle changes)
    fn status(&mut self, message: &str);
}

/// Presenter that discards everything
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn snapshot_updated(&mut self, _snapshot: &AggregateSnapshot) {}

    fn status(&mut self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Metric::ValgusLeft, Some(172.345)), "172.3°");
        assert_eq!(format_value(Metric::StepWidth, Some(0.456)), "0.46");
        assert_eq!(format_value(Metric::PelvicDrop, None), "-");
        assert_eq!(format_value(Metric::PelvicDrop, Some(f64::NAN)), "-");
    }

    #[test]
    fn test_thresholds() {
        let t = ReferenceThresholds::default();
        assert!(t.within_normal(Metric::ValgusLeft, 165.0));
        assert!(!t.within_normal(Metric::ValgusRight, 160.0));
        assert!(t.within_normal(Metric::PelvicDrop, 5.0));
        assert!(!t.within_normal(Metric::PelvicDrop, 5.1));
        assert!(!t.within_normal(Metric::StepWidth, 0.2));
        assert!(!t.within_normal(Metric::TibialTilt, 9.0));
    }

    #[test]
    fn test_view_mode_filters_tibial_tilt() {
        let mut snapshot = AggregateSnapshot::default();
        snapshot.set(Metric::TibialTilt, Some(4.0), 1);
        snapshot.set(Metric::PelvicDrop, Some(7.0), 1);

        let front = Assessment::new(&snapshot, ViewMode::Front, &ReferenceThresholds::default());
        assert_eq!(front.readings.len(), 4);
        assert!(front.reading(Metric::TibialTilt).is_none());
        assert_eq!(front.reading(Metric::PelvicDrop).unwrap().within_normal, Some(false));
        assert_eq!(front.reading(Metric::ValgusLeft).unwrap().within_normal, None);

        let side = Assessment::new(&snapshot, ViewMode::Side, &ReferenceThresholds::default());
        assert_eq!(side.reading(Metric::TibialTilt).unwrap().within_normal, Some(true));
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("Side".parse::<ViewMode>().unwrap(), ViewMode::Side);
        assert!("top".parse::<ViewMode>().is_err());
    }
}
