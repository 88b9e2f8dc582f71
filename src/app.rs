//! Main application module for gait metric tracking.

use crate::{
    config::Config,
    detector::RecordedPoseDetector,
    engine::{GaitEngine, RunSummary},
    error::Result,
    metrics::Metric,
    report::{format_value, AggregateSnapshot, Assessment, Presenter, ReferenceThresholds, ViewMode},
    sources::replay::ReplaySource,
};
use log::{debug, info};
use std::{fmt, path::PathBuf};

/// Where frames come from
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Recorded landmark session (JSON lines)
    Replay(PathBuf),
    /// Webcam index
    Camera(i32),
    /// Video file path
    Video(PathBuf),
    /// Still image path
    Image(PathBuf),
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Frame source
    pub input: InputSource,
    /// Engine, threshold, display and model settings
    pub config: Config,
}

/// Presenter that reports snapshots through the `log` facade
pub struct LogPresenter {
    view: ViewMode,
    thresholds: ReferenceThresholds,
    report_every: u64,
    updates: u64,
    misses: u64,
}

impl LogPresenter {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            view: config.display.view,
            thresholds: config.thresholds,
            report_every: config.display.report_every.max(1),
            updates: 0,
            misses: 0,
        }
    }
}

impl Presenter for LogPresenter {
    fn snapshot_updated(&mut self, snapshot: &AggregateSnapshot) {
        self.updates += 1;
        if self.updates % self.report_every == 0 {
            info!("{}", Assessment::new(snapshot, self.view, &self.thresholds));
        }
    }

    fn no_subject(&mut self) {
        self.misses += 1;
        debug!("No subject detected ({} so far)", self.misses);
    }

    fn status(&mut self, message: &str) {
        info!("Status: {message}");
    }
}

/// Final state of a run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub assessment: Assessment,
    pub snapshot: AggregateSnapshot,
    statistics: Vec<String>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Frames: {} processed, {} without subject, {} failed",
            self.summary.processed, self.summary.no_subject, self.summary.failed
        )?;
        writeln!(f, "View: {}", self.assessment.view)?;
        for reading in &self.assessment.readings {
            writeln!(f, "  {reading}")?;
        }
        for line in &self.statistics {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

/// Main application struct
pub struct GaitApp {
    input: InputSource,
    config: Config,
    engine: GaitEngine,
}

impl GaitApp {
    /// Create a new gait metrics application
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(app_config: AppConfig) -> Result<Self> {
        info!("Initializing gait metrics application");
        app_config.config.validate()?;

        let engine = GaitEngine::new(&app_config.config.engine);
        match app_config.config.engine.visibility_floor {
            Some(floor) => info!("Hip visibility gate at {floor}"),
            None => info!("Hip visibility gate disabled"),
        }

        Ok(Self {
            input: app_config.input,
            config: app_config.config,
            engine,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &GaitEngine {
        &self.engine
    }

    /// Tick interval for live sources
    #[cfg(feature = "capture")]
    fn pace(&self) -> Option<std::time::Duration> {
        match self.config.display.target_fps {
            0 => None,
            fps => Some(std::time::Duration::from_secs_f64(1.0 / f64::from(fps))),
        }
    }

    /// Run the source to completion and report the final averages
    ///
    /// # Errors
    ///
    /// Returns an error if the source or detector cannot be opened
    pub fn run(&mut self) -> Result<RunReport> {
        info!("Starting main application loop");
        let mut presenter = LogPresenter::new(&self.config);

        let summary = match &self.input {
            InputSource::Replay(path) => {
                let mut source = ReplaySource::from_file(path)?;
                let mut detector = RecordedPoseDetector::new();
                self.engine.run(&mut source, &mut detector, &mut presenter, None)?
            }
            #[cfg(feature = "capture")]
            InputSource::Camera(index) => {
                let pace = self.pace();
                let mut detector = self.load_model()?;
                let mut source = crate::sources::capture::VideoCaptureSource::camera(*index)?;
                self.engine.run(&mut source, &mut detector, &mut presenter, pace)?
            }
            #[cfg(feature = "capture")]
            InputSource::Video(path) => {
                let pace = self.pace();
                let mut detector = self.load_model()?;
                let mut source = crate::sources::capture::VideoCaptureSource::file(path)?;
                self.engine.run(&mut source, &mut detector, &mut presenter, pace)?
            }
            #[cfg(feature = "capture")]
            InputSource::Image(path) => {
                let mut detector = self.load_model()?;
                let mut source = crate::sources::capture::StillImageSource::open(path)?;
                self.engine.run(&mut source, &mut detector, &mut presenter, None)?
            }
            #[cfg(not(feature = "capture"))]
            other => {
                log::debug!("No capture support for {other:?}");
                return Err(crate::Error::InvalidInput(
                    "Camera, video and image input require the `capture` feature".to_string(),
                ));
            }
        };

        info!("Application shutting down");
        Ok(self.report(summary))
    }

    #[cfg(feature = "capture")]
    fn load_model(&self) -> Result<crate::detector::onnx::OnnxPoseDetector> {
        let model = &self.config.model;
        crate::detector::onnx::OnnxPoseDetector::new(&model.pose_landmarker, model.input_size, model.presence_threshold)
    }

    fn report(&self, summary: RunSummary) -> RunReport {
        let snapshot = self.engine.snapshot();
        let view = self.config.display.view;
        let statistics = Metric::ALL
            .iter()
            .filter(|m| view.shows(**m))
            .filter_map(|&m| self.engine.aggregator().statistics(m).map(|s| (m, s)))
            .map(|(m, s)| {
                format!(
                    "{}: n={} sd={} min={} max={}",
                    m.label(),
                    s.count,
                    format_value(m, Some(s.std_dev)),
                    format_value(m, Some(s.min)),
                    format_value(m, Some(s.max)),
                )
            })
            .collect();

        RunReport {
            summary,
            assessment: Assessment::new(&snapshot, view, &self.config.thresholds),
            snapshot,
            statistics,
        }
    }
}
