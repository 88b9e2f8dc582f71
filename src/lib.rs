//! Gait metric library for real-time lower-limb tracking from body landmarks.
//!
//! This library turns per-frame pose landmarks into rolling gait metrics:
//! - knee valgus angle for each leg
//! - pelvic drop
//! - step width relative to hip width
//! - tibial tilt of the stance leg
//!
//! The pipeline consists of:
//! 1. A frame source (recorded session, camera, video file or still image)
//! 2. A pose detector producing 33 normalized landmarks per subject
//! 3. Metric extraction in frame pixel space, gated on hip visibility
//! 4. Windowed aggregation of the last 300 samples per metric
//!
//! Camera, video and image input use `OpenCV` and ONNX Runtime and are only
//! built with the `capture` feature.
//!
//! # Examples
//!
//! ## Replaying a recorded session
//!
//! ```no_run
//! use gait_metrics::{
//!     detector::RecordedPoseDetector,
//!     engine::GaitEngine,
//!     metrics::Metric,
//!     report::NullPresenter,
//!     sources::replay::ReplaySource,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = ReplaySource::from_file("session.jsonl")?;
//! let mut detector = RecordedPoseDetector::new();
//! let mut engine = GaitEngine::default();
//!
//! let summary = engine.run(&mut source, &mut detector, &mut NullPresenter, None)?;
//! println!("Processed {} frames", summary.processed);
//!
//! if let Some(drop) = engine.snapshot().mean(Metric::PelvicDrop) {
//!     println!("Pelvic drop: {drop:.1}°");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Extracting metrics from a single pose
//!
//! ```no_run
//! use gait_metrics::{landmarks::{Landmark, LandmarkSet}, metrics::{Metric, MetricExtractor}};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pose = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 1.0); 33])?;
//! let frame = MetricExtractor::default().extract(&pose, 640.0, 480.0);
//! println!("Step width: {:?}", frame.get(Metric::StepWidth));
//! # Ok(())
//! # }
//! ```

/// Planar angle and tilt helpers
pub mod geometry;

/// Body landmark topology and landmark sets
pub mod landmarks;

/// Per-frame gait metric extraction
pub mod metrics;

/// Fixed-capacity rolling windows per metric
pub mod aggregator;

/// Snapshots, range hints and the presentation contract
pub mod report;

/// Pose detection collaborators
pub mod detector;

/// Frame sources and frame identity tokens
pub mod sources;

/// Frame admission: deduplication and single in-flight detection
pub mod dispatcher;

/// Landmark-to-metric engine
pub mod engine;

/// Utility functions for numeric conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
