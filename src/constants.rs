//! Constants used throughout the application

/// Number of landmarks in the full-body pose topology
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Capacity of each per-metric rolling buffer
pub const MAX_BUF: usize = 300;

/// Minimum hip visibility required for pelvic drop and step width
pub const DEFAULT_VISIBILITY_FLOOR: f64 = 0.3;

/// Floor on hip width in frame-space units, keeps the ratios finite
pub const MIN_HIP_WIDTH: f64 = 1.0;

/// Knee valgus angle at or above this is within normal range (degrees)
pub const KNEE_VALGUS_MIN_DEG: f64 = 165.0;

/// Pelvic drop at or below this is within normal range (degrees)
pub const PELVIC_DROP_MAX_DEG: f64 = 5.0;

/// Step width ratio at or above this is within normal range
pub const STEP_WIDTH_MIN_RATIO: f64 = 0.3;

/// Tibial tilt at or below this is within normal range (degrees)
pub const TIBIAL_TILT_MAX_DEG: f64 = 8.0;

/// Default number of processed frames between logged snapshots
pub const DEFAULT_REPORT_EVERY: u64 = 30;

/// Default landmark model input resolution (square)
pub const DEFAULT_MODEL_INPUT_SIZE: usize = 256;

/// Default pose presence threshold for the landmark model
pub const DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;
