//! Configuration management for the gait metrics application

use crate::{
    constants::{
        DEFAULT_MODEL_INPUT_SIZE, DEFAULT_PRESENCE_THRESHOLD, DEFAULT_REPORT_EVERY, DEFAULT_VISIBILITY_FLOOR, MAX_BUF,
    },
    report::{ReferenceThresholds, ViewMode},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metric engine configuration
    pub engine: EngineConfig,

    /// Reference thresholds for range hints
    pub thresholds: ReferenceThresholds,

    /// Display configuration
    pub display: DisplayConfig,

    /// Landmark model configuration
    pub model: ModelConfig,
}

/// Metric engine parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Samples kept per metric window
    pub max_buffer: usize,

    /// Hip visibility required for pelvic drop and step width; `null` disables the gate
    pub visibility_floor: Option<f64>,

    /// Clear the windows whenever a new source starts
    pub reset_on_start: bool,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Camera viewpoint (front or side)
    pub view: ViewMode,

    /// Processed frames between logged snapshots
    pub report_every: u64,

    /// Tick rate for live sources, 0 for unpaced
    pub target_fps: u32,
}

/// Landmark model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the pose landmark ONNX model
    pub pose_landmarker: PathBuf,

    /// Square input resolution of the model
    pub input_size: usize,

    /// Minimum pose presence score to accept a detection
    pub presence_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_buffer: MAX_BUF,
            visibility_floor: Some(DEFAULT_VISIBILITY_FLOOR),
            reset_on_start: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            view: ViewMode::Front,
            report_every: DEFAULT_REPORT_EVERY,
            target_fps: 0,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pose_landmarker: PathBuf::from("assets/pose_landmark_full.onnx"),
            input_size: DEFAULT_MODEL_INPUT_SIZE,
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Validate engine parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a zero window or a floor outside 0-1
    pub fn validate(&self) -> Result<()> {
        if self.max_buffer == 0 {
            return Err(Error::ConfigError(
                "Metric buffer size must be greater than 0".to_string(),
            ));
        }
        if let Some(floor) = self.visibility_floor {
            if !(0.0..=1.0).contains(&floor) {
                return Err(Error::ConfigError(
                    "Visibility floor must be between 0.0 and 1.0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the YAML is malformed
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;

        // Validate thresholds
        let t = &self.thresholds;
        if ![t.knee_valgus_min, t.pelvic_drop_max, t.step_width_min, t.tibial_tilt_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(Error::ConfigError("Reference thresholds must be finite".to_string()));
        }
        if !(0.0..=180.0).contains(&t.knee_valgus_min) {
            return Err(Error::ConfigError(
                "Knee valgus threshold must be between 0 and 180 degrees".to_string(),
            ));
        }

        // Validate display settings
        if self.display.report_every == 0 {
            return Err(Error::ConfigError(
                "Report interval must be greater than 0".to_string(),
            ));
        }

        // Validate model settings
        if self.model.input_size == 0 {
            return Err(Error::ConfigError("Model input size must be greater than 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.model.presence_threshold) {
            return Err(Error::ConfigError(
                "Presence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gait Metrics Configuration

# Metric engine
engine:
  max_buffer: 300
  visibility_floor: 0.3   # null disables hip visibility gating
  reset_on_start: false

# Reference thresholds for the range hints
thresholds:
  knee_valgus_min: 165.0
  pelvic_drop_max: 5.0
  step_width_min: 0.3
  tibial_tilt_max: 8.0

# Display settings
display:
  view: "front"
  report_every: 30
  target_fps: 0

# Pose landmark model (capture builds only)
model:
  pose_landmarker: "assets/pose_landmark_full.onnx"
  input_size: 256
  presence_threshold: 0.5
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("display:\n  view: side\n").unwrap();
        assert_eq!(config.display.view, ViewMode::Side);
        assert_eq!(config.display.report_every, DEFAULT_REPORT_EVERY);
        assert_eq!(config.engine.max_buffer, MAX_BUF);
    }

    #[test]
    fn test_null_floor_disables_gate() {
        let config = Config::from_yaml("engine:\n  visibility_floor: null\n").unwrap();
        assert_eq!(config.engine.visibility_floor, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.engine.max_buffer = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.visibility_floor = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.report_every = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.thresholds.pelvic_drop_max = f64::NAN;
        assert!(config.validate().is_err());

        assert!(Config::from_yaml("engine: [1, 2").is_err());
    }
}
