//! Configuration management for the fusion pipeline

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    ACTIVITY_THRESHOLD, CLASSIFICATION_WINDOW, COMBINED_EMIT_THRESHOLD, DEFAULT_BETA, DEFAULT_COMPENSATION_FACTOR,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_NOISE_THRESHOLD, DEFAULT_SMOOTHING_WINDOW, DEFAULT_WINDOW_CAPACITY,
    GESTURE_CONFIDENCE_THRESHOLD,
};

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sample conditioning and compensation
    pub processing: ProcessingConfig,

    /// Orientation filter gains
    pub orientation: OrientationConfig,

    /// Rolling window sizing
    pub analysis: AnalysisConfig,

    /// Classifier thresholds and history
    pub classifier: ClassifierConfig,
}

/// Conditioning and compensation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Base compensation strength
    pub compensation_factor: f64,

    /// Moving-average smoothing window (samples)
    pub smoothing_window: usize,

    /// Accelerometer dead-zone threshold (g); gyro uses 10× this value
    pub noise_threshold: f64,

    /// Apply calibration offsets when a profile is present
    pub calibration_enabled: bool,
}

/// Orientation filter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Gradient-descent gain shared by all three stream filters
    pub beta: f64,
}

/// Rolling window parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Capacity of each per-stream rolling window (samples)
    pub window_capacity: usize,

    /// Most recent samples handed to the classifiers
    pub classification_window: usize,
}

/// Classifier parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Mean accel magnitude for the dominant-actor classifier to fire (g)
    pub activity_threshold: f64,

    /// Template score required to emit a gesture pattern
    pub gesture_confidence_threshold: f64,

    /// Combined-analysis confidence required to enter the history
    pub combined_emit_threshold: f64,

    /// Bounded pattern history size
    pub history_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig::default(),
            orientation: OrientationConfig::default(),
            analysis: AnalysisConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            compensation_factor: DEFAULT_COMPENSATION_FACTOR,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            calibration_enabled: true,
        }
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self { beta: DEFAULT_BETA }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            classification_window: CLASSIFICATION_WINDOW,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            activity_threshold: ACTIVITY_THRESHOLD,
            gesture_confidence_threshold: GESTURE_CONFIDENCE_THRESHOLD,
            combined_emit_threshold: COMBINED_EMIT_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Partial configuration update exposed to collaborators at runtime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    /// New base compensation strength
    pub compensation_factor: Option<f64>,

    /// New smoothing window (samples)
    pub smoothing_window: Option<usize>,

    /// New accelerometer noise threshold (g)
    pub noise_threshold: Option<f64>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.processing.compensation_factor <= 0.0 {
            return Err(Error::Config("Compensation factor must be positive".to_string()));
        }
        if self.processing.smoothing_window == 0 {
            return Err(Error::Config("Smoothing window must be greater than 0".to_string()));
        }
        if self.processing.noise_threshold < 0.0 {
            return Err(Error::Config("Noise threshold must be non-negative".to_string()));
        }
        if !(0.0..=1.0).contains(&self.orientation.beta) || self.orientation.beta == 0.0 {
            return Err(Error::Config("Filter beta must be in (0, 1]".to_string()));
        }
        if self.analysis.window_capacity == 0 {
            return Err(Error::Config("Window capacity must be greater than 0".to_string()));
        }
        if self.analysis.classification_window > self.analysis.window_capacity {
            return Err(Error::Config(
                "Classification window cannot exceed window capacity".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.gesture_confidence_threshold) {
            return Err(Error::Config(
                "Gesture confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.combined_emit_threshold) {
            return Err(Error::Config(
                "Combined emit threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.classifier.history_capacity == 0 {
            return Err(Error::Config("History capacity must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Dual Motion Fusion Configuration

# Conditioning and compensation
processing:
  compensation_factor: 1.0
  smoothing_window: 5
  noise_threshold: 0.05
  calibration_enabled: true

# Orientation filter
orientation:
  beta: 0.1

# Rolling windows
analysis:
  window_capacity: 100
  classification_window: 64

# Pattern classification
classifier:
  activity_threshold: 2.0
  gesture_confidence_threshold: 0.7
  combined_emit_threshold: 0.75
  history_capacity: 50
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.processing.smoothing_window, 5);
        assert_eq!(config.analysis.window_capacity, 100);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("processing:\n  noise_threshold: 0.1\n").unwrap();
        assert_eq!(config.processing.noise_threshold, 0.1);
        assert_eq!(config.classifier.history_capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.processing.smoothing_window = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.orientation.beta = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.classification_window = config.analysis.window_capacity + 1;
        assert!(config.validate().is_err());
    }
}
