//! Constants used throughout the fusion pipeline

/// Default gradient-descent gain for the orientation filter
pub const DEFAULT_BETA: f64 = 0.1;

/// Lower clamp for the orientation filter time step (seconds)
pub const MIN_DELTA_T: f64 = 0.001;

/// Upper clamp for the orientation filter time step (seconds)
pub const MAX_DELTA_T: f64 = 0.1;

/// Assumed interval for the very first filter update (seconds, 100 Hz)
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 0.01;

/// Default moving-average smoothing window (samples)
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Below this many buffered samples, smoothing passes input through
pub const SMOOTHING_MIN_SAMPLES: usize = 2;

/// Default accelerometer dead-zone threshold (g)
pub const DEFAULT_NOISE_THRESHOLD: f64 = 0.05;

/// Gyroscope dead-zone threshold is this multiple of the accel threshold
pub const GYRO_GATE_RATIO: f64 = 10.0;

/// Default compensation strength
pub const DEFAULT_COMPENSATION_FACTOR: f64 = 1.0;

/// Bounds of the adaptive compensation factor
pub const ADAPTIVE_FACTOR_MIN: f64 = 0.5;
pub const ADAPTIVE_FACTOR_MAX: f64 = 1.0;

/// Hand accel magnitude divisor in the adaptive factor
pub const HAND_MAGNITUDE_SCALE: f64 = 10.0;

/// Minimum samples per role required to finish a calibration
pub const MIN_CALIBRATION_SAMPLES: usize = 10;

/// Minimum window length for the statistical analysis operations
pub const ANALYSIS_MIN_SAMPLES: usize = 10;

/// Minimum per-stream window length for combined-energy classification
pub const COMBINED_MIN_SAMPLES: usize = 16;

/// Longest candidate period in the coarse autocorrelation spectrum
pub const MAX_SPECTRUM_PERIOD: usize = 20;

/// Mean accel magnitude above which the dominant-actor classifier fires (g)
pub const ACTIVITY_THRESHOLD: f64 = 2.0;

/// Divisor mapping activity magnitude to confidence
pub const ACTIVITY_CONFIDENCE_SCALE: f64 = 5.0;

/// Template score required to emit a gesture pattern
pub const GESTURE_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Combined-analysis confidence required to append to history
pub const COMBINED_EMIT_THRESHOLD: f64 = 0.75;

/// Confidence clamp applied to combined-analysis results
pub const CONFIDENCE_MIN: f64 = 0.1;
pub const CONFIDENCE_MAX: f64 = 0.99;

/// Default rolling window capacity per stream (samples, ~2 s at 50 Hz)
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// Window length consumed by the classifiers (samples)
pub const CLASSIFICATION_WINDOW: usize = 64;

/// Bounded pattern history capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Trailing window for the ingest frequency estimate (ms)
pub const FREQUENCY_WINDOW_MS: u64 = 2000;

/// Hand/finger weights reported by the combined analysis
pub const HAND_ANALYSIS_WEIGHT: f64 = 0.6;
pub const FINGER_ANALYSIS_WEIGHT: f64 = 0.4;

/// Numeric guard added to denominators
pub const EPSILON: f64 = 0.001;
