//! Top-level driver tying conditioning, compensation, fusion and
//! classification together.
//!
//! One [`FusionOrchestrator`] owns all long-lived mutable state: the three
//! orientation filters, the rolling windows, the calibration profile and the
//! pattern history. Processing is synchronous and call-driven; `&mut self`
//! is the exclusive-access boundary. A concurrent host wraps one
//! orchestrator in a lock so only one sample pair mutates state at a time.

use std::collections::VecDeque;
use std::f64::consts::PI;

use log::{debug, info};
use serde::Serialize;

use crate::analysis::{window_duration_ms, SampleWindow};
use crate::classifier::{DetectedPattern, GestureWindow, PatternClassifier};
use crate::compensation::MotionCompensator;
use crate::conditioning::SensorConditioner;
use crate::config::{Config, ConfigUpdate};
use crate::constants::{EPSILON, FREQUENCY_WINDOW_MS};
use crate::error::Result;
use crate::orientation::{OrientationFilter, Quaternion};
use crate::sample::{CompensatedSample, MotionSample, SensorRole};

/// One cycle's input: either sensor may be silent
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorInput {
    pub hand: Option<MotionSample>,
    pub finger: Option<MotionSample>,
}

impl SensorInput {
    /// A cycle carrying both sensors
    #[must_use]
    pub fn pair(hand: MotionSample, finger: MotionSample) -> Self {
        Self {
            hand: Some(hand),
            finger: Some(finger),
        }
    }

    /// A cycle carrying a single sample, routed by its role
    #[must_use]
    pub fn single(sample: MotionSample) -> Self {
        match sample.role {
            SensorRole::Hand => Self {
                hand: Some(sample),
                finger: None,
            },
            SensorRole::Finger => Self {
                hand: None,
                finger: Some(sample),
            },
        }
    }
}

/// Axis with the largest compensated magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantAxis {
    X,
    Y,
    Z,
}

/// Coarse per-cycle motion label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    Static,
    Linear,
    Rotational,
    Complex,
}

/// Per-cycle metrics snapshot computed when both sensors reported
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MotionMetrics {
    pub hand_magnitude: f64,
    pub finger_magnitude: f64,
    pub compensated_magnitude: f64,
    /// Alignment of the instantaneous hand and finger accel vectors
    pub correlation_coefficient: f64,
    /// Compensated magnitude relative to the raw finger magnitude
    pub independent_motion_ratio: f64,
    pub dominant_axis: DominantAxis,
    pub motion_type: MotionType,
}

/// Ingest statistics derived from sample timestamps
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StreamStats {
    pub total_samples: u64,
    /// Cycles whose timestamps fall in the trailing 2 s window, halved
    pub frequency_hz: f64,
    pub last_timestamp: u64,
    pub is_active: bool,
}

/// Everything a cycle produced for downstream collaborators
#[derive(Debug, Clone, Default)]
pub struct CycleOutput {
    /// Hand orientation, present when the hand stream advanced
    pub hand_quaternion: Option<Quaternion>,
    /// Raw finger orientation, present when the finger stream advanced
    pub finger_quaternion: Option<Quaternion>,
    /// Compensated finger orientation, present when both sensors reported
    pub compensated_quaternion: Option<Quaternion>,
    pub compensated: Option<CompensatedSample>,
    pub metrics: Option<MotionMetrics>,
    /// Patterns emitted this cycle, in classification order
    pub patterns: Vec<DetectedPattern>,
}

/// Owner of all mutable pipeline state
pub struct FusionOrchestrator {
    config: Config,
    conditioner: SensorConditioner,
    compensator: MotionCompensator,
    hand_filter: OrientationFilter,
    finger_filter: OrientationFilter,
    compensated_filter: OrientationFilter,
    hand_window: SampleWindow<MotionSample>,
    finger_window: SampleWindow<MotionSample>,
    compensated_window: SampleWindow<CompensatedSample>,
    classifier: PatternClassifier,
    metrics: Option<MotionMetrics>,
    total_samples: u64,
    cycle_timestamps: VecDeque<u64>,
}

impl FusionOrchestrator {
    /// Create an orchestrator from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!("Initializing fusion pipeline");

        Ok(Self {
            conditioner: SensorConditioner::new(
                config.processing.smoothing_window,
                config.processing.noise_threshold,
                config.processing.calibration_enabled,
            ),
            compensator: MotionCompensator::new(config.processing.compensation_factor),
            hand_filter: OrientationFilter::new(config.orientation.beta),
            finger_filter: OrientationFilter::new(config.orientation.beta),
            compensated_filter: OrientationFilter::new(config.orientation.beta),
            hand_window: SampleWindow::new(config.analysis.window_capacity),
            finger_window: SampleWindow::new(config.analysis.window_capacity),
            compensated_window: SampleWindow::new(config.analysis.window_capacity),
            classifier: PatternClassifier::new(&config.classifier),
            metrics: None,
            total_samples: 0,
            cycle_timestamps: VecDeque::new(),
            config,
        })
    }

    /// Run one full pass: conditioning, compensation, fusion, analysis,
    /// classification.
    ///
    /// A silent sensor skips its derived steps for the cycle; the other
    /// stream still advances. An empty input is a no-op.
    pub fn process(&mut self, input: SensorInput) -> CycleOutput {
        let mut output = CycleOutput::default();
        if input.hand.is_none() && input.finger.is_none() {
            return output;
        }

        let hand = input.hand.map(|s| self.conditioner.condition(s));
        let finger = input.finger.map(|s| self.conditioner.condition(s));

        let compensated = match (&hand, &finger) {
            (Some(h), Some(f)) => Some(self.compensator.compensate(f, h)),
            _ => None,
        };

        if let Some(h) = hand {
            Self::fuse(&mut self.hand_filter, h.timestamp, h.gx, h.gy, h.gz, h.ax, h.ay, h.az);
            output.hand_quaternion = Some(self.hand_filter.quaternion());
            self.hand_window.push(h);
        }
        if let Some(f) = finger {
            Self::fuse(&mut self.finger_filter, f.timestamp, f.gx, f.gy, f.gz, f.ax, f.ay, f.az);
            output.finger_quaternion = Some(self.finger_filter.quaternion());
            self.finger_window.push(f);
        }
        if let Some(c) = compensated {
            Self::fuse(&mut self.compensated_filter, c.timestamp, c.gx, c.gy, c.gz, c.ax, c.ay, c.az);
            output.compensated_quaternion = Some(self.compensated_filter.quaternion());
            self.compensated_window.push(c);
            output.compensated = Some(c);
        }

        if let (Some(h), Some(f), Some(c)) = (&hand, &finger, &compensated) {
            let metrics = compute_metrics(h, f, c);
            self.metrics = Some(metrics);
            output.metrics = Some(metrics);
        }

        self.update_stats(&input);
        output.patterns = self.classify();
        output
    }

    /// Gyro rates arrive in deg/s; the orientation filter integrates rad/s
    #[allow(clippy::too_many_arguments)]
    fn fuse(filter: &mut OrientationFilter, timestamp: u64, gx: f64, gy: f64, gz: f64, ax: f64, ay: f64, az: f64) {
        filter.update(
            timestamp,
            gx * PI / 180.0,
            gy * PI / 180.0,
            gz * PI / 180.0,
            ax,
            ay,
            az,
        );
    }

    fn classify(&mut self) -> Vec<DetectedPattern> {
        let window = self.config.analysis.classification_window;
        let hand = self.hand_window.tail(window);
        let finger = self.finger_window.tail(window);
        let compensated = self.compensated_window.tail(window);

        let mut patterns = Vec::new();
        patterns.extend(self.classifier.classify_activity(&hand, &finger));
        patterns.extend(self.classifier.classify_combined(&hand, &compensated));

        let duration_ms = if compensated.is_empty() {
            window_duration_ms(&hand)
        } else {
            window_duration_ms(&compensated)
        };
        patterns.extend(self.classifier.classify_gestures(&GestureWindow {
            hand: &hand,
            finger: &finger,
            compensated: &compensated,
            duration_ms,
        }));

        for pattern in &patterns {
            debug!("Pattern: {} confidence {:.2}", pattern.name, pattern.confidence);
        }
        patterns
    }

    fn update_stats(&mut self, input: &SensorInput) {
        let timestamp = input
            .hand
            .map(|s| s.timestamp)
            .unwrap_or_default()
            .max(input.finger.map(|s| s.timestamp).unwrap_or_default());
        self.total_samples += 1;
        self.cycle_timestamps.push_back(timestamp);
        while let Some(&front) = self.cycle_timestamps.front() {
            if timestamp.saturating_sub(front) >= FREQUENCY_WINDOW_MS {
                self.cycle_timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Latest metrics snapshot, if any dual-sensor cycle has run
    #[must_use]
    pub fn metrics(&self) -> Option<&MotionMetrics> {
        self.metrics.as_ref()
    }

    /// Most recently classified pattern
    #[must_use]
    pub fn current_pattern(&self) -> Option<&DetectedPattern> {
        self.classifier.current_pattern()
    }

    /// Bounded pattern history, oldest first
    #[must_use]
    pub fn pattern_history(&self) -> impl Iterator<Item = &DetectedPattern> {
        self.classifier.history().iter()
    }

    /// Ingest statistics derived from sample timestamps
    #[must_use]
    pub fn stream_stats(&self) -> StreamStats {
        let frequency_hz = self.cycle_timestamps.len() as f64 / (FREQUENCY_WINDOW_MS as f64 / 1000.0);
        StreamStats {
            total_samples: self.total_samples,
            frequency_hz,
            last_timestamp: self.cycle_timestamps.back().copied().unwrap_or_default(),
            is_active: frequency_hz > 0.0,
        }
    }

    /// Current per-stream orientations
    #[must_use]
    pub fn quaternions(&self) -> (Quaternion, Quaternion, Quaternion) {
        (
            self.hand_filter.quaternion(),
            self.finger_filter.quaternion(),
            self.compensated_filter.quaternion(),
        )
    }

    /// Clear filters, windows, metrics, stats and pattern history.
    ///
    /// Calibration is preserved; recalibrating requires an explicit new
    /// collection.
    pub fn reset(&mut self) {
        info!("Resetting fusion pipeline state");
        self.hand_filter.reset();
        self.finger_filter.reset();
        self.compensated_filter.reset();
        self.hand_window.clear();
        self.finger_window.clear();
        self.compensated_window.clear();
        self.conditioner.reset_buffers();
        self.classifier.reset();
        self.metrics = None;
        self.total_samples = 0;
        self.cycle_timestamps.clear();
    }

    /// Begin collecting a fresh calibration batch
    pub fn start_calibration(&mut self) {
        self.conditioner.start_calibration();
    }

    /// Buffer one hand/finger pair for the pending calibration
    pub fn add_calibration_sample(&mut self, hand: MotionSample, finger: MotionSample) {
        self.conditioner.add_calibration_sample(hand, finger);
    }

    /// Finish the pending calibration
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Calibration`] when either role has fewer than
    /// the required samples; the collection survives for a retry.
    pub fn finish_calibration(&mut self) -> Result<()> {
        self.conditioner.finish_calibration()
    }

    /// Whether a calibration profile is applied
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.conditioner.is_calibrated()
    }

    /// Apply a partial configuration update
    pub fn update_config(&mut self, update: &ConfigUpdate) {
        if let Some(factor) = update.compensation_factor {
            self.compensator.set_base_factor(factor);
            self.config.processing.compensation_factor = factor;
        }
        if let Some(window) = update.smoothing_window {
            self.conditioner.set_smoothing_window(window);
            self.config.processing.smoothing_window = window;
        }
        if let Some(threshold) = update.noise_threshold {
            self.conditioner.set_noise_threshold(threshold);
            self.config.processing.noise_threshold = threshold;
        }
        debug!("Configuration updated: {:?}", update);
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Per-cycle metrics from one conditioned hand/finger/compensated triple
fn compute_metrics(hand: &MotionSample, finger: &MotionSample, compensated: &CompensatedSample) -> MotionMetrics {
    let hand_magnitude = hand.accel_magnitude();
    let finger_magnitude = finger.accel_magnitude();
    let compensated_magnitude = compensated.accel_magnitude();

    let dot = hand.ax * finger.ax + hand.ay * finger.ay + hand.az * finger.az;
    let denominator = hand_magnitude * finger_magnitude;
    let correlation_coefficient = if denominator == 0.0 { 0.0 } else { dot / denominator };

    let independent_motion_ratio = compensated_magnitude / (finger_magnitude + EPSILON);

    let abs = [compensated.ax.abs(), compensated.ay.abs(), compensated.az.abs()];
    let dominant_axis = if abs[0] >= abs[1] && abs[0] >= abs[2] {
        DominantAxis::X
    } else if abs[1] >= abs[2] {
        DominantAxis::Y
    } else {
        DominantAxis::Z
    };

    let gyro_magnitude = hand.gyro_magnitude();
    let motion_type = if hand_magnitude < 0.1 && compensated_magnitude < 0.1 {
        MotionType::Static
    } else if gyro_magnitude > hand_magnitude * 10.0 {
        MotionType::Rotational
    } else if compensated_magnitude > hand_magnitude * 0.5 {
        MotionType::Complex
    } else {
        MotionType::Linear
    };

    MotionMetrics {
        hand_magnitude,
        finger_magnitude,
        compensated_magnitude,
        correlation_coefficient,
        independent_motion_ratio,
        dominant_axis,
        motion_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(role: SensorRole, ax: f64, gx: f64, t: u64) -> MotionSample {
        MotionSample {
            ax,
            ay: 0.0,
            az: if role == SensorRole::Hand { 1.0 } else { 0.9 },
            gx,
            gy: 0.0,
            gz: 0.0,
            timestamp: t,
            role,
            quality: 1.0,
        }
    }

    fn orchestrator() -> FusionOrchestrator {
        FusionOrchestrator::new(Config::default()).unwrap()
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut orchestrator = orchestrator();
        let output = orchestrator.process(SensorInput::default());
        assert!(output.hand_quaternion.is_none());
        assert!(output.patterns.is_empty());
        assert_eq!(orchestrator.stream_stats().total_samples, 0);
    }

    #[test]
    fn test_single_sensor_skips_derived_steps() {
        let mut orchestrator = orchestrator();
        let output = orchestrator.process(SensorInput::single(sample(SensorRole::Hand, 0.1, 1.0, 20)));
        assert!(output.hand_quaternion.is_some());
        assert!(output.finger_quaternion.is_none());
        assert!(output.compensated_quaternion.is_none());
        assert!(output.compensated.is_none());
        assert!(output.metrics.is_none());
    }

    #[test]
    fn test_pair_produces_compensated_stream() {
        let mut orchestrator = orchestrator();
        let output = orchestrator.process(SensorInput::pair(
            sample(SensorRole::Hand, 0.1, 1.0, 20),
            sample(SensorRole::Finger, 0.3, 2.0, 20),
        ));
        assert!(output.compensated.is_some());
        assert!(output.compensated_quaternion.is_some());
        assert!(output.metrics.is_some());
    }

    #[test]
    fn test_metrics_motion_types() {
        let mut still_hand = sample(SensorRole::Hand, 0.0, 0.0, 0);
        still_hand.az = 0.05;
        let mut still_finger = sample(SensorRole::Finger, 0.0, 0.0, 0);
        still_finger.az = 0.05;
        let compensated = CompensatedSample {
            ax: 0.0,
            ay: 0.0,
            az: 0.0,
            gx: 0.0,
            gy: 0.0,
            gz: 0.0,
            timestamp: 0,
        };
        let metrics = compute_metrics(&still_hand, &still_finger, &compensated);
        assert_eq!(metrics.motion_type, MotionType::Static);

        let mut spinning = sample(SensorRole::Hand, 0.2, 50.0, 0);
        spinning.az = 0.0;
        let metrics = compute_metrics(&spinning, &still_finger, &compensated);
        assert_eq!(metrics.motion_type, MotionType::Rotational);
    }

    #[test]
    fn test_reset_preserves_calibration() {
        let mut orchestrator = orchestrator();
        orchestrator.start_calibration();
        for t in 0..10u64 {
            orchestrator.add_calibration_sample(
                sample(SensorRole::Hand, 0.5, 0.0, t * 20),
                sample(SensorRole::Finger, 0.5, 0.0, t * 20),
            );
        }
        orchestrator.finish_calibration().unwrap();
        assert!(orchestrator.is_calibrated());

        for t in 0..5u64 {
            orchestrator.process(SensorInput::pair(
                sample(SensorRole::Hand, 0.5, 1.0, t * 20),
                sample(SensorRole::Finger, 0.5, 1.0, t * 20),
            ));
        }
        orchestrator.reset();
        assert!(orchestrator.is_calibrated());
        assert_eq!(orchestrator.stream_stats().total_samples, 0);
        assert!(orchestrator.current_pattern().is_none());
        assert_eq!(orchestrator.quaternions().0, Quaternion::identity());
    }

    #[test]
    fn test_update_config_applies_partially() {
        let mut orchestrator = orchestrator();
        orchestrator.update_config(&ConfigUpdate {
            compensation_factor: Some(0.8),
            smoothing_window: None,
            noise_threshold: Some(0.1),
        });
        assert_eq!(orchestrator.config().processing.compensation_factor, 0.8);
        assert_eq!(orchestrator.config().processing.smoothing_window, 5);
        assert_eq!(orchestrator.config().processing.noise_threshold, 0.1);
    }

    #[test]
    fn test_stream_stats_frequency() {
        let mut orchestrator = orchestrator();
        // 50 Hz for one second
        for t in 0..50u64 {
            orchestrator.process(SensorInput::single(sample(SensorRole::Hand, 0.1, 0.0, t * 20)));
        }
        let stats = orchestrator.stream_stats();
        assert_eq!(stats.total_samples, 50);
        assert!(stats.is_active);
        assert!((stats.frequency_hz - 25.0).abs() < 1.0);
    }
}
