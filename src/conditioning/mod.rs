//! Per-sensor signal conditioning applied before compensation and fusion.
//!
//! Three stages run in order on every incoming sample: calibration offset
//! subtraction, moving-average smoothing, and a dead-zone noise gate. Each
//! stage lives in its own module; [`SensorConditioner`] chains them per
//! sensor role.

/// Calibration offsets and the collection state machine
pub mod calibration;

/// Moving-average smoothing over a bounded sample buffer
pub mod smoothing;

/// Dead-zone noise gating with asymmetric accel/gyro thresholds
pub mod noise_gate;

use crate::error::Result;
use crate::sample::{MotionSample, SensorRole};
use calibration::Calibrator;
use noise_gate::NoiseGate;
use smoothing::SmoothingFilter;

/// Conditioning chain for the hand/finger sensor pair.
///
/// Owns the shared calibration profile and one smoothing buffer per role so
/// the two streams never contaminate each other's running averages.
pub struct SensorConditioner {
    calibrator: Calibrator,
    calibration_enabled: bool,
    hand_smoothing: SmoothingFilter,
    finger_smoothing: SmoothingFilter,
    noise_gate: NoiseGate,
}

impl SensorConditioner {
    /// Create a conditioner with the given smoothing window and noise
    /// threshold
    #[must_use]
    pub fn new(smoothing_window: usize, noise_threshold: f64, calibration_enabled: bool) -> Self {
        Self {
            calibrator: Calibrator::new(),
            calibration_enabled,
            hand_smoothing: SmoothingFilter::new(smoothing_window),
            finger_smoothing: SmoothingFilter::new(smoothing_window),
            noise_gate: NoiseGate::new(noise_threshold),
        }
    }

    /// Run the full chain: calibration, smoothing, noise gate
    pub fn condition(&mut self, sample: MotionSample) -> MotionSample {
        let calibrated = self.apply_calibration(sample);
        let smoothed = match sample.role {
            SensorRole::Hand => self.hand_smoothing.apply(calibrated),
            SensorRole::Finger => self.finger_smoothing.apply(calibrated),
        };
        self.noise_gate.apply(smoothed)
    }

    /// Subtract the role's calibration offset if a calibration is active
    #[must_use]
    pub fn apply_calibration(&self, sample: MotionSample) -> MotionSample {
        if !self.calibration_enabled {
            return sample;
        }
        self.calibrator.apply(sample)
    }

    /// Begin collecting a fresh calibration batch
    pub fn start_calibration(&mut self) {
        self.calibrator.start();
    }

    /// Buffer one hand/finger sample pair for the pending calibration
    pub fn add_calibration_sample(&mut self, hand: MotionSample, finger: MotionSample) {
        self.calibrator.add_samples(hand, finger);
    }

    /// Finish the pending calibration, averaging the collected batches
    pub fn finish_calibration(&mut self) -> Result<()> {
        self.calibrator.finish()
    }

    /// Whether a calibration profile is currently applied
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.calibrator.profile().is_calibrated
    }

    /// Current calibration profile
    #[must_use]
    pub fn calibration_profile(&self) -> &calibration::CalibrationProfile {
        self.calibrator.profile()
    }

    /// Resize both smoothing windows
    pub fn set_smoothing_window(&mut self, window: usize) {
        self.hand_smoothing.set_window(window);
        self.finger_smoothing.set_window(window);
    }

    /// Change the noise gate threshold
    pub fn set_noise_threshold(&mut self, threshold: f64) {
        self.noise_gate.set_threshold(threshold);
    }

    /// Enable or disable calibration offset subtraction
    pub fn set_calibration_enabled(&mut self, enabled: bool) {
        self.calibration_enabled = enabled;
    }

    /// Clear smoothing buffers, keeping the calibration profile
    pub fn reset_buffers(&mut self) {
        self.hand_smoothing.reset();
        self.finger_smoothing.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SensorRole;

    fn sample(role: SensorRole, ax: f64) -> MotionSample {
        MotionSample {
            ax,
            ay: 0.0,
            az: 0.0,
            gx: 0.0,
            gy: 0.0,
            gz: 0.0,
            timestamp: 0,
            role,
            quality: 1.0,
        }
    }

    #[test]
    fn test_streams_smooth_independently() {
        let mut conditioner = SensorConditioner::new(3, 0.0, false);

        conditioner.condition(sample(SensorRole::Hand, 3.0));
        conditioner.condition(sample(SensorRole::Hand, 6.0));
        // Finger buffer has one sample, must pass through untouched
        let finger = conditioner.condition(sample(SensorRole::Finger, 9.0));
        assert_eq!(finger.ax, 9.0);

        let hand = conditioner.condition(sample(SensorRole::Hand, 9.0));
        assert_eq!(hand.ax, 6.0);
    }

    #[test]
    fn test_calibration_disabled_passes_through() {
        let mut conditioner = SensorConditioner::new(5, 0.0, false);
        conditioner.start_calibration();
        for _ in 0..10 {
            conditioner.add_calibration_sample(sample(SensorRole::Hand, 2.0), sample(SensorRole::Finger, 2.0));
        }
        conditioner.finish_calibration().unwrap();

        let out = conditioner.apply_calibration(sample(SensorRole::Hand, 2.0));
        assert_eq!(out.ax, 2.0);
    }
}
