//! Calibration offset collection and application.
//!
//! Lifecycle: `Idle → Collecting (start) → Idle | Calibrated (finish)`.
//! Finishing requires at least [`MIN_CALIBRATION_SAMPLES`] buffered samples
//! for each role; below that it fails without touching the batches so the
//! caller can keep collecting and retry.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::MIN_CALIBRATION_SAMPLES;
use crate::error::{Error, Result};
use crate::sample::{MotionSample, SensorRole};

/// Additive per-axis offsets subtracted from every sample of a role
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisOffsets {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

impl AxisOffsets {
    fn mean_of(samples: &[MotionSample]) -> Self {
        let n = samples.len() as f64;
        let mut sum = Self::default();
        for s in samples {
            sum.ax += s.ax;
            sum.ay += s.ay;
            sum.az += s.az;
            sum.gx += s.gx;
            sum.gy += s.gy;
            sum.gz += s.gz;
        }
        Self {
            ax: sum.ax / n,
            ay: sum.ay / n,
            az: sum.az / n,
            gx: sum.gx / n,
            gy: sum.gy / n,
            gz: sum.gz / n,
        }
    }
}

/// Per-role offsets plus the calibrated flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub hand: AxisOffsets,
    pub finger: AxisOffsets,
    pub is_calibrated: bool,
}

/// Offset collection state machine
pub struct Calibrator {
    profile: CalibrationProfile,
    collecting: bool,
    hand_batch: Vec<MotionSample>,
    finger_batch: Vec<MotionSample>,
}

impl Calibrator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile: CalibrationProfile::default(),
            collecting: false,
            hand_batch: Vec::new(),
            finger_batch: Vec::new(),
        }
    }

    /// Current profile
    #[must_use]
    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Whether a collection is in progress
    #[must_use]
    pub fn is_collecting(&self) -> bool {
        self.collecting
    }

    /// Begin a fresh collection, invalidating any previous calibration
    pub fn start(&mut self) {
        self.hand_batch.clear();
        self.finger_batch.clear();
        self.collecting = true;
        self.profile.is_calibrated = false;
        info!("Calibration collection started");
    }

    /// Buffer one sample pair for the pending calibration
    pub fn add_samples(&mut self, hand: MotionSample, finger: MotionSample) {
        if !self.collecting {
            return;
        }
        self.hand_batch.push(hand);
        self.finger_batch.push(finger);
    }

    /// Average the collected batches into new offsets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Calibration`] if either batch holds fewer than
    /// [`MIN_CALIBRATION_SAMPLES`] samples; the batches are kept so the
    /// caller can add more and retry.
    pub fn finish(&mut self) -> Result<()> {
        if self.hand_batch.len() < MIN_CALIBRATION_SAMPLES || self.finger_batch.len() < MIN_CALIBRATION_SAMPLES {
            warn!(
                "Insufficient calibration samples (hand: {}, finger: {}, need {})",
                self.hand_batch.len(),
                self.finger_batch.len(),
                MIN_CALIBRATION_SAMPLES
            );
            return Err(Error::Calibration(format!(
                "need at least {} samples per role, have hand: {}, finger: {}",
                MIN_CALIBRATION_SAMPLES,
                self.hand_batch.len(),
                self.finger_batch.len()
            )));
        }

        self.profile = CalibrationProfile {
            hand: AxisOffsets::mean_of(&self.hand_batch),
            finger: AxisOffsets::mean_of(&self.finger_batch),
            is_calibrated: true,
        };
        self.collecting = false;
        self.hand_batch.clear();
        self.finger_batch.clear();
        info!("Calibration finished, offsets applied");
        Ok(())
    }

    /// Subtract the role's offsets, passing through when uncalibrated
    #[must_use]
    pub fn apply(&self, sample: MotionSample) -> MotionSample {
        if !self.profile.is_calibrated {
            return sample;
        }
        let offset = match sample.role {
            SensorRole::Hand => self.profile.hand,
            SensorRole::Finger => self.profile.finger,
        };
        MotionSample {
            ax: sample.ax - offset.ax,
            ay: sample.ay - offset.ay,
            az: sample.az - offset.az,
            gx: sample.gx - offset.gx,
            gy: sample.gy - offset.gy,
            gz: sample.gz - offset.gz,
            ..sample
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(role: SensorRole) -> MotionSample {
        MotionSample {
            ax: 1.0,
            ay: 2.0,
            az: 3.0,
            gx: 4.0,
            gy: 5.0,
            gz: 6.0,
            timestamp: 0,
            role,
            quality: 1.0,
        }
    }

    #[test]
    fn test_calibration_round_trip() {
        let mut calibrator = Calibrator::new();
        calibrator.start();
        for _ in 0..10 {
            calibrator.add_samples(sample(SensorRole::Hand), sample(SensorRole::Finger));
        }
        calibrator.finish().unwrap();

        let out = calibrator.apply(sample(SensorRole::Hand));
        assert_eq!(out.ax, 0.0);
        assert_eq!(out.ay, 0.0);
        assert_eq!(out.az, 0.0);
        assert_eq!(out.gx, 0.0);
        assert_eq!(out.gy, 0.0);
        assert_eq!(out.gz, 0.0);
    }

    #[test]
    fn test_insufficient_samples_keeps_batches() {
        let mut calibrator = Calibrator::new();
        calibrator.start();
        for _ in 0..5 {
            calibrator.add_samples(sample(SensorRole::Hand), sample(SensorRole::Finger));
        }
        assert!(calibrator.finish().is_err());
        assert!(!calibrator.profile().is_calibrated);

        // Retry after collecting the remainder
        for _ in 0..5 {
            calibrator.add_samples(sample(SensorRole::Hand), sample(SensorRole::Finger));
        }
        assert!(calibrator.finish().is_ok());
        assert!(calibrator.profile().is_calibrated);
    }

    #[test]
    fn test_uncalibrated_passes_through() {
        let calibrator = Calibrator::new();
        let s = sample(SensorRole::Finger);
        assert_eq!(calibrator.apply(s), s);
    }

    #[test]
    fn test_samples_ignored_when_idle() {
        let mut calibrator = Calibrator::new();
        calibrator.add_samples(sample(SensorRole::Hand), sample(SensorRole::Finger));
        calibrator.start();
        assert!(calibrator.finish().is_err());
    }
}
