//! Dead-zone noise gating.

use crate::constants::GYRO_GATE_RATIO;
use crate::sample::MotionSample;

/// Zeroes axes whose magnitude falls below the sensor noise floor.
///
/// Gyroscope axes use a threshold [`GYRO_GATE_RATIO`] times the accel
/// threshold, reflecting the different dynamic ranges. Applying the gate
/// twice yields the same result as applying it once.
pub struct NoiseGate {
    threshold: f64,
}

impl NoiseGate {
    /// Create a gate with the given accelerometer threshold (g)
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is negative
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        assert!(threshold >= 0.0, "Noise threshold must be non-negative");
        Self { threshold }
    }

    /// Zero all axes below the dead-zone thresholds
    #[must_use]
    pub fn apply(&self, sample: MotionSample) -> MotionSample {
        let gate = |value: f64, threshold: f64| if value.abs() < threshold { 0.0 } else { value };
        let gyro_threshold = self.threshold * GYRO_GATE_RATIO;

        MotionSample {
            ax: gate(sample.ax, self.threshold),
            ay: gate(sample.ay, self.threshold),
            az: gate(sample.az, self.threshold),
            gx: gate(sample.gx, gyro_threshold),
            gy: gate(sample.gy, gyro_threshold),
            gz: gate(sample.gz, gyro_threshold),
            ..sample
        }
    }

    /// Change the accelerometer threshold
    pub fn set_threshold(&mut self, threshold: f64) {
        assert!(threshold >= 0.0, "Noise threshold must be non-negative");
        self.threshold = threshold;
    }

    /// Current accelerometer threshold
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SensorRole;

    fn sample(ax: f64, ay: f64, gx: f64, gy: f64) -> MotionSample {
        MotionSample {
            ax,
            ay,
            az: 0.0,
            gx,
            gy,
            gz: 0.0,
            timestamp: 0,
            role: SensorRole::Finger,
            quality: 1.0,
        }
    }

    #[test]
    fn test_zeroes_below_threshold() {
        let gate = NoiseGate::new(0.05);
        let out = gate.apply(sample(0.04, -0.2, 0.3, -1.2));
        assert_eq!(out.ax, 0.0);
        assert_eq!(out.ay, -0.2);
        // Gyro threshold is 0.5 deg/s
        assert_eq!(out.gx, 0.0);
        assert_eq!(out.gy, -1.2);
    }

    #[test]
    fn test_idempotent() {
        let gate = NoiseGate::new(0.05);
        let once = gate.apply(sample(0.03, 0.07, 0.4, 0.6));
        let twice = gate.apply(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_zero_threshold_passes_everything() {
        let gate = NoiseGate::new(0.0);
        let s = sample(0.001, -0.001, 0.01, -0.01);
        assert_eq!(gate.apply(s), s);
    }
}
