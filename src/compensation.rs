//! Hand-motion compensation for the finger stream.

use crate::constants::{ADAPTIVE_FACTOR_MAX, ADAPTIVE_FACTOR_MIN, HAND_MAGNITUDE_SCALE};
use crate::sample::{CompensatedSample, MotionSample};

/// Subtracts an adaptively-scaled hand sample from a conditioned finger
/// sample, isolating the finger's independent motion.
///
/// A static subtraction over-corrects during vigorous hand motion and
/// under-corrects during stillness; the adaptive factor keeps the hand's
/// contribution bounded to [0.5, 1.0]× its raw value. `compensate` holds no
/// state and is deterministic for identical inputs.
pub struct MotionCompensator {
    base_factor: f64,
}

impl MotionCompensator {
    /// Create a compensator with the given base strength
    ///
    /// # Panics
    ///
    /// Panics if `base_factor` is not positive
    #[must_use]
    pub fn new(base_factor: f64) -> Self {
        assert!(base_factor > 0.0, "Compensation factor must be positive");
        Self { base_factor }
    }

    /// Compensation strength scaled by hand activity, clamped to [0.5, 1.0]
    #[must_use]
    pub fn adaptive_factor(&self, hand: &MotionSample) -> f64 {
        let hand_magnitude = hand.accel_magnitude();
        (self.base_factor * (1.0 + hand_magnitude / HAND_MAGNITUDE_SCALE))
            .clamp(ADAPTIVE_FACTOR_MIN, ADAPTIVE_FACTOR_MAX)
    }

    /// Subtract the scaled hand sample from the finger sample, per axis
    #[must_use]
    pub fn compensate(&self, finger: &MotionSample, hand: &MotionSample) -> CompensatedSample {
        let factor = self.adaptive_factor(hand);
        CompensatedSample {
            ax: finger.ax - hand.ax * factor,
            ay: finger.ay - hand.ay * factor,
            az: finger.az - hand.az * factor,
            gx: finger.gx - hand.gx * factor,
            gy: finger.gy - hand.gy * factor,
            gz: finger.gz - hand.gz * factor,
            timestamp: finger.timestamp,
        }
    }

    /// Change the base compensation strength
    pub fn set_base_factor(&mut self, base_factor: f64) {
        assert!(base_factor > 0.0, "Compensation factor must be positive");
        self.base_factor = base_factor;
    }

    /// Current base compensation strength
    #[must_use]
    pub fn base_factor(&self) -> f64 {
        self.base_factor
    }
}
