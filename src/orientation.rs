//! Orientation estimation via gradient-descent sensor fusion.
//!
//! Each sensor stream (hand, raw finger, compensated finger) owns one
//! [`OrientationFilter`] instance. The filter fuses gyroscope rates with the
//! accelerometer's gravity reference to track a unit quaternion.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BETA, DEFAULT_SAMPLE_INTERVAL, MAX_DELTA_T, MIN_DELTA_T};

/// Unit quaternion orientation `(w, x, y, z)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// The identity orientation
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Euclidean norm of the four components
    #[must_use]
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Gradient-descent orientation filter (Madgwick-style AHRS).
///
/// The update never panics: a zero-norm accelerometer vector skips the step
/// entirely (no gravity reference to correct against), and a zero-norm
/// gradient skips its normalization.
pub struct OrientationFilter {
    q: Quaternion,
    beta: f64,
    last_update: Option<u64>,
}

impl OrientationFilter {
    /// Create a filter with the given gradient gain
    #[must_use]
    pub fn new(beta: f64) -> Self {
        Self {
            q: Quaternion::identity(),
            beta,
            last_update: None,
        }
    }

    /// Current orientation estimate
    #[must_use]
    pub fn quaternion(&self) -> Quaternion {
        self.q
    }

    /// Gradient gain fixed at construction
    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Restore the identity orientation and clear timing state
    pub fn reset(&mut self) {
        self.q = Quaternion::identity();
        self.last_update = None;
    }

    /// Advance the orientation estimate by one sample.
    ///
    /// `timestamp_ms` is the sample's monotonic timestamp; the integration
    /// step is the delta to the previous update, clamped to [1 ms, 100 ms].
    /// Gyroscope rates are in rad/s, acceleration in g.
    #[allow(clippy::too_many_arguments)]
    pub fn update(&mut self, timestamp_ms: u64, gx: f64, gy: f64, gz: f64, ax: f64, ay: f64, az: f64) {
        let dt = match self.last_update {
            Some(last) => {
                let raw = (timestamp_ms.saturating_sub(last)) as f64 / 1000.0;
                raw.clamp(MIN_DELTA_T, MAX_DELTA_T)
            }
            None => DEFAULT_SAMPLE_INTERVAL,
        };
        self.last_update = Some(timestamp_ms);

        // Without a gravity reference the correction is undefined; keep the
        // previous estimate untouched.
        let norm = (ax * ax + ay * ay + az * az).sqrt();
        if norm == 0.0 {
            return;
        }
        let ax = ax / norm;
        let ay = ay / norm;
        let az = az / norm;

        let Quaternion {
            w: q0,
            x: q1,
            y: q2,
            z: q3,
        } = self.q;

        // Objective function: predicted gravity direction vs measurement
        let f1 = 2.0 * (q1 * q3 - q0 * q2) - ax;
        let f2 = 2.0 * (q0 * q1 + q2 * q3) - ay;
        let f3 = 2.0 * (0.5 - q1 * q1 - q2 * q2) - az;

        // Jacobian of the objective function
        let j11 = -2.0 * q2;
        let j12 = 2.0 * q3;
        let j13 = -2.0 * q0;
        let j14 = 2.0 * q1;
        let j21 = 2.0 * q1;
        let j22 = 2.0 * q0;
        let j23 = 2.0 * q3;
        let j24 = 2.0 * q2;
        let j32 = -4.0 * q1;
        let j33 = -4.0 * q2;

        // Gradient J^T f
        let mut step0 = j11 * f1 + j21 * f2;
        let mut step1 = j12 * f1 + j22 * f2 + j32 * f3;
        let mut step2 = j13 * f1 + j23 * f2 + j33 * f3;
        let mut step3 = j14 * f1 + j24 * f2;

        let step_norm = (step0 * step0 + step1 * step1 + step2 * step2 + step3 * step3).sqrt();
        if step_norm != 0.0 {
            step0 /= step_norm;
            step1 /= step_norm;
            step2 /= step_norm;
            step3 /= step_norm;
        }

        // Quaternion kinematics from the gyroscope, with gradient feedback
        let q_dot0 = 0.5 * (-q1 * gx - q2 * gy - q3 * gz) - self.beta * step0;
        let q_dot1 = 0.5 * (q0 * gx + q2 * gz - q3 * gy) - self.beta * step1;
        let q_dot2 = 0.5 * (q0 * gy - q1 * gz + q3 * gx) - self.beta * step2;
        let q_dot3 = 0.5 * (q0 * gz + q1 * gy - q2 * gx) - self.beta * step3;

        let q0 = q0 + q_dot0 * dt;
        let q1 = q1 + q_dot1 * dt;
        let q2 = q2 + q_dot2 * dt;
        let q3 = q3 + q_dot3 * dt;

        let q_norm = (q0 * q0 + q1 * q1 + q2 * q2 + q3 * q3).sqrt();
        if q_norm > 0.0 {
            self.q = Quaternion {
                w: q0 / q_norm,
                x: q1 / q_norm,
                y: q2 / q_norm,
                z: q3 / q_norm,
            };
        }
    }
}

impl Default for OrientationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BETA)
    }
}
