//! Shared sample types for the dual-sensor pipeline.
//!
//! Samples arrive already role-tagged and device-frame-correct; axis
//! remapping and wire parsing happen in the ingestion collaborator, never
//! here.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Which physical sensor produced a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorRole {
    /// Sensor mounted on the back of the hand
    Hand,
    /// Sensor mounted on a single finger
    Finger,
}

/// One timestamped 6-axis inertial sample.
///
/// Acceleration is in g, angular rate in deg/s, timestamp in monotonic
/// milliseconds. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
    pub timestamp: u64,
    pub role: SensorRole,
    /// Link quality reported by the sensor, in [0, 1]
    pub quality: f64,
}

impl MotionSample {
    /// Accelerometer reading as a vector (g)
    #[must_use]
    pub fn accel(&self) -> Vector3<f64> {
        Vector3::new(self.ax, self.ay, self.az)
    }

    /// Gyroscope reading as a vector (deg/s)
    #[must_use]
    pub fn gyro(&self) -> Vector3<f64> {
        Vector3::new(self.gx, self.gy, self.gz)
    }

    /// Euclidean norm of the accelerometer reading
    #[must_use]
    pub fn accel_magnitude(&self) -> f64 {
        self.accel().norm()
    }

    /// Euclidean norm of the gyroscope reading
    #[must_use]
    pub fn gyro_magnitude(&self) -> f64 {
        self.gyro().norm()
    }
}

/// A finger sample with the hand's motion subtracted.
///
/// Produced from exactly one finger sample and one hand sample of the same
/// processing cycle; carries the finger sample's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompensatedSample {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
    pub timestamp: u64,
}

impl CompensatedSample {
    /// Compensated acceleration as a vector (g)
    #[must_use]
    pub fn accel(&self) -> Vector3<f64> {
        Vector3::new(self.ax, self.ay, self.az)
    }

    /// Compensated angular rate as a vector (deg/s)
    #[must_use]
    pub fn gyro(&self) -> Vector3<f64> {
        Vector3::new(self.gx, self.gy, self.gz)
    }

    /// Euclidean norm of the compensated acceleration
    #[must_use]
    pub fn accel_magnitude(&self) -> f64 {
        self.accel().norm()
    }

    /// Euclidean norm of the compensated angular rate
    #[must_use]
    pub fn gyro_magnitude(&self) -> f64 {
        self.gyro().norm()
    }
}

/// Common view over raw and compensated samples used by the window analysis
pub trait InertialFrame {
    /// Acceleration vector (g)
    fn accel(&self) -> Vector3<f64>;
    /// Angular rate vector (deg/s)
    fn gyro(&self) -> Vector3<f64>;
    /// Monotonic timestamp (ms)
    fn timestamp(&self) -> u64;

    /// Euclidean norm of the acceleration
    fn accel_magnitude(&self) -> f64 {
        self.accel().norm()
    }

    /// Euclidean norm of the angular rate
    fn gyro_magnitude(&self) -> f64 {
        self.gyro().norm()
    }
}

impl InertialFrame for MotionSample {
    fn accel(&self) -> Vector3<f64> {
        MotionSample::accel(self)
    }

    fn gyro(&self) -> Vector3<f64> {
        MotionSample::gyro(self)
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl InertialFrame for CompensatedSample {
    fn accel(&self) -> Vector3<f64> {
        CompensatedSample::accel(self)
    }

    fn gyro(&self) -> Vector3<f64> {
        CompensatedSample::gyro(self)
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
