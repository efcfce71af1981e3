//! Dual-sensor inertial fusion for hand/finger motion tracking.
//!
//! This library ingests streaming 6-axis samples from two co-located motion
//! sensors (one on the back of the hand, one on a finger) and derives:
//! - each stream's 3D orientation as a unit quaternion, via a
//!   gradient-descent fusion filter,
//! - the finger's motion with the hand's gross movement subtracted
//!   (adaptive compensation),
//! - named gesture/pattern classifications with confidence scores.
//!
//! Transport, rendering and persistence live outside this crate: the core
//! consumes plain timestamped [`sample::MotionSample`] records and emits
//! plain orientation/pattern records.
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use dual_motion_fusion::config::Config;
//! use dual_motion_fusion::fusion::{FusionOrchestrator, SensorInput};
//! use dual_motion_fusion::sample::{MotionSample, SensorRole};
//!
//! # fn main() -> dual_motion_fusion::Result<()> {
//! let mut pipeline = FusionOrchestrator::new(Config::default())?;
//!
//! let hand = MotionSample {
//!     ax: 0.1, ay: 0.0, az: 1.0,
//!     gx: 2.0, gy: 0.0, gz: 0.0,
//!     timestamp: 20, role: SensorRole::Hand, quality: 1.0,
//! };
//! let finger = MotionSample {
//!     ax: 0.4, ay: 0.1, az: 1.0,
//!     gx: 5.0, gy: 0.0, gz: 0.0,
//!     timestamp: 20, role: SensorRole::Finger, quality: 1.0,
//! };
//!
//! let output = pipeline.process(SensorInput::pair(hand, finger));
//! let q = output.hand_quaternion.expect("hand stream advanced");
//! assert!((q.norm() - 1.0).abs() < 1e-6);
//! assert!(output.compensated.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Calibration
//!
//! ```
//! use dual_motion_fusion::config::Config;
//! use dual_motion_fusion::fusion::FusionOrchestrator;
//! use dual_motion_fusion::sample::{MotionSample, SensorRole};
//!
//! # fn main() -> dual_motion_fusion::Result<()> {
//! let mut pipeline = FusionOrchestrator::new(Config::default())?;
//!
//! let rest = |role, t| MotionSample {
//!     ax: 0.02, ay: -0.01, az: 1.0,
//!     gx: 0.3, gy: 0.1, gz: -0.2,
//!     timestamp: t, role, quality: 1.0,
//! };
//!
//! pipeline.start_calibration();
//! for t in 0..10u64 {
//!     pipeline.add_calibration_sample(
//!         rest(SensorRole::Hand, t * 20),
//!         rest(SensorRole::Finger, t * 20),
//!     );
//! }
//! pipeline.finish_calibration()?;
//! assert!(pipeline.is_calibrated());
//! # Ok(())
//! # }
//! ```

/// Shared sample types for the dual-sensor pipeline
pub mod sample;

/// Orientation estimation via gradient-descent sensor fusion
pub mod orientation;

/// Per-sensor calibration, smoothing and noise gating
pub mod conditioning;

/// Hand-motion compensation for the finger stream
pub mod compensation;

/// Windowed statistical analysis of motion streams
pub mod analysis;

/// Pattern and gesture classification
pub mod classifier;

/// Top-level pipeline orchestration
pub mod fusion;

/// Demo application (CSV replay and synthetic sessions)
pub mod app;

/// Constants used throughout the pipeline
pub mod constants;

/// Configuration management
pub mod config;

/// Error types and result handling
pub mod error;

pub use error::{Error, Result};
