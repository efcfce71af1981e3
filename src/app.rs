//! Demo driver: replays recorded samples or a synthetic session through one
//! fusion pipeline.
//!
//! This module is the ingestion collaborator for the shipped binary. It
//! resolves sensor roles, pairs samples into cycles and nothing more; the
//! core never sees transport concerns.

use std::path::PathBuf;

use log::{info, warn};
use rand::Rng;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fusion::{FusionOrchestrator, SensorInput};
use crate::sample::{MotionSample, SensorRole};

/// Where samples come from
#[derive(Debug, Clone)]
pub enum DataSource {
    /// CSV file: `role,timestamp_ms,ax,ay,az,gx,gy,gz[,quality]`
    File(PathBuf),
    /// Generated dual-sensor session
    Synthetic {
        /// Number of cycles to generate
        cycles: usize,
    },
}

/// Demo application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sample source
    pub source: DataSource,
    /// Use the first N dual-sensor cycles as a calibration batch
    pub calibration_cycles: usize,
    /// Pipeline configuration
    pub pipeline: Config,
}

/// Counters reported after a run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub cycles: u64,
    pub compensated_samples: u64,
    pub patterns_emitted: u64,
}

/// Demo application owning the pipeline
pub struct MotionApp {
    orchestrator: FusionOrchestrator,
    source: DataSource,
    calibration_cycles: usize,
}

impl MotionApp {
    /// Create the application
    pub fn new(config: AppConfig) -> Result<Self> {
        Ok(Self {
            orchestrator: FusionOrchestrator::new(config.pipeline)?,
            source: config.source,
            calibration_cycles: config.calibration_cycles,
        })
    }

    /// Replay the configured source through the pipeline
    pub fn run(&mut self) -> Result<RunSummary> {
        let cycles = match &self.source {
            DataSource::File(path) => {
                info!("Replaying samples from {}", path.display());
                pair_cycles(load_csv(path)?)
            }
            DataSource::Synthetic { cycles } => {
                info!("Generating synthetic session of {cycles} cycles");
                synthetic_session(*cycles)
            }
        };

        let mut iter = cycles.into_iter();

        if self.calibration_cycles > 0 {
            info!("Collecting {} calibration cycles", self.calibration_cycles);
            self.orchestrator.start_calibration();
            for input in iter.by_ref().take(self.calibration_cycles) {
                if let (Some(hand), Some(finger)) = (input.hand, input.finger) {
                    self.orchestrator.add_calibration_sample(hand, finger);
                }
            }
            match self.orchestrator.finish_calibration() {
                Ok(()) => info!("Calibration applied"),
                Err(e) => warn!("Calibration skipped: {e}. Continuing uncalibrated."),
            }
        }

        let mut summary = RunSummary::default();
        for input in iter {
            let output = self.orchestrator.process(input);
            summary.cycles += 1;
            if output.compensated.is_some() {
                summary.compensated_samples += 1;
            }
            for pattern in &output.patterns {
                summary.patterns_emitted += 1;
                info!(
                    "[{:>8} ms] {} (confidence {:.2})",
                    pattern.timestamp, pattern.name, pattern.confidence
                );
            }
        }

        let (hand_q, finger_q, compensated_q) = self.orchestrator.quaternions();
        info!(
            "Final orientations: hand ({:.3}, {:.3}, {:.3}, {:.3}), finger ({:.3}, {:.3}, {:.3}, {:.3}), compensated ({:.3}, {:.3}, {:.3}, {:.3})",
            hand_q.w, hand_q.x, hand_q.y, hand_q.z,
            finger_q.w, finger_q.x, finger_q.y, finger_q.z,
            compensated_q.w, compensated_q.x, compensated_q.y, compensated_q.z,
        );
        if let Some(metrics) = self.orchestrator.metrics() {
            info!(
                "Last metrics: hand {:.3} g, finger {:.3} g, compensated {:.3} g, independence {:.2}, type {:?}",
                metrics.hand_magnitude,
                metrics.finger_magnitude,
                metrics.compensated_magnitude,
                metrics.independent_motion_ratio,
                metrics.motion_type,
            );
        }
        let stats = self.orchestrator.stream_stats();
        info!(
            "Processed {} cycles at ~{:.0} Hz, {} patterns in history",
            stats.total_samples,
            stats.frequency_hz,
            self.orchestrator.pattern_history().count()
        );

        Ok(summary)
    }

    /// Access the owned pipeline
    #[must_use]
    pub fn orchestrator(&self) -> &FusionOrchestrator {
        &self.orchestrator
    }
}

/// Parse one CSV record
fn parse_line(line: &str, number: usize) -> Result<MotionSample> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 8 {
        return Err(Error::InvalidInput(format!(
            "line {number}: expected at least 8 fields, found {}",
            fields.len()
        )));
    }

    let role = match fields[0].to_lowercase().as_str() {
        "hand" => SensorRole::Hand,
        "finger" => SensorRole::Finger,
        other => {
            return Err(Error::InvalidInput(format!("line {number}: unknown sensor role '{other}'")));
        }
    };
    let parse = |index: usize| -> Result<f64> {
        fields[index]
            .parse::<f64>()
            .map_err(|_| Error::InvalidInput(format!("line {number}: bad number '{}'", fields[index])))
    };

    let timestamp = fields[1]
        .parse::<u64>()
        .map_err(|_| Error::InvalidInput(format!("line {number}: bad timestamp '{}'", fields[1])))?;
    let quality = if fields.len() > 8 { parse(8)? } else { 1.0 };

    Ok(MotionSample {
        ax: parse(2)?,
        ay: parse(3)?,
        az: parse(4)?,
        gx: parse(5)?,
        gy: parse(6)?,
        gz: parse(7)?,
        timestamp,
        role,
        quality,
    })
}

fn load_csv(path: &PathBuf) -> Result<Vec<MotionSample>> {
    let content = std::fs::read_to_string(path)?;
    let mut samples = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        samples.push(parse_line(line, index + 1)?);
    }
    info!("Loaded {} samples", samples.len());
    Ok(samples)
}

/// Group samples into cycles, pairing adjacent hand/finger records that
/// share a timestamp
fn pair_cycles(samples: Vec<MotionSample>) -> Vec<SensorInput> {
    let mut cycles = Vec::with_capacity(samples.len());
    let mut index = 0;
    while index < samples.len() {
        let sample = samples[index];
        match samples.get(index + 1).copied() {
            Some(next) if next.timestamp == sample.timestamp && next.role != sample.role => {
                let (hand, finger) = match sample.role {
                    SensorRole::Hand => (sample, next),
                    SensorRole::Finger => (next, sample),
                };
                cycles.push(SensorInput::pair(hand, finger));
                index += 2;
            }
            _ => {
                cycles.push(SensorInput::single(sample));
                index += 1;
            }
        }
    }
    cycles
}

/// Generate a dual-sensor session: rest, a hand wave, finger taps and a
/// wrist rotation, with sensor noise throughout
fn synthetic_session(cycles: usize) -> Vec<SensorInput> {
    let mut rng = rand::thread_rng();
    let mut inputs = Vec::with_capacity(cycles);
    let step_ms = 20u64;

    for i in 0..cycles {
        let timestamp = i as u64 * step_ms;
        let t = timestamp as f64 / 1000.0;
        let phase = (i % 200) as f64 / 200.0;

        let mut noise = || rng.gen_range(-0.02..0.02);

        // Session phases rotate every 200 cycles
        let (hand_accel, hand_gyro, finger_accel) = match (i / 200) % 4 {
            // Rest
            0 => ((0.0, 0.0, 1.0), (0.0, 0.0, 0.0), (0.0, 0.0, 1.0)),
            // Hand wave: both sensors ride the same motion
            1 => {
                let wave = 4.0 * (2.0 * std::f64::consts::PI * 1.5 * t).sin();
                ((wave, 0.0, 1.0), (0.0, 10.0 * wave, 0.0), (wave, 0.0, 1.0))
            }
            // Finger taps on a still hand: short spikes
            2 => {
                let tap = if phase < 0.05 { 4.0 } else { 0.0 };
                ((0.0, 0.0, 1.0), (0.0, 0.0, 0.0), (tap, 0.0, 1.0))
            }
            // Wrist rotation: gyro-dominant
            _ => ((0.1, 0.0, 1.0), (120.0, 40.0, 0.0), (0.1, 0.0, 1.0)),
        };

        let hand = MotionSample {
            ax: hand_accel.0 + noise(),
            ay: hand_accel.1 + noise(),
            az: hand_accel.2 + noise(),
            gx: hand_gyro.0 + noise() * 10.0,
            gy: hand_gyro.1 + noise() * 10.0,
            gz: hand_gyro.2 + noise() * 10.0,
            timestamp,
            role: SensorRole::Hand,
            quality: 1.0,
        };
        let finger = MotionSample {
            ax: finger_accel.0 + noise(),
            ay: finger_accel.1 + noise(),
            az: finger_accel.2 + noise(),
            gx: hand_gyro.0 + noise() * 10.0,
            gy: hand_gyro.1 + noise() * 10.0,
            gz: hand_gyro.2 + noise() * 10.0,
            timestamp,
            role: SensorRole::Finger,
            quality: 1.0,
        };
        inputs.push(SensorInput::pair(hand, finger));
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let sample = parse_line("hand,1200,0.1,0.2,0.3,1.0,2.0,3.0", 1).unwrap();
        assert_eq!(sample.role, SensorRole::Hand);
        assert_eq!(sample.timestamp, 1200);
        assert_eq!(sample.az, 0.3);
        assert_eq!(sample.quality, 1.0);

        let sample = parse_line("finger,1200,0,0,1,0,0,0,0.5", 2).unwrap();
        assert_eq!(sample.role, SensorRole::Finger);
        assert_eq!(sample.quality, 0.5);
    }

    #[test]
    fn test_parse_line_rejects_garbage() {
        assert!(parse_line("wrist,0,0,0,0,0,0,0", 1).is_err());
        assert!(parse_line("hand,0,0,0", 1).is_err());
        assert!(parse_line("hand,0,abc,0,0,0,0,0", 1).is_err());
    }

    #[test]
    fn test_pair_cycles_matches_timestamps() {
        let hand = parse_line("hand,100,0,0,1,0,0,0", 1).unwrap();
        let finger = parse_line("finger,100,0,0,1,0,0,0", 2).unwrap();
        let lone = parse_line("hand,120,0,0,1,0,0,0", 3).unwrap();

        let cycles = pair_cycles(vec![hand, finger, lone]);
        assert_eq!(cycles.len(), 2);
        assert!(cycles[0].hand.is_some() && cycles[0].finger.is_some());
        assert!(cycles[1].hand.is_some() && cycles[1].finger.is_none());
    }

    #[test]
    fn test_synthetic_session_is_paired() {
        let cycles = synthetic_session(50);
        assert_eq!(cycles.len(), 50);
        assert!(cycles.iter().all(|c| c.hand.is_some() && c.finger.is_some()));
    }
}
