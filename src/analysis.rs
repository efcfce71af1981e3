//! Windowed statistical analysis of motion streams.
//!
//! All operations work over the most recent window contents and degrade
//! gracefully: anything shorter than [`ANALYSIS_MIN_SAMPLES`] yields `None`
//! or a documented neutral value instead of an error.

use std::collections::VecDeque;
use std::f64::consts::PI;

use crate::constants::{ANALYSIS_MIN_SAMPLES, EPSILON, MAX_SPECTRUM_PERIOD};
use crate::sample::InertialFrame;

/// Bounded FIFO of the most recent samples of one stream.
///
/// Append-only with eviction of the oldest element when full.
pub struct SampleWindow<S> {
    capacity: usize,
    samples: VecDeque<S>,
}

impl<S: Copy> SampleWindow<S> {
    /// Create a window holding at most `capacity` samples
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Window capacity must be greater than 0");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, sample: S) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Current contents, oldest first
    #[must_use]
    pub fn as_vec(&self) -> Vec<S> {
        self.samples.iter().copied().collect()
    }

    /// The most recent `n` samples, oldest first
    #[must_use]
    pub fn tail(&self, n: usize) -> Vec<S> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    /// Number of buffered samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Discard all contents
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Summary statistics of a scalar signal
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalStats {
    pub mean: f64,
    pub variance: f64,
    pub max: f64,
    pub min: f64,
    pub range: f64,
}

/// Statistics over a window's acceleration magnitudes
#[derive(Debug, Clone, Copy)]
pub struct MagnitudeStats {
    pub mean: f64,
    pub peak: f64,
    pub variance: f64,
    /// Times the XY heading of consecutive accel vectors jumped by > 45°
    pub direction_changes: usize,
}

/// Mean/variance/extrema of a scalar sequence; all zero when empty
#[must_use]
pub fn signal_stats(values: &[f64]) -> SignalStats {
    if values.is_empty() {
        return SignalStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    SignalStats {
        mean,
        variance,
        max,
        min,
        range: max - min,
    }
}

/// Acceleration magnitudes of a sample slice
#[must_use]
pub fn accel_magnitudes<S: InertialFrame>(samples: &[S]) -> Vec<f64> {
    samples.iter().map(InertialFrame::accel_magnitude).collect()
}

/// Gyroscope magnitudes of a sample slice
#[must_use]
pub fn gyro_magnitudes<S: InertialFrame>(samples: &[S]) -> Vec<f64> {
    samples.iter().map(InertialFrame::gyro_magnitude).collect()
}

/// Mean, peak, variance and direction-change count of a window's
/// acceleration; `None` below [`ANALYSIS_MIN_SAMPLES`] samples.
#[must_use]
pub fn magnitude_stats<S: InertialFrame>(samples: &[S]) -> Option<MagnitudeStats> {
    if samples.len() < ANALYSIS_MIN_SAMPLES {
        return None;
    }
    let magnitudes = accel_magnitudes(samples);
    let stats = signal_stats(&magnitudes);

    let mut direction_changes = 0;
    for i in 2..samples.len() {
        let prev = samples[i - 1].accel();
        let curr = samples[i].accel();
        let prev_dir = prev.y.atan2(prev.x);
        let curr_dir = curr.y.atan2(curr.x);
        if (curr_dir - prev_dir).abs() > PI / 4.0 {
            direction_changes += 1;
        }
    }

    Some(MagnitudeStats {
        mean: stats.mean,
        peak: stats.max,
        variance: stats.variance,
        direction_changes,
    })
}

/// Pearson correlation of two streams' acceleration magnitudes.
///
/// Returns 0.0 for mismatched lengths, short windows, or zero-variance
/// inputs; degenerate cases are neutral, not errors.
#[must_use]
pub fn correlation<A: InertialFrame, B: InertialFrame>(hand: &[A], finger: &[B]) -> f64 {
    if hand.len() != finger.len() || hand.len() < ANALYSIS_MIN_SAMPLES {
        return 0.0;
    }

    let hand_mags = accel_magnitudes(hand);
    let finger_mags = accel_magnitudes(finger);
    let hand_mean = hand_mags.iter().sum::<f64>() / hand_mags.len() as f64;
    let finger_mean = finger_mags.iter().sum::<f64>() / finger_mags.len() as f64;

    let mut numerator = 0.0;
    let mut hand_sum_sq = 0.0;
    let mut finger_sum_sq = 0.0;
    for i in 0..hand_mags.len() {
        let hand_diff = hand_mags[i] - hand_mean;
        let finger_diff = finger_mags[i] - finger_mean;
        numerator += hand_diff * finger_diff;
        hand_sum_sq += hand_diff * hand_diff;
        finger_sum_sq += finger_diff * finger_diff;
    }

    let denominator = (hand_sum_sq * finger_sum_sq).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Coarse periodicity spectrum via mean lag-autocorrelation.
///
/// For each candidate period from 2 up to `min(N/2, 20)`, the mean of
/// `mag[i] * mag[i + period]` over the window. A lightweight proxy for
/// spectral content, deliberately not an FFT; the pattern templates are
/// tuned against this range. Empty below [`ANALYSIS_MIN_SAMPLES`] samples.
#[must_use]
pub fn coarse_frequency_spectrum<S: InertialFrame>(samples: &[S]) -> Vec<f64> {
    if samples.len() < ANALYSIS_MIN_SAMPLES {
        return Vec::new();
    }
    let magnitudes = accel_magnitudes(samples);
    let n = magnitudes.len();
    let max_period = (n / 2).min(MAX_SPECTRUM_PERIOD);

    let mut spectrum = Vec::with_capacity(max_period.saturating_sub(1));
    for period in 2..=max_period {
        let count = n - period;
        let mut acc = 0.0;
        for i in 0..count {
            acc += magnitudes[i] * magnitudes[i + period];
        }
        if count > 0 {
            spectrum.push(acc / count as f64);
        }
    }
    spectrum
}

/// Ratio of total path length to straight-line displacement in compensated
/// accel space.
///
/// A fully looping or stationary path (zero displacement) yields 0.0 rather
/// than infinity. 0.0 below [`ANALYSIS_MIN_SAMPLES`] samples.
#[must_use]
pub fn spatial_complexity<S: InertialFrame>(samples: &[S]) -> f64 {
    if samples.len() < ANALYSIS_MIN_SAMPLES {
        return 0.0;
    }

    let mut total_distance = 0.0;
    for pair in samples.windows(2) {
        total_distance += (pair[1].accel() - pair[0].accel()).norm();
    }

    let direct_distance = (samples[samples.len() - 1].accel() - samples[0].accel()).norm();
    if direct_distance == 0.0 {
        0.0
    } else {
        total_distance / direct_distance
    }
}

/// Steadiness of compensated motion: `max(0, 1 − var/(mean + ε))`.
///
/// Higher is steadier; 0.0 below [`ANALYSIS_MIN_SAMPLES`] samples.
#[must_use]
pub fn temporal_consistency<S: InertialFrame>(samples: &[S]) -> f64 {
    if samples.len() < ANALYSIS_MIN_SAMPLES {
        return 0.0;
    }
    let stats = signal_stats(&accel_magnitudes(samples));
    (1.0 - stats.variance / (stats.mean + EPSILON)).max(0.0)
}

/// Span of a window in milliseconds, first to last sample
#[must_use]
pub fn window_duration_ms<S: InertialFrame>(samples: &[S]) -> u64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => last.timestamp().saturating_sub(first.timestamp()),
        _ => 0,
    }
}
