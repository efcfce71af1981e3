//! Moving-average smoothing over a bounded sample buffer.

use std::collections::VecDeque;

use crate::constants::SMOOTHING_MIN_SAMPLES;
use crate::sample::MotionSample;

/// Moving-average filter over the six inertial axes.
///
/// The buffer may be shorter than the window at start-up; the mean is taken
/// over whatever is present. With fewer than two buffered samples the raw
/// value is returned unchanged.
pub struct SmoothingFilter {
    window: usize,
    buffer: VecDeque<MotionSample>,
}

impl SmoothingFilter {
    /// Create a filter with the given window size
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero
    #[must_use]
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "Smoothing window must be greater than 0");
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
        }
    }

    /// Append the sample and return the buffer mean.
    ///
    /// Timestamp, role and quality are carried from the incoming sample;
    /// only the six axes are averaged.
    pub fn apply(&mut self, sample: MotionSample) -> MotionSample {
        if self.buffer.len() >= self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(sample);

        if self.buffer.len() < SMOOTHING_MIN_SAMPLES {
            return sample;
        }

        let n = self.buffer.len() as f64;
        let mut sum = [0.0f64; 6];
        for s in &self.buffer {
            sum[0] += s.ax;
            sum[1] += s.ay;
            sum[2] += s.az;
            sum[3] += s.gx;
            sum[4] += s.gy;
            sum[5] += s.gz;
        }

        MotionSample {
            ax: sum[0] / n,
            ay: sum[1] / n,
            az: sum[2] / n,
            gx: sum[3] / n,
            gy: sum[4] / n,
            gz: sum[5] / n,
            ..sample
        }
    }

    /// Resize the window, discarding the oldest samples if it shrinks
    pub fn set_window(&mut self, window: usize) {
        assert!(window > 0, "Smoothing window must be greater than 0");
        self.window = window;
        while self.buffer.len() > window {
            self.buffer.pop_front();
        }
    }

    /// Clear the buffer
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of buffered samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
