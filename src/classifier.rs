//! Pattern and gesture classification over analysis windows.
//!
//! Two strategies coexist. The threshold dominant-actor classifier compares
//! recent mean activity of the two sensors and fires on raw magnitude. The
//! template classifier scores four named gestures (tap, swipe, pinch,
//! rotation) against the current window, and a combined-energy mode maps
//! hand/finger energy into coarse motion labels. Emitted pattern names keep
//! the Spanish display strings the rest of the system keys on.

use std::collections::VecDeque;

use log::debug;
use serde::Serialize;

use crate::analysis::{
    accel_magnitudes, coarse_frequency_spectrum, gyro_magnitudes, magnitude_stats, signal_stats, spatial_complexity,
    temporal_consistency,
};
use crate::config::ClassifierConfig;
use crate::constants::{
    ACTIVITY_CONFIDENCE_SCALE, ANALYSIS_MIN_SAMPLES, COMBINED_MIN_SAMPLES, CONFIDENCE_MAX, CONFIDENCE_MIN, EPSILON,
    FINGER_ANALYSIS_WEIGHT, HAND_ANALYSIS_WEIGHT,
};
use crate::sample::{CompensatedSample, MotionSample};

/// Category of a detected pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Tap,
    Swipe,
    Pinch,
    Rotation,
    HandDominant,
    FingerDominant,
    Coordinated,
    Soft,
    Rest,
}

/// Feature summary attached to a detected pattern
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternCharacteristics {
    /// Hand mean magnitude relative to raw finger magnitude
    pub hand_dominance: f64,
    /// Compensated magnitude relative to raw finger magnitude
    pub finger_independence: f64,
    pub spatial_complexity: f64,
    pub temporal_consistency: f64,
    pub peak_acceleration: f64,
    pub direction_changes: usize,
    /// Leading autocorrelation bins of the hand and compensated streams
    pub frequency_signature: Vec<f64>,
    /// Hand/finger energies combined at the 0.6/0.4 analysis weights
    pub weighted_energy: f64,
}

/// One classified motion pattern; immutable once created
#[derive(Debug, Clone, Serialize)]
pub struct DetectedPattern {
    pub id: String,
    pub name: String,
    pub kind: PatternKind,
    pub confidence: f64,
    pub timestamp: u64,
    pub duration_ms: u64,
    pub characteristics: PatternCharacteristics,
}

/// Borrowed view of the current analysis window handed to the gesture
/// templates
pub struct GestureWindow<'a> {
    pub hand: &'a [MotionSample],
    pub finger: &'a [MotionSample],
    pub compensated: &'a [CompensatedSample],
    pub duration_ms: u64,
}

struct GestureTemplate {
    name: &'static str,
    kind: PatternKind,
    score: fn(&GestureWindow<'_>) -> f64,
}

const GESTURE_TEMPLATES: [GestureTemplate; 4] = [
    GestureTemplate {
        name: "Finger Tap",
        kind: PatternKind::Tap,
        score: score_tap,
    },
    GestureTemplate {
        name: "Finger Swipe",
        kind: PatternKind::Swipe,
        score: score_swipe,
    },
    GestureTemplate {
        name: "Pinch Motion",
        kind: PatternKind::Pinch,
        score: score_pinch,
    },
    GestureTemplate {
        name: "Rotation Gesture",
        kind: PatternKind::Rotation,
        score: score_rotation,
    },
];

/// Tap: sharp peak against a quiet baseline, over quickly
fn score_tap(window: &GestureWindow<'_>) -> f64 {
    if window.compensated.len() < 5 {
        return 0.0;
    }
    let magnitudes = accel_magnitudes(window.compensated);
    let peak = magnitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = magnitudes.iter().sum::<f64>() / magnitudes.len() as f64;

    let peak_ratio = peak / (average + EPSILON);
    let duration = window.duration_ms as f64;
    let duration_score = if duration < 500.0 {
        1.0
    } else {
        (1.0 - (duration - 500.0) / 1000.0).max(0.0)
    };

    ((peak_ratio / 5.0 + duration_score) / 2.0).min(1.0)
}

/// Swipe: consecutive deltas pointing the same way
fn score_swipe(window: &GestureWindow<'_>) -> f64 {
    if window.compensated.len() < 10 {
        return 0.0;
    }
    let mut direction_sum = nalgebra::Vector3::zeros();
    for pair in window.compensated.windows(2) {
        direction_sum += pair[1].accel() - pair[0].accel();
    }
    let steps = (window.compensated.len() - 1) as f64;
    let consistency = direction_sum.norm() / steps;

    let duration = window.duration_ms as f64;
    let duration_score = if duration > 200.0 && duration < 1000.0 { 1.0 } else { 0.5 };

    (consistency * duration_score).min(1.0)
}

/// Pinch: coordinated but bounded hand and finger magnitude, sustained
fn score_pinch(window: &GestureWindow<'_>) -> f64 {
    if window.hand.len() < 15 || window.compensated.len() < 15 {
        return 0.0;
    }
    let hand_mags = accel_magnitudes(window.hand);
    let comp_mags = accel_magnitudes(window.compensated);
    let hand_avg = hand_mags.iter().sum::<f64>() / hand_mags.len() as f64;
    let finger_avg = comp_mags.iter().sum::<f64>() / comp_mags.len() as f64;

    let coordination = (hand_avg / 2.0).min(finger_avg / 1.5);
    let duration = window.duration_ms as f64;
    let duration_score = if duration > 300.0 { (2000.0 / duration).min(1.0) } else { 0.0 };

    (coordination * duration_score).min(1.0)
}

/// Rotation: gyroscope dominates acceleration over a sustained window
fn score_rotation(window: &GestureWindow<'_>) -> f64 {
    if window.hand.len() < 20 {
        return 0.0;
    }
    let gyro_mags = gyro_magnitudes(window.hand);
    let accel_mags = accel_magnitudes(window.hand);
    let avg_gyro = gyro_mags.iter().sum::<f64>() / gyro_mags.len() as f64;
    let avg_accel = accel_mags.iter().sum::<f64>() / accel_mags.len() as f64;

    let rotation_ratio = avg_gyro / (avg_accel * 10.0 + 1.0);
    let duration = window.duration_ms as f64;
    let duration_score = if duration > 500.0 { (3000.0 / duration).min(1.0) } else { 0.0 };

    (rotation_ratio * duration_score).min(1.0)
}

/// Sub-classification of compensated finger motion used by the
/// finger-dominant branch of the combined analysis
#[must_use]
pub fn finger_movement_label(compensated: &[CompensatedSample]) -> &'static str {
    let n = compensated.len() as f64;
    if n == 0.0 {
        return "Dedo en Reposo Relativo";
    }
    let avg_accel = compensated.iter().map(CompensatedSample::accel_magnitude).sum::<f64>() / n;
    let avg_gyro = compensated.iter().map(CompensatedSample::gyro_magnitude).sum::<f64>() / n;

    if avg_accel > 2.0 {
        "Flexión/Extensión Activa"
    } else if avg_gyro > 30.0 {
        "Rotación del Dedo"
    } else if avg_accel > 0.5 {
        "Movimiento Sutil del Dedo"
    } else {
        "Dedo en Reposo Relativo"
    }
}

/// Accel variance plus gyro variance of a stream's magnitudes
fn window_energy(accel_mags: &[f64], gyro_mags: &[f64]) -> f64 {
    signal_stats(accel_mags).variance + signal_stats(gyro_mags).variance
}

/// Stateful classifier owning the bounded pattern history
pub struct PatternClassifier {
    activity_threshold: f64,
    gesture_threshold: f64,
    combined_emit_threshold: f64,
    history_capacity: usize,
    history: VecDeque<DetectedPattern>,
    current: Option<DetectedPattern>,
    seq: u64,
}

impl PatternClassifier {
    #[must_use]
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            activity_threshold: config.activity_threshold,
            gesture_threshold: config.gesture_confidence_threshold,
            combined_emit_threshold: config.combined_emit_threshold,
            history_capacity: config.history_capacity,
            history: VecDeque::with_capacity(config.history_capacity),
            current: None,
            seq: 0,
        }
    }

    /// Most recently classified result, overwritten each cycle
    #[must_use]
    pub fn current_pattern(&self) -> Option<&DetectedPattern> {
        self.current.as_ref()
    }

    /// Bounded pattern history, oldest first
    #[must_use]
    pub fn history(&self) -> &VecDeque<DetectedPattern> {
        &self.history
    }

    /// Drop history and the current pattern
    pub fn reset(&mut self) {
        self.history.clear();
        self.current = None;
    }

    /// Dominant-actor classification over the last ten samples per stream.
    ///
    /// Fires when either stream's mean accel magnitude exceeds the activity
    /// threshold; the larger magnitude names the pattern.
    pub fn classify_activity(
        &mut self,
        hand: &[MotionSample],
        finger: &[MotionSample],
    ) -> Option<DetectedPattern> {
        if hand.len() < ANALYSIS_MIN_SAMPLES || finger.len() < ANALYSIS_MIN_SAMPLES {
            return None;
        }
        let hand_recent = &hand[hand.len() - ANALYSIS_MIN_SAMPLES..];
        let finger_recent = &finger[finger.len() - ANALYSIS_MIN_SAMPLES..];

        let hand_avg =
            accel_magnitudes(hand_recent).iter().sum::<f64>() / ANALYSIS_MIN_SAMPLES as f64;
        let finger_avg =
            accel_magnitudes(finger_recent).iter().sum::<f64>() / ANALYSIS_MIN_SAMPLES as f64;

        if hand_avg <= self.activity_threshold && finger_avg <= self.activity_threshold {
            return None;
        }

        let (name, kind) = if hand_avg > finger_avg {
            ("Movimiento de Mano", PatternKind::HandDominant)
        } else {
            ("Movimiento de Dedo", PatternKind::FingerDominant)
        };
        let confidence = (hand_avg.max(finger_avg) / ACTIVITY_CONFIDENCE_SCALE).min(1.0);
        let timestamp = hand_recent
            .last()
            .map(|s| s.timestamp)
            .unwrap_or_default()
            .max(finger_recent.last().map(|s| s.timestamp).unwrap_or_default());

        let pattern = self.build_pattern(
            name.to_string(),
            kind,
            confidence,
            timestamp,
            1000,
            PatternCharacteristics {
                hand_dominance: hand_avg / (finger_avg + EPSILON),
                peak_acceleration: hand_avg.max(finger_avg),
                ..PatternCharacteristics::default()
            },
        );
        self.current = Some(pattern.clone());
        self.push_history(pattern.clone());
        Some(pattern)
    }

    /// Combined-energy classification of the hand and compensated-finger
    /// windows into coarse motion labels.
    ///
    /// The current pattern is always overwritten; only results above the
    /// emit threshold enter the history.
    pub fn classify_combined(
        &mut self,
        hand: &[MotionSample],
        compensated: &[CompensatedSample],
    ) -> Option<DetectedPattern> {
        let hand_energy = (hand.len() >= COMBINED_MIN_SAMPLES)
            .then(|| window_energy(&accel_magnitudes(hand), &gyro_magnitudes(hand)));
        let finger_energy = (compensated.len() >= COMBINED_MIN_SAMPLES)
            .then(|| window_energy(&accel_magnitudes(compensated), &gyro_magnitudes(compensated)));
        if hand_energy.is_none() && finger_energy.is_none() {
            return None;
        }

        let hand_weight = if hand_energy.is_some() { HAND_ANALYSIS_WEIGHT } else { 0.0 };
        let finger_weight = if finger_energy.is_some() { FINGER_ANALYSIS_WEIGHT } else { 0.0 };
        let hand_energy = hand_energy.unwrap_or(0.0);
        let finger_energy = finger_energy.unwrap_or(0.0);
        let total_energy = hand_energy + finger_energy;
        let weighted_energy = hand_weight * hand_energy + finger_weight * finger_energy;

        let (name, kind, confidence) = if finger_energy > 1.0 && hand_energy < finger_energy * 0.5 {
            (
                format!("Dedo: {}", finger_movement_label(compensated)),
                PatternKind::FingerDominant,
                (0.7 + finger_energy / 50.0).min(0.95),
            )
        } else if hand_energy > 20.0 {
            if finger_energy > 5.0 {
                (
                    "Mano + Dedo Coordinado".to_string(),
                    PatternKind::Coordinated,
                    (0.8 + total_energy / 100.0).min(0.95),
                )
            } else {
                (
                    "Movimiento de Mano".to_string(),
                    PatternKind::HandDominant,
                    (0.7 + hand_energy / 100.0).min(0.95),
                )
            }
        } else if total_energy > 5.0 {
            ("Movimiento Suave".to_string(), PatternKind::Soft, 0.6 + total_energy / 50.0)
        } else {
            ("Reposo".to_string(), PatternKind::Rest, 0.9)
        };
        let confidence = confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX);

        let timestamp = hand
            .last()
            .map(|s| s.timestamp)
            .unwrap_or_default()
            .max(compensated.last().map(|s| s.timestamp).unwrap_or_default());
        let pattern = self.build_pattern(
            name,
            kind,
            confidence,
            timestamp,
            1000,
            PatternCharacteristics {
                weighted_energy,
                ..PatternCharacteristics::default()
            },
        );

        debug!("Combined classification: {} ({:.2})", pattern.name, pattern.confidence);
        self.current = Some(pattern.clone());
        if pattern.confidence > self.combined_emit_threshold {
            self.push_history(pattern.clone());
        }
        Some(pattern)
    }

    /// Score every gesture template against the window; each template above
    /// the confidence threshold emits its own pattern.
    pub fn classify_gestures(&mut self, window: &GestureWindow<'_>) -> Vec<DetectedPattern> {
        let mut emitted = Vec::new();
        for template in &GESTURE_TEMPLATES {
            let score = (template.score)(window);
            if score <= self.gesture_threshold {
                continue;
            }

            let characteristics = gesture_characteristics(window);
            let timestamp = window
                .compensated
                .last()
                .map(|s| s.timestamp)
                .or_else(|| window.hand.last().map(|s| s.timestamp))
                .unwrap_or_default();
            let pattern = self.build_pattern(
                template.name.to_string(),
                template.kind,
                score,
                timestamp,
                window.duration_ms,
                characteristics,
            );

            debug!("Gesture template fired: {} ({:.2})", pattern.name, pattern.confidence);
            self.current = Some(pattern.clone());
            self.push_history(pattern.clone());
            emitted.push(pattern);
        }
        emitted
    }

    fn build_pattern(
        &mut self,
        name: String,
        kind: PatternKind,
        confidence: f64,
        timestamp: u64,
        duration_ms: u64,
        characteristics: PatternCharacteristics,
    ) -> DetectedPattern {
        self.seq += 1;
        DetectedPattern {
            id: format!("pattern_{timestamp}_{}", self.seq),
            name,
            kind,
            confidence,
            timestamp,
            duration_ms,
            characteristics,
        }
    }

    fn push_history(&mut self, pattern: DetectedPattern) {
        if self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(pattern);
    }
}

fn gesture_characteristics(window: &GestureWindow<'_>) -> PatternCharacteristics {
    let hand_stats = magnitude_stats(window.hand);
    let finger_stats = magnitude_stats(window.finger);
    let comp_stats = magnitude_stats(window.compensated);

    let hand_mean = hand_stats.map(|s| s.mean).unwrap_or_default();
    let finger_mean = finger_stats.map(|s| s.mean).unwrap_or_default();
    let comp_mean = comp_stats.map(|s| s.mean).unwrap_or_default();

    let mut frequency_signature: Vec<f64> =
        coarse_frequency_spectrum(window.hand).into_iter().take(5).collect();
    frequency_signature.extend(coarse_frequency_spectrum(window.compensated).into_iter().take(5));

    let consistency = temporal_consistency(window.compensated);
    PatternCharacteristics {
        hand_dominance: hand_mean / (finger_mean + EPSILON),
        finger_independence: comp_mean / (finger_mean + EPSILON),
        spatial_complexity: spatial_complexity(window.compensated),
        temporal_consistency: consistency,
        peak_acceleration: hand_stats
            .map(|s| s.peak)
            .unwrap_or_default()
            .max(comp_stats.map(|s| s.peak).unwrap_or_default()),
        direction_changes: comp_stats.map(|s| s.direction_changes).unwrap_or_default(),
        frequency_signature,
        weighted_energy: 0.0,
    }
}
