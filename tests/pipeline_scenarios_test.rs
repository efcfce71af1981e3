//! End-to-end scenarios through the full fusion pipeline


use dual_motion_fusion::classifier::PatternKind;
use dual_motion_fusion::config::Config;
use dual_motion_fusion::fusion::{DominantAxis, FusionOrchestrator, MotionType, SensorInput};
use dual_motion_fusion::sample::SensorRole;
use test_helpers::{motion_sample, rest_pair};

fn pipeline() -> FusionOrchestrator {
    FusionOrchestrator::new(Config::default()).unwrap()
}

/// Twenty near-zero cycles classify as rest with high confidence
#[test]
fn test_rest_detection() {
    let mut pipeline = pipeline();
    let mut detected = Vec::new();

    for i in 0..20u64 {
        let output = pipeline.process(rest_pair(i * 20));
        detected.extend(output.patterns);
    }

    let rest = detected
        .iter()
        .find(|p| p.name == "Reposo")
        .expect("rest pattern should be emitted");
    assert!(rest.confidence >= 0.85, "confidence {}", rest.confidence);
    assert_eq!(rest.kind, PatternKind::Rest);

    // Rest is also the standing current pattern at the end of the run
    assert_eq!(pipeline.current_pattern().unwrap().name, "Reposo");
}

/// A sustained 8 g hand burst with a quiet finger is hand-dominant
#[test]
fn test_hand_dominant_burst() {
    let mut pipeline = pipeline();
    let mut detected = Vec::new();

    for i in 0..10u64 {
        let hand = motion_sample(SensorRole::Hand, i * 20, (8.0, 0.0, 0.0), (0.0, 0.0, 0.0));
        let finger = motion_sample(SensorRole::Finger, i * 20, (0.01, 0.0, 0.0), (0.0, 0.0, 0.0));
        let output = pipeline.process(SensorInput::pair(hand, finger));
        detected.extend(output.patterns);
    }

    let pattern = detected
        .iter()
        .find(|p| p.name == "Movimiento de Mano")
        .expect("hand-dominant pattern should be emitted");
    assert!(pattern.confidence > 0.7, "confidence {}", pattern.confidence);
    assert_eq!(pattern.kind, PatternKind::HandDominant);
}

/// A 200 ms finger spike on a still hand fires the tap template
#[test]
fn test_isolated_finger_tap() {
    let mut pipeline = pipeline();
    let mut detected = Vec::new();

    // Quiet baseline, then a 200 ms spike to 5 g
    for i in 0..10u64 {
        let hand = motion_sample(SensorRole::Hand, i * 20, (0.0, 0.0, 1.0), (0.0, 0.0, 0.0));
        let finger = motion_sample(SensorRole::Finger, i * 20, (0.0, 0.0, 1.0), (0.0, 0.0, 0.0));
        detected.extend(pipeline.process(SensorInput::pair(hand, finger)).patterns);
    }
    for i in 10..20u64 {
        let hand = motion_sample(SensorRole::Hand, i * 20, (0.0, 0.0, 1.0), (0.0, 0.0, 0.0));
        let finger = motion_sample(SensorRole::Finger, i * 20, (5.0, 0.0, 1.0), (0.0, 0.0, 0.0));
        detected.extend(pipeline.process(SensorInput::pair(hand, finger)).patterns);
    }

    let tap = detected
        .iter()
        .find(|p| p.kind == PatternKind::Tap)
        .expect("tap pattern should be emitted");
    assert!(tap.confidence > 0.7, "confidence {}", tap.confidence);
}

/// A silent finger skips compensation but the hand stream still advances
#[test]
fn test_single_sensor_cycles() {
    let mut pipeline = pipeline();

    for i in 0..5u64 {
        let hand = motion_sample(SensorRole::Hand, i * 20, (0.2, 0.0, 1.0), (1.0, 0.0, 0.0));
        let output = pipeline.process(SensorInput::single(hand));
        assert!(output.hand_quaternion.is_some());
        assert!(output.compensated.is_none());
        assert!(output.metrics.is_none());
    }

    // Compensation resumes as soon as both sensors report
    let hand = motion_sample(SensorRole::Hand, 100, (0.2, 0.0, 1.0), (1.0, 0.0, 0.0));
    let finger = motion_sample(SensorRole::Finger, 100, (0.5, 0.0, 1.0), (2.0, 0.0, 0.0));
    let output = pipeline.process(SensorInput::pair(hand, finger));
    assert!(output.compensated.is_some());
    assert!(output.metrics.is_some());
}

/// Metrics snapshot reflects the compensated stream
#[test]
fn test_metrics_snapshot() {
    let mut pipeline = pipeline();

    // Warm the smoothing buffers so values settle
    let mut output = None;
    for i in 0..10u64 {
        let hand = motion_sample(SensorRole::Hand, i * 20, (0.0, 0.0, 1.0), (0.0, 0.0, 0.0));
        let finger = motion_sample(SensorRole::Finger, i * 20, (3.0, 0.0, 1.0), (0.0, 0.0, 0.0));
        output = Some(pipeline.process(SensorInput::pair(hand, finger)));
    }

    let metrics = output.unwrap().metrics.unwrap();
    // Hand carries only gravity; the finger's X burst survives compensation
    assert!(metrics.compensated_magnitude > 2.0);
    assert!(metrics.independent_motion_ratio > 0.5);
    assert_eq!(metrics.dominant_axis, DominantAxis::X);
    assert_eq!(metrics.motion_type, MotionType::Complex);
    assert!(pipeline.stream_stats().is_active);
}

/// Reset clears runtime state but keeps the calibration profile
#[test]
fn test_reset_preserves_calibration() {
    let mut pipeline = pipeline();

    pipeline.start_calibration();
    for i in 0..10u64 {
        pipeline.add_calibration_sample(
            motion_sample(SensorRole::Hand, i * 20, (0.1, 0.0, 1.0), (0.0, 0.0, 0.0)),
            motion_sample(SensorRole::Finger, i * 20, (0.1, 0.0, 1.0), (0.0, 0.0, 0.0)),
        );
    }
    pipeline.finish_calibration().unwrap();

    for i in 0..20u64 {
        pipeline.process(rest_pair(i * 20));
    }
    assert!(pipeline.current_pattern().is_some());

    pipeline.reset();
    assert!(pipeline.is_calibrated());
    assert!(pipeline.current_pattern().is_none());
    assert_eq!(pipeline.pattern_history().count(), 0);
    assert_eq!(pipeline.stream_stats().total_samples, 0);
}

/// Pattern history stays within its configured bound
#[test]
fn test_history_bounded_over_long_session() {
    let mut config = Config::default();
    config.classifier.history_capacity = 10;
    let mut pipeline = FusionOrchestrator::new(config).unwrap();

    for i in 0..200u64 {
        pipeline.process(rest_pair(i * 20));
    }
    assert!(pipeline.pattern_history().count() <= 10);
}
