//! Benchmarks for the fusion pipeline stages

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dual_motion_fusion::compensation::MotionCompensator;
use dual_motion_fusion::config::Config;
use dual_motion_fusion::conditioning::SensorConditioner;
use dual_motion_fusion::fusion::{FusionOrchestrator, SensorInput};
use dual_motion_fusion::orientation::OrientationFilter;
use dual_motion_fusion::sample::{MotionSample, SensorRole};
use std::f64::consts::PI;

/// Generate a noisy dual-sensor session
fn generate_session(num_cycles: usize) -> Vec<SensorInput> {
    (0..num_cycles)
        .map(|i| {
            let t = i as f64 * 0.02;
            let timestamp = i as u64 * 20;

            // Smooth wave plus noise, occasional finger spike
            let wave = 2.0 * (2.0 * PI * 0.8 * t).sin();
            let noise = 0.05 * (rand::random::<f64>() - 0.5);
            let spike = if rand::random::<f64>() < 0.02 { 4.0 } else { 0.0 };

            let hand = MotionSample {
                ax: wave + noise,
                ay: noise,
                az: 1.0 + noise,
                gx: 20.0 * wave,
                gy: noise * 10.0,
                gz: 0.0,
                timestamp,
                role: SensorRole::Hand,
                quality: 1.0,
            };
            let finger = MotionSample {
                ax: wave + spike + noise,
                ay: noise,
                az: 1.0 + noise,
                gx: 20.0 * wave,
                gy: noise * 10.0,
                gz: 0.0,
                timestamp,
                role: SensorRole::Finger,
                quality: 1.0,
            };
            SensorInput::pair(hand, finger)
        })
        .collect()
}

fn benchmark_orientation_filter(c: &mut Criterion) {
    c.bench_function("orientation_update", |b| {
        let mut filter = OrientationFilter::default();
        let mut t = 0u64;
        b.iter(|| {
            t += 20;
            filter.update(t, black_box(0.3), black_box(-0.2), black_box(0.1), 0.1, 0.0, 1.0);
            black_box(filter.quaternion())
        });
    });
}

fn benchmark_conditioning(c: &mut Criterion) {
    c.bench_function("conditioning_chain", |b| {
        let mut conditioner = SensorConditioner::new(5, 0.05, false);
        let sample = MotionSample {
            ax: 0.3,
            ay: -0.02,
            az: 1.01,
            gx: 12.0,
            gy: 0.3,
            gz: -4.0,
            timestamp: 20,
            role: SensorRole::Hand,
            quality: 1.0,
        };
        b.iter(|| black_box(conditioner.condition(black_box(sample))));
    });
}

fn benchmark_compensation(c: &mut Criterion) {
    c.bench_function("compensation", |b| {
        let compensator = MotionCompensator::new(1.0);
        let hand = MotionSample {
            ax: 1.5,
            ay: 0.2,
            az: 1.0,
            gx: 30.0,
            gy: 0.0,
            gz: 0.0,
            timestamp: 20,
            role: SensorRole::Hand,
            quality: 1.0,
        };
        let finger = MotionSample {
            ax: 2.0,
            ay: 0.1,
            az: 1.0,
            gx: 35.0,
            gy: 0.0,
            gz: 0.0,
            timestamp: 20,
            role: SensorRole::Finger,
            quality: 1.0,
        };
        b.iter(|| black_box(compensator.compensate(black_box(&finger), black_box(&hand))));
    });
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for num_cycles in [100usize, 500, 1000] {
        let session = generate_session(num_cycles);
        group.bench_with_input(BenchmarkId::new("session", num_cycles), &session, |b, session| {
            b.iter(|| {
                let mut pipeline = FusionOrchestrator::new(Config::default()).unwrap();
                for input in session {
                    black_box(pipeline.process(*input));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_orientation_filter,
    benchmark_conditioning,
    benchmark_compensation,
    benchmark_full_pipeline
);
criterion_main!(benches);
