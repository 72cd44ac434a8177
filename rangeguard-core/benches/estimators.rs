//! Per-cycle cost of the range estimators and the gate
//!
//! Run with: cargo bench --package rangeguard-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use rangeguard_core::{
    acquisition::Sample,
    actuation::ActuatorPhase,
    buffer::EstimateHistory,
    config::SystemConfig,
    fusion::{HistogramFilter, KalmanFilter, QuantizedKalman},
    gate::{GateInput, SafetyGate},
    traits::RangeEstimator,
};

/// Deterministic reading pairs around 8 cm with occasional dropouts
fn readings(count: usize) -> Vec<(Option<f32>, Option<f32>)> {
    (0..count)
        .map(|i| {
            let wobble = ((i * 37 % 17) as f32 - 8.0) * 0.05;
            let z1 = if i % 11 == 0 { None } else { Some(8.0 + wobble) };
            let z2 = if i % 13 == 0 { None } else { Some(8.0 - wobble) };
            (z1, z2)
        })
        .collect()
}

fn run<E: RangeEstimator>(estimator: &mut E, data: &[(Option<f32>, Option<f32>)]) -> f32 {
    let mut last = 0.0;
    for &(z1, z2) in data {
        last = estimator.update(black_box(z1), black_box(z2)).distance;
    }
    last
}

fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("Estimator update");
    group.measurement_time(Duration::from_secs(5));

    let config = SystemConfig::default();
    let data = readings(256);

    group.bench_function("kalman", |b| {
        let mut kf = KalmanFilter::new(config.limits, config.kalman).unwrap();
        b.iter(|| run(&mut kf, &data));
    });

    group.bench_function("quantized-kalman", |b| {
        let mut qk = QuantizedKalman::new(config.limits, config.kalman).unwrap();
        b.iter(|| run(&mut qk, &data));
    });

    group.finish();
}

fn bench_histogram_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Histogram update");
    group.measurement_time(Duration::from_secs(5));

    let data = readings(64);
    for &step in &[0.5f32, 0.2, 0.1, 0.05] {
        let mut config = SystemConfig::default();
        config.histogram.step = step;
        let mut filter = HistogramFilter::new(config.limits, config.histogram).unwrap();

        group.bench_with_input(
            BenchmarkId::new("bins", filter.bins()),
            &data,
            |b, data| b.iter(|| run(&mut filter, data)),
        );
    }

    group.finish();
}

fn bench_gate(c: &mut Criterion) {
    let config = SystemConfig::default();
    let gate = SafetyGate::new(config.limits, config.gate);
    let mut history = EstimateHistory::<5>::new();
    for v in [8.0, 8.1, 7.9, 8.0, 8.05] {
        history.record(v);
    }

    c.bench_function("gate check", |b| {
        b.iter(|| {
            gate.check(black_box(&GateInput {
                estimate: 8.0,
                uncertainty: 0.2,
                history: &history,
                samples: [Sample::Valid(8.0), Sample::NoEcho],
                phase: ActuatorPhase::Off,
            }))
        })
    });
}

criterion_group!(benches, bench_estimators, bench_histogram_resolution, bench_gate);
criterion_main!(benches);
