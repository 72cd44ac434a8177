//! Integration tests for the range estimators
//!
//! Covers the three interchangeable strategies behind `RangeEstimator`:
//! - Convergence on agreeing sensors and noise shrinkage
//! - Noise saturation on disagreeing sensors
//! - Dropout and diffuse-zone behaviour end to end from echo times
//! - Float and quantized Kalman reaching the same gate decision

mod common;

use rangeguard_core::{
    acquisition::{sample_from_echo, Sample},
    actuation::ActuatorPhase,
    buffer::EstimateHistory,
    config::SystemConfig,
    fusion::{FusionOutcome, HistogramFilter, KalmanFilter, QuantizedKalman},
    gate::{GateInput, Rejection, SafetyGate},
    traits::RangeEstimator,
};

use common::{echo_us, reference_config, TestRng};

fn estimators(config: &SystemConfig) -> (HistogramFilter, KalmanFilter, QuantizedKalman) {
    (
        HistogramFilter::new(config.limits, config.histogram).unwrap(),
        KalmanFilter::new(config.limits, config.kalman).unwrap(),
        QuantizedKalman::new(config.limits, config.kalman).unwrap(),
    )
}

/// Feed `cycles` identical pairs, return the final estimate
fn settle<E: RangeEstimator>(estimator: &mut E, z1: f32, z2: f32, cycles: usize) -> f32 {
    for _ in 0..cycles {
        estimator.update(Some(z1), Some(z2));
    }
    estimator.current().distance
}

/// Gate decision after feeding a steady target through `estimator`
fn steady_decision<E: RangeEstimator>(
    estimator: &mut E,
    config: &SystemConfig,
    distance: f32,
) -> Result<(), Rejection> {
    let gate = SafetyGate::new(config.limits, config.gate);
    let mut history = EstimateHistory::<5>::new();
    let samples = [Sample::Valid(distance); 2];

    let mut decision = Err(Rejection::LowConfidence);
    for _ in 0..100 {
        let est = estimator.update(Some(distance), Some(distance));
        history.record(est.distance);
        decision = gate.check(&GateInput {
            estimate: est.distance,
            uncertainty: est.uncertainty,
            history: &history,
            samples,
            phase: ActuatorPhase::Off,
        });
    }
    decision
}

#[test]
fn all_estimators_converge_on_agreement() {
    let config = reference_config();
    let (mut hist, mut kf, mut qk) = estimators(&config);

    assert!((settle(&mut hist, 9.0, 9.0, 100) - 9.0).abs() < 0.05);
    assert!((settle(&mut kf, 9.0, 9.0, 100) - 9.0).abs() < 0.01);
    assert!((settle(&mut qk, 9.0, 9.0, 100) - 9.0).abs() < 0.05);

    assert_eq!(hist.noise(), [0.2, 0.2]);
    assert_eq!(kf.noise(), [0.1, 0.1]);
    assert_eq!(qk.noise(), [0.1, 0.1]);
}

#[test]
fn disagreement_saturates_noise() {
    let config = reference_config();
    let (mut hist, mut kf, mut qk) = estimators(&config);

    for _ in 0..100 {
        hist.update(Some(config.limits.min_dist), Some(config.limits.max_dist));
        kf.update(Some(config.limits.min_dist), Some(config.limits.max_dist));
        qk.update(Some(config.limits.min_dist), Some(config.limits.max_dist));
    }

    assert_eq!(hist.noise(), [1.0, 1.0]);
    assert_eq!(kf.noise(), [2.0, 2.0]);
    assert_eq!(qk.noise(), [2.0, 2.0]);
}

#[test]
fn noisy_target_is_tracked() {
    let config = reference_config();
    let (_, mut kf, _) = estimators(&config);
    let mut rng = TestRng::new(7);

    for _ in 0..300 {
        kf.update(Some(12.0 + rng.noise(0.3)), Some(12.0 + rng.noise(0.3)));
    }

    let est = kf.current();
    assert!((est.distance - 12.0).abs() < 0.2, "estimate {}", est.distance);
    assert!(est.uncertainty < 0.3);
}

#[test]
fn diffuse_reading_never_looks_safe() {
    let config = reference_config();
    let (mut hist, mut kf, _) = estimators(&config);
    let safe_max = config.gate.safe_max(&config.limits);

    let sample = sample_from_echo(Some(echo_us(20.5)), &config.limits, &config.ranging);
    assert!(sample.is_ambiguous());
    assert!(sample.distance().unwrap() > safe_max);

    for _ in 0..30 {
        hist.update(sample.distance(), sample.distance());
        kf.update(sample.distance(), sample.distance());
    }
    assert!(hist.current().distance > safe_max);
    assert!(kf.current().distance > safe_max);
}

#[test]
fn dual_dropout_degrades_confidence() {
    let config = reference_config();
    let (mut hist, mut kf, mut qk) = estimators(&config);

    settle(&mut kf, 6.0, 6.0, 50);
    settle(&mut qk, 6.0, 6.0, 50);
    let kf_before = kf.current();

    for _ in 0..100 {
        assert_eq!(hist.update(None, None).outcome, FusionOutcome::NoMeasurement);
        kf.update(None, None);
        qk.update(None, None);
    }

    let kf_after = kf.current();
    assert_eq!(kf_after.distance, kf_before.distance);
    assert!(kf_after.uncertainty > kf_before.uncertainty + 0.9);
    assert!(qk.current().uncertainty > 0.9);
}

#[test]
fn float_and_quantized_agree_on_gate() {
    let config = reference_config();

    for distance in [3.0, 7.5, 12.25, 17.0] {
        let (_, mut kf, mut qk) = estimators(&config);
        assert_eq!(
            steady_decision(&mut kf, &config, distance),
            steady_decision(&mut qk, &config, distance),
            "distance {}",
            distance
        );
    }

    // beyond safe_max both refuse for the same reason
    let (_, mut kf, mut qk) = estimators(&config);
    assert_eq!(steady_decision(&mut kf, &config, 19.0), Err(Rejection::OutOfRange));
    assert_eq!(steady_decision(&mut qk, &config, 19.0), Err(Rejection::OutOfRange));
}

#[test]
fn histogram_opens_gate_on_steady_target() {
    let config = reference_config();
    let (mut hist, _, _) = estimators(&config);
    assert_eq!(steady_decision(&mut hist, &config, 8.0), Ok(()));
}

#[test]
fn short_range_rig_grid() {
    let config = SystemConfig::short_range();
    let hist = HistogramFilter::new(config.limits, config.histogram).unwrap();
    assert_eq!(hist.bins(), 131);

    let sample = sample_from_echo(Some(echo_us(15.5)), &config.limits, &config.ranging);
    assert_eq!(sample, Sample::Ambiguous(16.0));
}
