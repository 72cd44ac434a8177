//! Property tests for the estimator, gate and actuator invariants

use proptest::prelude::*;

use rangeguard_core::{
    acquisition::{classify, Sample},
    actuation::{ActuatorPhase, ActuatorState},
    buffer::EstimateHistory,
    config::{SystemConfig, TimingConfig},
    fusion::{HistogramFilter, KalmanFilter, QuantizedKalman},
    gate::{GateInput, SafetyGate},
    traits::RangeEstimator,
};

type Cycles = Vec<(Option<f32>, Option<f32>)>;

fn readings(range: core::ops::Range<f32>) -> impl Strategy<Value = Cycles> {
    prop::collection::vec(
        (prop::option::of(range.clone()), prop::option::of(range)),
        1..60,
    )
}

fn sample() -> impl Strategy<Value = Sample> {
    prop_oneof![
        (0.0f32..25.0).prop_map(Sample::Valid),
        Just(Sample::Ambiguous(21.0)),
        Just(Sample::NoEcho),
    ]
}

proptest! {
    #[test]
    fn prop_belief_is_a_distribution(cycles in readings(-5.0..40.0)) {
        let config = SystemConfig::default();
        let mut filter = HistogramFilter::new(config.limits, config.histogram).unwrap();

        for (z1, z2) in cycles {
            filter.update(z1, z2);
            let belief = filter.belief();
            prop_assert!(belief.iter().all(|b| *b >= 0.0 && b.is_finite()));
            let total: f32 = belief.iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-3, "mass {}", total);
        }
    }

    #[test]
    fn prop_kalman_state_stays_valid(cycles in readings(-100.0..100.0)) {
        let config = SystemConfig::default();
        let mut float = KalmanFilter::new(config.limits, config.kalman).unwrap();
        let mut quantized = QuantizedKalman::new(config.limits, config.kalman).unwrap();

        for (z1, z2) in cycles {
            for est in [float.update(z1, z2), quantized.update(z1, z2)] {
                prop_assert!(est.uncertainty > 0.0);
                prop_assert!(config.limits.contains(est.distance), "x = {}", est.distance);
            }
        }

        let (_, p) = quantized.raw_state();
        prop_assert!(p >= 1);
    }

    #[test]
    fn prop_noise_stays_bounded(cycles in readings(0.0..30.0)) {
        let config = SystemConfig::default();
        let mut float = KalmanFilter::new(config.limits, config.kalman).unwrap();
        let mut hist = HistogramFilter::new(config.limits, config.histogram).unwrap();

        for (z1, z2) in cycles {
            float.update(z1, z2);
            hist.update(z1, z2);

            for r in float.noise() {
                prop_assert!((0.1..=2.0).contains(&r));
            }
            for sigma in hist.noise() {
                prop_assert!((0.2..=1.0).contains(&sigma));
            }
        }
    }

    #[test]
    fn prop_diffuse_zone_never_looks_safe(raw in 19.0f32..22.0) {
        prop_assume!(raw > 19.0 && raw < 22.0);
        let config = SystemConfig::default();
        let safe_max = config.gate.safe_max(&config.limits);

        let sample = classify(raw, &config.limits, &config.ranging);
        prop_assert!(sample.is_ambiguous());
        prop_assert!(sample.distance().map_or(false, |d| d > safe_max));
        prop_assert!(!sample.is_within(safe_max));
    }

    #[test]
    fn prop_valid_samples_are_clamped(raw in 0.001f32..500.0) {
        let config = SystemConfig::default();
        let sample = classify(raw, &config.limits, &config.ranging);
        if let Sample::Valid(d) = sample {
            prop_assert!(config.limits.contains(d));
        }
    }

    #[test]
    fn prop_gate_refuses_while_active(
        estimate in -10.0f32..40.0,
        uncertainty in 0.0f32..2.0,
        history in prop::collection::vec(0.0f32..25.0, 0..8),
        samples in (sample(), sample()),
        waiting in any::<bool>(),
    ) {
        let config = SystemConfig::default();
        let gate = SafetyGate::new(config.limits, config.gate);
        let mut recorded = EstimateHistory::<5>::new();
        for h in history {
            recorded.record(h);
        }

        let input = GateInput {
            estimate,
            uncertainty,
            history: &recorded,
            samples: [samples.0, samples.1],
            phase: if waiting { ActuatorPhase::WaitOff } else { ActuatorPhase::On },
        };
        prop_assert!(!gate.may_trigger(&input));
    }

    #[test]
    fn prop_gate_grant_implies_every_criterion(
        estimate in 0.0f32..25.0,
        uncertainty in 0.0f32..0.6,
        history in prop::collection::vec(4.0f32..20.0, 0..8),
        samples in (sample(), sample()),
    ) {
        let config = SystemConfig::default();
        let gate = SafetyGate::new(config.limits, config.gate);
        let mut recorded = EstimateHistory::<5>::new();
        for h in history {
            recorded.record(h);
        }

        let input = GateInput {
            estimate,
            uncertainty,
            history: &recorded,
            samples: [samples.0, samples.1],
            phase: ActuatorPhase::Off,
        };

        if gate.may_trigger(&input) {
            let safe_max = gate.safe_max();
            prop_assert!(estimate >= config.limits.min_dist && estimate <= safe_max);
            prop_assert!(recorded.all_at_most(safe_max));
            prop_assert!(recorded.variation() < config.gate.stability_threshold);
            prop_assert!(uncertainty < config.gate.confidence_threshold);
            prop_assert!(input.samples.iter().any(|s| s.is_within(safe_max)));
        }
    }

    #[test]
    fn prop_actuator_moves_one_step(since in any::<u32>(), dt in any::<u32>()) {
        let timing = TimingConfig::default();
        let now = since.wrapping_add(dt);

        let (next, _) = ActuatorState::On { since }.advance(now, &timing);
        if dt >= 5000 {
            prop_assert_eq!(next, ActuatorState::WaitOff { since: now });
        } else {
            prop_assert_eq!(next, ActuatorState::On { since });
        }

        let (next, _) = ActuatorState::WaitOff { since }.advance(now, &timing);
        if dt >= 1000 {
            prop_assert_eq!(next, ActuatorState::Off);
        } else {
            prop_assert_eq!(next, ActuatorState::WaitOff { since });
        }
    }

    #[test]
    fn prop_variation_matches_window(values in prop::collection::vec(0.0f32..25.0, 1..20)) {
        let mut history = EstimateHistory::<5>::new();
        for v in &values {
            history.record(*v);
        }

        let window = &values[values.len().saturating_sub(5)..];
        let max = window.iter().cloned().fold(f32::MIN, f32::max);
        let min = window.iter().cloned().fold(f32::MAX, f32::min);
        prop_assert_eq!(history.variation(), max - min);
        prop_assert_eq!(history.len(), window.len());
    }
}
