//! Simulated Rig Example
//!
//! Runs the full control loop on the host against two simulated
//! ultrasonic sensors watching a target that approaches, lingers and
//! leaves.
//!
//! ## What You'll See
//!
//! - The estimate settling as both sensors agree
//! - Diffuse-zone readings holding the gate shut while the target is far
//! - One activation, the dwell and cool-down, then a re-arm
//! - A sensor dropout degrading confidence
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_simulated_rig            # float Kalman
//! cargo run --example 01_simulated_rig histogram
//! cargo run --example 01_simulated_rig quantized
//! ```

use std::{cell::Cell, rc::Rc};

use rangeguard_core::{
    config::SystemConfig,
    constants::SPEED_OF_SOUND_CM_PER_US,
    controller::{Controller, PollOutput},
    fusion::{HistogramFilter, KalmanFilter, QuantizedKalman},
    time::{FixedTime, Millis, TimeSource},
    traits::{EchoSensor, OutputLine, RangeEstimator},
};

const POLL_MS: u32 = 10;
const RUN_MS: u32 = 20_000;

/// Target distance (cm) over time
fn scenario(t: Millis) -> f32 {
    match t {
        0..=2_999 => 21.0,
        3_000..=5_999 => 21.0 - (t - 3_000) as f32 * 0.005,
        6_000..=13_999 => 6.0,
        _ => 6.0 + (t - 14_000) as f32 * 0.004,
    }
}

/// Simulated sensor sharing the clock
struct SimSensor {
    clock: Rc<Cell<Millis>>,
    seed: u32,
    /// Silent between these times
    blind: (Millis, Millis),
}

impl SimSensor {
    fn new(clock: Rc<Cell<Millis>>, seed: u32, blind: (Millis, Millis)) -> Self {
        Self { clock, seed, blind }
    }

    fn jitter(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((self.seed >> 8) as f32 / (1u32 << 24) as f32 - 0.5) * 0.6
    }
}

impl EchoSensor for SimSensor {
    type Error = ();

    fn ping(&mut self, _timeout_us: u32) -> nb::Result<Option<u32>, ()> {
        let now = self.clock.get();
        if now >= self.blind.0 && now < self.blind.1 {
            return Ok(None);
        }
        let cm = scenario(now) + self.jitter();
        Ok(Some((cm * 2.0 / SPEED_OF_SOUND_CM_PER_US) as u32))
    }
}

/// Output pin printing its edges
struct Relay;

impl OutputLine for Relay {
    fn set_high(&mut self) {
        println!("    relay: HIGH");
    }

    fn set_low(&mut self) {
        println!("    relay: LOW");
    }
}

fn simulate<E: RangeEstimator>(config: &SystemConfig, estimator: E) {
    println!("Estimator: {}\n", estimator.name());

    let shared = Rc::new(Cell::new(0));
    let s1 = SimSensor::new(shared.clone(), 1, (0, 0));
    // sensor 2 goes silent for two seconds while the target is close
    let s2 = SimSensor::new(shared.clone(), 2, (9_000, 11_000));

    let mut controller: Controller<E, SimSensor, SimSensor, Relay> =
        match Controller::new(config, estimator, s1, s2, Relay) {
            Ok(controller) => controller,
            Err(e) => {
                eprintln!("invalid configuration: {}", e);
                return;
            }
        };

    let mut clock = FixedTime::new(0);
    let mut cycles = 0usize;
    let mut triggers = 0usize;

    while clock.now() < RUN_MS {
        shared.set(clock.now());
        let PollOutput { record, transition } = controller.poll(clock.now());

        if let Some(record) = record {
            cycles += 1;
            triggers += usize::from(record.triggered);
            // every 20th cycle plus anything interesting
            if cycles % 20 == 0 || record.triggered || record.is_anomalous() {
                println!("{}", record);
            }
        }
        if let Some(transition) = transition {
            println!("    transition: {:?} at t={}", transition, clock.now());
        }

        clock.advance(POLL_MS);
    }

    println!("\n{} cycles, {} activations\n", cycles, triggers);
}

fn main() {
    println!("Dual Ultrasonic Rig Simulation");
    println!("==============================\n");

    let config = SystemConfig::default();
    println!(
        "Window {}..{} cm, triggers at or below {} cm, diffuse zone ({}, {})\n",
        config.limits.min_dist,
        config.limits.max_dist,
        config.gate.safe_max(&config.limits),
        config.ranging.diffuse_start,
        config.ranging.diffuse_end,
    );

    let choice = std::env::args().nth(1).unwrap_or_default();
    match choice.as_str() {
        "histogram" => match HistogramFilter::new(config.limits, config.histogram) {
            Ok(filter) => simulate(&config, filter),
            Err(e) => eprintln!("histogram setup failed: {}", e),
        },
        "quantized" => match QuantizedKalman::new(config.limits, config.kalman) {
            Ok(filter) => simulate(&config, filter),
            Err(e) => eprintln!("quantized setup failed: {}", e),
        },
        _ => match KalmanFilter::new(config.limits, config.kalman) {
            Ok(filter) => simulate(&config, filter),
            Err(e) => eprintln!("kalman setup failed: {}", e),
        },
    }
}
