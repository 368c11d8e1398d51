//! Common test utilities shared across all test modules
//!
//! Synthetic dataset builders and float comparison helpers.

#![allow(dead_code)]

use dynolog::analysis::ranges::FilterConfig;
use dynolog::{Dataset, Row};

/// Relative comparison with an absolute floor of `tol` near zero
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}

/// Assert two floats are within a relative tolerance
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        approx_eq(actual, expected, tol),
        "expected {} to be within {} of {}",
        actual,
        tol,
        expected
    );
}

/// TIME/RPM dataset sampled every `dt` seconds
pub fn rpm_series(rpm: &[f64], dt: f64) -> Dataset {
    Dataset::new(
        rpm.iter()
            .enumerate()
            .map(|(i, &r)| Row::new().with("TIME", i as f64 * dt).with("RPM", r))
            .collect(),
    )
}

/// Dataset from explicit time and RPM columns
pub fn timed_series(time: &[f64], rpm: &[f64]) -> Dataset {
    Dataset::new(
        time.iter()
            .zip(rpm)
            .map(|(&t, &r)| Row::new().with("TIME", t).with("RPM", r))
            .collect(),
    )
}

/// A realistic log: idle, a 3rd gear WOT pull from 2500 to 6500 RPM,
/// lift-off, then idle again. 10 Hz.
pub fn wot_log() -> Dataset {
    let mut rows = Vec::new();
    let mut t = 0.0;
    let mut push = |rpm: f64, pedal: f64, throttle: f64, gear: f64| {
        rows.push(
            Row::new()
                .with("TIME", t)
                .with("RPM", rpm)
                .with("AcceleratorPedalPosition", pedal)
                .with("ThrottlePlateAngle", throttle)
                .with("Gear", gear),
        );
        t += 0.1;
    };

    for _ in 0..10 {
        push(900.0, 0.0, 3.0, 3.0);
    }
    for i in 0..=40 {
        push(2500.0 + 100.0 * i as f64, 100.0, 98.0, 3.0);
    }
    for i in 0..10 {
        push(6000.0 - 300.0 * i as f64, 0.0, 2.0, 3.0);
    }
    for _ in 0..10 {
        push(900.0, 0.0, 3.0, 0.0);
    }
    Dataset::new(rows)
}

/// Gating wide open, no RPM bounds, fuzz 0
pub fn open_filter(min_rpm_range: f64, min_points: usize) -> FilterConfig {
    FilterConfig {
        min_rpm: 0.0,
        max_rpm: 100_000.0,
        min_rpm_range,
        monotonic_rpm_fuzz: 0.0,
        min_points,
        ..FilterConfig::default()
    }
}
