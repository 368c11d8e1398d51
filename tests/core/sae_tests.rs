//! Tests for SAE power correction
//!
//! Tests cover:
//! - Baseline factor at default conditions
//! - Humidity and altitude effects
//! - Enabled flag handling

use dynolog::analysis::sae::{correction, dry_pressure, vapor_pressure, SaeConfig};

use crate::common::assert_close;

#[test]
fn test_baseline_correction() {
    assert_close(correction(25.0, 196.0, 0.0), 1.000089741605681, 1e-12);
}

#[test]
fn test_humid_warm_correction() {
    assert_close(correction(30.0, 0.0, 50.0), 1.007415161589254, 1e-12);
}

#[test]
fn test_vapor_pressure() {
    assert_close(vapor_pressure(30.0), 42.42634794801739, 1e-12);
    assert_close(vapor_pressure(0.0), 6.1078, 1e-12);
}

#[test]
fn test_dry_pressure_at_sea_level() {
    assert_close(dry_pressure(25.0, 0.0, 0.0), 1013.25, 1e-12);
    assert!(dry_pressure(25.0, 0.0, 100.0) < 1013.25);
}

#[test]
fn test_correction_grows_with_altitude() {
    let low = correction(25.0, 0.0, 0.0);
    let high = correction(25.0, 2000.0, 0.0);
    assert!(high > low);
    assert!(high > 1.0);
}

#[test]
fn test_config_factor() {
    let config = SaeConfig::default();
    assert!(!config.enabled);
    assert_eq!(config.factor(), 1.0);
    assert_close(config.correction(), 1.000089741605681, 1e-12);

    let enabled = SaeConfig {
        enabled: true,
        ..SaeConfig::default()
    };
    assert_close(enabled.factor(), 1.000089741605681, 1e-12);
}
