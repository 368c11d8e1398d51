//! Tests for pull detection
//!
//! Tests cover:
//! - Acceptance thresholds (point count and RPM span)
//! - Monotonic RPM fuzz
//! - ZeitMAW smoothing before the scan
//! - Pedal, throttle and gear gating
//! - Disabled filtering and degenerate inputs

use dynolog::analysis::ranges::{
    detect_ranges, detect_ranges_with_report, scan_ranges, FilterConfig, RejectReason,
};
use dynolog::{Dataset, LoggerDialect, Row};

use crate::common::{open_filter, rpm_series, wot_log};

// ============================================
// Acceptance Tests
// ============================================

#[test]
fn test_five_points_accepted() {
    let ds = rpm_series(&[1000.0, 1500.0, 2000.0, 2500.0, 3000.0], 0.1);
    let ranges = detect_ranges(&ds, &open_filter(1500.0, 5));
    assert_eq!(ranges.len(), 1);
    assert_eq!((ranges[0].start, ranges[0].end), (0, 5));
    assert_eq!(ranges[0].min_rpm, 1000.0);
    assert_eq!(ranges[0].max_rpm, 3000.0);
}

#[test]
fn test_four_points_rejected() {
    let ds = rpm_series(&[1000.0, 1500.0, 2000.0, 2500.0], 0.1);
    let report = detect_ranges_with_report(&ds, &open_filter(1500.0, 5));
    assert!(report.accepted.is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(
        report.rejected[0].reasons,
        vec![RejectReason::TooFewPoints { got: 4, min: 5 }]
    );
}

#[test]
fn test_small_span_rejected() {
    let ds = rpm_series(&[3000.0, 3100.0, 3200.0, 3300.0, 3400.0, 3500.0], 0.1);
    let report = detect_ranges_with_report(&ds, &open_filter(1500.0, 5));
    assert!(report.accepted.is_empty());
    assert!(matches!(
        report.rejected[0].reasons[0],
        RejectReason::SpanTooSmall { .. }
    ));
}

// ============================================
// Fuzz Tests
// ============================================

#[test]
fn test_fuzz_tolerates_small_dip() {
    let ds = rpm_series(&[1000.0, 2000.0, 1950.0, 3000.0], 0.1);
    let config = FilterConfig {
        monotonic_rpm_fuzz: 100.0,
        ..open_filter(1500.0, 4)
    };
    let ranges = detect_ranges(&ds, &config);
    assert_eq!(ranges.len(), 1);
    assert_eq!((ranges[0].start, ranges[0].end), (0, 4));
}

#[test]
fn test_zero_fuzz_splits_on_dip() {
    let ds = rpm_series(&[1000.0, 2000.0, 1950.0, 3000.0], 0.1);
    let ranges = detect_ranges(&ds, &open_filter(1500.0, 4));
    assert!(ranges.is_empty());
}

#[test]
fn test_breaking_row_starts_next_candidate() {
    let ds = rpm_series(
        &[
            2000.0, 2500.0, 3000.0, 3500.0, 4000.0, // first pull
            2000.0, 2600.0, 3200.0, 3800.0, 4400.0, // second pull, starts at the drop
        ],
        0.1,
    );
    let ranges = detect_ranges(&ds, &open_filter(1500.0, 5));
    assert_eq!(ranges.len(), 2);
    assert_eq!((ranges[0].start, ranges[0].end), (0, 5));
    assert_eq!((ranges[1].start, ranges[1].end), (5, 10));
}

// ============================================
// Smoothing Tests
// ============================================

/// Rising trace where every other sample dips 100 RPM below the last
fn jittery_ramp() -> Vec<f64> {
    vec![
        2000.0, 2400.0, 2300.0, 2700.0, 2600.0, 3000.0, 2900.0, 3300.0, 3200.0, 3600.0, 3500.0,
        3900.0,
    ]
}

#[test]
fn test_jitter_breaks_unsmoothed_pull() {
    let ds = rpm_series(&jittery_ramp(), 0.1);
    let config = FilterConfig {
        zeit_maw: 3,
        ..open_filter(1200.0, 5)
    };
    let report = detect_ranges_with_report(&ds, &config);
    assert!(report.accepted.is_empty());
    assert!(report.rejected.iter().all(|r| r.range.len() <= 2));
}

#[test]
fn test_zeitronix_smoothing_joins_jittery_pull() {
    let ds = rpm_series(&jittery_ramp(), 0.1).with_dialect(LoggerDialect::Zeitronix);
    let config = FilterConfig {
        zeit_maw: 3,
        ..open_filter(1200.0, 5)
    };
    let ranges = detect_ranges(&ds, &config);
    assert_eq!(ranges.len(), 1);
    assert_eq!((ranges[0].start, ranges[0].end), (0, 12));
    // (2000 + 2400) / 2 and (3500 + 3900) / 2
    assert_eq!(ranges[0].min_rpm, 2200.0);
    assert_eq!(ranges[0].max_rpm, 3700.0);

    let unsmoothed = FilterConfig {
        zeit_maw: 1,
        ..config
    };
    assert!(detect_ranges(&ds, &unsmoothed).is_empty());
}

#[test]
fn test_scan_ranges_does_not_smooth() {
    let ds = rpm_series(&jittery_ramp(), 0.1).with_dialect(LoggerDialect::Zeitronix);
    let config = FilterConfig {
        zeit_maw: 3,
        ..open_filter(1200.0, 5)
    };
    assert!(scan_ranges(&ds, &config).accepted.is_empty());
}

// ============================================
// Gating Tests
// ============================================

#[test]
fn test_wot_log_finds_single_pull() {
    let ranges = detect_ranges(&wot_log(), &FilterConfig::default());
    assert_eq!(ranges.len(), 1);
    let pull = ranges[0];
    assert_eq!((pull.start, pull.end), (10, 51));
    assert_eq!(pull.min_rpm, 2500.0);
    assert_eq!(pull.max_rpm, 6500.0);
}

#[test]
fn test_gear_gate() {
    let config = FilterConfig {
        gear: 4,
        ..FilterConfig::default()
    };
    assert!(detect_ranges(&wot_log(), &config).is_empty());

    let config = FilterConfig {
        gear: 3,
        ..FilterConfig::default()
    };
    assert_eq!(detect_ranges(&wot_log(), &config).len(), 1);
}

#[test]
fn test_rpm_bounds_trim_the_pull() {
    let config = FilterConfig {
        min_rpm: 3000.0,
        max_rpm: 6000.0,
        ..FilterConfig::default()
    };
    let ranges = detect_ranges(&wot_log(), &config);
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].min_rpm, 3000.0);
    assert_eq!(ranges[0].max_rpm, 6000.0);
}

#[test]
fn test_part_throttle_is_not_a_pull() {
    let rows = (0..20)
        .map(|i| {
            Row::new()
                .with("TIME", i as f64 * 0.1)
                .with("RPM", 2500.0 + 200.0 * i as f64)
                .with("AcceleratorPedalPosition", 60.0)
        })
        .collect();
    let ranges = detect_ranges(&Dataset::new(rows), &FilterConfig::default());
    assert!(ranges.is_empty());
}

#[test]
fn test_all_zero_pedal_column_is_ignored() {
    let rows = (0..20)
        .map(|i| {
            Row::new()
                .with("TIME", i as f64 * 0.1)
                .with("RPM", 2500.0 + 200.0 * i as f64)
                .with("AcceleratorPedalPosition", 0.0)
        })
        .collect();
    let ranges = detect_ranges(&Dataset::new(rows), &FilterConfig::default());
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].len(), 20);
}

// ============================================
// Degenerate Input Tests
// ============================================

#[test]
fn test_disabled_filter_is_whole_dataset() {
    let ds = rpm_series(&[900.0, 800.0, 3000.0], 0.1);
    let config = FilterConfig {
        enabled: false,
        ..FilterConfig::default()
    };
    let ranges = detect_ranges(&ds, &config);
    assert_eq!(ranges.len(), 1);
    assert_eq!((ranges[0].start, ranges[0].end), (0, 3));
    assert_eq!(ranges[0].min_rpm, 800.0);
    assert_eq!(ranges[0].max_rpm, 3000.0);
}

#[test]
fn test_empty_and_rpm_less_datasets() {
    assert!(detect_ranges(&Dataset::default(), &FilterConfig::default()).is_empty());

    let rows = (0..10)
        .map(|i| Row::new().with("TIME", i as f64))
        .collect();
    assert!(detect_ranges(&Dataset::new(rows), &FilterConfig::default()).is_empty());
}

#[test]
fn test_ranges_are_ordered_and_disjoint() {
    let mut rpm = Vec::new();
    for _ in 0..4 {
        rpm.extend((0..8).map(|i| 2000.0 + 400.0 * i as f64));
        rpm.extend([1500.0, 1200.0]);
    }
    let ranges = detect_ranges(&rpm_series(&rpm, 0.1), &open_filter(1500.0, 5));
    assert_eq!(ranges.len(), 4);
    for pair in ranges.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
}
