//! Tests for per-dialect column canonicalization
//!
//! Tests cover:
//! - Built-in dialect alias tables
//! - Passthrough of unmatched headers
//! - First-match-wins precedence with custom tables
//! - Unit suffix splitting and duplicate renaming
//! - Display name formatting

use dynolog::normalize::{
    canonicalize, canonicalize_with, dedupe_names, get_display_name, has_alias,
    split_unit_suffix, AliasTable, LoggerDialect,
};
use strum::IntoEnumIterator;

// ============================================
// Built-in Dialect Tests
// ============================================

#[test]
fn test_vcds_engine_speed_variants() {
    let headers = ["Engine Speed", "Engine speed (G28)", "Motordrehzahl", "Engine RPM"];
    assert_eq!(
        canonicalize(&headers, LoggerDialect::Vcds),
        vec!["RPM", "RPM", "RPM", "RPM"]
    );
}

#[test]
fn test_vcds_boost_pair() {
    let out = canonicalize(
        &["Boost Pressure (actual)", "Boost Pressure (specified)"],
        LoggerDialect::Vcds,
    );
    assert_eq!(out, vec!["BoostPressureActual", "BoostPressureDesired"]);
}

#[test]
fn test_me7logger_names() {
    let out = canonicalize(
        &["EngineSpeed", "BoostPressureSpecified", "AtmosphericPressure"],
        LoggerDialect::Me7Logger,
    );
    assert_eq!(out, vec!["RPM", "BoostPressureDesired", "BaroPressure"]);
}

#[test]
fn test_zeitronix_prefix_wildcards() {
    let out = canonicalize(&["Zeitronix RPM", "Zeitronix AFR"], LoggerDialect::Zeitronix);
    assert_eq!(out, vec!["RPM", "AFR"]);
}

#[test]
fn test_jb4_targets_carry_units() {
    let out = canonicalize(&["timestamp", "mph", "boost", "boost2"], LoggerDialect::Jb4);
    assert_eq!(
        out,
        vec![
            "TIME",
            "VehicleSpeed (mph)",
            "BoostPressureActual (PSI)",
            "BoostPressureActual2 (PSI)"
        ]
    );
}

#[test]
fn test_cobb_info_columns_are_dropped() {
    let out = canonicalize(
        &["AP Info: [AP3-SUB-004]", "Engine Speed (RPM)"],
        LoggerDialect::CobbAp,
    );
    assert_eq!(out, vec!["", "RPM"]);
}

#[test]
fn test_unknown_dialect_uses_default_table() {
    let out = canonicalize(&["time", "engine speed", "Mass air flow"], LoggerDialect::Unknown);
    assert_eq!(out, vec!["TIME", "RPM", "MassAirFlow"]);
}

// ============================================
// Passthrough Tests
// ============================================

#[test]
fn test_unmapped_header_passes_through() {
    for dialect in LoggerDialect::iter() {
        assert_eq!(
            canonicalize(&["Unmapped_Col_X"], dialect),
            vec!["Unmapped_Col_X"],
            "dialect {}",
            dialect
        );
    }
}

#[test]
fn test_headers_are_trimmed() {
    assert_eq!(
        canonicalize(&["  Engine Speed  ", " Something "], LoggerDialect::Vcds),
        vec!["RPM", "Something"]
    );
}

#[test]
fn test_patterns_must_match_whole_header() {
    // "Zeit" is a VCDS alias, "Zeitstempel" is not
    assert_eq!(
        canonicalize(&["Zeitstempel"], LoggerDialect::Vcds),
        vec!["Zeitstempel"]
    );
}

#[test]
fn test_output_length_matches_input() {
    let headers: Vec<String> = (0..50).map(|i| format!("col{}", i)).collect();
    assert_eq!(canonicalize(&headers, LoggerDialect::Jb4).len(), 50);
    assert!(canonicalize::<&str>(&[], LoggerDialect::Jb4).is_empty());
}

// ============================================
// Precedence Tests
// ============================================

#[test]
fn test_first_match_wins() {
    let table = AliasTable::new([
        (r"Boost Pressure", "BoostA"),
        (r".*Pressure", "BoostB"),
    ])
    .unwrap();
    assert_eq!(canonicalize_with(&["Boost Pressure"], &table), vec!["BoostA"]);

    let swapped = AliasTable::new([
        (r".*Pressure", "BoostB"),
        (r"Boost Pressure", "BoostA"),
    ])
    .unwrap();
    assert_eq!(canonicalize_with(&["Boost Pressure"], &swapped), vec!["BoostB"]);
}

#[test]
fn test_invalid_custom_pattern_is_an_error() {
    assert!(AliasTable::new([("(unclosed", "X")]).is_err());
}

#[test]
fn test_has_alias() {
    assert!(has_alias("Engine Speed", LoggerDialect::Vcds));
    assert!(!has_alias("Engine Speed", LoggerDialect::Jb4));
}

// ============================================
// Unit Suffix and Dedupe Tests
// ============================================

#[test]
fn test_split_unit_suffix() {
    assert_eq!(
        split_unit_suffix("VehicleSpeed (mph)"),
        ("VehicleSpeed".to_string(), Some("mph".to_string()))
    );
    assert_eq!(split_unit_suffix("RPM"), ("RPM".to_string(), None));
}

#[test]
fn test_dedupe_names() {
    let names: Vec<String> = ["RPM", "RPM", "", "", "RPM", "TIME"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        dedupe_names(&names),
        vec!["RPM", "RPM 2", "", "", "RPM 3", "TIME"]
    );
}

// ============================================
// Display Name Tests
// ============================================

#[test]
fn test_display_name_with_original() {
    assert_eq!(
        get_display_name("Engine Speed", LoggerDialect::Vcds, true),
        "RPM (Engine Speed)"
    );
    assert_eq!(get_display_name("Engine Speed", LoggerDialect::Vcds, false), "RPM");
    assert_eq!(get_display_name("Other", LoggerDialect::Vcds, true), "Other");
}

#[test]
fn test_dialect_tags() {
    assert_eq!(LoggerDialect::from_tag("LOG_VCDS"), LoggerDialect::Vcds);
    assert_eq!(LoggerDialect::from_tag("jb4"), LoggerDialect::Jb4);
    assert_eq!(LoggerDialect::from_tag("nonsense"), LoggerDialect::Unknown);
}
