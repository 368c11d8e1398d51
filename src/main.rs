//! dynolog - analyze a canonical-ready datalog from the command line
//!
//! Usage: `dynolog <dataset.json> [dialect]`
//!
//! The dataset file holds `{"headers": [...], "units": [...], "rows": [[...], ...]}`
//! as produced by a log reader; `units` is optional and `null` cells are
//! treated as missing values.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use dynolog::normalize::LoggerDialect;
use dynolog::pipeline::{ingest, Pipeline};
use dynolog::settings::AnalysisSettings;

#[derive(Debug, Deserialize)]
struct RawDataset {
    headers: Vec<String>,
    #[serde(default)]
    units: Vec<Option<String>>,
    rows: Vec<Vec<Option<f64>>>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: dynolog <dataset.json> [dialect]");
    };
    let dialect = args
        .next()
        .map(|tag| LoggerDialect::from_tag(&tag))
        .unwrap_or_default();

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: RawDataset = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let records: Vec<Vec<f64>> = raw
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect();
    let ingested = ingest(&raw.headers, &raw.units, &records, dialect);

    let settings = AnalysisSettings::load();
    let fats_unit = settings.fats.speed_unit;
    let (fats_start, fats_end) = (settings.fats.start(), settings.fats.end());
    let pipeline = Pipeline::new(settings);
    let report = pipeline.analyze(&ingested.dataset);

    println!("Dialect: {}", dialect);
    for (name, unit) in ingested.names.iter().zip(&ingested.units) {
        if !name.is_empty() {
            println!("  {:<32} {}", name, unit);
        }
    }
    println!("SAE correction: {:.4}", report.sae_factor);
    println!(
        "FATS window: {} -> {} {}",
        fats_start, fats_end, fats_unit
    );

    if report.pulls.is_empty() {
        println!("No pulls detected");
    }
    for (i, pull) in report.pulls.iter().enumerate() {
        let fats = match &pull.fats {
            Ok(t) => format!("{:.2}s", t),
            Err(e) => e.clone(),
        };
        let peak = match (pull.peak_whp, pull.peak_rpm) {
            (Some(whp), Some(rpm)) => format!("{:.1} WHP @ {:.0}", whp, rpm),
            _ => "-".to_string(),
        };
        println!("Pull {}: {}  FATS {}  peak {}", i + 1, pull.range, fats, peak);
    }

    Ok(())
}
