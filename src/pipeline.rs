//! One-call orchestration: raw headers in, pulls and metrics out.
//!
//! Each dataset is smoothed once and every stage reads that copy.
//! Datasets are independent, so [`Pipeline::analyze_all`] fans out across
//! them on the rayon thread pool. Each dataset's range scan still runs on a
//! single thread.

use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::fats::compute_time;
use crate::analysis::filters::presmooth;
use crate::analysis::power::{PowerAnalyzer, WHP_CHANNEL};
use crate::analysis::ranges::{scan_ranges, RejectedRange};
use crate::analysis::{AnalysisError, Analyzer};
use crate::dataset::{Dataset, Range, RPM_CHANNEL};
use crate::normalize::{canonicalize, dedupe_names, split_unit_suffix, LoggerDialect};
use crate::settings::AnalysisSettings;
use crate::units::resolve_units;

/// A canonicalized dataset with one unit label per column
#[derive(Clone, Debug)]
pub struct Ingested {
    pub dataset: Dataset,
    /// Canonical column names in header order (empty for dropped columns)
    pub names: Vec<String>,
    pub units: Vec<String>,
}

/// Canonicalize raw headers and build a dataset from row-major records.
///
/// A `"Name (unit)"` alias target contributes its unit; otherwise the
/// logger's own unit label is normalized, and failing that the unit is
/// guessed from the canonical name.
pub fn ingest<S: AsRef<str>>(
    raw_headers: &[S],
    raw_units: &[Option<String>],
    records: &[Vec<f64>],
    dialect: LoggerDialect,
) -> Ingested {
    let mut names = Vec::with_capacity(raw_headers.len());
    let mut units: Vec<Option<String>> = Vec::with_capacity(raw_headers.len());
    for (i, canonical) in canonicalize(raw_headers, dialect).into_iter().enumerate() {
        let (name, suffix) = split_unit_suffix(&canonical);
        units.push(suffix.or_else(|| raw_units.get(i).cloned().flatten()));
        names.push(name);
    }
    let names = dedupe_names(&names);
    let units = resolve_units(&names, &units);
    let dataset = Dataset::from_records(&names, records).with_dialect(dialect);

    tracing::info!(
        "Ingested {} rows, {} columns ({})",
        dataset.len(),
        dataset.column_names().len(),
        dialect
    );
    Ingested {
        dataset,
        names,
        units,
    }
}

/// Metrics for one detected pull
#[derive(Clone, Debug, Serialize)]
pub struct PullSummary {
    pub range: Range,
    /// FATS seconds, or why it could not be computed
    pub fats: Result<f64, String>,
    /// Peak wheel horsepower inside the pull
    pub peak_whp: Option<f64>,
    /// RPM at the WHP peak
    pub peak_rpm: Option<f64>,
}

/// Everything the pipeline derives from one dataset
#[derive(Clone, Debug, Serialize)]
pub struct DatasetReport {
    pub pulls: Vec<PullSummary>,
    #[serde(skip)]
    pub rejected: Vec<RejectedRange>,
    /// SAE factor applied to power (1.0 when disabled)
    pub sae_factor: f64,
}

/// Runs smoothing, range detection, derived power, FATS and SAE with one
/// settings snapshot.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    settings: AnalysisSettings,
}

impl Pipeline {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    fn power_analyzer(&self) -> PowerAnalyzer {
        PowerAnalyzer {
            vehicle: self.settings.vehicle.clone(),
            sae_factor: self.settings.sae.factor(),
            smoothing: self.settings.filter.hptq_maw,
        }
    }

    /// Copy of `dataset` with derived power channels, if they can be computed.
    pub fn with_power(&self, dataset: &Dataset) -> Option<Dataset> {
        let analyzer = self.power_analyzer();
        if !analyzer.is_available(dataset) {
            return None;
        }
        match analyzer.apply(dataset) {
            Ok(out) => Some(out),
            Err(e) => {
                tracing::warn!("{} skipped: {}", analyzer.name(), e);
                None
            }
        }
    }

    /// Smooth once, then detect pulls and measure FATS and power on the
    /// same smoothed samples.
    pub fn analyze(&self, dataset: &Dataset) -> DatasetReport {
        let settings = &self.settings;
        let smoothed = presmooth(dataset, &settings.filter);
        let dataset: &Dataset = &smoothed;
        let report = scan_ranges(dataset, &settings.filter);
        let powered = self.with_power(dataset);

        let pulls = report
            .accepted
            .iter()
            .map(|range| {
                let fats = compute_time(range, dataset, &settings.fats, settings.vehicle.rpm_per_mph)
                    .map_err(|e: AnalysisError| e.to_string());
                let peak = powered.as_ref().and_then(|ds| peak_power(ds, range));
                PullSummary {
                    range: *range,
                    fats,
                    peak_whp: peak.map(|(whp, _)| whp),
                    peak_rpm: peak.map(|(_, rpm)| rpm),
                }
            })
            .collect();

        DatasetReport {
            pulls,
            rejected: report.rejected,
            sae_factor: settings.sae.factor(),
        }
    }

    /// [`Pipeline::analyze`] for many datasets in parallel, in input order.
    pub fn analyze_all(&self, datasets: &[Dataset]) -> Vec<DatasetReport> {
        datasets.par_iter().map(|ds| self.analyze(ds)).collect()
    }
}

/// (WHP, RPM) at the highest WHP row inside `range`
fn peak_power(dataset: &Dataset, range: &Range) -> Option<(f64, f64)> {
    range
        .indices()
        .filter_map(|i| Some((dataset.value(i, WHP_CHANNEL)?, dataset.value(i, RPM_CHANNEL)?)))
        .max_by(|a, b| a.0.total_cmp(&b.0))
}
