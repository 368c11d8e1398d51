//! Analysis of canonical datasets.
//!
//! This module holds the algorithms that run after canonicalization:
//! - [`ranges`]: single-pass detection of monotonic RPM pulls
//! - [`fats`]: elapsed time between two speed/RPM thresholds inside a pull
//! - [`sae`]: SAE power correction factor for ambient conditions
//! - [`filters`] and [`power`]: channel-producing analyzers (smoothing, derived HP/TQ)
//!
//! Channel-producing algorithms implement the [`Analyzer`] trait so the
//! pipeline can run them uniformly and append their outputs to a copy of the
//! dataset.

pub mod fats;
pub mod filters;
pub mod power;
pub mod ranges;
pub mod sae;

use crate::dataset::Dataset;
use crate::units::UnitError;
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A FATS threshold was never crossed inside the range
    #[error("{which} threshold of {rpm:.0} RPM not reached")]
    ThresholdNotReached { which: &'static str, rpm: f64 },
    /// An unrecognized speed unit tag
    #[error("Unsupported speed unit: {0}")]
    UnsupportedSpeedUnit(String),
    /// A required channel is missing from the dataset
    #[error("Missing required channel: {0}")]
    MissingChannel(String),
    /// Invalid parameter configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Metadata about analysis results
#[derive(Clone, Debug, Default)]
pub struct AnalysisMetadata {
    /// Name of the algorithm used
    pub algorithm: String,
    /// Key parameters and their values
    pub parameters: Vec<(String, String)>,
    /// Warning messages about the analysis
    pub warnings: Vec<String>,
    /// Time taken for computation in milliseconds
    pub computation_time_ms: u64,
}

/// One computed channel
#[derive(Clone, Debug)]
pub struct AnalysisResult {
    /// Channel name the values are stored under
    pub name: String,
    /// Unit for the result values
    pub unit: String,
    /// One value per row, NaN where the row has none
    pub values: Vec<f64>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            values,
            metadata: AnalysisMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: AnalysisMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.metadata.warnings.is_empty()
    }
}

/// A channel-producing algorithm
pub trait Analyzer: Send + Sync {
    /// Unique identifier for this analyzer
    fn id(&self) -> &str;

    /// Human-readable algorithm name
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Channels that must be present for [`Analyzer::analyze`] to succeed
    fn required_channels(&self) -> Vec<&str>;

    /// Compute output channels, one value per row each
    fn analyze(&self, dataset: &Dataset) -> Result<Vec<AnalysisResult>, AnalysisError>;

    /// Whether every required channel is present
    fn is_available(&self, dataset: &Dataset) -> bool {
        self.required_channels()
            .iter()
            .all(|ch| dataset.has_channel(ch))
    }

    /// Copy of `dataset` with every output channel written in (replacing
    /// same-named columns)
    fn apply(&self, dataset: &Dataset) -> Result<Dataset, AnalysisError> {
        let results = self.analyze(dataset)?;
        let mut out = dataset.clone();
        for result in results {
            for warning in &result.metadata.warnings {
                tracing::warn!("{}: {}", self.name(), warning);
            }
            let values: Vec<Option<f64>> = result
                .values
                .into_iter()
                .map(|v| (!v.is_nan()).then_some(v))
                .collect();
            out.set_channel(&result.name, &values);
        }
        Ok(out)
    }
}

/// Helper function to measure analysis execution time
pub fn timed_analyze<F, T>(f: F) -> (T, u64)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_millis() as u64;
    (result, elapsed)
}

/// Values of a channel every row carries, or `MissingChannel`
pub fn require_channel(dataset: &Dataset, name: &str) -> Result<Vec<f64>, AnalysisError> {
    dataset
        .dense_channel(name)
        .filter(|_| dataset.has_channel(name))
        .ok_or_else(|| AnalysisError::MissingChannel(name.to_string()))
}
