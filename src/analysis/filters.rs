//! Moving-average smoothing.
//!
//! The filter is centered with an odd window and truncated at the edges, so
//! it never shifts a channel in time. Rows without a value are skipped when
//! averaging and stay without a value.

use super::ranges::FilterConfig;
use super::*;
use crate::dataset::TIME_CHANNEL;
use crate::normalize::{LoggerDialect, GEAR_CHANNELS};
use std::borrow::Cow;

/// Prefix of channels recorded by a Zeitronix wideband.
pub const ZEITRONIX_PREFIX: &str = "Zeitronix ";

/// Moving Average filter analyzer
///
/// Smooths each listed channel and writes the result back under the same
/// name.
#[derive(Clone, Debug)]
pub struct MovingAverageAnalyzer {
    /// Channels to filter
    pub channels: Vec<String>,
    /// Window size in samples
    pub window_size: usize,
}

impl Default for MovingAverageAnalyzer {
    fn default() -> Self {
        Self {
            channels: vec!["RPM".to_string()],
            window_size: 5,
        }
    }
}

impl Analyzer for MovingAverageAnalyzer {
    fn id(&self) -> &str {
        "moving_average"
    }

    fn name(&self) -> &str {
        "Moving Average"
    }

    fn description(&self) -> &str {
        "Centered moving average for smoothing noisy signals. \
         Averages the N samples around each point."
    }

    fn required_channels(&self) -> Vec<&str> {
        self.channels.iter().map(String::as_str).collect()
    }

    fn analyze(&self, dataset: &Dataset) -> Result<Vec<AnalysisResult>, AnalysisError> {
        let mut results = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let data = dataset
                .channel(channel)
                .ok_or_else(|| AnalysisError::MissingChannel(channel.clone()))?;

            let (values, computation_time) =
                timed_analyze(|| moving_average_sparse(&data, self.window_size));

            results.push(
                AnalysisResult::new(
                    channel.clone(),
                    "",
                    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
                )
                .with_metadata(AnalysisMetadata {
                    algorithm: "Centered Moving Average".to_string(),
                    parameters: vec![
                        ("window_size".to_string(), self.window_size.to_string()),
                        ("channel".to_string(), channel.clone()),
                    ],
                    warnings: vec![],
                    computation_time_ms: computation_time,
                }),
            );
        }
        Ok(results)
    }
}

// ============================================================================
// Core filter implementations
// ============================================================================

/// Odd window actually used for a requested width
#[inline]
fn effective_window(window_size: usize) -> usize {
    window_size | 1
}

/// Centered moving average over a dense series.
///
/// Width 0 or 1 returns the input unchanged; even widths are widened by one.
pub fn moving_average(data: &[f64], window_size: usize) -> Vec<f64> {
    let sparse: Vec<Option<f64>> = data.iter().copied().map(Some).collect();
    moving_average_sparse(&sparse, window_size)
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect()
}

/// Centered moving average over a series with holes.
pub fn moving_average_sparse(data: &[Option<f64>], window_size: usize) -> Vec<Option<f64>> {
    let window = effective_window(window_size);
    if data.is_empty() || window <= 1 {
        return data.to_vec();
    }
    let half = window / 2;

    // prefix[i] = (sum, count) over data[..i]
    let mut prefix: Vec<(f64, usize)> = Vec::with_capacity(data.len() + 1);
    prefix.push((0.0, 0));
    for value in data {
        let (sum, count) = prefix[prefix.len() - 1];
        prefix.push(match value {
            Some(v) => (sum + v, count + 1),
            None => (sum, count),
        });
    }

    data.iter()
        .enumerate()
        .map(|(i, value)| {
            value.map(|_| {
                let lo = i.saturating_sub(half);
                let hi = (i + half + 1).min(data.len());
                let sum = prefix[hi].0 - prefix[lo].0;
                let count = prefix[hi].1 - prefix[lo].1;
                sum / count as f64
            })
        })
        .collect()
}

/// Channels the ZeitMAW window applies to. Gear is discrete and never smoothed.
pub fn zeitronix_channels(dataset: &Dataset) -> Vec<String> {
    let whole_log = dataset.dialect() == LoggerDialect::Zeitronix;
    dataset
        .column_names()
        .iter()
        .filter(|name| {
            if whole_log {
                name.as_str() != TIME_CHANNEL && !GEAR_CHANNELS.contains(&name.as_str())
            } else {
                name.starts_with(ZEITRONIX_PREFIX)
            }
        })
        .cloned()
        .collect()
}

/// Smoothing pre-pass run before range detection.
///
/// Returns the input untouched when there is nothing to smooth, otherwise a
/// smoothed copy. The caller's dataset is never modified.
pub fn presmooth<'a>(dataset: &'a Dataset, config: &FilterConfig) -> Cow<'a, Dataset> {
    if effective_window(config.zeit_maw) <= 1 {
        return Cow::Borrowed(dataset);
    }
    let channels = zeitronix_channels(dataset);
    if channels.is_empty() {
        return Cow::Borrowed(dataset);
    }

    tracing::debug!(
        "Smoothing {} channel(s) with a {}-sample window",
        channels.len(),
        effective_window(config.zeit_maw)
    );
    let analyzer = MovingAverageAnalyzer {
        channels,
        window_size: config.zeit_maw,
    };
    match analyzer.apply(dataset) {
        Ok(smoothed) => Cow::Owned(smoothed),
        Err(e) => {
            tracing::warn!("Smoothing skipped: {}", e);
            Cow::Borrowed(dataset)
        }
    }
}
