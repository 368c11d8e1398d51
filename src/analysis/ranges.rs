//! Pull detection.
//!
//! A pull is a contiguous run of rows where the driver is at wide open
//! throttle in the selected gear and RPM keeps climbing. Detection is one
//! sequential pass over the rows with a two-state machine:
//!
//! - **Seeking**: no candidate open. A row passing every gate opens one.
//! - **Accumulating**: a row passing every gate whose RPM is no more than
//!   `monotonic_rpm_fuzz` below the running maximum extends the candidate.
//!   Any other row closes it (exclusive end at that row) and is then
//!   re-evaluated as a possible start.
//!
//! A closed candidate becomes a [`Range`] only if its RPM span and point
//! count meet the configured minimums. The scan never looks back, so it
//! must not be split across threads.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::filters::presmooth;
use crate::dataset::{Dataset, Range, RPM_CHANNEL};
use crate::normalize::{GEAR_CHANNELS, PEDAL_CHANNELS, THROTTLE_CHANNELS};

/// Tuning parameters for pull detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// When false every row is valid and the whole dataset is one range
    pub enabled: bool,
    /// Required gear, -1 disables gear gating
    pub gear: i32,
    pub min_rpm: f64,
    pub max_rpm: f64,
    /// Minimum max-min RPM span of an accepted range
    pub min_rpm_range: f64,
    /// Allowed RPM drop below the running maximum
    pub monotonic_rpm_fuzz: f64,
    /// Percent
    pub min_pedal: f64,
    /// Percent
    pub min_throttle: f64,
    pub min_points: usize,
    /// Smoothing width for derived HP/TQ, in samples
    pub hptq_maw: usize,
    /// Smoothing width for Zeitronix channels, in samples
    pub zeit_maw: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gear: -1,
            min_rpm: 2000.0,
            max_rpm: 8000.0,
            min_rpm_range: 1200.0,
            monotonic_rpm_fuzz: 100.0,
            min_pedal: 95.0,
            min_throttle: 50.0,
            min_points: 5,
            hptq_maw: 5,
            zeit_maw: 30,
        }
    }
}

/// Why a closed candidate was discarded
#[derive(Clone, Debug, PartialEq)]
pub enum RejectReason {
    TooFewPoints { got: usize, min: usize },
    SpanTooSmall { span: f64, min: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooFewPoints { got, min } => write!(f, "points {} < {}", got, min),
            RejectReason::SpanTooSmall { span, min } => {
                write!(f, "rpm range {:.0} < {:.0}", span, min)
            }
        }
    }
}

/// A candidate that failed the acceptance test
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedRange {
    pub range: Range,
    pub reasons: Vec<RejectReason>,
}

/// Accepted ranges plus every discarded candidate
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RangeReport {
    pub accepted: Vec<Range>,
    pub rejected: Vec<RejectedRange>,
}

/// Columns backing each gate, `None` when the gate is disabled.
struct Gates {
    rpm: &'static str,
    gear: Option<&'static str>,
    pedal: Option<&'static str>,
    throttle: Option<&'static str>,
}

impl Gates {
    fn resolve(dataset: &Dataset, config: &FilterConfig) -> Gates {
        let gear = if config.gear < 0 {
            None
        } else {
            find_role(dataset, GEAR_CHANNELS, "gear")
        };
        Gates {
            rpm: RPM_CHANNEL,
            gear,
            pedal: find_role(dataset, PEDAL_CHANNELS, "pedal"),
            throttle: find_role(dataset, THROTTLE_CHANNELS, "throttle"),
        }
    }

    /// RPM of row `i` if it passes every gate, otherwise the failed checks.
    fn check(&self, dataset: &Dataset, config: &FilterConfig, i: usize) -> Result<f64, Vec<String>> {
        let mut failures = Vec::new();

        if let Some(col) = self.gear {
            match dataset.value(i, col) {
                Some(g) if g.round() as i32 == config.gear => {}
                Some(g) => failures.push(format!("gear {} != {}", g, config.gear)),
                None => failures.push(format!("no {}", col)),
            }
        }
        if let Some(col) = self.pedal {
            match dataset.value(i, col) {
                Some(p) if p >= config.min_pedal => {}
                Some(p) => failures.push(format!("pedal {:.1} < {:.1}", p, config.min_pedal)),
                None => failures.push(format!("no {}", col)),
            }
        }
        if let Some(col) = self.throttle {
            match dataset.value(i, col) {
                Some(t) if t >= config.min_throttle => {}
                Some(t) => failures.push(format!(
                    "throttle {:.1} < {:.1}",
                    t, config.min_throttle
                )),
                None => failures.push(format!("no {}", col)),
            }
        }

        let rpm = dataset.value(i, self.rpm);
        match rpm {
            Some(r) if r < config.min_rpm => {
                failures.push(format!("rpm {:.0} < {:.0}", r, config.min_rpm))
            }
            Some(r) if r > config.max_rpm => {
                failures.push(format!("rpm {:.0} > {:.0}", r, config.max_rpm))
            }
            Some(_) => {}
            None => failures.push("no RPM".to_string()),
        }

        match rpm {
            Some(r) if failures.is_empty() => Ok(r),
            _ => Err(failures),
        }
    }
}

/// First candidate column present with at least one nonzero value.
/// An all-zero column means the logger did not really record it.
fn find_role<'a>(dataset: &Dataset, candidates: &[&'a str], role: &str) -> Option<&'a str> {
    let found = candidates.iter().copied().find(|name| {
        dataset
            .channel(name)
            .is_some_and(|values| values.iter().flatten().any(|v| *v != 0.0))
    });
    if found.is_none() {
        tracing::debug!("No {} channel, {} gate disabled", role, role);
    }
    found
}

/// Open candidate while accumulating
struct Candidate {
    start: usize,
    min_rpm: f64,
    max_rpm: f64,
}

impl Candidate {
    fn open(start: usize, rpm: f64) -> Self {
        Self {
            start,
            min_rpm: rpm,
            max_rpm: rpm,
        }
    }

    fn absorb(&mut self, rpm: f64) {
        self.min_rpm = self.min_rpm.min(rpm);
        self.max_rpm = self.max_rpm.max(rpm);
    }

    fn close(self, end: usize) -> Range {
        Range {
            start: self.start,
            end,
            min_rpm: self.min_rpm,
            max_rpm: self.max_rpm,
        }
    }
}

fn acceptance(range: &Range, config: &FilterConfig) -> Vec<RejectReason> {
    let mut reasons = Vec::new();
    if range.len() < config.min_points {
        reasons.push(RejectReason::TooFewPoints {
            got: range.len(),
            min: config.min_points,
        });
    }
    if range.rpm_span() < config.min_rpm_range {
        reasons.push(RejectReason::SpanTooSmall {
            span: range.rpm_span(),
            min: config.min_rpm_range,
        });
    }
    reasons
}

fn settle(report: &mut RangeReport, range: Range, config: &FilterConfig) {
    let reasons = acceptance(&range, config);
    if reasons.is_empty() {
        tracing::debug!("Accepted range {}", range);
        report.accepted.push(range);
    } else {
        tracing::trace!(
            "Rejected range {}: {}",
            range,
            reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        report.rejected.push(RejectedRange { range, reasons });
    }
}

/// Whole-dataset range used when filtering is disabled
fn unfiltered(dataset: &Dataset) -> RangeReport {
    if dataset.is_empty() {
        return RangeReport::default();
    }
    let (min_rpm, max_rpm) = dataset
        .rows()
        .iter()
        .filter_map(|r| r.get(RPM_CHANNEL))
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 0.0));
    RangeReport {
        accepted: vec![Range {
            start: 0,
            end: dataset.len(),
            min_rpm,
            max_rpm,
        }],
        rejected: Vec::new(),
    }
}

/// Detect pulls, also returning every rejected candidate.
///
/// The ZeitMAW pre-pass runs first; range RPM bounds describe the smoothed
/// samples. Callers measuring anything inside the ranges should smooth with
/// [`presmooth`] themselves and use [`scan_ranges`] on that copy.
pub fn detect_ranges_with_report(dataset: &Dataset, config: &FilterConfig) -> RangeReport {
    if !config.enabled {
        return unfiltered(dataset);
    }
    scan_ranges(&presmooth(dataset, config), config)
}

/// The detection scan alone, over `data` exactly as given.
pub fn scan_ranges(data: &Dataset, config: &FilterConfig) -> RangeReport {
    if !config.enabled {
        return unfiltered(data);
    }
    if !data.has_channel(RPM_CHANNEL) {
        tracing::warn!("No {} channel, no ranges detected", RPM_CHANNEL);
        return RangeReport::default();
    }

    let gates = Gates::resolve(data, config);

    let mut report = RangeReport::default();
    let mut open: Option<Candidate> = None;

    for i in 0..data.len() {
        let checked = gates.check(data, config, i);

        if let Some(mut candidate) = open.take() {
            match checked {
                Ok(rpm) if rpm >= candidate.max_rpm - config.monotonic_rpm_fuzz => {
                    candidate.absorb(rpm);
                    open = Some(candidate);
                    continue;
                }
                Ok(rpm) => {
                    tracing::trace!(
                        "row {}: rpm {:.0} dropped below {:.0} - {:.0}",
                        i,
                        rpm,
                        candidate.max_rpm,
                        config.monotonic_rpm_fuzz
                    );
                }
                Err(_) => {}
            }
            settle(&mut report, candidate.close(i), config);
        }

        // seeking: this row may start a new candidate
        match checked {
            Ok(rpm) => open = Some(Candidate::open(i, rpm)),
            Err(failures) => tracing::trace!("row {}: {}", i, failures.join(", ")),
        }
    }

    if let Some(candidate) = open {
        settle(&mut report, candidate.close(data.len()), config);
    }

    tracing::info!(
        "Detected {} range(s), rejected {}",
        report.accepted.len(),
        report.rejected.len()
    );
    report
}

/// Ordered, disjoint pulls found in `dataset`.
pub fn detect_ranges(dataset: &Dataset, config: &FilterConfig) -> Vec<Range> {
    detect_ranges_with_report(dataset, config).accepted
}
