//! FATS: elapsed time between two thresholds inside one pull.
//!
//! Thresholds are entered in the active [`SpeedUnit`] and converted to RPM
//! before the search. Road speed is turned into RPM with the vehicle's
//! RPM-per-mph gearing ratio.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

use super::AnalysisError;
use crate::dataset::{Dataset, Range, RPM_CHANNEL, TIME_CHANNEL};
use crate::units::constants::{KMH_PER_MPH, MPH_PER_KMH};

/// Unit FATS thresholds are expressed in
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum SpeedUnit {
    #[default]
    #[strum(to_string = "RPM")]
    #[serde(rename = "RPM")]
    Rpm,
    #[strum(to_string = "mph")]
    #[serde(rename = "mph")]
    Mph,
    #[strum(to_string = "km/h", serialize = "kph")]
    #[serde(rename = "km/h")]
    KmH,
}

impl SpeedUnit {
    /// Parse a unit tag, failing with `UnsupportedSpeedUnit`.
    pub fn parse(tag: &str) -> Result<Self, AnalysisError> {
        Self::from_str(tag.trim())
            .map_err(|_| AnalysisError::UnsupportedSpeedUnit(tag.to_string()))
    }

    /// Whether converting to RPM needs the RPM-per-mph ratio
    pub fn requires_ratio(&self) -> bool {
        !matches!(self, SpeedUnit::Rpm)
    }

    /// Value in this unit to RPM, rounded to the nearest whole RPM.
    pub fn to_rpm(&self, value: f64, rpm_per_mph: f64) -> f64 {
        let rpm = match self {
            SpeedUnit::Rpm => value,
            SpeedUnit::Mph => value * rpm_per_mph,
            SpeedUnit::KmH => value * MPH_PER_KMH * rpm_per_mph,
        };
        rpm.round()
    }

    /// RPM to a value in this unit.
    pub fn from_rpm(&self, rpm: f64, rpm_per_mph: f64) -> f64 {
        match self {
            SpeedUnit::Rpm => rpm,
            SpeedUnit::Mph => rpm / rpm_per_mph,
            SpeedUnit::KmH => rpm / rpm_per_mph * KMH_PER_MPH,
        }
    }
}

/// Start and end threshold in one unit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub start: f64,
    pub end: f64,
}

/// FATS configuration. Every unit keeps its own thresholds so switching
/// the active unit loses nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatsConfig {
    pub speed_unit: SpeedUnit,
    pub rpm: Thresholds,
    pub mph: Thresholds,
    pub kmh: Thresholds,
}

impl Default for FatsConfig {
    fn default() -> Self {
        Self {
            speed_unit: SpeedUnit::Rpm,
            rpm: Thresholds {
                start: 4200.0,
                end: 6500.0,
            },
            mph: Thresholds {
                start: 60.0,
                end: 90.0,
            },
            kmh: Thresholds {
                start: 100.0,
                end: 150.0,
            },
        }
    }
}

impl FatsConfig {
    pub fn thresholds(&self, unit: SpeedUnit) -> Thresholds {
        match unit {
            SpeedUnit::Rpm => self.rpm,
            SpeedUnit::Mph => self.mph,
            SpeedUnit::KmH => self.kmh,
        }
    }

    fn thresholds_mut(&mut self, unit: SpeedUnit) -> &mut Thresholds {
        match unit {
            SpeedUnit::Rpm => &mut self.rpm,
            SpeedUnit::Mph => &mut self.mph,
            SpeedUnit::KmH => &mut self.kmh,
        }
    }

    /// Start threshold in the active unit
    pub fn start(&self) -> f64 {
        self.thresholds(self.speed_unit).start
    }

    /// End threshold in the active unit
    pub fn end(&self) -> f64 {
        self.thresholds(self.speed_unit).end
    }

    pub fn set_start(&mut self, value: f64) {
        let unit = self.speed_unit;
        self.thresholds_mut(unit).start = value;
    }

    pub fn set_end(&mut self, value: f64) {
        let unit = self.speed_unit;
        self.thresholds_mut(unit).end = value;
    }

    /// Active thresholds converted to RPM
    pub fn rpm_thresholds(&self, rpm_per_mph: f64) -> Result<(f64, f64), AnalysisError> {
        if self.speed_unit.requires_ratio() && (rpm_per_mph.is_nan() || rpm_per_mph <= 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "rpm_per_mph must be positive to use {} thresholds",
                self.speed_unit
            )));
        }
        Ok((
            self.speed_unit.to_rpm(self.start(), rpm_per_mph),
            self.speed_unit.to_rpm(self.end(), rpm_per_mph),
        ))
    }
}

/// First index in `indices` whose RPM is at or above `rpm`
fn first_crossing(
    dataset: &Dataset,
    mut indices: std::ops::Range<usize>,
    rpm: f64,
) -> Option<usize> {
    indices.find(|&i| dataset.value(i, RPM_CHANNEL).is_some_and(|r| r >= rpm))
}

/// Row indices of the start and end threshold crossings inside `range`.
///
/// The start is the first row at or above the start threshold; the end is
/// the first row at or after the start at or above the end threshold.
pub fn crossings(
    range: &Range,
    dataset: &Dataset,
    config: &FatsConfig,
    rpm_per_mph: f64,
) -> Result<(usize, usize), AnalysisError> {
    let (rpm_start, rpm_end) = config.rpm_thresholds(rpm_per_mph)?;
    let end = range.end.min(dataset.len());

    let i_start = first_crossing(dataset, range.start..end, rpm_start).ok_or(
        AnalysisError::ThresholdNotReached {
            which: "start",
            rpm: rpm_start,
        },
    )?;
    let i_end = first_crossing(dataset, i_start..end, rpm_end).ok_or(
        AnalysisError::ThresholdNotReached {
            which: "end",
            rpm: rpm_end,
        },
    )?;
    Ok((i_start, i_end))
}

/// Seconds between the start and end threshold crossings inside `range`.
pub fn compute_time(
    range: &Range,
    dataset: &Dataset,
    config: &FatsConfig,
    rpm_per_mph: f64,
) -> Result<f64, AnalysisError> {
    if !dataset.has_channel(TIME_CHANNEL) {
        return Err(AnalysisError::MissingChannel(TIME_CHANNEL.to_string()));
    }
    let (i_start, i_end) = crossings(range, dataset, config, rpm_per_mph)?;

    let time = |i: usize| {
        dataset
            .value(i, TIME_CHANNEL)
            .ok_or_else(|| AnalysisError::MissingChannel(TIME_CHANNEL.to_string()))
    };
    let elapsed = time(i_end)? - time(i_start)?;
    tracing::trace!("FATS rows {}..{}, {:.3}s", i_start, i_end, elapsed);

    if elapsed <= 0.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "end time not after start time (rows {}..{})",
            i_start, i_end
        )));
    }
    Ok(elapsed)
}

/// [`compute_time`] for every range, in range order.
pub fn compute_all(
    ranges: &[Range],
    dataset: &Dataset,
    config: &FatsConfig,
    rpm_per_mph: f64,
) -> Vec<Result<f64, AnalysisError>> {
    ranges
        .iter()
        .map(|range| compute_time(range, dataset, config, rpm_per_mph))
        .collect()
}
