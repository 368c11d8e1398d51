//! Core data types shared by every analysis stage.
//!
//! A [`Dataset`] is an ordered sequence of [`Row`]s produced by an external log
//! reader. Row order is time order. The analysis code only ever reads a
//! dataset; stages that need modified channels work on a copy.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::normalize::LoggerDialect;

/// Canonical name of the time channel (seconds).
pub const TIME_CHANNEL: &str = "TIME";

/// Canonical name of the engine speed channel.
pub const RPM_CHANNEL: &str = "RPM";

/// One timestamped sample: canonical column name -> value.
/// Columns a logger did not record for this sample are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    values: HashMap<String, f64>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Ordered, index-addressable rows sharing one canonical column set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<Row>,
    /// Column names in header order (sorted when built from bare rows)
    columns: Vec<String>,
    #[serde(default)]
    dialect: LoggerDialect,
}

impl Dataset {
    /// Build a dataset from rows. The column set is the union of every row's keys.
    pub fn new(rows: Vec<Row>) -> Self {
        let columns: BTreeSet<String> = rows
            .iter()
            .flat_map(|r| r.names().map(str::to_string))
            .collect();
        Self {
            rows,
            columns: columns.into_iter().collect(),
            dialect: LoggerDialect::Unknown,
        }
    }

    /// Build a dataset from canonical header names and row-major records.
    ///
    /// Empty names mark dropped columns and are skipped, as are NaN cells.
    /// Records shorter than the header leave the trailing columns absent.
    pub fn from_records<S: AsRef<str>>(names: &[S], records: &[Vec<f64>]) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                names
                    .iter()
                    .zip(record.iter())
                    .filter(|(name, value)| !name.as_ref().is_empty() && !value.is_nan())
                    .map(|(name, value)| (name.as_ref().to_string(), *value))
                    .collect::<Row>()
            })
            .collect();

        let mut columns: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name: &str = name.as_ref();
            if !name.is_empty() && !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }

        Self {
            rows,
            columns,
            dialect: LoggerDialect::Unknown,
        }
    }

    /// Tag the dataset with the dialect of the logger that produced it
    pub fn with_dialect(mut self, dialect: LoggerDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn dialect(&self) -> LoggerDialect {
        self.dialect
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Value of a column at a row index
    #[inline]
    pub fn value(&self, index: usize, name: &str) -> Option<f64> {
        self.rows.get(index).and_then(|r| r.get(name))
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// First candidate name present in this dataset
    pub fn find_channel<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has_channel(c))
    }

    /// Per-row values of a column, `None` where a row lacks it.
    pub fn channel(&self, name: &str) -> Option<Vec<Option<f64>>> {
        if !self.has_channel(name) {
            return None;
        }
        Some(self.rows.iter().map(|r| r.get(name)).collect())
    }

    /// Per-row values of a column that every row carries.
    pub fn dense_channel(&self, name: &str) -> Option<Vec<f64>> {
        self.rows.iter().map(|r| r.get(name)).collect()
    }

    /// Copy of this dataset with one column replaced (or added).
    /// `values` must have one entry per row; `None` removes the cell.
    pub fn with_channel(&self, name: &str, values: &[Option<f64>]) -> Dataset {
        let mut out = self.clone();
        out.set_channel(name, values);
        out
    }

    pub(crate) fn set_channel(&mut self, name: &str, values: &[Option<f64>]) {
        debug_assert_eq!(values.len(), self.rows.len());
        for (row, value) in self.rows.iter_mut().zip(values.iter()) {
            match value {
                Some(v) => row.insert(name, *v),
                None => {
                    row.remove(name);
                }
            }
        }
        if !self.has_channel(name) {
            self.columns.push(name.to_string());
        }
    }
}

/// Half-open interval `[start, end)` of row indices inside one dataset.
///
/// Only valid for the dataset snapshot it was computed from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
    pub min_rpm: f64,
    pub max_rpm: f64,
}

impl Range {
    /// Number of samples in the range
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// max RPM - min RPM observed in the range
    pub fn rpm_span(&self) -> f64 {
        self.max_rpm - self.min_rpm
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}) {:.0}-{:.0} RPM",
            self.start, self.end, self.min_rpm, self.max_rpm
        )
    }
}
