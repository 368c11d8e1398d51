//! dynolog - canonicalization, unit conversion and pull analysis for
//! automotive datalogs
//!
//! This library takes the tabular output of a log reader, rewrites each
//! logger's column names to canonical ones, resolves and converts physical
//! units, finds wide-open-throttle pulls and computes performance metrics
//! over them.
//!
//! ## Module Structure
//!
//! - [`dataset`] - Row, Dataset and Range data model
//! - [`normalize`] - Per-dialect column name canonicalization
//! - [`units`] - Unit constants, name-to-unit resolution and conversion
//! - [`analysis`] - Pull detection, FATS, SAE correction, smoothing, derived power
//! - [`settings`] - Analysis settings persistence
//! - [`pipeline`] - End-to-end orchestration across datasets

pub mod analysis;
pub mod dataset;
pub mod normalize;
pub mod pipeline;
pub mod settings;
pub mod units;

pub use dataset::{Dataset, Range, Row};
pub use normalize::{canonicalize, LoggerDialect};
pub use units::{convert, unit_for, ConvertibleQuantity};
