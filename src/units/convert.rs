//! Conversion between the US customary and metric unit of a quantity.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use thiserror::Error;

use super::constants::*;

/// Errors raised by unit conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("Unit '{unit}' does not belong to {quantity}")]
    InvalidUnit {
        unit: String,
        quantity: ConvertibleQuantity,
    },
}

/// Zero-argument source of ambient pressure in mBar. May decline to answer.
pub type AmbientProvider<'a> = &'a dyn Fn() -> Option<f64>;

/// A physical quantity with one US customary and one metric unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum ConvertibleQuantity {
    /// PSI gauge <-> mBar absolute
    #[strum(to_string = "boost pressure")]
    PressureBoost,
    /// PSI gauge <-> mBar gauge
    #[strum(to_string = "gauge boost pressure")]
    PressureBoostGauge,
    #[strum(to_string = "speed")]
    Speed,
    #[strum(to_string = "torque")]
    Torque,
    #[strum(to_string = "temperature")]
    Temperature,
}

impl ConvertibleQuantity {
    pub fn us_customary(&self) -> &'static str {
        match self {
            ConvertibleQuantity::PressureBoost | ConvertibleQuantity::PressureBoostGauge => {
                UNIT_PSI
            }
            ConvertibleQuantity::Speed => UNIT_MPH,
            ConvertibleQuantity::Torque => UNIT_FTLB,
            ConvertibleQuantity::Temperature => UNIT_FAHRENHEIT,
        }
    }

    pub fn metric(&self) -> &'static str {
        match self {
            ConvertibleQuantity::PressureBoost => UNIT_MBAR,
            ConvertibleQuantity::PressureBoostGauge => UNIT_MBAR_GAUGE,
            ConvertibleQuantity::Speed => UNIT_KMH,
            ConvertibleQuantity::Torque => UNIT_NM,
            ConvertibleQuantity::Temperature => UNIT_CELSIUS,
        }
    }

    pub fn has_unit(&self, unit: &str) -> bool {
        unit == self.us_customary() || unit == self.metric()
    }

    /// Whether converting needs the ambient pressure
    pub fn needs_ambient(&self) -> bool {
        matches!(self, ConvertibleQuantity::PressureBoost)
    }

    /// First quantity declaring `unit`. "PSI" resolves to absolute boost.
    pub fn for_unit(unit: &str) -> Option<Self> {
        Self::iter().find(|q| q.has_unit(unit))
    }

    /// The other unit of this quantity.
    pub fn alternate(&self, unit: &str) -> Result<&'static str, UnitError> {
        if unit == self.us_customary() {
            Ok(self.metric())
        } else if unit == self.metric() {
            Ok(self.us_customary())
        } else {
            Err(self.invalid(unit))
        }
    }

    fn invalid(&self, unit: &str) -> UnitError {
        UnitError::InvalidUnit {
            unit: unit.to_string(),
            quantity: *self,
        }
    }

    /// Convert one value to the metric unit. `ambient` is in mBar.
    fn to_metric(&self, v: f64, ambient: f64) -> f64 {
        match self {
            ConvertibleQuantity::PressureBoost => v * MBAR_PER_PSI + ambient,
            ConvertibleQuantity::PressureBoostGauge => v * MBAR_PER_PSI,
            ConvertibleQuantity::Speed => v * KMH_PER_MPH,
            ConvertibleQuantity::Torque => v * NM_PER_FTLB,
            ConvertibleQuantity::Temperature => {
                (v - CELSIUS_TO_FAHRENHEIT_OFFSET) / CELSIUS_TO_FAHRENHEIT_FACTOR
            }
        }
    }

    /// Convert one value to the US customary unit. `ambient` is in mBar.
    fn to_us_customary(&self, v: f64, ambient: f64) -> f64 {
        match self {
            ConvertibleQuantity::PressureBoost => (v - ambient) / MBAR_PER_PSI,
            ConvertibleQuantity::PressureBoostGauge => v / MBAR_PER_PSI,
            ConvertibleQuantity::Speed => v * MPH_PER_KMH,
            ConvertibleQuantity::Torque => v * FTLB_PER_NM,
            ConvertibleQuantity::Temperature => {
                v * CELSIUS_TO_FAHRENHEIT_FACTOR + CELSIUS_TO_FAHRENHEIT_OFFSET
            }
        }
    }
}

/// The opposite-system unit for a unit label, if it belongs to any quantity.
pub fn alternate_unit(unit: &str) -> Option<&'static str> {
    ConvertibleQuantity::for_unit(unit).and_then(|q| q.alternate(unit).ok())
}

/// Ambient pressure in mBar from an optional provider, standard atmosphere otherwise.
pub fn ambient_pressure_mbar(provider: Option<AmbientProvider<'_>>) -> f64 {
    provider.and_then(|p| p()).unwrap_or(MBAR_PER_ATM)
}

/// Convert `values` from `from` to `to`, both of which must be units of `quantity`.
///
/// The input is never modified. The ambient provider is consulted at most
/// once per call, and only for quantities that need it.
pub fn convert(
    values: &[f64],
    from: &str,
    to: &str,
    quantity: ConvertibleQuantity,
    ambient: Option<AmbientProvider<'_>>,
) -> Result<Vec<f64>, UnitError> {
    if !quantity.has_unit(from) {
        return Err(quantity.invalid(from));
    }
    if !quantity.has_unit(to) {
        return Err(quantity.invalid(to));
    }
    if from == to {
        return Ok(values.to_vec());
    }

    let ambient = if quantity.needs_ambient() {
        ambient_pressure_mbar(ambient)
    } else {
        MBAR_PER_ATM
    };

    let out = if to == quantity.metric() {
        values
            .iter()
            .map(|&v| quantity.to_metric(v, ambient))
            .collect()
    } else {
        values
            .iter()
            .map(|&v| quantity.to_us_customary(v, ambient))
            .collect()
    };
    Ok(out)
}
