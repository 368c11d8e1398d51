//! SAE power correction to standard atmospheric conditions.

use serde::{Deserialize, Serialize};

const SEA_LEVEL_MBAR: f64 = 1013.25;
const SEA_LEVEL_KELVIN: f64 = 288.15;
const GRAVITY: f64 = 9.80665;
/// Temperature lapse rate, K/m
const LAPSE_RATE: f64 = 0.0065;
/// Universal gas constant, J/(mol·K)
const GAS_CONSTANT: f64 = 8.31432;
/// Molar mass of dry air, kg/mol
const AIR_MOLAR_MASS: f64 = 0.0289644;

/// Ambient conditions for the correction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaeConfig {
    /// Apply the correction to derived power
    pub enabled: bool,
    /// °C
    pub temperature: f64,
    /// m
    pub altitude: f64,
    /// %
    pub humidity: f64,
}

impl Default for SaeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            temperature: 25.0,
            altitude: 196.0,
            humidity: 0.0,
        }
    }
}

impl SaeConfig {
    pub fn correction(&self) -> f64 {
        correction(self.temperature, self.altitude, self.humidity)
    }

    /// The correction when enabled, 1.0 otherwise
    pub fn factor(&self) -> f64 {
        if self.enabled {
            self.correction()
        } else {
            1.0
        }
    }
}

/// Saturation vapor pressure in mBar (Magnus approximation)
pub fn vapor_pressure(temperature_c: f64) -> f64 {
    6.1078 * 10f64.powf((7.5 * temperature_c) / (237.3 + temperature_c))
}

/// Dry air pressure in mBar at an altitude with the given humidity
pub fn dry_pressure(temperature_c: f64, altitude_m: f64, humidity_pct: f64) -> f64 {
    let station = SEA_LEVEL_MBAR
        * (1.0 - LAPSE_RATE * altitude_m / SEA_LEVEL_KELVIN)
            .powf(GRAVITY * AIR_MOLAR_MASS / (GAS_CONSTANT * LAPSE_RATE));
    station - humidity_pct / 100.0 * vapor_pressure(temperature_c)
}

/// Multiplicative factor normalizing measured power to SAE conditions.
///
/// Inputs are not clamped.
pub fn correction(temperature_c: f64, altitude_m: f64, humidity_pct: f64) -> f64 {
    let pd = dry_pressure(temperature_c, altitude_m, humidity_pct);
    1.180 * (990.0 / pd) * ((temperature_c + 273.0) / 298.0).sqrt() - 0.18
}
