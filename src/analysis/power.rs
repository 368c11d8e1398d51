//! Derived wheel power and torque.
//!
//! Road speed is reconstructed from RPM through the gearing ratio, so the
//! calculation only needs the RPM and TIME channels plus the vehicle
//! constants. The resulting WHP channel is what the HPTQMAW window smooths.

use serde::{Deserialize, Serialize};

use super::filters::moving_average;
use super::*;
use crate::dataset::{RPM_CHANNEL, TIME_CHANNEL};
use crate::units::constants::{
    AIR_DENSITY, HP_CALCULATION_FACTOR, MPH_PER_MPS, STANDARD_GRAVITY, UNIT_FTLB, UNIT_HP,
    WATTS_PER_HP,
};

pub const WHP_CHANNEL: &str = "WHP";
pub const HP_CHANNEL: &str = "HP";
pub const WTQ_CHANNEL: &str = "WTQ";
pub const TQ_CHANNEL: &str = "TQ";

/// Vehicle constants for the road-load power model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConstants {
    /// kg, including driver
    pub mass: f64,
    /// Engine RPM per mph in the logged gear
    pub rpm_per_mph: f64,
    /// Drag coefficient
    pub cd: f64,
    /// m²
    pub frontal_area: f64,
    /// Rolling resistance coefficient
    pub rolling_drag: f64,
    /// HP added after driveline loss
    pub static_loss: f64,
    /// Fraction of crank power lost in the driveline
    pub driveline_loss: f64,
}

impl Default for VehicleConstants {
    fn default() -> Self {
        Self {
            mass: 1700.0,
            rpm_per_mph: 72.1,
            cd: 0.31,
            frontal_area: 2.034,
            rolling_drag: 0.015,
            static_loss: 0.0,
            driveline_loss: 0.25,
        }
    }
}

impl VehicleConstants {
    /// Aerodynamic plus rolling drag in watts at `v` m/s
    pub fn drag_watts(&self, v: f64) -> f64 {
        let aero = 0.5 * AIR_DENSITY * self.cd * self.frontal_area * v.powi(3);
        let rolling = self.rolling_drag * self.mass * STANDARD_GRAVITY * v;
        aero + rolling
    }
}

/// WHP/HP/WTQ/TQ from RPM and TIME
#[derive(Clone, Debug)]
pub struct PowerAnalyzer {
    pub vehicle: VehicleConstants,
    /// SAE factor applied to wheel power (1.0 for none)
    pub sae_factor: f64,
    /// HPTQMAW smoothing width in samples
    pub smoothing: usize,
}

impl Default for PowerAnalyzer {
    fn default() -> Self {
        Self {
            vehicle: VehicleConstants::default(),
            sae_factor: 1.0,
            smoothing: 5,
        }
    }
}

impl Analyzer for PowerAnalyzer {
    fn id(&self) -> &str {
        "derived_power"
    }

    fn name(&self) -> &str {
        "Derived Power"
    }

    fn description(&self) -> &str {
        "Wheel and crank horsepower and torque computed from RPM acceleration \
         with a road-load model (mass, drag, rolling resistance)."
    }

    fn required_channels(&self) -> Vec<&str> {
        vec![RPM_CHANNEL, TIME_CHANNEL]
    }

    fn analyze(&self, dataset: &Dataset) -> Result<Vec<AnalysisResult>, AnalysisError> {
        let rpm = require_channel(dataset, RPM_CHANNEL)?;
        let time = require_channel(dataset, TIME_CHANNEL)?;

        if self.vehicle.rpm_per_mph <= 0.0 {
            return Err(AnalysisError::InvalidParameter(
                "rpm_per_mph must be positive".to_string(),
            ));
        }
        if self.vehicle.driveline_loss >= 1.0 {
            return Err(AnalysisError::InvalidParameter(
                "driveline_loss must be below 1".to_string(),
            ));
        }

        let (channels, computation_time) = timed_analyze(|| self.compute(&rpm, &time));
        let [whp, hp, wtq, tq] = channels;

        let label = if self.sae_factor != 1.0 { " (SAE)" } else { "" };
        let metadata = AnalysisMetadata {
            algorithm: "Road-load power".to_string(),
            parameters: vec![
                ("mass".to_string(), format!("{:.0}", self.vehicle.mass)),
                (
                    "rpm_per_mph".to_string(),
                    format!("{:.2}", self.vehicle.rpm_per_mph),
                ),
                ("sae_factor".to_string(), format!("{:.4}", self.sae_factor)),
                ("smoothing".to_string(), self.smoothing.to_string()),
            ],
            warnings: vec![],
            computation_time_ms: computation_time,
        };

        Ok(vec![
            AnalysisResult::new(WHP_CHANNEL, format!("{}{}", UNIT_HP, label), whp)
                .with_metadata(metadata.clone()),
            AnalysisResult::new(HP_CHANNEL, format!("{}{}", UNIT_HP, label), hp)
                .with_metadata(metadata.clone()),
            AnalysisResult::new(WTQ_CHANNEL, format!("{}{}", UNIT_FTLB, label), wtq)
                .with_metadata(metadata.clone()),
            AnalysisResult::new(TQ_CHANNEL, format!("{}{}", UNIT_FTLB, label), tq)
                .with_metadata(metadata),
        ])
    }
}

impl PowerAnalyzer {
    /// `[WHP, HP, WTQ, TQ]`
    pub fn compute(&self, rpm: &[f64], time: &[f64]) -> [Vec<f64>; 4] {
        let v = self.velocity(rpm);
        let accel: Vec<f64> = derivative(&v, time).into_iter().map(|a| a.max(0.0)).collect();

        let raw_whp: Vec<f64> = accel
            .iter()
            .zip(&v)
            .map(|(a, v)| {
                let watts = a * v * self.vehicle.mass + self.vehicle.drag_watts(*v);
                watts / WATTS_PER_HP * self.sae_factor
            })
            .collect();
        let whp = moving_average(&raw_whp, self.smoothing);

        let hp: Vec<f64> = whp
            .iter()
            .map(|w| w / (1.0 - self.vehicle.driveline_loss) + self.vehicle.static_loss)
            .collect();
        let wtq = torque(&whp, rpm);
        let tq = torque(&hp, rpm);
        [whp, hp, wtq, tq]
    }

    /// Road speed in m/s
    pub fn velocity(&self, rpm: &[f64]) -> Vec<f64> {
        rpm.iter()
            .map(|r| r / self.vehicle.rpm_per_mph / MPH_PER_MPS)
            .collect()
    }
}

/// ft-lb from HP, 0 where RPM is 0
fn torque(hp: &[f64], rpm: &[f64]) -> Vec<f64> {
    hp.iter()
        .zip(rpm)
        .map(|(p, r)| {
            if *r == 0.0 {
                0.0
            } else {
                p * HP_CALCULATION_FACTOR / r
            }
        })
        .collect()
}

/// dy/dx by central difference, one-sided at the ends. 0 where dx is 0.
pub fn derivative(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len().min(x.len());
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(n - 1);
            let dx = x[hi] - x[lo];
            if dx == 0.0 {
                0.0
            } else {
                (y[hi] - y[lo]) / dx
            }
        })
        .collect()
}
