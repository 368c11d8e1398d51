//! Physical conversion factors and unit labels.

// Speed
pub const MPH_PER_KMH: f64 = 0.621371192;
pub const KMH_PER_MPH: f64 = 1.0 / MPH_PER_KMH;
/// mph per m/s
pub const MPH_PER_MPS: f64 = 3.6 * MPH_PER_KMH;

// Pressure
pub const PSI_PER_BAR: f64 = 14.5038;
pub const MBAR_PER_PSI: f64 = 1000.0 / PSI_PER_BAR;
/// Standard atmosphere
pub const MBAR_PER_ATM: f64 = 1013.25;

// Temperature
pub const CELSIUS_TO_FAHRENHEIT_FACTOR: f64 = 1.8;
pub const CELSIUS_TO_FAHRENHEIT_OFFSET: f64 = 32.0;

// Power and torque
/// HP = torque(ft-lb) * rpm / 5252
pub const HP_CALCULATION_FACTOR: f64 = 5252.0;
pub const WATTS_PER_HP: f64 = 745.699872;
pub const FTLB_PER_NM: f64 = 0.737562149;
pub const NM_PER_FTLB: f64 = 1.0 / FTLB_PER_NM;

// Mass flow
pub const KGH_PER_GPS: f64 = 3.6;

pub const STOICHIOMETRIC_AFR: f64 = 14.7;
/// m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;
/// kg/m³ at sea level, 0 °C
pub const AIR_DENSITY: f64 = 1.293;

// Unit labels
pub const UNIT_PSI: &str = "PSI";
pub const UNIT_MBAR: &str = "mBar";
pub const UNIT_MBAR_GAUGE: &str = "mBar gauge";
pub const UNIT_MPH: &str = "mph";
pub const UNIT_KMH: &str = "km/h";
pub const UNIT_FTLB: &str = "ft-lb";
pub const UNIT_NM: &str = "Nm";
pub const UNIT_FAHRENHEIT: &str = "°F";
pub const UNIT_CELSIUS: &str = "°C";
pub const UNIT_RPM: &str = "RPM";
pub const UNIT_SECONDS: &str = "s";
pub const UNIT_PERCENT: &str = "%";
pub const UNIT_DEGREES: &str = "°";
pub const UNIT_VOLTS: &str = "V";
pub const UNIT_MS: &str = "ms";
pub const UNIT_GPS: &str = "g/sec";
pub const UNIT_AFR: &str = "AFR";
pub const UNIT_LAMBDA: &str = "lambda";
pub const UNIT_HP: &str = "HP";
