//! Physical unit resolution for canonical column names.
//!
//! Two ordered tables, both first-match-wins with full-match patterns:
//! one guesses a unit from a canonical channel name, the other rewrites the
//! unit spellings loggers write into their headers to one label per unit.

use std::sync::LazyLock;

use crate::normalize::AliasTable;

// Exact names first, wildcards after, so wildcards never shadow an exact entry.
const UNIT_LEGEND: &[(&str, &str)] = &[
    ("AcceleratorPedalPosition", "%"),
    ("AirFuelRatioDesired", "lambda"),
    ("EGTbank1", "°F"),
    ("EGTbank1OXS", "°C"),
    ("EGTbank2", "°F"),
    ("EGTbank2OXS", "°C"),
    ("FuelInjectorOnTime", "ms"),
    ("FuelInjectorDutyCycle", "%"),
    // assume C unless the logger says otherwise
    ("IntakeAirTemperature", "°C"),
    ("MassAirFlow", "g/sec"),
    ("ThrottlePlateAngle", "%"),
    ("VehicleSpeed", "km/h"),
    ("TPS", "%"),
    ("RPM", "RPM"),
    ("TIME", "s"),
    ("Time", "s"),
    ("Zeitronix TPS", "%"),
    ("Zeitronix Time", "s"),
    ("KnockVolt.*", "V"),
    ("OXSVolt.*", "V"),
    (".*BoostPressure.*", "mBar"),
    (".*DutyCycle.*", "%"),
    (".*Angle.*", "°"),
    (".*Ignition.*Retard.*", "°"),
    (".*Ignition.*Timing.*", "°"),
    (".*Load.*", "%"),
    (".*Pressure.*", "mBar"),
    (".*Voltage.*", "V"),
    (".*AFR.*", "AFR"),
    (".*AirFuelRatio.*", "AFR"),
    (".*[Ll]ambda.*", "lambda"),
];

const UNIT_SPELLINGS: &[(&str, &str)] = &[
    ("1/min", "RPM"),
    ("°KW", "°"),
    ("DK", "°"),
    ("[Dd]egrees", "°"),
    ("PED", "°"),
    ("C", "°C"),
    ("F", "°F"),
    ("mbar", "mBar"),
    ("psi", "PSI"),
    ("PSI/.*", "PSI"),
    ("rpm", "RPM"),
    ("-", ""),
];

static LEGEND: LazyLock<AliasTable> = LazyLock::new(|| AliasTable::from_static(UNIT_LEGEND));
static SPELLINGS: LazyLock<AliasTable> =
    LazyLock::new(|| AliasTable::from_static(UNIT_SPELLINGS));

/// Physical unit of a canonical column, or `""` when unknown.
///
/// Never fails: a `None` name and a name no pattern matches both resolve to
/// the empty string.
pub fn unit_for(name: Option<&str>) -> &'static str {
    let Some(name) = name else {
        return "";
    };
    let table: &'static AliasTable = &LEGEND;
    table.lookup(name).unwrap_or("")
}

/// Normalize a logger-supplied unit label (`"1/min"` -> `"RPM"`, `"mbar"` -> `"mBar"`).
/// Unrecognized labels are returned trimmed.
pub fn normalize_unit(raw: &str) -> String {
    let trimmed = raw.trim();
    match SPELLINGS.lookup(trimmed) {
        Some(unit) => unit.to_string(),
        None => trimmed.to_string(),
    }
}

/// Units for a header row.
///
/// `raw_units` is padded to the length of `names`, every entry is normalized,
/// and named columns still lacking a unit get one guessed from the name.
pub fn resolve_units<S: AsRef<str>>(names: &[S], raw_units: &[Option<String>]) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.as_ref();
            let unit = raw_units
                .get(i)
                .and_then(|u| u.as_deref())
                .map(normalize_unit)
                .unwrap_or_default();
            if !name.is_empty() && unit.is_empty() {
                let guessed = unit_for(Some(name));
                if guessed.is_empty() {
                    tracing::warn!("Can't find units for '{}'", name);
                }
                guessed.to_string()
            } else {
                unit
            }
        })
        .collect()
}
