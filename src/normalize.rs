//! Column name canonicalization across logger dialects.
//!
//! Every logger spells its channels differently ("Engine Speed", "Motordrehzahl",
//! "EngineSpeed", "rpm"). This module rewrites raw headers to canonical names
//! using one ordered alias table per [`LoggerDialect`]. Tables are evaluated
//! first-match-wins, patterns are full-match regular expressions, and a
//! rewritten name is never matched again.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Logger dialect tag, supplied by whoever read the raw file.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum LoggerDialect {
    #[strum(to_string = "ECUX", serialize = "LOG_ECUX")]
    Ecux,
    #[strum(to_string = "VCDS", serialize = "LOG_VCDS")]
    Vcds,
    #[strum(to_string = "ZEITRONIX", serialize = "LOG_ZEITRONIX")]
    Zeitronix,
    #[strum(to_string = "ME7LOGGER", serialize = "LOG_ME7LOGGER")]
    Me7Logger,
    #[strum(to_string = "EVOSCAN", serialize = "LOG_EVOSCAN")]
    EvoScan,
    #[strum(to_string = "VOLVOLOGGER", serialize = "LOG_VOLVOLOGGER")]
    VolvoLogger,
    #[strum(to_string = "LOGWORKS", serialize = "LOG_LOGWORKS")]
    LogWorks,
    #[strum(to_string = "JB4", serialize = "LOG_JB4")]
    Jb4,
    #[strum(to_string = "COBB_AP", serialize = "LOG_COBB_AP")]
    CobbAp,
    #[default]
    #[strum(to_string = "UNKNOWN", serialize = "LOG_UNKNOWN")]
    Unknown,
}

impl LoggerDialect {
    /// Parse a dialect tag. Unrecognized tags fall back to [`LoggerDialect::Unknown`].
    pub fn from_tag(tag: &str) -> Self {
        Self::from_str(tag.trim()).unwrap_or_else(|_| {
            tracing::debug!("Unrecognized logger dialect '{}', using default aliases", tag);
            LoggerDialect::Unknown
        })
    }
}

/// Ordered list of (pattern, canonical name) pairs.
#[derive(Clone, Debug)]
pub struct AliasTable {
    entries: Vec<(Regex, String)>,
}

impl AliasTable {
    /// Compile a table from ordered pairs. Patterns are anchored so they
    /// must match the whole (trimmed) header.
    pub fn new<I, P, N>(pairs: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (P, N)>,
        P: AsRef<str>,
        N: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(pattern, name)| {
                Regex::new(&format!("^(?:{})$", pattern.as_ref())).map(|re| (re, name.into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub(crate) fn from_static(pairs: &[(&str, &str)]) -> Self {
        Self::new(pairs.iter().copied()).expect("built-in pattern must compile")
    }

    /// Canonical name for an already-trimmed header, if any pattern matches.
    pub fn lookup(&self, header: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(re, _)| re.is_match(header))
            .map(|(_, name)| name.as_str())
    }

    /// Trim and rewrite a single header; unmatched headers pass through.
    pub fn apply(&self, header: &str) -> String {
        let trimmed = header.trim();
        match self.lookup(trimmed) {
            Some(name) => {
                tracing::debug!("alias '{}' -> '{}'", trimmed, name);
                name.to_string()
            }
            None => trimmed.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const ECUX_ALIASES: &[(&str, &str)] = &[
    ("BstActual", "BoostPressureActual"),
    ("BstDesired", "BoostPressureDesired"),
];

const VCDS_ALIASES: &[(&str, &str)] = &[
    ("Zeit", "TIME"),
    (r"Boost Pressure \(actual\)", "BoostPressureActual"),
    (r"Boost Pressure \(specified\)", "BoostPressureDesired"),
    ("(Engine RPM|Engine [Ss]peed|Motordrehzahl).*", "RPM"),
    ("Idle (RPM|[Ss]peed).*", "Idle RPM"),
    ("Throttle [Aa]ngle.*", "ThrottleAngle"),
    ("Throttle [Vv]alve [Aa]ngle.*", "ThrottleAngle"),
    ("Mass [Aa]ir [Ff]low.*", "MassAirFlow"),
    ("Mass [Aa]ir [Tt]aken [Ii]n.*", "MassAirFlow"),
    ("Mass Flow", "MassAirFlow"),
    ("Ign timing.*", "IgnitionTimingAngle"),
];

const ZEITRONIX_ALIASES: &[(&str, &str)] = &[
    (".*RPM", "RPM"),
    (".*Boost", "Boost"),
    (".*TPS", "TPS"),
    (".*AFR", "AFR"),
    (".*Lambda", "Lambda"),
    (".*EGT", "EGT"),
];

const ME7LOGGER_ALIASES: &[(&str, &str)] = &[
    ("Engine[Ss]peed", "RPM"),
    ("BoostPressureSpecified", "BoostPressureDesired"),
    ("EngineLoadCorrectedSpecified", "EngineLoadCorrected"),
    ("AtmosphericPressure", "BaroPressure"),
    ("AirFuelRatioRequired", "AirFuelRatioDesired"),
    ("InjectionTime", "EffInjectionTime"),
    ("InjectionTimeBank2", "EffInjectionTimeBank2"),
];

const EVOSCAN_ALIASES: &[(&str, &str)] = &[
    (".*RPM", "RPM"),
    ("LogEntrySeconds", "TIME"),
    ("TPS", "ThrottlePlateAngle"),
    ("APP", "AccelPedalPosition"),
    ("IAT", "IntakeAirTemperature"),
];

const VOLVOLOGGER_ALIASES: &[(&str, &str)] = &[
    ("Time", "TIME"),
    ("Engine [Ss]peed", "RPM"),
    ("(Actual )?Boost Pressure", "BoostPressureActual"),
    ("Desired Boost Pressure", "BoostPressureDesired"),
    ("Mass Air Flow", "MAF"),
];

const LOGWORKS_ALIASES: &[(&str, &str)] = &[
    ("time", "TIME"),
    ("Boost", "BoostPressureActual"),
    ("LC1_O2WB", "AFR"),
];

const JB4_ALIASES: &[(&str, &str)] = &[
    ("timestamp", "TIME"),
    ("rpm", "RPM"),
    ("pedal", "AccelPedalPosition (%)"),
    ("mph", "VehicleSpeed (mph)"),
    ("throttle", "ThrottlePlateAngle (%)"),
    ("ecu_psi", "ECUBoostPressureActual (PSI)"),
    ("dme_bt", "ECUBoostPressureDesired (PSI)"),
    ("target", "BoostPressureDesiredDelta (PSI)"),
    ("boost", "BoostPressureActual (PSI)"),
    ("boost2", "BoostPressureActual2 (PSI)"),
    ("ff", "BoostFeedForward"),
    ("map", "SelectedMap"),
    ("wgdc", "WastegateDutyCycle (%)"),
    ("iat", "IntakeAirTemperature (°F)"),
    ("fp_h", "FuelPressureHigh (PSI)"),
    ("fp_l", "FuelPressureLow (PSI)"),
    ("waterf", "WaterTemperature (°F)"),
    ("oilf", "OilTemperature (°F)"),
    ("transf", "TransmissionTemperature (°F)"),
    ("gear", "Gear"),
    ("load", "EngineLoad (%)"),
    ("calc_torque", "CalculatedTorque"),
    ("afr", "AirFuelRatio (AFR)"),
    ("afr2", "AirFuelRatio2 (AFR)"),
    ("trims", "FuelTrim (%)"),
    ("trims2", "FuelTrim2 (%)"),
    ("fuelen", "FuelEnrichment (%)"),
    ("meth", "MethanolFlow (%)"),
    ("e85", "E85"),
    ("avg_ign", "AverageIgnitionRetard"),
    ("ign_1", "IgnitionTimingAngle1"),
    ("ign_2", "IgnitionTimingAngle2"),
    ("ign_3", "IgnitionTimingAngle3"),
    ("ign_4", "IgnitionTimingAngle4"),
    ("ign_5", "IgnitionTimingAngle5"),
    ("ign_6", "IgnitionTimingAngle6"),
    ("ign_7", "IgnitionTimingAngle7"),
    ("ign_8", "IgnitionTimingAngle8"),
];

// An empty canonical name marks a column the reader should drop.
const COBB_AP_ALIASES: &[(&str, &str)] = &[
    ("AP Info:.*", ""),
    ("Time.*", "TIME"),
    ("Engine Speed.*", "RPM"),
    ("Current Gear.*", "Gear"),
    ("Accel Pedal Position.*", "AccelPedalPosition"),
    ("TPS.*", "ThrottlePlateAngle"),
    ("AFR Set Point.*", "AirFuelRatioDesired"),
    ("AFR.*", "AirFuelRatio"),
    (r"Trgt\. Boost Press\..*", "BoostPressureDesired"),
    (r"Boost Press\..*", "BoostPressureActual"),
    (r"Ambient Air Temp\..*", "AmbientTemperature (°F)"),
    (r"Coolant Temp\..*", "WaterTemperature (°F)"),
    (r"Engine Oil Temp\..*", "OilTemperature (°F)"),
    ("IAT.*", "IntakeAirTemperature (°F)"),
    ("Ignition Timing Final.*", "IgnitionTimingAngle"),
    ("Knock Retard Cylinder 1.*", "IgnitionRetardCyl1"),
    ("Knock Retard Cylinder 2.*", "IgnitionRetardCyl2"),
    ("Knock Retard Cylinder 3.*", "IgnitionRetardCyl3"),
    ("Knock Retard Cylinder 4.*", "IgnitionRetardCyl4"),
    ("Knock Retard Cylinder 5.*", "IgnitionRetardCyl5"),
    ("Knock Retard Cylinder 6.*", "IgnitionRetardCyl6"),
    ("Knock Retard Cylinder 7.*", "IgnitionRetardCyl7"),
    ("Knock Retard Cylinder 8.*", "IgnitionRetardCyl8"),
    (r"Turbine Act\. Base Value.*", "WastegateDutyCycleBase"),
    (r"Turbine Act\. Final Value.*", "WastegateDutyCycle"),
    ("Vehicle Speed.*", "VehicleSpeed"),
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("[Tt]ime", "TIME"),
    ("[Ee]ngine [Ss]peed", "RPM"),
    ("[Mm]ass air flow", "MassAirFlow"),
];

static DEFAULT_TABLE: LazyLock<AliasTable> =
    LazyLock::new(|| AliasTable::from_static(DEFAULT_ALIASES));

static DIALECT_TABLES: LazyLock<HashMap<LoggerDialect, AliasTable>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert(LoggerDialect::Ecux, AliasTable::from_static(ECUX_ALIASES));
    map.insert(LoggerDialect::Vcds, AliasTable::from_static(VCDS_ALIASES));
    map.insert(
        LoggerDialect::Zeitronix,
        AliasTable::from_static(ZEITRONIX_ALIASES),
    );
    map.insert(
        LoggerDialect::Me7Logger,
        AliasTable::from_static(ME7LOGGER_ALIASES),
    );
    map.insert(LoggerDialect::EvoScan, AliasTable::from_static(EVOSCAN_ALIASES));
    map.insert(
        LoggerDialect::VolvoLogger,
        AliasTable::from_static(VOLVOLOGGER_ALIASES),
    );
    map.insert(
        LoggerDialect::LogWorks,
        AliasTable::from_static(LOGWORKS_ALIASES),
    );
    map.insert(LoggerDialect::Jb4, AliasTable::from_static(JB4_ALIASES));
    map.insert(LoggerDialect::CobbAp, AliasTable::from_static(COBB_AP_ALIASES));
    map
});

/// Alias table used for a dialect. Dialects without their own table use DEFAULT.
pub fn alias_table(dialect: LoggerDialect) -> &'static AliasTable {
    DIALECT_TABLES.get(&dialect).unwrap_or(&DEFAULT_TABLE)
}

/// The DEFAULT alias table.
pub fn default_alias_table() -> &'static AliasTable {
    &DEFAULT_TABLE
}

/// Rewrite raw headers to canonical names for the given dialect.
///
/// Output has the same length and order as the input. Each header is trimmed,
/// then the first matching pattern of the dialect's table replaces it.
pub fn canonicalize<S: AsRef<str>>(headers: &[S], dialect: LoggerDialect) -> Vec<String> {
    canonicalize_with(headers, alias_table(dialect))
}

/// Rewrite raw headers with an explicit alias table.
pub fn canonicalize_with<S: AsRef<str>>(headers: &[S], table: &AliasTable) -> Vec<String> {
    headers.iter().map(|h| table.apply(h.as_ref())).collect()
}

/// Check if a raw header has an alias in the dialect's table.
pub fn has_alias(header: &str, dialect: LoggerDialect) -> bool {
    alias_table(dialect).lookup(header.trim()).is_some()
}

/// Canonical name for display, with the raw header as suffix if it was rewritten.
/// Returns "Canonical (Raw)" format when an alias applied.
pub fn get_display_name(header: &str, dialect: LoggerDialect, show_original: bool) -> String {
    let trimmed = header.trim();
    let canonical = alias_table(dialect).apply(trimmed);
    if canonical != trimmed && show_original {
        format!("{} ({})", canonical, trimmed)
    } else {
        canonical
    }
}

static UNIT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\((.+)\)").expect("unit suffix pattern must compile"));

/// Split a trailing "(unit)" off a name: `"VehicleSpeed (mph)"` -> `("VehicleSpeed", Some("mph"))`.
pub fn split_unit_suffix(name: &str) -> (String, Option<String>) {
    match UNIT_SUFFIX.captures(name) {
        Some(caps) => (
            caps[1].trim().to_string(),
            Some(caps[2].trim().to_string()),
        ),
        None => (name.to_string(), None),
    }
}

/// Make repeated names unique by appending " 2", " 3", ... to later copies.
/// Empty names (dropped columns) are left alone.
pub fn dedupe_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if name.is_empty() || !out.contains(name) {
            out.push(name.clone());
            continue;
        }
        let mut n = 2;
        let mut renamed = format!("{} {}", name, n);
        while out.contains(&renamed) {
            n += 1;
            renamed = format!("{} {}", name, n);
        }
        tracing::debug!("renamed duplicate column '{}' -> '{}'", name, renamed);
        out.push(renamed);
    }
    out
}

/// Candidate names for the accelerator pedal channel, in preference order.
pub const PEDAL_CHANNELS: &[&str] = &[
    "AcceleratorPedalPosition",
    "AccelPedalPosition",
    "Zeitronix TPS",
    "Accelerator position",
    "Pedal Position",
];

/// Candidate names for the throttle plate channel, in preference order.
pub const THROTTLE_CHANNELS: &[&str] = &[
    "ThrottlePlateAngle",
    "Throttle Angle",
    "Throttle Valve Angle",
    "TPS",
];

/// Candidate names for the selected gear channel, in preference order.
pub const GEAR_CHANNELS: &[&str] = &["Gear", "SelectedGear", "Engaged Gear"];
