//! Physical units: constants, name-to-unit resolution and conversion.
//!
//! Unit labels are plain strings ("mBar", "PSI", "km/h", "°C"). A
//! [`ConvertibleQuantity`] pairs one US customary label with one metric label
//! and knows how to convert between them; boost pressure in PSI gauge vs
//! mBar absolute additionally needs the ambient pressure.

pub mod constants;
pub mod convert;
pub mod resolve;

pub use convert::{
    alternate_unit, ambient_pressure_mbar, convert, AmbientProvider, ConvertibleQuantity,
    UnitError,
};
pub use resolve::{normalize_unit, resolve_units, unit_for};
