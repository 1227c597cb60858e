//! Unit parsing, normalization, and conversion for dataset coordinates and values.
//!
//! This module is the unit system every quantitative part of the crate
//! talks to. It parses unit strings with flexible syntax, tracks physical
//! dimensionality, names physical types, and converts between compatible
//! units. Values carrying a unit are [`Quantity`]s.
//!
//! # Quick Start
//!
//! ```
//! use csdm_core::units::{Quantity, Unit};
//!
//! let increment = Quantity::parse("10 µs").unwrap();
//! assert_eq!(increment.physical_type(), "time");
//!
//! // Reciprocal units come from unit arithmetic
//! let reciprocal = increment.unit().pow(-1);
//! assert_eq!(reciprocal.physical_type(), "frequency");
//!
//! // Incompatible units produce errors
//! let length = Unit::parse("m").unwrap();
//! assert!(increment.value_in(&length).is_err());
//! ```
//!
//! # Supported Syntax
//!
//! | Notation | Meaning |
//! |----------|---------|
//! | `m^2`, `m**2`, `m2` | Square metres |
//! | `rad/s`, `rad s^-1`, `rad per s` | Radians per second |
//! | `kg m`, `kg*m`, `kg·m` | Kilogram-metres |
//! | `µs`, `us` | Microseconds |
//!
//! # Custom units
//!
//! `ppm` and `turn` are not registered by default. Call
//! [`enable_custom_units`] (or [`initialize`] with a [`UnitsConfig`]) once
//! at start-up before reading files that use them.
//!
//! # Module Structure
//!
//! - [`dimensionality`]: Physical dimensionality (M, L, T, Θ, N, I, J, A)
//! - [`registry`]: Known units with conversion factors
//! - [`parser`]: Unit string parsing with normalization
//! - [`conversion`]: High-level [`Unit`] type and conversion API
//! - [`quantity`]: Unit-tagged scalars
//! - [`config`]: Explicit registry initialisation

pub mod config;
pub mod conversion;
pub mod dimensionality;
pub mod parser;
pub mod quantity;
pub mod registry;

pub use config::{enable_custom_units, initialize, ConfigError, CustomUnitDefinition, UnitsConfig};
pub use conversion::{conversion_factor, units_equal, ConversionError, Unit};
pub use dimensionality::Dimensionality;
pub use parser::{ParseError, ParsedUnit};
pub use quantity::Quantity;
pub use registry::{UnitInfo, UnitRegistry, UNIT_REGISTRY};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrometer_frequency_in_hertz() {
        let larmor = Quantity::parse("400.13 MHz").unwrap();
        let hz = Unit::parse("Hz").unwrap();
        let value = larmor.value_in(&hz).unwrap();
        assert!((value - 400.13e6).abs() < 1e-3, "{value}");
    }

    #[test]
    fn test_temperature_is_not_a_frequency() {
        let hz = Unit::parse("Hz").unwrap();
        let kelvin = Unit::parse("K").unwrap();
        assert!(!hz.is_compatible(&kelvin));
        assert!(matches!(
            hz.conversion_factor(&kelvin),
            Err(ConversionError::IncompatibleDimensions { .. })
        ));
    }

    #[test]
    fn test_equivalent_notations() {
        let a = Unit::parse("m^2").unwrap();
        let b = Unit::parse("m**2").unwrap();
        let c = Unit::parse("m2").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);

        let d = Unit::parse("rad/s").unwrap();
        let e = Unit::parse("rad s^-1").unwrap();
        let f = Unit::parse("rad per s").unwrap();
        assert_eq!(d, e);
        assert_eq!(e, f);
    }

    #[test]
    fn test_time_frequency_reciprocity() {
        let us = Quantity::parse("1 us").unwrap();
        let mhz = Unit::parse("MHz").unwrap();
        let reciprocal = &Quantity::dimensionless(1.0) / &us;
        let value = reciprocal.value_in(&mhz).unwrap();
        assert!((value - 1.0).abs() < 1e-9, "1/us = {value} MHz");
    }

    #[test]
    fn test_gauss_to_tesla() {
        let gauss = Unit::parse("gauss").unwrap();
        let millitesla = Unit::parse("mT").unwrap();
        let factor = gauss.conversion_factor(&millitesla).unwrap();
        assert!((factor - 0.1).abs() < 1e-12);
    }
}
