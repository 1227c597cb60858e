//! The validated [`Unit`] type and conversions between units.
//!
//! ```
//! use csdm_core::units::Unit;
//!
//! let per_second = Unit::parse("1/s").unwrap();
//! assert_eq!(per_second, Unit::parse("s^-1").unwrap());
//!
//! let mhz = Unit::parse("MHz").unwrap();
//! let hz = Unit::parse("Hz").unwrap();
//! assert_eq!(mhz.conversion_factor(&hz).unwrap(), 1e6);
//! ```

use super::dimensionality::Dimensionality;
use super::parser::{ParseError, ParsedUnit};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error(
        "cannot convert from '{from_unit}' ({}) to '{to_unit}' ({}): incompatible dimensions ({from} vs {to})",
        .from.physical_type(),
        .to.physical_type()
    )]
    IncompatibleDimensions {
        from: Dimensionality,
        to: Dimensionality,
        from_unit: String,
        to_unit: String,
    },
    #[error("unit parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// A unit whose every symbol is registered.
///
/// Units compare by their normalized form: `1/s` equals `s^-1`, while `Hz`
/// and `1/s` differ even though they convert into each other.
#[derive(Debug, Clone)]
pub struct Unit {
    original: String,
    parsed: ParsedUnit,
    dimensionality: Dimensionality,
    si_factor: f64,
}

impl Unit {
    /// Fails with [`ParseError::UnknownUnit`] if a symbol is not registered.
    ///
    /// ```
    /// use csdm_core::units::Unit;
    ///
    /// assert_eq!(Unit::parse("rad/s").unwrap(), Unit::parse("rad s^-1").unwrap());
    /// assert!(Unit::parse("furlong").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut unit = Self::resolve(ParsedUnit::parse(input)?)?;
        unit.original = input.trim().to_string();
        Ok(unit)
    }

    #[must_use]
    pub fn dimensionless() -> Self {
        let parsed = ParsedUnit::dimensionless();
        Self {
            original: parsed.normalized(),
            parsed,
            dimensionality: Dimensionality::dimensionless(),
            si_factor: 1.0,
        }
    }

    fn resolve(parsed: ParsedUnit) -> Result<Self, ParseError> {
        Ok(Self {
            original: parsed.normalized(),
            dimensionality: parsed.dimensionality()?,
            si_factor: parsed.to_si_factor()?,
            parsed,
        })
    }

    /// Units derived from already resolved ones only contain registered
    /// symbols, so resolution cannot fail here.
    fn derive(parsed: ParsedUnit) -> Self {
        Self::resolve(parsed).unwrap_or_else(|_| Self::dimensionless())
    }

    /// The input string, trimmed.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn normalized(&self) -> String {
        self.parsed.normalized()
    }

    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.dimensionality.is_dimensionless()
    }

    #[must_use]
    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// Name of the physical quantity measured in this unit, e.g. `"frequency"`.
    #[must_use]
    pub fn physical_type(&self) -> &'static str {
        self.dimensionality.physical_type()
    }

    /// Multiplier taking a value in this unit to SI base units.
    #[must_use]
    pub fn to_si_factor(&self) -> f64 {
        self.si_factor
    }

    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.dimensionality.is_compatible(&other.dimensionality)
    }

    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self::derive(self.parsed.multiply(&other.parsed))
    }

    #[must_use]
    pub fn divide(&self, other: &Self) -> Self {
        Self::derive(self.parsed.divide(&other.parsed))
    }

    #[must_use]
    pub fn pow(&self, exp: i32) -> Self {
        Self::derive(self.parsed.pow(exp))
    }

    /// Multiplier taking a value in `self` to a value in `other`.
    pub fn conversion_factor(&self, other: &Self) -> Result<f64, ConversionError> {
        if !self.is_compatible(other) {
            return Err(ConversionError::IncompatibleDimensions {
                from: self.dimensionality,
                to: other.dimensionality,
                from_unit: self.to_string(),
                to_unit: other.to_string(),
            });
        }
        Ok(self.si_factor / other.si_factor)
    }

    pub fn convert_to(&self, value: f64, other: &Self) -> Result<f64, ConversionError> {
        self.conversion_factor(other).map(|factor| value * factor)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

impl FromStr for Unit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Whether two unit strings normalize to the same unit.
///
/// ```
/// use csdm_core::units::units_equal;
///
/// assert!(units_equal("1/s", "1 / s").unwrap());
/// assert!(!units_equal("Hz", "1/s").unwrap());
/// ```
pub fn units_equal(a: &str, b: &str) -> Result<bool, ParseError> {
    Ok(a.parse::<Unit>()? == b.parse::<Unit>()?)
}

/// ```
/// use csdm_core::units::conversion_factor;
///
/// assert!((conversion_factor("ms", "s").unwrap() - 1e-3).abs() < 1e-15);
/// ```
pub fn conversion_factor(from: &str, to: &str) -> Result<f64, ConversionError> {
    Unit::parse(from)?.conversion_factor(&Unit::parse(to)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_parse() {
        let unit = Unit::parse("W/m^2").unwrap();
        assert_eq!(unit.normalized(), "W / m^2");
        assert_eq!(unit.physical_type(), "unknown");
    }

    #[test]
    fn test_unit_equality() {
        let u1 = Unit::parse("1/s").unwrap();
        let u2 = Unit::parse("1 / s").unwrap();
        let u3 = Unit::parse("s^-1").unwrap();
        assert_eq!(u1, u2);
        assert_eq!(u2, u3);
    }

    #[test]
    fn test_unit_inequality() {
        let u1 = Unit::parse("Hz").unwrap();
        let u2 = Unit::parse("1/s").unwrap();
        assert_ne!(u1, u2);
        assert!(u1.is_compatible(&u2));
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert_eq!(
            Unit::parse("parsec_ish"),
            Err(ParseError::UnknownUnit("parsec_ish".into()))
        );
    }

    #[test]
    fn test_physical_type() {
        assert_eq!(Unit::parse("s").unwrap().physical_type(), "time");
        assert_eq!(Unit::parse("kHz").unwrap().physical_type(), "frequency");
        assert_eq!(Unit::parse("cm^-1").unwrap().physical_type(), "wavenumber");
        assert_eq!(Unit::parse("T").unwrap().physical_type(), "magnetic flux density");
        assert_eq!(Unit::dimensionless().physical_type(), "dimensionless");
    }

    #[test]
    fn test_reciprocal_unit() {
        let s = Unit::parse("s").unwrap();
        let inverse = s.pow(-1);
        assert_eq!(inverse.physical_type(), "frequency");
        assert_eq!(inverse.to_string(), "1 / s");
        assert_eq!(inverse.pow(-1), s);
    }

    #[test]
    fn test_multiply_divide() {
        let hz = Unit::parse("Hz").unwrap();
        let s = Unit::parse("s").unwrap();
        assert!(hz.multiply(&s).is_dimensionless());
        assert_eq!(s.divide(&s), Unit::dimensionless());
    }

    #[test]
    fn test_conversion_factor_identity() {
        let u1 = Unit::parse("rad/s").unwrap();
        let u2 = Unit::parse("rad / s").unwrap();
        let factor = u1.conversion_factor(&u2).unwrap();
        assert!((factor - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_incompatible_dimensions_error() {
        let hz = Unit::parse("Hz").unwrap();
        let m = Unit::parse("m").unwrap();
        let err = hz.conversion_factor(&m).unwrap_err();
        assert!(matches!(err, ConversionError::IncompatibleDimensions { .. }));
        let message = err.to_string();
        assert!(message.contains("Hz"), "{message}");
        assert!(message.contains("frequency"), "{message}");
        assert!(message.contains("length"), "{message}");
    }

    #[test]
    fn test_convert_to() {
        let ms = Unit::parse("ms").unwrap();
        let s = Unit::parse("s").unwrap();
        let converted = ms.convert_to(250.0, &s).unwrap();
        assert!((converted - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_angle_conversion() {
        let deg = Unit::parse("deg").unwrap();
        let rad = Unit::parse("rad").unwrap();
        let converted = deg.convert_to(180.0, &rad).unwrap();
        assert!((converted - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_units_equal_helper() {
        assert!(units_equal("1/s", "1 / s").unwrap());
        assert!(!units_equal("Hz", "kHz").unwrap());
    }

    #[test]
    fn test_conversion_factor_helper() {
        let factor = conversion_factor("km", "m").unwrap();
        assert!((factor - 1000.0).abs() < 1e-10);
    }

    #[test]
    fn test_serde_as_string() {
        let unit = Unit::parse("rad s^-1").unwrap();
        let json = serde_json::to_string(&unit).unwrap();
        assert_eq!(json, "\"rad / s\"");
        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unit);
    }

    #[test]
    fn test_original_preserved() {
        let unit = Unit::parse("  rad / s ").unwrap();
        assert_eq!(unit.original(), "rad / s");
        assert_eq!(unit.normalized(), "rad / s");
    }
}
