//! Unit-tagged scalar values.
//!
//! A [`Quantity`] pairs an `f64` magnitude with a [`Unit`]. Quantity strings
//! follow the `"<number> <unit>"` form used throughout CSDM files, e.g.
//! `"10 kHz"`, `"-3.5e-3 s"`, `"inf s"` or a bare `"0.5"`.

use super::conversion::{ConversionError, Unit};
use super::parser::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Div, Mul, Neg};

/// A scalar value with a physical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// A dimensionless quantity.
    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Unit::dimensionless())
    }

    /// Positive infinity in `unit`, the sentinel for a non-periodic axis.
    pub fn infinite(unit: Unit) -> Self {
        Self::new(f64::INFINITY, unit)
    }

    /// Zero in `unit`.
    pub fn zero(unit: Unit) -> Self {
        Self::new(0.0, unit)
    }

    /// Parses a `"<number> <unit>"` string.
    ///
    /// A missing number means `1` (so `"Hz"` is one hertz), a missing unit
    /// means dimensionless.
    ///
    /// # Example
    ///
    /// ```
    /// use csdm_core::units::Quantity;
    ///
    /// let q = Quantity::parse("-2.5e3 Hz").unwrap();
    /// assert_eq!(q.value(), -2500.0);
    /// assert_eq!(q.unit().physical_type(), "frequency");
    ///
    /// assert!(Quantity::parse("1.0.0 Hz").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::InvalidNumber(String::new()));
        }

        let (number, rest) = split_number(input);
        let value = if number.is_empty() {
            1.0
        } else {
            parse_float(number)?
        };

        let rest = rest.trim_start();
        let rest = rest.strip_prefix('*').map_or(rest, str::trim_start);
        if rest.is_empty() {
            return Ok(Self::dimensionless(value));
        }
        // a leading digit is only valid as the `1` of an inverse unit
        let inverse_unit = rest
            .strip_prefix('1')
            .is_some_and(|tail| tail.trim_start().starts_with('/'));
        if !inverse_unit && rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return Err(ParseError::InvalidNumber(input.to_string()));
        }

        let unit = Unit::parse(rest)?;
        Ok(Self::new(value, unit))
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Physical type of the unit, e.g. `"time"`.
    pub fn physical_type(&self) -> &'static str {
        self.unit.physical_type()
    }

    pub fn is_infinite(&self) -> bool {
        self.value.is_infinite()
    }

    /// The magnitude of this quantity expressed in `unit`.
    pub fn value_in(&self, unit: &Unit) -> Result<f64, ConversionError> {
        if &self.unit == unit {
            return Ok(self.value);
        }
        self.unit.convert_to(self.value, unit)
    }

    /// This quantity converted to `unit`.
    pub fn to(&self, unit: &Unit) -> Result<Self, ConversionError> {
        Ok(Self::new(self.value_in(unit)?, unit.clone()))
    }

    /// Sum in the unit of `self`; fails if the physical types differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ConversionError> {
        Ok(Self::new(self.value + other.value_in(&self.unit)?, self.unit.clone()))
    }

    /// Difference in the unit of `self`; fails if the physical types differ.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, ConversionError> {
        Ok(Self::new(self.value - other.value_in(&self.unit)?, self.unit.clone()))
    }

    pub fn powi(&self, exp: i32) -> Self {
        Self::new(self.value.powi(exp), self.unit.pow(exp))
    }

    /// Canonical string form, `"<value> <unit>"`.
    ///
    /// Dimensionless quantities print the value alone.
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit == Unit::dimensionless() {
            write!(f, "{:?}", self.value)
        } else {
            write!(f, "{:?} {}", self.value, self.unit)
        }
    }
}

impl std::str::FromStr for Quantity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Self::Output {
        Quantity::new(self.value * rhs, self.unit)
    }
}

impl Mul<f64> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Self::Output {
        Quantity::new(self.value * rhs, self.unit.clone())
    }
}

impl Mul<&Quantity> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Quantity) -> Self::Output {
        Quantity::new(self.value * rhs.value, self.unit.multiply(&rhs.unit))
    }
}

impl Div<f64> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Self::Output {
        Quantity::new(self.value / rhs, self.unit.clone())
    }
}

impl Div<&Quantity> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Quantity) -> Self::Output {
        Quantity::new(self.value / rhs.value, self.unit.divide(&rhs.unit))
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Self::Output {
        Quantity::new(-self.value, self.unit)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Splits a leading float literal from the rest of the string.
fn split_number(input: &str) -> (&str, &str) {
    let bytes = input.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let lowered = input[end..].to_ascii_lowercase();
    for word in ["infinity", "inf", "nan"] {
        if lowered.starts_with(word) {
            let stop = end + word.len();
            let boundary = input[stop..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_ascii_alphanumeric());
            if boundary {
                return (&input[..stop], &input[stop..]);
            }
        }
    }

    let digits_start = end;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end == digits_start {
        // no mantissa: either a bare unit or a lone sign
        return if digits_start == 0 {
            ("", input)
        } else {
            (&input[..digits_start], &input[digits_start..])
        };
    }

    // Exponent only counts when followed by digits, so "1 eV" keeps its unit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut probe = end + 1;
        if probe < bytes.len() && matches!(bytes[probe], b'+' | b'-') {
            probe += 1;
        }
        if probe < bytes.len() && bytes[probe].is_ascii_digit() {
            end = probe;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
    }

    (&input[..end], &input[end..])
}

fn parse_float(number: &str) -> Result<f64, ParseError> {
    number
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(number.to_string()))
}
