//! Physical dimensionality for unit validation.
//!
//! Dimensionality is stored as integer exponents of eight base quantities.
//! The seven SI base quantities are joined by plane angle, which is kept
//! independent so that `rad / s` (angular frequency) and `Hz` (frequency)
//! are distinguishable, the same way astronomy and spectroscopy tooling
//! treats them.
//!
//! - Mass (M)
//! - Length (L)
//! - Time (T)
//! - Temperature (Θ)
//! - Amount of substance (N)
//! - Electric current (I)
//! - Luminous intensity (J)
//! - Plane angle (A)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Display symbols of the base quantities, in storage order.
const BASE_SYMBOLS: [&str; 8] = ["M", "L", "T", "Θ", "N", "I", "J", "A"];

/// Exponents of the base quantities M, L, T, Θ, N, I, J and A.
///
/// Frequency is `T^-1`, tesla is `M T^-2 I^-1` and wavenumber is `L^-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Dimensionality {
    exponents: [i8; 8],
}

impl Dimensionality {
    #[must_use]
    pub const fn dimensionless() -> Self {
        Self { exponents: [0; 8] }
    }

    /// Exponents in the order mass, length, time, temperature, amount,
    /// current, luminosity, angle.
    #[must_use]
    pub const fn from_exponents(exponents: [i8; 8]) -> Self {
        Self { exponents }
    }

    #[must_use]
    pub const fn exponents(&self) -> [i8; 8] {
        self.exponents
    }

    const fn base(index: usize) -> Self {
        let mut exponents = [0; 8];
        exponents[index] = 1;
        Self { exponents }
    }

    pub const MASS: Self = Self::base(0);
    pub const LENGTH: Self = Self::base(1);
    pub const TIME: Self = Self::base(2);
    pub const TEMPERATURE: Self = Self::base(3);
    pub const AMOUNT: Self = Self::base(4);
    pub const CURRENT: Self = Self::base(5);
    pub const LUMINOSITY: Self = Self::base(6);
    pub const ANGLE: Self = Self::base(7);

    pub const FREQUENCY: Self = Self::from_exponents([0, 0, -1, 0, 0, 0, 0, 0]);
    pub const ANGULAR_FREQUENCY: Self = Self::from_exponents([0, 0, -1, 0, 0, 0, 0, 1]);
    pub const WAVENUMBER: Self = Self::from_exponents([0, -1, 0, 0, 0, 0, 0, 0]);
    pub const SOLID_ANGLE: Self = Self::from_exponents([0, 0, 0, 0, 0, 0, 0, 2]);
    pub const AREA: Self = Self::from_exponents([0, 2, 0, 0, 0, 0, 0, 0]);
    pub const VOLUME: Self = Self::from_exponents([0, 3, 0, 0, 0, 0, 0, 0]);
    pub const SPEED: Self = Self::from_exponents([0, 1, -1, 0, 0, 0, 0, 0]);
    pub const ACCELERATION: Self = Self::from_exponents([0, 1, -2, 0, 0, 0, 0, 0]);
    pub const FORCE: Self = Self::from_exponents([1, 1, -2, 0, 0, 0, 0, 0]);
    pub const ENERGY: Self = Self::from_exponents([1, 2, -2, 0, 0, 0, 0, 0]);
    pub const POWER: Self = Self::from_exponents([1, 2, -3, 0, 0, 0, 0, 0]);
    pub const PRESSURE: Self = Self::from_exponents([1, -1, -2, 0, 0, 0, 0, 0]);
    pub const CHARGE: Self = Self::from_exponents([0, 0, 1, 0, 0, 1, 0, 0]);
    pub const POTENTIAL: Self = Self::from_exponents([1, 2, -3, 0, 0, -1, 0, 0]);
    pub const MAGNETIC_FLUX_DENSITY: Self = Self::from_exponents([1, 0, -2, 0, 0, -1, 0, 0]);

    #[must_use]
    pub const fn is_dimensionless(&self) -> bool {
        let mut i = 0;
        while i < 8 {
            if self.exponents[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Values can be converted between units of equal dimensionality.
    #[must_use]
    pub const fn is_compatible(&self, other: &Self) -> bool {
        let mut i = 0;
        while i < 8 {
            if self.exponents[i] != other.exponents[i] {
                return false;
            }
            i += 1;
        }
        true
    }

    #[must_use]
    pub const fn pow(&self, exp: i8) -> Self {
        let mut exponents = self.exponents;
        let mut i = 0;
        while i < 8 {
            exponents[i] *= exp;
            i += 1;
        }
        Self { exponents }
    }

    /// Name of the physical quantity this dimensionality measures, or
    /// `"unknown"`.
    #[must_use]
    pub fn physical_type(&self) -> &'static str {
        const NAMED: &[(Dimensionality, &str)] = &[
            (Dimensionality::dimensionless(), "dimensionless"),
            (Dimensionality::LENGTH, "length"),
            (Dimensionality::TIME, "time"),
            (Dimensionality::FREQUENCY, "frequency"),
            (Dimensionality::MASS, "mass"),
            (Dimensionality::TEMPERATURE, "temperature"),
            (Dimensionality::AMOUNT, "amount of substance"),
            (Dimensionality::CURRENT, "electrical current"),
            (Dimensionality::LUMINOSITY, "luminous intensity"),
            (Dimensionality::ANGLE, "angle"),
            (Dimensionality::ANGULAR_FREQUENCY, "angular frequency"),
            (Dimensionality::SOLID_ANGLE, "solid angle"),
            (Dimensionality::WAVENUMBER, "wavenumber"),
            (Dimensionality::AREA, "area"),
            (Dimensionality::VOLUME, "volume"),
            (Dimensionality::SPEED, "speed"),
            (Dimensionality::ACCELERATION, "acceleration"),
            (Dimensionality::FORCE, "force"),
            (Dimensionality::ENERGY, "energy"),
            (Dimensionality::POWER, "power"),
            (Dimensionality::PRESSURE, "pressure"),
            (Dimensionality::CHARGE, "electrical charge"),
            (Dimensionality::POTENTIAL, "electrical potential"),
            (Dimensionality::MAGNETIC_FLUX_DENSITY, "magnetic flux density"),
        ];

        NAMED
            .iter()
            .find(|(dim, _)| dim == self)
            .map_or("unknown", |(_, name)| name)
    }

    fn zip_with(self, rhs: Self, op: impl Fn(i8, i8) -> i8) -> Self {
        let mut exponents = self.exponents;
        for (exponent, other) in exponents.iter_mut().zip(rhs.exponents) {
            *exponent = op(*exponent, other);
        }
        Self { exponents }
    }
}

/// Product of quantities: exponents add.
impl Mul for Dimensionality {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a + b)
    }
}

/// Same as [`Mul`]; kept so dimensionalities can be accumulated with `+`.
impl Add for Dimensionality {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self * rhs
    }
}

/// Quotient of quantities: exponents subtract.
impl Sub for Dimensionality {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Neg for Dimensionality {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.pow(-1)
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("dimensionless");
        }
        let parts: Vec<String> = BASE_SYMBOLS
            .iter()
            .zip(self.exponents)
            .filter(|(_, exp)| *exp != 0)
            .map(|(symbol, exp)| match exp {
                1 => symbol.to_string(),
                _ => format!("{symbol}^{exp}"),
            })
            .collect();
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensionless() {
        let dim = Dimensionality::dimensionless();
        assert!(dim.is_dimensionless());
        assert_eq!(dim.to_string(), "dimensionless");
        assert_eq!(dim.physical_type(), "dimensionless");
    }

    #[test]
    fn test_frequency_is_reciprocal_time() {
        assert_eq!(-Dimensionality::TIME, Dimensionality::FREQUENCY);
        assert_eq!(Dimensionality::FREQUENCY.physical_type(), "frequency");
        assert_eq!((-Dimensionality::FREQUENCY).physical_type(), "time");
    }

    #[test]
    fn test_angle_is_independent() {
        let angular = Dimensionality::ANGLE - Dimensionality::TIME;
        assert_eq!(angular.physical_type(), "angular frequency");
        assert!(!angular.is_compatible(&Dimensionality::FREQUENCY));
    }

    #[test]
    fn test_dimension_multiplication() {
        let force = Dimensionality::MASS * Dimensionality::LENGTH * Dimensionality::TIME.pow(-2);
        assert_eq!(force, Dimensionality::FORCE);
        assert_eq!(force.physical_type(), "force");
    }

    #[test]
    fn test_power_derived_dimension() {
        let power = Dimensionality::ENERGY - Dimensionality::TIME;
        assert_eq!(power, Dimensionality::POWER);
    }

    #[test]
    fn test_unknown_physical_type() {
        let odd = Dimensionality::MASS.pow(3) * Dimensionality::ANGLE;
        assert_eq!(odd.physical_type(), "unknown");
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimensionality::MASS.to_string(), "M");
        assert_eq!(Dimensionality::AREA.to_string(), "L^2");
        assert_eq!(Dimensionality::FORCE.to_string(), "M L T^-2");
        assert_eq!(Dimensionality::ANGULAR_FREQUENCY.to_string(), "T^-1 A");
        assert_eq!(
            Dimensionality::from_exponents([0, 0, 0, 1, 0, 0, 0, 0]).exponents(),
            Dimensionality::TEMPERATURE.exponents()
        );
    }
}
