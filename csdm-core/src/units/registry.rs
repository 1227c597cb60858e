//! Registry of unit symbols known to the parser.
//!
//! Every entry records a dimensionality and the factor taking one of the
//! unit to SI base units (`eV` is `1.602176634e-19`, `deg` is `π/180`).
//! Symbols not found directly are retried as an SI prefix plus a registered
//! symbol, so `kHz`, `µs` and `dam` need no entries of their own.
//!
//! The CSDM extras `ppm` and `turn` are absent until
//! [`enable_custom_units`](super::enable_custom_units) registers them.

use super::dimensionality::Dimensionality;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A resolved unit symbol.
#[derive(Debug, Clone)]
pub struct UnitInfo {
    /// Registered symbol, or the prefixed spelling that was looked up.
    pub name: String,
    pub dimensionality: Dimensionality,
    pub to_si_factor: f64,
    /// Symbol the prefix was stripped to, for prefixed lookups.
    pub base_unit: Option<String>,
}

/// Prefix symbols and multipliers. Two-letter `da` precedes `d`.
const SI_PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("\u{00B5}", 1e-6),
    ("\u{03BC}", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const JULIAN_YEAR: f64 = 365.25 * DAY;
const DEGREE: f64 = PI / 180.0;

/// Symbol, dimensionality and SI factor of every built-in unit.
const STANDARD_UNITS: &[(&str, Dimensionality, f64)] = &[
    ("1", Dimensionality::dimensionless(), 1.0),
    // SI base
    ("kg", Dimensionality::MASS, 1.0),
    ("g", Dimensionality::MASS, 1e-3),
    ("m", Dimensionality::LENGTH, 1.0),
    ("s", Dimensionality::TIME, 1.0),
    ("K", Dimensionality::TEMPERATURE, 1.0),
    ("mol", Dimensionality::AMOUNT, 1.0),
    ("A", Dimensionality::CURRENT, 1.0),
    ("cd", Dimensionality::LUMINOSITY, 1.0),
    ("rad", Dimensionality::ANGLE, 1.0),
    // SI derived
    ("Hz", Dimensionality::FREQUENCY, 1.0),
    ("N", Dimensionality::FORCE, 1.0),
    ("J", Dimensionality::ENERGY, 1.0),
    ("W", Dimensionality::POWER, 1.0),
    ("Pa", Dimensionality::PRESSURE, 1.0),
    ("C", Dimensionality::CHARGE, 1.0),
    ("V", Dimensionality::POTENTIAL, 1.0),
    ("T", Dimensionality::MAGNETIC_FLUX_DENSITY, 1.0),
    ("sr", Dimensionality::SOLID_ANGLE, 1.0),
    ("L", Dimensionality::VOLUME, 1e-3),
    ("bar", Dimensionality::PRESSURE, 1e5),
    ("atm", Dimensionality::PRESSURE, 101_325.0),
    // time
    ("min", Dimensionality::TIME, MINUTE),
    ("h", Dimensionality::TIME, HOUR),
    ("d", Dimensionality::TIME, DAY),
    ("yr", Dimensionality::TIME, JULIAN_YEAR),
    // plane angle
    ("deg", Dimensionality::ANGLE, DEGREE),
    ("arcmin", Dimensionality::ANGLE, DEGREE / 60.0),
    ("arcsec", Dimensionality::ANGLE, DEGREE / 3600.0),
    ("cycle", Dimensionality::ANGLE, 2.0 * PI),
    // spectroscopy and astronomy
    ("eV", Dimensionality::ENERGY, 1.602_176_634e-19),
    ("Angstrom", Dimensionality::LENGTH, 1e-10),
    ("au", Dimensionality::LENGTH, 1.495_978_707e11),
    ("pc", Dimensionality::LENGTH, 3.085_677_581_491_367e16),
    ("G", Dimensionality::MAGNETIC_FLUX_DENSITY, 1e-4),
];

/// Alternative spelling and the symbol it stands for.
const STANDARD_ALIASES: &[(&str, &str)] = &[
    ("dimensionless", "1"),
    ("l", "L"),
    ("hertz", "Hz"),
    ("tesla", "T"),
    ("second", "s"),
    ("minute", "min"),
    ("hour", "h"),
    ("day", "d"),
    ("year", "yr"),
    ("degree", "deg"),
    ("radian", "rad"),
    ("AA", "Angstrom"),
    ("gauss", "G"),
];

/// The process-wide registry the parser resolves symbols against.
pub static UNIT_REGISTRY: LazyLock<RwLock<UnitRegistry>> =
    LazyLock::new(|| RwLock::new(UnitRegistry::new()));

/// Read access to [`UNIT_REGISTRY`]. A poisoned lock is recovered.
pub fn registry() -> RwLockReadGuard<'static, UnitRegistry> {
    UNIT_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn registry_mut() -> RwLockWriteGuard<'static, UnitRegistry> {
    UNIT_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct UnitRegistry {
    units: HashMap<String, (Dimensionality, f64)>,
    aliases: HashMap<String, String>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    /// A registry holding the built-in units only.
    pub fn new() -> Self {
        let units = STANDARD_UNITS
            .iter()
            .map(|&(symbol, dim, factor)| (symbol.to_string(), (dim, factor)))
            .collect();
        let aliases = STANDARD_ALIASES
            .iter()
            .map(|&(alias, symbol)| (alias.to_string(), symbol.to_string()))
            .collect();
        Self { units, aliases }
    }

    /// Resolves `symbol` directly, through an alias, or as a prefixed unit,
    /// in that order.
    pub fn lookup(&self, symbol: &str) -> Option<UnitInfo> {
        if let Some((canonical, &(dimensionality, to_si_factor))) = self.resolve(symbol) {
            return Some(UnitInfo {
                name: canonical.to_string(),
                dimensionality,
                to_si_factor,
                base_unit: None,
            });
        }

        SI_PREFIXES.iter().find_map(|&(prefix, multiplier)| {
            let rest = symbol.strip_prefix(prefix)?;
            if rest.is_empty() || rest == "1" {
                return None;
            }
            let (canonical, &(dimensionality, to_si_factor)) = self.resolve(rest)?;
            Some(UnitInfo {
                name: symbol.to_string(),
                dimensionality,
                to_si_factor: to_si_factor * multiplier,
                base_unit: Some(canonical.to_string()),
            })
        })
    }

    fn resolve<'a>(&'a self, symbol: &'a str) -> Option<(&'a str, &'a (Dimensionality, f64))> {
        let canonical = self.aliases.get(symbol).map_or(symbol, String::as_str);
        self.units.get(canonical).map(|entry| (canonical, entry))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_some()
    }

    /// Registers `symbol` and its aliases, replacing earlier definitions.
    pub fn register(
        &mut self,
        symbol: &str,
        dimensionality: Dimensionality,
        to_si_factor: f64,
        aliases: &[&str],
    ) {
        self.units
            .insert(symbol.to_string(), (dimensionality, to_si_factor));
        self.aliases.extend(
            aliases
                .iter()
                .map(|alias| (alias.to_string(), symbol.to_string())),
        );
    }

    /// Registers `ppm` and `turn` (alias `tr`).
    pub fn register_csdm_units(&mut self) {
        self.register("ppm", Dimensionality::dimensionless(), 1e-6, &[]);
        self.register("turn", Dimensionality::ANGLE, 2.0 * PI, &["tr"]);
    }
}
