//! Explicit initialisation of the global unit registry.
//!
//! Custom unit symbols are never registered implicitly. Call
//! [`enable_custom_units`] for the CSDM extras (`ppm`, `turn`) or
//! [`initialize`] with a [`UnitsConfig`], typically loaded from TOML:
//!
//! ```toml
//! enable_csdm_units = true
//!
//! [[custom_units]]
//! symbol = "cyc"
//! definition = "6.283185307179586 rad"
//! aliases = ["cycles"]
//! ```

use super::parser::ParseError;
use super::quantity::Quantity;
use super::registry::registry_mut;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A user-defined unit, expressed as a multiple of known units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomUnitDefinition {
    /// Symbol used in unit strings.
    pub symbol: String,
    /// Quantity string giving one of this unit, e.g. `"1e-6"` or `"2 rad"`.
    pub definition: String,
    /// Alternative spellings.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Unit registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitsConfig {
    /// Register `ppm` and `turn`.
    #[serde(default)]
    pub enable_csdm_units: bool,
    #[serde(default)]
    pub custom_units: Vec<CustomUnitDefinition>,
}

/// Error raised while loading a [`UnitsConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read units config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid units config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid definition for unit '{symbol}': {source}")]
    Definition { symbol: String, source: ParseError },
}

impl UnitsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Registers `ppm` and `turn` in the global registry. Idempotent.
pub fn enable_custom_units() {
    registry_mut().register_csdm_units();
}

/// Applies `config` to the global registry.
///
/// All definitions are validated before any of them is registered.
pub fn initialize(config: &UnitsConfig) -> Result<(), ConfigError> {
    let mut resolved = Vec::with_capacity(config.custom_units.len());
    for unit in &config.custom_units {
        let quantity =
            Quantity::parse(&unit.definition).map_err(|source| ConfigError::Definition {
                symbol: unit.symbol.clone(),
                source,
            })?;
        let dimensionality = quantity.unit().dimensionality();
        let factor = quantity.unit().to_si_factor();
        resolved.push((unit, dimensionality, quantity.value() * factor));
    }

    let mut registry = registry_mut();
    if config.enable_csdm_units {
        registry.register_csdm_units();
    }
    for (unit, dimensionality, factor) in resolved {
        let aliases: Vec<&str> = unit.aliases.iter().map(String::as_str).collect();
        registry.register(&unit.symbol, dimensionality, factor, &aliases);
        log::debug!("registered custom unit '{}' = {}", unit.symbol, unit.definition);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;
    use is_close::is_close;

    #[test]
    fn test_enable_custom_units() {
        enable_custom_units();
        enable_custom_units();
        let ppm = Unit::parse("ppm").unwrap();
        assert!(ppm.is_dimensionless());
        let turn = Unit::parse("turn").unwrap();
        assert_eq!(turn.physical_type(), "angle");
    }

    #[test]
    fn test_initialize_from_toml() {
        let config = UnitsConfig::from_toml_str(
            r#"
            enable_csdm_units = true

            [[custom_units]]
            symbol = "fortnight"
            definition = "14 d"
            aliases = ["fortnights"]
            "#,
        )
        .unwrap();
        assert_eq!(config.custom_units.len(), 1);

        initialize(&config).unwrap();
        let unit = Unit::parse("fortnights").unwrap();
        let s = Unit::parse("s").unwrap();
        assert!(is_close!(
            unit.conversion_factor(&s).unwrap(),
            14.0 * 86400.0
        ));
    }

    #[test]
    fn test_invalid_definition_registers_nothing() {
        let config = UnitsConfig {
            enable_csdm_units: false,
            custom_units: vec![
                CustomUnitDefinition {
                    symbol: "good_unit".into(),
                    definition: "2 s".into(),
                    aliases: vec![],
                },
                CustomUnitDefinition {
                    symbol: "bad_unit".into(),
                    definition: "2 smoots".into(),
                    aliases: vec![],
                },
            ],
        };
        let err = initialize(&config).unwrap_err();
        assert!(err.to_string().contains("bad_unit"));
        assert!(Unit::parse("good_unit").is_err());
    }

    #[test]
    fn test_default_config_is_empty() {
        let config = UnitsConfig::from_toml_str("").unwrap();
        assert_eq!(config, UnitsConfig::default());
    }
}
