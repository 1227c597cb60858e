use crate::units::{ConversionError, ParseError};
use thiserror::Error;

/// Error type for invalid dataset operations.
#[derive(Error, Debug)]
pub enum CsdmError {
    #[error("'{key}' is a required key in {owner}")]
    MissingKey { key: String, owner: String },
    #[error("'{value}' is an invalid value for {field}. Allowed values are: {}", allowed.join(", "))]
    InvalidLiteral {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
    #[error("{0}")]
    InvalidValue(String),
    #[error("Incompatible units: '{from}' ({from_type}) and '{to}' ({to_type})")]
    IncompatibleUnits {
        from: String,
        to: String,
        from_type: String,
        to_type: String,
    },
    #[error("Expecting {expected} components, found {found}")]
    ComponentCount { expected: usize, found: usize },
    #[error("'{owner}' attribute '{attribute}' cannot be modified")]
    ReadOnlyAttribute { attribute: String, owner: String },
    #[error("'{owner}' has no attribute '{attribute}'")]
    MissingAttribute { attribute: String, owner: String },
    #[error("{0}")]
    NotImplemented(String),
    #[error("Could not decode components: {0}")]
    Decode(String),
    #[error("Invalid unit: {0}")]
    UnitParse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CsdmError {
    pub(crate) fn missing_key(key: &str, owner: &str) -> Self {
        Self::MissingKey {
            key: key.to_string(),
            owner: owner.to_string(),
        }
    }

    pub(crate) fn invalid_literal(field: &str, value: &str, allowed: &[&str]) -> Self {
        Self::InvalidLiteral {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub(crate) fn read_only(attribute: &str, owner: &str) -> Self {
        Self::ReadOnlyAttribute {
            attribute: attribute.to_string(),
            owner: owner.to_string(),
        }
    }

    pub(crate) fn missing_attribute(attribute: &str, owner: &str) -> Self {
        Self::MissingAttribute {
            attribute: attribute.to_string(),
            owner: owner.to_string(),
        }
    }
}

impl From<ConversionError> for CsdmError {
    fn from(e: ConversionError) -> Self {
        match e {
            ConversionError::IncompatibleDimensions {
                from,
                to,
                from_unit,
                to_unit,
            } => Self::IncompatibleUnits {
                from: from_unit,
                to: to_unit,
                from_type: from.physical_type().to_string(),
                to_type: to.physical_type().to_string(),
            },
            ConversionError::ParseError(e) => Self::UnitParse(e),
        }
    }
}

/// Convenience type for `Result<T, CsdmError>`.
pub type CsdmResult<T> = Result<T, CsdmError>;
