//! Closed literal sets used by dependent variables.
//!
//! - [`NumericType`]: the twelve little-endian element types
//! - [`QuantityType`]: the per-point component layout, which fixes the
//!   component count `p`
//! - [`Encoding`]: how component buffers are stored in a file

use crate::errors::{CsdmError, CsdmResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element storage type of a dependent variable's components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl NumericType {
    pub const ALL: [NumericType; 12] = [
        NumericType::UInt8,
        NumericType::UInt16,
        NumericType::UInt32,
        NumericType::UInt64,
        NumericType::Int8,
        NumericType::Int16,
        NumericType::Int32,
        NumericType::Int64,
        NumericType::Float32,
        NumericType::Float64,
        NumericType::Complex64,
        NumericType::Complex128,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumericType::UInt8 => "uint8",
            NumericType::UInt16 => "uint16",
            NumericType::UInt32 => "uint32",
            NumericType::UInt64 => "uint64",
            NumericType::Int8 => "int8",
            NumericType::Int16 => "int16",
            NumericType::Int32 => "int32",
            NumericType::Int64 => "int64",
            NumericType::Float32 => "float32",
            NumericType::Float64 => "float64",
            NumericType::Complex64 => "complex64",
            NumericType::Complex128 => "complex128",
        }
    }

    /// Size of one element in bytes.
    pub fn item_size(&self) -> usize {
        match self {
            NumericType::UInt8 | NumericType::Int8 => 1,
            NumericType::UInt16 | NumericType::Int16 => 2,
            NumericType::UInt32 | NumericType::Int32 | NumericType::Float32 => 4,
            NumericType::UInt64
            | NumericType::Int64
            | NumericType::Float64
            | NumericType::Complex64 => 8,
            NumericType::Complex128 => 16,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, NumericType::Complex64 | NumericType::Complex128)
    }

    pub fn is_integer(&self) -> bool {
        !self.is_complex() && !matches!(self, NumericType::Float32 | NumericType::Float64)
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            NumericType::UInt8 | NumericType::UInt16 | NumericType::UInt32 | NumericType::UInt64
        )
    }

    /// The complex type able to hold values of this type after a Fourier transform.
    pub fn complex_counterpart(&self) -> NumericType {
        match self {
            NumericType::Float32 | NumericType::Complex64 => NumericType::Complex64,
            _ => NumericType::Complex128,
        }
    }

    fn literals() -> Vec<&'static str> {
        Self::ALL.iter().map(NumericType::as_str).collect()
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericType {
    type Err = CsdmError;

    fn from_str(s: &str) -> CsdmResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CsdmError::invalid_literal("numeric_type", s, &Self::literals()))
    }
}

/// Layout of the components stored at each grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuantityType {
    Scalar,
    Vector(usize),
    Pixel(usize),
    Matrix(usize, usize),
    SymmetricMatrix(usize),
}

impl QuantityType {
    const PATTERNS: [&'static str; 5] = [
        "scalar",
        "vector_n",
        "pixel_n",
        "matrix_n_m",
        "symmetric_matrix_n",
    ];

    /// Number of components `p` per grid point.
    ///
    /// Saturates at `usize::MAX` for layouts built directly with sizes too
    /// large to count; parsed layouts never overflow.
    ///
    /// ```
    /// use csdm_core::QuantityType;
    ///
    /// assert_eq!("matrix_13_3".parse::<QuantityType>().unwrap().component_count(), 39);
    /// assert_eq!("symmetric_matrix_10".parse::<QuantityType>().unwrap().component_count(), 55);
    /// ```
    pub fn component_count(&self) -> usize {
        self.checked_component_count().unwrap_or(usize::MAX)
    }

    fn checked_component_count(&self) -> Option<usize> {
        match *self {
            QuantityType::Scalar => Some(1),
            QuantityType::Vector(n) | QuantityType::Pixel(n) => Some(n),
            QuantityType::Matrix(n, m) => n.checked_mul(m),
            QuantityType::SymmetricMatrix(n) => n.checked_add(1)?.checked_mul(n).map(|c| c / 2),
        }
    }

    fn invalid(s: &str) -> CsdmError {
        CsdmError::invalid_literal("quantity_type", s, &Self::PATTERNS)
    }
}

impl Default for QuantityType {
    fn default() -> Self {
        QuantityType::Scalar
    }
}

impl fmt::Display for QuantityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityType::Scalar => write!(f, "scalar"),
            QuantityType::Vector(n) => write!(f, "vector_{n}"),
            QuantityType::Pixel(n) => write!(f, "pixel_{n}"),
            QuantityType::Matrix(n, m) => write!(f, "matrix_{n}_{m}"),
            QuantityType::SymmetricMatrix(n) => write!(f, "symmetric_matrix_{n}"),
        }
    }
}

impl FromStr for QuantityType {
    type Err = CsdmError;

    fn from_str(s: &str) -> CsdmResult<Self> {
        let tokens: Vec<&str> = s.split('_').collect();
        let (kind, numbers): (Vec<&str>, Vec<&str>) = tokens
            .iter()
            .copied()
            .partition(|t| !t.is_empty() && !t.chars().all(|c| c.is_ascii_digit()));

        let sizes = numbers
            .iter()
            .map(|n| n.parse::<usize>().map_err(|_| Self::invalid(s)))
            .collect::<CsdmResult<Vec<usize>>>()?;
        if sizes.contains(&0) {
            return Err(Self::invalid(s));
        }
        // numbers must trail the name
        if tokens[..kind.len()] != kind[..] {
            return Err(Self::invalid(s));
        }

        let quantity_type = match (kind.join("_").as_str(), sizes.as_slice()) {
            ("scalar", []) => QuantityType::Scalar,
            ("vector", [n]) => QuantityType::Vector(*n),
            ("pixel", [n]) => QuantityType::Pixel(*n),
            ("matrix", [n, m]) => QuantityType::Matrix(*n, *m),
            ("symmetric_matrix", [n]) => QuantityType::SymmetricMatrix(*n),
            _ => return Err(Self::invalid(s)),
        };
        match quantity_type.checked_component_count() {
            Some(_) => Ok(quantity_type),
            None => Err(Self::invalid(s)),
        }
    }
}

impl TryFrom<String> for QuantityType {
    type Error = CsdmError;

    fn try_from(value: String) -> CsdmResult<Self> {
        value.parse()
    }
}

impl From<QuantityType> for String {
    fn from(value: QuantityType) -> Self {
        value.to_string()
    }
}

/// On-disk representation of component buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// Each component is a base64 string of little-endian bytes.
    #[default]
    #[serde(rename = "base64")]
    Base64,
    /// Each component is a JSON list of numeric literals.
    #[serde(rename = "none")]
    Text,
    /// All components in one binary sidecar file.
    #[serde(rename = "raw")]
    Raw,
}

impl Encoding {
    const LITERALS: [&'static str; 3] = ["base64", "none", "raw"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Base64 => "base64",
            Encoding::Text => "none",
            Encoding::Raw => "raw",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = CsdmError;

    fn from_str(s: &str) -> CsdmResult<Self> {
        match s {
            "base64" => Ok(Encoding::Base64),
            "none" => Ok(Encoding::Text),
            "raw" => Ok(Encoding::Raw),
            _ => Err(CsdmError::invalid_literal("encoding", s, &Self::LITERALS)),
        }
    }
}
