//! Data model of the Core Scientific Dataset Model (CSDM).
//!
//! A dataset is a grid spanned by [`Dimension`]s, with one or more
//! [`DependentVariable`]s sampled on it. This crate holds the model itself:
//! dimensions with their reciprocal counterparts, dependent-variable
//! components and their on-disk encodings, and the [`units`] system that
//! every quantitative attribute is expressed in.

pub mod codec;
pub mod components;
pub mod dependent_variable;
mod dict;
pub mod dimension;
pub mod errors;
pub mod options;
pub mod types;
pub mod units;

pub use codec::{decode_components, encode_components, ComponentSource, EncodedComponents};
pub use components::{ComponentArray, Element};
pub use dependent_variable::{DependentVariable, SparseSampling, Storage};
pub use dict::Dict;
pub use dimension::{
    as_dimension, Coordinates, Dimension, DimensionMeta, LabeledDimension, LinearDimension,
    MonotonicDimension, ReciprocalDimension,
};
pub use errors::{CsdmError, CsdmResult};
pub use options::{ReadOptions, WriteOptions};
pub use types::{Encoding, NumericType, QuantityType};
pub use units::{Quantity, Unit};
