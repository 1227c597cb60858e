//! Core Scientific Dataset Model.
//!
//! The data model lives in [`csdm_core`] and is re-exported here. This crate
//! adds the Fourier transform between a linear dimension and its reciprocal.
//!
//! ```
//! use csdm::{fourier, ComponentArray, DependentVariable, Dimension, LinearDimension, Quantity, QuantityType};
//!
//! let time = LinearDimension::new(4, Quantity::parse("0.5 s").unwrap()).unwrap();
//! let mut dimensions = vec![Dimension::Linear(time)];
//! let signal = ComponentArray::from_shape_vec(&[1, 4], vec![1.0f64, 0.0, 0.0, 0.0]).unwrap();
//! let mut variables = vec![DependentVariable::new(signal, QuantityType::Scalar).unwrap()];
//!
//! fourier::fft(&mut dimensions, &mut variables, 0).unwrap();
//! assert_eq!(dimensions[0].unit().unwrap().physical_type(), "frequency");
//! ```

pub use csdm_core::*;

pub mod fourier;
