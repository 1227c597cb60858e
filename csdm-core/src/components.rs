//! Typed component storage.
//!
//! A dependent variable's components live in a [`ComponentArray`], a closed
//! enum over the twelve [`NumericType`]s. Each variant holds an
//! `ndarray::ArrayD` whose leading axis is the component axis; the remaining
//! axes mirror the grid dimensions in reverse declaration order.
//!
//! The [`Element`] trait carries everything the codec and the arithmetic
//! helpers need to know about one element type.

use crate::errors::{CsdmError, CsdmResult};
use crate::types::NumericType;
use ndarray::{ArrayD, Axis, IxDyn};
use num::complex::{Complex32, Complex64};
use num::Zero;
use serde_json::Value;
use std::fmt;

/// A storable element type.
pub trait Element: Copy + PartialEq + Zero + fmt::Debug + Send + Sync + 'static {
    const NUMERIC_TYPE: NumericType;
    /// Number of JSON scalars used by the text encoding (2 for complex).
    const SCALARS: usize;

    /// Appends the little-endian bytes of `self`.
    fn write_le(self, out: &mut Vec<u8>);
    /// Reads one element from exactly `NUMERIC_TYPE.item_size()` bytes.
    fn read_le(bytes: &[u8]) -> Self;
    /// Appends the JSON scalar(s) of `self`, real part first for complex values.
    fn push_json(self, out: &mut Vec<Value>);
    /// Builds one element from `SCALARS` JSON scalars.
    fn from_json(values: &[Value]) -> CsdmResult<Self>;

    fn to_complex(self) -> Complex64;
    /// Converts from complex; real types keep the real part.
    fn from_complex(value: Complex64) -> Self;

    /// Exact for integer types; floats truncate and complex values keep the
    /// real part.
    fn to_i128(self) -> i128;
    /// Integer targets saturate at their bounds.
    fn from_i128(value: i128) -> Self;

    fn into_components(array: ArrayD<Self>) -> ComponentArray;
    fn view(components: &ComponentArray) -> Option<&ArrayD<Self>>;
}

fn json_to_f64(value: &Value) -> CsdmResult<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CsdmError::Decode(format!("'{n}' is not a finite number"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CsdmError::Decode(format!("'{s}' is not a numeric literal"))),
        Value::Null => Ok(f64::NAN),
        other => Err(CsdmError::Decode(format!("'{other}' is not a numeric literal"))),
    }
}

macro_rules! impl_integer_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const NUMERIC_TYPE: NumericType = NumericType::$variant;
                const SCALARS: usize = 1;

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }

                fn push_json(self, out: &mut Vec<Value>) {
                    out.push(Value::from(self));
                }

                fn from_json(values: &[Value]) -> CsdmResult<Self> {
                    let value = &values[0];
                    if let Some(n) = value.as_i64() {
                        return <$t>::try_from(n).map_err(|_| {
                            CsdmError::Decode(format!(
                                "{n} is out of range for {}",
                                NumericType::$variant
                            ))
                        });
                    }
                    if let Some(n) = value.as_u64() {
                        return <$t>::try_from(n).map_err(|_| {
                            CsdmError::Decode(format!(
                                "{n} is out of range for {}",
                                NumericType::$variant
                            ))
                        });
                    }
                    Ok(json_to_f64(value)? as $t)
                }

                fn to_complex(self) -> Complex64 {
                    Complex64::new(self as f64, 0.0)
                }

                fn from_complex(value: Complex64) -> Self {
                    value.re as $t
                }

                fn to_i128(self) -> i128 {
                    i128::from(self)
                }

                fn from_i128(value: i128) -> Self {
                    <$t>::try_from(value).unwrap_or(if value < 0 { <$t>::MIN } else { <$t>::MAX })
                }

                fn into_components(array: ArrayD<Self>) -> ComponentArray {
                    ComponentArray::$variant(array)
                }

                fn view(components: &ComponentArray) -> Option<&ArrayD<Self>> {
                    match components {
                        ComponentArray::$variant(array) => Some(array),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_float_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const NUMERIC_TYPE: NumericType = NumericType::$variant;
                const SCALARS: usize = 1;

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }

                fn push_json(self, out: &mut Vec<Value>) {
                    out.push(Value::from(self as f64));
                }

                fn from_json(values: &[Value]) -> CsdmResult<Self> {
                    Ok(json_to_f64(&values[0])? as $t)
                }

                fn to_complex(self) -> Complex64 {
                    Complex64::new(self as f64, 0.0)
                }

                fn from_complex(value: Complex64) -> Self {
                    value.re as $t
                }

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128(value: i128) -> Self {
                    value as $t
                }

                fn into_components(array: ArrayD<Self>) -> ComponentArray {
                    ComponentArray::$variant(array)
                }

                fn view(components: &ComponentArray) -> Option<&ArrayD<Self>> {
                    match components {
                        ComponentArray::$variant(array) => Some(array),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_complex_element {
    ($($t:ty, $part:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const NUMERIC_TYPE: NumericType = NumericType::$variant;
                const SCALARS: usize = 2;

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.re.to_le_bytes());
                    out.extend_from_slice(&self.im.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let half = bytes.len() / 2;
                    <$t>::new(<$part>::read_le(&bytes[..half]), <$part>::read_le(&bytes[half..]))
                }

                fn push_json(self, out: &mut Vec<Value>) {
                    out.push(Value::from(self.re as f64));
                    out.push(Value::from(self.im as f64));
                }

                fn from_json(values: &[Value]) -> CsdmResult<Self> {
                    Ok(<$t>::new(
                        json_to_f64(&values[0])? as $part,
                        json_to_f64(&values[1])? as $part,
                    ))
                }

                fn to_complex(self) -> Complex64 {
                    Complex64::new(self.re as f64, self.im as f64)
                }

                fn from_complex(value: Complex64) -> Self {
                    <$t>::new(value.re as $part, value.im as $part)
                }

                fn to_i128(self) -> i128 {
                    self.re as i128
                }

                fn from_i128(value: i128) -> Self {
                    <$t>::new(value as $part, 0.0)
                }

                fn into_components(array: ArrayD<Self>) -> ComponentArray {
                    ComponentArray::$variant(array)
                }

                fn view(components: &ComponentArray) -> Option<&ArrayD<Self>> {
                    match components {
                        ComponentArray::$variant(array) => Some(array),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_integer_element!(
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
);
impl_float_element!(f32 => Float32, f64 => Float64);
impl_complex_element!(Complex32, f32 => Complex64, Complex64, f64 => Complex128);

/// Runs `$body` with `$t` bound to the element type of `$numeric_type`.
macro_rules! with_element_type {
    ($numeric_type:expr, $t:ident => $body:expr) => {
        match $numeric_type {
            $crate::types::NumericType::UInt8 => {
                type $t = u8;
                $body
            }
            $crate::types::NumericType::UInt16 => {
                type $t = u16;
                $body
            }
            $crate::types::NumericType::UInt32 => {
                type $t = u32;
                $body
            }
            $crate::types::NumericType::UInt64 => {
                type $t = u64;
                $body
            }
            $crate::types::NumericType::Int8 => {
                type $t = i8;
                $body
            }
            $crate::types::NumericType::Int16 => {
                type $t = i16;
                $body
            }
            $crate::types::NumericType::Int32 => {
                type $t = i32;
                $body
            }
            $crate::types::NumericType::Int64 => {
                type $t = i64;
                $body
            }
            $crate::types::NumericType::Float32 => {
                type $t = f32;
                $body
            }
            $crate::types::NumericType::Float64 => {
                type $t = f64;
                $body
            }
            $crate::types::NumericType::Complex64 => {
                type $t = ::num::complex::Complex32;
                $body
            }
            $crate::types::NumericType::Complex128 => {
                type $t = ::num::complex::Complex64;
                $body
            }
        }
    };
}
pub(crate) use with_element_type;

/// Runs `$body` with `$array` bound to the inner array of any variant.
macro_rules! on_array {
    ($components:expr, $array:ident => $body:expr) => {
        match $components {
            ComponentArray::UInt8($array) => $body,
            ComponentArray::UInt16($array) => $body,
            ComponentArray::UInt32($array) => $body,
            ComponentArray::UInt64($array) => $body,
            ComponentArray::Int8($array) => $body,
            ComponentArray::Int16($array) => $body,
            ComponentArray::Int32($array) => $body,
            ComponentArray::Int64($array) => $body,
            ComponentArray::Float32($array) => $body,
            ComponentArray::Float64($array) => $body,
            ComponentArray::Complex64($array) => $body,
            ComponentArray::Complex128($array) => $body,
        }
    };
}
pub(crate) use on_array;

/// Like [`on_array`], wrapping the resulting array back into the same variant.
macro_rules! map_array {
    ($components:expr, $array:ident => $body:expr) => {
        match $components {
            ComponentArray::UInt8($array) => ComponentArray::UInt8($body),
            ComponentArray::UInt16($array) => ComponentArray::UInt16($body),
            ComponentArray::UInt32($array) => ComponentArray::UInt32($body),
            ComponentArray::UInt64($array) => ComponentArray::UInt64($body),
            ComponentArray::Int8($array) => ComponentArray::Int8($body),
            ComponentArray::Int16($array) => ComponentArray::Int16($body),
            ComponentArray::Int32($array) => ComponentArray::Int32($body),
            ComponentArray::Int64($array) => ComponentArray::Int64($body),
            ComponentArray::Float32($array) => ComponentArray::Float32($body),
            ComponentArray::Float64($array) => ComponentArray::Float64($body),
            ComponentArray::Complex64($array) => ComponentArray::Complex64($body),
            ComponentArray::Complex128($array) => ComponentArray::Complex128($body),
        }
    };
}

/// Components of a dependent variable, shaped `(p, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentArray {
    UInt8(ArrayD<u8>),
    UInt16(ArrayD<u16>),
    UInt32(ArrayD<u32>),
    UInt64(ArrayD<u64>),
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Complex64(ArrayD<Complex32>),
    Complex128(ArrayD<Complex64>),
}

impl<T: Element> From<ArrayD<T>> for ComponentArray {
    fn from(array: ArrayD<T>) -> Self {
        T::into_components(array)
    }
}

impl ComponentArray {
    /// A zero-filled array.
    pub fn zeros(numeric_type: NumericType, shape: &[usize]) -> Self {
        with_element_type!(numeric_type, T => {
            ArrayD::<T>::zeros(IxDyn(shape)).into()
        })
    }

    /// Builds an array from row-major `values`.
    pub fn from_shape_vec<T: Element>(shape: &[usize], values: Vec<T>) -> CsdmResult<Self> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|e| {
            CsdmError::InvalidValue(format!("cannot build components of shape {shape:?}: {e}"))
        })?;
        Ok(array.into())
    }

    pub fn numeric_type(&self) -> NumericType {
        on_array!(self, array => element_type_of(array))
    }

    pub fn shape(&self) -> &[usize] {
        on_array!(self, array => array.shape())
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        on_array!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the leading (component) axis.
    pub fn component_count(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    /// Borrow the inner array if it holds elements of type `T`.
    pub fn as_array<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::view(self)
    }

    /// Reinterprets the row-major element sequence with a new shape.
    pub fn reshape(&self, shape: &[usize]) -> CsdmResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != self.len() {
            return Err(CsdmError::InvalidValue(format!(
                "cannot reshape {} elements into shape {shape:?}",
                self.len()
            )));
        }
        Ok(self.resized(shape))
    }

    /// Reshapes after truncating or zero-padding the row-major elements to fit.
    pub fn resized(&self, shape: &[usize]) -> Self {
        map_array!(self, array => refill(array, shape))
    }

    /// All elements widened to `complex128`.
    pub fn to_complex128(&self) -> ArrayD<Complex64> {
        on_array!(self, array => array.mapv(Element::to_complex))
    }

    /// All elements as `f64`; fails for complex types.
    pub fn to_f64(&self) -> CsdmResult<ArrayD<f64>> {
        if self.numeric_type().is_complex() {
            return Err(CsdmError::InvalidValue(format!(
                "cannot represent {} components as real numbers",
                self.numeric_type()
            )));
        }
        Ok(self.to_complex128().mapv(|c| c.re))
    }

    /// Builds an array of `numeric_type` from complex values.
    ///
    /// Real targets keep the real part; integer targets saturate.
    pub fn from_complex128(values: &ArrayD<Complex64>, numeric_type: NumericType) -> Self {
        with_element_type!(numeric_type, T => {
            values.mapv(<T as Element>::from_complex).into()
        })
    }

    /// All elements as `i128`, exact for every integer type.
    pub fn to_i128(&self) -> ArrayD<i128> {
        on_array!(self, array => array.mapv(Element::to_i128))
    }

    /// Builds an array of `numeric_type` from integers; integer targets
    /// saturate at their bounds.
    pub fn from_i128(values: &ArrayD<i128>, numeric_type: NumericType) -> Self {
        with_element_type!(numeric_type, T => {
            values.mapv(<T as Element>::from_i128).into()
        })
    }

    /// Converts the elements to another numeric type.
    ///
    /// Integer sources convert through `i128`, so 64-bit values survive.
    pub fn cast(&self, numeric_type: NumericType) -> Self {
        if numeric_type == self.numeric_type() {
            return self.clone();
        }
        if self.numeric_type().is_integer() {
            return Self::from_i128(&self.to_i128(), numeric_type);
        }
        Self::from_complex128(&self.to_complex128(), numeric_type)
    }

    /// Real part, as the matching real type.
    pub fn real(&self) -> Self {
        let target = real_counterpart(self.numeric_type());
        Self::from_complex128(&self.to_complex128().mapv(|c| Complex64::new(c.re, 0.0)), target)
    }

    /// Imaginary part, as the matching real type.
    pub fn imag(&self) -> Self {
        let target = real_counterpart(self.numeric_type());
        Self::from_complex128(&self.to_complex128().mapv(|c| Complex64::new(c.im, 0.0)), target)
    }

    /// Magnitude, as the matching real type.
    pub fn abs(&self) -> Self {
        let target = real_counterpart(self.numeric_type());
        Self::from_complex128(
            &self.to_complex128().mapv(|c| Complex64::new(c.norm(), 0.0)),
            target,
        )
    }

    /// Complex conjugate; real arrays are returned unchanged.
    pub fn conj(&self) -> Self {
        match self {
            ComponentArray::Complex64(array) => ComponentArray::Complex64(array.mapv(|c| c.conj())),
            ComponentArray::Complex128(array) => {
                ComponentArray::Complex128(array.mapv(|c| c.conj()))
            }
            other => other.clone(),
        }
    }

    /// Sum along `axis`, keeping the numeric type.
    pub fn sum_axis(&self, axis: usize) -> CsdmResult<Self> {
        self.check_axis(axis)?;
        if self.numeric_type().is_integer() {
            let summed = self.to_i128().sum_axis(Axis(axis));
            return Ok(Self::from_i128(&summed, self.numeric_type()));
        }
        let summed = self.to_complex128().sum_axis(Axis(axis));
        Ok(Self::from_complex128(&summed, self.numeric_type()))
    }

    /// Mean along `axis`, as `float64` (or `complex128` for complex input).
    pub fn mean_axis(&self, axis: usize) -> CsdmResult<Self> {
        self.check_axis(axis)?;
        let target = if self.numeric_type().is_complex() {
            NumericType::Complex128
        } else {
            NumericType::Float64
        };
        let count = self.shape()[axis];
        if count == 0 {
            return Err(CsdmError::InvalidValue(format!(
                "cannot average over empty axis {axis}"
            )));
        }
        let mean = self
            .to_complex128()
            .sum_axis(Axis(axis))
            .mapv(|c| c / count as f64);
        Ok(Self::from_complex128(&mean, target))
    }

    fn check_axis(&self, axis: usize) -> CsdmResult<()> {
        let ndim = self.shape().len();
        if axis >= ndim {
            return Err(CsdmError::InvalidValue(format!(
                "axis {axis} is out of bounds for components with {ndim} axes"
            )));
        }
        Ok(())
    }
}

fn refill<T: Element>(array: &ArrayD<T>, shape: &[usize]) -> ArrayD<T> {
    let mut out = ArrayD::<T>::zeros(IxDyn(shape));
    out.iter_mut().zip(array.iter()).for_each(|(o, v)| *o = *v);
    out
}

fn element_type_of<T: Element>(_: &ArrayD<T>) -> NumericType {
    T::NUMERIC_TYPE
}

fn real_counterpart(numeric_type: NumericType) -> NumericType {
    match numeric_type {
        NumericType::Complex64 => NumericType::Float32,
        NumericType::Complex128 => NumericType::Float64,
        other => other,
    }
}
