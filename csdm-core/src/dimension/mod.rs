//! Coordinate axes of the measurement grid.
//!
//! A [`Dimension`] is one of three closed variants:
//!
//! - [`LinearDimension`]: `count` evenly spaced coordinates generated from an
//!   increment, paired with a Fourier-conjugate [`ReciprocalDimension`]
//! - [`MonotonicDimension`]: explicit strictly ordered coordinates
//! - [`LabeledDimension`]: ordered string labels, not quantitative
//!
//! Attributes that only some variants carry are exposed on [`Dimension`] as
//! fallible accessors returning [`CsdmError::MissingAttribute`] for the
//! others.

mod labeled;
mod linear;
mod monotonic;
mod reciprocal;

pub use labeled::LabeledDimension;
pub use linear::LinearDimension;
pub use monotonic::MonotonicDimension;
pub use reciprocal::{DimensionMeta, ReciprocalDimension};

use crate::dict::{self, json_type_name, Dict};
use crate::errors::{CsdmError, CsdmResult};
use crate::units::{Quantity, Unit};
use monotonic::is_strictly_monotonic;
use serde_json::Value;
use std::ops::Range;

/// Relative tolerance used when deciding whether values are evenly spaced.
const SPACING_TOLERANCE: f64 = 1e-5;

const TYPES: [&str; 3] = ["linear", "monotonic", "labeled"];

#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    Linear(LinearDimension),
    Monotonic(MonotonicDimension),
    Labeled(LabeledDimension),
}

/// Coordinates of a dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    /// Values in the dimension unit.
    Values(Vec<f64>),
    Labels(Vec<String>),
}

impl Coordinates {
    pub fn len(&self) -> usize {
        match self {
            Coordinates::Values(values) => values.len(),
            Coordinates::Labels(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_values(&self) -> Option<&[f64]> {
        match self {
            Coordinates::Values(values) => Some(values),
            Coordinates::Labels(_) => None,
        }
    }
}

impl From<LinearDimension> for Dimension {
    fn from(value: LinearDimension) -> Self {
        Dimension::Linear(value)
    }
}

impl From<MonotonicDimension> for Dimension {
    fn from(value: MonotonicDimension) -> Self {
        Dimension::Monotonic(value)
    }
}

impl From<LabeledDimension> for Dimension {
    fn from(value: LabeledDimension) -> Self {
        Dimension::Labeled(value)
    }
}

impl Dimension {
    /// Reads a dimension object, dispatching on its `type` key.
    pub fn from_dict(value: &Value) -> CsdmResult<Self> {
        let dict = dict::as_object(value, "Dimension")?;
        let kind = dict::required(dict, "type", "Dimension")?;
        match kind.as_str() {
            Some("linear") => LinearDimension::from_dict(value).map(Dimension::Linear),
            Some("monotonic") => MonotonicDimension::from_dict(value).map(Dimension::Monotonic),
            Some("labeled") => LabeledDimension::from_dict(value).map(Dimension::Labeled),
            Some(other) => Err(CsdmError::invalid_literal("type", other, &TYPES)),
            None => Err(CsdmError::invalid_literal("type", &kind.to_string(), &TYPES)),
        }
    }

    pub fn to_dict(&self) -> Value {
        match self {
            Dimension::Linear(d) => d.to_dict(),
            Dimension::Monotonic(d) => d.to_dict(),
            Dimension::Labeled(d) => d.to_dict(),
        }
    }

    /// The `type` literal: `linear`, `monotonic` or `labeled`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dimension::Linear(_) => "linear",
            Dimension::Monotonic(_) => "monotonic",
            Dimension::Labeled(_) => "labeled",
        }
    }

    pub fn subtype_name(&self) -> &'static str {
        match self {
            Dimension::Linear(_) => "LinearDimension",
            Dimension::Monotonic(_) => "MonotonicDimension",
            Dimension::Labeled(_) => "LabeledDimension",
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Dimension::Linear(d) => d.count(),
            Dimension::Monotonic(d) => d.count(),
            Dimension::Labeled(d) => d.count(),
        }
    }

    pub fn is_quantitative(&self) -> bool {
        !matches!(self, Dimension::Labeled(_))
    }

    pub fn meta(&self) -> &DimensionMeta {
        match self {
            Dimension::Linear(d) => &d.meta,
            Dimension::Monotonic(d) => &d.meta,
            Dimension::Labeled(d) => &d.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut DimensionMeta {
        match self {
            Dimension::Linear(d) => &mut d.meta,
            Dimension::Monotonic(d) => &mut d.meta,
            Dimension::Labeled(d) => &mut d.meta,
        }
    }

    pub fn label(&self) -> &str {
        &self.meta().label
    }

    pub fn description(&self) -> &str {
        &self.meta().description
    }

    pub fn application(&self) -> &Dict {
        &self.meta().application
    }

    pub fn as_linear(&self) -> Option<&LinearDimension> {
        match self {
            Dimension::Linear(d) => Some(d),
            _ => None,
        }
    }

    pub fn unit(&self) -> CsdmResult<&Unit> {
        match self {
            Dimension::Linear(d) => Ok(d.unit()),
            Dimension::Monotonic(d) => Ok(d.unit()),
            Dimension::Labeled(_) => Err(self.missing("unit")),
        }
    }

    pub fn increment(&self) -> CsdmResult<&Quantity> {
        match self {
            Dimension::Linear(d) => Ok(d.increment()),
            Dimension::Monotonic(d) => d.increment(),
            Dimension::Labeled(_) => Err(self.missing("increment")),
        }
    }

    pub fn coordinates_offset(&self) -> CsdmResult<&Quantity> {
        match self {
            Dimension::Linear(d) => Ok(d.coordinates_offset()),
            Dimension::Monotonic(d) => d.coordinates_offset(),
            Dimension::Labeled(_) => Err(self.missing("coordinates_offset")),
        }
    }

    pub fn origin_offset(&self) -> CsdmResult<&Quantity> {
        match self {
            Dimension::Linear(d) => Ok(d.origin_offset()),
            Dimension::Monotonic(d) => Ok(d.origin_offset()),
            Dimension::Labeled(_) => Err(self.missing("origin_offset")),
        }
    }

    pub fn period(&self) -> CsdmResult<&Quantity> {
        match self {
            Dimension::Linear(d) => Ok(d.period()),
            Dimension::Monotonic(d) => Ok(d.period()),
            Dimension::Labeled(_) => Err(self.missing("period")),
        }
    }

    pub fn quantity_name(&self) -> CsdmResult<String> {
        match self {
            Dimension::Linear(d) => Ok(d.quantity_name()),
            Dimension::Monotonic(d) => Ok(d.quantity_name()),
            Dimension::Labeled(_) => Err(self.missing("quantity_name")),
        }
    }

    pub fn reciprocal(&self) -> CsdmResult<&ReciprocalDimension> {
        match self {
            Dimension::Linear(d) => Ok(d.reciprocal()),
            Dimension::Monotonic(d) => Ok(d.reciprocal()),
            Dimension::Labeled(_) => Err(self.missing("reciprocal")),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        match self {
            Dimension::Linear(d) => Coordinates::Values(d.coordinates()),
            Dimension::Monotonic(d) => Coordinates::Values(d.coordinates().to_vec()),
            Dimension::Labeled(d) => Coordinates::Labels(d.labels().to_vec()),
        }
    }

    /// Coordinates shifted by `origin_offset`.
    pub fn absolute_coordinates(&self) -> CsdmResult<Vec<f64>> {
        match self {
            Dimension::Linear(d) => Ok(d.absolute_coordinates()),
            Dimension::Monotonic(d) => Ok(d.absolute_coordinates()),
            Dimension::Labeled(_) => Err(self.missing("absolute_coordinates")),
        }
    }

    /// Plot axis label, `"<label or quantity name> / (<unit>)"`.
    ///
    /// Dimensionless and labeled dimensions use the bare label.
    pub fn axis_label(&self) -> String {
        let unit = match self.unit() {
            Ok(unit) => unit,
            Err(_) => return self.label().to_string(),
        };
        let label = if self.label().trim().is_empty() {
            self.quantity_name().unwrap_or_default()
        } else {
            self.label().to_string()
        };
        if unit.is_dimensionless() {
            label
        } else {
            format!("{label} / ({unit})")
        }
    }

    pub fn set_count(&mut self, count: usize) -> CsdmResult<()> {
        match self {
            Dimension::Linear(d) => d.set_count(count),
            Dimension::Monotonic(d) => d.set_count(count),
            Dimension::Labeled(d) => d.set_count(count),
        }
    }

    pub fn set_coordinates_offset(&mut self, value: &Quantity) -> CsdmResult<()> {
        match self {
            Dimension::Linear(d) => d.set_coordinates_offset(value),
            Dimension::Monotonic(d) => d.set_coordinates_offset(value),
            Dimension::Labeled(_) => Err(CsdmError::missing_attribute(
                "coordinates_offset",
                "LabeledDimension",
            )),
        }
    }

    /// Copies label, description and application from `other`, plus the
    /// quantitative fields when both dimensions have compatible units.
    pub fn copy_metadata(&mut self, other: &Dimension) -> CsdmResult<()> {
        *self.meta_mut() = other.meta().clone();
        let compatible = match (self.unit(), other.unit()) {
            (Ok(a), Ok(b)) => a.is_compatible(b),
            _ => false,
        };
        if !compatible {
            return Ok(());
        }
        match (self, other) {
            (Dimension::Linear(a), Dimension::Linear(b)) => a.copy_quantities(
                Some(b.coordinates_offset()),
                b.origin_offset(),
                b.period(),
                b.explicit_quantity_name(),
                b.reciprocal(),
            ),
            (Dimension::Linear(a), Dimension::Monotonic(b)) => a.copy_quantities(
                None,
                b.origin_offset(),
                b.period(),
                b.explicit_quantity_name(),
                b.reciprocal(),
            ),
            (Dimension::Monotonic(a), Dimension::Linear(b)) => a.copy_quantities(
                b.origin_offset(),
                b.period(),
                b.explicit_quantity_name(),
                b.reciprocal(),
            ),
            (Dimension::Monotonic(a), Dimension::Monotonic(b)) => a.copy_quantities(
                b.origin_offset(),
                b.period(),
                b.explicit_quantity_name(),
                b.reciprocal(),
            ),
            _ => Ok(()),
        }
    }

    /// Sub-dimension of the points selected by `range` and `step`.
    pub fn slice(&self, range: Range<usize>, step: usize) -> CsdmResult<Self> {
        match self {
            Dimension::Linear(d) => d.slice(range, step).map(Dimension::Linear),
            Dimension::Monotonic(d) => d.slice(range, step).map(Dimension::Monotonic),
            Dimension::Labeled(d) => d.slice(range, step).map(Dimension::Labeled),
        }
    }

    fn missing(&self, attribute: &str) -> CsdmError {
        CsdmError::missing_attribute(attribute, self.subtype_name())
    }
}

/// Builds the most specific dimension for a list of values.
///
/// Strings give a labeled dimension. Numbers give a linear dimension when
/// evenly spaced, a monotonic one when strictly ordered, and an error
/// otherwise.
///
/// ```
/// use csdm_core::dimension::{as_dimension, Dimension};
/// use csdm_core::units::Unit;
/// use serde_json::json;
///
/// let s = Unit::parse("s").unwrap();
/// let dim = as_dimension(&[json!(1), json!(3), json!(5)], Some(&s)).unwrap();
/// assert_eq!(dim.type_name(), "linear");
/// assert!(as_dimension(&[json!(1), json!(5), json!(3)], Some(&s)).is_err());
/// ```
pub fn as_dimension(values: &[Value], unit: Option<&Unit>) -> CsdmResult<Dimension> {
    if values.is_empty() {
        return Err(CsdmError::InvalidValue(
            "cannot build a dimension from an empty list".to_string(),
        ));
    }
    if values.iter().any(Value::is_string) {
        return LabeledDimension::from_values(values).map(Dimension::Labeled);
    }

    let numbers = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value.as_f64().ok_or_else(|| {
                CsdmError::InvalidValue(format!(
                    "expected numeric coordinates, found {} at index {index}",
                    json_type_name(value)
                ))
            })
        })
        .collect::<CsdmResult<Vec<f64>>>()?;
    let unit = unit.cloned().unwrap_or_default();

    if let Some(increment) = even_spacing(&numbers) {
        let mut linear = LinearDimension::new(numbers.len(), Quantity::new(increment, unit.clone()))?;
        linear.set_coordinates_offset(&Quantity::new(numbers[0], unit))?;
        return Ok(Dimension::Linear(linear));
    }
    if is_strictly_monotonic(&numbers) {
        return MonotonicDimension::new(numbers, unit).map(Dimension::Monotonic);
    }
    Err(CsdmError::InvalidValue(
        "Invalid array for Dimension object: values are neither evenly spaced nor \
         strictly monotonic"
            .to_string(),
    ))
}

fn even_spacing(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let increment = values[1] - values[0];
    if increment == 0.0 {
        return None;
    }
    values
        .windows(2)
        .all(|w| ((w[1] - w[0]) - increment).abs() <= SPACING_TOLERANCE * increment.abs())
        .then_some(increment)
}

/// Converts `value` to `unit`, treating a bare `0` or `inf` as unit-agnostic.
pub(crate) fn convert_to_unit(value: &Quantity, unit: &Unit) -> CsdmResult<Quantity> {
    if value.unit().is_dimensionless()
        && !unit.is_dimensionless()
        && (value.value() == 0.0 || value.is_infinite())
    {
        return Ok(Quantity::new(value.value(), unit.clone()));
    }
    Ok(value.to(unit)?)
}

pub(crate) fn slice_indices(
    range: Range<usize>,
    step: usize,
    count: usize,
) -> CsdmResult<Vec<usize>> {
    if step == 0 {
        return Err(CsdmError::InvalidValue(
            "slice step cannot be zero".to_string(),
        ));
    }
    let indices: Vec<usize> = (range.start..range.end.min(count)).step_by(step).collect();
    if indices.is_empty() {
        return Err(CsdmError::InvalidValue(format!(
            "slice {}..{} selects no points from a dimension of count {count}",
            range.start, range.end
        )));
    }
    Ok(indices)
}
