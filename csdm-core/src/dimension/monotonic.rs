//! Dimensions with explicit, strictly ordered coordinates.

use super::reciprocal::{DimensionMeta, ReciprocalDimension};
use super::{convert_to_unit, slice_indices};
use crate::dict::{self, Dict};
use crate::errors::{CsdmError, CsdmResult};
use crate::units::{Quantity, Unit};
use serde_json::Value;
use std::ops::Range;

const OWNER: &str = "MonotonicDimension";

#[derive(Debug, Clone, PartialEq)]
pub struct MonotonicDimension {
    pub meta: DimensionMeta,
    coordinates: Vec<f64>,
    unit: Unit,
    origin_offset: Quantity,
    period: Quantity,
    quantity_name: Option<String>,
    reciprocal: ReciprocalDimension,
}

impl MonotonicDimension {
    /// Builds a dimension from coordinate values in `unit`.
    ///
    /// Ordering is not checked here; [`as_dimension`](super::as_dimension)
    /// and [`set_coordinates`](Self::set_coordinates) enforce it.
    pub fn new(coordinates: Vec<f64>, unit: Unit) -> CsdmResult<Self> {
        if coordinates.is_empty() {
            return Err(CsdmError::InvalidValue(
                "a monotonic dimension needs at least one coordinate".to_string(),
            ));
        }
        Ok(Self {
            meta: DimensionMeta::default(),
            coordinates,
            origin_offset: Quantity::zero(unit.clone()),
            period: Quantity::infinite(unit.clone()),
            quantity_name: None,
            reciprocal: ReciprocalDimension::new(&unit),
            unit,
        })
    }

    /// Builds a dimension from quantities, expressed in the unit of the first.
    pub fn from_quantities(quantities: &[Quantity]) -> CsdmResult<Self> {
        let unit = quantities
            .first()
            .map(|q| q.unit().clone())
            .unwrap_or_default();
        let coordinates = quantities
            .iter()
            .map(|q| q.value_in(&unit))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(coordinates, unit)
    }

    pub fn from_dict(value: &Value) -> CsdmResult<Self> {
        let dict = dict::as_object(value, OWNER)?;
        let coordinates = dict::required(dict, "coordinates", OWNER)?
            .as_array()
            .ok_or_else(|| {
                CsdmError::InvalidValue(format!("{OWNER} 'coordinates' must be a list"))
            })?;
        let quantities = coordinates
            .iter()
            .map(|c| dict::quantity_value(c, "coordinates", OWNER))
            .collect::<CsdmResult<Vec<_>>>()?;

        let mut dimension = Self::from_quantities(&quantities)?;
        dimension.meta = DimensionMeta::from_dict(dict, OWNER)?;
        if let Some(q) = dict::quantity(dict, "origin_offset", OWNER)? {
            dimension.set_origin_offset(&q)?;
        }
        if let Some(q) = dict::quantity(dict, "period", OWNER)? {
            dimension.set_period(&q)?;
        }
        dimension.quantity_name = dict::string(dict, "quantity_name", OWNER)?;
        if let Some(reciprocal) = dict.get("reciprocal") {
            dimension.reciprocal = ReciprocalDimension::from_dict(reciprocal, &dimension.unit)?;
        }
        Ok(dimension)
    }

    pub fn to_dict(&self) -> Value {
        let mut dict = Dict::new();
        dict.insert("type".into(), Value::from("monotonic"));
        let coordinates = self
            .coordinates
            .iter()
            .map(|&c| Value::from(Quantity::new(c, self.unit.clone()).format()))
            .collect();
        dict.insert("coordinates".into(), Value::Array(coordinates));
        if self.origin_offset.value() != 0.0 {
            dict.insert("origin_offset".into(), Value::from(self.origin_offset.format()));
        }
        if !self.period.is_infinite() {
            dict.insert("period".into(), Value::from(self.period.format()));
        }
        if let Some(name) = &self.quantity_name {
            dict.insert("quantity_name".into(), Value::from(name.as_str()));
        }
        self.meta.write(&mut dict);
        if let Some(reciprocal) = self.reciprocal.to_dict() {
            dict.insert("reciprocal".into(), reciprocal);
        }
        Value::Object(dict)
    }

    pub fn count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn absolute_coordinates(&self) -> Vec<f64> {
        let origin = self.origin_offset.value();
        self.coordinates.iter().map(|c| c + origin).collect()
    }

    pub fn origin_offset(&self) -> &Quantity {
        &self.origin_offset
    }

    pub fn period(&self) -> &Quantity {
        &self.period
    }

    pub fn quantity_name(&self) -> String {
        self.quantity_name
            .clone()
            .unwrap_or_else(|| self.unit.physical_type().to_string())
    }

    pub fn reciprocal(&self) -> &ReciprocalDimension {
        &self.reciprocal
    }

    pub fn reciprocal_mut(&mut self) -> &mut ReciprocalDimension {
        &mut self.reciprocal
    }

    /// Monotonic dimensions have no generation rule, so they have no increment.
    pub fn increment(&self) -> CsdmResult<&Quantity> {
        Err(CsdmError::missing_attribute("increment", OWNER))
    }

    pub fn coordinates_offset(&self) -> CsdmResult<&Quantity> {
        Err(CsdmError::missing_attribute("coordinates_offset", OWNER))
    }

    pub fn set_coordinates_offset(&mut self, _value: &Quantity) -> CsdmResult<()> {
        Err(CsdmError::read_only("coordinates_offset", OWNER))
    }

    /// Replaces the coordinates, which must be strictly monotonic.
    pub fn set_coordinates(&mut self, coordinates: Vec<f64>) -> CsdmResult<()> {
        if coordinates.is_empty() {
            return Err(CsdmError::InvalidValue(
                "a monotonic dimension needs at least one coordinate".to_string(),
            ));
        }
        if !is_strictly_monotonic(&coordinates) {
            return Err(CsdmError::InvalidValue(
                "coordinates must be strictly increasing or strictly decreasing".to_string(),
            ));
        }
        self.coordinates = coordinates;
        Ok(())
    }

    /// Truncates to the first `count` coordinates. The count cannot grow.
    pub fn set_count(&mut self, count: usize) -> CsdmResult<()> {
        let current = self.count();
        if count == 0 || count > current {
            return Err(CsdmError::InvalidValue(format!(
                "the count of a monotonic dimension can only be decreased, \
                 requested {count} with {current} coordinates"
            )));
        }
        if count < current {
            log::warn!("truncating monotonic dimension from {current} to {count} coordinates");
            self.coordinates.truncate(count);
        }
        Ok(())
    }

    pub fn set_origin_offset(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.origin_offset = convert_to_unit(value, &self.unit)?;
        Ok(())
    }

    pub fn set_period(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.period = convert_to_unit(value, &self.unit)?;
        Ok(())
    }

    pub fn set_quantity_name(&mut self, name: Option<String>) {
        self.quantity_name = name;
    }

    pub fn slice(&self, range: Range<usize>, step: usize) -> CsdmResult<Self> {
        let indices = slice_indices(range, step, self.count())?;
        let mut sliced = self.clone();
        sliced.coordinates = indices.iter().map(|&i| self.coordinates[i]).collect();
        Ok(sliced)
    }

    pub(crate) fn copy_quantities(
        &mut self,
        origin_offset: &Quantity,
        period: &Quantity,
        quantity_name: Option<&String>,
        reciprocal: &ReciprocalDimension,
    ) -> CsdmResult<()> {
        self.set_origin_offset(origin_offset)?;
        self.set_period(period)?;
        self.quantity_name = quantity_name.cloned();
        self.reciprocal = reciprocal.clone();
        Ok(())
    }

    pub(crate) fn explicit_quantity_name(&self) -> Option<&String> {
        self.quantity_name.as_ref()
    }
}

pub(crate) fn is_strictly_monotonic(values: &[f64]) -> bool {
    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let decreasing = values.windows(2).all(|w| w[1] < w[0]);
    increasing || decreasing
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_dict_normalises_to_first_unit() {
        let dim = MonotonicDimension::from_dict(&json!({
            "type": "monotonic",
            "coordinates": ["1 µs", "10 µs", "0.1 ms", "1 ms"],
            "label": "delay"
        }))
        .unwrap();
        assert_eq!(dim.count(), 4);
        assert_eq!(dim.unit(), &Unit::parse("µs").unwrap());
        let coordinates = dim.coordinates();
        assert_eq!(coordinates[0], 1.0);
        assert!((coordinates[3] - 1000.0).abs() < 1e-9);
        assert_eq!(dim.quantity_name(), "time");
    }

    #[test]
    fn test_mixed_units_rejected() {
        let err = MonotonicDimension::from_dict(&json!({
            "coordinates": ["1 s", "2 m"]
        }))
        .unwrap_err();
        assert!(matches!(err, CsdmError::IncompatibleUnits { .. }));
    }

    #[test]
    fn test_missing_coordinates() {
        let err = MonotonicDimension::from_dict(&json!({"label": "x"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'coordinates' is a required key in MonotonicDimension"
        );
    }

    #[test]
    fn test_count_can_only_decrease() {
        let mut dim = MonotonicDimension::new(vec![1.0, 2.0, 4.0, 8.0], Unit::parse("m").unwrap())
            .unwrap();
        dim.set_count(2).unwrap();
        assert_eq!(dim.coordinates(), &[1.0, 2.0]);
        assert!(dim.set_count(3).is_err());
        assert!(dim.set_count(0).is_err());
    }

    #[test]
    fn test_missing_and_read_only_attributes() {
        let mut dim = MonotonicDimension::new(vec![1.0, 2.0], Unit::parse("m").unwrap()).unwrap();
        assert!(matches!(
            dim.increment(),
            Err(CsdmError::MissingAttribute { .. })
        ));
        assert!(matches!(
            dim.coordinates_offset(),
            Err(CsdmError::MissingAttribute { .. })
        ));
        let offset = Quantity::parse("1 m").unwrap();
        assert!(matches!(
            dim.set_coordinates_offset(&offset),
            Err(CsdmError::ReadOnlyAttribute { .. })
        ));
    }

    #[test]
    fn test_set_coordinates_validates_order() {
        let mut dim = MonotonicDimension::new(vec![1.0, 2.0], Unit::parse("m").unwrap()).unwrap();
        assert!(dim.set_coordinates(vec![1.0, 5.0, 3.0]).is_err());
        dim.set_coordinates(vec![5.0, 3.0, 1.0]).unwrap();
        assert_eq!(dim.count(), 3);
    }

    #[test]
    fn test_dict_round_trip() {
        let value = json!({
            "type": "monotonic",
            "coordinates": ["1.0 K", "4.0 K", "9.0 K"],
            "origin_offset": "273.15 K",
            "reciprocal": {"label": "inverse temperature"}
        });
        let dim = MonotonicDimension::from_dict(&value).unwrap();
        assert_eq!(dim.to_dict(), value);
        assert_eq!(dim.absolute_coordinates()[0], 274.15);
    }

    #[test]
    fn test_slice() {
        let dim = MonotonicDimension::new(vec![1.0, 2.0, 4.0, 8.0, 16.0], Unit::parse("m").unwrap())
            .unwrap();
        let sliced = dim.slice(1..5, 2).unwrap();
        assert_eq!(sliced.coordinates(), &[2.0, 8.0]);
    }

    #[test]
    fn test_strict_monotonicity() {
        assert!(is_strictly_monotonic(&[1.0, 3.0, 5.0]));
        assert!(is_strictly_monotonic(&[5.0, 3.0, 1.0]));
        assert!(!is_strictly_monotonic(&[1.0, 5.0, 3.0]));
        assert!(!is_strictly_monotonic(&[1.0, 1.0, 2.0]));
    }
}
