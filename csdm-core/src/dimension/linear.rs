//! Evenly spaced dimensions.
//!
//! Coordinates are generated from `count` and `increment`:
//!
//! ```text
//! index[i]    = i - (complex_fft ? floor(count / 2) : 0)
//! coordinates = index * increment + coordinates_offset
//! ```
//!
//! The `index * increment` part is cached and regenerated whenever `count`,
//! `increment` or `complex_fft` change. `coordinates_offset` is applied when
//! coordinates are read.

use super::reciprocal::{DimensionMeta, ReciprocalDimension};
use super::{convert_to_unit, slice_indices};
use crate::dict::{self, Dict};
use crate::errors::{CsdmError, CsdmResult};
use crate::units::{Quantity, Unit};
use serde_json::Value;
use std::ops::Range;

const OWNER: &str = "LinearDimension";

#[derive(Debug, Clone, PartialEq)]
pub struct LinearDimension {
    pub meta: DimensionMeta,
    count: usize,
    increment: Quantity,
    coordinates_offset: Quantity,
    origin_offset: Quantity,
    period: Quantity,
    complex_fft: bool,
    quantity_name: Option<String>,
    reciprocal: ReciprocalDimension,
    scaled_index: Vec<f64>,
}

impl LinearDimension {
    /// A dimension of `count` points spaced by `increment`, starting at zero.
    ///
    /// ```
    /// use csdm_core::dimension::LinearDimension;
    /// use csdm_core::units::Quantity;
    ///
    /// let dim = LinearDimension::new(4, Quantity::parse("0.5 s").unwrap()).unwrap();
    /// assert_eq!(dim.coordinates(), vec![0.0, 0.5, 1.0, 1.5]);
    /// ```
    pub fn new(count: usize, increment: Quantity) -> CsdmResult<Self> {
        validate_count(count)?;
        validate_increment(&increment)?;
        let unit = increment.unit().clone();
        let mut dimension = Self {
            meta: DimensionMeta::default(),
            count,
            coordinates_offset: Quantity::zero(unit.clone()),
            origin_offset: Quantity::zero(unit.clone()),
            period: Quantity::infinite(unit.clone()),
            complex_fft: false,
            quantity_name: None,
            reciprocal: ReciprocalDimension::new(&unit),
            increment,
            scaled_index: Vec::new(),
        };
        dimension.regenerate();
        Ok(dimension)
    }

    pub fn from_dict(value: &Value) -> CsdmResult<Self> {
        let dict = dict::as_object(value, OWNER)?;
        let count = dict::count(dict::required(dict, "count", OWNER)?, "count", OWNER)?;
        let increment =
            dict::quantity_value(dict::required(dict, "increment", OWNER)?, "increment", OWNER)?;

        let mut dimension = Self::new(count, increment)?;
        dimension.meta = DimensionMeta::from_dict(dict, OWNER)?;
        if let Some(q) = dict::quantity(dict, "coordinates_offset", OWNER)? {
            dimension.set_coordinates_offset(&q)?;
        }
        if let Some(q) = dict::quantity(dict, "origin_offset", OWNER)? {
            dimension.set_origin_offset(&q)?;
        }
        if let Some(q) = dict::quantity(dict, "period", OWNER)? {
            dimension.set_period(&q)?;
        }
        if let Some(flag) = dict::boolean(dict, "complex_fft", OWNER)? {
            dimension.set_complex_fft(flag);
        }
        dimension.quantity_name = dict::string(dict, "quantity_name", OWNER)?;
        if let Some(reciprocal) = dict.get("reciprocal") {
            dimension.reciprocal = ReciprocalDimension::from_dict(reciprocal, dimension.unit())?;
        }
        Ok(dimension)
    }

    pub fn to_dict(&self) -> Value {
        let mut dict = Dict::new();
        dict.insert("type".into(), Value::from("linear"));
        dict.insert("count".into(), Value::from(self.count));
        dict.insert("increment".into(), Value::from(self.increment.format()));
        if self.coordinates_offset.value() != 0.0 {
            dict.insert(
                "coordinates_offset".into(),
                Value::from(self.coordinates_offset.format()),
            );
        }
        if self.origin_offset.value() != 0.0 {
            dict.insert("origin_offset".into(), Value::from(self.origin_offset.format()));
        }
        if !self.period.is_infinite() {
            dict.insert("period".into(), Value::from(self.period.format()));
        }
        if self.complex_fft {
            dict.insert("complex_fft".into(), Value::from(true));
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

    fn regenerate(&mut self) {
        let shift = self.index_shift();
        let increment = self.increment.value();
        self.scaled_index = (0..self.count)
            .map(|i| (i as f64 - shift) * increment)
            .collect();
    }

    fn index_shift(&self) -> f64 {
        if self.complex_fft {
            (self.count / 2) as f64
        } else {
            0.0
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn increment(&self) -> &Quantity {
        &self.increment
    }

    /// Unit of the coordinates, taken from the increment.
    pub fn unit(&self) -> &Unit {
        self.increment.unit()
    }

    pub fn coordinates_offset(&self) -> &Quantity {
        &self.coordinates_offset
    }

    pub fn origin_offset(&self) -> &Quantity {
        &self.origin_offset
    }

    pub fn period(&self) -> &Quantity {
        &self.period
    }

    pub fn complex_fft(&self) -> bool {
        self.complex_fft
    }

    pub fn quantity_name(&self) -> String {
        self.quantity_name
            .clone()
            .unwrap_or_else(|| self.unit().physical_type().to_string())
    }

    pub fn reciprocal(&self) -> &ReciprocalDimension {
        &self.reciprocal
    }

    pub fn reciprocal_mut(&mut self) -> &mut ReciprocalDimension {
        &mut self.reciprocal
    }

    /// Coordinates in [`unit`](Self::unit), including `coordinates_offset`.
    pub fn coordinates(&self) -> Vec<f64> {
        let offset = self.coordinates_offset.value();
        self.scaled_index.iter().map(|c| c + offset).collect()
    }

    /// Coordinates shifted by `origin_offset`.
    pub fn absolute_coordinates(&self) -> Vec<f64> {
        let origin = self.origin_offset.value();
        self.coordinates().into_iter().map(|c| c + origin).collect()
    }

    pub fn set_count(&mut self, count: usize) -> CsdmResult<()> {
        validate_count(count)?;
        self.count = count;
        self.regenerate();
        Ok(())
    }

    /// Replaces the increment. The new unit must be compatible with the old
    /// one; offsets are re-expressed in it.
    pub fn set_increment(&mut self, increment: Quantity) -> CsdmResult<()> {
        validate_increment(&increment)?;
        let unit = increment.unit();
        if unit != self.unit() {
            let coordinates_offset = self.coordinates_offset.to(unit)?;
            let origin_offset = self.origin_offset.to(unit)?;
            let period = self.period.to(unit)?;
            self.coordinates_offset = coordinates_offset;
            self.origin_offset = origin_offset;
            self.period = period;
        }
        self.increment = increment;
        self.regenerate();
        Ok(())
    }

    /// Does not regenerate the coordinate cache; the offset is applied on read.
    pub fn set_coordinates_offset(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.coordinates_offset = convert_to_unit(value, self.unit())?;
        Ok(())
    }

    pub fn set_origin_offset(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.origin_offset = convert_to_unit(value, self.unit())?;
        Ok(())
    }

    pub fn set_period(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.period = convert_to_unit(value, self.unit())?;
        Ok(())
    }

    pub fn set_complex_fft(&mut self, complex_fft: bool) {
        self.complex_fft = complex_fft;
        self.regenerate();
    }

    pub fn set_quantity_name(&mut self, name: Option<String>) {
        self.quantity_name = name;
    }

    /// Coordinates of a linear dimension are derived and cannot be assigned.
    pub fn set_coordinates(&mut self, _coordinates: &[f64]) -> CsdmResult<()> {
        Err(CsdmError::read_only("coordinates", OWNER))
    }

    /// `1 / (count * increment)`, in the inverse of the dimension unit.
    pub fn reciprocal_increment(&self) -> Quantity {
        let value = 1.0 / (self.count as f64 * self.increment.value());
        Quantity::new(value, self.unit().pow(-1))
    }

    /// Coordinates of the reciprocal axis in the reciprocal unit.
    ///
    /// Indices run from zero when this dimension is in FFT output order and
    /// are centred otherwise.
    pub fn reciprocal_coordinates(&self) -> CsdmResult<Vec<f64>> {
        let unit = self.reciprocal.unit();
        let increment = self.reciprocal_increment().value_in(unit)?;
        let offset = self.reciprocal.coordinates_offset().value();
        let shift = if self.complex_fft {
            0.0
        } else {
            (self.count / 2) as f64
        };
        Ok((0..self.count)
            .map(|i| (i as f64 - shift) * increment + offset)
            .collect())
    }

    /// Coordinate used as the reference frequency when expressing an NMR
    /// frequency axis as a ppm ratio.
    ///
    /// ```
    /// use csdm_core::dimension::LinearDimension;
    /// use csdm_core::units::Quantity;
    ///
    /// let mut dim = LinearDimension::new(6, Quantity::parse("1 Hz").unwrap()).unwrap();
    /// dim.set_coordinates_offset(&Quantity::parse("-3 Hz").unwrap()).unwrap();
    /// assert_eq!(dim.nmr_reference_offset().value(), 0.0);
    /// ```
    pub fn nmr_reference_offset(&self) -> Quantity {
        let offset = self.coordinates_offset.value();
        if self.complex_fft || self.count % 2 == 1 {
            return self.coordinates_offset.clone();
        }
        let increment = self.increment.value();
        let half = (self.count / 2) as f64;
        let value = if increment > 0.0 {
            offset + increment * half
        } else {
            offset + increment * (half - 1.0)
        };
        Quantity::new(value, self.unit().clone())
    }

    /// The Fourier-conjugate dimension.
    ///
    /// Metadata and offsets are exchanged with the stored reciprocal, the
    /// increment becomes `1 / (count * increment)` and `complex_fft` flips.
    /// Swapping twice restores the original dimension.
    pub fn swapped_with_reciprocal(&self) -> CsdmResult<Self> {
        let reciprocal = &self.reciprocal;
        let increment = self.reciprocal_increment().to(reciprocal.unit())?;
        let mut swapped = Self {
            meta: reciprocal.meta.clone(),
            count: self.count,
            increment,
            coordinates_offset: reciprocal.coordinates_offset().clone(),
            origin_offset: reciprocal.origin_offset().clone(),
            period: reciprocal.period().clone(),
            complex_fft: !self.complex_fft,
            quantity_name: reciprocal.explicit_quantity_name().cloned(),
            reciprocal: ReciprocalDimension::from_parts(
                self.meta.clone(),
                self.unit(),
                self.coordinates_offset.clone(),
                self.origin_offset.clone(),
                self.period.clone(),
                self.quantity_name.clone(),
            ),
            scaled_index: Vec::new(),
        };
        swapped.regenerate();
        Ok(swapped)
    }

    /// Sub-dimension over `range` (clamped to `count`) taking every `step`th point.
    ///
    /// The result starts at the first selected coordinate and is never in
    /// FFT output order.
    pub fn slice(&self, range: Range<usize>, step: usize) -> CsdmResult<Self> {
        let indices = slice_indices(range, step, self.count)?;
        let first = self.coordinates()[indices[0]];
        let mut sliced = self.clone();
        sliced.count = indices.len();
        sliced.increment = &self.increment * step as f64;
        sliced.coordinates_offset = Quantity::new(first, self.unit().clone());
        sliced.complex_fft = false;
        sliced.regenerate();
        Ok(sliced)
    }

    /// Copies offsets, period, quantity name and reciprocal from a compatible
    /// dimension.
    pub(crate) fn copy_quantities(
        &mut self,
        coordinates_offset: Option<&Quantity>,
        origin_offset: &Quantity,
        period: &Quantity,
        quantity_name: Option<&String>,
        reciprocal: &ReciprocalDimension,
    ) -> CsdmResult<()> {
        if let Some(offset) = coordinates_offset {
            self.set_coordinates_offset(offset)?;
        }
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

fn validate_count(count: usize) -> CsdmResult<()> {
    if count == 0 {
        return Err(CsdmError::InvalidValue(
            "count must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn validate_increment(increment: &Quantity) -> CsdmResult<()> {
    if increment.value() == 0.0 || !increment.value().is_finite() {
        return Err(CsdmError::InvalidValue(format!(
            "increment must be a finite, non-zero quantity, found '{increment}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use serde_json::json;

    fn q(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    #[test]
    fn test_coordinates() {
        let mut dim = LinearDimension::new(5, q("2 s")).unwrap();
        assert_eq!(dim.coordinates(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);

        dim.set_complex_fft(true);
        assert_eq!(dim.coordinates(), vec![-4.0, -2.0, 0.0, 2.0, 4.0]);

        dim.set_complex_fft(false);
        dim.set_count(3).unwrap();
        dim.set_coordinates_offset(&q("1 s")).unwrap();
        assert_eq!(dim.coordinates(), vec![1.0, 3.0, 5.0]);

        dim.set_origin_offset(&q("1 min")).unwrap();
        assert_eq!(dim.absolute_coordinates(), vec![61.0, 63.0, 65.0]);
    }

    #[test]
    fn test_zero_increment_rejected() {
        assert!(LinearDimension::new(3, q("0 s")).is_err());
        assert!(LinearDimension::new(0, q("1 s")).is_err());
        let mut dim = LinearDimension::new(3, q("1 s")).unwrap();
        assert!(dim.set_increment(q("0 s")).is_err());
        assert!(dim.set_count(0).is_err());
    }

    #[test]
    fn test_coordinates_read_only() {
        let mut dim = LinearDimension::new(3, q("1 s")).unwrap();
        let err = dim.set_coordinates(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, CsdmError::ReadOnlyAttribute { .. }));
    }

    #[test]
    fn test_set_increment_converts_offsets() {
        let mut dim = LinearDimension::new(3, q("1 s")).unwrap();
        dim.set_coordinates_offset(&q("2 s")).unwrap();
        dim.set_increment(q("500 ms")).unwrap();
        assert!(is_close!(dim.coordinates_offset().value(), 2000.0));
        for (c, expected) in dim.coordinates().into_iter().zip([2000.0, 2500.0, 3000.0]) {
            assert!(is_close!(c, expected));
        }
        assert!(dim.set_increment(q("1 m")).is_err());
    }

    #[test]
    fn test_incompatible_offset() {
        let mut dim = LinearDimension::new(3, q("1 s")).unwrap();
        let err = dim.set_coordinates_offset(&q("1 m")).unwrap_err();
        assert!(matches!(err, CsdmError::IncompatibleUnits { .. }));
        assert!(err.to_string().contains("time"));
        assert!(err.to_string().contains("length"));
    }

    #[test]
    fn test_reciprocal_increment() {
        let dim = LinearDimension::new(8, q("0.5 ms")).unwrap();
        let reciprocal = dim.reciprocal_increment();
        let hz = Unit::parse("Hz").unwrap();
        assert!(is_close!(reciprocal.value_in(&hz).unwrap(), 250.0));
        assert_eq!(reciprocal.physical_type(), "frequency");
    }

    #[test]
    fn test_reciprocal_coordinates() {
        let dim = LinearDimension::new(4, q("0.25 s")).unwrap();
        let coordinates = dim.reciprocal_coordinates().unwrap();
        assert_eq!(coordinates, vec![-2.0, -1.0, 0.0, 1.0]);

        let mut dim = dim.clone();
        dim.set_complex_fft(true);
        assert_eq!(dim.reciprocal_coordinates().unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_nmr_reference_offset_cases() {
        let mut centred = LinearDimension::new(6, q("1 Hz")).unwrap();
        centred.set_complex_fft(true);
        assert_eq!(centred.coordinates(), vec![-3.0, -2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(centred.nmr_reference_offset().value(), 0.0);

        let mut shifted = LinearDimension::new(6, q("1 Hz")).unwrap();
        shifted.set_coordinates_offset(&q("-3 Hz")).unwrap();
        assert_eq!(shifted.coordinates(), vec![-3.0, -2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(shifted.nmr_reference_offset().value(), 0.0);

        let mut descending = LinearDimension::new(5, q("-1 Hz")).unwrap();
        descending.set_coordinates_offset(&q("2 Hz")).unwrap();
        assert_eq!(descending.coordinates(), vec![2.0, 1.0, 0.0, -1.0, -2.0]);
        assert_eq!(descending.nmr_reference_offset().value(), 2.0);

        let mut even_descending = LinearDimension::new(4, q("-1 Hz")).unwrap();
        even_descending.set_coordinates_offset(&q("2 Hz")).unwrap();
        assert_eq!(even_descending.nmr_reference_offset().value(), 1.0);
    }

    #[test]
    fn test_swap_twice_restores() {
        let mut dim = LinearDimension::from_dict(&json!({
            "count": 4,
            "increment": "0.25 s",
            "coordinates_offset": "1 s",
            "label": "time",
            "reciprocal": {"coordinates_offset": "10 Hz", "label": "frequency"}
        }))
        .unwrap();
        dim.set_origin_offset(&q("2 s")).unwrap();

        let swapped = dim.swapped_with_reciprocal().unwrap();
        assert!(swapped.complex_fft());
        assert_eq!(swapped.meta.label, "frequency");
        assert_eq!(swapped.unit(), &Unit::parse("Hz").unwrap());
        assert!(is_close!(swapped.increment().value(), 1.0));
        assert_eq!(swapped.coordinates_offset().value(), 10.0);
        assert_eq!(swapped.reciprocal().meta.label, "time");
        assert_eq!(swapped.reciprocal().origin_offset().value(), 2.0);

        let restored = swapped.swapped_with_reciprocal().unwrap();
        assert!(!restored.complex_fft());
        assert_eq!(restored.meta, dim.meta);
        assert!(is_close!(restored.increment().value(), 0.25));
        assert_eq!(restored.coordinates_offset(), dim.coordinates_offset());
        assert_eq!(restored.origin_offset(), dim.origin_offset());
        assert_eq!(restored.reciprocal(), dim.reciprocal());
    }

    #[test]
    fn test_dict_round_trip() {
        let value = json!({
            "type": "linear",
            "count": 10,
            "increment": "5.0 G",
            "coordinates_offset": "-10.0 G",
            "period": "100.0 G",
            "complex_fft": true,
            "quantity_name": "magnetic flux density",
            "label": "field",
            "description": "swept field",
            "application": {"com.example": {"version": 1}},
        });
        let dim = LinearDimension::from_dict(&value).unwrap();
        assert_eq!(dim.count(), 10);
        assert_eq!(dim.period().value(), 100.0);
        assert_eq!(dim.to_dict(), value);
        assert_eq!(LinearDimension::from_dict(&dim.to_dict()).unwrap(), dim);
    }

    #[test]
    fn test_missing_keys() {
        let err = LinearDimension::from_dict(&json!({"count": 3})).unwrap_err();
        assert_eq!(err.to_string(), "'increment' is a required key in LinearDimension");
        let err = LinearDimension::from_dict(&json!({"increment": "1 s"})).unwrap_err();
        assert!(matches!(err, CsdmError::MissingKey { ref key, .. } if key == "count"));
    }

    #[test]
    fn test_defaults_omitted() {
        let dim = LinearDimension::new(3, q("1 s")).unwrap();
        assert_eq!(
            dim.to_dict(),
            json!({"type": "linear", "count": 3, "increment": "1.0 s"})
        );
    }

    #[test]
    fn test_slice() {
        let mut dim = LinearDimension::new(10, q("1 s")).unwrap();
        dim.set_coordinates_offset(&q("5 s")).unwrap();
        let sliced = dim.slice(2..9, 3).unwrap();
        assert_eq!(sliced.count(), 3);
        assert_eq!(sliced.coordinates(), vec![7.0, 10.0, 13.0]);

        let mut centred = LinearDimension::new(4, q("1 s")).unwrap();
        centred.set_complex_fft(true);
        let tail = centred.slice(1..100, 1).unwrap();
        assert_eq!(tail.coordinates(), vec![-1.0, 0.0, 1.0]);
        assert!(!tail.complex_fft());

        assert!(dim.slice(20..30, 1).is_err());
        assert!(dim.slice(0..3, 0).is_err());
    }
}
