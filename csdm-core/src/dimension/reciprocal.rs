use super::convert_to_unit;
use crate::dict::{self, Dict};
use crate::errors::CsdmResult;
use crate::units::{Quantity, Unit};
use serde_json::Value;

/// Descriptive fields shared by every dimension and reciprocal dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionMeta {
    pub label: String,
    pub description: String,
    pub application: Dict,
}

impl DimensionMeta {
    pub(crate) fn from_dict(dict: &Dict, owner: &str) -> CsdmResult<Self> {
        Ok(Self {
            label: dict::string(dict, "label", owner)?.unwrap_or_default(),
            description: dict::string(dict, "description", owner)?.unwrap_or_default(),
            application: dict::application(dict, owner)?,
        })
    }

    pub(crate) fn write(&self, dict: &mut Dict) {
        dict::insert_nonempty(dict, "label", &self.label);
        dict::insert_nonempty(dict, "description", &self.description);
        dict::insert_application(dict, &self.application);
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.description.is_empty() && self.application.is_empty()
    }
}

/// Metadata of the Fourier-conjugate axis paired with a quantitative dimension.
///
/// All quantities are held in [`ReciprocalDimension::unit`], which is
/// compatible with the inverse of the owning dimension's unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReciprocalDimension {
    pub meta: DimensionMeta,
    unit: Unit,
    coordinates_offset: Quantity,
    origin_offset: Quantity,
    period: Quantity,
    quantity_name: Option<String>,
}

const OWNER: &str = "ReciprocalDimension";

impl ReciprocalDimension {
    /// Default reciprocal of a dimension measured in `unit`.
    pub fn new(unit: &Unit) -> Self {
        let unit = unit.pow(-1);
        Self {
            meta: DimensionMeta::default(),
            coordinates_offset: Quantity::zero(unit.clone()),
            origin_offset: Quantity::zero(unit.clone()),
            period: Quantity::infinite(unit.clone()),
            quantity_name: None,
            unit,
        }
    }

    /// Reads a `reciprocal` object for a dimension measured in `unit`.
    ///
    /// The unit of the first given offset becomes the reciprocal unit.
    pub(crate) fn from_dict(value: &Value, unit: &Unit) -> CsdmResult<Self> {
        let dict = dict::as_object(value, OWNER)?;
        let mut reciprocal = Self::new(unit);
        reciprocal.meta = DimensionMeta::from_dict(dict, OWNER)?;
        reciprocal.quantity_name = dict::string(dict, "quantity_name", OWNER)?;

        let coordinates_offset = dict::quantity(dict, "coordinates_offset", OWNER)?;
        let origin_offset = dict::quantity(dict, "origin_offset", OWNER)?;
        let period = dict::quantity(dict, "period", OWNER)?;
        if let Some(preferred) = [&coordinates_offset, &origin_offset]
            .into_iter()
            .flatten()
            .find(|q| q.value() != 0.0 && !q.unit().is_dimensionless())
        {
            reciprocal.set_unit(preferred.unit())?;
        }
        if let Some(q) = coordinates_offset {
            reciprocal.set_coordinates_offset(&q)?;
        }
        if let Some(q) = origin_offset {
            reciprocal.set_origin_offset(&q)?;
        }
        if let Some(q) = period {
            reciprocal.set_period(&q)?;
        }
        Ok(reciprocal)
    }

    /// Serialises the non-default fields; `None` when everything is default.
    pub(crate) fn to_dict(&self) -> Option<Value> {
        let mut dict = Dict::new();
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
        if let Some(name) = &self.quantity_name {
            dict.insert("quantity_name".into(), Value::from(name.as_str()));
        }
        self.meta.write(&mut dict);
        (!dict.is_empty()).then_some(Value::Object(dict))
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
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

    /// Explicit quantity name, or the physical type of the reciprocal unit.
    pub fn quantity_name(&self) -> String {
        self.quantity_name
            .clone()
            .unwrap_or_else(|| self.unit.physical_type().to_string())
    }

    pub(crate) fn explicit_quantity_name(&self) -> Option<&String> {
        self.quantity_name.as_ref()
    }

    pub fn set_quantity_name(&mut self, name: Option<String>) {
        self.quantity_name = name;
    }

    /// Re-expresses every field in `unit`.
    pub fn set_unit(&mut self, unit: &Unit) -> CsdmResult<()> {
        self.coordinates_offset = self.coordinates_offset.to(unit)?;
        self.origin_offset = self.origin_offset.to(unit)?;
        self.period = self.period.to(unit)?;
        self.unit = unit.clone();
        Ok(())
    }

    pub fn set_coordinates_offset(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.coordinates_offset = self.convert(value)?;
        Ok(())
    }

    pub fn set_origin_offset(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.origin_offset = self.convert(value)?;
        Ok(())
    }

    pub fn set_period(&mut self, value: &Quantity) -> CsdmResult<()> {
        self.period = self.convert(value)?;
        Ok(())
    }

    fn convert(&self, value: &Quantity) -> CsdmResult<Quantity> {
        convert_to_unit(value, &self.unit)
    }

    /// Builds the reciprocal of a dimension from its quantitative fields, used
    /// when a dimension and its reciprocal exchange roles.
    pub(crate) fn from_parts(
        meta: DimensionMeta,
        unit: &Unit,
        coordinates_offset: Quantity,
        origin_offset: Quantity,
        period: Quantity,
        quantity_name: Option<String>,
    ) -> Self {
        Self {
            meta,
            unit: unit.clone(),
            coordinates_offset,
            origin_offset,
            period,
            quantity_name,
        }
    }
}
