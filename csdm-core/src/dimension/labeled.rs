use super::reciprocal::DimensionMeta;
use super::slice_indices;
use crate::dict::{self, json_type_name, Dict};
use crate::errors::{CsdmError, CsdmResult};
use serde_json::Value;
use std::ops::Range;

const OWNER: &str = "LabeledDimension";

/// A non-quantitative dimension of ordered string labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDimension {
    pub meta: DimensionMeta,
    labels: Vec<String>,
}

impl LabeledDimension {
    pub fn new(labels: Vec<String>) -> CsdmResult<Self> {
        if labels.is_empty() {
            return Err(CsdmError::InvalidValue(
                "a labeled dimension needs at least one label".to_string(),
            ));
        }
        Ok(Self {
            meta: DimensionMeta::default(),
            labels,
        })
    }

    /// Builds a dimension from JSON values, all of which must be strings.
    ///
    /// ```
    /// use csdm_core::dimension::LabeledDimension;
    /// use serde_json::json;
    ///
    /// let err = LabeledDimension::from_values(&[json!("a"), json!(3), json!("c")]).unwrap_err();
    /// assert!(err.to_string().contains("index 1"));
    /// ```
    pub fn from_values(values: &[Value]) -> CsdmResult<Self> {
        Self::new(labels_from_values(values)?)
    }

    pub fn from_dict(value: &Value) -> CsdmResult<Self> {
        let dict = dict::as_object(value, OWNER)?;
        let labels = dict::required(dict, "labels", OWNER)?
            .as_array()
            .ok_or_else(|| CsdmError::InvalidValue(format!("{OWNER} 'labels' must be a list")))?;
        let mut dimension = Self::from_values(labels)?;
        dimension.meta = DimensionMeta::from_dict(dict, OWNER)?;
        Ok(dimension)
    }

    pub fn to_dict(&self) -> Value {
        let mut dict = Dict::new();
        dict.insert("type".into(), Value::from("labeled"));
        dict.insert(
            "labels".into(),
            Value::Array(self.labels.iter().map(|l| Value::from(l.as_str())).collect()),
        );
        self.meta.write(&mut dict);
        Value::Object(dict)
    }

    pub fn count(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Alias of [`labels`](Self::labels).
    pub fn coordinates(&self) -> &[String] {
        &self.labels
    }

    pub fn set_labels(&mut self, labels: &[Value]) -> CsdmResult<()> {
        let labels = labels_from_values(labels)?;
        if labels.is_empty() {
            return Err(CsdmError::InvalidValue(
                "a labeled dimension needs at least one label".to_string(),
            ));
        }
        self.labels = labels;
        Ok(())
    }

    /// Labeled dimensions cannot be resized without new labels.
    pub fn set_count(&mut self, _count: usize) -> CsdmResult<()> {
        Err(CsdmError::read_only("count", OWNER))
    }

    pub fn slice(&self, range: Range<usize>, step: usize) -> CsdmResult<Self> {
        let indices = slice_indices(range, step, self.count())?;
        Ok(Self {
            meta: self.meta.clone(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        })
    }
}

fn labels_from_values(values: &[Value]) -> CsdmResult<Vec<String>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(CsdmError::InvalidValue(format!(
                "A list of string labels is required, found {} at index {index}",
                json_type_name(other)
            ))),
        })
        .collect()
}
