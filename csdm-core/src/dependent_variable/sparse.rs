//! Sparse sampling of a dependent variable.
//!
//! A sparse variable stores values only at a subset of grid vertexes along
//! the `dimension_indexes` axes. The compact component array is laid out as
//! `(p, <dense grid axes in array order>, points)`; filling scatters it into
//! a zero-initialised dense array.

use crate::codec::{decode_components, encode_components, ComponentSource};
use crate::components::{on_array, ComponentArray, Element};
use crate::dict::{self, Dict};
use crate::errors::{CsdmError, CsdmResult};
use crate::types::{Encoding, NumericType};
use ndarray::{ArrayD, IxDyn};
use serde_json::Value;

const OWNER: &str = "SparseSampling";

const UNSIGNED_TYPES: [&str; 4] = ["uint8", "uint16", "uint32", "uint64"];

#[derive(Debug, Clone, PartialEq)]
pub struct SparseSampling {
    /// Declaration-order indexes of the sparse dimensions.
    pub dimension_indexes: Vec<usize>,
    /// Flattened vertex coordinates, interleaved per point:
    /// `[i0, j0, i1, j1, ...]` for two sparse dimensions.
    pub sparse_grid_vertexes: Vec<usize>,
    pub unsigned_integer_type: NumericType,
    pub encoding: Encoding,
    pub description: String,
    pub application: Dict,
}

impl SparseSampling {
    pub fn new(dimension_indexes: Vec<usize>, sparse_grid_vertexes: Vec<usize>) -> CsdmResult<Self> {
        let sparse = Self {
            dimension_indexes,
            sparse_grid_vertexes,
            unsigned_integer_type: NumericType::UInt64,
            encoding: Encoding::Text,
            description: String::new(),
            application: Dict::new(),
        };
        sparse.validate()?;
        Ok(sparse)
    }

    pub fn from_dict(value: &Value) -> CsdmResult<Self> {
        let dict = dict::as_object(value, OWNER)?;
        let dimension_indexes = dict::required(dict, "dimension_indexes", OWNER)?
            .as_array()
            .ok_or_else(|| {
                CsdmError::InvalidValue(format!("{OWNER} 'dimension_indexes' must be a list"))
            })?
            .iter()
            .map(|v| dict::count(v, "dimension_indexes", OWNER))
            .collect::<CsdmResult<Vec<_>>>()?;

        let literal = dict::string(dict, "unsigned_integer_type", OWNER)?
            .ok_or_else(|| CsdmError::missing_key("unsigned_integer_type", OWNER))?;
        let unsigned_integer_type = literal
            .parse::<NumericType>()
            .ok()
            .filter(NumericType::is_unsigned_integer)
            .ok_or_else(|| {
                CsdmError::invalid_literal("unsigned_integer_type", &literal, &UNSIGNED_TYPES)
            })?;

        let vertexes = dict::required(dict, "sparse_grid_vertexes", OWNER)?;
        let source = match vertexes {
            Value::String(s) => ComponentSource::Base64(vec![s.clone()]),
            Value::Array(values) => ComponentSource::Text(vec![values.clone()]),
            _ => {
                return Err(CsdmError::InvalidValue(format!(
                    "{OWNER} 'sparse_grid_vertexes' must be a list or a base64 string"
                )))
            }
        };
        let encoding = match dict::string(dict, "encoding", OWNER)? {
            Some(literal) => literal.parse()?,
            None => source.encoding(),
        };
        if encoding != source.encoding() {
            return Err(CsdmError::Decode(format!(
                "sparse_grid_vertexes do not match the '{encoding}' encoding"
            )));
        }
        let sparse_grid_vertexes = decode_components(&source, unsigned_integer_type, 1)?
            .to_i128()
            .iter()
            .map(|&v| {
                usize::try_from(v).map_err(|_| {
                    CsdmError::InvalidValue(format!("sparse grid vertex {v} is out of range"))
                })
            })
            .collect::<CsdmResult<Vec<_>>>()?;

        let sparse = Self {
            dimension_indexes,
            sparse_grid_vertexes,
            unsigned_integer_type,
            encoding,
            description: dict::string(dict, "description", OWNER)?.unwrap_or_default(),
            application: dict::application(dict, OWNER)?,
        };
        sparse.validate()?;
        Ok(sparse)
    }

    pub fn to_dict(&self) -> CsdmResult<Value> {
        let mut dict = Dict::new();
        dict.insert(
            "dimension_indexes".into(),
            Value::from(self.dimension_indexes.clone()),
        );
        let vertexes: Vec<f64> = self.sparse_grid_vertexes.iter().map(|&v| v as f64).collect();
        let vertexes = ComponentArray::from_shape_vec(&[1, vertexes.len()], vertexes)?
            .cast(self.unsigned_integer_type);
        let encoded = match encode_components(&vertexes, self.encoding) {
            ComponentSource::Base64(mut strings) => Value::from(strings.remove(0)),
            ComponentSource::Text(mut lists) => Value::Array(lists.remove(0)),
            ComponentSource::Raw(_) => {
                return Err(CsdmError::InvalidValue(
                    "sparse_grid_vertexes cannot use the raw encoding".to_string(),
                ))
            }
        };
        dict.insert("sparse_grid_vertexes".into(), encoded);
        dict.insert(
            "unsigned_integer_type".into(),
            Value::from(self.unsigned_integer_type.as_str()),
        );
        dict.insert("encoding".into(), Value::from(self.encoding.as_str()));
        dict::insert_nonempty(&mut dict, "description", &self.description);
        dict::insert_application(&mut dict, &self.application);
        Ok(Value::Object(dict))
    }

    /// Number of populated vertexes.
    pub fn point_count(&self) -> usize {
        match self.dimension_indexes.len() {
            0 => 0,
            k => self.sparse_grid_vertexes.len() / k,
        }
    }

    /// Vertex coordinates along the `i`th sparse dimension.
    pub fn vertexes_along(&self, i: usize) -> Vec<usize> {
        let k = self.dimension_indexes.len();
        self.sparse_grid_vertexes
            .iter()
            .skip(i)
            .step_by(k.max(1))
            .copied()
            .collect()
    }

    fn validate(&self) -> CsdmResult<()> {
        if self.dimension_indexes.is_empty() {
            return Err(CsdmError::InvalidValue(
                "sparse sampling needs at least one dimension index".to_string(),
            ));
        }
        if self.sparse_grid_vertexes.len() % self.dimension_indexes.len() != 0 {
            return Err(CsdmError::InvalidValue(format!(
                "{} sparse grid vertexes cannot be split across {} sparse dimensions",
                self.sparse_grid_vertexes.len(),
                self.dimension_indexes.len()
            )));
        }
        Ok(())
    }

    /// Scatters compact `components` into a dense array of `target_shape`.
    ///
    /// `target_shape` is `(p, <grid counts in reverse declaration order>)`.
    /// Unsampled vertexes hold zero.
    pub fn fill(&self, components: &ComponentArray, target_shape: &[usize]) -> CsdmResult<ComponentArray> {
        let grid_rank = target_shape.len().saturating_sub(1);
        let sparse_axes = self
            .dimension_indexes
            .iter()
            .map(|&d| {
                if d >= grid_rank {
                    Err(CsdmError::InvalidValue(format!(
                        "sparse dimension index {d} is out of range for a {grid_rank}-dimensional grid"
                    )))
                } else {
                    Ok(grid_rank - d)
                }
            })
            .collect::<CsdmResult<Vec<usize>>>()?;
        let vertexes: Vec<Vec<usize>> = (0..sparse_axes.len())
            .map(|i| self.vertexes_along(i))
            .collect();
        for (axis, along) in sparse_axes.iter().zip(&vertexes) {
            if let Some(&bad) = along.iter().find(|&&v| v >= target_shape[*axis]) {
                return Err(CsdmError::InvalidValue(format!(
                    "sparse vertex {bad} is out of range for a dimension of count {}",
                    target_shape[*axis]
                )));
            }
        }
        let layout = ScatterLayout {
            target_shape,
            sparse_axes: &sparse_axes,
            vertexes: &vertexes,
            points: self.point_count(),
        };
        on_array!(components, array => layout.scatter(array).map(ComponentArray::from))
    }
}

struct ScatterLayout<'a> {
    target_shape: &'a [usize],
    sparse_axes: &'a [usize],
    vertexes: &'a [Vec<usize>],
    points: usize,
}

impl ScatterLayout<'_> {
    fn scatter<T: Element>(&self, compact: &ArrayD<T>) -> CsdmResult<ArrayD<T>> {
        let dense_axes: Vec<usize> = (1..self.target_shape.len())
            .filter(|axis| !self.sparse_axes.contains(axis))
            .collect();
        let mut compact_shape = vec![self.target_shape[0]];
        compact_shape.extend(dense_axes.iter().map(|&axis| self.target_shape[axis]));
        compact_shape.push(self.points);

        let expected: usize = compact_shape.iter().product();
        if compact.len() != expected {
            return Err(CsdmError::InvalidValue(format!(
                "sparse components hold {} values, expected {expected} for {} sampled vertexes",
                compact.len(),
                self.points
            )));
        }

        let mut dense = ArrayD::<T>::zeros(IxDyn(self.target_shape));
        let mut index = vec![0usize; self.target_shape.len()];
        let mut compact_index = vec![0usize; compact_shape.len()];
        for (flat, value) in compact.iter().enumerate() {
            unravel(flat, &compact_shape, &mut compact_index);
            index[0] = compact_index[0];
            for (j, &axis) in dense_axes.iter().enumerate() {
                index[axis] = compact_index[1 + j];
            }
            let point = compact_index[compact_shape.len() - 1];
            for (i, &axis) in self.sparse_axes.iter().enumerate() {
                index[axis] = self.vertexes[i][point];
            }
            dense[IxDyn(&index)] = *value;
        }
        Ok(dense)
    }
}

/// Row-major multi-index of `flat` within `shape`.
fn unravel(mut flat: usize, shape: &[usize], out: &mut [usize]) {
    for (slot, &extent) in out.iter_mut().zip(shape).rev() {
        *slot = flat % extent;
        flat /= extent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_single_sparse_axis() {
        // dimension 0 (count 5) is sparse, dimension 1 (count 2) is dense
        let sparse = SparseSampling::new(vec![0], vec![0, 2, 4]).unwrap();
        let compact =
            ComponentArray::from_shape_vec(&[1, 6], vec![10.0f64, 20.0, 30.0, 40.0, 50.0, 60.0])
                .unwrap();
        let dense = sparse.fill(&compact, &[1, 2, 5]).unwrap();
        let dense = dense.as_array::<f64>().unwrap();
        let first_row: Vec<f64> = (0..5).map(|i| dense[[0, 0, i]]).collect();
        assert_eq!(first_row, vec![10.0, 0.0, 20.0, 0.0, 30.0]);
        let second_row: Vec<f64> = (0..5).map(|i| dense[[0, 1, i]]).collect();
        assert_eq!(second_row, vec![40.0, 0.0, 50.0, 0.0, 60.0]);
    }

    #[test]
    fn test_fill_two_sparse_axes() {
        // a 3 x 3 grid with values at (0, 0), (1, 2) and (2, 1)
        let sparse = SparseSampling::new(vec![0, 1], vec![0, 0, 1, 2, 2, 1]).unwrap();
        let compact = ComponentArray::from_shape_vec(&[1, 3], vec![1u8, 2, 3]).unwrap();
        let dense = sparse.fill(&compact, &[1, 3, 3]).unwrap();
        let dense = dense.as_array::<u8>().unwrap();
        // array axes are reversed: [component, dim1, dim0]
        assert_eq!(dense[[0, 0, 0]], 1);
        assert_eq!(dense[[0, 2, 1]], 2);
        assert_eq!(dense[[0, 1, 2]], 3);
        assert_eq!(dense.iter().filter(|&&v| v != 0).count(), 3);
    }

    #[test]
    fn test_fill_rejects_out_of_range_vertex() {
        let sparse = SparseSampling::new(vec![0], vec![0, 7]).unwrap();
        let compact = ComponentArray::from_shape_vec(&[1, 2], vec![1i32, 2]).unwrap();
        assert!(sparse.fill(&compact, &[1, 5]).is_err());
        let sparse = SparseSampling::new(vec![3], vec![0]).unwrap();
        assert!(sparse.fill(&compact, &[1, 5]).is_err());
    }

    #[test]
    fn test_from_dict_text_and_base64() {
        let text = SparseSampling::from_dict(&json!({
            "dimension_indexes": [0],
            "sparse_grid_vertexes": [0, 2, 4],
            "unsigned_integer_type": "uint16",
            "encoding": "none"
        }))
        .unwrap();
        assert_eq!(text.sparse_grid_vertexes, vec![0, 2, 4]);
        assert_eq!(text.point_count(), 3);

        let mut base64 = text.clone();
        base64.encoding = Encoding::Base64;
        let dict = base64.to_dict().unwrap();
        assert!(dict["sparse_grid_vertexes"].is_string());
        assert_eq!(SparseSampling::from_dict(&dict).unwrap(), base64);
        assert_eq!(SparseSampling::from_dict(&text.to_dict().unwrap()).unwrap(), text);
    }

    #[test]
    fn test_uint64_vertexes_read_exactly() {
        let sparse = SparseSampling::from_dict(&json!({
            "dimension_indexes": [0],
            "sparse_grid_vertexes": [9_007_199_254_740_993u64, 0],
            "unsigned_integer_type": "uint64",
            "encoding": "none"
        }))
        .unwrap();
        assert_eq!(sparse.sparse_grid_vertexes, vec![9_007_199_254_740_993, 0]);
    }

    #[test]
    fn test_signed_vertex_type_rejected() {
        let err = SparseSampling::from_dict(&json!({
            "dimension_indexes": [0],
            "sparse_grid_vertexes": [0, 1],
            "unsigned_integer_type": "int32"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("uint8, uint16, uint32, uint64"));
    }

    #[test]
    fn test_missing_keys() {
        let err = SparseSampling::from_dict(&json!({
            "sparse_grid_vertexes": [0, 1],
            "unsigned_integer_type": "uint8"
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'dimension_indexes' is a required key in SparseSampling"
        );
    }

    #[test]
    fn test_unravel() {
        let mut out = [0; 3];
        unravel(7, &[2, 2, 3], &mut out);
        assert_eq!(out, [1, 0, 1]);
    }
}
