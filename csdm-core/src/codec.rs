//! Component buffer encodings.
//!
//! Components are stored one of three ways:
//!
//! - `base64`: one base64 string per component holding little-endian bytes
//! - `none`: one JSON list of numbers per component, complex values
//!   interleaved as `re, im`
//! - `raw`: all components concatenated, little-endian, in a single binary
//!   buffer (usually a sidecar file)
//!
//! Decoding always produces a `(p, n)` array; reshaping to the grid happens
//! in the dependent variable.

use crate::components::{on_array, with_element_type, ComponentArray, Element};
use crate::errors::{CsdmError, CsdmResult};
use crate::types::{Encoding, NumericType};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ndarray::{ArrayD, Axis, IxDyn};
use serde_json::Value;

/// Undecoded component buffers, tagged by encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentSource {
    Text(Vec<Vec<Value>>),
    Base64(Vec<String>),
    Raw(Vec<u8>),
}

impl ComponentSource {
    pub fn encoding(&self) -> Encoding {
        match self {
            ComponentSource::Text(_) => Encoding::Text,
            ComponentSource::Base64(_) => Encoding::Base64,
            ComponentSource::Raw(_) => Encoding::Raw,
        }
    }
}

/// Encoded component buffers. The `Raw` bytes are written to a sidecar file.
pub type EncodedComponents = ComponentSource;

/// Decodes `source` into a `(p, n)` array of `numeric_type`.
///
/// `base64` and `none` sources must carry exactly `component_count` buffers.
pub fn decode_components(
    source: &ComponentSource,
    numeric_type: NumericType,
    component_count: usize,
) -> CsdmResult<ComponentArray> {
    with_element_type!(numeric_type, T => {
        decode_typed::<T>(source, component_count).map(ComponentArray::from)
    })
}

fn decode_typed<T: Element>(
    source: &ComponentSource,
    component_count: usize,
) -> CsdmResult<ArrayD<T>> {
    match source {
        ComponentSource::Text(lists) => {
            check_component_count(component_count, lists.len())?;
            let components = lists
                .iter()
                .map(|list| decode_text::<T>(list))
                .collect::<CsdmResult<Vec<_>>>()?;
            stack(components)
        }
        ComponentSource::Base64(strings) => {
            check_component_count(component_count, strings.len())?;
            let components = strings
                .iter()
                .map(|s| {
                    let bytes = BASE64
                        .decode(s.trim())
                        .map_err(|e| CsdmError::Decode(format!("invalid base64: {e}")))?;
                    decode_bytes::<T>(&bytes)
                })
                .collect::<CsdmResult<Vec<_>>>()?;
            stack(components)
        }
        ComponentSource::Raw(bytes) => {
            let values = decode_bytes::<T>(bytes)?;
            if component_count == 0 || values.len() % component_count != 0 {
                return Err(CsdmError::Decode(format!(
                    "{} values cannot be split into {component_count} components",
                    values.len()
                )));
            }
            let n = values.len() / component_count;
            ArrayD::from_shape_vec(IxDyn(&[component_count, n]), values)
                .map_err(|e| CsdmError::Decode(e.to_string()))
        }
    }
}

fn check_component_count(expected: usize, found: usize) -> CsdmResult<()> {
    if expected != found {
        return Err(CsdmError::ComponentCount { expected, found });
    }
    Ok(())
}

fn decode_text<T: Element>(list: &[Value]) -> CsdmResult<Vec<T>> {
    if list.len() % T::SCALARS != 0 {
        return Err(CsdmError::Decode(format!(
            "{} values do not form whole {} elements",
            list.len(),
            T::NUMERIC_TYPE
        )));
    }
    list.chunks_exact(T::SCALARS).map(T::from_json).collect()
}

fn decode_bytes<T: Element>(bytes: &[u8]) -> CsdmResult<Vec<T>> {
    let size = T::NUMERIC_TYPE.item_size();
    if bytes.len() % size != 0 {
        return Err(CsdmError::Decode(format!(
            "{} bytes is not a multiple of the {} item size ({size})",
            bytes.len(),
            T::NUMERIC_TYPE
        )));
    }
    Ok(bytes.chunks_exact(size).map(T::read_le).collect())
}

fn stack<T: Element>(components: Vec<Vec<T>>) -> CsdmResult<ArrayD<T>> {
    let p = components.len();
    let n = components.first().map_or(0, Vec::len);
    if let Some(bad) = components.iter().find(|c| c.len() != n) {
        return Err(CsdmError::Decode(format!(
            "components have unequal lengths ({n} and {})",
            bad.len()
        )));
    }
    let values = components.into_iter().flatten().collect();
    ArrayD::from_shape_vec(IxDyn(&[p, n]), values).map_err(|e| CsdmError::Decode(e.to_string()))
}

/// Encodes `components` (shape `(p, ...)`) with `encoding`.
pub fn encode_components(components: &ComponentArray, encoding: Encoding) -> EncodedComponents {
    on_array!(components, array => encode_typed(array, encoding))
}

fn encode_typed<T: Element>(array: &ArrayD<T>, encoding: Encoding) -> EncodedComponents {
    match encoding {
        Encoding::Raw => {
            let mut bytes = Vec::with_capacity(array.len() * T::NUMERIC_TYPE.item_size());
            array.iter().for_each(|v| v.write_le(&mut bytes));
            ComponentSource::Raw(bytes)
        }
        Encoding::Base64 => ComponentSource::Base64(
            array
                .axis_iter(Axis(0))
                .map(|component| {
                    let mut bytes = Vec::new();
                    component.iter().for_each(|v| v.write_le(&mut bytes));
                    BASE64.encode(bytes)
                })
                .collect(),
        ),
        Encoding::Text => ComponentSource::Text(
            array
                .axis_iter(Axis(0))
                .map(|component| {
                    let mut values = Vec::with_capacity(component.len() * T::SCALARS);
                    component.iter().for_each(|v| v.push_json(&mut values));
                    values
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use num::complex::Complex64;
    use serde_json::json;

    fn sample(numeric_type: NumericType) -> ComponentArray {
        let values = ndarray::Array::from_shape_fn(IxDyn(&[2, 3]), |idx| {
            Complex64::new((idx[0] * 3 + idx[1]) as f64, idx[1] as f64)
        });
        ComponentArray::from_complex128(&values, numeric_type)
    }

    #[test]
    fn test_every_type_and_encoding_round_trips() {
        for numeric_type in NumericType::ALL {
            let components = sample(numeric_type);
            for encoding in [Encoding::Base64, Encoding::Text, Encoding::Raw] {
                let encoded = encode_components(&components, encoding);
                assert_eq!(encoded.encoding(), encoding);
                let decoded = decode_components(&encoded, numeric_type, 2).unwrap();
                assert_eq!(decoded, components, "{numeric_type} via {encoding}");
            }
        }
    }

    #[test]
    fn test_text_complex_interleaved() {
        let source = ComponentSource::Text(vec![vec![json!(1.0), json!(2.0), json!(3.0), json!(-4.0)]]);
        let decoded = decode_components(&source, NumericType::Complex128, 1).unwrap();
        assert_eq!(
            decoded.as_array::<Complex64>().unwrap(),
            &array![[Complex64::new(1.0, 2.0), Complex64::new(3.0, -4.0)]].into_dyn()
        );

        let odd = ComponentSource::Text(vec![vec![json!(1.0), json!(2.0), json!(3.0)]]);
        assert!(decode_components(&odd, NumericType::Complex128, 1).is_err());
    }

    #[test]
    fn test_component_count_mismatch() {
        let source = ComponentSource::Text(vec![vec![json!(1), json!(2)]]);
        let err = decode_components(&source, NumericType::Int32, 2).unwrap_err();
        assert_eq!(err.to_string(), "Expecting 2 components, found 1");

        let source = ComponentSource::Base64(vec!["AAAAAA==".into()]);
        assert!(matches!(
            decode_components(&source, NumericType::Float32, 3),
            Err(CsdmError::ComponentCount {
                expected: 3,
                found: 1
            })
        ));
    }

    #[test]
    fn test_base64_known_bytes() {
        // 1.0f32 little-endian is 00 00 80 3f
        let source = ComponentSource::Base64(vec!["AACAPw==".into()]);
        let decoded = decode_components(&source, NumericType::Float32, 1).unwrap();
        assert_eq!(decoded.as_array::<f32>().unwrap(), &array![[1.0f32]].into_dyn());

        let bad = ComponentSource::Base64(vec!["AACA".into()]);
        assert!(matches!(
            decode_components(&bad, NumericType::Float32, 1),
            Err(CsdmError::Decode(_))
        ));
    }

    #[test]
    fn test_raw_splits_into_components() {
        let bytes: Vec<u8> = (0u16..6).flat_map(|v| v.to_le_bytes()).collect();
        let decoded =
            decode_components(&ComponentSource::Raw(bytes.clone()), NumericType::UInt16, 2).unwrap();
        assert_eq!(
            decoded.as_array::<u16>().unwrap(),
            &array![[0u16, 1, 2], [3, 4, 5]].into_dyn()
        );
        assert!(decode_components(&ComponentSource::Raw(bytes), NumericType::UInt16, 4).is_err());
    }

    #[test]
    fn test_unequal_components_rejected() {
        let source = ComponentSource::Text(vec![vec![json!(1)], vec![json!(1), json!(2)]]);
        assert!(matches!(
            decode_components(&source, NumericType::Int8, 2),
            Err(CsdmError::Decode(_))
        ));
    }
}
