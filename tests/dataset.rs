//! End-to-end tests over complete dataset documents.
//!
//! These read dimensions and dependent variables the way a file reader
//! would, shape the variables onto the grid, and check that:
//! - dictionaries survive a serialise/deserialise cycle
//! - sparse variables scatter into the dense grid
//! - Fourier transforms invert and swap dimension metadata
//! - raw components round trip through sidecar files

use approx::assert_relative_eq;
use csdm::{
    fourier, units, ComponentArray, DependentVariable, Dimension, Encoding, ReadOptions,
    WriteOptions,
};
use num::complex::Complex64;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Deserialize)]
struct Document {
    dimensions: Vec<Value>,
    dependent_variables: Vec<Value>,
}

struct Dataset {
    dimensions: Vec<Dimension>,
    variables: Vec<DependentVariable>,
}

impl Dataset {
    fn read(document: Value, options: &ReadOptions) -> Dataset {
        let document: Document = serde_json::from_value(document).unwrap();
        let dimensions: Vec<Dimension> = document
            .dimensions
            .iter()
            .map(|d| Dimension::from_dict(d).unwrap())
            .collect();
        let counts: Vec<usize> = dimensions.iter().map(Dimension::count).collect();
        let variables = document
            .dependent_variables
            .iter()
            .map(|v| {
                let mut variable = DependentVariable::from_dict(v, options).unwrap();
                variable.fill_grid(&counts).unwrap();
                variable
            })
            .collect();
        Dataset {
            dimensions,
            variables,
        }
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("csdm-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

mod dictionary_round_trip {
    use super::*;

    fn nmr_document() -> Value {
        let signal: Vec<f64> = (0..24).map(f64::from).collect();
        json!({
            "dimensions": [
                {
                    "type": "linear",
                    "count": 4,
                    "increment": "0.25 ms",
                    "coordinates_offset": "-0.5 ms",
                    "label": "acquisition",
                    "reciprocal": {
                        "coordinates_offset": "100.0 MHz",
                        "origin_offset": "400.0 MHz",
                        "label": "frequency"
                    }
                },
                {
                    "type": "monotonic",
                    "coordinates": ["1.0 K", "2.5 K", "10.0 K"],
                    "description": "sample temperature"
                },
                {
                    "type": "labeled",
                    "labels": ["run a", "run b"]
                }
            ],
            "dependent_variables": [
                {
                    "type": "internal",
                    "name": "signal",
                    "numeric_type": "float64",
                    "quantity_type": "scalar",
                    "encoding": "none",
                    "unit": "V",
                    "components": [signal]
                }
            ]
        })
    }

    #[test]
    fn test_dimensions_survive_round_trip() {
        let dataset = Dataset::read(nmr_document(), &ReadOptions::default());
        for dimension in &dataset.dimensions {
            let reread = Dimension::from_dict(&dimension.to_dict()).unwrap();
            assert_eq!(&reread, dimension);
        }

        let linear = dataset.dimensions[0].as_linear().unwrap();
        assert_relative_eq!(linear.coordinates()[0], -0.5);
        assert_eq!(linear.reciprocal().meta.label, "frequency");
        assert_eq!(dataset.dimensions[1].quantity_name().unwrap(), "temperature");
        assert_eq!(dataset.dimensions[2].axis_label(), "");
        assert!(dataset.dimensions[2].unit().is_err());
    }

    #[test]
    fn test_variables_are_shaped_onto_the_grid() {
        let dataset = Dataset::read(nmr_document(), &ReadOptions::default());
        let signal = &dataset.variables[0];
        // reverse declaration order: labeled, monotonic, linear
        assert_eq!(signal.components().shape(), &[1, 2, 3, 4]);
        let values = signal.components().as_array::<f64>().unwrap();
        assert_eq!(values[[0, 1, 2, 3]], 23.0);
        assert_eq!(values[[0, 0, 1, 0]], 4.0);
        assert_eq!(signal.quantity_name(), "electrical potential");
    }

    #[test]
    fn test_base64_variable_survives_round_trip() {
        let mut dataset = Dataset::read(nmr_document(), &ReadOptions::default());
        let signal = &mut dataset.variables[0];
        signal.set_encoding(Encoding::Base64);
        let dict = signal.to_dict(&WriteOptions::default(), 0).unwrap();
        assert!(dict["components"][0].is_string());

        let mut reread = DependentVariable::from_dict(&dict, &ReadOptions::default()).unwrap();
        reread.fill_grid(&[4, 3, 2]).unwrap();
        assert_eq!(reread.components(), signal.components());
        assert_eq!(reread.encoding(), Encoding::Base64);
    }
}

mod sparse_grids {
    use super::*;

    #[test]
    fn test_sparse_variable_fills_dense_grid() {
        let document = json!({
            "dimensions": [
                {"type": "linear", "count": 5, "increment": "1.0 cm"},
                {"type": "linear", "count": 2, "increment": "1.0 cm"}
            ],
            "dependent_variables": [
                {
                    "type": "internal",
                    "numeric_type": "int32",
                    "quantity_type": "vector_2",
                    "encoding": "none",
                    "components": [[10, 20, 30, 40, 50, 60], [1, 2, 3, 4, 5, 6]],
                    "sparse_sampling": {
                        "dimension_indexes": [0],
                        "sparse_grid_vertexes": [0, 2, 4],
                        "unsigned_integer_type": "uint16",
                        "encoding": "none"
                    }
                }
            ]
        });
        let dataset = Dataset::read(document, &ReadOptions::default());
        let variable = &dataset.variables[0];
        assert!(variable.sparse_sampling().is_none());

        let values = variable.components().as_array::<i32>().unwrap();
        assert_eq!(values.shape(), &[2, 2, 5]);
        let row = |p: usize, j: usize| (0..5).map(|i| values[[p, j, i]]).collect::<Vec<i32>>();
        assert_eq!(row(0, 0), vec![10, 0, 20, 0, 30]);
        assert_eq!(row(0, 1), vec![40, 0, 50, 0, 60]);
        assert_eq!(row(1, 1), vec![4, 0, 5, 0, 6]);
    }
}

mod fourier_transforms {
    use super::*;

    fn fid_document(count: usize) -> Value {
        let signal: Vec<f64> = (0..count)
            .flat_map(|k| {
                let t = k as f64 * 1e-4;
                let decay = (-t / 2e-3).exp();
                let angle = 2.0 * std::f64::consts::PI * 500.0 * t;
                [decay * angle.cos(), decay * angle.sin()]
            })
            .collect();
        json!({
            "dimensions": [
                {
                    "type": "linear",
                    "count": count,
                    "increment": "0.1 ms",
                    "label": "time",
                    "reciprocal": {"coordinates_offset": "-2.0 kHz", "label": "frequency"}
                }
            ],
            "dependent_variables": [
                {
                    "type": "internal",
                    "numeric_type": "complex128",
                    "quantity_type": "scalar",
                    "encoding": "none",
                    "components": [signal]
                }
            ]
        })
    }

    #[test]
    fn test_forward_then_inverse_restores_signal() {
        let mut dataset = Dataset::read(fid_document(16), &ReadOptions::default());
        let original = dataset.variables[0].components().clone();
        let time = dataset.dimensions[0].clone();

        fourier::fft(&mut dataset.dimensions, &mut dataset.variables, 0).unwrap();
        let frequency = dataset.dimensions[0].as_linear().unwrap();
        assert!(frequency.complex_fft());
        assert_eq!(frequency.meta.label, "frequency");
        assert_eq!(frequency.reciprocal().meta.label, "time");
        assert_relative_eq!(frequency.coordinates_offset().value(), -2.0);
        assert_relative_eq!(frequency.increment().value(), 0.625, max_relative = 1e-12);

        fourier::fft(&mut dataset.dimensions, &mut dataset.variables, 0).unwrap();
        let restored_time = dataset.dimensions[0].as_linear().unwrap();
        let time = time.as_linear().unwrap();
        assert!(!restored_time.complex_fft());
        assert_eq!(restored_time.unit(), time.unit());
        assert_relative_eq!(restored_time.increment().value(), 0.1, max_relative = 1e-12);
        assert_eq!(restored_time.meta, time.meta);
        assert_eq!(restored_time.reciprocal(), time.reciprocal());
        let restored = dataset.variables[0].components().as_array::<Complex64>().unwrap();
        let original = original.as_array::<Complex64>().unwrap();
        for (r, o) in restored.iter().zip(original.iter()) {
            assert_relative_eq!(r.re, o.re, epsilon = 1e-12);
            assert_relative_eq!(r.im, o.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spectrum_peaks_at_signal_frequency() {
        let mut dataset = Dataset::read(fid_document(64), &ReadOptions::default());
        fourier::fft(&mut dataset.dimensions, &mut dataset.variables, 0).unwrap();

        let frequency = dataset.dimensions[0].as_linear().unwrap();
        let spectrum = dataset.variables[0].components().to_complex128();
        let (peak, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .unwrap();
        // the reciprocal unit is kHz
        let peak_frequency = frequency.coordinates()[peak];
        assert!((peak_frequency - 0.5).abs() <= frequency.increment().value());
    }

    #[test]
    fn test_transformed_dimension_reads_back_from_dict() {
        let document = json!({
            "dimensions": [{"type": "linear", "count": 4, "increment": "1.0 s"}],
            "dependent_variables": [
                {
                    "type": "internal",
                    "numeric_type": "float64",
                    "quantity_type": "scalar",
                    "encoding": "none",
                    "unit": "1/s",
                    "components": [[1.0, 0.0, 0.0, 0.0]]
                }
            ]
        });
        let mut dataset = Dataset::read(document, &ReadOptions::default());
        fourier::fft(&mut dataset.dimensions, &mut dataset.variables, 0).unwrap();

        let dict = dataset.dimensions[0].to_dict();
        assert_eq!(dict["increment"], json!("0.25 1 / s"));
        let reread = Dimension::from_dict(&dict).unwrap();
        assert_eq!(reread, dataset.dimensions[0]);
        assert_eq!(reread.quantity_name().unwrap(), "frequency");

        let variable = dataset.variables[0]
            .to_dict(&WriteOptions::default(), 0)
            .unwrap();
        let reread = DependentVariable::from_dict(&variable, &ReadOptions::default()).unwrap();
        assert_eq!(reread.unit(), dataset.variables[0].unit());
    }

    #[test]
    fn test_labeled_dimension_is_rejected() {
        let mut dimensions = vec![Dimension::from_dict(&json!({
            "type": "labeled",
            "labels": ["a", "b"]
        }))
        .unwrap()];
        let components = ComponentArray::from_shape_vec(&[1, 2], vec![1.0f64, 2.0]).unwrap();
        let mut variables =
            vec![DependentVariable::new(components, csdm::QuantityType::Scalar).unwrap()];
        let err = fourier::fft(&mut dimensions, &mut variables, 0).unwrap_err();
        assert!(err.to_string().contains("LabeledDimension"));
    }
}

mod external_components {
    use super::*;

    #[test]
    fn test_raw_components_round_trip_through_sidecar() {
        let dir = scratch_dir("sidecar");
        let document = json!({
            "dimensions": [{"type": "linear", "count": 3, "increment": "1.0 s"}],
            "dependent_variables": [
                {
                    "type": "internal",
                    "name": "counts",
                    "numeric_type": "uint16",
                    "quantity_type": "pixel_2",
                    "encoding": "none",
                    "components": [[1, 2, 3], [65535, 0, 7]]
                }
            ]
        });
        let mut dataset = Dataset::read(document, &ReadOptions::default());
        dataset.variables[0].set_encoding(Encoding::Raw);

        let options = WriteOptions::new(&dir, "counts");
        let written: Vec<Value> = dataset
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| v.to_dict(&options, i).unwrap())
            .collect();
        assert_eq!(written[0]["components_url"], json!("file:./counts_0.dat"));
        assert_eq!(std::fs::read(dir.join("counts_0.dat")).unwrap().len(), 12);

        let reread = Dataset::read(
            json!({
                "dimensions": [dataset.dimensions[0].to_dict()],
                "dependent_variables": written
            }),
            &ReadOptions::with_base_dir(&dir),
        );
        assert_eq!(reread.variables[0].components(), dataset.variables[0].components());
        assert_eq!(reread.variables[0].name, "counts");
        std::fs::remove_dir_all(dir).unwrap();
    }
}

mod custom_units {
    use super::*;

    #[test]
    fn test_ppm_dimension_after_enabling_custom_units() {
        units::enable_custom_units();
        let dimension = Dimension::from_dict(&json!({
            "type": "linear",
            "count": 3,
            "increment": "0.5 ppm"
        }))
        .unwrap();
        assert_eq!(dimension.quantity_name().unwrap(), "dimensionless");
        let ppm = units::Quantity::parse("2 ppm").unwrap();
        assert_relative_eq!(ppm.value_in(&units::Unit::dimensionless()).unwrap(), 2e-6);
    }
}
