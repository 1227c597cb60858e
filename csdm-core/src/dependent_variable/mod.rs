//! Dependent variables: the measured data mapped onto the dimension grid.
//!
//! Each variable owns a [`ComponentArray`] shaped `(p, ...)`, where `p` is
//! fixed by the [`QuantityType`]. Until [`DependentVariable::reshape`] is
//! called with the grid shape, components are held as read, `(p, n)`.

mod sparse;

pub use sparse::SparseSampling;

use crate::codec::{decode_components, encode_components, ComponentSource};
use crate::components::ComponentArray;
use crate::dict::{self, Dict};
use crate::errors::{CsdmError, CsdmResult};
use crate::options::{ReadOptions, WriteOptions};
use crate::types::{Encoding, NumericType, QuantityType};
use crate::units::Unit;
use serde_json::Value;
use std::path::PathBuf;

const OWNER: &str = "DependentVariable";

const TYPES: [&str; 2] = ["internal", "external"];

/// Where the components of a variable came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Storage {
    /// Components were stored inline.
    #[default]
    Internal,
    /// Components were read from a binary file at `url`.
    External { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DependentVariable {
    storage: Storage,
    pub name: String,
    pub description: String,
    unit: Unit,
    quantity_name: Option<String>,
    quantity_type: QuantityType,
    encoding: Encoding,
    component_labels: Vec<String>,
    pub application: Dict,
    sparse_sampling: Option<SparseSampling>,
    components: ComponentArray,
}

impl DependentVariable {
    /// Wraps `components`, whose leading axis must hold the `p` components of
    /// `quantity_type`.
    pub fn new(components: ComponentArray, quantity_type: QuantityType) -> CsdmResult<Self> {
        let p = quantity_type.component_count();
        check_leading_axis(&components, p)?;
        Ok(Self {
            storage: Storage::Internal,
            name: String::new(),
            description: String::new(),
            unit: Unit::dimensionless(),
            quantity_name: None,
            quantity_type,
            encoding: Encoding::default(),
            component_labels: vec![String::new(); p],
            application: Dict::new(),
            sparse_sampling: None,
            components,
        })
    }

    /// Reads a dependent variable object.
    ///
    /// External components are read from `components_url`, resolved against
    /// [`ReadOptions::base_dir`]. Remote URLs are not fetched.
    pub fn from_dict(value: &Value, options: &ReadOptions) -> CsdmResult<Self> {
        let dict = dict::as_object(value, OWNER)?;
        let kind = dict::required(dict, "type", OWNER)?;
        let kind = kind
            .as_str()
            .ok_or_else(|| CsdmError::invalid_literal("type", &kind.to_string(), &TYPES))?;
        if !TYPES.contains(&kind) {
            return Err(CsdmError::invalid_literal("type", kind, &TYPES));
        }

        let numeric_type: NumericType = required_literal(dict, "numeric_type")?.parse()?;
        let quantity_type: QuantityType = required_literal(dict, "quantity_type")?.parse()?;
        let p = quantity_type.component_count();

        let (storage, source, encoding) = if kind == "external" {
            let url = required_literal(dict, "components_url")?;
            let bytes = read_components_url(&url, options)?;
            (Storage::External { url }, ComponentSource::Raw(bytes), Encoding::Raw)
        } else {
            let source = inline_source(dict::required(dict, "components", OWNER)?)?;
            let encoding = match dict::string(dict, "encoding", OWNER)? {
                Some(literal) => literal.parse()?,
                None => source.encoding(),
            };
            if encoding != source.encoding() {
                return Err(CsdmError::Decode(format!(
                    "components are not stored with the '{encoding}' encoding"
                )));
            }
            (Storage::Internal, source, encoding)
        };
        let components = decode_components(&source, numeric_type, p)?;

        let mut variable = Self::new(components, quantity_type)?;
        variable.storage = storage;
        variable.encoding = encoding;
        variable.name = dict::string(dict, "name", OWNER)?.unwrap_or_default();
        variable.description = dict::string(dict, "description", OWNER)?.unwrap_or_default();
        variable.application = dict::application(dict, OWNER)?;
        variable.quantity_name = dict::string(dict, "quantity_name", OWNER)?;
        if let Some(unit) = dict::string(dict, "unit", OWNER)? {
            variable.unit = parse_unit(&unit)?;
        }
        if let Some(labels) = dict.get("component_labels") {
            let labels = labels
                .as_array()
                .ok_or_else(|| {
                    CsdmError::InvalidValue(format!("{OWNER} 'component_labels' must be a list"))
                })?
                .iter()
                .map(|label| {
                    label.as_str().map(str::to_string).ok_or_else(|| {
                        CsdmError::InvalidValue(format!(
                            "component labels must be strings, found {}",
                            dict::json_type_name(label)
                        ))
                    })
                })
                .collect::<CsdmResult<Vec<_>>>()?;
            variable.set_component_labels(labels);
        }
        if let Some(sparse) = dict.get("sparse_sampling") {
            if !sparse.as_object().is_some_and(|o| o.is_empty()) {
                variable.sparse_sampling = Some(SparseSampling::from_dict(sparse)?);
            }
        }
        Ok(variable)
    }

    /// Serialises the variable as the `index`th dependent variable of a file.
    ///
    /// With the `raw` encoding the components are written to
    /// `<base_dir>/<base_filename>_<index>.dat` and referenced by a relative
    /// `file:` URL from an `external` object.
    pub fn to_dict(&self, options: &WriteOptions, index: usize) -> CsdmResult<Value> {
        let mut dict = Dict::new();
        let encoded = encode_components(&self.components, self.encoding);
        match encoded {
            ComponentSource::Raw(bytes) => {
                let file_name = options.sidecar_name(index);
                let path = options.base_dir.join(&file_name);
                std::fs::write(&path, bytes)?;
                log::debug!("wrote components of '{}' to {}", self.name, path.display());
                dict.insert("type".into(), Value::from("external"));
                dict.insert(
                    "components_url".into(),
                    Value::from(format!("file:./{file_name}")),
                );
            }
            ComponentSource::Base64(strings) => {
                dict.insert("type".into(), Value::from("internal"));
                dict.insert("components".into(), Value::from(strings));
            }
            ComponentSource::Text(lists) => {
                dict.insert("type".into(), Value::from("internal"));
                dict.insert(
                    "components".into(),
                    Value::Array(lists.into_iter().map(Value::Array).collect()),
                );
            }
        }
        if self.encoding != Encoding::Raw {
            dict.insert("encoding".into(), Value::from(self.encoding.as_str()));
        }
        dict.insert("numeric_type".into(), Value::from(self.numeric_type().as_str()));
        dict.insert(
            "quantity_type".into(),
            Value::from(self.quantity_type.to_string()),
        );
        dict::insert_nonempty(&mut dict, "name", &self.name);
        if self.unit != Unit::dimensionless() {
            dict.insert("unit".into(), Value::from(self.unit.to_string()));
        }
        if let Some(name) = &self.quantity_name {
            dict.insert("quantity_name".into(), Value::from(name.as_str()));
        }
        if self.component_labels.iter().any(|l| !l.is_empty()) {
            dict.insert(
                "component_labels".into(),
                Value::from(self.component_labels.clone()),
            );
        }
        dict::insert_nonempty(&mut dict, "description", &self.description);
        dict::insert_application(&mut dict, &self.application);
        if let Some(sparse) = &self.sparse_sampling {
            dict.insert("sparse_sampling".into(), sparse.to_dict()?);
        }
        Ok(Value::Object(dict))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn set_unit(&mut self, unit: Unit) {
        self.unit = unit;
    }

    /// Explicit quantity name, or the physical type of the unit.
    pub fn quantity_name(&self) -> String {
        self.quantity_name
            .clone()
            .unwrap_or_else(|| self.unit.physical_type().to_string())
    }

    pub fn set_quantity_name(&mut self, name: Option<String>) {
        self.quantity_name = name;
    }

    pub fn quantity_type(&self) -> QuantityType {
        self.quantity_type
    }

    /// Changes the quantity type; its component count must match the data.
    pub fn set_quantity_type(&mut self, quantity_type: QuantityType) -> CsdmResult<()> {
        check_leading_axis(&self.components, quantity_type.component_count())?;
        self.quantity_type = quantity_type;
        Ok(())
    }

    pub fn numeric_type(&self) -> NumericType {
        self.components.numeric_type()
    }

    /// Casts the components to `numeric_type`.
    pub fn set_numeric_type(&mut self, numeric_type: NumericType) {
        if numeric_type != self.numeric_type() {
            self.components = self.components.cast(numeric_type);
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    pub fn component_labels(&self) -> &[String] {
        &self.component_labels
    }

    /// Sets the component labels, padding with empty labels or truncating
    /// to the component count.
    pub fn set_component_labels(&mut self, mut labels: Vec<String>) {
        let p = self.quantity_type.component_count();
        if labels.len() != p {
            log::warn!(
                "{} component labels given for {p} components; {}",
                labels.len(),
                if labels.len() > p { "truncating" } else { "padding with empty labels" }
            );
            labels.resize(p, String::new());
        }
        self.component_labels = labels;
    }

    pub fn sparse_sampling(&self) -> Option<&SparseSampling> {
        self.sparse_sampling.as_ref()
    }

    pub fn set_sparse_sampling(&mut self, sparse_sampling: Option<SparseSampling>) {
        self.sparse_sampling = sparse_sampling;
    }

    pub fn components(&self) -> &ComponentArray {
        &self.components
    }

    /// Replaces the components; the leading axis must hold `p` components.
    pub fn set_components(&mut self, components: ComponentArray) -> CsdmResult<()> {
        check_leading_axis(&components, self.quantity_type.component_count())?;
        self.components = components;
        Ok(())
    }

    /// Shapes the components onto a grid.
    ///
    /// `grid_shape` lists dimension counts in reverse declaration order. A
    /// sparse variable is scatter-filled into a dense, zero-initialised array
    /// and stops being sparse. Otherwise an element count that does not match
    /// the grid is logged and the data truncated or zero-padded to fit.
    pub fn reshape(&mut self, grid_shape: &[usize]) -> CsdmResult<()> {
        let p = self.quantity_type.component_count();
        let mut target = Vec::with_capacity(grid_shape.len() + 1);
        target.push(p);
        target.extend_from_slice(grid_shape);

        if let Some(sparse) = self.sparse_sampling.take() {
            match sparse.fill(&self.components, &target) {
                Ok(dense) => self.components = dense,
                Err(e) => {
                    self.sparse_sampling = Some(sparse);
                    return Err(e);
                }
            }
            return Ok(());
        }

        let expected: usize = target.iter().product();
        if self.components.len() == expected {
            self.components = self.components.reshape(&target)?;
        } else {
            log::warn!(
                "dependent variable '{}' holds {} values but the grid {:?} needs {expected}; \
                 the data will be truncated or zero-padded",
                self.name,
                self.components.len(),
                target
            );
            self.components = self.components.resized(&target);
        }
        Ok(())
    }

    /// Reshapes against dimension counts given in declaration order.
    pub fn fill_grid(&mut self, dimension_counts: &[usize]) -> CsdmResult<()> {
        let grid_shape: Vec<usize> = dimension_counts.iter().rev().copied().collect();
        self.reshape(&grid_shape)
    }
}

fn check_leading_axis(components: &ComponentArray, p: usize) -> CsdmResult<()> {
    let found = components.component_count();
    if components.shape().is_empty() || found != p {
        return Err(CsdmError::ComponentCount { expected: p, found });
    }
    Ok(())
}

fn required_literal(dict: &Dict, key: &str) -> CsdmResult<String> {
    dict::string(dict, key, OWNER)?.ok_or_else(|| CsdmError::missing_key(key, OWNER))
}

fn parse_unit(unit: &str) -> CsdmResult<Unit> {
    if unit.trim().is_empty() {
        return Ok(Unit::dimensionless());
    }
    Ok(Unit::parse(unit)?)
}

/// Inline components: base64 strings or lists of numbers.
fn inline_source(components: &Value) -> CsdmResult<ComponentSource> {
    let items = components.as_array().ok_or_else(|| {
        CsdmError::InvalidValue(format!("{OWNER} 'components' must be a list"))
    })?;
    if !items.is_empty() && items.iter().all(Value::is_string) {
        let strings = items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        return Ok(ComponentSource::Base64(strings));
    }
    let lists = items
        .iter()
        .map(|item| {
            item.as_array().cloned().ok_or_else(|| {
                CsdmError::Decode(format!(
                    "each component must be a list of numbers or a base64 string, found {}",
                    dict::json_type_name(item)
                ))
            })
        })
        .collect::<CsdmResult<Vec<_>>>()?;
    Ok(ComponentSource::Text(lists))
}

/// Reads the bytes behind a local `components_url`.
fn read_components_url(url: &str, options: &ReadOptions) -> CsdmResult<Vec<u8>> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Err(CsdmError::InvalidValue(format!(
            "remote components_url '{url}' is not supported; download it first"
        )));
    }
    let path = url
        .strip_prefix("file://")
        .or_else(|| url.strip_prefix("file:"))
        .unwrap_or(url);
    let path = options.resolve(&PathBuf::from(path));
    log::debug!("reading external components from {}", path.display());
    Ok(std::fs::read(path)?)
}
