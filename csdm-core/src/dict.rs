//! Helpers for reading and writing CSDM dictionary objects.
//!
//! Objects are plain `serde_json` maps. Readers validate eagerly and name the
//! offending key and owner type in their errors.

use crate::errors::{CsdmError, CsdmResult};
use crate::units::Quantity;
use serde_json::{Map, Value};

pub type Dict = Map<String, Value>;

pub(crate) fn as_object<'a>(value: &'a Value, owner: &str) -> CsdmResult<&'a Dict> {
    value
        .as_object()
        .ok_or_else(|| CsdmError::InvalidValue(format!("{owner} must be a JSON object")))
}

pub(crate) fn required<'a>(dict: &'a Dict, key: &str, owner: &str) -> CsdmResult<&'a Value> {
    dict.get(key)
        .ok_or_else(|| CsdmError::missing_key(key, owner))
}

fn type_error(key: &str, owner: &str, expected: &str, found: &Value) -> CsdmError {
    CsdmError::InvalidValue(format!(
        "{owner} '{key}' must be {expected}, found {}",
        json_type_name(found)
    ))
}

/// Python-flavoured name of a JSON value's type, used in validation messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

pub(crate) fn string(dict: &Dict, key: &str, owner: &str) -> CsdmResult<Option<String>> {
    match dict.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_error(key, owner, "a string", other)),
    }
}

pub(crate) fn boolean(dict: &Dict, key: &str, owner: &str) -> CsdmResult<Option<bool>> {
    match dict.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_error(key, owner, "a boolean", other)),
    }
}

pub(crate) fn count(value: &Value, key: &str, owner: &str) -> CsdmResult<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| type_error(key, owner, "a non-negative integer", value))
}

/// Reads a quantity from a `"<number> <unit>"` string or a bare number.
pub(crate) fn quantity_value(value: &Value, key: &str, owner: &str) -> CsdmResult<Quantity> {
    match value {
        Value::String(s) => Ok(Quantity::parse(s)?),
        Value::Number(n) => n
            .as_f64()
            .map(Quantity::dimensionless)
            .ok_or_else(|| type_error(key, owner, "a quantity", value)),
        other => Err(type_error(key, owner, "a quantity string", other)),
    }
}

pub(crate) fn quantity(dict: &Dict, key: &str, owner: &str) -> CsdmResult<Option<Quantity>> {
    match dict.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => quantity_value(value, key, owner).map(Some),
    }
}

pub(crate) fn application(dict: &Dict, owner: &str) -> CsdmResult<Dict> {
    match dict.get("application") {
        None | Some(Value::Null) => Ok(Dict::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(type_error("application", owner, "an object", other)),
    }
}

/// Inserts `value` under `key` unless it is empty.
pub(crate) fn insert_nonempty(dict: &mut Dict, key: &str, value: &str) {
    if !value.is_empty() {
        dict.insert(key.to_string(), Value::from(value));
    }
}

pub(crate) fn insert_application(dict: &mut Dict, application: &Dict) {
    if !application.is_empty() {
        dict.insert("application".to_string(), Value::Object(application.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_names_key_and_owner() {
        let dict = json!({"count": 3});
        let dict = as_object(&dict, "LinearDimension").unwrap();
        let err = required(dict, "increment", "LinearDimension").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'increment' is a required key in LinearDimension"
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(json_type_name(&json!(3)), "int");
        assert_eq!(json_type_name(&json!(3.5)), "float");
        assert_eq!(json_type_name(&json!("a")), "str");
        assert_eq!(json_type_name(&json!(null)), "NoneType");
    }

    #[test]
    fn test_quantity_reader() {
        let dict = json!({"a": "2 s", "b": 4, "c": true});
        let dict = as_object(&dict, "Test").unwrap();
        let a = quantity(dict, "a", "Test").unwrap().unwrap();
        assert_eq!(a.value(), 2.0);
        assert_eq!(a.physical_type(), "time");
        assert!(quantity(dict, "b", "Test").unwrap().unwrap().unit().is_dimensionless());
        assert!(quantity(dict, "c", "Test").is_err());
        assert!(quantity(dict, "missing", "Test").unwrap().is_none());
    }
}
