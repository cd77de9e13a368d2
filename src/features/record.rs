//! Input Record - the loosely typed request payload
//!
//! Keeps every numeric (or boolean) field the caller sent, keyed by name.
//! Unrelated keys are tolerated whatever their type; a schema field must be
//! a number or a boolean.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use super::layout::feature_index;

/// Why a payload could not become an encodable record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("No input data provided")]
    Empty,

    #[error("Malformed JSON body: {0}")]
    Malformed(String),

    #[error("Input must be a JSON object")]
    NotAnObject,

    #[error("Field '{0}' must be a number or boolean")]
    NotNumeric(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Unknown fields: {}", .0.join(", "))]
    UnknownFields(Vec<String>),

    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Mapping from field name to value for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputRecord {
    fields: BTreeMap<String, f64>,
    /// Non-numeric keys outside the layout, kept only so strict mode can name them
    ignored: Vec<String>,
}

impl InputRecord {
    /// Parse a raw request body
    pub fn from_slice(body: &[u8]) -> Result<Self, InputError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(InputError::Empty);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| InputError::Malformed(e.to_string()))?;

        Self::from_value(value)
    }

    /// Falsy bodies (`null`, `false`, `0`, `""`, `[]`, `{}`) carry no input;
    /// any other non-object is rejected as such.
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            value if is_blank(&value) => Err(InputError::Empty),
            _ => Err(InputError::NotAnObject),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Result<Self, InputError> {
        if map.is_empty() {
            return Err(InputError::Empty);
        }

        let mut record = Self::default();
        for (name, value) in map {
            match numeric_value(&value) {
                Some(v) => {
                    record.fields.insert(name, v);
                }
                None if feature_index(&name).is_some() => {
                    return Err(InputError::NotNumeric(name));
                }
                None => record.ignored.push(name),
            }
        }

        Ok(record)
    }

    /// Value for an exact field name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.ignored.iter().any(|n| n == name)
    }

    /// Numeric fields as received, including ones outside the layout
    pub fn fields(&self) -> &BTreeMap<String, f64> {
        &self.fields
    }

    /// Every key that does not name a layout slot, sorted
    pub fn unknown_fields(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = self
            .fields
            .keys()
            .chain(self.ignored.iter())
            .map(String::as_str)
            .filter(|name| feature_index(name).is_none())
            .collect();
        unknown.sort_unstable();
        unknown
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for InputRecord {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ignored: Vec::new(),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_booleans() {
        let record = InputRecord::from_value(json!({
            "age": 61,
            "sleep_hours": 6.5,
            "hypertension": true,
            "diabetes": false,
        }))
        .unwrap();

        assert_eq!(record.get("age"), Some(61.0));
        assert_eq!(record.get("sleep_hours"), Some(6.5));
        assert_eq!(record.get("hypertension"), Some(1.0));
        assert_eq!(record.get("diabetes"), Some(0.0));
    }

    #[test]
    fn test_empty_payloads() {
        assert_eq!(InputRecord::from_slice(b""), Err(InputError::Empty));
        assert_eq!(InputRecord::from_slice(b"  \n"), Err(InputError::Empty));
        assert_eq!(InputRecord::from_slice(b"{}"), Err(InputError::Empty));
        assert_eq!(InputRecord::from_slice(b"null"), Err(InputError::Empty));
    }

    #[test]
    fn test_falsy_bodies_are_empty() {
        let bodies: [&[u8]; 5] = [b"[]", b"\"\"", b"0", b"0.0", b"false"];
        for body in bodies {
            assert_eq!(InputRecord::from_slice(body), Err(InputError::Empty));
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = InputRecord::from_slice(b"{\"age\": ").unwrap_err();
        assert!(matches!(err, InputError::Malformed(_)));
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(InputRecord::from_slice(b"[1, 2]"), Err(InputError::NotAnObject));
        assert_eq!(InputRecord::from_slice(b"42"), Err(InputError::NotAnObject));
        assert_eq!(InputRecord::from_slice(b"true"), Err(InputError::NotAnObject));
        assert_eq!(InputRecord::from_slice(b"\"age\""), Err(InputError::NotAnObject));
    }

    #[test]
    fn test_schema_field_must_be_numeric() {
        let err = InputRecord::from_value(json!({"age": "sixty", "gender_Male": 1})).unwrap_err();
        assert_eq!(err, InputError::NotNumeric("age".to_string()));
        assert_eq!(err.to_string(), "Field 'age' must be a number or boolean");
    }

    #[test]
    fn test_unrelated_non_numeric_keys_are_tolerated() {
        let record = InputRecord::from_value(json!({
            "age": 40,
            "gender_Male": 0,
            "name": "anonymous",
            "notes": null,
            "extra_score": 3,
        }))
        .unwrap();

        assert!(record.contains("name"));
        assert_eq!(record.get("name"), None);
        assert_eq!(record.unknown_fields(), vec!["extra_score", "name", "notes"]);
    }
}
