//! Core data models for the prediction engine

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Numeric fields copied straight into their own feature column
pub const NUMERIC_FIELDS: &[&str] = &["budget", "popularity", "runtime", "peak_hype", "average_hype"];

/// Categorical fields one-hot encoded as `<field>_<value>`
pub const CATEGORICAL_FIELDS: &[&str] = &[
    "main_genre",
    "main_company",
    "original_language",
    "director",
    "star1",
    "star2",
    "star3",
];

/// A flat movie record as supplied by a data provider or a user
///
/// Absent numeric fields read as zero and absent categorical fields read as
/// missing. The engine never mutates a record; normalization builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMovieRecord {
    fields: Map<String, Value>,
}

impl RawMovieRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret an arbitrary JSON value as a record
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(EngineError::malformed(
                "<record>",
                format!("expected a JSON object, got {}", json_type_name(&other)),
            )),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| EngineError::malformed("<record>", e.to_string()))?;
        Self::from_value(value)
    }

    /// Builder-style insert, handy for assembling records in code
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// True when the field exists with a non-null value
    pub fn has(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(v) if !v.is_null())
    }

    /// String value of a field, if it is one
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for RawMovieRecord {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_object() {
        let record = RawMovieRecord::from_value(json!({"budget": 10, "main_genre": "Action"})).unwrap();
        assert_eq!(record.get_str("main_genre"), Some("Action"));
        assert!(record.has("budget"));
        assert!(!record.has("runtime"));
    }

    #[test]
    fn test_record_rejects_non_object() {
        let err = RawMovieRecord::from_value(json!([1, 2, 3])).unwrap_err();
        match err {
            EngineError::MalformedRecord { field, reason } => {
                assert_eq!(field, "<record>");
                assert!(reason.contains("array"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_null_field_is_not_present() {
        let record = RawMovieRecord::new().with("director", Value::Null);
        assert!(!record.has("director"));
    }
}
