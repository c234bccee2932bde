//! Category and numeric value encoding shared by training and inference

use crate::error::{EngineError, Result};
use crate::models::json_type_name;
use serde_json::Value;

/// Column name for one level of a one-hot encoded field
pub fn one_hot_column(field: &str, level: &str) -> String {
    format!("{}_{}", field, level)
}

/// Render a categorical value as its level name
///
/// `Ok(None)` is the missing marker: no indicator column is produced.
/// Nested values are structural errors, not missing values.
pub fn categorical_level(field: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(EngineError::malformed(
            field,
            format!("expected a scalar category, got {}", json_type_name(value)),
        )),
    }
}

/// Read a numeric feature, treating anything non-numeric as zero
pub fn numeric_value(field: &str, value: Option<&Value>) -> Result<f64> {
    let parsed = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            return Err(EngineError::malformed(
                field,
                format!("expected a number, got {}", json_type_name(nested)),
            ))
        }
    };

    Ok(if parsed.is_finite() { parsed } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_hot_column_naming() {
        assert_eq!(one_hot_column("main_genre", "Action"), "main_genre_Action");
        assert_eq!(one_hot_column("star1", "Tom Hanks"), "star1_Tom Hanks");
    }

    #[test]
    fn test_categorical_levels() {
        assert_eq!(categorical_level("f", &json!("en")).unwrap(), Some("en".into()));
        assert_eq!(categorical_level("f", &json!(7)).unwrap(), Some("7".into()));
        assert_eq!(categorical_level("f", &json!(null)).unwrap(), None);
        assert!(categorical_level("f", &json!([{"name": "x"}])).is_err());
        assert!(categorical_level("f", &json!({"name": "x"})).is_err());
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(numeric_value("budget", Some(&json!(1500))).unwrap(), 1500.0);
        assert_eq!(numeric_value("budget", Some(&json!("2.5"))).unwrap(), 2.5);
        assert_eq!(numeric_value("budget", Some(&json!("n/a"))).unwrap(), 0.0);
        assert_eq!(numeric_value("budget", Some(&json!("NaN"))).unwrap(), 0.0);
        assert_eq!(numeric_value("budget", Some(&json!(true))).unwrap(), 1.0);
        assert_eq!(numeric_value("budget", None).unwrap(), 0.0);
        assert!(numeric_value("budget", Some(&json!([1]))).is_err());
    }
}
