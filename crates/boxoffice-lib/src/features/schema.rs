//! Ordered feature-column schema fixed at training time

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The ordered column list an estimator was trained against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

/// On-disk forms accepted for a schema artifact
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    Columns(Vec<String>),
    Wrapped { columns: Vec<String> },
}

#[derive(Serialize)]
struct SchemaFileOut<'a> {
    columns: &'a [String],
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated column lists
    pub fn new(columns: Vec<String>) -> std::result::Result<Self, String> {
        if columns.is_empty() {
            return Err("schema has no columns".to_string());
        }
        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), i).is_some() {
                return Err(format!("duplicate column '{}'", column));
            }
        }
        Ok(Self { columns, index })
    }

    pub fn from_columns<I, S>(columns: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns.into_iter().map(Into::into).collect())
    }

    /// Load a schema artifact (a JSON array or `{ "columns": [...] }`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::model_load(path, e))?;
        let parsed: SchemaFile =
            serde_json::from_str(&content).map_err(|e| EngineError::model_load(path, e))?;
        let columns = match parsed {
            SchemaFile::Columns(columns) | SchemaFile::Wrapped { columns } => columns,
        };
        Self::new(columns).map_err(|reason| EngineError::model_load(path, reason))
    }

    /// Write the schema as `{ "columns": [...] }`
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(&SchemaFileOut {
            columns: &self.columns,
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}
