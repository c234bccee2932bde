use super::FeatureSchema;
use serde::Serialize;
use std::sync::Arc;

/// A single row aligned to a [`FeatureSchema`]
///
/// Only the aligner constructs these, so `values` always has exactly one
/// entry per schema column, in schema order.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(schema: Arc<FeatureSchema>, values: Vec<f64>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column, `None` if the schema lacks it
    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.values[i])
    }

    /// Column/value pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Columns holding a non-zero value
    pub fn non_zero(&self) -> Vec<FeatureEntry> {
        self.iter()
            .filter(|(_, v)| *v != 0.0)
            .map(|(column, value)| FeatureEntry {
                column: column.to_string(),
                value,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureEntry {
    pub column: String,
    pub value: f64,
}
