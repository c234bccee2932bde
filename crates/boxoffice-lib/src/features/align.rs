//! Feature alignment against a training schema
//!
//! Encodes a flat record into the sparse set of columns it exhibits, then
//! reconciles that set against the schema: schema columns are emitted in
//! schema order, columns the schema has never seen are dropped and columns the
//! record does not exhibit are zero-filled.

use super::encoding::{categorical_level, numeric_value, one_hot_column};
use super::{FeatureSchema, FeatureVector};
use crate::error::Result;
use crate::models::{RawMovieRecord, CATEGORICAL_FIELDS, NUMERIC_FIELDS};
use std::sync::Arc;
use tracing::debug;

/// Outcome of aligning one record
#[derive(Debug, Clone)]
pub struct Alignment {
    pub vector: FeatureVector,
    /// Non-zero columns the record produced that have no place in the schema
    pub dropped: Vec<String>,
}

/// Aligns records to a schema for a fixed set of numeric and categorical fields
#[derive(Debug, Clone)]
pub struct FeatureAligner {
    numeric_fields: Vec<String>,
    categorical_fields: Vec<String>,
}

impl Default for FeatureAligner {
    fn default() -> Self {
        Self::new(NUMERIC_FIELDS, CATEGORICAL_FIELDS)
    }
}

impl FeatureAligner {
    pub fn new<S: AsRef<str>>(numeric_fields: &[S], categorical_fields: &[S]) -> Self {
        Self {
            numeric_fields: numeric_fields.iter().map(|f| f.as_ref().to_string()).collect(),
            categorical_fields: categorical_fields
                .iter()
                .map(|f| f.as_ref().to_string())
                .collect(),
        }
    }

    /// Sparse `(column, value)` encoding of a record, before reconciliation
    pub fn encode(&self, record: &RawMovieRecord) -> Result<Vec<(String, f64)>> {
        let mut encoded = Vec::with_capacity(self.numeric_fields.len() + self.categorical_fields.len());

        for field in &self.numeric_fields {
            encoded.push((field.clone(), numeric_value(field, record.get(field))?));
        }

        for field in &self.categorical_fields {
            let Some(value) = record.get(field) else {
                continue;
            };
            if let Some(level) = categorical_level(field, value)? {
                encoded.push((one_hot_column(field, &level), 1.0));
            }
        }

        Ok(encoded)
    }

    /// Align a record to `schema`
    pub fn align(&self, record: &RawMovieRecord, schema: &Arc<FeatureSchema>) -> Result<FeatureVector> {
        self.align_detailed(record, schema).map(|alignment| alignment.vector)
    }

    /// Align a record and report which produced columns were dropped
    pub fn align_detailed(
        &self,
        record: &RawMovieRecord,
        schema: &Arc<FeatureSchema>,
    ) -> Result<Alignment> {
        let encoded = self.encode(record)?;

        let mut values = vec![0.0; schema.len()];
        let mut dropped = Vec::new();
        for (column, value) in encoded {
            match schema.position(&column) {
                Some(i) => values[i] = value,
                None if value != 0.0 => dropped.push(column),
                None => {}
            }
        }

        if !dropped.is_empty() {
            debug!(dropped = ?dropped, "Dropping feature columns absent from schema");
        }

        Ok(Alignment {
            vector: FeatureVector::new(Arc::clone(schema), values),
            dropped,
        })
    }
}

/// Align `record` against `schema` for the given field lists
pub fn align(
    record: &RawMovieRecord,
    schema: &Arc<FeatureSchema>,
    categorical_fields: &[&str],
    numeric_fields: &[&str],
) -> Result<FeatureVector> {
    FeatureAligner::new(numeric_fields, categorical_fields).align(record, schema)
}
