//! Training-time schema construction
//!
//! Builds the column list from a set of training records using the same
//! normalizer, level rendering and column naming as inference, so a schema
//! produced here is exactly what [`FeatureAligner`](super::FeatureAligner)
//! reconciles against later.

use super::encoding::{categorical_level, one_hot_column};
use super::FeatureSchema;
use crate::error::{EngineError, Result};
use crate::models::{RawMovieRecord, CATEGORICAL_FIELDS, NUMERIC_FIELDS};
use crate::normalizer::RecordNormalizer;
use std::collections::BTreeSet;
use tracing::info;

/// Collects observed category levels and emits a schema
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    numeric_fields: Vec<String>,
    categorical_fields: Vec<String>,
    levels: Vec<BTreeSet<String>>,
    normalizer: RecordNormalizer,
    records_seen: usize,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new(NUMERIC_FIELDS, CATEGORICAL_FIELDS)
    }
}

impl SchemaBuilder {
    pub fn new<S: AsRef<str>>(numeric_fields: &[S], categorical_fields: &[S]) -> Self {
        Self {
            numeric_fields: numeric_fields.iter().map(|f| f.as_ref().to_string()).collect(),
            categorical_fields: categorical_fields
                .iter()
                .map(|f| f.as_ref().to_string())
                .collect(),
            levels: vec![BTreeSet::new(); categorical_fields.len()],
            normalizer: RecordNormalizer::new(),
            records_seen: 0,
        }
    }

    /// Record the category levels present in one training record
    pub fn observe(&mut self, record: &RawMovieRecord) -> Result<()> {
        let record = self.normalizer.normalize(record)?;
        for (field, levels) in self.categorical_fields.iter().zip(self.levels.iter_mut()) {
            if let Some(value) = record.get(field) {
                if let Some(level) = categorical_level(field, value)? {
                    levels.insert(level);
                }
            }
        }
        self.records_seen += 1;
        Ok(())
    }

    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Numeric columns first, then each categorical field's levels in sorted order
    pub fn build(&self) -> Result<FeatureSchema> {
        let mut columns = self.numeric_fields.clone();
        for (field, levels) in self.categorical_fields.iter().zip(&self.levels) {
            columns.extend(levels.iter().map(|level| one_hot_column(field, level)));
        }

        info!(
            event = "schema_built",
            records = self.records_seen,
            columns = columns.len(),
            "Built feature schema"
        );

        FeatureSchema::new(columns).map_err(|reason| EngineError::model_load("<schema builder>", reason))
    }

    /// Observe every record, then build
    pub fn build_from<'a, I>(mut self, records: I) -> Result<FeatureSchema>
    where
        I: IntoIterator<Item = &'a RawMovieRecord>,
    {
        for record in records {
            self.observe(record)?;
        }
        self.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureAligner;
    use serde_json::json;
    use std::sync::Arc;

    fn training_records() -> Vec<RawMovieRecord> {
        vec![
            RawMovieRecord::from_value(json!({
                "budget": 100, "runtime": 90,
                "genres": [{"name": "Drama"}, {"name": "Action"}],
                "original_language": "en",
                "director": "B"
            }))
            .unwrap(),
            RawMovieRecord::from_value(json!({
                "budget": 200, "runtime": 120,
                "main_genre": "Action",
                "original_language": "fr",
                "director": "A"
            }))
            .unwrap(),
        ]
    }

    #[test]
    fn test_builds_sorted_levels_after_numeric_columns() {
        let builder = SchemaBuilder::new(&["budget", "runtime"], &["main_genre", "director"]);
        let schema = builder.build_from(&training_records()).unwrap();
        assert_eq!(
            schema.columns(),
            [
                "budget",
                "runtime",
                "main_genre_Action",
                "main_genre_Drama",
                "director_A",
                "director_B"
            ]
        );
    }

    #[test]
    fn test_builder_and_aligner_agree() {
        let records = training_records();
        let schema = Arc::new(SchemaBuilder::default().build_from(&records).unwrap());
        let aligner = FeatureAligner::default();
        let normalizer = RecordNormalizer::new();

        for record in &records {
            let normalized = normalizer.normalize(record).unwrap();
            let alignment = aligner.align_detailed(&normalized, &schema).unwrap();
            assert!(alignment.dropped.is_empty());
        }

        let first = aligner
            .align(&normalizer.normalize(&records[0]).unwrap(), &schema)
            .unwrap();
        assert_eq!(first.get("main_genre_Drama"), Some(1.0));
        assert_eq!(first.get("main_genre_Action"), Some(0.0));
        assert_eq!(first.get("original_language_en"), Some(1.0));
    }

    #[test]
    fn test_rejects_malformed_training_record() {
        let bad = RawMovieRecord::from_value(json!({"director": {"name": "X"}})).unwrap();
        let mut builder = SchemaBuilder::default();
        assert!(builder.observe(&bad).is_err());
        assert_eq!(builder.records_seen(), 0);
    }
}
