//! Raw record normalization
//!
//! Reduces a provider's nested representation (lists of `{id, name}`
//! objects, credits, search-interest series) to the flat scalar fields the
//! feature aligner expects. The reduction rules here are shared by schema
//! construction and inference so both see identical categories.

mod hype;

pub use hype::{HypeSummary, HypeWindow, HYPE_WINDOW_DAYS};

use crate::error::Result;
use crate::models::RawMovieRecord;
use serde_json::Value;

/// Job title that identifies the director in a crew listing
pub const DIRECTOR_JOB: &str = "Director";

/// Number of leading cast members kept as `star1..starN`
pub const STAR_COUNT: usize = 3;

/// Read `key` from the first element of `items`
///
/// Returns `None` (the missing marker) for anything other than a non-empty
/// array whose first element is an object carrying a non-null `key`.
pub fn extract_primary(items: &Value, key: &str) -> Option<Value> {
    items
        .as_array()
        .and_then(|list| list.first())
        .and_then(Value::as_object)
        .and_then(|first| first.get(key))
        .filter(|v| !v.is_null())
        .cloned()
}

/// Name of the first crew member holding `job`
pub fn primary_crew_member(crew: &Value, job: &str) -> Option<String> {
    crew.as_array()?
        .iter()
        .find(|member| member.get("job").and_then(Value::as_str) == Some(job))
        .and_then(|member| member.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Names of the first `n` cast members in billing order
pub fn leading_cast(cast: &Value, n: usize) -> Vec<Option<String>> {
    let listed = cast.as_array().map(Vec::as_slice).unwrap_or(&[]);
    (0..n)
        .map(|i| {
            listed
                .get(i)
                .and_then(|member| member.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}

/// Flattens provider payloads into engine records
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Build a flat record from `raw`, leaving `raw` untouched
    ///
    /// Non-null fields already present are copied as-is, even when malformed,
    /// so the aligner can reject them. An explicit null counts as absent. Missing scalar fields are derived from their
    /// nested provider forms where those exist.
    pub fn normalize(&self, raw: &RawMovieRecord) -> Result<RawMovieRecord> {
        let mut record = raw.clone();

        self.derive_primary(&mut record, "main_genre", "genres");
        self.derive_primary(&mut record, "main_company", "production_companies");
        self.derive_credits(&mut record);
        self.derive_hype(&mut record);

        Ok(record)
    }

    fn derive_primary(&self, record: &mut RawMovieRecord, field: &str, source: &str) {
        if record.has(field) {
            return;
        }
        if let Some(value) = record.get(source).and_then(|items| extract_primary(items, "name")) {
            record.insert(field, value);
        }
    }

    fn derive_credits(&self, record: &mut RawMovieRecord) {
        let credits = match record.get("credits") {
            Some(credits) if credits.is_object() => credits.clone(),
            _ => return,
        };

        if !record.has("director") {
            if let Some(director) = primary_crew_member(&credits["crew"], DIRECTOR_JOB) {
                record.insert("director", director);
            }
        }

        for (i, star) in leading_cast(&credits["cast"], STAR_COUNT).into_iter().enumerate() {
            let field = format!("star{}", i + 1);
            if record.has(&field) {
                continue;
            }
            if let Some(name) = star {
                record.insert(field, name);
            }
        }
    }

    fn derive_hype(&self, record: &mut RawMovieRecord) {
        if record.has("peak_hype") && record.has("average_hype") {
            return;
        }
        let series: Vec<f64> = match record.get("interest_series").and_then(Value::as_array) {
            Some(points) => points.iter().filter_map(Value::as_f64).collect(),
            None => return,
        };

        let summary = HypeSummary::from_series(&series);
        if !record.has("peak_hype") {
            record.insert("peak_hype", summary.peak);
        }
        if !record.has("average_hype") {
            record.insert("average_hype", summary.average);
        }
    }
}
