//! Pre-release search-interest enrichment for collected records

use super::RecordSource;
use crate::models::RawMovieRecord;
use crate::normalizer::{HypeSummary, HypeWindow};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Field holding the raw interest series attached to a record
pub const INTEREST_FIELD: &str = "interest_series";

/// Search-interest provider queried once per collected record
#[async_trait]
pub trait InterestSource: Send + Sync {
    /// Interest values for `term` inside `window`, oldest first; empty when unknown
    async fn interest(&self, term: &str, window: &HypeWindow) -> Result<Vec<f64>>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterestPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Interest series exported ahead of time, keyed by search term
///
/// File format is a JSON object mapping each term to `[{date, value}, ...]`.
#[derive(Debug, Default)]
pub struct InterestArchive {
    series: HashMap<String, Vec<InterestPoint>>,
}

impl InterestArchive {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read interest archive {:?}", path))?;
        let series = serde_json::from_str(&content)
            .with_context(|| format!("Invalid interest archive {:?}", path))?;
        Ok(Self { series })
    }

    pub fn from_series(series: HashMap<String, Vec<InterestPoint>>) -> Self {
        Self { series }
    }

    /// Number of terms with a series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[async_trait]
impl InterestSource for InterestArchive {
    async fn interest(&self, term: &str, window: &HypeWindow) -> Result<Vec<f64>> {
        let mut points: Vec<&InterestPoint> = self
            .series
            .get(term)
            .map(|points| points.iter().filter(|p| window.contains(p.date)).collect())
            .unwrap_or_default();
        points.sort_by_key(|p| p.date);
        Ok(points.into_iter().map(|p| p.value).collect())
    }
}

/// Record source that attaches `interest_series`, `peak_hype` and
/// `average_hype` to every record the inner source returns
///
/// Hype stays at zero when the record has no parseable `release_date` or the
/// interest lookup fails; neither fails the fetch.
pub struct WithHype<S, I> {
    records: S,
    interest: I,
}

impl<S, I> WithHype<S, I> {
    pub fn new(records: S, interest: I) -> Self {
        Self { records, interest }
    }
}

#[async_trait]
impl<S: RecordSource, I: InterestSource> RecordSource for WithHype<S, I> {
    async fn fetch(&self, title: &str) -> Result<Option<RawMovieRecord>> {
        let mut record = match self.records.fetch(title).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        let term = record.get_str("title").unwrap_or(title).to_string();
        let window = record.get_str("release_date").and_then(HypeWindow::from_release_date);
        let series = match window {
            Some(window) => match self.interest.interest(&term, &window).await {
                Ok(series) => series,
                Err(e) => {
                    warn!(
                        title = %term,
                        timeframe = %window.timeframe(),
                        error = %format!("{:#}", e),
                        "Interest lookup failed, hype left at zero"
                    );
                    Vec::new()
                }
            },
            None => {
                debug!(title = %term, "No usable release_date, hype left at zero");
                Vec::new()
            }
        };

        let summary = HypeSummary::from_series(&series);
        record.insert(INTEREST_FIELD, series);
        record.insert("peak_hype", summary.peak);
        record.insert("average_hype", summary.average);
        Ok(Some(record))
    }
}
