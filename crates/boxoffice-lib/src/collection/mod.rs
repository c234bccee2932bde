//! Resumable batch collection of raw movie records
//!
//! Walks a list of titles, fetches each from a [`RecordSource`] with a fixed
//! delay between requests and appends the results to a [`CheckpointStore`]
//! in batches, so an interrupted run picks up where it stopped.

mod checkpoint;
mod hype;

pub use checkpoint::{CheckpointStore, QUERY_FIELD};
pub use hype::{InterestArchive, InterestPoint, InterestSource, WithHype, INTEREST_FIELD};

use crate::models::RawMovieRecord;
use crate::observability::{EngineMetrics, StructuredLogger};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Default number of records buffered before a checkpoint write
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default pause between provider requests
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(250);

/// Produces raw records for titles, typically backed by a provider API
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// `Ok(None)` when the provider has no match for `title`
    async fn fetch(&self, title: &str) -> Result<Option<RawMovieRecord>>;
}

#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub batch_size: usize,
    pub request_delay: Duration,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub collected: usize,
    pub already_done: usize,
    pub not_found: usize,
    pub failed: usize,
}

pub struct BatchCollector<S> {
    source: S,
    store: CheckpointStore,
    config: CollectionConfig,
    metrics: EngineMetrics,
    logger: StructuredLogger,
}

impl<S: RecordSource> BatchCollector<S> {
    pub fn new(source: S, store: CheckpointStore, config: CollectionConfig) -> Self {
        Self {
            source,
            store,
            config,
            metrics: EngineMetrics::new(),
            logger: StructuredLogger::new("collector"),
        }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Collect every title not yet in the checkpoint
    ///
    /// Per-title fetch failures are logged and counted; only checkpoint I/O
    /// errors abort the run.
    pub async fn run<T: AsRef<str>>(&mut self, titles: &[T]) -> Result<CollectionSummary> {
        let mut summary = CollectionSummary::default();
        let mut seen = HashSet::new();
        let pending_titles: Vec<&str> = titles
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| seen.insert(*t))
            .filter(|t| {
                let done = self.store.is_processed(t);
                if done {
                    summary.already_done += 1;
                }
                !done
            })
            .collect();

        debug!(
            remaining = pending_titles.len(),
            already_done = summary.already_done,
            "Starting collection"
        );

        let batch_size = self.config.batch_size.max(1);
        let mut batch: Vec<RawMovieRecord> = Vec::with_capacity(batch_size);

        for (i, title) in pending_titles.iter().enumerate() {
            if i > 0 && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }

            match self.source.fetch(title).await {
                Ok(Some(mut record)) => {
                    record.insert(QUERY_FIELD, *title);
                    batch.push(record);
                    summary.collected += 1;
                    self.metrics.inc_records_collected();
                }
                Ok(None) => {
                    debug!(title = %title, "No provider match");
                    summary.not_found += 1;
                }
                Err(e) => {
                    self.logger.log_fetch_failed(title, &format!("{:#}", e));
                    self.metrics.inc_collection_failures();
                    summary.failed += 1;
                }
            }

            if batch.len() >= batch_size {
                self.flush(&mut batch, pending_titles.len() - i - 1, summary.failed)?;
            }
        }

        self.flush(&mut batch, 0, summary.failed)?;
        Ok(summary)
    }

    fn flush(&mut self, batch: &mut Vec<RawMovieRecord>, remaining: usize, failures: usize) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.store.append(batch)?;
        batch.clear();
        self.logger
            .log_collection_progress(self.store.len(), remaining, failures);
        Ok(())
    }
}
