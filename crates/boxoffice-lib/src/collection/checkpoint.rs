//! JSON-lines checkpoint file for resumable collection

use crate::models::RawMovieRecord;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Field written into every collected record naming the query that produced it
pub const QUERY_FIELD: &str = "source_query";

/// Append-only store of collected records, one JSON object per line
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    processed: HashSet<String>,
}

impl CheckpointStore {
    /// Open (or create) a checkpoint, remembering every query already stored
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut processed = HashSet::new();

        if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open checkpoint {:?}", path))?;
            for (line_no, line) in BufReader::new(file).lines().enumerate() {
                let line = line.with_context(|| format!("Failed to read checkpoint {:?}", path))?;
                if line.trim().is_empty() {
                    continue;
                }
                match RawMovieRecord::from_json_str(&line) {
                    Ok(record) => {
                        if let Some(key) = record.get_str(QUERY_FIELD).or_else(|| record.get_str("title")) {
                            processed.insert(key.to_string());
                        }
                    }
                    Err(e) => warn!(line = line_no + 1, error = %e, "Skipping unreadable checkpoint line"),
                }
            }
            info!(path = ?path, processed = processed.len(), "Resuming from checkpoint");
        }

        Ok(Self { path, processed })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_processed(&self, query: &str) -> bool {
        self.processed.contains(query)
    }

    /// Number of distinct queries stored so far
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Append a batch of records and flush it to disk
    pub fn append(&mut self, records: &[RawMovieRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create checkpoint directory {:?}", parent))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open checkpoint {:?} for append", self.path))?;
        let mut writer = BufWriter::new(file);

        for record in records {
            serde_json::to_writer(&mut writer, record).context("Failed to serialize record")?;
            writer.write_all(b"\n")?;
        }
        writer.flush().context("Failed to flush checkpoint")?;

        for record in records {
            if let Some(key) = record.get_str(QUERY_FIELD).or_else(|| record.get_str("title")) {
                self.processed.insert(key.to_string());
            }
        }
        Ok(())
    }

    /// Read every record stored in a checkpoint file
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<RawMovieRecord>> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = RawMovieRecord::from_json_str(&line)
                .with_context(|| format!("{:?} line {}", path, line_no + 1))?;
            records.push(record);
        }
        Ok(records)
    }
}
