//! `boxoffice features`: show the aligned vector for a record

use anyhow::{Context, Result};
use boxoffice_lib::{FeatureAligner, FeatureEntry, FeatureSchema, RecordNormalizer};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

use super::read_record;
use crate::output::{color_value, print_info, print_rows, print_warning, OutputFormat};

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Serialize)]
struct FeatureReport<'a> {
    columns: Vec<&'a str>,
    values: &'a [f64],
    active: Vec<FeatureEntry>,
    dropped: &'a [String],
}

pub fn run(record_path: &Path, schema_path: &Path, all: bool, format: OutputFormat) -> Result<()> {
    let schema = Arc::new(
        FeatureSchema::load(schema_path).with_context(|| format!("Failed to load schema {:?}", schema_path))?,
    );
    let raw = read_record(record_path)?;
    let record = RecordNormalizer::new().normalize(&raw)?;
    let alignment = FeatureAligner::default().align_detailed(&record, &schema)?;
    let vector = &alignment.vector;

    match format {
        OutputFormat::Json => {
            let report = FeatureReport {
                columns: schema.columns().iter().map(String::as_str).collect(),
                values: vector.values(),
                active: vector.non_zero(),
                dropped: &alignment.dropped,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            let rows: Vec<FeatureRow> = vector
                .iter()
                .enumerate()
                .filter(|(_, (_, value))| all || *value != 0.0)
                .map(|(position, (column, value))| FeatureRow {
                    position,
                    column: column.to_string(),
                    value: color_value(value),
                })
                .collect();
            let shown = rows.len();
            print_rows(rows, &(), format)?;

            print_info(&format!("{} of {} columns shown", shown, vector.len()));
            for column in &alignment.dropped {
                print_warning(&format!("Not in schema, dropped: {}", column));
            }
        }
    }

    Ok(())
}
