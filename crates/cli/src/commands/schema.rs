//! `boxoffice schema build`: derive a feature schema from collected records

use anyhow::{Context, Result};
use boxoffice_lib::collection::CheckpointStore;
use boxoffice_lib::SchemaBuilder;
use serde_json::json;
use std::path::Path;

use crate::output::{print_success, OutputFormat};

pub fn build(input: &Path, output: &Path, format: OutputFormat) -> Result<()> {
    let records = CheckpointStore::read_all(input)?;
    if records.is_empty() {
        anyhow::bail!("No records in {:?}", input);
    }

    let schema = SchemaBuilder::default()
        .build_from(&records)
        .with_context(|| format!("Failed to build schema from {:?}", input))?;
    schema.save(output)?;

    match format {
        OutputFormat::Table => print_success(&format!(
            "Wrote {} columns from {} records to {}",
            schema.len(),
            records.len(),
            output.display()
        )),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "records": records.len(),
                "columns": schema.len(),
                "output": output,
            }))?
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_lib::FeatureSchema;
    use tempfile::TempDir;

    #[test]
    fn test_build_writes_loadable_schema() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("records.jsonl");
        let output = dir.path().join("schema").join("columns.json");
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        std::fs::write(
            &input,
            concat!(
                r#"{"title": "Heat", "budget": 60000000, "genres": [{"name": "Crime"}], "original_language": "en"}"#,
                "\n",
                r#"{"title": "Ran", "budget": 11000000, "genres": [{"name": "Drama"}], "original_language": "ja"}"#,
                "\n"
            ),
        )
        .unwrap();

        build(&input, &output, OutputFormat::Json).unwrap();

        let schema = FeatureSchema::load(&output).unwrap();
        assert_eq!(schema.columns()[0], "budget");
        assert!(schema.contains("main_genre_Crime"));
        assert!(schema.contains("original_language_ja"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("records.jsonl");
        std::fs::write(&input, "\n").unwrap();
        assert!(build(&input, &dir.path().join("out.json"), OutputFormat::Json).is_err());
    }
}
