//! `boxoffice collect` and `boxoffice discover`

use anyhow::{Context, Result};
use boxoffice_lib::collection::{
    BatchCollector, CheckpointStore, CollectionConfig, CollectionSummary, InterestArchive,
    RecordSource, WithHype,
};
use std::path::Path;
use std::time::Duration;
use tabled::Tabled;

use super::read_titles;
use crate::output::{print_info, print_rows, print_success, print_warning, OutputFormat};
use crate::tmdb::TmdbClient;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Titles")]
    count: usize,
}

fn summary_rows(summary: &CollectionSummary) -> Vec<SummaryRow> {
    vec![
        SummaryRow { outcome: "collected", count: summary.collected },
        SummaryRow { outcome: "already collected", count: summary.already_done },
        SummaryRow { outcome: "not found", count: summary.not_found },
        SummaryRow { outcome: "failed", count: summary.failed },
    ]
}

/// Fetch every title into the checkpoint file at `output`
pub async fn collect<S: RecordSource>(
    source: S,
    titles_path: &Path,
    output: &Path,
    config: CollectionConfig,
    format: OutputFormat,
) -> Result<CollectionSummary> {
    let titles = read_titles(titles_path)?;
    if titles.is_empty() {
        anyhow::bail!("No titles in {:?}", titles_path);
    }

    let store = CheckpointStore::open(output)?;
    if let OutputFormat::Table = format {
        if !store.is_empty() {
            print_info(&format!("Resuming: {} titles already in {}", store.len(), output.display()));
        }
    }

    let mut collector = BatchCollector::new(source, store, config);
    let summary = collector.run(&titles).await?;

    match format {
        OutputFormat::Table => {
            print_rows(summary_rows(&summary), &(), format)?;
            if summary.failed > 0 {
                print_warning(&format!("{} titles failed; rerun to retry them", summary.failed));
            }
            print_success(&format!(
                "{} records in {}",
                collector.store().len(),
                output.display()
            ));
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "collected": summary.collected,
                "already_done": summary.already_done,
                "not_found": summary.not_found,
                "failed": summary.failed,
                "output": output,
            }))?
        ),
    }

    Ok(summary)
}

/// Options for `boxoffice collect`
pub struct CollectArgs<'a> {
    pub titles: &'a Path,
    pub output: &'a Path,
    pub hype: Option<&'a Path>,
    pub delay_ms: u64,
    pub batch_size: usize,
}

pub async fn run(api_key: Option<&str>, args: CollectArgs<'_>, format: OutputFormat) -> Result<()> {
    let api_key = api_key.context("collect needs a TMDB API key (TMDB_API_KEY)")?;
    let config = CollectionConfig {
        batch_size: args.batch_size,
        request_delay: Duration::from_millis(args.delay_ms),
    };
    let client = TmdbClient::new(api_key)?;

    match args.hype {
        Some(path) => {
            let archive = InterestArchive::load(path)?;
            if archive.is_empty() {
                print_warning(&format!("No interest series in {}; hype will be zero", path.display()));
            } else if let OutputFormat::Table = format {
                print_info(&format!("Interest series for {} titles", archive.len()));
            }
            collect(WithHype::new(client, archive), args.titles, args.output, config, format).await?;
        }
        None => {
            collect(client, args.titles, args.output, config, format).await?;
        }
    }
    Ok(())
}

/// Write titles from the TMDB discover listing, one per line
pub async fn discover(
    api_key: Option<&str>,
    sort_by: &str,
    pages: u32,
    output: Option<&Path>,
) -> Result<()> {
    let api_key = api_key.context("discover needs a TMDB API key (TMDB_API_KEY)")?;
    let titles = TmdbClient::new(api_key)?.discover_titles(sort_by, pages).await?;

    let mut content = titles.join("\n");
    content.push('\n');
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
            print_success(&format!("Wrote {} titles to {}", titles.len(), path.display()));
        }
        None => print!("{}", content),
    }
    Ok(())
}
