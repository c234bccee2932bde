//! `boxoffice predict`

use anyhow::{Context, Result};
use boxoffice_lib::collection::RecordSource;
use boxoffice_lib::{MoviePredictor, RawMovieRecord};
use clap::Args;
use std::path::{Path, PathBuf};

use super::read_record;
use crate::output::{print_info, print_prediction, print_warning, OutputFormat};
use crate::tmdb::TmdbClient;

/// Where the predictor's artifacts come from
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model manifest (schema plus one or more estimators)
    #[arg(long, env = "BOXOFFICE_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Single linear model file; takes precedence over --manifest
    #[arg(long, requires = "schema")]
    pub model: Option<PathBuf>,

    /// Feature schema for --model
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

impl ModelArgs {
    pub fn load(&self) -> Result<MoviePredictor> {
        match (&self.model, &self.schema, &self.manifest) {
            (Some(model), Some(schema), _) => MoviePredictor::load_single(model, schema)
                .with_context(|| format!("Failed to load model {:?}", model)),
            (None, _, Some(manifest)) => MoviePredictor::from_manifest(manifest)
                .with_context(|| format!("Failed to load manifest {:?}", manifest)),
            _ => anyhow::bail!("No model given: pass --manifest, or --model with --schema"),
        }
    }
}

/// Record to score, read from a file or fetched from TMDB
pub enum RecordInput<'a> {
    File(&'a Path),
    Title { title: &'a str, api_key: Option<&'a str> },
}

async fn resolve(input: RecordInput<'_>) -> Result<RawMovieRecord> {
    match input {
        RecordInput::File(path) => read_record(path),
        RecordInput::Title { title, api_key } => {
            let api_key = api_key.context("--title needs a TMDB API key (TMDB_API_KEY)")?;
            let client = TmdbClient::new(api_key)?;
            client
                .fetch(title)
                .await?
                .with_context(|| format!("No TMDB match for {:?}", title))
        }
    }
}

pub async fn run(input: RecordInput<'_>, model: &ModelArgs, format: OutputFormat) -> Result<()> {
    let predictor = model.load()?;
    let record = resolve(input).await?;

    let (result, alignment) = predictor.predict_detailed(&record)?;

    if let OutputFormat::Table = format {
        if let Some(title) = record.get_str("title") {
            print_info(&format!("Prediction for {}", title));
        }
        for column in &alignment.dropped {
            print_warning(&format!("Unseen category ignored: {}", column));
        }
    }

    print_prediction(&result, predictor.version(), format)
}
