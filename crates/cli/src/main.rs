//! Box Office Predictor CLI
//!
//! Scores movie records against trained model artifacts, inspects feature
//! alignment, builds schemas and collects training records from TMDB.

mod commands;
mod output;
mod tmdb;

use boxoffice_lib::collection::{DEFAULT_BATCH_SIZE, DEFAULT_REQUEST_DELAY};
use clap::{ArgGroup, Parser, Subcommand};
use commands::predict::{ModelArgs, RecordInput};
use commands::{collect, features, predict, schema};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Box Office Predictor CLI
#[derive(Parser)]
#[command(name = "boxoffice")]
#[command(author, version, about = "CLI for the Box Office Predictor", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// TMDB API read access token
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true, global = true)]
    pub tmdb_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict box-office outcome for one movie
    #[command(group(ArgGroup::new("input").required(true).args(["record", "title"])))]
    Predict {
        /// JSON file holding one raw movie record
        #[arg(long)]
        record: Option<PathBuf>,

        /// Fetch the record from TMDB by title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Show the aligned feature vector for a record
    Features {
        /// JSON file holding one raw movie record
        #[arg(long)]
        record: PathBuf,

        /// Feature schema to align against
        #[arg(long)]
        schema: PathBuf,

        /// Include zero-valued columns
        #[arg(long)]
        all: bool,
    },

    /// Feature schema tools
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Collect raw records from TMDB into a resumable JSON-lines file
    Collect {
        /// File with one movie title per line
        #[arg(long)]
        titles: PathBuf,

        /// Output JSON-lines file; existing records are kept and skipped
        #[arg(long, short)]
        output: PathBuf,

        /// JSON search-interest archive; attaches hype from the 45 days before release
        #[arg(long)]
        hype: Option<PathBuf>,

        /// Pause between titles in milliseconds
        #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY.as_millis() as u64)]
        delay_ms: u64,

        /// Records written per checkpoint flush
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// List titles from TMDB's discover endpoint
    Discover {
        /// Sort order, e.g. popularity.desc or revenue.desc
        #[arg(long, default_value = "popularity.desc")]
        sort_by: String,

        /// Number of result pages to read
        #[arg(long, default_value_t = 5)]
        pages: u32,

        /// Write titles here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Build a feature schema from collected records
    Build {
        /// JSON-lines file of raw records
        #[arg(long)]
        input: PathBuf,

        /// Where to write the schema
        #[arg(long, short)]
        output: PathBuf,
    },
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let api_key = cli.tmdb_api_key.as_deref();

    match cli.command {
        Commands::Predict { record, title, model } => {
            let input = match (&record, &title) {
                (Some(path), _) => RecordInput::File(path),
                (None, Some(title)) => RecordInput::Title { title, api_key },
                (None, None) => anyhow::bail!("Pass --record or --title"),
            };
            predict::run(input, &model, cli.format).await?;
        }
        Commands::Features { record, schema, all } => {
            features::run(&record, &schema, all, cli.format)?;
        }
        Commands::Schema(SchemaCommands::Build { input, output }) => {
            schema::build(&input, &output, cli.format)?;
        }
        Commands::Collect {
            titles,
            output,
            hype,
            delay_ms,
            batch_size,
        } => {
            let args = collect::CollectArgs {
                titles: &titles,
                output: &output,
                hype: hype.as_deref(),
                delay_ms,
                batch_size,
            };
            collect::run(api_key, args, cli.format).await?;
        }
        Commands::Discover {
            sort_by,
            pages,
            output,
        } => {
            collect::discover(api_key, &sort_by, pages, output.as_deref()).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
