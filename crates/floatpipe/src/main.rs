// crates/floatpipe/src/main.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use floatpipe_core::config::{self, ExportTarget, MissingFieldPolicy, PipelineConfig};
use floatpipe_core::db::{self, DbPool};
use floatpipe_core::pipeline;
use floatpipe_core::query;

/// CLI for the Argo float profile pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a single NetCDF profile file
    Process {
        file: PathBuf,
        #[command(flatten)]
        options: ProcessOptions,
    },
    /// Process every matching file in a directory
    Batch {
        dir: PathBuf,
        /// File pattern to match within the directory
        #[arg(long, default_value = "*.nc")]
        pattern: String,
        #[command(flatten)]
        options: ProcessOptions,
    },
    /// Ask a free-text question over the persisted profiles
    Ask { text: String },
    /// Create the profile table and indexes if absent
    InitDb,
}

#[derive(Args, Debug)]
struct ProcessOptions {
    /// Directory to write CSV/Parquet artifacts into
    #[arg(long, default_value = "processed_data")]
    output_dir: PathBuf,

    /// File formats to export
    #[arg(long, value_enum, default_value_t = ExportFormat::Both)]
    format: ExportFormat,

    /// Also replace this source's rows in the relational store
    #[arg(long)]
    store: bool,

    /// Store fixed defaults for oceanographic fields the file never carried,
    /// instead of NULL
    #[arg(long)]
    impute_missing: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
    Csv,
    Parquet,
    Both,
}

impl ProcessOptions {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut targets = match self.format {
            ExportFormat::Csv => vec![ExportTarget::Csv],
            ExportFormat::Parquet => vec![ExportTarget::Parquet],
            ExportFormat::Both => vec![ExportTarget::Csv, ExportTarget::Parquet],
        };
        if self.store {
            targets.push(ExportTarget::Relational);
        }

        PipelineConfig {
            output_dir: self.output_dir.clone(),
            targets,
            missing_fields: if self.impute_missing {
                MissingFieldPolicy::Impute
            } else {
                MissingFieldPolicy::Omit
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Process { file, options } => {
            let config = options.pipeline_config();
            let pool = maybe_connect(options.store).await?;
            let result = pipeline::process_single_file(&config, pool.as_ref(), &file).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Batch {
            dir,
            pattern,
            options,
        } => {
            let config = options.pipeline_config();
            let pool = maybe_connect(options.store).await?;
            let report =
                pipeline::process_directory(&config, pool.as_ref(), &dir, &pattern).await?;

            match pipeline::write_summary(&report, &config.output_dir)? {
                Some(path) => info!(path = %path.display(), "batch summary written"),
                None => warn!("no files processed successfully; no summary written"),
            }

            println!(
                "processed: {}, failed: {}",
                report.processed_count(),
                report.failed_count()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Ask { text } => {
            let pool = connect_pool().await?;
            let response = query::ask(&pool, &text).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::InitDb => {
            let pool = connect_pool().await?;
            db::init_schema(&pool).await?;
            info!("profile schema initialized");
            Ok(())
        }
    }
}

async fn maybe_connect(store: bool) -> Result<Option<DbPool>> {
    if store {
        Ok(Some(connect_pool().await?))
    } else {
        Ok(None)
    }
}

async fn connect_pool() -> Result<DbPool> {
    dotenvy::dotenv().ok();
    let database_url = config::database_url();
    Ok(db::connect(&database_url).await?)
}
