// crates/floatpipe-core/src/export.rs

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::info;

use crate::config::{ExportTarget, MissingFieldPolicy};
use crate::db::{self, DbPool};
use crate::error::{PipelineError, Result};

/// One durable output produced for a processed file.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub location: String,
    pub rows: usize,
    pub columns: usize,
}

/// Writes each requested target for the given output rows. Any write failure
/// fails the call; artifacts already written by earlier targets in the same
/// call are not rolled back.
pub async fn export(
    df: &DataFrame,
    targets: &[ExportTarget],
    output_dir: &Path,
    source: &Path,
    pool: Option<&DbPool>,
    policy: MissingFieldPolicy,
) -> Result<Vec<Artifact>> {
    std::fs::create_dir_all(output_dir)?;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let base = format!("argo_{}_{}", stem, Utc::now().format("%Y%m%d_%H%M%S"));

    let mut artifacts = Vec::with_capacity(targets.len());

    for target in targets {
        let artifact = match target {
            ExportTarget::Csv => {
                let path = output_dir.join(format!("{base}.csv"));
                write_csv(df, &path).map_err(|err| export_error("csv", err))?;
                info!(path = %path.display(), "exported CSV");
                Artifact {
                    location: path.display().to_string(),
                    rows: df.height(),
                    columns: df.width(),
                }
            }
            ExportTarget::Parquet => {
                let path = output_dir.join(format!("{base}.parquet"));
                write_parquet(df, &path).map_err(|err| export_error("parquet", err))?;
                info!(path = %path.display(), "exported Parquet");
                Artifact {
                    location: path.display().to_string(),
                    rows: df.height(),
                    columns: df.width(),
                }
            }
            ExportTarget::Relational => {
                let pool = pool.ok_or_else(|| {
                    export_error("relational", anyhow::anyhow!("no database pool configured"))
                })?;
                let source_file = source
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown")
                    .to_string();
                let float_id = derive_float_id(source);

                db::init_schema(pool)
                    .await
                    .map_err(|err| export_error("relational", err.into()))?;
                let rows = db::replace_profiles(pool, df, &float_id, &source_file, policy)
                    .await
                    .map_err(|err| export_error("relational", err.into()))?;
                info!(table = db::PROFILE_TABLE, rows, "replaced relational rows");
                Artifact {
                    location: format!("sqlite://{}", db::PROFILE_TABLE),
                    rows: rows as usize,
                    columns: df.width(),
                }
            }
        };
        artifacts.push(artifact);
    }

    Ok(artifacts)
}

/// Derives the float identifier from an Argo filename: the first digit run in
/// the stem, e.g. `R13857_001.nc` becomes `FLOAT_13857`.
pub fn derive_float_id(source: &Path) -> String {
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("");

    let digits: String = stem
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        "FLOAT_UNKNOWN".to_string()
    } else {
        format!("FLOAT_{digits}")
    }
}

fn write_csv(df: &DataFrame, path: &Path) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    let mut clone = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut clone)?;
    Ok(())
}

fn write_parquet(df: &DataFrame, path: &Path) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    let mut clone = df.clone();
    ParquetWriter::new(&mut file)
        .with_compression(ParquetCompression::Zstd(None))
        .with_statistics(StatisticsOptions::default())
        .finish(&mut clone)?;
    Ok(())
}

fn export_error(target: &str, source: anyhow::Error) -> PipelineError {
    PipelineError::Export {
        target: target.to_string(),
        source,
    }
}
