// crates/floatpipe-core/src/pipeline.rs

use std::path::{Path, PathBuf};

use chrono::Utc;
use polars::prelude::{CsvWriter, DataFrame, NamedFrom, SerWriter, Series};
use serde::Serialize;
use tracing::{info, warn};

use crate::clean;
use crate::config::PipelineConfig;
use crate::db::DbPool;
use crate::error::Result;
use crate::export::{self, Artifact};
use crate::flatten;
use crate::project;
use crate::reader::ProfileDataset;

/// Outcome of one successfully processed file.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub input_file: String,
    pub rows_flattened: usize,
    pub rows_processed: usize,
    pub columns: Vec<String>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Processed,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProcessingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref())
    }

    pub fn processed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == FileStatus::Processed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.processed_count()
    }
}

/// Runs one file through ingest → flatten → clean → project → export.
pub async fn process_single_file(
    config: &PipelineConfig,
    pool: Option<&DbPool>,
    path: &Path,
) -> Result<ProcessingResult> {
    let flattened = {
        let dataset = ProfileDataset::open(path)?;
        flatten::flatten_dataset(&dataset)?
        // dataset handle dropped here, before any exports run
    };

    let report = clean::clean(flattened)?;
    let output = project::project(&report.frame);

    let artifacts = export::export(
        &output,
        &config.targets,
        &config.output_dir,
        path,
        pool,
        config.missing_fields,
    )
    .await?;

    info!(
        path = %path.display(),
        rows_flattened = report.rows_before,
        rows_processed = report.rows_after,
        "processed profile file"
    );

    Ok(ProcessingResult {
        input_file: path.display().to_string(),
        rows_flattened: report.rows_before,
        rows_processed: report.rows_after,
        columns: column_names(&output),
        artifacts,
    })
}

/// Processes every file in `dir` matching `pattern`, strictly sequentially.
/// Per-file failures are recorded as failed outcomes and never abort the
/// batch.
pub async fn process_directory(
    config: &PipelineConfig,
    pool: Option<&DbPool>,
    dir: &Path,
    pattern: &str,
) -> Result<BatchReport> {
    let glob_pattern = dir.join(pattern).to_string_lossy().into_owned();

    let mut paths: Vec<PathBuf> = glob::glob(&glob_pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        warn!(dir = %dir.display(), pattern, "no files matched");
        return Ok(BatchReport::default());
    }

    info!(count = paths.len(), "found profile files to process");

    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        match process_single_file(config, pool, &path).await {
            Ok(result) => outcomes.push(FileOutcome {
                path: path.display().to_string(),
                status: FileStatus::Processed,
                result: Some(result),
                error: None,
            }),
            Err(err) => {
                warn!(path = %path.display(), "skipping file: {err}");
                outcomes.push(FileOutcome {
                    path: path.display().to_string(),
                    status: FileStatus::Failed,
                    result: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok(BatchReport { outcomes })
}

/// Builds the cross-file summary: one row per successful outcome. Zero
/// successes yield an empty frame, not an error.
pub fn summarize(report: &BatchReport) -> Result<DataFrame> {
    let successes: Vec<&ProcessingResult> = report.successes().collect();
    if successes.is_empty() {
        return Ok(DataFrame::default());
    }

    let input_files: Vec<String> = successes
        .iter()
        .map(|r| {
            Path::new(&r.input_file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| r.input_file.clone())
        })
        .collect();
    let rows: Vec<i64> = successes.iter().map(|r| r.rows_processed as i64).collect();
    let column_counts: Vec<i64> = successes.iter().map(|r| r.columns.len() as i64).collect();
    let artifact_counts: Vec<i64> = successes.iter().map(|r| r.artifacts.len() as i64).collect();
    let column_lists: Vec<String> = successes.iter().map(|r| r.columns.join(", ")).collect();

    Ok(DataFrame::new(vec![
        Series::new("input_file".into(), input_files).into(),
        Series::new("rows_processed".into(), rows).into(),
        Series::new("columns_count".into(), column_counts).into(),
        Series::new("output_files_count".into(), artifact_counts).into(),
        Series::new("columns".into(), column_lists).into(),
    ])?)
}

/// Writes the batch summary CSV next to the other artifacts. Returns `None`
/// when the batch had no successes.
pub fn write_summary(report: &BatchReport, output_dir: &Path) -> Result<Option<PathBuf>> {
    let mut summary = summarize(report)?;
    if summary.height() == 0 {
        return Ok(None);
    }

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!(
        "processing_summary_{}.csv",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));
    let mut file = std::fs::File::create(&path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut summary)?;

    info!(path = %path.display(), "summary report saved");
    Ok(Some(path))
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}
