// crates/floatpipe-core/src/config.rs

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Csv,
    Parquet,
    Relational,
}

/// What to do about oceanographic fields the source file never carried when
/// writing relational rows. `Omit` stores NULL; `Impute` stores the fixed
/// climatological defaults the legacy loaders used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    #[default]
    Omit,
    Impute,
}

pub const DEFAULT_SALINITY_PSU: f64 = 35.0;
pub const DEFAULT_OXYGEN_UMOL_KG: f64 = 200.0;
pub const DEFAULT_CHLOROPHYLL_MG_M3: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub targets: Vec<ExportTarget>,
    pub missing_fields: MissingFieldPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("processed_data"),
            targets: vec![ExportTarget::Csv, ExportTarget::Parquet],
            missing_fields: MissingFieldPolicy::default(),
        }
    }
}

/// Resolves the relational store URL the same way the CLI does, falling back
/// to a local file next to the process.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("FLOATPIPE_DATABASE_URL"))
        .unwrap_or_else(|_| "sqlite://argo_data.db".to_string())
}
