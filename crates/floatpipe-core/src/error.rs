// crates/floatpipe-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("could not read source file as NetCDF: {0}")]
    SourceFormat(#[from] netcdf::Error),

    #[error("required column(s) missing from dataset: {}", .0.join(", "))]
    RequiredFieldsMissing(Vec<String>),

    #[error("export to {target} failed: {source}")]
    Export {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("frame operation failed: {0}")]
    Frame(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Flatten(#[from] crate::flatten::FlattenError),

    #[error("database query failed: {0}")]
    Db(#[from] sqlx::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
