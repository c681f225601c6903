// crates/floatpipe-core/src/project.rs

use polars::prelude::DataFrame;

/// Fixed ordered allow-list of exportable columns. The projection keeps the
/// intersection with whatever this dataset actually carries, in this order.
pub const ALLOWED_COLUMNS: [&str; 8] = [
    "LATITUDE",
    "LONGITUDE",
    "TIME",
    "PRES",
    "TEMP",
    "PSAL",
    "DOXY",
    "CHLA",
];

/// Projects onto the allow-list. Never fails: columns absent from the frame
/// are simply omitted, and an empty intersection yields an empty frame.
pub fn project(df: &DataFrame) -> DataFrame {
    let keep: Vec<&str> = ALLOWED_COLUMNS
        .iter()
        .copied()
        .filter(|name| df.column(name).is_ok())
        .collect();

    if keep.is_empty() {
        return DataFrame::default();
    }

    df.select(keep).unwrap_or_else(|_| DataFrame::default())
}
