// crates/floatpipe-core/src/flatten.rs

use chrono::{NaiveDate, TimeDelta};
use polars::prelude::{Column, DataFrame, NamedFrom, PolarsError, Series};
use thiserror::Error;

use crate::reader::{ProfileDataset, RawVariable};

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("variable {variable} uses undeclared dimension {dimension}")]
    UnknownDimension { variable: String, dimension: String },
    #[error("value length mismatch for {variable}: expected {expected}, found {found}")]
    LengthMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Converts a profile dataset into a flat frame with one row per combination
/// of dimension indices, broadcasting each variable over the dimensions it
/// does not carry. Dimension-indexed coordinates become ordinary columns; a
/// zero-length dimension yields an empty (valid) frame.
pub fn flatten_dataset(dataset: &ProfileDataset) -> Result<DataFrame, FlattenError> {
    let variables = dataset.numeric_variables();

    if variables.is_empty() {
        return Ok(DataFrame::default());
    }

    // Only dimensions actually used by a variable participate in the product.
    let participating: Vec<(String, usize)> = dataset
        .dimensions()
        .into_iter()
        .filter(|dim| variables.iter().any(|v| v.dims.contains(&dim.name)))
        .map(|dim| (dim.name, dim.len))
        .collect();

    let rows: usize = participating.iter().map(|(_, len)| *len).product();

    let has_time = variables.iter().any(|v| v.name == "TIME");
    let mut columns: Vec<Column> = Vec::with_capacity(variables.len());

    for var in &variables {
        let values = broadcast_values(var, &participating, rows)?;

        if var.name == "JULD" && !has_time {
            columns.push(julian_day_to_time(var, &values).into());
        } else {
            columns.push(Series::new(var.name.as_str().into(), values).into());
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Evaluates `var` at every row of the full dimension product, indexing the
/// variable by its own dimensions only.
fn broadcast_values(
    var: &RawVariable,
    participating: &[(String, usize)],
    rows: usize,
) -> Result<Vec<Option<f64>>, FlattenError> {
    let mut positions = Vec::with_capacity(var.dims.len());
    let mut own_lens = Vec::with_capacity(var.dims.len());
    for dim in &var.dims {
        let pos = participating
            .iter()
            .position(|(name, _)| name == dim)
            .ok_or_else(|| FlattenError::UnknownDimension {
                variable: var.name.clone(),
                dimension: dim.clone(),
            })?;
        positions.push(pos);
        own_lens.push(participating[pos].1);
    }

    let expected: usize = own_lens.iter().product();
    if var.values.len() != expected {
        return Err(FlattenError::LengthMismatch {
            variable: var.name.clone(),
            expected,
            found: var.values.len(),
        });
    }

    // Row-major strides over the variable's own dimensions.
    let mut strides = vec![1usize; own_lens.len()];
    for i in (0..own_lens.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * own_lens[i + 1];
    }

    let dim_lens: Vec<usize> = participating.iter().map(|(_, len)| *len).collect();
    let mut out = Vec::with_capacity(rows);
    let mut indices = vec![0usize; dim_lens.len()];

    for row in 0..rows {
        let mut remainder = row;
        for (i, len) in dim_lens.iter().enumerate().rev() {
            indices[i] = remainder % len;
            remainder /= len;
        }

        let own_index: usize = positions
            .iter()
            .zip(&strides)
            .map(|(&pos, &stride)| indices[pos] * stride)
            .sum();
        out.push(var.values.get(own_index).copied().flatten());
    }

    Ok(out)
}

/// Argo stores profile time as fractional days since a reference epoch
/// (`JULD`, "days since 1950-01-01"). Rendered here as a plain `TIME` text
/// column so downstream logic never depends on positional index alignment.
fn julian_day_to_time(var: &RawVariable, values: &[Option<f64>]) -> Series {
    let epoch = var
        .units
        .as_deref()
        .and_then(|units| units.strip_prefix("days since"))
        .map(str::trim)
        .and_then(|rest| NaiveDate::parse_from_str(rest.get(..10)?, "%Y-%m-%d").ok())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1950, 1, 1).expect("valid epoch"))
        .and_hms_opt(0, 0, 0)
        .expect("valid epoch midnight");

    let rendered: Vec<Option<String>> = values
        .iter()
        .map(|value| {
            value.and_then(|days| {
                let seconds = (days * 86_400.0).round() as i64;
                let stamp = epoch.checked_add_signed(TimeDelta::seconds(seconds))?;
                Some(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
            })
        })
        .collect();

    Series::new("TIME".into(), rendered)
}
