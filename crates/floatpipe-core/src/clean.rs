// crates/floatpipe-core/src/clean.rs

use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// A profile without these columns is unusable for analysis; their absence
/// fails the whole file.
pub const REQUIRED_COLUMNS: [&str; 2] = ["TEMP", "PRES"];

/// Columns whose null rows are dropped when the column exists in this
/// particular dataset. Files differ in which sensors they carry, so the set
/// is intersected with what is actually present.
pub const ESSENTIAL_COLUMNS: [&str; 5] = ["TEMP", "PSAL", "LONGITUDE", "LATITUDE", "PRES"];

#[derive(Debug, Clone, Copy)]
pub enum Bound {
    Below(f64),
    StrictlyAbove(f64),
}

/// One column-conditional sanity check. Rows violating the bound are removed,
/// never clamped or zeroed.
#[derive(Debug, Clone, Copy)]
pub struct SanityRule {
    pub column: &'static str,
    pub bound: Bound,
}

impl SanityRule {
    fn predicate(&self) -> Expr {
        match self.bound {
            Bound::Below(limit) => col(self.column).lt(lit(limit)),
            Bound::StrictlyAbove(limit) => col(self.column).gt(lit(limit)),
        }
    }
}

/// Domain constants, not statistical estimates: temperatures at or above
/// 50 degC and non-positive salinities are sensor fill artifacts.
pub const SANITY_RULES: [SanityRule; 2] = [
    SanityRule {
        column: "TEMP",
        bound: Bound::Below(50.0),
    },
    SanityRule {
        column: "PSAL",
        bound: Bound::StrictlyAbove(0.0),
    },
];

#[derive(Debug)]
pub struct CleanReport {
    pub frame: DataFrame,
    pub rows_before: usize,
    pub rows_after: usize,
}

/// Drops unusable rows: first nulls among the essential-and-present columns,
/// then rows outside each present column's sanity bound. Row count is
/// monotonically non-increasing through each stage and no value is modified.
pub fn clean(df: DataFrame) -> Result<CleanReport> {
    let present: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::RequiredFieldsMissing(missing));
    }

    let rows_before = df.height();

    let essential: Vec<Expr> = ESSENTIAL_COLUMNS
        .iter()
        .filter(|name| present.iter().any(|p| p == *name))
        .map(|name| col(*name))
        .collect();

    let mut lazy = df.lazy().drop_nulls(Some(essential));

    for rule in SANITY_RULES
        .iter()
        .filter(|rule| present.iter().any(|p| p == rule.column))
    {
        lazy = lazy.filter(rule.predicate());
    }

    let frame = lazy.collect()?;
    let rows_after = frame.height();

    Ok(CleanReport {
        frame,
        rows_before,
        rows_after,
    })
}
