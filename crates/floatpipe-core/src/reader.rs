// crates/floatpipe-core/src/reader.rs

use std::path::Path;

use netcdf::AttributeValue;
use tracing::debug;

use crate::error::Result;

/// Sentinel used by Argo files that omit an explicit `_FillValue` attribute.
pub const DEFAULT_FILL_VALUE: f64 = 99999.0;

#[derive(Debug, Clone)]
pub struct DimensionInfo {
    pub name: String,
    pub len: usize,
}

/// A numeric variable pulled out of the source file, with fill values and
/// NaNs already masked to nulls.
#[derive(Debug, Clone)]
pub struct RawVariable {
    pub name: String,
    pub dims: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub units: Option<String>,
}

/// Scoped handle over one NetCDF profile file. The underlying file stays
/// mapped until the handle is dropped, so callers should drop it as soon as
/// flattening is done.
pub struct ProfileDataset {
    file: netcdf::File,
    path: String,
}

impl ProfileDataset {
    /// Opens `path` as a NetCDF dataset, failing with a source-format error
    /// when the file cannot be parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path)?;
        Ok(Self {
            file,
            path: path.display().to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared dimensions in file order.
    pub fn dimensions(&self) -> Vec<DimensionInfo> {
        self.file
            .dimensions()
            .map(|dim| DimensionInfo {
                name: dim.name(),
                len: dim.len(),
            })
            .collect()
    }

    /// Reads every numeric variable and coordinate into memory. Character
    /// and compound variables (station identifiers, QC strings) are skipped:
    /// the tabular pipeline only carries measurements.
    pub fn numeric_variables(&self) -> Vec<RawVariable> {
        let mut variables = Vec::new();

        for var in self.file.variables() {
            let name = var.name();
            let raw = match var.get_values::<f64, _>(..) {
                Ok(values) => values,
                Err(err) => {
                    debug!(variable = %name, "skipping non-numeric variable: {err}");
                    continue;
                }
            };

            let fill = fill_value(&var).unwrap_or(DEFAULT_FILL_VALUE);
            let values = raw
                .into_iter()
                .map(|v| {
                    if v.is_nan() || v == fill {
                        None
                    } else {
                        Some(v)
                    }
                })
                .collect();

            variables.push(RawVariable {
                name,
                dims: var.dimensions().iter().map(|d| d.name()).collect(),
                values,
                units: units(&var),
            });
        }

        variables
    }
}

fn fill_value(var: &netcdf::Variable<'_>) -> Option<f64> {
    let attr = var.attribute("_FillValue")?;
    match attr.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Doubles(vs) => vs.first().copied(),
        AttributeValue::Floats(vs) => vs.first().copied().map(f64::from),
        AttributeValue::Int(v) => Some(f64::from(v)),
        _ => None,
    }
}

fn units(var: &netcdf::Variable<'_>) -> Option<String> {
    let attr = var.attribute("units")?;
    match attr.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
