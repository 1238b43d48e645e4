//! The reference table and its `.npz` form.
//!
//! Three aligned arrays, one row per simulation:
//!
//! - `X` (`<u8`, `rows x 3*blocklen`): concatenated per-state histograms
//! - `y_model` (`<U{w}`, `rows`): topology labels
//! - `y_params` (`<f8`, `rows x width`): parameter vectors, NaN-padded on
//!   the right to the widest topology present

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use abiss_archive::{ArchiveError, ArrayData, NpyArray, NpzReader, NpzWriter};
use ndarray::Array2;
use tracing::info;

use crate::base::{ParameterSet, Topology};
use crate::errors::{AbissError, Result};
use crate::simulation::SimulationRecord;

pub const FEATURES_KEY: &str = "X";
pub const LABELS_KEY: &str = "y_model";
pub const PARAMETERS_KEY: &str = "y_params";

#[derive(Debug, Clone)]
pub struct ReferenceTable {
    features: Array2<u64>,
    labels: Vec<Topology>,
    parameters: Array2<f64>,
}

fn shape_error(e: ndarray::ShapeError) -> AbissError {
    AbissError::invalid_argument(format!("reference table shape: {e}"))
}

fn corrupt(message: impl Into<String>) -> AbissError {
    AbissError::Archive(ArchiveError::Corruption(message.into()))
}

/// Non-negative integer counts, stored either as `<u8` or as integral `<f8`.
pub(crate) fn integral_counts(array: NpyArray, name: &str) -> Result<Vec<u64>> {
    match array.into_data() {
        ArrayData::U64(values) => Ok(values),
        ArrayData::F64(values) => values
            .into_iter()
            .map(|v| {
                if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
                    Ok(v as u64)
                } else {
                    Err(corrupt(format!("{name} holds non-count value {v}")))
                }
            })
            .collect(),
        ArrayData::Unicode { .. } => Err(corrupt(format!("{name} holds strings, expected counts"))),
    }
}

impl ReferenceTable {
    /// Assemble records into aligned arrays, in record order.
    pub fn from_records(records: &[SimulationRecord]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Err(AbissError::invalid_argument("no simulation records"));
        };
        let blocklen = first.histograms.blocklen();
        if let Some(odd) = records.iter().find(|r| r.histograms.blocklen() != blocklen) {
            return Err(AbissError::invalid_argument(format!(
                "mixed blocklen in records: {} and {}",
                blocklen,
                odd.histograms.blocklen()
            )));
        }
        let width = records
            .iter()
            .map(|r| r.parameters.len())
            .max()
            .unwrap_or(0);

        let rows = records.len();
        let features: Vec<u64> = records.iter().flat_map(|r| r.features()).collect();
        let parameters: Vec<f64> = records
            .iter()
            .flat_map(|r| r.parameters.padded(width))
            .collect();

        Ok(Self {
            features: Array2::from_shape_vec((rows, 3 * blocklen), features)
                .map_err(shape_error)?,
            labels: records.iter().map(|r| r.topology).collect(),
            parameters: Array2::from_shape_vec((rows, width), parameters).map_err(shape_error)?,
        })
    }

    pub fn features(&self) -> &Array2<u64> {
        &self.features
    }

    pub fn labels(&self) -> &[Topology] {
        &self.labels
    }

    pub fn parameters(&self) -> &Array2<f64> {
        &self.parameters
    }

    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    pub fn blocklen(&self) -> usize {
        self.features.ncols() / 3
    }

    pub fn param_width(&self) -> usize {
        self.parameters.ncols()
    }

    /// Rows labelled `topology`.
    pub fn count(&self, topology: Topology) -> usize {
        self.labels.iter().filter(|&&t| t == topology).count()
    }

    /// Parameters of row `row` without padding.
    pub fn parameter_set(&self, row: usize) -> Result<ParameterSet> {
        let topology = *self
            .labels
            .get(row)
            .ok_or_else(|| AbissError::invalid_argument(format!("row {row} out of range")))?;
        let width = topology.fields().len();
        let values = self.parameters.row(row).iter().take(width).copied().collect();
        ParameterSet::new(topology, values)
    }

    /// The three arrays as written to the archive.
    pub fn to_arrays(&self) -> Result<[(&'static str, NpyArray); 3]> {
        let (rows, cols) = self.features.dim();
        let features = NpyArray::from_u64(vec![rows, cols], self.features.iter().copied().collect())?;
        let labels = NpyArray::from_strings(
            vec![rows],
            self.labels.iter().map(|t| t.name().to_string()).collect(),
        )?;
        let parameters = NpyArray::from_f64(
            vec![rows, self.param_width()],
            self.parameters.iter().copied().collect(),
        )?;
        Ok([
            (FEATURES_KEY, features),
            (LABELS_KEY, labels),
            (PARAMETERS_KEY, parameters),
        ])
    }

    /// Write to `path`, failing with [`AbissError::OutputConflict`] if it exists.
    ///
    /// The archive is written to a temporary file next to `path` and moved
    /// into place only when complete.
    pub fn write_npz(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            return Err(AbissError::OutputConflict {
                path: path.to_path_buf(),
            });
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".abiss-")
            .suffix(".npz.tmp")
            .tempfile_in(dir)?;
        {
            let mut writer = NpzWriter::new(BufWriter::new(tmp.as_file_mut()));
            for (name, array) in self.to_arrays()? {
                writer.add_array(name, &array)?;
            }
            writer.finish()?.flush()?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                AbissError::OutputConflict {
                    path: path.to_path_buf(),
                }
            } else {
                AbissError::Io(e.error)
            }
        })?;

        info!(
            path = %path.display(),
            rows = self.rows(),
            blocklen = self.blocklen(),
            "reference table written"
        );
        Ok(())
    }

    /// Load and validate a table written by [`ReferenceTable::write_npz`].
    ///
    /// `X` stored as integral floats is accepted too.
    pub fn read_npz(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = NpzReader::new(BufReader::new(file))?;

        let x = reader.by_name(FEATURES_KEY)?;
        let (rows, cols) = match *x.shape() {
            [rows, cols] if cols > 0 && cols % 3 == 0 => (rows, cols),
            ref shape => {
                return Err(corrupt(format!(
                    "{FEATURES_KEY} has shape {shape:?}, expected (rows, 3*blocklen)"
                )))
            }
        };
        let features = integral_counts(x, FEATURES_KEY)?;

        let y_model = reader.by_name(LABELS_KEY)?;
        if y_model.shape() != [rows] {
            return Err(corrupt(format!(
                "{LABELS_KEY} has shape {:?}, expected ({rows},)",
                y_model.shape()
            )));
        }
        let labels = y_model
            .as_strings()
            .ok_or_else(|| corrupt(format!("{LABELS_KEY} must hold strings")))?
            .iter()
            .map(|name| {
                name.parse::<Topology>()
                    .map_err(|_| corrupt(format!("unknown topology label '{name}'")))
            })
            .collect::<Result<Vec<_>>>()?;

        let y_params = reader.by_name(PARAMETERS_KEY)?;
        let width = match *y_params.shape() {
            [r, width] if r == rows => width,
            ref shape => {
                return Err(corrupt(format!(
                    "{PARAMETERS_KEY} has shape {shape:?}, expected ({rows}, width)"
                )))
            }
        };
        let parameters = match y_params.into_data() {
            ArrayData::F64(values) => values,
            other => {
                return Err(corrupt(format!(
                    "{PARAMETERS_KEY} has dtype {}, expected <f8",
                    other.dtype()
                )))
            }
        };

        Ok(Self {
            features: Array2::from_shape_vec((rows, cols), features).map_err(shape_error)?,
            labels,
            parameters: Array2::from_shape_vec((rows, width), parameters).map_err(shape_error)?,
        })
    }
}
