use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use abiss_archive::NpzReader;

use crate::errors::{AbissError, Result};
use crate::storage::table::integral_counts;
use crate::summary::PairState;

/// Array name the observed-data pipeline writes the summary under.
pub const DEFAULT_OBSERVED_KEY: &str = "S";

/// Summary vector of the observed data, laid out like one row of `X`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedSummary {
    values: Vec<u64>,
}

impl ObservedSummary {
    pub fn from_values(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// Read array `key` from an `.npz`; it must be 1-D or a single row.
    pub fn load(path: impl AsRef<Path>, key: &str) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = NpzReader::new(BufReader::new(file))?;
        let array = reader.by_name(key)?;
        match *array.shape() {
            [_] | [1, _] => {}
            ref shape => {
                return Err(AbissError::invalid_argument(format!(
                    "observed summary '{key}' has shape {shape:?}, expected a single row"
                )))
            }
        }
        Ok(Self {
            values: integral_counts(array, key)?,
        })
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check the vector has the `3 * blocklen` columns of the reference table.
    pub fn check_layout(&self, blocklen: usize) -> Result<()> {
        if blocklen == 0 || self.values.len() != 3 * blocklen {
            return Err(AbissError::invalid_argument(format!(
                "observed summary has {} columns, reference table expects {} (3 x blocklen {blocklen})",
                self.values.len(),
                3 * blocklen
            )));
        }
        Ok(())
    }

    /// Blocks observed per state.
    pub fn state_totals(&self, blocklen: usize) -> Result<[u64; 3]> {
        self.check_layout(blocklen)?;
        let mut totals = [0; 3];
        for (state, chunk) in PairState::ALL.iter().zip(self.values.chunks(blocklen)) {
            totals[state.index()] = chunk.iter().sum();
        }
        Ok(totals)
    }
}
