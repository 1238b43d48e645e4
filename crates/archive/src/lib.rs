//! Named-array archives.
//!
//! Reads and writes the NumPy `.npz` container: a zip file whose members are
//! `.npy` arrays. Only the element types a reference table needs are
//! supported (little-endian `u64`, `f64` and fixed-width unicode strings),
//! which keeps the files loadable with a plain `numpy.load`.

mod error;
mod npy;
mod npz;

pub use error::ArchiveError;
pub use npy::{ArrayData, NpyArray};
pub use npz::{NpzReader, NpzWriter};

/// Result alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
