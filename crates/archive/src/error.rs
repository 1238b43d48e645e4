use thiserror::Error;

/// Error type for archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip container error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Malformed array header: {0}")]
    Header(String),
    #[error("Unsupported dtype: {0}")]
    UnsupportedDtype(String),
    #[error("Array '{0}' not found in archive")]
    MissingArray(String),
    #[error("Shape {shape:?} does not describe {len} elements")]
    ShapeMismatch { shape: Vec<usize>, len: usize },
    #[error("Data corruption detected: {0}")]
    Corruption(String),
}
