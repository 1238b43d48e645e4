//! Error types shared by every stage of a reference-table build.

use crate::base::Topology;
use crate::summary::PairState;
use abiss_archive::ArchiveError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ABISS operations.
#[derive(Debug, Error)]
pub enum AbissError {
    /// Unknown topology or distribution, arity mismatch, or an invalid value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A state needs more blocks than the engine produced.
    #[error(
        "Insufficient data for {state}: requested {requested} blocks but only {available} were simulated"
    )]
    InsufficientData {
        state: PairState,
        available: usize,
        requested: usize,
    },

    /// The simulation engine raised or returned unusable output.
    #[error("Simulation engine failure: {0}")]
    EngineFailure(String),

    /// The destination archive already exists.
    #[error("Output already exists: {}", path.display())]
    OutputConflict { path: PathBuf },

    /// A single simulation task failed; the whole build is aborted.
    #[error("Simulation {index} of topology {topology} failed (parameters: {parameters}): {source}")]
    TaskFailed {
        topology: Topology,
        index: usize,
        parameters: String,
        #[source]
        source: Box<AbissError>,
    },

    /// Malformed run configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for ABISS operations.
pub type Result<T> = std::result::Result<T, AbissError>;

impl AbissError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::EngineFailure(message.into())
    }

    /// The innermost error, looking through `TaskFailed` wrappers.
    pub fn root_cause(&self) -> &AbissError {
        match self {
            Self::TaskFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for AbissError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {e}"))
    }
}
