//! Persisted artifacts: the reference table and the observed summary.

pub mod observed;
pub mod table;

pub use observed::{ObservedSummary, DEFAULT_OBSERVED_KEY};
pub use table::{ReferenceTable, FEATURES_KEY, LABELS_KEY, PARAMETERS_KEY};
