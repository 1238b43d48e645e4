//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use abiss_sim::prelude::*;
//!
//! let topology: Topology = "gim".parse().unwrap();
//! assert_eq!(topology.fields().len(), 11);
//! ```

pub use crate::base::{Field, ParameterSet, Topology};
pub use crate::demography::Demography;
pub use crate::errors::{AbissError, Result};
pub use crate::priors::{Prior, PriorConfig, PriorKind};
pub use crate::simulation::{
    CoalescentEngine, ReferenceTableBuilder, RunConfig, SimulationConfig, SimulationRecord,
};
pub use crate::storage::{ObservedSummary, ReferenceTable};
pub use crate::summary::{PairState, SegSiteHistograms};
