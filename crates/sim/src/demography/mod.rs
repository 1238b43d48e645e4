//! Demographic histories handed to the coalescent engine.
//!
//! [`build`] is the only place where a topology and its sampled values are
//! turned into populations, split events and a migration table. The layout
//! rules come from the topology catalog in [`crate::base`].

mod builder;
mod model;

pub use builder::build;
pub use model::{Demography, MigrationRate, Population, PopulationId, SplitEvent};
