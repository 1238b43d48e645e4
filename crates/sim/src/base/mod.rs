//! Base types shared by every stage of the pipeline.
//!
//! This module provides the topology catalog (the single source of truth for
//! arity and migration layout) and the canonical parameter vector.

mod parameters;
mod topology;

pub use parameters::{is_absent, ParameterSet, ABSENT};
pub use topology::{Epoch, Field, MigrationEpochs, Topology, TopologySpec, MAX_FIELDS};
