//! # ABISS simulation crate
//!
//! The `abiss-sim` crate builds reference tables for simulation-based
//! demographic inference. It samples parameters from priors, turns them into
//! explicit demographic histories for six two-population topologies, runs an
//! external coalescent engine per parameter draw, reduces the output to
//! segregating-site histograms and assembles the labelled table.

pub mod base;
pub mod demography;
pub mod errors;
pub mod prelude;
pub mod priors;
pub mod simulation;
pub mod storage;
pub mod summary;

pub use base::{ParameterSet, Topology};
pub use errors::{AbissError, Result};
