//! Shared default values for run configuration.
//! These mirror the defaults `RunConfig` fills in when a field is omitted.

pub const OUTPUT_CONFIG: &str = "run.json";
pub const OBSERVED_KEY: &str = "S";

pub const NUM_SIMS_PER_TOPOLOGY: usize = 50_000;
pub const NUM_BLOCKS: [usize; 3] = [1000, 1000, 3000];

// Priors
pub const NE_PRIOR: &str = "uniform";
pub const NE_PRIOR_PARAMS: [f64; 2] = [0.0, 1e7];
pub const TAU_PRIOR: &str = "uniform";
pub const TAU_PRIOR_PARAMS: [f64; 2] = [0.0, 100.0];
pub const M_PRIOR: &str = "uniform";
pub const M_PRIOR_PARAMS: [f64; 2] = [0.0, 40.0];
