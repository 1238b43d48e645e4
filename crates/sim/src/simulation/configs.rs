//! Run configuration.
//!
//! A [`RunConfig`] fully describes a reference-table build and can be saved
//! to and loaded from JSON to reproduce one.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::base::Topology;
use crate::errors::{AbissError, Result};
use crate::priors::{Prior, PriorConfig, PriorSet};
use crate::simulation::SampleConfig;

/// The master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub priors: PriorsConfig,
    pub simulation: SimulationConfig,
    /// Topologies to simulate, in output order.
    #[serde(default = "default_topologies")]
    pub topologies: Vec<Topology>,
    #[serde(default = "default_num_sims")]
    pub num_sims_per_topology: usize,
    /// Worker threads; `None` uses every logical CPU.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Optional RNG seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Priors for population sizes, split times and migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorsConfig {
    #[serde(default = "default_ne_prior")]
    pub ne: PriorConfig,
    #[serde(default = "default_tau_prior")]
    pub tau: PriorConfig,
    #[serde(default = "default_migration_prior")]
    pub migration: PriorConfig,
}

/// Per-block simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Per-site, per-generation mutation rate
    pub mutation_rate: f64,
    /// Per-site, per-generation recombination rate
    pub recombination_rate: f64,
    /// Block length in sites; also the histogram length
    pub blocklen: usize,
    /// Blocks per state: `[within pop1, within pop2, between]`
    #[serde(default = "default_num_blocks")]
    pub num_blocks_per_state: [usize; 3],
    #[serde(default)]
    pub samples: SampleConfig,
}

fn default_topologies() -> Vec<Topology> {
    Topology::ALL.to_vec()
}

fn default_num_sims() -> usize {
    50_000
}

fn default_num_blocks() -> [usize; 3] {
    [1000, 1000, 3000]
}

fn default_ne_prior() -> PriorConfig {
    PriorConfig::uniform(0.0, 1e7)
}

fn default_tau_prior() -> PriorConfig {
    PriorConfig::uniform(0.0, 100.0)
}

fn default_migration_prior() -> PriorConfig {
    PriorConfig::uniform(0.0, 40.0)
}

impl Default for PriorsConfig {
    fn default() -> Self {
        Self {
            ne: default_ne_prior(),
            tau: default_tau_prior(),
            migration: default_migration_prior(),
        }
    }
}

impl PriorsConfig {
    /// Parse and validate all three priors.
    pub fn build(&self) -> Result<PriorSet> {
        let named = |name: &str, config: &PriorConfig| {
            Prior::from_config(config).map_err(|e| match e {
                AbissError::InvalidArgument(msg) => {
                    AbissError::invalid_argument(format!("{name} prior: {msg}"))
                }
                other => other,
            })
        };
        Ok(PriorSet {
            ne: named("Ne", &self.ne)?,
            tau: named("tau", &self.tau)?,
            migration: named("M", &self.migration)?,
        })
    }
}

impl SimulationConfig {
    pub fn new(mutation_rate: f64, recombination_rate: f64, blocklen: usize) -> Self {
        Self {
            mutation_rate,
            recombination_rate,
            blocklen,
            num_blocks_per_state: default_num_blocks(),
            samples: SampleConfig::default(),
        }
    }

    pub fn with_num_blocks(mut self, num_blocks_per_state: [usize; 3]) -> Self {
        self.num_blocks_per_state = num_blocks_per_state;
        self
    }

    /// Blocks to ask the engine for: enough for the most demanding state.
    pub fn replicates(&self) -> usize {
        self.num_blocks_per_state.iter().copied().max().unwrap_or(0)
    }

    /// Width of one feature row.
    pub fn feature_width(&self) -> usize {
        3 * self.blocklen
    }
}

impl RunConfig {
    pub fn new(simulation: SimulationConfig) -> Self {
        Self {
            priors: PriorsConfig::default(),
            simulation,
            topologies: default_topologies(),
            num_sims_per_topology: default_num_sims(),
            threads: None,
            seed: None,
        }
    }

    pub fn with_priors(mut self, priors: PriorsConfig) -> Self {
        self.priors = priors;
        self
    }

    pub fn with_topologies(mut self, topologies: Vec<Topology>) -> Self {
        self.topologies = topologies;
        self
    }

    pub fn with_num_sims(mut self, num_sims_per_topology: usize) -> Self {
        self.num_sims_per_topology = num_sims_per_topology;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), text)?;
        Ok(())
    }

    /// Check everything that can be checked before any simulation runs.
    pub fn validate(&self) -> Result<()> {
        self.priors.build()?;

        let sim = &self.simulation;
        if sim.blocklen == 0 {
            return Err(AbissError::invalid_argument("blocklen must be at least 1"));
        }
        for (name, rate) in [
            ("mutation_rate", sim.mutation_rate),
            ("recombination_rate", sim.recombination_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(AbissError::invalid_argument(format!(
                    "{name} must be finite and >= 0, got {rate}"
                )));
            }
        }
        if sim.samples != SampleConfig::default() {
            return Err(AbissError::invalid_argument(format!(
                "samples must be 2 haploid genomes per population, got {:?}",
                sim.samples
            )));
        }

        if self.topologies.is_empty() {
            return Err(AbissError::invalid_argument("no topologies selected"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.topologies.iter().find(|t| !seen.insert(**t)) {
            return Err(AbissError::invalid_argument(format!(
                "topology {dup} listed more than once"
            )));
        }
        if self.num_sims_per_topology == 0 {
            return Err(AbissError::invalid_argument(
                "num_sims_per_topology must be at least 1",
            ));
        }
        if self.threads == Some(0) {
            return Err(AbissError::invalid_argument("threads must be at least 1"));
        }
        Ok(())
    }
}
