//! Boundary to the coalescent simulation engine.
//!
//! The engine (tree-sequence generation, mutation placement, divergence
//! computation) lives outside this crate. It is reached through the
//! [`CoalescentEngine`] trait; all randomness is passed in as explicit seeds
//! so an engine never has to hold global random state.

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::demography::Demography;
use crate::errors::{AbissError, Result};
use crate::simulation::SimulationConfig;
use crate::summary::{BlockDivergence, SAMPLE_COUNT};

/// Error type engines report; wrapped into [`AbissError::EngineFailure`].
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Pairwise divergence between samples, indexed by sample id.
pub type DivergenceMatrix = Array2<f64>;

/// Samples drawn from the two contemporary populations.
///
/// Sample ids are assigned in order: `pop1` first, then `pop2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleConfig {
    pub pop1: usize,
    pub pop2: usize,
    pub ploidy: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            pop1: 2,
            pop2: 2,
            ploidy: 1,
        }
    }
}

impl SampleConfig {
    /// Number of sample genomes.
    pub fn total(&self) -> usize {
        (self.pop1 + self.pop2) * self.ploidy
    }
}

/// Everything an engine needs to produce independent replicate blocks.
#[derive(Debug, Clone, Copy)]
pub struct AncestryRequest<'a> {
    pub demography: &'a Demography,
    pub samples: SampleConfig,
    pub recombination_rate: f64,
    /// Length of one block, in sites.
    pub sequence_length: f64,
    pub replicates: usize,
    pub seed: u64,
}

/// A coalescent simulator.
///
/// Engines are shared across worker threads, so they must be `Sync`.
/// Implementations that are not thread-safe internally should isolate
/// their state per call.
pub trait CoalescentEngine: Sync {
    /// One simulated genealogy (a tree sequence) of a single block.
    type Genealogy;
    /// Lazy, finite and not restartable.
    type Ancestry: Iterator<Item = EngineResult<Self::Genealogy>>;

    fn make_ancestry_generator(&self, request: &AncestryRequest<'_>) -> EngineResult<Self::Ancestry>;

    fn apply_mutations(
        &self,
        genealogy: Self::Genealogy,
        mutation_rate: f64,
        seed: u64,
    ) -> EngineResult<Self::Genealogy>;

    fn pairwise_divergence(
        &self,
        genealogy: &Self::Genealogy,
        span_normalise: bool,
    ) -> EngineResult<DivergenceMatrix>;
}

fn engine_failure(stage: &str, error: EngineError) -> AbissError {
    AbissError::engine(format!("{stage}: {error}"))
}

/// Simulate `max(num_blocks_per_state)` blocks under `demography`.
///
/// Seeds for the ancestry generator and for each block's mutations are drawn
/// from `rng`.
pub fn simulate_blocks<E, R>(
    engine: &E,
    demography: &Demography,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Vec<BlockDivergence>>
where
    E: CoalescentEngine + ?Sized,
    R: Rng + ?Sized,
{
    if config.samples.total() < SAMPLE_COUNT {
        return Err(AbissError::invalid_argument(format!(
            "need at least {SAMPLE_COUNT} sample genomes, configured {}",
            config.samples.total()
        )));
    }

    let replicates = config.replicates();
    let request = AncestryRequest {
        demography,
        samples: config.samples,
        recombination_rate: config.recombination_rate,
        sequence_length: config.blocklen as f64,
        replicates,
        seed: rng.random(),
    };

    let ancestry = engine
        .make_ancestry_generator(&request)
        .map_err(|e| engine_failure("ancestry", e))?;

    let mut blocks = Vec::with_capacity(replicates);
    for genealogy in ancestry.take(replicates) {
        let genealogy = genealogy.map_err(|e| engine_failure("ancestry", e))?;
        let mutated = engine
            .apply_mutations(genealogy, config.mutation_rate, rng.random())
            .map_err(|e| engine_failure("mutations", e))?;
        let divergence = engine
            .pairwise_divergence(&mutated, false)
            .map_err(|e| engine_failure("divergence", e))?;
        blocks.push(BlockDivergence::from_matrix(&divergence)?);
    }
    Ok(blocks)
}
