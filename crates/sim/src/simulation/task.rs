use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::base::{ParameterSet, Topology};
use crate::demography;
use crate::errors::{AbissError, Result};
use crate::priors::PriorSet;
use crate::simulation::{simulate_blocks, CoalescentEngine, SimulationConfig};
use crate::summary::{extract, SegSiteHistograms};

/// One row of the reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRecord {
    pub topology: Topology,
    pub parameters: ParameterSet,
    pub histograms: SegSiteHistograms,
}

impl SimulationRecord {
    /// Feature row: the three histograms concatenated.
    pub fn features(&self) -> Vec<u64> {
        self.histograms.concat()
    }
}

/// A single simulation: sample, build, simulate, summarise.
///
/// Tasks own their RNG seed and share nothing else, so they can run in any
/// order on any thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTask {
    pub topology: Topology,
    /// Position within the topology's batch.
    pub index: usize,
    pub seed: u64,
}

impl SimulationTask {
    pub fn new(topology: Topology, index: usize, seed: u64) -> Self {
        Self {
            topology,
            index,
            seed,
        }
    }

    /// Run the task; any failure is reported as [`AbissError::TaskFailed`].
    pub fn run<E>(
        &self,
        engine: &E,
        priors: &PriorSet,
        config: &SimulationConfig,
    ) -> Result<SimulationRecord>
    where
        E: CoalescentEngine + ?Sized,
    {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let spec = self.topology.spec();

        let ne = priors.ne.sample(spec.ne_count, &mut rng);
        let tau = priors.tau.sample(spec.tau_count, &mut rng);
        let m = priors.migration.sample(spec.m_count, &mut rng);

        let (demography, parameters) = demography::build(self.topology, &ne, &tau, &m)
            .map_err(|e| self.failed(format!("Ne={ne:?}, tau={tau:?}, M={m:?}"), e))?;

        debug!(
            topology = %self.topology,
            index = self.index,
            %parameters,
            "simulating"
        );

        let histograms = self
            .summarise(engine, &demography, config, &mut rng)
            .map_err(|e| self.failed(parameters.to_string(), e))?;

        Ok(SimulationRecord {
            topology: self.topology,
            parameters,
            histograms,
        })
    }

    fn summarise<E>(
        &self,
        engine: &E,
        demography: &demography::Demography,
        config: &SimulationConfig,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<SegSiteHistograms>
    where
        E: CoalescentEngine + ?Sized,
    {
        let blocks = simulate_blocks(engine, demography, config, rng)?;
        extract(&blocks, &config.num_blocks_per_state, config.blocklen, rng)
    }

    fn failed(&self, parameters: String, source: AbissError) -> AbissError {
        AbissError::TaskFailed {
            topology: self.topology,
            index: self.index,
            parameters,
            source: Box::new(source),
        }
    }
}
