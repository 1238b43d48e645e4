//! Parallel reference-table construction.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use tracing::info;

use crate::errors::{AbissError, Result};
use crate::priors::PriorSet;
use crate::simulation::{CoalescentEngine, RunConfig, SimulationRecord, SimulationTask};
use crate::storage::ReferenceTable;

/// Runs every simulation of a [`RunConfig`] and assembles the table.
///
/// Topologies are processed one after another in configured order; the
/// simulations of a topology run in parallel on a dedicated pool. The first
/// failing task aborts the build.
pub struct ReferenceTableBuilder<'e, E: CoalescentEngine + ?Sized> {
    engine: &'e E,
    config: RunConfig,
    priors: PriorSet,
}

impl<'e, E: CoalescentEngine + ?Sized> ReferenceTableBuilder<'e, E> {
    /// Validate `config` and prepare a build.
    pub fn new(engine: &'e E, config: RunConfig) -> Result<Self> {
        config.validate()?;
        let priors = config.priors.build()?;
        Ok(Self {
            engine,
            config,
            priors,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run all simulations.
    pub fn build(&self) -> Result<ReferenceTable> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .build()
            .map_err(|e| AbissError::invalid_argument(format!("thread pool: {e}")))?;

        let mut rng = match self.config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };

        let n = self.config.num_sims_per_topology;
        let mut records: Vec<SimulationRecord> =
            Vec::with_capacity(n * self.config.topologies.len());

        for &topology in &self.config.topologies {
            // Seeds are drawn up front so results do not depend on scheduling
            let seeds: Vec<u64> = (0..n).map(|_| rng.random()).collect();
            info!(
                %topology,
                simulations = n,
                threads = pool.current_num_threads(),
                "simulating topology"
            );

            let batch = pool.install(|| {
                seeds
                    .par_iter()
                    .enumerate()
                    .map(|(index, &seed)| {
                        SimulationTask::new(topology, index, seed).run(
                            self.engine,
                            &self.priors,
                            &self.config.simulation,
                        )
                    })
                    .collect::<Result<Vec<_>>>()
            })?;
            records.extend(batch);
        }

        info!(rows = records.len(), "reference table complete");
        ReferenceTable::from_records(&records)
    }

    /// Build and persist to `path`.
    ///
    /// An existing `path` is reported before any simulation runs.
    pub fn build_and_save(&self, path: impl AsRef<Path>) -> Result<ReferenceTable> {
        let path = path.as_ref();
        if path.exists() {
            return Err(AbissError::OutputConflict {
                path: path.to_path_buf(),
            });
        }
        let table = self.build()?;
        table.write_npz(path)?;
        Ok(table)
    }
}
