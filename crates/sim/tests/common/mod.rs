//! Deterministic stand-in for a coalescent engine.

use abiss_sim::demography::Demography;
use abiss_sim::simulation::{AncestryRequest, CoalescentEngine, DivergenceMatrix, EngineResult};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

#[derive(Debug, Clone, Copy)]
pub struct FakeGenealogy {
    seed: u64,
    /// Root split in generations; deeper splits give more between-pop sites.
    split_time: f64,
    mutation_seed: Option<u64>,
}

/// Produces random but seed-determined divergence matrices.
#[derive(Debug, Default)]
pub struct FakeEngine {
    /// Produce at most this many genealogies, whatever was requested.
    pub max_replicates: Option<usize>,
    /// Fail every divergence computation.
    pub broken: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn short(max_replicates: usize) -> Self {
        Self {
            max_replicates: Some(max_replicates),
            ..Self::default()
        }
    }
}

fn split_time(demography: &Demography) -> f64 {
    demography.split_time().unwrap_or(0.0)
}

impl CoalescentEngine for FakeEngine {
    type Genealogy = FakeGenealogy;
    type Ancestry = std::vec::IntoIter<EngineResult<FakeGenealogy>>;

    fn make_ancestry_generator(&self, request: &AncestryRequest<'_>) -> EngineResult<Self::Ancestry> {
        let n = self
            .max_replicates
            .map_or(request.replicates, |max| max.min(request.replicates));
        let split_time = split_time(request.demography);
        let genealogies: Vec<_> = (0..n as u64)
            .map(|i| {
                Ok(FakeGenealogy {
                    seed: request.seed.wrapping_add(i),
                    split_time,
                    mutation_seed: None,
                })
            })
            .collect();
        Ok(genealogies.into_iter())
    }

    fn apply_mutations(
        &self,
        genealogy: FakeGenealogy,
        _mutation_rate: f64,
        seed: u64,
    ) -> EngineResult<FakeGenealogy> {
        Ok(FakeGenealogy {
            mutation_seed: Some(seed),
            ..genealogy
        })
    }

    fn pairwise_divergence(
        &self,
        genealogy: &FakeGenealogy,
        span_normalise: bool,
    ) -> EngineResult<DivergenceMatrix> {
        if self.broken {
            return Err("tree sequence has no mutations table".into());
        }
        if span_normalise {
            return Err("expected raw site counts".into());
        }
        let seed = genealogy.seed ^ genealogy.mutation_seed.ok_or("genealogy not mutated")?;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let depth = (genealogy.split_time / 1e5).min(30.0);

        let mut matrix = DivergenceMatrix::zeros((4, 4));
        for i in 0..4 {
            for j in (i + 1)..4 {
                let same_population = (i < 2) == (j < 2);
                let base = if same_population { 0.0 } else { depth };
                let value = (base + rng.random_range(0.0..10.0)).floor();
                matrix[[i, j]] = value;
                matrix[[j, i]] = value;
            }
        }
        Ok(matrix)
    }
}
