use ndarray::Array2;
use rand::seq::index;
use rand::Rng;
use tracing::warn;

use crate::errors::{AbissError, Result};
use crate::summary::{PairState, SegSiteHistogram, SegSiteHistograms};

/// Sample ids per pair state: two samples from pop1 (0, 1), two from pop2 (2, 3).
const PAIRS: [&[(usize, usize)]; 3] = [
    &[(0, 1)],
    &[(2, 3)],
    &[(0, 2), (0, 3), (1, 2), (1, 3)],
];

/// Number of sample ids the pair map reads.
pub const SAMPLE_COUNT: usize = 4;

/// Segregating-site counts of one simulated block, grouped by pair state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDivergence {
    counts: [Vec<u64>; 3],
}

impl BlockDivergence {
    /// Read a pairwise divergence matrix (not span-normalised).
    ///
    /// Values must be finite and non-negative; they are rounded to whole
    /// site counts.
    pub fn from_matrix(matrix: &Array2<f64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows < SAMPLE_COUNT || cols < SAMPLE_COUNT {
            return Err(AbissError::engine(format!(
                "divergence matrix is {rows}x{cols}, need at least {SAMPLE_COUNT}x{SAMPLE_COUNT}"
            )));
        }

        let read = |i: usize, j: usize| -> Result<u64> {
            let value = matrix[[i, j]];
            if !value.is_finite() || value < 0.0 {
                return Err(AbissError::engine(format!(
                    "divergence between samples {i} and {j} is {value}"
                )));
            }
            Ok(value.round() as u64)
        };

        let mut counts: [Vec<u64>; 3] = Default::default();
        for (slot, pairs) in counts.iter_mut().zip(PAIRS) {
            *slot = pairs
                .iter()
                .map(|&(i, j)| read(i, j))
                .collect::<Result<_>>()?;
        }
        Ok(Self { counts })
    }

    /// Build from counts directly, in [`PairState::ALL`] order.
    pub fn from_counts(within_pop1: Vec<u64>, within_pop2: Vec<u64>, between: Vec<u64>) -> Self {
        Self {
            counts: [within_pop1, within_pop2, between],
        }
    }

    pub fn counts(&self, state: PairState) -> &[u64] {
        &self.counts[state.index()]
    }
}

/// Reduce simulated blocks to the three per-state histograms.
///
/// For each state, `num_blocks_per_state[state]` raw counts are drawn
/// without replacement from all blocks' counts of that state and tallied
/// into `blocklen` bins.
pub fn extract<R: Rng + ?Sized>(
    blocks: &[BlockDivergence],
    num_blocks_per_state: &[usize; 3],
    blocklen: usize,
    rng: &mut R,
) -> Result<SegSiteHistograms> {
    let empty = SegSiteHistogram::new(blocklen)
        .ok_or_else(|| AbissError::invalid_argument("blocklen must be at least 1"))?;
    let mut histograms: [SegSiteHistogram; 3] = core::array::from_fn(|_| empty.clone());
    for state in PairState::ALL {
        let raw: Vec<u64> = blocks
            .iter()
            .flat_map(|block| block.counts(state).iter().copied())
            .collect();
        let requested = num_blocks_per_state[state.index()];
        if raw.len() < requested {
            return Err(AbissError::InsufficientData {
                state,
                available: raw.len(),
                requested,
            });
        }

        let histogram = &mut histograms[state.index()];
        let mut clamped = 0usize;
        for i in index::sample(rng, raw.len(), requested).iter() {
            if histogram.record(raw[i]) {
                clamped += 1;
            }
        }
        if clamped > 0 {
            warn!(
                %state,
                clamped,
                blocklen,
                "segregating-site counts at or above blocklen clamped into last bin"
            );
        }
    }

    SegSiteHistograms::new(histograms)
        .ok_or_else(|| AbissError::invalid_argument("histogram lengths differ"))
}
