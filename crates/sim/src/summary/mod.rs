//! Summary statistics: per-state segregating-site histograms.
//!
//! Each simulated block yields pairwise divergence counts for the fixed set
//! of sample pairs. Those counts are grouped by [`PairState`], subsampled to
//! the requested number of blocks and tallied into fixed-length histograms.

mod extract;
mod histogram;

pub use extract::{extract, BlockDivergence, SAMPLE_COUNT};
pub use histogram::{PairState, SegSiteHistogram, SegSiteHistograms};
