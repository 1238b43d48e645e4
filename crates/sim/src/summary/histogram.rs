use core::fmt;

use serde::Serialize;

/// Class of a sample pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    WithinPop1 = 0,
    WithinPop2 = 1,
    Between = 2,
}

impl PairState {
    /// States in feature-column order.
    pub const ALL: [PairState; 3] = [Self::WithinPop1, Self::WithinPop2, Self::Between];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::WithinPop1 => "within-pop1",
            Self::WithinPop2 => "within-pop2",
            Self::Between => "between-pop",
        }
    }
}

impl fmt::Display for PairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of blocks with exactly `k` segregating sites, for `k < blocklen`.
///
/// Counts at or above `blocklen` land in the last bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegSiteHistogram {
    bins: Vec<u64>,
}

impl SegSiteHistogram {
    /// An empty histogram with `blocklen` bins, or `None` if `blocklen` is 0.
    pub fn new(blocklen: usize) -> Option<Self> {
        (blocklen > 0).then(|| Self {
            bins: vec![0; blocklen],
        })
    }

    /// Tally one block. Returns `true` if the count had to be clamped.
    #[inline]
    pub fn record(&mut self, sites: u64) -> bool {
        let last = self.bins.len() - 1;
        let (bin, clamped) = match usize::try_from(sites) {
            Ok(k) if k <= last => (k, false),
            _ => (last, true),
        };
        self.bins[bin] += 1;
        clamped
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn blocklen(&self) -> usize {
        self.bins.len()
    }

    /// Number of blocks tallied.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }
}

/// The three per-state histograms of one simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegSiteHistograms {
    states: [SegSiteHistogram; 3],
}

impl SegSiteHistograms {
    /// Assemble from histograms in [`PairState::ALL`] order.
    ///
    /// Returns `None` if the histograms differ in length.
    pub fn new(states: [SegSiteHistogram; 3]) -> Option<Self> {
        let blocklen = states[0].blocklen();
        states
            .iter()
            .all(|h| h.blocklen() == blocklen)
            .then_some(Self { states })
    }

    pub fn get(&self, state: PairState) -> &SegSiteHistogram {
        &self.states[state.index()]
    }

    pub fn blocklen(&self) -> usize {
        self.states[0].blocklen()
    }

    /// Feature row: the three histograms back to back (`3 * blocklen` values).
    pub fn concat(&self) -> Vec<u64> {
        let mut row = Vec::with_capacity(3 * self.blocklen());
        for histogram in &self.states {
            row.extend_from_slice(histogram.bins());
        }
        row
    }
}
