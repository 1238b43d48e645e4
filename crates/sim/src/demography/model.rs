use core::fmt;

use serde::Serialize;

/// Populations a demography can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationId {
    Pop1,
    Pop2,
    Pop1Anc,
    Pop2Anc,
    Ancestral,
}

impl PopulationId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pop1 => "pop1",
            Self::Pop2 => "pop2",
            Self::Pop1Anc => "pop1_anc",
            Self::Pop2Anc => "pop2_anc",
            Self::Ancestral => "ancestral",
        }
    }
}

impl fmt::Display for PopulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Population {
    pub id: PopulationId,
    /// Effective size, in individuals.
    pub initial_size: f64,
}

/// Backwards in time, the `derived` lineages merge into `ancestral` at `time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitEvent {
    /// Generations before present.
    pub time: f64,
    pub derived: Vec<PopulationId>,
    pub ancestral: PopulationId,
}

/// Per-generation migration probability for an ordered pair.
///
/// Backwards in time: the fraction of `dest` lineages whose parent lives in
/// `source`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MigrationRate {
    pub source: PopulationId,
    pub dest: PopulationId,
    pub rate: f64,
}

/// An explicit demographic history in engine units.
///
/// Owned by the caller and never derived from engine internals. Events are
/// kept sorted by time (oldest last); events at equal times keep their
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demography {
    populations: Vec<Population>,
    events: Vec<SplitEvent>,
    migration: Vec<MigrationRate>,
}

impl Demography {
    pub(crate) fn new(
        populations: Vec<Population>,
        mut events: Vec<SplitEvent>,
        migration: Vec<MigrationRate>,
    ) -> Self {
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            populations,
            events,
            migration,
        }
    }

    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    pub fn population(&self, id: PopulationId) -> Option<&Population> {
        self.populations.iter().find(|p| p.id == id)
    }

    pub fn events(&self) -> &[SplitEvent] {
        &self.events
    }

    /// Populated entries of the migration table.
    pub fn migration_rates(&self) -> &[MigrationRate] {
        &self.migration
    }

    /// Rate for `(source, dest)`, or `None` if migration is not defined there.
    pub fn migration_rate(&self, source: PopulationId, dest: PopulationId) -> Option<f64> {
        self.migration
            .iter()
            .find(|m| m.source == source && m.dest == dest)
            .map(|m| m.rate)
    }

    /// Time of the root split into the `ancestral` population.
    pub fn split_time(&self) -> Option<f64> {
        self.events
            .iter()
            .find(|e| e.ancestral == PopulationId::Ancestral)
            .map(|e| e.time)
    }

    /// Time of the epoch change, for two-epoch histories.
    pub fn epoch_change_time(&self) -> Option<f64> {
        self.events
            .iter()
            .find(|e| e.ancestral != PopulationId::Ancestral)
            .map(|e| e.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_sorted_stably() {
        let demography = Demography::new(
            vec![],
            vec![
                SplitEvent {
                    time: 10.0,
                    derived: vec![PopulationId::Pop1Anc, PopulationId::Pop2Anc],
                    ancestral: PopulationId::Ancestral,
                },
                SplitEvent {
                    time: 5.0,
                    derived: vec![PopulationId::Pop1],
                    ancestral: PopulationId::Pop1Anc,
                },
                SplitEvent {
                    time: 5.0,
                    derived: vec![PopulationId::Pop2],
                    ancestral: PopulationId::Pop2Anc,
                },
            ],
            vec![],
        );

        let order: Vec<_> = demography.events().iter().map(|e| e.ancestral).collect();
        assert_eq!(
            order,
            vec![PopulationId::Pop1Anc, PopulationId::Pop2Anc, PopulationId::Ancestral]
        );
        assert_eq!(demography.split_time(), Some(10.0));
        assert_eq!(demography.epoch_change_time(), Some(5.0));
    }

    #[test]
    fn test_migration_lookup_is_ordered() {
        let demography = Demography::new(
            vec![],
            vec![],
            vec![MigrationRate {
                source: PopulationId::Pop2,
                dest: PopulationId::Pop1,
                rate: 1e-5,
            }],
        );
        assert_eq!(
            demography.migration_rate(PopulationId::Pop2, PopulationId::Pop1),
            Some(1e-5)
        );
        assert_eq!(
            demography.migration_rate(PopulationId::Pop1, PopulationId::Pop2),
            None
        );
    }
}
