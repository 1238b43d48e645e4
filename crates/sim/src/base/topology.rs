use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AbissError;

/// A two-population demographic model shape.
///
/// The mapping of variants to integers is stable and indexes the static
/// catalog (`iso_2epoch`=0 … `gim`=5). Every topology-dependent rule
/// (arity, parameter layout, which epochs carry migration) is read from the
/// catalog entry returned by [`Topology::spec`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum Topology {
    /// Isolation, one epoch.
    Iso2Epoch = 0,
    /// Isolation with migration, one epoch.
    Im = 1,
    /// Isolation, two epochs.
    Iso3Epoch = 2,
    /// Initial migration: gene flow in the ancestral epoch only.
    Iim = 3,
    /// Secondary contact: gene flow in the contemporary epoch only.
    Sc = 4,
    /// Generalised IM: gene flow in both epochs.
    Gim = 5,
}

/// One of the (at most) two time intervals between the present and the root split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Epoch {
    /// From the present back to the epoch change (or the split, for one-epoch models).
    Contemporary,
    /// From the epoch change back to the root split.
    Ancestral,
}

/// Epochs in which a topology allows migration between the two lineages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationEpochs {
    None,
    Contemporary,
    Ancestral,
    Both,
}

impl MigrationEpochs {
    /// Whether migration rates are defined for `epoch`.
    pub const fn applies_to(self, epoch: Epoch) -> bool {
        matches!(
            (self, epoch),
            (Self::Both, _)
                | (Self::Contemporary, Epoch::Contemporary)
                | (Self::Ancestral, Epoch::Ancestral)
        )
    }
}

/// Named slot of a parameter vector, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Pop1Size,
    Pop2Size,
    Pop1AncSize,
    Pop2AncSize,
    AncestralSize,
    EpochChangeTime,
    SplitTime,
    Mig12,
    Mig21,
    Mig12Anc,
    Mig21Anc,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pop1Size => "pop1_size",
            Self::Pop2Size => "pop2_size",
            Self::Pop1AncSize => "pop1_anc_size",
            Self::Pop2AncSize => "pop2_anc_size",
            Self::AncestralSize => "ancestral_size",
            Self::EpochChangeTime => "epoch_change_time",
            Self::SplitTime => "split_time",
            Self::Mig12 => "mig_12",
            Self::Mig21 => "mig_21",
            Self::Mig12Anc => "mig_12_anc",
            Self::Mig21Anc => "mig_21_anc",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologySpec {
    pub topology: Topology,
    pub name: &'static str,
    /// Number of population sizes drawn from the Ne prior.
    pub ne_count: usize,
    /// Number of times drawn from the tau prior (one per epoch).
    pub tau_count: usize,
    /// Number of migration values drawn from the M prior.
    pub m_count: usize,
    pub migration: MigrationEpochs,
    /// Parameter vector layout.
    pub fields: &'static [Field],
}

impl TopologySpec {
    pub const fn epochs(&self) -> usize {
        self.tau_count
    }

    pub const fn is_two_epoch(&self) -> bool {
        self.tau_count == 2
    }

    /// Migration slots in the parameter vector (sampled values plus zero padding).
    pub fn migration_slots(&self) -> usize {
        self.fields.len() - self.ne_count - self.tau_count
    }
}

use Field::*;

const ONE_EPOCH_ISOLATION: &[Field] = &[Pop1Size, Pop2Size, AncestralSize, SplitTime];
const ONE_EPOCH_MIGRATION: &[Field] = &[Pop1Size, Pop2Size, AncestralSize, SplitTime, Mig12, Mig21];
const TWO_EPOCH_ISOLATION: &[Field] = &[
    Pop1Size,
    Pop2Size,
    Pop1AncSize,
    Pop2AncSize,
    AncestralSize,
    EpochChangeTime,
    SplitTime,
];
const TWO_EPOCH_MIGRATION: &[Field] = &[
    Pop1Size,
    Pop2Size,
    Pop1AncSize,
    Pop2AncSize,
    AncestralSize,
    EpochChangeTime,
    SplitTime,
    Mig12,
    Mig21,
    Mig12Anc,
    Mig21Anc,
];

/// Widest parameter vector of any topology.
pub const MAX_FIELDS: usize = TWO_EPOCH_MIGRATION.len();

static CATALOG: [TopologySpec; 6] = [
    TopologySpec {
        topology: Topology::Iso2Epoch,
        name: "iso_2epoch",
        ne_count: 3,
        tau_count: 1,
        m_count: 0,
        migration: MigrationEpochs::None,
        fields: ONE_EPOCH_ISOLATION,
    },
    TopologySpec {
        topology: Topology::Im,
        name: "im",
        ne_count: 3,
        tau_count: 1,
        m_count: 2,
        migration: MigrationEpochs::Contemporary,
        fields: ONE_EPOCH_MIGRATION,
    },
    TopologySpec {
        topology: Topology::Iso3Epoch,
        name: "iso_3epoch",
        ne_count: 5,
        tau_count: 2,
        m_count: 0,
        migration: MigrationEpochs::None,
        fields: TWO_EPOCH_ISOLATION,
    },
    TopologySpec {
        topology: Topology::Iim,
        name: "iim",
        ne_count: 5,
        tau_count: 2,
        m_count: 2,
        migration: MigrationEpochs::Ancestral,
        fields: TWO_EPOCH_MIGRATION,
    },
    TopologySpec {
        topology: Topology::Sc,
        name: "sc",
        ne_count: 5,
        tau_count: 2,
        m_count: 2,
        migration: MigrationEpochs::Contemporary,
        fields: TWO_EPOCH_MIGRATION,
    },
    TopologySpec {
        topology: Topology::Gim,
        name: "gim",
        ne_count: 5,
        tau_count: 2,
        m_count: 4,
        migration: MigrationEpochs::Both,
        fields: TWO_EPOCH_MIGRATION,
    },
];

impl Topology {
    /// All topologies in catalog order.
    pub const ALL: [Topology; 6] = [
        Self::Iso2Epoch,
        Self::Im,
        Self::Iso3Epoch,
        Self::Iim,
        Self::Sc,
        Self::Gim,
    ];

    #[inline(always)]
    pub const fn to_index(self) -> usize {
        self as usize
    }

    /// Catalog entry for this topology.
    #[inline]
    pub fn spec(self) -> &'static TopologySpec {
        &CATALOG[self.to_index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn fields(self) -> &'static [Field] {
        self.spec().fields
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topology {
    type Err = AbissError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CATALOG
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(wanted))
            .map(|spec| spec.topology)
            .ok_or_else(|| {
                let names: Vec<&str> = CATALOG.iter().map(|spec| spec.name).collect();
                AbissError::invalid_argument(format!(
                    "Model {s} not valid (select from {})",
                    names.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for Topology {
    type Error = AbissError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Topology> for String {
    fn from(topology: Topology) -> Self {
        topology.name().to_string()
    }
}
