//! Topology + sampled values → demography and canonical parameter vector.

use crate::base::{Epoch, ParameterSet, Topology, TopologySpec};
use crate::demography::{Demography, MigrationRate, Population, PopulationId, SplitEvent};
use crate::errors::{AbissError, Result};

/// Lineage pair that exchanges migrants during an epoch.
const fn epoch_pair(spec: &TopologySpec, epoch: Epoch) -> (PopulationId, PopulationId) {
    match (spec.is_two_epoch(), epoch) {
        (true, Epoch::Ancestral) => (PopulationId::Pop1Anc, PopulationId::Pop2Anc),
        _ => (PopulationId::Pop1, PopulationId::Pop2),
    }
}

fn epochs_of(spec: &TopologySpec) -> &'static [Epoch] {
    if spec.is_two_epoch() {
        &[Epoch::Contemporary, Epoch::Ancestral]
    } else {
        &[Epoch::Contemporary]
    }
}

fn check_arity(topology: Topology, kind: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(AbissError::invalid_argument(format!(
            "topology {topology} takes {expected} {kind} values, got {got}"
        )));
    }
    Ok(())
}

fn check_values(kind: &str, values: &[f64], allow_zero: bool) -> Result<()> {
    for (i, &value) in values.iter().enumerate() {
        let ok = value.is_finite() && if allow_zero { value >= 0.0 } else { value > 0.0 };
        if !ok {
            let bound = if allow_zero { ">= 0" } else { "> 0" };
            return Err(AbissError::invalid_argument(format!(
                "{kind}[{i}] must be finite and {bound}, got {value}"
            )));
        }
    }
    Ok(())
}

/// Build the demography and parameter vector of one simulation.
///
/// `ne` holds sizes in field order (`pop1, pop2, [pop1_anc, pop2_anc],
/// ancestral`). With two `tau` values the first is the contemporary epoch
/// length and the split time is their sum. `m` holds the migration values of
/// the epochs that allow migration, contemporary first; slots of epochs
/// without migration are zero in the parameter vector.
///
/// Demography times are in generations (`tau * N_ref`, `N_ref` being the
/// size of the first lineage of the most recent epoch that reaches the root
/// split) and migration rates per generation (`M / 2N_dest`).
pub fn build(
    topology: Topology,
    ne: &[f64],
    tau: &[f64],
    m: &[f64],
) -> Result<(Demography, ParameterSet)> {
    let spec = topology.spec();
    check_arity(topology, "Ne", spec.ne_count, ne.len())?;
    check_arity(topology, "tau", spec.tau_count, tau.len())?;
    check_arity(topology, "M", spec.m_count, m.len())?;
    check_values("Ne", ne, false)?;
    check_values("tau", tau, true)?;
    check_values("M", m, true)?;

    let (change_time, split_time) = match *tau {
        [split] => (None, split),
        [change, ancestral_span] => (Some(change), change + ancestral_span),
        _ => {
            return Err(AbissError::invalid_argument(format!(
                "topology {topology}: unsupported epoch count {}",
                tau.len()
            )))
        }
    };

    let mut values = Vec::with_capacity(spec.fields.len());
    values.extend_from_slice(ne);
    values.extend(change_time);
    values.push(split_time);

    let ids: &[PopulationId] = if spec.is_two_epoch() {
        &[
            PopulationId::Pop1,
            PopulationId::Pop2,
            PopulationId::Pop1Anc,
            PopulationId::Pop2Anc,
            PopulationId::Ancestral,
        ]
    } else {
        &[PopulationId::Pop1, PopulationId::Pop2, PopulationId::Ancestral]
    };
    let populations: Vec<Population> = ids
        .iter()
        .zip(ne)
        .map(|(&id, &initial_size)| Population { id, initial_size })
        .collect();
    let size_of = |id: PopulationId| {
        populations
            .iter()
            .find(|p| p.id == id)
            .map_or(f64::NAN, |p| p.initial_size)
    };

    let n_ref = if spec.is_two_epoch() {
        size_of(PopulationId::Pop1Anc)
    } else {
        size_of(PopulationId::Pop1)
    };

    let mut events = Vec::with_capacity(3);
    if let Some(change) = change_time {
        let time = change * n_ref;
        events.push(SplitEvent {
            time,
            derived: vec![PopulationId::Pop1],
            ancestral: PopulationId::Pop1Anc,
        });
        events.push(SplitEvent {
            time,
            derived: vec![PopulationId::Pop2],
            ancestral: PopulationId::Pop2Anc,
        });
    }
    let root_epoch = if spec.is_two_epoch() {
        Epoch::Ancestral
    } else {
        Epoch::Contemporary
    };
    let (root_a, root_b) = epoch_pair(spec, root_epoch);
    events.push(SplitEvent {
        time: split_time * n_ref,
        derived: vec![root_a, root_b],
        ancestral: PopulationId::Ancestral,
    });

    let mut migration = Vec::new();
    if spec.migration_slots() > 0 {
        let mut sampled = m.iter().copied();
        for &epoch in epochs_of(spec) {
            if !spec.migration.applies_to(epoch) {
                values.extend([0.0, 0.0]);
                continue;
            }
            let (a, b) = epoch_pair(spec, epoch);
            let (m_ab, m_ba) = match (sampled.next(), sampled.next()) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    return Err(AbissError::invalid_argument(format!(
                        "topology {topology}: catalog migration layout does not match M arity"
                    )))
                }
            };
            values.extend([m_ab, m_ba]);
            // mig_12: migrants into pop 1 from pop 2, scaled by pop 1's size
            migration.push(MigrationRate {
                source: b,
                dest: a,
                rate: m_ab / (2.0 * size_of(a)),
            });
            migration.push(MigrationRate {
                source: a,
                dest: b,
                rate: m_ba / (2.0 * size_of(b)),
            });
        }
    }

    let parameters = ParameterSet::new(topology, values)?;
    Ok((Demography::new(populations, events, migration), parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Field, MigrationEpochs};

    fn arity_inputs(topology: Topology) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let spec = topology.spec();
        (
            vec![1000.0; spec.ne_count],
            vec![0.5; spec.tau_count],
            vec![2.0; spec.m_count],
        )
    }

    #[test]
    fn test_field_counts() {
        let expected = [
            (Topology::Iso2Epoch, 4),
            (Topology::Im, 6),
            (Topology::Iso3Epoch, 7),
            (Topology::Iim, 11),
            (Topology::Sc, 11),
            (Topology::Gim, 11),
        ];
        for (topology, count) in expected {
            let (ne, tau, m) = arity_inputs(topology);
            let (_, params) = build(topology, &ne, &tau, &m).unwrap();
            assert_eq!(params.len(), count, "{topology}");
            assert_eq!(params.fields(), topology.fields());
        }
    }

    #[test]
    fn test_arity_mismatch() {
        let err = build(Topology::Im, &[1.0, 1.0, 1.0], &[0.1], &[1.0]).unwrap_err();
        assert!(matches!(err, AbissError::InvalidArgument(_)));
        assert!(err.to_string().contains("M"));

        assert!(build(Topology::Iso3Epoch, &[1.0; 5], &[0.1], &[]).is_err());
        assert!(build(Topology::Iso2Epoch, &[1.0; 5], &[0.1], &[]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(build(Topology::Iso2Epoch, &[0.0, 1.0, 1.0], &[0.1], &[]).is_err());
        assert!(build(Topology::Iso2Epoch, &[1.0, 1.0, 1.0], &[-0.1], &[]).is_err());
        assert!(build(Topology::Im, &[1.0; 3], &[0.1], &[f64::NAN, 1.0]).is_err());
        assert!(build(Topology::Iso2Epoch, &[1.0, 1.0, 1.0], &[0.0], &[]).is_ok());
    }

    #[test]
    fn test_iim_contemporary_rates_zero() {
        let (_, params) = build(Topology::Iim, &[1e4; 5], &[0.1, 0.2], &[3.0, 4.0]).unwrap();
        assert_eq!(params.get(Field::Mig12), Some(0.0));
        assert_eq!(params.get(Field::Mig21), Some(0.0));
        assert_eq!(params.get(Field::Mig12Anc), Some(3.0));
        assert_eq!(params.get(Field::Mig21Anc), Some(4.0));
    }

    #[test]
    fn test_sc_ancestral_rates_zero() {
        let (_, params) = build(Topology::Sc, &[1e4; 5], &[0.1, 0.2], &[3.0, 4.0]).unwrap();
        assert_eq!(params.get(Field::Mig12), Some(3.0));
        assert_eq!(params.get(Field::Mig21), Some(4.0));
        assert_eq!(params.get(Field::Mig12Anc), Some(0.0));
        assert_eq!(params.get(Field::Mig21Anc), Some(0.0));
    }

    #[test]
    fn test_isolation_migration_absent() {
        for topology in [Topology::Iso2Epoch, Topology::Iso3Epoch] {
            let (ne, tau, m) = arity_inputs(topology);
            let (demography, params) = build(topology, &ne, &tau, &m).unwrap();
            for field in [Field::Mig12, Field::Mig21, Field::Mig12Anc, Field::Mig21Anc] {
                assert_eq!(params.get(field), None, "{topology} {field}");
            }
            assert!(demography.migration_rates().is_empty());
        }
    }

    #[test]
    fn test_two_epoch_split_is_sum() {
        let (_, params) = build(Topology::Iso3Epoch, &[1.0; 5], &[0.2, 0.5], &[]).unwrap();
        let split = params.get(Field::SplitTime).unwrap();
        assert!((split - 0.7).abs() < 1e-12);
        assert_eq!(params.get(Field::EpochChangeTime), Some(0.2));
    }

    #[test]
    fn test_gim_engine_units() {
        let ne = [100_000.0, 150_000.0, 300_000.0, 50_000.0, 200_000.0];
        let tau = [1.0 / 6.0, 1.0 / 6.0];
        let m = [3.0, 1.5, 1.5, 1.0];
        let (demography, params) = build(Topology::Gim, &ne, &tau, &m).unwrap();

        assert!((params.get(Field::SplitTime).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((demography.epoch_change_time().unwrap() - 50_000.0).abs() < 1e-6);
        assert!((demography.split_time().unwrap() - 100_000.0).abs() < 1e-6);

        let rate = |s, d| demography.migration_rate(s, d).unwrap();
        use PopulationId::*;
        assert!((rate(Pop2, Pop1) - 1.5e-5).abs() < 1e-15);
        assert!((rate(Pop1, Pop2) - 5e-6).abs() < 1e-15);
        assert!((rate(Pop2Anc, Pop1Anc) - 2.5e-6).abs() < 1e-15);
        assert!((rate(Pop1Anc, Pop2Anc) - 1e-5).abs() < 1e-15);
        assert_eq!(demography.migration_rates().len(), 4);
    }

    #[test]
    fn test_migration_table_only_for_active_epochs() {
        for topology in Topology::ALL {
            let (ne, tau, m) = arity_inputs(topology);
            let (demography, _) = build(topology, &ne, &tau, &m).unwrap();
            let expected = match topology.spec().migration {
                MigrationEpochs::None => 0,
                MigrationEpochs::Both => 4,
                _ => 2,
            };
            assert_eq!(demography.migration_rates().len(), expected, "{topology}");
        }

        let (iim, _) = build(Topology::Iim, &[1e4; 5], &[0.1, 0.2], &[3.0, 4.0]).unwrap();
        assert!(iim
            .migration_rate(PopulationId::Pop2, PopulationId::Pop1)
            .is_none());
        assert!(iim
            .migration_rate(PopulationId::Pop2Anc, PopulationId::Pop1Anc)
            .is_some());
    }

    #[test]
    fn test_event_structure() {
        let (one, _) = build(Topology::Im, &[1e4; 3], &[0.3], &[1.0, 1.0]).unwrap();
        assert_eq!(one.events().len(), 1);
        assert_eq!(
            one.events()[0].derived,
            vec![PopulationId::Pop1, PopulationId::Pop2]
        );
        assert_eq!(one.populations().len(), 3);

        let (two, _) = build(Topology::Sc, &[1e4; 5], &[0.0, 0.0], &[1.0, 1.0]).unwrap();
        let events = two.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].ancestral, PopulationId::Ancestral);
        assert_eq!(
            events[2].derived,
            vec![PopulationId::Pop1Anc, PopulationId::Pop2Anc]
        );
        assert!(events.windows(2).all(|w| w[0].time <= w[1].time));
    }
}
