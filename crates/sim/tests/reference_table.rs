//! End-to-end reference-table builds against a deterministic engine.

mod common;

use abiss_sim::base::{is_absent, Field, Topology};
use abiss_sim::errors::AbissError;
use abiss_sim::priors::PriorConfig;
use abiss_sim::simulation::{PriorsConfig, ReferenceTableBuilder, RunConfig, SimulationConfig};
use abiss_sim::storage::ReferenceTable;
use common::FakeEngine;

fn run_config(blocklen: usize, blocks: [usize; 3], sims: usize) -> RunConfig {
    RunConfig::new(SimulationConfig::new(1e-8, 1e-8, blocklen).with_num_blocks(blocks))
        .with_num_sims(sims)
        .with_seed(2024)
        .with_threads(2)
}

fn column_of(field: Field) -> usize {
    Topology::Gim
        .fields()
        .iter()
        .position(|&f| f == field)
        .unwrap()
}

#[test]
fn test_iso_2epoch_end_to_end() {
    let engine = FakeEngine::new();
    let config = run_config(50, [5, 5, 10], 10).with_topologies(vec![Topology::Iso2Epoch]);
    let table = ReferenceTableBuilder::new(&engine, config)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(table.features().dim(), (10, 150));
    assert_eq!(table.param_width(), Topology::Iso2Epoch.fields().len());
    assert_eq!(table.param_width(), 4);
    assert!(table.labels().iter().all(|&t| t == Topology::Iso2Epoch));

    for row in table.features().rows() {
        let row = row.to_vec();
        let sums: Vec<u64> = row.chunks(50).map(|c| c.iter().sum()).collect();
        assert_eq!(sums, vec![5, 5, 10]);
    }
    assert!(table.parameters().iter().all(|v| !is_absent(*v)));
}

#[test]
fn test_all_topologies_layout() {
    let engine = FakeEngine::new();
    let table = ReferenceTableBuilder::new(&engine, run_config(8, [2, 2, 4], 3))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(table.rows(), 18);
    assert_eq!(table.param_width(), 11);
    for topology in Topology::ALL {
        assert_eq!(table.count(topology), 3, "{topology}");
    }

    // rows follow the configured topology order
    let expected: Vec<Topology> = Topology::ALL.iter().flat_map(|&t| [t; 3]).collect();
    assert_eq!(table.labels(), expected.as_slice());

    let params = table.parameters();
    for (row, &topology) in table.labels().iter().enumerate() {
        let width = topology.fields().len();
        let values = params.row(row);
        assert!(values.iter().take(width).all(|v| !is_absent(*v)), "{topology}");
        assert!(values.iter().skip(width).all(|v| is_absent(*v)), "{topology}");

        match topology {
            Topology::Iim => {
                assert_eq!(values[column_of(Field::Mig12)], 0.0);
                assert_eq!(values[column_of(Field::Mig21)], 0.0);
            }
            Topology::Sc => {
                assert_eq!(values[column_of(Field::Mig12Anc)], 0.0);
                assert_eq!(values[column_of(Field::Mig21Anc)], 0.0);
            }
            _ => {}
        }

        let set = table.parameter_set(row).unwrap();
        if set.fields().contains(&Field::EpochChangeTime) {
            let change = set.get(Field::EpochChangeTime).unwrap();
            assert!(set.get(Field::SplitTime).unwrap() >= change);
        }
    }
}

#[test]
fn test_seeded_builds_are_reproducible_across_thread_counts() {
    let engine = FakeEngine::new();
    let build = |threads| {
        let config = run_config(10, [4, 4, 8], 6).with_threads(threads);
        ReferenceTableBuilder::new(&engine, config)
            .unwrap()
            .build()
            .unwrap()
    };

    let a = build(1);
    let b = build(4);
    assert_eq!(a.features(), b.features());
    assert_eq!(a.labels(), b.labels());
    let bits = |t: &ReferenceTable| t.parameters().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
}

#[test]
fn test_different_seeds_differ() {
    let engine = FakeEngine::new();
    let build = |seed| {
        let config = run_config(10, [4, 4, 8], 4)
            .with_topologies(vec![Topology::Im])
            .with_seed(seed);
        ReferenceTableBuilder::new(&engine, config)
            .unwrap()
            .build()
            .unwrap()
    };
    let a = build(1);
    let b = build(2);
    assert_ne!(
        a.parameters().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        b.parameters().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
}

#[test]
fn test_engine_failure_aborts_build() {
    let engine = FakeEngine::broken();
    let config = run_config(10, [2, 2, 2], 5).with_topologies(vec![Topology::Sc]);
    let err = ReferenceTableBuilder::new(&engine, config)
        .unwrap()
        .build()
        .unwrap_err();

    match &err {
        AbissError::TaskFailed {
            topology,
            index,
            parameters,
            ..
        } => {
            assert_eq!(*topology, Topology::Sc);
            assert!(*index < 5);
            assert!(parameters.contains("split_time="));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(err.root_cause(), AbissError::EngineFailure(_)));
    assert!(err.to_string().contains("no mutations table"));
}

#[test]
fn test_insufficient_blocks_abort_build() {
    let engine = FakeEngine::short(3);
    let config = run_config(10, [5, 1, 1], 2).with_topologies(vec![Topology::Gim]);
    let err = ReferenceTableBuilder::new(&engine, config)
        .unwrap()
        .build()
        .unwrap_err();

    assert!(matches!(
        err.root_cause(),
        AbissError::InsufficientData {
            requested: 5,
            available: 3,
            ..
        }
    ));
}

#[test]
fn test_invalid_prior_rejected_before_simulating() {
    let engine = FakeEngine::broken();
    let config = run_config(10, [2, 2, 2], 5).with_priors(PriorsConfig {
        migration: PriorConfig::new("lognormal", vec![0.0, 1.0]),
        ..PriorsConfig::default()
    });

    let err = ReferenceTableBuilder::new(&engine, config).err().unwrap();
    assert!(matches!(err, AbissError::InvalidArgument(_)));
    assert!(err.to_string().contains("lognormal"));
}

#[test]
fn test_build_and_save_roundtrip_and_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulations.npz");
    let engine = FakeEngine::new();
    let builder = ReferenceTableBuilder::new(&engine, run_config(6, [3, 3, 6], 2)).unwrap();

    let table = builder.build_and_save(&path).unwrap();
    let back = ReferenceTable::read_npz(&path).unwrap();
    assert_eq!(back.features(), table.features());
    assert_eq!(back.labels(), table.labels());
    assert_eq!(back.param_width(), 11);

    let before = std::fs::read(&path).unwrap();
    let err = builder.build_and_save(&path).unwrap_err();
    assert!(matches!(err, AbissError::OutputConflict { .. }));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}
