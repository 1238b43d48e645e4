//! Simulation pipeline: engine boundary, run configuration, per-task work
//! and parallel reference-table construction.
//!
//! - `CoalescentEngine`: the external simulator, reached only through this trait.
//! - `RunConfig`: the immutable description of a build.
//! - `SimulationTask`: sample, build demography, simulate, summarise.
//! - `ReferenceTableBuilder`: runs tasks on a worker pool and assembles the table.

pub mod configs;
pub mod engine;
pub mod reference;
pub mod task;

pub use configs::{PriorsConfig, RunConfig, SimulationConfig};
pub use engine::{
    simulate_blocks, AncestryRequest, CoalescentEngine, DivergenceMatrix, EngineError,
    EngineResult, SampleConfig,
};
pub use reference::ReferenceTableBuilder;
pub use task::{SimulationRecord, SimulationTask};
