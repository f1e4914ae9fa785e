//! Simulation engine - per-run state and the daily loop.

pub mod loop_runner;
pub mod state;

pub use loop_runner::run_simulation;
pub use state::{EngineState, SimulationError, SimulationResult};
