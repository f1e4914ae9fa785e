//! Coresat Core - domain types, engine components and the daily simulation loop.
//!
//! This crate contains the simulation engine for a hybrid core/satellite
//! strategy:
//! - Domain types (price series, cash pools, satellite batches, daily records)
//! - Simulation parameters with rebalance mode and interval enums
//! - Trend filter over a simple moving average
//! - Capital allocator, core accumulator and satellite position book
//! - Day-by-day simulation loop producing an ordered `DailyRecord` history
//! - Series alignment, the price provider boundary and a synthetic generator
//!
//! The engine does no I/O. Loading, metrics and export live in `coresat-runner`.

pub mod components;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod params;

pub use data::{align_pair, AlignedPrices};
pub use engine::{run_simulation, SimulationError, SimulationResult};
pub use params::{RebalanceInterval, RebalanceMode, SimulationParameters};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: all public engine types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::CashPools>();
        require_sync::<domain::CashPools>();
        require_send::<domain::SatelliteBatch>();
        require_sync::<domain::SatelliteBatch>();
        require_send::<domain::ClosedBatch>();
        require_sync::<domain::ClosedBatch>();
        require_send::<domain::DailyRecord>();
        require_sync::<domain::DailyRecord>();

        // Inputs
        require_send::<SimulationParameters>();
        require_sync::<SimulationParameters>();
        require_send::<AlignedPrices>();
        require_sync::<AlignedPrices>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();

        // Engine types
        require_send::<engine::EngineState>();
        require_sync::<engine::EngineState>();
        require_send::<SimulationResult>();
        require_sync::<SimulationResult>();
    }

    /// The engine entry point takes only read-only inputs.
    #[test]
    fn run_simulation_borrows_inputs_immutably() {
        fn _check(
            prices: &AlignedPrices,
            params: &SimulationParameters,
        ) -> Result<SimulationResult, SimulationError> {
            run_simulation(prices, params)
        }
    }
}
