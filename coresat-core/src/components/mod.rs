//! Engine components, each owning one rule family of the daily step.

pub mod accumulator;
pub mod allocator;
pub mod satellite;
pub mod trend;

pub use accumulator::{Accumulation, CoreAccumulator};
pub use allocator::{CapitalAllocator, SleeveMarks};
pub use satellite::{exit_decision, EntrySignal, SatellitePositionBook};
pub use trend::{Regime, TrendFilter};
