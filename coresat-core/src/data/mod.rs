//! Price data: provider boundary, synthetic generator, two-ticker alignment.

pub mod align;
pub mod provider;
pub mod synthetic;

pub use align::{align_pair, AlignedPrices};
pub use provider::{DataError, DataSource, InMemoryProvider, PriceProvider};
pub use synthetic::SyntheticProvider;
