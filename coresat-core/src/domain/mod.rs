//! Domain types for the core/satellite simulation.

pub mod batch;
pub mod pools;
pub mod record;
pub mod series;

pub use batch::{AgeBucket, ClosedBatch, ExitReason, SatelliteBatch, DAYS_PER_MONTH, LOSS_FLOOR};
pub use pools::CashPools;
pub use record::{DailyRecord, RebalanceEvent};
pub use series::{PricePoint, PriceSeries, SeriesError};

/// Symbol type alias
pub type Symbol = String;
