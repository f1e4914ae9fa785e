//! Mutable per-run state and the run result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{CapitalAllocator, CoreAccumulator, SatellitePositionBook, SleeveMarks};
use crate::domain::{CashPools, ClosedBatch, DailyRecord, RebalanceEvent, SatelliteBatch};
use crate::params::{ParamsError, SimulationParameters};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),
}

/// Everything one simulation owns. Dropped when the run ends.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub pools: CashPools,
    pub core_shares: f64,
    pub book: SatellitePositionBook,
    pub accumulator: CoreAccumulator,
    pub allocator: CapitalAllocator,
}

impl EngineState {
    pub fn new(params: &SimulationParameters, reference_date: NaiveDate) -> Self {
        Self {
            pools: CashPools::split(
                params.initial_capital,
                params.core_weight_pct,
                params.satellite_weight_pct,
            ),
            core_shares: 0.0,
            book: SatellitePositionBook::new(params),
            accumulator: CoreAccumulator::new(params),
            allocator: CapitalAllocator::new(params, reference_date),
        }
    }

    /// Total equity: core shares and open batches marked at the given prices,
    /// plus all three cash pools.
    pub fn equity(&self, core_price: f64, satellite_price: f64) -> f64 {
        self.core_shares * core_price + self.book.marked_value(satellite_price) + self.pools.total()
    }

    pub fn marks(&self, core_price: f64, satellite_price: f64) -> SleeveMarks {
        SleeveMarks {
            equity: self.equity(core_price, satellite_price),
            core_price,
            satellite_marked: self.book.marked_value(satellite_price),
        }
    }

    pub fn snapshot(&self, date: NaiveDate, core_price: f64, satellite_price: f64) -> DailyRecord {
        let core_invested = self.core_shares * core_price;
        let sat_invested = self.book.marked_value(satellite_price);
        DailyRecord {
            date,
            total_equity: core_invested + sat_invested + self.pools.total(),
            core_invested,
            cash_core: self.pools.core,
            sat_invested,
            cash_sat: self.pools.satellite,
            cash_buffer: self.pools.buffer,
            core_shares: self.core_shares,
            open_batches: self.book.open_count(),
        }
    }
}

/// Output of one simulation.
///
/// An empty `records` vector means "no data": fewer than two aligned days
/// were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub records: Vec<DailyRecord>,
    pub trades: Vec<ClosedBatch>,
    pub rebalances: Vec<RebalanceEvent>,
    pub installments_made: u32,
    /// Core cash converted into shares by installments and reinvestment.
    #[serde(default)]
    pub core_purchased: f64,
    /// The part of `core_purchased` that came from the snowball sweep.
    #[serde(default)]
    pub core_reinvested: f64,
    /// Satellite batches still open after the last day.
    #[serde(default)]
    pub open_at_end: Vec<SatelliteBatch>,
    /// Days where the day's trades changed equity beyond tolerance.
    pub drift_warnings: usize,
}

impl SimulationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.records.last().map(|r| r.total_equity)
    }

    pub fn equity_curve(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.total_equity).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }
}
