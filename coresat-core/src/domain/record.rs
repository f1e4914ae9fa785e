//! Per-day output snapshots and rebalance events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable end-of-day snapshot, one per simulated day.
///
/// `total_equity` equals the sum of the five value fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub total_equity: f64,
    pub core_invested: f64,
    pub cash_core: f64,
    pub sat_invested: f64,
    pub cash_sat: f64,
    pub cash_buffer: f64,
    pub core_shares: f64,
    pub open_batches: usize,
}

impl DailyRecord {
    /// Sum of the value components, recomputed independently of `total_equity`.
    pub fn component_sum(&self) -> f64 {
        self.core_invested + self.cash_core + self.sat_invested + self.cash_sat + self.cash_buffer
    }

    /// Core sleeve value (shares plus core cash).
    pub fn core_sleeve(&self) -> f64 {
        self.core_invested + self.cash_core
    }

    /// Satellite sleeve value (marked batches plus satellite cash).
    pub fn satellite_sleeve(&self) -> f64 {
        self.sat_invested + self.cash_sat
    }
}

/// What a single rebalance trigger moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    pub date: NaiveDate,
    /// Total equity the targets were computed from.
    pub equity: f64,
    /// Value moved out of the core sleeve into the buffer.
    pub core_sold: f64,
    /// Satellite cash moved into the buffer.
    pub sat_withdrawn: f64,
    /// Buffer cash moved into the satellite sleeve.
    pub sat_refilled: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_sum_and_sleeves() {
        let r = DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            total_equity: 100.0,
            core_invested: 50.0,
            cash_core: 20.0,
            sat_invested: 10.0,
            cash_sat: 15.0,
            cash_buffer: 5.0,
            core_shares: 0.5,
            open_batches: 1,
        };
        assert_eq!(r.component_sum(), 100.0);
        assert_eq!(r.core_sleeve(), 70.0);
        assert_eq!(r.satellite_sleeve(), 25.0);
    }
}
