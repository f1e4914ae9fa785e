//! Capital allocator - periodic fixed-weight rebalancing.
//!
//! Active only under `RebalanceMode::FixedWeight` with an interval. On the
//! first simulated day of a boundary month it pushes both sleeves back
//! toward their target weights:
//!
//! - an overfunded core sleeve drains core cash first, then sells shares;
//! - an overfunded satellite sleeve gives up satellite cash only (open
//!   batches are never force-closed);
//! - an underfunded satellite sleeve is refilled from the buffer, partially
//!   if the buffer is short.
//!
//! An underfunded core sleeve is left alone; core top-ups only happen through
//! scheduled accumulation.

use chrono::{Datelike, NaiveDate};

use crate::domain::{CashPools, RebalanceEvent};
use crate::params::SimulationParameters;

/// Calendar month key; year is part of it so annual boundaries recur.
type MonthKey = (i32, u32);

fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

/// Sleeve values at today's prices, before any trade.
#[derive(Debug, Clone, Copy)]
pub struct SleeveMarks {
    pub equity: f64,
    pub core_price: f64,
    /// Marked value of all open satellite batches.
    pub satellite_marked: f64,
}

#[derive(Debug, Clone)]
pub struct CapitalAllocator {
    interval_months: Option<u32>,
    core_weight: f64,
    satellite_weight: f64,
    last_trigger: MonthKey,
}

impl CapitalAllocator {
    /// `reference_date` is day 0; its month never triggers.
    pub fn new(params: &SimulationParameters, reference_date: NaiveDate) -> Self {
        Self {
            interval_months: params.active_rebalance_months(),
            core_weight: params.core_weight(),
            satellite_weight: params.satellite_weight(),
            last_trigger: month_key(reference_date),
        }
    }

    pub fn is_active(&self) -> bool {
        self.interval_months.is_some()
    }

    /// True on the first observed day of a boundary month. Records the
    /// trigger, so a second call in the same month returns false.
    pub fn check_boundary(&mut self, date: NaiveDate) -> bool {
        let Some(interval) = self.interval_months else {
            return false;
        };
        let key = month_key(date);
        if key != self.last_trigger && date.month() % interval == 0 {
            self.last_trigger = key;
            true
        } else {
            false
        }
    }

    /// Move cash between sleeves toward target weights.
    pub fn rebalance(
        &self,
        date: NaiveDate,
        marks: SleeveMarks,
        core_shares: &mut f64,
        pools: &mut CashPools,
    ) -> RebalanceEvent {
        let target_core = marks.equity * self.core_weight;
        let target_sat = marks.equity * self.satellite_weight;

        // Core: sell the excess only
        let mut core_sold = 0.0;
        let core_excess = *core_shares * marks.core_price + pools.core - target_core;
        if core_excess > 0.0 {
            let from_cash = core_excess.min(pools.core);
            pools.core -= from_cash;

            let remainder = core_excess - from_cash;
            let shares_sold = (remainder / marks.core_price).min(*core_shares);
            *core_shares -= shares_sold;
            let proceeds = shares_sold * marks.core_price;

            pools.buffer += from_cash + proceeds;
            core_sold = from_cash + proceeds;
        }

        // Satellite: withdraw idle cash, or refill from the buffer
        let mut sat_withdrawn = 0.0;
        let mut sat_refilled = 0.0;
        let sat_gap = target_sat - (marks.satellite_marked + pools.satellite);
        if sat_gap < 0.0 {
            sat_withdrawn = (-sat_gap).min(pools.satellite);
            pools.satellite -= sat_withdrawn;
            pools.buffer += sat_withdrawn;
        } else if sat_gap > 0.0 {
            sat_refilled = sat_gap.min(pools.buffer);
            pools.buffer -= sat_refilled;
            pools.satellite += sat_refilled;
        }

        tracing::debug!(
            %date,
            equity = marks.equity,
            core_sold,
            sat_withdrawn,
            sat_refilled,
            "rebalance"
        );

        RebalanceEvent {
            date,
            equity: marks.equity,
            core_sold,
            sat_withdrawn,
            sat_refilled,
        }
    }
}
