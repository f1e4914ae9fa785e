//! Satellite position book - leveraged synthetic batches.
//!
//! Every day the book runs an exit pass and then an entry pass. Exit
//! decisions are made for all open batches against the same price before any
//! batch is removed, so the outcome does not depend on ledger order.

use chrono::NaiveDate;

use crate::domain::{AgeBucket, CashPools, ClosedBatch, ExitReason, SatelliteBatch};
use crate::params::{ProfitTargets, RebalanceMode, SimulationParameters};

/// Decide whether `batch` exits at `price` on `today`. First match wins:
/// expiry past 9 months, then the profit target of the age bucket.
pub fn exit_decision(
    batch: &SatelliteBatch,
    today: NaiveDate,
    price: f64,
    leverage: f64,
    targets: &ProfitTargets,
) -> Option<ExitReason> {
    let age = batch.age_months(today);
    let levered_pct = batch.levered_return(price, leverage) * 100.0;

    match AgeBucket::for_age(age) {
        None => Some(ExitReason::Expiry),
        Some(bucket) => {
            let target = match bucket {
                AgeBucket::Early => targets.early_pct,
                AgeBucket::Middle => targets.middle_pct,
                AgeBucket::Late => targets.late_pct,
            };
            (levered_pct > target).then_some(ExitReason::ProfitTake(bucket))
        }
    }
}

/// Inputs to the entry pass.
#[derive(Debug, Clone, Copy)]
pub struct EntrySignal {
    pub date: NaiveDate,
    pub price: f64,
    pub prev_price: f64,
    pub bullish: bool,
    /// Total equity at the start of the day.
    pub equity: f64,
}

impl EntrySignal {
    /// Single-day return of the satellite ticker.
    pub fn day_return(&self) -> f64 {
        self.price / self.prev_price - 1.0
    }
}

#[derive(Debug, Clone)]
pub struct SatellitePositionBook {
    mode: RebalanceMode,
    leverage: f64,
    targets: ProfitTargets,
    drop_threshold_pct: f64,
    batch_pct: f64,
    satellite_weight_pct: f64,
    initial_capital: f64,
    batches: Vec<SatelliteBatch>,
}

impl SatellitePositionBook {
    pub fn new(params: &SimulationParameters) -> Self {
        Self {
            mode: params.mode,
            leverage: params.leverage,
            targets: params.profit_targets,
            drop_threshold_pct: params.drop_threshold_pct,
            batch_pct: params.batch_pct,
            satellite_weight_pct: params.satellite_weight_pct,
            initial_capital: params.initial_capital,
            batches: Vec::new(),
        }
    }

    pub fn batches(&self) -> &[SatelliteBatch] {
        &self.batches
    }

    pub fn open_count(&self) -> usize {
        self.batches.len()
    }

    /// Capital committed to open batches (not marked).
    pub fn committed_cost(&self) -> f64 {
        self.batches.iter().map(|b| b.cost).sum()
    }

    /// Mark-to-market value of all open batches.
    pub fn marked_value(&self, price: f64) -> f64 {
        self.batches
            .iter()
            .map(|b| b.marked_value(price, self.leverage))
            .sum()
    }

    /// Size of a new batch: a share of live equity under fixed weight, of
    /// starting capital under snowball.
    pub fn batch_amount(&self, equity: f64) -> f64 {
        self.sizing_base(equity) * self.batch_pct / 100.0
    }

    /// Cap on committed cost, on the same base as `batch_amount`.
    pub fn max_exposure(&self, equity: f64) -> f64 {
        self.sizing_base(equity) * self.satellite_weight_pct / 100.0
    }

    fn sizing_base(&self, equity: f64) -> f64 {
        match self.mode {
            RebalanceMode::FixedWeight => equity,
            RebalanceMode::Snowball => self.initial_capital,
        }
    }

    /// Close every batch that qualifies today and route the proceeds.
    ///
    /// Fixed weight: all proceeds return to satellite cash. Snowball: the
    /// principal (or what is left of it) returns to satellite cash and any
    /// profit goes to core cash.
    pub fn exit_pass(
        &mut self,
        today: NaiveDate,
        price: f64,
        pools: &mut CashPools,
    ) -> Vec<ClosedBatch> {
        let decisions: Vec<Option<ExitReason>> = self
            .batches
            .iter()
            .map(|b| exit_decision(b, today, price, self.leverage, &self.targets))
            .collect();

        if decisions.iter().all(Option::is_none) {
            return Vec::new();
        }

        let mut closed = Vec::new();
        let mut kept = Vec::with_capacity(self.batches.len());
        for (batch, decision) in self.batches.drain(..).zip(decisions) {
            let Some(reason) = decision else {
                kept.push(batch);
                continue;
            };

            let proceeds = batch.marked_value(price, self.leverage);
            let profit = proceeds - batch.cost;
            match self.mode {
                RebalanceMode::FixedWeight => pools.satellite += proceeds,
                RebalanceMode::Snowball => {
                    pools.satellite += proceeds.min(batch.cost);
                    if profit > 0.0 {
                        pools.core += profit;
                    }
                }
            }

            tracing::debug!(
                %today,
                opened = %batch.open_date,
                entry = batch.entry_price,
                exit = price,
                cost = batch.cost,
                proceeds,
                %reason,
                "satellite batch closed"
            );

            closed.push(ClosedBatch {
                open_date: batch.open_date,
                close_date: today,
                entry_price: batch.entry_price,
                exit_price: price,
                cost: batch.cost,
                proceeds,
                levered_return: batch.levered_return(price, self.leverage),
                reason,
            });
        }
        self.batches = kept;
        closed
    }

    /// Open one batch if the day is bullish, the satellite dropped more than
    /// the threshold, exposure stays within the cap and cash covers the cost.
    pub fn entry_pass(
        &mut self,
        signal: &EntrySignal,
        pools: &mut CashPools,
    ) -> Option<SatelliteBatch> {
        if !signal.bullish {
            return None;
        }
        if signal.day_return() * 100.0 >= -self.drop_threshold_pct {
            return None;
        }

        let amount = self.batch_amount(signal.equity);
        if self.committed_cost() + amount > self.max_exposure(signal.equity) {
            return None;
        }
        if pools.satellite < amount {
            return None;
        }

        let batch = SatelliteBatch::new(signal.date, signal.price, amount);
        pools.satellite -= amount;
        self.batches.push(batch);
        tracing::debug!(
            date = %signal.date,
            price = signal.price,
            cost = amount,
            open = self.batches.len(),
            "satellite batch opened"
        );
        Some(batch)
    }
}
