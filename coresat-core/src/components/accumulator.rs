//! Core accumulator - scheduled installments and snowball reinvestment.
//!
//! Both mechanisms only buy on bullish days.

use chrono::{Datelike, NaiveDate};

use crate::domain::CashPools;
use crate::params::{RebalanceMode, SimulationParameters};

/// Relative slack on the installment funding check. Repeated subtraction of a
/// non-representable amount leaves the last installment a few ulps short.
const FUNDING_EPSILON: f64 = 1e-9;

/// What the accumulator bought today.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulation {
    /// Cash spent on a scheduled installment.
    pub installment: Option<f64>,
    /// Surplus core cash swept into shares (snowball only).
    pub reinvested: Option<f64>,
}

impl Accumulation {
    pub fn spent(&self) -> f64 {
        self.installment.unwrap_or(0.0) + self.reinvested.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct CoreAccumulator {
    mode: RebalanceMode,
    total_installments: u32,
    installment_amount: f64,
    reinvest_threshold: f64,
    installments_made: u32,
    last_month: Option<(i32, u32)>,
}

impl CoreAccumulator {
    pub fn new(params: &SimulationParameters) -> Self {
        Self {
            mode: params.mode,
            total_installments: params.dca_installments,
            installment_amount: params.installment(),
            reinvest_threshold: params.reinvest_threshold,
            installments_made: 0,
            last_month: None,
        }
    }

    pub fn installments_made(&self) -> u32 {
        self.installments_made
    }

    pub fn installments_remaining(&self) -> u32 {
        self.total_installments.saturating_sub(self.installments_made)
    }

    /// Core cash held back for installments not yet made.
    pub fn reserved_cash(&self) -> f64 {
        self.installments_remaining() as f64 * self.installment_amount
    }

    /// Run scheduled accumulation, then (snowball only) reinvest the surplus.
    pub fn run(
        &mut self,
        date: NaiveDate,
        bullish: bool,
        core_price: f64,
        core_shares: &mut f64,
        pools: &mut CashPools,
    ) -> Accumulation {
        let installment = self.scheduled(date, bullish, core_price, core_shares, pools);
        let reinvested = match self.mode {
            RebalanceMode::Snowball => self.reinvest(bullish, core_price, core_shares, pools),
            RebalanceMode::FixedWeight => None,
        };
        Accumulation {
            installment,
            reinvested,
        }
    }

    /// One installment on the first observed day of a month. A bearish or
    /// underfunded first day forfeits that month's slot without counting it.
    fn scheduled(
        &mut self,
        date: NaiveDate,
        bullish: bool,
        core_price: f64,
        core_shares: &mut f64,
        pools: &mut CashPools,
    ) -> Option<f64> {
        let month = (date.year(), date.month());
        if self.last_month == Some(month) {
            return None;
        }
        self.last_month = Some(month);

        let slack = FUNDING_EPSILON * self.installment_amount.max(1.0);
        if self.installments_made >= self.total_installments
            || !bullish
            || pools.core + slack < self.installment_amount
        {
            return None;
        }

        // never spend more than the sleeve holds
        let amount = self.installment_amount.min(pools.core);
        *core_shares += amount / core_price;
        pools.core -= amount;
        self.installments_made += 1;
        tracing::debug!(
            %date,
            amount,
            installment = self.installments_made,
            "scheduled core installment"
        );
        Some(amount)
    }

    fn reinvest(
        &self,
        bullish: bool,
        core_price: f64,
        core_shares: &mut f64,
        pools: &mut CashPools,
    ) -> Option<f64> {
        let surplus = pools.core - self.reserved_cash();
        if !bullish || surplus <= self.reinvest_threshold {
            return None;
        }
        *core_shares += surplus / core_price;
        pools.core -= surplus;
        tracing::debug!(surplus, "reinvested core surplus");
        Some(surplus)
    }
}
