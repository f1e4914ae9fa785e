//! Day-by-day simulation loop.
//!
//! Day 0 is the reference day and only seeds state. For every later day, in
//! order:
//! 1. Mark open batches and compute equity for the step
//! 2. Classify the day with the trend filter (day t-1 data)
//! 3. Rebalance on a boundary (fixed weight only)
//! 4. Core accumulation, then snowball reinvestment
//! 5. Satellite exit pass, then entry pass
//! 6. Re-mark and append a `DailyRecord`

use crate::components::{EntrySignal, TrendFilter};
use crate::data::AlignedPrices;
use crate::params::SimulationParameters;

use super::state::{EngineState, SimulationError, SimulationResult};

/// Run one simulation over aligned core/satellite closes.
///
/// Returns an empty result when fewer than two days are supplied. Parameter
/// validation failures are errors.
pub fn run_simulation(
    prices: &AlignedPrices,
    params: &SimulationParameters,
) -> Result<SimulationResult, SimulationError> {
    params.validate()?;

    let n = prices.len();
    if n < 2 {
        tracing::warn!(days = n, "not enough aligned days to simulate");
        return Ok(SimulationResult::empty());
    }

    let dates = prices.dates();
    let core = prices.core();
    let sat = prices.satellite();

    let trend = TrendFilter::new(core, &params.trend_filter);
    let mut state = EngineState::new(params, dates[0]);

    tracing::info!(
        core = %prices.core_symbol,
        satellite = %prices.satellite_symbol,
        days = n,
        mode = %params.mode,
        interval = %params.interval,
        leverage = params.leverage,
        rebalancing = state.allocator.is_active(),
        "simulation started"
    );

    let mut result = SimulationResult {
        records: Vec::with_capacity(n - 1),
        ..SimulationResult::default()
    };

    for t in 1..n {
        let date = dates[t];
        let core_price = core[t];
        let sat_price = sat[t];

        // ─── Mark ───
        let marks = state.marks(core_price, sat_price);
        let equity_before = marks.equity;

        // ─── Trend ───
        let bullish = trend.is_bullish(t);

        // ─── Rebalance ───
        if state.allocator.check_boundary(date) {
            let event = state.allocator.rebalance(
                date,
                marks,
                &mut state.core_shares,
                &mut state.pools,
            );
            result.rebalances.push(event);
        }

        // ─── Core accumulation ───
        let bought = state.accumulator.run(
            date,
            bullish,
            core_price,
            &mut state.core_shares,
            &mut state.pools,
        );
        result.core_purchased += bought.spent();
        result.core_reinvested += bought.reinvested.unwrap_or(0.0);

        // ─── Satellite ───
        let closed = state.book.exit_pass(date, sat_price, &mut state.pools);
        result.trades.extend(closed);
        let signal = EntrySignal {
            date,
            price: sat_price,
            prev_price: sat[t - 1],
            bullish,
            equity: equity_before,
        };
        state.book.entry_pass(&signal, &mut state.pools);

        // ─── Record ───
        let record = state.snapshot(date, core_price, sat_price);
        let drift = (record.total_equity - equity_before).abs() / equity_before.abs().max(1.0);
        if drift > params.drift_tolerance {
            tracing::warn!(
                %date,
                before = equity_before,
                after = record.total_equity,
                drift,
                "cash conservation drift beyond tolerance"
            );
            result.drift_warnings += 1;
        }
        if !state.pools.is_nonnegative(params.drift_tolerance * equity_before.abs().max(1.0)) {
            tracing::warn!(%date, pools = ?state.pools, "negative cash pool");
        }
        result.records.push(record);
    }

    result.installments_made = state.accumulator.installments_made();
    result.open_at_end = state.book.batches().to_vec();

    tracing::info!(
        days = result.records.len(),
        trades = result.trades.len(),
        rebalances = result.rebalances.len(),
        installments = result.installments_made,
        final_equity = result.final_equity().unwrap_or(0.0),
        drift_warnings = result.drift_warnings,
        "simulation finished"
    );

    Ok(result)
}
