//! Performance metrics - pure functions over dated equity curves.
//!
//! Every metric is a pure function: dates and/or equity in, scalar out. No
//! dependencies on the loader, the engine or export.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use coresat_core::domain::{ClosedBatch, ExitReason};

/// Calendar days per year used to annualize.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Headline metrics for one equity curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub cagr: f64,
    /// Negative fraction (-0.25 = 25% drawdown).
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    pub fn compute(dates: &[NaiveDate], equity: &[f64]) -> Self {
        Self {
            total_return: total_return(equity),
            cagr: cagr(dates, equity),
            max_drawdown: max_drawdown(equity),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: last / first - 1.
pub fn total_return(equity: &[f64]) -> f64 {
    match (equity.first(), equity.last()) {
        (Some(&first), Some(&last)) if equity.len() >= 2 && first > 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// Years between the first and last date, on a 365.25-day year.
pub fn elapsed_years(dates: &[NaiveDate]) -> f64 {
    match (dates.first(), dates.last()) {
        (Some(&first), Some(&last)) => (last - first).num_days() as f64 / DAYS_PER_YEAR,
        _ => 0.0,
    }
}

/// Compound annual growth rate over calendar time. Zero when no time elapsed.
pub fn cagr(dates: &[NaiveDate], equity: &[f64]) -> f64 {
    let years = elapsed_years(dates);
    if years <= 0.0 {
        return 0.0;
    }
    match (equity.first(), equity.last()) {
        (Some(&first), Some(&last)) if first > 0.0 && last >= 0.0 => {
            (last / first).powf(1.0 / years) - 1.0
        }
        _ => 0.0,
    }
}

/// Maximum drawdown as a negative fraction.
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd
}

// ─── Benchmark ──────────────────────────────────────────────────────

/// Buy-and-hold of the core ticker, scaled so the first value equals
/// `initial_capital`.
pub fn benchmark_equity(core_closes: &[f64], initial_capital: f64) -> Vec<f64> {
    match core_closes.first() {
        Some(&first) if first > 0.0 => core_closes
            .iter()
            .map(|c| c * initial_capital / first)
            .collect(),
        _ => Vec::new(),
    }
}

// ─── Annual breakdown ───────────────────────────────────────────────

/// Return for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualReturn {
    pub year: i32,
    pub strategy: f64,
    pub benchmark: f64,
}

/// Per calendar year: year-end equity over the previous year's last value
/// (or the year's first value for the first year), minus one.
pub fn annual_returns(dates: &[NaiveDate], equity: &[f64]) -> Vec<(i32, f64)> {
    let mut out = Vec::new();
    let mut base: Option<f64> = None;
    let mut i = 0;
    let n = dates.len().min(equity.len());

    while i < n {
        let year = dates[i].year();
        let start = base.unwrap_or(equity[i]);
        let mut last = equity[i];
        while i < n && dates[i].year() == year {
            last = equity[i];
            i += 1;
        }
        let ret = if start > 0.0 { last / start - 1.0 } else { 0.0 };
        out.push((year, ret));
        base = Some(last);
    }
    out
}

/// Strategy and benchmark annual returns side by side.
pub fn annual_breakdown(
    dates: &[NaiveDate],
    strategy: &[f64],
    benchmark: &[f64],
) -> Vec<AnnualReturn> {
    annual_returns(dates, strategy)
        .into_iter()
        .zip(annual_returns(dates, benchmark))
        .map(|((year, s), (_, b))| AnnualReturn {
            year,
            strategy: s,
            benchmark: b,
        })
        .collect()
}

// ─── Trade statistics ───────────────────────────────────────────────

/// Satellite batch outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub count: usize,
    pub winners: usize,
    pub expiries: usize,
    /// Fraction of batches closed at a profit.
    pub win_rate: f64,
    /// Sum of proceeds minus cost.
    pub net_profit: f64,
}

impl TradeStats {
    pub fn compute(trades: &[ClosedBatch]) -> Self {
        let count = trades.len();
        let winners = trades.iter().filter(|t| t.is_winner()).count();
        let expiries = trades
            .iter()
            .filter(|t| t.reason == ExitReason::Expiry)
            .count();
        Self {
            count,
            winners,
            expiries,
            win_rate: if count == 0 {
                0.0
            } else {
                winners as f64 / count as f64
            },
            net_profit: trades.iter().map(ClosedBatch::profit).sum(),
        }
    }
}

// ─── Summary ────────────────────────────────────────────────────────

/// Aggregate view of a run: the only payload handed to a narrative or
/// summary consumer. Carries no internal engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub core_symbol: String,
    pub satellite_symbol: String,
    pub final_equity: f64,
    pub strategy: PerformanceMetrics,
    pub benchmark: PerformanceMetrics,
    /// Most recent calendar years, oldest first.
    pub recent_years: Vec<AnnualReturn>,
}

/// Number of trailing years kept in a `RunSummary`.
pub const SUMMARY_YEARS: usize = 5;

impl RunSummary {
    /// Excess total return over the benchmark.
    pub fn excess_return(&self) -> f64 {
        self.strategy.total_return - self.benchmark.total_return
    }

    /// Drawdown difference; positive means a shallower drawdown than the
    /// benchmark.
    pub fn drawdown_delta(&self) -> f64 {
        self.strategy.max_drawdown - self.benchmark.max_drawdown
    }
}

/// Keep the last `n` entries of an annual breakdown.
pub fn last_years(breakdown: &[AnnualReturn], n: usize) -> Vec<AnnualReturn> {
    breakdown[breakdown.len().saturating_sub(n)..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coresat_core::domain::AgeBucket;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ── Total return ──

    #[test]
    fn total_return_basic() {
        assert!((total_return(&[100_000.0, 95_000.0, 110_000.0]) - 0.1).abs() < 1e-12);
        assert_eq!(total_return(&[100_000.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    // ── CAGR ──

    #[test]
    fn cagr_uses_calendar_time() {
        // 731 days, 2020 being a leap year
        let dates = [d(2020, 1, 1), d(2022, 1, 1)];
        let eq = [100.0, 121.0];
        let years = 731.0 / DAYS_PER_YEAR;
        let expected = 1.21_f64.powf(1.0 / years) - 1.0;
        assert!((cagr(&dates, &eq) - expected).abs() < 1e-12);
        assert!((cagr(&dates, &eq) - 0.1).abs() < 1e-3);
    }

    #[test]
    fn cagr_zero_when_no_time_elapsed() {
        assert_eq!(cagr(&[d(2024, 1, 2)], &[100.0]), 0.0);
        assert_eq!(cagr(&[d(2024, 1, 2), d(2024, 1, 2)], &[100.0, 200.0]), 0.0);
        assert_eq!(cagr(&[], &[]), 0.0);
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_known() {
        let eq = [100.0, 120.0, 90.0, 130.0, 117.0];
        assert!((max_drawdown(&eq) - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_monotonic_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    // ── Benchmark ──

    #[test]
    fn benchmark_scales_to_capital() {
        let b = benchmark_equity(&[50.0, 55.0, 45.0], 100_000.0);
        assert_eq!(b, vec![100_000.0, 110_000.0, 90_000.0]);
        assert!(benchmark_equity(&[], 1.0).is_empty());
    }

    // ── Annual returns ──

    #[test]
    fn annual_returns_chain_year_ends() {
        let dates = [
            d(2022, 3, 1),
            d(2022, 12, 30),
            d(2023, 1, 3),
            d(2023, 12, 29),
            d(2024, 6, 3),
        ];
        let eq = [100.0, 110.0, 108.0, 121.0, 133.1];
        let r = annual_returns(&dates, &eq);
        assert_eq!(r.len(), 3);
        assert_eq!(r[0].0, 2022);
        assert!((r[0].1 - 0.10).abs() < 1e-12);
        // 2023 measured from 2022's last value
        assert!((r[1].1 - 0.10).abs() < 1e-12);
        assert!((r[2].1 - 0.10).abs() < 1e-12);
    }

    #[test]
    fn breakdown_and_last_years() {
        let dates: Vec<NaiveDate> = (2015..2024).map(|y| d(y, 6, 1)).collect();
        let strat: Vec<f64> = (0..9).map(|i| 100.0 + i as f64).collect();
        let bench = vec![100.0; 9];
        let b = annual_breakdown(&dates, &strat, &bench);
        assert_eq!(b.len(), 9);
        assert!(b.iter().all(|a| a.benchmark == 0.0));

        let recent = last_years(&b, SUMMARY_YEARS);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].year, 2019);
        assert_eq!(recent[4].year, 2023);
        assert_eq!(last_years(&b[..2], SUMMARY_YEARS).len(), 2);
    }

    // ── Trade stats ──

    #[test]
    fn trade_stats_counts() {
        let base = ClosedBatch {
            open_date: d(2024, 1, 2),
            close_date: d(2024, 3, 1),
            entry_price: 100.0,
            exit_price: 130.0,
            cost: 1_000.0,
            proceeds: 2_200.0,
            levered_return: 1.2,
            reason: ExitReason::ProfitTake(AgeBucket::Early),
        };
        let loser = ClosedBatch {
            proceeds: 0.0,
            levered_return: -2.0,
            reason: ExitReason::Expiry,
            ..base.clone()
        };
        let stats = TradeStats::compute(&[base, loser]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.winners, 1);
        assert_eq!(stats.expiries, 1);
        assert_eq!(stats.win_rate, 0.5);
        assert!((stats.net_profit - 200.0).abs() < 1e-9);
        assert_eq!(TradeStats::compute(&[]).win_rate, 0.0);
    }

    proptest! {
        #[test]
        fn drawdown_bounded(eq in prop::collection::vec(1.0..1e6_f64, 0..200)) {
            let dd = max_drawdown(&eq);
            prop_assert!(dd <= 0.0);
            prop_assert!(dd > -1.0);
        }

        #[test]
        fn scaled_curve_has_same_metrics(
            eq in prop::collection::vec(1.0..1e6_f64, 2..100),
            k in 0.1..10.0_f64,
        ) {
            let scaled: Vec<f64> = eq.iter().map(|e| e * k).collect();
            prop_assert!((total_return(&eq) - total_return(&scaled)).abs() < 1e-9);
            prop_assert!((max_drawdown(&eq) - max_drawdown(&scaled)).abs() < 1e-9);
        }
    }
}
