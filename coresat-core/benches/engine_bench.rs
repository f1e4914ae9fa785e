//! Criterion benchmarks for the simulation hot paths.
//!
//! Benchmarks:
//! 1. Full simulation over synthetic history, both modes
//! 2. Trend filter precompute (SMA 200)
//! 3. Satellite book exit pass with many open batches

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::NaiveDate;
use coresat_core::components::{EntrySignal, SatellitePositionBook, TrendFilter};
use coresat_core::data::{align_pair, SyntheticProvider};
use coresat_core::domain::{CashPools, PriceSeries};
use coresat_core::params::{RebalanceInterval, RebalanceMode, TrendFilterConfig};
use coresat_core::{run_simulation, AlignedPrices, SimulationParameters};

// ── Helpers ──────────────────────────────────────────────────────────

fn synthetic_pair(years: i32) -> AlignedPrices {
    let gen = SyntheticProvider::default();
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2000 + years, 12, 31).unwrap();
    let core = PriceSeries::new("CORE", gen.generate("CORE", start, end)).unwrap();
    let sat = PriceSeries::new("SAT", gen.generate("SAT", start, end)).unwrap();
    align_pair(&core, &sat)
}

// ── 1. Simulation loop ───────────────────────────────────────────────

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_simulation");
    for years in [5, 20] {
        let prices = synthetic_pair(years);
        let snowball = SimulationParameters::default();
        let fixed = SimulationParameters::default()
            .with_mode(RebalanceMode::FixedWeight, RebalanceInterval::Quarterly);

        group.bench_with_input(BenchmarkId::new("snowball", years), &prices, |b, p| {
            b.iter(|| run_simulation(black_box(p), black_box(&snowball)))
        });
        group.bench_with_input(BenchmarkId::new("fixed_weight", years), &prices, |b, p| {
            b.iter(|| run_simulation(black_box(p), black_box(&fixed)))
        });
    }
    group.finish();
}

// ── 2. Trend filter ──────────────────────────────────────────────────

fn bench_trend_filter(c: &mut Criterion) {
    let prices = synthetic_pair(20);
    let config = TrendFilterConfig::default();
    c.bench_function("trend_filter_sma200", |b| {
        b.iter(|| TrendFilter::new(black_box(prices.core()), &config))
    });
}

// ── 3. Exit pass ─────────────────────────────────────────────────────

fn bench_exit_pass(c: &mut Criterion) {
    let mut params = SimulationParameters::default();
    params.batch_pct = 0.1;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    c.bench_function("exit_pass_300_batches", |b| {
        b.iter_batched(
            || {
                let mut book = SatellitePositionBook::new(&params);
                let mut pools = CashPools::split(100_000.0, 70.0, 30.0);
                for i in 0..300 {
                    let signal = EntrySignal {
                        date: start + chrono::Duration::days(i % 120),
                        price: 90.0 + (i % 20) as f64,
                        prev_price: 200.0,
                        bullish: true,
                        equity: 100_000.0,
                    };
                    book.entry_pass(&signal, &mut pools);
                }
                (book, pools)
            },
            |(mut book, mut pools)| book.exit_pass(today, black_box(104.0), &mut pools),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_simulation, bench_trend_filter, bench_exit_pass);
criterion_main!(benches);
