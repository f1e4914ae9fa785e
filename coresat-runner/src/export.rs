//! Reporting and export - JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for run results:
//! - **JSON**: full serialization with schema versioning, plus the summary
//! - **CSV**: daily records and closed satellite batches
//! - **Markdown**: human-readable single-run report
//!
//! Persisted results carry a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use coresat_core::domain::{ClosedBatch, DailyRecord};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Serialize the aggregate summary to pretty JSON.
pub fn export_summary_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(&result.summary()).context("failed to serialize RunSummary")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Daily records with the benchmark alongside.
///
/// Columns: date, total_equity, core_invested, cash_core, sat_invested,
/// cash_sat, cash_buffer, core_shares, open_batches, benchmark
pub fn export_daily_csv(records: &[DailyRecord], benchmark: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "total_equity",
        "core_invested",
        "cash_core",
        "sat_invested",
        "cash_sat",
        "cash_buffer",
        "core_shares",
        "open_batches",
        "benchmark",
    ])?;

    for (i, r) in records.iter().enumerate() {
        let bench = benchmark
            .get(i)
            .map(|b| format!("{b:.2}"))
            .unwrap_or_default();
        wtr.write_record([
            &r.date.to_string(),
            &format!("{:.2}", r.total_equity),
            &format!("{:.2}", r.core_invested),
            &format!("{:.2}", r.cash_core),
            &format!("{:.2}", r.sat_invested),
            &format!("{:.2}", r.cash_sat),
            &format!("{:.2}", r.cash_buffer),
            &format!("{:.6}", r.core_shares),
            &r.open_batches.to_string(),
            &bench,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Closed satellite batches.
///
/// Columns: open_date, close_date, entry_price, exit_price, cost, proceeds,
/// profit, levered_return, reason
pub fn export_trades_csv(trades: &[ClosedBatch]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "open_date",
        "close_date",
        "entry_price",
        "exit_price",
        "cost",
        "proceeds",
        "profit",
        "levered_return",
        "reason",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.open_date.to_string(),
            &t.close_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &format!("{:.6}", t.exit_price),
            &format!("{:.2}", t.cost),
            &format!("{:.2}", t.proceeds),
            &format!("{:.2}", t.profit()),
            &format!("{:.6}", t.levered_return),
            &t.reason.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run.
///
/// Creates `<output_dir>/<first 12 hex of run_id>/` containing:
/// - `result.json` - the full `BacktestResult`
/// - `summary.json` - aggregate metrics and recent annual returns
/// - `daily.csv` - daily records with the benchmark
/// - `trades.csv` - closed satellite batches
/// - `report.md` - Markdown report
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let prefix: String = result.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(prefix);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("result.json", export_json(result)?),
        ("summary.json", export_summary_json(result)?),
        (
            "daily.csv",
            export_daily_csv(&result.simulation.records, &result.benchmark_equity)?,
        ),
        ("trades.csv", export_trades_csv(&result.simulation.trades)?),
        ("report.md", generate_report(result)),
    ];
    for (name, body) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's result.json.
///
/// Rejects newer schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

fn pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

/// Generate a Markdown report for a single run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);
    let run = &result.config.run;
    let params = &result.config.params;

    md.push_str("# Core/Satellite Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Core | {} |\n", run.core_symbol));
    md.push_str(&format!("| Satellite | {} |\n", run.satellite_symbol));
    if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
        md.push_str(&format!("| Period | {start} to {end} |\n"));
    }
    md.push_str(&format!("| Initial Capital | ${:.0} |\n", params.initial_capital));
    md.push_str(&format!(
        "| Weights | {:.0}% core / {:.0}% satellite |\n",
        params.core_weight_pct, params.satellite_weight_pct
    ));
    md.push_str(&format!("| Mode | {} |\n", params.mode));
    if params.active_rebalance_months().is_some() {
        md.push_str(&format!("| Rebalance | {} |\n", params.interval));
    }
    md.push_str(&format!("| Leverage | {:.1}x |\n", params.leverage));
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    if !result.dataset_hash.is_empty() {
        md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    }
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    if let Some(reason) = &result.no_data {
        md.push_str(&format!("**No data:** {reason}\n"));
        return md;
    }

    // Performance
    let m = &result.metrics;
    let b = &result.benchmark_metrics;
    md.push_str("## Performance\n\n");
    md.push_str(&format!(
        "| Metric | Strategy | Buy & Hold {} | Delta |\n",
        run.core_symbol
    ));
    md.push_str("| --- | ---: | ---: | ---: |\n");
    md.push_str(&format!(
        "| Final Equity | ${:.0} | ${:.0} | |\n",
        result.final_equity(),
        result.benchmark_equity.last().copied().unwrap_or(0.0)
    ));
    for (name, s, bm) in [
        ("Total Return", m.total_return, b.total_return),
        ("CAGR", m.cagr, b.cagr),
        ("Max Drawdown", m.max_drawdown, b.max_drawdown),
    ] {
        md.push_str(&format!(
            "| {name} | {} | {} | {} |\n",
            pct(s),
            pct(bm),
            pct(s - bm)
        ));
    }
    md.push('\n');

    // Activity
    let t = &result.trade_stats;
    let sim = &result.simulation;
    md.push_str("## Activity\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Core Installments | {} |\n", sim.installments_made));
    md.push_str(&format!("| Core Purchased | ${:.0} |\n", sim.core_purchased));
    if sim.core_reinvested > 0.0 {
        md.push_str(&format!("| Profit Reinvested in Core | ${:.0} |\n", sim.core_reinvested));
    }
    md.push_str(&format!("| Satellite Batches Closed | {} |\n", t.count));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", t.win_rate * 100.0));
    md.push_str(&format!("| Expired | {} |\n", t.expiries));
    md.push_str(&format!("| Net Satellite Profit | ${:.0} |\n", t.net_profit));
    md.push_str(&format!("| Open at End | {} |\n", sim.open_at_end.len()));
    md.push_str(&format!("| Rebalances | {} |\n", sim.rebalances.len()));
    md.push('\n');

    // Annual breakdown
    if !result.annual_returns.is_empty() {
        md.push_str("## Annual Returns\n\n");
        md.push_str("| Year | Strategy | Benchmark |\n");
        md.push_str("| --- | ---: | ---: |\n");
        for a in &result.annual_returns {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                a.year,
                pct(a.strategy),
                pct(a.benchmark)
            ));
        }
        md.push('\n');
    }

    // Data quality
    if sim.drift_warnings > 0 {
        md.push_str("## Data Quality\n\n");
        md.push_str(&format!(
            "- Cash conservation drift beyond tolerance on {} day(s)\n\n",
            sim.drift_warnings
        ));
    }

    md
}
