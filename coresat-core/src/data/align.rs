//! Two-ticker time alignment.
//!
//! The engine walks both tickers on one date axis. Only dates present in both
//! series are kept; there is no forward-fill of tradable prices.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{PriceSeries, SeriesError, Symbol};

/// Core and satellite closes on a common, strictly increasing date axis.
///
/// Only constructible from validated `PriceSeries`, so every close is
/// positive and finite. Serialize-only for the same reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPrices {
    pub core_symbol: Symbol,
    pub satellite_symbol: Symbol,
    dates: Vec<NaiveDate>,
    core: Vec<f64>,
    satellite: Vec<f64>,
}

impl AlignedPrices {
    /// Validate and align parallel slices in one step. Mostly for tests and
    /// in-memory callers.
    pub fn from_closes(
        dates: &[NaiveDate],
        core: &[f64],
        satellite: &[f64],
    ) -> Result<Self, SeriesError> {
        let core = PriceSeries::from_closes("CORE", dates, core)?;
        let satellite = PriceSeries::from_closes("SAT", dates, satellite)?;
        Ok(align_pair(&core, &satellite))
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn core(&self) -> &[f64] {
        &self.core
    }

    pub fn satellite(&self) -> &[f64] {
        &self.satellite
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Deterministic BLAKE3 hash over symbols, dates and closes.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.core_symbol.as_bytes());
        hasher.update(self.satellite_symbol.as_bytes());
        for ((date, core), sat) in self.dates.iter().zip(&self.core).zip(&self.satellite) {
            hasher.update(date.to_string().as_bytes());
            hasher.update(&core.to_le_bytes());
            hasher.update(&sat.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Align two series on the intersection of their dates.
pub fn align_pair(core: &PriceSeries, satellite: &PriceSeries) -> AlignedPrices {
    let sat_by_date: HashMap<NaiveDate, f64> = satellite
        .points()
        .iter()
        .map(|p| (p.date, p.close))
        .collect();

    let mut dates = Vec::with_capacity(core.len().min(satellite.len()));
    let mut core_closes = Vec::with_capacity(dates.capacity());
    let mut sat_closes = Vec::with_capacity(dates.capacity());

    // Core points are already strictly increasing, so the output is too.
    for p in core.points() {
        if let Some(&sat_close) = sat_by_date.get(&p.date) {
            dates.push(p.date);
            core_closes.push(p.close);
            sat_closes.push(sat_close);
        }
    }

    AlignedPrices {
        core_symbol: core.symbol().to_string(),
        satellite_symbol: satellite.symbol().to_string(),
        dates,
        core: core_closes,
        satellite: sat_closes,
    }
}
