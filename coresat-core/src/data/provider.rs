//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (CSV files, synthetic
//! generators, anything a caller wires in) so the runner can swap
//! implementations and mock them in tests.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceSeries, SeriesError};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed price data for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
    InMemory,
}

/// Trait for price sources.
///
/// Implementations return adjusted closes for `[start, end]`. An unknown
/// symbol is `DataError::SymbolNotFound`; the caller decides whether that
/// is fatal.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, DataError>;
}

/// Provider over series already held in memory. Used by tests and callers
/// that fetch prices themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }
}

impl PriceProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn source(&self) -> DataSource {
        DataSource::InMemory
    }

    fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, DataError> {
        self.series
            .get(symbol)
            .map(|s| s.slice(start, end))
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn in_memory_slices_and_reports_missing() {
        let series =
            PriceSeries::from_closes("VOO", &[d(2), d(3), d(4)], &[1.0, 2.0, 3.0]).unwrap();
        let provider = InMemoryProvider::new().with_series(series);

        let sliced = provider.fetch("VOO", Some(d(3)), None).unwrap();
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.first_date(), Some(d(3)));

        assert!(matches!(
            provider.fetch("QQQ", None, None),
            Err(DataError::SymbolNotFound { .. })
        ));
        assert_eq!(provider.source(), DataSource::InMemory);
    }
}
