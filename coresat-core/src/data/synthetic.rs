//! Deterministic synthetic prices for demos and tests.
//!
//! Produces a geometric random walk per symbol, weekdays only. The RNG seed
//! is a BLAKE3 hash of the symbol, so the same symbol always yields the same
//! series.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataSource, PriceProvider};
use crate::domain::{PricePoint, PriceSeries};

/// Random-walk price generator.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    pub start_price: f64,
    /// Mean daily log-return.
    pub drift: f64,
    /// Half-width of the uniform daily return shock. Zero gives a pure drift path.
    pub shock: f64,
    /// Default range when the caller passes no bounds.
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            drift: 0.0004,
            shock: 0.025,
            default_start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            default_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        }
    }
}

impl SyntheticProvider {
    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut points = Vec::new();
        let mut price = self.start_price;
        let mut current = start;
        let half_width = self.shock.abs();

        while current <= end {
            let weekday = current.weekday();
            if weekday != Weekday::Sat && weekday != Weekday::Sun {
                let shock: f64 = rng.gen_range(-half_width..=half_width);
                price *= (self.drift + shock).exp();
                points.push(PricePoint::new(current, price));
            }
            current += Duration::days(1);
        }

        points
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, DataError> {
        let start = start.unwrap_or(self.default_start);
        let end = end.unwrap_or(self.default_end);
        Ok(PriceSeries::new(symbol, self.generate(symbol, start, end))?)
    }
}
