//! PriceSeries - a validated, date-ordered close series for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One adjusted close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Data-integrity failures detected while building a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("{symbol}: close on {date} is not a positive finite number ({close})")]
    InvalidClose {
        symbol: String,
        date: NaiveDate,
        close: f64,
    },

    #[error("{symbol}: dates must be strictly increasing ({previous} then {date})")]
    NonIncreasingDate {
        symbol: String,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("{symbol}: {dates} dates but {closes} closes")]
    LengthMismatch {
        symbol: String,
        dates: usize,
        closes: usize,
    },
}

/// Adjusted closes for a single ticker, strictly increasing by date.
///
/// Every close is positive and finite. A zero or negative close would make
/// leveraged returns undefined, so it is rejected here rather than inside the
/// engine. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

#[derive(Deserialize)]
struct RawSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl TryFrom<RawSeries> for PriceSeries {
    type Error = SeriesError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        Self::new(raw.symbol, raw.points)
    }
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        let mut previous: Option<NaiveDate> = None;
        for p in &points {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(SeriesError::InvalidClose {
                    symbol,
                    date: p.date,
                    close: p.close,
                });
            }
            if let Some(prev) = previous {
                if p.date <= prev {
                    return Err(SeriesError::NonIncreasingDate {
                        symbol,
                        previous: prev,
                        date: p.date,
                    });
                }
            }
            previous = Some(p.date);
        }
        Ok(Self { symbol, points })
    }

    /// Build from parallel date/close slices of equal length.
    pub fn from_closes(
        symbol: impl Into<String>,
        dates: &[NaiveDate],
        closes: &[f64],
    ) -> Result<Self, SeriesError> {
        if dates.len() != closes.len() {
            return Err(SeriesError::LengthMismatch {
                symbol: symbol.into(),
                dates: dates.len(),
                closes: closes.len(),
            });
        }
        let points = dates
            .iter()
            .zip(closes)
            .map(|(&date, &close)| PricePoint::new(date, close))
            .collect();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Keep only observations within `[start, end]` (either bound optional).
    pub fn slice(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let points = self
            .points
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s) && end.map_or(true, |e| p.date <= e))
            .copied()
            .collect();
        Self {
            symbol: self.symbol.clone(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn accepts_valid_series() {
        let s = PriceSeries::from_closes("VOO", &[d(2), d(3), d(4)], &[100.0, 101.0, 99.5]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.symbol(), "VOO");
        assert_eq!(s.first_date(), Some(d(2)));
        assert_eq!(s.last_date(), Some(d(4)));
    }

    #[test]
    fn rejects_zero_close() {
        let err = PriceSeries::from_closes("VOO", &[d(2), d(3)], &[100.0, 0.0]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidClose { close, .. } if close == 0.0));
    }

    #[test]
    fn rejects_negative_and_nan_close() {
        assert!(PriceSeries::from_closes("VOO", &[d(2)], &[-1.0]).is_err());
        assert!(PriceSeries::from_closes("VOO", &[d(2)], &[f64::NAN]).is_err());
    }

    #[test]
    fn rejects_duplicate_and_unordered_dates() {
        let dup = PriceSeries::from_closes("QQQ", &[d(2), d(2)], &[1.0, 1.0]);
        assert!(matches!(dup, Err(SeriesError::NonIncreasingDate { .. })));
        let back = PriceSeries::from_closes("QQQ", &[d(3), d(2)], &[1.0, 1.0]);
        assert!(back.is_err());
    }

    #[test]
    fn empty_series_is_valid() {
        let s = PriceSeries::new("QQQ", vec![]).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.first_date(), None);
    }

    #[test]
    fn slice_is_inclusive() {
        let s = PriceSeries::from_closes("VOO", &[d(2), d(3), d(4), d(5)], &[1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let cut = s.slice(Some(d(3)), Some(d(4)));
        assert_eq!(cut.len(), 2);
        assert_eq!(cut.points()[0].close, 2.0);
        assert_eq!(s.slice(None, Some(d(2))).len(), 1);
    }

    #[test]
    fn rejects_mismatched_slices() {
        let err = PriceSeries::from_closes("VOO", &[d(2), d(3)], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::LengthMismatch {
                symbol: "VOO".into(),
                dates: 2,
                closes: 1,
            }
        );
    }

    #[test]
    fn deserialize_runs_validation() {
        let ok = r#"{"symbol":"VOO","points":[{"date":"2024-01-02","close":1.0}]}"#;
        assert_eq!(serde_json::from_str::<PriceSeries>(ok).unwrap().len(), 1);

        let bad = r#"{"symbol":"VOO","points":[{"date":"2024-01-02","close":-1.0}]}"#;
        assert!(serde_json::from_str::<PriceSeries>(bad).is_err());
    }
}
