//! Trend filter - gates all purchases by the core ticker's long-term regime.
//!
//! Day `t` is bullish when the core close on day `t-1` is strictly above the
//! SMA on day `t-1`. The one-day lag keeps day `t`'s close out of day `t`'s
//! decisions.

use crate::indicators::Sma;
use crate::params::TrendFilterConfig;

/// Regime of a simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Bullish,
    Bearish,
}

impl Regime {
    pub fn is_bullish(&self) -> bool {
        matches!(self, Regime::Bullish)
    }
}

/// Precomputed SMA regime classifier over the core closes.
#[derive(Debug, Clone)]
pub struct TrendFilter {
    enabled: bool,
    closes: Vec<f64>,
    sma: Vec<f64>,
}

impl TrendFilter {
    pub fn new(core_closes: &[f64], config: &TrendFilterConfig) -> Self {
        let sma = if config.enabled {
            Sma::new(config.window.max(1)).compute(core_closes)
        } else {
            Vec::new()
        };
        Self {
            enabled: config.enabled,
            closes: core_closes.to_vec(),
            sma,
        }
    }

    /// Classify day `t`.
    ///
    /// Bullish when the filter is disabled, when `t == 0`, or while the SMA
    /// on day `t-1` is still undefined.
    pub fn regime(&self, t: usize) -> Regime {
        if !self.enabled || t == 0 {
            return Regime::Bullish;
        }
        let prev = t - 1;
        match (self.closes.get(prev), self.sma.get(prev)) {
            (Some(&close), Some(&sma)) if !sma.is_nan() => {
                if close > sma {
                    Regime::Bullish
                } else {
                    Regime::Bearish
                }
            }
            _ => Regime::Bullish,
        }
    }

    pub fn is_bullish(&self, t: usize) -> bool {
        self.regime(t).is_bullish()
    }
}
