//! SimulationParameters - the immutable configuration of one run.
//!
//! Every field has a default so a TOML `[params]` table only needs to name
//! the values it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capital-management regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceMode {
    /// Satellite profits are swept into the core sleeve; core is never sold.
    #[default]
    Snowball,
    /// Both sleeves are periodically forced back to their target weights.
    FixedWeight,
}

impl std::fmt::Display for RebalanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebalanceMode::Snowball => write!(f, "snowball"),
            RebalanceMode::FixedWeight => write!(f, "fixed_weight"),
        }
    }
}

impl std::str::FromStr for RebalanceMode {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "snowball" => Ok(Self::Snowball),
            "fixed_weight" | "fixed" => Ok(Self::FixedWeight),
            other => Err(ParamsError::UnknownMode(other.to_string())),
        }
    }
}

/// How often the fixed-weight regime rebalances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceInterval {
    #[default]
    None,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl RebalanceInterval {
    /// Interval length in calendar months, `None` when rebalancing is off.
    pub fn months(&self) -> Option<u32> {
        match self {
            RebalanceInterval::None => None,
            RebalanceInterval::Quarterly => Some(3),
            RebalanceInterval::SemiAnnual => Some(6),
            RebalanceInterval::Annual => Some(12),
        }
    }
}

impl std::fmt::Display for RebalanceInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RebalanceInterval::None => "none",
            RebalanceInterval::Quarterly => "quarterly",
            RebalanceInterval::SemiAnnual => "semi_annual",
            RebalanceInterval::Annual => "annual",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RebalanceInterval {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "quarterly" => Ok(Self::Quarterly),
            "semi_annual" | "semiannual" => Ok(Self::SemiAnnual),
            "annual" | "yearly" => Ok(Self::Annual),
            other => Err(ParamsError::UnknownInterval(other.to_string())),
        }
    }
}

/// Trend filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFilterConfig {
    pub enabled: bool,
    /// Moving-average lookback in trading days.
    pub window: usize,
}

impl Default for TrendFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: 200,
        }
    }
}

/// Profit-take thresholds (percent of leveraged return) by holding age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitTargets {
    /// 0 to 4 months.
    pub early_pct: f64,
    /// Over 4 up to 6 months.
    pub middle_pct: f64,
    /// Over 6 up to 9 months.
    pub late_pct: f64,
}

impl Default for ProfitTargets {
    fn default() -> Self {
        Self {
            early_pct: 50.0,
            middle_pct: 30.0,
            late_pct: 10.0,
        }
    }
}

/// Invalid parameter values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("{name} must be within 0..=100, got {value}")]
    WeightOutOfRange { name: &'static str, value: f64 },

    #[error("core + satellite weights exceed 100% ({0})")]
    WeightsExceedTotal(f64),

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be nonnegative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("trend filter window must be >= 1")]
    ZeroWindow,

    #[error("unknown rebalance mode '{0}' (expected snowball or fixed_weight)")]
    UnknownMode(String),

    #[error("unknown rebalance interval '{0}' (expected none, quarterly, semi_annual or annual)")]
    UnknownInterval(String),
}

/// Immutable per-run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub initial_capital: f64,
    pub core_weight_pct: f64,
    pub satellite_weight_pct: f64,
    /// Number of scheduled core installments.
    pub dca_installments: u32,
    /// Amount converted into core shares per installment. Unset means the
    /// core allocation split evenly over `dca_installments`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_amount: Option<f64>,
    pub trend_filter: TrendFilterConfig,
    /// Linear multiplier applied to satellite returns.
    pub leverage: f64,
    /// Single-day satellite drop (percent) that qualifies an entry.
    pub drop_threshold_pct: f64,
    /// Size of each satellite entry (percent of capital or equity by mode).
    pub batch_pct: f64,
    pub profit_targets: ProfitTargets,
    pub mode: RebalanceMode,
    /// Only meaningful under `RebalanceMode::FixedWeight`.
    pub interval: RebalanceInterval,
    /// Minimum core surplus reinvested by the snowball sweep.
    pub reinvest_threshold: f64,
    /// Relative tolerance for the per-day cash conservation check.
    pub drift_tolerance: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::with_capital(100_000.0)
    }
}

impl SimulationParameters {
    /// Defaults for a given starting capital.
    pub fn with_capital(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            core_weight_pct: 70.0,
            satellite_weight_pct: 30.0,
            dca_installments: 12,
            installment_amount: None,
            trend_filter: TrendFilterConfig::default(),
            leverage: 4.0,
            drop_threshold_pct: 1.5,
            batch_pct: 3.0,
            profit_targets: ProfitTargets::default(),
            mode: RebalanceMode::Snowball,
            interval: RebalanceInterval::None,
            reinvest_threshold: 100.0,
            drift_tolerance: 1e-6,
        }
    }

    /// Cash per scheduled installment: the explicit amount if set, otherwise
    /// the core allocation over the installment count.
    pub fn installment(&self) -> f64 {
        match self.installment_amount {
            Some(amount) => amount,
            None if self.dca_installments == 0 => 0.0,
            None => {
                self.initial_capital * self.core_weight_pct / 100.0 / self.dca_installments as f64
            }
        }
    }

    pub fn with_mode(mut self, mode: RebalanceMode, interval: RebalanceInterval) -> Self {
        self.mode = mode;
        self.interval = interval;
        self
    }

    pub fn core_weight(&self) -> f64 {
        self.core_weight_pct / 100.0
    }

    pub fn satellite_weight(&self) -> f64 {
        self.satellite_weight_pct / 100.0
    }

    /// Rebalance interval in months, or `None` when the allocator is inactive.
    pub fn active_rebalance_months(&self) -> Option<u32> {
        match self.mode {
            RebalanceMode::FixedWeight => self.interval.months(),
            RebalanceMode::Snowball => None,
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(ParamsError::NonPositiveCapital(self.initial_capital));
        }
        for (name, value) in [
            ("core_weight_pct", self.core_weight_pct),
            ("satellite_weight_pct", self.satellite_weight_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ParamsError::WeightOutOfRange { name, value });
            }
        }
        let total = self.core_weight_pct + self.satellite_weight_pct;
        if total > 100.0 + 1e-9 {
            return Err(ParamsError::WeightsExceedTotal(total));
        }
        for (name, value) in [
            ("leverage", self.leverage),
            ("batch_pct", self.batch_pct),
            ("drift_tolerance", self.drift_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParamsError::NonPositive { name, value });
            }
        }
        for (name, value) in [
            ("installment_amount", self.installment()),
            ("drop_threshold_pct", self.drop_threshold_pct),
            ("reinvest_threshold", self.reinvest_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamsError::Negative { name, value });
            }
        }
        for (name, value) in [
            ("profit_targets.early_pct", self.profit_targets.early_pct),
            ("profit_targets.middle_pct", self.profit_targets.middle_pct),
            ("profit_targets.late_pct", self.profit_targets.late_pct),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::Negative { name, value });
            }
        }
        if self.trend_filter.window == 0 {
            return Err(ParamsError::ZeroWindow);
        }
        Ok(())
    }
}
