//! Satellite batches - leveraged synthetic positions and their exits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days per holding month used by every age-based rule.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Loss floor: a batch can lose at most its committed cost.
pub const LOSS_FLOOR: f64 = -1.0;

/// One open satellite position.
///
/// `cost` is the capital committed, not the leveraged notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SatelliteBatch {
    pub open_date: NaiveDate,
    pub entry_price: f64,
    pub cost: f64,
}

impl SatelliteBatch {
    pub fn new(open_date: NaiveDate, entry_price: f64, cost: f64) -> Self {
        Self {
            open_date,
            entry_price,
            cost,
        }
    }

    /// Holding age in 30-day months.
    pub fn age_months(&self, today: NaiveDate) -> f64 {
        (today - self.open_date).num_days() as f64 / DAYS_PER_MONTH
    }

    /// Unclamped leveraged return: `leverage * (price - entry) / entry`.
    pub fn levered_return(&self, price: f64, leverage: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * leverage
    }

    /// Mark-to-market value with the leveraged return floored at -100%.
    pub fn marked_value(&self, price: f64, leverage: f64) -> f64 {
        self.cost * (1.0 + self.levered_return(price, leverage).max(LOSS_FLOOR))
    }
}

/// Holding-age bucket used to pick the profit target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBucket {
    /// 0 to 4 months.
    Early,
    /// Over 4 up to 6 months.
    Middle,
    /// Over 6 up to 9 months.
    Late,
}

impl AgeBucket {
    /// Bucket for an age in months, or `None` past the 9-month expiry.
    pub fn for_age(age_months: f64) -> Option<Self> {
        if age_months <= 4.0 {
            Some(Self::Early)
        } else if age_months <= 6.0 {
            Some(Self::Middle)
        } else if age_months <= 9.0 {
            Some(Self::Late)
        } else {
            None
        }
    }
}

/// Why a batch was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "bucket", rename_all = "snake_case")]
pub enum ExitReason {
    /// Held beyond 9 months; closed regardless of P&L.
    Expiry,
    /// Leveraged return exceeded the target of its age bucket.
    ProfitTake(AgeBucket),
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Expiry => write!(f, "expiry"),
            ExitReason::ProfitTake(AgeBucket::Early) => write!(f, "profit_take_0_4"),
            ExitReason::ProfitTake(AgeBucket::Middle) => write!(f, "profit_take_5_6"),
            ExitReason::ProfitTake(AgeBucket::Late) => write!(f, "profit_take_7_9"),
        }
    }
}

/// A batch that has been closed, with its realized outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedBatch {
    pub open_date: NaiveDate,
    pub close_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub cost: f64,
    /// `cost * (1 + max(levered_return, -1))`.
    pub proceeds: f64,
    /// Unclamped leveraged return at exit.
    pub levered_return: f64,
    pub reason: ExitReason,
}

impl ClosedBatch {
    pub fn profit(&self) -> f64 {
        self.proceeds - self.cost
    }

    pub fn is_winner(&self) -> bool {
        self.profit() > 0.0
    }
}
