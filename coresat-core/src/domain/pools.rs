//! CashPools - the three uninvested cash balances of a simulation.

use serde::{Deserialize, Serialize};

/// Uninvested cash, split by owner.
///
/// `core` belongs to the core sleeve, `satellite` to the satellite sleeve and
/// `buffer` is unallocated residual that moves between sleeves during
/// rebalancing. All three stay nonnegative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CashPools {
    pub core: f64,
    pub satellite: f64,
    pub buffer: f64,
}

impl CashPools {
    /// Split starting capital by sleeve weight (percent). The remainder goes
    /// to the buffer.
    pub fn split(initial_capital: f64, core_weight_pct: f64, satellite_weight_pct: f64) -> Self {
        let core = initial_capital * core_weight_pct / 100.0;
        let satellite = initial_capital * satellite_weight_pct / 100.0;
        Self {
            core,
            satellite,
            buffer: initial_capital - core - satellite,
        }
    }

    pub fn total(&self) -> f64 {
        self.core + self.satellite + self.buffer
    }

    /// True if no pool is below `-tolerance`.
    pub fn is_nonnegative(&self, tolerance: f64) -> bool {
        self.core >= -tolerance && self.satellite >= -tolerance && self.buffer >= -tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_default_weights() {
        let pools = CashPools::split(100_000.0, 70.0, 30.0);
        assert_eq!(pools.core, 70_000.0);
        assert_eq!(pools.satellite, 30_000.0);
        assert_eq!(pools.buffer, 0.0);
        assert_eq!(pools.total(), 100_000.0);
    }

    #[test]
    fn split_leaves_remainder_in_buffer() {
        let pools = CashPools::split(100_000.0, 70.0, 25.0);
        assert!((pools.buffer - 5_000.0).abs() < 1e-9);
        assert!((pools.total() - 100_000.0).abs() < 1e-9);
    }

    #[test]
    fn nonnegative_check_uses_tolerance() {
        let pools = CashPools {
            core: -1e-12,
            satellite: 0.0,
            buffer: 5.0,
        };
        assert!(pools.is_nonnegative(1e-9));
        assert!(!pools.is_nonnegative(0.0));
    }
}
