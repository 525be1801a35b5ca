//! Bucket reward tables
//!
//! Hand-tuned multipliers per row count, listed edge to edge. Edges pay the
//! most because a unit has to bounce the same way on every row to get there.
//! `ev` is the binomial-weighted average of the row's multipliers and backs
//! the expected-value (AFK) scoring path.

use serde::Serialize;

use crate::consts::MIN_ROWS;
use crate::error::{GameError, Result};
use crate::rows_supported;

/// Fixed-point scale for reward accumulation (1 unit = 1/10000 currency)
pub const REWARD_SCALE: u64 = 10_000;

/// Reward table for one row count
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardTable {
    pub rows: u32,
    pub multipliers: &'static [f64],
    pub ev: f64,
}

const TABLES: [RewardTable; 12] = [
    RewardTable {
        rows: 8,
        multipliers: &[7.0, 3.0, 1.5, 1.1, 0.8, 1.1, 1.5, 3.0, 7.0],
        ev: 1.2703,
    },
    RewardTable {
        rows: 9,
        multipliers: &[8.0, 3.5, 1.7, 1.2, 0.9, 0.9, 1.2, 1.7, 3.5, 8.0],
        ev: 1.2301,
    },
    RewardTable {
        rows: 10,
        multipliers: &[10.0, 4.0, 2.0, 1.4, 1.1, 0.8, 1.1, 1.4, 2.0, 4.0, 10.0],
        ev: 1.2496,
    },
    RewardTable {
        rows: 11,
        multipliers: &[
            12.0, 5.0, 2.5, 1.6, 1.2, 0.9, 0.9, 1.2, 1.6, 2.5, 5.0, 12.0,
        ],
        ev: 1.2503,
    },
    RewardTable {
        rows: 12,
        multipliers: &[
            15.0, 6.0, 3.0, 2.0, 1.4, 1.1, 0.8, 1.1, 1.4, 2.0, 3.0, 6.0, 15.0,
        ],
        ev: 1.2982,
    },
    RewardTable {
        rows: 13,
        multipliers: &[
            18.0, 8.0, 4.0, 2.4, 1.6, 1.2, 0.9, 0.9, 1.2, 1.6, 2.4, 4.0, 8.0, 18.0,
        ],
        ev: 1.3069,
    },
    RewardTable {
        rows: 14,
        multipliers: &[
            22.0, 10.0, 5.0, 3.0, 1.8, 1.3, 1.1, 0.8, 1.1, 1.3, 1.8, 3.0, 5.0, 10.0, 22.0,
        ],
        ev: 1.3171,
    },
    RewardTable {
        rows: 15,
        multipliers: &[
            27.0, 12.0, 6.0, 3.5, 2.1, 1.5, 1.1, 0.9, 0.9, 1.1, 1.5, 2.1, 3.5, 6.0, 12.0, 27.0,
        ],
        ev: 1.2877,
    },
    RewardTable {
        rows: 16,
        multipliers: &[
            33.0, 15.0, 8.0, 4.0, 2.5, 1.7, 1.3, 1.1, 0.8, 1.1, 1.3, 1.7, 2.5, 4.0, 8.0, 15.0,
            33.0,
        ],
        ev: 1.3303,
    },
    RewardTable {
        rows: 17,
        multipliers: &[
            40.0, 18.0, 10.0, 5.0, 3.0, 2.0, 1.4, 1.1, 0.9, 0.9, 1.1, 1.4, 2.0, 3.0, 5.0, 10.0,
            18.0, 40.0,
        ],
        ev: 1.3004,
    },
    RewardTable {
        rows: 18,
        multipliers: &[
            50.0, 22.0, 12.0, 6.0, 3.6, 2.3, 1.6, 1.2, 1.0, 0.8, 1.0, 1.2, 1.6, 2.3, 3.6, 6.0,
            12.0, 22.0, 50.0,
        ],
        ev: 1.2893,
    },
    RewardTable {
        rows: 19,
        multipliers: &[
            60.0, 27.0, 14.0, 7.0, 4.2, 2.6, 1.8, 1.3, 1.1, 0.9, 0.9, 1.1, 1.3, 1.8, 2.6, 4.2,
            7.0, 14.0, 27.0, 60.0,
        ],
        ev: 1.2851,
    },
];

/// Look up the reward table for a row count
pub fn reward_table(rows: u32) -> Result<&'static RewardTable> {
    if !rows_supported(rows) {
        return Err(GameError::InvalidConfiguration { rows });
    }
    Ok(&TABLES[(rows - MIN_ROWS) as usize])
}

impl RewardTable {
    pub fn bucket_count(&self) -> usize {
        self.multipliers.len()
    }

    /// Multiplier for a scoring bucket, `None` if out of range
    pub fn multiplier(&self, bucket: usize) -> Option<f64> {
        self.multipliers.get(bucket).copied()
    }

    /// Multiplier in fixed-point reward units
    pub fn multiplier_units(&self, bucket: usize) -> Option<u64> {
        self.multiplier(bucket).map(to_units)
    }

    /// EV multiplier in fixed-point reward units
    pub fn ev_units(&self) -> u64 {
        to_units(self.ev)
    }
}

/// Convert a currency amount to fixed-point reward units
#[inline]
pub fn to_units(amount: f64) -> u64 {
    (amount * REWARD_SCALE as f64).round() as u64
}

/// Convert fixed-point reward units back to currency
#[inline]
pub fn from_units(units: u64) -> f64 {
    units as f64 / REWARD_SCALE as f64
}
