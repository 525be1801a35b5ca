//! Clinks - An idle plinko board
//!
//! Core modules:
//! - `sim`: Deterministic simulation (layout, economy, production, scoring)
//! - `persistence`: Save/load of the economy snapshot
//! - `settings`: Runtime configuration
//! - `stats`: Per-bucket counters for the results HUD

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod stats;

pub use error::{GameError, Result};
pub use settings::Settings;
pub use stats::BucketStats;

/// Game configuration constants
pub mod consts {
    /// Fixed display width the whole board scales to (has a center pixel)
    pub const BOARD_WIDTH: f32 = 449.0;

    /// Supported row counts
    pub const MIN_ROWS: u32 = 8;
    pub const MAX_ROWS: u32 = 19;

    /// Building level cap
    pub const MAX_LEVEL: u32 = 25;

    /// Fixed simulation timestep (120 Hz), in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default reconciliation cadence
    pub const RECONCILE_INTERVAL_MS: f64 = 100.0;
    /// Default autosave cadence (5 minutes)
    pub const AUTOSAVE_INTERVAL_MS: f64 = 300_000.0;
}

/// Whether `rows` is a supported board size
#[inline]
pub fn rows_supported(rows: u32) -> bool {
    (consts::MIN_ROWS..=consts::MAX_ROWS).contains(&rows)
}
