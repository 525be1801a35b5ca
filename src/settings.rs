//! Runtime settings
//!
//! Persisted as JSON next to the save file. Missing fields take their
//! defaults, so older settings files keep loading.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::consts::{AUTOSAVE_INTERVAL_MS, RECONCILE_INTERVAL_MS};
use crate::error::Result;

/// Bounds for the reconciliation cadence
pub const RECONCILE_RANGE_MS: (f64, f64) = (10.0, 500.0);
/// Bounds for the autosave cadence
pub const AUTOSAVE_RANGE_MS: (f64, f64) = (10_000.0, 3_600_000.0);

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; `None` picks one from the clock at startup
    pub seed: Option<u64>,
    /// How often buffered rewards are credited to the balance
    pub reconcile_interval_ms: f64,
    /// How often the economy is written to disk
    pub autosave_interval_ms: f64,
    /// Score spawns at the board's expected value instead of simulating them
    pub afk: bool,
    /// Where the economy snapshot lives
    pub save_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            reconcile_interval_ms: RECONCILE_INTERVAL_MS,
            autosave_interval_ms: AUTOSAVE_INTERVAL_MS,
            afk: false,
            save_path: "clinks_save.json".to_string(),
        }
    }
}

impl Settings {
    /// Clamp cadences into their supported ranges
    pub fn sanitized(mut self) -> Self {
        self.reconcile_interval_ms = clamp_or_default(
            self.reconcile_interval_ms,
            RECONCILE_RANGE_MS,
            RECONCILE_INTERVAL_MS,
        );
        self.autosave_interval_ms = clamp_or_default(
            self.autosave_interval_ms,
            AUTOSAVE_RANGE_MS,
            AUTOSAVE_INTERVAL_MS,
        );
        self
    }

    /// The configured seed, or one taken from the system clock
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        })
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        Ok(settings.sanitized())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

fn clamp_or_default(value: f64, (min, max): (f64, f64), default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}
