//! Save/load of the economy snapshot
//!
//! Features:
//! - Versioned JSON envelope
//! - Range validation on load (rows, levels, balance)
//! - Atomic replace with backup rotation (tmp → save, old save → backup)

pub mod store;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::economy::{BuildingKind, BuildingState, Economy};

pub use store::{JsonFileStore, MemoryStore, SaveStore};

/// Current snapshot format
pub const SAVE_VERSION: u32 = 1;

/// One building in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSave {
    pub kind: BuildingKind,
    pub count: u32,
    pub level: u32,
}

/// Everything needed to restore a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default = "default_version")]
    pub version: u32,
    pub currency: f64,
    pub rows: u32,
    #[serde(default)]
    pub buildings: Vec<BuildingSave>,
}

fn default_version() -> u32 {
    SAVE_VERSION
}

impl SaveData {
    /// Snapshot a ledger; the balance is rounded to whole units
    pub fn from_economy(economy: &Economy) -> Self {
        Self {
            version: SAVE_VERSION,
            currency: economy.currency().round(),
            rows: economy.rows(),
            buildings: economy
                .buildings()
                .map(|(kind, state)| BuildingSave {
                    kind,
                    count: state.count,
                    level: state.level,
                })
                .collect(),
        }
    }

    /// Rebuild a ledger, rejecting out-of-range values
    ///
    /// Kinds missing from the snapshot start fresh.
    pub fn into_economy(self) -> Result<Economy> {
        if self.version > SAVE_VERSION {
            return Err(GameError::InvalidSave(format!(
                "save version {} is newer than supported {}",
                self.version, SAVE_VERSION
            )));
        }
        Economy::from_parts(
            self.currency,
            self.rows,
            self.buildings.into_iter().map(|b| {
                (
                    b.kind,
                    BuildingState {
                        count: b.count,
                        level: b.level,
                    },
                )
            }),
        )
        .map_err(|e| match e {
            GameError::InvalidConfiguration { rows } => {
                GameError::InvalidSave(format!("rows {}", rows))
            }
            other => other,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
