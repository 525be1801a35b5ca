//! Error taxonomy
//!
//! `InvalidConfiguration` is fatal at construction. The purchase failures are
//! expected outcomes that the caller surfaces as a rejected action.

use crate::sim::economy::BuildingKind;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("unsupported row count {rows} (expected 8..=19)")]
    InvalidConfiguration { rows: u32 },
    #[error("insufficient funds: need {cost}, have {available}")]
    InsufficientFunds { cost: f64, available: f64 },
    #[error("{kind} is already at the maximum level")]
    MaxLevelReached { kind: BuildingKind },
    #[error("board already has the maximum number of rows")]
    RowLimitReached,
    #[error("invalid save data: {0}")]
    InvalidSave(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameError {
    /// Expected, non-fatal rejections of a player action
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GameError::InsufficientFunds { .. }
                | GameError::MaxLevelReached { .. }
                | GameError::RowLimitReached
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
