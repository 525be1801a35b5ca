//! Economy ledger
//!
//! Owns the currency balance, the row count and every building's count and
//! level. All costs follow one geometric curve, `floor(base * scale^amount)`.
//! Every mutation validates first and applies second, so a rejected purchase
//! leaves the ledger untouched and the balance can never go negative.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LEVEL, MAX_ROWS, MIN_ROWS};
use crate::error::{GameError, Result};
use crate::rows_supported;

/// Building types that spawn units automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Cursor,
    Mine,
    Factory,
    Farm,
    NuclearPlant,
    CryptoMiner,
    BallPit,
}

impl BuildingKind {
    /// Every kind, in shop order
    pub const ALL: [BuildingKind; 7] = [
        BuildingKind::Cursor,
        BuildingKind::Mine,
        BuildingKind::Factory,
        BuildingKind::Farm,
        BuildingKind::NuclearPlant,
        BuildingKind::CryptoMiner,
        BuildingKind::BallPit,
    ];

    pub fn index(self) -> usize {
        match self {
            BuildingKind::Cursor => 0,
            BuildingKind::Mine => 1,
            BuildingKind::Factory => 2,
            BuildingKind::Farm => 3,
            BuildingKind::NuclearPlant => 4,
            BuildingKind::CryptoMiner => 5,
            BuildingKind::BallPit => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingKind::Cursor => "Cursor",
            BuildingKind::Mine => "Mine",
            BuildingKind::Factory => "Factory",
            BuildingKind::Farm => "Farm",
            BuildingKind::NuclearPlant => "Nuclear Plant",
            BuildingKind::CryptoMiner => "Crypto Miner",
            BuildingKind::BallPit => "Ball Pit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "cursor" | "cursors" => Some(BuildingKind::Cursor),
            "mine" | "mines" => Some(BuildingKind::Mine),
            "factory" | "factories" => Some(BuildingKind::Factory),
            "farm" | "farms" => Some(BuildingKind::Farm),
            "nuclearplant" | "nuclearplants" => Some(BuildingKind::NuclearPlant),
            "cryptominer" | "cryptominers" => Some(BuildingKind::CryptoMiner),
            "ballpit" | "ballpits" => Some(BuildingKind::BallPit),
            _ => None,
        }
    }

    /// Price of the first unit
    pub fn base_cost(&self) -> f64 {
        match self {
            BuildingKind::Cursor => 10.0,
            BuildingKind::Mine => 100.0,
            BuildingKind::Factory => 1_100.0,
            BuildingKind::Farm => 12_000.0,
            BuildingKind::NuclearPlant => 130_000.0,
            BuildingKind::CryptoMiner => 1_400_000.0,
            BuildingKind::BallPit => 20_000_000.0,
        }
    }

    /// Units spawned per second by a single building
    pub fn production_rate(&self) -> f64 {
        match self {
            BuildingKind::Cursor => 0.1,
            BuildingKind::Mine => 1.0,
            BuildingKind::Factory => 8.0,
            BuildingKind::Farm => 47.0,
            BuildingKind::NuclearPlant => 260.0,
            BuildingKind::CryptoMiner => 1_400.0,
            BuildingKind::BallPit => 7_800.0,
        }
    }

    /// Growth factor applied per building already owned
    pub fn cost_scale(&self) -> f64 {
        match self {
            BuildingKind::Cursor
            | BuildingKind::Mine
            | BuildingKind::Factory
            | BuildingKind::Farm
            | BuildingKind::NuclearPlant
            | BuildingKind::CryptoMiner
            | BuildingKind::BallPit => 1.15,
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a cost is being computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostKey {
    Building(BuildingKind),
    Row,
    LevelUpgrade,
}

impl CostKey {
    pub fn base_cost(&self) -> f64 {
        match self {
            CostKey::Building(kind) => kind.base_cost(),
            CostKey::Row => 10_000.0,
            CostKey::LevelUpgrade => 10_000.0,
        }
    }

    pub fn cost_scale(&self) -> f64 {
        match self {
            CostKey::Building(kind) => kind.cost_scale(),
            CostKey::Row => 2.1,
            CostKey::LevelUpgrade => 2.4,
        }
    }
}

/// `floor(base * scale^amount)` where `amount` is what is already owned
pub fn cost(key: CostKey, amount: u32) -> f64 {
    (key.base_cost() * key.cost_scale().powf(amount as f64)).floor()
}

/// Count and level of one building kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingState {
    pub count: u32,
    pub level: u32,
}

impl Default for BuildingState {
    fn default() -> Self {
        Self { count: 0, level: 1 }
    }
}

/// The session's ledger
#[derive(Debug, Clone, PartialEq)]
pub struct Economy {
    currency: f64,
    rows: u32,
    buildings: [BuildingState; 7],
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            currency: 0.0,
            rows: MIN_ROWS,
            buildings: [BuildingState::default(); 7],
        }
    }
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from raw values, rejecting anything out of range
    pub fn from_parts(
        currency: f64,
        rows: u32,
        buildings: impl IntoIterator<Item = (BuildingKind, BuildingState)>,
    ) -> Result<Self> {
        if !currency.is_finite() || currency < 0.0 {
            return Err(GameError::InvalidSave(format!("currency {}", currency)));
        }
        if !rows_supported(rows) {
            return Err(GameError::InvalidConfiguration { rows });
        }
        let mut economy = Self {
            currency,
            rows,
            ..Self::default()
        };
        for (kind, state) in buildings {
            if !(1..=MAX_LEVEL).contains(&state.level) {
                return Err(GameError::InvalidSave(format!(
                    "{} level {}",
                    kind, state.level
                )));
            }
            economy.buildings[kind.index()] = state;
        }
        Ok(economy)
    }

    pub fn currency(&self) -> f64 {
        self.currency
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn building(&self, kind: BuildingKind) -> BuildingState {
        self.buildings[kind.index()]
    }

    pub fn buildings(&self) -> impl Iterator<Item = (BuildingKind, BuildingState)> + '_ {
        BuildingKind::ALL.iter().map(|&k| (k, self.building(k)))
    }

    /// Price of the next building of `kind`
    pub fn building_cost(&self, kind: BuildingKind) -> f64 {
        cost(CostKey::Building(kind), self.building(kind).count)
    }

    /// Price of the next level of `kind`, `None` at the cap
    pub fn level_cost(&self, kind: BuildingKind) -> Option<f64> {
        let level = self.building(kind).level;
        (level < MAX_LEVEL).then(|| cost(CostKey::LevelUpgrade, level))
    }

    /// Price of the next row, `None` at the cap
    pub fn row_cost(&self) -> Option<f64> {
        (self.rows < MAX_ROWS).then(|| cost(CostKey::Row, self.rows - MIN_ROWS))
    }

    /// Add currency (reconciler credits, loaded balances)
    pub fn credit(&mut self, amount: f64) {
        if amount > 0.0 && amount.is_finite() {
            self.currency += amount;
        }
    }

    /// Remove `amount` if the balance covers it
    pub fn try_debit(&mut self, amount: f64) -> Result<()> {
        if self.currency < amount {
            return Err(GameError::InsufficientFunds {
                cost: amount,
                available: self.currency,
            });
        }
        self.currency -= amount;
        Ok(())
    }

    /// Buy one more building of `kind`; returns the new count
    pub fn purchase_building(&mut self, kind: BuildingKind) -> Result<u32> {
        let price = self.building_cost(kind);
        self.try_debit(price)?;
        let state = &mut self.buildings[kind.index()];
        state.count += 1;
        log::info!("Bought {} #{} for {}", kind, state.count, price);
        Ok(state.count)
    }

    /// Raise `kind` one level; returns the new level
    pub fn purchase_level(&mut self, kind: BuildingKind) -> Result<u32> {
        let price = self
            .level_cost(kind)
            .ok_or(GameError::MaxLevelReached { kind })?;
        self.try_debit(price)?;
        let state = &mut self.buildings[kind.index()];
        state.level += 1;
        log::info!("{} upgraded to level {} for {}", kind, state.level, price);
        Ok(state.level)
    }

    /// Add a row to the board; returns the new row count
    ///
    /// The caller must regenerate the board afterwards.
    pub fn purchase_row(&mut self) -> Result<u32> {
        let price = self.row_cost().ok_or(GameError::RowLimitReached)?;
        self.try_debit(price)?;
        self.rows += 1;
        log::info!("Board grown to {} rows for {}", self.rows, price);
        Ok(self.rows)
    }
}
