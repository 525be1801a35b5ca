//! Session orchestration
//!
//! One `Session` owns every piece of mutable state: the ledger, the active
//! board, the producer clocks, the resolver, the reward buffer and the
//! physics world. `tick` advances all of them by one fixed step in a stable
//! order, so each shared value has exactly one writer at a time:
//!
//! 1. producer clocks fire, debit spawn costs, and hand units to the world
//! 2. the world steps and reports contacts
//! 3. the resolver turns contacts into buffered rewards
//! 4. the reconciler credits the buffer to the ledger on its cadence
//!
//! Buying a row tears the board down and rebuilds every component for the
//! new bucket count; unflushed rewards from the old board are discarded.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::economy::{BuildingKind, Economy};
use super::layout::{BoardConfig, generate};
use super::physics::{PhysicsWorld, UnitTag};
use super::reconciler::Reconciler;
use super::resolver::{CollisionResolver, RewardBuffer};
use super::scheduler::{ProductionScheduler, SpawnEvent};
use crate::error::Result;
use crate::persistence::SaveData;
use crate::settings::Settings;
use crate::stats::BucketStats;

/// Player actions accepted from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    PurchaseBuilding(BuildingKind),
    PurchaseLevel(BuildingKind),
    PurchaseRow,
    ManualSpawn,
}

/// Result of an accepted intent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntentOutcome {
    /// New building count
    Building(u32),
    /// New building level
    Level(u32),
    /// New row count
    Rows(u32),
    Spawned(SpawnEvent),
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub spawned: u32,
    /// Producer ticks dropped for insufficient funds
    pub skipped: u32,
    pub scored: u32,
    pub drained: u32,
    /// Amount credited if the reconciler flushed this tick
    pub flushed: Option<f64>,
    /// The autosave cadence elapsed; the driver should persist a snapshot
    pub autosave_due: bool,
}

/// Shop line for one building kind
#[derive(Debug, Clone, Serialize)]
pub struct BuildingHud {
    pub kind: BuildingKind,
    pub count: u32,
    pub level: u32,
    pub next_cost: f64,
    pub level_cost: Option<f64>,
    pub period_ms: Option<f64>,
}

/// Everything the presentation layer shows
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub currency: f64,
    pub rows: u32,
    /// Buffered reward not yet credited
    pub pending: f64,
    pub units_in_flight: usize,
    pub afk: bool,
    pub buildings: Vec<BuildingHud>,
    pub row_cost: Option<f64>,
    pub buckets: BucketStats,
}

/// A running single-board game
pub struct Session<W: PhysicsWorld> {
    settings: Settings,
    economy: Economy,
    board: BoardConfig,
    scheduler: ProductionScheduler,
    resolver: CollisionResolver,
    buffer: RewardBuffer,
    reconciler: Reconciler,
    world: W,
    rng: Pcg32,
    afk: bool,
    time_ms: f64,
    autosave_elapsed_ms: f64,
}

impl<W: PhysicsWorld> Session<W> {
    /// Start a session on `economy`, building the board for its row count
    pub fn new(settings: Settings, economy: Economy, mut world: W) -> Result<Self> {
        let settings = settings.sanitized();
        let board = generate(economy.rows())?;
        world.clear();
        world.load_board(&board);

        let seed = settings.resolved_seed();
        log::info!(
            "Session started: {} rows, balance {}, seed {}",
            economy.rows(),
            economy.currency(),
            seed
        );

        let mut scheduler = ProductionScheduler::new();
        scheduler.sync(&economy);

        Ok(Self {
            afk: settings.afk,
            reconciler: Reconciler::new(settings.reconcile_interval_ms),
            resolver: CollisionResolver::new(board.bucket_count()),
            buffer: RewardBuffer::new(board.bucket_count()),
            rng: Pcg32::seed_from_u64(seed),
            settings,
            economy,
            board,
            scheduler,
            world,
            time_ms: 0.0,
            autosave_elapsed_ms: 0.0,
        })
    }

    /// Start from a loaded snapshot, or a fresh economy if there is none
    pub fn from_save(settings: Settings, save: Option<SaveData>, world: W) -> Result<Self> {
        let economy = match save {
            Some(save) => save.into_economy()?,
            None => Economy::new(),
        };
        Self::new(settings, economy, world)
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn buffer(&self) -> &RewardBuffer {
        &self.buffer
    }

    pub fn scheduler(&self) -> &ProductionScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> &BucketStats {
        self.resolver.stats()
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn is_afk(&self) -> bool {
        self.afk
    }

    /// Switch between simulated and expected-value scoring
    ///
    /// Units already in flight keep falling and score normally.
    pub fn set_afk(&mut self, afk: bool) {
        if self.afk != afk {
            log::info!("AFK mode {}", if afk { "on" } else { "off" });
        }
        self.afk = afk;
    }

    /// Advance the whole simulation by `dt_ms`
    pub fn tick(&mut self, dt_ms: f64) -> TickReport {
        let mut report = TickReport::default();
        self.time_ms += dt_ms;

        self.scheduler.sync(&self.economy);
        let production = self
            .scheduler
            .tick(dt_ms, &mut self.economy, &self.board, &mut self.rng);
        report.skipped = production.skipped;
        for spawn in production.spawns {
            self.dispatch(spawn);
            report.spawned += 1;
        }

        let contacts = self.world.step(dt_ms);
        let resolved = self.resolver.on_collision(
            &contacts,
            &self.board,
            &mut self.buffer,
            &mut self.world,
        );
        self.resolver.retire_removed();
        report.scored = resolved.scored;
        report.drained = resolved.drained;

        report.flushed = self
            .reconciler
            .tick(dt_ms, &mut self.buffer, &mut self.economy);

        self.autosave_elapsed_ms += dt_ms;
        if self.autosave_elapsed_ms >= self.settings.autosave_interval_ms {
            self.autosave_elapsed_ms = 0.0;
            report.autosave_due = true;
        }

        report
    }

    /// Hand a spawn to the world, or score it at EV in AFK mode
    fn dispatch(&mut self, spawn: SpawnEvent) {
        let tag = UnitTag {
            kind: spawn.kind,
            level: spawn.level,
        };
        if self.afk {
            self.resolver.resolve_expected(tag, &self.board, &mut self.buffer);
        } else {
            let handle = self
                .world
                .spawn_body(spawn.position, self.board.ball_radius, tag);
            self.resolver.register(handle, tag);
        }
    }

    /// Apply a player intent
    pub fn apply(&mut self, intent: Intent) -> Result<IntentOutcome> {
        match intent {
            Intent::PurchaseBuilding(kind) => {
                self.purchase_building(kind).map(IntentOutcome::Building)
            }
            Intent::PurchaseLevel(kind) => self.purchase_level(kind).map(IntentOutcome::Level),
            Intent::PurchaseRow => self.purchase_row().map(IntentOutcome::Rows),
            Intent::ManualSpawn => Ok(IntentOutcome::Spawned(self.manual_spawn())),
        }
    }

    pub fn purchase_building(&mut self, kind: BuildingKind) -> Result<u32> {
        self.economy.purchase_building(kind)
    }

    pub fn purchase_level(&mut self, kind: BuildingKind) -> Result<u32> {
        self.economy.purchase_level(kind)
    }

    /// Buy a row and rebuild the board around it
    pub fn purchase_row(&mut self) -> Result<u32> {
        let rows = self.economy.purchase_row()?;
        self.rebuild()?;
        Ok(rows)
    }

    /// Drop a free unit at the cursor's level
    pub fn manual_spawn(&mut self) -> SpawnEvent {
        let spawn = self
            .scheduler
            .manual_spawn(&self.economy, &self.board, &mut self.rng);
        self.dispatch(spawn);
        spawn
    }

    /// Credit everything buffered right now
    pub fn flush(&mut self) -> f64 {
        self.reconciler.flush(&mut self.buffer, &mut self.economy)
    }

    /// Wipe progress back to a fresh 8-row economy
    pub fn reset(&mut self) -> Result<()> {
        log::info!("Resetting economy");
        self.economy = Economy::new();
        self.rebuild()
    }

    /// Credit production for time spent away, scored at expected value
    ///
    /// Runs the producer clocks in reconcile-sized chunks so credited
    /// rewards can fund later spawns. Returns the total credited.
    pub fn catch_up(&mut self, elapsed_ms: f64) -> f64 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return 0.0;
        }
        let was_afk = self.afk;
        self.afk = true;
        let chunk = self.reconciler.interval_ms();
        let mut remaining = elapsed_ms;
        let mut credited = 0.0;
        let mut spawned = 0u64;

        while remaining > 0.0 {
            let dt = remaining.min(chunk);
            remaining -= dt;
            self.scheduler.sync(&self.economy);
            let production = self
                .scheduler
                .tick(dt, &mut self.economy, &self.board, &mut self.rng);
            spawned += production.spawns.len() as u64;
            for spawn in production.spawns {
                self.dispatch(spawn);
            }
            credited += self.reconciler.flush(&mut self.buffer, &mut self.economy);
        }

        self.afk = was_afk;
        self.time_ms += elapsed_ms;
        log::info!(
            "Caught up {:.0} s offline: {} units, {} credited",
            elapsed_ms / 1000.0,
            spawned,
            credited
        );
        credited
    }

    /// Tear down and rebuild everything that depends on the row count
    fn rebuild(&mut self) -> Result<()> {
        let board = generate(self.economy.rows())?;
        self.reconciler.discard(&mut self.buffer);
        self.buffer = RewardBuffer::new(board.bucket_count());
        self.resolver.reset(board.bucket_count());
        self.scheduler.reset();
        self.world.clear();
        self.world.load_board(&board);
        log::info!(
            "Board rebuilt: {} rows, {} buckets",
            board.rows,
            board.bucket_count()
        );
        self.board = board;
        Ok(())
    }

    /// Snapshot for persistence
    pub fn snapshot(&self) -> SaveData {
        SaveData::from_economy(&self.economy)
    }

    /// Current presentation state
    pub fn hud(&self) -> Hud {
        Hud {
            currency: self.economy.currency(),
            rows: self.economy.rows(),
            pending: self.buffer.pending(),
            units_in_flight: self.world.unit_count(),
            afk: self.afk,
            buildings: self
                .economy
                .buildings()
                .map(|(kind, state)| BuildingHud {
                    kind,
                    count: state.count,
                    level: state.level,
                    next_cost: self.economy.building_cost(kind),
                    level_cost: self.economy.level_cost(kind),
                    period_ms: self.scheduler.producer(kind).period_ms(),
                })
                .collect(),
            row_cost: self.economy.row_cost(),
            buckets: self.resolver.stats().clone(),
        }
    }
}
