//! Production scheduling
//!
//! Every building kind runs its own clock with period
//! `1000ms / (count * production_rate)`. Each time a clock fires the kind's
//! level is charged as the spawn cost; if the balance covers it one unit is
//! dropped onto the board, otherwise the tick is simply lost. Nothing is
//! queued or retried.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::economy::{BuildingKind, Economy};
use super::layout::BoardConfig;

/// Where a spawn came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpawnSource {
    Clock,
    Manual,
}

/// Request for the physics engine to drop one unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpawnEvent {
    pub kind: BuildingKind,
    pub position: Vec2,
    /// Producer level at the time of spawn
    pub level: u32,
    pub source: SpawnSource,
}

/// Per-spawn charge for a producer at `level`
#[inline]
pub fn spawn_cost(level: u32) -> f64 {
    level as f64
}

/// Clock period for `count` producers at `rate` units per second
///
/// `None` means the clock never fires.
pub fn period_ms(count: u32, rate: f64) -> Option<f64> {
    let period = 1000.0 / (count as f64 * rate);
    (period.is_finite() && period > 0.0).then_some(period)
}

/// A single free-running clock
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicProducer {
    pub kind: BuildingKind,
    period_ms: Option<f64>,
    elapsed_ms: f64,
}

impl PeriodicProducer {
    pub fn new(kind: BuildingKind) -> Self {
        Self {
            kind,
            period_ms: None,
            elapsed_ms: 0.0,
        }
    }

    pub fn period_ms(&self) -> Option<f64> {
        self.period_ms
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Recompute the period from the current count
    ///
    /// A changed period re-arms the clock from zero. Returns whether it changed.
    pub fn retune(&mut self, count: u32) -> bool {
        let period = period_ms(count, self.kind.production_rate());
        if period == self.period_ms {
            return false;
        }
        log::debug!(
            "{} clock retuned: {:?} -> {:?} ms",
            self.kind,
            self.period_ms,
            period
        );
        self.period_ms = period;
        self.elapsed_ms = 0.0;
        true
    }

    /// Advance by `dt_ms`, returning how many times the clock fired
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        let Some(period) = self.period_ms else {
            return 0;
        };
        self.elapsed_ms += dt_ms;
        // Sub-millisecond periods fire many times per step
        let fired = (self.elapsed_ms / period).floor();
        self.elapsed_ms = (self.elapsed_ms - fired * period).max(0.0);
        fired as u32
    }

    /// Cancel progress toward the next fire
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}

/// Outcome of one scheduler step
#[derive(Debug, Clone, Default)]
pub struct ProductionReport {
    pub spawns: Vec<SpawnEvent>,
    /// Ticks dropped for insufficient funds
    pub skipped: u32,
}

/// One clock per building kind
#[derive(Debug, Clone)]
pub struct ProductionScheduler {
    producers: Vec<PeriodicProducer>,
}

impl Default for ProductionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductionScheduler {
    pub fn new() -> Self {
        Self {
            producers: BuildingKind::ALL
                .iter()
                .map(|&k| PeriodicProducer::new(k))
                .collect(),
        }
    }

    pub fn producer(&self, kind: BuildingKind) -> &PeriodicProducer {
        &self.producers[kind.index()]
    }

    /// Pick up count changes from the ledger
    pub fn sync(&mut self, economy: &Economy) {
        for producer in &mut self.producers {
            producer.retune(economy.building(producer.kind).count);
        }
    }

    /// Cancel every outstanding clock
    pub fn reset(&mut self) {
        for producer in &mut self.producers {
            producer.reset();
        }
    }

    /// Advance every clock and attempt a spawn for each fire
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f64,
        economy: &mut Economy,
        board: &BoardConfig,
        rng: &mut R,
    ) -> ProductionReport {
        let mut report = ProductionReport::default();

        for producer in &mut self.producers {
            let fires = producer.advance(dt_ms);
            for _ in 0..fires {
                let level = economy.building(producer.kind).level;
                match economy.try_debit(spawn_cost(level)) {
                    Ok(()) => report.spawns.push(SpawnEvent {
                        kind: producer.kind,
                        position: board.spawn.sample(rng),
                        level,
                        source: SpawnSource::Clock,
                    }),
                    Err(_) => {
                        log::trace!("{} tick skipped: cannot afford {}", producer.kind, level);
                        report.skipped += 1;
                    }
                }
            }
        }

        report
    }

    /// Free, immediate spawn at the cursor's level
    pub fn manual_spawn<R: Rng + ?Sized>(
        &self,
        economy: &Economy,
        board: &BoardConfig,
        rng: &mut R,
    ) -> SpawnEvent {
        SpawnEvent {
            kind: BuildingKind::Cursor,
            position: board.spawn.sample(rng),
            level: economy.building(BuildingKind::Cursor).level,
            source: SpawnSource::Manual,
        }
    }
}
