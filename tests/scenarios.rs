//! End-to-end scenarios through the public session API
//!
//! A scripted world lands every unit in a chosen bucket after a fixed fall
//! time, so balances can be checked to the exact unit.

use std::collections::VecDeque;

use glam::Vec2;

use clinks::GameError;
use clinks::persistence::{MemoryStore, SaveData, SaveStore};
use clinks::sim::{
    BodyHandle, BodyLabel, BoardConfig, BuildingKind, BuildingState, ContactBody, ContactPair,
    Economy, Intent, PhysicsWorld, Session, UnitTag, generate,
};
use clinks::Settings;

const FALL_MS: f64 = 50.0;
const STEP_MS: f64 = 10.0;

/// Where the next spawned unit ends up
#[derive(Debug, Clone, Copy)]
enum Landing {
    Bucket(usize),
    Drain,
}

struct ScriptedUnit {
    handle: BodyHandle,
    tag: UnitTag,
    fall_ms: f64,
    landing: Landing,
}

#[derive(Default)]
struct ScriptedWorld {
    script: VecDeque<Landing>,
    buckets: Vec<BodyHandle>,
    drain: Option<BodyHandle>,
    units: Vec<ScriptedUnit>,
    next_id: u32,
    boards_loaded: u32,
}

impl ScriptedWorld {
    fn with_script(script: impl IntoIterator<Item = Landing>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    fn handle(&mut self) -> BodyHandle {
        self.next_id += 1;
        BodyHandle(self.next_id)
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn load_board(&mut self, board: &BoardConfig) {
        self.buckets = (0..board.bucket_count()).map(|_| self.handle()).collect();
        self.drain = Some(self.handle());
        self.boards_loaded += 1;
    }

    fn spawn_body(&mut self, _position: Vec2, _radius: f32, tag: UnitTag) -> BodyHandle {
        let handle = self.handle();
        let landing = self.script.pop_front().unwrap_or(Landing::Bucket(0));
        self.units.push(ScriptedUnit {
            handle,
            tag,
            fall_ms: 0.0,
            landing,
        });
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.units.retain(|u| u.handle != handle);
    }

    fn step(&mut self, dt_ms: f64) -> Vec<ContactPair> {
        let mut contacts = Vec::new();
        for unit in &mut self.units {
            unit.fall_ms += dt_ms;
            if unit.fall_ms < FALL_MS {
                continue;
            }
            let zone = match unit.landing {
                Landing::Bucket(i) => ContactBody {
                    handle: self.buckets[i],
                    label: BodyLabel::Bucket(i),
                },
                Landing::Drain => ContactBody {
                    handle: self.drain.unwrap_or(BodyHandle(0)),
                    label: BodyLabel::Drain,
                },
            };
            contacts.push(ContactPair {
                a: ContactBody {
                    handle: unit.handle,
                    label: BodyLabel::Unit(unit.tag),
                },
                b: zone,
            });
        }
        contacts
    }

    fn clear(&mut self) {
        self.units.clear();
        self.buckets.clear();
        self.drain = None;
    }

    fn unit_count(&self) -> usize {
        self.units.len()
    }
}

fn settings() -> Settings {
    Settings {
        seed: Some(2024),
        ..Settings::default()
    }
}

fn session(
    currency: f64,
    rows: u32,
    buildings: &[(BuildingKind, BuildingState)],
    world: ScriptedWorld,
) -> Session<ScriptedWorld> {
    let economy = Economy::from_parts(currency, rows, buildings.iter().copied()).unwrap();
    Session::new(settings(), economy, world).unwrap()
}

fn run_for(session: &mut Session<ScriptedWorld>, ms: f64) {
    let steps = (ms / STEP_MS).round() as u32;
    for _ in 0..steps {
        session.tick(STEP_MS);
    }
}

#[test]
fn single_cursor_spawns_then_scores_edge_bucket() {
    let world = ScriptedWorld::with_script([Landing::Bucket(0)]);
    let mut session = session(
        1_000.0,
        8,
        &[(BuildingKind::Cursor, BuildingState { count: 1, level: 1 })],
        world,
    );

    run_for(&mut session, 9_990.0);
    assert_eq!(session.world().unit_count(), 0);
    assert_eq!(session.economy().currency(), 1_000.0);

    // Clock fires at 10 s and charges the level
    run_for(&mut session, 10.0);
    assert_eq!(session.world().unit_count(), 1);
    assert_eq!(session.economy().currency(), 999.0);

    // Lands in the left edge bucket of the 8-row table (x7)
    run_for(&mut session, 200.0);
    assert_eq!(session.world().unit_count(), 0);
    assert_eq!(session.economy().currency(), 1_006.0);
    assert_eq!(session.stats().hits[0], 1);
}

#[test]
fn reward_scales_with_level() {
    let world = ScriptedWorld::with_script([Landing::Bucket(4)]);
    let mut session = session(
        100.0,
        8,
        &[(BuildingKind::Mine, BuildingState { count: 1, level: 3 })],
        world,
    );
    run_for(&mut session, 1_000.0);
    assert_eq!(session.economy().currency(), 97.0);
    run_for(&mut session, 200.0);
    // Center bucket x0.8, three times over
    assert!((session.economy().currency() - 99.4).abs() < 1e-9);
}

#[test]
fn drained_units_score_nothing() {
    let world = ScriptedWorld::with_script([Landing::Drain]);
    let mut session = session(
        10.0,
        8,
        &[(BuildingKind::Mine, BuildingState { count: 1, level: 1 })],
        world,
    );
    run_for(&mut session, 1_200.0);
    assert_eq!(session.economy().currency(), 9.0);
    assert_eq!(session.stats().drained, 1);
    assert_eq!(session.world().unit_count(), 0);
}

#[test]
fn simultaneous_landings_credit_every_unit_once() {
    let script = [0, 8, 4, 4, 1, 7, 0].map(Landing::Bucket);
    let world = ScriptedWorld::with_script(script);
    let mut session = session(0.0, 8, &[], world);
    for _ in 0..script.len() {
        session.manual_spawn();
    }

    run_for(&mut session, 500.0);
    let expected = 7.0 + 7.0 + 0.8 + 0.8 + 3.0 + 3.0 + 7.0;
    assert!((session.economy().currency() - expected).abs() < 1e-9);
    assert_eq!(session.stats().total_hits(), 7);
    assert!(session.buffer().is_clear());
}

#[test]
fn row_purchase_spends_everything_and_regenerates() {
    let mut session = session(10_000.0, 8, &[], ScriptedWorld::default());
    let rows = session.apply(Intent::PurchaseRow).unwrap();
    assert_eq!(rows, clinks::sim::IntentOutcome::Rows(9));
    assert_eq!(session.economy().currency(), 0.0);
    assert_eq!(session.economy().rows(), 9);
    assert_eq!(session.board().bucket_count(), 10);
    assert_eq!(session.world().boards_loaded, 2);
}

#[test]
fn rebuild_discards_unflushed_rewards() {
    let world = ScriptedWorld::with_script([Landing::Bucket(0)]);
    let mut session = session(10_000.0, 8, &[], world);
    session.manual_spawn();

    // Landed at 50 ms, next flush at 100 ms
    run_for(&mut session, 60.0);
    assert!(session.buffer().pending() > 0.0);
    assert_eq!(session.economy().currency(), 10_000.0);

    session.purchase_row().unwrap();
    run_for(&mut session, 1_000.0);
    assert_eq!(session.economy().currency(), 0.0);
}

#[test]
fn purchase_one_short_is_rejected() {
    let mut session = session(99.0, 8, &[], ScriptedWorld::default());
    let err = session.purchase_building(BuildingKind::Mine).unwrap_err();
    assert!(matches!(
        err,
        GameError::InsufficientFunds { cost, available } if cost == 100.0 && available == 99.0
    ));
    assert_eq!(session.economy().currency(), 99.0);
    assert_eq!(session.economy().building(BuildingKind::Mine).count, 0);

    let mut session = session_at_cost(9_999.0);
    assert!(session.purchase_row().is_err());
    assert_eq!(session.economy().rows(), 8);
    assert_eq!(session.board().rows, 8);
}

fn session_at_cost(currency: f64) -> Session<ScriptedWorld> {
    session(currency, 8, &[], ScriptedWorld::default())
}

#[test]
fn row_cap_and_level_cap() {
    let mut session = session(1e12, 19, &[], ScriptedWorld::default());
    assert!(matches!(session.purchase_row(), Err(GameError::RowLimitReached)));

    let mut session = session_at_cost(1e15);
    for level in 2..=25 {
        assert_eq!(session.purchase_level(BuildingKind::Farm).unwrap(), level);
    }
    assert!(matches!(
        session.purchase_level(BuildingKind::Farm),
        Err(GameError::MaxLevelReached { kind: BuildingKind::Farm })
    ));
}

#[test]
fn generation_is_idempotent_and_bounded() {
    for rows in 8..=19 {
        assert_eq!(generate(rows).unwrap(), generate(rows).unwrap());
        assert_eq!(generate(rows).unwrap().bucket_count(), rows as usize + 1);
    }
    for rows in [0, 7, 20] {
        assert!(matches!(
            generate(rows),
            Err(GameError::InvalidConfiguration { rows: r }) if r == rows
        ));
    }
}

#[test]
fn afk_mode_never_touches_physics() {
    let mut session = session(
        50.0,
        10,
        &[(BuildingKind::Mine, BuildingState { count: 2, level: 1 })],
        ScriptedWorld::default(),
    );
    session.set_afk(true);
    run_for(&mut session, 5_000.0);
    assert_eq!(session.world().unit_count(), 0);
    // 10 spawns at 1 each, EV 1.2496 back each
    assert!((session.economy().currency() - (40.0 + 10.0 * 1.2496)).abs() < 1e-9);
    assert_eq!(session.stats().expected_hits, 10);
}

#[test]
fn progress_survives_save_and_restore() {
    let mut store = MemoryStore::default();
    let mut session = session(
        123.4,
        12,
        &[(BuildingKind::Factory, BuildingState { count: 3, level: 4 })],
        ScriptedWorld::default(),
    );
    session.set_afk(true);
    session.tick(1.0);
    store.save(&session.snapshot()).unwrap();

    let restored =
        Session::from_save(settings(), store.load().unwrap(), ScriptedWorld::default()).unwrap();
    assert_eq!(restored.economy().rows(), 12);
    assert_eq!(restored.board().bucket_count(), 13);
    assert_eq!(
        restored.economy().building(BuildingKind::Factory),
        BuildingState { count: 3, level: 4 }
    );
    assert_eq!(restored.economy().currency(), session.snapshot().currency);

    let fresh = Session::from_save(settings(), None, ScriptedWorld::default()).unwrap();
    assert_eq!(fresh.economy(), &Economy::new());
}

#[test]
fn corrupt_snapshot_is_refused() {
    let save = SaveData {
        version: 1,
        currency: 10.0,
        rows: 25,
        buildings: Vec::new(),
    };
    let result = Session::from_save(settings(), Some(save), ScriptedWorld::default());
    assert!(matches!(result, Err(GameError::InvalidSave(_))));
}
