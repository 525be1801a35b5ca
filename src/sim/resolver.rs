//! Collision resolution and reward buffering
//!
//! The physics engine reports a contact every step for as long as two bodies
//! overlap, so one landing shows up many times. The first contact between an
//! active unit and a bucket or drain resolves it and removes the body; every
//! later report for that handle is a no-op.
//!
//! Rewards land in a per-bucket buffer in fixed-point units. Integer addition
//! keeps the buffered total independent of the order contacts arrive in.

use std::collections::HashMap;

use super::layout::BoardConfig;
use super::physics::{BodyHandle, BodyLabel, ContactPair, PhysicsWorld, UnitTag};
use super::rewards::from_units;
use crate::stats::BucketStats;

/// Rewards waiting for the next reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardBuffer {
    cells: Vec<u64>,
    /// Rewards from the expected-value path
    expected: u64,
}

impl RewardBuffer {
    pub fn new(bucket_count: usize) -> Self {
        Self {
            cells: vec![0; bucket_count],
            expected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Add to one bucket's cell; false if the bucket does not exist
    pub fn credit(&mut self, bucket: usize, units: u64) -> bool {
        match self.cells.get_mut(bucket) {
            Some(cell) => {
                *cell = cell.saturating_add(units);
                true
            }
            None => false,
        }
    }

    pub fn credit_expected(&mut self, units: u64) {
        self.expected = self.expected.saturating_add(units);
    }

    pub fn cell(&self, bucket: usize) -> u64 {
        self.cells.get(bucket).copied().unwrap_or(0)
    }

    /// Sum of everything buffered, in fixed-point units
    pub fn pending_units(&self) -> u64 {
        self.cells
            .iter()
            .fold(self.expected, |acc, &c| acc.saturating_add(c))
    }

    /// Sum of everything buffered, in currency
    pub fn pending(&self) -> f64 {
        from_units(self.pending_units())
    }

    /// Read and zero every cell in one step
    pub fn drain(&mut self) -> u64 {
        let total = self.pending_units();
        self.cells.iter_mut().for_each(|c| *c = 0);
        self.expected = 0;
        total
    }

    pub fn is_clear(&self) -> bool {
        self.expected == 0 && self.cells.iter().all(|&c| c == 0)
    }
}

/// Lifecycle of a spawned unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Active(UnitTag),
    Removed,
}

/// Counts from one batch of contacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub scored: u32,
    pub drained: u32,
    pub reward_units: u64,
}

/// Maps contacts to rewards
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    units: HashMap<BodyHandle, UnitState>,
    stats: BucketStats,
}

impl CollisionResolver {
    pub fn new(bucket_count: usize) -> Self {
        Self {
            units: HashMap::new(),
            stats: BucketStats::new(bucket_count),
        }
    }

    /// Start tracking a freshly spawned unit
    pub fn register(&mut self, handle: BodyHandle, tag: UnitTag) {
        self.units.insert(handle, UnitState::Active(tag));
    }

    pub fn state(&self, handle: BodyHandle) -> Option<UnitState> {
        self.units.get(&handle).copied()
    }

    /// Units spawned but not yet resolved
    pub fn active_units(&self) -> usize {
        self.units
            .values()
            .filter(|s| matches!(s, UnitState::Active(_)))
            .count()
    }

    pub fn stats(&self) -> &BucketStats {
        &self.stats
    }

    /// Resolve one step's worth of contacts
    pub fn on_collision<W: PhysicsWorld + ?Sized>(
        &mut self,
        pairs: &[ContactPair],
        board: &BoardConfig,
        buffer: &mut RewardBuffer,
        world: &mut W,
    ) -> ResolveReport {
        let mut report = ResolveReport::default();

        for pair in pairs {
            let Some((handle, _, zone)) = pair.unit_and_zone() else {
                continue;
            };
            let tag = match self.units.get(&handle) {
                Some(UnitState::Active(tag)) => *tag,
                Some(UnitState::Removed) | None => continue,
            };

            match zone {
                BodyLabel::Bucket(bucket) => {
                    let Some(multiplier) = board.rewards.multiplier_units(bucket) else {
                        log::warn!("Contact with unknown bucket {} ignored", bucket);
                        continue;
                    };
                    let units = multiplier.saturating_mul(tag.level as u64);
                    buffer.credit(bucket, units);
                    self.stats.record_hit(bucket, units);
                    report.scored += 1;
                    report.reward_units = report.reward_units.saturating_add(units);
                    log::trace!(
                        "{} unit (level {}) scored {} in bucket {}",
                        tag.kind,
                        tag.level,
                        from_units(units),
                        bucket
                    );
                }
                BodyLabel::Drain => {
                    self.stats.record_drain();
                    report.drained += 1;
                    log::trace!("{} unit drained", tag.kind);
                }
                BodyLabel::Static | BodyLabel::Unit(_) => continue,
            }

            world.remove_body(handle);
            self.units.insert(handle, UnitState::Removed);
        }

        report
    }

    /// Score a unit at the board's expected value instead of simulating it
    pub fn resolve_expected(
        &mut self,
        tag: UnitTag,
        board: &BoardConfig,
        buffer: &mut RewardBuffer,
    ) -> u64 {
        let units = board.rewards.ev_units().saturating_mul(tag.level as u64);
        buffer.credit_expected(units);
        self.stats.record_expected(units);
        units
    }

    /// Forget units that have already been resolved
    pub fn retire_removed(&mut self) {
        self.units.retain(|_, s| matches!(s, UnitState::Active(_)));
    }

    /// Drop all tracking for a new board
    pub fn reset(&mut self, bucket_count: usize) {
        self.units.clear();
        self.stats = BucketStats::new(bucket_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::economy::BuildingKind;
    use crate::sim::layout::generate;
    use crate::sim::physics::ContactBody;
    use glam::Vec2;
    use proptest::prelude::*;

    /// World that only records removals
    #[derive(Default)]
    struct RecordingWorld {
        removed: Vec<BodyHandle>,
    }

    impl PhysicsWorld for RecordingWorld {
        fn load_board(&mut self, _board: &BoardConfig) {}
        fn spawn_body(&mut self, _position: Vec2, _radius: f32, _tag: UnitTag) -> BodyHandle {
            BodyHandle(0)
        }
        fn remove_body(&mut self, handle: BodyHandle) {
            self.removed.push(handle);
        }
        fn step(&mut self, _dt_ms: f64) -> Vec<ContactPair> {
            Vec::new()
        }
        fn clear(&mut self) {}
        fn unit_count(&self) -> usize {
            0
        }
    }

    fn tag(level: u32) -> UnitTag {
        UnitTag {
            kind: BuildingKind::Cursor,
            level,
        }
    }

    fn contact(unit: u32, t: UnitTag, zone: BodyLabel) -> ContactPair {
        ContactPair {
            a: ContactBody {
                handle: BodyHandle(unit),
                label: BodyLabel::Unit(t),
            },
            b: ContactBody {
                handle: BodyHandle(1000),
                label: zone,
            },
        }
    }

    #[test]
    fn test_edge_bucket_scores_multiplier_times_level() {
        let board = generate(8).unwrap();
        let mut resolver = CollisionResolver::new(board.bucket_count());
        let mut buffer = RewardBuffer::new(board.bucket_count());
        let mut world = RecordingWorld::default();

        resolver.register(BodyHandle(7), tag(1));
        let report = resolver.on_collision(
            &[contact(7, tag(1), BodyLabel::Bucket(0))],
            &board,
            &mut buffer,
            &mut world,
        );
        assert_eq!(report.scored, 1);
        assert_eq!(buffer.pending(), 7.0);
        assert_eq!(buffer.cell(0), 70_000);
        assert_eq!(world.removed, vec![BodyHandle(7)]);
        assert_eq!(resolver.state(BodyHandle(7)), Some(UnitState::Removed));
    }

    #[test]
    fn test_repeated_contacts_score_once() {
        let board = generate(8).unwrap();
        let mut resolver = CollisionResolver::new(board.bucket_count());
        let mut buffer = RewardBuffer::new(board.bucket_count());
        let mut world = RecordingWorld::default();

        resolver.register(BodyHandle(3), tag(2));
        let pair = contact(3, tag(2), BodyLabel::Bucket(4));
        resolver.on_collision(&[pair, pair, pair], &board, &mut buffer, &mut world);
        resolver.on_collision(&[pair], &board, &mut buffer, &mut world);
        resolver.retire_removed();
        resolver.on_collision(&[pair], &board, &mut buffer, &mut world);

        // 0.8 * level 2
        assert_eq!(buffer.pending_units(), 16_000);
        assert_eq!(world.removed.len(), 1);
        assert_eq!(resolver.stats().total_hits(), 1);
    }

    #[test]
    fn test_drain_removes_without_reward() {
        let board = generate(8).unwrap();
        let mut resolver = CollisionResolver::new(board.bucket_count());
        let mut buffer = RewardBuffer::new(board.bucket_count());
        let mut world = RecordingWorld::default();

        resolver.register(BodyHandle(5), tag(9));
        let report = resolver.on_collision(
            &[contact(5, tag(9), BodyLabel::Drain)],
            &board,
            &mut buffer,
            &mut world,
        );
        assert_eq!(report.drained, 1);
        assert!(buffer.is_clear());
        assert_eq!(world.removed, vec![BodyHandle(5)]);
        assert_eq!(resolver.stats().drained, 1);
    }

    #[test]
    fn test_non_scoring_contacts_ignored() {
        let board = generate(8).unwrap();
        let mut resolver = CollisionResolver::new(board.bucket_count());
        let mut buffer = RewardBuffer::new(board.bucket_count());
        let mut world = RecordingWorld::default();

        resolver.register(BodyHandle(1), tag(1));
        let pin = contact(1, tag(1), BodyLabel::Static);
        let two_units = contact(1, tag(1), BodyLabel::Unit(tag(1)));
        let statics = ContactPair {
            a: ContactBody {
                handle: BodyHandle(50),
                label: BodyLabel::Static,
            },
            b: ContactBody {
                handle: BodyHandle(51),
                label: BodyLabel::Bucket(0),
            },
        };
        let report =
            resolver.on_collision(&[pin, two_units, statics], &board, &mut buffer, &mut world);
        assert_eq!(report, ResolveReport::default());
        assert!(world.removed.is_empty());
        assert_eq!(resolver.active_units(), 1);
    }

    #[test]
    fn test_expected_value_path() {
        let board = generate(8).unwrap();
        let mut resolver = CollisionResolver::new(board.bucket_count());
        let mut buffer = RewardBuffer::new(board.bucket_count());

        let units = resolver.resolve_expected(tag(3), &board, &mut buffer);
        assert_eq!(units, 12_703 * 3);
        assert_eq!(buffer.pending_units(), 38_109);
        assert!((0..board.bucket_count()).all(|b| buffer.cell(b) == 0));
        assert_eq!(resolver.stats().expected_hits, 1);
    }

    #[test]
    fn test_drain_zeroes_buffer() {
        let mut buffer = RewardBuffer::new(4);
        buffer.credit(0, 5);
        buffer.credit(3, 7);
        buffer.credit_expected(11);
        assert!(!buffer.credit(4, 1));
        assert_eq!(buffer.drain(), 23);
        assert!(buffer.is_clear());
        assert_eq!(buffer.drain(), 0);
    }

    proptest! {
        #[test]
        fn accumulation_is_order_independent(
            hits in proptest::collection::vec((0usize..9, 1u32..=25), 0..200),
            seed in any::<u64>(),
        ) {
            use rand::seq::SliceRandom;
            use rand::SeedableRng;

            let board = generate(8).unwrap();
            let run = |order: &[(usize, u32)]| {
                let mut resolver = CollisionResolver::new(board.bucket_count());
                let mut buffer = RewardBuffer::new(board.bucket_count());
                let mut world = RecordingWorld::default();
                let pairs: Vec<_> = order
                    .iter()
                    .enumerate()
                    .map(|(i, &(bucket, level))| {
                        resolver.register(BodyHandle(i as u32), tag(level));
                        contact(i as u32, tag(level), BodyLabel::Bucket(bucket))
                    })
                    .collect();
                resolver.on_collision(&pairs, &board, &mut buffer, &mut world);
                buffer
            };

            let mut shuffled = hits.clone();
            shuffled.shuffle(&mut rand_pcg::Pcg32::seed_from_u64(seed));
            prop_assert_eq!(run(&hits).pending_units(), run(&shuffled).pending_units());
        }
    }
}
