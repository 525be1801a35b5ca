//! Galton-board stand-in for a rigid-body engine
//!
//! Units drop row by row, bouncing left or right off each pin row with equal
//! odds, so landings follow the binomial distribution the reward tables are
//! tuned for. Contacts follow `collisionActive` semantics: a landed unit keeps
//! reporting its floor contact every step until someone removes it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::layout::BoardConfig;
use super::physics::{BodyHandle, BodyLabel, ContactBody, ContactPair, PhysicsWorld, UnitTag};

/// Time for a unit to fall from one pin row to the next
pub const ROW_FALL_MS: f64 = 80.0;

#[derive(Debug, Clone)]
struct FallingUnit {
    handle: BodyHandle,
    tag: UnitTag,
    /// Rightward bounces so far
    rights: u32,
    /// Pin rows passed so far
    rows_passed: u32,
    fall_ms: f64,
    /// Dropped outside the funnel, straight into a drain
    stray: bool,
    landed: Option<ContactBody>,
}

#[derive(Debug, Clone, Default)]
struct StaticBodies {
    buckets: Vec<BodyHandle>,
    drains: Vec<BodyHandle>,
    pins: Option<BodyHandle>,
    rows: u32,
}

/// Binomial drop world
#[derive(Debug, Clone)]
pub struct GaltonWorld {
    rng: Pcg32,
    statics: StaticBodies,
    units: Vec<FallingUnit>,
    /// Outer edges of the scoring floor
    floor: Option<(f32, f32)>,
    next_id: u32,
}

impl GaltonWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            statics: StaticBodies::default(),
            units: Vec::new(),
            floor: None,
            next_id: 1,
        }
    }

    fn next_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        handle
    }

    fn landing_zone(&self, unit: &FallingUnit) -> ContactBody {
        let drain = |i: usize| ContactBody {
            handle: self.statics.drains[i],
            label: BodyLabel::Drain,
        };
        if unit.stray {
            return drain(if unit.rights == 0 { 0 } else { 1 });
        }
        let index = unit.rights as usize;
        match self.statics.buckets.get(index) {
            Some(&handle) => ContactBody {
                handle,
                label: BodyLabel::Bucket(index),
            },
            None => drain(1),
        }
    }
}

impl PhysicsWorld for GaltonWorld {
    fn load_board(&mut self, board: &BoardConfig) {
        self.clear();
        let buckets = (0..board.bucket_count()).map(|_| self.next_handle()).collect();
        let drains = vec![self.next_handle(), self.next_handle()];
        let pins = Some(self.next_handle());
        self.statics = StaticBodies {
            buckets,
            drains,
            pins,
            rows: board.rows,
        };
        self.floor = board
            .buckets
            .first()
            .zip(board.buckets.last())
            .map(|(l, r)| (l.left(), r.right()));
    }

    fn spawn_body(&mut self, position: Vec2, _radius: f32, tag: UnitTag) -> BodyHandle {
        let handle = self.next_handle();
        let (stray, rights) = match self.floor {
            Some((left, _)) if position.x < left => (true, 0),
            Some((_, right)) if position.x >= right => (true, 1),
            _ => (false, 0),
        };
        self.units.push(FallingUnit {
            handle,
            tag,
            rights,
            rows_passed: 0,
            fall_ms: 0.0,
            stray,
            landed: None,
        });
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.units.retain(|u| u.handle != handle);
    }

    fn step(&mut self, dt_ms: f64) -> Vec<ContactPair> {
        // Nothing to land on until a board is loaded
        if self.statics.buckets.is_empty() {
            return Vec::new();
        }
        let rows = self.statics.rows;
        let mut contacts = Vec::new();

        for i in 0..self.units.len() {
            if self.units[i].landed.is_none() {
                self.units[i].fall_ms += dt_ms;
                let mut hit_pin = false;
                while self.units[i].fall_ms >= ROW_FALL_MS && self.units[i].rows_passed < rows {
                    self.units[i].fall_ms -= ROW_FALL_MS;
                    self.units[i].rows_passed += 1;
                    if !self.units[i].stray {
                        hit_pin = true;
                        if self.rng.random_bool(0.5) {
                            self.units[i].rights += 1;
                        }
                    }
                }
                if self.units[i].rows_passed >= rows && self.units[i].fall_ms >= ROW_FALL_MS {
                    let zone = self.landing_zone(&self.units[i]);
                    self.units[i].landed = Some(zone);
                }
                if let (true, Some(pins)) = (hit_pin, self.statics.pins) {
                    contacts.push(ContactPair {
                        a: ContactBody {
                            handle: self.units[i].handle,
                            label: BodyLabel::Unit(self.units[i].tag),
                        },
                        b: ContactBody {
                            handle: pins,
                            label: BodyLabel::Static,
                        },
                    });
                }
            }

            let unit = &self.units[i];
            if let Some(zone) = unit.landed {
                contacts.push(ContactPair {
                    a: zone,
                    b: ContactBody {
                        handle: unit.handle,
                        label: BodyLabel::Unit(unit.tag),
                    },
                });
            }
        }

        contacts
    }

    fn clear(&mut self) {
        self.units.clear();
        self.statics = StaticBodies::default();
        self.floor = None;
    }

    fn unit_count(&self) -> usize {
        self.units.len()
    }
}
