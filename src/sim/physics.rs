//! Physics engine boundary
//!
//! The rigid-body engine lives outside the simulation core. It is asked to
//! build the static board, spawn and remove falling units, and to report
//! every overlapping body pair once per step for as long as they overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::economy::BuildingKind;
use super::layout::BoardConfig;

/// Opaque identifier for a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Identity carried by a falling unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTag {
    pub kind: BuildingKind,
    /// Producer level at the time of spawn
    pub level: u32,
}

/// What a body is, as far as scoring is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLabel {
    Unit(UnitTag),
    Bucket(usize),
    Drain,
    /// Pins, walls and anything else that never scores
    Static,
}

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactBody {
    pub handle: BodyHandle,
    pub label: BodyLabel,
}

/// Two bodies overlapping during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPair {
    pub a: ContactBody,
    pub b: ContactBody,
}

impl ContactPair {
    /// Split into (unit, other) when exactly one side is a unit
    pub fn unit_and_zone(&self) -> Option<(BodyHandle, UnitTag, BodyLabel)> {
        match (self.a.label, self.b.label) {
            (BodyLabel::Unit(_), BodyLabel::Unit(_)) => None,
            (BodyLabel::Unit(tag), zone) => Some((self.a.handle, tag, zone)),
            (zone, BodyLabel::Unit(tag)) => Some((self.b.handle, tag, zone)),
            _ => None,
        }
    }
}

/// The operations the simulation needs from a physics engine
pub trait PhysicsWorld {
    /// Replace all static bodies with the ones described by `board`
    fn load_board(&mut self, board: &BoardConfig);

    /// Add a falling unit
    fn spawn_body(&mut self, position: Vec2, radius: f32, tag: UnitTag) -> BodyHandle;

    /// Remove a unit; unknown handles are ignored
    fn remove_body(&mut self, handle: BodyHandle);

    /// Advance by `dt_ms` and return every pair overlapping after the step
    fn step(&mut self, dt_ms: f64) -> Vec<ContactPair>;

    /// Drop every body, static and dynamic
    fn clear(&mut self);

    /// Units currently in flight
    fn unit_count(&self) -> usize;
}
