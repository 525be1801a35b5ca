//! Board layout generation
//!
//! Everything scales from a single pin radius, `BOARD_WIDTH / (10 * rows + 28)`:
//! - pins sit 10 radii apart on a triangular lattice, rows 5√3 radii apart
//! - the apex row has 3 pins, each row below adds one
//! - `rows + 1` scoring buckets, each 10 radii wide, line the floor
//! - two oversized drain buckets flank the board and never score
//!
//! Generation is a pure function of the row count.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::rewards::{RewardTable, reward_table};
use crate::consts::BOARD_WIDTH;
use crate::error::Result;

/// Distance from the bottom pin row to the floor
pub const FLOOR_OFFSET: f32 = 25.0;
/// Bucket body height
pub const BUCKET_HEIGHT: f32 = 20.0;
/// Drain bucket body width
pub const DRAIN_WIDTH: f32 = 250.0;
/// Pyramid wall thickness
pub const WALL_THICKNESS: f32 = 3.0;
/// Pyramid wall tilt (radians)
pub const WALL_ANGLE: f32 = 0.52;
/// Half-width of each forbidden spawn band
pub const FORBIDDEN_HALF_WIDTH: f32 = 1.0;

/// Ball radius relative to pin radius
const BALL_RADIUS_FACTOR: f32 = 3.5;
/// Pin pitch relative to pin radius
const PIN_PITCH_FACTOR: f32 = 10.0;

/// A scoring bucket on the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket {
    pub center: f32,
    pub width: f32,
}

impl Bucket {
    pub fn left(&self) -> f32 {
        self.center - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center + self.width / 2.0
    }
}

/// A static rectangle (drains and walls)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slab {
    pub center: Vec2,
    pub size: Vec2,
    /// Rotation in radians
    pub angle: f32,
}

/// Region new units are dropped into
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnRegion {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    /// Centers of the bands a unit must never be dropped onto
    pub forbidden: Vec<f32>,
}

impl SpawnRegion {
    /// Whether `x` falls in a band that would balance a unit on a pin
    pub fn is_forbidden(&self, x: f32) -> bool {
        self.forbidden
            .iter()
            .any(|&c| (x - c).abs() <= FORBIDDEN_HALF_WIDTH)
    }

    /// Uniform spawn point, resampling x until it clears every forbidden band
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let mut x = rng.random_range(self.x_min..=self.x_max);
        while self.is_forbidden(x) {
            x = rng.random_range(self.x_min..=self.x_max);
        }
        let y = rng.random_range(self.y_min..=self.y_max);
        Vec2::new(x, y)
    }
}

/// Complete, immutable description of one board size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardConfig {
    pub rows: u32,
    pub width: f32,
    pub pin_radius: f32,
    pub ball_radius: f32,
    /// Vertical distance between pin rows
    pub row_spacing: f32,
    /// Pins ordered apex first, left to right within a row
    pub pins: Vec<Vec2>,
    /// Scoring buckets, left to right
    pub buckets: Vec<Bucket>,
    /// y coordinate of the bucket floor
    pub floor_y: f32,
    /// Left and right drain buckets
    pub drains: [Slab; 2],
    /// Left and right funnel walls
    pub walls: [Slab; 2],
    pub spawn: SpawnRegion,
    pub rewards: &'static RewardTable,
}

impl BoardConfig {
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of pins on row `row` (1-based from the apex)
    pub fn pins_in_row(row: u32) -> usize {
        row as usize + 2
    }

    /// y coordinate of the apex row
    pub fn apex_y(&self) -> f32 {
        self.floor_y - FLOOR_OFFSET - self.row_spacing * (self.rows - 1) as f32
    }

    /// Scoring bucket whose span contains `x`
    pub fn bucket_at(&self, x: f32) -> Option<usize> {
        self.buckets
            .iter()
            .position(|b| x >= b.left() && x < b.right())
    }
}

/// Generate the board for `rows` rows
pub fn generate(rows: u32) -> Result<BoardConfig> {
    let rewards = reward_table(rows)?;

    let width = BOARD_WIDTH;
    let r = width / (10.0 * rows as f32 + 28.0);
    let pitch = PIN_PITCH_FACTOR * r;
    let ball_radius = BALL_RADIUS_FACTOR * r;
    // Equilateral spacing: hypotenuse = pitch, half-pitch horizontal offset
    let row_spacing = (pitch * pitch - (pitch / 2.0).powi(2)).sqrt();
    let bottom_y = width - FLOOR_OFFSET;

    let mut pins = Vec::with_capacity(((rows + 5) * rows / 2) as usize);
    for row in 1..=rows {
        let from_bottom = (rows - row) as f32;
        let x0 = 9.0 * r + (pitch / 2.0) * from_bottom;
        let y = bottom_y - row_spacing * from_bottom;
        for j in 0..BoardConfig::pins_in_row(row) {
            pins.push(Vec2::new(x0 + pitch * j as f32, y));
        }
    }

    let buckets = (0..=rows)
        .map(|i| Bucket {
            center: pitch * i as f32 + 14.0 * r,
            width: pitch,
        })
        .collect();

    let drains = [
        Slab {
            center: Vec2::new(-(DRAIN_WIDTH / 2.0 + 1.0) + pitch, width),
            size: Vec2::new(DRAIN_WIDTH, BUCKET_HEIGHT),
            angle: 0.0,
        },
        Slab {
            center: Vec2::new(width + (DRAIN_WIDTH / 2.0 + 1.0) - pitch, width),
            size: Vec2::new(DRAIN_WIDTH, BUCKET_HEIGHT),
            angle: 0.0,
        },
    ];

    let wall_y = width - 35.0 - row_spacing * (rows as f32 / 2.0);
    let wall_len = pitch * rows as f32 - FLOOR_OFFSET;
    let wall_x = 6.0 * r + pitch * (rows as f32 / 4.0);
    let walls = [
        Slab {
            center: Vec2::new(wall_x, wall_y),
            size: Vec2::new(WALL_THICKNESS, wall_len),
            angle: WALL_ANGLE,
        },
        Slab {
            center: Vec2::new(width - wall_x, wall_y),
            size: Vec2::new(WALL_THICKNESS, wall_len),
            angle: -WALL_ANGLE,
        },
    ];

    let mid = width / 2.0;
    let apex_y = bottom_y - row_spacing * (rows - 1) as f32;
    let spawn = SpawnRegion {
        x_min: mid - 9.0 * r,
        x_max: mid + 9.0 * r,
        y_min: apex_y - 5.0 * ball_radius,
        y_max: apex_y,
        forbidden: vec![mid - 7.0 * r, mid, mid + 7.0 * r],
    };

    log::debug!(
        "Generated {}-row board: pin radius {:.3}, {} pins, {} buckets",
        rows,
        r,
        pins.len(),
        rows + 1
    );

    Ok(BoardConfig {
        rows,
        width,
        pin_radius: r,
        ball_radius,
        row_spacing,
        pins,
        buckets,
        floor_y: width,
        drains,
        walls,
        spawn,
        rewards,
    })
}
