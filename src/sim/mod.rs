//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed and the same intents,
//! a session replays identically:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Integer reward accumulation, so contact order never changes a sum
//! - No rendering or platform dependencies

pub mod economy;
pub mod galton;
pub mod layout;
pub mod physics;
pub mod reconciler;
pub mod resolver;
pub mod rewards;
pub mod scheduler;
pub mod session;

pub use economy::{BuildingKind, BuildingState, CostKey, Economy, cost};
pub use galton::GaltonWorld;
pub use layout::{BoardConfig, Bucket, Slab, SpawnRegion, generate};
pub use physics::{BodyHandle, BodyLabel, ContactBody, ContactPair, PhysicsWorld, UnitTag};
pub use reconciler::Reconciler;
pub use resolver::{CollisionResolver, ResolveReport, RewardBuffer, UnitState};
pub use rewards::{REWARD_SCALE, RewardTable, reward_table};
pub use scheduler::{
    PeriodicProducer, ProductionReport, ProductionScheduler, SpawnEvent, SpawnSource, period_ms,
    spawn_cost,
};
pub use session::{BuildingHud, Hud, Intent, IntentOutcome, Session, TickReport};
