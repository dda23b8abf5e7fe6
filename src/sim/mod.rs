//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod distractor;
pub mod equation;
pub mod powerup;
pub mod session;
pub mod world;

pub use collision::{HitResult, resolve};
pub use equation::{DAILY_BATCH_SIZE, Equation};
pub use powerup::{PowerUpKind, PowerUpRegistry};
pub use session::{Command, GameEvent, GamePhase, GameSession, MoveDir, Snapshot};
pub use world::{Enemy, EntityWorld, Pickup, Projectile};
