//! Math Shooter - deterministic simulation core for an arcade math game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, session state machine)
//! - `config`: Explicit session configuration passed in at construction
//! - `highscores`: Leaderboard bookkeeping, persisted by the shell
//!
//! Rendering, input devices, sound and platform storage live outside this
//! crate: the shell drives [`sim::session::GameSession::tick`] at a fixed
//! rate, feeds it [`sim::session::Command`]s, and consumes the per-tick
//! snapshot plus drained events.

pub mod config;
pub mod highscores;
pub mod sim;

pub use config::{GameMode, PracticeOp, SessionConfig, daily_seed};
pub use highscores::HighScores;
pub use sim::session::{Command, GameEvent, GamePhase, GameSession, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick rate
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Play field dimensions (portrait)
    pub const FIELD_WIDTH: f32 = 720.0;
    pub const FIELD_HEIGHT: f32 = 1280.0;
    /// Vertical line the player sits on; projectiles launch from here
    pub const LAUNCH_Y: f32 = FIELD_HEIGHT - 80.0;

    /// Collision half-extents
    pub const ENEMY_HALF_EXTENT: f32 = 42.0;
    pub const BOSS_HALF_EXTENT: f32 = 70.0;
    pub const PROJECTILE_HALF_EXTENT: f32 = 12.0;
    pub const PICKUP_HALF_EXTENT: f32 = 28.0;
    pub const PLAYER_HALF_EXTENT: f32 = 40.0;

    /// Entity speeds (pixels/second)
    pub const ENEMY_BASE_SPEED: f32 = 60.0;
    pub const BOSS_SPEED: f32 = 18.0;
    pub const PROJECTILE_SPEED: f32 = 640.0;
    pub const PICKUP_FALL_SPEED: f32 = 120.0;
    pub const PLAYER_SPEED: f32 = 420.0;

    /// Spawning is suppressed at this many live non-boss enemies
    pub const MAX_ENEMIES: usize = 5;
    /// On-screen projectile cap
    pub const MAX_PROJECTILES: usize = 8;
    /// On-screen pickup cap
    pub const MAX_PICKUPS: usize = 2;
    /// Homing projectiles count as arrived within this distance
    pub const HOMING_EPSILON: f32 = 4.0;
    /// Per-tick pickup spawn probability (about one every ten seconds)
    pub const PICKUP_SPAWN_CHANCE: f64 = 1.0 / 600.0;

    /// Power-up windows, in ticks
    pub const TIME_FREEZE_TICKS: u64 = 5 * TICK_RATE as u64;
    pub const SHIELD_TICKS: u64 = 15 * TICK_RATE as u64;
    pub const DOUBLE_POINTS_TICKS: u64 = 10 * TICK_RATE as u64;
    pub const EXTRA_LIFE_TICKS: u64 = TICK_RATE as u64;
    /// Charges granted by an auto-solve activation
    pub const AUTO_SOLVE_CHARGES: u32 = 3;

    /// Pause between waves (2 seconds)
    pub const WAVE_COMPLETE_TICKS: u32 = 2 * TICK_RATE;
    /// Kill-count band per difficulty tier
    pub const KILLS_PER_TIER: u32 = 50;
    pub const MAX_DIFFICULTY: u8 = 10;
    pub const STARTING_LIVES: u32 = 3;
}
