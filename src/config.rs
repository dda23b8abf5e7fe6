//! Session configuration
//!
//! Replaces the original platform's global preference store: everything the
//! simulation needs to know is handed to `GameSession` at construction.

use serde::{Deserialize, Serialize};

use crate::consts::STARTING_LIVES;

/// Operation drilled in practice mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PracticeOp {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

/// How equations are sourced for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Regular run: difficulty climbs with cumulative kills
    #[default]
    Standard,
    /// Single-operation drills at a digit-width tier (1 = 2-digit operands,
    /// up to 4 = 5-digit). No boss waves.
    Practice { op: PracticeOp, level: u8 },
    /// Fixed 50-problem run seeded from the calendar date
    DailyChallenge { year: i32, day_of_year: u32 },
}

/// Everything configurable about a session, fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// RNG seed. Ignored in daily-challenge mode, which derives its own.
    pub seed: u64,
    pub mode: GameMode,
    /// When false, the difficulty tier stays pinned at its starting value.
    pub adaptive_difficulty: bool,
    pub enemy_speed_multiplier: f32,
    /// Fixed-position variant: a valid selection fires immediately.
    /// When false the shell must issue an explicit `Fire` command.
    pub auto_fire_on_select: bool,
    /// Whether a wrong answer clears the current selection or leaves it
    /// for an immediate retry against the same boxes.
    pub clear_selection_on_miss: bool,
    pub starting_lives: u32,
    pub starting_wave: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            mode: GameMode::Standard,
            adaptive_difficulty: true,
            enemy_speed_multiplier: 1.0,
            auto_fire_on_select: false,
            clear_selection_on_miss: false,
            starting_lives: STARTING_LIVES,
            starting_wave: 1,
        }
    }
}

impl SessionConfig {
    /// The seed the session RNG is built from. Daily-challenge mode derives
    /// it from the date so every player gets the same problem sequence.
    pub fn effective_seed(&self) -> u64 {
        match self.mode {
            GameMode::DailyChallenge { year, day_of_year } => daily_seed(year, day_of_year),
            _ => self.seed,
        }
    }
}

/// Daily-challenge seed for a calendar date.
pub fn daily_seed(year: i32, day_of_year: u32) -> u64 {
    year as u64 * 10_000 + day_of_year as u64 * 100
}
