//! Active power-up effects
//!
//! The registry tracks which modifiers are live and when they lapse. Expiry
//! is a plain comparison against the session tick clock, evaluated once per
//! tick; there are no scheduled callbacks.

use serde::{Deserialize, Serialize};

use crate::consts::{
    AUTO_SOLVE_CHARGES, DOUBLE_POINTS_TICKS, EXTRA_LIFE_TICKS, SHIELD_TICKS, TIME_FREEZE_TICKS,
};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Enemy and pickup advancement suspended for 5 s
    TimeFreeze,
    /// Charge pool: the next shots fire the correct answer automatically
    AutoSolve,
    /// 15 s window or one absorbed bottom-escape, whichever first
    Shield,
    /// Awarded points ×2 for 10 s
    DoublePoints,
    /// Short-lived token that prevents the next life loss when consumed
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::TimeFreeze,
        PowerUpKind::AutoSolve,
        PowerUpKind::Shield,
        PowerUpKind::DoublePoints,
        PowerUpKind::ExtraLife,
    ];
}

/// Per-kind payload. A closed union instead of the dynamic payload the
/// original carried: an effect is either a timed window or a charge pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum EffectState {
    Timed { expires_at: u64 },
    Charges { remaining: u32 },
}

/// Currently active timed/charge-based modifiers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpRegistry {
    // At most one entry per kind; small enough that a Vec beats a map and
    // keeps iteration order stable for serialization.
    effects: Vec<(PowerUpKind, EffectState)>,
}

impl PowerUpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn window(kind: PowerUpKind) -> u64 {
        match kind {
            PowerUpKind::TimeFreeze => TIME_FREEZE_TICKS,
            PowerUpKind::Shield => SHIELD_TICKS,
            PowerUpKind::DoublePoints => DOUBLE_POINTS_TICKS,
            PowerUpKind::ExtraLife => EXTRA_LIFE_TICKS,
            PowerUpKind::AutoSolve => 0,
        }
    }

    /// Activate an effect at the current tick. Timed kinds refresh their
    /// window; auto-solve refills its pool to the full 3 charges.
    pub fn activate(&mut self, kind: PowerUpKind, now: u64) {
        let state = match kind {
            PowerUpKind::AutoSolve => EffectState::Charges {
                remaining: AUTO_SOLVE_CHARGES,
            },
            _ => EffectState::Timed {
                expires_at: now + Self::window(kind),
            },
        };
        match self.effects.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = state,
            None => self.effects.push((kind, state)),
        }
    }

    /// Whether the effect currently applies. Extra lives are consume-only
    /// tokens and are never reported active.
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        kind != PowerUpKind::ExtraLife && self.effects.iter().any(|(k, _)| *k == kind)
    }

    /// Spend a consumable effect: one auto-solve charge, a shield absorb,
    /// or the extra-life token. Returns false if nothing was there to spend
    /// (purely timed effects are not consumable).
    pub fn consume(&mut self, kind: PowerUpKind) -> bool {
        let Some(idx) = self.effects.iter().position(|(k, _)| *k == kind) else {
            return false;
        };
        match &mut self.effects[idx].1 {
            EffectState::Charges { remaining } => {
                *remaining -= 1;
                if *remaining == 0 {
                    self.effects.remove(idx);
                }
                true
            }
            EffectState::Timed { .. } => match kind {
                PowerUpKind::Shield | PowerUpKind::ExtraLife => {
                    self.effects.remove(idx);
                    true
                }
                _ => false,
            },
        }
    }

    /// Purge time-expired effects. Charge pools never time out.
    pub fn tick(&mut self, now: u64) {
        self.effects.retain(|(_, state)| match state {
            EffectState::Timed { expires_at } => *expires_at > now,
            EffectState::Charges { .. } => true,
        });
    }

    /// Ticks left on a timed effect, None for absent or charge-based kinds.
    pub fn remaining_ticks(&self, kind: PowerUpKind, now: u64) -> Option<u64> {
        self.effects.iter().find_map(|(k, state)| match state {
            EffectState::Timed { expires_at } if *k == kind => {
                Some(expires_at.saturating_sub(now))
            }
            _ => None,
        })
    }

    /// Charge count for pools, 1/0 presence for everything else.
    pub fn active_count(&self, kind: PowerUpKind) -> u32 {
        match self.effects.iter().find(|(k, _)| *k == kind) {
            Some((_, EffectState::Charges { remaining })) => *remaining,
            Some((_, EffectState::Timed { .. })) => 1,
            None => 0,
        }
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
