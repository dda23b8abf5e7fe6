//! Entity ownership and movement
//!
//! `EntityWorld` owns every enemy, projectile and pickup. Entity IDs are
//! monotonic and collections stay sorted by ID, keeping iteration order
//! (and with it the whole simulation) deterministic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::equation::Equation;
use crate::sim::powerup::PowerUpKind;

/// A descending enemy carrying the problem that destroys it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub equation: Equation,
    pub speed: f32,
    pub is_boss: bool,
    /// Cleared on a lethal hit; the corpse is swept at end of tick
    pub alive: bool,
}

impl Enemy {
    pub fn answer(&self) -> i64 {
        self.equation.answer
    }

    pub fn half_extent(&self) -> f32 {
        if self.is_boss {
            BOSS_HALF_EXTENT
        } else {
            ENEMY_HALF_EXTENT
        }
    }
}

/// A fired answer in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// The answer the player fired
    pub value: i64,
    /// Lock-on target; None means a straight shot upward
    pub target_id: Option<u32>,
    /// Last known target position. Kept fresh while the target lives, then
    /// frozen so the shot finishes its flight and expires at arrival.
    pub target_pos: Option<Vec2>,
    pub active: bool,
}

/// A falling power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub active: bool,
}

/// Mutable entity collections, advanced once per tick by the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityWorld {
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    next_id: u32,
}

impl Default for EntityWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityWorld {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive && !e.is_boss).count()
    }

    pub fn has_boss(&self) -> bool {
        self.enemies.iter().any(|e| e.alive && e.is_boss)
    }

    pub fn has_live_enemies(&self) -> bool {
        self.enemies.iter().any(|e| e.alive)
    }

    /// Spawning is suppressed at the cap; the boss is exempt.
    pub fn can_spawn_enemy(&self) -> bool {
        self.live_enemy_count() < MAX_ENEMIES
    }

    pub fn spawn_enemy(
        &mut self,
        equation: Equation,
        speed: f32,
        is_boss: bool,
        rng: &mut impl rand::Rng,
    ) -> u32 {
        let id = self.next_entity_id();
        let half = if is_boss {
            BOSS_HALF_EXTENT
        } else {
            ENEMY_HALF_EXTENT
        };
        let x = rng.random_range(half..=FIELD_WIDTH - half);
        self.enemies.push(Enemy {
            id,
            pos: Vec2::new(x, -half),
            equation,
            speed,
            is_boss,
            alive: true,
        });
        id
    }

    pub fn spawn_pickup(&mut self, kind: PowerUpKind, rng: &mut impl rand::Rng) -> u32 {
        let id = self.next_entity_id();
        let x = rng.random_range(PICKUP_HALF_EXTENT..=FIELD_WIDTH - PICKUP_HALF_EXTENT);
        self.pickups.push(Pickup {
            id,
            kind,
            pos: Vec2::new(x, -PICKUP_HALF_EXTENT),
            active: true,
        });
        id
    }

    /// Launch a projectile from the player's position. Returns None when the
    /// on-screen cap is hit.
    pub fn fire_projectile(
        &mut self,
        value: i64,
        origin_x: f32,
        target: Option<(u32, Vec2)>,
    ) -> Option<u32> {
        if self.projectiles.len() >= MAX_PROJECTILES {
            return None;
        }
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            pos: Vec2::new(origin_x, LAUNCH_Y),
            value,
            target_id: target.map(|(tid, _)| tid),
            target_pos: target.map(|(_, pos)| pos),
            active: true,
        });
        Some(id)
    }

    /// Advance every entity one timestep. Enemies march down (suspended
    /// under time-freeze, along with pickups); projectiles fly straight or
    /// home on their lock. Returns the enemies that crossed the bottom
    /// boundary, removed from the world, for life/shield accounting.
    pub fn advance(&mut self, dt: f32, speed_multiplier: f32, freeze: bool) -> Vec<Enemy> {
        if !freeze {
            for enemy in &mut self.enemies {
                enemy.pos.y += enemy.speed * speed_multiplier * dt;
            }
            for pickup in &mut self.pickups {
                pickup.pos.y += PICKUP_FALL_SPEED * dt;
            }
        }

        // Refresh each lock-on against the target's live position.
        let live_positions: Vec<(u32, Vec2)> = self
            .enemies
            .iter()
            .filter(|e| e.alive)
            .map(|e| (e.id, e.pos))
            .collect();
        for projectile in &mut self.projectiles {
            if let Some(tid) = projectile.target_id
                && let Some(&(_, pos)) = live_positions.iter().find(|(id, _)| *id == tid)
            {
                projectile.target_pos = Some(pos);
            }
            match projectile.target_pos {
                Some(target) => {
                    let to_target = target - projectile.pos;
                    let dist = to_target.length();
                    let step = PROJECTILE_SPEED * dt;
                    if dist <= step.max(HOMING_EPSILON) {
                        projectile.pos = target;
                    } else {
                        projectile.pos += to_target / dist * step;
                    }
                }
                None => projectile.pos.y -= PROJECTILE_SPEED * dt,
            }
        }

        // Bottom escapes leave the world entirely.
        let mut escaped = Vec::new();
        let mut kept = Vec::with_capacity(self.enemies.len());
        for enemy in std::mem::take(&mut self.enemies) {
            if enemy.pos.y >= FIELD_HEIGHT {
                escaped.push(enemy);
            } else {
                kept.push(enemy);
            }
        }
        self.enemies = kept;

        self.pickups
            .retain(|p| p.active && p.pos.y < FIELD_HEIGHT + PICKUP_HALF_EXTENT);

        escaped
    }

    /// Drop spent projectiles: hits, shots off the top, and homing shots
    /// that arrived at a vacated lock position. Called after collision
    /// resolution so an arriving shot gets its overlap test first.
    pub fn purge_projectiles(&mut self) {
        self.projectiles.retain(|p| {
            if !p.active {
                return false;
            }
            if p.pos.y < -2.0 * PROJECTILE_HALF_EXTENT {
                return false;
            }
            if let Some(target) = p.target_pos
                && p.pos.distance(target) <= HOMING_EPSILON
            {
                return false;
            }
            true
        });
    }

    /// Sweep enemies killed this tick
    pub fn remove_dead(&mut self) {
        self.enemies.retain(|e| e.alive);
    }

    /// Pickups overlapping the player are collected and removed.
    pub fn collect_pickups(&mut self, player_pos: Vec2) -> Vec<PowerUpKind> {
        let reach = PICKUP_HALF_EXTENT + PLAYER_HALF_EXTENT;
        let mut collected = Vec::new();
        self.pickups.retain(|pickup| {
            let dx = (pickup.pos.x - player_pos.x).abs();
            let dy = (pickup.pos.y - player_pos.y).abs();
            if dx <= reach && dy <= reach {
                collected.push(pickup.kind);
                false
            } else {
                true
            }
        });
        collected
    }

    /// Swap the boss's equation in place under a fresh identity, so stale
    /// solution boxes (and in-flight locks) can never apply to the new
    /// sub-equation. Returns the new ID.
    pub fn advance_boss_equation(&mut self, old_id: u32, equation: Equation) -> Option<u32> {
        let idx = self
            .enemies
            .iter()
            .position(|e| e.id == old_id && e.is_boss)?;
        let new_id = self.next_entity_id();
        let boss = &mut self.enemies[idx];
        boss.id = new_id;
        boss.equation = equation;
        Some(new_id)
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn eq(answer: i64) -> Equation {
        Equation {
            text: format!("{answer} + 0"),
            answer,
        }
    }

    #[test]
    fn ids_are_monotonic() {
        let mut world = EntityWorld::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let a = world.spawn_enemy(eq(1), 60.0, false, &mut rng);
        let b = world.spawn_enemy(eq(2), 60.0, false, &mut rng);
        assert!(b > a);
    }

    #[test]
    fn spawn_cap_exempts_boss() {
        let mut world = EntityWorld::new();
        let mut rng = Pcg32::seed_from_u64(2);
        for i in 0..MAX_ENEMIES {
            world.spawn_enemy(eq(i as i64), 60.0, false, &mut rng);
        }
        assert!(!world.can_spawn_enemy());
        world.spawn_enemy(eq(99), 18.0, true, &mut rng);
        assert!(world.has_boss());
        assert!(!world.can_spawn_enemy());
    }

    #[test]
    fn advance_reports_bottom_escapes() {
        let mut world = EntityWorld::new();
        let mut rng = Pcg32::seed_from_u64(3);
        let id = world.spawn_enemy(eq(5), 60.0, false, &mut rng);
        world.enemies[0].pos.y = FIELD_HEIGHT - 1.0;

        let escaped = world.advance(1.0, 1.0, false);
        assert_eq!(escaped.len(), 1);
        assert_eq!(escaped[0].id, id);
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn freeze_suspends_enemies_and_pickups() {
        let mut world = EntityWorld::new();
        let mut rng = Pcg32::seed_from_u64(4);
        world.spawn_enemy(eq(5), 60.0, false, &mut rng);
        world.spawn_pickup(PowerUpKind::Shield, &mut rng);
        let enemy_y = world.enemies[0].pos.y;
        let pickup_y = world.pickups[0].pos.y;

        world.advance(1.0, 1.0, true);
        assert_eq!(world.enemies[0].pos.y, enemy_y);
        assert_eq!(world.pickups[0].pos.y, pickup_y);
    }

    #[test]
    fn homing_projectile_tracks_live_target() {
        let mut world = EntityWorld::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let id = world.spawn_enemy(eq(5), 60.0, false, &mut rng);
        let start = world.enemies[0].pos;
        world.fire_projectile(5, FIELD_WIDTH / 2.0, Some((id, start)));

        world.advance(crate::consts::SIM_DT, 1.0, false);
        // Lock refreshed to the enemy's new position, not the stale record.
        assert_eq!(world.projectiles[0].target_pos, Some(world.enemies[0].pos));
    }

    #[test]
    fn arrived_homing_shot_is_purged_after_target_vanishes() {
        let mut world = EntityWorld::new();
        let target = Vec2::new(100.0, 100.0);
        world.fire_projectile(5, 100.0, Some((42, target)));
        // No enemy 42 exists; let the shot fly to the recorded spot.
        for _ in 0..240 {
            world.advance(SIM_DT, 1.0, false);
        }
        assert_eq!(world.projectiles[0].pos, target);
        world.purge_projectiles();
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn boss_equation_swap_issues_fresh_id() {
        let mut world = EntityWorld::new();
        let mut rng = Pcg32::seed_from_u64(6);
        let old = world.spawn_enemy(eq(5), 18.0, true, &mut rng);
        let new = world.advance_boss_equation(old, eq(9)).unwrap();
        assert_ne!(old, new);
        assert_eq!(world.enemies[0].answer(), 9);
        assert!(world.enemy(old).is_none());
    }
}
