//! Projectile/enemy collision resolution
//!
//! Axis-aligned overlap tests with per-entity half-extents, classifying
//! every hit as correct or incorrect for the session to apply.

use crate::consts::PROJECTILE_HALF_EXTENT;
use crate::sim::world::{Enemy, Projectile};

/// One projectile/enemy pairing found this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    pub projectile_id: u32,
    pub enemy_id: u32,
    /// The carried value matches the enemy's current answer
    pub correct: bool,
}

fn overlaps(projectile: &Projectile, enemy: &Enemy) -> bool {
    let reach = enemy.half_extent() + PROJECTILE_HALF_EXTENT;
    (projectile.pos.x - enemy.pos.x).abs() <= reach
        && (projectile.pos.y - enemy.pos.y).abs() <= reach
}

/// Pair every active projectile with at most one live enemy. A locked shot
/// only ever pairs with its own target: a boss equation swap retires the
/// old ID, so shots fired at the previous sub-equation expire harmlessly.
pub fn resolve(projectiles: &[Projectile], enemies: &[Enemy]) -> Vec<HitResult> {
    let mut hits = Vec::new();
    for projectile in projectiles.iter().filter(|p| p.active) {
        let hit = enemies
            .iter()
            .filter(|e| e.alive)
            .find(|enemy| match projectile.target_id {
                Some(tid) => enemy.id == tid && overlaps(projectile, enemy),
                None => overlaps(projectile, enemy),
            });
        if let Some(enemy) = hit {
            hits.push(HitResult {
                projectile_id: projectile.id,
                enemy_id: enemy.id,
                correct: projectile.value == enemy.answer(),
            });
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BOSS_HALF_EXTENT, ENEMY_HALF_EXTENT};
    use crate::sim::equation::Equation;
    use glam::Vec2;

    fn enemy(id: u32, pos: Vec2, answer: i64, is_boss: bool) -> Enemy {
        Enemy {
            id,
            pos,
            equation: Equation {
                text: String::new(),
                answer,
            },
            speed: 60.0,
            is_boss,
            alive: true,
        }
    }

    fn projectile(id: u32, pos: Vec2, value: i64, target_id: Option<u32>) -> Projectile {
        Projectile {
            id,
            pos,
            value,
            target_id,
            target_pos: None,
            active: true,
        }
    }

    #[test]
    fn overlapping_correct_value_is_a_correct_hit() {
        let enemies = vec![enemy(1, Vec2::new(100.0, 100.0), 7, false)];
        let shots = vec![projectile(10, Vec2::new(110.0, 95.0), 7, None)];
        let hits = resolve(&shots, &enemies);
        assert_eq!(
            hits,
            vec![HitResult {
                projectile_id: 10,
                enemy_id: 1,
                correct: true
            }]
        );
    }

    #[test]
    fn wrong_value_still_pairs_but_incorrect() {
        let enemies = vec![enemy(1, Vec2::new(100.0, 100.0), 7, false)];
        let shots = vec![projectile(10, Vec2::new(100.0, 100.0), 8, None)];
        assert!(!resolve(&shots, &enemies)[0].correct);
    }

    #[test]
    fn separation_beyond_half_extents_misses() {
        let reach = ENEMY_HALF_EXTENT + crate::consts::PROJECTILE_HALF_EXTENT;
        let enemies = vec![enemy(1, Vec2::new(100.0, 100.0), 7, false)];
        let shots = vec![projectile(
            10,
            Vec2::new(100.0 + reach + 1.0, 100.0),
            7,
            None,
        )];
        assert!(resolve(&shots, &enemies).is_empty());
    }

    #[test]
    fn boss_has_the_larger_hitbox() {
        let offset = BOSS_HALF_EXTENT - 1.0;
        let enemies = vec![enemy(1, Vec2::new(200.0, 200.0), 3, true)];
        let shots = vec![projectile(10, Vec2::new(200.0 + offset, 200.0), 3, None)];
        assert!(!resolve(&shots, &enemies).is_empty());

        let small = vec![enemy(2, Vec2::new(200.0, 200.0), 3, false)];
        assert!(resolve(&shots, &small).is_empty());
    }

    #[test]
    fn locked_shot_ignores_other_enemies() {
        let enemies = vec![
            enemy(1, Vec2::new(100.0, 100.0), 7, false),
            enemy(2, Vec2::new(500.0, 500.0), 7, false),
        ];
        // Locked on enemy 2 but physically overlapping enemy 1.
        let shots = vec![projectile(10, Vec2::new(100.0, 100.0), 7, Some(2))];
        assert!(resolve(&shots, &enemies).is_empty());
    }

    #[test]
    fn dead_enemies_are_skipped() {
        let mut e = enemy(1, Vec2::new(100.0, 100.0), 7, false);
        e.alive = false;
        let shots = vec![projectile(10, Vec2::new(100.0, 100.0), 7, None)];
        assert!(resolve(&shots, &[e]).is_empty());
    }
}
