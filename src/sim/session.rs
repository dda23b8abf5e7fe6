//! Session orchestration
//!
//! `GameSession` ties the generators, the entity world, the power-up
//! registry and the collision resolver into the game's state machine. The
//! shell drives it with `tick` at a fixed rate, feeds player input through
//! the command queue, and reads back a snapshot plus drained events.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{GameMode, SessionConfig};
use crate::consts::*;
use crate::sim::collision::{self, HitResult};
use crate::sim::distractor;
use crate::sim::equation::{self, Equation};
use crate::sim::powerup::{PowerUpKind, PowerUpRegistry};
use crate::sim::world::{Enemy, EntityWorld, Pickup, Projectile};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen mid-wave, resumed by the pause toggle
    Paused,
    /// Between-wave rest period (2 seconds)
    WaveComplete,
    /// Run ended; terminal until an external restart
    GameOver,
}

/// Horizontal steering for the player-steerable variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDir {
    Left,
    Stop,
    Right,
}

/// Player input, queued from any thread's perspective and drained once at
/// the start of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectAnswer(usize),
    Fire,
    SetMovement(MoveDir),
    PauseToggle,
    Restart,
}

/// Discrete notifications for the shell (renderer, audio, persistence).
/// Fire-and-forget: nothing here is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired,
    HitCorrect { enemy_id: u32, points: u64 },
    HitWrong { enemy_id: u32 },
    EnemyEscaped { enemy_id: u32 },
    ShieldAbsorbed,
    LifeLost { lives_left: u32 },
    PowerUpCollected { kind: PowerUpKind },
    DifficultyUpgraded { level: u8, title: String, detail: String },
    WaveCompleted { wave: u32, bonus: u64 },
    BossSpawned { wave: u32, health: u32 },
    BossDefeated { wave: u32, bonus: u64 },
    GameOver { score: u64, wave: u32, accuracy: f32 },
}

/// Read-only view of one tick, handed to the renderer
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub score: u64,
    pub lives: u32,
    pub wave: u32,
    pub combo: u32,
    pub combo_multiplier: f32,
    pub difficulty_level: u8,
    pub phase: GamePhase,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub solution_boxes: Vec<i64>,
    pub selected_index: Option<usize>,
    pub has_valid_selection: bool,
    pub target_enemy_id: Option<u32>,
    pub is_boss_wave: bool,
    pub boss_health_percent: Option<f32>,
    pub player_x: f32,
}

/// A running boss encounter: remaining health and the sub-equations still
/// to be served, one per hit.
#[derive(Debug, Clone)]
struct BossFight {
    health: u32,
    max_health: u32,
    queue: VecDeque<Equation>,
}

/// The game's orchestrating state machine
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    rng: Pcg32,
    world: EntityWorld,
    powerups: PowerUpRegistry,
    commands: VecDeque<Command>,
    events: Vec<GameEvent>,

    phase: GamePhase,
    score: u64,
    lives: u32,
    wave: u32,
    combo: u32,
    total_kills: u32,
    difficulty: u8,
    shots_fired: u32,
    correct_hits: u32,

    target_id: Option<u32>,
    solution_boxes: Vec<i64>,
    selected: Option<usize>,

    time_ticks: u64,
    last_spawn_tick: u64,
    spawned_this_wave: u32,
    wave_complete_ticks: u32,
    boss: Option<BossFight>,
    boss_defeated: bool,

    player_x: f32,
    move_dir: f32,

    /// Pre-generated daily-challenge problems, consumed per spawn
    daily_queue: VecDeque<Equation>,
}

fn initial_difficulty(config: &SessionConfig) -> u8 {
    match config.mode {
        GameMode::Practice { level, .. } => level.clamp(1, 4),
        _ => 1,
    }
}

/// Tier names for the upgrade notification
fn difficulty_title(level: u8) -> (&'static str, &'static str) {
    match level {
        1 => ("Recruit", "Addition and subtraction"),
        2 => ("Cadet", "Times tables join the fray"),
        3 => ("Gunner", "Exact division unlocked"),
        4 => ("Sergeant", "Two-step expressions, extra solution box"),
        5 => ("Lieutenant", "Fractions and decimals"),
        6 => ("Captain", "Powers and square roots"),
        7 => ("Major", "Negative numbers"),
        8 => ("Colonel", "Multi-term expressions"),
        9 => ("General", "Three-digit sums and percentages"),
        _ => ("Legend", "Everything at once"),
    }
}

impl GameSession {
    /// Create a session from its configuration. Starts in `Playing` with
    /// one enemy pre-spawned and solution boxes populated, so the first
    /// rendered frame never stalls on an empty field.
    pub fn new(config: SessionConfig) -> Self {
        let seed = config.effective_seed();
        let mut session = Self {
            rng: Pcg32::seed_from_u64(seed),
            world: EntityWorld::new(),
            powerups: PowerUpRegistry::new(),
            commands: VecDeque::new(),
            events: Vec::new(),
            phase: GamePhase::Playing,
            score: 0,
            lives: config.starting_lives,
            wave: config.starting_wave.max(1),
            combo: 0,
            total_kills: 0,
            difficulty: initial_difficulty(&config),
            shots_fired: 0,
            correct_hits: 0,
            target_id: None,
            solution_boxes: Vec::new(),
            selected: None,
            time_ticks: 0,
            last_spawn_tick: 0,
            spawned_this_wave: 0,
            wave_complete_ticks: 0,
            boss: None,
            boss_defeated: false,
            player_x: FIELD_WIDTH / 2.0,
            move_dir: 0.0,
            daily_queue: match config.mode {
                GameMode::DailyChallenge { .. } => equation::daily_batch(seed).into(),
                _ => VecDeque::new(),
            },
            config,
        };
        session.spawn_initial();
        session
    }

    /// Queue a player command for the next tick. The queue is the single
    /// mutation entry point, so a shell that takes input on another thread
    /// only needs to serialize access to it.
    pub fn queue_command(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Idempotent pause control: halts tick processing without losing state.
    pub fn set_paused(&mut self, paused: bool) {
        match (paused, self.phase) {
            (true, GamePhase::Playing) => self.phase = GamePhase::Paused,
            (false, GamePhase::Paused) => self.phase = GamePhase::Playing,
            _ => {}
        }
    }

    /// Reinitialize everything from the stored config
    pub fn restart(&mut self) {
        log::info!("session restart");
        *self = GameSession::new(self.config.clone());
    }

    /// Advance the session by one fixed timestep
    pub fn tick(&mut self, dt: f32) {
        self.drain_commands();
        match self.phase {
            GamePhase::Paused | GamePhase::GameOver => return,
            GamePhase::WaveComplete => {
                self.time_ticks += 1;
                self.wave_complete_ticks = self.wave_complete_ticks.saturating_sub(1);
                if self.wave_complete_ticks == 0 {
                    self.begin_wave();
                }
                return;
            }
            GamePhase::Playing => {}
        }

        self.time_ticks += 1;
        self.powerups.tick(self.time_ticks);

        // Player drift (zero unless the steerable variant is steering).
        self.player_x = (self.player_x + self.move_dir * PLAYER_SPEED * dt)
            .clamp(PLAYER_HALF_EXTENT, FIELD_WIDTH - PLAYER_HALF_EXTENT);

        self.try_spawn();
        self.maybe_spawn_pickup();

        let freeze = self.powerups.is_active(PowerUpKind::TimeFreeze);
        let escaped = self
            .world
            .advance(dt, self.config.enemy_speed_multiplier, freeze);
        for enemy in &escaped {
            self.handle_escape(enemy);
        }

        for kind in self.world.collect_pickups(Vec2::new(self.player_x, LAUNCH_Y)) {
            self.powerups.activate(kind, self.time_ticks);
            self.events.push(GameEvent::PowerUpCollected { kind });
        }

        if self.needs_retarget() {
            self.retarget();
        }

        let hits = collision::resolve(&self.world.projectiles, &self.world.enemies);
        for hit in hits {
            self.apply_hit(hit);
        }
        self.world.remove_dead();
        self.world.purge_projectiles();
        if self.needs_retarget() {
            self.retarget();
        }
        self.world.normalize_order();

        self.check_wave_complete();

        if self.lives == 0 {
            self.phase = GamePhase::GameOver;
            let accuracy = self.accuracy();
            log::info!(
                "game over: score {}, wave {}, accuracy {:.2}",
                self.score,
                self.wave,
                accuracy
            );
            self.events.push(GameEvent::GameOver {
                score: self.score,
                wave: self.wave,
                accuracy,
            });
        }

        debug_assert!(
            self.targeting_consistent(),
            "solution boxes out of sync with targeting"
        );
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score,
            lives: self.lives,
            wave: self.wave,
            combo: self.combo,
            combo_multiplier: self.combo_multiplier(),
            difficulty_level: self.difficulty,
            phase: self.phase,
            enemies: self.world.enemies.clone(),
            projectiles: self.world.projectiles.clone(),
            pickups: self.world.pickups.clone(),
            solution_boxes: self.solution_boxes.clone(),
            selected_index: self.selected,
            has_valid_selection: self.selected.is_some(),
            target_enemy_id: self.target_id,
            is_boss_wave: self.is_boss_wave(),
            boss_health_percent: self
                .boss
                .as_ref()
                .map(|b| b.health as f32 / b.max_health as f32),
            player_x: self.player_x,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn total_kills(&self) -> u32 {
        self.total_kills
    }

    pub fn target_enemy_id(&self) -> Option<u32> {
        self.target_id
    }

    pub fn solution_boxes(&self) -> &[i64] {
        &self.solution_boxes
    }

    pub fn powerups(&self) -> &PowerUpRegistry {
        &self.powerups
    }

    /// Correct hits over shots fired, 1.0 before the first shot
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            1.0
        } else {
            self.correct_hits as f32 / self.shots_fired as f32
        }
    }

    /// Whether the current wave is (still) a boss encounter
    pub fn is_boss_wave(&self) -> bool {
        self.wave % 5 == 0 && !self.practice_mode() && !self.boss_defeated
    }

    // ── command handling ──────────────────────────────────────────────

    fn drain_commands(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::SelectAnswer(index) => self.do_select(index),
            Command::Fire => self.do_fire(),
            Command::SetMovement(dir) => {
                self.move_dir = match dir {
                    MoveDir::Left => -1.0,
                    MoveDir::Stop => 0.0,
                    MoveDir::Right => 1.0,
                }
            }
            Command::PauseToggle => match self.phase {
                GamePhase::Playing => self.phase = GamePhase::Paused,
                GamePhase::Paused => self.phase = GamePhase::Playing,
                _ => {}
            },
            Command::Restart => self.restart(),
        }
    }

    fn do_select(&mut self, index: usize) {
        if self.phase != GamePhase::Playing {
            return;
        }
        if self.target_id.is_none() || index >= self.solution_boxes.len() {
            log::debug!("selection {index} rejected: no target or out of range");
            return;
        }
        self.selected = Some(index);
        if self.config.auto_fire_on_select {
            self.do_fire();
        }
    }

    fn do_fire(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let Some(target_id) = self.target_id else {
            log::debug!("fire rejected: no target");
            return;
        };
        let Some((tid, tpos, answer)) = self
            .world
            .enemy(target_id)
            .map(|e| (e.id, e.pos, e.answer()))
        else {
            log::debug!("fire rejected: stale target");
            return;
        };

        // Auto-solve charges bypass selection and supply the right answer.
        let auto_solve = self.powerups.active_count(PowerUpKind::AutoSolve) > 0;
        let value = if auto_solve {
            answer
        } else {
            let Some(selected) = self.selected else {
                log::debug!("fire rejected: no valid selection");
                return;
            };
            match self.solution_boxes.get(selected) {
                Some(&value) => value,
                None => return,
            }
        };

        if self
            .world
            .fire_projectile(value, self.player_x, Some((tid, tpos)))
            .is_some()
        {
            // The charge is only spent once the shot actually launches.
            if auto_solve {
                self.powerups.consume(PowerUpKind::AutoSolve);
            }
            self.shots_fired += 1;
            self.events.push(GameEvent::ShotFired);
        }
    }

    // ── spawning ──────────────────────────────────────────────────────

    fn practice_mode(&self) -> bool {
        matches!(self.config.mode, GameMode::Practice { .. })
    }

    fn next_equation(&mut self) -> Equation {
        match self.config.mode {
            GameMode::Practice { op, level } => {
                equation::generate_practice(op, level, &mut self.rng)
            }
            GameMode::DailyChallenge { .. } => self
                .daily_queue
                .pop_front()
                .unwrap_or_else(|| equation::generate(self.difficulty, &mut self.rng)),
            GameMode::Standard => equation::generate(self.difficulty, &mut self.rng),
        }
    }

    fn wave_budget(&self) -> u32 {
        5 + self.wave
    }

    fn spawn_delay_ticks(&self) -> u64 {
        // An empty field spawns almost immediately to avoid idle time.
        if !self.world.has_live_enemies() {
            return 24;
        }
        (110u64.saturating_sub(6 * self.wave as u64)).clamp(45, 110)
    }

    fn spawn_initial(&mut self) {
        if self.is_boss_wave() {
            self.spawn_boss();
        } else {
            self.spawn_regular_enemy();
        }
        self.retarget();
    }

    fn try_spawn(&mut self) {
        if self.wave % 5 == 0 && !self.practice_mode() {
            // Boss waves never spawn regular enemies. The boss arrives once
            // the field is otherwise clear, and only if still undefeated.
            if self.is_boss_wave() && self.boss.is_none() && !self.world.has_live_enemies() {
                self.spawn_boss();
            }
            return;
        }
        if self.spawned_this_wave >= self.wave_budget() {
            return;
        }
        if !self.world.can_spawn_enemy() {
            return;
        }
        if self.time_ticks - self.last_spawn_tick >= self.spawn_delay_ticks() {
            self.spawn_regular_enemy();
        }
    }

    fn spawn_regular_enemy(&mut self) {
        let equation = self.next_equation();
        let speed = ENEMY_BASE_SPEED * (1.0 + 0.08 * (self.wave - 1) as f32);
        self.world.spawn_enemy(equation, speed, false, &mut self.rng);
        self.spawned_this_wave += 1;
        self.last_spawn_tick = self.time_ticks;
    }

    fn spawn_boss(&mut self) {
        let health = 10 + self.wave;
        let mut queue: VecDeque<Equation> =
            equation::boss_sequence(self.wave, health as usize, &mut self.rng).into();
        let Some(first) = queue.pop_front() else {
            return;
        };
        self.world.spawn_enemy(first, BOSS_SPEED, true, &mut self.rng);
        self.boss = Some(BossFight {
            health,
            max_health: health,
            queue,
        });
        self.last_spawn_tick = self.time_ticks;
        log::info!("boss wave {}: {health} hits to clear", self.wave);
        self.events.push(GameEvent::BossSpawned {
            wave: self.wave,
            health,
        });
    }

    fn maybe_spawn_pickup(&mut self) {
        if self.world.pickups.len() >= MAX_PICKUPS {
            return;
        }
        if !self.rng.random_bool(PICKUP_SPAWN_CHANCE) {
            return;
        }
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        self.world.spawn_pickup(kind, &mut self.rng);
    }

    // ── targeting ─────────────────────────────────────────────────────

    fn needs_retarget(&self) -> bool {
        match self.target_id {
            Some(id) => !self.world.enemies.iter().any(|e| e.id == id && e.alive),
            None => self.world.has_live_enemies(),
        }
    }

    /// Pick the next target (lowest-id non-boss, falling back to the boss)
    /// and rebuild the solution boxes for it. With nothing left on the
    /// field, targeting clears and the boxes empty out, never stale.
    fn retarget(&mut self) {
        let target = self
            .world
            .enemies
            .iter()
            .filter(|e| e.alive && !e.is_boss)
            .min_by_key(|e| e.id)
            .or_else(|| {
                self.world
                    .enemies
                    .iter()
                    .filter(|e| e.alive)
                    .min_by_key(|e| e.id)
            })
            .map(|e| (e.id, e.answer()));
        match target {
            Some((id, answer)) => {
                self.target_id = Some(id);
                self.solution_boxes = distractor::generate(answer, self.difficulty, &mut self.rng);
            }
            None => {
                self.target_id = None;
                self.solution_boxes.clear();
            }
        }
        self.selected = None;
    }

    fn targeting_consistent(&self) -> bool {
        match self.target_id {
            Some(id) => {
                self.world.enemies.iter().any(|e| e.id == id && e.alive)
                    && !self.solution_boxes.is_empty()
            }
            None => self.solution_boxes.is_empty(),
        }
    }

    // ── scoring and hits ──────────────────────────────────────────────

    fn combo_multiplier(&self) -> f32 {
        (1.0 + 0.1 * self.combo as f32).min(3.0)
    }

    fn award_points(&mut self) -> u64 {
        let base = 10 * self.wave as u64 + 5 * self.difficulty as u64;
        let mut points = (base as f32 * self.combo_multiplier()) as u64;
        if self.powerups.is_active(PowerUpKind::DoublePoints) {
            points *= 2;
        }
        self.score += points;
        points
    }

    fn register_kill(&mut self) {
        self.combo += 1;
        self.total_kills += 1;
        self.correct_hits += 1;
        if self.config.adaptive_difficulty && !self.practice_mode() {
            let tier = (1 + self.total_kills / KILLS_PER_TIER).min(MAX_DIFFICULTY as u32) as u8;
            if tier > self.difficulty {
                self.difficulty = tier;
                let (title, detail) = difficulty_title(tier);
                log::info!("difficulty tier {tier}: {title}");
                self.events.push(GameEvent::DifficultyUpgraded {
                    level: tier,
                    title: title.to_string(),
                    detail: detail.to_string(),
                });
            }
        }
        self.selected = None;
        self.retarget();
    }

    fn apply_hit(&mut self, hit: HitResult) {
        // Spend the projectile whatever the outcome.
        match self
            .world
            .projectiles
            .iter_mut()
            .find(|p| p.id == hit.projectile_id)
        {
            Some(p) if p.active => p.active = false,
            _ => return,
        }
        let Some(idx) = self
            .world
            .enemies
            .iter()
            .position(|e| e.id == hit.enemy_id && e.alive)
        else {
            return;
        };

        if !hit.correct {
            self.combo = 0;
            if self.config.clear_selection_on_miss {
                self.selected = None;
            }
            self.events.push(GameEvent::HitWrong {
                enemy_id: hit.enemy_id,
            });
            // Boxes and targeting stay put so the player can retry.
            return;
        }

        if self.world.enemies[idx].is_boss {
            let (health_left, next_eq) = match self.boss.as_mut() {
                Some(fight) => {
                    fight.health = fight.health.saturating_sub(1);
                    (fight.health, fight.queue.pop_front())
                }
                None => (0, None),
            };
            let points = self.award_points();
            self.events.push(GameEvent::HitCorrect {
                enemy_id: hit.enemy_id,
                points,
            });
            if health_left > 0 {
                if let Some(eq) = next_eq {
                    self.world.advance_boss_equation(hit.enemy_id, eq);
                }
            } else {
                self.world.enemies[idx].alive = false;
                let bonus = self.wave as u64 * 100;
                self.score += bonus;
                self.boss = None;
                self.boss_defeated = true;
                log::info!("boss down on wave {}, +{bonus}", self.wave);
                self.events.push(GameEvent::BossDefeated {
                    wave: self.wave,
                    bonus,
                });
            }
            self.register_kill();
        } else {
            self.world.enemies[idx].alive = false;
            let points = self.award_points();
            self.events.push(GameEvent::HitCorrect {
                enemy_id: hit.enemy_id,
                points,
            });
            self.register_kill();
        }
    }

    // ── escapes, waves, game over ─────────────────────────────────────

    fn handle_escape(&mut self, enemy: &Enemy) {
        self.events.push(GameEvent::EnemyEscaped { enemy_id: enemy.id });
        if enemy.is_boss {
            // An escaped boss resets the encounter; it respawns once the
            // field is clear again.
            self.boss = None;
        }
        if self.powerups.consume(PowerUpKind::Shield) {
            self.events.push(GameEvent::ShieldAbsorbed);
            return;
        }
        if self.powerups.consume(PowerUpKind::ExtraLife) {
            log::debug!("extra-life token spent on escape");
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        self.combo = 0;
        self.events.push(GameEvent::LifeLost {
            lives_left: self.lives,
        });
    }

    fn check_wave_complete(&mut self) {
        if self.phase != GamePhase::Playing || self.world.has_live_enemies() {
            return;
        }
        let quota_spent = if self.wave % 5 == 0 && !self.practice_mode() {
            self.boss_defeated
        } else {
            self.spawned_this_wave >= self.wave_budget()
        };
        if !quota_spent {
            return;
        }
        let base_delay = (110u64.saturating_sub(6 * self.wave as u64)).clamp(45, 110);
        if self.time_ticks.saturating_sub(self.last_spawn_tick) <= base_delay * 2 {
            return;
        }

        let completed = self.wave;
        let bonus = (50.0 * self.accuracy()).round() as u64;
        self.score += bonus;
        self.wave += 1;
        self.phase = GamePhase::WaveComplete;
        self.wave_complete_ticks = WAVE_COMPLETE_TICKS;
        log::info!("wave {completed} complete, +{bonus} accuracy bonus");
        self.events.push(GameEvent::WaveCompleted {
            wave: completed,
            bonus,
        });
    }

    fn begin_wave(&mut self) {
        self.phase = GamePhase::Playing;
        self.spawned_this_wave = 0;
        self.boss_defeated = false;
        self.last_spawn_tick = self.time_ticks;
        self.spawn_initial();
    }
}
