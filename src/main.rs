//! Math Shooter entry point
//!
//! Headless demo driver: plays a seeded session with a simple bot that
//! picks the right answer most of the time, logs the interesting events,
//! and records the final score. Exercises the full public surface of the
//! simulation without any rendering.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use math_shooter::config::SessionConfig;
use math_shooter::consts::SIM_DT;
use math_shooter::highscores::HighScores;
use math_shooter::sim::session::{Command, GameEvent, GamePhase, GameSession};

const SCORES_PATH: &str = "highscores.json";
/// Ten simulated minutes
const MAX_TICKS: u64 = 10 * 60 * 60;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xC0FFEE);
    log::info!("starting demo session with seed {seed}");

    let config = SessionConfig {
        seed,
        ..Default::default()
    };
    let mut session = GameSession::new(config);
    let mut bot_rng = Pcg32::seed_from_u64(seed ^ 0x5EED);
    let mut scores = HighScores::load_from(SCORES_PATH);

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);

    for _ in 0..MAX_TICKS {
        bot_play(&mut session, &mut bot_rng);
        session.tick(SIM_DT);

        for event in session.drain_events() {
            match event {
                GameEvent::WaveCompleted { wave, bonus } => {
                    log::info!("wave {wave} complete (+{bonus})");
                }
                GameEvent::DifficultyUpgraded { level, title, detail } => {
                    log::info!("promoted to tier {level}: {title} ({detail})");
                }
                GameEvent::BossSpawned { wave, health } => {
                    log::info!("boss on wave {wave} with {health} health");
                }
                GameEvent::BossDefeated { wave, bonus } => {
                    log::info!("boss defeated on wave {wave} (+{bonus})");
                }
                GameEvent::GameOver {
                    score,
                    wave,
                    accuracy,
                } => {
                    println!(
                        "game over: score {score}, wave {wave}, accuracy {:.0}%",
                        accuracy * 100.0
                    );
                    if let Some(rank) = scores.add_score(score, wave, accuracy, timestamp) {
                        println!("new high score, rank #{rank}");
                    }
                    if let Err(err) = scores.save_to(SCORES_PATH) {
                        log::warn!("failed to save high scores: {err}");
                    }
                }
                _ => {}
            }
        }

        if session.phase() == GamePhase::GameOver {
            break;
        }
    }

    let snap = session.snapshot();
    println!(
        "final: score {}, wave {}, lives {}",
        snap.score, snap.wave, snap.lives
    );
}

/// Pick a solution box for the current target (the right one 90% of the
/// time) and fire. Keeps at most two shots in flight.
fn bot_play(session: &mut GameSession, rng: &mut Pcg32) {
    let snap = session.snapshot();
    if snap.phase != GamePhase::Playing {
        return;
    }
    if snap.projectiles.len() >= 2 || snap.solution_boxes.is_empty() {
        return;
    }
    let Some(target_id) = snap.target_enemy_id else {
        return;
    };
    let Some(answer) = snap
        .enemies
        .iter()
        .find(|e| e.id == target_id)
        .map(|e| e.equation.answer)
    else {
        return;
    };

    let pick = if rng.random_bool(0.9) {
        snap.solution_boxes.iter().position(|&v| v == answer)
    } else {
        Some(rng.random_range(0..snap.solution_boxes.len()))
    };
    if let Some(index) = pick {
        session.queue_command(Command::SelectAnswer(index));
        session.queue_command(Command::Fire);
    }
}
