//! Solution-box generation: plausible wrong answers around the correct one.

use rand::Rng;
use rand::seq::SliceRandom;

/// Hard cap on candidate attempts. If the palette can't produce enough
/// unique values by then, ship the smaller set rather than spin.
const MAX_ATTEMPTS: u32 = 50;

/// Offsets grow with difficulty so wrong answers stay plausible: a ±1 slip
/// next to "7 + 5" but a ±20 slip next to a three-digit sum.
fn offset_palette(difficulty: u8) -> &'static [i64] {
    match difficulty {
        0..=2 => &[1, 2, 3],
        3..=4 => &[1, 2, 3, 4, 5],
        5..=6 => &[1, 2, 3, 5, 7, 10],
        7..=8 => &[1, 2, 4, 5, 8, 10, 12, 15],
        _ => &[1, 2, 5, 8, 10, 12, 15, 20],
    }
}

/// Boxes shown to the player: a fourth choice appears past difficulty 3.
pub fn box_count(difficulty: u8) -> usize {
    if difficulty > 3 { 4 } else { 3 }
}

/// Build the shuffled solution-box set for a correct answer. The correct
/// answer appears exactly once; at difficulty ≤ 2 negative candidates are
/// reflected positive so early answers stay non-negative.
pub fn generate(correct: i64, difficulty: u8, rng: &mut impl Rng) -> Vec<i64> {
    let count = box_count(difficulty);
    let palette = offset_palette(difficulty);

    let mut boxes = vec![correct];
    let mut attempts = 0;
    while boxes.len() < count && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let delta = palette[rng.random_range(0..palette.len())];
        let mut candidate = if rng.random_bool(0.5) {
            correct + delta
        } else {
            correct - delta
        };
        if difficulty <= 2 && candidate < 0 {
            candidate = -candidate;
        }
        if candidate == correct || boxes.contains(&candidate) {
            continue;
        }
        boxes.push(candidate);
    }

    boxes.shuffle(rng);
    boxes
}
