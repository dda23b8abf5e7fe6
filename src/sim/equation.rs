//! Procedural equation generation
//!
//! Every generator arm builds the display text and the answer from the same
//! operands, so the text always evaluates exactly to the returned answer.
//! All randomness comes through an injected `Rng`, which is what makes
//! seeded daily challenges reproducible.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::PracticeOp;

/// A displayable problem and its integer answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    pub text: String,
    pub answer: i64,
}

impl Equation {
    fn new(text: String, answer: i64) -> Self {
        Self { text, answer }
    }
}

/// Number of problems in a daily-challenge batch
pub const DAILY_BATCH_SIZE: usize = 50;

/// Boss equations never exceed this difficulty
const BOSS_DIFFICULTY_CAP: u32 = 8;

const FIB: [i64; 16] = [
    1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987,
];

/// Generate one equation at the given difficulty tier.
///
/// Tiers compose: a level draws from a sliding window of the forms it has
/// unlocked, so a level-6 player still sees the occasional times-table
/// question next to the new powers and roots.
pub fn generate(difficulty: u8, rng: &mut impl Rng) -> Equation {
    let difficulty = difficulty.clamp(1, 10);
    let lo = difficulty.saturating_sub(3).max(1);
    let tier = rng.random_range(lo..=difficulty);
    equation_for_tier(tier, rng)
}

fn equation_for_tier(tier: u8, rng: &mut impl Rng) -> Equation {
    match tier {
        1 => add_sub(rng),
        2 => {
            if rng.random_bool(0.5) {
                single_digit_mul(rng)
            } else {
                add_sub(rng)
            }
        }
        3 => exact_division(rng),
        4 => two_step(rng),
        5 => fraction_decimal(rng),
        6 => power_or_root(rng),
        7 => negative(rng),
        8 => multi_term(rng),
        9 => three_digit_or_percent(rng),
        _ => composed(rng),
    }
}

/// Level 1: 1-2 digit addition/subtraction, subtraction kept non-negative.
fn add_sub(rng: &mut impl Rng) -> Equation {
    let a = rng.random_range(1i64..=99);
    let b = rng.random_range(1i64..=99);
    if rng.random_bool(0.5) {
        Equation::new(format!("{a} + {b}"), a + b)
    } else {
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        Equation::new(format!("{hi} - {lo}"), hi - lo)
    }
}

fn single_digit_mul(rng: &mut impl Rng) -> Equation {
    let a = rng.random_range(2i64..=9);
    let b = rng.random_range(2i64..=9);
    Equation::new(format!("{a} × {b}"), a * b)
}

/// Dividend is built as divisor × quotient, so the answer is always integral.
fn exact_division(rng: &mut impl Rng) -> Equation {
    let divisor = rng.random_range(2i64..=9);
    let quotient = rng.random_range(2i64..=12);
    Equation::new(format!("{} ÷ {}", divisor * quotient, divisor), quotient)
}

/// Level 4: two-step expressions; multiplication binds tighter in both the
/// displayed text and the computed answer.
fn two_step(rng: &mut impl Rng) -> Equation {
    let b = rng.random_range(2i64..=9);
    let c = rng.random_range(2i64..=9);
    match rng.random_range(0..3) {
        0 => {
            let a = rng.random_range(1i64..=20);
            Equation::new(format!("{a} + {b} × {c}"), a + b * c)
        }
        1 => {
            let a = rng.random_range(1i64..=20);
            Equation::new(format!("{b} × {c} + {a}"), b * c + a)
        }
        _ => {
            let a = rng.random_range(1i64..=b * c);
            Equation::new(format!("{b} × {c} - {a}"), b * c - a)
        }
    }
}

/// Level 5: fraction/decimal flavored text, integer answers by construction.
fn fraction_decimal(rng: &mut impl Rng) -> Equation {
    match rng.random_range(0..4) {
        0 => {
            let k = rng.random_range(5i64..=40);
            Equation::new(format!("1/2 of {}", 2 * k), k)
        }
        1 => {
            let k = rng.random_range(3i64..=20);
            Equation::new(format!("1/4 of {}", 4 * k), k)
        }
        2 => {
            let k = rng.random_range(3i64..=20);
            Equation::new(format!("3/4 of {}", 4 * k), 3 * k)
        }
        _ => {
            // Two halves make the sum whole.
            let a = rng.random_range(1i64..=20);
            let b = rng.random_range(1i64..=20);
            Equation::new(format!("{a}.5 + {b}.5"), a + b + 1)
        }
    }
}

/// Level 6: small integer powers and perfect-square roots.
fn power_or_root(rng: &mut impl Rng) -> Equation {
    match rng.random_range(0..3) {
        0 => {
            let b = rng.random_range(2i64..=12);
            Equation::new(format!("{b}²"), b * b)
        }
        1 => {
            let b = rng.random_range(2i64..=6);
            Equation::new(format!("{b}³"), b * b * b)
        }
        _ => {
            let r = rng.random_range(2i64..=12);
            Equation::new(format!("√{}", r * r), r)
        }
    }
}

/// Level 7: negative results and negative operands.
fn negative(rng: &mut impl Rng) -> Equation {
    let a = rng.random_range(1i64..=30);
    let b = rng.random_range(1i64..=30);
    match rng.random_range(0..3) {
        0 => {
            let bigger = a + rng.random_range(1i64..=30);
            Equation::new(format!("{a} - {bigger}"), a - bigger)
        }
        1 => Equation::new(format!("-{a} + {b}"), b - a),
        _ => Equation::new(format!("-{a} - {b}"), -(a + b)),
    }
}

/// Level 8: multi-term expressions.
fn multi_term(rng: &mut impl Rng) -> Equation {
    if rng.random_bool(0.5) {
        let a = rng.random_range(1i64..=30);
        let b = rng.random_range(1i64..=30);
        let c = rng.random_range(1i64..=30);
        let d = rng.random_range(1i64..=30);
        Equation::new(format!("{a} + {b} - {c} + {d}"), a + b - c + d)
    } else {
        let a = rng.random_range(2i64..=9);
        let b = rng.random_range(2i64..=9);
        let c = rng.random_range(1i64..=20);
        let d = rng.random_range(1i64..=20);
        Equation::new(format!("{a} × {b} + {c} - {d}"), a * b + c - d)
    }
}

/// Level 9: 3-digit arithmetic and percentage-of-value problems.
fn three_digit_or_percent(rng: &mut impl Rng) -> Equation {
    match rng.random_range(0..3) {
        0 => {
            let a = rng.random_range(100i64..=999);
            let b = rng.random_range(100i64..=999);
            Equation::new(format!("{a} + {b}"), a + b)
        }
        1 => {
            let a = rng.random_range(100i64..=999);
            let b = rng.random_range(100i64..=999);
            let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
            Equation::new(format!("{hi} - {lo}"), hi - lo)
        }
        _ => {
            const PERCENTS: [i64; 5] = [10, 20, 25, 50, 75];
            let p = PERCENTS[rng.random_range(0..PERCENTS.len())];
            // Multiples of 20 divide evenly under every percent above.
            let v = 20 * rng.random_range(1i64..=25);
            Equation::new(format!("{p}% of {v}"), p * v / 100)
        }
    }
}

/// Level 10+: parenthesized two-step expressions, powers, roots, and the
/// Fibonacci next-value variant.
fn composed(rng: &mut impl Rng) -> Equation {
    match rng.random_range(0..5) {
        0 => {
            let a = rng.random_range(2i64..=20);
            let b = rng.random_range(2i64..=20);
            let c = rng.random_range(2i64..=9);
            Equation::new(format!("({a} + {b}) × {c}"), (a + b) * c)
        }
        1 => {
            let b = rng.random_range(2i64..=19);
            let a = rng.random_range(b + 1..=b + 20);
            let c = rng.random_range(2i64..=9);
            Equation::new(format!("({a} - {b}) × {c}"), (a - b) * c)
        }
        2 => {
            let a = rng.random_range(2i64..=12);
            let b = rng.random_range(1i64..=50);
            Equation::new(format!("{a}² + {b}"), a * a + b)
        }
        3 => {
            let r = rng.random_range(2i64..=10);
            let m = rng.random_range(2i64..=9);
            Equation::new(format!("√{} × {m}", r * r), r * m)
        }
        _ => fibonacci_next(rng),
    }
}

/// Show five consecutive Fibonacci values and ask for the next.
fn fibonacci_next(rng: &mut impl Rng) -> Equation {
    let start = rng.random_range(0..=10usize);
    let shown = &FIB[start..start + 5];
    let text = format!(
        "{}, {}, {}, {}, {}, ?",
        shown[0], shown[1], shown[2], shown[3], shown[4]
    );
    Equation::new(text, FIB[start + 5])
}

fn practice_operand_range(level: u8) -> (i64, i64) {
    match level {
        0 | 1 => (10, 99),
        2 => (100, 999),
        3 => (1_000, 9_999),
        _ => (10_000, 99_999),
    }
}

/// Single-operation drill at a digit-width tier (1 = 2-digit operands up to
/// 4 = 5-digit). Subtraction and division always yield non-negative
/// integers; multiplication and division pair the wide operand with a
/// single-digit co-operand to keep answers at mental-math scale.
pub fn generate_practice(op: PracticeOp, level: u8, rng: &mut impl Rng) -> Equation {
    let (lo, hi) = practice_operand_range(level);
    match op {
        PracticeOp::Addition => {
            let a = rng.random_range(lo..=hi);
            let b = rng.random_range(lo..=hi);
            Equation::new(format!("{a} + {b}"), a + b)
        }
        PracticeOp::Subtraction => {
            let a = rng.random_range(lo..=hi);
            let b = rng.random_range(lo..=hi);
            let (big, small) = if a >= b { (a, b) } else { (b, a) };
            Equation::new(format!("{big} - {small}"), big - small)
        }
        PracticeOp::Multiplication => {
            let a = rng.random_range(lo..=hi);
            let b = rng.random_range(2i64..=9);
            Equation::new(format!("{a} × {b}"), a * b)
        }
        PracticeOp::Division => {
            let quotient = rng.random_range(lo..=hi);
            let divisor = rng.random_range(2i64..=9);
            Equation::new(format!("{} ÷ {}", quotient * divisor, divisor), quotient)
        }
    }
}

/// Equations for a boss encounter, consumed one per hit.
pub fn boss_sequence(wave: u32, count: usize, rng: &mut impl Rng) -> Vec<Equation> {
    let difficulty = (wave + 2).min(BOSS_DIFFICULTY_CAP) as u8;
    (0..count).map(|_| generate(difficulty, rng)).collect()
}

/// The 50-problem daily batch for a given seed. Same seed, same problems,
/// the whole point of the daily challenge.
pub fn daily_batch(seed: u64) -> Vec<Equation> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..DAILY_BATCH_SIZE)
        .map(|i| {
            let difficulty = (1 + i / 5).min(10) as u8;
            generate(difficulty, &mut rng)
        })
        .collect()
}
