//! Generator properties: every displayed problem must evaluate exactly to
//! its returned answer, and solution boxes must stay well-formed.
//!
//! The evaluator below covers the generator's whole display grammar:
//! numbers (including decimals), + - × ÷ with standard precedence,
//! parentheses, ² and ³ postfixes, √, "p% of v" and "p/q of v" forms, and
//! the trailing-"?" next-value sequences.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use math_shooter::config::PracticeOp;
use math_shooter::sim::distractor;
use math_shooter::sim::equation::{self, DAILY_BATCH_SIZE};

// ── display-grammar evaluator ────────────────────────────────────────────────

fn eval(text: &str) -> Option<f64> {
    // Next-value sequences: the shown terms obey t[n] = t[n-1] + t[n-2],
    // and so must the asked-for value.
    if let Some(shown) = text.strip_suffix(", ?") {
        let terms: Vec<f64> = shown
            .split(", ")
            .map(|t| t.parse().ok())
            .collect::<Option<_>>()?;
        if terms.len() < 3 {
            return None;
        }
        for window in terms.windows(3) {
            if window[2] != window[0] + window[1] {
                return None;
            }
        }
        return Some(terms[terms.len() - 1] + terms[terms.len() - 2]);
    }

    // "25% of 320" and "3/4 of 40" forms.
    if let Some((lhs, rhs)) = text.split_once(" of ") {
        let value = eval(rhs)?;
        if let Some(pct) = lhs.strip_suffix('%') {
            let p: f64 = pct.parse().ok()?;
            return Some(p * value / 100.0);
        }
        if let Some((num, den)) = lhs.split_once('/') {
            let n: f64 = num.parse().ok()?;
            let d: f64 = den.parse().ok()?;
            return Some(n * value / d);
        }
        return None;
    }

    Parser::new(text).run()
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    fn run(mut self) -> Option<f64> {
        let value = self.expr()?;
        self.skip_ws();
        if self.chars.next().is_some() {
            return None;
        }
        Some(value)
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    acc += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    acc -= self.term()?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.factor()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some('×') => {
                    self.chars.next();
                    acc *= self.factor()?;
                }
                Some('÷') => {
                    self.chars.next();
                    acc /= self.factor()?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn factor(&mut self) -> Option<f64> {
        self.skip_ws();
        match self.chars.peek()? {
            '√' => {
                self.chars.next();
                Some(self.factor()?.sqrt())
            }
            '-' => {
                self.chars.next();
                Some(-self.factor()?)
            }
            '(' => {
                self.chars.next();
                let value = self.expr()?;
                self.skip_ws();
                if self.chars.next()? != ')' {
                    return None;
                }
                self.postfix(value)
            }
            c if c.is_ascii_digit() => {
                let value = self.number()?;
                self.postfix(value)
            }
            _ => None,
        }
    }

    fn postfix(&mut self, value: f64) -> Option<f64> {
        match self.chars.peek() {
            Some('²') => {
                self.chars.next();
                Some(value * value)
            }
            Some('³') => {
                self.chars.next();
                Some(value * value * value)
            }
            _ => Some(value),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> Option<f64> {
        let mut digits = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                digits.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        digits.parse().ok()
    }
}

#[test]
fn evaluator_sanity() {
    assert_eq!(eval("2 + 3 × 4"), Some(14.0));
    assert_eq!(eval("(2 + 3) × 4"), Some(20.0));
    assert_eq!(eval("84 ÷ 7"), Some(12.0));
    assert_eq!(eval("7²"), Some(49.0));
    assert_eq!(eval("√49 × 3"), Some(21.0));
    assert_eq!(eval("-5 + 12"), Some(7.0));
    assert_eq!(eval("3.5 + 2.5"), Some(6.0));
    assert_eq!(eval("25% of 320"), Some(80.0));
    assert_eq!(eval("3/4 of 40"), Some(30.0));
    assert_eq!(eval("2, 3, 5, 8, 13, ?"), Some(21.0));
    assert_eq!(eval("1, 2, 4, 8, ?"), None); // not an additive sequence
}

// ── core correctness property ────────────────────────────────────────────────

#[test]
fn text_evaluates_to_answer_at_every_tier() {
    for difficulty in 1..=10u8 {
        let mut rng = Pcg32::seed_from_u64(1_000 + difficulty as u64);
        for i in 0..10_000 {
            let eq = equation::generate(difficulty, &mut rng);
            let value = eval(&eq.text)
                .unwrap_or_else(|| panic!("unparseable text at tier {difficulty}: {:?}", eq.text));
            assert!(
                (value - eq.answer as f64).abs() < 1e-6,
                "tier {difficulty} iteration {i}: {:?} evaluates to {value}, answer says {}",
                eq.text,
                eq.answer
            );
        }
    }
}

#[test]
fn practice_drills_evaluate_and_stay_non_negative() {
    let ops = [
        PracticeOp::Addition,
        PracticeOp::Subtraction,
        PracticeOp::Multiplication,
        PracticeOp::Division,
    ];
    let mut rng = Pcg32::seed_from_u64(77);
    for op in ops {
        for level in 1..=4u8 {
            for _ in 0..1_000 {
                let eq = equation::generate_practice(op, level, &mut rng);
                assert_eq!(eval(&eq.text), Some(eq.answer as f64), "{:?}", eq.text);
                assert!(eq.answer >= 0, "negative drill answer: {:?}", eq.text);
            }
        }
    }
}

#[test]
fn boss_sequences_evaluate() {
    let mut rng = Pcg32::seed_from_u64(88);
    for wave in [5u32, 10, 15, 20] {
        for eq in equation::boss_sequence(wave, 15, &mut rng) {
            assert_eq!(eval(&eq.text), Some(eq.answer as f64), "{:?}", eq.text);
        }
    }
}

#[test]
fn daily_batch_is_date_deterministic_and_valid() {
    let seed = math_shooter::daily_seed(2026, 219);
    let first = equation::daily_batch(seed);
    let second = equation::daily_batch(seed);
    assert_eq!(first, second);
    assert_eq!(first.len(), DAILY_BATCH_SIZE);
    for eq in &first {
        assert_eq!(eval(&eq.text), Some(eq.answer as f64), "{:?}", eq.text);
    }
}

// ── distractor properties ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn solution_boxes_contain_correct_exactly_once(
        correct in -500i64..=500,
        difficulty in 1u8..=10,
        seed: u64,
    ) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let boxes = distractor::generate(correct, difficulty, &mut rng);

        prop_assert_eq!(boxes.iter().filter(|&&v| v == correct).count(), 1);
        let mut sorted = boxes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), boxes.len());
        let max_boxes = if difficulty > 3 { 4 } else { 3 };
        prop_assert!(boxes.len() <= max_boxes);
        // Termination, not size, is the guarantee at the retry cap.
        prop_assert!(!boxes.is_empty());
    }

    #[test]
    fn early_solution_boxes_stay_non_negative(
        correct in 0i64..=200,
        difficulty in 1u8..=2,
        seed: u64,
    ) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let boxes = distractor::generate(correct, difficulty, &mut rng);
        prop_assert!(boxes.iter().all(|&v| v >= 0));
    }
}
