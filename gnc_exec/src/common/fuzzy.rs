//! Fuzzy membership and rule weight calculations
//!
//! The Takagi-Sugeno controllers partition each scheduling variable into a
//! "low" and a "high" fuzzy set with complementary linear membership
//! functions, saturated outside the variable's design bounds. Rule weights
//! are the products of one grade from each variable, and the control output
//! is the weighted sum of each rule's linear state feedback.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Membership grades of a scheduling variable in the low and high sets.
///
/// The grades are each in `[0, 1]` and always sum to 1.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct Grades {
    pub low: f64,
    pub high: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Grades {
    /// Grade `z` against the design bounds `[min, max]`.
    ///
    /// Below `min` the variable is entirely low, above `max` entirely high.
    /// Degenerate bounds (`min == max`) give a hard switch at `max`.
    pub fn of(z: f64, min: f64, max: f64) -> Self {
        let high = if (max - min).abs() < std::f64::EPSILON {
            if z >= max { 1.0 } else { 0.0 }
        }
        else {
            clamp(lin_map((min, max), (0.0, 1.0), z), 0.0, 1.0)
        };

        Self::from_high(high)
    }

    /// Build the grades from the high-set grade, which is limited to `[0, 1]`.
    ///
    /// A `NAN` grade is treated as fully low.
    pub fn from_high(high: f64) -> Self {
        let high = if high.is_nan() { 0.0 } else { clamp(high, 0.0, 1.0) };

        Self {
            low: 1.0 - high,
            high,
        }
    }

    /// The grades ordered low set first.
    pub fn low_first(&self) -> [f64; 2] {
        [self.low, self.high]
    }

    /// The grades ordered high set first.
    pub fn high_first(&self) -> [f64; 2] {
        [self.high, self.low]
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the rule weights from the grade pairs of each scheduling
/// variable.
///
/// Rules are enumerated with the first variable outermost, so for three
/// variables `weights[i*4 + j*2 + k] = grades[0][i] * grades[1][j] *
/// grades[2][k]`. `weights` must have `2^grades.len()` elements.
pub fn rule_weights(grades: &[[f64; 2]], weights: &mut [f64]) {
    let num_vars = grades.len();

    debug_assert_eq!(weights.len(), 1 << num_vars);

    for (rule, w) in weights.iter_mut().enumerate() {
        *w = grades
            .iter()
            .enumerate()
            .map(|(var, pair)| pair[(rule >> (num_vars - 1 - var)) & 1])
            .product();
    }
}

/// Blend the linear state feedback of each rule: `sum_i w_i * (F_i . x)`.
pub fn blend_feedback<const N: usize>(
    weights: &[f64],
    gains: &[[f64; N]],
    state: &[f64; N]
) -> f64 {
    weights
        .iter()
        .zip(gains.iter())
        .map(|(w, row)| w * row.iter().zip(state.iter()).map(|(f, x)| f * x).sum::<f64>())
        .sum()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_grades_clamped() {
        let g = Grades::of(-10.0, -1.0, 1.0);
        assert_eq!(g, Grades { low: 1.0, high: 0.0 });

        let g = Grades::of(10.0, -1.0, 1.0);
        assert_eq!(g, Grades { low: 0.0, high: 1.0 });

        let g = Grades::of(0.0, -1.0, 1.0);
        assert_abs_diff_eq!(g.low, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(g.high, 0.5, epsilon = 1e-12);

        // Degenerate bounds
        assert_eq!(Grades::of(1.0, 1.0, 1.0).high, 1.0);
        assert_eq!(Grades::of(0.9, 1.0, 1.0).high, 0.0);

        // NAN grades fall back to low
        assert_eq!(Grades::from_high(std::f64::NAN), Grades { low: 1.0, high: 0.0 });
    }

    #[test]
    fn test_rule_weights_order() {
        let grades = [[0.1, 0.9], [0.2, 0.8], [0.3, 0.7]];
        let mut w = [0.0; 8];
        rule_weights(&grades, &mut w);

        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    let expected = grades[0][i] * grades[1][j] * grades[2][k];
                    assert_abs_diff_eq!(w[i * 4 + j * 2 + k], expected, epsilon = 1e-15);
                }
            }
        }
    }

    #[test]
    fn test_rule_weights_sum_to_one() {
        // Sweep all three variables across and beyond their bounds
        let bounds = [(-0.2, -0.8), (10.0, 14.0), (0.07, 0.32)];
        let mut w3 = [0.0; 8];
        let mut w2 = [0.0; 4];

        for a in 0..=20 {
            for b in 0..=20 {
                for c in 0..=20 {
                    let frac = |n: i32| (n as f64 - 5.0) / 10.0;
                    let z = [
                        bounds[0].0 + frac(a) * (bounds[0].1 - bounds[0].0),
                        bounds[1].0 + frac(b) * (bounds[1].1 - bounds[1].0),
                        bounds[2].0 + frac(c) * (bounds[2].1 - bounds[2].0),
                    ];

                    let grades = [
                        Grades::of(z[0], bounds[0].1, bounds[0].0).low_first(),
                        Grades::of(z[1], bounds[1].0, bounds[1].1).low_first(),
                        Grades::of(z[2], bounds[2].0, bounds[2].1).low_first(),
                    ];
                    rule_weights(&grades, &mut w3);
                    assert_abs_diff_eq!(w3.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
                    assert!(w3.iter().all(|w| *w >= 0.0 && *w <= 1.0));

                    rule_weights(&grades[..2], &mut w2);
                    assert_abs_diff_eq!(w2.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_rule_weights_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut w3 = [0.0; 8];
        let mut w2 = [0.0; 4];

        for n in 0..5000 {
            // Random bounds, every tenth pair degenerate, with values drawn
            // well outside them
            let mut grades = [[0.0; 2]; 3];
            for g in grades.iter_mut() {
                let min: f64 = rng.gen_range(-100.0..100.0);
                let max = if n % 10 == 0 { min } else { min + rng.gen_range(1e-6..50.0) };
                let z = rng.gen_range(min - 200.0..max + 200.0);

                let grade = Grades::of(z, min, max);
                assert!(grade.low >= 0.0 && grade.low <= 1.0);
                assert!(grade.high >= 0.0 && grade.high <= 1.0);
                *g = grade.low_first();
            }

            rule_weights(&grades, &mut w3);
            assert_abs_diff_eq!(w3.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(w3.iter().all(|w| *w >= 0.0 && *w <= 1.0));

            rule_weights(&grades[1..], &mut w2);
            assert_abs_diff_eq!(w2.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(w2.iter().all(|w| *w >= 0.0 && *w <= 1.0));
        }
    }

    #[test]
    fn test_blend_feedback() {
        let weights = [0.25, 0.75];
        let gains = [[1.0, 2.0], [3.0, 4.0]];
        let state = [1.0, -1.0];

        // 0.25 * (1 - 2) + 0.75 * (3 - 4)
        assert_abs_diff_eq!(blend_feedback(&weights, &gains, &state), -1.0, epsilon = 1e-12);
    }
}
