//! Steering laws
//!
//! Each law produces a turn rate demand from the lateral error and the course
//! error of the trace being flown.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::FRAC_PI_2;

use super::{FuzzyParams, Params, SteerLawKind};
use crate::common::Grades;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Course errors smaller than this are treated as fully within the
/// small-error set of the fuzzy law.
///
/// The threshold is 2 degrees expressed in radians. Only errors inside it
/// skip the membership function (which is 0/0 at zero error); all larger
/// errors are graded by it.
const FUZZY_SMALL_COURSE_ERR_RAD: f64 = 2.0 * std::f64::consts::PI / 180.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Errors of the vehicle against the trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackErrors {
    /// Lateral error, positive when the trace lies to the vehicle's left.
    ///
    /// Units: meters
    pub lateral_m: f64,

    /// Ground course minus the trace direction, in `(-pi, pi]`.
    ///
    /// Units: radians
    pub course_err_rad: f64,
}

/// Speeds available to the laws.
#[derive(Debug, Clone, Copy, Default)]
pub struct LawSpeeds {
    /// Units: meters/second
    pub ground_ms: f64,

    /// Ground speed limited to the configured range.
    ///
    /// Units: meters/second
    pub ground_lim_ms: f64,

    /// Units: meters/second
    pub air_ms: f64,
}

/// A steering law and its gains, built once from the parameters.
#[derive(Debug, Clone)]
pub enum SteerLaw {
    Rational,
    Fuzzy(FuzzyLaw),
    Arctan { a: f64, b: f64 },
    Linear { a: f64, b: f64 },
    Carrot { dist_m: f64 },
}

/// Fuzzy state feedback with rules scheduled on ground speed and, for four
/// rules, on the course error.
#[derive(Debug, Clone)]
pub struct FuzzyLaw {
    num_rules: usize,
    course_err_max_rad: f64,
    gains: [[f64; 2]; 4],
    ground_speed_min_ms: f64,
    ground_speed_max_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerLaw {
    /// Build the law selected in the parameters.
    pub fn from_params(params: &Params) -> Self {
        match params.law {
            SteerLawKind::Rational => match params.fuzzy {
                Some(ref f) => SteerLaw::Fuzzy(FuzzyLaw::new(
                    f,
                    params.ground_speed_min_ms,
                    params.ground_speed_max_ms
                )),
                None => SteerLaw::Rational,
            },
            SteerLawKind::Arctan => SteerLaw::Arctan {
                a: params.law_gain_a,
                b: params.law_gain_b,
            },
            SteerLawKind::Linear => SteerLaw::Linear {
                a: params.law_gain_a,
                b: params.law_gain_b,
            },
            SteerLawKind::Carrot => SteerLaw::Carrot {
                dist_m: params.carrot_dist_m,
            },
        }
    }

    /// Compute the turn rate demand.
    ///
    /// Units: radians/second
    pub fn rate_demand(&self, err: &TrackErrors, speeds: &LawSpeeds) -> f64 {
        let y = err.lateral_m;
        let chi = err.course_err_rad;
        let v_g = speeds.ground_ms;

        match self {
            SteerLaw::Rational => speeds.ground_lim_ms * rational_feedback(y, chi),
            SteerLaw::Fuzzy(f) => speeds.ground_lim_ms * f.feedback(y, chi, v_g),
            SteerLaw::Arctan { a, b } => {
                -b * (chi + (a * y).atan()) - a * v_g * chi.sin() / (1.0 + a * a * y * y)
            },
            SteerLaw::Linear { a, b } => -(v_g * y + a * chi) / b,
            SteerLaw::Carrot { dist_m } => {
                let eta = if y.abs() < *dist_m {
                    -chi - (y / (dist_m * dist_m - y * y).sqrt()).atan()
                }
                else {
                    -chi - FRAC_PI_2 * y.signum()
                };

                2.0 * speeds.air_ms * clamp(eta, -FRAC_PI_2, FRAC_PI_2).sin() / dist_m
            },
        }
    }
}

impl FuzzyLaw {
    fn new(params: &FuzzyParams, ground_speed_min_ms: f64, ground_speed_max_ms: f64) -> Self {
        Self {
            num_rules: params.num_rules,
            course_err_max_rad: params.course_err_max_deg.to_radians(),
            gains: params.gains,
            ground_speed_min_ms,
            ground_speed_max_ms,
        }
    }

    /// Rule weights for the given ground speed and course error.
    pub fn weights(&self, course_err_rad: f64, ground_speed_ms: f64) -> [f64; 4] {
        let speed = Grades::of(ground_speed_ms, self.ground_speed_min_ms, self.ground_speed_max_ms);

        if self.num_rules == 2 {
            return [speed.high, speed.low, 0.0, 0.0];
        }

        // The small-error set follows how closely sin(x) is approximated by
        // x, which is exact for small errors and worst at the design maximum
        let x = course_err_rad;
        let small = if x.abs() < FUZZY_SMALL_COURSE_ERR_RAD {
            1.0
        }
        else if x.abs() > self.course_err_max_rad {
            0.0
        }
        else {
            let sinc_max = self.course_err_max_rad.sin() / self.course_err_max_rad;
            (x.sin() - sinc_max * x) / ((1.0 - sinc_max) * x)
        };
        let course = Grades::from_high(small);

        [
            speed.high * course.high,
            speed.high * course.low,
            speed.low * course.high,
            speed.low * course.low,
        ]
    }

    /// Blended state feedback.
    pub fn feedback(&self, lateral_m: f64, course_err_rad: f64, ground_speed_ms: f64) -> f64 {
        self.weights(course_err_rad, ground_speed_ms)
            .iter()
            .zip(self.gains.iter())
            .map(|(h, f)| -h * (f[0] * lateral_m + f[1] * course_err_rad))
            .sum()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Rational feedback `C(x1, x2) / p(x1, x2)` from sum-of-squares synthesis.
///
/// `p` is positive definite, so the feedback is defined everywhere.
pub fn rational_feedback(x1: f64, x2: f64) -> f64 {
    let c = -0.0013832 * x1.powi(3) - 0.020961 * x1.powi(2) * x2 + 0.068193 * x1 * x2.powi(2)
        - 0.34265 * x2.powi(3)
        - 1.3518e-10 * x1.powi(2) - 1.9737e-09 * x1 * x2 + 7.2815e-09 * x2.powi(2)
        - 0.096888 * x1 - 3.1216 * x2;

    let p = 0.78953 * x1.powi(2) - 1.8155 * x1 * x2 + 24.7114 * x2.powi(2)
        + 8.1027e-08 * x1 - 2.4228e-07 * x2 + 25.6252;

    c / p
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
