//! Serret-Frenet tracking error and control law

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use super::{PathPoint, Params};
use crate::common::{blend_feedback, rule_weights, Grades};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracking error in the Serret-Frenet frame of the target point.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FrenetError {
    /// Along-path error, positive when the vehicle is ahead of the target.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Cross-path error, positive when the vehicle is left of the path.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Desired course minus vehicle course, in `(-pi, pi]`.
    ///
    /// Units: radians
    pub course_err_rad: f64,
}

/// Fuzzy Frenet-frame control law.
#[derive(Debug, Clone)]
pub struct FrenetLaw {
    fx: [f64; 3],
    fchi: [[f64; 3]; 4],

    /// Design bounds of `z1 = (v_g cos chi_F + u_x) kappa`
    z1_bounds: (f64, f64),

    /// Design bounds of `z2 = v_g sin(chi_F) / chi_F`
    z2_bounds: (f64, f64),
}

/// Output of the control law.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LawOutput {
    /// Correction to the speed of the target point.
    ///
    /// Units: meters/second
    pub speed_corr_ms: f64,

    /// Turn rate feedback.
    ///
    /// Units: radians/second
    pub rate_fb_rads: f64,

    /// Scheduling variables `[z1, z2]`.
    pub sched: [f64; 2],

    /// Rule weights.
    pub rule_weights: [f64; 4],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FrenetError {
    /// Error of a vehicle at `pos_m` with course `course_rad` against the
    /// target point, all in the path frame.
    pub fn new(target: &PathPoint, pos_m: &Vector2<f64>, course_rad: f64) -> Self {
        let e = target.pos_m - pos_m;
        let (sin_d, cos_d) = target.course_rad.sin_cos();

        Self {
            x_m: -cos_d * e[0] + sin_d * e[1],
            y_m: -sin_d * e[0] - cos_d * e[1],
            course_err_rad: wrap_pi(target.course_rad - course_rad),
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x_m, self.y_m, self.course_err_rad]
    }
}

impl FrenetLaw {
    pub fn from_params(params: &Params) -> Self {
        let v_max = params.ground_speed_max_ms;
        let chi_max = params.course_err_max_deg.to_radians();
        let z1_scale = v_max + params.speed_corr_max_ms;

        Self {
            fx: params.fx,
            fchi: params.fchi,
            z1_bounds: (z1_scale * params.curvature_min_pm, z1_scale * params.curvature_max_pm),
            z2_bounds: (v_max * chi_max.sin() / chi_max, v_max),
        }
    }

    /// Evaluate the law for the error `err`, at ground speed `v_g_ms` on a
    /// path of curvature `curvature_pm`.
    pub fn evaluate(&self, err: &FrenetError, v_g_ms: f64, curvature_pm: f64) -> LawOutput {
        let x = err.as_array();
        let chi_f = err.course_err_rad;

        let speed_corr_ms = -self.fx.iter().zip(x.iter()).map(|(f, x)| f * x).sum::<f64>();

        let z1 = (v_g_ms * chi_f.cos() + speed_corr_ms) * curvature_pm;
        let z2 = if chi_f == 0.0 {
            v_g_ms
        }
        else {
            v_g_ms * chi_f.sin() / chi_f
        };

        let rule_weights = self.weights(z1, z2);

        LawOutput {
            speed_corr_ms,
            rate_fb_rads: -blend_feedback(&rule_weights, &self.fchi, &x),
            sched: [z1, z2],
            rule_weights,
        }
    }

    /// Rule weights `[K1 M1, K2 M1, K1 M2, K2 M2]`, where `M` grades `z1`
    /// and `K` grades `z2`, each with the high set first.
    pub fn weights(&self, z1: f64, z2: f64) -> [f64; 4] {
        let m = Grades::of(z1, self.z1_bounds.0, self.z1_bounds.1);
        let k = Grades::of(z2, self.z2_bounds.0, self.z2_bounds.1);

        let mut weights = [0.0; 4];
        rule_weights(&[m.high_first(), k.high_first()], &mut weights);

        weights
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn target(x: f64, y: f64, course_rad: f64) -> PathPoint {
        PathPoint {
            pos_m: Vector2::new(x, y),
            course_rad,
            ..Default::default()
        }
    }

    #[test]
    fn test_frenet_error() {
        // Target heading along +x from the origin
        let t = target(0.0, 0.0, 0.0);

        // Ahead of the target
        let e = FrenetError::new(&t, &Vector2::new(5.0, 0.0), 0.0);
        assert_abs_diff_eq!(e.x_m, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.y_m, 0.0, epsilon = 1e-12);

        // Left of the path (north of an eastbound path)
        let e = FrenetError::new(&t, &Vector2::new(0.0, 3.0), 0.1);
        assert_abs_diff_eq!(e.x_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.y_m, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.course_err_rad, -0.1, epsilon = 1e-12);

        // Path heading south (clockwise from x), vehicle to its east is left
        let t = target(0.0, 0.0, FRAC_PI_2);
        let e = FrenetError::new(&t, &Vector2::new(2.0, -1.0), FRAC_PI_2);
        assert_abs_diff_eq!(e.x_m, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.y_m, 2.0, epsilon = 1e-12);

        // Course error is wrapped
        let e = FrenetError::new(&target(0.0, 0.0, 3.0), &Vector2::zeros(), -3.0);
        assert_abs_diff_eq!(e.course_err_rad, 6.0 - 2.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let law = FrenetLaw::from_params(&Params::default());

        let mut chi = -PI;
        while chi <= PI {
            let mut v = 0.0;
            while v < 15.0 {
                let mut kappa = 0.0;
                while kappa < 0.2 {
                    let err = FrenetError { x_m: 3.0, y_m: -2.0, course_err_rad: chi };
                    let out = law.evaluate(&err, v, kappa);
                    let sum: f64 = out.rule_weights.iter().sum();
                    assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
                    assert!(out.rule_weights.iter().all(|w| *w >= 0.0 && *w <= 1.0));
                    assert!(out.rate_fb_rads.is_finite());
                    kappa += 0.02;
                }
                v += 1.0;
            }
            chi += 0.05;
        }
    }

    #[test]
    fn test_weights_random_errors() {
        let law = FrenetLaw::from_params(&Params::default());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..5000 {
            let err = FrenetError {
                x_m: rng.gen_range(-100.0..100.0),
                y_m: rng.gen_range(-100.0..100.0),
                course_err_rad: rng.gen_range(-PI..PI),
            };
            let out = law.evaluate(&err, rng.gen_range(0.0..30.0), rng.gen_range(-1.0..1.0));

            assert_abs_diff_eq!(out.rule_weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
            assert!(out.rule_weights.iter().all(|w| *w >= 0.0 && *w <= 1.0));
            assert!(out.rate_fb_rads.is_finite());
        }
    }

    #[test]
    fn test_zero_course_error() {
        let law = FrenetLaw::from_params(&Params::default());
        let err = FrenetError { x_m: 0.0, y_m: 0.0, course_err_rad: 0.0 };

        // z2 is taken as the ground speed at zero course error
        let out = law.evaluate(&err, 10.0, 0.05);
        assert_eq!(out.sched[1], 10.0);
        assert_eq!(out.speed_corr_ms, 0.0);
        assert_eq!(out.rate_fb_rads, 0.0);

        // At the maximum design speed z2 is fully in the high set
        let w = out.rule_weights;
        assert_abs_diff_eq!(w[1] + w[3], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_feedback_signs() {
        let law = FrenetLaw::from_params(&Params::default());

        // Vehicle ahead of the target, the target speeds up
        let out = law.evaluate(&FrenetError { x_m: 4.0, y_m: 0.0, course_err_rad: 0.0 }, 8.0, 0.0);
        assert!(out.speed_corr_ms > 0.0);

        // Vehicle left of the path, the commanded turn is to the right
        // (course error grows negative, so chi_F's rate is negative)
        let out = law.evaluate(&FrenetError { x_m: 0.0, y_m: 5.0, course_err_rad: 0.0 }, 8.0, 0.0);
        assert!(out.rate_fb_rads < 0.0);
    }
}
