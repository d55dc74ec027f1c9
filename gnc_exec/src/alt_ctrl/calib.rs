//! Thrust calibration
//!
//! Static thrust of the motor and propeller is modelled as
//! `T = k (a p^2 + c)` where `p` is the throttle percentage. `a` and `c` come
//! from bench tests of the propulsion unit and the scale `k` is chosen so that
//! the trim throttle produces the trim thrust.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::CalibParams;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Quadratic coefficient of the thrust curve.
///
/// Units: newtons/percent^2
pub const THRUST_CURVE_QUAD: f64 = 0.002287471638222;

/// Constant term of the thrust curve.
///
/// Units: newtons
pub const THRUST_CURVE_OFFSET: f64 = 0.069756864241495;

/// Thrust demands below this value stop the motor.
///
/// Units: newtons
pub const MIN_THRUST_N: f64 = 0.3256;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Conversion between thrust and throttle percentage.
#[derive(Debug, Clone, Copy)]
pub struct ThrustCalib {
    /// Scale of the thrust curve
    scale: f64,

    /// Units: percent
    max_throttle_pct: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ThrustCalib {
    /// Build the calibration so that `params.neutral_throttle_pct` produces
    /// `neutral_thrust_n`.
    pub fn new(params: &CalibParams, neutral_thrust_n: f64) -> Self {
        let scale = neutral_thrust_n
            / (THRUST_CURVE_QUAD * params.neutral_throttle_pct.powi(2) + THRUST_CURVE_OFFSET);

        Self {
            scale,
            max_throttle_pct: params.max_throttle_pct,
        }
    }

    /// Convert a thrust demand into a throttle percentage.
    ///
    /// Demands below `MIN_THRUST_N` give zero throttle. The result is limited
    /// to `[0, max_throttle_pct]`.
    pub fn thrust_to_pct(&self, thrust_n: f64) -> f64 {
        self.thrust_to_pct_limited(thrust_n).0
    }

    /// Convert a thrust demand into a throttle percentage, also returning
    /// true if the percentage differs from the exact inverse of the thrust
    /// curve (motor cut, no real solution, or above the maximum throttle).
    ///
    /// A demand of exactly zero thrust is not limited.
    pub fn thrust_to_pct_limited(&self, thrust_n: f64) -> (f64, bool) {
        if thrust_n == 0.0 {
            return (0.0, false);
        }

        if !(thrust_n >= MIN_THRUST_N) {
            return (0.0, true);
        }

        let arg = (thrust_n - THRUST_CURVE_OFFSET * self.scale)
            / (THRUST_CURVE_QUAD * self.scale);

        // Thrusts between the cutoff and the curve offset have no real
        // solution, these map to zero
        let raw_pct = arg.max(0.0).sqrt();
        let pct = clamp(raw_pct, 0.0, self.max_throttle_pct);

        (pct, arg < 0.0 || pct != raw_pct)
    }

    /// Thrust produced at the given throttle percentage.
    pub fn pct_to_thrust(&self, throttle_pct: f64) -> f64 {
        self.scale * (THRUST_CURVE_QUAD * throttle_pct.powi(2) + THRUST_CURVE_OFFSET)
    }

    /// Maximum throttle which may be demanded.
    pub fn max_throttle_pct(&self) -> f64 {
        self.max_throttle_pct
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Thrust needed for steady level flight at the trim point, from the drag
/// polar of the canopy.
pub fn neutral_thrust_n(trim_pitch_rad: f64, trim_airspeed_ms: f64) -> f64 {
    (0.1059 * trim_airspeed_ms.powi(2) - 0.3342 * trim_airspeed_ms + 1.6227)
        / trim_pitch_rad.cos()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn calib() -> ThrustCalib {
        let params = CalibParams {
            neutral_throttle_pct: 55.0,
            max_throttle_pct: 100.0,
        };
        ThrustCalib::new(&params, neutral_thrust_n(15.8f64.to_radians(), 6.55))
    }

    #[test]
    fn test_neutral_point() {
        let c = calib();
        let t = neutral_thrust_n(15.8f64.to_radians(), 6.55);

        assert!(t > 4.0 && t < 4.3);
        assert_abs_diff_eq!(c.thrust_to_pct(t), 55.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.pct_to_thrust(55.0), t, epsilon = 1e-9);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let c = calib();

        let mut prev = 0.0;
        let mut t = -5.0;
        while t < 30.0 {
            let p = c.thrust_to_pct(t);
            assert!(p >= prev, "throttle decreased at {} N", t);
            assert!(p >= 0.0 && p <= c.max_throttle_pct());
            prev = p;
            t += 0.01;
        }

        assert_eq!(c.thrust_to_pct(30.0), c.max_throttle_pct());
        assert_eq!(c.thrust_to_pct(std::f64::NAN), 0.0);
    }

    #[test]
    fn test_cutoff() {
        let c = calib();

        assert_eq!(c.thrust_to_pct(MIN_THRUST_N - 1e-6), 0.0);
        assert_eq!(c.thrust_to_pct(0.0), 0.0);
        assert_eq!(c.thrust_to_pct(-3.0), 0.0);
        assert!(c.thrust_to_pct(MIN_THRUST_N) > 0.0);
    }

    #[test]
    fn test_round_trip() {
        let c = calib();

        let mut p = 0.0;
        while p <= 100.0 {
            let t = c.pct_to_thrust(p);
            if t >= MIN_THRUST_N {
                assert_abs_diff_eq!(c.thrust_to_pct(t), p, epsilon = 1e-6);
            }
            p += 0.5;
        }
    }

    #[test]
    fn test_limited_flag() {
        let c = calib();
        let t = neutral_thrust_n(15.8f64.to_radians(), 6.55);

        // Exact inversions are not limited
        assert_eq!(c.thrust_to_pct_limited(0.0), (0.0, false));
        assert!(!c.thrust_to_pct_limited(t).1);
        assert!(!c.thrust_to_pct_limited(c.pct_to_thrust(90.0)).1);

        // Motor cut, negative demand and saturation are
        assert_eq!(c.thrust_to_pct_limited(0.1), (0.0, true));
        assert_eq!(c.thrust_to_pct_limited(-2.0), (0.0, true));
        assert_eq!(c.thrust_to_pct_limited(30.0), (100.0, true));
        assert_eq!(c.thrust_to_pct_limited(std::f64::NAN), (0.0, true));
    }
}
