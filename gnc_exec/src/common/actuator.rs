//! Control bar linkage and wind correction

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths::{clamp, wrap_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Ratio of the servo horn arm to the control bar arm of the steering
/// linkage.
pub const LEVER_RATIO: f64 = 58.0 / 29.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Limits placed on the crab angle (the difference between the vehicle's
/// heading and its ground course) before it is used in the wind correction.
///
/// Both limits must lie strictly inside `(-90, 90)` degrees so that the wind
/// correction factor stays finite.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CrabLimits {
    /// Units: degrees
    pub min_deg: f64,

    /// Units: degrees
    pub max_deg: f64,
}

/// Result of passing a control bar angle through the linkage.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LeverDemand {
    /// Demanded control bar angle.
    ///
    /// Units: radians
    pub bar_rad: f64,

    /// Servo angle needed to produce `bar_rad`.
    ///
    /// Units: radians
    pub servo_rad: f64,

    /// True if the bar angle was beyond the reach of the linkage and the
    /// servo has been saturated.
    pub saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CrabLimits {
    fn default() -> Self {
        Self {
            min_deg: -30.0,
            max_deg: 30.0,
        }
    }
}

impl CrabLimits {
    /// Compute the limited crab angle from the heading and course errors
    /// (both measured against the same reference direction).
    pub fn crab_angle_rad(&self, heading_err_rad: f64, course_err_rad: f64) -> f64 {
        clamp(
            wrap_pi(heading_err_rad - course_err_rad),
            self.min_deg.to_radians(),
            self.max_deg.to_radians()
        )
    }
}

impl LeverDemand {
    /// Servo demand in centidegrees.
    pub fn servo_cdeg(&self) -> i32 {
        rad_to_cdeg(self.servo_rad)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the servo angle which places the control bar at `bar_rad`.
///
/// The linkage gives `sin(bar) = sin(servo) / LEVER_RATIO`, so the inverse is
/// `servo = asin(LEVER_RATIO * sin(bar))`, with the argument limited to the
/// domain of `asin`.
pub fn bar_to_servo(bar_rad: f64) -> LeverDemand {
    let arg = LEVER_RATIO * bar_rad.sin();
    let arg_lim = clamp(arg, -1.0, 1.0);

    LeverDemand {
        bar_rad,
        servo_rad: arg_lim.asin(),
        saturated: arg_lim != arg,
    }
}

/// Inverse of `bar_to_servo`, used by the vehicle model.
pub fn servo_to_bar(servo_rad: f64) -> f64 {
    (servo_rad.sin() / LEVER_RATIO).asin()
}

/// Factor converting a turn-rate demand into a bar-angle demand, accounting
/// for the difference between ground speed and airspeed and for the crab
/// angle.
///
/// `crab_rad` must already be limited (see `CrabLimits`) and `airspeed_ms`
/// must be positive.
pub fn wind_correction(ground_speed_ms: f64, airspeed_ms: f64, crab_rad: f64) -> f64 {
    ground_speed_ms / (airspeed_ms * crab_rad.cos())
}

/// Convert an angle into whole centidegrees, truncating towards zero.
pub fn rad_to_cdeg(angle_rad: f64) -> i32 {
    (angle_rad.to_degrees() * 100.0) as i32
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bar_to_servo() {
        // Neutral bar gives neutral servo
        let d = bar_to_servo(0.0);
        assert_eq!(d.servo_rad, 0.0);
        assert!(!d.saturated);

        // Within reach the linkage relation holds
        let bar = 10f64.to_radians();
        let d = bar_to_servo(bar);
        assert_abs_diff_eq!(d.servo_rad.sin(), LEVER_RATIO * bar.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(servo_to_bar(d.servo_rad), bar, epsilon = 1e-12);

        // Beyond reach the servo saturates at +/- 90 degrees
        let d = bar_to_servo(40f64.to_radians());
        assert!(d.saturated);
        assert_abs_diff_eq!(d.servo_rad, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        let d = bar_to_servo(-40f64.to_radians());
        assert!(d.saturated);
        assert_abs_diff_eq!(d.servo_rad, -std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_wind_correction_finite() {
        let limits = CrabLimits::default();

        // Sweep over heading and course errors, including ones which would
        // give a 90 degree crab angle without the limits
        let mut heading = -3.0;
        while heading < 3.0 {
            let mut course = -3.0;
            while course < 3.0 {
                let crab = limits.crab_angle_rad(heading, course);
                assert!(crab >= limits.min_deg.to_radians() - 1e-12);
                assert!(crab <= limits.max_deg.to_radians() + 1e-12);

                let factor = wind_correction(8.0, 9.0, crab);
                assert!(factor.is_finite());
                assert!(factor > 0.0);

                course += 0.05;
            }
            heading += 0.05;
        }

        // Exactly 90 degrees of crab is limited
        let crab = limits.crab_angle_rad(std::f64::consts::FRAC_PI_2, 0.0);
        assert_abs_diff_eq!(crab, 30f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_rad_to_cdeg() {
        assert_eq!(rad_to_cdeg(0.0), 0);
        assert!((rad_to_cdeg(45f64.to_radians()) - 4500).abs() <= 1);
        assert_eq!(rad_to_cdeg(0.5), 2864);
        assert_eq!(rad_to_cdeg(-0.123456f64.to_radians()), -12);
    }
}
