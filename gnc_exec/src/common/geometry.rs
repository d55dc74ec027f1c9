//! Frame conversions
//!
//! The navigation frame stores positions as `[north, east]` and measures
//! heading-type angles clockwise from north. The path frame used by the 2D
//! path controller stores positions as `[x, y] = [east, north]` relative to a
//! path origin, and measures course-type angles clockwise from the x axis.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use std::f64::consts::FRAC_PI_2;
use util::maths::wrap_2pi;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Bearing from `from_m_ne` to `to_m_ne`, clockwise from north, in
/// `(-pi, pi]`.
///
/// Coincident points give a bearing of zero.
pub fn bearing_rad(from_m_ne: &Vector2<f64>, to_m_ne: &Vector2<f64>) -> f64 {
    let delta = to_m_ne - from_m_ne;
    delta[1].atan2(delta[0])
}

/// Convert a navigation frame position into the path frame with the given
/// origin.
pub fn ne_to_path_frame(pos_m_ne: &Vector2<f64>, origin_m_ne: &Vector2<f64>) -> Vector2<f64> {
    let delta = pos_m_ne - origin_m_ne;
    Vector2::new(delta[1], delta[0])
}

/// Convert a navigation frame heading into a path frame angle in
/// `[0, 2pi)`.
pub fn heading_to_path_frame(heading_rad: f64) -> f64 {
    wrap_2pi(heading_rad - FRAC_PI_2)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bearing() {
        let o = Vector2::new(0.0, 0.0);

        assert_abs_diff_eq!(bearing_rad(&o, &Vector2::new(10.0, 0.0)), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing_rad(&o, &Vector2::new(0.0, 10.0)), FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing_rad(&o, &Vector2::new(-10.0, 0.0)), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing_rad(&o, &Vector2::new(0.0, -10.0)), -FRAC_PI_2, epsilon = 1e-12);
        assert_eq!(bearing_rad(&o, &o), 0.0);
    }

    #[test]
    fn test_path_frame() {
        let p = ne_to_path_frame(&Vector2::new(5.0, 2.0), &Vector2::new(1.0, 1.0));
        assert_eq!(p, Vector2::new(1.0, 4.0));

        // Due east is along +x, due south is a quarter turn clockwise
        assert_abs_diff_eq!(heading_to_path_frame(FRAC_PI_2), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(heading_to_path_frame(PI), FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(heading_to_path_frame(0.0), 3.0 * FRAC_PI_2, epsilon = 1e-12);
    }
}
