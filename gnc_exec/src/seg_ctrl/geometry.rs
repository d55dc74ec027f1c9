//! Trace geometry
//!
//! Errors of the vehicle against a line segment or a circle, and the tracking
//! of the angle swept around a circle's centre.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

use super::Turn;
use crate::common::bearing_rad;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position and direction of the vehicle relative to a line segment.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LineGeometry {
    /// Distance along the segment from its start.
    ///
    /// Units: meters
    pub along_track_m: f64,

    /// Distance from the segment, positive to the right.
    ///
    /// Units: meters
    pub cross_track_m: f64,

    /// Vehicle heading minus the segment bearing.
    ///
    /// Units: radians
    pub heading_err_rad: f64,

    /// Ground course minus the segment bearing.
    ///
    /// Units: radians
    pub course_err_rad: f64,
}

/// Position and direction of the vehicle relative to a circle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CircleGeometry {
    /// Distance from the centre.
    ///
    /// Units: meters
    pub radius_m: f64,

    /// Radial error, positive when the circle lies to the vehicle's left.
    ///
    /// Units: meters
    pub radial_err_m: f64,

    /// Direction of the circle's tangent at the vehicle.
    ///
    /// Units: radians
    pub tangent_rad: f64,

    /// Ground course minus the tangent direction.
    ///
    /// Units: radians
    pub course_err_rad: f64,
}

/// Accumulates the angle swept around a circle's centre so that complete
/// orbits can be counted.
#[derive(Debug, Clone, Default)]
pub struct OrbitTracker {
    /// Units: radians
    swept_rad: f64,

    /// Bearing from the centre on the previous cycle.
    prev_bearing_rad: Option<f64>,

    /// Last distinct position, used to derive the course from positions.
    prev_pos_m_ne: Option<Vector2<f64>>,

    /// Last course derived from positions.
    prev_course_rad: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineGeometry {
    /// Compute the geometry of `pos_m_ne` against the segment from
    /// `start_m_ne` to `end_m_ne`.
    pub fn new(
        start_m_ne: &Vector2<f64>,
        end_m_ne: &Vector2<f64>,
        pos_m_ne: &Vector2<f64>,
        yaw_rad: f64,
        course_rad: f64
    ) -> Self {
        let seg_bearing = bearing_rad(start_m_ne, end_m_ne);
        let dist = (pos_m_ne - start_m_ne).norm();
        let rel_bearing = bearing_rad(start_m_ne, pos_m_ne) - seg_bearing;

        Self {
            along_track_m: dist * rel_bearing.cos(),
            cross_track_m: dist * rel_bearing.sin(),
            heading_err_rad: wrap_pi(yaw_rad - seg_bearing),
            course_err_rad: wrap_pi(course_rad - seg_bearing),
        }
    }
}

impl CircleGeometry {
    /// Compute the geometry for a vehicle at `radius_m` from the centre, on
    /// bearing `bearing_rad` from it, with ground course `course_rad`.
    pub fn new(
        radius_m: f64,
        bearing_rad: f64,
        course_rad: f64,
        target_radius_m: f64,
        turn: Turn
    ) -> Self {
        let (tangent_rad, radial_err_m) = match turn {
            Turn::Left => (wrap_pi(bearing_rad - FRAC_PI_2), radius_m - target_radius_m),
            Turn::Right => (wrap_pi(bearing_rad + FRAC_PI_2), target_radius_m - radius_m),
        };

        Self {
            radius_m,
            radial_err_m,
            tangent_rad,
            course_err_rad: wrap_pi(course_rad - tangent_rad),
        }
    }
}

impl OrbitTracker {
    /// Forget the swept angle and previous samples, used when a circle is
    /// entered.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total angle swept since the last reset.
    ///
    /// Units: radians
    pub fn swept_rad(&self) -> f64 {
        self.swept_rad
    }

    /// Accumulate the change in bearing from the centre since the last
    /// update. The first update after a reset only latches the bearing.
    pub fn update(&mut self, bearing_rad: f64) {
        if let Some(prev) = self.prev_bearing_rad {
            self.swept_rad += wrap_pi(bearing_rad - prev);
        }
        self.prev_bearing_rad = Some(bearing_rad);
    }

    /// Derive the course and the bearing from the centre from successive
    /// positions.
    ///
    /// The course is the bearing from the last distinct position to the
    /// current one, and the centre bearing is taken at their midpoint. If
    /// the vehicle has not moved the last derived course is reused, or
    /// `fallback_course_rad` if there is none.
    pub fn course_from_positions(
        &mut self,
        centre_m_ne: &Vector2<f64>,
        pos_m_ne: &Vector2<f64>,
        fallback_course_rad: f64
    ) -> (f64, f64) {
        let result = match self.prev_pos_m_ne {
            Some(prev) if prev != *pos_m_ne => {
                let mid = (prev + pos_m_ne) * 0.5;
                let course = bearing_rad(&prev, pos_m_ne);
                self.prev_course_rad = Some(course);
                (course, bearing_rad(centre_m_ne, &mid))
            },
            _ => (
                self.prev_course_rad.unwrap_or(fallback_course_rad),
                bearing_rad(centre_m_ne, pos_m_ne)
            ),
        };

        self.prev_pos_m_ne = Some(*pos_m_ne);

        result
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{PI, TAU};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_line_geometry() {
        // Segment heading due east
        let start = Vector2::new(0.0, 0.0);
        let end = Vector2::new(0.0, 100.0);

        // 30 m along, 10 m south (right of the segment)
        let g = LineGeometry::new(&start, &end, &Vector2::new(-10.0, 30.0), FRAC_PI_2 + 0.1, PI);
        assert_abs_diff_eq!(g.along_track_m, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g.cross_track_m, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g.heading_err_rad, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(g.course_err_rad, FRAC_PI_2, epsilon = 1e-12);

        // Behind the start and to the left
        let g = LineGeometry::new(&start, &end, &Vector2::new(5.0, -5.0), 0.0, 0.0);
        assert!(g.along_track_m < 0.0);
        assert!(g.cross_track_m < 0.0);
    }

    #[test]
    fn test_circle_geometry() {
        // Due north of the centre, flying west, is on track for a left orbit
        let g = CircleGeometry::new(50.0, 0.0, -FRAC_PI_2, 50.0, Turn::Left);
        assert_abs_diff_eq!(g.radial_err_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g.course_err_rad, 0.0, epsilon = 1e-12);

        // and flying east is on track for a right orbit
        let g = CircleGeometry::new(60.0, 0.0, FRAC_PI_2, 50.0, Turn::Right);
        assert_abs_diff_eq!(g.radial_err_m, -10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(g.course_err_rad, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orbit_tracker() {
        let mut t = OrbitTracker::default();

        // Sweep two full turns clockwise in small steps
        let mut b = 0.0;
        for _ in 0..=200 {
            t.update(wrap_pi(b));
            b += 2.0 * TAU / 200.0;
        }
        assert_abs_diff_eq!(t.swept_rad(), 2.0 * TAU, epsilon = 1e-9);

        t.reset();
        assert_eq!(t.swept_rad(), 0.0);
        t.update(1.0);
        t.update(0.5);
        assert_abs_diff_eq!(t.swept_rad(), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_course_from_positions() {
        let mut t = OrbitTracker::default();
        let centre = Vector2::new(0.0, 0.0);

        // No previous position, fallback used
        let (course, bearing) = t.course_from_positions(&centre, &Vector2::new(10.0, 0.0), 1.0);
        assert_eq!(course, 1.0);
        assert_abs_diff_eq!(bearing, 0.0, epsilon = 1e-12);

        // Moving east
        let (course, _) = t.course_from_positions(&centre, &Vector2::new(10.0, 2.0), 1.0);
        assert_abs_diff_eq!(course, FRAC_PI_2, epsilon = 1e-12);

        // Not moving, previous course kept
        let (course, _) = t.course_from_positions(&centre, &Vector2::new(10.0, 2.0), 1.0);
        assert_abs_diff_eq!(course, FRAC_PI_2, epsilon = 1e-12);
    }
}
