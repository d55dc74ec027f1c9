//! Path primitives
//!
//! Each primitive is a curve `P(zeta)` in the path frame. The target point's
//! course, course rate and curvature all follow from the first two
//! derivatives of the curve, so each primitive only defines `P`, `P'` and
//! `P''`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Curve speeds below this are treated as stationary points.
const MIN_CURVE_SPEED: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A primitive placed in the path frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,

    /// First control point, the start of lines and chord circles.
    pub p0: Vector2<f64>,

    /// Second control point, the end of lines and chord circles and the
    /// centre of orbits and curves.
    pub p1: Vector2<f64>,

    /// Radius of orbits and size of curves.
    ///
    /// Units: meters
    pub radius_m: f64,
}

/// The target point on a primitive.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PathPoint {
    /// Units: meters
    pub pos_m: Vector2<f64>,

    /// Desired course, clockwise from the x axis.
    ///
    /// Units: radians
    pub course_rad: f64,

    /// Rate of change of the desired course.
    ///
    /// Units: radians/second
    pub course_rate_rads: f64,

    /// Path curvature, always non-negative.
    ///
    /// Units: 1/meters
    pub curvature_pm: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The shapes which can be flown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveKind {
    /// Straight line from `p0` to `p1`, `zeta = s / |p1 - p0|`.
    Line,

    /// Anticlockwise circle through the chord `p0`-`p1`, `zeta = 2s / d`.
    ChordCircleLeft,

    /// Clockwise circle through the chord `p0`-`p1`, `zeta = 2s / d`.
    ChordCircleRight,

    /// Anticlockwise orbit of `p1`, `zeta = s / r`.
    OrbitLeft,

    /// Clockwise orbit of `p1`, `zeta = s / r`.
    OrbitRight,

    /// The Lissajous curve `(-r cos 5 zeta, r cos 6 zeta)` about `p1`.
    Decorative,

    /// The Lissajous curve `(2r sin zeta, r sin 2 zeta)` about `p1`.
    FigureEight,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PrimitiveKind {
    /// Value of `zeta` at which the primitive is complete, or `None` if it is
    /// flown indefinitely.
    pub fn terminal_zeta(&self) -> Option<f64> {
        match self {
            PrimitiveKind::Line
            | PrimitiveKind::ChordCircleLeft
            | PrimitiveKind::ChordCircleRight => Some(1.0),
            PrimitiveKind::OrbitLeft | PrimitiveKind::OrbitRight => None,
            PrimitiveKind::Decorative => Some(PI),
            PrimitiveKind::FigureEight => Some(4.0 * PI),
        }
    }
}

impl Primitive {
    pub fn new(kind: PrimitiveKind, p0: Vector2<f64>, p1: Vector2<f64>, radius_m: f64) -> Self {
        Self { kind, p0, p1, radius_m }
    }

    /// Length of the chord `p0`-`p1`.
    ///
    /// Units: meters
    pub fn chord_m(&self) -> f64 {
        (self.p1 - self.p0).norm()
    }

    /// Closed form `zeta` for arc length `s`, or `None` for primitives which
    /// must be searched.
    ///
    /// A line of zero length is complete from the start.
    pub fn closed_form_zeta(&self, s_m: f64) -> Option<f64> {
        let d = self.chord_m();

        match self.kind {
            PrimitiveKind::Line => Some(if d > 0.0 { s_m / d } else { 1.0 }),
            PrimitiveKind::ChordCircleLeft | PrimitiveKind::ChordCircleRight => {
                Some(if d > 0.0 { 2.0 * s_m / d } else { 1.0 })
            },
            PrimitiveKind::OrbitLeft | PrimitiveKind::OrbitRight => Some(s_m / self.radius_m),
            PrimitiveKind::Decorative | PrimitiveKind::FigureEight => None,
        }
    }

    /// Position on the curve.
    pub fn position(&self, zeta: f64) -> Vector2<f64> {
        let r = self.radius_m;
        let mid = (self.p0 + self.p1) * 0.5;
        let half = 0.5 * self.chord_m();

        match self.kind {
            PrimitiveKind::Line => self.p0 * (1.0 - zeta) + self.p1 * zeta,
            PrimitiveKind::ChordCircleLeft => {
                mid + Vector2::new(half * zeta.cos(), half * zeta.sin())
            },
            PrimitiveKind::ChordCircleRight => {
                mid + Vector2::new(half * zeta.cos(), -half * zeta.sin())
            },
            PrimitiveKind::OrbitLeft => {
                self.p1 + Vector2::new(-r * zeta.cos(), -r * zeta.sin())
            },
            PrimitiveKind::OrbitRight => {
                self.p1 + Vector2::new(-r * zeta.cos(), r * zeta.sin())
            },
            PrimitiveKind::Decorative => {
                self.p1 + Vector2::new(-r * (5.0 * zeta).cos(), r * (6.0 * zeta).cos())
            },
            PrimitiveKind::FigureEight => {
                self.p1 + Vector2::new(2.0 * r * zeta.sin(), r * (2.0 * zeta).sin())
            },
        }
    }

    /// First derivative `dP/dzeta`.
    pub fn tangent(&self, zeta: f64) -> Vector2<f64> {
        let r = self.radius_m;
        let half = 0.5 * self.chord_m();

        match self.kind {
            PrimitiveKind::Line => self.p1 - self.p0,
            PrimitiveKind::ChordCircleLeft => {
                Vector2::new(-half * zeta.sin(), half * zeta.cos())
            },
            PrimitiveKind::ChordCircleRight => {
                Vector2::new(-half * zeta.sin(), -half * zeta.cos())
            },
            PrimitiveKind::OrbitLeft => Vector2::new(r * zeta.sin(), -r * zeta.cos()),
            PrimitiveKind::OrbitRight => Vector2::new(r * zeta.sin(), r * zeta.cos()),
            PrimitiveKind::Decorative => Vector2::new(
                5.0 * r * (5.0 * zeta).sin(),
                -6.0 * r * (6.0 * zeta).sin()
            ),
            PrimitiveKind::FigureEight => Vector2::new(
                2.0 * r * zeta.cos(),
                2.0 * r * (2.0 * zeta).cos()
            ),
        }
    }

    /// Second derivative `d2P/dzeta2`.
    pub fn second_derivative(&self, zeta: f64) -> Vector2<f64> {
        let r = self.radius_m;
        let half = 0.5 * self.chord_m();

        match self.kind {
            PrimitiveKind::Line => Vector2::zeros(),
            PrimitiveKind::ChordCircleLeft => {
                Vector2::new(-half * zeta.cos(), -half * zeta.sin())
            },
            PrimitiveKind::ChordCircleRight => {
                Vector2::new(-half * zeta.cos(), half * zeta.sin())
            },
            PrimitiveKind::OrbitLeft => Vector2::new(r * zeta.cos(), r * zeta.sin()),
            PrimitiveKind::OrbitRight => Vector2::new(r * zeta.cos(), -r * zeta.sin()),
            PrimitiveKind::Decorative => Vector2::new(
                25.0 * r * (5.0 * zeta).cos(),
                -36.0 * r * (6.0 * zeta).cos()
            ),
            PrimitiveKind::FigureEight => Vector2::new(
                -2.0 * r * zeta.sin(),
                -4.0 * r * (2.0 * zeta).sin()
            ),
        }
    }

    /// Curve speed `|dP/dzeta|`, used by the arc length search.
    pub fn speed(&self, zeta: f64) -> f64 {
        self.tangent(zeta).norm()
    }

    /// The target point at `zeta`, with the parameter changing at
    /// `zeta_rate` per second.
    ///
    /// At stationary points of the curve the course follows the second
    /// derivative, which is the limiting direction of travel, and the course
    /// rate and curvature are zero.
    pub fn point(&self, zeta: f64, zeta_rate: f64) -> PathPoint {
        let d1 = self.tangent(zeta);
        let d2 = self.second_derivative(zeta);
        let speed = d1.norm();

        if speed < MIN_CURVE_SPEED {
            return PathPoint {
                pos_m: self.position(zeta),
                course_rad: course_of(&d2),
                course_rate_rads: 0.0,
                curvature_pm: 0.0,
            };
        }

        // z component of P' x P'', positive for anticlockwise turning
        let cross = d1[0] * d2[1] - d1[1] * d2[0];

        PathPoint {
            pos_m: self.position(zeta),
            course_rad: course_of(&d1),
            course_rate_rads: -cross / speed.powi(2) * zeta_rate,
            curvature_pm: cross.abs() / speed.powi(3),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Course of a direction vector, clockwise from the x axis.
fn course_of(dir: &Vector2<f64>) -> f64 {
    -dir[1].atan2(dir[0])
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
