//! Parameters structure for SegCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::common::CrabLimits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for segment trace control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- STEERING LAW ----

    /// The steering law used to compute the turn rate demand.
    pub law: SteerLawKind,

    /// First gain of the `arctan` and `linear` laws.
    pub law_gain_a: f64,

    /// Second gain of the `arctan` and `linear` laws.
    pub law_gain_b: f64,

    /// Look-ahead distance of the `carrot` law.
    ///
    /// Units: meters
    pub carrot_dist_m: f64,

    /// If present, a fuzzy state feedback used in place of the rational law
    /// when `law` is `rational`.
    #[serde(default)]
    pub fuzzy: Option<FuzzyParams>,

    // ---- ACTUATION ----

    /// Gain between the control bar angle and the resulting turn rate.
    ///
    /// Units: (radians/second)/radian
    pub bar_gain_k: f64,

    /// Airspeed used when no measurement is available.
    ///
    /// Units: meters/second
    pub nominal_airspeed_ms: f64,

    /// Lower limit applied to the ground speed in the control law.
    ///
    /// Units: meters/second
    pub ground_speed_min_ms: f64,

    /// Upper limit applied to the ground speed in the control law.
    ///
    /// Units: meters/second
    pub ground_speed_max_ms: f64,

    /// Limits of the crab angle used in the wind correction.
    pub crab: CrabLimits,

    /// Lower limit of the bar angle demand, about trim.
    ///
    /// Units: degrees
    pub bar_min_deg: f64,

    /// Upper limit of the bar angle demand, about trim.
    ///
    /// Units: degrees
    pub bar_max_deg: f64,

    /// Bar angle at which the vehicle flies straight.
    ///
    /// Units: degrees
    pub bar_trim_deg: f64,

    // ---- CIRCLE ----

    /// The trace flown when not in combined mode.
    pub fixed_mode: TraceMode,

    /// Centre of the circle flown when not in combined mode.
    ///
    /// Units: meters,
    /// Frame: Local north-east
    pub circle_centre_m_ne: [f64; 2],

    /// Radius of the circle.
    ///
    /// Units: meters
    pub orbit_radius_m: f64,

    /// Smallest radius used in the circle feed-forward term, and smallest
    /// circle which will be flown.
    ///
    /// Units: meters
    pub radius_min_m: f64,

    /// Source of the ground course used on circles.
    pub course_source: CourseSource,

    // ---- COMBINED MODE ----

    /// Fly the combined line and circle trace.
    pub combine: bool,

    /// Alternate the orbit direction on the parity of the waypoint index.
    pub alternate_orbit: bool,

    /// Orbit direction when not alternating.
    pub orbit_turn: Turn,

    /// Number of complete orbits flown before rejoining the line.
    pub orbit_count: f64,

    /// Largest cross-track distance at which the line may be rejoined.
    ///
    /// Units: meters
    pub rejoin_cross_track_m: f64,
}

/// Fuzzy state feedback scheduled on ground speed and course error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FuzzyParams {
    /// Number of rules, 2 (scheduled on ground speed only) or 4.
    pub num_rules: usize,

    /// Course error at which the large-error set is fully active.
    ///
    /// Units: degrees
    pub course_err_max_deg: f64,

    /// Feedback gains of each rule, acting on `[cross track, course error]`.
    pub gains: [[f64; 2]; 4],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Available steering laws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SteerLawKind {
    /// Rational polynomial law from sum-of-squares synthesis.
    Rational,

    /// Lyapunov law with an arctangent approach angle.
    Arctan,

    /// Linear state feedback.
    Linear,

    /// Pursuit of a carrot point a fixed distance ahead on the path.
    Carrot,
}

/// The trace being flown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    Line,
    CircleLeft,
    CircleRight,
}

/// Direction of an orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Left,
    Right,
}

/// Source of the ground course used on circles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseSource {
    /// Course over ground reported by the GNSS receiver.
    Gps,

    /// Bearing between successive distinct positions.
    PositionDifference,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            law: SteerLawKind::Rational,
            law_gain_a: 0.1,
            law_gain_b: 1.0,
            carrot_dist_m: 30.0,
            fuzzy: None,
            bar_gain_k: 0.5,
            nominal_airspeed_ms: 7.0,
            ground_speed_min_ms: 3.0,
            ground_speed_max_ms: 12.0,
            crab: CrabLimits::default(),
            bar_min_deg: -20.0,
            bar_max_deg: 20.0,
            bar_trim_deg: 0.0,
            fixed_mode: TraceMode::Line,
            circle_centre_m_ne: [0.0, 0.0],
            orbit_radius_m: 40.0,
            radius_min_m: 15.0,
            course_source: CourseSource::Gps,
            combine: false,
            alternate_orbit: false,
            orbit_turn: Turn::Left,
            orbit_count: 1.0,
            rejoin_cross_track_m: 10.0,
        }
    }
}

impl Params {
    /// Check the parameters are self-consistent, returning a description of
    /// the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.bar_gain_k == 0.0 {
            return Err(String::from("bar_gain_k must be non-zero"));
        }

        if self.nominal_airspeed_ms <= 0.0 {
            return Err(String::from("nominal_airspeed_ms must be positive"));
        }

        if self.ground_speed_max_ms <= self.ground_speed_min_ms {
            return Err(String::from(
                "ground_speed_max_ms must be greater than ground_speed_min_ms"
            ));
        }

        if self.crab.min_deg <= -90.0 || self.crab.max_deg >= 90.0
            || self.crab.min_deg > self.crab.max_deg
        {
            return Err(String::from(
                "crab limits must be ordered and lie strictly within +/- 90 degrees"
            ));
        }

        if self.bar_min_deg > self.bar_max_deg {
            return Err(String::from("bar_min_deg must not exceed bar_max_deg"));
        }

        if self.law == SteerLawKind::Carrot && self.carrot_dist_m <= 0.0 {
            return Err(String::from("carrot_dist_m must be positive"));
        }

        if self.law == SteerLawKind::Linear && self.law_gain_b == 0.0 {
            return Err(String::from("law_gain_b must be non-zero for the linear law"));
        }

        if self.radius_min_m <= 0.0 {
            return Err(String::from("radius_min_m must be positive"));
        }

        if let Some(ref f) = self.fuzzy {
            if f.num_rules != 2 && f.num_rules != 4 {
                return Err(format!("fuzzy.num_rules must be 2 or 4, found {}", f.num_rules));
            }

            if f.course_err_max_deg <= 0.0 || f.course_err_max_deg > 180.0 {
                return Err(String::from("fuzzy.course_err_max_deg must be in (0, 180]"));
            }
        }

        Ok(())
    }
}

impl TraceMode {
    /// The circle trace for the given direction.
    pub fn circle(turn: Turn) -> Self {
        match turn {
            Turn::Left => TraceMode::CircleLeft,
            Turn::Right => TraceMode::CircleRight,
        }
    }
}

impl Turn {
    /// Orbit direction for a waypoint index when alternating: even indices
    /// orbit left, odd indices right.
    pub fn from_wp_parity(wp_index: u16) -> Self {
        if wp_index % 2 == 0 {
            Turn::Left
        }
        else {
            Turn::Right
        }
    }
}
