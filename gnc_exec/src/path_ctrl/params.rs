//! Parameters structure for PathCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::common::CrabLimits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for 2D path control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- PATH ----

    /// The sequence of primitives flown as the waypoints advance.
    pub flight_plan: FlightPlan,

    /// Waypoint index at which the curve of the `line_figure_eight` and
    /// `line_decorative` plans is flown.
    pub curve_wp_index: u16,

    /// Size of the orbits and curves.
    ///
    /// Units: meters
    pub curve_radius_m: f64,

    /// If present the first line of the orbit plans starts here rather than
    /// at the previous waypoint.
    ///
    /// Units: meters,
    /// Frame: Local north-east
    #[serde(default)]
    pub entry_point_m_ne: Option<[f64; 2]>,

    /// Step in the curve parameter used by the arc length search.
    pub search_step: f64,

    /// Maximum number of search steps taken in one cycle.
    pub search_max_steps: u32,

    // ---- CONTROL LAW ----

    /// Gains of the target speed correction, acting on `[x_F, y_F, chi_F]`.
    ///
    /// A positive `x_F` means the vehicle is ahead of the target point, so
    /// the first gain must be negative for the target to catch up.
    pub fx: [f64; 3],

    /// Gains of each turn rate rule, acting on `[x_F, y_F, chi_F]`.
    pub fchi: [[f64; 3]; 4],

    /// Design maximum ground speed.
    ///
    /// Units: meters/second
    pub ground_speed_max_ms: f64,

    /// Design maximum magnitude of the target speed correction.
    ///
    /// Units: meters/second
    pub speed_corr_max_ms: f64,

    /// Design minimum path curvature.
    ///
    /// Units: 1/meters
    pub curvature_min_pm: f64,

    /// Design maximum path curvature.
    ///
    /// Units: 1/meters
    pub curvature_max_pm: f64,

    /// Design maximum magnitude of the Frenet course error.
    ///
    /// Units: degrees
    pub course_err_max_deg: f64,

    // ---- ACTUATION ----

    /// Gain between the control bar angle and the resulting turn rate.
    ///
    /// Units: (radians/second)/radian
    pub bar_gain_k: f64,

    /// Airspeed used when no measurement is available.
    ///
    /// Units: meters/second
    pub nominal_airspeed_ms: f64,

    /// Limits of the crab angle used in the wind correction.
    pub crab: CrabLimits,

    /// Bar angle at which the vehicle flies straight.
    ///
    /// Units: degrees
    pub bar_trim_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Sequences of path primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightPlan {
    /// Straight lines between consecutive waypoints.
    LineSequence,

    /// A line to the first waypoint, then a right hand orbit of the next
    /// waypoint which is never left.
    LineThenOrbitRight,

    /// As `LineThenOrbitRight` with a left hand orbit.
    LineThenOrbitLeft,

    /// Straight lines, with two laps of a figure-eight about the waypoint
    /// with the curve index.
    LineFigureEight,

    /// Straight lines, with a decorative Lissajous curve about the waypoint
    /// with the curve index.
    LineDecorative,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            flight_plan: FlightPlan::LineSequence,
            curve_wp_index: 3,
            curve_radius_m: 30.0,
            entry_point_m_ne: None,
            search_step: 1e-3,
            search_max_steps: 5000,
            fx: [-0.5, 0.0, 0.0],
            fchi: [
                [0.0, 0.012, 0.7],
                [0.0, 0.020, 0.9],
                [0.0, 0.010, 0.6],
                [0.0, 0.018, 0.8],
            ],
            ground_speed_max_ms: 10.0,
            speed_corr_max_ms: 5.0,
            curvature_min_pm: 0.0,
            curvature_max_pm: 0.1,
            course_err_max_deg: 178.0,
            bar_gain_k: 0.5,
            nominal_airspeed_ms: 7.0,
            crab: CrabLimits::default(),
            bar_trim_deg: 0.0,
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

        if self.curve_radius_m <= 0.0 {
            return Err(String::from("curve_radius_m must be positive"));
        }

        if self.search_step <= 0.0 || self.search_max_steps == 0 {
            return Err(String::from(
                "search_step and search_max_steps must be positive"
            ));
        }

        if self.curvature_max_pm <= self.curvature_min_pm {
            return Err(String::from(
                "curvature_max_pm must be greater than curvature_min_pm"
            ));
        }

        if self.ground_speed_max_ms <= 0.0 || self.speed_corr_max_ms < 0.0 {
            return Err(String::from(
                "ground_speed_max_ms must be positive and speed_corr_max_ms non-negative"
            ));
        }

        if self.course_err_max_deg <= 0.0 || self.course_err_max_deg >= 180.0 {
            return Err(String::from("course_err_max_deg must be in (0, 180)"));
        }

        if self.crab.min_deg <= -90.0 || self.crab.max_deg >= 90.0
            || self.crab.min_deg > self.crab.max_deg
        {
            return Err(String::from(
                "crab limits must be ordered and lie strictly within +/- 90 degrees"
            ));
        }

        Ok(())
    }
}
