//! Implementations for the SegCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::TAU;

// Internal
use super::{
    CircleGeometry, CourseSource, LawSpeeds, LineGeometry, OrbitTracker, Params, SegCtrlError,
    SteerLaw, TrackErrors, TraceMode, Turn,
};
use crate::common::{bar_to_servo, bearing_rad, wind_correction, LeverDemand};
use gnc_if::{nav::NavTarget, vehicle::VehicleState};
use util::{maths::clamp, module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Segment trace control module state
pub struct SegCtrl {
    pub(crate) params: Params,

    law: SteerLaw,

    /// The trace currently being flown
    mode: TraceMode,

    orbit: OrbitTracker,

    /// An orbit has been requested and will be entered on the next line
    /// cycle
    orbit_pending: bool,

    /// Request flag on the previous cycle, used to latch rising edges
    prev_orbit_request: bool,
}

/// Input data to segment trace control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    pub vehicle: VehicleState,
    pub nav: NavTarget,
}

/// Output demand from segment trace control.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct OutputData {
    pub lever: LeverDemand,
}

/// Status report for SegCtrl processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub mode: Option<TraceMode>,

    /// Geometry against the current line, also computed on circles in
    /// combined mode to decide when to rejoin the line.
    pub line: LineGeometry,

    /// Geometry against the circle, when on a circle.
    pub circle: Option<CircleGeometry>,

    /// Angle swept around the circle since it was entered.
    ///
    /// Units: radians
    pub orbit_swept_rad: f64,

    /// Limited crab angle.
    ///
    /// Units: radians
    pub crab_rad: f64,

    /// Wind correction factor applied to the rate demand.
    pub wind_factor: f64,

    /// Units: radians/second
    pub rate_dem_rads: f64,

    /// True if the bar angle demand was limited.
    pub bar_limited: bool,

    pub switched_to_circle: bool,
    pub switched_to_line: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SegCtrl {
    fn default() -> Self {
        let params = Params::default();

        Self {
            law: SteerLaw::from_params(&params),
            mode: params.fixed_mode,
            params,
            orbit: OrbitTracker::default(),
            orbit_pending: false,
            prev_orbit_request: false,
        }
    }
}

impl State for SegCtrl {
    type InitData = &'static str;
    type InitError = SegCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SegCtrlError;

    /// Initialise the SegCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(SegCtrlError::ParamLoadError)?;

        *self = Self::with_params(params)?;

        Ok(())
    }

    /// Perform cyclic processing of segment trace control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let vehicle = &input_data.vehicle;
        let nav = &input_data.nav;

        let mut report = StatusReport::default();

        report.line = LineGeometry::new(
            &nav.prev_wp_m_ne,
            &nav.next_wp_m_ne,
            &vehicle.position_m_ne,
            vehicle.yaw_rad,
            vehicle.course_rad
        );

        // ---- COMBINED MODE TRANSITIONS ----

        if self.params.combine {
            if nav.orbit_request && !self.prev_orbit_request {
                self.orbit_pending = true;
            }
            self.prev_orbit_request = nav.orbit_request;

            match self.mode {
                TraceMode::Line => {
                    if self.orbit_pending {
                        self.orbit_pending = false;

                        let turn = if self.params.alternate_orbit {
                            Turn::from_wp_parity(nav.wp_index)
                        }
                        else {
                            self.params.orbit_turn
                        };

                        self.mode = TraceMode::circle(turn);
                        self.orbit.reset();
                        report.switched_to_circle = true;

                        info!(
                            "SegCtrl: change to circle trace mode ({:?} about waypoint {} at {:?})",
                            turn, nav.wp_index, nav.prev_wp_m_ne.as_slice()
                        );
                    }
                },
                TraceMode::CircleLeft | TraceMode::CircleRight => {
                    if self.orbit.swept_rad().abs() > TAU * self.params.orbit_count
                        && report.line.along_track_m > 0.0
                        && report.line.cross_track_m.abs() < self.params.rejoin_cross_track_m
                    {
                        self.mode = TraceMode::Line;
                        self.orbit.reset();
                        report.switched_to_line = true;

                        info!("SegCtrl: change to line trace mode (waypoint {})", nav.wp_index);
                    }
                },
            }
        }

        // ---- TRACE ----

        let lever = match self.mode {
            TraceMode::Line => self.line_trace(vehicle, &mut report),
            TraceMode::CircleLeft | TraceMode::CircleRight => {
                let centre = if self.params.combine {
                    nav.prev_wp_m_ne
                }
                else {
                    Vector2::new(self.params.circle_centre_m_ne[0], self.params.circle_centre_m_ne[1])
                };
                let turn = match self.mode {
                    TraceMode::CircleLeft => Turn::Left,
                    _ => Turn::Right,
                };

                self.circle_trace(vehicle, &centre, turn, &mut report)
            },
        };

        report.mode = Some(self.mode);
        report.orbit_swept_rad = self.orbit.swept_rad();

        trace!(
            "SegCtrl {:?}: rate {:.4} rad/s, bar {:.2} deg, servo {:.2} deg",
            self.mode,
            report.rate_dem_rads,
            lever.bar_rad.to_degrees(),
            lever.servo_rad.to_degrees()
        );

        Ok((OutputData { lever }, report))
    }
}

impl SegCtrl {
    /// Create a new instance from already loaded parameters.
    pub fn with_params(params: Params) -> Result<Self, SegCtrlError> {
        params.validate().map_err(SegCtrlError::InvalidParams)?;

        let mode = if params.combine {
            TraceMode::Line
        }
        else {
            params.fixed_mode
        };

        Ok(Self {
            law: SteerLaw::from_params(&params),
            mode,
            params,
            orbit: OrbitTracker::default(),
            orbit_pending: false,
            prev_orbit_request: false,
        })
    }

    /// The trace currently being flown.
    pub fn mode(&self) -> TraceMode {
        self.mode
    }

    fn line_trace(&self, vehicle: &VehicleState, report: &mut StatusReport) -> LeverDemand {
        let err = TrackErrors {
            lateral_m: report.line.cross_track_m,
            course_err_rad: report.line.course_err_rad,
        };

        let (speeds, u_star) = self.rate_demand(vehicle, &err);
        report.rate_dem_rads = u_star;

        report.crab_rad = self.params.crab.crab_angle_rad(
            report.line.heading_err_rad,
            report.line.course_err_rad
        );
        report.wind_factor = wind_correction(speeds.ground_lim_ms, speeds.air_ms, report.crab_rad);

        self.bar_demand(report.wind_factor * u_star / self.params.bar_gain_k, report)
    }

    fn circle_trace(
        &mut self,
        vehicle: &VehicleState,
        centre_m_ne: &Vector2<f64>,
        turn: Turn,
        report: &mut StatusReport
    ) -> LeverDemand {
        let radius_m = (vehicle.position_m_ne - centre_m_ne).norm();

        let (course_rad, bearing) = match self.params.course_source {
            CourseSource::Gps => (
                vehicle.course_rad,
                bearing_rad(centre_m_ne, &vehicle.position_m_ne)
            ),
            CourseSource::PositionDifference => self.orbit.course_from_positions(
                centre_m_ne,
                &vehicle.position_m_ne,
                vehicle.course_rad
            ),
        };

        self.orbit.update(bearing);

        let target_radius_m = self.params.orbit_radius_m.max(self.params.radius_min_m);
        let circle = CircleGeometry::new(radius_m, bearing, course_rad, target_radius_m, turn);
        report.circle = Some(circle);

        let err = TrackErrors {
            lateral_m: circle.radial_err_m,
            course_err_rad: circle.course_err_rad,
        };

        let (speeds, u_star) = self.rate_demand(vehicle, &err);
        report.rate_dem_rads = u_star;

        report.crab_rad = self.params.crab.crab_angle_rad(vehicle.yaw_rad, course_rad);
        report.wind_factor = wind_correction(speeds.ground_lim_ms, speeds.air_ms, report.crab_rad);

        // Feed-forward of the orbit's own turn rate
        let k = self.params.bar_gain_k;
        let radius_lim_m = radius_m.max(self.params.radius_min_m);
        let feed_fwd = speeds.ground_lim_ms * report.wind_factor / (radius_lim_m * k)
            * circle.course_err_rad.cos();

        let bar = match turn {
            Turn::Left => report.wind_factor * u_star / k - feed_fwd,
            Turn::Right => report.wind_factor * u_star / k + feed_fwd,
        };

        self.bar_demand(bar, report)
    }

    /// Evaluate the steering law, returning the speeds used along with the
    /// turn rate demand.
    fn rate_demand(&self, vehicle: &VehicleState, err: &TrackErrors) -> (LawSpeeds, f64) {
        let speeds = LawSpeeds {
            ground_ms: vehicle.ground_speed_ms,
            ground_lim_ms: clamp(
                vehicle.ground_speed_ms,
                self.params.ground_speed_min_ms,
                self.params.ground_speed_max_ms
            ),
            air_ms: vehicle.airspeed_or(self.params.nominal_airspeed_ms),
        };

        (speeds, self.law.rate_demand(err, &speeds))
    }

    /// Limit the bar angle demand about trim and pass it through the
    /// linkage.
    fn bar_demand(&self, bar_rad: f64, report: &mut StatusReport) -> LeverDemand {
        let bar_lim_rad = clamp(
            bar_rad,
            self.params.bar_min_deg.to_radians(),
            self.params.bar_max_deg.to_radians()
        );
        report.bar_limited = bar_lim_rad != bar_rad;

        bar_to_servo(bar_lim_rad + self.params.bar_trim_deg.to_radians())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
