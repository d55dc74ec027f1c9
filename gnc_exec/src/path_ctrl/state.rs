//! Implementations for the PathCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{
    ArcLengthSearch, FrenetError, FrenetLaw, GeneratorOutput, LawOutput, Params, PathCtrlError,
    PathGenerator, PathWaypoints,
};
use crate::common::{
    bar_to_servo, heading_to_path_frame, ne_to_path_frame, wind_correction, LeverDemand,
};
use gnc_if::{nav::NavTarget, vehicle::VehicleState};
use util::{module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// 2D path control module state
pub struct PathCtrl {
    pub(crate) params: Params,

    law: FrenetLaw,

    /// Path origin, generator and timing, set up on the first call to
    /// `proc`.
    core: Option<Core>,

    /// Number of cycles on which the sample time did not advance
    num_stale_samples: u64,
}

/// Input data to 2D path control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    pub vehicle: VehicleState,
    pub nav: NavTarget,
}

/// Output demand from 2D path control.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct OutputData {
    pub lever: LeverDemand,
}

/// Status report for PathCtrl processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// True on the first cycle, when the controller is set up and the
    /// output is zero.
    pub initialising: bool,

    /// Vehicle position in the path frame.
    ///
    /// Units: meters
    pub pos_m: Vector2<f64>,

    pub path: Option<GeneratorOutput>,

    pub frenet: FrenetError,

    pub law: LawOutput,

    /// Limited crab angle.
    ///
    /// Units: radians
    pub crab_rad: f64,

    /// Wind correction factor applied to the rate demand.
    pub wind_factor: f64,

    /// True if the sample time did not advance this cycle, in which case
    /// the target point is not moved.
    pub stale_sample: bool,

    /// Total number of stale samples seen since initialisation.
    pub num_stale_samples: u64,
}

#[derive(Debug, Clone)]
struct Core {
    /// Path frame origin in the navigation frame
    origin_m_ne: Vector2<f64>,

    generator: PathGenerator,

    prev_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PathCtrl {
    fn default() -> Self {
        let params = Params::default();

        Self {
            law: FrenetLaw::from_params(&params),
            params,
            core: None,
            num_stale_samples: 0,
        }
    }
}

impl State for PathCtrl {
    type InitData = &'static str;
    type InitError = PathCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = PathCtrlError;

    /// Initialise the PathCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(PathCtrlError::ParamLoadError)?;

        *self = Self::with_params(params)?;

        Ok(())
    }

    /// Perform cyclic processing of 2D path control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let vehicle = &input_data.vehicle;
        let nav = &input_data.nav;

        let mut report = StatusReport::default();

        // The path origin is fixed at the previous waypoint on the first
        // cycle, which produces no demand
        let core = match self.core {
            Some(ref mut c) => c,
            None => {
                self.core = Some(Core::new(&self.params, nav, vehicle.time_s));
                debug!("PathCtrl: path origin set to {:?}", nav.prev_wp_m_ne.as_slice());

                report.initialising = true;
                return Ok((OutputData::default(), report));
            }
        };

        let dt_s = vehicle.time_s - core.prev_time_s;
        core.prev_time_s = vehicle.time_s;

        if dt_s <= 0.0 {
            self.num_stale_samples += 1;
            report.stale_sample = true;
            trace!("PathCtrl sample time did not advance (dt = {} s)", dt_s);
        }

        // ---- PATH FRAME STATE ----

        report.pos_m = ne_to_path_frame(&vehicle.position_m_ne, &core.origin_m_ne);
        let yaw_rad = heading_to_path_frame(vehicle.yaw_rad);
        let course_rad = heading_to_path_frame(vehicle.course_rad);
        let v_g = vehicle.ground_speed_ms;

        let wps = PathWaypoints {
            prev_m: ne_to_path_frame(&nav.prev_wp_m_ne, &core.origin_m_ne),
            next_m: ne_to_path_frame(&nav.next_wp_m_ne, &core.origin_m_ne),
            index: nav.wp_index,
        };

        // ---- TARGET POINT AND LAW ----

        let path = core.generator.update(&wps, dt_s);
        report.frenet = FrenetError::new(&path.point, &report.pos_m, course_rad);
        report.law = self.law.evaluate(&report.frenet, v_g, path.point.curvature_pm);

        if dt_s > 0.0 {
            let target_speed_ms = report.law.speed_corr_ms
                + v_g * report.frenet.course_err_rad.cos();
            core.generator.advance_arc_length(target_speed_ms * dt_s);
        }

        // ---- ACTUATION ----

        report.crab_rad = self.params.crab.crab_angle_rad(yaw_rad, course_rad);
        report.wind_factor = wind_correction(
            v_g,
            vehicle.airspeed_or(self.params.nominal_airspeed_ms),
            report.crab_rad
        );

        let rate_dem_rads = -report.law.rate_fb_rads + path.point.course_rate_rads;
        let bar_rad = report.wind_factor * rate_dem_rads / self.params.bar_gain_k
            + self.params.bar_trim_deg.to_radians();

        let lever = bar_to_servo(bar_rad);

        report.path = Some(path);
        report.num_stale_samples = self.num_stale_samples;

        trace!(
            "PathCtrl {:?}: zeta {:.3}, x_F {:.2} m, y_F {:.2} m, chi_F {:.3} rad, bar {:.2} deg",
            path.kind,
            path.zeta,
            report.frenet.x_m,
            report.frenet.y_m,
            report.frenet.course_err_rad,
            lever.bar_rad.to_degrees()
        );

        Ok((OutputData { lever }, report))
    }
}

impl PathCtrl {
    /// Create a new instance from already loaded parameters.
    pub fn with_params(params: Params) -> Result<Self, PathCtrlError> {
        params.validate().map_err(PathCtrlError::InvalidParams)?;

        Ok(Self {
            law: FrenetLaw::from_params(&params),
            params,
            core: None,
            num_stale_samples: 0,
        })
    }

    /// Number of cycles on which the sample time did not advance.
    pub fn num_stale_samples(&self) -> u64 {
        self.num_stale_samples
    }
}

impl Core {
    fn new(params: &Params, nav: &NavTarget, time_s: f64) -> Self {
        let origin_m_ne = nav.prev_wp_m_ne;

        let entry_point_m = params.entry_point_m_ne
            .map(|e| ne_to_path_frame(&Vector2::new(e[0], e[1]), &origin_m_ne));

        Self {
            origin_m_ne,
            generator: PathGenerator::new(
                params.flight_plan,
                params.curve_wp_index,
                params.curve_radius_m,
                entry_point_m,
                ArcLengthSearch::new(params.search_step, params.search_max_steps)
            ),
            prev_time_s: time_s,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::path_ctrl::{PrimitiveKind, SwitchLatch};
    use std::f64::consts::FRAC_PI_2;
    use approx::assert_abs_diff_eq;

    /// Vehicle flying due east at 8 m/s
    fn vehicle(time_s: f64, north_m: f64, east_m: f64) -> VehicleState {
        VehicleState {
            time_s,
            position_m_ne: Vector2::new(north_m, east_m),
            yaw_rad: FRAC_PI_2,
            course_rad: FRAC_PI_2,
            ground_speed_ms: 8.0,
            airspeed_ms: Some(8.0),
            ..Default::default()
        }
    }

    /// Leg from the origin heading due east
    fn nav(wp_index: u16) -> NavTarget {
        NavTarget {
            prev_wp_m_ne: Vector2::new(100.0, 0.0),
            next_wp_m_ne: Vector2::new(100.0, 500.0),
            wp_index,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_call_zero() {
        let mut ctrl = PathCtrl::with_params(Params::default()).unwrap();

        let (out, rpt) = ctrl.proc(&InputData { vehicle: vehicle(0.0, 130.0, 40.0), nav: nav(1) })
            .unwrap();
        assert!(rpt.initialising);
        assert_eq!(out.lever.servo_rad, 0.0);
        assert!(rpt.path.is_none());

        let (_, rpt) = ctrl.proc(&InputData { vehicle: vehicle(0.1, 130.0, 40.0), nav: nav(1) })
            .unwrap();
        assert!(!rpt.initialising);

        // Origin at the previous waypoint, path frame is [east, north]
        assert_abs_diff_eq!(rpt.pos_m, Vector2::new(40.0, 30.0), epsilon = 1e-12);
        assert_eq!(rpt.path.map(|p| p.kind), Some(PrimitiveKind::Line));
    }

    #[test]
    fn test_on_path_gives_trim() {
        let mut params = Params::default();
        params.bar_trim_deg = 2.0;
        let mut ctrl = PathCtrl::with_params(params).unwrap();

        // Vehicle sits on the target point and is carried along with it
        let mut east = 0.0;
        for i in 0..20 {
            let (out, rpt) = ctrl.proc(&InputData {
                vehicle: vehicle(i as f64 * 0.1, 100.0, east),
                nav: nav(1),
            })
            .unwrap();

            if i > 0 {
                assert_abs_diff_eq!(rpt.frenet.x_m, 0.0, epsilon = 1e-6);
                assert_abs_diff_eq!(rpt.frenet.y_m, 0.0, epsilon = 1e-9);
                assert_abs_diff_eq!(rpt.frenet.course_err_rad, 0.0, epsilon = 1e-12);
                assert_abs_diff_eq!(out.lever.bar_rad, 2f64.to_radians(), epsilon = 1e-6);
                east += 0.8;
            }
        }
    }

    #[test]
    fn test_left_of_path_turns_right() {
        let mut ctrl = PathCtrl::with_params(Params::default()).unwrap();

        ctrl.proc(&InputData { vehicle: vehicle(0.0, 110.0, 0.0), nav: nav(1) }).unwrap();
        let (out, rpt) = ctrl.proc(&InputData { vehicle: vehicle(0.1, 110.0, 0.0), nav: nav(1) })
            .unwrap();

        assert!(rpt.frenet.y_m > 0.0);
        assert!(out.lever.bar_rad > 0.0);
    }

    #[test]
    fn test_zero_dt() {
        let mut ctrl = PathCtrl::with_params(Params::default()).unwrap();

        ctrl.proc(&InputData { vehicle: vehicle(0.0, 100.0, 0.0), nav: nav(1) }).unwrap();
        let (_, first) = ctrl.proc(&InputData { vehicle: vehicle(0.1, 100.0, 0.0), nav: nav(1) })
            .unwrap();

        // Repeated sample times count as stale and leave the target point
        // where the last good cycle moved it
        for n in 1..=2 {
            let (out, rpt) = ctrl.proc(&InputData { vehicle: vehicle(0.1, 100.0, 0.0), nav: nav(1) })
                .unwrap();
            assert!(rpt.stale_sample);
            assert_eq!(rpt.num_stale_samples, n);
            assert!(out.lever.bar_rad.is_finite());
            assert_eq!(rpt.path.map(|p| p.s_m), first.path.map(|p| p.s_m + 0.8));
        }
        assert_eq!(ctrl.num_stale_samples(), 2);
    }

    #[test]
    fn test_waypoint_change_deferred() {
        let mut ctrl = PathCtrl::with_params(Params::default()).unwrap();

        let mut t = 0.0;
        let mut east = 0.0;
        let mut step = |ctrl: &mut PathCtrl, wp_index: u16| {
            let r = ctrl.proc(&InputData { vehicle: vehicle(t, 100.0, east), nav: nav(wp_index) })
                .unwrap();
            t += 0.1;
            east += 0.8;
            r
        };

        for _ in 0..100 {
            step(&mut ctrl, 1);
        }

        // Part way along the leg, a new waypoint arms the switch only
        let (_, rpt) = step(&mut ctrl, 2);
        let path = rpt.path.unwrap();
        assert_eq!(path.latch, SwitchLatch::Armed);
        assert!(!path.committed);
        assert!(path.zeta > 0.1 && path.zeta < 1.0);
    }
}
