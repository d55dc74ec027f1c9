//! # Closed loop tests
//!
//! Runs the altitude and steering controllers against the simulated vehicle
//! and mission, and checks the shipped parameter files parse and validate.

use std::path::PathBuf;

use gnc_lib::{
    alt_ctrl::{self, AltCtrl},
    path_ctrl::{self, FlightPlan, PathCtrl},
    seg_ctrl::{self, SegCtrl},
    sim::{ExecParams, InitialState, Mission, MissionParams, ModelParams, SimVehicle},
    steer_ctrl::{self, SteerCtrl, SteerMode, Steerer},
};
use gnc_if::dems::GncDems;
use util::{module::State, params};

const CYCLE_PERIOD_S: f64 = 0.1;
const TARGET_ALT_M: f64 = 120.0;

fn params_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("params")
        .join(name)
}

fn model() -> ModelParams {
    ModelParams {
        airspeed_ms: 7.0,
        turn_gain: 0.5,
        wind_ms_ne: [-1.0, 0.5],
        level_throttle_pct: 55.0,
        climb_per_pct_ms: 0.05,
        climb_time_const_s: 1.5,
        trim_pitch_deg: 15.8,
        pitch_per_climb_deg: 2.0,
        airspeed_sensor: false,
    }
}

fn mission() -> Mission {
    Mission::new(MissionParams {
        waypoints_m_ne: vec![[0.0, 0.0], [0.0, 200.0], [200.0, 200.0], [200.0, 0.0]],
        acceptance_radius_m: 15.0,
        orbit_at_wp: Some(2),
    })
}

/// Fly `num_cycles` cycles with the default travel limit, checking the
/// demands every cycle, and return the final altitude error.
fn fly(steer: &mut SteerCtrl, num_cycles: usize) -> f64 {
    let mut alt = AltCtrl::with_params(alt_ctrl::Params::default()).unwrap();
    let mut vehicle = SimVehicle::new(model(), &InitialState {
        position_m_ne: [-20.0, -10.0],
        altitude_m: 100.0,
        heading_deg: 80.0,
    });
    let mut mission = mission();
    let limit = steer_ctrl::Params::default().travel_limit_cdeg;

    for _ in 0..num_cycles {
        let state = vehicle.state();
        let nav = mission.update(&state.position_m_ne, TARGET_ALT_M);

        let (alt_out, _) = alt.proc(&alt_ctrl::InputData {
            vehicle: state,
            target_alt_m: nav.target_alt_m,
        }).unwrap();

        let (steer_out, _) = steer.proc(&steer_ctrl::InputData {
            vehicle: state,
            nav,
        }).unwrap();

        assert!(alt_out.throttle_pct.is_finite());
        assert!(alt_out.throttle_pct >= 0.0 && alt_out.throttle_pct <= 100.0);
        assert!(steer_out.steer_cdeg.abs() <= limit);

        vehicle.step(CYCLE_PERIOD_S, &GncDems {
            throttle_pct: alt_out.throttle_pct,
            steer_cdeg: steer_out.steer_cdeg,
        });

        let s = vehicle.state();
        assert!(s.position_m_ne[0].is_finite() && s.position_m_ne[1].is_finite());
        assert!(s.altitude_m.is_finite());
    }

    vehicle.state().altitude_m - TARGET_ALT_M
}

#[test]
fn test_segment_closed_loop() {
    let mut seg_params = seg_ctrl::Params::default();
    seg_params.combine = true;

    let mut steer = SteerCtrl::with_steerer(
        steer_ctrl::Params {
            mode: SteerMode::Segment,
            ..Default::default()
        },
        Steerer::Segment(SegCtrl::with_params(seg_params).unwrap()),
    ).unwrap();

    let alt_err_m = fly(&mut steer, 3000);

    // Climbs from 20 m below the target and settles near it
    assert!(alt_err_m.abs() < 10.0);
}

#[test]
fn test_path_closed_loop() {
    for plan in [
        FlightPlan::LineSequence,
        FlightPlan::LineThenOrbitRight,
        FlightPlan::LineThenOrbitLeft,
        FlightPlan::LineFigureEight,
        FlightPlan::LineDecorative,
    ].iter() {
        let path_params = path_ctrl::Params {
            flight_plan: *plan,
            curve_wp_index: 2,
            ..Default::default()
        };

        let mut steer = SteerCtrl::with_steerer(
            steer_ctrl::Params {
                mode: SteerMode::Path2d,
                ..Default::default()
            },
            Steerer::Path2d(PathCtrl::with_params(path_params).unwrap()),
        ).unwrap();

        fly(&mut steer, 1500);
    }
}

#[test]
fn test_shipped_params() {
    let p: alt_ctrl::Params = params::load_path(params_path("alt_ctrl.toml")).unwrap();
    p.validate().unwrap();

    let p: seg_ctrl::Params = params::load_path(params_path("seg_ctrl.toml")).unwrap();
    p.validate().unwrap();

    let p: path_ctrl::Params = params::load_path(params_path("path_ctrl.toml")).unwrap();
    p.validate().unwrap();

    let p: steer_ctrl::Params = params::load_path(params_path("steer_ctrl.toml")).unwrap();
    p.validate().unwrap();

    let p: ExecParams = params::load_path(params_path("gnc_exec.toml")).unwrap();
    p.validate().unwrap();
    assert_eq!(p.mission.waypoints_m_ne.len(), 4);
}
