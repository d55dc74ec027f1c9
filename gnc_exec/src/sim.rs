//! # Simulated vehicle and mission
//!
//! A kinematic model of the powered paraglider and a minimal waypoint
//! sequencer, standing in for the navigation filter and the mission layer so
//! that the control laws can be run in closed loop.
//!
//! The model turns at a rate proportional to the control bar angle, drifts
//! with a constant wind and climbs at a rate which lags the throttle's
//! departure from the level-flight throttle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use crate::common::servo_to_bar;
use gnc_if::{dems::GncDems, nav::NavTarget, vehicle::VehicleState};
use util::maths::{clamp, wrap_2pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the executable, loaded from `gnc_exec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecParams {
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of cycles to run before stopping.
    pub num_cycles: u64,

    /// If true each cycle is padded to the cycle period, otherwise cycles run
    /// back to back.
    pub realtime: bool,

    /// Units: meters
    pub target_alt_m: f64,

    pub mission: MissionParams,

    pub model: ModelParams,

    pub initial: InitialState,
}

/// Waypoint list flown by the simulated mission layer.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionParams {
    /// Units: meters,
    /// Frame: Local north-east
    pub waypoints_m_ne: Vec<[f64; 2]>,

    /// The next waypoint is accepted when the vehicle is closer than this.
    ///
    /// Units: meters
    pub acceptance_radius_m: f64,

    /// An orbit is requested while flying away from the waypoint with this
    /// index.
    #[serde(default)]
    pub orbit_at_wp: Option<u16>,
}

/// Parameters of the kinematic vehicle model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelParams {
    /// Units: meters/second
    pub airspeed_ms: f64,

    /// Ratio of turn rate to control bar angle.
    ///
    /// Units: 1/second
    pub turn_gain: f64,

    /// Units: meters/second,
    /// Frame: Local north-east
    pub wind_ms_ne: [f64; 2],

    /// Throttle at which the vehicle holds altitude.
    ///
    /// Units: percent
    pub level_throttle_pct: f64,

    /// Steady climb rate per percent of throttle above level.
    ///
    /// Units: meters/second/percent
    pub climb_per_pct_ms: f64,

    /// Time constant of the climb rate response.
    ///
    /// Units: seconds
    pub climb_time_const_s: f64,

    /// Pitch attitude in level flight.
    ///
    /// Units: degrees
    pub trim_pitch_deg: f64,

    /// Change of pitch attitude per unit climb rate.
    ///
    /// Units: degrees/(meters/second)
    pub pitch_per_climb_deg: f64,

    /// If false the model reports no airspeed measurement.
    pub airspeed_sensor: bool,
}

/// Initial state of the simulated vehicle.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InitialState {
    /// Units: meters,
    /// Frame: Local north-east
    pub position_m_ne: [f64; 2],

    /// Units: meters
    pub altitude_m: f64,

    /// Units: degrees
    pub heading_deg: f64,
}

/// The simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    params: ModelParams,

    state: VehicleState,
}

/// The simulated mission layer.
#[derive(Debug, Clone)]
pub struct Mission {
    params: MissionParams,

    /// Index of the waypoint being flown to.
    next_index: usize,

    num_legs_complete: u64,
}

/// Summary of a simulated flight, saved into the session directory at the
/// end of execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub num_cycles: u64,
    pub num_legs_complete: u64,
    pub num_cycle_overruns: u64,
    pub num_alt_ctrl_errors: u64,
    pub num_steer_ctrl_errors: u64,
    pub num_travel_limited: u64,
    pub final_state: VehicleState,

    /// Units: meters
    pub max_alt_err_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExecParams {
    /// Check the parameters are self-consistent, returning a description of
    /// the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.cycle_period_s <= 0.0 {
            return Err(String::from("cycle_period_s must be positive"));
        }

        if self.mission.waypoints_m_ne.len() < 2 {
            return Err(String::from("at least two waypoints are needed"));
        }

        if self.mission.waypoints_m_ne.len() > u16::MAX as usize {
            return Err(String::from("too many waypoints"));
        }

        if self.mission.acceptance_radius_m <= 0.0 {
            return Err(String::from("acceptance_radius_m must be positive"));
        }

        if self.model.airspeed_ms <= 0.0 {
            return Err(String::from("model.airspeed_ms must be positive"));
        }

        if self.model.climb_time_const_s <= 0.0 {
            return Err(String::from("model.climb_time_const_s must be positive"));
        }

        Ok(())
    }
}

impl SimVehicle {
    pub fn new(params: ModelParams, initial: &InitialState) -> Self {
        let heading_rad = wrap_2pi(initial.heading_deg.to_radians());

        let mut sim = Self {
            state: VehicleState {
                time_s: 0.0,
                position_m_ne: Vector2::new(initial.position_m_ne[0], initial.position_m_ne[1]),
                altitude_m: initial.altitude_m,
                pitch_rad: params.trim_pitch_deg.to_radians(),
                yaw_rad: heading_rad,
                ..Default::default()
            },
            params,
        };

        sim.update_ground_velocity();

        sim
    }

    /// The state as sampled by the navigation filter.
    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Propagate the model by `dt_s` under the given demands.
    pub fn step(&mut self, dt_s: f64, dems: &GncDems) {
        if dt_s <= 0.0 {
            return;
        }

        let p = &self.params;

        // Lateral
        let servo_rad = (dems.steer_cdeg as f64 / 100.0).to_radians();
        let bar_rad = servo_to_bar(servo_rad);
        self.state.yaw_rad = wrap_2pi(self.state.yaw_rad + p.turn_gain * bar_rad * dt_s);

        let ground_vel = self.ground_velocity_ms_ne();
        self.state.position_m_ne += ground_vel * dt_s;

        // Vertical, first order lag onto the steady climb rate
        let climb_ss_ms = p.climb_per_pct_ms * (dems.throttle_pct - p.level_throttle_pct);
        let lag = clamp(dt_s / p.climb_time_const_s, 0.0, 1.0);
        self.state.climb_rate_ms += (climb_ss_ms - self.state.climb_rate_ms) * lag;
        self.state.altitude_m += self.state.climb_rate_ms * dt_s;

        let pitch_rad = (p.trim_pitch_deg
            + p.pitch_per_climb_deg * self.state.climb_rate_ms).to_radians();
        self.state.pitch_rate_rads = (pitch_rad - self.state.pitch_rad) / dt_s;
        self.state.pitch_rad = pitch_rad;

        self.state.time_s += dt_s;

        self.update_ground_velocity();
    }

    fn ground_velocity_ms_ne(&self) -> Vector2<f64> {
        let (sin_y, cos_y) = self.state.yaw_rad.sin_cos();
        let wind = Vector2::new(self.params.wind_ms_ne[0], self.params.wind_ms_ne[1]);

        Vector2::new(cos_y, sin_y) * self.params.airspeed_ms + wind
    }

    fn update_ground_velocity(&mut self) {
        let vel = self.ground_velocity_ms_ne();

        self.state.ground_speed_ms = vel.norm();
        self.state.course_rad = wrap_2pi(vel[1].atan2(vel[0]));
        self.state.airspeed_ms = if self.params.airspeed_sensor {
            Some(self.params.airspeed_ms)
        }
        else {
            None
        };
    }
}

impl Mission {
    /// Create the mission, flying from the first waypoint to the second.
    ///
    /// The parameters must have been validated first.
    pub fn new(params: MissionParams) -> Self {
        Self {
            params,
            next_index: 1,
            num_legs_complete: 0,
        }
    }

    pub fn num_legs_complete(&self) -> u64 {
        self.num_legs_complete
    }

    /// Sequence the waypoints for a vehicle at `position_m_ne` and produce
    /// the navigation target.
    ///
    /// After the last waypoint the mission wraps around to the first.
    pub fn update(&mut self, position_m_ne: &Vector2<f64>, target_alt_m: f64) -> NavTarget {
        let num_wps = self.params.waypoints_m_ne.len();

        if (self.wp(self.next_index) - position_m_ne).norm() < self.params.acceptance_radius_m {
            self.next_index = (self.next_index + 1) % num_wps;
            self.num_legs_complete += 1;

            info!(
                "Waypoint reached, now flying to waypoint {} at {:?}",
                self.next_index,
                self.params.waypoints_m_ne[self.next_index]
            );
        }

        let prev_index = (self.next_index + num_wps - 1) % num_wps;

        NavTarget {
            prev_wp_m_ne: self.wp(prev_index),
            next_wp_m_ne: self.wp(self.next_index),
            wp_index: self.next_index as u16,
            target_alt_m,
            orbit_request: self.params.orbit_at_wp == Some(prev_index as u16),
        }
    }

    fn wp(&self, index: usize) -> Vector2<f64> {
        let wp = self.params.waypoints_m_ne[index];
        Vector2::new(wp[0], wp[1])
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
