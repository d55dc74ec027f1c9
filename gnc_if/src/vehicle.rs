//! # Vehicle state
//!
//! The vehicle state is sampled once per cycle by the navigation filter and
//! is read-only to the control laws.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sensed state of the vehicle for one control cycle.
///
/// Positions are in the local navigation frame, with element 0 being the
/// distance north of the navigation origin and element 1 the distance east.
/// Heading-type angles (`yaw_rad`, `course_rad`) are measured clockwise from
/// north.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleState {
    /// Time at which the state was sampled.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Position of the vehicle in the local navigation frame.
    ///
    /// Units: meters,
    /// Frame: Local north-east
    pub position_m_ne: Vector2<f64>,

    /// Altitude above the navigation origin.
    ///
    /// Units: meters
    pub altitude_m: f64,

    /// Pitch attitude, positive nose up.
    ///
    /// Units: radians
    pub pitch_rad: f64,

    /// Heading of the vehicle body.
    ///
    /// Units: radians
    pub yaw_rad: f64,

    /// Ground course (direction of the ground velocity).
    ///
    /// Units: radians
    pub course_rad: f64,

    /// Ground speed.
    ///
    /// Units: meters/second
    pub ground_speed_ms: f64,

    /// Climb rate from the GNSS receiver, positive upwards.
    ///
    /// Units: meters/second
    pub climb_rate_ms: f64,

    /// Body pitch rate from the gyro.
    ///
    /// Units: radians/second
    pub pitch_rate_rads: f64,

    /// Measured airspeed, or `None` if no airspeed sensor is fitted or the
    /// sensor is unhealthy.
    ///
    /// Units: meters/second
    pub airspeed_ms: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            time_s: 0.0,
            position_m_ne: Vector2::zeros(),
            altitude_m: 0.0,
            pitch_rad: 0.0,
            yaw_rad: 0.0,
            course_rad: 0.0,
            ground_speed_ms: 0.0,
            climb_rate_ms: 0.0,
            pitch_rate_rads: 0.0,
            airspeed_ms: None,
        }
    }
}

impl VehicleState {
    /// Get the airspeed, falling back to the given nominal value if no
    /// measurement is available.
    pub fn airspeed_or(&self, nominal_ms: f64) -> f64 {
        match self.airspeed_ms {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => nominal_ms,
        }
    }
}
