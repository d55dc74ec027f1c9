//! # 2D path control module
//!
//! The 2D path controller steers the vehicle onto a target point which moves
//! along a parametric path. The path is built from primitives (lines, circles
//! and two Lissajous-type curves) chosen by a flight plan as the mission
//! advances through its waypoints. The target point is placed on the current
//! primitive by the arc length `s` travelled along it.
//!
//! The tracking error is expressed in the Serret-Frenet frame of the target
//! point, giving the along-path error `x_F`, the cross-path error `y_F` and
//! the course error `chi_F`. A linear feedback on these sets the speed at
//! which the target point advances, so that it waits for or runs ahead of
//! the vehicle, and a Takagi-Sugeno fuzzy feedback blended over four rules
//! gives the turn rate demand.
//!
//! A change of waypoint while a primitive is being flown does not move the
//! target immediately. The change is latched and committed when the
//! primitive's parameter reaches its terminal value, so the commanded
//! position never jumps mid-primitive.
//!
//! All positions in this module are in the path frame (see
//! `crate::common::geometry`), relative to the previous waypoint at the time
//! the controller was first run.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod frenet;
mod generator;
mod params;
mod primitives;
mod search;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use frenet::*;
pub use generator::*;
pub use params::*;
pub use primitives::*;
pub use search::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PathCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum PathCtrlError {
    #[error("Could not load the PathCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid PathCtrl parameters: {0}")]
    InvalidParams(String),
}
