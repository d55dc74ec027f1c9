//! # Segment trace control module
//!
//! Segment trace control steers the vehicle along either a straight segment
//! between two waypoints or a circle about a fixed centre.
//!
//! For a line the controlled errors are the cross-track distance `y`
//! (positive to the right of the segment) and the course error (ground
//! course minus the segment bearing). For a circle they are the radial error
//! (positive when the orbit lies to the vehicle's left) and the course error
//! against the tangent of the circle at the vehicle's bearing from the
//! centre. One of four steering laws turns these into a turn rate demand,
//! which is corrected for wind and converted into a control bar angle.
//! Circles add a feed-forward bar angle for the turn rate of the orbit itself.
//!
//! In combined mode the module starts on the line and switches to an orbit of
//! the previous waypoint when the mission layer requests it. After the
//! configured number of orbits it rejoins the line once the vehicle is ahead
//! of the previous waypoint and close to the line.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod geometry;
mod laws;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use geometry::*;
pub use laws::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SegCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SegCtrlError {
    #[error("Could not load the SegCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid SegCtrl parameters: {0}")]
    InvalidParams(String),
}
