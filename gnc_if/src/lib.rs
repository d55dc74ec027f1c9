//! # Guidance and control interface crate.
//!
//! Provides the data exchanged between the control laws and their
//! collaborators: the sensed vehicle state, the navigation target supplied by
//! the mission layer and the actuator demands produced each cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator demands produced by the control laws
pub mod dems;

/// Navigation target (waypoints and target altitude) from the mission layer
pub mod nav;

/// Sensed vehicle state
pub mod vehicle;
