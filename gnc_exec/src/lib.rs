//! # Guidance and control library.
//!
//! This library allows other crates in the workspace, and the integration
//! tests and benchmarks, to access the control laws defined inside the
//! guidance and control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Altitude control module - converts altitude error into a thrust and throttle demand
pub mod alt_ctrl;

/// Calculations shared between the control modules (bar linkage, fuzzy weights, frames)
pub mod common;

/// Global data store for the executable
pub mod data_store;

/// Generalised 2D path control module - tracks a moving point along a primitive curve
pub mod path_ctrl;

/// Segment control module - traces lines and circles between waypoints
pub mod seg_ctrl;

/// Simulated vehicle and mission layer used to run the laws in closed loop
pub mod sim;

/// Steering control module - selects the controller producing the steering demand
pub mod steer_ctrl;
