//! # Actuator demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent to the servo/ESC output layer each cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GncDems {
    /// Throttle demand.
    ///
    /// Units: percent, between 0 and the configured maximum throttle
    pub throttle_pct: f64,

    /// Steering servo demand, bounded by the configured servo travel.
    ///
    /// Units: centidegrees
    pub steer_cdeg: i32,
}
