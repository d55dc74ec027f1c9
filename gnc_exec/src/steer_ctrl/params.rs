//! Parameters structure for SteerCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for steering control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// The controller which produces the steering demand.
    pub mode: SteerMode,

    /// Limit of the servo demand either side of zero.
    ///
    /// Units: centidegrees
    pub travel_limit_cdeg: i32,

    /// Trim servo angle output in `constant` mode.
    ///
    /// Units: degrees
    pub constant_trim_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Available steering controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SteerMode {
    /// Line and circle segment trace.
    Segment,

    /// A fixed servo angle.
    Constant,

    /// 2D path control.
    Path2d,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            mode: SteerMode::Constant,
            travel_limit_cdeg: 4500,
            constant_trim_deg: 0.0,
        }
    }
}

impl Params {
    /// Check the parameters are self-consistent, returning a description of
    /// the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.travel_limit_cdeg <= 0 {
            return Err(String::from("travel_limit_cdeg must be positive"));
        }

        Ok(())
    }
}
