//! # Navigation target
//!
//! Supplied each cycle by the mission layer, which owns waypoint storage and
//! mission-item sequencing.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The active waypoint pair and altitude target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NavTarget {
    /// The waypoint the current leg started from.
    ///
    /// Units: meters,
    /// Frame: Local north-east
    pub prev_wp_m_ne: Vector2<f64>,

    /// The waypoint the current leg is heading to. Also the centre of the
    /// orbits and curves flown by the 2D path controller.
    ///
    /// Units: meters,
    /// Frame: Local north-east
    pub next_wp_m_ne: Vector2<f64>,

    /// Index of `next_wp_m_ne` in the mission. Changes whenever the mission
    /// layer advances to a new leg.
    pub wp_index: u16,

    /// Commanded altitude.
    ///
    /// Units: meters
    pub target_alt_m: f64,

    /// Set by the mission layer for one or more cycles to request an orbit
    /// around `prev_wp_m_ne` when flying the combined line/circle trace.
    pub orbit_request: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavTarget {
    fn default() -> Self {
        Self {
            prev_wp_m_ne: Vector2::zeros(),
            next_wp_m_ne: Vector2::zeros(),
            wp_index: 0,
            target_alt_m: 0.0,
            orbit_request: false,
        }
    }
}
