//! # Common calculations
//!
//! Calculations shared by more than one controller: the mapping from a
//! control-bar angle to the servo through the bar linkage, the wind
//! correction applied to steering rate demands, the fuzzy membership and rule
//! weight functions used by the Takagi-Sugeno controllers and the frame
//! conversions between the navigation frame and the path frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod actuator;
pub mod fuzzy;
pub mod geometry;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use actuator::*;
pub use fuzzy::*;
pub use geometry::*;
