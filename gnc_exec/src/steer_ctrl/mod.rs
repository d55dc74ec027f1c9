//! # Steering control module
//!
//! Selects, once at initialisation, which steering controller produces the
//! servo demand for the control bar: segment trace control, the 2D path
//! controller or a constant trim. Whichever is selected, the demand is
//! limited to the servo's travel before being output in centidegrees.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

use crate::{path_ctrl::PathCtrlError, seg_ctrl::SegCtrlError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SteerCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SteerCtrlError {
    #[error("Could not load the SteerCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid SteerCtrl parameters: {0}")]
    InvalidParams(String),

    #[error("Segment trace control error: {0}")]
    SegCtrlError(#[from] SegCtrlError),

    #[error("2D path control error: {0}")]
    PathCtrlError(#[from] PathCtrlError),
}
