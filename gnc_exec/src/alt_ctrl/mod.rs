//! # Altitude control module
//!
//! Altitude control converts the altitude error into a propeller thrust
//! demand, and then into a throttle percentage using the motor's static
//! thrust calibration.
//!
//! Several control laws are available and one is chosen from the parameter
//! file when the module is initialised:
//!
//! - `pd_blend`: two PD controllers blended on the climb rate, biased by the
//!   thrust needed for level flight at the trim point,
//! - `sos`: a state-dependent polynomial feedback found by sum-of-squares
//!   synthesis,
//! - `pd`: a single PD controller,
//! - `fuzzy_lmi`: a Takagi-Sugeno fuzzy controller with eight rules, each an
//!   LMI-designed state feedback, scheduled on three variables derived from
//!   the paraglider's longitudinal dynamics,
//! - `lqr` and `ki`: reserved for future work, these demand zero thrust.
//!
//! The altitude and pitch rates used by the PD and SOS laws are found by
//! differencing successive samples. When two cycles carry the same sample
//! time the previous rates are reused and the event is counted.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calib;
mod gain_sets;
mod laws;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use calib::*;
pub use gain_sets::*;
pub use laws::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during AltCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum AltCtrlError {
    #[error("Could not load the AltCtrl parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid AltCtrl parameters: {0}")]
    InvalidParams(String),
}
