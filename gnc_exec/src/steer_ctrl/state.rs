//! Implementations for the SteerCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{Params, SteerCtrlError, SteerMode};
use crate::{
    common::LeverDemand,
    path_ctrl::{self, PathCtrl},
    seg_ctrl::{self, SegCtrl},
};
use gnc_if::{nav::NavTarget, vehicle::VehicleState};
use util::{module::State, params};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file of segment trace control.
pub const SEG_CTRL_PARAMS: &str = "seg_ctrl.toml";

/// Parameter file of 2D path control.
pub const PATH_CTRL_PARAMS: &str = "path_ctrl.toml";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering control module state
pub struct SteerCtrl {
    pub(crate) params: Params,

    steerer: Steerer,
}

/// Input data to steering control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    pub vehicle: VehicleState,
    pub nav: NavTarget,
}

/// Output demand from steering control.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct OutputData {
    /// Units: centidegrees
    pub steer_cdeg: i32,
}

/// Status report for SteerCtrl processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub mode: Option<SteerMode>,

    /// Bar and servo demand before the travel limit, if a controller
    /// produced one.
    pub lever: Option<LeverDemand>,

    pub seg_ctrl: Option<seg_ctrl::StatusReport>,

    pub path_ctrl: Option<path_ctrl::StatusReport>,

    /// True if the demand was limited to the servo's travel.
    pub travel_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The controller producing the steering demand.
pub enum Steerer {
    Segment(SegCtrl),
    Constant,
    Path2d(PathCtrl),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SteerCtrl {
    fn default() -> Self {
        Self {
            params: Params::default(),
            steerer: Steerer::Constant,
        }
    }
}

impl State for SteerCtrl {
    type InitData = &'static str;
    type InitError = SteerCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SteerCtrlError;

    /// Initialise the SteerCtrl module.
    ///
    /// Expected init data is the path to the parameter file. The selected
    /// controller is initialised from its own parameter file.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(SteerCtrlError::ParamLoadError)?;

        let steerer = match params.mode {
            SteerMode::Segment => {
                let mut seg = SegCtrl::default();
                seg.init(SEG_CTRL_PARAMS)?;
                Steerer::Segment(seg)
            },
            SteerMode::Constant => Steerer::Constant,
            SteerMode::Path2d => {
                let mut path = PathCtrl::default();
                path.init(PATH_CTRL_PARAMS)?;
                Steerer::Path2d(path)
            },
        };

        info!("SteerCtrl: steering with {:?} control", params.mode);

        *self = Self::with_steerer(params, steerer)?;

        Ok(())
    }

    /// Perform cyclic processing of steering control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport {
            mode: Some(self.params.mode),
            ..Default::default()
        };

        let raw_cdeg = match self.steerer {
            Steerer::Segment(ref mut seg) => {
                let (out, rpt) = seg.proc(&seg_ctrl::InputData {
                    vehicle: input_data.vehicle,
                    nav: input_data.nav,
                })?;
                report.lever = Some(out.lever);
                report.seg_ctrl = Some(rpt);
                out.lever.servo_cdeg()
            },
            Steerer::Constant => (self.params.constant_trim_deg * 100.0) as i32,
            Steerer::Path2d(ref mut path) => {
                let (out, rpt) = path.proc(&path_ctrl::InputData {
                    vehicle: input_data.vehicle,
                    nav: input_data.nav,
                })?;
                report.lever = Some(out.lever);
                report.path_ctrl = Some(rpt);
                out.lever.servo_cdeg()
            },
        };

        let limit = self.params.travel_limit_cdeg;
        let steer_cdeg = raw_cdeg.clamp(-limit, limit);
        report.travel_limited = steer_cdeg != raw_cdeg;

        trace!("SteerCtrl: {} cdeg (raw {} cdeg)", steer_cdeg, raw_cdeg);

        Ok((OutputData { steer_cdeg }, report))
    }
}

impl SteerCtrl {
    /// Create a new instance from already loaded parameters and an
    /// initialised controller of the selected mode.
    pub fn with_steerer(params: Params, steerer: Steerer) -> Result<Self, SteerCtrlError> {
        params.validate().map_err(SteerCtrlError::InvalidParams)?;

        if steerer.mode() != params.mode {
            return Err(SteerCtrlError::InvalidParams(format!(
                "mode is {:?} but a {:?} controller was supplied",
                params.mode,
                steerer.mode()
            )));
        }

        Ok(Self { params, steerer })
    }

    pub fn mode(&self) -> SteerMode {
        self.params.mode
    }
}

impl Steerer {
    pub fn mode(&self) -> SteerMode {
        match self {
            Steerer::Segment(_) => SteerMode::Segment,
            Steerer::Constant => SteerMode::Constant,
            Steerer::Path2d(_) => SteerMode::Path2d,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
