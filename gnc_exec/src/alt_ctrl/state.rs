//! Implementations for the AltCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
use super::{
    neutral_thrust_n, AltCtrlError, AltLaw, LawInput, Params, ThrustCalib, NUM_LMI_RULES,
    NUM_SCHED_VARS,
};
use gnc_if::vehicle::VehicleState;
use util::{module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Altitude control module state
#[derive(Default)]
pub struct AltCtrl {
    pub(crate) params: Params,

    /// The law and calibration, built on the first call to `proc`.
    core: Option<Core>,

    /// Sample latched on the previous cycle
    prev: Option<Sample>,

    /// Most recent differentiated altitude rate
    alt_rate_ms: f64,

    /// Most recent differentiated pitch rate
    pitch_rate_rads: f64,

    /// Number of cycles on which the sample time did not advance
    num_stale_samples: u64,

    unimplemented_warned: bool,
}

/// Input data to altitude control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    pub vehicle: VehicleState,

    /// Units: meters
    pub target_alt_m: f64,
}

/// Output demands from altitude control.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct OutputData {
    /// Units: newtons
    pub thrust_n: f64,

    /// Units: percent
    pub throttle_pct: f64,
}

/// Status report for AltCtrl processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Units: meters
    pub alt_err_m: f64,

    /// Differentiated altitude rate.
    ///
    /// Units: meters/second
    pub alt_rate_ms: f64,

    /// Differentiated pitch rate.
    ///
    /// Units: radians/second
    pub pitch_rate_rads: f64,

    /// True if the sample time did not advance this cycle and the previous
    /// rates were reused.
    pub stale_sample: bool,

    /// Total number of stale samples seen since initialisation.
    pub num_stale_samples: u64,

    /// Blend weights of the PD controllers.
    pub blend: [f64; 2],

    /// Scheduling variables of the fuzzy controller.
    pub sched: [f64; NUM_SCHED_VARS],

    /// Rule weights of the fuzzy controller.
    pub rule_weights: [f64; NUM_LMI_RULES],

    /// True if the selected law is unimplemented.
    pub law_unimplemented: bool,

    /// True if the calibration changed the throttle from the exact inverse of
    /// the thrust demand (motor cut or maximum throttle).
    pub throttle_limited: bool,
}

#[derive(Debug, Clone, Copy)]
struct Core {
    law: AltLaw,
    calib: ThrustCalib,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    time_s: f64,
    altitude_m: f64,
    pitch_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for AltCtrl {
    type InitData = &'static str;
    type InitError = AltCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = AltCtrlError;

    /// Initialise the AltCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(AltCtrlError::ParamLoadError)?;

        *self = Self::with_params(params)?;

        Ok(())
    }

    /// Perform cyclic processing of altitude control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();
        let vehicle = &input_data.vehicle;

        // The law is latched on the first cycle
        let core = match self.core {
            Some(c) => c,
            None => {
                let c = Core::from_params(&self.params);
                self.core = Some(c);
                c
            }
        };

        // Differentiate altitude and pitch
        match self.prev {
            None => {
                self.alt_rate_ms = 0.0;
                self.pitch_rate_rads = 0.0;
            },
            Some(prev) => {
                let dt = vehicle.time_s - prev.time_s;

                if dt > 0.0 {
                    self.alt_rate_ms = (vehicle.altitude_m - prev.altitude_m) / dt;
                    self.pitch_rate_rads = (vehicle.pitch_rad - prev.pitch_rad) / dt;
                }
                else {
                    self.num_stale_samples += 1;
                    report.stale_sample = true;
                    trace!("AltCtrl sample time did not advance (dt = {} s)", dt);
                }
            }
        }

        self.prev = Some(Sample {
            time_s: vehicle.time_s,
            altitude_m: vehicle.altitude_m,
            pitch_rad: vehicle.pitch_rad,
        });

        // Evaluate the law
        let law_input = LawInput {
            alt_err_m: vehicle.altitude_m - input_data.target_alt_m,
            alt_rate_ms: self.alt_rate_ms,
            pitch_rad: vehicle.pitch_rad,
            pitch_rate_rads: self.pitch_rate_rads,
            gps_climb_rate_ms: vehicle.climb_rate_ms,
            gyro_pitch_rate_rads: vehicle.pitch_rate_rads,
        };

        let law_out = core.law.thrust(&law_input);

        if law_out.unimplemented && !self.unimplemented_warned {
            warn!(
                "AltCtrl law {:?} is not implemented, demanding zero thrust",
                self.params.law
            );
            self.unimplemented_warned = true;
        }

        let (throttle_pct, throttle_limited) = core.calib
            .thrust_to_pct_limited(law_out.thrust_n);

        report.alt_err_m = law_input.alt_err_m;
        report.alt_rate_ms = self.alt_rate_ms;
        report.pitch_rate_rads = self.pitch_rate_rads;
        report.num_stale_samples = self.num_stale_samples;
        report.blend = law_out.blend;
        report.sched = law_out.sched;
        report.rule_weights = law_out.rule_weights;
        report.law_unimplemented = law_out.unimplemented;
        report.throttle_limited = throttle_limited;

        let output = OutputData {
            thrust_n: law_out.thrust_n,
            throttle_pct,
        };

        trace!(
            "AltCtrl: err {:.3} m, rate {:.3} m/s, thrust {:.3} N, throttle {:.2} %",
            report.alt_err_m,
            report.alt_rate_ms,
            output.thrust_n,
            output.throttle_pct
        );

        Ok((output, report))
    }
}

impl AltCtrl {
    /// Create a new instance from already loaded parameters.
    pub fn with_params(params: Params) -> Result<Self, AltCtrlError> {
        params.validate().map_err(AltCtrlError::InvalidParams)?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Number of cycles on which the sample time did not advance.
    pub fn num_stale_samples(&self) -> u64 {
        self.num_stale_samples
    }
}

impl Core {
    fn from_params(params: &Params) -> Self {
        Self {
            law: AltLaw::from_params(params),
            calib: ThrustCalib::new(
                &params.calib,
                neutral_thrust_n(params.trim_pitch_deg.to_radians(), params.trim_airspeed_ms)
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::alt_ctrl::AltLawKind;
    use approx::assert_abs_diff_eq;

    fn input(time_s: f64, altitude_m: f64, target_alt_m: f64) -> InputData {
        let mut vehicle = VehicleState::default();
        vehicle.time_s = time_s;
        vehicle.altitude_m = altitude_m;

        InputData { vehicle, target_alt_m }
    }

    #[test]
    fn test_pd_above_target() {
        let mut params = Params::default();
        params.law = AltLawKind::Pd;
        params.motor_neutral_n = 0.0;
        params.kp = [0.35, 0.0];
        params.kd = [0.8, 0.0];

        let mut ctrl = AltCtrl::with_params(params).unwrap();

        // First call latches the sample, so the rate is zero
        let (out, rpt) = ctrl.proc(&input(0.0, 110.0, 100.0)).unwrap();
        assert_eq!(rpt.alt_rate_ms, 0.0);
        assert_abs_diff_eq!(out.thrust_n, -0.35 * 10.0, epsilon = 1e-12);
        assert_eq!(out.throttle_pct, 0.0);
        assert!(rpt.throttle_limited);
    }

    #[test]
    fn test_zero_dt() {
        let mut params = Params::default();
        params.law = AltLawKind::Pd;
        let mut ctrl = AltCtrl::with_params(params).unwrap();

        ctrl.proc(&input(0.0, 100.0, 100.0)).unwrap();
        let (_, rpt) = ctrl.proc(&input(0.1, 100.5, 100.0)).unwrap();
        assert_abs_diff_eq!(rpt.alt_rate_ms, 5.0, epsilon = 1e-9);
        assert!(!rpt.stale_sample);
        assert_eq!(ctrl.num_stale_samples(), 0);

        // Same sample time, the previous rate is reused
        let (_, rpt) = ctrl.proc(&input(0.1, 100.9, 100.0)).unwrap();
        assert_abs_diff_eq!(rpt.alt_rate_ms, 5.0, epsilon = 1e-9);
        assert!(rpt.stale_sample);
        assert_eq!(ctrl.num_stale_samples(), 1);

        // Differencing resumes from the latest sample
        let (_, rpt) = ctrl.proc(&input(0.2, 101.0, 100.0)).unwrap();
        assert_abs_diff_eq!(rpt.alt_rate_ms, 1.0, epsilon = 1e-9);
        assert_eq!(rpt.num_stale_samples, 1);
    }

    #[test]
    fn test_unimplemented_law() {
        let mut params = Params::default();
        params.law = AltLawKind::Lqr;
        let mut ctrl = AltCtrl::with_params(params).unwrap();

        for i in 0..3 {
            let (out, rpt) = ctrl.proc(&input(i as f64 * 0.1, 50.0, 100.0)).unwrap();
            assert_eq!(out.thrust_n, 0.0);
            assert_eq!(out.throttle_pct, 0.0);
            assert!(rpt.law_unimplemented);

            // Zero thrust needs no limiting
            assert!(!rpt.throttle_limited);
        }
    }

    #[test]
    fn test_invalid_params() {
        let mut params = Params::default();
        params.blend_rate_lower_ms = params.blend_rate_upper_ms;

        assert!(matches!(
            AltCtrl::with_params(params),
            Err(AltCtrlError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_throttle_below_target() {
        let mut ctrl = AltCtrl::with_params(Params::default()).unwrap();

        let (level, rpt) = ctrl.proc(&input(0.0, 100.0, 100.0)).unwrap();
        assert!(!rpt.throttle_limited);
        assert_abs_diff_eq!(level.throttle_pct, 55.0, epsilon = 1e-9);

        let (low, _) = ctrl.proc(&input(0.1, 100.0, 110.0)).unwrap();
        assert!(low.throttle_pct > level.throttle_pct);
    }
}
