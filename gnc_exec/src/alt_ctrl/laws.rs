//! Altitude control laws

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{
    lmi_gain_set, neutral_thrust_n, AltLawKind, LmiGainSet, Params, NUM_LMI_RULES, NUM_SCHED_VARS,
};
use crate::common::{blend_feedback, rule_weights, Grades};
use util::maths::{clamp, wrap_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Longitudinal model of the paraglider used by the fuzzy controller. The
/// model is linearised about a fixed trim point independent of the trim
/// parameters used by the other laws.
mod aero {
    /// Canopy mass, kg
    pub const CANOPY_MASS_KG: f64 = 0.17;
    /// Payload (fuselage) mass, kg
    pub const PAYLOAD_MASS_KG: f64 = 1.197;
    /// Lift coefficient
    pub const LIFT_COEFF: f64 = 0.466;
    /// Drag coefficient
    pub const DRAG_COEFF: f64 = 0.164;
    /// Air density, kg/m^3
    pub const AIR_DENSITY_KGM3: f64 = 1.293;
    /// Line length from the canopy to the payload, m
    pub const LINE_LENGTH_M: f64 = 0.959;
    /// Distance from the payload to the centre of gravity, m
    pub const CG_OFFSET_M: f64 = 0.136;
    /// Canopy area, m^2
    pub const CANOPY_AREA_M2: f64 = 0.9424;
    /// Pitch moment of inertia, kg m^2
    pub const PITCH_INERTIA_KGM2: f64 = 0.137;
    /// Canopy rigging angle, degrees
    pub const RIGGING_ANGLE_DEG: f64 = 4.36;
    /// Trim pitch attitude, degrees
    pub const TRIM_PITCH_DEG: f64 = 15.8;
    /// Trim thrust, N
    pub const TRIM_THRUST_N: f64 = 4.46;
    /// Trim horizontal speed, m/s
    pub const TRIM_SPEED_MS: f64 = 6.55;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Signals available to the control laws on each cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LawInput {
    /// Altitude minus target altitude.
    ///
    /// Units: meters
    pub alt_err_m: f64,

    /// Differentiated altitude rate.
    ///
    /// Units: meters/second
    pub alt_rate_ms: f64,

    /// Units: radians
    pub pitch_rad: f64,

    /// Differentiated pitch rate.
    ///
    /// Units: radians/second
    pub pitch_rate_rads: f64,

    /// Climb rate measured by the GNSS receiver.
    ///
    /// Units: meters/second
    pub gps_climb_rate_ms: f64,

    /// Pitch rate measured by the gyro. The fuzzy law wraps it to `(-pi, pi]`.
    ///
    /// Units: radians/second
    pub gyro_pitch_rate_rads: f64,
}

/// Result of evaluating a control law.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LawOutput {
    /// Units: newtons
    pub thrust_n: f64,

    /// Blend weights of the two PD controllers (`pd_blend` only).
    pub blend: [f64; 2],

    /// Scheduling variables (`fuzzy_lmi` only).
    pub sched: [f64; NUM_SCHED_VARS],

    /// Rule weights (`fuzzy_lmi` only).
    pub rule_weights: [f64; NUM_LMI_RULES],

    /// True if the selected law is not implemented and zero thrust has been
    /// demanded.
    pub unimplemented: bool,
}

/// Climb rate band over which the two PD controllers are blended.
#[derive(Debug, Clone, Copy)]
pub struct BlendBand {
    pub upper_ms: f64,
    pub lower_ms: f64,
}

/// A control law with its gains, built once from the parameters.
#[derive(Debug, Clone, Copy)]
pub enum AltLaw {
    PdBlend {
        kp: [f64; 2],
        kd: [f64; 2],
        band: BlendBand,
        neutral_n: f64,
    },
    Sos {
        neutral_n: f64,
        trim_pitch_rad: f64,
    },
    Pd {
        kp: f64,
        kd: f64,
        neutral_n: f64,
    },
    FuzzyLmi(&'static LmiGainSet),
    Unimplemented(AltLawKind),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BlendBand {
    /// Weights of the two PD controllers for the given climb rate.
    ///
    /// Inside the band the weights are linear in the climb rate and sum to
    /// one. Outside it a single controller is used.
    pub fn weights(&self, alt_rate_ms: f64) -> [f64; 2] {
        let width = self.upper_ms - self.lower_ms;
        [
            clamp((alt_rate_ms - self.lower_ms) / width, 0.0, 1.0),
            clamp((self.upper_ms - alt_rate_ms) / width, 0.0, 1.0),
        ]
    }
}

impl AltLaw {
    /// Build the law selected in the parameters.
    pub fn from_params(params: &Params) -> Self {
        let trim_pitch_rad = params.trim_pitch_deg.to_radians();

        match params.law {
            AltLawKind::PdBlend => AltLaw::PdBlend {
                kp: params.kp,
                kd: params.kd,
                band: BlendBand {
                    upper_ms: params.blend_rate_upper_ms,
                    lower_ms: params.blend_rate_lower_ms,
                },
                neutral_n: neutral_thrust_n(trim_pitch_rad, params.trim_airspeed_ms),
            },
            AltLawKind::Sos => AltLaw::Sos {
                neutral_n: params.motor_neutral_n,
                trim_pitch_rad,
            },
            AltLawKind::Pd => AltLaw::Pd {
                kp: params.kp[0],
                kd: params.kd[0],
                neutral_n: params.motor_neutral_n,
            },
            AltLawKind::FuzzyLmi => AltLaw::FuzzyLmi(lmi_gain_set(params.lmi_gain_set)),
            k @ AltLawKind::Lqr | k @ AltLawKind::Ki => AltLaw::Unimplemented(k),
        }
    }

    /// Evaluate the thrust demand.
    pub fn thrust(&self, input: &LawInput) -> LawOutput {
        let mut out = LawOutput::default();
        let e = input.alt_err_m;
        let de = input.alt_rate_ms;

        match self {
            AltLaw::PdBlend { kp, kd, band, neutral_n } => {
                out.blend = band.weights(de);
                out.thrust_n = neutral_n
                    - out.blend
                        .iter()
                        .enumerate()
                        .map(|(i, h)| h * (kp[i] * e + kd[i] * de))
                        .sum::<f64>();
            }
            AltLaw::Sos { neutral_n, trim_pitch_rad } => {
                let (f1, f2) = sos_gains(
                    e,
                    de,
                    input.pitch_rad - trim_pitch_rad,
                    input.pitch_rate_rads
                );
                out.thrust_n = neutral_n - (f1 * e + f2 * de);
            }
            AltLaw::Pd { kp, kd, neutral_n } => {
                out.thrust_n = neutral_n - (kp * e + kd * de);
            }
            AltLaw::FuzzyLmi(set) => {
                let pitch_err_rad = input.pitch_rad - aero::TRIM_PITCH_DEG.to_radians();

                // The gyro rate enters the model as an angle, wrapped to
                // (-pi, pi] like the other angular states
                let q = wrap_pi(input.gyro_pitch_rate_rads);

                out.sched = scheduling_vars(input.gps_climb_rate_ms, q, pitch_err_rad);

                let mut grades = [[0.0; 2]; NUM_SCHED_VARS];
                for (g, (z, b)) in grades.iter_mut().zip(out.sched.iter().zip(set.bounds.iter())) {
                    *g = Grades::of(*z, b.min, b.max).low_first();
                }
                rule_weights(&grades, &mut out.rule_weights);

                let x = [
                    e,
                    input.gps_climb_rate_ms,
                    pitch_err_rad,
                    q,
                ];

                out.thrust_n = aero::TRIM_THRUST_N
                    - blend_feedback(&out.rule_weights, &set.gains, &x);
            }
            AltLaw::Unimplemented(_) => {
                out.thrust_n = 0.0;
                out.unimplemented = true;
            }
        }

        out
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// State dependent gains of the sum-of-squares controller.
fn sos_gains(e: f64, de: f64, pitch_err: f64, pitch_rate: f64) -> (f64, f64) {
    let f1 = 0.0080059 * e - 0.0057775 * de + 0.17926 * pitch_err + 0.049755 * pitch_rate
        + 0.3259;
    let f2 = -0.0057775 * e - 0.0011929 * de + 0.063286 * pitch_err - 0.020788 * pitch_rate
        + 0.09056;

    (f1, f2)
}

/// Scheduling variables of the fuzzy controller.
///
/// - `z1`: aerodynamic force normal to the flight path per unit mass,
/// - `z2`: aerodynamic pitching moment term per unit inertia,
/// - `z3`: gravity term `sin(pitch) / (m1 + m2)`.
fn scheduling_vars(climb_rate_ms: f64, pitch_rate_rads: f64, pitch_err_rad: f64)
    -> [f64; NUM_SCHED_VARS]
{
    use aero::*;

    let c_l = AIR_DENSITY_KGM3 * LIFT_COEFF * CANOPY_AREA_M2;
    let c_d = AIR_DENSITY_KGM3 * DRAG_COEFF * CANOPY_AREA_M2;
    let mass = CANOPY_MASS_KG + PAYLOAD_MASS_KG;
    let arm = LINE_LENGTH_M - CG_OFFSET_M;

    let dh = climb_rate_ms;
    let q = pitch_rate_rads;
    let v = TRIM_SPEED_MS;
    let th_r = pitch_err_rad;
    let th_n = TRIM_PITCH_DEG.to_radians();
    let alpha = RIGGING_ANGLE_DEG.to_radians();
    let gamma = (dh / v).atan();

    let z1 = (0.5 * c_l * dh * gamma.cos() - 0.5 * c_d * dh * gamma.sin() - 0.5 * c_d * v) / mass;

    let z2 = (-0.5 * arm * c_l * q * (th_r + th_n + alpha - gamma).sin()
        + 0.5 * arm * LINE_LENGTH_M * v * th_r.cos() * (th_n + alpha).cos()
        + 0.5 * arm * c_d * dh * (th_r + th_n + alpha - gamma).cos()
        + 0.5 * arm * c_d * v * th_r.cos() * (th_n + alpha).sin()
        - 0.5 * arm * c_l * v * th_r.sin() * (th_n + alpha).sin()
        - 0.5 * arm * c_d * v * th_r.sin() * (th_n + alpha).cos())
        / PITCH_INERTIA_KGM2;

    let z3 = (th_r + th_n).sin() / mass;

    [z1, z2, z3]
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
