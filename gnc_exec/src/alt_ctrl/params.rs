//! Parameters structure for AltCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for altitude control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LAW SELECTION ----

    /// The control law used to compute the thrust demand.
    pub law: AltLawKind,

    /// Index of the LMI gain set used by the `fuzzy_lmi` law. Sets 1, 2 and 3
    /// are the design variants, any other index selects the default set.
    pub lmi_gain_set: u8,

    // ---- PD GAINS ----

    /// Proportional gains on the altitude error, for the two blended
    /// controllers. Only the first is used by the `pd` law.
    ///
    /// Units: newtons/meter
    pub kp: [f64; 2],

    /// Derivative gains on the climb rate, for the two blended controllers.
    /// Only the first is used by the `pd` law.
    ///
    /// Units: newtons/(meter/second)
    pub kd: [f64; 2],

    /// Climb rate at and above which the first PD controller is used alone.
    ///
    /// Units: meters/second
    pub blend_rate_upper_ms: f64,

    /// Climb rate at and below which the second PD controller is used alone.
    /// Must be less than `blend_rate_upper_ms`.
    ///
    /// Units: meters/second
    pub blend_rate_lower_ms: f64,

    // ---- TRIM ----

    /// Thrust about which the `pd` and `sos` laws act.
    ///
    /// Units: newtons
    pub motor_neutral_n: f64,

    /// Pitch attitude at the trim point.
    ///
    /// Units: degrees
    pub trim_pitch_deg: f64,

    /// Airspeed at the trim point.
    ///
    /// Units: meters/second
    pub trim_airspeed_ms: f64,

    // ---- CALIBRATION ----

    /// Throttle calibration.
    pub calib: CalibParams,
}

/// Parameters of the thrust to throttle conversion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalibParams {
    /// Throttle setting which produces the trim thrust.
    ///
    /// Units: percent
    pub neutral_throttle_pct: f64,

    /// Maximum throttle which may be demanded.
    ///
    /// Units: percent
    pub max_throttle_pct: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Available altitude control laws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AltLawKind {
    PdBlend,
    Sos,
    Pd,
    Lqr,
    Ki,
    FuzzyLmi,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            law: AltLawKind::PdBlend,
            lmi_gain_set: 1,
            kp: [0.2, 0.1],
            kd: [0.6, 0.3],
            blend_rate_upper_ms: 1.0,
            blend_rate_lower_ms: -1.0,
            motor_neutral_n: 4.46,
            trim_pitch_deg: 15.8,
            trim_airspeed_ms: 6.55,
            calib: CalibParams::default(),
        }
    }
}

impl Default for CalibParams {
    fn default() -> Self {
        Self {
            neutral_throttle_pct: 55.0,
            max_throttle_pct: 100.0,
        }
    }
}

impl Params {
    /// Check the parameters are self-consistent, returning a description of
    /// the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.blend_rate_upper_ms <= self.blend_rate_lower_ms {
            return Err(format!(
                "blend_rate_upper_ms ({}) must be greater than blend_rate_lower_ms ({})",
                self.blend_rate_upper_ms, self.blend_rate_lower_ms
            ));
        }

        if self.trim_pitch_deg.abs() >= 90.0 {
            return Err(format!(
                "trim_pitch_deg ({}) must be within +/- 90 degrees",
                self.trim_pitch_deg
            ));
        }

        if self.calib.max_throttle_pct <= 0.0 || self.calib.neutral_throttle_pct <= 0.0 {
            return Err(String::from(
                "calib.max_throttle_pct and calib.neutral_throttle_pct must be positive"
            ));
        }

        Ok(())
    }
}
