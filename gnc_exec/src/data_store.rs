//! # Data Store

use std::time::Duration;

use log::warn;

use crate::{alt_ctrl, steer_ctrl};
use gnc_if::{dems::GncDems, nav::NavTarget, vehicle::VehicleState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Simulation elapsed time
    pub sim_time_s: f64,

    // Vehicle and mission
    pub vehicle: VehicleState,
    pub nav: NavTarget,

    // AltCtrl
    pub alt_ctrl: alt_ctrl::AltCtrl,
    pub alt_ctrl_input: alt_ctrl::InputData,
    pub alt_ctrl_output: alt_ctrl::OutputData,
    pub alt_ctrl_status_rpt: alt_ctrl::StatusReport,

    // SteerCtrl
    pub steer_ctrl: steer_ctrl::SteerCtrl,
    pub steer_ctrl_input: steer_ctrl::InputData,
    pub steer_ctrl_output: steer_ctrl::OutputData,
    pub steer_ctrl_status_rpt: steer_ctrl::StatusReport,

    /// Demands sent to the actuators this cycle
    pub dems: GncDems,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of cycle overruns
    pub num_cycle_overruns: u64,

    pub num_alt_ctrl_errors: u64,
    pub num_steer_ctrl_errors: u64,
    pub num_travel_limited: u64,

    /// Largest altitude error seen so far
    ///
    /// Units: meters
    pub max_alt_err_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Reset the per-cycle outputs at the start of a new cycle.
    ///
    /// Demands fall back to zero throttle and neutral steering unless a
    /// controller produces new ones this cycle.
    pub fn cycle_start(&mut self, sim_time_s: f64) {
        self.sim_time_s = sim_time_s;
        self.alt_ctrl_output = alt_ctrl::OutputData::default();
        self.alt_ctrl_status_rpt = alt_ctrl::StatusReport::default();
        self.steer_ctrl_output = steer_ctrl::OutputData::default();
        self.steer_ctrl_status_rpt = steer_ctrl::StatusReport::default();
        self.dems = GncDems::default();
    }

    /// Record the timing of the cycle which has just ended.
    ///
    /// Returns the time left until the end of the cycle period, or `None` if
    /// the cycle overran.
    pub fn cycle_end(&mut self, cycle_dur: Duration, cycle_period: Duration) -> Option<Duration> {
        self.num_cycles += 1;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                self.num_consec_cycle_overruns = 0;
                Some(d)
            },
            None => {
                self.num_consec_cycle_overruns += 1;
                self.num_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    (cycle_dur - cycle_period).as_secs_f64(),
                    self.num_consec_cycle_overruns
                );
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cycle_timing() {
        let mut ds = DataStore::default();
        let period = Duration::from_millis(100);

        assert_eq!(
            ds.cycle_end(Duration::from_millis(30), period),
            Some(Duration::from_millis(70))
        );

        assert_eq!(ds.cycle_end(Duration::from_millis(130), period), None);
        assert_eq!(ds.cycle_end(Duration::from_millis(150), period), None);
        assert_eq!(ds.num_consec_cycle_overruns, 2);

        assert!(ds.cycle_end(Duration::from_millis(10), period).is_some());
        assert_eq!(ds.num_consec_cycle_overruns, 0);
        assert_eq!(ds.num_cycle_overruns, 2);
        assert_eq!(ds.num_cycles, 4);
    }

    #[test]
    fn test_cycle_start_clears_demands() {
        let mut ds = DataStore::default();
        ds.dems.throttle_pct = 60.0;
        ds.steer_ctrl_output.steer_cdeg = 300;

        ds.cycle_start(1.5);

        assert_eq!(ds.sim_time_s, 1.5);
        assert_eq!(ds.dems, GncDems::default());
        assert_eq!(ds.steer_ctrl_output.steer_cdeg, 0);
    }
}
