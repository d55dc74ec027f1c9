//! Main guidance and control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Vehicle state acquisition (from the simulated vehicle)
//!         - Waypoint sequencing (from the simulated mission layer)
//!         - Altitude control processing
//!         - Steering control processing
//!         - Vehicle model update under the new demands
//!         - Archiving
//!
//! # Modules
//!
//! All modules (e.g. `alt_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use gnc_lib::{
    alt_ctrl,
    data_store::DataStore,
    sim::{ExecParams, Mission, RunSummary, SimVehicle},
    steer_ctrl,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, warn};
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Modules whose per-cycle output is limited to INFO unless `--verbose` is
/// given.
const QUIET_TARGETS: [&str; 4] = [
    "gnc_lib::alt_ctrl",
    "gnc_lib::seg_ctrl",
    "gnc_lib::path_ctrl",
    "gnc_lib::steer_ctrl",
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "gnc_exec", about = "Run the guidance and control laws in closed loop")]
struct Opts {
    /// Executable parameter file, relative to the params directory.
    #[structopt(short, long, default_value = "gnc_exec.toml")]
    params: String,

    /// Override the number of cycles to run.
    #[structopt(short, long)]
    cycles: Option<u64>,

    /// Pad each cycle to the cycle period.
    #[structopt(long)]
    realtime: bool,

    /// Include per-cycle trace output from the control modules in the log.
    #[structopt(short, long)]
    verbose: bool,
}

/// One row of the cycle archive.
#[derive(Debug, Serialize)]
struct CycleRecord {
    cycle: u64,
    time_s: f64,
    pos_n_m: f64,
    pos_e_m: f64,
    altitude_m: f64,
    course_deg: f64,
    ground_speed_ms: f64,
    wp_index: u16,
    target_alt_m: f64,
    alt_err_m: f64,
    thrust_n: f64,
    throttle_pct: f64,
    steer_cdeg: i32,
    bar_deg: f64,
    travel_limited: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "gnc_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    let quiet: &[&'static str] = if opts.verbose { &[] } else { &QUIET_TARGETS };
    logger_init(LevelFilter::Trace, quiet, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Paraglider GNC Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let mut exec_params: ExecParams = util::params::load(&opts.params)
        .wrap_err("Could not load exec params")?;

    if let Some(c) = opts.cycles {
        exec_params.num_cycles = c;
    }
    exec_params.realtime |= opts.realtime;

    exec_params.validate()
        .map_err(|e| eyre!("Invalid exec params: {}", e))?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.alt_ctrl.init("alt_ctrl.toml")
        .wrap_err("Failed to initialise AltCtrl")?;
    info!("AltCtrl init complete");

    ds.steer_ctrl.init("steer_ctrl.toml")
        .wrap_err("Failed to initialise SteerCtrl")?;
    info!("SteerCtrl init complete ({:?} mode)", ds.steer_ctrl.mode());

    info!("Module initialisation complete\n");

    // ---- INITIALISE SIMULATION ----

    let mut vehicle = SimVehicle::new(exec_params.model.clone(), &exec_params.initial);
    let mut mission = Mission::new(exec_params.mission.clone());

    let mut archiver = Archiver::from_path(&session, "cycles.csv")
        .wrap_err("Failed to create the cycle archive")?;

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    info!(
        "Running {} cycles at {:.03} s{}\n",
        exec_params.num_cycles,
        exec_params.cycle_period_s,
        if exec_params.realtime { " in real time" } else { "" }
    );

    // ---- MAIN LOOP ----

    while ds.num_cycles < exec_params.num_cycles {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- SENSING ----

        ds.vehicle = vehicle.state();
        ds.cycle_start(ds.vehicle.time_s);

        ds.nav = mission.update(&ds.vehicle.position_m_ne, exec_params.target_alt_m);

        // ---- ALTITUDE CONTROL ----

        ds.alt_ctrl_input = alt_ctrl::InputData {
            vehicle: ds.vehicle,
            target_alt_m: ds.nav.target_alt_m,
        };

        match ds.alt_ctrl.proc(&ds.alt_ctrl_input) {
            Ok((o, r)) => {
                ds.alt_ctrl_output = o;
                ds.alt_ctrl_status_rpt = r;
                ds.dems.throttle_pct = o.throttle_pct;
            },
            Err(e) => {
                ds.num_alt_ctrl_errors += 1;
                warn!("Error during AltCtrl processing: {}", e);
            }
        }

        ds.max_alt_err_m = ds.max_alt_err_m.max(ds.alt_ctrl_status_rpt.alt_err_m.abs());

        // ---- STEERING CONTROL ----

        ds.steer_ctrl_input = steer_ctrl::InputData {
            vehicle: ds.vehicle,
            nav: ds.nav,
        };

        match ds.steer_ctrl.proc(&ds.steer_ctrl_input) {
            Ok((o, r)) => {
                ds.steer_ctrl_output = o;
                ds.steer_ctrl_status_rpt = r;
                ds.dems.steer_cdeg = o.steer_cdeg;
                if r.travel_limited {
                    ds.num_travel_limited += 1;
                }
            },
            Err(e) => {
                ds.num_steer_ctrl_errors += 1;
                warn!("Error during SteerCtrl processing: {}", e);
            }
        }

        // ---- VEHICLE MODEL ----

        vehicle.step(exec_params.cycle_period_s, &ds.dems);

        // ---- ARCHIVING ----

        archiver.serialise(CycleRecord {
            cycle: ds.num_cycles,
            time_s: ds.vehicle.time_s,
            pos_n_m: ds.vehicle.position_m_ne[0],
            pos_e_m: ds.vehicle.position_m_ne[1],
            altitude_m: ds.vehicle.altitude_m,
            course_deg: ds.vehicle.course_rad.to_degrees(),
            ground_speed_ms: ds.vehicle.ground_speed_ms,
            wp_index: ds.nav.wp_index,
            target_alt_m: ds.nav.target_alt_m,
            alt_err_m: ds.alt_ctrl_status_rpt.alt_err_m,
            thrust_n: ds.alt_ctrl_output.thrust_n,
            throttle_pct: ds.dems.throttle_pct,
            steer_cdeg: ds.dems.steer_cdeg,
            bar_deg: ds.steer_ctrl_status_rpt.lever
                .map(|l| l.bar_rad.to_degrees())
                .unwrap_or(0.0),
            travel_limited: ds.steer_ctrl_status_rpt.travel_limited,
        }).wrap_err("Failed to archive the cycle")?;

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        if let Some(d) = ds.cycle_end(cycle_dur, cycle_period) {
            if exec_params.realtime {
                thread::sleep(d);
            }
        }
    }

    // ---- SHUTDOWN ----

    let summary = RunSummary {
        num_cycles: ds.num_cycles,
        num_legs_complete: mission.num_legs_complete(),
        num_cycle_overruns: ds.num_cycle_overruns,
        num_alt_ctrl_errors: ds.num_alt_ctrl_errors,
        num_steer_ctrl_errors: ds.num_steer_ctrl_errors,
        num_travel_limited: ds.num_travel_limited,
        final_state: vehicle.state(),
        max_alt_err_m: ds.max_alt_err_m,
    };

    session.save_json("summary.json", &summary)
        .wrap_err("Failed to save the run summary")?;

    info!(
        "{} cycles archived, {} legs complete",
        archiver.num_records(),
        summary.num_legs_complete
    );
    info!("End of execution");

    Ok(())
}
